//! 分派层测试：验证运行时类型句柄路径与静态泛型路径解码结果一致，
//! 失败面原样穿过类型擦除边界，未绑定句柄被拒绝。

use forma_core::{
    DecodeError, Decoder, FieldSpec, Message, RawMessage, TypeHandle, Value, ValueKind,
};

#[derive(Debug, Default, PartialEq)]
struct Telemetry {
    probe: String,
    reading: i64,
}

impl Message for Telemetry {
    fn type_tag() -> Option<&'static str> {
        Some("telemetry")
    }

    fn repeatable() -> bool {
        true
    }

    fn positional_fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec {
                position: 0,
                required_marker: true,
                optional_marker: false,
                kind: ValueKind::Str,
                assign: |record, value| {
                    if let (Some(msg), Value::Str(text)) =
                        (record.downcast_mut::<Telemetry>(), value)
                    {
                        msg.probe = text.clone();
                    }
                },
            },
            FieldSpec {
                position: 1,
                required_marker: true,
                optional_marker: false,
                kind: ValueKind::I64,
                assign: |record, value| {
                    if let (Some(msg), Value::I64(number)) =
                        (record.downcast_mut::<Telemetry>(), value)
                    {
                        msg.reading = *number;
                    }
                },
            },
        ]
    }
}

#[derive(Debug, Default)]
struct Unbound;

impl Message for Unbound {
    fn type_tag() -> Option<&'static str> {
        Some("unbound")
    }
}

fn sample() -> RawMessage {
    RawMessage::new(
        "telemetry",
        vec![Value::Str("cpu0".into()), Value::I64(42)],
    )
}

#[test]
fn erased_decode_matches_static_decode() {
    let decoder = Decoder::new();
    let handle = decoder.bind::<Telemetry>();

    let statically: Telemetry = decoder.decode_one(&sample()).expect("静态路径应成功");
    let erased = decoder
        .decode_one_erased(handle, &sample())
        .expect("擦除路径应成功");
    let roundtripped = erased
        .downcast::<Telemetry>()
        .expect("擦除结果应能下转型回具体类型");
    assert_eq!(*roundtripped, statically);
}

#[test]
fn erased_batch_preserves_order_and_types() {
    let decoder = Decoder::new();
    let handle = decoder.bind::<Telemetry>();
    let raw = RawMessage::new(
        "telemetry",
        vec![
            Value::Str("cpu0".into()),
            Value::I64(1),
            Value::Str("cpu1".into()),
            Value::I64(2),
        ],
    );

    let records = decoder
        .decode_many_erased(handle, &raw)
        .expect("擦除批量应成功");
    assert_eq!(records.len(), 2);
    for (index, erased) in records.into_iter().enumerate() {
        let record = erased.downcast::<Telemetry>().expect("逐条下转型应成功");
        assert_eq!(record.reading, (index + 1) as i64);
    }
}

#[test]
fn binding_is_idempotent() {
    let decoder = Decoder::new();
    let first = decoder.bind::<Telemetry>();
    let second = decoder.bind::<Telemetry>();
    assert_eq!(first, second);
    assert_eq!(first, TypeHandle::of::<Telemetry>());
}

#[test]
fn failure_surface_crosses_erasure_boundary_unchanged() {
    let decoder = Decoder::new();
    let handle = decoder.bind::<Telemetry>();
    let wrong_tag = RawMessage::new("metrics", vec![Value::Str("cpu0".into()), Value::I64(42)]);

    let err = decoder
        .decode_one_erased(handle, &wrong_tag)
        .expect_err("标签失配应穿过擦除边界");
    assert_eq!(
        err,
        DecodeError::TagMismatch {
            expected: "telemetry".into(),
            actual: "metrics".into(),
        }
    );
}

#[test]
fn unbound_handle_is_rejected() {
    let decoder = Decoder::new();
    // 句柄取自从未 bind 过的类型。
    let handle = TypeHandle::of::<Unbound>();

    let err = decoder
        .decode_one_erased(handle, &sample())
        .expect_err("未绑定句柄必须报错");
    assert_eq!(err, DecodeError::UnboundHandle { handle });
}
