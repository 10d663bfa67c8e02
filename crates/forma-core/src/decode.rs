//! # decode 模块：两阶段单条解码与批量切分
//!
//! ## 角色定位（Why）
//! - 实现对照模式的核心解码算法：先校验后填充，让注定失败的解码不付实例化成本；
//! - 批量路径把一条原始消息按模式宽度切成等长分块，逐块复用单条算法。
//!
//! ## 行为契约（What）
//! - [`decode_one`]：标签闸门 → 资格校验（必填不合格立即失败）→ 默认实例填充；
//! - [`decode_many`]：标签闸门与可重复闸门 → 向下取整切分 → 全有或全无的分块解码；
//! - 字段资格 = 位置上存在值 **且** 值类别与声明类别判别式相等；
//!   Optional 字段不合格仅被跳过，记录保持该字段的默认值。
//!
//! ## 风险提示（Trade-offs）
//! - 批量值数不是分块宽度整数倍时，尾部残块被静默丢弃（既有行为，刻意保留，
//!   变更前需产品侧确认）；
//! - 类别判定为精确相等而非可赋值兼容，收紧或放宽均属契约变更。

use std::any::Any;

use crate::error::DecodeError;
use crate::message::{Message, RawMessage, Value};
use crate::schema::{FieldSchema, MessageSchema, Requiredness};

/// 对照模式解码一条记录。
///
/// # 设计摘要
/// - **核心流程（How）**：
///   1. 标签闸门：`raw.type_tag != schema.type_tag` 立即失败，绝不构造实例;
///   2. 校验遍：按模式顺序检查每个字段的资格，合格者收入临时缓冲，
///      必填字段不合格即携带位置与原因返回；
///   3. 填充遍：`T::default()` 构造记录后，按模式顺序经类型擦除写入器逐一赋值。
/// - **契约说明（What)**：失败时无任何可观测副作用；成功时未合格的 Optional 字段
///   保持目标类型的默认值。
/// - **设计权衡 (Trade-offs)**：实例构造是单次解码中最贵的一步，推迟到必填校验
///   全部通过之后，失败路径完全免除该成本。
pub fn decode_one<T: Message>(
    schema: &MessageSchema,
    raw: &RawMessage,
) -> Result<T, DecodeError> {
    gate_type_tag(schema, raw)?;
    decode_values(schema, raw.values())
}

/// 对照可重复模式解码一批同形记录。
///
/// # 设计摘要
/// - **核心流程（How）**：
///   1. 闸门：标签失配或模式未声明可重复，立即失败，不做任何切分;
///   2. `record_count = raw.len() / field_count` 向下取整，尾部残块静默丢弃;
///   3. 逐块以模式宽度切出值片段，复用单条校验/填充算法——分块不再重查标签，
///      因为整批的标签闸门已在第 1 步统一生效;
///   4. 任一分块失败则整批作废，根因连同分块序号一并返回。
/// - **契约说明（What）**：成功时记录顺序与值分组在原始消息中的出现顺序一致。
pub fn decode_many<T: Message>(
    schema: &MessageSchema,
    raw: &RawMessage,
) -> Result<Vec<T>, DecodeError> {
    gate_type_tag(schema, raw)?;
    if !schema.repeatable() {
        return Err(DecodeError::NotRepeatable {
            tag: schema.type_tag().to_string(),
        });
    }

    let width = schema.field_count();
    if width == 0 {
        // 零字段模式没有可切分的宽度，约定返回空批而非除零。
        return Ok(Vec::new());
    }

    let record_count = raw.len() / width;
    let mut records = Vec::with_capacity(record_count);
    for index in 0..record_count {
        let chunk = &raw.values()[index * width..(index + 1) * width];
        let record = decode_values(schema, chunk).map_err(|source| DecodeError::BatchElement {
            index,
            source: Box::new(source),
        })?;
        records.push(record);
    }
    Ok(records)
}

fn gate_type_tag(schema: &MessageSchema, raw: &RawMessage) -> Result<(), DecodeError> {
    if raw.type_tag() != schema.type_tag() {
        return Err(DecodeError::TagMismatch {
            expected: schema.type_tag().to_string(),
            actual: raw.type_tag().to_string(),
        });
    }
    Ok(())
}

/// 对一段按位置索引的值执行校验遍与填充遍；批量路径以分块片段直接复用。
pub(crate) fn decode_values<T: Message>(
    schema: &MessageSchema,
    values: &[Value],
) -> Result<T, DecodeError> {
    // 校验遍：先收集合格字段，实例构造推迟到必填校验全部通过之后。
    let mut qualified: Vec<&FieldSchema> = Vec::with_capacity(schema.field_count());
    for field in schema.fields() {
        match values.get(field.position()) {
            Some(value) if value.kind() == field.kind() => qualified.push(field),
            probed => {
                if field.requiredness() == Requiredness::Required {
                    return Err(match probed {
                        Some(value) => DecodeError::KindMismatch {
                            position: field.position(),
                            expected: field.kind(),
                            actual: value.kind(),
                        },
                        None => DecodeError::MissingRequired {
                            position: field.position(),
                        },
                    });
                }
                // Optional 字段不合格：跳过，保持默认值。
            }
        }
    }

    // 填充遍：默认实例 + 按模式顺序写入合格字段。
    let mut record = T::default();
    let erased: &mut dyn Any = &mut record;
    for field in qualified {
        (field.assign())(erased, &values[field.position()]);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ValueKind;
    use crate::schema::SchemaRegistry;

    /// 声明了可重复标记却没有任何位置化字段的极端类型。
    #[derive(Debug, Default, PartialEq)]
    struct Heartbeat;

    impl Message for Heartbeat {
        fn type_tag() -> Option<&'static str> {
            Some("heartbeat")
        }

        fn repeatable() -> bool {
            true
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Sparse {
        tail: bool,
    }

    impl Message for Sparse {
        fn type_tag() -> Option<&'static str> {
            Some("sparse")
        }

        fn positional_fields() -> Vec<crate::message::FieldSpec> {
            // 位置刻意不连续：仅第 3 位有意义。
            vec![crate::message::FieldSpec {
                position: 3,
                required_marker: true,
                optional_marker: false,
                kind: ValueKind::Bool,
                assign: |record, value| {
                    if let (Some(msg), Value::Bool(flag)) = (record.downcast_mut::<Sparse>(), value)
                    {
                        msg.tail = *flag;
                    }
                },
            }]
        }
    }

    #[test]
    fn zero_width_repeatable_schema_yields_empty_batch() {
        let registry = SchemaRegistry::new();
        let schema = registry.resolve::<Heartbeat>().expect("应解析出模式");
        let raw = RawMessage::new("heartbeat", vec![Value::Bool(true), Value::Bool(false)]);

        // 宽度为零时没有可切分依据，约定空批而非除零。
        let records: Vec<Heartbeat> = decode_many(&schema, &raw).expect("零宽模式应返回空批");
        assert!(records.is_empty());
    }

    #[test]
    fn non_contiguous_positions_are_addressed_directly() {
        let registry = SchemaRegistry::new();
        let schema = registry.resolve::<Sparse>().expect("应解析出模式");
        let raw = RawMessage::new(
            "sparse",
            vec![
                Value::I32(0),
                Value::I32(1),
                Value::I32(2),
                Value::Bool(true),
            ],
        );

        let record: Sparse = decode_one(&schema, &raw).expect("不连续位置应按下标直接寻址");
        assert!(record.tail);
    }

    #[test]
    fn failed_decode_never_constructs_an_instance() {
        // Default 实现带副作用计数，校验失败路径不应触发。
        use std::sync::atomic::{AtomicUsize, Ordering};

        static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

        #[derive(Debug)]
        struct Counting {
            _value: i32,
        }

        impl Default for Counting {
            fn default() -> Self {
                CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
                Self { _value: 0 }
            }
        }

        impl Message for Counting {
            fn type_tag() -> Option<&'static str> {
                Some("counting")
            }

            fn positional_fields() -> Vec<crate::message::FieldSpec> {
                vec![crate::message::FieldSpec {
                    position: 0,
                    required_marker: true,
                    optional_marker: false,
                    kind: ValueKind::I32,
                    assign: |_, _| {},
                }]
            }
        }

        let registry = SchemaRegistry::new();
        let schema = registry.resolve::<Counting>().expect("应解析出模式");

        let missing = RawMessage::new("counting", vec![]);
        assert!(decode_one::<Counting>(&schema, &missing).is_err());
        assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), 0);

        let present = RawMessage::new("counting", vec![Value::I32(5)]);
        assert!(decode_one::<Counting>(&schema, &present).is_ok());
        assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), 1);
    }
}
