//! # message 模块：原始消息与元数据边界
//!
//! ## 角色定位（Why）
//! - 定义解码核心消费的两个外部边界：入站的 [`RawMessage`]（带类型标签的位置化值序列）
//!   与目标记录类型声明的 [`Message`] 元数据契约；
//! - 以带判别式的枚举 [`Value`] 承载松散类型的标量，使"精确类型匹配"退化为
//!   [`ValueKind`] 判别式比较，避免装箱与反射式类型身份问题。
//!
//! ## 行为契约（What）
//! - `RawMessage` 构造后不可变，解码器仅要求标签相等比较、按位索引与运行时类型探查；
//! - `Message` 是声明式字段元数据的"已解析形态"：类型标签、可重复标记与位置化字段清单；
//!   属性/注解语法本身如何书写不属于本核心。
//!
//! ## 风险提示（Trade-offs）
//! - `Value` 的判别式集合是封闭的；新增标量类别需要同步扩展 `ValueKind` 与各处匹配分支。

use std::any::Any;
use std::sync::Arc;

/// 松散类型的标量值，解码前的原始载荷单元。
///
/// # 教案式注释
/// - **意图 (Why)**：以 tagged enum 显式携带判别式，取代开放式动态类型；
/// - **契约 (What)**：一旦构造不再变更；判别式经由 [`Value::kind`] 暴露给校验阶段；
/// - **风险 (Trade-offs)**：字符串与字节载荷存在堆分配，批量切分时按引用传递以避免复制。
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// UTF-8 字符串。
    Str(String),
    /// 32 位有符号整数。
    I32(i32),
    /// 64 位有符号整数。
    I64(i64),
    /// 32 位无符号整数。
    U32(u32),
    /// 双精度浮点数。
    F64(f64),
    /// 布尔值。
    Bool(bool),
}

impl Value {
    /// 返回该值的运行时类别判别式。
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Str(_) => ValueKind::Str,
            Value::I32(_) => ValueKind::I32,
            Value::I64(_) => ValueKind::I64,
            Value::U32(_) => ValueKind::U32,
            Value::F64(_) => ValueKind::F64,
            Value::Bool(_) => ValueKind::Bool,
        }
    }
}

/// [`Value`] 的类别判别式；字段资格校验即判别式相等比较。
///
/// 精确相等是刻意选择的契约：不做数值提升，也不做兼容性放宽，换取无分支的字段赋值。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValueKind {
    Str,
    I32,
    I64,
    U32,
    F64,
    Bool,
}

/// 入站原始消息：类型标签加一段按位置索引的值序列。
///
/// # 教案式注释
/// - **意图 (Why)**：作为词法/分帧层与解码核心之间的唯一数据载体，生产方在别处；
/// - **契约 (What)**：构造后不可变；`values` 的下标即字段位置；值个数经 [`RawMessage::len`] 暴露；
/// - **风险 (Trade-offs)**：标签采用 `Arc<str>` 以便在调用链上零拷贝共享。
#[derive(Clone, Debug, PartialEq)]
pub struct RawMessage {
    type_tag: Arc<str>,
    values: Vec<Value>,
}

impl RawMessage {
    /// 以标签与值序列构造新的原始消息。
    #[must_use]
    pub fn new(type_tag: impl Into<Arc<str>>, values: Vec<Value>) -> Self {
        Self {
            type_tag: type_tag.into(),
            values,
        }
    }

    /// 返回消息的类型标签。
    #[must_use]
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// 按位置索引的全部值。
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// 值个数。
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否不含任何值。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 指定位置上的值；越界返回 `None`。
    #[must_use]
    pub fn value_at(&self, position: usize) -> Option<&Value> {
        self.values.get(position)
    }
}

/// 类型擦除的字段写入器：将一个原始值写入目标记录的某个字段。
///
/// 校验阶段已保证值类别与声明类别一致，写入器内部的下转型与模式匹配失配即为
/// 实现缺陷，约定为静默忽略而非 panic。
pub type FieldSetter = fn(&mut dyn Any, &Value);

/// 目标类型上声明的单个位置化字段元数据（未解析形态）。
///
/// # 教案式注释
/// - **意图 (Why)**：忠实保留声明侧的原貌——Required 与 Optional 两种标记可以同时出现，
///   解析规则（Optional 胜出）由模式注册中心统一裁决；
/// - **契约 (What)**：`position` 在同一类型内唯一但允许不连续；`assign` 必须针对声明类型
///   `Self` 做下转型后写入对应字段。
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    /// 字段对应的值位置下标。
    pub position: usize,
    /// 是否显式携带 Required 标记。
    pub required_marker: bool,
    /// 是否显式携带 Optional 标记。
    pub optional_marker: bool,
    /// 字段声明的值类别。
    pub kind: ValueKind,
    /// 类型擦除的字段写入器。
    pub assign: FieldSetter,
}

/// 可被解码的目标记录类型需要暴露的元数据契约。
///
/// # 设计摘要
/// - **职责定位（Why）**：这是声明式字段元数据（属性/注解）的已解析语义形态，
///   解码核心只消费本契约，不关心元数据在源头如何书写；
/// - **核心流程（How）**：模式注册中心查询 [`Message::type_tag`] 判定"是否为消息"
///   （`None` 即永久性否定结果），再经 [`Message::repeatable`] 与
///   [`Message::positional_fields`] 组装出缓存的 [`MessageSchema`](crate::schema::MessageSchema)；
/// - **契约说明（What）**：`Default` 约束即"分配一个目标记录"的全部机制——未命中的
///   Optional 字段保持默认值；实现方保证 `positional_fields` 为纯函数，重复调用结果一致。
pub trait Message: Default + Send + Sync + 'static {
    /// 消息类型标签；`None` 表示该类型未声明消息元数据，永远不是消息。
    fn type_tag() -> Option<&'static str>;

    /// 该类型是否允许一条原始消息打包多条同形记录。
    fn repeatable() -> bool {
        false
    }

    /// 携带位置元数据的字段清单，按声明顺序排列。
    fn positional_fields() -> Vec<FieldSpec> {
        Vec::new()
    }
}
