//! # forma-core
//!
//! ## 定位与职责（Why）
//! - 模式驱动的位置化消息解码核心：把"类型标签 + 有序松散值"的原始消息，
//!   对照每个目标类型只声明一次的模式，解码为强类型记录；
//! - 支持批量解码（一条原始消息打包多条同形记录）与运行时类型句柄分派
//!   （调用方无静态类型参数时仍可进入泛型解码逻辑）。
//!
//! ## 架构嵌入（Where）
//! - `message` 模块定义入站原始消息与目标类型元数据两条外部边界；
//! - `cache` 模块提供并发 get-or-create 原语，是两个注册中心共同的存储底座；
//! - `schema` 模块负责模式的一次性构建与正/负结果的永久缓存；
//! - `decode` 模块实现两阶段（先校验后填充）单条算法与向下取整的批量切分；
//! - `dispatch` 模块维护类型句柄到单态化入口的显式虚表；
//! - `decoder` 模块把以上组件装配为单一门面；
//! - `error` 模块集中声明 `thiserror` 风格的解码错误域。
//!
//! ## 并发与资源模型（Trade-offs）
//! - 全部操作同步、无阻塞、纯 CPU；解码过程不做任何 I/O；
//! - 注册中心容忍多线程并发的首次解析：竞争构建安全且幂等，发布后的模式与
//!   分派项以 `Arc` 不可变共享，进程生命周期内不回收；
//! - 日志仅出现在冷路径（首次构建模式/分派项），成功解码的热路径零事件。
//!
//! ## 快速上手
//!
//! ```
//! use forma_core::{Decoder, FieldSpec, Message, RawMessage, Value, ValueKind};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Greeting {
//!     text: String,
//! }
//!
//! impl Message for Greeting {
//!     fn type_tag() -> Option<&'static str> {
//!         Some("greeting")
//!     }
//!
//!     fn positional_fields() -> Vec<FieldSpec> {
//!         vec![FieldSpec {
//!             position: 0,
//!             required_marker: false,
//!             optional_marker: false,
//!             kind: ValueKind::Str,
//!             assign: |record, value| {
//!                 if let (Some(greeting), Value::Str(text)) =
//!                     (record.downcast_mut::<Greeting>(), value)
//!                 {
//!                     greeting.text = text.clone();
//!                 }
//!             },
//!         }]
//!     }
//! }
//!
//! let decoder = Decoder::new();
//! let raw = RawMessage::new("greeting", vec![Value::Str("hello".into())]);
//! let record: Greeting = decoder.decode_one(&raw).unwrap();
//! assert_eq!(record.text, "hello");
//! ```

/// 并发记忆化缓存原语。
///
/// - **意图说明 (Why)**：统一模式注册中心与分派注册中心的 get-or-create 语义；
/// - **契约定位 (What)**：原子 store-if-absent，竞争构建允许浪费、禁止撕裂。
pub mod cache;

/// 两阶段单条解码与批量切分算法。
///
/// - **意图说明 (Why)**：失败先于分配——必填校验全部通过之前不构造目标实例；
/// - **契约定位 (What)**：批量为全有或全无，尾部残块静默丢弃是成文的既有行为。
pub mod decode;

/// 解码门面：注册中心与算法的装配入口。
pub mod decoder;

/// 运行时类型句柄分派层。
///
/// - **意图说明 (Why)**：按类型身份建键的显式虚表，绑定一次、处处复用；
/// - **契约定位 (What)**：擦除入口的失败面与静态路径完全一致。
pub mod dispatch;

/// 错误类型与诊断信息集中声明处。
///
/// - **契约定位 (What)**：普通解码失败一律以 `Result` 值返回，无 panic 路径。
pub mod error;

/// 原始消息、值判别式与目标类型元数据契约。
pub mod message;

/// 消息模式与注册中心。
///
/// - **契约定位 (What)**：正负解析结果均永久缓存；模式发布后不可变共享。
pub mod schema;

pub use cache::MemoCache;
pub use decode::{decode_many, decode_one};
pub use decoder::Decoder;
pub use dispatch::{DispatchRegistry, ErasedRecord, TypeHandle};
pub use error::DecodeError;
pub use message::{FieldSetter, FieldSpec, Message, RawMessage, Value, ValueKind};
pub use schema::{FieldSchema, MessageSchema, Requiredness, SchemaRegistry};
