//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义解码核心对外暴露的错误语义：标签失配、必填字段不合格、批量元素失败等
//!   均属"普通解码失败"，以 `Result` 值返回，绝不在热路径上抛出 panic；
//! - 细粒度变体携带位置、标签与类别上下文，方便调用方按消息粒度决定回退策略。
//!
//! ## 设计要求（What）
//! - 所有变体实现 `thiserror::Error`，兼容 `std::error::Error` 生态；
//! - "类型未声明模式"不是错误而是缓存的否定结果；只有经由门面接口请求解码时
//!   才升格为 [`DecodeError::NotAMessage`]，提示调用侧选错了目标类型。

use thiserror::Error;

use crate::dispatch::TypeHandle;
use crate::message::ValueKind;

/// 解码核心错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把两阶段解码、批量切分与运行时分派的失败原因归档为封闭枚举，
///   便于测试断言与上层精确告警；
/// - **契约 (What)**：
///   - 所有变体 `Clone + PartialEq`，可安全跨线程传播与比较；
///   - 普通失败一律作为 `Err` 值返回，调用方无需异常处理开销；
///   - 批量失败通过 [`DecodeError::BatchElement`] 附带元素下标与根因。
/// - **设计权衡 (Trade-offs)**：上下文采用 `String`/`Box` 保存，牺牲少量堆分配换取
///   可读性；失败路径本就不在吞吐敏感的成功路径上。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum DecodeError {
    /// 原始消息的类型标签与模式声明的标签不一致。
    ///
    /// - **意图 (Why)**：标签闸门在任何字段检查与实例构造之前生效，失配即止损。
    #[error("message tag `{actual}` does not match schema tag `{expected}`")]
    TagMismatch {
        /// 模式声明的标签。
        expected: String,
        /// 消息实际携带的标签。
        actual: String,
    },

    /// 请求解码的目标类型未声明任何消息元数据。
    ///
    /// - **契约 (What)**：模式注册中心对该类型的否定结果已被永久缓存，
    ///   后续同类请求的失败是 O(1) 的。
    #[error("type `{type_name}` declares no message schema")]
    NotAMessage {
        /// 目标类型名，仅用于诊断展示。
        type_name: &'static str,
    },

    /// 必填字段在对应位置上没有值。
    #[error("required field at position {position} has no value")]
    MissingRequired {
        /// 字段声明的位置下标。
        position: usize,
    },

    /// 必填字段位置上的值类别与声明类别不符。
    ///
    /// - **风险 (Trade-offs)**：判定采用判别式精确相等，子类型/可赋值兼容不在契约内；
    ///   放宽须视为契约变更而非修复。
    #[error("required field at position {position} expects {expected:?}, found {actual:?}")]
    KindMismatch {
        /// 字段声明的位置下标。
        position: usize,
        /// 声明的值类别。
        expected: ValueKind,
        /// 消息中实际出现的值类别。
        actual: ValueKind,
    },

    /// 对未声明可重复标记的模式请求了批量解码。
    #[error("schema for tag `{tag}` is not repeatable")]
    NotRepeatable {
        /// 模式的类型标签。
        tag: String,
    },

    /// 批量解码中某个分块失败，整批作废。
    ///
    /// - **契约 (What)**：`index` 为失败分块在批中的序号，`source` 保留单条解码的根因；
    ///   绝不返回部分成功的记录序列。
    #[error("record {index} in batch failed to decode: {source}")]
    BatchElement {
        /// 失败分块的序号（从 0 起）。
        index: usize,
        /// 单条解码的根因。
        #[source]
        source: Box<DecodeError>,
    },

    /// 以未绑定的运行时类型句柄请求分派解码。
    ///
    /// - **意图 (Why)**：分派项只能在首次持有静态类型的调用点上构建；
    ///   句柄未绑定说明调用顺序颠倒，属调用侧编排缺陷，但仍以错误值返回以便定位。
    #[error("type handle {handle:?} has not been bound to a dispatch entry")]
    UnboundHandle {
        /// 未命中的类型句柄。
        handle: TypeHandle,
    },
}
