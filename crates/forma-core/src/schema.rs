//! # schema 模块：消息模式与注册中心
//!
//! ## 角色定位（Why）
//! - 把目标类型声明的字段元数据一次性解析为不可变的 [`MessageSchema`]，
//!   此后每次解码只做 O(1) 的缓存查找；
//! - 对"不是消息"的类型缓存永久性否定结果，使重复查询零成本。
//!
//! ## 行为契约（What）
//! - [`SchemaRegistry::resolve`]：按 `TypeId` 记忆化，正/负结果一视同仁；
//! - 模式构造本身没有错误路径——每个类型要么是消息，要么不是；
//! - 字段保留声明顺序；位置在同一模式内唯一但允许不连续。
//!
//! ## 风险提示（Trade-offs）
//! - 模式发布后跨线程不可变共享（`Arc`），进程生命周期内不回收；
//!   运行期不存在类型重定义，故无需失效机制。

use std::any::{TypeId, type_name};
use std::sync::Arc;

use crate::cache::MemoCache;
use crate::message::{FieldSetter, FieldSpec, Message, ValueKind};

/// 字段的必填性，由声明侧标记解析而来。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Requiredness {
    /// 不合格即整条解码失败。
    Required,
    /// 不合格时跳过，字段保持默认值。
    Optional,
}

/// 单个位置化字段的已解析模式。
///
/// - **契约 (What)**：`requiredness` 的裁决规则——两种标记都缺省时默认 Required；
///   Optional 标记存在时（即便与 Required 同时声明）判为 Optional。
///   这是一条显式成文的平局规则，不是实现巧合。
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSchema {
    position: usize,
    requiredness: Requiredness,
    kind: ValueKind,
    assign: FieldSetter,
}

impl FieldSchema {
    /// 字段对应的值位置下标。
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// 字段的必填性。
    #[must_use]
    pub fn requiredness(&self) -> Requiredness {
        self.requiredness
    }

    /// 字段声明的值类别。
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// 类型擦除的字段写入器。
    #[must_use]
    pub fn assign(&self) -> FieldSetter {
        self.assign
    }
}

/// 一个目标记录类型的完整消息模式，缓存与共享的最小单元。
///
/// # 教案式注释
/// - **意图 (Why)**：把标签、可重复标记与字段清单聚合为单个不可变对象，
///   解码算法据此工作，不再回访目标类型的元数据；
/// - **契约 (What)**：构造即冻结；`field_count` 同时是批量切分的分块宽度；
/// - **风险 (Trade-offs)**：实现 `PartialEq` 以支撑"重复解析结果等同首次构建"
///   的幂等性断言，比较成本与字段数线性相关，仅测试使用。
#[derive(Clone, Debug, PartialEq)]
pub struct MessageSchema {
    type_tag: &'static str,
    fields: Vec<FieldSchema>,
    repeatable: bool,
}

impl MessageSchema {
    /// 模式声明的类型标签。
    #[must_use]
    pub fn type_tag(&self) -> &'static str {
        self.type_tag
    }

    /// 按声明顺序排列的字段模式。
    #[must_use]
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// 是否允许批量解码。
    #[must_use]
    pub fn repeatable(&self) -> bool {
        self.repeatable
    }

    /// 保留字段数，亦即批量切分的分块宽度。
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// 模式注册中心：目标类型 ↦ `Option<Arc<MessageSchema>>` 的记忆化解析。
///
/// # 设计摘要
/// - **职责定位（Why）**：解码每条消息都需要模式，解析成本必须只付一次；
///   否定结果同样缓存，避免反复探查非消息类型的元数据；
/// - **核心流程（How）**：
///   1. 查 [`MemoCache`]，命中（无论正负）直接返回；
///   2. 缺键时查询 `T::type_tag()`——`None` 即永久否定；
///   3. 依次读取可重复标记与位置化字段清单，裁决必填性后按声明顺序组装模式；
///   4. 以原子 store-if-absent 发布，竞争线程各自构建但只有一份结果可见。
/// - **并发契约（What）**：构建函数是类型的纯函数，重复构建产物相等，
///   竞争浪费可接受，撕裂条目不可接受——由底层 `DashMap` 保证。
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entries: MemoCache<TypeId, Option<Arc<MessageSchema>>>,
}

impl SchemaRegistry {
    /// 创建空的注册中心。
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: MemoCache::new(),
        }
    }

    /// 解析目标类型的消息模式；非消息类型返回缓存的 `None`。
    pub fn resolve<T: Message>(&self) -> Option<Arc<MessageSchema>> {
        self.entries
            .retrieve(TypeId::of::<T>(), || Self::build::<T>())
    }

    /// 已缓存的条目数（正负结果都计入），供观测与测试使用。
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 注册中心是否为空。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn build<T: Message>() -> Option<Arc<MessageSchema>> {
        let type_tag = match T::type_tag() {
            Some(tag) => tag,
            None => {
                tracing::debug!(target: "forma::schema", ty = type_name::<T>(), "类型未声明消息标签，缓存否定结果");
                return None;
            }
        };

        let repeatable = T::repeatable();
        let fields: Vec<FieldSchema> = T::positional_fields()
            .into_iter()
            .map(|spec| FieldSchema {
                position: spec.position,
                requiredness: resolve_requiredness(&spec),
                kind: spec.kind,
                assign: spec.assign,
            })
            .collect();

        tracing::debug!(
            target: "forma::schema",
            ty = type_name::<T>(),
            tag = type_tag,
            repeatable,
            field_count = fields.len(),
            "首次构建消息模式"
        );

        Some(Arc::new(MessageSchema {
            type_tag,
            fields,
            repeatable,
        }))
    }
}

/// 必填性裁决：默认 Required，Optional 标记出现即胜出。
fn resolve_requiredness(spec: &FieldSpec) -> Requiredness {
    if spec.optional_marker {
        Requiredness::Optional
    } else {
        Requiredness::Required
    }
}
