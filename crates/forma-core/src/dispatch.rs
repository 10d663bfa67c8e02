//! # dispatch 模块：运行时类型句柄分派层
//!
//! ## 角色定位（Why）
//! - 让只持有运行时类型句柄（而非静态类型参数）的调用方也能进入泛型解码算法；
//! - 把"泛型操作绑定到具体类型"的成本压缩到每类型一次：首次绑定时单态化出
//!   类型擦除的入口函数并缓存，此后所有同句柄调用直接复用。
//!
//! ## 行为契约（What）
//! - [`DispatchRegistry::bind`]：在持有静态类型的调用点构建并缓存分派项，
//!   返回可跨边界传递的 [`TypeHandle`]；
//! - 擦除入口的失败面与静态路径完全一致，经 `Result` 原样穿过类型擦除边界；
//! - 分派项发布后不可变，跨线程安全共享。
//!
//! ## 风险提示（Trade-offs）
//! - 擦除结果以 `Box<dyn Any>` 返回，调用方需自行下转型；热路径上更推荐
//!   直接使用静态泛型入口。

use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::cache::MemoCache;
use crate::decode;
use crate::error::DecodeError;
use crate::message::{Message, RawMessage};
use crate::schema::SchemaRegistry;

/// 运行时类型句柄：`TypeId` 的轻量封装，可哈希、可比较、可跨线程传递。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TypeHandle(TypeId);

impl TypeHandle {
    /// 取得类型 `T` 的句柄。
    #[must_use]
    pub fn of<T: Message>() -> Self {
        Self(TypeId::of::<T>())
    }
}

/// 类型擦除的解码结果，跨分派边界后由调用方下转型还原。
pub type ErasedRecord = Box<dyn Any + Send + Sync>;

/// 绑定到具体类型的分派项：擦除的单条与批量解码入口。
///
/// # 教案式注释
/// - **意图 (Why)**：相当于一张按类型身份建键的显式虚表——每个入口都是在绑定点
///   单态化出的 `fn` 指针，内部执行与静态路径完全相同的算法；
/// - **契约 (What)**：构建后不可变；入口函数自行完成模式解析（已缓存，O(1)），
///   否定结果升格为 [`DecodeError::NotAMessage`]。
pub struct DispatchEntry {
    decode_one: fn(&SchemaRegistry, &RawMessage) -> Result<ErasedRecord, DecodeError>,
    decode_many: fn(&SchemaRegistry, &RawMessage) -> Result<Vec<ErasedRecord>, DecodeError>,
}

impl std::fmt::Debug for DispatchEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchEntry").finish_non_exhaustive()
    }
}

fn erased_decode_one<T: Message>(
    schemas: &SchemaRegistry,
    raw: &RawMessage,
) -> Result<ErasedRecord, DecodeError> {
    let schema = schemas
        .resolve::<T>()
        .ok_or_else(|| DecodeError::NotAMessage {
            type_name: std::any::type_name::<T>(),
        })?;
    let record: T = decode::decode_one(&schema, raw)?;
    Ok(Box::new(record))
}

fn erased_decode_many<T: Message>(
    schemas: &SchemaRegistry,
    raw: &RawMessage,
) -> Result<Vec<ErasedRecord>, DecodeError> {
    let schema = schemas
        .resolve::<T>()
        .ok_or_else(|| DecodeError::NotAMessage {
            type_name: std::any::type_name::<T>(),
        })?;
    let records: Vec<T> = decode::decode_many(&schema, raw)?;
    Ok(records
        .into_iter()
        .map(|record| Box::new(record) as ErasedRecord)
        .collect())
}

/// 分派注册中心：类型句柄 ↦ 不可变 [`DispatchEntry`] 的记忆化映射。
///
/// # 设计摘要
/// - **核心流程（How）**：[`DispatchRegistry::bind`] 在首个持有静态类型的调用点
///   单态化出两个 `fn` 指针并以原子 store-if-absent 发布；其后任何线程凭句柄即可
///   调用擦除入口，绑定成本不再重付；
/// - **并发契约（What）**：与模式注册中心同一保证——竞争构建安全且幂等，
///   发布后的分派项对所有读者一致。
#[derive(Debug, Default)]
pub struct DispatchRegistry {
    entries: MemoCache<TypeHandle, Arc<DispatchEntry>>,
}

impl DispatchRegistry {
    /// 创建空的分派注册中心。
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: MemoCache::new(),
        }
    }

    /// 为类型 `T` 构建（或复用）分派项，返回其运行时句柄。
    ///
    /// - **意图 (Why)**：绑定必须发生在静态类型尚可见的调用点，此后句柄可以
    ///   穿过任何不携带类型参数的边界；
    /// - **后置条件**：重复绑定幂等，返回的句柄恒等。
    pub fn bind<T: Message>(&self) -> TypeHandle {
        let handle = TypeHandle::of::<T>();
        self.entries.retrieve(handle, || {
            tracing::debug!(
                target: "forma::dispatch",
                ty = std::any::type_name::<T>(),
                "首次构建分派项"
            );
            Arc::new(DispatchEntry {
                decode_one: erased_decode_one::<T>,
                decode_many: erased_decode_many::<T>,
            })
        });
        handle
    }

    /// 凭句柄执行擦除的单条解码。
    pub fn decode_one_erased(
        &self,
        handle: TypeHandle,
        schemas: &SchemaRegistry,
        raw: &RawMessage,
    ) -> Result<ErasedRecord, DecodeError> {
        let entry = self.entry_for(handle)?;
        (entry.decode_one)(schemas, raw)
    }

    /// 凭句柄执行擦除的批量解码。
    pub fn decode_many_erased(
        &self,
        handle: TypeHandle,
        schemas: &SchemaRegistry,
        raw: &RawMessage,
    ) -> Result<Vec<ErasedRecord>, DecodeError> {
        let entry = self.entry_for(handle)?;
        (entry.decode_many)(schemas, raw)
    }

    fn entry_for(&self, handle: TypeHandle) -> Result<Arc<DispatchEntry>, DecodeError> {
        self.entries
            .get(&handle)
            .ok_or(DecodeError::UnboundHandle { handle })
    }
}
