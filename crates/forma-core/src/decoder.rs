//! # decoder 模块：解码门面
//!
//! ## 角色定位（Why）
//! - 把模式注册中心、解码算法与分派注册中心装配为单个入口对象，
//!   调用方无需自行穿针引线；
//! - 对应原系统中"注册中心 + 算法"合一的管理者角色：静态泛型入口负责
//!   resolve-then-decode，擦除入口负责凭句柄转发。
//!
//! ## 行为契约（What）
//! - [`Decoder::decode_one`] / [`Decoder::decode_many`]：先解析模式
//!   （否定结果升格为 [`DecodeError::NotAMessage`]），再执行对应算法；
//! - [`Decoder::bind`] 与 `*_erased` 系列：运行时句柄路径的装配点与转发点；
//! - 门面自身无状态逻辑，全部状态在两个注册中心内，跨线程共享安全。

use crate::decode;
use crate::dispatch::{DispatchRegistry, ErasedRecord, TypeHandle};
use crate::error::DecodeError;
use crate::message::{Message, RawMessage};
use crate::schema::SchemaRegistry;

/// 解码核心的装配门面：持有模式注册中心与分派注册中心。
///
/// # 教案式注释
/// - **意图 (Why)**：解码操作来自可能并行的请求处理上下文，门面以 `&self`
///   暴露全部入口，内部缓存自行保证并发安全；
/// - **契约 (What)**：进程内通常共享一个实例（例如包在 `Arc` 里），
///   模式与分派项随首次使用惰性构建并与门面同寿命；
/// - **风险 (Trade-offs)**：不同门面实例互不共享缓存，重复构建无害但浪费。
#[derive(Debug, Default)]
pub struct Decoder {
    schemas: SchemaRegistry,
    dispatch: DispatchRegistry,
}

impl Decoder {
    /// 创建空的解码门面。
    #[must_use]
    pub fn new() -> Self {
        Self {
            schemas: SchemaRegistry::new(),
            dispatch: DispatchRegistry::new(),
        }
    }

    /// 模式注册中心的只读访问，供观测与测试使用。
    #[must_use]
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// 解析模式后解码一条记录。
    pub fn decode_one<T: Message>(&self, raw: &RawMessage) -> Result<T, DecodeError> {
        let schema = self
            .schemas
            .resolve::<T>()
            .ok_or_else(|| DecodeError::NotAMessage {
                type_name: std::any::type_name::<T>(),
            })?;
        decode::decode_one(&schema, raw)
    }

    /// 解析模式后批量解码一批同形记录。
    pub fn decode_many<T: Message>(&self, raw: &RawMessage) -> Result<Vec<T>, DecodeError> {
        let schema = self
            .schemas
            .resolve::<T>()
            .ok_or_else(|| DecodeError::NotAMessage {
                type_name: std::any::type_name::<T>(),
            })?;
        decode::decode_many(&schema, raw)
    }

    /// 为类型 `T` 绑定分派项，返回可跨无类型参数边界传递的句柄。
    pub fn bind<T: Message>(&self) -> TypeHandle {
        self.dispatch.bind::<T>()
    }

    /// 凭句柄解码一条记录，结果以类型擦除形式返回。
    pub fn decode_one_erased(
        &self,
        handle: TypeHandle,
        raw: &RawMessage,
    ) -> Result<ErasedRecord, DecodeError> {
        self.dispatch.decode_one_erased(handle, &self.schemas, raw)
    }

    /// 凭句柄批量解码，结果以类型擦除形式返回。
    pub fn decode_many_erased(
        &self,
        handle: TypeHandle,
        raw: &RawMessage,
    ) -> Result<Vec<ErasedRecord>, DecodeError> {
        self.dispatch.decode_many_erased(handle, &self.schemas, raw)
    }
}
