//! # cache 模块：并发记忆化缓存原语
//!
//! ## 角色定位（Why）
//! - 为模式注册中心与分派注册中心提供统一的 get-or-create 存储原语；
//! - 两个上层缓存都会被多个请求处理线程同时访问，因此原语直接建立在 `DashMap`
//!   的分片并发能力之上，而非单线程 `HashMap`。
//!
//! ## 行为契约（What）
//! - [`MemoCache::retrieve`]：键命中直接返回缓存值；未命中则调用工厂函数，
//!   以原子 store-if-absent 语义写入后返回；
//! - 竞争窗口内允许多个线程重复执行工厂（工厂必须是键的纯函数），
//!   但最终仅一个结果可见，后续读者观察到一致条目。
//!
//! ## 风险提示（Trade-offs）
//! - `entry` 持有分片写锁期间执行工厂，工厂不得回访同一张表，否则可能死锁；
//!   本 crate 内两处使用（模式构建、分派项构建）均为无副作用的纯计算。

use std::hash::Hash;

use dashmap::DashMap;

/// 并发安全的记忆化映射：键不存在时自动执行工厂函数填充。
///
/// # 教案式注释
/// - **意图 (Why)**：把"查缓存、缺键补算、写回"三步收敛为一个原子入口，上层不再
///   直接触碰 `DashMap` 的 entry 细节；
/// - **契约 (What)**：值类型要求 `Clone`，返回的是缓存条目的克隆（上层以 `Arc` 或
///   `Option<Arc<_>>` 作为值，克隆即指针拷贝）；
/// - **风险 (Trade-offs)**：未内建淘汰策略——条目与进程同寿命，这正是模式/分派
///   缓存需要的语义。
#[derive(Debug)]
pub struct MemoCache<K, V>
where
    K: Eq + Hash,
{
    storage: DashMap<K, V>,
}

// 手写 Default：派生版本会给 `K`/`V` 附加多余的 `Default` 约束（`TypeId` 无法满足）。
impl<K, V> Default for MemoCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// 创建空缓存。
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// 按键取值；缺键时调用 `factory` 计算并原子写入。
    ///
    /// - **契约 (What)**：同一键上并发首次访问时，至多一个计算结果被发布；
    /// - **前置条件**：`factory` 是键的纯函数，且不得访问本缓存自身。
    pub fn retrieve(&self, key: K, factory: impl FnOnce() -> V) -> V {
        if let Some(hit) = self.storage.get(&key) {
            return hit.value().clone();
        }
        self.storage.entry(key).or_insert_with(factory).value().clone()
    }

    /// 只查不建：键存在时返回缓存值的克隆。
    ///
    /// 供"缺键即错误"的上层使用，例如凭句柄查分派项时未绑定应报错而非补建。
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        self.storage.get(key).map(|entry| entry.value().clone())
    }

    /// 当前条目数，供观测与测试使用。
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// 缓存是否为空。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieve_runs_factory_only_on_miss() {
        let cache: MemoCache<&'static str, u32> = MemoCache::new();

        let first = cache.retrieve("answer", || 42);
        assert_eq!(first, 42);

        // 命中后工厂不再执行，旧值保持可见。
        let second = cache.retrieve("answer", || panic!("缓存命中时不应调用工厂"));
        assert_eq!(second, 42);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_keys_get_distinct_entries() {
        let cache: MemoCache<u8, String> = MemoCache::new();
        assert_eq!(cache.retrieve(1, || "one".to_string()), "one");
        assert_eq!(cache.retrieve(2, || "two".to_string()), "two");
        assert_eq!(cache.len(), 2);
        assert!(!cache.is_empty());
    }
}
