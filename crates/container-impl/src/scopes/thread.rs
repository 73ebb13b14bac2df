//! 线程限定作用域

use container_abstractions::{InstanceFactory, ScopeCache, ScopedInstance};
use container_common::{BindingKey, ConfinementToken, ContainerResult, SharedInstance};
use dashmap::DashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// 线程限定缓存
///
/// 以 (线程标识, 绑定键) 为缓存键，同一线程内保持实例身份，
/// 不同线程各得各的实例。条目保留到容器关闭统一清空为止。
pub struct ThreadScope {
    instances: DashMap<(ThreadId, BindingKey), SharedInstance>,
}

impl ThreadScope {
    /// 创建空缓存
    pub fn new() -> Self {
        Self {
            instances: DashMap::new(),
        }
    }

    /// 当前缓存的实例数量（跨全部线程）
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// 缓存是否为空
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl Default for ThreadScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeCache for ThreadScope {
    fn provide(
        &self,
        key: &BindingKey,
        _token: Option<&ConfinementToken>,
        factory: InstanceFactory<'_>,
    ) -> ContainerResult<ScopedInstance> {
        let cache_key = (thread::current().id(), key.clone());
        // 构造期间不持有分片锁，避免递归解析同作用域实例时自锁
        if let Some(existing) = self.instances.get(&cache_key) {
            return Ok(ScopedInstance {
                value: Arc::clone(existing.value()),
                fresh: false,
            });
        }
        let value = factory()?;
        // 同线程内解析是串行的，这里不存在插入竞争
        self.instances.insert(cache_key, Arc::clone(&value));
        Ok(ScopedInstance { value, fresh: true })
    }

    fn peek(&self, key: &BindingKey, _token: Option<&ConfinementToken>) -> Option<SharedInstance> {
        self.instances
            .get(&(thread::current().id(), key.clone()))
            .map(|entry| Arc::clone(entry.value()))
    }

    fn drain(&self) -> Vec<(BindingKey, SharedInstance)> {
        let keys: Vec<(ThreadId, BindingKey)> =
            self.instances.iter().map(|e| e.key().clone()).collect();
        let mut evicted = Vec::new();
        for cache_key in keys {
            if let Some(((_, key), value)) = self.instances.remove(&cache_key) {
                evicted.push((key, value));
            }
        }
        evicted
    }
}

impl std::fmt::Debug for ThreadScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadScope")
            .field("instances", &self.instances.len())
            .finish()
    }
}
