//! 进程单例作用域

use container_abstractions::{InstanceFactory, ScopeCache, ScopedInstance};
use container_common::{BindingKey, ConfinementToken, ContainerResult, SharedInstance};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// 进程级单例缓存
///
/// 每个绑定键对应一个 `OnceCell`，并发首次解析时只有一方执行
/// 构造闭包，竞争失败的一方等待并取得同一实例。取槽位与执行
/// 构造分两步进行，构造期间不持有分片锁，允许构造过程中递归
/// 解析其他单例。
pub struct SingletonScope {
    cells: DashMap<BindingKey, Arc<OnceCell<SharedInstance>>>,
}

impl SingletonScope {
    /// 创建空缓存
    pub fn new() -> Self {
        Self {
            cells: DashMap::new(),
        }
    }

    /// 当前存活的单例数量
    pub fn len(&self) -> usize {
        self.cells
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    /// 缓存是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SingletonScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeCache for SingletonScope {
    fn provide(
        &self,
        key: &BindingKey,
        _token: Option<&ConfinementToken>,
        factory: InstanceFactory<'_>,
    ) -> ContainerResult<ScopedInstance> {
        let cell = self
            .cells
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();
        let mut fresh = false;
        let value = cell.get_or_try_init(|| {
            fresh = true;
            factory()
        })?;
        Ok(ScopedInstance {
            value: Arc::clone(value),
            fresh,
        })
    }

    fn peek(&self, key: &BindingKey, _token: Option<&ConfinementToken>) -> Option<SharedInstance> {
        self.cells
            .get(key)
            .and_then(|entry| entry.value().get().cloned())
    }

    fn drain(&self) -> Vec<(BindingKey, SharedInstance)> {
        let keys: Vec<BindingKey> = self.cells.iter().map(|e| e.key().clone()).collect();
        let mut evicted = Vec::new();
        for key in keys {
            if let Some((k, cell)) = self.cells.remove(&key) {
                if let Some(value) = cell.get() {
                    evicted.push((k, Arc::clone(value)));
                }
            }
        }
        evicted
    }
}

impl std::fmt::Debug for SingletonScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonScope")
            .field("instances", &self.len())
            .finish()
    }
}
