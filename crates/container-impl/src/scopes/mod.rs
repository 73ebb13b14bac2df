//! 作用域缓存策略实现
//!
//! 每种作用域一个策略：无缓存、进程单例、线程限定、会话限定。
//! 自定义作用域在配置期通过 [`ScopeRegistry::register`] 挂接。

mod no_cache;
mod session;
mod singleton;
mod thread;

pub use no_cache::NoCacheScope;
pub use session::SessionScope;
pub use singleton::SingletonScope;
pub use thread::ThreadScope;

use container_abstractions::ScopeCache;
use container_common::{ContainerResult, IllegalStateError, ScopeKind};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// 作用域注册表
///
/// 四种内置作用域在构造时就位；自定义作用域只能在容器完成配置前
/// 注册一次，重复注册失败。
pub struct ScopeRegistry {
    caches: RwLock<HashMap<ScopeKind, Arc<dyn ScopeCache>>>,
}

impl ScopeRegistry {
    /// 创建携带内置作用域的注册表
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.insert_builtin(ScopeKind::NoCache, Arc::new(NoCacheScope));
        registry.insert_builtin(ScopeKind::Singleton, Arc::new(SingletonScope::new()));
        registry.insert_builtin(ScopeKind::Thread, Arc::new(ThreadScope::new()));
        registry.insert_builtin(ScopeKind::Session, Arc::new(SessionScope::new()));
        registry
    }

    /// 创建不含任何作用域的注册表，由容器逐个挂接内置策略
    pub fn empty() -> Self {
        Self {
            caches: RwLock::new(HashMap::new()),
        }
    }

    /// 挂接内置作用域，允许容器保留具体策略的句柄
    pub(crate) fn insert_builtin(&self, kind: ScopeKind, cache: Arc<dyn ScopeCache>) {
        self.caches.write().insert(kind, cache);
    }

    /// 注册自定义作用域的缓存策略
    pub fn register(&self, kind: ScopeKind, cache: Arc<dyn ScopeCache>) -> ContainerResult<()> {
        let mut caches = self.caches.write();
        if caches.contains_key(&kind) {
            return Err(IllegalStateError::ScopeAlreadyRegistered {
                scope: kind.to_string(),
            }
            .into());
        }
        debug!(scope = %kind, "注册自定义作用域");
        caches.insert(kind, cache);
        Ok(())
    }

    /// 查询作用域对应的缓存策略
    pub fn cache_for(&self, kind: &ScopeKind) -> ContainerResult<Arc<dyn ScopeCache>> {
        self.caches
            .read()
            .get(kind)
            .cloned()
            .ok_or_else(|| {
                IllegalStateError::UnknownScope {
                    scope: kind.to_string(),
                }
                .into()
            })
    }

    /// 作用域是否已注册
    pub fn contains(&self, kind: &ScopeKind) -> bool {
        self.caches.read().contains_key(kind)
    }

    /// 遍历全部缓存策略（容器关闭时统一清空）
    pub fn all(&self) -> Vec<Arc<dyn ScopeCache>> {
        self.caches.read().values().cloned().collect()
    }
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScopeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeRegistry")
            .field("scopes", &self.caches.read().len())
            .finish()
    }
}
