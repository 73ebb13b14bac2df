//! 容器组合根

use crate::binder::Binder;
use crate::managed::{ManagedCatalog, ManagedClass};
use crate::registry::BindingRegistry;
use crate::resolver::ResolveSession;
use crate::scopes::{NoCacheScope, ScopeRegistry, SessionScope, SingletonScope, ThreadScope};
use container_abstractions::{
    Binding, ContainerConfig, ContainerStats, DependencyResolver, InvocationProcessor,
    RemoteInvoker, ScopeCache,
};
use container_common::{
    downcast_instance, BindingKey, ConfinementToken, ContainerError, ContainerResult,
    IllegalStateError, InstanceEvent, InstanceEventBroker, InstanceLifecycleListener, ScopeKind,
    SharedInstance,
};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use tracing::{debug, info};

#[derive(Default)]
struct StatCounters {
    resolutions: AtomicUsize,
    constructed: AtomicUsize,
    errors: AtomicUsize,
}

/// 依赖注入容器
///
/// 组合根：持有绑定注册表、作用域注册表、受管类目录、处理器列表、
/// 生命周期事件分发器和远程调度器。声明窗口内收集绑定与协作方，
/// `configure()` 之后注册表只读，开始接受解析请求。
pub struct CoreContainer {
    registry: BindingRegistry,
    scopes: ScopeRegistry,
    singletons: Arc<SingletonScope>,
    config: ContainerConfig,
    processors: RwLock<Vec<Arc<dyn InvocationProcessor>>>,
    broker: RwLock<InstanceEventBroker>,
    catalog: RwLock<ManagedCatalog>,
    remote_invoker: RwLock<Option<Arc<dyn RemoteInvoker>>>,
    sessions: DashMap<ThreadId, ConfinementToken>,
    stats: StatCounters,
}

impl CoreContainer {
    /// 创建缺省配置的容器
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 以指定配置创建容器
    pub fn with_config(config: ContainerConfig) -> Self {
        let scopes = ScopeRegistry::empty();
        let singletons = Arc::new(SingletonScope::new());
        scopes.insert_builtin(ScopeKind::NoCache, Arc::new(NoCacheScope));
        scopes.insert_builtin(
            ScopeKind::Singleton,
            Arc::clone(&singletons) as Arc<dyn ScopeCache>,
        );
        scopes.insert_builtin(ScopeKind::Thread, Arc::new(ThreadScope::new()));
        scopes.insert_builtin(ScopeKind::Session, Arc::new(SessionScope::new()));
        Self {
            registry: BindingRegistry::new(),
            scopes,
            singletons,
            config,
            processors: RwLock::new(Vec::new()),
            broker: RwLock::new(InstanceEventBroker::new()),
            catalog: RwLock::new(ManagedCatalog::default()),
            remote_invoker: RwLock::new(None),
            sessions: DashMap::new(),
            stats: StatCounters::default(),
        }
    }

    // ---- 声明窗口 ----

    /// 开始声明契约类型 `T` 的绑定
    pub fn bind<T: Send + Sync + 'static>(&self) -> Binder<'_, T> {
        Binder::new(self)
    }

    pub(crate) fn register_binding(&self, binding: Binding) -> ContainerResult<()> {
        self.registry.bind(binding)
    }

    /// 注册自定义作用域的缓存策略
    pub fn bind_scope(&self, kind: ScopeKind, cache: Arc<dyn ScopeCache>) -> ContainerResult<()> {
        self.registry.ensure_open()?;
        self.scopes.register(kind, cache)
    }

    /// 注册调用处理器
    pub fn register_processor(
        &self,
        processor: Arc<dyn InvocationProcessor>,
    ) -> ContainerResult<()> {
        self.registry.ensure_open()?;
        debug!(processor = processor.name(), priority = processor.priority(), "注册调用处理器");
        self.processors.write().push(processor);
        Ok(())
    }

    /// 注册实例生命周期监听器
    pub fn register_listener(
        &self,
        listener: Arc<dyn InstanceLifecycleListener>,
    ) -> ContainerResult<()> {
        self.registry.ensure_open()?;
        self.broker.write().register(listener);
        Ok(())
    }

    /// 挂接远程调度器
    pub fn set_remote_invoker(&self, invoker: Arc<dyn RemoteInvoker>) -> ContainerResult<()> {
        self.registry.ensure_open()?;
        *self.remote_invoker.write() = Some(invoker);
        Ok(())
    }

    /// 结束声明窗口
    ///
    /// 校验全部绑定引用的作用域已注册，装配受管类目录与调用链，
    /// 然后冻结注册表。重复调用以非法状态错误失败。
    pub fn configure(&self) -> ContainerResult<()> {
        self.registry.ensure_open()?;
        let bindings = self.registry.snapshot();
        for binding in &bindings {
            if !self.scopes.contains(&binding.scope) {
                return Err(IllegalStateError::UnknownScope {
                    scope: binding.scope.to_string(),
                }
                .into());
            }
        }
        let catalog = ManagedCatalog::build(&bindings, &self.processors.read())?;
        info!(
            bindings = bindings.len(),
            managed_classes = catalog.len(),
            "容器完成配置"
        );
        *self.catalog.write() = catalog;
        self.registry.configure()
    }

    // ---- 取用 ----

    /// 解析契约类型 `T` 的实例
    pub fn get_instance<T: Send + Sync + 'static>(&self) -> ContainerResult<Arc<T>> {
        let key = BindingKey::of::<T>();
        let erased = self.resolve_erased(&key)?;
        Ok(downcast_instance(&key, erased)?)
    }

    /// 解析带限定名的实例
    pub fn get_instance_named<T: Send + Sync + 'static>(
        &self,
        qualifier: impl Into<String>,
    ) -> ContainerResult<Arc<T>> {
        let key = BindingKey::named::<T>(qualifier);
        let erased = self.resolve_erased(&key)?;
        Ok(downcast_instance(&key, erased)?)
    }

    /// 解析可选实例
    ///
    /// 供给类错误（绑定缺失、构造失败）映射为 `None`，
    /// 循环依赖与状态类错误照常上报。
    pub fn get_optional_instance<T: Send + Sync + 'static>(
        &self,
    ) -> ContainerResult<Option<Arc<T>>> {
        match self.get_instance::<T>() {
            Ok(instance) => Ok(Some(instance)),
            Err(ContainerError::Provision(_)) => Ok(None),
            Err(other) => Err(other),
        }
    }

    /// 只读查询作用域缓存中已存在的实例, 从不触发构造
    pub fn get_scope_instance<T: Send + Sync + 'static>(
        &self,
        scope: &ScopeKind,
    ) -> ContainerResult<Option<Arc<T>>> {
        self.registry.ensure_configured("get_scope_instance")?;
        let key = BindingKey::of::<T>();
        let cache = self.scopes.cache_for(scope)?;
        let token = self.current_session();
        match cache.peek(&key, token.as_ref()) {
            Some(erased) => Ok(Some(downcast_instance(&key, erased)?)),
            None => Ok(None),
        }
    }

    /// 按绑定键解析类型擦除的实例
    pub fn resolve_erased(&self, key: &BindingKey) -> ContainerResult<SharedInstance> {
        self.registry.ensure_configured("get_instance")?;
        let mut session = ResolveSession::new(self);
        session.resolve_key(key)
    }

    // ---- 会话边界 ----

    /// 为当前线程开启会话边界
    pub fn begin_session(&self, name: impl Into<String>) -> ContainerResult<ConfinementToken> {
        self.registry.ensure_configured("begin_session")?;
        let thread_id = thread::current().id();
        if let Some(active) = self.sessions.get(&thread_id) {
            return Err(IllegalStateError::SessionAlreadyActive {
                session: active.value().to_string(),
            }
            .into());
        }
        let token = ConfinementToken::new(name);
        debug!(session = %token, "开启会话边界");
        self.sessions.insert(thread_id, token.clone());
        Ok(token)
    }

    /// 当前线程激活的会话令牌
    pub fn current_session(&self) -> Option<ConfinementToken> {
        self.sessions
            .get(&thread::current().id())
            .map(|entry| entry.value().clone())
    }

    /// 结束会话边界, 驱逐会话内实例并发布出作用域事件
    pub fn end_session(&self, token: &ConfinementToken) -> ContainerResult<()> {
        self.registry.ensure_configured("end_session")?;
        let thread_id = thread::current().id();
        match self.sessions.get(&thread_id) {
            Some(active) if active.value() == token => {}
            _ => return Err(IllegalStateError::NoActiveSession.into()),
        }
        self.sessions.remove(&thread_id);
        let cache = self.scopes.cache_for(&ScopeKind::Session)?;
        let evicted = cache.end(token);
        debug!(session = %token, evicted = evicted.len(), "结束会话边界");
        let broker = self.broker.read();
        for (key, instance) in evicted {
            broker.fire_out_of_scope(&InstanceEvent { key, instance });
        }
        Ok(())
    }

    // ---- 关闭 ----

    /// 关闭容器
    ///
    /// 清空全部作用域缓存并逐实例发布出作用域事件，
    /// 此后任何声明与取用都以关闭态错误失败。
    pub fn close(&self) -> ContainerResult<()> {
        self.registry.close("close")?;
        self.sessions.clear();
        let broker = self.broker.read();
        let mut evicted_total = 0_usize;
        for cache in self.scopes.all() {
            for (key, instance) in cache.drain() {
                evicted_total += 1;
                broker.fire_out_of_scope(&InstanceEvent { key, instance });
            }
        }
        info!(evicted = evicted_total, "容器关闭, 作用域缓存已清空");
        Ok(())
    }

    // ---- 观测 ----

    /// 当前统计快照
    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            registered_bindings: self.registry.len(),
            managed_classes: self.catalog.read().len(),
            resolutions: self.stats.resolutions.load(Ordering::Relaxed),
            constructed_instances: self.stats.constructed.load(Ordering::Relaxed),
            active_singletons: self.singletons.len(),
            resolution_errors: self.stats.errors.load(Ordering::Relaxed),
        }
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    // ---- 解析器协作接口 ----

    pub(crate) fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    pub(crate) fn scopes(&self) -> &ScopeRegistry {
        &self.scopes
    }

    pub(crate) fn managed_class(&self, key: &BindingKey) -> Option<Arc<ManagedClass>> {
        self.catalog.read().class(key).cloned()
    }

    pub(crate) fn remote_invoker(&self) -> Option<Arc<dyn RemoteInvoker>> {
        self.remote_invoker.read().clone()
    }

    pub(crate) fn fire_created(&self, event: &InstanceEvent) {
        self.broker.read().fire_created(event);
    }

    pub(crate) fn note_resolution(&self) {
        if self.config.enable_stats {
            self.stats.resolutions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn note_constructed(&self) {
        if self.config.enable_stats {
            self.stats.constructed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn note_resolution_error(&self) {
        if self.config.enable_stats {
            self.stats.errors.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl Default for CoreContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CoreContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreContainer")
            .field("state", &self.registry.state())
            .field("bindings", &self.registry.len())
            .finish_non_exhaustive()
    }
}
