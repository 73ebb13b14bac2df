//! 依赖解析会话

use crate::container::CoreContainer;
use crate::proxy::ManagedProxy;
use container_abstractions::{Binding, BindingTarget, DependencyResolver, RemoteStub};
use container_common::{
    BindingKey, BugError, CircularDependencyError, ContainerResult, InstanceEvent, ProvisionError,
    SharedInstance,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// 单次顶层解析的会话
///
/// 承载本次调用树的解析链路，链路随会话显式传递而非挂在线程状态上。
/// 同一个键在链路上重复入栈即构成循环依赖，在构造发生之前检出。
pub struct ResolveSession<'c> {
    container: &'c CoreContainer,
    chain: Vec<BindingKey>,
}

impl<'c> ResolveSession<'c> {
    pub(crate) fn new(container: &'c CoreContainer) -> Self {
        Self {
            container,
            chain: Vec::new(),
        }
    }

    fn chain_display(&self, closing: &BindingKey) -> String {
        let mut parts: Vec<String> = self.chain.iter().map(|k| k.short_name().to_string()).collect();
        parts.push(closing.short_name().to_string());
        parts.join(" -> ")
    }

    fn resolve_inner(&mut self, key: &BindingKey) -> ContainerResult<SharedInstance> {
        let limit = self.container.config().max_resolution_depth;
        if self.chain.len() >= limit {
            return Err(ProvisionError::DepthExceeded {
                key: key.to_string(),
                limit,
            }
            .into());
        }
        if self.chain.contains(key) {
            return Err(CircularDependencyError {
                key: key.to_string(),
                chain: self.chain_display(key),
            }
            .into());
        }
        let binding = self
            .container
            .registry()
            .lookup(key)
            .ok_or_else(|| ProvisionError::NoBinding {
                key: key.to_string(),
            })?;
        self.chain.push(key.clone());
        trace!(key = %key, depth = self.chain.len(), "解析入栈");
        let result = self.resolve_binding(&binding);
        self.chain.pop();
        result
    }

    fn resolve_binding(&mut self, binding: &Arc<Binding>) -> ContainerResult<SharedInstance> {
        // 固定实例直接透传：不进缓存、不发布事件
        if let BindingTarget::Instance(value) = &binding.target {
            return Ok(Arc::clone(value));
        }
        let cache = self.container.scopes().cache_for(&binding.scope)?;
        let token = self.container.current_session();
        let mut factory = || self.construct(binding);
        let provided = cache.provide(&binding.key, token.as_ref(), &mut factory)?;
        if provided.fresh {
            self.container.note_constructed();
            // 远程替身不发布创建事件
            if !matches!(binding.target, BindingTarget::Service { .. }) {
                self.container.fire_created(&InstanceEvent {
                    key: binding.key.clone(),
                    instance: Arc::clone(&provided.value),
                });
            }
        }
        Ok(provided.value)
    }

    /// 执行真实构造，产出进入作用域缓存的最终实例
    ///
    /// 受管类携带行为标记时产出是经适配的转发代理，
    /// 裸实例只作为代理的转发目标存在。
    fn construct(&mut self, binding: &Arc<Binding>) -> ContainerResult<SharedInstance> {
        let value: SharedInstance = match &binding.target {
            BindingTarget::Type {
                constructor,
                initializers,
            } => {
                let mut raw = constructor(self)?;
                for initializer in initializers {
                    initializer(self, raw.as_mut())?;
                }
                Arc::from(raw)
            }
            BindingTarget::Provider(factory) => factory().map_err(|source| {
                ProvisionError::creation_failed(binding.key.to_string(), source)
            })?,
            BindingTarget::Service { address } => {
                let invoker = self.container.remote_invoker().ok_or_else(|| {
                    ProvisionError::creation_failed(
                        binding.key.to_string(),
                        "解析远程服务绑定前必须注册远程调度器",
                    )
                })?;
                debug!(key = %binding.key, address = ?address, "构造远程替身");
                let stub = RemoteStub::new(binding.key.short_name(), address.clone(), invoker);
                let erased = Arc::new(stub) as SharedInstance;
                return match &binding.proxy_adapter {
                    Some(adapt) => adapt(erased),
                    None => Ok(erased),
                };
            }
            BindingTarget::Instance(_) => {
                return Err(BugError::new("固定实例绑定不应进入构造路径").into());
            }
        };
        if binding.requires_interception() {
            let class = self.container.managed_class(&binding.key).ok_or_else(|| {
                BugError::new(format!("绑定 {} 缺少受管类目录条目", binding.key))
            })?;
            let adapt = binding.proxy_adapter.as_ref().ok_or_else(|| {
                BugError::new(format!("绑定 {} 要求拦截但没有代理适配器", binding.key))
            })?;
            let proxy = ManagedProxy::new(class, value);
            return adapt(Arc::new(proxy) as SharedInstance);
        }
        Ok(value)
    }
}

impl DependencyResolver for ResolveSession<'_> {
    fn resolve_key(&mut self, key: &BindingKey) -> ContainerResult<SharedInstance> {
        self.container.note_resolution();
        let result = self.resolve_inner(key);
        if result.is_err() {
            self.container.note_resolution_error();
        }
        result
    }

    fn depth(&self) -> usize {
        self.chain.len()
    }
}
