//! 绑定声明的流式构建器

use crate::container::CoreContainer;
use crate::proxy::ManagedProxy;
use container_abstractions::{
    AdapterFn, Binding, BindingTarget, DependencyResolver, InitializerFn, MethodArgs,
    MethodHandler, MethodOutput, RemoteStub,
};
use container_common::{
    BindingKey, BugError, ContainerError, ContainerResult, ErrorCause, ManagedClassMetadata,
    ProvisionError, ScopeKind, SharedInstance,
};
use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use url::Url;

/// 针对契约类型 `T` 的绑定构建器
///
/// 由 [`CoreContainer::bind`] 创建，链式声明绑定的各个侧面，
/// [`Binder::register`] 一次性落入注册表。中途发生的声明错误
/// （例如非法路由地址）被暂存，到注册时统一上报。
pub struct Binder<'c, T: Send + Sync + 'static> {
    container: &'c CoreContainer,
    qualifier: Option<String>,
    scope: ScopeKind,
    target: Option<BindingTarget>,
    initializers: Vec<InitializerFn>,
    managed: Option<ManagedClassMetadata>,
    handlers: HashMap<String, MethodHandler>,
    adapter: Option<AdapterFn>,
    pending: Option<ContainerError>,
    _contract: PhantomData<fn() -> T>,
}

impl<'c, T: Send + Sync + 'static> Binder<'c, T> {
    pub(crate) fn new(container: &'c CoreContainer) -> Self {
        Self {
            container,
            qualifier: None,
            scope: ScopeKind::NoCache,
            target: None,
            initializers: Vec::new(),
            managed: None,
            handlers: HashMap::new(),
            adapter: None,
            pending: None,
            _contract: PhantomData,
        }
    }

    /// 附加限定名，同一契约的多个绑定以限定名区分
    pub fn named(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// 声明作用域，缺省为无缓存
    pub fn in_scope(mut self, scope: ScopeKind) -> Self {
        self.scope = scope;
        self
    }

    /// 绑定到实现类型的构造函数
    ///
    /// 构造期可通过解析器递归解析依赖。无代理适配器时实现类型
    /// 就是契约类型 `T`；有适配器时构造产出只作为代理的转发目标。
    pub fn to<R, F>(mut self, constructor: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&mut dyn DependencyResolver) -> ContainerResult<R> + Send + Sync + 'static,
    {
        self.target = Some(BindingTarget::Type {
            constructor: Arc::new(move |resolver| {
                Ok(Box::new(constructor(resolver)?) as Box<dyn Any + Send + Sync>)
            }),
            initializers: Vec::new(),
        });
        self
    }

    /// 绑定到外部持有的固定实例
    ///
    /// 固定实例不进作用域缓存，也不发布生命周期事件。
    pub fn instance(mut self, value: T) -> Self {
        self.target = Some(BindingTarget::Instance(Arc::new(value)));
        self
    }

    /// 绑定到工厂函数
    pub fn provider<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<T, ErrorCause> + Send + Sync + 'static,
    {
        self.target = Some(BindingTarget::Provider(Arc::new(move || {
            Ok(Arc::new(factory()?) as SharedInstance)
        })));
        self
    }

    /// 绑定为远程服务查找标记，路由交给远程调度方
    pub fn service(mut self) -> Self {
        self.target = Some(BindingTarget::Service { address: None });
        self
    }

    /// 绑定为指定路由地址的远程服务
    pub fn on(mut self, address: &str) -> Self {
        match Url::parse(address) {
            Ok(url) => {
                self.target = Some(BindingTarget::Service { address: Some(url) });
            }
            Err(source) => {
                self.pending = Some(
                    ProvisionError::InvalidRoutingAddress {
                        address: address.to_string(),
                        source,
                    }
                    .into(),
                );
            }
        }
        self
    }

    /// 声明受管类元数据
    pub fn managed(mut self, metadata: ManagedClassMetadata) -> Self {
        self.managed = Some(metadata);
        self
    }

    /// 挂接受管方法的真实调用句柄
    pub fn handler<F>(mut self, method: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&SharedInstance, MethodArgs) -> Result<MethodOutput, ErrorCause>
            + Send
            + Sync
            + 'static,
    {
        self.handlers.insert(method.into(), Arc::new(handler));
        self
    }

    /// 挂接代理适配器
    ///
    /// 受管类携带行为标记时，解析产出转发代理，适配器把代理
    /// 包装为契约类型的值，包装结果才是进入作用域缓存的实例。
    pub fn proxied<F>(mut self, adapt: F) -> Self
    where
        F: Fn(ManagedProxy) -> T + Send + Sync + 'static,
    {
        self.adapter = Some(Arc::new(move |erased: SharedInstance| {
            let proxy = erased
                .downcast::<ManagedProxy>()
                .map_err(|_| BugError::new("代理适配器收到的不是转发代理"))?;
            Ok(Arc::new(adapt((*proxy).clone())) as SharedInstance)
        }));
        self
    }

    /// 挂接远程替身适配器
    ///
    /// 远程服务绑定解析产出远程替身，适配器把替身包装为契约
    /// 类型的值，业务调用经替身派发给远程调度器。
    pub fn remote<F>(mut self, adapt: F) -> Self
    where
        F: Fn(Arc<RemoteStub>) -> T + Send + Sync + 'static,
    {
        self.adapter = Some(Arc::new(move |erased: SharedInstance| {
            let stub = erased
                .downcast::<RemoteStub>()
                .map_err(|_| BugError::new("远程适配器收到的不是远程替身"))?;
            Ok(Arc::new(adapt(stub)) as SharedInstance)
        }));
        self
    }

    /// 追加构造后初始化器，用于字段/设值注入
    ///
    /// `R` 是构造函数产出的实现类型。
    pub fn initialize<R, F>(mut self, initializer: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&mut dyn DependencyResolver, &mut R) -> ContainerResult<()> + Send + Sync + 'static,
    {
        self.initializers.push(Arc::new(move |resolver, raw| {
            let typed = raw
                .downcast_mut::<R>()
                .ok_or_else(|| BugError::new("初始化器收到非预期类型的实例"))?;
            initializer(resolver, typed)
        }));
        self
    }

    /// 完成声明并落入注册表
    pub fn register(self) -> ContainerResult<()> {
        if let Some(err) = self.pending {
            return Err(err);
        }
        let key = match self.qualifier {
            Some(q) => BindingKey::named::<T>(q),
            None => BindingKey::of::<T>(),
        };
        let mut target = self
            .target
            .ok_or_else(|| BugError::new(format!("绑定 {key} 未声明目标")))?;
        match &mut target {
            BindingTarget::Type { initializers, .. } => {
                initializers.extend(self.initializers);
            }
            _ if !self.initializers.is_empty() => {
                return Err(BugError::new(format!(
                    "绑定 {key} 的初始化器只能用于实现类型目标"
                ))
                .into());
            }
            _ => {}
        }
        let managed = self.managed.map(Arc::new);
        if managed
            .as_ref()
            .is_some_and(|meta| meta.has_behavior_markers())
            && self.adapter.is_none()
            && !matches!(target, BindingTarget::Service { .. })
        {
            return Err(BugError::new(format!(
                "绑定 {key} 的受管类携带行为标记但未提供代理适配器"
            ))
            .into());
        }
        self.container.register_binding(Binding {
            key,
            target,
            scope: self.scope,
            managed,
            method_handlers: self.handlers,
            proxy_adapter: self.adapter,
        })
    }
}
