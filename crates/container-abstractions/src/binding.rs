//! 绑定描述符定义
//!
//! 绑定把查找键映射到获取实例的方式：实现类型构造、固定实例、
//! 工厂函数或远程服务标记。注册表从开放态转入已配置态后绑定不可变。

use crate::invoke::MethodHandler;
use crate::resolver::DependencyResolver;
use container_common::{
    BindingKey, ContainerResult, ErrorCause, ManagedClassMetadata, ScopeKind, SharedInstance,
};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// 类型擦除的构造函数
///
/// 接收解析器以递归解析构造依赖，产出尚未共享的实例。
pub type ConstructorFn = Arc<
    dyn Fn(&mut dyn DependencyResolver) -> ContainerResult<Box<dyn Any + Send + Sync>>
        + Send
        + Sync,
>;

/// 字段/设值注入初始化器
///
/// 在实例构造完成后、进入缓存之前执行，可继续通过解析器取得依赖。
pub type InitializerFn = Arc<
    dyn Fn(&mut dyn DependencyResolver, &mut (dyn Any + Send + Sync)) -> ContainerResult<()>
        + Send
        + Sync,
>;

/// 工厂函数
pub type ProviderFn = Arc<dyn Fn() -> Result<SharedInstance, ErrorCause> + Send + Sync>;

/// 代理适配器
///
/// 把类型擦除的转发代理包装为契约类型的值，产出即被缓存的最终实例。
pub type AdapterFn = Arc<dyn Fn(SharedInstance) -> ContainerResult<SharedInstance> + Send + Sync>;

/// 绑定目标
pub enum BindingTarget {
    /// 实现类型 - 构造函数 + 可选的初始化器序列
    Type {
        /// 构造函数
        constructor: ConstructorFn,
        /// 字段/设值注入初始化器
        initializers: Vec<InitializerFn>,
    },
    /// 固定实例 - 外部持有，容器不缓存也不发布生命周期事件
    Instance(SharedInstance),
    /// 工厂函数
    Provider(ProviderFn),
    /// 远程服务标记 - 解析时构造远程替身
    ///
    /// 给定路由地址时替身直连该地址；地址缺省时作为查找标记，
    /// 由远程调度方按契约名自行路由。
    Service {
        /// 路由地址
        address: Option<Url>,
    },
}

impl std::fmt::Debug for BindingTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Type { initializers, .. } => f
                .debug_struct("Type")
                .field("initializers", &initializers.len())
                .finish_non_exhaustive(),
            Self::Instance(_) => f.write_str("Instance"),
            Self::Provider(_) => f.write_str("Provider"),
            Self::Service { address } => f.debug_struct("Service").field("address", address).finish(),
        }
    }
}

/// 绑定描述符
pub struct Binding {
    /// 查找键
    pub key: BindingKey,
    /// 绑定目标
    pub target: BindingTarget,
    /// 作用域种类
    pub scope: ScopeKind,
    /// 受管类元数据（需要拦截/事务等横切行为时声明）
    pub managed: Option<Arc<ManagedClassMetadata>>,
    /// 受管方法的真实调用句柄，按方法名索引
    pub method_handlers: HashMap<String, MethodHandler>,
    /// 代理适配器（受管类携带行为标记时必须提供）
    pub proxy_adapter: Option<AdapterFn>,
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("target", &self.target)
            .field("scope", &self.scope)
            .field("managed", &self.managed)
            .field("method_handlers", &self.method_handlers.len())
            .finish_non_exhaustive()
    }
}

impl Binding {
    /// 绑定是否要求调用拦截
    ///
    /// 对受管类声明的行为标记（远程访问、有状态、显式拦截）求谓词。
    pub fn requires_interception(&self) -> bool {
        self.managed
            .as_ref()
            .is_some_and(|meta| meta.has_behavior_markers())
    }
}
