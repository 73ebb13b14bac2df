//! # Container Impl
//!
//! 依赖注入容器的具体实现：绑定解析/作用域引擎与方法调用处理链。
//!
//! ## 两个核心引擎
//!
//! - **绑定解析/作用域引擎** - [`BindingRegistry`] 持有声明的绑定，
//!   [`ResolveSession`] 递归解析依赖图并检测循环依赖，
//!   [`scopes`] 下的缓存策略保证作用域内的实例身份。
//! - **调用处理链** - [`ManagedClass`]/[`ManagedMethod`] 目录在配置期
//!   构建，[`ManagedProxy`] 把业务调用转发到按优先级排序的处理器链，
//!   [`TransactionProcessor`] 是链上事务边界的具体处理器。
//!
//! [`CoreContainer`] 作为组合根把上述部件装配在一起并对外暴露取用 API。

pub mod binder;
pub mod chain;
pub mod container;
pub mod managed;
pub mod processors;
pub mod proxy;
pub mod registry;
pub mod resolver;
pub mod scopes;

pub use binder::Binder;
pub use chain::ChainExecutor;
pub use container::CoreContainer;
pub use managed::{ManagedCatalog, ManagedClass, ManagedMethod};
pub use processors::TransactionProcessor;
pub use proxy::ManagedProxy;
pub use registry::BindingRegistry;
pub use resolver::ResolveSession;
pub use scopes::{NoCacheScope, ScopeRegistry, SessionScope, SingletonScope, ThreadScope};
