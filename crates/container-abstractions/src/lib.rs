//! # Container Abstractions
//!
//! 绑定声明、作用域缓存与方法调用的抽象层，
//! 定义容器核心引擎与可插拔协作方之间的接口。
//!
//! ## 核心接口
//!
//! - [`Binding`] / [`BindingTarget`] - 绑定描述符
//! - [`DependencyResolver`] - 依赖解析接口
//! - [`ScopeCache`] - 作用域缓存策略接口
//! - [`InvocationProcessor`] - 调用处理器 SPI
//! - [`RemoteInvoker`] - 远程调度 SPI
//! - [`TransactionalResource`] - 事务资源 SPI

pub mod binding;
pub mod container;
pub mod invoke;
pub mod remote;
pub mod resolver;
pub mod scope;
pub mod transaction;

pub use binding::*;
pub use container::*;
pub use invoke::*;
pub use remote::*;
pub use resolver::*;
pub use scope::*;
pub use transaction::*;
