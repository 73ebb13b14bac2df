//! # Container Common
//!
//! 这个 crate 提供了 Tessera 容器运行时的公共 traits 和词汇表。
//!
//! ## 核心组件
//!
//! - [`BindingKey`] - 绑定查找键（契约类型 + 可选限定名）
//! - [`ManagedClassMetadata`] - 受管类元数据描述符
//! - [`ScopeKind`] - 作用域种类
//! - [`InstanceLifecycleListener`] - 实例生命周期监听器
//! - [`ContainerError`] - 统一错误分类
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统的编译时安全
//! - 元数据在配置期一次性收集，运行期只读
//! - 显式注册优于反射扫描

pub mod errors;
pub mod key;
pub mod lifecycle;
pub mod metadata;
pub mod scope;

pub use errors::*;
pub use key::*;
pub use lifecycle::*;
pub use metadata::*;
pub use scope::*;
