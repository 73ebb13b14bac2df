//! # Container Composition
//!
//! 容器运行时的装配入口：[`RuntimeBuilder`] 收集绑定、处理器、
//! 监听器和自定义作用域，一次性构建并配置 [`ContainerRuntime`]；
//! 运行时实现异步生命周期接口，停止时关闭容器并驱逐作用域缓存。

pub mod builder;
pub mod runtime;

pub use builder::{BootstrapError, LoggingConfig, RuntimeBuilder};
pub use runtime::{ContainerRuntime, RuntimeMetrics};

use tracing_subscriber::EnvFilter;

/// 以环境变量过滤器初始化全局日志订阅器
///
/// 重复初始化（例如测试内多次调用）静默忽略。
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
