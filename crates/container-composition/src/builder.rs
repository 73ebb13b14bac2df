//! 运行时构建器

use crate::runtime::ContainerRuntime;
use container_abstractions::{
    ContainerConfig, InvocationProcessor, RemoteInvoker, ScopeCache,
};
use container_common::{
    ContainerError, ContainerResult, InstanceLifecycleListener, ScopeKind,
};
use container_impl::CoreContainer;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// 装配失败错误
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// 容器声明或配置失败
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// 日志订阅器初始化失败
    #[error("日志初始化失败: {message}")]
    LoggingInit {
        /// 失败描述
        message: String,
    },
}

/// 绑定装载模块
///
/// 一个模块对应一批内聚的绑定声明，装配期按注册顺序执行。
pub type BindingModule = Box<dyn FnOnce(&CoreContainer) -> ContainerResult<()> + Send>;

/// 运行时构建器
///
/// 建造者模式收集容器的全部协作方，`build()` 一次性完成
/// 声明、配置并产出可启停的运行时。
pub struct RuntimeBuilder {
    config: ContainerConfig,
    modules: Vec<BindingModule>,
    processors: Vec<Arc<dyn InvocationProcessor>>,
    listeners: Vec<Arc<dyn InstanceLifecycleListener>>,
    scopes: Vec<(ScopeKind, Arc<dyn ScopeCache>)>,
    remote_invoker: Option<Arc<dyn RemoteInvoker>>,
    logging_enabled: bool,
    logging_config: LoggingConfig,
}

impl RuntimeBuilder {
    /// 创建新的运行时构建器
    pub fn new() -> Self {
        Self {
            config: ContainerConfig::default(),
            modules: Vec::new(),
            processors: Vec::new(),
            listeners: Vec::new(),
            scopes: Vec::new(),
            remote_invoker: None,
            logging_enabled: false,
            logging_config: LoggingConfig::default(),
        }
    }

    /// 指定容器配置
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 添加绑定装载模块
    pub fn add_module<F>(mut self, module: F) -> Self
    where
        F: FnOnce(&CoreContainer) -> ContainerResult<()> + Send + 'static,
    {
        self.modules.push(Box::new(module));
        self
    }

    /// 添加调用处理器
    pub fn add_processor(mut self, processor: Arc<dyn InvocationProcessor>) -> Self {
        debug!(processor = processor.name(), "添加调用处理器");
        self.processors.push(processor);
        self
    }

    /// 添加实例生命周期监听器
    pub fn add_listener(mut self, listener: Arc<dyn InstanceLifecycleListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// 注册自定义作用域
    pub fn add_scope(mut self, kind: ScopeKind, cache: Arc<dyn ScopeCache>) -> Self {
        self.scopes.push((kind, cache));
        self
    }

    /// 挂接远程调度器
    pub fn with_remote_invoker(mut self, invoker: Arc<dyn RemoteInvoker>) -> Self {
        self.remote_invoker = Some(invoker);
        self
    }

    /// 配置日志初始化
    ///
    /// 缺省不初始化日志, 避免测试环境中与既有订阅器冲突。
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true;
        self
    }

    /// 构建并配置运行时
    pub fn build(self) -> Result<ContainerRuntime, BootstrapError> {
        info!("开始装配容器运行时");

        if self.logging_enabled {
            self.initialize_logging()?;
        }

        let container = CoreContainer::with_config(self.config);
        for (kind, cache) in self.scopes {
            container.bind_scope(kind, cache)?;
        }
        for processor in self.processors {
            container.register_processor(processor)?;
        }
        for listener in self.listeners {
            container.register_listener(listener)?;
        }
        if let Some(invoker) = self.remote_invoker {
            container.set_remote_invoker(invoker)?;
        }
        for module in self.modules {
            module(&container)?;
        }
        container.configure()?;

        info!("容器运行时装配完成");
        Ok(ContainerRuntime::new(container))
    }

    fn initialize_logging(&self) -> Result<(), BootstrapError> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.logging_config.level)
            .with_target(self.logging_config.show_target)
            .with_thread_ids(self.logging_config.show_thread_ids);

        if self.logging_config.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| BootstrapError::LoggingInit {
            message: e.to_string(),
        })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            json_format: false,
        }
    }

    /// 生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            json_format: true,
        }
    }
}
