//! 实例与容器生命周期管理

use crate::key::{BindingKey, SharedInstance};
use async_trait::async_trait;
use tracing::debug;

/// 实例生命周期事件
///
/// 事件携带绑定键和类型擦除的实例句柄，
/// 监听器在构造/驱逐线程上被同步调用。
#[derive(Clone)]
pub struct InstanceEvent {
    /// 实例对应的绑定键
    pub key: BindingKey,
    /// 实例句柄
    pub instance: SharedInstance,
}

impl std::fmt::Debug for InstanceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceEvent")
            .field("key", &self.key)
            .field("instance", &"<shared>")
            .finish()
    }
}

/// 实例生命周期监听器 SPI
///
/// 上层在此运行 post-construct/pre-destroy 逻辑，解析器本身对其内容无感知。
pub trait InstanceLifecycleListener: Send + Sync {
    /// 实例被新建后触发，缓存命中、固定实例和远程替身不触发
    fn on_instance_created(&self, event: &InstanceEvent);

    /// 实例随作用域边界结束被驱逐时触发
    fn on_instance_out_of_scope(&self, event: &InstanceEvent);
}

/// 实例生命周期事件分发器
///
/// 由容器持有并传递给解析器/作用域，不走全局注册表。
#[derive(Default)]
pub struct InstanceEventBroker {
    listeners: Vec<std::sync::Arc<dyn InstanceLifecycleListener>>,
}

impl InstanceEventBroker {
    /// 创建新的分发器
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册监听器
    pub fn register(&mut self, listener: std::sync::Arc<dyn InstanceLifecycleListener>) {
        self.listeners.push(listener);
    }

    /// 分发创建事件
    pub fn fire_created(&self, event: &InstanceEvent) {
        debug!(key = %event.key, "实例创建事件");
        for listener in &self.listeners {
            listener.on_instance_created(event);
        }
    }

    /// 分发出作用域事件
    pub fn fire_out_of_scope(&self, event: &InstanceEvent) {
        debug!(key = %event.key, "实例出作用域事件");
        for listener in &self.listeners {
            listener.on_instance_out_of_scope(event);
        }
    }

    /// 已注册的监听器数量
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for InstanceEventBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceEventBroker")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// 容器配置状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    /// 开放 - 接受绑定声明
    Open,
    /// 已配置 - 绑定只读，接受解析请求
    Configured,
    /// 已关闭 - 单例已驱逐，拒绝一切操作
    Closed,
}

/// 组件生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// 未初始化
    #[default]
    Uninitialized,
    /// 初始化中
    Initializing,
    /// 运行中
    Running,
    /// 停止中
    Stopping,
    /// 已停止
    Stopped,
    /// 错误状态
    Error,
}

/// 组件生命周期管理 trait
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// 组件启动
    async fn on_start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// 组件停止
    async fn on_stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// 获取生命周期状态
    async fn lifecycle_state(&self) -> LifecycleState;
}
