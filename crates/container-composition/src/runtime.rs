//! 容器运行时

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use container_common::{Lifecycle, LifecycleState};
use container_impl::CoreContainer;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// 运行时指标
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuntimeMetrics {
    /// 启动时间
    pub start_time: Option<DateTime<Utc>>,
    /// 停止时间
    pub stop_time: Option<DateTime<Utc>>,
}

/// 容器运行时
///
/// 持有已配置的容器并为其提供异步启停生命周期；
/// 停止即关闭容器，单例与各作用域缓存随之驱逐。
pub struct ContainerRuntime {
    container: Arc<CoreContainer>,
    state: RwLock<LifecycleState>,
    metrics: RwLock<RuntimeMetrics>,
}

impl ContainerRuntime {
    pub(crate) fn new(container: CoreContainer) -> Self {
        Self {
            container: Arc::new(container),
            state: RwLock::new(LifecycleState::Uninitialized),
            metrics: RwLock::new(RuntimeMetrics::default()),
        }
    }

    /// 运行时持有的容器
    pub fn container(&self) -> &Arc<CoreContainer> {
        &self.container
    }

    /// 当前指标快照
    pub async fn metrics(&self) -> RuntimeMetrics {
        self.metrics.read().await.clone()
    }
}

impl std::fmt::Debug for ContainerRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerRuntime")
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Lifecycle for ContainerRuntime {
    async fn on_start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        {
            let mut state = self.state.write().await;
            if *state == LifecycleState::Running {
                return Err("容器运行时已在运行".into());
            }
            *state = LifecycleState::Initializing;
        }
        self.metrics.write().await.start_time = Some(Utc::now());
        *self.state.write().await = LifecycleState::Running;
        info!("容器运行时已启动");
        Ok(())
    }

    async fn on_stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        *self.state.write().await = LifecycleState::Stopping;
        if let Err(e) = self.container.close() {
            error!(error = %e, "容器关闭失败");
            *self.state.write().await = LifecycleState::Error;
            return Err(Box::new(e));
        }
        self.metrics.write().await.stop_time = Some(Utc::now());
        *self.state.write().await = LifecycleState::Stopped;
        info!("容器运行时已停止");
        Ok(())
    }

    async fn lifecycle_state(&self) -> LifecycleState {
        *self.state.read().await
    }
}
