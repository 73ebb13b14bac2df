//! 容器配置与统计信息

use serde::Serialize;

/// 容器配置
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 是否启用统计采集
    pub enable_stats: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_resolution_depth: 100,
            enable_stats: true,
        }
    }
}

/// 容器统计信息快照
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContainerStats {
    /// 已注册绑定数量
    pub registered_bindings: usize,
    /// 受管类数量
    pub managed_classes: usize,
    /// 解析调用总次数
    pub resolutions: usize,
    /// 新构造实例数量
    pub constructed_instances: usize,
    /// 活跃单例数量
    pub active_singletons: usize,
    /// 解析错误数量
    pub resolution_errors: usize,
}
