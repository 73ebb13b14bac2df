//! 绑定注册表实现
//!
//! 注册表持有声明的绑定映射并拥有 configure-once 生命周期：
//! 开放态接受声明，`configure()` 后只读，重复配置视为非法状态。

use container_abstractions::Binding;
use container_common::{BindingKey, ContainerResult, ContainerState, IllegalStateError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// 绑定注册表
#[derive(Debug)]
pub struct BindingRegistry {
    state: RwLock<ContainerState>,
    bindings: RwLock<HashMap<BindingKey, Arc<Binding>>>,
}

impl BindingRegistry {
    /// 创建开放态的注册表
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ContainerState::Open),
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// 当前生命周期状态
    pub fn state(&self) -> ContainerState {
        *self.state.read()
    }

    /// 注册一个绑定，注册表必须处于开放态
    pub fn bind(&self, binding: Binding) -> ContainerResult<()> {
        self.ensure_open()?;
        let mut bindings = self.bindings.write();
        if bindings.contains_key(&binding.key) {
            return Err(IllegalStateError::DuplicateBinding {
                key: binding.key.to_string(),
            }
            .into());
        }
        debug!(key = %binding.key, scope = %binding.scope, "注册绑定");
        bindings.insert(binding.key.clone(), Arc::new(binding));
        Ok(())
    }

    /// 关闭声明窗口，绑定自此只读
    ///
    /// 幂等保护：第二次调用以非法状态错误失败。
    pub fn configure(&self) -> ContainerResult<()> {
        let mut state = self.state.write();
        match *state {
            ContainerState::Open => {
                *state = ContainerState::Configured;
                info!(bindings = self.bindings.read().len(), "绑定注册表完成配置");
                Ok(())
            }
            ContainerState::Configured => Err(IllegalStateError::AlreadyConfigured.into()),
            ContainerState::Closed => Err(IllegalStateError::Closed {
                operation: "configure".to_string(),
            }
            .into()),
        }
    }

    /// 转入关闭态
    pub fn close(&self, operation: &str) -> ContainerResult<()> {
        let mut state = self.state.write();
        match *state {
            ContainerState::Configured => {
                *state = ContainerState::Closed;
                Ok(())
            }
            ContainerState::Open => Err(IllegalStateError::NotConfigured {
                operation: operation.to_string(),
            }
            .into()),
            ContainerState::Closed => Err(IllegalStateError::Closed {
                operation: operation.to_string(),
            }
            .into()),
        }
    }

    /// 查询绑定
    pub fn lookup(&self, key: &BindingKey) -> Option<Arc<Binding>> {
        self.bindings.read().get(key).cloned()
    }

    /// 已注册的绑定数量
    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    /// 注册表是否为空
    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }

    /// 配置期遍历的绑定快照
    pub fn snapshot(&self) -> Vec<Arc<Binding>> {
        self.bindings.read().values().cloned().collect()
    }

    /// 校验处于开放态
    pub fn ensure_open(&self) -> ContainerResult<()> {
        match *self.state.read() {
            ContainerState::Open => Ok(()),
            ContainerState::Configured => Err(IllegalStateError::AlreadyConfigured.into()),
            ContainerState::Closed => Err(IllegalStateError::Closed {
                operation: "bind".to_string(),
            }
            .into()),
        }
    }

    /// 校验处于已配置态
    pub fn ensure_configured(&self, operation: &str) -> ContainerResult<()> {
        match *self.state.read() {
            ContainerState::Configured => Ok(()),
            ContainerState::Open => Err(IllegalStateError::NotConfigured {
                operation: operation.to_string(),
            }
            .into()),
            ContainerState::Closed => Err(IllegalStateError::Closed {
                operation: operation.to_string(),
            }
            .into()),
        }
    }
}

impl Default for BindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
