//! 受管实例的转发代理

use crate::managed::ManagedClass;
use container_abstractions::{InvocationResult, MethodArgs};
use container_common::{BugError, ManagedClassMetadata, SharedInstance};
use std::sync::Arc;
use tracing::trace;

/// 转发代理
///
/// 受管类携带行为标记（远程访问、有状态、显式拦截）时，解析产出
/// 不是裸实例而是本代理：业务调用按方法名进入配置期固定的处理器链，
/// 链尾才触达真实实例。代理可廉价克隆，克隆体共享同一目标实例。
#[derive(Clone)]
pub struct ManagedProxy {
    class: Arc<ManagedClass>,
    target: SharedInstance,
}

impl ManagedProxy {
    /// 包装目标实例
    pub fn new(class: Arc<ManagedClass>, target: SharedInstance) -> Self {
        Self { class, target }
    }

    /// 受管类元数据
    pub fn metadata(&self) -> &ManagedClassMetadata {
        self.class.metadata()
    }

    /// 被代理的真实实例
    pub fn target(&self) -> &SharedInstance {
        &self.target
    }

    /// 按方法名发起一次链式调用
    ///
    /// 调用未声明为受管方法的名字是契约适配层的缺陷。
    pub fn invoke(&self, method: &str, args: MethodArgs) -> InvocationResult {
        let managed = self.class.method(method).ok_or_else(|| {
            BugError::new(format!(
                "受管类 {} 未声明方法 {method}",
                self.class.metadata().name
            ))
        })?;
        trace!(method = %managed.metadata().signature(), "代理转发调用");
        managed.invoke(Arc::clone(&self.target), args)
    }
}

impl std::fmt::Debug for ManagedProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedProxy")
            .field("class", &self.class.metadata().name)
            .field("methods", &self.class.method_count())
            .finish_non_exhaustive()
    }
}
