//! 远程调度抽象接口
//!
//! 远程服务绑定解析为远程替身，真正的传输协议由外部协作方实现，
//! 容器只经由本接口转发调用。

use crate::invoke::{InvocationResult, MethodArgs};
use std::sync::Arc;
use url::Url;

/// 远程调度 SPI
pub trait RemoteInvoker: Send + Sync {
    /// 转发一次方法调用
    ///
    /// `address` 为 `None` 时该绑定是查找标记，由实现按契约名路由。
    fn invoke(
        &self,
        contract: &str,
        address: Option<&Url>,
        method: &str,
        args: MethodArgs,
    ) -> InvocationResult;
}

/// 远程服务替身
///
/// 本地不持有受管实例，所有调用经 [`RemoteInvoker`] 派发；
/// 替身不产生生命周期事件。
pub struct RemoteStub {
    contract: String,
    address: Option<Url>,
    invoker: Arc<dyn RemoteInvoker>,
}

impl RemoteStub {
    /// 创建远程替身
    pub fn new(contract: impl Into<String>, address: Option<Url>, invoker: Arc<dyn RemoteInvoker>) -> Self {
        Self {
            contract: contract.into(),
            address,
            invoker,
        }
    }

    /// 替身对应的契约名
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// 替身绑定的路由地址
    pub fn address(&self) -> Option<&Url> {
        self.address.as_ref()
    }

    /// 转发一次方法调用
    pub fn invoke(&self, method: &str, args: MethodArgs) -> InvocationResult {
        tracing::debug!(contract = %self.contract, method, "远程调用派发");
        self.invoker
            .invoke(&self.contract, self.address.as_ref(), method, args)
    }
}

impl std::fmt::Debug for RemoteStub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStub")
            .field("contract", &self.contract)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
