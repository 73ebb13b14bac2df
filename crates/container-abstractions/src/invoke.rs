//! 方法调用与处理器链抽象接口
//!
//! 每个受管方法拥有一条在配置期固定的调用处理器链，
//! 执行一次业务调用即按优先级升序走完处理器并以真实调用收尾。

use container_common::{ErrorCause, InvocationError, ManagedMethodMetadata, SharedInstance};
use std::any::Any;
use std::sync::Arc;

/// 方法实参序列
pub type MethodArgs = Vec<Box<dyn Any + Send>>;

/// 方法返回值
pub type MethodOutput = Box<dyn Any + Send>;

/// 方法调用结果
pub type InvocationResult = Result<MethodOutput, InvocationError>;

/// 方法句柄
///
/// 终结步骤通过它执行真实调用；返回的包装错误由链解开为原始原因。
pub type MethodHandler =
    Arc<dyn Fn(&SharedInstance, MethodArgs) -> Result<MethodOutput, ErrorCause> + Send + Sync>;

/// 一次方法调用
pub struct Invocation {
    /// 被调方法的元数据
    pub method: Arc<ManagedMethodMetadata>,
    /// 目标实例
    pub instance: SharedInstance,
    /// 实参序列
    pub args: MethodArgs,
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("method", &self.method.signature())
            .field("args", &self.args.len())
            .finish()
    }
}

/// 处理器链游标
///
/// 处理器通过它把调用继续交给链上的下一环；
/// 不调用 [`ProcessorChain::invoke_next_processor`] 即短路后续处理器
/// 和真实调用，这是约定行为（例如安全校验失败时中止），不是缺陷。
pub trait ProcessorChain {
    /// 调用链上的下一个处理器，链走完后执行真实调用
    fn invoke_next_processor(&mut self, invocation: Invocation) -> InvocationResult;
}

/// 调用处理器 SPI
///
/// 横切行为（事务边界、异步派发、安全校验等）以处理器形式挂接到
/// 受管方法的调用链上，参与与否及次序在配置期一次性确定。
pub trait InvocationProcessor: Send + Sync {
    /// 决定是否参与指定受管方法的调用链
    fn bind(&self, method: &ManagedMethodMetadata) -> bool;

    /// 执行或转发调用
    fn on_method_invocation(
        &self,
        chain: &mut dyn ProcessorChain,
        invocation: Invocation,
    ) -> InvocationResult;

    /// 处理器优先级，数值升序执行，真实调用恒为最后一环
    fn priority(&self) -> i32;

    /// 处理器名称
    fn name(&self) -> &str;
}
