//! 调用处理器链执行器

use container_abstractions::{
    Invocation, InvocationProcessor, InvocationResult, MethodHandler, ProcessorChain,
};
use container_common::InvocationError;
use std::sync::Arc;
use tracing::trace;

/// 单次调用的链游标
///
/// 处理器序列在配置期已按优先级升序固定，执行器只推进下标；
/// 序列走尽后执行真实调用并把句柄错误解开为原始原因。
/// 处理器不调用 [`ProcessorChain::invoke_next_processor`] 即短路
/// 余下的链和真实调用。
pub struct ChainExecutor<'a> {
    processors: &'a [Arc<dyn InvocationProcessor>],
    handler: &'a MethodHandler,
    index: usize,
}

impl<'a> ChainExecutor<'a> {
    /// 创建指向链首的执行器
    pub fn new(processors: &'a [Arc<dyn InvocationProcessor>], handler: &'a MethodHandler) -> Self {
        Self {
            processors,
            handler,
            index: 0,
        }
    }
}

impl ProcessorChain for ChainExecutor<'_> {
    fn invoke_next_processor(&mut self, invocation: Invocation) -> InvocationResult {
        if self.index < self.processors.len() {
            let processor = Arc::clone(&self.processors[self.index]);
            self.index += 1;
            trace!(
                processor = processor.name(),
                method = %invocation.method.signature(),
                "进入调用处理器"
            );
            processor.on_method_invocation(self, invocation)
        } else {
            trace!(method = %invocation.method.signature(), "执行真实调用");
            (self.handler)(&invocation.instance, invocation.args)
                .map_err(|source| InvocationError::Target { source })
        }
    }
}
