//! 事务边界处理器

use container_abstractions::{
    Invocation, InvocationProcessor, InvocationResult, ProcessorChain, TransactionalResource,
};
use container_common::{
    InvocationError, ManagedMethodMetadata, SharedInstance, TransactionKind,
};
use dashmap::DashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use tracing::{debug, warn};

struct TxSlot {
    uow: Box<dyn container_abstractions::UnitOfWork>,
    depth: usize,
    read_only: bool,
}

/// 事务边界处理器
///
/// 只挂接到声明了事务语义的受管方法。最外层事务方法开启工作单元，
/// 调用成功提交、失败回滚（只读单元不显式回滚），随后关闭释放；
/// 嵌套的事务方法共享外层工作单元，以深度计数配平。
/// 工作单元按线程登记，同一线程内的调用树天然串行。
pub struct TransactionProcessor {
    resource: Arc<dyn TransactionalResource>,
    slots: DashMap<ThreadId, TxSlot>,
    priority: i32,
}

impl TransactionProcessor {
    /// 缺省优先级，在安全校验之后、业务无关的观测处理器之前
    pub const DEFAULT_PRIORITY: i32 = 100;

    /// 创建事务边界处理器
    pub fn new(resource: Arc<dyn TransactionalResource>) -> Self {
        Self::with_priority(resource, Self::DEFAULT_PRIORITY)
    }

    /// 以指定优先级创建
    pub fn with_priority(resource: Arc<dyn TransactionalResource>, priority: i32) -> Self {
        Self {
            resource,
            slots: DashMap::new(),
            priority,
        }
    }

    /// 当前线程活动工作单元的会话句柄
    ///
    /// 事务方法内部的业务代码经由此取得会话。
    pub fn current_session(&self) -> Option<SharedInstance> {
        self.slots
            .get(&thread::current().id())
            .map(|slot| slot.uow.handle())
    }

    fn enter(&self, read_only: bool) -> Result<bool, InvocationError> {
        let thread_id = thread::current().id();
        if let Some(mut slot) = self.slots.get_mut(&thread_id) {
            slot.depth += 1;
            return Ok(false);
        }
        let uow = self
            .resource
            .begin(read_only)
            .map_err(|source| InvocationError::Processor {
                processor: "transaction".to_string(),
                source: Box::new(source),
            })?;
        self.slots.insert(
            thread_id,
            TxSlot {
                uow,
                depth: 1,
                read_only,
            },
        );
        Ok(true)
    }

    fn leave(&self, succeeded: bool, method: &ManagedMethodMetadata) -> Result<(), InvocationError> {
        let thread_id = thread::current().id();
        let outermost = {
            let Some(mut slot) = self.slots.get_mut(&thread_id) else {
                return Err(InvocationError::Bug(container_common::BugError::new(
                    "事务边界退出时工作单元不存在",
                )));
            };
            slot.depth -= 1;
            slot.depth == 0
        };
        if !outermost {
            return Ok(());
        }
        let Some((_, slot)) = self.slots.remove(&thread_id) else {
            return Ok(());
        };
        if !slot.uow.was_touched() {
            debug!(
                method = %method.signature(),
                "事务方法从未使用会话, 边界声明可能是多余的"
            );
        }
        let outcome = if succeeded {
            slot.uow.commit()
        } else if slot.read_only {
            // 只读单元不显式回滚
            Ok(())
        } else {
            warn!(method = %method.signature(), "事务方法失败, 回滚工作单元");
            slot.uow.rollback()
        };
        slot.uow.close();
        outcome.map_err(|source| InvocationError::Processor {
            processor: "transaction".to_string(),
            source: Box::new(source),
        })
    }
}

impl InvocationProcessor for TransactionProcessor {
    fn bind(&self, method: &ManagedMethodMetadata) -> bool {
        method.transaction.is_some()
    }

    fn on_method_invocation(
        &self,
        chain: &mut dyn ProcessorChain,
        invocation: Invocation,
    ) -> InvocationResult {
        let read_only = matches!(invocation.method.transaction, Some(TransactionKind::Immutable));
        let method = Arc::clone(&invocation.method);
        let opened = self.enter(read_only)?;
        if opened {
            debug!(method = %method.signature(), read_only, "开启事务边界");
        }
        let result = chain.invoke_next_processor(invocation);
        match self.leave(result.is_ok(), &method) {
            Ok(()) => result,
            // 业务调用本身的错误优先于边界收尾错误上报
            Err(boundary_err) => result.and(Err(boundary_err)),
        }
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn name(&self) -> &str {
        "transaction"
    }
}

impl std::fmt::Debug for TransactionProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionProcessor")
            .field("priority", &self.priority)
            .field("active_units", &self.slots.len())
            .finish_non_exhaustive()
    }
}
