//! 受管类目录
//!
//! 受管类与受管方法的运行形态在配置期一次性装配：
//! 对每个受管方法，过滤声明参与的处理器并按优先级升序固定成链。

use crate::chain::ChainExecutor;
use container_abstractions::{
    Binding, Invocation, InvocationProcessor, InvocationResult, MethodArgs, MethodHandler,
    ProcessorChain,
};
use container_common::{
    BindingKey, BugError, ContainerResult, ManagedClassMetadata, ManagedMethodMetadata,
    SharedInstance,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// 受管方法的运行形态
pub struct ManagedMethod {
    metadata: Arc<ManagedMethodMetadata>,
    handler: MethodHandler,
    processors: Vec<Arc<dyn InvocationProcessor>>,
}

impl ManagedMethod {
    /// 方法元数据
    pub fn metadata(&self) -> &ManagedMethodMetadata {
        &self.metadata
    }

    /// 参与本方法调用链的处理器数量
    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    /// 对目标实例执行一次完整的链式调用
    pub fn invoke(&self, instance: SharedInstance, args: MethodArgs) -> InvocationResult {
        let invocation = Invocation {
            method: Arc::clone(&self.metadata),
            instance,
            args,
        };
        ChainExecutor::new(&self.processors, &self.handler).invoke_next_processor(invocation)
    }
}

impl std::fmt::Debug for ManagedMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedMethod")
            .field("signature", &self.metadata.signature())
            .field("processors", &self.processors.len())
            .finish()
    }
}

/// 受管类的运行形态
#[derive(Debug)]
pub struct ManagedClass {
    metadata: Arc<ManagedClassMetadata>,
    methods: HashMap<String, Arc<ManagedMethod>>,
}

impl ManagedClass {
    /// 类元数据
    pub fn metadata(&self) -> &ManagedClassMetadata {
        &self.metadata
    }

    /// 按方法名查找受管方法
    pub fn method(&self, name: &str) -> Option<&Arc<ManagedMethod>> {
        self.methods.get(name)
    }

    /// 受管方法数量
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}

/// 受管类目录
///
/// 配置期从绑定快照构建，运行期只读。
#[derive(Debug, Default)]
pub struct ManagedCatalog {
    classes: HashMap<BindingKey, Arc<ManagedClass>>,
}

impl ManagedCatalog {
    /// 从绑定快照与已注册处理器装配目录
    ///
    /// 声明了受管方法却没有对应调用句柄的绑定是装配缺陷，
    /// 在此处即失败而非等到首次调用。
    pub fn build(
        bindings: &[Arc<Binding>],
        processors: &[Arc<dyn InvocationProcessor>],
    ) -> ContainerResult<Self> {
        let mut classes = HashMap::new();
        for binding in bindings {
            let Some(meta) = binding.managed.as_ref() else {
                continue;
            };
            let mut methods = HashMap::new();
            for method_meta in &meta.methods {
                let handler = binding
                    .method_handlers
                    .get(&method_meta.name)
                    .cloned()
                    .ok_or_else(|| {
                        BugError::new(format!(
                            "受管方法 {} 未挂接调用句柄",
                            method_meta.signature()
                        ))
                    })?;
                let mut bound: Vec<Arc<dyn InvocationProcessor>> = processors
                    .iter()
                    .filter(|p| p.bind(method_meta))
                    .cloned()
                    .collect();
                bound.sort_by_key(|p| p.priority());
                debug!(
                    method = %method_meta.signature(),
                    processors = bound.len(),
                    "装配受管方法调用链"
                );
                methods.insert(
                    method_meta.name.clone(),
                    Arc::new(ManagedMethod {
                        metadata: Arc::clone(method_meta),
                        handler,
                        processors: bound,
                    }),
                );
            }
            classes.insert(
                binding.key.clone(),
                Arc::new(ManagedClass {
                    metadata: Arc::clone(meta),
                    methods,
                }),
            );
        }
        Ok(Self { classes })
    }

    /// 按绑定键查找受管类
    pub fn class(&self, key: &BindingKey) -> Option<&Arc<ManagedClass>> {
        self.classes.get(key)
    }

    /// 目录内受管类数量
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// 目录是否为空
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
