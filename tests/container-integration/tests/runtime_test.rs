//! 运行时装配与异步生命周期的端到端测试

use container_abstractions::{InstanceFactory, ScopeCache, ScopedInstance};
use container_common::{
    BindingKey, ConfinementToken, ContainerResult, Lifecycle, LifecycleState, ScopeKind,
    SharedInstance,
};
use container_composition::RuntimeBuilder;
use dashmap::DashMap;
use std::sync::Arc;

struct Scheduler {
    workers: usize,
}

#[tokio::test]
async fn runtime_resolves_after_build_and_closes_on_stop() {
    let runtime = RuntimeBuilder::new()
        .add_module(|container| {
            container
                .bind::<Scheduler>()
                .in_scope(ScopeKind::Singleton)
                .to(|_| Ok(Scheduler { workers: 4 }))
                .register()
        })
        .build()
        .unwrap();

    runtime.on_start().await.unwrap();
    assert_eq!(runtime.lifecycle_state().await, LifecycleState::Running);

    let scheduler = runtime.container().get_instance::<Scheduler>().unwrap();
    assert_eq!(scheduler.workers, 4);

    runtime.on_stop().await.unwrap();
    assert_eq!(runtime.lifecycle_state().await, LifecycleState::Stopped);
    assert!(runtime.container().get_instance::<Scheduler>().is_err());
}

/// 进程内全局缓存的自定义作用域, 无视限定令牌
struct BatchScope {
    entries: DashMap<BindingKey, SharedInstance>,
}

impl ScopeCache for BatchScope {
    fn provide(
        &self,
        key: &BindingKey,
        _token: Option<&ConfinementToken>,
        factory: InstanceFactory<'_>,
    ) -> ContainerResult<ScopedInstance> {
        if let Some(existing) = self.entries.get(key) {
            return Ok(ScopedInstance {
                value: Arc::clone(existing.value()),
                fresh: false,
            });
        }
        let value = factory()?;
        self.entries.insert(key.clone(), Arc::clone(&value));
        Ok(ScopedInstance { value, fresh: true })
    }

    fn peek(&self, key: &BindingKey, _token: Option<&ConfinementToken>) -> Option<SharedInstance> {
        self.entries.get(key).map(|e| Arc::clone(e.value()))
    }

    fn drain(&self) -> Vec<(BindingKey, SharedInstance)> {
        let keys: Vec<BindingKey> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.into_iter()
            .filter_map(|k| self.entries.remove(&k))
            .collect()
    }
}

#[tokio::test]
async fn custom_scope_participates_like_a_builtin() {
    let runtime = RuntimeBuilder::new()
        .add_scope(
            ScopeKind::Custom("batch".to_string()),
            Arc::new(BatchScope {
                entries: DashMap::new(),
            }),
        )
        .add_module(|container| {
            container
                .bind::<Scheduler>()
                .in_scope(ScopeKind::Custom("batch".to_string()))
                .to(|_| Ok(Scheduler { workers: 2 }))
                .register()
        })
        .build()
        .unwrap();

    let first = runtime.container().get_instance::<Scheduler>().unwrap();
    let second = runtime.container().get_instance::<Scheduler>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn unknown_custom_scope_fails_the_build() {
    let result = RuntimeBuilder::new()
        .add_module(|container| {
            container
                .bind::<Scheduler>()
                .in_scope(ScopeKind::Custom("missing".to_string()))
                .to(|_| Ok(Scheduler { workers: 1 }))
                .register()
        })
        .build();
    assert!(result.is_err());
}
