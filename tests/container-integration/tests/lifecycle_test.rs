//! 实例生命周期事件、会话边界与容器关闭的端到端测试

use container_common::{
    ContainerError, IllegalStateError, InstanceEvent, InstanceLifecycleListener, ScopeKind,
};
use container_impl::CoreContainer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Default)]
struct CountingListener {
    created: AtomicUsize,
    evicted: AtomicUsize,
}

impl InstanceLifecycleListener for CountingListener {
    fn on_instance_created(&self, _event: &InstanceEvent) {
        self.created.fetch_add(1, Ordering::SeqCst);
    }

    fn on_instance_out_of_scope(&self, _event: &InstanceEvent) {
        self.evicted.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
struct Cache {
    #[allow(dead_code)]
    capacity: usize,
}

#[test]
fn created_event_fires_exactly_once_for_contended_singleton() {
    let listener = Arc::new(CountingListener::default());
    let container = Arc::new(CoreContainer::new());
    container.register_listener(Arc::clone(&listener) as _).unwrap();
    container
        .bind::<Cache>()
        .in_scope(ScopeKind::Singleton)
        .to(|_| Ok(Cache { capacity: 1024 }))
        .register()
        .unwrap();
    container.configure().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = Arc::clone(&container);
            thread::spawn(move || container.get_instance::<Cache>().unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(listener.created.load(Ordering::SeqCst), 1);
    assert_eq!(listener.evicted.load(Ordering::SeqCst), 0);
}

#[test]
fn fixed_instances_do_not_fire_created_events() {
    let listener = Arc::new(CountingListener::default());
    let container = CoreContainer::new();
    container.register_listener(Arc::clone(&listener) as _).unwrap();
    container
        .bind::<Cache>()
        .instance(Cache { capacity: 16 })
        .register()
        .unwrap();
    container.configure().unwrap();

    container.get_instance::<Cache>().unwrap();
    assert_eq!(listener.created.load(Ordering::SeqCst), 0);
}

#[test]
fn session_confines_identity_and_eviction_fires_events() {
    let listener = Arc::new(CountingListener::default());
    let container = CoreContainer::new();
    container.register_listener(Arc::clone(&listener) as _).unwrap();
    container
        .bind::<Cache>()
        .in_scope(ScopeKind::Session)
        .to(|_| Ok(Cache { capacity: 64 }))
        .register()
        .unwrap();
    container.configure().unwrap();

    // 没有活动会话时解析直接失败
    let err = container.get_instance::<Cache>().unwrap_err();
    assert!(matches!(
        err,
        ContainerError::IllegalState(IllegalStateError::NoActiveSession)
    ));

    let token = container.begin_session("request").unwrap();
    let first = container.get_instance::<Cache>().unwrap();
    let second = container.get_instance::<Cache>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(listener.created.load(Ordering::SeqCst), 1);

    container.end_session(&token).unwrap();
    assert_eq!(listener.evicted.load(Ordering::SeqCst), 1);

    // 新会话得到新实例
    let token = container.begin_session("request").unwrap();
    let third = container.get_instance::<Cache>().unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    container.end_session(&token).unwrap();
}

#[test]
fn nested_session_on_same_thread_is_rejected() {
    let container = CoreContainer::new();
    container.configure().unwrap();
    let token = container.begin_session("outer").unwrap();
    let err = container.begin_session("inner").unwrap_err();
    assert!(matches!(
        err,
        ContainerError::IllegalState(IllegalStateError::SessionAlreadyActive { .. })
    ));
    container.end_session(&token).unwrap();
}

#[test]
fn scope_peek_never_constructs() {
    let container = CoreContainer::new();
    container
        .bind::<Cache>()
        .in_scope(ScopeKind::Singleton)
        .to(|_| Ok(Cache { capacity: 8 }))
        .register()
        .unwrap();
    container.configure().unwrap();

    assert!(container
        .get_scope_instance::<Cache>(&ScopeKind::Singleton)
        .unwrap()
        .is_none());

    let constructed = container.get_instance::<Cache>().unwrap();
    let peeked = container
        .get_scope_instance::<Cache>(&ScopeKind::Singleton)
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&constructed, &peeked));
}

#[test]
fn close_evicts_singletons_and_fires_out_of_scope() {
    let listener = Arc::new(CountingListener::default());
    let container = CoreContainer::new();
    container.register_listener(Arc::clone(&listener) as _).unwrap();
    container
        .bind::<Cache>()
        .in_scope(ScopeKind::Singleton)
        .to(|_| Ok(Cache { capacity: 32 }))
        .register()
        .unwrap();
    container.configure().unwrap();
    container.get_instance::<Cache>().unwrap();

    container.close().unwrap();
    assert_eq!(listener.evicted.load(Ordering::SeqCst), 1);

    let err = container.get_instance::<Cache>().unwrap_err();
    assert!(matches!(
        err,
        ContainerError::IllegalState(IllegalStateError::Closed { .. })
    ));
}

#[test]
fn stats_snapshot_is_serializable() {
    let container = CoreContainer::new();
    container
        .bind::<Cache>()
        .in_scope(ScopeKind::Singleton)
        .to(|_| Ok(Cache { capacity: 4 }))
        .register()
        .unwrap();
    container.configure().unwrap();
    container.get_instance::<Cache>().unwrap();

    let stats = container.stats();
    assert_eq!(stats.registered_bindings, 1);
    assert_eq!(stats.constructed_instances, 1);
    assert_eq!(stats.active_singletons, 1);

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["registered_bindings"], 1);
    assert_eq!(json["resolutions"], 1);
}
