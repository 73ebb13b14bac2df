//! 绑定解析与作用域身份的端到端测试

use container_abstractions::ContainerConfig;
use container_common::{ContainerError, IllegalStateError, ProvisionError, ScopeKind};
use container_impl::CoreContainer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

struct Repository {
    serial: usize,
}

struct Service {
    repository: Arc<Repository>,
}

fn counting_container(scope: ScopeKind, counter: Arc<AtomicUsize>) -> CoreContainer {
    let container = CoreContainer::new();
    container
        .bind::<Repository>()
        .in_scope(scope)
        .to(move |_| {
            Ok(Repository {
                serial: counter.fetch_add(1, Ordering::SeqCst),
            })
        })
        .register()
        .unwrap();
    container.configure().unwrap();
    container
}

#[test]
fn constructor_dependencies_are_injected() {
    let container = CoreContainer::new();
    container
        .bind::<Repository>()
        .in_scope(ScopeKind::Singleton)
        .to(|_| Ok(Repository { serial: 1 }))
        .register()
        .unwrap();
    container
        .bind::<Service>()
        .to(|resolver| {
            Ok(Service {
                repository: resolver.resolve::<Repository>()?,
            })
        })
        .register()
        .unwrap();
    container.configure().unwrap();

    let service = container.get_instance::<Service>().unwrap();
    let repository = container.get_instance::<Repository>().unwrap();
    assert!(Arc::ptr_eq(&service.repository, &repository));
}

#[test]
fn singleton_identity_holds_across_threads() {
    let counter = Arc::new(AtomicUsize::new(0));
    let container = Arc::new(counting_container(
        ScopeKind::Singleton,
        Arc::clone(&counter),
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = Arc::clone(&container);
            thread::spawn(move || container.get_instance::<Repository>().unwrap())
        })
        .collect();
    let instances: Vec<Arc<Repository>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    for instance in &instances[1..] {
        assert!(Arc::ptr_eq(&instances[0], instance));
    }
}

#[test]
fn no_cache_scope_yields_distinct_instances() {
    let counter = Arc::new(AtomicUsize::new(0));
    let container = counting_container(ScopeKind::NoCache, Arc::clone(&counter));

    let first = container.get_instance::<Repository>().unwrap();
    let second = container.get_instance::<Repository>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_ne!(first.serial, second.serial);
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn thread_scope_confines_identity_per_thread() {
    let counter = Arc::new(AtomicUsize::new(0));
    let container = Arc::new(counting_container(ScopeKind::Thread, Arc::clone(&counter)));

    let local_a = container.get_instance::<Repository>().unwrap();
    let local_b = container.get_instance::<Repository>().unwrap();
    assert!(Arc::ptr_eq(&local_a, &local_b));

    let remote = {
        let container = Arc::clone(&container);
        thread::spawn(move || container.get_instance::<Repository>().unwrap())
            .join()
            .unwrap()
    };
    assert!(!Arc::ptr_eq(&local_a, &remote));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[derive(Debug)]
struct Alpha;
#[derive(Debug)]
struct Beta;

#[test]
fn circular_dependency_is_reported_with_fixed_prefix() {
    let container = CoreContainer::new();
    container
        .bind::<Alpha>()
        .to(|resolver| {
            resolver.resolve::<Beta>()?;
            Ok(Alpha)
        })
        .register()
        .unwrap();
    container
        .bind::<Beta>()
        .to(|resolver| {
            resolver.resolve::<Alpha>()?;
            Ok(Beta)
        })
        .register()
        .unwrap();
    container.configure().unwrap();

    let err = container.get_instance::<Alpha>().unwrap_err();
    assert!(matches!(err, ContainerError::Circular(_)));
    assert!(err.to_string().starts_with("Circular dependency"));
}

#[derive(Debug)]
struct Gamma;

#[test]
fn three_node_cycle_is_detected_and_names_the_chain() {
    let container = CoreContainer::new();
    container
        .bind::<Alpha>()
        .to(|resolver| {
            resolver.resolve::<Beta>()?;
            Ok(Alpha)
        })
        .register()
        .unwrap();
    container
        .bind::<Beta>()
        .to(|resolver| {
            resolver.resolve::<Gamma>()?;
            Ok(Beta)
        })
        .register()
        .unwrap();
    container
        .bind::<Gamma>()
        .to(|resolver| {
            resolver.resolve::<Alpha>()?;
            Ok(Gamma)
        })
        .register()
        .unwrap();
    container.configure().unwrap();

    let err = container.get_instance::<Alpha>().unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.starts_with("Circular dependency"));
    assert!(rendered.contains("Alpha"));
    assert!(rendered.contains("Beta"));
    assert!(rendered.contains("Gamma"));
}

#[derive(Debug)]
struct Hop;

#[test]
fn resolution_depth_is_bounded() {
    let container = CoreContainer::with_config(ContainerConfig {
        max_resolution_depth: 5,
        enable_stats: true,
    });
    for i in 0..10_usize {
        let binder = container.bind::<Hop>().named(format!("hop{i}"));
        if i == 9 {
            binder.to(|_| Ok(Hop)).register().unwrap();
        } else {
            let next = format!("hop{}", i + 1);
            binder
                .to(move |resolver| {
                    resolver.resolve_named::<Hop>(next.clone())?;
                    Ok(Hop)
                })
                .register()
                .unwrap();
        }
    }
    container.configure().unwrap();

    let err = container.get_instance_named::<Hop>("hop0").unwrap_err();
    assert!(matches!(
        err,
        ContainerError::Provision(ProvisionError::DepthExceeded { limit: 5, .. })
    ));
}

#[derive(Debug)]
struct Dialect {
    name: &'static str,
}

#[test]
fn named_bindings_resolve_independently() {
    let container = CoreContainer::new();
    container
        .bind::<Dialect>()
        .named("postgres")
        .instance(Dialect { name: "postgres" })
        .register()
        .unwrap();
    container
        .bind::<Dialect>()
        .named("sqlite")
        .instance(Dialect { name: "sqlite" })
        .register()
        .unwrap();
    container.configure().unwrap();

    let pg = container.get_instance_named::<Dialect>("postgres").unwrap();
    let lite = container.get_instance_named::<Dialect>("sqlite").unwrap();
    assert_eq!(pg.name, "postgres");
    assert_eq!(lite.name, "sqlite");

    let err = container.get_instance::<Dialect>().unwrap_err();
    assert!(matches!(
        err,
        ContainerError::Provision(ProvisionError::NoBinding { .. })
    ));
}

#[test]
fn optional_retrieval_swallows_provision_failures_only() {
    let container = CoreContainer::new();
    container
        .bind::<Alpha>()
        .to(|resolver| {
            resolver.resolve::<Alpha>()?;
            Ok(Alpha)
        })
        .register()
        .unwrap();
    container.configure().unwrap();

    // 未绑定的契约映射为 None
    assert!(container.get_optional_instance::<Beta>().unwrap().is_none());
    // 循环依赖照常上报
    let err = container.get_optional_instance::<Alpha>().unwrap_err();
    assert!(matches!(err, ContainerError::Circular(_)));
}

#[test]
fn bind_after_configure_is_rejected() {
    let container = CoreContainer::new();
    container.configure().unwrap();
    let err = container
        .bind::<Alpha>()
        .to(|_| Ok(Alpha))
        .register()
        .unwrap_err();
    assert!(matches!(
        err,
        ContainerError::IllegalState(IllegalStateError::AlreadyConfigured)
    ));
}

#[test]
fn initializers_run_after_construction() {
    struct Settings {
        endpoint: String,
    }
    struct Gateway {
        endpoint: String,
    }
    let container = CoreContainer::new();
    container
        .bind::<Settings>()
        .instance(Settings {
            endpoint: "amqp://broker:5672".to_string(),
        })
        .register()
        .unwrap();
    container
        .bind::<Gateway>()
        .to(|_| {
            Ok(Gateway {
                endpoint: String::new(),
            })
        })
        .initialize(|resolver, gateway: &mut Gateway| {
            gateway.endpoint = resolver.resolve::<Settings>()?.endpoint.clone();
            Ok(())
        })
        .register()
        .unwrap();
    container.configure().unwrap();

    let gateway = container.get_instance::<Gateway>().unwrap();
    assert_eq!(gateway.endpoint, "amqp://broker:5672");
}
