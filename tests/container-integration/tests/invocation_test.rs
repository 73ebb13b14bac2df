//! 受管方法调用链、事务边界与远程替身的端到端测试

use container_abstractions::{
    Invocation, InvocationProcessor, InvocationResult, MethodArgs, ProcessorChain, RemoteInvoker,
    RemoteStub, TransactionalResource, UnitOfWork,
};
use container_common::{
    ManagedClassMetadata, ManagedMethodMetadata, ScopeKind, SharedInstance, TransactionError,
    TransactionKind,
};
use container_impl::{CoreContainer, ManagedProxy, TransactionProcessor};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

/// 被代理的真实账本
struct Ledger {
    balance: AtomicUsize,
}

/// 契约类型：业务代码持有的是代理包装
struct LedgerClient {
    proxy: ManagedProxy,
}

impl LedgerClient {
    fn deposit(&self, amount: usize) -> usize {
        let output = self
            .proxy
            .invoke("deposit", vec![Box::new(amount) as Box<dyn Any + Send>])
            .unwrap();
        *output.downcast::<usize>().unwrap()
    }

    fn try_deposit(&self, amount: usize) -> InvocationResult {
        self.proxy
            .invoke("deposit", vec![Box::new(amount) as Box<dyn Any + Send>])
    }
}

fn deposit_handler(instance: &SharedInstance, mut args: MethodArgs) -> Result<Box<dyn Any + Send>, container_common::ErrorCause> {
    let ledger = instance
        .clone()
        .downcast::<Ledger>()
        .map_err(|_| "目标实例类型不符")?;
    let amount = *args
        .remove(0)
        .downcast::<usize>()
        .map_err(|_| "实参类型不符")?;
    if amount == 0 {
        return Err("存入金额不能为零".into());
    }
    let balance = ledger.balance.fetch_add(amount, Ordering::SeqCst) + amount;
    Ok(Box::new(balance))
}

fn ledger_metadata(transactional: bool) -> ManagedClassMetadata {
    let mut method = ManagedMethodMetadata::new("deposit");
    if transactional {
        method = method.transactional(TransactionKind::Mutable);
    }
    ManagedClassMetadata::new::<Ledger>("Ledger")
        .stateful()
        .with_method(method)
}

fn ledger_container(transactional: bool) -> CoreContainer {
    let container = CoreContainer::new();
    container
        .bind::<LedgerClient>()
        .in_scope(ScopeKind::Singleton)
        .to(|_| {
            Ok(Ledger {
                balance: AtomicUsize::new(0),
            })
        })
        .managed(ledger_metadata(transactional))
        .handler("deposit", deposit_handler)
        .proxied(|proxy| LedgerClient { proxy })
        .register()
        .unwrap();
    container
}

struct TaggingProcessor {
    tag: &'static str,
    priority: i32,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl InvocationProcessor for TaggingProcessor {
    fn bind(&self, _method: &ManagedMethodMetadata) -> bool {
        true
    }

    fn on_method_invocation(
        &self,
        chain: &mut dyn ProcessorChain,
        invocation: Invocation,
    ) -> InvocationResult {
        self.log.lock().push(self.tag);
        chain.invoke_next_processor(invocation)
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn name(&self) -> &str {
        self.tag
    }
}

#[test]
fn proxied_binding_dispatches_through_ordered_chain() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let container = ledger_container(false);
    // 注册顺序与优先级相反, 链序必须由优先级决定
    container
        .register_processor(Arc::new(TaggingProcessor {
            tag: "metrics",
            priority: 200,
            log: Arc::clone(&log),
        }))
        .unwrap();
    container
        .register_processor(Arc::new(TaggingProcessor {
            tag: "security",
            priority: 10,
            log: Arc::clone(&log),
        }))
        .unwrap();
    container.configure().unwrap();

    let client = container.get_instance::<LedgerClient>().unwrap();
    assert_eq!(client.deposit(50), 50);
    assert_eq!(client.deposit(25), 75);
    assert_eq!(*log.lock(), vec!["security", "metrics", "security", "metrics"]);
}

#[test]
fn adapted_proxy_is_the_cached_value() {
    let container = ledger_container(false);
    container.configure().unwrap();

    let first = container.get_instance::<LedgerClient>().unwrap();
    let second = container.get_instance::<LedgerClient>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    // 单例缓存的是适配后的代理, 状态跨取用保持
    first.deposit(10);
    assert_eq!(second.deposit(5), 15);
}

#[test]
fn target_error_surfaces_unwrapped() {
    let container = ledger_container(false);
    container.configure().unwrap();
    let client = container.get_instance::<LedgerClient>().unwrap();
    let err = client.try_deposit(0).unwrap_err();
    assert_eq!(err.to_string(), "存入金额不能为零");
}

// ---- 事务边界 ----

struct RecordingUow {
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl UnitOfWork for RecordingUow {
    fn handle(&self) -> SharedInstance {
        Arc::new(()) as SharedInstance
    }

    fn was_touched(&self) -> bool {
        true
    }

    fn commit(&self) -> Result<(), TransactionError> {
        self.log.lock().push("commit");
        Ok(())
    }

    fn rollback(&self) -> Result<(), TransactionError> {
        self.log.lock().push("rollback");
        Ok(())
    }

    fn close(&self) {
        self.log.lock().push("close");
    }
}

struct RecordingResource {
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl TransactionalResource for RecordingResource {
    fn begin(&self, _read_only: bool) -> Result<Box<dyn UnitOfWork>, TransactionError> {
        self.log.lock().push("begin");
        Ok(Box::new(RecordingUow {
            log: Arc::clone(&self.log),
        }))
    }
}

#[test]
fn transactional_method_commits_on_success_and_rolls_back_on_failure() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let container = ledger_container(true);
    container
        .register_processor(Arc::new(TransactionProcessor::new(Arc::new(
            RecordingResource {
                log: Arc::clone(&log),
            },
        ))))
        .unwrap();
    container.configure().unwrap();

    let client = container.get_instance::<LedgerClient>().unwrap();
    client.deposit(100);
    assert_eq!(*log.lock(), vec!["begin", "commit", "close"]);

    log.lock().clear();
    assert!(client.try_deposit(0).is_err());
    assert_eq!(*log.lock(), vec!["begin", "rollback", "close"]);
}

// ---- 远程替身 ----

struct EchoInvoker {
    calls: Mutex<Vec<(String, Option<Url>, String)>>,
}

impl RemoteInvoker for EchoInvoker {
    fn invoke(
        &self,
        contract: &str,
        address: Option<&Url>,
        method: &str,
        _args: MethodArgs,
    ) -> InvocationResult {
        self.calls.lock().push((
            contract.to_string(),
            address.cloned(),
            method.to_string(),
        ));
        Ok(Box::new(format!("{contract}::{method}")) as Box<dyn Any + Send>)
    }
}

struct PricingClient {
    stub: Arc<RemoteStub>,
}

impl PricingClient {
    fn quote(&self) -> String {
        let output = self.stub.invoke("quote", MethodArgs::new()).unwrap();
        *output.downcast::<String>().unwrap()
    }
}

#[test]
fn service_binding_resolves_to_adapted_remote_stub() {
    let invoker = Arc::new(EchoInvoker {
        calls: Mutex::new(Vec::new()),
    });
    let container = CoreContainer::new();
    container.set_remote_invoker(Arc::clone(&invoker) as _).unwrap();
    container
        .bind::<PricingClient>()
        .on("tcp://pricing.internal:7000")
        .remote(|stub| PricingClient { stub })
        .register()
        .unwrap();
    container.configure().unwrap();

    let client = container.get_instance::<PricingClient>().unwrap();
    assert_eq!(client.quote(), "PricingClient::quote");

    let calls = invoker.calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "PricingClient");
    let address = calls[0].1.as_ref().unwrap();
    assert_eq!(address.host_str(), Some("pricing.internal"));
    assert_eq!(address.port(), Some(7000));
}

#[test]
fn lookup_marker_service_routes_without_address() {
    let invoker = Arc::new(EchoInvoker {
        calls: Mutex::new(Vec::new()),
    });
    let container = CoreContainer::new();
    container.set_remote_invoker(Arc::clone(&invoker) as _).unwrap();
    container
        .bind::<PricingClient>()
        .service()
        .remote(|stub| PricingClient { stub })
        .register()
        .unwrap();
    container.configure().unwrap();

    let client = container.get_instance::<PricingClient>().unwrap();
    client.quote();
    assert!(invoker.calls.lock()[0].1.is_none());
}
