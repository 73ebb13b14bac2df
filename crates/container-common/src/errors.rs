//! 错误类型定义

use thiserror::Error;

/// 底层原因的统一装箱形式
pub type ErrorCause = Box<dyn std::error::Error + Send + Sync>;

/// 实例供给错误类型
///
/// 覆盖绑定缺失、构造失败、远程路由无效等可预期的解析失败。
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("绑定缺失: {key}")]
    NoBinding { key: String },

    #[error("实例创建失败: {key}, 原因: {source}")]
    CreationFailed {
        key: String,
        #[source]
        source: ErrorCause,
    },

    #[error("远程服务路由地址无效: {address}, 原因: {source}")]
    InvalidRoutingAddress {
        address: String,
        #[source]
        source: url::ParseError,
    },

    #[error("实例类型不匹配: {key}, 期望 {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("解析深度超过上限 {limit}: {key}")]
    DepthExceeded { key: String, limit: usize },
}

impl ProvisionError {
    /// 创建构造失败错误
    pub fn creation_failed(key: impl Into<String>, source: impl Into<ErrorCause>) -> Self {
        Self::CreationFailed {
            key: key.into(),
            source: source.into(),
        }
    }
}

/// 循环依赖错误
///
/// 在单次解析调用树内检测到同一个绑定键重复入栈时产生。
/// 错误消息固定以 `Circular dependency` 开头，标识闭合环路的键。
#[derive(Error, Debug)]
#[error("Circular dependency: 绑定 {key} 在解析链路中重复出现, 链路: {chain}")]
pub struct CircularDependencyError {
    /// 闭合环路的绑定键
    pub key: String,
    /// 检测时刻的完整解析链路
    pub chain: String,
}

/// 非法状态错误类型
///
/// API 使用错误，区别于运行期的 [`ProvisionError`]。
#[derive(Error, Debug)]
pub enum IllegalStateError {
    #[error("容器已完成配置, 禁止继续注册绑定")]
    AlreadyConfigured,

    #[error("容器尚未完成配置, 无法执行操作: {operation}")]
    NotConfigured { operation: String },

    #[error("容器已关闭, 无法执行操作: {operation}")]
    Closed { operation: String },

    #[error("作用域重复注册: {scope}")]
    ScopeAlreadyRegistered { scope: String },

    #[error("绑定键重复注册: {key}")]
    DuplicateBinding { key: String },

    #[error("绑定引用了未注册的作用域: {scope}")]
    UnknownScope { scope: String },

    #[error("当前线程没有激活的会话作用域")]
    NoActiveSession,

    #[error("当前线程已存在激活的会话作用域: {session}")]
    SessionAlreadyActive { session: String },
}

/// 内部缺陷错误
///
/// 容器内部不变量被破坏（例如代理与受管方法目录不一致），
/// 表示装配缺陷而非瞬时故障，调用方不应捕获后重试。
#[derive(Error, Debug)]
#[error("容器内部不变量被破坏: {detail}")]
pub struct BugError {
    /// 缺陷描述
    pub detail: String,
}

impl BugError {
    /// 创建新的内部缺陷错误
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// 方法调用错误类型
#[derive(Error, Debug)]
pub enum InvocationError {
    /// 目标方法抛出的原始错误，已从调度包装中解开
    #[error(transparent)]
    Target { source: ErrorCause },

    /// 调用处理器自身执行失败
    #[error("调用处理器 {processor} 执行失败: {source}")]
    Processor {
        processor: String,
        #[source]
        source: ErrorCause,
    },

    /// 代理与受管方法目录不一致
    #[error(transparent)]
    Bug(#[from] BugError),
}

/// 事务边界错误类型
///
/// 归属事务处理器自身，调用链不做二次解释。
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("工作单元开启失败: {source}")]
    BeginFailed {
        #[source]
        source: ErrorCause,
    },

    #[error("工作单元提交失败: {source}")]
    CommitFailed {
        #[source]
        source: ErrorCause,
    },

    #[error("工作单元回滚失败: {source}")]
    RollbackFailed {
        #[source]
        source: ErrorCause,
    },
}

/// 容器统一错误类型
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Circular(#[from] CircularDependencyError),

    #[error(transparent)]
    IllegalState(#[from] IllegalStateError),

    #[error(transparent)]
    Bug(#[from] BugError),

    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

/// 结果类型别名
pub type ContainerResult<T> = Result<T, ContainerError>;
