//! 作用域种类与限定令牌定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 作用域种类
///
/// 决定实例身份与缓存生命周期的策略标识。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    /// 无缓存 - 每次解析都创建新实例
    NoCache,
    /// 进程单例 - 整个进程生命周期内只创建一个实例
    Singleton,
    /// 线程限定 - 每个调用线程各持有一个实例
    Thread,
    /// 会话限定 - 实例绑定到显式的限定令牌（请求/会话）
    Session,
    /// 自定义作用域 - 配置期注册的缓存策略
    Custom(String),
}

impl Default for ScopeKind {
    fn default() -> Self {
        Self::NoCache
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCache => write!(f, "no-cache"),
            Self::Singleton => write!(f, "singleton"),
            Self::Thread => write!(f, "thread"),
            Self::Session => write!(f, "session"),
            Self::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}

/// 限定令牌
///
/// 会话类作用域的边界标识，由调用方在边界开始时创建、结束时注销。
#[derive(Debug, Clone)]
pub struct ConfinementToken {
    /// 令牌唯一标识
    pub id: uuid::Uuid,
    /// 令牌名称
    pub name: String,
    /// 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ConfinementToken {
    /// 创建新的限定令牌
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            name: name.into(),
            created_at: chrono::Utc::now(),
        }
    }
}

impl PartialEq for ConfinementToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConfinementToken {}

impl std::hash::Hash for ConfinementToken {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ConfinementToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.id)
    }
}
