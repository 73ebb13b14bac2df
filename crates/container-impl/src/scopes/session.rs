//! 会话限定作用域

use container_abstractions::{InstanceFactory, ScopeCache, ScopedInstance};
use container_common::{
    BindingKey, ConfinementToken, ContainerResult, IllegalStateError, SharedInstance,
};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// 会话限定缓存
///
/// 每个限定令牌对应一张独立的键到实例的表。没有活动令牌时
/// 解析会话作用域的绑定直接失败。会话结束时整表驱逐并交还
/// 实例，供生命周期事件发布。
pub struct SessionScope {
    sessions: DashMap<Uuid, HashMap<BindingKey, SharedInstance>>,
}

impl SessionScope {
    /// 创建空缓存
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// 为令牌开启一个空会话
    pub fn open(&self, token: &ConfinementToken) {
        self.sessions.entry(token.id).or_default();
    }

    /// 当前活动会话数
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for SessionScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeCache for SessionScope {
    fn provide(
        &self,
        key: &BindingKey,
        token: Option<&ConfinementToken>,
        factory: InstanceFactory<'_>,
    ) -> ContainerResult<ScopedInstance> {
        let token = token.ok_or(IllegalStateError::NoActiveSession)?;
        if let Some(session) = self.sessions.get(&token.id) {
            if let Some(existing) = session.get(key) {
                return Ok(ScopedInstance {
                    value: Arc::clone(existing),
                    fresh: false,
                });
            }
        }
        // 构造期间不持有会话表的分片锁，构造闭包可能递归回到本作用域
        let value = factory()?;
        let mut session = self.sessions.entry(token.id).or_default();
        match session.get(key) {
            // 并发构造竞争失败，丢弃本次产物沿用先到者
            Some(winner) => Ok(ScopedInstance {
                value: Arc::clone(winner),
                fresh: false,
            }),
            None => {
                session.insert(key.clone(), Arc::clone(&value));
                Ok(ScopedInstance { value, fresh: true })
            }
        }
    }

    fn peek(&self, key: &BindingKey, token: Option<&ConfinementToken>) -> Option<SharedInstance> {
        let token = token?;
        self.sessions
            .get(&token.id)
            .and_then(|session| session.get(key).map(Arc::clone))
    }

    fn end(&self, token: &ConfinementToken) -> Vec<(BindingKey, SharedInstance)> {
        match self.sessions.remove(&token.id) {
            Some((_, session)) => {
                debug!(session = %token, evicted = session.len(), "会话结束, 驱逐限定实例");
                session.into_iter().collect()
            }
            None => Vec::new(),
        }
    }

    fn drain(&self) -> Vec<(BindingKey, SharedInstance)> {
        let ids: Vec<Uuid> = self.sessions.iter().map(|e| *e.key()).collect();
        let mut evicted = Vec::new();
        for id in ids {
            if let Some((_, session)) = self.sessions.remove(&id) {
                evicted.extend(session);
            }
        }
        evicted
    }
}

impl std::fmt::Debug for SessionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionScope")
            .field("sessions", &self.sessions.len())
            .finish()
    }
}
