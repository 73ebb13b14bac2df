//! 无缓存作用域：每次解析都构造新实例

use container_abstractions::{InstanceFactory, ScopeCache, ScopedInstance};
use container_common::{BindingKey, ConfinementToken, ContainerResult, SharedInstance};

/// 无缓存策略
///
/// 直接透传构造闭包，从不存储任何实例，同一绑定的两次解析
/// 必然得到不同实例。
#[derive(Debug, Default)]
pub struct NoCacheScope;

impl ScopeCache for NoCacheScope {
    fn provide(
        &self,
        _key: &BindingKey,
        _token: Option<&ConfinementToken>,
        factory: InstanceFactory<'_>,
    ) -> ContainerResult<ScopedInstance> {
        Ok(ScopedInstance {
            value: factory()?,
            fresh: true,
        })
    }

    fn peek(&self, _key: &BindingKey, _token: Option<&ConfinementToken>) -> Option<SharedInstance> {
        None
    }

    fn caches(&self) -> bool {
        false
    }
}
