//! 作用域缓存策略抽象接口
//!
//! 每种作用域各提供一个缓存策略实现，包装原始构造动作并施加
//! 身份/缓存策略。自定义作用域在配置期通过作用域标识注册。

use container_common::{BindingKey, ConfinementToken, ContainerResult, SharedInstance};

/// 作用域缓存产出
#[derive(Clone)]
pub struct ScopedInstance {
    /// 实例句柄
    pub value: SharedInstance,
    /// 本次调用是否触发了新构造
    ///
    /// 并发首次解析竞争失败的一方观察到 `false`，
    /// 据此保证创建事件只为真正构造出的实例发布一次。
    pub fresh: bool,
}

impl std::fmt::Debug for ScopedInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedInstance")
            .field("fresh", &self.fresh)
            .finish_non_exhaustive()
    }
}

/// 构造闭包
///
/// 由解析器提供，在缓存未命中时执行完整的递归构造流程。
pub type InstanceFactory<'a> = &'a mut dyn FnMut() -> ContainerResult<SharedInstance>;

/// 作用域缓存策略 trait
///
/// 不变量：同一限定单元内每个键至多缓存一个实例；
/// 无缓存作用域从不存储。
pub trait ScopeCache: Send + Sync {
    /// 命中则返回缓存实例，未命中则执行构造闭包并按策略缓存
    fn provide(
        &self,
        key: &BindingKey,
        token: Option<&ConfinementToken>,
        factory: InstanceFactory<'_>,
    ) -> ContainerResult<ScopedInstance>;

    /// 只读查询缓存，从不构造
    fn peek(&self, key: &BindingKey, token: Option<&ConfinementToken>) -> Option<SharedInstance>;

    /// 结束一个限定令牌的边界，返回被驱逐的实例
    ///
    /// 与同令牌下的并发解析互斥；非会话类作用域无事可做。
    fn end(&self, _token: &ConfinementToken) -> Vec<(BindingKey, SharedInstance)> {
        Vec::new()
    }

    /// 容器关闭时清空缓存，返回被驱逐的实例
    fn drain(&self) -> Vec<(BindingKey, SharedInstance)> {
        Vec::new()
    }

    /// 该策略是否保留实例身份
    fn caches(&self) -> bool {
        true
    }
}
