//! 依赖解析抽象接口
//!
//! 构造函数和初始化器通过该接口递归解析依赖，
//! 解析链路随接口实现显式传递，不依赖环境线程状态。

use container_common::{downcast_instance, BindingKey, ContainerResult, SharedInstance};
use std::sync::Arc;

/// 依赖解析接口
///
/// 单次顶层解析调用树内共享同一个实现实例，
/// 因此深层依赖的循环同样会被解析链路捕获。
pub trait DependencyResolver {
    /// 按绑定键解析实例
    fn resolve_key(&mut self, key: &BindingKey) -> ContainerResult<SharedInstance>;

    /// 当前解析链路深度
    fn depth(&self) -> usize;
}

impl dyn DependencyResolver + '_ {
    /// 解析指定契约类型的实例
    pub fn resolve<T: Send + Sync + 'static>(&mut self) -> ContainerResult<Arc<T>> {
        let key = BindingKey::of::<T>();
        let instance = self.resolve_key(&key)?;
        Ok(downcast_instance(&key, instance)?)
    }

    /// 解析带限定名的实例
    pub fn resolve_named<T: Send + Sync + 'static>(
        &mut self,
        qualifier: impl Into<String>,
    ) -> ContainerResult<Arc<T>> {
        let key = BindingKey::named::<T>(qualifier);
        let instance = self.resolve_key(&key)?;
        Ok(downcast_instance(&key, instance)?)
    }
}
