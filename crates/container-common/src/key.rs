//! 绑定查找键与实例句柄定义

use crate::errors::ProvisionError;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// 容器内统一的实例句柄
///
/// 所有受管实例以类型擦除的共享指针形式缓存和传递。
pub type SharedInstance = Arc<dyn Any + Send + Sync>;

/// 绑定查找键
///
/// 由契约类型和可选限定名构成，不可变，作为注册表与作用域缓存的键。
/// 在同一个配置期内，相等的键必须解析到同一个绑定。
#[derive(Debug, Clone)]
pub struct BindingKey {
    type_id: TypeId,
    type_name: &'static str,
    qualifier: Option<String>,
}

impl BindingKey {
    /// 创建指定契约类型的查找键
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            qualifier: None,
        }
    }

    /// 创建带限定名的查找键
    pub fn named<T: 'static>(qualifier: impl Into<String>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            qualifier: Some(qualifier.into()),
        }
    }

    /// 契约类型ID
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// 契约类型完整名称
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 限定名
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &str {
        self.type_name.split("::").last().unwrap_or(self.type_name)
    }
}

impl PartialEq for BindingKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.qualifier == other.qualifier
    }
}

impl Eq for BindingKey {}

impl std::hash::Hash for BindingKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.qualifier.hash(state);
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}@{}", self.type_name, q),
            None => write!(f, "{}", self.type_name),
        }
    }
}

/// 将类型擦除的实例句柄还原为具体契约类型
///
/// 还原失败说明绑定声明与取用方期望不一致。
pub fn downcast_instance<T: Send + Sync + 'static>(
    key: &BindingKey,
    instance: SharedInstance,
) -> Result<Arc<T>, ProvisionError> {
    instance
        .downcast::<T>()
        .map_err(|_| ProvisionError::TypeMismatch {
            key: key.to_string(),
            expected: std::any::type_name::<T>(),
        })
}
