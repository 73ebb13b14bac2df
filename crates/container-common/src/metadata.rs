//! 元数据定义
//!
//! 受管类与受管方法的元数据在配置期一次性收集，
//! 运行期作为只读的标注数据被代理和调用处理器查询。

use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 类型名称
    pub name: String,
    /// 类型ID
    pub id: TypeId,
    /// 模块路径
    pub module_path: String,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: 'static>() -> Self {
        Self {
            name: std::any::type_name::<T>()
                .split("::")
                .last()
                .unwrap_or("Unknown")
                .to_string(),
            id: TypeId::of::<T>(),
            module_path: std::any::type_name::<T>().to_string(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &str {
        self.name.split("::").last().unwrap_or(&self.name)
    }
}

/// 事务种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// 可变调用 - 读写工作单元，失败回滚
    Mutable,
    /// 只读调用 - 只读工作单元，不显式回滚
    Immutable,
}

/// 受管方法元数据
///
/// (所属契约, 方法名) 唯一标识一个受管方法；
/// 两个元数据相等当且仅当它们描述同一契约上的同一方法。
#[derive(Debug, Clone)]
pub struct ManagedMethodMetadata {
    /// 所属受管类名称
    pub class_name: String,
    /// 方法名称
    pub name: String,
    /// 事务声明
    pub transaction: Option<TransactionKind>,
    /// 处理器可查询的自定义属性
    pub attributes: HashMap<String, String>,
}

impl ManagedMethodMetadata {
    /// 创建新的受管方法元数据
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            class_name: String::new(),
            name: name.into(),
            transaction: None,
            attributes: HashMap::new(),
        }
    }

    /// 声明事务边界
    pub fn transactional(mut self, kind: TransactionKind) -> Self {
        self.transaction = Some(kind);
        self
    }

    /// 添加自定义属性
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// 方法的完整签名标识
    pub fn signature(&self) -> String {
        format!("{}#{}", self.class_name, self.name)
    }
}

impl PartialEq for ManagedMethodMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.class_name == other.class_name && self.name == other.name
    }
}

impl Eq for ManagedMethodMetadata {}

impl std::hash::Hash for ManagedMethodMetadata {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.class_name.hash(state);
        self.name.hash(state);
    }
}

/// 受管类元数据
///
/// 行为标记（远程访问、有状态、显式拦截）在配置期收集一次，
/// 代理提供方据此判定是否需要包装转发装饰器。
#[derive(Debug, Clone)]
pub struct ManagedClassMetadata {
    /// 类型信息
    pub type_info: TypeInfo,
    /// 受管类名称
    pub name: String,
    /// 是否要求远程风格访问
    pub remote: bool,
    /// 是否为有状态语义
    pub stateful: bool,
    /// 是否显式声明拦截
    pub intercepted: bool,
    /// 受管方法列表
    pub methods: Vec<Arc<ManagedMethodMetadata>>,
}

impl ManagedClassMetadata {
    /// 创建新的受管类元数据
    pub fn new<T: 'static>(name: impl Into<String>) -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            name: name.into(),
            remote: false,
            stateful: false,
            intercepted: false,
            methods: Vec::new(),
        }
    }

    /// 标记为远程风格访问
    pub fn remote(mut self) -> Self {
        self.remote = true;
        self
    }

    /// 标记为有状态语义
    pub fn stateful(mut self) -> Self {
        self.stateful = true;
        self
    }

    /// 标记为显式拦截
    pub fn intercepted(mut self) -> Self {
        self.intercepted = true;
        self
    }

    /// 添加受管方法
    pub fn with_method(mut self, mut method: ManagedMethodMetadata) -> Self {
        method.class_name = self.name.clone();
        self.methods.push(Arc::new(method));
        self
    }

    /// 是否携带任意行为标记
    pub fn has_behavior_markers(&self) -> bool {
        self.remote || self.stateful || self.intercepted
    }
}
