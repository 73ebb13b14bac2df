//! 事务资源抽象接口
//!
//! 事务边界处理器经由本接口开启/提交/回滚工作单元，
//! 底层会话实现由外部协作方提供。

use container_common::{SharedInstance, TransactionError};

/// 工作单元
///
/// 一次事务边界内的会话包装。实现方负责维护"是否被触碰"标记，
/// 处理器据此在边界结束时给出不必要边界的诊断。
pub trait UnitOfWork: Send + Sync {
    /// 发布给业务代码的会话句柄
    fn handle(&self) -> SharedInstance;

    /// 工作单元期间会话是否被实际使用过
    fn was_touched(&self) -> bool;

    /// 提交
    fn commit(&self) -> Result<(), TransactionError>;

    /// 回滚
    fn rollback(&self) -> Result<(), TransactionError>;

    /// 关闭并释放底层会话
    fn close(&self);
}

/// 事务资源 SPI
pub trait TransactionalResource: Send + Sync {
    /// 开启一个工作单元
    ///
    /// `read_only` 为真时开启只读工作单元，只读单元不会被显式回滚。
    fn begin(&self, read_only: bool) -> Result<Box<dyn UnitOfWork>, TransactionError>;
}
