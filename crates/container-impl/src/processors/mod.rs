//! 内置调用处理器

mod transaction;

pub use transaction::TransactionProcessor;
