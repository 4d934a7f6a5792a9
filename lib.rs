//! Guttman R-tree：使用线性分裂的动态空间索引
//!
//! 支持插入、按句柄删除（带 CondenseTree 下溢处理）、矩形范围搜索和随机采样。

pub mod config;
pub mod error;
pub mod rtree;

// 重新导出主要的公共接口
pub use config::TreeConfig;
pub use error::{RTreeError, Result};
pub use rtree::{Entry, EntryHandle, EntryId, Iter, Node, NodeType, RTree, Record, Rectangle};
