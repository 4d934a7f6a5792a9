use super::super::node::{Entry, Record};
use super::super::rtree::RTree;
use crate::error::{RTreeError, Result};
use rand::Rng;

/// 随机采样
impl<T> RTree<T> {
    /// 随机选取一个数据条目
    ///
    /// 从根节点开始，每一层在当前节点的条目中均匀随机选一个并向下走，直到叶子。
    /// 因此每个节点内部是均匀的，但条目较少的叶子中的数据被选中的概率更高，
    /// 整体上并不是对所有数据均匀采样。
    pub fn random_entry<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Record<T>> {
        let mut node = self.root().ok_or(RTreeError::EmptyTree)?;

        loop {
            if node.is_empty() {
                return Err(RTreeError::Corrupted(format!(
                    "empty node at level {} while sampling",
                    node.level
                )));
            }
            let index = rng.gen_range(0..node.entries.len());
            match &node.entries[index] {
                Entry::Data(record) => return Ok(record),
                Entry::Node { node: child, .. } => node = child.as_ref(),
            }
        }
    }
}
