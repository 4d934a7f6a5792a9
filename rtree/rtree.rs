use super::node::{Entry, Node, Record};
use super::rectangle::Rectangle;
use crate::config::TreeConfig;
use crate::error::Result;

/// R-tree主结构
///
/// 基于 Guttman (1984) "R-Trees: A Dynamic Index Structure for Spatial Searching"，
/// 节点分裂使用线性分裂算法。
///
/// 树独占所有节点；调用者只能通过 `search` / `random_entry` 借到只读的数据记录，
/// 并用记录的 [`EntryHandle`](super::node::EntryHandle) 删除它。
#[derive(Debug, Clone)]
pub struct RTree<T> {
    /// 根节点
    root: Option<Box<Node<T>>>,
    /// 数据条目总数
    size: usize,
    /// 最大条目数M
    max_entries: usize,
    /// 最小条目数m
    min_entries: usize,
}

impl<T> RTree<T> {
    /// 使用默认参数创建R-tree（M=5, m=2）
    pub fn new() -> Self {
        let config = TreeConfig::default();
        RTree {
            root: None,
            size: 0,
            max_entries: config.max_entries,
            min_entries: config.min_entries,
        }
    }

    /// 创建指定容量的R-tree，参数必须满足 `2 <= min_entries <= max_entries / 2`
    pub fn with_capacity(max_entries: usize, min_entries: usize) -> Result<Self> {
        Self::from_config(&TreeConfig::new(max_entries, min_entries)?)
    }

    /// 根据配置创建R-tree
    pub fn from_config(config: &TreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(RTree {
            root: None,
            size: 0,
            max_entries: config.max_entries,
            min_entries: config.min_entries,
        })
    }

    /// 检查R-tree是否为空
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// 获取数据条目总数
    pub fn len(&self) -> usize {
        self.size
    }

    /// 树的高度：空树为0，根节点为叶子时为1
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, |node| node.level + 1)
    }

    /// 获取最大条目数
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// 获取最小条目数
    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    pub fn config(&self) -> TreeConfig {
        TreeConfig {
            max_entries: self.max_entries,
            min_entries: self.min_entries,
        }
    }

    /// 根节点（只读），供绘制和打印等遍历使用
    pub fn root(&self) -> Option<&Node<T>> {
        self.root.as_deref()
    }

    /// 获取R-tree的根节点MBR
    pub fn root_mbr(&self) -> Option<Rectangle> {
        self.root.as_ref().map(|node| node.mbr())
    }

    /// 清空整棵树，保留配置
    pub fn clear(&mut self) {
        self.root = None;
        self.size = 0;
    }

    /// 深度优先（先序）遍历所有条目，同时给出条目所在深度
    ///
    /// 根节点的条目深度为1，数据条目的深度等于 `height()`
    pub fn iter(&self) -> Iter<'_, T> {
        let mut stack = Vec::new();
        if let Some(root) = self.root.as_deref() {
            stack.extend(root.entries.iter().rev().map(|entry| (1, entry)));
        }
        Iter { stack }
    }

    /// 遍历所有数据记录
    pub fn records(&self) -> impl Iterator<Item = &Record<T>> + '_ {
        self.iter().filter_map(|(_, entry)| entry.record())
    }

    pub(crate) fn root_mut(&mut self) -> &mut Option<Box<Node<T>>> {
        &mut self.root
    }

    pub(crate) fn root_ref(&self) -> &Option<Box<Node<T>>> {
        &self.root
    }

    pub(crate) fn size_mut(&mut self) -> &mut usize {
        &mut self.size
    }
}

impl<T> Default for RTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// [`RTree::iter`] 返回的深度优先迭代器
#[derive(Debug)]
pub struct Iter<'a, T> {
    stack: Vec<(usize, &'a Entry<T>)>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (usize, &'a Entry<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, entry) = self.stack.pop()?;
        if let Some(child) = entry.child() {
            self.stack
                .extend(child.entries.iter().rev().map(|e| (depth + 1, e)));
        }
        Some((depth, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RTreeError;

    #[test]
    fn test_rtree_creation() {
        let rtree: RTree<i32> = RTree::new();
        assert_eq!(rtree.max_entries(), 5);
        assert_eq!(rtree.min_entries(), 2);
        assert_eq!(rtree.len(), 0);
        assert_eq!(rtree.height(), 0);
        assert!(rtree.is_empty());
        assert!(rtree.root().is_none());
        assert!(rtree.root_mbr().is_none());
        assert_eq!(rtree.iter().count(), 0);
    }

    #[test]
    fn test_rtree_with_capacity() {
        let rtree: RTree<i32> = RTree::with_capacity(16, 4).unwrap();
        assert_eq!(rtree.max_entries(), 16);
        assert_eq!(rtree.min_entries(), 4);
        assert_eq!(rtree.config(), TreeConfig::new(16, 4).unwrap());

        assert!(matches!(
            RTree::<i32>::with_capacity(5, 3),
            Err(RTreeError::InvalidConfig { .. })
        ));
        assert!(RTree::<i32>::with_capacity(10, 1).is_err());
    }

    #[test]
    fn test_rtree_insert_single() {
        let mut rtree = RTree::new();
        rtree.insert(Rectangle::new(0.0, 0.0, 10.0, 10.0), 1);

        assert!(!rtree.is_empty());
        assert_eq!(rtree.len(), 1);
        assert_eq!(rtree.height(), 1);
        assert_eq!(rtree.root_mbr(), Some(Rectangle::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_iter_reports_depths() {
        let mut rtree = RTree::new();
        for i in 0..30 {
            let x = i as f64;
            rtree.insert(Rectangle::new(x, x, x + 1.0, x + 1.0), i);
        }

        let height = rtree.height();
        assert!(height > 1);

        let mut data_count = 0;
        for (depth, entry) in rtree.iter() {
            if entry.is_data() {
                assert_eq!(depth, height);
                data_count += 1;
            } else {
                assert!(depth < height);
            }
        }
        assert_eq!(data_count, 30);

        let mut values: Vec<i32> = rtree.records().map(|r| *r.data()).collect();
        values.sort();
        assert_eq!(values, (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn test_clear() {
        let mut rtree = RTree::new();
        rtree.insert(Rectangle::new(0.0, 0.0, 1.0, 1.0), "a");
        rtree.insert(Rectangle::new(1.0, 1.0, 2.0, 2.0), "b");
        rtree.clear();

        assert!(rtree.is_empty());
        assert_eq!(rtree.len(), 0);
        assert_eq!(rtree.height(), 0);
        assert_eq!(rtree.max_entries(), 5);
    }
}
