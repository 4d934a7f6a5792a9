use super::super::node::{Entry, EntryHandle, Node};
use super::super::rtree::RTree;
use tracing::{debug, trace, warn};

/// R-tree删除算法实现
impl<T> RTree<T> {
    /// 删除句柄对应的数据条目 - 遵循论文Algorithm Delete
    ///
    /// 返回被删除条目的数据；句柄已经失效或者来自其他树时返回 `None`，树保持不变
    pub fn delete(&mut self, handle: EntryHandle) -> Option<T> {
        // D1: 找到包含目标条目的叶子节点
        let leaf_path = self.find_leaf_path(&handle)?;

        // D2: 从叶子节点删除条目
        let removed = {
            let Some(leaf) = self.get_last_node_mut(&leaf_path) else {
                warn!(?leaf_path, "failed to get leaf node during deletion");
                return None;
            };
            let position = leaf
                .entries
                .iter()
                .position(|entry| matches!(entry, Entry::Data(record) if record.id == handle.id))?;
            leaf.entries.remove(position)
        };
        *self.size_mut() -= 1;

        // D3: 压缩树
        self.condense_tree(leaf_path);

        // D4: 缩短树
        self.shorten_tree();

        trace!(id = %handle.id, size = self.len(), height = self.height(), "deleted entry");

        match removed {
            Entry::Data(record) => Some(record.into_data()),
            Entry::Node { .. } => None,
        }
    }

    /// 查找包含指定数据条目的叶子节点路径
    ///
    /// 返回从根节点到包含目标条目的叶子节点的路径
    pub(crate) fn find_leaf_path(&self, handle: &EntryHandle) -> Option<Vec<usize>> {
        let root = self.root_ref().as_deref()?;
        let mut path = Vec::new();
        if self.find_leaf_recursive(root, handle, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    /// 递归查找包含指定数据条目的叶子节点
    fn find_leaf_recursive(&self, node: &Node<T>, handle: &EntryHandle, path: &mut Vec<usize>) -> bool {
        if node.is_leaf_node() {
            // 在叶子节点中按身份查找目标条目
            return node
                .entries
                .iter()
                .any(|entry| matches!(entry, Entry::Data(record) if record.id == handle.id));
        }

        // 在索引节点中递归搜索
        for (i, entry) in node.entries.iter().enumerate() {
            if let Entry::Node { mbr, node: child } = entry {
                // 只在MBR包含目标矩形的子树中搜索
                if mbr.contains(&handle.mbr) {
                    path.push(i);
                    if self.find_leaf_recursive(child, handle, path) {
                        return true;
                    }
                    path.pop();
                }
            }
        }
        false
    }

    /// 压缩树 - 遵循论文Algorithm CondenseTree
    ///
    /// 从叶子节点沿路径向上，条目数少于 `min_entries` 的节点从父节点中移除，
    /// 其条目连同所在层级一起暂存；其余节点只更新父条目的MBR。
    /// 最后按层级从高到低把暂存的条目重新插入到原来的层级。
    pub(crate) fn condense_tree(&mut self, leaf_path: Vec<usize>) {
        let min_entries = self.min_entries();
        let mut path = leaf_path;
        // (层级, 条目)
        let mut orphans: Vec<(usize, Entry<T>)> = Vec::new();

        // CT2: 逐层向上，path 弹出后剩下的就是父节点的路径
        while let Some(index) = path.pop() {
            let Some(parent) = self.get_last_node_mut(&path) else {
                warn!(?path, "failed to get parent node during condense");
                break;
            };

            let underflow = parent
                .entries
                .get(index)
                .and_then(Entry::child)
                .is_some_and(|child| child.needs_more_entries(min_entries));

            if underflow {
                // CT3: 删除下溢节点，暂存其条目
                if let Entry::Node { node, .. } = parent.entries.remove(index) {
                    let level = node.level;
                    orphans.extend(node.entries.into_iter().map(|entry| (level, entry)));
                }
            } else if let Some(entry) = parent.entries.get_mut(index) {
                // CT4: 调整覆盖矩形
                entry.refresh_mbr();
            }
        }

        // 根节点失去所有条目时直接丢弃，由暂存的条目重建
        if self.root().is_some_and(|root| root.is_empty()) {
            *self.root_mut() = None;
        }

        if orphans.is_empty() {
            return;
        }

        // CT6: 重新插入，高层级的条目先插入
        debug!(count = orphans.len(), "reinserting entries from underflowed nodes");
        orphans.sort_by(|a, b| b.0.cmp(&a.0));
        for (level, entry) in orphans {
            self.insert_at_level(entry, level);
        }
    }

    /// 缩短树 - 如果根节点只有一个条目且为索引节点，则将其子节点作为新的根节点
    ///
    /// 每次删除最多降低一层
    pub(crate) fn shorten_tree(&mut self) {
        if self.is_empty() {
            return;
        }
        if self.len() == 0 {
            *self.root_mut() = None;
            return;
        }

        let Some(mut root) = self.root_mut().take() else {
            return;
        };
        if root.is_index_node() && root.entries.len() == 1 {
            match root.entries.pop() {
                Some(Entry::Node { node, .. }) => {
                    *self.root_mut() = Some(node);
                    debug!(height = self.height(), "root collapsed");
                    return;
                }
                other => root.entries.extend(other),
            }
        }
        *self.root_mut() = Some(root);
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::rectangle::Rectangle;
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn scenario_rects() -> Vec<Rectangle> {
        vec![
            Rectangle::new(0.0, 0.0, 0.25, 0.25),
            Rectangle::new(0.25, 0.25, 0.5, 0.5),
            Rectangle::new(0.5, 0.5, 0.75, 0.75),
            Rectangle::new(0.15, 0.15, 0.65, 0.65),
            Rectangle::new(0.35, 0.1, 0.4, 0.85),
            Rectangle::new(0.0, 0.0, 0.25, 0.25),
        ]
    }

    fn random_rect(rng: &mut StdRng) -> Rectangle {
        let x = rng.gen_range(0.0..100.0);
        let y = rng.gen_range(0.0..100.0);
        let w = rng.gen_range(0.0..5.0);
        let h = rng.gen_range(0.0..5.0);
        Rectangle::new(x, y, x + w, y + h)
    }

    #[test]
    fn test_delete_basic() {
        let mut rtree = RTree::new();
        let a = rtree.insert(Rectangle::from_point(5.0, 5.0), "1");
        let b = rtree.insert(Rectangle::from_point(10.0, 10.0), "2");
        let c = rtree.insert(Rectangle::from_point(25.0, 25.0), "3");

        assert_eq!(rtree.delete(b), Some("2"));
        assert_eq!(rtree.len(), 2);

        let mut found = rtree.search_values(&Rectangle::new(0.0, 0.0, 30.0, 30.0));
        found.sort();
        assert_eq!(found, vec![&"1", &"3"]);

        assert_eq!(rtree.delete(a), Some("1"));
        assert_eq!(rtree.delete(c), Some("3"));
        assert!(rtree.is_empty());
    }

    #[test]
    fn test_delete_twice_is_noop() {
        let mut rtree = RTree::new();
        let handle = rtree.insert(Rectangle::new(0.0, 0.0, 1.0, 1.0), 1);
        rtree.insert(Rectangle::new(2.0, 2.0, 3.0, 3.0), 2);

        assert_eq!(rtree.delete(handle), Some(1));
        assert_eq!(rtree.len(), 1);

        // 幂等：再次删除不改变树
        assert_eq!(rtree.delete(handle), None);
        assert_eq!(rtree.len(), 1);
        rtree.check_invariants().unwrap();
    }

    #[test]
    fn test_delete_empty_tree() {
        let mut rtree: RTree<i32> = RTree::new();
        let mut other = RTree::new();
        let handle = other.insert(Rectangle::new(0.0, 0.0, 1.0, 1.0), 1);

        assert_eq!(rtree.delete(handle), None);
        assert!(rtree.is_empty());
        assert_eq!(rtree.height(), 0);
    }

    #[test]
    fn test_delete_foreign_handle() {
        let rect = Rectangle::new(0.0, 0.0, 1.0, 1.0);
        let mut rtree = RTree::new();
        rtree.insert(rect, 1);

        // 矩形和数据都相同，但属于另一棵树
        let mut other = RTree::new();
        let foreign = other.insert(rect, 1);

        assert_eq!(rtree.delete(foreign), None);
        assert_eq!(rtree.len(), 1);
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_delete_sole_entry() {
        let mut rtree = RTree::new();
        let handle = rtree.insert(Rectangle::new(0.0, 0.0, 1.0, 1.0), "only");

        assert_eq!(rtree.delete(handle), Some("only"));
        assert_eq!(rtree.len(), 0);
        assert_eq!(rtree.height(), 0);
        assert!(rtree.root().is_none());
    }

    #[test]
    fn test_delete_duplicates_by_identity() {
        let rect = Rectangle::new(1.0, 1.0, 2.0, 2.0);
        let mut rtree = RTree::new();
        let first = rtree.insert(rect, "same");
        let second = rtree.insert(rect, "same");

        assert_eq!(rtree.delete(first), Some("same"));
        assert_eq!(rtree.len(), 1);

        let remaining = rtree.search(&rect);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), second.id());

        assert_eq!(rtree.delete(second), Some("same"));
        assert!(rtree.is_empty());
    }

    #[test]
    fn test_delete_all_scenario_entries() {
        let orders: [[usize; 6]; 4] = [
            [0, 1, 2, 3, 4, 5],
            [5, 4, 3, 2, 1, 0],
            [2, 5, 0, 3, 1, 4],
            [3, 0, 4, 1, 5, 2],
        ];

        for order in orders {
            let mut rtree = RTree::new();
            let handles: Vec<_> = scenario_rects()
                .into_iter()
                .enumerate()
                .map(|(i, rect)| rtree.insert(rect, i))
                .collect();
            assert_eq!(rtree.height(), 2);

            for (deleted, &i) in order.iter().enumerate() {
                assert_eq!(rtree.delete(handles[i]), Some(i));
                assert_eq!(rtree.len(), 5 - deleted);
                rtree.check_invariants().unwrap();
            }

            assert_eq!(rtree.len(), 0);
            assert_eq!(rtree.height(), 0);
            assert!(rtree.root().is_none());
        }
    }

    #[test]
    fn test_delete_with_underflow() {
        let mut rtree = RTree::new();
        let mut handles = Vec::new();
        for i in 0..30 {
            let x = (i % 6) as f64 * 10.0;
            let y = (i / 6) as f64 * 10.0;
            handles.push(rtree.insert(Rectangle::new(x, y, x + 1.0, y + 1.0), i));
        }
        assert!(rtree.height() >= 3);

        // 删除一半条目，迫使部分节点下溢并重新插入
        for handle in handles.iter().step_by(2) {
            assert!(rtree.delete(*handle).is_some());
            rtree.check_invariants().unwrap();
        }
        assert_eq!(rtree.len(), 15);

        // 剩余的条目都还能找到
        for (i, handle) in handles.iter().enumerate().skip(1).step_by(2) {
            let found = rtree.search(handle.mbr());
            assert!(found.iter().any(|r| r.id() == handle.id() && *r.data() == i as i32));
        }
    }

    #[test]
    fn test_delete_random_order_keeps_invariants() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut rtree = RTree::with_capacity(6, 3).unwrap();

        let mut handles: Vec<_> = (0..300)
            .map(|i| {
                let rect = random_rect(&mut rng);
                rtree.insert(rect, i)
            })
            .collect();
        rtree.check_invariants().unwrap();

        handles.shuffle(&mut rng);
        for (deleted, handle) in handles.iter().enumerate() {
            assert!(rtree.delete(*handle).is_some());
            assert_eq!(rtree.len(), 300 - deleted - 1);
            if deleted % 10 == 0 {
                rtree.check_invariants().unwrap();
            }
        }

        assert!(rtree.is_empty());
        assert_eq!(rtree.height(), 0);
    }

    #[test]
    fn test_interleaved_insert_and_delete() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut rtree = RTree::new();
        let mut live = Vec::new();

        for i in 0..500 {
            if live.is_empty() || rng.gen_bool(0.6) {
                let rect = random_rect(&mut rng);
                live.push(rtree.insert(rect, i));
            } else {
                let index = rng.gen_range(0..live.len());
                let handle = live.swap_remove(index);
                assert!(rtree.delete(handle).is_some());
            }
            assert_eq!(rtree.len(), live.len());
        }
        rtree.check_invariants().unwrap();

        // 所有存活的条目都能通过自己的矩形找到
        for handle in &live {
            assert!(rtree.search(handle.mbr()).iter().any(|r| r.id() == handle.id()));
        }
    }

    #[test]
    fn test_shorten_tree() {
        let mut rtree = RTree::new();
        let handles: Vec<_> = (0..40)
            .map(|i| {
                let x = i as f64;
                rtree.insert(Rectangle::new(x, 0.0, x + 0.5, 0.5), i)
            })
            .collect();
        let initial_height = rtree.height();
        assert!(initial_height >= 3);

        let mut last_height = initial_height;
        for handle in &handles[..38] {
            rtree.delete(*handle);
            // 每次删除最多降低一层
            assert!(rtree.height() + 1 >= last_height);
            last_height = rtree.height();
        }

        assert_eq!(rtree.len(), 2);
        assert_eq!(rtree.height(), 1);
        rtree.check_invariants().unwrap();
    }
}
