use super::super::node::{Entry, EntryHandle, Node, NodeType, Record};
use super::super::rectangle::Rectangle;
use super::super::rtree::RTree;
use super::utils::geometry_to_bbox;
use crate::error::Result;
use tracing::{trace, warn};

/// 插入操作相关算法
impl<T> RTree<T> {
    /// 插入新的数据条目 - 遵循论文Algorithm Insert
    ///
    /// 插入总会成功，返回的句柄可以在之后交给 `delete`
    pub fn insert(&mut self, rect: Rectangle, data: T) -> EntryHandle {
        let record = Record::new(rect, data);
        let handle = record.handle();

        self.insert_at_level(Entry::Data(record), 0);
        *self.size_mut() += 1;

        trace!(id = %handle.id, size = self.len(), height = self.height(), "inserted entry");
        handle
    }

    /// 按几何体的边界框插入数据
    pub fn insert_geometry(&mut self, geometry: &geo::Geometry<f64>, data: T) -> Result<EntryHandle> {
        let rect = geometry_to_bbox(geometry)?;
        Ok(self.insert(rect, data))
    }

    /// 把条目插入到指定层级的节点中
    ///
    /// 数据条目的层级为0；删除时被移出的索引条目会回到它原来的层级，保证所有叶子仍在同一深度
    pub(crate) fn insert_at_level(&mut self, entry: Entry<T>, level: usize) {
        // I1: 如果根节点不存在，创建根节点
        if self.root_ref().is_none() {
            let node_type = if level == 0 {
                NodeType::Leaf
            } else {
                NodeType::Index
            };
            let mut root = Node::new(node_type, level);
            root.add_entry(entry);
            *self.root_mut() = Some(Box::new(root));
            return;
        }

        // I2: 选择插入位置
        let path = self.choose_subtree_path(entry.mbr(), level);

        // I3: 添加条目到选中的节点
        let max_entries = self.max_entries();
        let Some(node) = self.get_last_node_mut(&path) else {
            warn!(?path, "failed to get target node during insertion");
            return;
        };
        node.add_entry(entry);

        // I4: 检查是否需要分裂并调整树
        if node.is_overflowing(max_entries) {
            self.split_and_propagate(path);
        } else {
            self.adjust_tree_upward(&path);
        }
    }

    /// 选择子树路径 - 遵循论文ChooseLeaf算法，可以停在任意层级
    ///
    /// 返回从根节点到目标节点的条目下标序列
    pub(crate) fn choose_subtree_path(&self, rect: &Rectangle, level: usize) -> Vec<usize> {
        let mut path = Vec::new();

        // CL1: 初始化，从根节点开始
        let mut current: &Node<T> = match self.root_ref() {
            Some(root) => root,
            None => return path,
        };

        // CL2: 层级检查
        while current.level > level {
            // CL3: 选择子树 - 选择扩大面积最小的条目
            let Some(best_index) = self.choose_subtree(&current.entries, rect) else {
                break;
            };
            path.push(best_index);

            // CL4: 下降到子节点
            match current.entries[best_index].child() {
                Some(child) => current = child,
                None => break,
            }
        }

        path
    }

    /// 选择子树 - 计算扩大面积最小的条目
    ///
    /// 扩大面积相同时选择扩大后面积更小的条目；仍然相同时保留先遇到的条目
    pub(crate) fn choose_subtree(&self, entries: &[Entry<T>], rect: &Rectangle) -> Option<usize> {
        let mut best: Option<(usize, f64, f64)> = None;

        for (i, entry) in entries.iter().enumerate() {
            let mbr = entry.mbr();
            let expanded_area = mbr.expand(rect).area();
            let enlargement = expanded_area - mbr.area();

            let better = match best {
                None => true,
                Some((_, best_enlargement, best_area)) => {
                    enlargement < best_enlargement
                        || (enlargement == best_enlargement && expanded_area < best_area)
                }
            };
            if better {
                best = Some((i, enlargement, expanded_area));
            }
        }

        best.map(|(index, _, _)| index)
    }
}
