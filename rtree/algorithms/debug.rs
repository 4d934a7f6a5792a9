use super::super::node::{Entry, EntryId, Node, NodeType};
use super::super::rectangle::Rectangle;
use super::super::rtree::RTree;
use crate::config::TreeConfig;
use crate::error::{RTreeError, Result};
use serde::Serialize;
use std::fmt;

/// 用于JSON序列化的简化树结构
#[derive(Debug, Serialize)]
pub struct TreeVisualization<'a, T> {
    /// 根节点（如果存在）
    pub root: Option<NodeVisualization<'a, T>>,
    /// 树的配置参数
    pub config: TreeConfig,
    pub size: usize,
    pub height: usize,
}

/// 用于JSON序列化的节点结构
#[derive(Debug, Serialize)]
pub struct NodeVisualization<'a, T> {
    /// 节点的最小边界矩形
    pub mbr: Rectangle,
    /// 节点类型
    pub node_type: NodeType,
    /// 节点层级
    pub level: usize,
    /// 数据条目（仅叶子节点）
    pub data_entries: Vec<DataEntry<'a, T>>,
    /// 子节点（仅索引节点）
    pub child_nodes: Vec<NodeVisualization<'a, T>>,
}

/// 用于JSON序列化的数据条目
#[derive(Debug, Serialize)]
pub struct DataEntry<'a, T> {
    pub id: EntryId,
    pub mbr: Rectangle,
    pub data: &'a T,
}

/// 文本形式的树：第一行是 `size: N, height: H`，之后每个条目的矩形一行，
/// 按深度缩进，叶子条目的数据再缩进一层写在矩形下面
impl<T: fmt::Display> fmt::Display for RTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "size: {}, height: {}", self.len(), self.height())?;
        for (depth, entry) in self.iter() {
            let indent = "  ".repeat(depth);
            writeln!(f, "{}{}", indent, entry.mbr())?;
            if let Entry::Data(record) = entry {
                writeln!(f, "{}  {}", indent, record.data())?;
            }
        }
        Ok(())
    }
}

impl<T: Serialize> RTree<T> {
    /// 导出树结构为JSON格式
    ///
    /// 返回包含完整树结构的JSON字符串，用于前端可视化
    pub fn export_to_json(&self) -> Result<String> {
        let visualization = self.create_tree_visualization();
        Ok(serde_json::to_string_pretty(&visualization)?)
    }

    /// 创建用于可视化的树结构
    fn create_tree_visualization(&self) -> TreeVisualization<'_, T> {
        TreeVisualization {
            root: self.root().map(|node| self.create_node_visualization(node)),
            config: self.config(),
            size: self.len(),
            height: self.height(),
        }
    }

    /// 递归创建节点的可视化结构
    fn create_node_visualization<'a>(&'a self, node: &'a Node<T>) -> NodeVisualization<'a, T> {
        let mut data_entries = Vec::new();
        let mut child_nodes = Vec::new();

        for entry in &node.entries {
            match entry {
                Entry::Data(record) => data_entries.push(DataEntry {
                    id: record.id(),
                    mbr: *record.mbr(),
                    data: record.data(),
                }),
                Entry::Node { node: child, .. } => {
                    child_nodes.push(self.create_node_visualization(child));
                }
            }
        }

        NodeVisualization {
            mbr: node.mbr(),
            node_type: node.node_type,
            level: node.level,
            data_entries,
            child_nodes,
        }
    }
}

/// R-tree调试功能实现
impl<T> RTree<T> {
    /// 检查树的结构不变量
    ///
    /// 包括节点条目数范围、层级关系、叶子深度一致、索引条目MBR紧贴子节点、`len()` 与数据条目数一致
    pub fn check_invariants(&self) -> Result<()> {
        let Some(root) = self.root() else {
            if self.len() != 0 {
                return Err(RTreeError::Corrupted(format!(
                    "tree has no root but size is {}",
                    self.len()
                )));
            }
            return Ok(());
        };

        if root.is_empty() {
            return Err(RTreeError::Corrupted("root node has no entries".to_string()));
        }
        if root.is_overflowing(self.max_entries()) {
            return Err(RTreeError::Corrupted(format!(
                "root node has {} entries, more than {}",
                root.len(),
                self.max_entries()
            )));
        }

        let mut count = 0;
        self.check_node(root, true, &mut count)?;

        if count != self.len() {
            return Err(RTreeError::Corrupted(format!(
                "size is {} but the leaves hold {} records",
                self.len(),
                count
            )));
        }
        Ok(())
    }

    fn check_node(&self, node: &Node<T>, is_root: bool, count: &mut usize) -> Result<()> {
        if !is_root
            && (node.needs_more_entries(self.min_entries()) || node.is_overflowing(self.max_entries()))
        {
            return Err(RTreeError::Corrupted(format!(
                "node at level {} has {} entries, outside [{}, {}]",
                node.level,
                node.len(),
                self.min_entries(),
                self.max_entries()
            )));
        }

        match node.node_type {
            NodeType::Leaf => {
                // 所有叶子都在第0层，因此在同一深度
                if node.level != 0 {
                    return Err(RTreeError::Corrupted(format!(
                        "leaf node at level {}",
                        node.level
                    )));
                }
                if !node.entries.iter().all(Entry::is_data) {
                    return Err(RTreeError::Corrupted("leaf node holds a child node".to_string()));
                }
                *count += node.len();
            }
            NodeType::Index => {
                if node.level == 0 {
                    return Err(RTreeError::Corrupted("index node at level 0".to_string()));
                }
                for entry in &node.entries {
                    let Entry::Node { mbr, node: child } = entry else {
                        return Err(RTreeError::Corrupted("index node holds a data record".to_string()));
                    };
                    if child.level + 1 != node.level {
                        return Err(RTreeError::Corrupted(format!(
                            "child at level {} under node at level {}",
                            child.level, node.level
                        )));
                    }
                    if *mbr != child.mbr() {
                        return Err(RTreeError::Corrupted(format!(
                            "entry rect {} does not match child bounds {}",
                            mbr,
                            child.mbr()
                        )));
                    }
                    self.check_node(child, false, count)?;
                }
            }
        }
        Ok(())
    }
}
