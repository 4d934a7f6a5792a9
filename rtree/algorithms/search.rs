use super::super::node::{Entry, Node, Record};
use super::super::rectangle::Rectangle;
use super::super::rtree::RTree;
use super::utils::geometry_to_bbox;
use crate::error::Result;

/// 搜索操作相关算法
impl<T> RTree<T> {
    /// 搜索与查询矩形相交的所有数据记录（边界相接也算相交）
    ///
    /// 结果没有固定顺序；空树返回空列表
    pub fn search(&self, query: &Rectangle) -> Vec<&Record<T>> {
        let mut results = Vec::new();

        if let Some(root) = self.root_ref() {
            self.search_recursive(root, query, &mut results);
        }

        results
    }

    /// 搜索与查询矩形相交的所有数据，只返回用户数据
    pub fn search_values(&self, query: &Rectangle) -> Vec<&T> {
        self.search(query).into_iter().map(Record::data).collect()
    }

    /// 用几何体的边界框搜索
    pub fn search_geometry(&self, geometry: &geo::Geometry<f64>) -> Result<Vec<&Record<T>>> {
        let bbox = geometry_to_bbox(geometry)?;
        Ok(self.search(&bbox))
    }

    /// 递归搜索 - 遵循论文Search算法
    fn search_recursive<'a>(&'a self, node: &'a Node<T>, query: &Rectangle, results: &mut Vec<&'a Record<T>>) {
        for entry in &node.entries {
            // S1: 跳过不相交的子树
            if !entry.mbr().intersects(query) {
                continue;
            }
            match entry {
                // S2: 叶子节点中的记录直接加入结果
                Entry::Data(record) => results.push(record),
                Entry::Node { node, .. } => self.search_recursive(node, query, results),
            }
        }
    }
}
