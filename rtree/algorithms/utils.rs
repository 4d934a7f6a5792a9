use super::super::node::Node;
use super::super::rectangle::Rectangle;
use super::super::rtree::RTree;
use crate::error::{RTreeError, Result};
use geo::BoundingRect;
use tracing::warn;

/// 从 geo::Geometry 计算边界框
pub fn geometry_to_bbox(geometry: &geo::Geometry<f64>) -> Result<Rectangle> {
    match geometry.bounding_rect() {
        Some(rect) => Ok(Rectangle::from(rect)),
        None => Err(RTreeError::InvalidRectangle(
            "Cannot calculate bounding box for empty geometry".to_string(),
        )),
    }
}

impl From<geo::Rect<f64>> for Rectangle {
    fn from(rect: geo::Rect<f64>) -> Self {
        // geo::Rect 构造时已经规范化了最小/最大角点
        Rectangle {
            min: [rect.min().x, rect.min().y],
            max: [rect.max().x, rect.max().y],
        }
    }
}

impl From<Rectangle> for geo::Rect<f64> {
    fn from(rect: Rectangle) -> Self {
        geo::Rect::new(
            geo::coord! { x: rect.min[0], y: rect.min[1] },
            geo::coord! { x: rect.max[0], y: rect.max[1] },
        )
    }
}

/// R-tree工具函数实现
impl<T> RTree<T> {
    /// 向上调整树 - 更新MBR
    ///
    /// `path` 是从根节点到某个节点的条目下标序列。从路径末端开始逐层向上，
    /// 把父节点中指向子节点的条目MBR重新计算为子节点条目的最小边界矩形。
    pub(crate) fn adjust_tree_upward(&mut self, path: &[usize]) {
        for depth in (0..path.len()).rev() {
            let Some(parent) = self.get_last_node_mut(&path[..depth]) else {
                warn!(depth, "failed to get parent node during MBR update");
                return;
            };
            match parent.entries.get_mut(path[depth]) {
                Some(entry) => entry.refresh_mbr(),
                None => {
                    warn!(depth, index = path[depth], "dangling entry index during MBR update");
                    return;
                }
            }
        }
    }

    /// 获取路径中最后一个节点的可变引用
    ///
    /// 根据给定的路径从根节点开始遍历，返回路径末端节点的可变引用
    pub(crate) fn get_last_node_mut(&mut self, path: &[usize]) -> Option<&mut Node<T>> {
        let mut current: &mut Node<T> = self.root_mut().as_deref_mut()?;

        for &index in path {
            current = current.entries.get_mut(index)?.child_mut()?;
        }

        Some(current)
    }

    /// 获取路径中最后一个节点的只读引用
    #[cfg(test)]
    pub(crate) fn get_last_node(&self, path: &[usize]) -> Option<&Node<T>> {
        let mut current: &Node<T> = self.root_ref().as_deref()?;

        for &index in path {
            current = current.entries.get(index)?.child()?;
        }

        Some(current)
    }
}
