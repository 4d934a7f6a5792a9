pub mod algorithms;
pub mod node;
pub mod rectangle;
#[allow(clippy::module_inception)]
pub mod rtree;

// 重新导出主要类型
pub use algorithms::debug::{DataEntry, NodeVisualization, TreeVisualization};
pub use algorithms::utils::geometry_to_bbox;
pub use node::{Entry, EntryHandle, EntryId, Node, NodeType, Record};
pub use rectangle::Rectangle;
pub use rtree::{Iter, RTree};
