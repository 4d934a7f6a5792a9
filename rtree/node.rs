use super::rectangle::Rectangle;
use derive_more::Display;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// 全进程唯一的条目ID分配器
///
/// 不同的树永远不会分配出相同的ID，因此来自其他树的句柄在删除时一定匹配不到任何条目
static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(1);

/// 数据条目的身份标识
///
/// R-tree 按身份而不是按值删除条目：两个矩形和数据都相同的条目仍然是两个不同的条目
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[display(fmt = "#{}", _0)]
pub struct EntryId(u64);

impl EntryId {
    pub(crate) fn next() -> Self {
        EntryId(NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// 数据条目的句柄
///
/// 由 `insert` 返回，或通过 [`Record::handle`] 从搜索结果中取得，之后交给 `delete` 使用。
/// 句柄携带条目的矩形，删除时用它剪枝不可能包含该条目的子树。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryHandle {
    pub(crate) id: EntryId,
    pub(crate) mbr: Rectangle,
}

impl EntryHandle {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn mbr(&self) -> &Rectangle {
        &self.mbr
    }
}

/// 叶子层的数据记录：矩形 + 用户数据 + 身份ID
#[derive(Debug, Clone)]
pub struct Record<T> {
    pub(crate) id: EntryId,
    pub(crate) mbr: Rectangle,
    pub(crate) data: T,
}

impl<T> Record<T> {
    pub(crate) fn new(mbr: Rectangle, data: T) -> Self {
        Record {
            id: EntryId::next(),
            mbr,
            data,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn mbr(&self) -> &Rectangle {
        &self.mbr
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    /// 取得可以交给 `delete` 的句柄
    pub fn handle(&self) -> EntryHandle {
        EntryHandle {
            id: self.id,
            mbr: self.mbr,
        }
    }

    pub(crate) fn into_data(self) -> T {
        self.data
    }
}

impl<T> From<&Record<T>> for EntryHandle {
    fn from(record: &Record<T>) -> Self {
        record.handle()
    }
}

/// R-tree节点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeType {
    /// 叶子节点：包含用户插入的数据记录
    Leaf,
    /// 索引节点：包含指向子节点的条目
    Index,
}

/// R-tree节点条目
///
/// - Data条目：存储用户数据记录，只出现在叶子节点中
/// - Node条目：存储子节点，只出现在索引节点中；其MBR始终是子节点所有条目的最小边界矩形
#[derive(Debug, Clone)]
pub enum Entry<T> {
    Data(Record<T>),
    Node { mbr: Rectangle, node: Box<Node<T>> },
}

impl<T> Entry<T> {
    /// 用子节点创建索引条目，MBR 由子节点的条目计算得出
    pub(crate) fn from_child(node: Node<T>) -> Self {
        Entry::Node {
            mbr: node.mbr(),
            node: Box::new(node),
        }
    }

    /// 获取条目的MBR（最小边界矩形）
    pub fn mbr(&self) -> &Rectangle {
        match self {
            Entry::Data(record) => &record.mbr,
            Entry::Node { mbr, .. } => mbr,
        }
    }

    /// 重新计算索引条目的MBR，使其紧贴子节点的所有条目
    pub(crate) fn refresh_mbr(&mut self) {
        if let Entry::Node { mbr, node } = self {
            *mbr = node.mbr();
        }
    }

    /// 检查是否为数据条目
    pub fn is_data(&self) -> bool {
        matches!(self, Entry::Data(_))
    }

    /// 获取数据记录（如果是数据条目）
    pub fn record(&self) -> Option<&Record<T>> {
        match self {
            Entry::Data(record) => Some(record),
            Entry::Node { .. } => None,
        }
    }

    /// 获取子节点（如果是节点条目）
    pub fn child(&self) -> Option<&Node<T>> {
        match self {
            Entry::Data(_) => None,
            Entry::Node { node, .. } => Some(node),
        }
    }

    pub(crate) fn child_mut(&mut self) -> Option<&mut Node<T>> {
        match self {
            Entry::Data(_) => None,
            Entry::Node { node, .. } => Some(node),
        }
    }
}

/// 条目的文本形式：`<数据, 矩形>`，索引条目的数据部分是子节点
impl<T: fmt::Display> fmt::Display for Entry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Data(record) => write!(f, "<{}, {}>", record.data, record.mbr),
            Entry::Node { mbr, node } => write!(f, "<{}, {}>", node, mbr),
        }
    }
}

/// R-tree节点
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// 节点包含的条目列表，顺序无意义
    pub(crate) entries: Vec<Entry<T>>,

    /// 叶子节点只包含 Entry::Data，索引节点只包含 Entry::Node
    pub(crate) node_type: NodeType,

    /// 节点所在层级：叶子层为0，父节点层级 = 子节点层级 + 1
    pub(crate) level: usize,
}

impl<T> Node<T> {
    /// 创建新的叶子节点，层级固定为0
    pub fn new_leaf_node() -> Self {
        Self::new(NodeType::Leaf, 0)
    }

    /// 创建新的索引节点，`level` 必须 > 0
    pub fn new_index_node(level: usize) -> Self {
        debug_assert!(level > 0, "index nodes live above the leaf level");
        Self::new(NodeType::Index, level)
    }

    /// 创建指定类型和层级的空节点
    pub fn new(node_type: NodeType, level: usize) -> Self {
        Node {
            entries: Vec::new(),
            node_type,
            level,
        }
    }

    pub(crate) fn with_entries(node_type: NodeType, level: usize, entries: Vec<Entry<T>>) -> Self {
        Node {
            entries,
            node_type,
            level,
        }
    }

    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// 检查是否为叶子节点
    pub fn is_leaf_node(&self) -> bool {
        matches!(self.node_type, NodeType::Leaf)
    }

    /// 检查是否为索引节点
    pub fn is_index_node(&self) -> bool {
        matches!(self.node_type, NodeType::Index)
    }

    /// 计算包含所有条目的最小边界矩形
    ///
    /// 空节点返回零矩形；树中只会短暂地出现空节点
    pub fn mbr(&self) -> Rectangle {
        Rectangle::bounding(self.entries.iter().map(Entry::mbr)).unwrap_or_default()
    }

    /// 添加条目到节点
    ///
    /// 调用者需要确保条目类型与节点类型匹配
    pub(crate) fn add_entry(&mut self, entry: Entry<T>) {
        debug_assert_eq!(entry.is_data(), self.is_leaf_node());
        self.entries.push(entry);
    }

    /// 检查节点是否溢出（超过最大条目数）
    pub fn is_overflowing(&self, max_entries: usize) -> bool {
        self.entries.len() > max_entries
    }

    /// 检查节点是否需要更多条目
    pub fn needs_more_entries(&self, min_entries: usize) -> bool {
        self.entries.len() < min_entries
    }
}

impl<T: fmt::Display> fmt::Display for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", entry)?;
        }
        write!(f, "]")
    }
}
