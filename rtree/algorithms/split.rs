use super::super::node::{Entry, Node};
use super::super::rectangle::Rectangle;
use super::super::rtree::RTree;
use tracing::{debug, warn};

/// 节点分裂算法 - 线性分裂(Linear Split)
impl<T> RTree<T> {
    /// 分裂溢出的节点并向上传播
    ///
    /// `path` 指向刚刚溢出的节点。节点分裂后，新的兄弟节点被加入父节点；
    /// 如果父节点也溢出则继续向上分裂，根节点分裂时树长高一层。
    pub(crate) fn split_and_propagate(&mut self, mut path: Vec<usize>) {
        let max_entries = self.max_entries();

        loop {
            // 获取要分裂的节点并提取其条目
            let (entries, node_type, level) = {
                let Some(node) = self.get_last_node_mut(&path) else {
                    warn!(?path, "failed to get node during split");
                    return;
                };

                if !node.is_overflowing(max_entries) {
                    // 只需要更新MBR
                    self.adjust_tree_upward(&path);
                    return;
                }

                (std::mem::take(&mut node.entries), node.node_type, node.level)
            };

            let (group_a, group_b) = self.linear_split(entries);
            debug!(
                node_level = level,
                left = group_a.len(),
                right = group_b.len(),
                "split overflowing node"
            );

            // 原节点保留A组
            if let Some(node) = self.get_last_node_mut(&path) {
                node.entries = group_a;
            }
            let sibling = Node::with_entries(node_type, level, group_b);

            let Some(index) = path.pop() else {
                // 根节点分裂 - 创建新的根节点
                let Some(old_root) = self.root_mut().take() else {
                    return;
                };
                let mut new_root = Node::new_index_node(level + 1);
                new_root.add_entry(Entry::from_child(*old_root));
                new_root.add_entry(Entry::from_child(sibling));
                *self.root_mut() = Some(Box::new(new_root));
                debug!(height = self.height(), "root split, tree grew");
                return;
            };

            // 更新父节点中原节点的MBR，并把兄弟节点加入父节点
            let Some(parent) = self.get_last_node_mut(&path) else {
                warn!(?path, "failed to get parent node during split propagation");
                return;
            };
            if let Some(entry) = parent.entries.get_mut(index) {
                entry.refresh_mbr();
            }
            parent.add_entry(Entry::from_child(sibling));
            // 下一轮检查父节点
        }
    }

    /// 线性分裂算法 - 遵循Gut84.pdf论文Algorithm LinearSplit
    ///
    /// 返回 (A组, B组)，两组的条目数都在 `[min_entries, max_entries]` 之间
    pub(crate) fn linear_split(&self, mut entries: Vec<Entry<T>>) -> (Vec<Entry<T>>, Vec<Entry<T>>) {
        let min_entries = self.min_entries();

        // LS1: 选择种子
        let (seed_a, seed_b) = self.linear_pick_seeds(&entries);

        // 先移除下标大的，避免下标失效
        let (first, second) = if seed_a > seed_b {
            (seed_a, seed_b)
        } else {
            (seed_b, seed_a)
        };
        let removed_first = entries.remove(first);
        let removed_second = entries.remove(second);
        let (entry_a, entry_b) = if seed_a > seed_b {
            (removed_first, removed_second)
        } else {
            (removed_second, removed_first)
        };

        let mut rect_a = *entry_a.mbr();
        let mut rect_b = *entry_b.mbr();
        let mut group_a = vec![entry_a];
        let mut group_b = vec![entry_b];

        // LS2: 依次分配剩余条目（从末尾弹出）
        while let Some(entry) = entries.pop() {
            let remaining = entries.len();

            // 剩余条目刚好够某一组达到最小条目数时，强制分配给该组
            if remaining + group_a.len() <= min_entries {
                rect_a = rect_a.expand(entry.mbr());
                group_a.push(entry);
                continue;
            }
            if remaining + group_b.len() <= min_entries {
                rect_b = rect_b.expand(entry.mbr());
                group_b.push(entry);
                continue;
            }

            // LS3: 分配给扩大面积较小的组；相同时分配给面积较小的组；仍相同时分配给B组
            let expanded_a = rect_a.expand(entry.mbr());
            let expanded_b = rect_b.expand(entry.mbr());
            let enlarge_a = expanded_a.area() - rect_a.area();
            let enlarge_b = expanded_b.area() - rect_b.area();

            let prefer_a = enlarge_a < enlarge_b
                || (enlarge_a == enlarge_b && rect_a.area() < rect_b.area());

            if prefer_a {
                group_a.push(entry);
                rect_a = expanded_a;
            } else {
                group_b.push(entry);
                rect_b = expanded_b;
            }
        }

        (group_a, group_b)
    }

    /// LinearPickSeeds算法 - 选择两个条目作为种子
    ///
    /// 对每个维度，找到下边界最高的条目和上边界最低的条目，
    /// 用所有条目的边界框在该维度的跨度归一化两者的间隔，选择归一化间隔更大的维度。
    /// 两个维度相同时使用Y维度。
    pub(crate) fn linear_pick_seeds(&self, entries: &[Entry<T>]) -> (usize, usize) {
        let bound = Rectangle::bounding(entries.iter().map(Entry::mbr)).unwrap_or_default();

        let (low_x, high_x) = find_extremes(entries, 0);
        let (low_y, high_y) = find_extremes(entries, 1);

        let separation_x = normalized_separation(entries, low_x, high_x, 0, bound.width());
        let separation_y = normalized_separation(entries, low_y, high_y, 1, bound.height());

        let (seed_a, seed_b) = if separation_x > separation_y {
            (low_x, high_x)
        } else {
            (low_y, high_y)
        };

        if seed_a != seed_b {
            return (seed_a, seed_b);
        }

        // 同一个条目同时是两个极值时，第二个种子换成第一个不同的条目
        let other = if seed_a == 0 { 1 } else { 0 };
        (seed_a, other)
    }
}

/// 在指定维度上找到下边界最高的条目和上边界最低的条目
///
/// 返回 (下边界最高的下标, 上边界最低的下标)，相同值时保留先遇到的条目
fn find_extremes<T>(entries: &[Entry<T>], axis: usize) -> (usize, usize) {
    let mut highest_low = 0;
    let mut lowest_high = 0;

    for (i, entry) in entries.iter().enumerate().skip(1) {
        let mbr = entry.mbr();
        if mbr.min[axis] > entries[highest_low].mbr().min[axis] {
            highest_low = i;
        }
        if mbr.max[axis] < entries[lowest_high].mbr().max[axis] {
            lowest_high = i;
        }
    }

    (highest_low, lowest_high)
}

/// 两个极值条目的间隔除以该维度的总跨度；跨度为0时间隔视为0
fn normalized_separation<T>(
    entries: &[Entry<T>],
    highest_low: usize,
    lowest_high: usize,
    axis: usize,
    span: f64,
) -> f64 {
    if span <= 0.0 {
        return 0.0;
    }
    let separation = entries[highest_low].mbr().min[axis] - entries[lowest_high].mbr().max[axis];
    separation / span
}
