// R-tree算法模块
//
// 这个模块包含R-tree的所有核心算法实现，按功能分解为不同的子模块：
// - search: 搜索和查询算法
// - insert: 插入和树构建算法
// - split: 节点分裂算法（线性分裂）
// - delete: 删除和树维护算法（CondenseTree）
// - random: 随机采样
// - utils: 共用的工具函数
// - debug: 调试和可视化工具

pub mod debug;
pub mod delete;
pub mod insert;
pub mod random;
pub mod search;
pub mod split;
pub mod utils;
