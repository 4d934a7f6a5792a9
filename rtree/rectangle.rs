use crate::error::RTreeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 矩形边界框 - 用于表示R-tree中的最小边界矩形(MBR)
///
/// 值语义：相等比较是逐字段精确比较（无误差容忍），所有几何运算都返回新矩形。
/// 面积为0的矩形、线段和点都是合法的。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rectangle {
    pub min: [f64; 2], // [x_min, y_min]
    pub max: [f64; 2], // [x_max, y_max]
}

impl Rectangle {
    /// 创建新的矩形
    ///
    /// # Panics
    /// 当 `x_min > x_max` 或 `y_min > y_max` 时 panic，需要可恢复错误时请使用 [`Rectangle::try_new`]
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        assert!(x_min <= x_max && y_min <= y_max, "Invalid rectangle bounds");
        Rectangle {
            min: [x_min, y_min],
            max: [x_max, y_max],
        }
    }

    /// 创建矩形，边界非法或坐标非有限值时返回错误
    pub fn try_new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<Self, RTreeError> {
        if ![x_min, y_min, x_max, y_max].iter().all(|v| v.is_finite()) {
            return Err(RTreeError::InvalidRectangle(format!(
                "non-finite bounds ({}, {}, {}, {})",
                x_min, y_min, x_max, y_max
            )));
        }
        if x_min > x_max || y_min > y_max {
            return Err(RTreeError::InvalidRectangle(format!(
                "inverted bounds ({}, {}, {}, {})",
                x_min, y_min, x_max, y_max
            )));
        }
        Ok(Rectangle {
            min: [x_min, y_min],
            max: [x_max, y_max],
        })
    }

    /// 创建一个点矩形
    pub fn from_point(x: f64, y: f64) -> Self {
        Rectangle {
            min: [x, y],
            max: [x, y],
        }
    }

    /// 计算一组矩形的最小边界矩形，空集合返回 None
    pub fn bounding<'a, I>(rects: I) -> Option<Rectangle>
    where
        I: IntoIterator<Item = &'a Rectangle>,
    {
        let mut iter = rects.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, rect| acc.expand(rect)))
    }

    pub fn x_min(&self) -> f64 {
        self.min[0]
    }

    pub fn y_min(&self) -> f64 {
        self.min[1]
    }

    pub fn x_max(&self) -> f64 {
        self.max[0]
    }

    pub fn y_max(&self) -> f64 {
        self.max[1]
    }

    /// 矩形宽度（X方向跨度）
    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    /// 矩形高度（Y方向跨度）
    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// 计算矩形面积
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// 计算矩形周长
    pub fn perimeter(&self) -> f64 {
        2.0 * (self.width() + self.height())
    }

    /// 计算两个矩形的并集MBR
    pub fn expand(&self, other: &Rectangle) -> Rectangle {
        Rectangle {
            min: [self.min[0].min(other.min[0]), self.min[1].min(other.min[1])],
            max: [self.max[0].max(other.max[0]), self.max[1].max(other.max[1])],
        }
    }

    /// [`Rectangle::expand`] 的别名
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        self.expand(other)
    }

    /// 判断两个矩形是否相交（边界接触也算相交）
    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.min[0] <= other.max[0]
            && self.max[0] >= other.min[0]
            && self.min[1] <= other.max[1]
            && self.max[1] >= other.min[1]
    }

    /// 判断当前矩形是否包含另一个矩形（边界重合也算包含）
    pub fn contains(&self, other: &Rectangle) -> bool {
        self.min[0] <= other.min[0]
            && self.min[1] <= other.min[1]
            && self.max[0] >= other.max[0]
            && self.max[1] >= other.max[1]
    }

    /// 判断当前矩形是否包含一个点
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.min[0] <= x && x <= self.max[0] && self.min[1] <= y && y <= self.max[1]
    }

    /// 计算两个矩形的交集
    ///
    /// 只有当结果在两个方向上同时退化（`x_min >= x_max` 且 `y_min >= y_max`）时才返回 None。
    /// 只在一个方向上退化的结果（共享的边或线段）仍然返回 Some。
    pub fn intersection(&self, other: &Rectangle) -> Option<Rectangle> {
        let x_min = self.min[0].max(other.min[0]);
        let y_min = self.min[1].max(other.min[1]);
        let x_max = self.max[0].min(other.max[0]);
        let y_max = self.max[1].min(other.max[1]);

        if x_min >= x_max && y_min >= y_max {
            return None;
        }

        Some(Rectangle {
            min: [x_min, y_min],
            max: [x_max, y_max],
        })
    }

    /// 计算扩大到包含另一个矩形所需的面积增量
    pub fn enlargement(&self, other: &Rectangle) -> f64 {
        self.expand(other).area() - self.area()
    }

    /// 计算矩形中心点
    pub fn center(&self) -> [f64; 2] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
        ]
    }

    /// 判断矩形是否为点（宽度和高度都为0）
    pub fn is_point(&self) -> bool {
        self.min[0] == self.max[0] && self.min[1] == self.max[1]
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect({}, {}, {}, {})",
            self.min[0], self.min[1], self.max[0], self.max[1]
        )
    }
}
