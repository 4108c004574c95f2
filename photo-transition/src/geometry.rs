//! # Geometry 模块
//!
//! 转场计算用到的二维几何类型：点/向量、尺寸、矩形。
//!
//! 坐标系约定与宿主 UI 一致：原点在左上角，y 轴向下。

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// 二维向量（也用作点）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// 创建新的向量
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 零向量
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// 尺寸
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }
}

/// 矩形（origin + size）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Size,
}

impl Rect {
    /// 创建新的矩形
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// 零矩形
    ///
    /// 兼容层查询失败时返回它，而不是报错。
    pub const fn zero() -> Self {
        Self {
            origin: Vec2::zero(),
            size: Size::zero(),
        }
    }

    /// 以原点为起点、与自身同尺寸的矩形
    pub fn bounds(&self) -> Self {
        Self {
            origin: Vec2::zero(),
            size: self.size,
        }
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    /// 中心点
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// 保持尺寸，移动到以 `center` 为中心
    pub fn with_center(&self, center: Vec2) -> Self {
        Self {
            origin: Vec2::new(
                center.x - self.size.width / 2.0,
                center.y - self.size.height / 2.0,
            ),
            size: self.size,
        }
    }

    /// 平移
    pub fn offset(&self, delta: Vec2) -> Self {
        Self {
            origin: self.origin + delta,
            size: self.size,
        }
    }
}
