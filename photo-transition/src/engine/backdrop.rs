//! # Backdrop 模块
//!
//! 照片详情页下方的全屏遮罩层，转场期间在透明与不透明之间过渡。

use std::cell::Cell;

use crate::animation::Animatable;

/// 可动画的全屏遮罩
///
/// ## 支持的属性
///
/// - `"alpha"`: 遮罩透明度 (0.0 - 1.0)
#[derive(Debug)]
pub struct Backdrop {
    alpha: Cell<f32>,
}

impl Backdrop {
    /// 支持的属性列表
    pub const PROPERTIES: &'static [&'static str] = &["alpha"];

    /// 创建新的遮罩（完全透明）
    pub fn new() -> Self {
        Self {
            alpha: Cell::new(0.0),
        }
    }

    /// 当前透明度
    pub fn alpha(&self) -> f32 {
        self.alpha.get()
    }

    /// 设置透明度
    pub fn set_alpha(&self, alpha: f32) {
        self.alpha.set(alpha.clamp(0.0, 1.0));
    }
}

impl Default for Backdrop {
    fn default() -> Self {
        Self::new()
    }
}

impl Animatable for Backdrop {
    fn get_property(&self, property_id: &str) -> Option<f32> {
        match property_id {
            "alpha" => Some(self.alpha()),
            _ => None,
        }
    }

    fn set_property(&self, property_id: &str, value: f32) -> bool {
        match property_id {
            "alpha" => {
                self.set_alpha(value);
                true
            }
            _ => false,
        }
    }

    fn property_list(&self) -> &'static [&'static str] {
        Self::PROPERTIES
    }
}
