//! # Gesture 模块
//!
//! 拖拽手势样本的定义。
//!
//! 引擎不依赖任何具体的手势识别机制：宿主把识别器的每次回调整理成一个
//! [`DragSample`]，通过 `TransitionEngine::handle_drag_sample` 送入。
//! 同一串样本可以原样回放，得到确定的结果。

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;

/// 拖拽阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

/// 一次拖拽样本
///
/// - `translation`: 相对手势起点的累计位移
/// - `velocity`: 瞬时速度（点/秒），只在 `Ended` 时参与决策
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragSample {
    pub phase: DragPhase,
    #[serde(default)]
    pub translation: Vec2,
    #[serde(default)]
    pub velocity: Vec2,
}

impl DragSample {
    /// 创建样本
    pub fn new(phase: DragPhase, translation: Vec2, velocity: Vec2) -> Self {
        Self {
            phase,
            translation,
            velocity,
        }
    }

    /// 手势开始（位移为零）
    pub fn began() -> Self {
        Self::new(DragPhase::Began, Vec2::zero(), Vec2::zero())
    }

    /// 手势移动
    pub fn changed(translation: Vec2) -> Self {
        Self::new(DragPhase::Changed, translation, Vec2::zero())
    }

    /// 手势抬起
    pub fn ended(translation: Vec2, velocity: Vec2) -> Self {
        Self::new(DragPhase::Ended, translation, velocity)
    }

    /// 手势被系统取消
    pub fn cancelled(translation: Vec2) -> Self {
        Self::new(DragPhase::Cancelled, translation, Vec2::zero())
    }

    /// 是否为结束类样本（`Ended` / `Cancelled`）
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, DragPhase::Ended | DragPhase::Cancelled)
    }
}
