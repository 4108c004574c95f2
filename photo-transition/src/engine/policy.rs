//! # Policy 模块
//!
//! 交互式关闭的数值策略：位移换算进度、松手时的完成判定、回落动画时长。

use crate::config::TransitionConfig;
use crate::context::TransitionOutcome;
use crate::geometry::Vec2;

/// 交互式关闭策略
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DismissPolicy {
    /// 完成所需进度
    pub completion_threshold: f32,
    /// 完成所需速度（点/秒）
    pub velocity_threshold: f32,
    /// 向上拖动是否也算关闭
    pub allow_upward: bool,
    /// 满程回落时长
    pub settle_duration: f32,
    /// 最短回落时长
    pub min_settle_duration: f32,
}

impl DismissPolicy {
    pub fn from_config(config: &TransitionConfig) -> Self {
        Self {
            completion_threshold: config.completion_threshold,
            velocity_threshold: config.velocity_threshold,
            allow_upward: config.allow_upward_dismiss,
            settle_duration: config.settle_duration,
            min_settle_duration: config.min_settle_duration,
        }
    }

    /// 关闭方向上的位移（非负）
    pub fn displacement(&self, translation: Vec2) -> f32 {
        if self.allow_upward {
            translation.y.abs()
        } else {
            translation.y.max(0.0)
        }
    }

    /// 位移换算为进度，截断在 0.0 - 1.0
    ///
    /// `reference` 不为正时进度恒为 0，只能靠速度完成。
    pub fn progress(&self, translation: Vec2, reference: f32) -> f32 {
        if reference <= 0.0 {
            return 0.0;
        }
        (self.displacement(translation) / reference).clamp(0.0, 1.0)
    }

    /// 关闭方向上的速度分量
    ///
    /// 允许向上关闭时，方向取当前位移的方向；尚无位移时取速度自身的方向。
    pub fn dismiss_speed(&self, translation: Vec2, velocity: Vec2) -> f32 {
        if !self.allow_upward {
            return velocity.y;
        }
        if translation.y < 0.0 {
            -velocity.y
        } else if translation.y > 0.0 {
            velocity.y
        } else {
            velocity.y.abs()
        }
    }

    /// 松手时的判定
    ///
    /// 进度达到阈值，或关闭方向速度达到阈值，即完成；否则回弹。
    /// 没有位移也没有速度的松手一律回弹。
    pub fn decide(&self, translation: Vec2, velocity: Vec2, progress: f32) -> TransitionOutcome {
        let speed = self.dismiss_speed(translation, velocity);

        if self.displacement(translation) == 0.0 && speed <= 0.0 {
            return TransitionOutcome::Cancelled;
        }

        let completed = progress >= self.completion_threshold || speed >= self.velocity_threshold;
        TransitionOutcome::from_completed(completed)
    }

    /// 松手后动画时长
    ///
    /// 与剩余距离成正比：快完成时完成得更快，刚开始拖就松手时回弹得更快。
    pub fn settle_duration(&self, outcome: TransitionOutcome, progress: f32) -> f32 {
        let remaining = match outcome {
            TransitionOutcome::Completed => 1.0 - progress,
            TransitionOutcome::Cancelled => progress,
        };
        (self.settle_duration * remaining.clamp(0.0, 1.0)).max(self.min_settle_duration)
    }
}

impl Default for DismissPolicy {
    fn default() -> Self {
        Self::from_config(&TransitionConfig::default())
    }
}
