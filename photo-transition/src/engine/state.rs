//! 转场方向与阶段

use serde::{Deserialize, Serialize};

/// 转场方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionDirection {
    /// 从缩略图进入照片详情
    Present,
    /// 从照片详情返回缩略图
    Dismiss,
}

impl std::fmt::Display for TransitionDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Dismiss => write!(f, "dismiss"),
        }
    }
}

/// 引擎阶段
///
/// ```text
/// Idle ──present──▶ Presenting ──动画结束──▶ Idle
/// Idle ──dismiss──▶ Dismissing ──动画结束──▶ Idle
/// Idle ──began────▶ InteractiveTracking ──ended──▶ Completing ──▶ Idle
///                                         └──────▶ Cancelling ──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPhase {
    #[default]
    Idle,
    Presenting,
    Dismissing,
    InteractiveTracking,
    Completing,
    Cancelling,
}

impl TransitionPhase {
    pub fn is_idle(self) -> bool {
        self == Self::Idle
    }

    /// 是否由动画驱动（而非手势）
    pub fn is_animating(self) -> bool {
        matches!(
            self,
            Self::Presenting | Self::Dismissing | Self::Completing | Self::Cancelling
        )
    }

    /// 是否正在交互式关闭（跟手或松手后的动画）
    pub fn is_interactive(self) -> bool {
        matches!(
            self,
            Self::InteractiveTracking | Self::Completing | Self::Cancelling
        )
    }
}

impl std::fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Presenting => "presenting",
            Self::Dismissing => "dismissing",
            Self::InteractiveTracking => "interactive_tracking",
            Self::Completing => "completing",
            Self::Cancelling => "cancelling",
        };
        write!(f, "{name}")
    }
}
