//! # Easing 模块
//!
//! 缓动曲线，用于转场动画的时间插值。

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// 缓动函数类型
///
/// 在配置文件中以 snake_case 书写，例如 `"ease_out_quad"`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// 线性（匀速）
    Linear,
    /// 缓入（三次）
    EaseIn,
    /// 缓出（三次）
    EaseOut,
    /// 缓入缓出（三次）
    #[default]
    EaseInOut,
    /// 二次缓入
    EaseInQuad,
    /// 二次缓出
    EaseOutQuad,
    /// 二次缓入缓出
    EaseInOutQuad,
    /// 正弦缓出
    EaseOutSine,
}

impl EasingFunction {
    /// 把线性时间进度映射为缓动后的进度，`t` 先截断到 0.0 - 1.0
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseIn => t * t * t,
            EasingFunction::EaseOut => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::EaseInQuad => t * t,
            EasingFunction::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingFunction::EaseOutSine => (t * PI / 2.0).sin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EasingFunction; 8] = [
        EasingFunction::Linear,
        EasingFunction::EaseIn,
        EasingFunction::EaseOut,
        EasingFunction::EaseInOut,
        EasingFunction::EaseInQuad,
        EasingFunction::EaseOutQuad,
        EasingFunction::EaseInOutQuad,
        EasingFunction::EaseOutSine,
    ];

    #[test]
    fn test_every_curve_starts_at_zero_and_ends_at_one() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing:?}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?}");
        }
    }

    #[test]
    fn test_every_curve_is_monotonic() {
        for easing in ALL {
            let mut last = 0.0;
            for step in 1..=20 {
                let value = easing.apply(step as f32 / 20.0);
                assert!(value >= last, "{easing:?} at step {step}");
                last = value;
            }
        }
    }

    #[test]
    fn test_ease_out_leads_linear() {
        // 松手后的回弹要先快后慢
        for t in [0.1, 0.3, 0.6] {
            assert!(EasingFunction::EaseOut.apply(t) > t);
            assert!(EasingFunction::EaseIn.apply(t) < t);
        }
    }

    #[test]
    fn test_out_of_range_input_is_clamped() {
        assert_eq!(EasingFunction::EaseInOut.apply(-0.5), 0.0);
        assert_eq!(EasingFunction::EaseInOut.apply(1.5), 1.0);
    }

    #[test]
    fn test_config_names() {
        let json = serde_json::to_string(&EasingFunction::EaseOutQuad).unwrap();
        assert_eq!(json, "\"ease_out_quad\"");
        let parsed: EasingFunction = serde_json::from_str("\"ease_in_out\"").unwrap();
        assert_eq!(parsed, EasingFunction::default());
    }
}
