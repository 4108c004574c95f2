//! # Config 模块
//!
//! 转场引擎的可调参数。
//!
//! 完成阈值、速度阈值这类数值属于产品手感，需要对照实际效果调整，
//! 所以全部放在配置里而不是写死在引擎中。所有字段都有默认值，
//! 配置文件只需写出要覆盖的部分。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::animation::EasingFunction;
use crate::error::ConfigError;

/// 转场配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// 缩放式呈现/关闭的时长（秒）
    #[serde(default = "default_zoom_duration")]
    pub zoom_duration: f32,

    /// 缺少起止视图时，交叉淡入淡出的时长（秒）
    #[serde(default = "default_fade_duration")]
    pub fade_duration: f32,

    /// 松手时进度达到该值即完成关闭
    #[serde(default = "default_completion_threshold")]
    pub completion_threshold: f32,

    /// 松手时关闭方向上的速度达到该值（点/秒）即完成关闭，不看进度
    #[serde(default = "default_velocity_threshold")]
    pub velocity_threshold: f32,

    /// 进度换算的参考距离（点）
    ///
    /// `None` 时使用容器高度。
    #[serde(default)]
    pub reference_distance: Option<f32>,

    /// 向上拖动是否也算关闭
    #[serde(default)]
    pub allow_upward_dismiss: bool,

    /// 拖动时是否随进度缩小被拖动的视图
    #[serde(default)]
    pub scale_while_dragging: bool,

    /// 进度为 1 时被拖动视图的缩放
    #[serde(default = "default_min_drag_scale")]
    pub min_drag_scale: f32,

    /// 松手后完成/回弹动画的满程时长（秒）
    ///
    /// 实际时长按剩余距离缩短。
    #[serde(default = "default_settle_duration")]
    pub settle_duration: f32,

    /// 松手后动画的最短时长（秒）
    #[serde(default = "default_min_settle_duration")]
    pub min_settle_duration: f32,

    /// 非交互转场的缓动曲线
    #[serde(default)]
    pub easing: EasingFunction,

    /// 松手后动画的缓动曲线
    #[serde(default = "default_settle_easing")]
    pub settle_easing: EasingFunction,
}

fn default_zoom_duration() -> f32 {
    0.5
}

fn default_fade_duration() -> f32 {
    0.3
}

fn default_completion_threshold() -> f32 {
    0.5
}

fn default_velocity_threshold() -> f32 {
    1000.0
}

fn default_min_drag_scale() -> f32 {
    0.8
}

fn default_settle_duration() -> f32 {
    0.35
}

fn default_min_settle_duration() -> f32 {
    0.1
}

fn default_settle_easing() -> EasingFunction {
    EasingFunction::EaseOut
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            zoom_duration: default_zoom_duration(),
            fade_duration: default_fade_duration(),
            completion_threshold: default_completion_threshold(),
            velocity_threshold: default_velocity_threshold(),
            reference_distance: None,
            allow_upward_dismiss: false,
            scale_while_dragging: false,
            min_drag_scale: default_min_drag_scale(),
            settle_duration: default_settle_duration(),
            min_settle_duration: default_min_settle_duration(),
            easing: EasingFunction::default(),
            settle_easing: default_settle_easing(),
        }
    }
}

impl TransitionConfig {
    /// 加载配置文件
    ///
    /// 文件不存在、解析失败或验证失败时返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = ?path, "转场配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::try_load(path) {
            Ok(config) => {
                info!(path = ?path, "转场配置加载成功");
                config
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "转场配置无效，使用默认配置");
                Self::default()
            }
        }
    }

    /// 加载并验证配置文件，失败时返回错误
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("zoom_duration", self.zoom_duration),
            ("fade_duration", self.fade_duration),
            ("settle_duration", self.settle_duration),
            ("min_settle_duration", self.min_settle_duration),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} 必须是非负数，实际为 {value}"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.completion_threshold) {
            return Err(ConfigError::Validation(
                "completion_threshold 必须在 0.0 - 1.0 之间".to_string(),
            ));
        }

        if !self.velocity_threshold.is_finite() || self.velocity_threshold < 0.0 {
            return Err(ConfigError::Validation(
                "velocity_threshold 必须是非负数".to_string(),
            ));
        }

        if let Some(distance) = self.reference_distance {
            if !distance.is_finite() || distance <= 0.0 {
                return Err(ConfigError::Validation(
                    "reference_distance 必须大于 0".to_string(),
                ));
            }
        }

        if !(0.0..=1.0).contains(&self.min_drag_scale) || self.min_drag_scale == 0.0 {
            return Err(ConfigError::Validation(
                "min_drag_scale 必须在 (0.0, 1.0] 之间".to_string(),
            ));
        }

        if self.min_settle_duration > self.settle_duration {
            return Err(ConfigError::Validation(
                "min_settle_duration 不能大于 settle_duration".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TransitionConfig::default();
        assert_eq!(config.completion_threshold, 0.5);
        assert_eq!(config.velocity_threshold, 1000.0);
        assert!(config.reference_distance.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TransitionConfig =
            serde_json::from_str(r#"{ "velocity_threshold": 800.0, "easing": "linear" }"#)
                .unwrap();
        assert_eq!(config.velocity_threshold, 800.0);
        assert_eq!(config.easing, EasingFunction::Linear);
        assert_eq!(config.zoom_duration, 0.5);
        assert_eq!(config.settle_easing, EasingFunction::EaseOut);
    }

    #[test]
    fn test_config_validation() {
        let mut config = TransitionConfig::default();

        config.completion_threshold = 1.5;
        assert!(config.validate().is_err());
        config.completion_threshold = 0.5;

        config.reference_distance = Some(0.0);
        assert!(config.validate().is_err());
        config.reference_distance = Some(500.0);
        assert!(config.validate().is_ok());

        config.min_drag_scale = 0.0;
        assert!(config.validate().is_err());
        config.min_drag_scale = 0.8;

        config.zoom_duration = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transition.json");

        let config = TransitionConfig {
            scale_while_dragging: true,
            reference_distance: Some(500.0),
            ..TransitionConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = TransitionConfig::try_load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();

        let missing = TransitionConfig::load(dir.path().join("missing.json"));
        assert_eq!(missing, TransitionConfig::default());

        let invalid_path = dir.path().join("invalid.json");
        fs::write(&invalid_path, r#"{ "completion_threshold": 3.0 }"#).unwrap();
        assert!(TransitionConfig::try_load(&invalid_path).is_err());
        assert_eq!(TransitionConfig::load(&invalid_path), TransitionConfig::default());
    }
}
