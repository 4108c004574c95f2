//! # Compat 模块
//!
//! 平台兼容层：屏蔽两版宿主平台在转场端点获取和目标 frame 计算上的差异。
//!
//! ## 两版契约
//!
//! | | 旧版（`Legacy`） | 新版（`Modern`） |
//! |---|---|---|
//! | 取端点视图 | `view_controller(role)` 的根视图 | `view(role)` |
//! | 目标 frame | 容器边界（平台返回值有误） | `final_frame(To)` |
//!
//! 契约在启动时根据平台主版本号选定一次（[`PlatformContract::from_major_version`]），
//! 然后以策略对象的形式注入引擎，引擎其余部分不再关心版本。

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::context::{TransitionContext, TransitionRole};
use crate::geometry::Rect;
use crate::view::View;

/// 首个提供 `view(role)` 且目标 frame 正确的平台主版本
pub const MODERN_CONTRACT_MIN_VERSION: u32 = 8;

/// 兼容解析策略
///
/// 三个方法都是确定性查询：取不到时返回 `None` / 零矩形，从不报错。
pub trait CompatibilityResolver {
    /// 转出方视图
    fn source_view(&self, ctx: &dyn TransitionContext) -> Option<Rc<View>>;

    /// 转入方视图
    fn destination_view(&self, ctx: &dyn TransitionContext) -> Option<Rc<View>>;

    /// 转入方的最终 frame（容器坐标系）
    fn final_destination_frame(&self, ctx: &dyn TransitionContext) -> Rect;

    /// 策略名（用于日志）
    fn name(&self) -> &'static str;
}

/// 旧版平台契约
///
/// 旧版平台上 `final_frame(To)` 返回的值不对，这里直接用容器边界
/// （全屏铺满）。调用方不能假设结果等于转入方的自然尺寸。
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyContract;

impl CompatibilityResolver for LegacyContract {
    fn source_view(&self, ctx: &dyn TransitionContext) -> Option<Rc<View>> {
        ctx.view_controller(TransitionRole::From).map(|c| c.view())
    }

    fn destination_view(&self, ctx: &dyn TransitionContext) -> Option<Rc<View>> {
        ctx.view_controller(TransitionRole::To).map(|c| c.view())
    }

    fn final_destination_frame(&self, ctx: &dyn TransitionContext) -> Rect {
        ctx.container_view().bounds()
    }

    fn name(&self) -> &'static str {
        "legacy"
    }
}

/// 新版平台契约
#[derive(Debug, Clone, Copy, Default)]
pub struct ModernContract;

impl CompatibilityResolver for ModernContract {
    fn source_view(&self, ctx: &dyn TransitionContext) -> Option<Rc<View>> {
        ctx.view(TransitionRole::From)
    }

    fn destination_view(&self, ctx: &dyn TransitionContext) -> Option<Rc<View>> {
        ctx.view(TransitionRole::To)
    }

    fn final_destination_frame(&self, ctx: &dyn TransitionContext) -> Rect {
        ctx.final_frame(TransitionRole::To)
    }

    fn name(&self) -> &'static str {
        "modern"
    }
}

/// 平台契约
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformContract {
    Legacy,
    #[default]
    Modern,
}

impl PlatformContract {
    /// 根据宿主平台主版本号选择契约
    pub fn from_major_version(major: u32) -> Self {
        if major >= MODERN_CONTRACT_MIN_VERSION {
            Self::Modern
        } else {
            Self::Legacy
        }
    }

    /// 对应的解析策略
    pub fn resolver(self) -> Box<dyn CompatibilityResolver> {
        match self {
            Self::Legacy => Box::new(LegacyContract),
            Self::Modern => Box::new(ModernContract),
        }
    }
}
