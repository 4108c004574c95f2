//! # Photo Transition
//!
//! 照片浏览器的转场核心：缩略图放大进入照片详情、拖拽照片关闭详情。
//!
//! ## 架构概述
//!
//! `photo-transition` 不依赖任何 UI 工具包。宿主展示层通过能力接口与引擎通信：
//!
//! ```text
//! Host                               Engine
//!   │                                   │
//!   │──── present / dismiss(ctx) ─────►│
//!   │──── handle_drag_sample ─────────►│
//!   │──── update(dt)（每帧）──────────►│ 动画写回 View
//!   │◄─── ctx.update_interactive_transition(p)
//!   │◄─── ctx.complete_transition(bool)（每个转场恰好一次）
//! ```
//!
//! ## 核心类型
//!
//! - [`TransitionEngine`]：转场状态机
//! - [`CompatibilityResolver`]：两版平台契约下的端点解析
//! - [`TransitionContext`]：宿主提供的转场上下文
//! - [`DragSample`]：拖拽手势样本
//! - [`TransitionConfig`]：阈值、时长等可调参数
//!
//! ## 使用示例
//!
//! ```ignore
//! use photo_transition::{PlatformContract, TransitionConfig, TransitionEngine};
//!
//! let mut engine = TransitionEngine::new(
//!     TransitionConfig::load("transition.json"),
//!     PlatformContract::from_major_version(os_major),
//! );
//! engine.set_starting_view(Some(&thumbnail));
//! engine.set_ending_view(Some(&image));
//! engine.present(ctx);
//!
//! loop {
//!     if !engine.update(dt) {
//!         break;
//!     }
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`geometry`]：点、尺寸、矩形
//! - [`view`]：视图模型
//! - [`animation`]：动画时间轴
//! - [`context`]：转场上下文能力接口
//! - [`compat`]：平台兼容层
//! - [`gesture`]：拖拽样本
//! - [`engine`]：转场引擎
//! - [`config`]：配置
//! - [`replay`]：手势脚本回放
//! - [`error`]：错误类型定义

pub mod animation;
pub mod compat;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod replay;
pub mod view;

// 重导出核心类型
pub use animation::{Animatable, AnimationSystem, EasingFunction};
pub use compat::{
    CompatibilityResolver, LegacyContract, MODERN_CONTRACT_MIN_VERSION, ModernContract,
    PlatformContract,
};
pub use config::TransitionConfig;
pub use context::{
    ContextLog, RecordingContext, TransitionContext, TransitionOutcome, TransitionRole,
};
pub use engine::{
    Backdrop, DismissPolicy, TransitionDirection, TransitionEngine, TransitionHost,
    TransitionPhase,
};
pub use error::{AnimationError, ConfigError, ReplayError};
pub use geometry::{Rect, Size, Vec2};
pub use gesture::{DragPhase, DragSample};
pub use replay::{GestureScript, ReplayReport, replay};
pub use view::{View, ViewController, ViewSnapshot};
