//! # Animation 模块
//!
//! 转场用到的所有补间都走这里：视图的 frame 分量、alpha、scale，以及遮罩层的 alpha。
//!
//! 引擎每帧调用一次 `AnimationSystem::update(dt)`。两次调用之间属性值不变，
//! 宿主在任意时刻读到的都是同一帧的状态。

mod animation;
mod easing;
mod system;
mod traits;

pub use animation::{Animation, AnimationId, AnimationState};
pub use easing::EasingFunction;
pub use system::AnimationSystem;
pub use traits::{AnimPropertyKey, Animatable, ObjectId};
