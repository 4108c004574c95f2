//! 单条 f32 时间轴。

use super::EasingFunction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationId(pub u64);

impl AnimationId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// 时间轴状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    #[default]
    Running,
    Completed,
    /// 被 `skip` 打断，值已落到终点
    Skipped,
}

/// 在 `duration` 秒内把一个值从 `from` 插值到 `to`
///
/// `progress` 是缓动后的进度；`elapsed` 只在内部累计。
#[derive(Debug, Clone)]
pub struct Animation {
    pub id: AnimationId,
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub easing: EasingFunction,
    pub state: AnimationState,
    pub progress: f32,
    elapsed: f32,
}

impl Animation {
    /// 时长不大于 0 时直接处于完成状态
    pub fn new(id: AnimationId, from: f32, to: f32, duration: f32) -> Self {
        let instant = duration <= 0.0;
        Self {
            id,
            from,
            to,
            duration: duration.max(0.0),
            easing: EasingFunction::default(),
            state: if instant {
                AnimationState::Completed
            } else {
                AnimationState::Running
            },
            progress: if instant { 1.0 } else { 0.0 },
            elapsed: 0.0,
        }
    }

    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// 推进 `dt` 秒，返回推进后是否仍在运行
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.is_active() {
            return false;
        }

        self.elapsed += dt.max(0.0);
        let t = self.elapsed / self.duration;
        if t >= 1.0 {
            self.progress = 1.0;
            self.state = AnimationState::Completed;
        } else {
            self.progress = self.easing.apply(t);
        }
        self.is_active()
    }

    pub fn skip(&mut self) {
        if self.is_active() {
            self.progress = 1.0;
            self.state = AnimationState::Skipped;
        }
    }

    pub fn current_value(&self) -> f32 {
        self.from + (self.to - self.from) * self.progress
    }

    pub fn final_value(&self) -> f32 {
        self.to
    }

    pub fn is_finished(&self) -> bool {
        !self.is_active()
    }

    pub fn is_active(&self) -> bool {
        self.state == AnimationState::Running
    }
}
