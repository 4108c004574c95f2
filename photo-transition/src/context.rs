//! # Context 模块
//!
//! 宿主展示层提供给转场引擎的能力接口。
//!
//! ## 设计说明
//!
//! - `TransitionContext` 对应一次转场：容器视图、按角色取端点、目标 frame、
//!   进度汇报与结果汇报
//! - 端点有两套取法：旧版契约只有 `view_controller(role)`，新版契约才有 `view(role)`。
//!   引擎不直接调用它们，统一经由 [`crate::compat`] 解析
//! - 宿主在收到 `complete_transition` 之前不会释放自己的资源，
//!   所以每个开始过的转场必须且只能汇报一次结果

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::view::{View, ViewController};

/// 转场端点角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionRole {
    /// 转出的一方
    From,
    /// 转入的一方
    To,
}

/// 转场结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// 转场完成
    Completed,
    /// 转场取消（已回滚）
    Cancelled,
}

impl TransitionOutcome {
    pub fn from_completed(did_complete: bool) -> Self {
        if did_complete {
            Self::Completed
        } else {
            Self::Cancelled
        }
    }

    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }
}

impl std::fmt::Display for TransitionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "complete"),
            Self::Cancelled => write!(f, "cancel"),
        }
    }
}

/// 转场上下文能力接口
///
/// 交互相关的三个方法默认为空实现，非交互式宿主不需要关心。
pub trait TransitionContext {
    /// 转场发生的容器视图
    fn container_view(&self) -> Rc<View>;

    /// 按角色取视图控制器（旧版契约的唯一取法）
    fn view_controller(&self, role: TransitionRole) -> Option<Rc<ViewController>>;

    /// 按角色直接取视图（仅新版契约可用，旧版平台上恒为 `None`）
    fn view(&self, role: TransitionRole) -> Option<Rc<View>>;

    /// 宿主给出的目标 frame
    ///
    /// 旧版平台上 `To` 角色的值不可靠，见 [`crate::compat::LegacyContract`]。
    fn final_frame(&self, role: TransitionRole) -> Rect;

    /// 汇报交互进度（0.0 - 1.0）
    fn update_interactive_transition(&self, _percent_complete: f32) {}

    /// 交互结束，转场将完成
    fn finish_interactive_transition(&self) {}

    /// 交互结束，转场将取消
    fn cancel_interactive_transition(&self) {}

    /// 汇报最终结果
    fn complete_transition(&self, did_complete: bool);
}

/// `RecordingContext` 记录下的全部汇报
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextLog {
    /// 每次 `update_interactive_transition` 的值
    pub percent_updates: Vec<f32>,
    /// `finish_interactive_transition` 调用次数
    pub finish_calls: usize,
    /// `cancel_interactive_transition` 调用次数
    pub cancel_calls: usize,
    /// 每次 `complete_transition` 的结果
    pub outcomes: Vec<TransitionOutcome>,
}

/// 内存中的转场上下文
///
/// 记录所有汇报，供无界面宿主、手势回放和测试使用。
/// `modern` 决定它表现为哪一版平台契约。
#[derive(Debug)]
pub struct RecordingContext {
    container: Rc<View>,
    from: Option<Rc<ViewController>>,
    to: Option<Rc<ViewController>>,
    modern: bool,
    reported_final_frame: Rect,
    log: RefCell<ContextLog>,
}

impl RecordingContext {
    /// 创建新版契约的上下文
    ///
    /// 目标 frame 默认等于容器边界。
    pub fn modern(container: Rc<View>) -> Self {
        let reported_final_frame = container.bounds();
        Self {
            container,
            from: None,
            to: None,
            modern: true,
            reported_final_frame,
            log: RefCell::new(ContextLog::default()),
        }
    }

    /// 创建旧版契约的上下文
    ///
    /// 旧版平台上 `final_frame(To)` 返回零矩形，模拟该平台的缺陷。
    pub fn legacy(container: Rc<View>) -> Self {
        Self {
            container,
            from: None,
            to: None,
            modern: false,
            reported_final_frame: Rect::zero(),
            log: RefCell::new(ContextLog::default()),
        }
    }

    /// 设置转出方
    pub fn with_from(mut self, controller: Rc<ViewController>) -> Self {
        self.from = Some(controller);
        self
    }

    /// 设置转入方
    pub fn with_to(mut self, controller: Rc<ViewController>) -> Self {
        self.to = Some(controller);
        self
    }

    /// 覆盖宿主报告的目标 frame
    pub fn with_final_frame(mut self, frame: Rect) -> Self {
        self.reported_final_frame = frame;
        self
    }

    /// 是否为新版契约
    pub fn is_modern(&self) -> bool {
        self.modern
    }

    /// 当前记录的副本
    pub fn log(&self) -> ContextLog {
        self.log.borrow().clone()
    }

    /// 第一次汇报的结果
    pub fn outcome(&self) -> Option<TransitionOutcome> {
        self.log.borrow().outcomes.first().copied()
    }

    /// `complete_transition` 被调用的次数
    pub fn completion_count(&self) -> usize {
        self.log.borrow().outcomes.len()
    }

    /// 最近一次汇报的交互进度
    pub fn last_percent(&self) -> Option<f32> {
        self.log.borrow().percent_updates.last().copied()
    }

    fn controller(&self, role: TransitionRole) -> Option<&Rc<ViewController>> {
        match role {
            TransitionRole::From => self.from.as_ref(),
            TransitionRole::To => self.to.as_ref(),
        }
    }
}

impl TransitionContext for RecordingContext {
    fn container_view(&self) -> Rc<View> {
        self.container.clone()
    }

    fn view_controller(&self, role: TransitionRole) -> Option<Rc<ViewController>> {
        self.controller(role).cloned()
    }

    fn view(&self, role: TransitionRole) -> Option<Rc<View>> {
        if !self.modern {
            return None;
        }
        self.controller(role).map(|c| c.view())
    }

    fn final_frame(&self, role: TransitionRole) -> Rect {
        match role {
            TransitionRole::To => self.reported_final_frame,
            TransitionRole::From => self
                .from
                .as_ref()
                .map(|c| c.view().frame())
                .unwrap_or_default(),
        }
    }

    fn update_interactive_transition(&self, percent_complete: f32) {
        self.log.borrow_mut().percent_updates.push(percent_complete);
    }

    fn finish_interactive_transition(&self) {
        self.log.borrow_mut().finish_calls += 1;
    }

    fn cancel_interactive_transition(&self) {
        self.log.borrow_mut().cancel_calls += 1;
    }

    fn complete_transition(&self, did_complete: bool) {
        self.log
            .borrow_mut()
            .outcomes
            .push(TransitionOutcome::from_completed(did_complete));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> Rc<View> {
        View::new("container", Rect::new(0.0, 0.0, 320.0, 500.0))
    }

    #[test]
    fn test_legacy_context_has_no_direct_views() {
        let to = ViewController::new(View::new("photos", Rect::zero()));
        let ctx = RecordingContext::legacy(container()).with_to(to);

        assert!(!ctx.is_modern());
        assert!(ctx.view(TransitionRole::To).is_none());
        assert!(ctx.view_controller(TransitionRole::To).is_some());
        assert_eq!(ctx.final_frame(TransitionRole::To), Rect::zero());
    }

    #[test]
    fn test_modern_context_views() {
        let root = View::new("photos", Rect::zero());
        let ctx = RecordingContext::modern(container()).with_to(ViewController::new(root.clone()));

        assert!(Rc::ptr_eq(&ctx.view(TransitionRole::To).unwrap(), &root));
        assert!(ctx.view(TransitionRole::From).is_none());
        assert_eq!(
            ctx.final_frame(TransitionRole::To),
            Rect::new(0.0, 0.0, 320.0, 500.0)
        );
    }

    #[test]
    fn test_recording() {
        let ctx = RecordingContext::modern(container());
        ctx.update_interactive_transition(0.25);
        ctx.update_interactive_transition(0.5);
        ctx.cancel_interactive_transition();
        ctx.complete_transition(false);

        assert_eq!(ctx.last_percent(), Some(0.5));
        assert_eq!(ctx.outcome(), Some(TransitionOutcome::Cancelled));
        assert_eq!(ctx.completion_count(), 1);
        assert_eq!(ctx.log().cancel_calls, 1);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(TransitionOutcome::Completed.to_string(), "complete");
        assert_eq!(TransitionOutcome::Cancelled.to_string(), "cancel");
        assert!(TransitionOutcome::from_completed(true).is_completed());
    }
}
