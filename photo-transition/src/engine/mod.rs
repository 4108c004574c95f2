//! # Engine 模块
//!
//! 照片转场引擎：缩略图与照片详情之间的呈现、关闭，以及跟手的交互式关闭。
//!
//! ## 驱动方式
//!
//! 引擎是单线程、帧驱动的：
//! - 宿主通过 [`TransitionEngine::present`] / [`TransitionEngine::dismiss`] 发起非交互转场
//! - 宿主把拖拽手势整理成 [`DragSample`]，通过 [`TransitionEngine::handle_drag_sample`] 送入
//! - 宿主每帧调用 [`TransitionEngine::update`]，动画推进并写回视图
//!
//! ## 结果汇报
//!
//! 每个被接受的转场都恰好调用一次 `complete_transition`：
//! 动画自然结束、[`TransitionEngine::skip`] 跳过、[`TransitionEngine::cancel_transition`]
//! 强制回滚，三条路径都汇集到同一个收尾函数。
//! 引擎忙碌时收到的新转场请求立即以 `complete_transition(false)` 拒绝。

mod backdrop;
mod policy;
mod scene;
mod state;

pub use backdrop::Backdrop;
pub use policy::DismissPolicy;
pub use state::{TransitionDirection, TransitionPhase};

use std::rc::{Rc, Weak};

use tracing::{debug, info, warn};

use crate::animation::{AnimationSystem, EasingFunction, ObjectId};
use crate::compat::{CompatibilityResolver, PlatformContract};
use crate::config::TransitionConfig;
use crate::context::{TransitionContext, TransitionOutcome};
use crate::error::AnimationError;
use crate::geometry::{Rect, Vec2};
use crate::gesture::{DragPhase, DragSample};
use crate::view::{View, props};
use scene::{TrackedView, TransitionScene};


/// 宿主回调
///
/// 交互式关闭由手势触发，转场上下文要由宿主现场创建（通常是发起 dismiss）。
pub trait TransitionHost {
    /// 手势开始时调用，返回本次关闭的上下文
    ///
    /// 返回 `None` 表示宿主不允许关闭，本次手势被忽略。
    fn begin_dismissal(&self) -> Option<Rc<dyn TransitionContext>> {
        None
    }
}

/// 被拖动的视图
#[derive(Debug)]
struct DragTracking {
    /// 手势开始时视图中心（父视图坐标系）
    anchor: Vec2,
    view: TrackedView,
    /// 进度换算的参考距离
    reference_distance: f32,
    /// 最近一次位移
    translation: Vec2,
    /// 最近一次汇报的进度
    progress: f32,
}

/// 正在进行的转场
///
/// 配置与判定策略在开始时复制一份，转场途中 `set_config` 不影响它。
struct ActiveTransition {
    context: Rc<dyn TransitionContext>,
    config: TransitionConfig,
    policy: DismissPolicy,
    direction: TransitionDirection,
    scene: TransitionScene,
    backdrop_id: ObjectId,
    drag: Option<DragTracking>,
    /// 动画结束后要汇报的结果
    pending_outcome: TransitionOutcome,
    /// 交互是否已经向上下文汇报过 finish / cancel
    interaction_resolved: bool,
}

/// 照片转场引擎
///
/// 起止视图只以弱引用保存，生命周期归宿主。
pub struct TransitionEngine {
    config: TransitionConfig,
    policy: DismissPolicy,
    resolver: Box<dyn CompatibilityResolver>,
    animation_system: AnimationSystem,
    backdrop: Rc<Backdrop>,
    starting_view: Weak<View>,
    ending_view: Weak<View>,
    force_non_interactive: bool,
    host: Option<Weak<dyn TransitionHost>>,
    phase: TransitionPhase,
    active: Option<ActiveTransition>,
}

impl std::fmt::Debug for TransitionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionEngine")
            .field("resolver", &self.resolver.name())
            .field("phase", &self.phase)
            .field("backdrop_alpha", &self.backdrop.alpha())
            .field("force_non_interactive", &self.force_non_interactive)
            .finish()
    }
}

impl TransitionEngine {
    /// 按平台契约创建引擎
    pub fn new(config: TransitionConfig, contract: PlatformContract) -> Self {
        Self::with_resolver(config, contract.resolver())
    }

    /// 使用自定义兼容策略创建引擎
    pub fn with_resolver(config: TransitionConfig, resolver: Box<dyn CompatibilityResolver>) -> Self {
        debug!(resolver = resolver.name(), "创建转场引擎");
        Self {
            policy: DismissPolicy::from_config(&config),
            config,
            resolver,
            animation_system: AnimationSystem::new(),
            backdrop: Rc::new(Backdrop::new()),
            starting_view: Weak::new(),
            ending_view: Weak::new(),
            force_non_interactive: false,
            host: None,
            phase: TransitionPhase::Idle,
            active: None,
        }
    }

    // ========== 配置 ==========

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    /// 替换配置（只影响之后开始的转场，进行中的转场沿用开始时的配置）
    pub fn set_config(&mut self, config: TransitionConfig) {
        self.policy = DismissPolicy::from_config(&config);
        self.config = config;
    }

    /// 设置起始视图（缩略图）
    pub fn set_starting_view(&mut self, view: Option<&Rc<View>>) {
        self.starting_view = view.map(Rc::downgrade).unwrap_or_default();
    }

    /// 设置结束视图（详情页中的大图）
    pub fn set_ending_view(&mut self, view: Option<&Rc<View>>) {
        self.ending_view = view.map(Rc::downgrade).unwrap_or_default();
    }

    pub fn starting_view(&self) -> Option<Rc<View>> {
        self.starting_view.upgrade()
    }

    pub fn ending_view(&self) -> Option<Rc<View>> {
        self.ending_view.upgrade()
    }

    /// 强制非交互：手势开始即以固定时长完成关闭，后续样本全部忽略
    pub fn set_force_non_interactive(&mut self, force: bool) {
        self.force_non_interactive = force;
    }

    pub fn force_non_interactive(&self) -> bool {
        self.force_non_interactive
    }

    /// 设置宿主（弱引用）
    pub fn set_host<H: TransitionHost + 'static>(&mut self, host: &Rc<H>) {
        let weak: Weak<dyn TransitionHost> = Rc::downgrade(host) as Weak<dyn TransitionHost>;
        self.host = Some(weak);
    }

    pub fn clear_host(&mut self) {
        self.host = None;
    }

    // ========== 查询 ==========

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// 是否有转场在进行
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// 当前转场方向
    pub fn direction(&self) -> Option<TransitionDirection> {
        self.active.as_ref().map(|a| a.direction)
    }

    /// 遮罩透明度
    pub fn backdrop_alpha(&self) -> f32 {
        self.backdrop.alpha()
    }

    /// 当前转场进度（0.0 - 1.0），空闲时为 0
    ///
    /// 跟手时为手势换算出的进度；其余阶段由遮罩透明度换算：
    /// 呈现时遮罩逐渐变实，关闭时逐渐变透明。
    pub fn progress(&self) -> f32 {
        if self.phase.is_interactive() {
            if let Some(drag) = self.active.as_ref().and_then(|a| a.drag.as_ref()) {
                return drag.progress;
            }
        }
        match self.direction() {
            Some(TransitionDirection::Present) => self.backdrop.alpha(),
            Some(TransitionDirection::Dismiss) => 1.0 - self.backdrop.alpha(),
            None => 0.0,
        }
    }

    // ========== 非交互转场 ==========

    /// 呈现照片详情
    pub fn present(&mut self, ctx: Rc<dyn TransitionContext>) {
        self.animate_transition(TransitionDirection::Present, ctx);
    }

    /// 关闭照片详情
    pub fn dismiss(&mut self, ctx: Rc<dyn TransitionContext>) {
        self.animate_transition(TransitionDirection::Dismiss, ctx);
    }

    /// 发起非交互转场
    pub fn animate_transition(&mut self, direction: TransitionDirection, ctx: Rc<dyn TransitionContext>) {
        if !self.phase.is_idle() {
            warn!(
                direction = %direction,
                phase = %self.phase,
                "已有转场在进行，拒绝新的转场"
            );
            ctx.complete_transition(false);
            return;
        }

        self.start(direction, ctx);
        self.start_non_interactive_animations();
    }

    fn start(&mut self, direction: TransitionDirection, ctx: Rc<dyn TransitionContext>) {
        let starting = self.starting_view();
        let ending = self.ending_view();
        let scene = TransitionScene::resolve(
            self.resolver.as_ref(),
            ctx.as_ref(),
            direction,
            starting,
            ending,
            &mut self.animation_system,
        );
        let backdrop_id = self.animation_system.register(&self.backdrop);

        self.backdrop.set_alpha(match direction {
            TransitionDirection::Present => 0.0,
            TransitionDirection::Dismiss => 1.0,
        });

        self.active = Some(ActiveTransition {
            context: ctx,
            config: self.config.clone(),
            policy: self.policy,
            direction,
            scene,
            backdrop_id,
            drag: None,
            pending_outcome: TransitionOutcome::Completed,
            interaction_resolved: false,
        });
    }

    fn start_non_interactive_animations(&mut self) {
        let Some(active) = &self.active else {
            return;
        };
        let direction = active.direction;
        let scene = &active.scene;
        let spatial = scene.is_spatial();
        let duration = if spatial {
            active.config.zoom_duration
        } else {
            active.config.fade_duration
        };
        let easing = active.config.easing;

        let result = if spatial {
            Self::animate_zoom(&mut self.animation_system, scene, direction, duration, easing)
        } else {
            Self::animate_cross_dissolve(&mut self.animation_system, scene, direction, duration, easing)
        };
        if let Err(e) = result {
            warn!(error = %e, "转场动画启动失败");
        }

        let (from, to) = match direction {
            TransitionDirection::Present => (0.0, 1.0),
            TransitionDirection::Dismiss => (1.0, 0.0),
        };
        if let Err(e) = self.animation_system.animate_object::<Backdrop>(
            active.backdrop_id,
            props::ALPHA,
            from,
            to,
            duration,
            easing,
        ) {
            warn!(error = %e, "遮罩动画启动失败");
        }

        self.set_phase(match direction {
            TransitionDirection::Present => TransitionPhase::Presenting,
            TransitionDirection::Dismiss => TransitionPhase::Dismissing,
        });
        info!(
            direction = %direction,
            spatial,
            duration,
            resolver = self.resolver.name(),
            "开始转场"
        );
    }

    /// 缩放式转场：结束视图在起始矩形与静止矩形之间移动，起始视图在此期间隐藏
    fn animate_zoom(
        system: &mut AnimationSystem,
        scene: &TransitionScene,
        direction: TransitionDirection,
        duration: f32,
        easing: EasingFunction,
    ) -> Result<(), AnimationError> {
        let (Some(starting_frame), Some(ending_frame)) = (scene.starting_frame, scene.ending_frame)
        else {
            return Ok(());
        };
        let (Some(starting), Some(ending)) = (&scene.starting, &scene.ending) else {
            return Ok(());
        };
        let Some(ending_view) = ending.view() else {
            return Ok(());
        };

        if let Some(view) = starting.view() {
            view.set_alpha(0.0);
        }

        let (from, to) = match direction {
            TransitionDirection::Present => (starting_frame, ending_frame),
            TransitionDirection::Dismiss => (ending_frame, starting_frame),
        };
        animate_frame(
            system,
            ending.object_id,
            scene.to_parent_space(&ending_view, from),
            scene.to_parent_space(&ending_view, to),
            duration,
            easing,
        )
    }

    /// 交叉淡入淡出：缺少起止视图时的退化效果
    fn animate_cross_dissolve(
        system: &mut AnimationSystem,
        scene: &TransitionScene,
        direction: TransitionDirection,
        duration: f32,
        easing: EasingFunction,
    ) -> Result<(), AnimationError> {
        let (target, from, to) = match direction {
            TransitionDirection::Present => (&scene.destination, 0.0, 1.0),
            TransitionDirection::Dismiss => (&scene.source, 1.0, 0.0),
        };
        if let Some(tracked) = target {
            system.animate_object::<View>(tracked.object_id, props::ALPHA, from, to, duration, easing)?;
        }
        Ok(())
    }

    // ========== 交互式关闭 ==========

    /// 处理一个拖拽样本
    ///
    /// - `view`: 被拖动的视图，只在 `Began` 时采用
    /// - `anchor`: 手势开始时被拖动视图的中心（父视图坐标系），只在 `Began` 时采用
    pub fn handle_drag_sample(&mut self, sample: DragSample, view: &Rc<View>, anchor: Vec2) {
        match sample.phase {
            DragPhase::Began => self.begin_drag(view, anchor),
            DragPhase::Changed => {
                if self.phase == TransitionPhase::InteractiveTracking {
                    self.apply_drag(sample.translation);
                }
            }
            DragPhase::Ended => {
                if self.phase == TransitionPhase::InteractiveTracking {
                    self.apply_drag(sample.translation);
                    let outcome = self.decide(sample.translation, sample.velocity);
                    self.settle(outcome);
                }
            }
            DragPhase::Cancelled => {
                if self.phase == TransitionPhase::InteractiveTracking {
                    debug!("手势被系统取消，回弹");
                    self.settle(TransitionOutcome::Cancelled);
                }
            }
        }
    }

    fn begin_drag(&mut self, view: &Rc<View>, anchor: Vec2) {
        if !self.phase.is_idle() {
            debug!(phase = %self.phase, "转场进行中，忽略新的手势");
            return;
        }

        let Some(host) = self.host.as_ref().and_then(Weak::upgrade) else {
            debug!("没有宿主，忽略手势");
            return;
        };
        let Some(ctx) = host.begin_dismissal() else {
            debug!("宿主拒绝关闭，忽略手势");
            return;
        };

        if self.force_non_interactive {
            debug!("强制非交互，直接关闭");
            self.start(TransitionDirection::Dismiss, ctx);
            self.start_non_interactive_animations();
            return;
        }

        self.start(TransitionDirection::Dismiss, ctx);
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let reference = active
            .config
            .reference_distance
            .unwrap_or_else(|| active.scene.container.frame().height());
        if active.scene.is_spatial() {
            if let Some(starting) = active.scene.starting_view() {
                starting.set_alpha(0.0);
            }
        }
        active.drag = Some(DragTracking {
            anchor,
            view: TrackedView::track(view, &mut self.animation_system),
            reference_distance: reference,
            translation: Vec2::zero(),
            progress: 0.0,
        });
        active.context.update_interactive_transition(0.0);

        self.set_phase(TransitionPhase::InteractiveTracking);
        info!(
            view = view.name(),
            reference_distance = reference,
            resolver = self.resolver.name(),
            "开始交互式关闭"
        );
    }

    /// 跟手：移动被拖动的视图，汇报进度
    fn apply_drag(&mut self, translation: Vec2) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let Some(drag) = active.drag.as_mut() else {
            return;
        };

        let progress = active.policy.progress(translation, drag.reference_distance);
        drag.translation = translation;
        drag.progress = progress;

        if let Some(view) = drag.view.view() {
            view.set_center(drag.anchor + translation);
            if active.config.scale_while_dragging {
                let shrink = 1.0 - (1.0 - active.config.min_drag_scale) * progress;
                view.set_scale(drag.view.snapshot().scale * shrink);
            }
        }
        self.backdrop.set_alpha(1.0 - progress);
        active.context.update_interactive_transition(progress);
    }

    fn decide(&self, translation: Vec2, velocity: Vec2) -> TransitionOutcome {
        let Some(active) = &self.active else {
            return TransitionOutcome::Cancelled;
        };
        let progress = self.progress();
        let outcome = active.policy.decide(translation, velocity, progress);
        debug!(
            progress,
            velocity_y = velocity.y,
            outcome = %outcome,
            "松手判定"
        );
        outcome
    }

    /// 松手后：完成或回弹
    fn settle(&mut self, outcome: TransitionOutcome) {
        let progress = self.progress();
        let Some(active) = self.active.as_mut() else {
            return;
        };

        match outcome {
            TransitionOutcome::Completed => active.context.finish_interactive_transition(),
            TransitionOutcome::Cancelled => active.context.cancel_interactive_transition(),
        }
        active.interaction_resolved = true;
        active.pending_outcome = outcome;

        let duration = active.policy.settle_duration(outcome, progress);
        let easing = active.config.settle_easing;

        if let Some(drag) = &active.drag {
            let result = match outcome {
                TransitionOutcome::Completed => {
                    Self::animate_drag_completion(&mut self.animation_system, &active.scene, drag, duration, easing)
                }
                TransitionOutcome::Cancelled => {
                    Self::animate_drag_rollback(&mut self.animation_system, drag, duration, easing)
                }
            };
            if let Err(e) = result {
                warn!(error = %e, "松手动画启动失败");
            }
        }

        let backdrop_target = match outcome {
            TransitionOutcome::Completed => 0.0,
            TransitionOutcome::Cancelled => 1.0,
        };
        if let Err(e) = self.animation_system.animate_object_from_current::<Backdrop>(
            active.backdrop_id,
            props::ALPHA,
            backdrop_target,
            duration,
            easing,
        ) {
            warn!(error = %e, "遮罩动画启动失败");
        }

        self.set_phase(match outcome {
            TransitionOutcome::Completed => TransitionPhase::Completing,
            TransitionOutcome::Cancelled => TransitionPhase::Cancelling,
        });
        debug!(outcome = %outcome, progress, duration, "松手");
    }

    /// 完成关闭：能回到缩略图就飞回去，否则沿拖动方向移出屏幕并淡出
    fn animate_drag_completion(
        system: &mut AnimationSystem,
        scene: &TransitionScene,
        drag: &DragTracking,
        duration: f32,
        easing: EasingFunction,
    ) -> Result<(), AnimationError> {
        let Some(view) = drag.view.view() else {
            return Ok(());
        };
        let id = drag.view.object_id;

        if let (true, Some(starting_frame)) = (scene.is_spatial(), scene.starting_frame) {
            let target = scene.to_parent_space(&view, starting_frame);
            animate_frame_from_current(system, id, target, duration, easing)?;
            system.animate_object_from_current::<View>(
                id,
                props::SCALE,
                drag.view.snapshot().scale,
                duration,
                easing,
            )?;
        } else {
            let direction = if drag.translation.y < 0.0 { -1.0 } else { 1.0 };
            let travel = scene.container.frame().height();
            let target_y = view.frame().y() + direction * travel;
            system.animate_object_from_current::<View>(id, props::Y, target_y, duration, easing)?;
            system.animate_object_from_current::<View>(id, props::ALPHA, 0.0, duration, easing)?;
        }
        Ok(())
    }

    /// 回弹：被拖动的视图回到手势开始前的位置
    fn animate_drag_rollback(
        system: &mut AnimationSystem,
        drag: &DragTracking,
        duration: f32,
        easing: EasingFunction,
    ) -> Result<(), AnimationError> {
        let id = drag.view.object_id;
        let snapshot = drag.view.snapshot();
        animate_frame_from_current(system, id, snapshot.frame, duration, easing)?;
        system.animate_object_from_current::<View>(id, props::SCALE, snapshot.scale, duration, easing)?;
        Ok(())
    }

    // ========== 帧驱动 ==========

    /// 推进一帧
    ///
    /// # 返回
    /// - `true`: 转场仍在进行中（包括跟手阶段）
    /// - `false`: 空闲
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.phase.is_animating() {
            return !self.phase.is_idle();
        }

        if !self.animation_system.update(dt) {
            let outcome = self
                .active
                .as_ref()
                .map_or(TransitionOutcome::Completed, |a| a.pending_outcome);
            self.finish(outcome);
        }

        !self.phase.is_idle()
    }

    /// 跳过动画，立即落到终点并汇报结果
    ///
    /// 跟手阶段没有可跳过的动画，调用无效。
    pub fn skip(&mut self) {
        if !self.phase.is_animating() {
            return;
        }
        debug!(phase = %self.phase, "跳过转场动画");
        self.animation_system.skip_all();
        self.update(0.0);
    }

    /// 强制取消当前转场：所有视图立即回到转场前的状态，汇报 `false`
    pub fn cancel_transition(&mut self) {
        if self.active.is_none() {
            return;
        }
        debug!(phase = %self.phase, "强制取消转场");
        self.finish(TransitionOutcome::Cancelled);
    }

    /// 收尾：恢复视图、注销动画对象、汇报结果
    ///
    /// 所有结束路径都经过这里；`active` 被取走，保证每个转场只汇报一次。
    fn finish(&mut self, outcome: TransitionOutcome) {
        let Some(active) = self.active.take() else {
            self.set_phase(TransitionPhase::Idle);
            return;
        };

        match outcome {
            TransitionOutcome::Completed => {
                active.scene.settle_completed();
                self.backdrop.set_alpha(match active.direction {
                    TransitionDirection::Present => 1.0,
                    TransitionDirection::Dismiss => 0.0,
                });
            }
            TransitionOutcome::Cancelled => {
                if let Some(drag) = &active.drag {
                    drag.view.restore();
                }
                active.scene.roll_back();
                self.backdrop.set_alpha(match active.direction {
                    TransitionDirection::Present => 0.0,
                    TransitionDirection::Dismiss => 1.0,
                });
            }
        }

        for id in active.scene.object_ids() {
            self.animation_system.unregister(id);
        }
        if let Some(drag) = &active.drag {
            self.animation_system.unregister(drag.view.object_id);
        }
        self.animation_system.unregister(active.backdrop_id);

        if active.drag.is_some() && !active.interaction_resolved {
            match outcome {
                TransitionOutcome::Completed => active.context.finish_interactive_transition(),
                TransitionOutcome::Cancelled => active.context.cancel_interactive_transition(),
            }
        }

        self.set_phase(TransitionPhase::Idle);
        info!(direction = %active.direction, outcome = %outcome, "转场结束");
        active.context.complete_transition(outcome.is_completed());
    }

    fn set_phase(&mut self, phase: TransitionPhase) {
        if self.phase != phase {
            debug!(from = %self.phase, to = %phase, "转场阶段切换");
            self.phase = phase;
        }
    }
}

/// 引擎被释放时，未结束的转场按取消处理：视图回滚，上下文收到 `false`
impl Drop for TransitionEngine {
    fn drop(&mut self) {
        if self.active.is_some() {
            warn!(phase = %self.phase, "引擎释放时转场未结束，强制取消");
            self.cancel_transition();
        }
    }
}

/// 同时驱动 frame 的四个分量
fn animate_frame(
    system: &mut AnimationSystem,
    id: ObjectId,
    from: Rect,
    to: Rect,
    duration: f32,
    easing: EasingFunction,
) -> Result<(), AnimationError> {
    system.animate_object::<View>(id, props::X, from.x(), to.x(), duration, easing)?;
    system.animate_object::<View>(id, props::Y, from.y(), to.y(), duration, easing)?;
    system.animate_object::<View>(id, props::WIDTH, from.width(), to.width(), duration, easing)?;
    system.animate_object::<View>(id, props::HEIGHT, from.height(), to.height(), duration, easing)?;
    Ok(())
}

fn animate_frame_from_current(
    system: &mut AnimationSystem,
    id: ObjectId,
    to: Rect,
    duration: f32,
    easing: EasingFunction,
) -> Result<(), AnimationError> {
    system.animate_object_from_current::<View>(id, props::X, to.x(), duration, easing)?;
    system.animate_object_from_current::<View>(id, props::Y, to.y(), duration, easing)?;
    system.animate_object_from_current::<View>(id, props::WIDTH, to.width(), duration, easing)?;
    system.animate_object_from_current::<View>(id, props::HEIGHT, to.height(), duration, easing)?;
    Ok(())
}
