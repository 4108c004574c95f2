//! # Replay 模块
//!
//! 无界面回放拖拽手势脚本。
//!
//! 脚本描述一个已经呈现的照片详情页（容器尺寸、缩略图与大图的位置）和一串拖拽样本。
//! 回放时搭建对应的视图树，用 [`RecordingContext`] 充当宿主，
//! 以固定帧步长推进引擎直到回到 `Idle`，得到确定的结果。
//!
//! ```json
//! {
//!   "name": "slow drag past half",
//!   "container": { "width": 320.0, "height": 500.0 },
//!   "anchor": { "x": 160.0, "y": 400.0 },
//!   "samples": [
//!     { "phase": "began" },
//!     { "phase": "changed", "translation": { "x": 0.0, "y": 250.0 } },
//!     { "phase": "ended", "translation": { "x": 0.0, "y": 260.0 }, "velocity": { "x": 0.0, "y": 50.0 } }
//!   ],
//!   "expected": "completed"
//! }
//! ```

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compat::PlatformContract;
use crate::config::TransitionConfig;
use crate::context::{RecordingContext, TransitionContext, TransitionOutcome};
use crate::engine::{TransitionEngine, TransitionHost, TransitionPhase};
use crate::error::ReplayError;
use crate::geometry::{Rect, Size, Vec2};
use crate::gesture::{DragPhase, DragSample};
use crate::view::{View, ViewController};

/// 回放帧步长（秒）
pub const FRAME_STEP: f32 = 1.0 / 60.0;

/// 松手后最多推进的帧数
pub const MAX_SETTLE_FRAMES: usize = 600;

/// 手势脚本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureScript {
    #[serde(default)]
    pub name: Option<String>,
    /// 容器尺寸
    pub container: Size,
    #[serde(default)]
    pub contract: PlatformContract,
    /// 缩略图在容器中的 frame；缺省时退化为非缩放关闭
    #[serde(default)]
    pub thumbnail: Option<Rect>,
    /// 大图在详情页中的 frame；缺省时拖动整个详情页
    #[serde(default)]
    pub image: Option<Rect>,
    /// 手势开始时被拖动视图的中心；缺省时取其当前中心
    #[serde(default)]
    pub anchor: Option<Vec2>,
    #[serde(default)]
    pub force_non_interactive: bool,
    pub samples: Vec<DragSample>,
    /// 期望结果
    #[serde(default)]
    pub expected: Option<TransitionOutcome>,
    /// 覆盖默认配置
    #[serde(default)]
    pub config: Option<TransitionConfig>,
}

impl GestureScript {
    /// 从 JSON 解析并检查
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let script: Self = serde_json::from_str(json)?;
        script.validate()?;
        Ok(script)
    }

    /// 检查脚本是否可以回放
    pub fn validate(&self) -> Result<(), ReplayError> {
        if self.container.width <= 0.0 || self.container.height <= 0.0 {
            return Err(ReplayError::InvalidScript(format!(
                "容器尺寸必须为正，实际为 {}x{}",
                self.container.width, self.container.height
            )));
        }
        match self.samples.first() {
            None => Err(ReplayError::InvalidScript("没有拖拽样本".to_string())),
            Some(first) if first.phase != DragPhase::Began => Err(ReplayError::InvalidScript(
                "第一个样本必须是 began".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }

    /// 显示用名称
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

/// 回放结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    /// 汇报给上下文的结果（手势未能开始转场时为 `None`）
    pub outcome: Option<TransitionOutcome>,
    /// 汇报给上下文的每一次交互进度
    pub progress_trace: Vec<f32>,
    /// 依次经过的阶段（相邻去重）
    pub phases: Vec<TransitionPhase>,
    /// `complete_transition` 被调用的次数
    pub completion_count: usize,
    /// 推进的帧数
    pub frames: usize,
}

impl ReplayReport {
    /// 是否符合脚本中的期望（没有期望时恒为真）
    pub fn matches(&self, expected: Option<TransitionOutcome>) -> bool {
        expected.is_none_or(|expected| self.outcome == Some(expected))
    }

    /// 便于比对的文本摘要（不含帧数）
    pub fn summary(&self) -> String {
        let outcome = self
            .outcome
            .map_or_else(|| "none".to_string(), |o| o.to_string());
        let phases = self
            .phases
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        let progress = self
            .progress_trace
            .iter()
            .map(|p| format!("{p:.2}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "outcome: {outcome}\nreports: {}\nphases: {phases}\nprogress: [{progress}]",
            self.completion_count
        )
    }
}

/// 回放用宿主：每次关闭都交出同一个记录上下文
struct ReplayHost {
    context: Rc<RecordingContext>,
}

impl TransitionHost for ReplayHost {
    fn begin_dismissal(&self) -> Option<Rc<dyn TransitionContext>> {
        let context: Rc<dyn TransitionContext> = self.context.clone();
        Some(context)
    }
}

/// 回放手势脚本
///
/// 脚本自带 `config` 时优先使用，否则使用 `config` 参数。
pub fn replay(script: &GestureScript, config: &TransitionConfig) -> Result<ReplayReport, ReplayError> {
    script.validate()?;

    let bounds = Rect::new(0.0, 0.0, script.container.width, script.container.height);
    let container = View::new("container", bounds);

    let presenter = View::new("presenter", bounds);
    presenter.attach_to(&container);
    let thumbnail = script.thumbnail.map(|frame| {
        let view = View::new("thumbnail", frame);
        view.attach_to(&presenter);
        view
    });

    let photos = View::new("photos", bounds);
    photos.attach_to(&container);
    let image = script.image.map(|frame| {
        let view = View::new("image", frame);
        view.attach_to(&photos);
        view
    });
    let dragged = image.clone().unwrap_or_else(|| photos.clone());
    let anchor = script.anchor.unwrap_or_else(|| dragged.center());

    let context = {
        let base = match script.contract {
            PlatformContract::Legacy => RecordingContext::legacy(container.clone()),
            PlatformContract::Modern => RecordingContext::modern(container.clone()),
        };
        Rc::new(
            base.with_from(ViewController::new(photos.clone()))
                .with_to(ViewController::new(presenter.clone())),
        )
    };
    let host = Rc::new(ReplayHost {
        context: context.clone(),
    });

    let config = script.config.clone().unwrap_or_else(|| config.clone());
    let mut engine = TransitionEngine::new(config, script.contract);
    engine.set_starting_view(thumbnail.as_ref());
    engine.set_ending_view(image.as_ref());
    engine.set_force_non_interactive(script.force_non_interactive);
    engine.set_host(&host);

    let mut phases = vec![engine.phase()];
    let mut record = |phase: TransitionPhase| {
        if phases.last() != Some(&phase) {
            phases.push(phase);
        }
    };

    let mut frames = 0;
    for sample in &script.samples {
        engine.handle_drag_sample(*sample, &dragged, anchor);
        record(engine.phase());
        engine.update(FRAME_STEP);
        frames += 1;
        record(engine.phase());
    }

    let mut settle_frames = 0;
    while engine.is_active() {
        if settle_frames >= MAX_SETTLE_FRAMES {
            return Err(ReplayError::DidNotSettle { frames });
        }
        engine.update(FRAME_STEP);
        frames += 1;
        settle_frames += 1;
        record(engine.phase());
    }

    let log = context.log();
    debug!(
        script = script.display_name(),
        outcome = ?context.outcome(),
        frames,
        "手势回放结束"
    );

    Ok(ReplayReport {
        outcome: context.outcome(),
        progress_trace: log.percent_updates,
        phases,
        completion_count: log.outcomes.len(),
        frames,
    })
}
