//! # Scene 模块
//!
//! 一次转场涉及的全部视图：解析端点、计算起止矩形、记录快照以便回滚。

use std::rc::{Rc, Weak};

use tracing::debug;

use super::TransitionDirection;
use crate::animation::{AnimationSystem, ObjectId};
use crate::compat::CompatibilityResolver;
use crate::context::TransitionContext;
use crate::geometry::Rect;
use crate::view::{View, ViewSnapshot};

/// 被转场触碰的视图
///
/// 只持有弱引用：宿主在转场途中释放视图，相关动画和回滚都会静默跳过。
#[derive(Debug)]
pub(crate) struct TrackedView {
    view: Weak<View>,
    snapshot: ViewSnapshot,
    pub(crate) object_id: ObjectId,
}

impl TrackedView {
    /// 记录快照并注册到动画系统
    pub(crate) fn track(view: &Rc<View>, system: &mut AnimationSystem) -> Self {
        Self {
            view: Rc::downgrade(view),
            snapshot: view.snapshot(),
            object_id: system.register(view),
        }
    }

    pub(crate) fn view(&self) -> Option<Rc<View>> {
        self.view.upgrade()
    }

    pub(crate) fn snapshot(&self) -> &ViewSnapshot {
        &self.snapshot
    }

    /// 恢复到开始转场前的状态
    pub(crate) fn restore(&self) {
        if let Some(view) = self.view() {
            view.restore(&self.snapshot);
        }
    }
}

/// 一次转场的场景
#[derive(Debug)]
pub(crate) struct TransitionScene {
    pub(crate) container: Rc<View>,
    pub(crate) source: Option<TrackedView>,
    pub(crate) destination: Option<TrackedView>,
    pub(crate) starting: Option<TrackedView>,
    pub(crate) ending: Option<TrackedView>,
    /// 起始视图在容器坐标系中的矩形
    pub(crate) starting_frame: Option<Rect>,
    /// 结束视图静止时在容器坐标系中的矩形
    pub(crate) ending_frame: Option<Rect>,
    /// 转入方最终 frame（容器坐标系）
    pub(crate) final_frame: Rect,
    /// 呈现时由引擎挂到容器上的转入方，回滚时需要摘下
    attached_destination: bool,
}

impl TransitionScene {
    /// 解析场景
    ///
    /// 呈现时先把转入方挂到容器并按最终 frame 布局，再测量结束视图，
    /// 这样结束视图的静止位置与转入方的最终布局一致。
    pub(crate) fn resolve(
        resolver: &dyn CompatibilityResolver,
        ctx: &dyn TransitionContext,
        direction: TransitionDirection,
        starting: Option<Rc<View>>,
        ending: Option<Rc<View>>,
        system: &mut AnimationSystem,
    ) -> Self {
        let container = ctx.container_view();
        let source = resolver.source_view(ctx);
        let destination = resolver.destination_view(ctx);
        let final_frame = resolver.final_destination_frame(ctx);

        let source = source.map(|view| TrackedView::track(&view, system));
        let destination_tracked = destination
            .as_ref()
            .map(|view| TrackedView::track(view, system));

        let mut attached_destination = false;
        if direction == TransitionDirection::Present {
            if let Some(view) = &destination {
                if !view.is_descendant_of(&container) {
                    view.attach_to(&container);
                    attached_destination = true;
                }
                let parent = view.parent();
                view.set_frame(container.convert_rect_to(final_frame, parent.as_deref()));
            }
        }

        let starting_frame = starting
            .as_ref()
            .map(|view| view.convert_rect_to(view.bounds(), Some(&container)));
        let ending_frame = ending
            .as_ref()
            .map(|view| view.convert_rect_to(view.bounds(), Some(&container)));

        debug!(
            resolver = resolver.name(),
            direction = %direction,
            has_source = source.is_some(),
            has_destination = destination_tracked.is_some(),
            starting_frame = ?starting_frame,
            ending_frame = ?ending_frame,
            final_frame = ?final_frame,
            "转场场景解析完成"
        );

        Self {
            container,
            source,
            destination: destination_tracked,
            starting: starting.map(|view| TrackedView::track(&view, system)),
            ending: ending.map(|view| TrackedView::track(&view, system)),
            starting_frame,
            ending_frame,
            final_frame,
            attached_destination,
        }
    }

    /// 起止视图都在，可以做缩放式转场
    pub(crate) fn is_spatial(&self) -> bool {
        self.starting.as_ref().and_then(TrackedView::view).is_some()
            && self.ending.as_ref().and_then(TrackedView::view).is_some()
            && self.starting_frame.is_some()
            && self.ending_frame.is_some()
    }

    /// 起始视图（缩略图）
    pub(crate) fn starting_view(&self) -> Option<Rc<View>> {
        self.starting.as_ref().and_then(TrackedView::view)
    }

    /// 结束视图（大图）
    pub(crate) fn ending_view(&self) -> Option<Rc<View>> {
        self.ending.as_ref().and_then(TrackedView::view)
    }

    /// 把容器坐标系中的矩形换算到 `view` 的父视图坐标系
    pub(crate) fn to_parent_space(&self, view: &View, rect: Rect) -> Rect {
        let parent = view.parent();
        self.container.convert_rect_to(rect, parent.as_deref())
    }

    /// 所有被跟踪视图的动画对象 ID
    pub(crate) fn object_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        [&self.source, &self.destination, &self.starting, &self.ending]
            .into_iter()
            .flatten()
            .map(|tracked| tracked.object_id)
    }

    /// 转场完成后的收尾：起始视图重新显示
    pub(crate) fn settle_completed(&self) {
        if let Some(starting) = &self.starting {
            starting.restore();
        }
    }

    /// 回滚到转场开始前的状态
    pub(crate) fn roll_back(&self) {
        // 起止视图可能就是端点视图的子孙，先恢复外层再恢复内层
        for tracked in [&self.source, &self.destination, &self.ending, &self.starting]
            .into_iter()
            .flatten()
        {
            tracked.restore();
        }

        if self.attached_destination {
            if let Some(view) = self.destination.as_ref().and_then(TrackedView::view) {
                view.detach();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::{LegacyContract, ModernContract};
    use crate::context::RecordingContext;
    use crate::view::ViewController;

    fn container() -> Rc<View> {
        View::new("container", Rect::new(0.0, 0.0, 320.0, 500.0))
    }

    #[test]
    fn test_present_lays_out_destination() {
        let container = container();
        let photos = View::new("photos", Rect::new(0.0, 0.0, 10.0, 10.0));
        let image = View::new("image", Rect::new(0.0, 90.0, 320.0, 320.0));
        image.attach_to(&photos);

        let ctx = RecordingContext::legacy(container.clone())
            .with_to(ViewController::new(photos.clone()));
        let mut system = AnimationSystem::new();

        let scene = TransitionScene::resolve(
            &LegacyContract,
            &ctx,
            TransitionDirection::Present,
            None,
            Some(image.clone()),
            &mut system,
        );

        assert!(photos.is_descendant_of(&container));
        assert_eq!(photos.frame(), container.bounds());
        assert_eq!(scene.ending_frame, Some(Rect::new(0.0, 90.0, 320.0, 320.0)));
        assert!(!scene.is_spatial());

        scene.roll_back();
        assert!(photos.parent().is_none());
        assert_eq!(photos.frame(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_frames_in_container_space() {
        let container = container();
        let list = View::new("list", Rect::new(0.0, 0.0, 320.0, 500.0));
        let cell = View::new("cell", Rect::new(0.0, 300.0, 320.0, 100.0));
        let thumb = View::new("thumb", Rect::new(10.0, 10.0, 80.0, 80.0));
        list.attach_to(&container);
        cell.attach_to(&list);
        thumb.attach_to(&cell);
        let image = View::new("image", Rect::new(0.0, 90.0, 320.0, 320.0));
        image.attach_to(&container);

        let ctx = RecordingContext::modern(container.clone())
            .with_from(ViewController::new(list.clone()));
        let mut system = AnimationSystem::new();

        let scene = TransitionScene::resolve(
            &ModernContract,
            &ctx,
            TransitionDirection::Dismiss,
            Some(thumb.clone()),
            Some(image.clone()),
            &mut system,
        );

        assert!(scene.is_spatial());
        assert_eq!(scene.starting_frame, Some(Rect::new(10.0, 310.0, 80.0, 80.0)));
        assert_eq!(scene.object_ids().count(), 3);
        assert_eq!(
            scene.to_parent_space(&thumb, Rect::new(10.0, 310.0, 80.0, 80.0)),
            Rect::new(10.0, 10.0, 80.0, 80.0)
        );
    }

    #[test]
    fn test_roll_back_skips_released_views() {
        let container = container();
        let ctx = RecordingContext::modern(container);
        let mut system = AnimationSystem::new();
        let thumb = View::new("thumb", Rect::new(0.0, 0.0, 80.0, 80.0));

        let scene = TransitionScene::resolve(
            &ModernContract,
            &ctx,
            TransitionDirection::Dismiss,
            Some(thumb.clone()),
            None,
            &mut system,
        );
        drop(thumb);

        assert!(scene.starting_view().is_none());
        scene.roll_back();
    }
}
