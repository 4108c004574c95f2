//! # View 模块
//!
//! 与宿主 UI 工具包无关的视图模型。
//!
//! ## 设计说明
//!
//! - `View` 以 `Rc<View>` 共享，状态放在 `RefCell` 中，所有修改方法只需 `&self`
//! - 父视图是弱引用，视图树的所有权归宿主
//! - `frame` 位于父视图坐标系，`convert_rect_to` 经由窗口坐标在任意两个视图间换算
//! - `View` 实现 `Animatable`，转场引擎直接驱动它的几何与透明度属性

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::warn;

use crate::animation::Animatable;
use crate::geometry::{Rect, Vec2};

/// 视图上可被动画驱动的属性
pub mod props {
    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const ALPHA: &str = "alpha";
    pub const SCALE: &str = "scale";
}

#[derive(Debug)]
struct ViewData {
    frame: Rect,
    parent: Weak<View>,
    alpha: f32,
    scale: f32,
}

/// 视图
#[derive(Debug)]
pub struct View {
    name: String,
    data: RefCell<ViewData>,
}

/// 视图状态快照，用于取消转场时精确回滚
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSnapshot {
    pub frame: Rect,
    pub alpha: f32,
    pub scale: f32,
}

impl View {
    /// 支持的属性列表
    pub const PROPERTIES: &'static [&'static str] = &[
        props::X,
        props::Y,
        props::WIDTH,
        props::HEIGHT,
        props::ALPHA,
        props::SCALE,
    ];

    /// 创建新的视图（无父视图、完全不透明、无缩放）
    pub fn new(name: impl Into<String>, frame: Rect) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            data: RefCell::new(ViewData {
                frame,
                parent: Weak::new(),
                alpha: 1.0,
                scale: 1.0,
            }),
        })
    }

    /// 视图名称（用于日志）
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> Rect {
        self.data.borrow().frame
    }

    pub fn set_frame(&self, frame: Rect) {
        self.data.borrow_mut().frame = frame;
    }

    /// 自身坐标系下的边界
    pub fn bounds(&self) -> Rect {
        self.frame().bounds()
    }

    /// 父视图坐标系下的中心点
    pub fn center(&self) -> Vec2 {
        self.frame().center()
    }

    /// 保持尺寸，移动中心点
    pub fn set_center(&self, center: Vec2) {
        let mut data = self.data.borrow_mut();
        data.frame = data.frame.with_center(center);
    }

    pub fn alpha(&self) -> f32 {
        self.data.borrow().alpha
    }

    pub fn set_alpha(&self, alpha: f32) {
        self.data.borrow_mut().alpha = alpha.clamp(0.0, 1.0);
    }

    /// 以中心为基准的视觉缩放（不影响 frame）
    pub fn scale(&self) -> f32 {
        self.data.borrow().scale
    }

    pub fn set_scale(&self, scale: f32) {
        self.data.borrow_mut().scale = scale;
    }

    /// 父视图（已释放或未挂载时为 `None`）
    pub fn parent(&self) -> Option<Rc<View>> {
        self.data.borrow().parent.upgrade()
    }

    /// 挂载到父视图下
    ///
    /// 挂到自身或自己的子孙上会形成环，这种挂载被忽略。
    pub fn attach_to(&self, parent: &Rc<View>) {
        if std::ptr::eq(self, Rc::as_ptr(parent)) || parent.is_descendant_of(self) {
            warn!(view = self.name(), parent = parent.name(), "挂载会形成环，已忽略");
            return;
        }
        self.data.borrow_mut().parent = Rc::downgrade(parent);
    }

    /// 从父视图上移除
    pub fn detach(&self) {
        self.data.borrow_mut().parent = Weak::new();
    }

    /// 是否挂在 `ancestor` 之下（任意层级）
    pub fn is_descendant_of(&self, ancestor: &View) -> bool {
        let mut current = self.parent();
        while let Some(view) = current {
            if std::ptr::eq(Rc::as_ptr(&view), ancestor) {
                return true;
            }
            current = view.parent();
        }
        false
    }

    /// 自身坐标系原点在窗口坐标系中的位置
    pub fn window_origin(&self) -> Vec2 {
        let mut origin = self.frame().origin;
        let mut current = self.parent();
        while let Some(view) = current {
            origin = origin + view.frame().origin;
            current = view.parent();
        }
        origin
    }

    /// 把自身坐标系中的矩形换算到 `target` 的坐标系
    ///
    /// `target` 为 `None` 时换算到窗口坐标系。
    pub fn convert_rect_to(&self, rect: Rect, target: Option<&View>) -> Rect {
        let target_origin = target.map(View::window_origin).unwrap_or_default();
        rect.offset(self.window_origin() - target_origin)
    }

    /// 记录当前状态
    pub fn snapshot(&self) -> ViewSnapshot {
        let data = self.data.borrow();
        ViewSnapshot {
            frame: data.frame,
            alpha: data.alpha,
            scale: data.scale,
        }
    }

    /// 恢复到快照状态（不改变父子关系）
    pub fn restore(&self, snapshot: &ViewSnapshot) {
        let mut data = self.data.borrow_mut();
        data.frame = snapshot.frame;
        data.alpha = snapshot.alpha;
        data.scale = snapshot.scale;
    }
}

impl Animatable for View {
    fn get_property(&self, property_id: &str) -> Option<f32> {
        let data = self.data.borrow();
        match property_id {
            props::X => Some(data.frame.origin.x),
            props::Y => Some(data.frame.origin.y),
            props::WIDTH => Some(data.frame.size.width),
            props::HEIGHT => Some(data.frame.size.height),
            props::ALPHA => Some(data.alpha),
            props::SCALE => Some(data.scale),
            _ => None,
        }
    }

    fn set_property(&self, property_id: &str, value: f32) -> bool {
        let mut data = self.data.borrow_mut();
        match property_id {
            props::X => data.frame.origin.x = value,
            props::Y => data.frame.origin.y = value,
            props::WIDTH => data.frame.size.width = value,
            props::HEIGHT => data.frame.size.height = value,
            props::ALPHA => data.alpha = value.clamp(0.0, 1.0),
            props::SCALE => data.scale = value,
            _ => return false,
        }
        true
    }

    fn property_list(&self) -> &'static [&'static str] {
        Self::PROPERTIES
    }
}

/// 视图控制器句柄
///
/// 旧版平台契约只能按角色取到视图控制器，再由它取根视图。
#[derive(Debug, Clone)]
pub struct ViewController {
    view: Rc<View>,
}

impl ViewController {
    pub fn new(view: Rc<View>) -> Rc<Self> {
        Rc::new(Self { view })
    }

    /// 根视图
    pub fn view(&self) -> Rc<View> {
        self.view.clone()
    }
}
