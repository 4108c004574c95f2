//! 可动画对象的接口与标识。
//!
//! 类型检查在注册表里按对象做一次，属性键只负责定位单条时间轴。

use std::fmt;

/// 注册到 `AnimationSystem` 后拿到的句柄
///
/// 同一个系统内单调递增，对象释放后不会复用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub(crate) u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 单条时间轴的键：一个对象上的一个属性
///
/// 同一个键上的新动画会顶替旧动画。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimPropertyKey {
    pub object_id: ObjectId,
    pub property_id: &'static str,
}

impl AnimPropertyKey {
    pub fn new(object_id: ObjectId, property_id: &'static str) -> Self {
        Self {
            object_id,
            property_id,
        }
    }
}

impl fmt::Display for AnimPropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.object_id, self.property_id)
    }
}

/// 能被时间轴驱动的对象
///
/// 属性一律是 `f32`，按名字读写。方法只拿 `&self`，
/// 状态放在 `Cell` / `RefCell` 里，系统这边只保留弱引用。
pub trait Animatable: 'static {
    /// 读属性，名字不认识时返回 `None`
    fn get_property(&self, property_id: &str) -> Option<f32>;

    /// 写属性，名字不认识时返回 `false`
    fn set_property(&self, property_id: &str, value: f32) -> bool;

    fn property_list(&self) -> &'static [&'static str];
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashSet;

    /// 只有一个 `progress` 属性的指示条
    struct ProgressBar {
        progress: Cell<f32>,
    }

    impl Animatable for ProgressBar {
        fn get_property(&self, property_id: &str) -> Option<f32> {
            (property_id == "progress").then(|| self.progress.get())
        }

        fn set_property(&self, property_id: &str, value: f32) -> bool {
            let known = property_id == "progress";
            if known {
                self.progress.set(value.clamp(0.0, 1.0));
            }
            known
        }

        fn property_list(&self) -> &'static [&'static str] {
            &["progress"]
        }
    }

    #[test]
    fn test_keys_distinguish_object_and_property() {
        let image = ObjectId(7);
        let backdrop = ObjectId(8);

        let keys: HashSet<_> = [
            AnimPropertyKey::new(image, "frame.y"),
            AnimPropertyKey::new(image, "frame.y"),
            AnimPropertyKey::new(image, "alpha"),
            AnimPropertyKey::new(backdrop, "alpha"),
        ]
        .into_iter()
        .collect();

        assert_eq!(keys.len(), 3);
        assert_eq!(AnimPropertyKey::new(image, "frame.y").to_string(), "#7.frame.y");
    }

    #[test]
    fn test_unknown_property_is_rejected() {
        let bar = ProgressBar {
            progress: Cell::new(0.0),
        };

        assert!(bar.set_property("progress", 1.4));
        assert_eq!(bar.get_property("progress"), Some(1.0));

        assert!(!bar.set_property("alpha", 0.5));
        assert_eq!(bar.get_property("alpha"), None);
        assert_eq!(bar.property_list(), ["progress"]);
    }
}
