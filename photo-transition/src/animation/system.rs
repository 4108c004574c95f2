//! 时间轴调度。
//!
//! 对象实现 `Animatable` 并注册，系统每帧把插值写回属性：
//! ```rust,ignore
//! let id = system.register(&view);
//! system.animate_object::<View>(id, "alpha", 0.0, 1.0, 0.3, EasingFunction::EaseOut)?;
//! system.update(dt);
//! ```
//!
//! 系统只持有弱引用。宿主释放了对象，相关时间轴在下一帧被丢弃，
//! 对象的生命周期不会被延长。

use std::any::TypeId;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::debug;

use super::traits::{AnimPropertyKey, Animatable, ObjectId};
use super::{Animation, AnimationId, EasingFunction};
use crate::error::AnimationError;

struct Registration {
    object: Weak<dyn Animatable>,
    type_id: TypeId,
}

impl Registration {
    fn live(&self) -> Option<Rc<dyn Animatable>> {
        self.object.upgrade()
    }
}

/// 动画系统
///
/// 每个 (对象, 属性) 上最多一条时间轴。不关心对象是什么，
/// 视图和遮罩层对它来说都只是一组命名的 f32。
#[derive(Default)]
pub struct AnimationSystem {
    registry: HashMap<ObjectId, Registration>,
    timelines: HashMap<AnimPropertyKey, Animation>,
    issued_objects: u64,
    issued_animations: u64,
}

impl std::fmt::Debug for AnimationSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationSystem")
            .field("registry", &self.registry.len())
            .field("timelines", &self.timelines.len())
            .finish()
    }
}

impl AnimationSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册对象，只保留弱引用
    ///
    /// 同一个对象注册两次会拿到两个不同的 `ObjectId`。
    pub fn register<T: Animatable>(&mut self, object: &Rc<T>) -> ObjectId {
        self.issued_objects += 1;
        let id = ObjectId(self.issued_objects);
        let object: Weak<dyn Animatable> = Rc::downgrade(object) as Weak<dyn Animatable>;
        self.registry.insert(
            id,
            Registration {
                object,
                type_id: TypeId::of::<T>(),
            },
        );
        id
    }

    /// 注销对象，它身上的时间轴一并移除，属性保持当前值
    pub fn unregister(&mut self, object_id: ObjectId) {
        self.registry.remove(&object_id);
        self.timelines.retain(|key, _| key.object_id != object_id);
    }

    pub fn is_registered(&self, object_id: ObjectId) -> bool {
        self.registry
            .get(&object_id)
            .is_some_and(|r| r.object.strong_count() > 0)
    }

    pub fn registered_count(&self) -> usize {
        self.registry.len()
    }

    fn resolve<T: 'static>(&self, object_id: ObjectId) -> Result<Rc<dyn Animatable>, AnimationError> {
        let registration = self
            .registry
            .get(&object_id)
            .ok_or(AnimationError::ObjectNotFound { object_id })?;

        if registration.type_id != TypeId::of::<T>() {
            return Err(AnimationError::TypeMismatch { object_id });
        }

        registration
            .live()
            .ok_or(AnimationError::ObjectNotFound { object_id })
    }

    /// 启动属性动画
    ///
    /// 同一属性上的旧时间轴被顶替，属性立即被设为 `from`。
    pub fn animate_object<T: 'static>(
        &mut self,
        object_id: ObjectId,
        property_id: &'static str,
        from: f32,
        to: f32,
        duration: f32,
        easing: EasingFunction,
    ) -> Result<AnimationId, AnimationError> {
        let object = self.resolve::<T>(object_id)?;
        if object.get_property(property_id).is_none() {
            return Err(AnimationError::UnknownProperty {
                object_id,
                property: property_id,
            });
        }

        self.issued_animations += 1;
        let id = AnimationId::new(self.issued_animations);
        let animation = Animation::new(id, from, to, duration).with_easing(easing);
        object.set_property(property_id, animation.current_value());

        self.timelines
            .insert(AnimPropertyKey::new(object_id, property_id), animation);
        Ok(id)
    }

    /// 以属性当前值为起点启动动画，手势松开后从实时位置接着走
    pub fn animate_object_from_current<T: 'static>(
        &mut self,
        object_id: ObjectId,
        property_id: &'static str,
        to: f32,
        duration: f32,
        easing: EasingFunction,
    ) -> Result<AnimationId, AnimationError> {
        let from = self
            .resolve::<T>(object_id)?
            .get_property(property_id)
            .ok_or(AnimationError::UnknownProperty {
                object_id,
                property: property_id,
            })?;
        self.animate_object::<T>(object_id, property_id, from, to, duration, easing)
    }

    /// 推进所有时间轴并写回属性
    ///
    /// 返回推进后是否还有时间轴在运行。
    pub fn update(&mut self, dt: f32) -> bool {
        let registry = &self.registry;
        self.timelines.retain(|key, animation| {
            let Some(object) = registry.get(&key.object_id).and_then(Registration::live) else {
                debug!(key = %key, "动画对象已释放，丢弃时间轴");
                return false;
            };

            animation.update(dt);
            object.set_property(key.property_id, animation.current_value());
            animation.is_active()
        });
        self.has_active_animations()
    }

    /// 所有时间轴直接落到终值，下一次 `update` 时移除
    pub fn skip_all(&mut self) {
        for (key, animation) in &mut self.timelines {
            if !animation.is_active() {
                continue;
            }
            animation.skip();
            if let Some(object) = self.registry.get(&key.object_id).and_then(Registration::live) {
                object.set_property(key.property_id, animation.final_value());
            }
        }
    }

    pub fn has_active_animations(&self) -> bool {
        self.timelines.values().any(Animation::is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// 缩略图替身：alpha 和 scale 两个属性
    struct Thumb {
        alpha: Cell<f32>,
        scale: Cell<f32>,
    }

    impl Thumb {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                alpha: Cell::new(1.0),
                scale: Cell::new(1.0),
            })
        }
    }

    impl Animatable for Thumb {
        fn get_property(&self, property_id: &str) -> Option<f32> {
            match property_id {
                "alpha" => Some(self.alpha.get()),
                "scale" => Some(self.scale.get()),
                _ => None,
            }
        }

        fn set_property(&self, property_id: &str, value: f32) -> bool {
            match property_id {
                "alpha" => self.alpha.set(value),
                "scale" => self.scale.set(value),
                _ => return false,
            }
            true
        }

        fn property_list(&self) -> &'static [&'static str] {
            &["alpha", "scale"]
        }
    }

    const LINEAR: EasingFunction = EasingFunction::Linear;

    #[test]
    fn test_each_registration_gets_its_own_id() {
        let mut system = AnimationSystem::new();
        let thumb = Thumb::new();

        let first = system.register(&thumb);
        let second = system.register(&thumb);

        assert_ne!(first, second);
        assert_eq!(system.registered_count(), 2);
        assert!(system.is_registered(first));
    }

    #[test]
    fn test_update_writes_back_until_done() {
        let mut system = AnimationSystem::new();
        let thumb = Thumb::new();
        let id = system.register(&thumb);

        system
            .animate_object::<Thumb>(id, "alpha", 0.0, 1.0, 1.0, LINEAR)
            .unwrap();
        assert_eq!(thumb.alpha.get(), 0.0);

        assert!(system.update(0.5));
        assert!((thumb.alpha.get() - 0.5).abs() < 1e-6);

        assert!(!system.update(0.6));
        assert_eq!(thumb.alpha.get(), 1.0);
    }

    #[test]
    fn test_new_animation_replaces_old_one_on_same_property() {
        let mut system = AnimationSystem::new();
        let thumb = Thumb::new();
        let id = system.register(&thumb);

        system
            .animate_object::<Thumb>(id, "scale", 1.0, 2.0, 1.0, LINEAR)
            .unwrap();
        system.update(0.5);
        system
            .animate_object_from_current::<Thumb>(id, "scale", 1.0, 1.0, LINEAR)
            .unwrap();

        system.update(0.5);
        assert!((thumb.scale.get() - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_animate_errors() {
        let mut system = AnimationSystem::new();
        let thumb = Thumb::new();
        let id = system.register(&thumb);

        struct Other;
        assert_eq!(
            system.animate_object::<Other>(id, "alpha", 0.0, 1.0, 1.0, LINEAR),
            Err(AnimationError::TypeMismatch { object_id: id })
        );
        assert_eq!(
            system.animate_object::<Thumb>(id, "frame.x", 0.0, 1.0, 1.0, LINEAR),
            Err(AnimationError::UnknownProperty {
                object_id: id,
                property: "frame.x"
            })
        );
        assert!(matches!(
            system.animate_object::<Thumb>(ObjectId(999), "alpha", 0.0, 1.0, 1.0, LINEAR),
            Err(AnimationError::ObjectNotFound { .. })
        ));
    }

    #[test]
    fn test_released_object_drops_its_timelines() {
        let mut system = AnimationSystem::new();
        let thumb = Thumb::new();
        let id = system.register(&thumb);

        system
            .animate_object::<Thumb>(id, "alpha", 0.0, 1.0, 1.0, LINEAR)
            .unwrap();
        drop(thumb);

        assert!(!system.is_registered(id));
        assert!(!system.update(0.1));
    }

    #[test]
    fn test_skip_all_lands_on_final_values() {
        let mut system = AnimationSystem::new();
        let thumb = Thumb::new();
        let id = system.register(&thumb);

        system
            .animate_object::<Thumb>(id, "alpha", 0.0, 1.0, 1.0, LINEAR)
            .unwrap();
        system
            .animate_object::<Thumb>(id, "scale", 1.0, 0.25, 1.0, LINEAR)
            .unwrap();
        system.update(0.1);
        system.skip_all();

        assert_eq!(thumb.alpha.get(), 1.0);
        assert_eq!(thumb.scale.get(), 0.25);
        assert!(!system.has_active_animations());
        assert!(!system.update(0.0));
    }

    #[test]
    fn test_unregister_keeps_current_value() {
        let mut system = AnimationSystem::new();
        let thumb = Thumb::new();
        let id = system.register(&thumb);

        system
            .animate_object::<Thumb>(id, "alpha", 0.0, 1.0, 1.0, LINEAR)
            .unwrap();
        system.update(0.25);
        system.unregister(id);

        assert!(!system.update(0.5));
        assert!((thumb.alpha.get() - 0.25).abs() < 1e-6);
        assert_eq!(system.registered_count(), 0);
    }
}
