//! # Helpers 模块
//!
//! 常用效果的便捷入口。全部只是参数化的 `animate_with` 调用，不引入新的引擎行为。
//!
//! - `shake`: 随机偏移逐渐衰减的路径，最后回到原点
//! - `punch`: 冲出一次再弹回
//! - `fade`: 只改颜色的透明度，或直接改 alpha 属性

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::accessor::ObjectId;
use crate::config::ShakeConfig;
use crate::easing::Easing;
use crate::error::{TweenError, TweenResult};
use crate::system::{TweenOptions, Tweener};
use crate::value::{TweenTo, Value, ValueKind};

impl Tweener {
    /// 震动（使用配置中的默认强度与次数）
    pub fn shake(&mut self, object: ObjectId, property: &str, duration: f32) -> TweenResult<()> {
        self.shake_with(object, property, duration, TweenOptions::new())
    }

    /// 震动，附带播放模式、完成回调等选项
    pub fn shake_with(
        &mut self,
        object: ObjectId,
        property: &str,
        duration: f32,
        options: TweenOptions,
    ) -> TweenResult<()> {
        let shake = self.config().shake;
        self.shake_with_rng(
            object,
            property,
            duration,
            shake,
            options,
            &mut rand::thread_rng(),
        )
    }

    /// 震动
    ///
    /// 生成 `vibrato` 个途经点：原点加上单位球（2D 为单位圆盘）内的随机偏移，
    /// 偏移幅度从 `strength` 线性衰减；最后回到原点。缓动固定为 `OutQuad`，
    /// `options` 中的缓动会被覆盖。
    ///
    /// 只支持 `vec2` / `vec3` 属性。
    pub fn shake_with_rng<R: Rng>(
        &mut self,
        object: ObjectId,
        property: &str,
        duration: f32,
        shake: ShakeConfig,
        options: TweenOptions,
        rng: &mut R,
    ) -> TweenResult<()> {
        let origin = self.read_vector(object, property)?;
        let vibrato = shake.vibrato.max(1);

        let mut path = Vec::with_capacity(vibrato as usize + 1);
        for i in 0..vibrato {
            let decay = 1.0 - i as f32 / vibrato as f32;
            let scale = shake.strength * decay;
            let point = match origin {
                Value::Vec2(v) => Value::Vec2(v + random_in_disk(rng) * scale),
                Value::Vec3(v) => Value::Vec3(v + random_in_ball(rng) * scale),
                _ => origin.clone(),
            };
            path.push(point);
        }
        path.push(origin);

        self.animate_with(
            object,
            property,
            TweenTo::Path(path),
            duration,
            options.easing(Easing::OutQuad),
        )
    }

    /// 冲击
    pub fn punch(
        &mut self,
        object: ObjectId,
        property: &str,
        punch: impl Into<Value>,
        duration: f32,
    ) -> TweenResult<()> {
        self.punch_with(object, property, punch, duration, TweenOptions::new())
    }

    /// 冲击：路径 `[起点 + punch, 起点]`，缓动固定为 `OutElastic`
    ///
    /// 只支持 `vec2` / `vec3` 属性，`punch` 类型需与属性一致。
    pub fn punch_with(
        &mut self,
        object: ObjectId,
        property: &str,
        punch: impl Into<Value>,
        duration: f32,
        options: TweenOptions,
    ) -> TweenResult<()> {
        let origin = self.read_vector(object, property)?;
        let punch: Value = punch.into();
        let punched = match (&origin, punch) {
            (Value::Vec2(a), Value::Vec2(b)) => Value::Vec2(*a + b),
            (Value::Vec3(a), Value::Vec3(b)) => Value::Vec3(*a + b),
            (_, other) => {
                return Err(TweenError::TypeMismatch {
                    property: property.to_string(),
                    expected: origin.kind(),
                    found: other.kind(),
                });
            }
        };

        self.animate_with(
            object,
            property,
            TweenTo::Path(vec![punched, origin]),
            duration,
            options.easing(Easing::OutElastic),
        )
    }

    /// 淡入淡出
    pub fn fade(
        &mut self,
        object: ObjectId,
        duration: f32,
        to_alpha: f32,
        easing: Easing,
    ) -> TweenResult<()> {
        self.fade_with(object, duration, to_alpha, TweenOptions::new().easing(easing))
    }

    /// 淡入淡出，附带缓动、完成回调等选项
    ///
    /// 优先查找 `color` 颜色属性，只改变其透明度；
    /// 否则使用数值属性 `alpha`。
    pub fn fade_with(
        &mut self,
        object: ObjectId,
        duration: f32,
        to_alpha: f32,
        options: TweenOptions,
    ) -> TweenResult<()> {

        if let Some(Value::Color(color)) = self.read_property(object, "color") {
            return self.animate_with(
                object,
                "color",
                color.with_alpha(to_alpha),
                duration,
                options,
            );
        }

        match self.read_property(object, "alpha") {
            Some(value) if value.kind().is_numeric() => {
                self.animate_with(object, "alpha", to_alpha, duration, options)
            }
            _ if !self.is_alive(object) => Err(TweenError::DeadTarget { object }),
            _ => Err(TweenError::UnresolvableProperty {
                object,
                property: "alpha".to_string(),
            }),
        }
    }

    /// 读取 vec2 / vec3 属性
    fn read_vector(&self, object: ObjectId, property: &str) -> TweenResult<Value> {
        if !self.is_alive(object) {
            return Err(TweenError::DeadTarget { object });
        }
        match self.read_property(object, property) {
            Some(value @ (Value::Vec2(_) | Value::Vec3(_))) => Ok(value),
            Some(other) => Err(TweenError::TypeMismatch {
                property: property.to_string(),
                expected: ValueKind::Vec3,
                found: other.kind(),
            }),
            None => Err(TweenError::UnresolvableProperty {
                object,
                property: property.to_string(),
            }),
        }
    }
}

/// 单位圆盘内的随机点
fn random_in_disk<R: Rng>(rng: &mut R) -> Vec2 {
    loop {
        let v = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
        if v.length_squared() <= 1.0 {
            return v;
        }
    }
}

/// 单位球内的随机点
fn random_in_ball<R: Rng>(rng: &mut R) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if v.length_squared() <= 1.0 {
            return v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::PropertyBag;
    use crate::types::Color;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter() -> (Rc<Cell<u32>>, TweenOptions) {
        let fired = Rc::new(Cell::new(0));
        let handle = fired.clone();
        let options = TweenOptions::new()
            .easing(Easing::Linear)
            .on_complete(move |_| handle.set(handle.get() + 1));
        (fired, options)
    }

    #[test]
    fn test_shake_returns_to_origin() {
        let mut tweener = Tweener::new();
        let bag = Rc::new(PropertyBag::new().with("position", Vec3::new(1.0, 2.0, 3.0)));
        let id = tweener.register(&bag);

        let shake = ShakeConfig {
            strength: 0.5,
            vibrato: 6,
        };
        let mut rng = StdRng::seed_from_u64(7);
        tweener
            .shake_with_rng(id, "position", 0.7, shake, TweenOptions::new(), &mut rng)
            .unwrap();

        let info = tweener.tween_info(id, "position").unwrap();
        assert_eq!(info.points, 8);
        assert_eq!(info.easing, Easing::OutQuad);
        assert_eq!(info.end, Value::Vec3(Vec3::new(1.0, 2.0, 3.0)));

        let mut max_offset: f32 = 0.0;
        for _ in 0..10 {
            tweener.tick(0.07);
            if let Some(Value::Vec3(v)) = bag.get("position") {
                max_offset = max_offset.max((v - Vec3::new(1.0, 2.0, 3.0)).length());
            }
        }
        assert!(max_offset <= 0.5 + 1e-4);
        tweener.tick(0.1);
        assert_eq!(
            bag.get("position"),
            Some(Value::Vec3(Vec3::new(1.0, 2.0, 3.0)))
        );
    }

    #[test]
    fn test_shake_rejects_scalar() {
        let mut tweener = Tweener::new();
        let bag = Rc::new(PropertyBag::new().with("x", 1.0f32));
        let id = tweener.register(&bag);
        let err = tweener.shake(id, "x", 0.5).unwrap_err();
        assert!(matches!(
            err,
            TweenError::TypeMismatch {
                found: ValueKind::Float,
                ..
            }
        ));
    }

    #[test]
    fn test_punch_path() {
        let mut tweener = Tweener::new();
        let bag = Rc::new(PropertyBag::new().with("scale", Vec2::ONE));
        let id = tweener.register(&bag);

        tweener.punch(id, "scale", Vec2::splat(0.5), 1.0).unwrap();
        let info = tweener.tween_info(id, "scale").unwrap();
        assert_eq!(info.points, 3);
        assert_eq!(info.easing, Easing::OutElastic);
        assert_eq!(info.end, Value::Vec2(Vec2::ONE));

        let err = tweener.punch(id, "scale", 1.0f32, 1.0).unwrap_err();
        assert!(matches!(err, TweenError::TypeMismatch { .. }));
    }

    #[test]
    fn test_fade_prefers_color() {
        let mut tweener = Tweener::new();
        let bag = Rc::new(
            PropertyBag::new()
                .with("color", Color::RED)
                .with("alpha", 1.0f32),
        );
        let id = tweener.register(&bag);

        tweener.fade(id, 0.5, 0.0, Easing::Linear).unwrap();
        assert!(tweener.is_tweening(id, Some("color")));
        assert!(!tweener.is_tweening(id, Some("alpha")));

        tweener.tick(0.5);
        assert_eq!(bag.get("color"), Some(Value::Color(Color::RED.with_alpha(0.0))));
    }

    #[test]
    fn test_fade_falls_back_to_alpha() {
        let mut tweener = Tweener::new();
        let bag = Rc::new(PropertyBag::new().with("alpha", 1.0f64));
        let id = tweener.register(&bag);

        tweener.fade(id, 0.5, 0.25, Easing::Linear).unwrap();
        tweener.tick(0.5);
        assert_eq!(bag.get("alpha"), Some(Value::Double(0.25)));

        let empty = Rc::new(PropertyBag::new());
        let id = tweener.register(&empty);
        assert_eq!(
            tweener.fade(id, 0.5, 0.0, Easing::Linear),
            Err(TweenError::UnresolvableProperty {
                object: id,
                property: "alpha".to_string(),
            })
        );
    }

    #[test]
    fn test_helpers_forward_completion_callback() {
        let mut tweener = Tweener::new();
        let bag = Rc::new(
            PropertyBag::new()
                .with("position", Vec3::ZERO)
                .with("scale", Vec2::ONE)
                .with("alpha", 1.0f32),
        );
        let id = tweener.register(&bag);

        let (shaken, options) = counter();
        tweener.shake_with(id, "position", 0.5, options).unwrap();
        let (punched, options) = counter();
        tweener
            .punch_with(id, "scale", Vec2::splat(0.2), 0.5, options)
            .unwrap();
        let (faded, options) = counter();
        tweener.fade_with(id, 0.5, 0.0, options).unwrap();

        // 固定缓动覆盖调用方给的缓动
        assert_eq!(
            tweener.tween_info(id, "position").unwrap().easing,
            Easing::OutQuad
        );
        assert_eq!(
            tweener.tween_info(id, "scale").unwrap().easing,
            Easing::OutElastic
        );
        assert_eq!(tweener.tween_info(id, "alpha").unwrap().easing, Easing::Linear);

        tweener.tick(0.25);
        assert_eq!((shaken.get(), punched.get(), faded.get()), (0, 0, 0));
        tweener.tick(0.25);
        assert_eq!((shaken.get(), punched.get(), faded.get()), (1, 1, 1));
        assert_eq!(bag.get("position"), Some(Value::Vec3(Vec3::ZERO)));
        assert_eq!(bag.get("scale"), Some(Value::Vec2(Vec2::ONE)));
        assert_eq!(bag.get("alpha"), Some(Value::Float(0.0)));
    }
}
