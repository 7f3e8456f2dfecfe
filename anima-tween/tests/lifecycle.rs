//! # 生命周期集成测试
//!
//! 目标失效时的回收、回调链，以及自定义解析策略的接入。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anima_tween::glam::Vec2;
use anima_tween::{
    Animatable, Color, EndState, ObjectId, PropertyAccessor, PropertyBag, ResolveStrategy,
    TargetRef, TweenEvent, TweenKey, TweenOptions, Tweener, Value, ValueKind,
};

/// 测试释放目标后补间被静默回收
#[test]
fn test_dropped_target_is_reaped_without_callback() {
    let mut tweener = Tweener::new();
    let bag = Rc::new(PropertyBag::new().with("x", 0.0f32));
    let id = tweener.register(&bag);

    let called = Rc::new(Cell::new(false));
    let flag = called.clone();
    tweener
        .animate_with(
            id,
            "x",
            1.0f32,
            1.0,
            TweenOptions::new().on_complete(move |_: &mut Tweener| flag.set(true)),
        )
        .unwrap();
    tweener.after(id, 0.5, |_| {}, false).unwrap();
    tweener.tick(0.25);

    // 1. 释放唯一的强引用
    drop(bag);
    assert!(!tweener.is_alive(id));

    // 2. 下一帧回收全部条目
    let events = tweener.tick(0.25);
    assert_eq!(
        events,
        vec![
            TweenEvent::Reaped(TweenKey::property(id, "x")),
            TweenEvent::Reaped(TweenKey::timer(id, 0)),
        ]
    );
    assert_eq!(tweener.active_count(), 0);
    assert_eq!(tweener.timer_count(), 0);
    assert_eq!(tweener.registered_count(), 0);

    // 3. 回调从未执行
    tweener.tick(5.0);
    assert!(!called.get());
}

/// 测试宿主主动销毁的对象
#[test]
fn test_destroyed_target_stops_receiving_writes() {
    let mut tweener = Tweener::new();
    let bag = Rc::new(PropertyBag::new().with("x", 0.0f32));
    let id = tweener.register(&bag);
    tweener.animate(id, "x", 1.0f32, 1.0).unwrap();
    tweener.tick(0.5);
    let before = bag.get("x");

    bag.destroy();
    assert_eq!(tweener.complete(id, None, true, EndState::End), 0);
    assert_eq!(bag.get("x"), before);
    assert_eq!(tweener.active_count(), 0);
}

/// 测试目标在帧内被先前的回调销毁：条目被回收，既不完成也不触发回调
#[test]
fn test_target_destroyed_mid_tick_is_reaped() {
    let mut tweener = Tweener::new();
    let a = Rc::new(PropertyBag::new().with("x", 0.0f32));
    let b = Rc::new(PropertyBag::new().with("x", 0.0f32));
    let a_id = tweener.register(&a);
    let b_id = tweener.register(&b);

    let victim = b.clone();
    tweener
        .animate_with(
            a_id,
            "x",
            1.0f32,
            0.1,
            TweenOptions::new().on_complete(move |_: &mut Tweener| victim.destroy()),
        )
        .unwrap();

    let fired = Rc::new(Cell::new(0));
    let tween_flag = fired.clone();
    tweener
        .animate_with(
            b_id,
            "x",
            1.0f32,
            0.1,
            TweenOptions::new()
                .on_complete(move |_: &mut Tweener| tween_flag.set(tween_flag.get() + 1)),
        )
        .unwrap();
    let timer_flag = fired.clone();
    tweener
        .after(b_id, 0.1, move |_| timer_flag.set(timer_flag.get() + 1), false)
        .unwrap();
    tweener.drain_events();

    let events = tweener.tick(0.1);
    assert_eq!(
        events,
        vec![
            TweenEvent::Completed(TweenKey::property(a_id, "x")),
            TweenEvent::Reaped(TweenKey::property(b_id, "x")),
            TweenEvent::Reaped(TweenKey::timer(b_id, 0)),
        ]
    );
    assert_eq!(fired.get(), 0);
    assert_eq!(a.get("x"), Some(Value::Float(1.0)));
    assert_eq!(b.get("x"), Some(Value::Float(0.0)));
    assert_eq!(tweener.active_count(), 0);
    assert_eq!(tweener.timer_count(), 0);
    assert_eq!(tweener.registered_count(), 1);
}

/// 测试 complete_all 跨目标且按创建顺序执行回调
#[test]
fn test_complete_all_in_creation_order() {
    let mut tweener = Tweener::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut bags = Vec::new();

    for name in ["first", "second", "third"] {
        let bag = Rc::new(PropertyBag::new().with("x", 0.0f32));
        let id = tweener.register(&bag);
        let log = log.clone();
        tweener
            .animate_with(
                id,
                "x",
                1.0f32,
                1.0,
                TweenOptions::new().on_complete(move |_: &mut Tweener| {
                    log.borrow_mut().push(name);
                }),
            )
            .unwrap();
        bags.push(bag);
    }

    assert_eq!(tweener.complete_all(true, EndState::End), 3);
    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    for bag in &bags {
        assert_eq!(bag.get("x"), Some(Value::Float(1.0)));
    }
}

/// 测试回调链：三段颜色依次播放
#[test]
fn test_callback_chain() {
    let mut tweener = Tweener::new();
    let bag = Rc::new(PropertyBag::new().with("color", Color::WHITE));
    let id = tweener.register(&bag);

    static COLORS: [Color; 3] = [Color::RED, Color::GREEN, Color::BLUE];

    /// 播放第一段，完成后在回调里播放剩余部分
    fn chain(tweener: &mut Tweener, id: ObjectId, colors: &'static [Color]) {
        let Some((first, rest)) = colors.split_first() else {
            return;
        };
        tweener
            .animate_with(
                id,
                "color",
                *first,
                0.5,
                TweenOptions::new().on_complete(move |t: &mut Tweener| chain(t, id, rest)),
            )
            .unwrap();
    }
    chain(&mut tweener, id, &COLORS);

    let mut reached = Vec::new();
    for _ in 0..6 {
        tweener.tick(0.5);
        if let Some(Value::Color(color)) = bag.get("color") {
            reached.push(color);
        }
        if tweener.active_count() == 0 {
            break;
        }
    }
    assert_eq!(reached, COLORS.to_vec());
}

/// 以 `fx_` 为前缀的虚拟属性
struct PrefixStrategy;

impl ResolveStrategy for PrefixStrategy {
    fn name(&self) -> &str {
        "prefix"
    }

    fn resolve(&self, target: &TargetRef, property: &str) -> Option<PropertyAccessor> {
        let field = property.strip_prefix("fx_")?.to_string();
        let read = target.clone();
        let write = target.clone();
        let write_field = field.clone();
        Some(PropertyAccessor::new(
            ValueKind::Vec2,
            move || read.upgrade()?.get_property(&field),
            move |value| {
                write
                    .upgrade()
                    .is_some_and(|object| object.set_property(&write_field, value))
            },
        ))
    }
}

/// 测试自定义解析策略
#[test]
fn test_custom_strategy() {
    let mut tweener = Tweener::new();
    tweener.resolver_mut().add_strategy(PrefixStrategy);
    let bag = Rc::new(PropertyBag::new().with("offset", Vec2::ZERO));
    let id = tweener.register(&bag);

    tweener.animate(id, "fx_offset", Vec2::new(2.0, 4.0), 1.0).unwrap();
    tweener.tick(0.5);
    assert_eq!(bag.get("offset"), Some(Value::Vec2(Vec2::new(1.0, 2.0))));
}

/// 只实现 Animatable 的宿主类型
struct Label {
    text: RefCell<String>,
}

impl Animatable for Label {
    fn get_property(&self, name: &str) -> Option<Value> {
        (name == "text").then(|| Value::Text(self.text.borrow().clone()))
    }

    fn set_property(&self, name: &str, value: Value) -> bool {
        match (name, value) {
            ("text", Value::Text(text)) => {
                *self.text.borrow_mut() = text;
                true
            }
            _ => false,
        }
    }
}

/// 测试注销后对象的补间被静默移除
#[test]
fn test_unregister_removes_entries() {
    let mut tweener = Tweener::new();
    let label = Rc::new(Label {
        text: RefCell::new("a".to_string()),
    });
    let id = tweener.register(&label);
    tweener.animate(id, "text", "abc", 1.0).unwrap();
    tweener.drain_events();

    assert!(tweener.unregister(id));
    assert!(!tweener.unregister(id));
    assert_eq!(tweener.active_count(), 0);
    assert!(tweener.tick(1.0).is_empty());
    assert_eq!(*label.text.borrow(), "a");

    // 重新注册得到新的 ID
    let again = tweener.register(&label);
    assert_ne!(again, id);
}
