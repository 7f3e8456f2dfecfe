//! # 播放模式集成测试
//!
//! 通过注册表驱动六种播放模式与途经点路径，检查写入目标的值序列。

use std::rc::Rc;

use anima_tween::{
    ConductorState, Direction, EndState, Easing, ObjectId, Playback, PropertyBag, TweenEvent,
    TweenKey, TweenOptions, TweenTo, Tweener, Value,
};

/// 创建只有一个 float 属性 `x` 的目标
fn setup(x: f32) -> (Tweener, Rc<PropertyBag>, ObjectId) {
    let mut tweener = Tweener::new();
    let bag = Rc::new(PropertyBag::new().with("x", x));
    let id = tweener.register(&bag);
    (tweener, bag, id)
}

fn x(bag: &PropertyBag) -> f32 {
    match bag.get("x") {
        Some(Value::Float(v)) => v,
        other => panic!("x 不是 float: {other:?}"),
    }
}

/// 按固定步长推进若干帧，记录每帧后的值
fn record(tweener: &mut Tweener, bag: &PropertyBag, dt: f32, frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|_| {
            tweener.tick(dt);
            x(bag)
        })
        .collect()
}

/// 测试反向播放：从终点附近开始，精确停在起点
#[test]
fn test_backward_ends_at_start() {
    let (mut tweener, bag, id) = setup(0.0);
    tweener
        .animate_with(
            id,
            "x",
            100.0f32,
            1.0,
            TweenOptions::new()
                .easing(Easing::OutCubic)
                .playback(Playback::Backward),
        )
        .unwrap();

    let values = record(&mut tweener, &bag, 0.125, 8);
    assert!(values[0] > 50.0);
    assert!(values.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(*values.last().unwrap(), 0.0);
    assert_eq!(tweener.active_count(), 0);
}

/// 测试往返：后半程是前半程的镜像
#[test]
fn test_ping_pong_mirrors_forward_pass() {
    let (mut tweener, bag, id) = setup(0.0);
    tweener
        .animate_with(
            id,
            "x",
            100.0f32,
            1.0,
            TweenOptions::new()
                .easing(Easing::InOutSine)
                .playback(Playback::PingPong),
        )
        .unwrap();

    // 第 k 帧对应 t = (k + 1) / 8，镜像时刻 2 - t 对应第 14 - k 帧
    let values = record(&mut tweener, &bag, 0.125, 16);
    assert_eq!(values[7], 100.0);
    for k in 0..7 {
        assert_eq!(values[k], values[14 - k], "frame {k}");
    }
    assert_eq!(values[15], 0.0);
    assert!(!tweener.is_tweening(id, None));
}

/// 测试往返的中间状态
#[test]
fn test_ping_pong_direction() {
    let (mut tweener, _bag, id) = setup(0.0);
    tweener
        .animate_with(
            id,
            "x",
            1.0f32,
            1.0,
            TweenOptions::new().playback(Playback::PingPong),
        )
        .unwrap();

    let info = tweener.tween_info(id, "x").unwrap();
    assert_eq!(info.state, ConductorState::Idle);
    assert_eq!(info.direction, Direction::Forward);

    tweener.tick(1.25);
    let info = tweener.tween_info(id, "x").unwrap();
    assert_eq!(info.state, ConductorState::Running);
    assert_eq!(info.direction, Direction::Backward);
}

/// 测试循环模式只能从外部结束
#[test]
fn test_loop_forward_runs_until_completed() {
    let (mut tweener, bag, id) = setup(0.0);
    tweener
        .animate_with(
            id,
            "x",
            1.0f32,
            0.5,
            TweenOptions::new().playback(Playback::LoopForward),
        )
        .unwrap();

    let values = record(&mut tweener, &bag, 0.25, 10);
    assert_eq!(values[0], 0.5);
    assert_eq!(values[1], 1.0);
    // 每轮重新从起点开始
    assert_eq!(values[2], 0.5);
    assert!(tweener.is_tweening(id, Some("x")));
    assert_eq!(tweener.tween_info(id, "x").unwrap().loops, 5);

    assert_eq!(tweener.complete(id, Some("x"), true, EndState::End), 1);
    assert_eq!(x(&bag), 1.0);
    assert_eq!(tweener.active_count(), 0);
}

#[test]
fn test_loop_backward_and_ping_pong_never_complete() {
    for playback in [Playback::LoopBackward, Playback::LoopPingPong] {
        let (mut tweener, bag, id) = setup(2.0);
        tweener
            .animate_with(
                id,
                "x",
                4.0f32,
                0.3,
                TweenOptions::new().playback(playback),
            )
            .unwrap();

        let events: Vec<TweenEvent> = (0..50).flat_map(|_| tweener.tick(0.07)).collect();
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, TweenEvent::Completed(_))),
            "{playback:?}"
        );
        assert!(tweener.is_tweening(id, Some("x")));

        tweener.cancel(id, None);
        assert_eq!(x(&bag), 2.0);
    }
}

/// 测试途经点：[10, -5, 5]，1.2 秒，每段 0.4 秒
#[test]
fn test_waypoints_pass_through_each_point() {
    let (mut tweener, bag, id) = setup(0.0);
    tweener
        .animate(id, "x", TweenTo::path([10.0f32, -5.0, 5.0]), 1.2)
        .unwrap();
    assert_eq!(tweener.tween_info(id, "x").unwrap().points, 4);

    let values = record(&mut tweener, &bag, 0.05, 25);

    let near = |target: f32| values.iter().position(|v| (v - target).abs() < 1e-3);
    let at_ten = near(10.0).expect("未经过 10");
    let at_minus_five = near(-5.0).expect("未经过 -5");
    assert!(at_ten < at_minus_five);
    assert_eq!(*values.last().unwrap(), 5.0);

    // 每段中点附近
    assert!((values[3] - 5.0).abs() < 0.1);
    assert!((values[11] - 2.5).abs() < 0.1);
}

/// 测试超调缓动：值可以越过终点，最后仍精确停在终点
#[test]
fn test_overshoot_easing_converges() {
    let (mut tweener, bag, id) = setup(0.0);
    tweener
        .animate_with(
            id,
            "x",
            1.0f32,
            1.0,
            TweenOptions::new().easing(Easing::OutBack),
        )
        .unwrap();

    let values = record(&mut tweener, &bag, 0.1, 10);
    assert!(values.iter().any(|v| *v > 1.0));
    assert_eq!(*values.last().unwrap(), 1.0);
}

/// 测试零时长：第一帧即完成
#[test]
fn test_zero_duration_completes_on_first_tick() {
    let (mut tweener, bag, id) = setup(0.0);
    tweener.animate(id, "x", 3.0f32, 0.0).unwrap();
    let events = tweener.tick(0.0);
    assert_eq!(
        events,
        vec![
            TweenEvent::Started(TweenKey::property(id, "x")),
            TweenEvent::Completed(TweenKey::property(id, "x")),
        ]
    );
    assert_eq!(x(&bag), 3.0);
}

/// 测试配置中的默认缓动与播放模式
#[test]
fn test_config_defaults_apply() {
    let config = anima_tween::TweenerConfig {
        default_easing: Easing::InQuad,
        default_playback: Playback::PingPong,
        ..Default::default()
    };
    let mut tweener = Tweener::with_config(config);
    let bag = Rc::new(PropertyBag::new().with("x", 0.0f32));
    let id = tweener.register(&bag);

    tweener.animate(id, "x", 1.0f32, 1.0).unwrap();
    let info = tweener.tween_info(id, "x").unwrap();
    assert_eq!(info.easing, Easing::InQuad);
    assert_eq!(info.playback, Playback::PingPong);

    tweener.tick(0.5);
    assert_eq!(x(&bag), 0.25);
}
