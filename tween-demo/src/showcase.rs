//! # Showcase 场景
//!
//! 一段由回调串联的演出：
//!
//! 1. 标题淡入，立方体开始无限旋转
//! 2. 副标题与色块淡入；3 秒后标题淡出，副标题逐字补全
//! 3. 色块经过 红 → 白 → 绿 → 蓝 → 黄 的颜色链，立方体同时变色
//! 4. 音量与音高变化，文本被擦除后重写
//! 5. 重复定时器给立方体施加随机抖动，立方体沿途经点回到原位
//! 6. 停止旋转与定时器，音量淡出

use std::cell::Cell;
use std::rc::Rc;

use anima_tween::glam::{Vec2, Vec3};
use anima_tween::{
    Color, EndState, Easing, ObjectId, Playback, PropertyBag, TweenEvent, TweenOptions,
    TweenResult, TweenTo, Tweener, Value,
};
use tracing::{debug, info, warn};

use crate::clock::FixedClock;

/// 场景最长运行时间（秒）
const MAX_SCENE_SECONDS: f64 = 120.0;

/// 场景中的对象
struct Actors {
    /// 持有定时器的导演对象（只需保持存活）
    _director: Rc<PropertyBag>,
    title: Rc<PropertyBag>,
    subtitle: Rc<PropertyBag>,
    panel: Rc<PropertyBag>,
    cube: Rc<PropertyBag>,
    music: Rc<PropertyBag>,
    ids: Ids,
}

#[derive(Debug, Clone, Copy)]
struct Ids {
    director: ObjectId,
    title: ObjectId,
    subtitle: ObjectId,
    panel: ObjectId,
    cube: ObjectId,
    music: ObjectId,
}

type Scene = Rc<Actors>;

/// 把一个场景步骤包装成完成回调
fn then(
    scene: &Scene,
    step: fn(&mut Tweener, &Scene) -> TweenResult<()>,
) -> impl FnMut(&mut Tweener) + 'static {
    let scene = scene.clone();
    move |tweener: &mut Tweener| {
        if let Err(e) = step(tweener, &scene) {
            warn!(error = %e, "场景步骤失败");
        }
    }
}

fn transparent(color: Color) -> Color {
    color.with_alpha(0.0)
}

/// 运行演示场景
pub fn run(tweener: &mut Tweener, fps: u32) -> anyhow::Result<()> {
    let scene = build(tweener);
    opening(tweener, &scene)?;

    let mut clock = FixedClock::new(fps)?;
    let report_every = u64::from(fps.max(1)) / 2;
    loop {
        let events = tweener.tick(clock.advance());
        for event in &events {
            match event {
                TweenEvent::Completed(key) => debug!(key = %key, "完成"),
                TweenEvent::TimerFired { object, id } => {
                    debug!(object = %object, id, "定时器触发")
                }
                _ => {}
            }
        }

        if report_every > 0 && clock.frame() % report_every == 0 {
            print_frame(&scene, clock.elapsed());
        }

        if tweener.active_count() == 0 && tweener.timer_count() == 0 {
            break;
        }
        if clock.elapsed() > MAX_SCENE_SECONDS {
            warn!(elapsed = clock.elapsed(), "场景超时，强制结束");
            tweener.complete_all(false, EndState::End);
            break;
        }
    }

    print_frame(&scene, clock.elapsed());
    info!(frames = clock.frame(), seconds = clock.elapsed(), "场景结束");
    Ok(())
}

fn build(tweener: &mut Tweener) -> Scene {
    let director = Rc::new(PropertyBag::new());
    let title = Rc::new(
        PropertyBag::new()
            .with("text", "")
            .with("color", transparent(Color::WHITE)),
    );
    let subtitle = Rc::new(
        PropertyBag::new()
            .with("text", "")
            .with("color", transparent(Color::WHITE)),
    );
    let panel = Rc::new(PropertyBag::new().with("color", transparent(Color::RED)));
    let cube = Rc::new(
        PropertyBag::new()
            .with("position", Vec3::new(0.0, 0.0, -4.0))
            .with("euler_angles", Vec3::ZERO)
            .with("scale", Vec3::ONE)
            .with("offset", Vec2::ZERO)
            .with("color", Color::rgb(0.6, 0.6, 0.6)),
    );
    let music = Rc::new(
        PropertyBag::new()
            .with("volume", 0.0f32)
            .with("pitch", 1.0f32),
    );

    let ids = Ids {
        director: tweener.register(&director),
        title: tweener.register(&title),
        subtitle: tweener.register(&subtitle),
        panel: tweener.register(&panel),
        cube: tweener.register(&cube),
        music: tweener.register(&music),
    };

    Rc::new(Actors {
        _director: director,
        title,
        subtitle,
        panel,
        cube,
        music,
        ids,
    })
}

/// 1. 标题淡入，立方体开始旋转
fn opening(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    let ids = scene.ids;
    scene.title.insert("text", "This is AnimaTween");
    tweener.animate_with(
        ids.title,
        "color",
        Color::WHITE,
        2.0,
        TweenOptions::new().on_complete(then(scene, reveal_subtitle)),
    )?;
    spin_cube(tweener, scene)
}

fn spin_cube(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    let Some(Value::Vec3(angles)) = scene.cube.get("euler_angles") else {
        return Ok(());
    };
    tweener.animate_with(
        scene.ids.cube,
        "euler_angles",
        angles + Vec3::new(0.0, 360.0, 0.0),
        5.0,
        TweenOptions::new()
            .easing(Easing::Linear)
            .playback(Playback::LoopForward),
    )
}

/// 2. 副标题与色块淡入
fn reveal_subtitle(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    let ids = scene.ids;
    scene.subtitle.insert("text", "Tweens control data");
    tweener.animate(ids.subtitle, "color", Color::WHITE, 2.0)?;
    tweener.animate_with(
        ids.panel,
        "color",
        Color::RED,
        2.0,
        TweenOptions::new().from(transparent(Color::RED)),
    )?;

    tweener.after(
        ids.director,
        3.0,
        then(scene, complete_subtitle),
        false,
    )?;
    Ok(())
}

/// 标题淡出，副标题逐字补全；补全到一半时开始颜色链
fn complete_subtitle(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    let ids = scene.ids;
    let title = scene.title.clone();
    tweener.animate_with(
        ids.title,
        "color",
        transparent(Color::WHITE),
        2.5,
        TweenOptions::new().on_complete(move |_: &mut Tweener| title.insert("text", "")),
    )?;

    let duration = 3.0;
    tweener.animate_with(
        ids.subtitle,
        "text",
        "Tweens control data and data controls your game...",
        duration,
        TweenOptions::new().easing(Easing::Linear),
    )?;
    tweener.after(ids.director, duration / 2.0, then(scene, start_music), false)?;
    Ok(())
}

/// 3. 音乐淡入，色块开始颜色链
fn start_music(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    tweener.animate(scene.ids.music, "volume", 0.8f32, 2.0)?;
    panel_to_white(tweener, scene)
}

fn panel_to_white(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    tweener.animate_with(
        scene.ids.panel,
        "color",
        Color::WHITE,
        1.5,
        TweenOptions::new()
            .easing(Easing::InOutSine)
            .on_complete(then(scene, panel_to_green)),
    )
}

fn panel_to_green(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    cube_color_chain(tweener, scene)?;
    tweener.animate_with(
        scene.ids.panel,
        "color",
        Color::GREEN,
        1.5,
        TweenOptions::new()
            .easing(Easing::InOutSine)
            .on_complete(then(scene, panel_to_blue)),
    )
}

fn panel_to_blue(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    tweener.animate_with(
        scene.ids.panel,
        "color",
        Color::BLUE,
        1.5,
        TweenOptions::new()
            .easing(Easing::InOutSine)
            .on_complete(then(scene, panel_to_yellow)),
    )
}

/// 立方体颜色链：白 → 绿 → 蓝 → 黄 → 原色
fn cube_color_chain(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    let original = match scene.cube.get("color") {
        Some(Value::Color(color)) => color,
        _ => Color::WHITE,
    };
    let steps = vec![
        (Color::WHITE, 1.0),
        (Color::GREEN, 1.0),
        (Color::BLUE, 1.0),
        (Color::rgb(1.0, 0.92, 0.016), 1.5),
        (original, 1.0),
    ];
    play_color_steps(tweener, scene.ids.cube, steps.into_iter().rev().collect())
}

/// 依次播放颜色（`steps` 逆序存放，末尾先播）
fn play_color_steps(
    tweener: &mut Tweener,
    object: ObjectId,
    mut steps: Vec<(Color, f32)>,
) -> TweenResult<()> {
    let Some((color, duration)) = steps.pop() else {
        return Ok(());
    };
    let mut rest = Some(steps);
    tweener.animate_with(
        object,
        "color",
        color,
        duration,
        TweenOptions::new().on_complete(move |t: &mut Tweener| {
            if let Some(rest) = rest.take() {
                // 失败已由 animate_with 记录
                let _ = play_color_steps(t, object, rest);
            }
        }),
    )
}

fn panel_to_yellow(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    tweener.animate_with(
        scene.ids.panel,
        "color",
        Color::rgb(1.0, 0.92, 0.016),
        1.5,
        TweenOptions::new()
            .easing(Easing::InOutSine)
            .on_complete(then(scene, audio_section)),
    )
}

/// 4. 色块与副标题淡出，标题重写
fn audio_section(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    let ids = scene.ids;
    tweener.fade(ids.panel, 1.5, 0.0, Easing::Linear)?;
    tweener.fade(ids.subtitle, 1.5, 0.0, Easing::Linear)?;
    tweener.fade(ids.title, 0.1, 1.0, Easing::Linear)?;
    tweener.animate_with(
        ids.title,
        "text",
        "Tweens can also control audio",
        2.5,
        TweenOptions::new().easing(Easing::Linear),
    )?;
    tweener.after(ids.director, 1.5, then(scene, musical_change), false)?;
    Ok(())
}

fn musical_change(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    tweener.animate_with(
        scene.ids.music,
        "pitch",
        1.2f32,
        3.0,
        TweenOptions::new()
            .easing(Easing::OutInElastic)
            .from(0.8f64)
            .on_complete(then(scene, settle_music)),
    )
}

fn settle_music(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    let ids = scene.ids;
    tweener.animate(ids.music, "pitch", 1.0f32, 0.5)?;
    tweener.animate_with(
        ids.music,
        "volume",
        0.6f32,
        1.0,
        TweenOptions::new().on_complete(then(scene, rewrite_texts)),
    )
}

/// 擦除标题，副标题重写
fn rewrite_texts(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    let ids = scene.ids;
    tweener.animate_with(
        ids.title,
        "text",
        "",
        2.0,
        TweenOptions::new().easing(Easing::Linear),
    )?;

    scene.subtitle.insert("text", "");
    tweener.fade(ids.subtitle, 0.1, 1.0, Easing::Linear)?;
    tweener.animate_with(
        ids.subtitle,
        "text",
        "Tweens can also control physics",
        2.5,
        TweenOptions::new()
            .easing(Easing::Linear)
            .on_complete(then(scene, physics_section)),
    )
}

/// 5. 停止旋转，重复定时器施加抖动，立方体变形
fn physics_section(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    let ids = scene.ids;
    tweener.complete(ids.cube, Some("euler_angles"), false, EndState::End);

    let kicks = Rc::new(Cell::new(0u32));
    let counter = kicks.clone();
    let cube = ids.cube;
    tweener.after(
        ids.director,
        0.1,
        move |t: &mut Tweener| {
            counter.set(counter.get() + 1);
            let _ = t.punch(cube, "offset", Vec2::new(0.05, 0.05), 0.1);
        },
        true,
    )?;

    tweener.animate_with(
        ids.cube,
        "scale",
        Vec3::new(0.5, 1.5, 0.8),
        2.0,
        TweenOptions::new()
            .easing(Easing::InOutSine)
            .on_complete(then(scene, cube_path)),
    )?;

    tweener.animate_with(
        ids.title,
        "text",
        "Control Tweens...",
        2.0,
        TweenOptions::new().easing(Easing::Linear),
    )?;

    let scene_for_finale = scene.clone();
    tweener.after(
        ids.director,
        3.0,
        move |t: &mut Tweener| {
            debug!(kicks = kicks.get(), "抖动次数");
            if let Err(e) = finale(t, &scene_for_finale) {
                warn!(error = %e, "场景步骤失败");
            }
        },
        false,
    )?;
    Ok(())
}

/// 立方体复原并沿途经点回到原位
fn cube_path(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    let ids = scene.ids;
    tweener.animate(ids.cube, "scale", Vec3::ONE, 0.5)?;

    let origin = match scene.cube.get("position") {
        Some(Value::Vec3(position)) => position,
        _ => Vec3::ZERO,
    };
    tweener.animate_with(
        ids.cube,
        "position",
        TweenTo::path([
            Vec3::new(-2.0, 2.0, -4.0),
            Vec3::new(2.0, 2.0, -4.0),
            Vec3::new(2.0, -2.0, -4.0),
            Vec3::new(-2.0, -2.0, -4.0),
            origin,
        ]),
        4.0,
        TweenOptions::new()
            .easing(Easing::InOutSine)
            .on_complete(then(scene, stop_spin)),
    )?;
    spin_cube(tweener, scene)
}

fn stop_spin(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    tweener.stop(scene.ids.cube, Some("euler_angles"));
    Ok(())
}

/// 6. 最后的文本，停止定时器，音量淡出
fn finale(tweener: &mut Tweener, scene: &Scene) -> TweenResult<()> {
    let ids = scene.ids;
    tweener.fade(ids.subtitle, 1.0, 0.0, Easing::Linear)?;
    tweener.animate_with(
        ids.title,
        "text",
        "Control Tweens... Control the GAME!",
        2.0,
        TweenOptions::new().easing(Easing::Linear),
    )?;
    tweener.complete_timer(ids.director, None, false);

    tweener.animate(ids.music, "volume", 0.0f32, 4.0)?;
    Ok(())
}

fn text_of(bag: &PropertyBag) -> String {
    match bag.get("text") {
        Some(Value::Text(text)) => text,
        _ => String::new(),
    }
}

fn print_frame(scene: &Scene, elapsed: f64) {
    let panel = match scene.panel.get("color") {
        Some(Value::Color(c)) => format!("({:.2}, {:.2}, {:.2}, {:.2})", c.r, c.g, c.b, c.a),
        _ => "-".to_string(),
    };
    let position = match scene.cube.get("position") {
        Some(Value::Vec3(p)) => format!("({:.2}, {:.2}, {:.2})", p.x, p.y, p.z),
        _ => "-".to_string(),
    };
    let volume = scene
        .music
        .get("volume")
        .and_then(|v| v.as_f64())
        .unwrap_or_default();

    println!(
        "[{elapsed:6.2}s] title={:?} subtitle={:?} panel={panel} cube={position} volume={volume:.2}",
        text_of(&scene.title),
        text_of(&scene.subtitle),
    );
}
