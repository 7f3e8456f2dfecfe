//! # Bench 模块
//!
//! 压力测试：先测量空载帧率，再让全部对象同时做往返补间，对比两者。

use std::rc::Rc;
use std::time::{Duration, Instant};

use anima_tween::glam::Vec3;
use anima_tween::{Easing, Playback, PropertyBag, TweenOptions, Tweener};
use rand::Rng;
use tracing::{debug, info};

use crate::clock::FixedClock;

/// 压力测试参数
#[derive(Debug, Clone)]
pub struct BenchOptions {
    pub objects: usize,
    pub duration: f32,
    pub frames: u32,
    pub fps: u32,
}

/// 压力测试结果
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub objects: usize,
    pub frames: u32,
    pub baseline: Duration,
    pub loaded: Duration,
    /// 测量结束时仍在运行的补间数
    pub active_at_end: usize,
}

impl BenchReport {
    /// 空载每秒帧数
    pub fn baseline_tps(&self) -> f64 {
        ticks_per_second(self.frames, self.baseline)
    }

    /// 满载每秒帧数
    pub fn loaded_tps(&self) -> f64 {
        ticks_per_second(self.frames, self.loaded)
    }

    /// 单个补间每帧的平均耗时（纳秒）
    pub fn nanos_per_tween(&self) -> f64 {
        if self.objects == 0 || self.frames == 0 {
            return 0.0;
        }
        let extra = self.loaded.saturating_sub(self.baseline);
        extra.as_nanos() as f64 / (self.objects as f64 * self.frames as f64)
    }

    pub fn print(&self) {
        println!("─────────────────────────────────────────────────────");
        println!("对象数:       {}", self.objects);
        println!("帧数:         {}", self.frames);
        println!("空载:         {:.0} 帧/秒", self.baseline_tps());
        println!("满载:         {:.0} 帧/秒", self.loaded_tps());
        println!("单补间耗时:   {:.1} ns/帧", self.nanos_per_tween());
        println!("结束时补间数: {}", self.active_at_end);
    }
}

fn ticks_per_second(frames: u32, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        frames as f64 / secs
    } else {
        f64::INFINITY
    }
}

/// 运行压力测试
pub fn run(tweener: &mut Tweener, options: &BenchOptions) -> anyhow::Result<BenchReport> {
    let mut rng = rand::thread_rng();

    info!(objects = options.objects, "创建测试对象");
    let objects: Vec<Rc<PropertyBag>> = (0..options.objects)
        .map(|_| {
            let position = Vec3::new(
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(0.0..20.0),
            );
            Rc::new(PropertyBag::new().with("position", position))
        })
        .collect();
    let ids: Vec<_> = objects.iter().map(|o| tweener.register(o)).collect();

    info!(frames = options.frames, "测量空载帧率");
    let baseline = measure(tweener, options)?;

    info!("启动全部补间并测量满载帧率");
    for (object, id) in objects.iter().zip(&ids) {
        let Some(anima_tween::Value::Vec3(position)) = object.get("position") else {
            continue;
        };
        let offset = Vec3::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), 0.0);
        tweener.animate_with(
            *id,
            "position",
            position + offset,
            options.duration,
            TweenOptions::new()
                .easing(Easing::InOutSine)
                .playback(Playback::PingPong),
        )?;
    }
    tweener.drain_events();
    let loaded = measure(tweener, options)?;
    let active_at_end = tweener.active_count();

    // 清理
    for id in &ids {
        tweener.cancel(*id, None);
        tweener.unregister(*id);
    }
    debug!(remaining = tweener.registered_count(), "测试对象已清理");

    Ok(BenchReport {
        objects: options.objects,
        frames: options.frames,
        baseline,
        loaded,
        active_at_end,
    })
}

/// 以固定步长推进 `frames` 帧并计时
fn measure(tweener: &mut Tweener, options: &BenchOptions) -> anyhow::Result<Duration> {
    let mut clock = FixedClock::new(options.fps)?;
    let start = Instant::now();
    for _ in 0..options.frames {
        let events = tweener.tick(clock.advance());
        std::hint::black_box(events);
    }
    Ok(start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bench_small_run() {
        let mut tweener = Tweener::new();
        let options = BenchOptions {
            objects: 8,
            duration: 0.5,
            frames: 10,
            fps: 60,
        };
        let report = run(&mut tweener, &options).unwrap();
        assert_eq!(report.objects, 8);
        // 10 帧不足以走完 0.5 秒的往返
        assert_eq!(report.active_at_end, 8);
        assert_eq!(tweener.active_count(), 0);
        assert_eq!(tweener.registered_count(), 0);
    }
}
