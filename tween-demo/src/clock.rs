//! # Clock 模块
//!
//! 固定步长的时间源。

use anyhow::bail;

/// 固定步长时钟
#[derive(Debug, Clone)]
pub struct FixedClock {
    step: f32,
    frame: u64,
}

impl FixedClock {
    /// 创建时钟（`fps` 必须大于 0）
    pub fn new(fps: u32) -> anyhow::Result<Self> {
        if fps == 0 {
            bail!("fps 必须大于 0");
        }
        Ok(Self {
            step: 1.0 / fps as f32,
            frame: 0,
        })
    }

    /// 每帧的时间增量
    pub fn step(&self) -> f32 {
        self.step
    }

    /// 推进一帧，返回本帧的时间增量
    pub fn advance(&mut self) -> f32 {
        self.frame += 1;
        self.step
    }

    /// 已推进的帧数
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// 已经过的模拟时间（秒）
    pub fn elapsed(&self) -> f64 {
        self.frame as f64 * self.step as f64
    }
}
