//! # Conductor 模块
//!
//! 播放状态机：把每帧的时间增量换算为路径位置。
//!
//! 一个"趟"（pass）把线性进度从 0 推进到 1。播放模式决定趟的序列：
//!
//! | 模式 | 序列 |
//! |---|---|
//! | Forward | 正向 |
//! | Backward | 反向 |
//! | PingPong | 正向、反向 |
//! | Loop* | 重复对应的非循环序列 |
//!
//! 正向趟的位置是 `ease(p)`，反向趟是 `ease(1 - p)`，即正向趟的时间倒放，
//! 所以 PingPong 对任意缓动都是镜像对称的。
//!
//! 每趟的最后一帧强制 `p = 1`，保证精确收敛；超出的时间带入下一趟，
//! 但一帧最多跨越一个趟边界。

use serde::{Deserialize, Serialize};

use crate::easing::Easing;

/// 播放模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Playback {
    /// 起点到终点，一次
    #[default]
    Forward,
    /// 终点到起点，一次
    Backward,
    /// 往返一次
    PingPong,
    /// 无限正向循环
    LoopForward,
    /// 无限反向循环
    LoopBackward,
    /// 无限往返
    LoopPingPong,
}

impl Playback {
    /// 是否循环
    pub fn is_looping(self) -> bool {
        matches!(
            self,
            Self::LoopForward | Self::LoopBackward | Self::LoopPingPong
        )
    }

    /// 一轮中的趟序列
    pub fn passes(self) -> &'static [Direction] {
        match self {
            Self::Forward | Self::LoopForward => &[Direction::Forward],
            Self::Backward | Self::LoopBackward => &[Direction::Backward],
            Self::PingPong | Self::LoopPingPong => &[Direction::Forward, Direction::Backward],
        }
    }

    /// 自然结束时停留的端点是否为起点
    pub fn ends_at_start(self) -> bool {
        matches!(self.passes().last(), Some(Direction::Backward))
    }
}

/// 趟方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

/// 强制结束时吸附到的值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EndState {
    /// 吸附到捕获的起点
    Start,
    /// 保留最后写入的值
    Middle,
    /// 吸附到终点
    #[default]
    End,
}

/// 状态机状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConductorState {
    /// 已创建，尚未推进
    Idle,
    /// 推进中
    Running,
    /// 非循环模式自然结束
    Completed,
    /// 被外部终止
    Cancelled,
}

/// 播放状态机
#[derive(Debug, Clone)]
pub struct Conductor {
    duration: f64,
    easing: Easing,
    playback: Playback,
    state: ConductorState,
    /// 当前趟在序列中的下标
    pass: usize,
    /// 当前趟已经过的时间（秒）
    elapsed: f64,
    /// 已完成的轮数
    loops: u64,
    /// 最近一次输出的线性进度
    progress: f64,
}

impl Conductor {
    /// 创建状态机
    pub fn new(duration: f32, easing: Easing, playback: Playback) -> Self {
        Self {
            duration: duration as f64,
            easing,
            playback,
            state: ConductorState::Idle,
            pass: 0,
            elapsed: 0.0,
            loops: 0,
            progress: 0.0,
        }
    }

    pub fn state(&self) -> ConductorState {
        self.state
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    /// 每趟时长（秒）
    pub fn duration(&self) -> f32 {
        self.duration as f32
    }

    /// 当前趟的线性进度
    pub fn progress(&self) -> f32 {
        self.progress as f32
    }

    /// 已完成的轮数（循环模式）
    pub fn loops(&self) -> u64 {
        self.loops
    }

    /// 当前趟方向
    pub fn direction(&self) -> Direction {
        self.playback.passes()[self.pass]
    }

    /// 是否已经结束（自然或外部）
    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            ConductorState::Completed | ConductorState::Cancelled
        )
    }

    /// 外部终止
    pub fn cancel(&mut self) {
        if !self.is_finished() {
            self.state = ConductorState::Cancelled;
        }
    }

    /// 推进 `dt` 秒
    ///
    /// # 返回
    /// 本帧的路径位置（缓动后，Back / Elastic 可能超出 [0, 1]）；
    /// 已结束时返回 `None`。
    pub fn advance(&mut self, dt: f32) -> Option<f64> {
        if self.is_finished() {
            return None;
        }
        self.state = ConductorState::Running;

        let direction = self.direction();
        let dt = if dt.is_finite() { dt.max(0.0) as f64 } else { 0.0 };

        // 时长非正或 NaN：第一帧即完成本趟
        let (p, overflow) = if self.duration.is_nan() || self.duration <= 0.0 {
            (1.0, Some(0.0))
        } else {
            self.elapsed += dt;
            if self.elapsed >= self.duration {
                (1.0, Some(self.elapsed - self.duration))
            } else {
                (self.elapsed / self.duration, None)
            }
        };
        self.progress = p;

        let position = match direction {
            Direction::Forward => self.easing.apply(p),
            Direction::Backward => self.easing.apply(1.0 - p),
        };

        if let Some(overflow) = overflow {
            self.finish_pass(overflow);
        }

        Some(position)
    }

    /// 结束当前趟；带入下一趟的时间不超过一趟时长
    fn finish_pass(&mut self, overflow: f64) {
        let overflow = overflow.min(self.duration.max(0.0));
        let passes = self.playback.passes();
        if self.pass + 1 < passes.len() {
            self.pass += 1;
            self.elapsed = overflow;
        } else if self.playback.is_looping() {
            self.pass = 0;
            self.elapsed = overflow;
            self.loops += 1;
        } else {
            self.state = ConductorState::Completed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(conductor: &mut Conductor, dt: f32, frames: usize) -> Vec<f64> {
        (0..frames).filter_map(|_| conductor.advance(dt)).collect()
    }

    #[test]
    fn test_forward_converges_exactly() {
        let mut conductor = Conductor::new(1.0, Easing::InOutSine, Playback::Forward);
        assert_eq!(conductor.state(), ConductorState::Idle);

        let positions = run(&mut conductor, 0.3, 10);
        assert_eq!(positions.len(), 4);
        assert_eq!(*positions.last().unwrap(), 1.0);
        assert_eq!(conductor.state(), ConductorState::Completed);
        assert_eq!(conductor.advance(0.1), None);
    }

    #[test]
    fn test_backward_ends_at_start() {
        let mut conductor = Conductor::new(0.5, Easing::OutQuad, Playback::Backward);
        let positions = run(&mut conductor, 0.2, 5);
        assert!(positions[0] > 0.5);
        assert_eq!(*positions.last().unwrap(), 0.0);
        assert!(Playback::Backward.ends_at_start());
        assert!(Playback::PingPong.ends_at_start());
        assert!(!Playback::Forward.ends_at_start());
    }

    #[test]
    fn test_ping_pong_mirror() {
        let mut conductor = Conductor::new(1.0, Easing::InCubic, Playback::PingPong);
        let positions = run(&mut conductor, 0.25, 10);
        // 0.25 0.5 0.75 1.0 | 0.75 0.5 0.25 0.0
        assert_eq!(positions.len(), 8);
        for i in 0..3 {
            assert!((positions[i] - positions[6 - i]).abs() < 1e-9, "{positions:?}");
        }
        assert_eq!(positions[3], 1.0);
        assert_eq!(positions[7], 0.0);
        assert_eq!(conductor.state(), ConductorState::Completed);
    }

    #[test]
    fn test_overflow_carries_into_next_pass() {
        let mut conductor = Conductor::new(1.0, Easing::Linear, Playback::LoopForward);
        assert_eq!(conductor.advance(0.75), Some(0.75));
        // 1.5 秒：本趟结束于 1，剩余 0.5 带入下一趟
        assert_eq!(conductor.advance(0.75), Some(1.0));
        assert_eq!(conductor.loops(), 1);
        assert_eq!(conductor.advance(0.25), Some(0.75));
    }

    #[test]
    fn test_one_boundary_per_frame() {
        let mut conductor = Conductor::new(0.1, Easing::Linear, Playback::PingPong);
        // 一帧远超总时长，也只结束一趟
        assert_eq!(conductor.advance(5.0), Some(1.0));
        assert_eq!(conductor.direction(), Direction::Backward);
        assert_eq!(conductor.state(), ConductorState::Running);
        assert_eq!(conductor.advance(0.0), Some(0.0));
        assert_eq!(conductor.state(), ConductorState::Completed);
    }

    #[test]
    fn test_hitch_does_not_pin_loop() {
        let mut conductor = Conductor::new(0.1, Easing::Linear, Playback::LoopForward);
        conductor.advance(0.05);
        assert_eq!(conductor.advance(10.0), Some(1.0));
        // 卡顿带入的时间被截断为一趟：下一帧结束该趟，之后恢复正常推进
        assert_eq!(conductor.advance(0.016), Some(1.0));
        let positions = run(&mut conductor, 0.016, 5);
        for pair in positions.windows(2) {
            assert!(pair[1] > pair[0], "{positions:?}");
        }
        assert!(positions.iter().all(|p| *p < 1.0), "{positions:?}");
        assert_eq!(conductor.loops(), 2);
    }

    #[test]
    fn test_zero_and_nan_duration() {
        let mut conductor = Conductor::new(0.0, Easing::Linear, Playback::Forward);
        assert_eq!(conductor.advance(0.016), Some(1.0));
        assert!(conductor.is_finished());

        let mut conductor = Conductor::new(f32::NAN, Easing::Linear, Playback::Forward);
        assert_eq!(conductor.advance(0.016), Some(1.0));
        assert!(conductor.is_finished());
    }

    #[test]
    fn test_looping_never_completes() {
        let mut conductor = Conductor::new(0.2, Easing::Linear, Playback::LoopPingPong);
        let positions = run(&mut conductor, 0.1, 100);
        assert_eq!(positions.len(), 100);
        assert_eq!(conductor.state(), ConductorState::Running);
        assert!(conductor.loops() > 10);

        conductor.cancel();
        assert_eq!(conductor.state(), ConductorState::Cancelled);
        assert_eq!(conductor.advance(0.1), None);
    }

    #[test]
    fn test_playback_serde_names() {
        let json = serde_json::to_string(&Playback::LoopPingPong).unwrap();
        assert_eq!(json, "\"LoopPingPong\"");
    }
}
