//! # Timer 模块
//!
//! 延时 / 重复回调。定时器与补间共享注册表键空间（`@timer_N`）。

use crate::system::Callback;

/// 定时器
pub(crate) struct Timer {
    interval: f64,
    elapsed: f64,
    repeat: bool,
    /// 回调执行期间被取出
    pub(crate) callback: Option<Callback>,
}

impl Timer {
    pub(crate) fn new(interval: f32, repeat: bool, callback: Callback) -> Self {
        Self {
            interval: if interval.is_finite() {
                interval.max(0.0) as f64
            } else {
                0.0
            },
            elapsed: 0.0,
            repeat,
            callback: Some(callback),
        }
    }

    pub(crate) fn repeat(&self) -> bool {
        self.repeat
    }

    pub(crate) fn interval(&self) -> f32 {
        self.interval as f32
    }

    /// 推进 `dt` 秒，返回本帧是否触发
    ///
    /// 一帧最多触发一次，余下的时间留给后续帧。
    pub(crate) fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += if dt.is_finite() { dt.max(0.0) as f64 } else { 0.0 };
        if self.elapsed < self.interval {
            return false;
        }
        self.elapsed = if self.interval > 0.0 {
            self.elapsed - self.interval
        } else {
            0.0
        };
        true
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("interval", &self.interval)
            .field("elapsed", &self.elapsed)
            .field("repeat", &self.repeat)
            .finish_non_exhaustive()
    }
}
