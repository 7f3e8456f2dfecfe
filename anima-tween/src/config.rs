//! # Config 模块
//!
//! 补间引擎配置。所有字段都有默认值，配置文件只需写要覆盖的项。
//!
//! ```json
//! {
//!   "default_easing": "OutQuad",
//!   "default_playback": "Forward",
//!   "gradient_samples": 16,
//!   "max_tick_delta": 0.1,
//!   "shake": { "strength": 1.0, "vibrato": 10 }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::conductor::Playback;
use crate::easing::Easing;
use crate::error::ConfigError;
use crate::interpolate::DEFAULT_GRADIENT_SAMPLES;

/// 补间引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweenerConfig {
    /// 未指定缓动时使用
    #[serde(default)]
    pub default_easing: Easing,

    /// 未指定播放模式时使用
    #[serde(default)]
    pub default_playback: Playback,

    /// 渐变插值的采样数（至少 2）
    #[serde(default = "default_gradient_samples")]
    pub gradient_samples: usize,

    /// 单帧时间增量上限（秒）
    ///
    /// 设置后每帧的 `dt` 会被限制到该值，避免宿主卡顿时补间跳变。
    #[serde(default)]
    pub max_tick_delta: Option<f32>,

    /// 震动默认参数
    #[serde(default)]
    pub shake: ShakeConfig,
}

/// 震动参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShakeConfig {
    /// 最大偏移
    #[serde(default = "default_shake_strength")]
    pub strength: f32,

    /// 抖动次数（途经点数量）
    #[serde(default = "default_shake_vibrato")]
    pub vibrato: u32,
}

fn default_gradient_samples() -> usize {
    DEFAULT_GRADIENT_SAMPLES
}

fn default_shake_strength() -> f32 {
    1.0
}

fn default_shake_vibrato() -> u32 {
    10
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self {
            strength: default_shake_strength(),
            vibrato: default_shake_vibrato(),
        }
    }
}

impl Default for TweenerConfig {
    fn default() -> Self {
        Self {
            default_easing: Easing::default(),
            default_playback: Playback::default(),
            gradient_samples: default_gradient_samples(),
            max_tick_delta: None,
            shake: ShakeConfig::default(),
        }
    }
}

impl TweenerConfig {
    /// 从文件加载配置
    ///
    /// 文件不存在、无法解析或验证失败时返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::load_strict(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "配置文件加载失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 从文件加载并验证配置，失败时返回错误
    pub fn load_strict(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), "配置文件加载成功");
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gradient_samples < 2 {
            return Err(ConfigError::Validation(format!(
                "gradient_samples 至少为 2，当前为 {}",
                self.gradient_samples
            )));
        }

        if let Some(max) = self.max_tick_delta
            && !(max.is_finite() && max > 0.0)
        {
            return Err(ConfigError::Validation(format!(
                "max_tick_delta 必须为正数，当前为 {max}"
            )));
        }

        if !self.shake.strength.is_finite() || self.shake.strength < 0.0 {
            return Err(ConfigError::Validation(format!(
                "shake.strength 必须为非负数，当前为 {}",
                self.shake.strength
            )));
        }

        Ok(())
    }

    /// 按配置限制单帧时间增量
    pub fn clamp_delta(&self, dt: f32) -> f32 {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        match self.max_tick_delta {
            Some(max) => dt.min(max),
            None => dt,
        }
    }
}
