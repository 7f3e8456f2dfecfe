//! # Types 模块
//!
//! 可补间的复合值类型：颜色、矩形、包围盒与渐变。
//!
//! 向量与四元数直接使用 `glam`。

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// 线性插值（端点精确）
pub(crate) fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// RGBA 颜色（各通道 0.0 - 1.0）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const CLEAR: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);

    /// 创建颜色
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// 创建不透明颜色
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// 替换透明度
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// 逐通道线性插值（含 alpha，不做限制）
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            r: lerp_f32(self.r, other.r, t),
            g: lerp_f32(self.g, other.g, t),
            b: lerp_f32(self.b, other.b, t),
            a: lerp_f32(self.a, other.a, t),
        }
    }
}

/// 二维矩形：左下角位置 + 尺寸
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    /// 创建矩形
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// 位置与尺寸分别线性插值
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            position: self.position * (1.0 - t) + other.position * t,
            size: self.size * (1.0 - t) + other.size * t,
        }
    }
}

/// 三维包围盒：中心 + 尺寸
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub center: Vec3,
    pub size: Vec3,
}

impl Bounds {
    /// 创建包围盒
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self { center, size }
    }

    /// 半尺寸
    pub fn extents(&self) -> Vec3 {
        self.size * 0.5
    }

    /// 中心与尺寸分别线性插值
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            center: self.center * (1.0 - t) + other.center * t,
            size: self.size * (1.0 - t) + other.size * t,
        }
    }
}

/// 渐变颜色关键帧（只使用 RGB）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientColorKey {
    pub color: Color,
    pub time: f32,
}

/// 渐变透明度关键帧
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientAlphaKey {
    pub alpha: f32,
    pub time: f32,
}

/// 颜色渐变
///
/// 颜色与透明度分别由两组关键帧描述，`evaluate` 在关键帧之间线性混合。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Gradient {
    pub color_keys: Vec<GradientColorKey>,
    pub alpha_keys: Vec<GradientAlphaKey>,
}

impl Gradient {
    /// 创建渐变（关键帧按时间排序）
    pub fn new(
        mut color_keys: Vec<GradientColorKey>,
        mut alpha_keys: Vec<GradientAlphaKey>,
    ) -> Self {
        color_keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        alpha_keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            color_keys,
            alpha_keys,
        }
    }

    /// 单色渐变
    pub fn solid(color: Color) -> Self {
        Self::two_color(color, color)
    }

    /// 两端渐变
    pub fn two_color(from: Color, to: Color) -> Self {
        Self::new(
            vec![
                GradientColorKey {
                    color: from,
                    time: 0.0,
                },
                GradientColorKey {
                    color: to,
                    time: 1.0,
                },
            ],
            vec![
                GradientAlphaKey {
                    alpha: from.a,
                    time: 0.0,
                },
                GradientAlphaKey {
                    alpha: to.a,
                    time: 1.0,
                },
            ],
        )
    }

    /// 在 `time` 处取样
    ///
    /// 没有颜色关键帧时为白色，没有透明度关键帧时 alpha 为 1。
    pub fn evaluate(&self, time: f32) -> Color {
        let rgb = sample_keys(
            &self.color_keys,
            time,
            |k| (k.time, k.color),
            Color::WHITE,
            Color::lerp,
        );
        let alpha = sample_keys(
            &self.alpha_keys,
            time,
            |k| (k.time, k.alpha),
            1.0,
            lerp_f32,
        );
        rgb.with_alpha(alpha)
    }
}

/// 在有序关键帧上取样
fn sample_keys<K, V: Copy>(
    keys: &[K],
    time: f32,
    split: impl Fn(&K) -> (f32, V),
    empty: V,
    lerp: impl Fn(V, V, f32) -> V,
) -> V {
    let Some(first) = keys.first() else {
        return empty;
    };
    let (first_time, first_value) = split(first);
    if time <= first_time {
        return first_value;
    }

    for pair in keys.windows(2) {
        let (t0, v0) = split(&pair[0]);
        let (t1, v1) = split(&pair[1]);
        if time <= t1 {
            let span = t1 - t0;
            if span <= f32::EPSILON {
                return v1;
            }
            return lerp(v0, v1, (time - t0) / span);
        }
    }

    // 超过最后一个关键帧
    keys.last().map(|k| split(k).1).unwrap_or(first_value)
}
