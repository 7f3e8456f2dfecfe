//! # Interpolate 模块
//!
//! 按值类型插值。
//!
//! 插值器在补间创建时按属性类型选定一次（[`Interpolator::for_kind`]），
//! 每一段路径再预先计算一个 [`Segment`]，之后每帧只调用 `Segment::sample`。
//!
//! ## 端点
//!
//! `sample(0)` 精确返回段起点，`sample(1)` 精确返回段终点，与类型无关。
//!
//! ## 字符串
//!
//! 按以下顺序选择模式：
//! 1. 数字：两端都能解析为数字时按数值插值再格式化
//! 2. 增长：终点以起点开头，逐字显示
//! 3. 收缩：起点以终点开头，逐字删除
//! 4. 替换：先收缩到公共前缀，再增长到终点，时长按字符变化量分配

use glam::{Quat, Vec2, Vec3, Vec4};

use crate::error::{TweenError, TweenResult};
use crate::types::{Bounds, Color, Gradient, GradientAlphaKey, GradientColorKey, Rect};
use crate::value::{Value, ValueKind};

/// 渐变默认采样数
pub const DEFAULT_GRADIENT_SAMPLES: usize = 16;

/// 按类型选定的插值器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolator {
    /// int / float / double，以 f64 计算
    Numeric(ValueKind),
    Vec2,
    Vec3,
    Vec4,
    IVec2,
    IVec3,
    Color,
    /// 最短弧球面插值
    Rotation,
    Rect,
    Bounds,
    /// 在固定数量的位置重新采样
    Gradient { samples: usize },
    Text,
}

impl Interpolator {
    /// 为属性类型选择插值器
    ///
    /// # 错误
    /// 不可插值的类型（`bool`）返回 `UnsupportedKind`。
    pub fn for_kind(kind: ValueKind, gradient_samples: usize) -> TweenResult<Self> {
        let interpolator = match kind {
            ValueKind::Int | ValueKind::Float | ValueKind::Double => Self::Numeric(kind),
            ValueKind::Vec2 => Self::Vec2,
            ValueKind::Vec3 => Self::Vec3,
            ValueKind::Vec4 => Self::Vec4,
            ValueKind::IVec2 => Self::IVec2,
            ValueKind::IVec3 => Self::IVec3,
            ValueKind::Color => Self::Color,
            ValueKind::Rotation => Self::Rotation,
            ValueKind::Rect => Self::Rect,
            ValueKind::Bounds => Self::Bounds,
            ValueKind::Gradient => Self::Gradient {
                samples: gradient_samples.max(2),
            },
            ValueKind::Text => Self::Text,
            ValueKind::Bool => return Err(TweenError::UnsupportedKind { kind }),
        };
        Ok(interpolator)
    }

    /// 预计算一段插值
    ///
    /// 两端类型必须与插值器一致，否则返回 `None`。
    pub fn segment(&self, from: &Value, to: &Value) -> Option<Segment> {
        let plan = match (self, from, to) {
            (Self::Numeric(kind), a, b) if a.kind() == *kind && b.kind() == *kind => {
                Plan::Numeric {
                    kind: *kind,
                    a: a.as_f64()?,
                    b: b.as_f64()?,
                }
            }
            (Self::Vec2, Value::Vec2(a), Value::Vec2(b)) => Plan::Vec2(*a, *b),
            (Self::Vec3, Value::Vec3(a), Value::Vec3(b)) => Plan::Vec3(*a, *b),
            (Self::Vec4, Value::Vec4(a), Value::Vec4(b)) => Plan::Vec4(*a, *b),
            (Self::IVec2, Value::IVec2(a), Value::IVec2(b)) => {
                Plan::IVec2(a.as_vec2(), b.as_vec2())
            }
            (Self::IVec3, Value::IVec3(a), Value::IVec3(b)) => {
                Plan::IVec3(a.as_vec3(), b.as_vec3())
            }
            (Self::Color, Value::Color(a), Value::Color(b)) => Plan::Color(*a, *b),
            (Self::Rotation, Value::Rotation(a), Value::Rotation(b)) => Plan::Rotation(*a, *b),
            (Self::Rect, Value::Rect(a), Value::Rect(b)) => Plan::Rect(*a, *b),
            (Self::Bounds, Value::Bounds(a), Value::Bounds(b)) => Plan::Bounds(*a, *b),
            (Self::Gradient { samples }, Value::Gradient(a), Value::Gradient(b)) => {
                Plan::Gradient(GradientPlan::new(a, b, *samples))
            }
            (Self::Text, Value::Text(a), Value::Text(b)) => Plan::Text(TextPlan::new(a, b)),
            _ => return None,
        };

        Some(Segment {
            from: from.clone(),
            to: to.clone(),
            plan,
        })
    }
}

/// 一段预计算好的插值
#[derive(Debug, Clone)]
pub struct Segment {
    from: Value,
    to: Value,
    plan: Plan,
}

#[derive(Debug, Clone)]
enum Plan {
    Numeric { kind: ValueKind, a: f64, b: f64 },
    Vec2(Vec2, Vec2),
    Vec3(Vec3, Vec3),
    Vec4(Vec4, Vec4),
    IVec2(Vec2, Vec2),
    IVec3(Vec3, Vec3),
    Color(Color, Color),
    Rotation(Quat, Quat),
    Rect(Rect, Rect),
    Bounds(Bounds, Bounds),
    Gradient(GradientPlan),
    Text(TextPlan),
}

impl Segment {
    /// 段起点
    pub fn start(&self) -> &Value {
        &self.from
    }

    /// 段终点
    pub fn end(&self) -> &Value {
        &self.to
    }

    /// 在进度 `p` 处取值
    ///
    /// `p` 可以超出 [0, 1]（Back / Elastic 缓动），数值、向量、颜色、
    /// 矩形与包围盒按外插处理；字符串与渐变限制在 [0, 1]。
    pub fn sample(&self, p: f64) -> Value {
        if p == 0.0 {
            return self.from.clone();
        }
        if p == 1.0 {
            return self.to.clone();
        }

        let t = p as f32;
        match &self.plan {
            Plan::Numeric { kind, a, b } => {
                let v = a * (1.0 - p) + b * p;
                Value::from_f64(*kind, v).unwrap_or(Value::Double(v))
            }
            Plan::Vec2(a, b) => Value::Vec2(*a * (1.0 - t) + *b * t),
            Plan::Vec3(a, b) => Value::Vec3(*a * (1.0 - t) + *b * t),
            Plan::Vec4(a, b) => Value::Vec4(*a * (1.0 - t) + *b * t),
            Plan::IVec2(a, b) => Value::IVec2((*a * (1.0 - t) + *b * t).round().as_ivec2()),
            Plan::IVec3(a, b) => Value::IVec3((*a * (1.0 - t) + *b * t).round().as_ivec3()),
            Plan::Color(a, b) => Value::Color(a.lerp(*b, t)),
            Plan::Rotation(a, b) => Value::Rotation(a.slerp(*b, t)),
            Plan::Rect(a, b) => Value::Rect(a.lerp(*b, t)),
            Plan::Bounds(a, b) => Value::Bounds(a.lerp(*b, t)),
            Plan::Gradient(plan) => Value::Gradient(plan.sample(p.clamp(0.0, 1.0) as f32)),
            Plan::Text(plan) => Value::Text(plan.sample(p.clamp(0.0, 1.0))),
        }
    }
}

/// 一次性插值
///
/// 每次调用都重新选择插值器，只适合偶尔的取值；补间内部使用 [`Segment`]。
pub fn interpolate(kind: ValueKind, start: &Value, end: &Value, p: f64) -> TweenResult<Value> {
    let interpolator = Interpolator::for_kind(kind, DEFAULT_GRADIENT_SAMPLES)?;
    let segment = interpolator.segment(start, end).ok_or_else(|| {
        let found = if start.kind() == kind {
            end.kind()
        } else {
            start.kind()
        };
        TweenError::TypeMismatch {
            property: String::new(),
            expected: kind,
            found,
        }
    })?;
    Ok(segment.sample(p))
}

/// 渐变插值：两端在同样的位置上预先采样
#[derive(Debug, Clone)]
struct GradientPlan {
    times: Vec<f32>,
    from: Vec<Color>,
    to: Vec<Color>,
}

impl GradientPlan {
    fn new(from: &Gradient, to: &Gradient, samples: usize) -> Self {
        let samples = samples.max(2);
        let last = (samples - 1) as f32;
        let times: Vec<f32> = (0..samples).map(|i| i as f32 / last).collect();
        Self {
            from: times.iter().map(|&time| from.evaluate(time)).collect(),
            to: times.iter().map(|&time| to.evaluate(time)).collect(),
            times,
        }
    }

    fn sample(&self, t: f32) -> Gradient {
        let blended: Vec<(f32, Color)> = self
            .times
            .iter()
            .zip(self.from.iter().zip(&self.to))
            .map(|(&time, (a, b))| (time, a.lerp(*b, t)))
            .collect();

        Gradient::new(
            blended
                .iter()
                .map(|&(time, color)| GradientColorKey {
                    color: color.with_alpha(1.0),
                    time,
                })
                .collect(),
            blended
                .iter()
                .map(|&(time, color)| GradientAlphaKey {
                    alpha: color.a,
                    time,
                })
                .collect(),
        )
    }
}

/// 字符串插值方案
#[derive(Debug, Clone)]
enum TextPlan {
    /// 两端都是数字
    Numeric { a: f64, b: f64, decimals: Option<usize> },
    /// 逐字显示 `chars` 的前缀
    Typewriter {
        chars: Vec<char>,
        from_len: usize,
        to_len: usize,
    },
    /// 先收缩到公共前缀，再增长
    Replace {
        start: Vec<char>,
        end: Vec<char>,
        prefix: usize,
        split: f64,
    },
}

impl TextPlan {
    fn new(from: &str, to: &str) -> Self {
        if let (Some(a), Some(b)) = (parse_number(from), parse_number(to)) {
            let decimals = match (fraction_digits(from), fraction_digits(to)) {
                (None, None) => None,
                (x, y) => Some(x.unwrap_or(0).max(y.unwrap_or(0))),
            };
            return Self::Numeric { a, b, decimals };
        }

        let start: Vec<char> = from.chars().collect();
        let end: Vec<char> = to.chars().collect();

        if end.starts_with(&start) {
            return Self::Typewriter {
                from_len: start.len(),
                to_len: end.len(),
                chars: end,
            };
        }
        if start.starts_with(&end) {
            return Self::Typewriter {
                from_len: start.len(),
                to_len: end.len(),
                chars: start,
            };
        }

        let prefix = start
            .iter()
            .zip(&end)
            .take_while(|(a, b)| a == b)
            .count();
        let shrink = (start.len() - prefix) as f64;
        let grow = (end.len() - prefix) as f64;
        Self::Replace {
            split: shrink / (shrink + grow),
            start,
            end,
            prefix,
        }
    }

    fn sample(&self, p: f64) -> String {
        match self {
            Self::Numeric { a, b, decimals } => {
                let v = a * (1.0 - p) + b * p;
                match *decimals {
                    None => format!("{}", v.round() as i64),
                    Some(digits) => format!("{v:.digits$}"),
                }
            }
            Self::Typewriter {
                chars,
                from_len,
                to_len,
            } => visible(chars, *from_len, *to_len, p),
            Self::Replace {
                start,
                end,
                prefix,
                split,
            } => {
                if p < *split {
                    visible(start, start.len(), *prefix, p / split)
                } else {
                    visible(end, *prefix, end.len(), (p - split) / (1.0 - split))
                }
            }
        }
    }
}

/// 取 `chars` 的前 `round(lerp(from_len, to_len, p))` 个字符
fn visible(chars: &[char], from_len: usize, to_len: usize, p: f64) -> String {
    let len = (from_len as f64 * (1.0 - p) + to_len as f64 * p).round();
    let len = (len.max(0.0) as usize).min(chars.len());
    chars[..len].iter().collect()
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 小数位数；没有小数点时返回 `None`
fn fraction_digits(s: &str) -> Option<usize> {
    let (_, fraction) = s.trim().split_once('.')?;
    Some(fraction.chars().take_while(char::is_ascii_digit).count())
}
