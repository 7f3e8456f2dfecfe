//! # Value 模块
//!
//! 补间值的统一表示。
//!
//! - [`Value`]：带标签的值，属性访问器读写的就是它
//! - [`ValueKind`]：值的类型标签，在补间创建时确定
//! - [`AnimValue`]：Rust 类型与 `Value` 之间的映射，用于注册强类型访问器
//! - [`TweenTo`]：`animate` 的目标值，单个值或一条路径

use std::fmt;

use glam::{IVec2, IVec3, Quat, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::types::{Bounds, Color, Gradient, Rect};

/// 值的类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Int,
    Float,
    Double,
    Vec2,
    Vec3,
    Vec4,
    IVec2,
    IVec3,
    Color,
    Rotation,
    Rect,
    Bounds,
    Gradient,
    Text,
    Bool,
}

impl ValueKind {
    /// 是否为标量数值类型
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Double)
    }

    /// 名称（用于日志与错误信息）
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Double => "double",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::IVec2 => "ivec2",
            Self::IVec3 => "ivec3",
            Self::Color => "color",
            Self::Rotation => "rotation",
            Self::Rect => "rect",
            Self::Bounds => "bounds",
            Self::Gradient => "gradient",
            Self::Text => "text",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 补间值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i32),
    Float(f32),
    Double(f64),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    IVec2(IVec2),
    IVec3(IVec3),
    Color(Color),
    Rotation(Quat),
    Rect(Rect),
    Bounds(Bounds),
    Gradient(Gradient),
    Text(String),
    Bool(bool),
}

impl Value {
    /// 获取类型标签
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Vec4(_) => ValueKind::Vec4,
            Value::IVec2(_) => ValueKind::IVec2,
            Value::IVec3(_) => ValueKind::IVec3,
            Value::Color(_) => ValueKind::Color,
            Value::Rotation(_) => ValueKind::Rotation,
            Value::Rect(_) => ValueKind::Rect,
            Value::Bounds(_) => ValueKind::Bounds,
            Value::Gradient(_) => ValueKind::Gradient,
            Value::Text(_) => ValueKind::Text,
            Value::Bool(_) => ValueKind::Bool,
        }
    }

    /// 以 f64 读取标量数值
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(v) => Some(v as f64),
            Value::Float(v) => Some(v as f64),
            Value::Double(v) => Some(v),
            _ => None,
        }
    }

    /// 把 f64 写回指定宽度的数值类型
    ///
    /// 只在最终写入时调用：整数四舍五入，float 截断精度。
    pub fn from_f64(kind: ValueKind, v: f64) -> Option<Value> {
        match kind {
            ValueKind::Int => Some(Value::Int(v.round() as i32)),
            ValueKind::Float => Some(Value::Float(v as f32)),
            ValueKind::Double => Some(Value::Double(v)),
            _ => None,
        }
    }

    /// 转换为指定类型
    ///
    /// 数值类型之间可以互相转换，其余类型必须完全一致。
    /// 失败时原样返回自身，便于调用方报告实际类型。
    pub fn coerce_to(self, kind: ValueKind) -> Result<Value, Value> {
        if self.kind() == kind {
            return Ok(self);
        }
        if kind.is_numeric()
            && let Some(v) = self.as_f64()
            && let Some(converted) = Value::from_f64(kind, v)
        {
            return Ok(converted);
        }
        Err(self)
    }

    /// 以字符串读取
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Vec2(v) => write!(f, "{v}"),
            Value::Vec3(v) => write!(f, "{v}"),
            Value::Vec4(v) => write!(f, "{v}"),
            Value::IVec2(v) => write!(f, "{v}"),
            Value::IVec3(v) => write!(f, "{v}"),
            Value::Color(c) => write!(f, "rgba({}, {}, {}, {})", c.r, c.g, c.b, c.a),
            Value::Rotation(q) => write!(f, "{q}"),
            Value::Rect(r) => write!(f, "rect({}, {})", r.position, r.size),
            Value::Bounds(b) => write!(f, "bounds({}, {})", b.center, b.size),
            Value::Gradient(g) => write!(
                f,
                "gradient({} color keys, {} alpha keys)",
                g.color_keys.len(),
                g.alpha_keys.len()
            ),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// 可补间的 Rust 类型
///
/// 用于 [`AccessorResolver::register_field`](crate::AccessorResolver::register_field)
/// 注册强类型的 getter/setter。
pub trait AnimValue: Sized + 'static {
    /// 对应的类型标签
    const KIND: ValueKind;

    /// 转换为 `Value`
    fn into_value(self) -> Value;

    /// 从 `Value` 读取
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_anim_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl AnimValue for $ty {
                const KIND: ValueKind = ValueKind::$variant;

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl From<$ty> for TweenTo {
                fn from(v: $ty) -> Self {
                    TweenTo::Value(Value::$variant(v))
                }
            }
        )*
    };
}

impl_anim_value! {
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    IVec2 => IVec2,
    IVec3 => IVec3,
    Color => Color,
    Quat => Rotation,
    Rect => Rect,
    Bounds => Bounds,
    Gradient => Gradient,
    String => Text,
    bool => Bool,
}

macro_rules! impl_numeric_anim_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl AnimValue for $ty {
                const KIND: ValueKind = ValueKind::$variant;

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match Value::from_f64(ValueKind::$variant, value.as_f64()?)? {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl From<$ty> for TweenTo {
                fn from(v: $ty) -> Self {
                    TweenTo::Value(Value::$variant(v))
                }
            }
        )*
    };
}

impl_numeric_anim_value! {
    i32 => Int,
    f32 => Float,
    f64 => Double,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<&str> for TweenTo {
    fn from(s: &str) -> Self {
        TweenTo::Value(Value::Text(s.to_string()))
    }
}

/// `animate` 的目标
///
/// - `Value`：单个终点
/// - `Path`：一组途经点，最后一个元素是真正的终点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TweenTo {
    Value(Value),
    Path(Vec<Value>),
}

impl TweenTo {
    /// 由任意可转换为 `Value` 的序列构造路径
    pub fn path<V: Into<Value>>(points: impl IntoIterator<Item = V>) -> Self {
        TweenTo::Path(points.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for TweenTo {
    fn from(v: Value) -> Self {
        TweenTo::Value(v)
    }
}

impl From<Vec<Value>> for TweenTo {
    fn from(points: Vec<Value>) -> Self {
        TweenTo::Path(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(Value::from(1.0f32).kind(), ValueKind::Float);
        assert_eq!(Value::from(1.0f64).kind(), ValueKind::Double);
        assert_eq!(Value::from(3).kind(), ValueKind::Int);
        assert_eq!(Value::from("abc").kind(), ValueKind::Text);
        assert_eq!(Value::from(Quat::IDENTITY).kind(), ValueKind::Rotation);
        assert!(ValueKind::Int.is_numeric());
        assert!(!ValueKind::Vec2.is_numeric());
    }

    #[test]
    fn test_coerce_numeric() {
        let v = Value::Double(2.6).coerce_to(ValueKind::Int);
        assert_eq!(v, Ok(Value::Int(3)));

        let v = Value::Int(5).coerce_to(ValueKind::Float);
        assert_eq!(v, Ok(Value::Float(5.0)));
    }

    #[test]
    fn test_coerce_mismatch() {
        let v = Value::Text("5".to_string()).coerce_to(ValueKind::Float);
        assert_eq!(v, Err(Value::Text("5".to_string())));

        let v = Value::Vec2(Vec2::ONE).coerce_to(ValueKind::Vec3);
        assert!(v.is_err());
    }

    #[test]
    fn test_anim_value_roundtrip_numeric_width() {
        // 整数在写入时四舍五入
        assert_eq!(i32::from_value(&Value::Double(-2.5)), Some(-3));
        assert_eq!(f32::from_value(&Value::Int(7)), Some(7.0));
        assert_eq!(String::from_value(&Value::Int(7)), None);
        assert_eq!(<Vec3 as AnimValue>::KIND, ValueKind::Vec3);
    }

    #[test]
    fn test_tween_to_path() {
        let to = TweenTo::path([10.0f32, -5.0, 5.0]);
        assert_eq!(
            to,
            TweenTo::Path(vec![
                Value::Float(10.0),
                Value::Float(-5.0),
                Value::Float(5.0)
            ])
        );

        let to: TweenTo = Color::RED.into();
        assert_eq!(to, TweenTo::Value(Value::Color(Color::RED)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Text("hi".to_string()).to_string(), "\"hi\"");
        assert_eq!(ValueKind::IVec3.to_string(), "ivec3");
    }
}
