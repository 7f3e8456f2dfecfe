//! # Error 模块
//!
//! 定义 anima-tween 中使用的错误类型。
//!
//! 所有错误都只影响单个补间：`animate` 在登记任何东西之前中止，
//! 其他正在运行的补间不受影响。

use thiserror::Error;

use crate::accessor::ObjectId;
use crate::value::ValueKind;

/// 补间错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TweenError {
    /// 无法为属性解析访问器
    #[error("对象 {object} 上的属性 '{property}' 无法解析")]
    UnresolvableProperty { object: ObjectId, property: String },

    /// 目标值类型与属性类型不一致
    #[error("属性 '{property}' 类型不匹配：期望 {expected}，实际 {found}")]
    TypeMismatch {
        property: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// 插值分发器不支持该类型
    #[error("不支持的补间类型: {kind}")]
    UnsupportedKind { kind: ValueKind },

    /// 目标对象已销毁或未注册
    #[error("目标对象 {object} 已失效")]
    DeadTarget { object: ObjectId },

    /// 路径为空
    #[error("属性 '{property}' 的路径为空")]
    EmptyPath { property: String },
}

/// Result 类型别名
pub type TweenResult<T> = Result<T, TweenError>;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析或序列化失败
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TweenError::TypeMismatch {
            property: "alpha".to_string(),
            expected: ValueKind::Float,
            found: ValueKind::Text,
        };
        assert_eq!(
            err.to_string(),
            "属性 'alpha' 类型不匹配：期望 float，实际 text"
        );

        let err = TweenError::DeadTarget {
            object: ObjectId::new(3),
        };
        assert_eq!(err.to_string(), "目标对象 ObjectId(3) 已失效");
    }
}
