//! # Anima Tween
//!
//! 属性补间动画引擎。
//!
//! ## 架构概述
//!
//! 引擎是纯逻辑核心，不依赖渲染或 IO（配置加载除外）。
//! 宿主提供每帧的时间增量，引擎把属性值写回宿主对象：
//!
//! ```text
//! Host                          Tweener
//!   │                              │
//!   │──── animate / after ───────►│
//!   │                              │
//!   │──── tick(dt) ──────────────►│ 推进状态机，插值，写入属性
//!   │◄─── Vec<TweenEvent> ────────│
//!   │                              │
//! ```
//!
//! ## 组成
//!
//! - [`easing`]：41 条缓动曲线
//! - [`interpolate`]：按值类型插值（数值、向量、颜色、旋转、矩形、渐变、字符串）
//! - [`accessor`]：属性访问器解析（字段表 → 自定义策略 → `Animatable`）
//! - [`tween`]：补间描述，捕获起点、终点与途经点
//! - [`conductor`]：六种播放模式的状态机
//! - [`system`]：注册表与控制接口（`animate` / `complete` / `stop` / `cancel` / `after`）
//!
//! ## 使用示例
//!
//! ```ignore
//! use anima_tween::{Easing, PropertyBag, TweenOptions, Tweener};
//!
//! let mut tweener = Tweener::new();
//! let sprite = Rc::new(PropertyBag::new().with("alpha", 1.0f32));
//! let id = tweener.register(&sprite);
//!
//! tweener.animate_with(
//!     id,
//!     "alpha",
//!     0.0f32,
//!     0.5,
//!     TweenOptions::new()
//!         .easing(Easing::OutQuad)
//!         .on_complete(|t| { /* 下一段 */ }),
//! )?;
//!
//! // 主循环
//! loop {
//!     let events = tweener.tick(dt);
//!     // ...
//! }
//! ```

pub mod accessor;
pub mod conductor;
pub mod config;
pub mod easing;
pub mod error;
mod helpers;
pub mod interpolate;
pub mod key;
pub mod system;
mod timer;
pub mod tween;
pub mod types;
pub mod value;

// 重导出核心类型
pub use accessor::{
    AccessorResolver, Animatable, ObjectId, PropertyAccessor, PropertyBag, ResolveStrategy,
    TargetRef,
};
pub use conductor::{Conductor, ConductorState, Direction, EndState, Playback};
pub use config::{ShakeConfig, TweenerConfig};
pub use easing::{Easing, EasingFamily, EasingMode};
pub use error::{ConfigError, TweenError, TweenResult};
pub use interpolate::{DEFAULT_GRADIENT_SAMPLES, Interpolator, Segment, interpolate};
pub use key::{Slot, TweenKey};
pub use system::{Callback, TweenEvent, TweenInfo, TweenOptions, Tweener};
pub use tween::TweenDescriptor;
pub use types::{Bounds, Color, Gradient, GradientAlphaKey, GradientColorKey, Rect};
pub use value::{AnimValue, TweenTo, Value, ValueKind};

// 向量与四元数类型
pub use glam;
