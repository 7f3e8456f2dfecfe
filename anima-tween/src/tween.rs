//! # Tween 模块
//!
//! 补间描述：把 (目标, 属性) 绑定到缓存的访问器，捕获起点、终点与途经点。
//!
//! 构建顺序：
//! 1. 解析访问器，确定属性类型
//! 2. 选择插值器
//! 3. 校验并转换目标值 / 路径
//! 4. 捕获起点（或校验起点覆盖值）
//! 5. 预计算每一段
//! 6. 全部通过后，若有起点覆盖值，立即写入
//!
//! 任何一步失败都不会写入目标。

use crate::accessor::{AccessorResolver, PropertyAccessor, TargetRef};
use crate::conductor::EndState;
use crate::error::{TweenError, TweenResult};
use crate::interpolate::{Interpolator, Segment};
use crate::value::{TweenTo, Value, ValueKind};

/// 补间描述
#[derive(Debug)]
pub struct TweenDescriptor {
    target: TargetRef,
    property: String,
    accessor: PropertyAccessor,
    kind: ValueKind,
    /// 完整路径：起点、途经点、终点
    points: Vec<Value>,
    segments: Vec<Segment>,
    /// 当前段下标（逐帧向当前位置移动）
    segment: usize,
}

impl TweenDescriptor {
    /// 构建补间描述
    ///
    /// # 参数
    /// - `from`: 起点覆盖值；为 `None` 时读取属性当前值
    pub fn build(
        resolver: &AccessorResolver,
        target: &TargetRef,
        property: &str,
        to: TweenTo,
        from: Option<Value>,
        gradient_samples: usize,
    ) -> TweenResult<Self> {
        let accessor = resolver.resolve(target, property)?;
        let kind = accessor.kind();
        let interpolator = Interpolator::for_kind(kind, gradient_samples)?;

        let coerce = |value: Value| {
            value
                .coerce_to(kind)
                .map_err(|found| TweenError::TypeMismatch {
                    property: property.to_string(),
                    expected: kind,
                    found: found.kind(),
                })
        };

        let targets: Vec<Value> = match to {
            TweenTo::Value(value) => vec![coerce(value)?],
            TweenTo::Path(path) if path.is_empty() => {
                return Err(TweenError::EmptyPath {
                    property: property.to_string(),
                });
            }
            TweenTo::Path(path) => path.into_iter().map(coerce).collect::<TweenResult<_>>()?,
        };

        let override_start = from.is_some();
        let start = match from {
            Some(value) => coerce(value)?,
            None => match accessor.get() {
                Some(value) => coerce(value)?,
                None if !target.is_alive() => {
                    return Err(TweenError::DeadTarget {
                        object: target.id(),
                    });
                }
                None => {
                    return Err(TweenError::UnresolvableProperty {
                        object: target.id(),
                        property: property.to_string(),
                    });
                }
            },
        };

        let mut points = Vec::with_capacity(targets.len() + 1);
        points.push(start);
        points.extend(targets);

        let segments = points
            .windows(2)
            .map(|pair| {
                interpolator
                    .segment(&pair[0], &pair[1])
                    .ok_or_else(|| TweenError::TypeMismatch {
                        property: property.to_string(),
                        expected: kind,
                        found: pair[1].kind(),
                    })
            })
            .collect::<TweenResult<Vec<_>>>()?;

        if override_start {
            accessor.set(points[0].clone());
        }

        Ok(Self {
            target: target.clone(),
            property: property.to_string(),
            accessor,
            kind,
            points,
            segments,
            segment: 0,
        })
    }

    pub fn target(&self) -> &TargetRef {
        &self.target
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// 捕获的起点
    pub fn start(&self) -> &Value {
        &self.points[0]
    }

    /// 终点（路径的最后一个元素）
    pub fn end(&self) -> &Value {
        &self.points[self.points.len() - 1]
    }

    /// 完整路径
    pub fn points(&self) -> &[Value] {
        &self.points
    }

    /// 当前段下标
    pub fn segment_index(&self) -> usize {
        self.segment
    }

    /// 计算路径位置 `position` 处的值
    ///
    /// 位置均分到各段；超出 [0, 1] 时在首段或末段外插。
    pub fn sample(&mut self, position: f64) -> Value {
        let count = self.segments.len();
        let scaled = position * count as f64;
        let wanted = scaled.floor().clamp(0.0, (count - 1) as f64) as usize;

        self.segment = wanted;

        let local = scaled - self.segment as f64;
        self.segments[self.segment].sample(local)
    }

    /// 在 `position` 处取值并写入
    ///
    /// # 返回
    /// 目标已失效或写入被拒绝时返回 `false`，不修改任何状态之外的东西。
    pub fn write(&mut self, position: f64) -> bool {
        if !self.target.is_alive() {
            return false;
        }
        let value = self.sample(position);
        self.accessor.set(value)
    }

    /// 按结束状态吸附
    pub fn snap(&self, end_state: EndState) -> bool {
        match end_state {
            EndState::Start => self.accessor.set(self.start().clone()),
            EndState::End => self.accessor.set(self.end().clone()),
            EndState::Middle => false,
        }
    }

    /// 通过缓存的访问器读取当前值
    pub fn read(&self) -> Option<Value> {
        self.accessor.get()
    }
}
