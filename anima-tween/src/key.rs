//! # Key 模块
//!
//! 注册表的键。补间与定时器共享同一键空间：
//! 补间占用属性名，定时器占用保留的 `@timer_N` 名字空间。

use std::fmt;

use crate::accessor::ObjectId;

/// 键的第二部分
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    /// 属性补间
    Property(String),
    /// 定时器（目标内最小未使用编号）
    Timer(u32),
}

/// 注册表键：(目标, 属性或定时器)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TweenKey {
    pub object: ObjectId,
    pub slot: Slot,
}

impl TweenKey {
    /// 属性补间的键
    pub fn property(object: ObjectId, property: impl Into<String>) -> Self {
        Self {
            object,
            slot: Slot::Property(property.into()),
        }
    }

    /// 定时器的键
    pub fn timer(object: ObjectId, id: u32) -> Self {
        Self {
            object,
            slot: Slot::Timer(id),
        }
    }

    /// 属性名（定时器返回 `None`）
    pub fn property_name(&self) -> Option<&str> {
        match &self.slot {
            Slot::Property(name) => Some(name),
            Slot::Timer(_) => None,
        }
    }

    /// 定时器编号
    pub fn timer_id(&self) -> Option<u32> {
        match self.slot {
            Slot::Timer(id) => Some(id),
            Slot::Property(_) => None,
        }
    }

    pub fn is_timer(&self) -> bool {
        matches!(self.slot, Slot::Timer(_))
    }
}

impl fmt::Display for TweenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Slot::Property(name) => write!(f, "{}:{}", self.object, name),
            Slot::Timer(id) => write!(f, "{}:@timer_{}", self.object, id),
        }
    }
}
