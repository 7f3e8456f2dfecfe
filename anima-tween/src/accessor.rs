//! # Accessor 模块
//!
//! 属性访问器的解析与缓存。
//!
//! ## 核心概念
//!
//! - `ObjectId`: 由 `Tweener` 在对象注册时分配的唯一标识符
//! - `TargetRef`: 对目标对象的非拥有引用（`Weak`），附带类型信息
//! - `Animatable`: 可补间对象接口，同时提供存活判定
//! - `PropertyAccessor`: 绑定到单个对象单个属性的 getter/setter
//! - `AccessorResolver`: 把 (目标, 属性名) 解析为访问器
//!
//! ## 解析顺序
//!
//! 1. 强类型字段表（`register_field`，按 `TypeId` 查找）
//! 2. 自定义策略（`ResolveStrategy`，按添加顺序）
//! 3. `Animatable` 动态读写
//!
//! 访问器只在补间创建时解析一次。目标失效后，访问器的读取返回 `None`、
//! 写入返回 `false`，不会 panic。

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::error::{TweenError, TweenResult};
use crate::value::{AnimValue, Value, ValueKind};

/// 对象唯一标识符
///
/// 由 `Tweener` 在对象注册时分配，同一个 `Tweener` 内不会重复。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    /// 创建对象 ID（仅供 Tweener 内部使用）
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

/// 可补间对象接口
///
/// 所有方法都有默认实现：只通过字段表或自定义策略补间的类型
/// 写一个空的 `impl Animatable for T {}` 即可。
///
/// 对象通过 `&self` 被写入，内部状态需要 `Cell` / `RefCell`。
///
/// ## 实现示例
///
/// ```rust,ignore
/// struct Sprite {
///     alpha: Cell<f32>,
/// }
///
/// impl Animatable for Sprite {
///     fn get_property(&self, name: &str) -> Option<Value> {
///         match name {
///             "alpha" => Some(Value::Float(self.alpha.get())),
///             _ => None,
///         }
///     }
///
///     fn set_property(&self, name: &str, value: Value) -> bool {
///         match (name, value) {
///             ("alpha", Value::Float(v)) => {
///                 self.alpha.set(v);
///                 true
///             }
///             _ => false,
///         }
///     }
/// }
/// ```
pub trait Animatable: 'static {
    /// 读取属性的当前值
    ///
    /// 返回 `None` 表示属性不存在。返回值的类型即属性的类型。
    fn get_property(&self, _name: &str) -> Option<Value> {
        None
    }

    /// 写入属性
    ///
    /// # 返回
    /// - `true`: 写入成功
    /// - `false`: 属性不存在或类型不符
    fn set_property(&self, _name: &str, _value: Value) -> bool {
        false
    }

    /// 所有可补间属性（用于调试）
    fn property_list(&self) -> Vec<String> {
        Vec::new()
    }

    /// 写入是否仍有意义
    ///
    /// 对象被宿主逻辑销毁但 `Rc` 仍被持有时返回 `false`。
    fn is_alive(&self) -> bool {
        true
    }
}

/// 对目标对象的非拥有引用
#[derive(Clone)]
pub struct TargetRef {
    id: ObjectId,
    type_id: TypeId,
    type_name: &'static str,
    addr: usize,
    any: Weak<dyn Any>,
    animatable: Weak<dyn Animatable>,
}

impl TargetRef {
    /// 创建目标引用
    pub(crate) fn new<T: Animatable>(id: ObjectId, object: &Rc<T>) -> Self {
        let weak: Weak<T> = Rc::downgrade(object);
        Self {
            id,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            addr: address_of(object),
            any: weak.clone(),
            animatable: weak,
        }
    }

    /// 对象 ID
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// 对象的具体类型
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// 类型名（用于日志）
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 对象地址（注册表用它做重复注册查找）
    pub(crate) fn addr(&self) -> usize {
        self.addr
    }

    /// 是否指向同一个对象
    pub(crate) fn points_to<T: Animatable>(&self, object: &Rc<T>) -> bool {
        self.addr == address_of(object) && self.is_alive()
    }

    /// 目标是否存活
    pub fn is_alive(&self) -> bool {
        self.animatable
            .upgrade()
            .is_some_and(|object| object.is_alive())
    }

    /// 获取 `Any` 视图（用于向下转型）
    pub fn upgrade_any(&self) -> Option<Rc<dyn Any>> {
        self.any.upgrade()
    }

    /// 获取 `Animatable` 视图
    pub fn upgrade(&self) -> Option<Rc<dyn Animatable>> {
        self.animatable.upgrade()
    }
}

/// `Rc` 指向的对象地址
pub(crate) fn address_of<T>(object: &Rc<T>) -> usize {
    Rc::as_ptr(object) as *const () as usize
}

impl fmt::Debug for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetRef")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("alive", &self.is_alive())
            .finish()
    }
}

type Getter = Box<dyn Fn() -> Option<Value>>;
type Setter = Box<dyn Fn(Value) -> bool>;

/// 属性访问器
///
/// 绑定到单个对象单个属性的 getter/setter，附带属性类型。
pub struct PropertyAccessor {
    kind: ValueKind,
    getter: Getter,
    setter: Setter,
}

impl PropertyAccessor {
    /// 创建访问器
    pub fn new(
        kind: ValueKind,
        getter: impl Fn() -> Option<Value> + 'static,
        setter: impl Fn(Value) -> bool + 'static,
    ) -> Self {
        Self {
            kind,
            getter: Box::new(getter),
            setter: Box::new(setter),
        }
    }

    /// 属性类型
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// 读取当前值
    pub fn get(&self) -> Option<Value> {
        (self.getter)()
    }

    /// 写入新值
    pub fn set(&self, value: Value) -> bool {
        (self.setter)(value)
    }

    /// 为访问器加上存活检查：目标失效后读写都成为空操作
    fn guarded(self, target: &TargetRef) -> Self {
        let Self {
            kind,
            getter,
            setter,
        } = self;
        let read_target = target.clone();
        let write_target = target.clone();
        Self {
            kind,
            getter: Box::new(move || {
                if read_target.is_alive() {
                    getter()
                } else {
                    None
                }
            }),
            setter: Box::new(move |value| write_target.is_alive() && setter(value)),
        }
    }
}

impl fmt::Debug for PropertyAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAccessor")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// 自定义解析策略
///
/// 用于宿主特有的属性形态（例如材质参数、别名属性）。
pub trait ResolveStrategy {
    /// 策略名（用于日志）
    fn name(&self) -> &str;

    /// 尝试解析，无法处理时返回 `None`
    fn resolve(&self, target: &TargetRef, property: &str) -> Option<PropertyAccessor>;
}

type FieldGet = Rc<dyn Fn(&dyn Any) -> Option<Value>>;
type FieldSet = Rc<dyn Fn(&dyn Any, Value) -> bool>;

/// 字段表中的一项
struct FieldEntry {
    kind: ValueKind,
    get: FieldGet,
    set: FieldSet,
}

/// 访问器解析器
#[derive(Default)]
pub struct AccessorResolver {
    /// 强类型字段表：(类型, 属性名) -> 读写函数
    fields: HashMap<(TypeId, String), FieldEntry>,
    /// 自定义策略
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl fmt::Debug for AccessorResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorResolver")
            .field("fields", &self.fields.len())
            .field(
                "strategies",
                &self.strategies.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl AccessorResolver {
    /// 创建空解析器
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册强类型字段
    ///
    /// # 示例
    /// ```rust,ignore
    /// resolver.register_field::<Sprite, Vec2>(
    ///     "position",
    ///     |s| s.position.get(),
    ///     |s, v| s.position.set(v),
    /// );
    /// ```
    pub fn register_field<T: 'static, V: AnimValue>(
        &mut self,
        name: impl Into<String>,
        getter: impl Fn(&T) -> V + 'static,
        setter: impl Fn(&T, V) + 'static,
    ) {
        let get: FieldGet = Rc::new(move |object: &dyn Any| {
            object
                .downcast_ref::<T>()
                .map(|object| getter(object).into_value())
        });
        let set: FieldSet = Rc::new(move |object: &dyn Any, value: Value| {
            match (object.downcast_ref::<T>(), V::from_value(&value)) {
                (Some(object), Some(value)) => {
                    setter(object, value);
                    true
                }
                _ => false,
            }
        });
        self.fields.insert(
            (TypeId::of::<T>(), name.into()),
            FieldEntry {
                kind: V::KIND,
                get,
                set,
            },
        );
    }

    /// 添加自定义策略（在字段表之后、`Animatable` 之前查询）
    pub fn add_strategy(&mut self, strategy: impl ResolveStrategy + 'static) {
        self.strategies.push(Box::new(strategy));
    }

    /// 解析访问器
    ///
    /// # 错误
    /// - `DeadTarget`: 目标已失效
    /// - `UnresolvableProperty`: 所有途径都无法解析
    pub fn resolve(&self, target: &TargetRef, property: &str) -> TweenResult<PropertyAccessor> {
        if !target.is_alive() {
            return Err(TweenError::DeadTarget {
                object: target.id(),
            });
        }

        if let Some(accessor) = self.resolve_field(target, property) {
            trace!(object = %target.id(), property, "通过字段表解析");
            return Ok(accessor.guarded(target));
        }

        for strategy in &self.strategies {
            if let Some(accessor) = strategy.resolve(target, property) {
                trace!(object = %target.id(), property, strategy = strategy.name(), "通过自定义策略解析");
                return Ok(accessor.guarded(target));
            }
        }

        if let Some(accessor) = resolve_dynamic(target, property) {
            trace!(object = %target.id(), property, "通过 Animatable 解析");
            return Ok(accessor.guarded(target));
        }

        Err(TweenError::UnresolvableProperty {
            object: target.id(),
            property: property.to_string(),
        })
    }

    fn resolve_field(&self, target: &TargetRef, property: &str) -> Option<PropertyAccessor> {
        let entry = self.fields.get(&(target.type_id(), property.to_string()))?;

        let read = target.clone();
        let write = target.clone();
        let get = entry.get.clone();
        let set = entry.set.clone();
        Some(PropertyAccessor::new(
            entry.kind,
            move || read.upgrade_any().and_then(|object| get(object.as_ref())),
            move |value| {
                write
                    .upgrade_any()
                    .is_some_and(|object| set(object.as_ref(), value))
            },
        ))
    }
}

/// 通过 `Animatable` 读写解析；属性类型取自当前值
fn resolve_dynamic(target: &TargetRef, property: &str) -> Option<PropertyAccessor> {
    let object = target.upgrade()?;
    let kind = object.get_property(property)?.kind();

    let read = target.clone();
    let write = target.clone();
    let read_name = property.to_string();
    let write_name = property.to_string();
    Some(PropertyAccessor::new(
        kind,
        move || read.upgrade()?.get_property(&read_name),
        move |value| {
            write
                .upgrade()
                .is_some_and(|object| object.set_property(&write_name, value))
        },
    ))
}

/// 动态属性表
///
/// 不需要静态类型的宿主可以直接使用：属性名 -> `Value`，
/// 写入时要求类型与已有值一致。
#[derive(Debug)]
pub struct PropertyBag {
    values: RefCell<HashMap<String, Value>>,
    alive: Cell<bool>,
}

impl Default for PropertyBag {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyBag {
    /// 创建空属性表
    pub fn new() -> Self {
        Self {
            values: RefCell::new(HashMap::new()),
            alive: Cell::new(true),
        }
    }

    /// 添加属性（构建器）
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// 添加或覆盖属性（不做类型检查）
    pub fn insert(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.borrow_mut().insert(name.into(), value.into());
    }

    /// 读取属性
    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.borrow().get(name).cloned()
    }

    /// 标记为已销毁
    pub fn destroy(&self) {
        self.alive.set(false);
    }
}

impl Animatable for PropertyBag {
    fn get_property(&self, name: &str) -> Option<Value> {
        self.get(name)
    }

    fn set_property(&self, name: &str, value: Value) -> bool {
        let mut values = self.values.borrow_mut();
        match values.get_mut(name) {
            Some(slot) if slot.kind() == value.kind() => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    fn property_list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    fn is_alive(&self) -> bool {
        self.alive.get()
    }
}
