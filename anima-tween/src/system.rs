//! # System 模块
//!
//! 补间注册表与控制接口。
//!
//! ```rust,ignore
//! let mut tweener = Tweener::new();
//! let id = tweener.register(&sprite);
//! tweener.animate(id, "alpha", 0.0f32, 0.3)?;
//! // 每帧
//! for event in tweener.tick(dt) { ... }
//! ```
//!
//! ## 不变量
//!
//! - 每个键（目标, 属性）最多一个补间；再次 `animate` 会静默替换旧补间
//! - `complete` / `stop` / `cancel` 同步移除条目，之后的帧不会再写入
//! - 条目在任何结束路径上都只移除一次；回调在移除之后执行，可以继续创建补间
//! - 每帧先回收失效目标，再按创建顺序推进条目；帧内新建的条目从下一帧开始推进
//! - 目标在帧内失效时，其条目被回收而不是完成，回调不会执行

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::accessor::{AccessorResolver, Animatable, ObjectId, TargetRef, address_of};
use crate::conductor::{Conductor, ConductorState, Direction, EndState, Playback};
use crate::config::TweenerConfig;
use crate::easing::Easing;
use crate::error::{TweenError, TweenResult};
use crate::key::TweenKey;
use crate::timer::Timer;
use crate::tween::TweenDescriptor;
use crate::value::{TweenTo, Value, ValueKind};

/// 完成回调
///
/// 回调拿到 `&mut Tweener`，可以在其中启动下一段补间。
pub type Callback = Box<dyn FnMut(&mut Tweener)>;

/// `animate_with` 的可选参数
///
/// 未设置的缓动与播放模式取自配置。
#[derive(Default)]
pub struct TweenOptions {
    easing: Option<Easing>,
    playback: Option<Playback>,
    from: Option<Value>,
    on_complete: Option<Callback>,
}

impl TweenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置缓动
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// 设置播放模式
    pub fn playback(mut self, playback: Playback) -> Self {
        self.playback = Some(playback);
        self
    }

    /// 起点覆盖值：通过校验后立即写入目标
    pub fn from(mut self, value: impl Into<Value>) -> Self {
        self.from = Some(value.into());
        self
    }

    /// 完成回调
    pub fn on_complete(mut self, callback: impl FnMut(&mut Tweener) + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

impl std::fmt::Debug for TweenOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenOptions")
            .field("easing", &self.easing)
            .field("playback", &self.playback)
            .field("from", &self.from)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// 注册表事件
#[derive(Debug, Clone, PartialEq)]
pub enum TweenEvent {
    /// 补间已创建
    Started(TweenKey),
    /// 补间自然结束
    Completed(TweenKey),
    /// 补间被 complete / stop / cancel 终止
    Terminated { key: TweenKey, end_state: EndState },
    /// 目标失效，条目被回收（不触发回调）
    Reaped(TweenKey),
    /// 定时器触发
    TimerFired { object: ObjectId, id: u32 },
    /// 定时器被外部结束
    TimerStopped { object: ObjectId, id: u32 },
}

/// 补间快照（用于查询与调试）
#[derive(Debug, Clone, PartialEq)]
pub struct TweenInfo {
    pub kind: ValueKind,
    pub start: Value,
    pub end: Value,
    /// 路径点数量（含起点与终点）
    pub points: usize,
    pub easing: Easing,
    pub playback: Playback,
    pub duration: f32,
    /// 当前趟的线性进度
    pub progress: f32,
    pub direction: Direction,
    pub loops: u64,
    pub state: ConductorState,
}

/// 运行中的补间
struct ActiveTween {
    descriptor: TweenDescriptor,
    conductor: Conductor,
    on_complete: Option<Callback>,
}

enum EntryKind {
    Tween(Box<ActiveTween>),
    Timer(Timer),
}

/// 注册表条目
struct Entry {
    key: TweenKey,
    kind: EntryKind,
}

/// 补间注册表
///
/// 拥有 键 -> 补间 映射，是引擎唯一的可变共享状态。
/// 目标对象只以 `Weak` 引用保存，注册表不延长其生命周期。
pub struct Tweener {
    config: TweenerConfig,
    resolver: AccessorResolver,
    /// 已注册的目标（ObjectId -> 非拥有引用）
    objects: HashMap<ObjectId, TargetRef>,
    /// 对象地址 -> ObjectId（重复注册查找）
    addresses: HashMap<usize, ObjectId>,
    /// 创建序号 -> 条目；序号递增，遍历顺序即创建顺序
    entries: BTreeMap<u64, Entry>,
    /// 键 -> 创建序号
    index: HashMap<TweenKey, u64>,
    next_object_id: u64,
    next_serial: u64,
    /// 待返回的事件
    events: Vec<TweenEvent>,
}

impl Default for Tweener {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Tweener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tweener")
            .field("objects", &self.objects.len())
            .field("tweens", &self.active_count())
            .field("timers", &self.timer_count())
            .finish()
    }
}

impl Tweener {
    /// 使用默认配置创建
    pub fn new() -> Self {
        Self::with_config(TweenerConfig::default())
    }

    /// 使用指定配置创建
    pub fn with_config(config: TweenerConfig) -> Self {
        Self {
            config,
            resolver: AccessorResolver::new(),
            objects: HashMap::new(),
            addresses: HashMap::new(),
            entries: BTreeMap::new(),
            index: HashMap::new(),
            next_object_id: 1,
            next_serial: 1,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &TweenerConfig {
        &self.config
    }

    /// 访问器解析器（注册字段或自定义策略）
    pub fn resolver_mut(&mut self) -> &mut AccessorResolver {
        &mut self.resolver
    }

    // ========== 条目表 ==========

    /// 登记条目，同键的旧条目被移除
    fn insert_entry(&mut self, key: TweenKey, kind: EntryKind) -> Option<Entry> {
        let replaced = self.remove_key(&key);
        let serial = self.next_serial;
        self.next_serial += 1;
        self.index.insert(key.clone(), serial);
        self.entries.insert(serial, Entry { key, kind });
        replaced
    }

    fn remove_key(&mut self, key: &TweenKey) -> Option<Entry> {
        let serial = self.index.remove(key)?;
        self.entries.remove(&serial)
    }

    fn remove_serial(&mut self, serial: u64) -> Option<Entry> {
        let entry = self.entries.remove(&serial)?;
        self.index.remove(&entry.key);
        Some(entry)
    }

    /// 按创建顺序收集满足条件的条目序号
    fn serials(&self, filter: impl Fn(&TweenKey) -> bool) -> Vec<u64> {
        self.entries
            .iter()
            .filter(|(_, entry)| filter(&entry.key))
            .map(|(serial, _)| *serial)
            .collect()
    }

    // ========== 对象管理 ==========

    /// 注册目标对象
    ///
    /// 只保存弱引用。同一个存活对象重复注册返回相同的 ID。
    pub fn register<T: Animatable>(&mut self, object: &Rc<T>) -> ObjectId {
        let addr = address_of(object);
        if let Some(id) = self.addresses.get(&addr)
            && self.objects.get(id).is_some_and(|t| t.points_to(object))
        {
            return *id;
        }

        let id = ObjectId::new(self.next_object_id);
        self.next_object_id += 1;
        let target = TargetRef::new(id, object);
        debug!(object = %id, type_name = target.type_name(), "注册目标对象");
        self.objects.insert(id, target);
        self.addresses.insert(addr, id);
        id
    }

    /// 移除对象记录（地址表只在仍指向该对象时清理）
    fn forget_object(&mut self, object: ObjectId) -> bool {
        let Some(target) = self.objects.remove(&object) else {
            return false;
        };
        if self.addresses.get(&target.addr()) == Some(&object) {
            self.addresses.remove(&target.addr());
        }
        true
    }

    /// 注销目标对象，静默移除其全部补间与定时器
    pub fn unregister(&mut self, object: ObjectId) -> bool {
        let removed = self.forget_object(object);
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.key.object != object);
        self.index.retain(|key, _| key.object != object);
        if removed {
            debug!(object = %object, entries = before - self.entries.len(), "注销目标对象");
        }
        removed
    }

    /// 对象是否已注册且存活
    pub fn is_alive(&self, object: ObjectId) -> bool {
        self.objects.get(&object).is_some_and(TargetRef::is_alive)
    }

    /// 已注册对象数量
    pub fn registered_count(&self) -> usize {
        self.objects.len()
    }

    fn live_target(&self, object: ObjectId) -> TweenResult<TargetRef> {
        match self.objects.get(&object) {
            Some(target) if target.is_alive() => Ok(target.clone()),
            _ => Err(TweenError::DeadTarget { object }),
        }
    }

    // ========== 补间 ==========

    /// 启动补间（缓动与播放模式取配置默认值）
    pub fn animate(
        &mut self,
        object: ObjectId,
        property: &str,
        to: impl Into<TweenTo>,
        duration: f32,
    ) -> TweenResult<()> {
        self.animate_with(object, property, to, duration, TweenOptions::default())
    }

    /// 启动补间
    ///
    /// 同一键上已有的补间被静默替换：不触发其回调，也不吸附其值。
    /// 失败时不登记任何东西，已有补间保持不变。
    pub fn animate_with(
        &mut self,
        object: ObjectId,
        property: &str,
        to: impl Into<TweenTo>,
        duration: f32,
        options: TweenOptions,
    ) -> TweenResult<()> {
        let result = self.start_tween(object, property, to.into(), duration, options);
        if let Err(e) = &result {
            warn!(object = %object, property, error = %e, "补间创建失败");
        }
        result
    }

    fn start_tween(
        &mut self,
        object: ObjectId,
        property: &str,
        to: TweenTo,
        duration: f32,
        options: TweenOptions,
    ) -> TweenResult<()> {
        let target = self.live_target(object)?;
        let TweenOptions {
            easing,
            playback,
            from,
            on_complete,
        } = options;

        let descriptor = TweenDescriptor::build(
            &self.resolver,
            &target,
            property,
            to,
            from,
            self.config.gradient_samples,
        )?;
        let conductor = Conductor::new(
            duration,
            easing.unwrap_or(self.config.default_easing),
            playback.unwrap_or(self.config.default_playback),
        );

        let key = TweenKey::property(object, property);
        debug!(
            key = %key,
            kind = %descriptor.kind(),
            points = descriptor.points().len(),
            duration,
            "补间开始"
        );
        let replaced = self.insert_entry(
            key.clone(),
            EntryKind::Tween(Box::new(ActiveTween {
                descriptor,
                conductor,
                on_complete,
            })),
        );
        if replaced.is_some() {
            debug!(key = %key, "替换已有补间");
        }
        self.events.push(TweenEvent::Started(key));
        Ok(())
    }

    /// 强制结束补间
    ///
    /// # 参数
    /// - `property`: 为 `None` 时结束该目标的全部补间（不含定时器）
    /// - `with_callback`: 是否执行完成回调
    /// - `end_state`: 吸附到起点、终点，或保留当前值
    ///
    /// # 返回
    /// 被结束的补间数量
    pub fn complete(
        &mut self,
        object: ObjectId,
        property: Option<&str>,
        with_callback: bool,
        end_state: EndState,
    ) -> usize {
        if !self.is_alive(object) {
            self.reap();
            return 0;
        }

        let serials = self.serials(|key| {
            key.object == object
                && !key.is_timer()
                && property.is_none_or(|name| key.property_name() == Some(name))
        });
        self.terminate(serials, with_callback, end_state)
    }

    /// 停在当前值，不执行回调
    pub fn stop(&mut self, object: ObjectId, property: Option<&str>) -> usize {
        self.complete(object, property, false, EndState::Middle)
    }

    /// 回到起点，不执行回调
    pub fn cancel(&mut self, object: ObjectId, property: Option<&str>) -> usize {
        self.complete(object, property, false, EndState::Start)
    }

    /// 结束所有目标的全部补间
    pub fn complete_all(&mut self, with_callback: bool, end_state: EndState) -> usize {
        self.reap();
        let serials = self.serials(|key| !key.is_timer());
        self.terminate(serials, with_callback, end_state)
    }

    fn terminate(&mut self, serials: Vec<u64>, with_callback: bool, end_state: EndState) -> usize {
        let mut count = 0;
        for serial in serials {
            // 先前的回调可能已经替换或移除了该条目
            let Some(Entry {
                key,
                kind: EntryKind::Tween(mut tween),
            }) = self.remove_serial(serial)
            else {
                continue;
            };

            tween.conductor.cancel();
            tween.descriptor.snap(end_state);
            debug!(key = %key, ?end_state, with_callback, "补间被终止");
            self.events.push(TweenEvent::Terminated { key, end_state });
            count += 1;

            if with_callback && let Some(mut callback) = tween.on_complete.take() {
                callback(self);
            }
        }
        count
    }

    // ========== 定时器 ==========

    /// 延时回调
    ///
    /// # 返回
    /// 定时器编号：该目标最小的未使用非负整数
    pub fn after(
        &mut self,
        object: ObjectId,
        delay: f32,
        callback: impl FnMut(&mut Tweener) + 'static,
        repeat: bool,
    ) -> TweenResult<u32> {
        self.live_target(object)?;

        let mut id = 0;
        while self.index.contains_key(&TweenKey::timer(object, id)) {
            id += 1;
        }

        let key = TweenKey::timer(object, id);
        debug!(key = %key, delay, repeat, "定时器开始");
        self.insert_entry(
            key,
            EntryKind::Timer(Timer::new(delay, repeat, Box::new(callback))),
        );
        Ok(id)
    }

    /// 结束定时器
    ///
    /// # 参数
    /// - `id`: 为 `None` 时结束该目标的全部定时器
    /// - `with_callback`: 是否立即执行一次回调
    pub fn complete_timer(
        &mut self,
        object: ObjectId,
        id: Option<u32>,
        with_callback: bool,
    ) -> usize {
        let serials = self.serials(|key| {
            key.object == object
                && key.is_timer()
                && id.is_none_or(|id| key.timer_id() == Some(id))
        });

        let mut count = 0;
        for serial in serials {
            let Some(Entry {
                key,
                kind: EntryKind::Timer(timer),
            }) = self.remove_serial(serial)
            else {
                continue;
            };

            debug!(key = %key, with_callback, "定时器被结束");
            if let Some(id) = key.timer_id() {
                self.events.push(TweenEvent::TimerStopped { object, id });
            }
            count += 1;

            if with_callback && let Some(mut callback) = timer.callback {
                callback(self);
            }
        }
        count
    }

    /// 结束定时器，不执行回调
    pub fn stop_timer(&mut self, object: ObjectId, id: Option<u32>) -> usize {
        self.complete_timer(object, id, false)
    }

    // ========== 每帧更新 ==========

    /// 推进一帧
    ///
    /// # 返回
    /// 自上次调用以来产生的事件
    pub fn tick(&mut self, dt: f32) -> Vec<TweenEvent> {
        let dt = self.config.clamp_delta(dt);
        self.reap();

        // 帧内新建的条目序号不小于 `end`，留到下一帧
        let end = self.next_serial;
        trace!(entries = self.entries.len(), dt, "tick");
        let mut cursor = 0;
        while let Some(serial) = self.entries.range(cursor..end).next().map(|(s, _)| *s) {
            cursor = serial + 1;
            self.step(serial, dt);
        }

        std::mem::take(&mut self.events)
    }

    fn step(&mut self, serial: u64, dt: f32) {
        let Some(object) = self.entries.get(&serial).map(|e| e.key.object) else {
            return;
        };
        // 目标可能在本帧先前的回调中失效
        if !self.is_alive(object) {
            self.reap();
            return;
        }
        let Some(Entry { key, kind }) = self.entries.get_mut(&serial) else {
            return;
        };

        match kind {
            EntryKind::Tween(tween) => {
                if let Some(position) = tween.conductor.advance(dt) {
                    if tween.descriptor.write(position) {
                        trace!(key = %key, position, "写入");
                    } else {
                        trace!(key = %key, "写入被拒绝");
                    }
                }
                if !tween.conductor.is_finished() {
                    return;
                }
            }
            EntryKind::Timer(timer) => {
                if !timer.advance(dt) {
                    return;
                }
                if timer.repeat() {
                    trace!(key = %key, interval = timer.interval(), "重复定时器触发");
                    let callback = timer.callback.take();
                    let fired = key.clone();
                    self.fire_repeating(&fired, serial, callback);
                    return;
                }
            }
        }

        let Some(Entry { key, kind }) = self.remove_serial(serial) else {
            return;
        };
        match kind {
            EntryKind::Tween(tween) => {
                debug!(key = %key, "补间完成");
                self.events.push(TweenEvent::Completed(key));
                if let Some(mut callback) = tween.on_complete {
                    callback(self);
                }
            }
            EntryKind::Timer(timer) => {
                debug!(key = %key, "定时器触发");
                if let Some(id) = key.timer_id() {
                    self.events.push(TweenEvent::TimerFired {
                        object: key.object,
                        id,
                    });
                }
                if let Some(mut callback) = timer.callback {
                    callback(self);
                }
            }
        }
    }

    /// 执行重复定时器的回调，之后若定时器仍在则放回回调
    fn fire_repeating(&mut self, key: &TweenKey, serial: u64, callback: Option<Callback>) {
        if let Some(id) = key.timer_id() {
            self.events.push(TweenEvent::TimerFired {
                object: key.object,
                id,
            });
        }

        let Some(mut callback) = callback else {
            return;
        };
        callback(self);

        if let Some(entry) = self.entries.get_mut(&serial)
            && let EntryKind::Timer(timer) = &mut entry.kind
            && timer.callback.is_none()
        {
            timer.callback = Some(callback);
        }
    }

    /// 回收失效目标及其全部条目（不触发回调）
    ///
    /// 每帧开始时自动执行；帧内推进到失效目标的条目时也会执行。
    ///
    /// # 返回
    /// 被回收的条目数量
    pub fn reap(&mut self) -> usize {
        let dead: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|(_, target)| !target.is_alive())
            .map(|(id, _)| *id)
            .collect();
        if dead.is_empty() {
            return 0;
        }

        for id in &dead {
            self.forget_object(*id);
        }

        let serials = self.serials(|key| dead.contains(&key.object));
        for serial in &serials {
            if let Some(Entry { key, .. }) = self.remove_serial(*serial) {
                debug!(key = %key, "目标已失效，回收条目");
                self.events.push(TweenEvent::Reaped(key));
            }
        }
        serials.len()
    }

    /// 取出尚未返回的事件
    pub fn drain_events(&mut self) -> Vec<TweenEvent> {
        std::mem::take(&mut self.events)
    }

    /// 静默移除所有补间与定时器（保留已注册的对象）
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.events.clear();
    }

    // ========== 查询 ==========

    /// 是否有补间（`property` 为 `None` 时检查该目标的任意属性）
    pub fn is_tweening(&self, object: ObjectId, property: Option<&str>) -> bool {
        match property {
            Some(name) => self.index.contains_key(&TweenKey::property(object, name)),
            None => self
                .index
                .keys()
                .any(|key| key.object == object && !key.is_timer()),
        }
    }

    /// 补间快照
    pub fn tween_info(&self, object: ObjectId, property: &str) -> Option<TweenInfo> {
        let serial = self.index.get(&TweenKey::property(object, property))?;
        let EntryKind::Tween(tween) = &self.entries.get(serial)?.kind else {
            return None;
        };
        let descriptor = &tween.descriptor;
        let conductor = &tween.conductor;
        Some(TweenInfo {
            kind: descriptor.kind(),
            start: descriptor.start().clone(),
            end: descriptor.end().clone(),
            points: descriptor.points().len(),
            easing: conductor.easing(),
            playback: conductor.playback(),
            duration: conductor.duration(),
            progress: conductor.progress(),
            direction: conductor.direction(),
            loops: conductor.loops(),
            state: conductor.state(),
        })
    }

    /// 补间数量
    pub fn active_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e.kind, EntryKind::Tween(_)))
            .count()
    }

    /// 定时器数量
    pub fn timer_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e.kind, EntryKind::Timer(_)))
            .count()
    }

    /// 通过解析器读取属性当前值
    pub fn read_property(&self, object: ObjectId, property: &str) -> Option<Value> {
        let target = self.objects.get(&object)?;
        self.resolver.resolve(target, property).ok()?.get()
    }
}
