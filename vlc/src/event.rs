// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! Event managers and event dispatch.
//!
//! Native event managers invoke a plain C callback. The binding attaches a
//! single trampoline per `(event manager, event type)` pair and keeps the
//! Rust handlers in its own table. When the native library fires an event, the
//! trampoline converts it into an owned [`Event`], resolves the owning wrapper
//! through the registry and calls the handlers with no lock held, so handlers
//! may freely call back into the binding (including releasing the emitter).

use std::{
    collections::BTreeMap,
    ffi::{CStr, c_void},
    fmt,
    panic::AssertUnwindSafe,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use tracing::{error, trace, warn};

use crate::{
    Error, EventType, Meta, NativeHandle, ObjectKind, Result, State,
    object::{Lifecycle, Liveness},
    registry::{Registry, RegistryInner, WrapperId},
};

/// Boxed event handler.
pub(crate) type HandlerFn = Arc<dyn Fn(&Event) + Send + Sync>;

/// Identifies one handler attached with [`EventManager::event_attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

/// Event specific data.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// The event carries no data.
    None,
    /// `None` if the native library reported a meta type unknown to the binding.
    MetaChanged(Option<Meta>),
    SubItemAdded(Option<NativeHandle>),
    DurationChanged(i64),
    ParsedChanged(i32),
    StateChanged(State),
    Buffering(f32),
    PositionChanged(f32),
    TimeChanged(i64),
    TitleChanged(i32),
    SeekableChanged(bool),
    PausableChanged(bool),
    LengthChanged(i64),
    SnapshotTaken(Option<String>),
    MediaChanged(Option<NativeHandle>),
    /// Item added to, or removed from, a media list (or media list view).
    ListItem {
        item: Option<NativeHandle>,
        index: i32,
    },
}

/// An event emitted by a native object.
///
/// Handles in the payload are informational: they are not retained on behalf
/// of the handler. Use [`Registry::lookup`] or the owning wrapper's accessors
/// to get a counted reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventType,
    /// Native object that emitted the event.
    pub source: Option<NativeHandle>,
    pub payload: EventPayload,
}

impl Event {
    /// Converts a native event into an owned message.
    ///
    /// # Safety
    ///
    /// `raw` must be a valid event as passed by libvlc to an event callback:
    /// its union member must match its type.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownEnumValue`] if the event type, or a state carried by
    /// the event, is unknown.
    pub unsafe fn from_raw(raw: &vlc_sys::libvlc_event_t) -> Result<Self> {
        let kind = EventType::try_from(raw.type_)?;
        let u = &raw.u;
        let payload = unsafe {
            match kind {
                EventType::MediaMetaChanged => EventPayload::MetaChanged(
                    Meta::try_from(u.media_meta_changed.meta_type).ok(),
                ),
                EventType::MediaSubItemAdded => EventPayload::SubItemAdded(
                    NativeHandle::from_ptr(u.media_subitem_added.new_child),
                ),
                EventType::MediaDurationChanged => {
                    EventPayload::DurationChanged(u.media_duration_changed.new_duration)
                }
                EventType::MediaParsedChanged => {
                    EventPayload::ParsedChanged(u.media_parsed_changed.new_status)
                }
                EventType::MediaStateChanged => EventPayload::StateChanged(State::try_from(
                    u.media_state_changed.new_state,
                )?),
                EventType::MediaPlayerBuffering => {
                    EventPayload::Buffering(u.media_player_buffering.new_cache)
                }
                EventType::MediaPlayerPositionChanged => {
                    EventPayload::PositionChanged(u.media_player_position_changed.new_position)
                }
                EventType::MediaPlayerTimeChanged => {
                    EventPayload::TimeChanged(u.media_player_time_changed.new_time)
                }
                EventType::MediaPlayerTitleChanged => {
                    EventPayload::TitleChanged(u.media_player_title_changed.new_title)
                }
                EventType::MediaPlayerSeekableChanged => EventPayload::SeekableChanged(
                    u.media_player_seekable_changed.new_seekable != 0,
                ),
                EventType::MediaPlayerPausableChanged => EventPayload::PausableChanged(
                    u.media_player_pausable_changed.new_pausable != 0,
                ),
                EventType::MediaPlayerLengthChanged => {
                    EventPayload::LengthChanged(u.media_player_length_changed.new_length)
                }
                EventType::MediaPlayerSnapshotTaken => {
                    let filename = u.media_player_snapshot_taken.psz_filename;
                    EventPayload::SnapshotTaken(if filename.is_null() {
                        None
                    } else {
                        Some(CStr::from_ptr(filename).to_string_lossy().into_owned())
                    })
                }
                EventType::MediaPlayerMediaChanged => EventPayload::MediaChanged(
                    NativeHandle::from_ptr(u.media_player_media_changed.new_media),
                ),
                EventType::MediaListItemAdded
                | EventType::MediaListWillAddItem
                | EventType::MediaListItemDeleted
                | EventType::MediaListWillDeleteItem
                | EventType::MediaListViewItemAdded
                | EventType::MediaListViewWillAddItem
                | EventType::MediaListViewItemDeleted
                | EventType::MediaListViewWillDeleteItem => EventPayload::ListItem {
                    item: NativeHandle::from_ptr(u.media_list_item_added.item),
                    index: u.media_list_item_added.index,
                },
                _ => EventPayload::None,
            }
        };
        Ok(Self {
            kind,
            source: NativeHandle::from_ptr(raw.p_obj),
            payload,
        })
    }
}

/// User data registered with every native attachment.
///
/// Identifies the owner by wrapper id rather than by pointer, so a callback
/// racing with the owner's teardown resolves to nothing instead of to freed
/// memory.
pub(crate) struct DispatchKey {
    registry: Weak<RegistryInner>,
    owner: WrapperId,
}

impl DispatchKey {
    pub(crate) fn new(registry: &Registry, owner: WrapperId) -> Self {
        Self {
            registry: registry.downgrade(),
            owner,
        }
    }
}

/// The native callback attached for every event type with handlers.
unsafe extern "C" fn trampoline(event: *const vlc_sys::libvlc_event_t, user_data: *mut c_void) {
    if event.is_null() || user_data.is_null() {
        return;
    }
    // The key outlives every attachment made with it.
    let key = unsafe { &*user_data.cast::<DispatchKey>() };
    let raw = unsafe { &*event };
    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        let event = match unsafe { Event::from_raw(raw) } {
            Ok(event) => event,
            Err(err) => {
                warn!("Dropped native event: {err}");
                return;
            }
        };
        if let Some(registry) = Registry::upgrade(&key.registry) {
            registry.dispatch(key.owner, &event);
        }
    }));
    if result.is_err() {
        error!("Event handler panicked.");
    }
}

struct EventTable {
    liveness: Liveness,
    next_id: u64,
    handlers: BTreeMap<EventType, Vec<(HandlerId, HandlerFn)>>,
}

struct EventManagerInner {
    /// Lifecycle of the owner; native calls run inside one of its calls.
    lifecycle: Arc<Lifecycle>,
    native: NativeHandle,
    key: Box<DispatchKey>,
    table: Mutex<EventTable>,
}

impl EventManagerInner {
    fn user_data(&self) -> *mut c_void {
        std::ptr::from_ref::<DispatchKey>(&*self.key)
            .cast_mut()
            .cast()
    }

    fn detach(&self, kind: EventType) {
        trace!("Detaching {:?} from event manager {}.", kind, self.native);
        unsafe {
            self.lifecycle
                .api()
                .event_detach(self.native, kind, trampoline, self.user_data())
        };
    }
}

impl Drop for EventManagerInner {
    fn drop(&mut self) {
        let table = self.table.get_mut().unwrap_or_else(PoisonError::into_inner);
        let kinds: Vec<EventType> = std::mem::take(&mut table.handlers).into_keys().collect();
        if kinds.is_empty() {
            return;
        }
        let Ok(_call) = self.lifecycle.enter() else {
            return;
        };
        for kind in kinds {
            self.detach(kind);
        }
    }
}

/// Event manager of a media, media player or media list.
///
/// Obtained from the owner's `event_manager()` accessor; every call returns a
/// handle to the same manager. Once the owner is invalidated the manager is
/// closed: its handlers are dropped and [`EventManager::event_attach`] fails.
///
/// A handler that captures a clone of its own owner keeps that owner alive
/// until it is released explicitly or the handler is detached.
#[derive(Clone)]
pub struct EventManager {
    inner: Arc<EventManagerInner>,
}

impl EventManager {
    pub(crate) fn new(lifecycle: Arc<Lifecycle>, native: NativeHandle, key: DispatchKey) -> Self {
        Self {
            inner: Arc::new(EventManagerInner {
                lifecycle,
                native,
                key: Box::new(key),
                table: Mutex::new(EventTable {
                    liveness: Liveness::Live,
                    next_id: 0,
                    handlers: BTreeMap::new(),
                }),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EventTable> {
        self.inner
            .table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Native handle of the event manager.
    pub fn handle(&self) -> NativeHandle {
        self.inner.native
    }

    /// Registers `handler` for events of type `kind`.
    ///
    /// Handlers run on the thread the native library emits the event from,
    /// with no binding lock held.
    ///
    /// # Errors
    ///
    /// - [`Error::UseAfterRelease`] if the owner was released.
    /// - [`Error::Native`] if the owner does not emit `kind`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vlc::{EventType, Instance, config::get_libvlc_so_path, load_api};
    ///
    /// # fn main() -> Result<(), vlc::Error> {
    /// let instance = Instance::new(load_api(get_libvlc_so_path())?, &[])?;
    /// let player = instance.media_player_new()?;
    /// player
    ///     .event_manager()?
    ///     .event_attach(EventType::MediaPlayerMediaChanged, |event| {
    ///         println!("{event:?}");
    ///     })?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn event_attach<F>(&self, kind: EventType, handler: F) -> Result<HandlerId>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let _call = self
            .inner
            .lifecycle
            .enter()
            .map_err(|_| Error::UseAfterRelease(ObjectKind::EventManager))?;
        let mut table = self.lock();
        if table.liveness == Liveness::Invalidated {
            return Err(Error::UseAfterRelease(ObjectKind::EventManager));
        }
        if !table.handlers.contains_key(&kind) {
            trace!("Attaching {:?} to event manager {}.", kind, self.inner.native);
            unsafe {
                self.inner.lifecycle.api().event_attach(
                    self.inner.native,
                    kind,
                    trampoline,
                    self.inner.user_data(),
                )?
            };
        }
        table.next_id += 1;
        let id = HandlerId(table.next_id);
        table
            .handlers
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        Ok(id)
    }

    /// Removes a handler. Returns `false` if it was not attached (anymore).
    pub fn event_detach(&self, kind: EventType, id: HandlerId) -> Result<bool> {
        // A closed manager has no handlers left.
        let Ok(_call) = self.inner.lifecycle.enter() else {
            return Ok(false);
        };
        let (removed, last) = {
            let mut table = self.lock();
            let Some(handlers) = table.handlers.get_mut(&kind) else {
                return Ok(false);
            };
            let removed = handlers
                .iter()
                .position(|(handler_id, _)| *handler_id == id)
                .map(|index| handlers.remove(index));
            let last = handlers.is_empty();
            if last {
                table.handlers.remove(&kind);
            }
            (removed, last)
        };
        if last {
            self.inner.detach(kind);
        }
        Ok(removed.is_some())
    }

    /// Number of handlers attached for `kind`.
    pub fn handler_count(&self, kind: EventType) -> usize {
        self.lock().handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Whether no handler is attached at all.
    pub fn is_empty(&self) -> bool {
        self.lock().handlers.is_empty()
    }

    /// Whether handlers can still be attached.
    pub fn is_live(&self) -> bool {
        self.lock().liveness == Liveness::Live
    }

    /// Whether both values refer to the same event manager.
    pub fn same_object(&self, other: &EventManager) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn handlers(&self, kind: EventType) -> Vec<HandlerFn> {
        let table = self.lock();
        table
            .handlers
            .get(&kind)
            .map(|handlers| handlers.iter().map(|(_, handler)| handler.clone()).collect())
            .unwrap_or_default()
    }

    /// Closes the manager, clearing its handler table.
    ///
    /// The native detaches are deferred to [`EventTeardown::finish`].
    pub(crate) fn close(&self) -> Option<EventTeardown> {
        let mut table = self.lock();
        if table.liveness == Liveness::Invalidated {
            return None;
        }
        table.liveness = Liveness::Invalidated;
        let handlers = std::mem::take(&mut table.handlers);
        Some(EventTeardown {
            manager: self.inner.clone(),
            kinds: handlers.keys().copied().collect(),
            handlers: handlers.into_values().flatten().map(|(_, handler)| handler).collect(),
        })
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("handle", &self.inner.native)
            .field("live", &self.is_live())
            .finish()
    }
}

/// Native detaches left over by [`EventManager::close`].
pub(crate) struct EventTeardown {
    manager: Arc<EventManagerInner>,
    kinds: Vec<EventType>,
    handlers: Vec<HandlerFn>,
}

impl EventTeardown {
    /// Runs before the owner's native reference is given up.
    pub(crate) fn finish(self) {
        for &kind in &self.kinds {
            self.manager.detach(kind);
        }
        trace!(
            "Dropped {} handler(s) of event manager {}.",
            self.handlers.len(),
            self.manager.native
        );
    }
}
