// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! In-process stand-in for libvlc.
//!
//! [`DummyApi`] implements [`NativeApi`] without loading the native library.
//! It keeps real native reference counts, destroys objects when their count
//! drops to zero, reuses the addresses of destroyed objects (most recently
//! freed first, like a native allocator), converts paths to `file://` MRLs,
//! collects log messages and fires event callbacks outside of its own lock.
//! Like the native event managers, sending an event and detaching a callback
//! are serialized: once `event_detach` returns the callback is not running.
//!
//! Any misuse by the binding (a call on a destroyed handle, a detach without a
//! matching attach) is recorded and can be inspected with
//! [`DummyApi::violations`].
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use vlc::{Instance, Registry, dummy::DummyApi};
//!
//! # fn main() -> Result<(), vlc::Error> {
//! let dummy = Arc::new(DummyApi::new());
//! let instance = Instance::with_registry(dummy.clone(), Registry::new(), &[])?;
//! let media = instance.media_new("/tmp/foo.avi")?;
//! assert_eq!(media.mrl()?, "file:///tmp/foo.avi");
//! # Ok(())
//! # }
//! ```

use std::{
    collections::HashMap,
    ffi::{CStr, CString, c_void},
    sync::{
        Condvar, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    thread::ThreadId,
};

use tracing::{debug, error};

use crate::{
    Error, EventType, LogMessage, Meta, NativeHandle, ObjectKind, Result, State,
    api::{Callback, NativeApi},
};

/// Distance between two object addresses.
const HANDLE_STRIDE: usize = 16;
/// Offset of an object's event manager from the object itself.
const EVENT_MANAGER_OFFSET: usize = 8;

/// Interface modules [`DummyApi::add_intf`](NativeApi::add_intf) accepts.
pub const KNOWN_INTERFACES: &[&str] = &["dummy", "rc", "telnet", "http"];

const SEVERITY_INFO: i32 = 0;
const SEVERITY_DEBUG: i32 = 3;

/// Gives every `DummyApi` its own address region, so that handles of two
/// stand-ins never collide in a shared registry.
static NEXT_REGION: AtomicUsize = AtomicUsize::new(0);

struct Listener {
    event: EventType,
    callback: Callback,
    user_data: usize,
}

enum Data {
    Instance {
        args: Vec<String>,
        verbosity: u32,
        interfaces: Vec<String>,
    },
    Media {
        mrl: String,
        state: State,
        meta: HashMap<Meta, String>,
    },
    Player {
        media: Option<usize>,
        state: State,
    },
    List {
        items: Vec<usize>,
    },
    Log {
        instance: usize,
        messages: Vec<LogMessage>,
    },
}

struct DummyObject {
    kind: ObjectKind,
    refcount: usize,
    data: Data,
    listeners: Vec<Listener>,
}

/// Callbacks to fire once the state lock is released.
struct Pending {
    listeners: Vec<(Callback, usize)>,
    event: vlc_sys::libvlc_event_t,
}

impl Pending {
    fn fire(self) {
        for (callback, user_data) in self.listeners {
            unsafe { callback(&self.event, std::ptr::with_exposed_provenance_mut(user_data)) };
        }
    }
}

/// Re-entrant lock serializing event sending with callback detaching.
///
/// The thread sending an event may send further events or detach callbacks
/// from within a callback.
#[derive(Default)]
struct SendGate {
    owner: Mutex<(Option<ThreadId>, usize)>,
    released: Condvar,
}

impl SendGate {
    fn enter(&self) -> SendGuard<'_> {
        let me = std::thread::current().id();
        let mut owner = self.owner.lock().unwrap_or_else(PoisonError::into_inner);
        while owner.0.is_some_and(|id| id != me) {
            owner = self
                .released
                .wait(owner)
                .unwrap_or_else(PoisonError::into_inner);
        }
        owner.0 = Some(me);
        owner.1 += 1;
        SendGuard { gate: self }
    }
}

struct SendGuard<'a> {
    gate: &'a SendGate,
}

impl Drop for SendGuard<'_> {
    fn drop(&mut self) {
        let mut owner = self
            .gate
            .owner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        owner.1 -= 1;
        if owner.1 == 0 {
            owner.0 = None;
            self.gate.released.notify_all();
        }
    }
}

#[derive(Default)]
struct DummyState {
    objects: HashMap<usize, DummyObject>,
    free: Vec<usize>,
    allocated: usize,
    violations: Vec<String>,
}

impl DummyState {
    fn violation(&mut self, message: String) {
        error!("{message}");
        self.violations.push(message);
    }

    fn alloc(&mut self, base: usize, kind: ObjectKind, data: Data) -> Result<NativeHandle> {
        let address = match self.free.pop() {
            Some(address) => address,
            None => {
                self.allocated += 1;
                base + self.allocated * HANDLE_STRIDE
            }
        };
        self.objects.insert(
            address,
            DummyObject {
                kind,
                refcount: 1,
                data,
                listeners: Vec::new(),
            },
        );
        debug!("Dummy created {kind:?} {address:#x}.");
        NativeHandle::from_raw(address).ok_or_else(|| Error::Other("Null address.".to_string()))
    }

    fn object(&self, handle: NativeHandle, kind: ObjectKind) -> Result<&DummyObject> {
        self.objects
            .get(&handle.as_raw())
            .filter(|object| object.kind == kind)
            .ok_or_else(|| Error::Native(format!("Invalid {kind:?} handle {handle}.")))
    }

    fn object_mut(&mut self, handle: NativeHandle, kind: ObjectKind) -> Result<&mut DummyObject> {
        self.objects
            .get_mut(&handle.as_raw())
            .filter(|object| object.kind == kind)
            .ok_or_else(|| Error::Native(format!("Invalid {kind:?} handle {handle}.")))
    }

    /// Like [`DummyState::object`], recording a violation on failure.
    fn checked(&mut self, handle: NativeHandle, kind: ObjectKind) -> Option<&mut DummyObject> {
        if self.object(handle, kind).is_err() {
            self.violation(format!("Call on invalid {kind:?} handle {handle}."));
            return None;
        }
        self.objects.get_mut(&handle.as_raw())
    }

    fn retain(&mut self, address: usize) {
        if let Some(object) = self.objects.get_mut(&address) {
            object.refcount += 1;
        }
    }

    fn release(&mut self, address: usize) {
        let Some(object) = self.objects.get_mut(&address) else {
            self.violation(format!("Release of destroyed handle {address:#x}."));
            return;
        };
        object.refcount -= 1;
        if object.refcount > 0 {
            return;
        }
        if let Some(object) = self.objects.remove(&address) {
            debug!("Dummy destroyed {:?} {address:#x}.", object.kind);
            self.free.push(address);
            match object.data {
                Data::Player {
                    media: Some(media), ..
                } => self.release(media),
                Data::List { items } => items.into_iter().for_each(|item| self.release(item)),
                _ => {}
            }
        }
    }

    fn pending(
        &self,
        source: usize,
        event: EventType,
        payload: vlc_sys::libvlc_event_u,
    ) -> Pending {
        let listeners = self
            .objects
            .get(&source)
            .map(|object| {
                object
                    .listeners
                    .iter()
                    .filter(|listener| listener.event == event)
                    .map(|listener| (listener.callback, listener.user_data))
                    .collect()
            })
            .unwrap_or_default();
        Pending {
            listeners,
            event: vlc_sys::libvlc_event_t {
                type_: event.value(),
                p_obj: std::ptr::with_exposed_provenance_mut(source),
                u: payload,
            },
        }
    }

    fn log(&mut self, instance: usize, severity: i32, message: String) {
        let verbosity = match self.objects.get(&instance).map(|object| &object.data) {
            Some(Data::Instance { verbosity, .. }) => *verbosity,
            _ => return,
        };
        if severity > verbosity as i32 {
            return;
        }
        for object in self.objects.values_mut() {
            if let Data::Log {
                instance: owner,
                messages,
            } = &mut object.data
                && *owner == instance
            {
                messages.push(LogMessage {
                    severity,
                    kind: "main".to_string(),
                    name: "dummy".to_string(),
                    header: None,
                    message: message.clone(),
                });
            }
        }
    }
}

fn no_payload() -> vlc_sys::libvlc_event_u {
    vlc_sys::libvlc_event_u {
        media_duration_changed: Default::default(),
    }
}

fn media_ptr(address: Option<usize>) -> *mut vlc_sys::libvlc_media_t {
    address.map_or(std::ptr::null_mut(), std::ptr::with_exposed_provenance_mut)
}

fn owner_of(manager: NativeHandle) -> usize {
    manager.as_raw() - EVENT_MANAGER_OFFSET
}

/// Category of the objects emitting an event type.
fn event_owner_kind(event: EventType) -> Option<ObjectKind> {
    match event.value() >> 8 {
        0 => Some(ObjectKind::Media),
        1 => Some(ObjectKind::MediaPlayer),
        2 => Some(ObjectKind::MediaList),
        _ => None,
    }
}

fn player_event(state: State) -> EventType {
    match state {
        State::NothingSpecial => EventType::MediaPlayerNothingSpecial,
        State::Opening => EventType::MediaPlayerOpening,
        State::Buffering => EventType::MediaPlayerBuffering,
        State::Playing => EventType::MediaPlayerPlaying,
        State::Paused => EventType::MediaPlayerPaused,
        State::Stopped => EventType::MediaPlayerStopped,
        State::Ended => EventType::MediaPlayerEndReached,
        State::Error => EventType::MediaPlayerEncounteredError,
    }
}

/// In-process [`NativeApi`] implementation.
pub struct DummyApi {
    base: usize,
    state: Mutex<DummyState>,
    sending: SendGate,
}

impl Default for DummyApi {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyApi {
    /// Creates an empty dummy library with its own address region.
    pub fn new() -> Self {
        let region = NEXT_REGION.fetch_add(1, Ordering::Relaxed);
        Self {
            base: ((region % 0x100) + 1) << 20,
            state: Mutex::new(DummyState::default()),
            sending: SendGate::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DummyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Updates the state and fires the resulting event, holding the send gate
    /// throughout.
    fn send<F>(&self, prepare: F) -> Result<()>
    where
        F: FnOnce(&mut DummyState) -> Result<Pending>,
    {
        let _sending = self.sending.enter();
        let pending = prepare(&mut self.lock())?;
        pending.fire();
        Ok(())
    }

    /// Native reference count of `handle`, `None` once destroyed.
    pub fn native_refcount(&self, handle: NativeHandle) -> Option<usize> {
        self.lock()
            .objects
            .get(&handle.as_raw())
            .map(|object| object.refcount)
    }

    /// Whether `handle` designates a live native object.
    pub fn is_alive(&self, handle: NativeHandle) -> bool {
        self.native_refcount(handle).is_some()
    }

    /// Number of live native objects, logs included.
    pub fn object_count(&self) -> usize {
        self.lock().objects.len()
    }

    /// Number of native callbacks attached to the event manager of `owner`.
    pub fn listener_count(&self, owner: NativeHandle) -> usize {
        self.lock()
            .objects
            .get(&owner.as_raw())
            .map_or(0, |object| object.listeners.len())
    }

    /// Arguments an instance was created with.
    pub fn instance_args(&self, instance: NativeHandle) -> Option<Vec<String>> {
        match &self.lock().object(instance, ObjectKind::Instance).ok()?.data {
            Data::Instance { args, .. } => Some(args.clone()),
            _ => None,
        }
    }

    /// Interfaces started on an instance.
    pub fn interfaces(&self, instance: NativeHandle) -> Vec<String> {
        match self
            .lock()
            .object(instance, ObjectKind::Instance)
            .map(|object| &object.data)
        {
            Ok(Data::Instance { interfaces, .. }) => interfaces.clone(),
            _ => Vec::new(),
        }
    }

    /// Misuses detected so far.
    pub fn violations(&self) -> Vec<String> {
        self.lock().violations.clone()
    }

    /// Fires `event` on the event manager of `source`, on the calling thread.
    pub fn emit(&self, source: NativeHandle, event: EventType, payload: vlc_sys::libvlc_event_u) {
        let _sending = self.sending.enter();
        let pending = self.lock().pending(source.as_raw(), event, payload);
        pending.fire();
    }

    /// Changes the state of a media and fires `MediaStateChanged`.
    pub fn set_media_state(&self, media: NativeHandle, state: State) -> Result<()> {
        self.send(|dummy| {
            if let Data::Media { state: current, .. } =
                &mut dummy.object_mut(media, ObjectKind::Media)?.data
            {
                *current = state;
            }
            Ok(dummy.pending(
                media.as_raw(),
                EventType::MediaStateChanged,
                vlc_sys::libvlc_event_u {
                    media_state_changed: vlc_sys::libvlc_event_media_state_changed {
                        new_state: state.value(),
                    },
                },
            ))
        })
    }

    /// Changes the state of a player and fires the matching player event.
    pub fn set_player_state(&self, player: NativeHandle, state: State) -> Result<()> {
        self.send(|dummy| {
            if let Data::Player { state: current, .. } =
                &mut dummy.object_mut(player, ObjectKind::MediaPlayer)?.data
            {
                *current = state;
            }
            Ok(dummy.pending(player.as_raw(), player_event(state), no_payload()))
        })
    }

    /// Sets a meta field of a media and fires `MediaMetaChanged`.
    pub fn set_meta(&self, media: NativeHandle, meta: Meta, value: &str) -> Result<()> {
        self.send(|dummy| {
            if let Data::Media { meta: fields, .. } =
                &mut dummy.object_mut(media, ObjectKind::Media)?.data
            {
                fields.insert(meta, value.to_string());
            }
            Ok(dummy.pending(
                media.as_raw(),
                EventType::MediaMetaChanged,
                vlc_sys::libvlc_event_u {
                    media_meta_changed: vlc_sys::libvlc_event_media_meta_changed {
                        meta_type: meta.value(),
                    },
                },
            ))
        })
    }

    fn new_media(&self, instance: NativeHandle, mrl: String) -> Result<NativeHandle> {
        let mut dummy = self.lock();
        dummy.object(instance, ObjectKind::Instance)?;
        dummy.alloc(
            self.base,
            ObjectKind::Media,
            Data::Media {
                mrl,
                state: State::NothingSpecial,
                meta: HashMap::new(),
            },
        )
    }

    fn new_player(&self, media: Option<usize>) -> Result<NativeHandle> {
        self.lock().alloc(
            self.base,
            ObjectKind::MediaPlayer,
            Data::Player {
                media,
                state: State::NothingSpecial,
            },
        )
    }
}

impl NativeApi for DummyApi {
    fn version(&self) -> String {
        "2.2.0 Dummy".to_string()
    }

    unsafe fn instance_new(&self, args: &[CString]) -> Result<NativeHandle> {
        let args = args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        self.lock().alloc(
            self.base,
            ObjectKind::Instance,
            Data::Instance {
                args,
                verbosity: 0,
                interfaces: Vec::new(),
            },
        )
    }

    unsafe fn retain(&self, kind: ObjectKind, object: NativeHandle) {
        let mut dummy = self.lock();
        if dummy.checked(object, kind).is_some() {
            dummy.retain(object.as_raw());
        }
    }

    unsafe fn release(&self, kind: ObjectKind, object: NativeHandle) {
        let mut dummy = self.lock();
        if dummy.checked(object, kind).is_some() {
            dummy.release(object.as_raw());
        }
    }

    unsafe fn add_intf(&self, instance: NativeHandle, name: &CStr) -> Result<()> {
        let name = name.to_string_lossy().into_owned();
        let mut dummy = self.lock();
        let Data::Instance { interfaces, .. } =
            &mut dummy.object_mut(instance, ObjectKind::Instance)?.data
        else {
            return Err(Error::Native(format!("Invalid instance {instance}.")));
        };
        if !KNOWN_INTERFACES.contains(&name.as_str()) {
            return Err(Error::Native(format!(
                "Interface \"{name}\" initialization failed"
            )));
        }
        interfaces.push(name.clone());
        dummy.log(
            instance.as_raw(),
            SEVERITY_DEBUG,
            format!("looking for interface module matching \"{name}\""),
        );
        dummy.log(
            instance.as_raw(),
            SEVERITY_INFO,
            format!("Running vlc with the {name} interface."),
        );
        Ok(())
    }

    unsafe fn log_verbosity(&self, instance: NativeHandle) -> u32 {
        match self
            .lock()
            .object(instance, ObjectKind::Instance)
            .map(|object| &object.data)
        {
            Ok(Data::Instance { verbosity, .. }) => *verbosity,
            _ => 0,
        }
    }

    unsafe fn set_log_verbosity(&self, instance: NativeHandle, level: u32) {
        let mut dummy = self.lock();
        if let Some(DummyObject {
            data: Data::Instance { verbosity, .. },
            ..
        }) = dummy.checked(instance, ObjectKind::Instance)
        {
            *verbosity = level;
        }
    }

    unsafe fn media_new_location(
        &self,
        instance: NativeHandle,
        mrl: &CStr,
    ) -> Result<NativeHandle> {
        self.new_media(instance, mrl.to_string_lossy().into_owned())
    }

    unsafe fn media_new_path(&self, instance: NativeHandle, path: &CStr) -> Result<NativeHandle> {
        let path = std::path::absolute(path.to_string_lossy().as_ref())
            .map_err(|err| Error::Native(err.to_string()))?;
        self.new_media(instance, format!("file://{}", path.display()))
    }

    unsafe fn media_mrl(&self, media: NativeHandle) -> Result<String> {
        match &self.lock().object(media, ObjectKind::Media)?.data {
            Data::Media { mrl, .. } => Ok(mrl.clone()),
            _ => Err(Error::Native(format!("Invalid media {media}."))),
        }
    }

    unsafe fn media_meta(&self, media: NativeHandle, meta: Meta) -> Option<String> {
        match &self.lock().object(media, ObjectKind::Media).ok()?.data {
            Data::Media { meta: fields, .. } => fields.get(&meta).cloned(),
            _ => None,
        }
    }

    unsafe fn media_state(&self, media: NativeHandle) -> Result<State> {
        match &self.lock().object(media, ObjectKind::Media)?.data {
            Data::Media { state, .. } => Ok(*state),
            _ => Err(Error::Native(format!("Invalid media {media}."))),
        }
    }

    unsafe fn media_player_new(&self, instance: NativeHandle) -> Result<NativeHandle> {
        self.lock().object(instance, ObjectKind::Instance)?;
        self.new_player(None)
    }

    unsafe fn media_player_new_from_media(&self, media: NativeHandle) -> Result<NativeHandle> {
        {
            let mut dummy = self.lock();
            dummy.object(media, ObjectKind::Media)?;
            dummy.retain(media.as_raw());
        }
        self.new_player(Some(media.as_raw()))
    }

    unsafe fn media_player_set_media(&self, player: NativeHandle, media: Option<NativeHandle>) {
        // Invalid handles are recorded as violations.
        let _ = self.send(|dummy| {
            if let Some(media) = media {
                if dummy.checked(media, ObjectKind::Media).is_none() {
                    return Err(Error::Native(format!("Invalid media {media}.")));
                }
            }
            let media = media.map(NativeHandle::as_raw);
            let previous = match dummy.checked(player, ObjectKind::MediaPlayer) {
                Some(DummyObject {
                    data: Data::Player { media: current, .. },
                    ..
                }) => std::mem::replace(current, media),
                _ => return Err(Error::Native(format!("Invalid media player {player}."))),
            };
            if let Some(media) = media {
                dummy.retain(media);
            }
            if let Some(previous) = previous {
                dummy.release(previous);
            }
            Ok(dummy.pending(
                player.as_raw(),
                EventType::MediaPlayerMediaChanged,
                vlc_sys::libvlc_event_u {
                    media_player_media_changed: vlc_sys::libvlc_event_media_player_media_changed {
                        new_media: media_ptr(media),
                    },
                },
            ))
        });
    }

    unsafe fn media_player_media(&self, player: NativeHandle) -> Option<NativeHandle> {
        let mut dummy = self.lock();
        let media = match &dummy.checked(player, ObjectKind::MediaPlayer)?.data {
            Data::Player { media, .. } => (*media)?,
            _ => return None,
        };
        dummy.retain(media);
        NativeHandle::from_raw(media)
    }

    unsafe fn media_player_state(&self, player: NativeHandle) -> Result<State> {
        match &self.lock().object(player, ObjectKind::MediaPlayer)?.data {
            Data::Player { state, .. } => Ok(*state),
            _ => Err(Error::Native(format!("Invalid media player {player}."))),
        }
    }

    unsafe fn media_player_play(&self, player: NativeHandle) -> Result<()> {
        match &self.lock().object(player, ObjectKind::MediaPlayer)?.data {
            Data::Player { media: Some(_), .. } => {}
            _ => return Err(Error::Native("No media to play.".to_string())),
        }
        self.set_player_state(player, State::Playing)
    }

    unsafe fn media_player_stop(&self, player: NativeHandle) {
        if self.set_player_state(player, State::Stopped).is_err() {
            self.lock()
                .violation(format!("Call on invalid MediaPlayer handle {player}."));
        }
    }

    unsafe fn media_list_new(&self, instance: NativeHandle) -> Result<NativeHandle> {
        let mut dummy = self.lock();
        dummy.object(instance, ObjectKind::Instance)?;
        dummy.alloc(
            self.base,
            ObjectKind::MediaList,
            Data::List { items: Vec::new() },
        )
    }

    unsafe fn media_list_add_media(&self, list: NativeHandle, media: NativeHandle) -> Result<()> {
        self.send(|dummy| {
            dummy.object(media, ObjectKind::Media)?;
            let Data::List { items } = &mut dummy.object_mut(list, ObjectKind::MediaList)?.data
            else {
                return Err(Error::Native(format!("Invalid media list {list}.")));
            };
            items.push(media.as_raw());
            let index = items.len() - 1;
            dummy.retain(media.as_raw());
            Ok(dummy.pending(
                list.as_raw(),
                EventType::MediaListItemAdded,
                vlc_sys::libvlc_event_u {
                    media_list_item_added: vlc_sys::libvlc_event_media_list_item {
                        item: media.as_ptr(),
                        index: index as i32,
                    },
                },
            ))
        })
    }

    unsafe fn media_list_count(&self, list: NativeHandle) -> usize {
        match self
            .lock()
            .object(list, ObjectKind::MediaList)
            .map(|object| &object.data)
        {
            Ok(Data::List { items }) => items.len(),
            _ => 0,
        }
    }

    unsafe fn media_list_item_at_index(
        &self,
        list: NativeHandle,
        index: usize,
    ) -> Option<NativeHandle> {
        let mut dummy = self.lock();
        let item = match &dummy.object(list, ObjectKind::MediaList).ok()?.data {
            Data::List { items } => *items.get(index)?,
            _ => return None,
        };
        dummy.retain(item);
        NativeHandle::from_raw(item)
    }

    unsafe fn event_manager(&self, kind: ObjectKind, object: NativeHandle) -> Result<NativeHandle> {
        if !matches!(
            kind,
            ObjectKind::Media | ObjectKind::MediaPlayer | ObjectKind::MediaList
        ) {
            return Err(Error::Other(format!("{kind:?} has no event manager.")));
        }
        self.lock().object(object, kind)?;
        NativeHandle::from_raw(object.as_raw() + EVENT_MANAGER_OFFSET)
            .ok_or_else(|| Error::Other("Null address.".to_string()))
    }

    unsafe fn event_attach(
        &self,
        manager: NativeHandle,
        event: EventType,
        callback: Callback,
        user_data: *mut c_void,
    ) -> Result<()> {
        let mut dummy = self.lock();
        let object = dummy
            .objects
            .get_mut(&owner_of(manager))
            .ok_or_else(|| Error::Native(format!("Invalid event manager {manager}.")))?;
        if event_owner_kind(event) != Some(object.kind) {
            return Err(Error::Native(format!(
                "{event:?} is not emitted by a {:?}.",
                object.kind
            )));
        }
        object.listeners.push(Listener {
            event,
            callback,
            user_data: user_data.expose_provenance(),
        });
        Ok(())
    }

    unsafe fn event_detach(
        &self,
        manager: NativeHandle,
        event: EventType,
        callback: Callback,
        user_data: *mut c_void,
    ) {
        let _sending = self.sending.enter();
        let mut dummy = self.lock();
        let user_data = user_data.expose_provenance();
        let position = dummy.objects.get(&owner_of(manager)).and_then(|object| {
            object.listeners.iter().position(|listener| {
                listener.event == event
                    && listener.user_data == user_data
                    && std::ptr::fn_addr_eq(listener.callback, callback)
            })
        });
        match position {
            Some(position) => {
                if let Some(object) = dummy.objects.get_mut(&owner_of(manager)) {
                    object.listeners.remove(position);
                }
            }
            None => dummy.violation(format!(
                "Detach of {event:?} not attached to event manager {manager}."
            )),
        }
    }

    unsafe fn log_open(&self, instance: NativeHandle) -> Result<NativeHandle> {
        let mut dummy = self.lock();
        dummy.object(instance, ObjectKind::Instance)?;
        dummy.alloc(
            self.base,
            ObjectKind::Log,
            Data::Log {
                instance: instance.as_raw(),
                messages: Vec::new(),
            },
        )
    }

    unsafe fn log_close(&self, log: NativeHandle) {
        let mut dummy = self.lock();
        if dummy.checked(log, ObjectKind::Log).is_some() {
            dummy.release(log.as_raw());
        }
    }

    unsafe fn log_count(&self, log: NativeHandle) -> usize {
        match self.lock().object(log, ObjectKind::Log).map(|object| &object.data) {
            Ok(Data::Log { messages, .. }) => messages.len(),
            _ => 0,
        }
    }

    unsafe fn log_clear(&self, log: NativeHandle) {
        let mut dummy = self.lock();
        if let Some(DummyObject {
            data: Data::Log { messages, .. },
            ..
        }) = dummy.checked(log, ObjectKind::Log)
        {
            messages.clear();
        }
    }

    unsafe fn log_messages(&self, log: NativeHandle) -> Result<Vec<LogMessage>> {
        match &self.lock().object(log, ObjectKind::Log)?.data {
            Data::Log { messages, .. } => Ok(messages.clone()),
            _ => Err(Error::Native(format!("Invalid log {log}."))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(dummy: &DummyApi) -> NativeHandle {
        unsafe { dummy.instance_new(&[]) }.unwrap()
    }

    #[test]
    fn destroyed_addresses_are_reused() {
        let dummy = DummyApi::new();
        let instance = instance(&dummy);
        let path = CString::new("/tmp/foo.avi").unwrap();

        let first = unsafe { dummy.media_new_path(instance, &path) }.unwrap();
        unsafe { dummy.release(ObjectKind::Media, first) };
        assert!(!dummy.is_alive(first));

        let second = unsafe { dummy.media_new_path(instance, &path) }.unwrap();
        assert_eq!(first, second);
        assert!(dummy.violations().is_empty());
    }

    #[test]
    fn paths_become_file_mrls() {
        let dummy = DummyApi::new();
        let instance = instance(&dummy);
        let path = CString::new("/tmp/foo.avi").unwrap();
        let media = unsafe { dummy.media_new_path(instance, &path) }.unwrap();
        assert_eq!(unsafe { dummy.media_mrl(media) }.unwrap(), "file:///tmp/foo.avi");
    }

    #[test]
    fn releasing_a_player_releases_its_media() {
        let dummy = DummyApi::new();
        let instance = instance(&dummy);
        let path = CString::new("/tmp/foo.avi").unwrap();
        let media = unsafe { dummy.media_new_path(instance, &path) }.unwrap();
        let player = unsafe { dummy.media_player_new_from_media(media) }.unwrap();
        assert_eq!(dummy.native_refcount(media), Some(2));

        unsafe { dummy.release(ObjectKind::MediaPlayer, player) };
        assert_eq!(dummy.native_refcount(media), Some(1));
    }

    #[test]
    fn over_release_is_recorded() {
        let dummy = DummyApi::new();
        let instance = instance(&dummy);
        unsafe {
            dummy.release(ObjectKind::Instance, instance);
            dummy.release(ObjectKind::Instance, instance);
        }
        assert_eq!(dummy.violations().len(), 1);
    }

    #[test]
    fn unknown_interface_fails() {
        let dummy = DummyApi::new();
        let instance = instance(&dummy);
        let name = CString::new("no-such-intf").unwrap();
        assert!(matches!(
            unsafe { dummy.add_intf(instance, &name) },
            Err(Error::Native(_))
        ));
    }

    #[test]
    fn events_of_other_objects_are_rejected() {
        unsafe extern "C" fn ignore(_: *const vlc_sys::libvlc_event_t, _: *mut c_void) {}

        let dummy = DummyApi::new();
        let instance = instance(&dummy);
        let path = CString::new("/tmp/foo.avi").unwrap();
        let media = unsafe { dummy.media_new_path(instance, &path) }.unwrap();
        let manager = unsafe { dummy.event_manager(ObjectKind::Media, media) }.unwrap();

        let result = unsafe {
            dummy.event_attach(
                manager,
                EventType::MediaPlayerPlaying,
                ignore,
                std::ptr::null_mut(),
            )
        };
        assert!(result.is_err());
        assert_eq!(dummy.listener_count(media), 0);
    }
}
