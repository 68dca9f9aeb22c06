// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! The seam between the binding and the native library.
//!
//! Everything the wrappers need from libvlc goes through [`NativeApi`]. The
//! production implementation, [`LibVlcApi`], forwards to a dynamically loaded
//! [`vlc_sys::LibVlc`]; [`crate::dummy::DummyApi`] implements the same entry
//! points in-process for tests.

use std::{
    ffi::{CStr, CString, OsStr, c_char, c_int, c_uint, c_void},
    fmt,
    num::NonZeroUsize,
    sync::Arc,
};

use crate::{Error, EventType, LogMessage, Meta, Result, State};

/// Opaque, non-null identifier of a native object.
///
/// This is the address of the native object. It is stable for the native
/// lifetime of the object and may be reused by the native allocator once the
/// object is destroyed. A null pointer never converts into a `NativeHandle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(NonZeroUsize);

impl NativeHandle {
    /// Wraps a native pointer, returning `None` for null.
    pub fn from_ptr<T>(ptr: *mut T) -> Option<Self> {
        NonZeroUsize::new(ptr.expose_provenance()).map(Self)
    }

    /// Wraps a raw address, returning `None` for zero.
    pub fn from_raw(value: usize) -> Option<Self> {
        NonZeroUsize::new(value).map(Self)
    }

    /// Returns the raw address.
    pub fn as_raw(self) -> usize {
        self.0.get()
    }

    /// Returns the handle as a typed native pointer.
    pub fn as_ptr<T>(self) -> *mut T {
        std::ptr::with_exposed_provenance_mut(self.0.get())
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0.get())
    }
}

/// Kind of native object behind a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Instance,
    Media,
    MediaPlayer,
    MediaList,
    EventManager,
    Log,
}

/// Native callback signature accepted by [`NativeApi::event_attach`].
pub type Callback = unsafe extern "C" fn(*const vlc_sys::libvlc_event_t, *mut c_void);

/// Entry points of the native library used by the binding.
///
/// # Safety
///
/// All `unsafe` methods require every handle argument to have been produced by
/// the same implementation and to still be alive natively (at least one
/// native reference is held by the caller). Methods returning a handle hand
/// over one native reference to the caller unless documented otherwise.
pub trait NativeApi: Send + Sync {
    /// Version string of the native library.
    fn version(&self) -> String;

    /// Creates a new instance from command-line style arguments.
    unsafe fn instance_new(&self, args: &[CString]) -> Result<NativeHandle>;

    /// Adds one native reference to a refcounted object.
    unsafe fn retain(&self, kind: ObjectKind, object: NativeHandle);

    /// Drops one native reference; the object is destroyed at zero.
    unsafe fn release(&self, kind: ObjectKind, object: NativeHandle);

    /// Starts an interface module on an instance.
    unsafe fn add_intf(&self, instance: NativeHandle, name: &CStr) -> Result<()>;

    unsafe fn log_verbosity(&self, instance: NativeHandle) -> u32;

    unsafe fn set_log_verbosity(&self, instance: NativeHandle, level: u32);

    /// Creates a media from an MRL with a scheme (`file://`, `http://`, ...).
    unsafe fn media_new_location(&self, instance: NativeHandle, mrl: &CStr)
    -> Result<NativeHandle>;

    /// Creates a media from a local filesystem path.
    unsafe fn media_new_path(&self, instance: NativeHandle, path: &CStr) -> Result<NativeHandle>;

    unsafe fn media_mrl(&self, media: NativeHandle) -> Result<String>;

    unsafe fn media_meta(&self, media: NativeHandle, meta: Meta) -> Option<String>;

    unsafe fn media_state(&self, media: NativeHandle) -> Result<State>;

    unsafe fn media_player_new(&self, instance: NativeHandle) -> Result<NativeHandle>;

    unsafe fn media_player_new_from_media(&self, media: NativeHandle) -> Result<NativeHandle>;

    /// Replaces the media of a player; the player takes its own reference.
    unsafe fn media_player_set_media(&self, player: NativeHandle, media: Option<NativeHandle>);

    /// Returns the current media of a player with a new native reference.
    unsafe fn media_player_media(&self, player: NativeHandle) -> Option<NativeHandle>;

    unsafe fn media_player_state(&self, player: NativeHandle) -> Result<State>;

    /// Starts playback of the player's media.
    unsafe fn media_player_play(&self, player: NativeHandle) -> Result<()>;

    unsafe fn media_player_stop(&self, player: NativeHandle);

    unsafe fn media_list_new(&self, instance: NativeHandle) -> Result<NativeHandle>;

    /// Appends a media; the list takes its own reference.
    unsafe fn media_list_add_media(&self, list: NativeHandle, media: NativeHandle) -> Result<()>;

    unsafe fn media_list_count(&self, list: NativeHandle) -> usize;

    /// Returns the item at `index` with a new native reference.
    unsafe fn media_list_item_at_index(&self, list: NativeHandle, index: usize)
    -> Option<NativeHandle>;

    /// Returns the event manager owned by `object`. Event managers are not
    /// refcounted; they live as long as their owner.
    unsafe fn event_manager(&self, kind: ObjectKind, object: NativeHandle) -> Result<NativeHandle>;

    unsafe fn event_attach(
        &self,
        manager: NativeHandle,
        event: EventType,
        callback: Callback,
        user_data: *mut c_void,
    ) -> Result<()>;

    /// Detaches a callback. Once this returns the callback is not running and
    /// will not be invoked again for this registration.
    unsafe fn event_detach(
        &self,
        manager: NativeHandle,
        event: EventType,
        callback: Callback,
        user_data: *mut c_void,
    );

    unsafe fn log_open(&self, instance: NativeHandle) -> Result<NativeHandle>;

    unsafe fn log_close(&self, log: NativeHandle);

    unsafe fn log_count(&self, log: NativeHandle) -> usize;

    unsafe fn log_clear(&self, log: NativeHandle);

    unsafe fn log_messages(&self, log: NativeHandle) -> Result<Vec<LogMessage>>;
}

/// Shared handle to a native library implementation.
pub type ApiHandle = Arc<dyn NativeApi>;

/// Loads libvlc from `path` and returns a shareable API handle.
///
/// # Examples
///
/// ```no_run
/// use vlc::{config::get_libvlc_so_path, load_api};
///
/// # fn main() -> Result<(), vlc::Error> {
/// let api = load_api(get_libvlc_so_path())?;
/// println!("libvlc {}", api.version());
/// # Ok(())
/// # }
/// ```
pub fn load_api<P: AsRef<OsStr>>(path: P) -> Result<ApiHandle> {
    Ok(Arc::new(LibVlcApi::load(path)?))
}

/// [`NativeApi`] implementation backed by a dynamically loaded libvlc.
pub struct LibVlcApi {
    lib: vlc_sys::LibVlc,
}

impl LibVlcApi {
    /// Loads the shared library and resolves all entry points.
    pub fn load<P: AsRef<OsStr>>(path: P) -> Result<Self> {
        let lib = unsafe { vlc_sys::LibVlc::new(path)? };
        tracing::debug!("Loaded libvlc {}", unsafe {
            string_from_ptr(lib.libvlc_get_version()).unwrap_or_default()
        });
        Ok(Self { lib })
    }

    /// Returns the last native error message of the calling thread.
    fn errmsg(&self) -> Option<String> {
        unsafe {
            let message = string_from_ptr(self.lib.libvlc_errmsg());
            self.lib.libvlc_clearerr();
            message
        }
    }

    fn native_error(&self, what: &str) -> Error {
        Error::Native(self.errmsg().unwrap_or_else(|| format!("Failed to {what}.")))
    }

    fn created<T>(&self, ptr: *mut T, what: &str) -> Result<NativeHandle> {
        NativeHandle::from_ptr(ptr).ok_or_else(|| self.native_error(what))
    }

    /// Copies and frees a heap string returned by libvlc.
    unsafe fn take_string(&self, ptr: *mut c_char) -> Option<String> {
        let value = unsafe { string_from_ptr(ptr) };
        if !ptr.is_null() {
            unsafe { self.lib.libvlc_free(ptr.cast()) };
        }
        value
    }
}

/// Copies a borrowed C string, mapping null to `None`.
unsafe fn string_from_ptr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }
}

impl NativeApi for LibVlcApi {
    fn version(&self) -> String {
        let version = unsafe { string_from_ptr(self.lib.libvlc_get_version()) };
        version.unwrap_or_default()
    }

    unsafe fn instance_new(&self, args: &[CString]) -> Result<NativeHandle> {
        let argv: Vec<*const c_char> = args.iter().map(|arg| arg.as_ptr()).collect();
        let argc = c_int::try_from(argv.len())
            .map_err(|_| Error::Other("Too many instance arguments.".to_string()))?;
        let instance = unsafe { self.lib.libvlc_new(argc, argv.as_ptr()) };
        self.created(instance, "create libvlc instance")
    }

    unsafe fn retain(&self, kind: ObjectKind, object: NativeHandle) {
        unsafe {
            match kind {
                ObjectKind::Instance => self.lib.libvlc_retain(object.as_ptr()),
                ObjectKind::Media => self.lib.libvlc_media_retain(object.as_ptr()),
                ObjectKind::MediaPlayer => self.lib.libvlc_media_player_retain(object.as_ptr()),
                ObjectKind::MediaList => self.lib.libvlc_media_list_retain(object.as_ptr()),
                ObjectKind::EventManager | ObjectKind::Log => {
                    tracing::error!("{kind:?} {object} is not reference counted.")
                }
            }
        }
    }

    unsafe fn release(&self, kind: ObjectKind, object: NativeHandle) {
        unsafe {
            match kind {
                ObjectKind::Instance => self.lib.libvlc_release(object.as_ptr()),
                ObjectKind::Media => self.lib.libvlc_media_release(object.as_ptr()),
                ObjectKind::MediaPlayer => self.lib.libvlc_media_player_release(object.as_ptr()),
                ObjectKind::MediaList => self.lib.libvlc_media_list_release(object.as_ptr()),
                ObjectKind::EventManager | ObjectKind::Log => {
                    tracing::error!("{kind:?} {object} is not reference counted.")
                }
            }
        }
    }

    unsafe fn add_intf(&self, instance: NativeHandle, name: &CStr) -> Result<()> {
        let status = unsafe { self.lib.libvlc_add_intf(instance.as_ptr(), name.as_ptr()) };
        Error::from_status(status, || self.errmsg())
    }

    unsafe fn log_verbosity(&self, instance: NativeHandle) -> u32 {
        unsafe {
            self.lib
                .libvlc_get_log_verbosity(instance.as_ptr::<vlc_sys::libvlc_instance_t>())
        }
    }

    unsafe fn set_log_verbosity(&self, instance: NativeHandle, level: u32) {
        unsafe {
            self.lib
                .libvlc_set_log_verbosity(instance.as_ptr(), level as c_uint)
        }
    }

    unsafe fn media_new_location(
        &self,
        instance: NativeHandle,
        mrl: &CStr,
    ) -> Result<NativeHandle> {
        let media = unsafe {
            self.lib
                .libvlc_media_new_location(instance.as_ptr(), mrl.as_ptr())
        };
        self.created(media, "create media")
    }

    unsafe fn media_new_path(&self, instance: NativeHandle, path: &CStr) -> Result<NativeHandle> {
        let media = unsafe { self.lib.libvlc_media_new_path(instance.as_ptr(), path.as_ptr()) };
        self.created(media, "create media")
    }

    unsafe fn media_mrl(&self, media: NativeHandle) -> Result<String> {
        let mrl = unsafe { self.take_string(self.lib.libvlc_media_get_mrl(media.as_ptr())) };
        mrl.ok_or_else(|| self.native_error("get media MRL"))
    }

    unsafe fn media_meta(&self, media: NativeHandle, meta: Meta) -> Option<String> {
        unsafe {
            let value = self.lib.libvlc_media_get_meta(media.as_ptr(), meta.value());
            self.take_string(value)
        }
    }

    unsafe fn media_state(&self, media: NativeHandle) -> Result<State> {
        State::try_from(unsafe { self.lib.libvlc_media_get_state(media.as_ptr()) })
    }

    unsafe fn media_player_new(&self, instance: NativeHandle) -> Result<NativeHandle> {
        let player = unsafe { self.lib.libvlc_media_player_new(instance.as_ptr()) };
        self.created(player, "create media player")
    }

    unsafe fn media_player_new_from_media(&self, media: NativeHandle) -> Result<NativeHandle> {
        let player = unsafe { self.lib.libvlc_media_player_new_from_media(media.as_ptr()) };
        self.created(player, "create media player")
    }

    unsafe fn media_player_set_media(&self, player: NativeHandle, media: Option<NativeHandle>) {
        let media = media.map_or(std::ptr::null_mut(), NativeHandle::as_ptr);
        unsafe { self.lib.libvlc_media_player_set_media(player.as_ptr(), media) }
    }

    unsafe fn media_player_media(&self, player: NativeHandle) -> Option<NativeHandle> {
        NativeHandle::from_ptr(unsafe { self.lib.libvlc_media_player_get_media(player.as_ptr()) })
    }

    unsafe fn media_player_state(&self, player: NativeHandle) -> Result<State> {
        State::try_from(unsafe { self.lib.libvlc_media_player_get_state(player.as_ptr()) })
    }

    unsafe fn media_player_play(&self, player: NativeHandle) -> Result<()> {
        let status = unsafe { self.lib.libvlc_media_player_play(player.as_ptr()) };
        Error::from_status(status, || self.errmsg())
    }

    unsafe fn media_player_stop(&self, player: NativeHandle) {
        unsafe { self.lib.libvlc_media_player_stop(player.as_ptr()) }
    }

    unsafe fn media_list_new(&self, instance: NativeHandle) -> Result<NativeHandle> {
        let list = unsafe { self.lib.libvlc_media_list_new(instance.as_ptr()) };
        self.created(list, "create media list")
    }

    unsafe fn media_list_add_media(&self, list: NativeHandle, media: NativeHandle) -> Result<()> {
        let status = unsafe {
            self.lib.libvlc_media_list_lock(list.as_ptr());
            let status = self
                .lib
                .libvlc_media_list_add_media(list.as_ptr(), media.as_ptr());
            self.lib.libvlc_media_list_unlock(list.as_ptr());
            status
        };
        Error::from_status(status, || self.errmsg())
    }

    unsafe fn media_list_count(&self, list: NativeHandle) -> usize {
        let count = unsafe {
            self.lib.libvlc_media_list_lock(list.as_ptr());
            let count = self.lib.libvlc_media_list_count(list.as_ptr());
            self.lib.libvlc_media_list_unlock(list.as_ptr());
            count
        };
        usize::try_from(count).unwrap_or(0)
    }

    unsafe fn media_list_item_at_index(
        &self,
        list: NativeHandle,
        index: usize,
    ) -> Option<NativeHandle> {
        let index = c_int::try_from(index).ok()?;
        let media = unsafe {
            self.lib.libvlc_media_list_lock(list.as_ptr());
            let media = self.lib.libvlc_media_list_item_at_index(list.as_ptr(), index);
            self.lib.libvlc_media_list_unlock(list.as_ptr());
            media
        };
        NativeHandle::from_ptr(media)
    }

    unsafe fn event_manager(&self, kind: ObjectKind, object: NativeHandle) -> Result<NativeHandle> {
        let manager = unsafe {
            match kind {
                ObjectKind::Media => self.lib.libvlc_media_event_manager(object.as_ptr()),
                ObjectKind::MediaPlayer => {
                    self.lib.libvlc_media_player_event_manager(object.as_ptr())
                }
                ObjectKind::MediaList => self.lib.libvlc_media_list_event_manager(object.as_ptr()),
                ObjectKind::Instance | ObjectKind::EventManager | ObjectKind::Log => {
                    return Err(Error::Other(format!("{kind:?} has no event manager.")));
                }
            }
        };
        self.created(manager, "get event manager")
    }

    unsafe fn event_attach(
        &self,
        manager: NativeHandle,
        event: EventType,
        callback: Callback,
        user_data: *mut c_void,
    ) -> Result<()> {
        let status = unsafe {
            self.lib.libvlc_event_attach(
                manager.as_ptr(),
                event.value(),
                Some(callback),
                user_data,
            )
        };
        Error::from_status(status, || self.errmsg())
    }

    unsafe fn event_detach(
        &self,
        manager: NativeHandle,
        event: EventType,
        callback: Callback,
        user_data: *mut c_void,
    ) {
        unsafe {
            self.lib.libvlc_event_detach(
                manager.as_ptr(),
                event.value(),
                Some(callback),
                user_data,
            )
        }
    }

    unsafe fn log_open(&self, instance: NativeHandle) -> Result<NativeHandle> {
        let log = unsafe { self.lib.libvlc_log_open(instance.as_ptr()) };
        self.created(log, "open log")
    }

    unsafe fn log_close(&self, log: NativeHandle) {
        unsafe { self.lib.libvlc_log_close(log.as_ptr()) }
    }

    unsafe fn log_count(&self, log: NativeHandle) -> usize {
        unsafe { self.lib.libvlc_log_count(log.as_ptr::<vlc_sys::libvlc_log_t>()) as usize }
    }

    unsafe fn log_clear(&self, log: NativeHandle) {
        unsafe { self.lib.libvlc_log_clear(log.as_ptr()) }
    }

    unsafe fn log_messages(&self, log: NativeHandle) -> Result<Vec<LogMessage>> {
        let iterator = unsafe {
            self.lib
                .libvlc_log_get_iterator(log.as_ptr::<vlc_sys::libvlc_log_t>())
        };
        if iterator.is_null() {
            return Err(self.native_error("iterate log"));
        }
        let mut messages = Vec::new();
        unsafe {
            while self.lib.libvlc_log_iterator_has_next(iterator) != 0 {
                let mut buffer = vlc_sys::libvlc_log_message_t::default();
                let message = self.lib.libvlc_log_iterator_next(iterator, &mut buffer);
                if message.is_null() {
                    break;
                }
                let message = &*message;
                messages.push(LogMessage {
                    severity: message.i_severity,
                    kind: string_from_ptr(message.psz_type).unwrap_or_default(),
                    name: string_from_ptr(message.psz_name).unwrap_or_default(),
                    header: string_from_ptr(message.psz_header),
                    message: string_from_ptr(message.psz_message).unwrap_or_default(),
                });
            }
            self.lib.libvlc_log_iterator_free(iterator);
        }
        Ok(messages)
    }
}
