// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! Handle registry.
//!
//! The registry maps every live native handle to the single wrapper object
//! standing for it, together with the number of logical references the Rust
//! side holds. Each logical reference corresponds to exactly one native
//! reference, so `retain` and `release` are forwarded to the native library
//! one-for-one.
//!
//! The registry only keeps a [`Weak`] back-reference to the wrapper; the
//! wrapper values handed out to callers keep it alive.
//!
//! # Locking
//!
//! A single mutex guards the table. While it is held the registry never runs
//! user event handlers, never drops a wrapper object and never calls native
//! entry points that may re-enter the binding (event detach, release). Native
//! retains are issued under the lock so that a concurrent release can never
//! destroy the native object in between.
//!
//! Handles released to zero are remembered until the native allocator hands
//! them out again, so that releasing one once more is reported as an
//! [`Error::Underflow`] rather than an unknown handle.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak},
};

use tracing::{debug, trace};

use crate::{
    ApiHandle, Error, Event, NativeHandle, ObjectKind, Result, Wrapper,
    object::{Object, Teardown},
};

/// Process-unique identifier of a wrapper object.
///
/// Distinguishes two successive wrappers created for the same raw handle
/// value after the native allocator reused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct WrapperId(u64);

/// Snapshot of a registry entry, as returned by [`Registry::lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedEntry {
    /// Native handle the entry is keyed by.
    pub handle: NativeHandle,
    /// Kind of object the handle was registered as.
    pub kind: ObjectKind,
    /// Outstanding logical references, always at least one.
    pub refcount: usize,
}

struct Slot {
    kind: ObjectKind,
    refcount: usize,
    id: WrapperId,
    api: ApiHandle,
    wrapper: Weak<Object>,
}

impl Slot {
    fn entry(&self, handle: NativeHandle) -> ManagedEntry {
        ManagedEntry {
            handle,
            kind: self.kind,
            refcount: self.refcount,
        }
    }

    fn is_alive(&self) -> bool {
        self.wrapper.strong_count() > 0
    }
}

#[derive(Default)]
struct RegistryState {
    slots: HashMap<NativeHandle, Slot>,
    owners: HashMap<WrapperId, NativeHandle>,
    /// Handles whose entry was removed and not registered again since.
    released: HashSet<NativeHandle>,
    next_id: u64,
}

impl RegistryState {
    fn next_id(&mut self) -> WrapperId {
        self.next_id += 1;
        WrapperId(self.next_id)
    }

    /// Inserts a fresh slot and object for `handle`, replacing any stale slot.
    ///
    /// Returns the new object and the reference count of the replaced slot.
    fn insert(
        &mut self,
        registry: &Registry,
        api: &ApiHandle,
        handle: NativeHandle,
        kind: ObjectKind,
    ) -> (Arc<Object>, usize) {
        let id = self.next_id();
        let object = Arc::new(Object::new(
            id,
            handle,
            kind,
            api.clone(),
            registry.clone(),
        ));
        let slot = Slot {
            kind,
            refcount: 1,
            id,
            api: api.clone(),
            wrapper: Arc::downgrade(&object),
        };
        let stale = match self.slots.insert(handle, slot) {
            Some(stale) => {
                self.owners.remove(&stale.id);
                stale.refcount
            }
            None => 0,
        };
        self.owners.insert(id, handle);
        self.released.remove(&handle);
        (object, stale)
    }

    fn remove(&mut self, handle: NativeHandle) -> Option<Slot> {
        let slot = self.slots.remove(&handle)?;
        self.owners.remove(&slot.id);
        self.released.insert(handle);
        Some(slot)
    }

    /// Returns the slot of `handle` only if it still belongs to wrapper `id`.
    fn owned_slot(&mut self, handle: NativeHandle, id: WrapperId) -> Option<&mut Slot> {
        self.slots.get_mut(&handle).filter(|slot| slot.id == id)
    }
}

pub(crate) struct RegistryInner {
    state: Mutex<RegistryState>,
}

/// Table of live native handles and the wrappers standing for them.
///
/// Cloning a `Registry` yields another handle to the same table. Most code
/// uses the process-wide [`Registry::shared`] instance; isolated registries
/// created with [`Registry::new`] are mainly useful in tests.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("len", &self.len()).finish()
    }
}

impl Registry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                state: Mutex::new(RegistryState::default()),
            }),
        }
    }

    /// Returns the process-wide registry, creating it on first use.
    ///
    /// The shared registry is never torn down.
    pub fn shared() -> &'static Registry {
        static SHARED: OnceLock<Registry> = OnceLock::new();
        SHARED.get_or_init(Registry::new)
    }

    pub(crate) fn downgrade(&self) -> Weak<RegistryInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(inner: &Weak<RegistryInner>) -> Option<Self> {
        inner.upgrade().map(|inner| Self { inner })
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    /// Whether no handle is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().slots.is_empty()
    }

    /// Returns the entry registered for `handle`, if any.
    pub fn lookup(&self, handle: NativeHandle) -> Option<ManagedEntry> {
        let state = self.lock();
        state
            .slots
            .get(&handle)
            .filter(|slot| slot.is_alive())
            .map(|slot| slot.entry(handle))
    }

    pub(crate) fn lookup_object(&self, object: &Object) -> Option<ManagedEntry> {
        let mut state = self.lock();
        state
            .owned_slot(object.handle(), object.id())
            .map(|slot| slot.entry(object.handle()))
    }

    /// Returns the wrapper standing for `handle`, registering it if needed.
    ///
    /// If `handle` is already registered, its reference count is incremented
    /// and the existing wrapper is returned, so two accessors resolving the
    /// same live handle yield the same object. Otherwise a new entry with a
    /// reference count of one is created.
    ///
    /// # Safety
    ///
    /// `handle` must be a live native object of kind `W::KIND` created by
    /// `api`, and the caller must own one native reference to it. That
    /// reference is handed over to the registry, on success as well as on
    /// error.
    ///
    /// # Errors
    ///
    /// [`Error::KindMismatch`] if `handle` is registered as a different kind of
    /// object.
    pub unsafe fn acquire<W: Wrapper>(&self, api: &ApiHandle, handle: NativeHandle) -> Result<W> {
        let mut stale = 0;
        let result = {
            let mut state = self.lock();
            let existing = match state.slots.get_mut(&handle) {
                Some(slot) if slot.kind != W::KIND => Err(Error::KindMismatch {
                    handle,
                    registered: slot.kind,
                    requested: W::KIND,
                }),
                Some(slot) => Ok(slot.wrapper.upgrade().inspect(|_| {
                    slot.refcount += 1;
                    debug!(
                        "Acquired {:?} {} (refcount {}).",
                        W::KIND,
                        handle,
                        slot.refcount
                    );
                })),
                None => Ok(None),
            };
            match existing {
                Ok(None) => {
                    let (object, count) = state.insert(self, api, handle, W::KIND);
                    if count > 0 {
                        debug!("Replaced stale {:?} {}.", W::KIND, handle);
                    } else {
                        debug!("Registered {:?} {}.", W::KIND, handle);
                    }
                    stale = count;
                    Ok(object)
                }
                Ok(Some(object)) => Ok(object),
                Err(err) => Err(err),
            }
        };
        for _ in 0..stale {
            unsafe { api.release(W::KIND, handle) };
        }
        match result {
            Ok(object) => Ok(W::from_object(object)),
            Err(err) => {
                // The handle is the object registered under that kind.
                let kind = match &err {
                    Error::KindMismatch { registered, .. } => *registered,
                    _ => W::KIND,
                };
                unsafe { api.release(kind, handle) };
                Err(err)
            }
        }
    }

    /// Adds one reference to a registered handle.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownHandle`] if `handle` is not registered.
    pub fn retain(&self, handle: NativeHandle) -> Result<()> {
        let mut state = self.lock();
        let slot = state
            .slots
            .get_mut(&handle)
            .filter(|slot| slot.is_alive())
            .ok_or(Error::UnknownHandle(handle))?;
        slot.refcount += 1;
        unsafe { slot.api.retain(slot.kind, handle) };
        debug!("Retained {:?} {} (refcount {}).", slot.kind, handle, slot.refcount);
        Ok(())
    }

    pub(crate) fn retain_object(&self, object: &Object) -> Result<()> {
        let mut state = self.lock();
        let slot = state
            .owned_slot(object.handle(), object.id())
            .ok_or(Error::UseAfterRelease(object.kind()))?;
        slot.refcount += 1;
        unsafe { slot.api.retain(slot.kind, object.handle()) };
        debug!(
            "Retained {:?} {} (refcount {}).",
            slot.kind,
            object.handle(),
            slot.refcount
        );
        Ok(())
    }

    /// Gives up one reference to a registered handle.
    ///
    /// When the count reaches zero the entry is removed, the wrapper is
    /// invalidated and the callbacks of its event manager are detached.
    ///
    /// # Errors
    ///
    /// - [`Error::Underflow`] if the handle was already released to zero.
    /// - [`Error::UnknownHandle`] if `handle` is not registered.
    pub fn release(&self, handle: NativeHandle) -> Result<()> {
        let (object, teardown) = {
            let mut state = self.lock();
            let Some(slot) = state.slots.get_mut(&handle) else {
                return Err(if state.released.contains(&handle) {
                    Error::Underflow(handle)
                } else {
                    Error::UnknownHandle(handle)
                });
            };
            // A slot without wrapper is being forfeited by the wrapper's drop.
            let object = slot
                .wrapper
                .upgrade()
                .ok_or(Error::UnknownHandle(handle))?;
            let mut teardown = None;
            if Self::decrement(slot, handle) {
                teardown = object.invalidate();
                state.remove(handle);
            }
            (object, teardown)
        };
        Self::finish_release(&object, teardown);
        drop(object);
        Ok(())
    }

    pub(crate) fn release_object(&self, object: &Object) -> Result<()> {
        let handle = object.handle();
        let teardown = {
            let mut state = self.lock();
            let slot = state
                .owned_slot(handle, object.id())
                .ok_or(Error::Underflow(handle))?;
            if Self::decrement(slot, handle) {
                let teardown = object.invalidate();
                state.remove(handle);
                teardown
            } else {
                None
            }
        };
        Self::finish_release(object, teardown);
        Ok(())
    }

    /// Decrements the count of `slot`, returning whether it reached zero.
    fn decrement(slot: &mut Slot, handle: NativeHandle) -> bool {
        slot.refcount -= 1;
        debug!(
            "Released {:?} {} (refcount {}).",
            slot.kind, handle, slot.refcount
        );
        slot.refcount == 0
    }

    /// Detaches the callbacks of an invalidated object, then gives up the
    /// native reference.
    fn finish_release(object: &Object, teardown: Option<Teardown>) {
        if let Some(teardown) = teardown {
            debug!("Invalidated {:?} {}.", object.kind(), object.handle());
            teardown.finish();
        }
        object.release_native();
    }

    /// Evicts the entry of `handle` if it still belongs to wrapper `id`.
    ///
    /// Returns the number of references the entry still held; the caller is
    /// responsible for releasing them natively.
    pub(crate) fn forfeit(&self, handle: NativeHandle, id: WrapperId) -> usize {
        let mut state = self.lock();
        if state.owned_slot(handle, id).is_none() {
            return 0;
        }
        state.remove(handle).map_or(0, |slot| slot.refcount)
    }

    /// Delivers `event` to the handlers of the wrapper `owner`.
    ///
    /// Handlers run on the calling thread with no lock held.
    pub(crate) fn dispatch(&self, owner: WrapperId, event: &Event) {
        let object = {
            let state = self.lock();
            state
                .owners
                .get(&owner)
                .and_then(|handle| state.slots.get(handle))
                .and_then(|slot| slot.wrapper.upgrade())
        };
        let Some(object) = object else {
            trace!("Dropped {:?} for a released wrapper.", event.kind);
            return;
        };
        let handlers = object.handlers(event.kind);
        drop(object);
        trace!("Dispatching {:?} to {} handler(s).", event.kind, handlers.len());
        for handler in handlers {
            handler(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{ApiHandle, Instance, Media, NativeApi, dummy::DummyApi};

    fn setup() -> (Arc<DummyApi>, ApiHandle, Registry, Instance) {
        let dummy = Arc::new(DummyApi::new());
        let api: ApiHandle = dummy.clone();
        let registry = Registry::new();
        let instance = Instance::with_registry(api.clone(), registry.clone(), &[]).unwrap();
        (dummy, api, registry, instance)
    }

    #[test]
    fn acquire_returns_the_same_wrapper() {
        let (dummy, api, registry, instance) = setup();
        let media = instance.media_new_location("file:///tmp/foo.avi").unwrap();
        let handle = media.handle();

        unsafe { dummy.retain(ObjectKind::Media, handle) };
        let again: Media = unsafe { registry.acquire(&api, handle) }.unwrap();

        assert!(again.same_object(&media));
        assert_eq!(registry.lookup(handle).unwrap().refcount, 2);
        assert_eq!(dummy.native_refcount(handle), Some(2));
    }

    #[test]
    fn release_to_zero_evicts_the_entry() {
        let (dummy, _api, registry, instance) = setup();
        let media = instance.media_new_location("file:///tmp/foo.avi").unwrap();
        let handle = media.handle();

        registry.retain(handle).unwrap();
        registry.release(handle).unwrap();
        assert!(media.is_live());
        registry.release(handle).unwrap();

        assert!(!media.is_live());
        assert!(registry.lookup(handle).is_none());
        assert!(!dummy.is_alive(handle));
        assert!(matches!(registry.release(handle), Err(Error::Underflow(h)) if h == handle));
        assert!(matches!(registry.retain(handle), Err(Error::UnknownHandle(_))));
        assert!(dummy.violations().is_empty());
    }

    #[test]
    fn unregistered_handle_is_unknown() {
        let (_dummy, _api, registry, _instance) = setup();
        let handle = NativeHandle::from_raw(0xdead_0000).unwrap();
        assert!(matches!(registry.release(handle), Err(Error::UnknownHandle(h)) if h == handle));
    }

    #[test]
    fn reusing_a_released_handle_clears_the_underflow() {
        let (dummy, _api, registry, instance) = setup();
        let media = instance.media_new_location("file:///tmp/foo.avi").unwrap();
        let handle = media.handle();
        media.release().unwrap();
        assert!(matches!(registry.release(handle), Err(Error::Underflow(_))));

        let reused = instance.media_new_location("file:///tmp/bar.avi").unwrap();
        assert_eq!(reused.handle(), handle);
        registry.release(handle).unwrap();
        assert!(!reused.is_live());
        assert!(matches!(registry.release(handle), Err(Error::Underflow(_))));
        assert!(dummy.violations().is_empty());
    }

    #[test]
    fn release_skips_a_slot_whose_wrapper_is_gone() {
        let (dummy, _api, registry, instance) = setup();
        let media = instance.media_new_location("file:///tmp/foo.avi").unwrap();
        let handle = media.handle();
        let object = registry
            .lock()
            .slots
            .get_mut(&handle)
            .map(|slot| std::mem::replace(&mut slot.wrapper, Weak::new()))
            .unwrap();

        assert!(matches!(registry.release(handle), Err(Error::UnknownHandle(h)) if h == handle));
        assert_eq!(dummy.native_refcount(handle), Some(1));
        assert_eq!(registry.len(), 2);

        registry.lock().slots.get_mut(&handle).unwrap().wrapper = object;
        drop(media);
        assert!(!dummy.is_alive(handle));
        assert!(dummy.violations().is_empty());
    }

    #[test]
    fn kind_mismatch_consumes_the_reference() {
        let (dummy, api, registry, instance) = setup();
        let media = instance.media_new_location("file:///tmp/foo.avi").unwrap();
        let handle = media.handle();

        unsafe { dummy.retain(ObjectKind::Media, handle) };
        let result: Result<Instance> = unsafe { registry.acquire(&api, handle) };

        assert!(matches!(
            result,
            Err(Error::KindMismatch {
                registered: ObjectKind::Media,
                requested: ObjectKind::Instance,
                ..
            })
        ));
        assert_eq!(dummy.native_refcount(handle), Some(1));
        assert_eq!(registry.lookup(handle).unwrap().refcount, 1);
        assert!(dummy.violations().is_empty());
    }

    #[test]
    fn dropping_every_value_forfeits_the_references() {
        let (dummy, _api, registry, instance) = setup();
        let media = instance.media_new_location("file:///tmp/foo.avi").unwrap();
        let handle = media.handle();
        media.retain().unwrap();
        assert_eq!(dummy.native_refcount(handle), Some(2));

        drop(media);

        assert!(registry.lookup(handle).is_none());
        assert!(!dummy.is_alive(handle));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn isolated_registries_do_not_share_entries() {
        let (_dummy, _api, registry, instance) = setup();
        assert_eq!(registry.len(), 1);
        assert!(Registry::new().lookup(instance.handle()).is_none());
    }
}
