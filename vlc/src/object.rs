// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! Wrapper lifecycle.
//!
//! Every registered wrapper (`Instance`, `Media`, `MediaPlayer`, `MediaList`)
//! is a cheap handle onto one shared [`Object`] cell. The cell owns the
//! lazily created [`EventManager`] of the native object and a [`Lifecycle`]
//! carrying the tagged [`Liveness`] state.
//!
//! Delegated calls run inside a [`Call`]. Invalidation takes effect at once
//! for new calls, but the native reference backing the last logical one is
//! only given up when the calls in flight on other threads have returned, so a
//! call that passed the liveness check never reaches a destroyed object.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tracing::{trace, warn};

use crate::{
    ApiHandle, Error, EventManager, EventType, NativeHandle, ObjectKind, Result,
    event::{DispatchKey, EventTeardown, HandlerFn},
    registry::{Registry, WrapperId},
};

/// Lifecycle state of a wrapper.
///
/// `Live` while the registry holds at least one reference for it,
/// `Invalidated` (terminal) once the last reference is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Liveness {
    Live,
    Invalidated,
}

struct LifeState {
    liveness: Liveness,
    /// Delegated calls currently running.
    calls: usize,
    /// Native releases postponed until `calls` drops to zero.
    owed: usize,
}

/// Liveness of one native object, shared by its wrapper and its event
/// manager.
pub(crate) struct Lifecycle {
    handle: NativeHandle,
    kind: ObjectKind,
    api: ApiHandle,
    state: Mutex<LifeState>,
}

impl Lifecycle {
    fn new(handle: NativeHandle, kind: ObjectKind, api: ApiHandle) -> Self {
        Self {
            handle,
            kind,
            api,
            state: Mutex::new(LifeState {
                liveness: Liveness::Live,
                calls: 0,
                owed: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LifeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn api(&self) -> &ApiHandle {
        &self.api
    }

    pub(crate) fn is_live(&self) -> bool {
        self.lock().liveness == Liveness::Live
    }

    /// Starts a delegated call.
    ///
    /// # Errors
    ///
    /// [`Error::UseAfterRelease`] once the object was invalidated.
    pub(crate) fn enter(&self) -> Result<Call<'_>> {
        let mut state = self.lock();
        if state.liveness == Liveness::Invalidated {
            return Err(Error::UseAfterRelease(self.kind));
        }
        state.calls += 1;
        Ok(Call { lifecycle: self })
    }

    /// Moves to [`Liveness::Invalidated`]; `false` if it already was.
    fn invalidate(&self) -> bool {
        let mut state = self.lock();
        let live = state.liveness == Liveness::Live;
        state.liveness = Liveness::Invalidated;
        live
    }

    /// Gives up one native reference, once no call is running.
    fn release_native(&self) {
        {
            let mut state = self.lock();
            if state.calls > 0 {
                state.owed += 1;
                trace!(
                    "Deferred release of {:?} {} until {} call(s) return.",
                    self.kind, self.handle, state.calls
                );
                return;
            }
        }
        unsafe { self.api.release(self.kind, self.handle) };
    }
}

/// A delegated call in progress; keeps the native object alive.
pub(crate) struct Call<'a> {
    lifecycle: &'a Lifecycle,
}

impl Call<'_> {
    pub(crate) fn handle(&self) -> NativeHandle {
        self.lifecycle.handle
    }
}

impl Drop for Call<'_> {
    fn drop(&mut self) {
        let owed = {
            let mut state = self.lifecycle.lock();
            state.calls -= 1;
            if state.calls == 0 {
                std::mem::take(&mut state.owed)
            } else {
                0
            }
        };
        let lifecycle = self.lifecycle;
        for _ in 0..owed {
            unsafe { lifecycle.api.release(lifecycle.kind, lifecycle.handle) };
        }
    }
}

/// Shared cell behind every registered wrapper value.
pub struct Object {
    id: WrapperId,
    registry: Registry,
    lifecycle: Arc<Lifecycle>,
    events: Mutex<Option<EventManager>>,
}

impl Object {
    pub(crate) fn new(
        id: WrapperId,
        handle: NativeHandle,
        kind: ObjectKind,
        api: ApiHandle,
        registry: Registry,
    ) -> Self {
        Self {
            id,
            registry,
            lifecycle: Arc::new(Lifecycle::new(handle, kind, api)),
            events: Mutex::new(None),
        }
    }

    fn lock_events(&self) -> MutexGuard<'_, Option<EventManager>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn id(&self) -> WrapperId {
        self.id
    }

    pub(crate) fn handle(&self) -> NativeHandle {
        self.lifecycle.handle
    }

    pub(crate) fn kind(&self) -> ObjectKind {
        self.lifecycle.kind
    }

    pub(crate) fn api(&self) -> &ApiHandle {
        self.lifecycle.api()
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn is_live(&self) -> bool {
        self.lifecycle.is_live()
    }

    /// Starts a delegated call on the native object.
    pub(crate) fn enter(&self) -> Result<Call<'_>> {
        self.lifecycle.enter()
    }

    /// Returns the cached event manager, creating it on first use.
    pub(crate) fn event_manager(&self) -> Result<EventManager> {
        let call = self.enter()?;
        let mut events = self.lock_events();
        // Invalidation marks the lifecycle before it takes the manager.
        if !self.is_live() {
            return Err(Error::UseAfterRelease(self.kind()));
        }
        if let Some(manager) = &*events {
            return Ok(manager.clone());
        }
        let native = unsafe { self.api().event_manager(self.kind(), call.handle())? };
        let manager = EventManager::new(
            self.lifecycle.clone(),
            native,
            DispatchKey::new(&self.registry, self.id),
        );
        *events = Some(manager.clone());
        Ok(manager)
    }

    /// Snapshot of the handlers registered for `kind` on this object.
    pub(crate) fn handlers(&self, kind: EventType) -> Vec<HandlerFn> {
        self.lock_events()
            .as_ref()
            .map(|manager| manager.handlers(kind))
            .unwrap_or_default()
    }

    /// Moves the object to [`Liveness::Invalidated`] and closes its event
    /// manager.
    ///
    /// Returns `None` if the object was already invalidated. Native detaching
    /// of the closed callbacks is left to the returned teardown so that it can
    /// run after every lock has been released.
    pub(crate) fn invalidate(&self) -> Option<Teardown> {
        if !self.lifecycle.invalidate() {
            return None;
        }
        let events = self.lock_events().take().and_then(|manager| manager.close());
        Some(Teardown { events })
    }

    /// Gives up the native reference backing the last logical one.
    pub(crate) fn release_native(&self) {
        self.lifecycle.release_native();
    }
}

impl Drop for Object {
    /// Forfeits the references still held when every wrapper value is gone.
    ///
    /// The registry entry is evicted only if it still belongs to this object;
    /// a concurrent `acquire` may already have replaced it and released the
    /// stale references itself.
    fn drop(&mut self) {
        let Some(teardown) = self.invalidate() else {
            return;
        };
        let pending = self.registry.forfeit(self.handle(), self.id);
        teardown.finish();
        if pending > 0 {
            warn!(
                "{:?} {} dropped with {} unreleased reference(s).",
                self.kind(),
                self.handle(),
                pending
            );
            for _ in 0..pending {
                self.release_native();
            }
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("kind", &self.kind())
            .field("handle", &self.handle())
            .field("live", &self.is_live())
            .finish()
    }
}

/// Work left after invalidation, performed without holding any lock.
pub(crate) struct Teardown {
    events: Option<EventTeardown>,
}

impl Teardown {
    pub(crate) fn finish(self) {
        if let Some(events) = self.events {
            events.finish();
        }
    }
}

pub(crate) mod private {
    use std::sync::Arc;

    use crate::object::Object;

    pub trait Sealed {
        fn object(&self) -> &Arc<Object>;

        fn from_object(object: Arc<Object>) -> Self;
    }
}

/// Operations shared by every registered wrapper.
///
/// Each wrapper value stands for the shared object behind one native handle.
/// Cloning a wrapper does not create a new logical reference; only
/// construction, accessors returning objects, and [`Wrapper::retain`] do.
pub trait Wrapper: private::Sealed + Sized {
    /// Kind of native object wrapped by this type.
    const KIND: ObjectKind;

    /// Native handle of the wrapped object.
    fn handle(&self) -> NativeHandle {
        self.object().handle()
    }

    /// Adds one logical reference (and one native reference).
    ///
    /// # Errors
    ///
    /// [`Error::UseAfterRelease`] if the wrapper was invalidated.
    fn retain(&self) -> Result<()> {
        let object = self.object();
        object.registry().retain_object(object)
    }

    /// Gives up one logical reference. The last release invalidates the
    /// wrapper, clears the callbacks of its event manager and evicts its
    /// registry entry.
    ///
    /// # Errors
    ///
    /// [`Error::Underflow`] if every reference was already released.
    fn release(&self) -> Result<()> {
        let object = self.object();
        object.registry().release_object(object)
    }

    /// Outstanding logical references, `None` once invalidated.
    fn refcount(&self) -> Option<usize> {
        let object = self.object();
        object
            .registry()
            .lookup_object(object)
            .map(|entry| entry.refcount)
    }

    /// Whether the wrapper can still be used.
    fn is_live(&self) -> bool {
        self.object().is_live()
    }

    /// Whether both values are the same wrapper instance.
    fn same_object(&self, other: &Self) -> bool {
        Arc::ptr_eq(self.object(), other.object())
    }
}

/// Implements the sealed plumbing of [`Wrapper`] for a newtype around
/// `Arc<Object>`.
macro_rules! impl_wrapper {
    ($name:ident, $kind:expr) => {
        impl $crate::object::private::Sealed for $name {
            fn object(&self) -> &std::sync::Arc<$crate::object::Object> {
                &self.object
            }

            fn from_object(object: std::sync::Arc<$crate::object::Object>) -> Self {
                Self { object }
            }
        }

        impl $crate::Wrapper for $name {
            const KIND: $crate::ObjectKind = $kind;
        }
    };
}

pub(crate) use impl_wrapper;
