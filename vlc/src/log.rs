// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! Message logs of an instance.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{ApiHandle, Error, NativeHandle, ObjectKind, Result, object::Liveness};

/// One message read from a [`Log`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    /// `0` info, `1` error, `2` warning, `3` debug.
    pub severity: i32,
    /// Type of the emitting module (`"main"`, `"interface"`, ...).
    pub kind: String,
    /// Name of the emitting module.
    pub name: String,
    pub header: Option<String>,
    pub message: String,
}

/// A message log opened on an [`crate::Instance`].
///
/// Logs are owned exclusively by the value returned from
/// [`crate::Instance::log_open`]; they are not shared native objects and are
/// therefore not registered. The log is closed by [`Log::close`] or when the
/// value is dropped.
pub struct Log {
    api: ApiHandle,
    handle: NativeHandle,
    state: Mutex<Liveness>,
}

impl Log {
    pub(crate) fn new(api: ApiHandle, handle: NativeHandle) -> Self {
        Self {
            api,
            handle,
            state: Mutex::new(Liveness::Live),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Liveness> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with the native handle while the log is open.
    fn with_handle<T>(&self, f: impl FnOnce(NativeHandle) -> T) -> Result<T> {
        match *self.lock() {
            Liveness::Live => Ok(f(self.handle)),
            Liveness::Invalidated => Err(Error::UseAfterRelease(ObjectKind::Log)),
        }
    }

    /// Number of buffered messages.
    pub fn count(&self) -> Result<usize> {
        self.with_handle(|log| unsafe { self.api.log_count(log) })
    }

    /// Discards all buffered messages.
    pub fn clear(&self) -> Result<()> {
        self.with_handle(|log| unsafe { self.api.log_clear(log) })
    }

    /// Copies the buffered messages, oldest first.
    pub fn messages(&self) -> Result<Vec<LogMessage>> {
        self.with_handle(|log| unsafe { self.api.log_messages(log) })?
    }

    /// Closes the log.
    ///
    /// # Errors
    ///
    /// [`Error::UseAfterRelease`] if the log was already closed.
    pub fn close(&self) -> Result<()> {
        let mut state = self.lock();
        if *state == Liveness::Invalidated {
            return Err(Error::UseAfterRelease(ObjectKind::Log));
        }
        *state = Liveness::Invalidated;
        unsafe { self.api.log_close(self.handle) };
        Ok(())
    }

    /// Whether [`Log::close`] was not called yet.
    pub fn is_open(&self) -> bool {
        *self.lock() == Liveness::Live
    }
}

impl Drop for Log {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if *state == Liveness::Live {
            *state = Liveness::Invalidated;
            unsafe { self.api.log_close(self.handle) };
        }
    }
}

impl std::fmt::Debug for Log {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Log")
            .field("handle", &self.handle)
            .field("open", &self.is_open())
            .finish()
    }
}
