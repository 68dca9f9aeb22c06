// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for libvlc operations.
//!
//! This module defines the error type returned by the binding. It covers both
//! misuse of the reference discipline (detected by the handle registry and the
//! wrapper lifecycle) and failures reported by the native library itself.

use crate::{NativeHandle, ObjectKind};

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur when using the binding.
///
/// Registry and lifecycle errors are always returned to the caller: they point
/// at an unbalanced `retain`/`release` or at a wrapper used after its last
/// reference was given up.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `retain`/`release` on a handle that has no registry entry.
    #[error("Unknown handle {0}")]
    UnknownHandle(NativeHandle),

    /// `release` on a wrapper whose references were already all released.
    #[error("Reference count underflow for handle {0}")]
    Underflow(NativeHandle),

    /// An operation was invoked on an invalidated wrapper.
    #[error("{0:?} used after its last reference was released")]
    UseAfterRelease(ObjectKind),

    /// A live handle was acquired as a different kind of object than the one
    /// it is registered as.
    #[error("Handle {handle} is registered as {registered:?}, not {requested:?}")]
    KindMismatch {
        handle: NativeHandle,
        registered: ObjectKind,
        requested: ObjectKind,
    },

    /// A raw value read from the native library has no matching enum variant.
    #[error("Unknown {name} value: {value}")]
    UnknownEnumValue { name: &'static str, value: i64 },

    /// An index was outside of the bounds of a native collection.
    #[error("Index {index} out of range (count {count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// A failure reported by the native library, passed through unchanged.
    #[error("libvlc error: {0}")]
    Native(String),

    /// A generic error for Rust-level failures not covered by other variants.
    #[error("Other error: {0}")]
    Other(String),

    /// Failed to convert a Rust string to a C-compatible null-terminated string.
    #[error("Null string: {0}")]
    NulString(#[from] std::ffi::NulError),

    /// Failed to load or interact with the libvlc dynamic library.
    #[error("Loading library: {0}")]
    LibLoading(#[from] libloading::Error),

    /// Failed to parse a configuration document.
    #[error("Configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Converts a libvlc integer status (`0` success, `-1` failure) to a
    /// [`Result`].
    ///
    /// `message` is only evaluated on failure; implementations pass the native
    /// error message when the library provides one.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let status = unsafe { lib.libvlc_add_intf(instance, name.as_ptr()) };
    /// Error::from_status(status, || errmsg(lib))?;
    /// ```
    pub fn from_status<F>(status: i32, message: F) -> Result<()>
    where
        F: FnOnce() -> Option<String>,
    {
        if status == 0 {
            Ok(())
        } else {
            Err(Error::Native(
                message().unwrap_or_else(|| format!("status {status}")),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_zero_is_success() {
        assert!(Error::from_status(0, || panic!("not evaluated")).is_ok());
    }

    #[test]
    fn failure_carries_native_message() {
        let err = Error::from_status(-1, || Some("no such module".to_string())).unwrap_err();
        assert!(matches!(err, Error::Native(ref msg) if msg == "no such module"));

        let err = Error::from_status(-1, || None).unwrap_err();
        assert_eq!(err.to_string(), "libvlc error: status -1");
    }
}
