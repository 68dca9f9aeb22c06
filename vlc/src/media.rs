// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! Media items.

use std::sync::Arc;

use crate::{
    EventManager, Meta, ObjectKind, Result, State,
    object::{Object, impl_wrapper},
};

/// A media item (a file, a stream, a capture device...).
///
/// Created with [`crate::Instance::media_new`] and friends, or returned by the
/// accessors of players and lists. All values standing for the same native
/// media share one wrapper object: see [`crate::Wrapper::same_object`].
#[derive(Clone, Debug)]
pub struct Media {
    object: Arc<Object>,
}

impl_wrapper!(Media, ObjectKind::Media);

impl Media {
    /// MRL of the media, e.g. `file:///tmp/foo.avi`.
    ///
    /// # Errors
    ///
    /// [`crate::Error::UseAfterRelease`] if the media was released.
    pub fn mrl(&self) -> Result<String> {
        let call = self.object.enter()?;
        let handle = call.handle();
        unsafe { self.object.api().media_mrl(handle) }
    }

    /// Reads a meta data field. Returns `Ok(None)` if the field is not set.
    pub fn meta(&self, meta: Meta) -> Result<Option<String>> {
        let call = self.object.enter()?;
        let handle = call.handle();
        Ok(unsafe { self.object.api().media_meta(handle, meta) })
    }

    /// Parsing and playback state of the media.
    pub fn state(&self) -> Result<State> {
        let call = self.object.enter()?;
        let handle = call.handle();
        unsafe { self.object.api().media_state(handle) }
    }

    /// Event manager of the media. Repeated calls return the same manager.
    pub fn event_manager(&self) -> Result<EventManager> {
        self.object.event_manager()
    }
}
