// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! Media lists.

use std::sync::Arc;

use crate::{
    Error, EventManager, Media, ObjectKind, Result,
    object::{Object, impl_wrapper, private::Sealed},
};

/// An ordered list of [`Media`] items.
#[derive(Clone, Debug)]
pub struct MediaList {
    object: Arc<Object>,
}

impl_wrapper!(MediaList, ObjectKind::MediaList);

impl MediaList {
    /// Appends `media`. The list holds its own native reference.
    pub fn add_media(&self, media: &Media) -> Result<()> {
        let call = self.object.enter()?;
        let handle = call.handle();
        let media_call = media.object().enter()?;
        let media = media_call.handle();
        unsafe { self.object.api().media_list_add_media(handle, media) }
    }

    /// Number of media in the list.
    pub fn count(&self) -> Result<usize> {
        let call = self.object.enter()?;
        let handle = call.handle();
        Ok(unsafe { self.object.api().media_list_count(handle) })
    }

    /// Item at `index`, counted as a new reference on its wrapper.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if `index` is not below [`MediaList::count`].
    pub fn item_at_index(&self, index: usize) -> Result<Media> {
        let call = self.object.enter()?;
        let handle = call.handle();
        let api = self.object.api();
        match unsafe { api.media_list_item_at_index(handle, index) } {
            Some(media) => unsafe { self.object.registry().acquire(api, media) },
            None => Err(Error::IndexOutOfRange {
                index,
                count: unsafe { api.media_list_count(handle) },
            }),
        }
    }

    /// All items, each counted as a new reference.
    pub fn items(&self) -> Result<Vec<Media>> {
        (0..self.count()?)
            .map(|index| self.item_at_index(index))
            .collect()
    }

    /// Event manager of the list. Repeated calls return the same manager.
    pub fn event_manager(&self) -> Result<EventManager> {
        self.object.event_manager()
    }
}
