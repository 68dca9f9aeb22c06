// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! Media players.

use std::sync::Arc;

use crate::{
    EventManager, Media, ObjectKind, Result, State,
    object::{Object, impl_wrapper, private::Sealed},
};

/// Plays one [`Media`] at a time.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use vlc::{Instance, Registry, State, Wrapper, dummy::DummyApi};
///
/// # fn main() -> Result<(), vlc::Error> {
/// let instance = Instance::with_registry(Arc::new(DummyApi::new()), Registry::new(), &[])?;
/// let media = instance.media_new("/tmp/foo.avi")?;
/// let player = instance.media_player_new()?;
/// player.set_media(Some(&media))?;
///
/// // The accessor resolves to the very same wrapper, with one more reference.
/// let current = player.media()?.expect("media was set");
/// assert!(current.same_object(&media));
/// assert_eq!(media.refcount(), Some(2));
/// assert_eq!(player.state()?, State::NothingSpecial);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct MediaPlayer {
    object: Arc<Object>,
}

impl_wrapper!(MediaPlayer, ObjectKind::MediaPlayer);

impl MediaPlayer {
    /// Replaces the media of the player. `None` removes it.
    ///
    /// The player holds its own native reference; the caller's references to
    /// `media` are unaffected.
    ///
    /// # Errors
    ///
    /// [`crate::Error::UseAfterRelease`] if the player or `media` was released.
    pub fn set_media(&self, media: Option<&Media>) -> Result<()> {
        let call = self.object.enter()?;
        let handle = call.handle();
        let media_call = media.map(|media| media.object().enter()).transpose()?;
        let media = media_call.as_ref().map(|call| call.handle());
        unsafe { self.object.api().media_player_set_media(handle, media) };
        Ok(())
    }

    /// Current media of the player, `None` if there is none.
    ///
    /// A returned media counts as a new reference on its wrapper; release it
    /// once done to keep the counts balanced.
    pub fn media(&self) -> Result<Option<Media>> {
        let call = self.object.enter()?;
        let handle = call.handle();
        let api = self.object.api();
        match unsafe { api.media_player_media(handle) } {
            Some(media) => unsafe { self.object.registry().acquire(api, media) }.map(Some),
            None => Ok(None),
        }
    }

    /// Playback state of the player.
    pub fn state(&self) -> Result<State> {
        let call = self.object.enter()?;
        let handle = call.handle();
        unsafe { self.object.api().media_player_state(handle) }
    }

    /// Starts playback.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Native`] if the player has no media or playback cannot
    /// start.
    pub fn play(&self) -> Result<()> {
        let call = self.object.enter()?;
        let handle = call.handle();
        unsafe { self.object.api().media_player_play(handle) }
    }

    /// Stops playback and moves the player to [`State::Stopped`].
    ///
    /// # Errors
    ///
    /// [`crate::Error::UseAfterRelease`] if the player was released.
    pub fn stop(&self) -> Result<()> {
        let call = self.object.enter()?;
        let handle = call.handle();
        unsafe { self.object.api().media_player_stop(handle) };
        Ok(())
    }

    /// Event manager of the player. Repeated calls return the same manager.
    pub fn event_manager(&self) -> Result<EventManager> {
        self.object.event_manager()
    }
}
