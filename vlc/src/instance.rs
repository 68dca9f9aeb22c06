// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! libvlc instance management.
//!
//! This module provides [`Instance`], the main entry point of the binding. An
//! instance owns the native library state (modules, interfaces, logs) and is
//! the factory for media, media players and media lists.

use std::{ffi::CString, sync::Arc};

use tracing::debug;

use crate::{
    ApiHandle, Log, Media, MediaList, MediaPlayer, ObjectKind, Registry, Result, Wrapper,
    config::InstanceConfig,
    object::{Object, impl_wrapper},
};

/// Whether `mrl` carries a scheme (`file://`, `http://`, `dvd://`...).
///
/// A single letter before the colon is a Windows drive, not a scheme.
fn has_scheme(mrl: &str) -> bool {
    mrl.find(':').is_some_and(|index| index > 1)
}

/// Main entry point for interacting with libvlc.
///
/// Cloning an `Instance` is cheap; all clones stand for the same native
/// instance. Every object created from the instance is registered in the same
/// [`Registry`] as the instance itself.
///
/// # Examples
///
/// ```no_run
/// use vlc::{Instance, config::get_libvlc_so_path, load_api};
///
/// # fn main() -> Result<(), vlc::Error> {
/// let api = load_api(get_libvlc_so_path())?;
/// let instance = Instance::new(api, &["--no-video"])?;
///
/// let player = instance.media_player_new_with("/tmp/foo.avi")?;
/// println!("{:?}", player.state()?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Instance {
    object: Arc<Object>,
}

impl_wrapper!(Instance, ObjectKind::Instance);

impl Instance {
    /// Creates a new instance registered in the process-wide registry.
    ///
    /// # Arguments
    ///
    /// * `api` - Shared handle to the native library (from [`crate::load_api`])
    /// * `args` - Command line style arguments, e.g. `["--no-video"]`
    ///
    /// # Errors
    ///
    /// Returns an error if an argument contains a NUL byte or if the native
    /// library fails to create the instance.
    pub fn new(api: ApiHandle, args: &[&str]) -> Result<Self> {
        Self::with_registry(api, Registry::shared().clone(), args)
    }

    /// Creates a new instance registered in `registry`.
    ///
    /// Objects created from the instance share its registry.
    pub fn with_registry(api: ApiHandle, registry: Registry, args: &[&str]) -> Result<Self> {
        let args = args
            .iter()
            .map(|arg| CString::new(*arg))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let handle = unsafe { api.instance_new(&args)? };
        debug!("Created libvlc instance {handle} ({}).", api.version());
        unsafe { registry.acquire(&api, handle) }
    }

    /// Creates an instance from a configuration document.
    ///
    /// The configured verbosity is applied and the configured interfaces are
    /// started once the instance exists.
    pub fn from_config(api: ApiHandle, registry: Registry, config: &InstanceConfig) -> Result<Self> {
        let args: Vec<&str> = config.args.iter().map(String::as_str).collect();
        let instance = Self::with_registry(api, registry, &args)?;
        if let Some(verbosity) = config.verbosity {
            instance.set_log_verbosity(verbosity)?;
        }
        for interface in &config.interfaces {
            instance.add_intf(interface)?;
        }
        Ok(instance)
    }

    /// Registry the instance and its objects are registered in.
    pub fn registry(&self) -> &Registry {
        self.object.registry()
    }

    fn api(&self) -> &ApiHandle {
        self.object.api()
    }

    /// Creates a media from an MRL or a local path.
    ///
    /// `mrl` is used as a location if it carries a scheme, otherwise it is
    /// taken as a path, so `/tmp/foo.avi` becomes `file:///tmp/foo.avi`.
    pub fn media_new(&self, mrl: &str) -> Result<Media> {
        if has_scheme(mrl) {
            self.media_new_location(mrl)
        } else {
            self.media_new_path(mrl)
        }
    }

    /// Creates a media from a local filesystem path.
    pub fn media_new_path(&self, path: &str) -> Result<Media> {
        let call = self.object.enter()?;
        let instance = call.handle();
        let path = CString::new(path)?;
        let media = unsafe { self.api().media_new_path(instance, &path)? };
        unsafe { self.registry().acquire(self.api(), media) }
    }

    /// Creates a media from an MRL with a scheme.
    pub fn media_new_location(&self, mrl: &str) -> Result<Media> {
        let call = self.object.enter()?;
        let instance = call.handle();
        let mrl = CString::new(mrl)?;
        let media = unsafe { self.api().media_new_location(instance, &mrl)? };
        unsafe { self.registry().acquire(self.api(), media) }
    }

    /// Creates an empty media player.
    pub fn media_player_new(&self) -> Result<MediaPlayer> {
        let call = self.object.enter()?;
        let instance = call.handle();
        let player = unsafe { self.api().media_player_new(instance)? };
        unsafe { self.registry().acquire(self.api(), player) }
    }

    /// Creates a media player playing `mrl` (see [`Instance::media_new`]).
    ///
    /// Only the player holds a reference to the media afterwards.
    pub fn media_player_new_with(&self, mrl: &str) -> Result<MediaPlayer> {
        let media = self.media_new(mrl)?;
        let player = self.media_player_new()?;
        let result = player.set_media(Some(&media));
        media.release()?;
        result.map(|()| player)
    }

    /// Creates a media list holding one media per entry of `mrls`.
    pub fn media_list_new<S: AsRef<str>>(&self, mrls: &[S]) -> Result<MediaList> {
        let call = self.object.enter()?;
        let instance = call.handle();
        let list = unsafe { self.api().media_list_new(instance)? };
        let list: MediaList = unsafe { self.registry().acquire(self.api(), list)? };
        for mrl in mrls {
            let media = self.media_new(mrl.as_ref())?;
            let result = list.add_media(&media);
            media.release()?;
            result?;
        }
        Ok(list)
    }

    /// Opens a message log on the instance.
    pub fn log_open(&self) -> Result<Log> {
        let call = self.object.enter()?;
        let instance = call.handle();
        let log = unsafe { self.api().log_open(instance)? };
        Ok(Log::new(self.api().clone(), log))
    }

    /// Verbosity of the logs opened on the instance.
    pub fn log_verbosity(&self) -> Result<u32> {
        let call = self.object.enter()?;
        let instance = call.handle();
        Ok(unsafe { self.api().log_verbosity(instance) })
    }

    /// Sets the verbosity of the logs opened on the instance (`0` info only
    /// to `3` debug).
    pub fn set_log_verbosity(&self, level: u32) -> Result<()> {
        let call = self.object.enter()?;
        let instance = call.handle();
        unsafe { self.api().set_log_verbosity(instance, level) };
        Ok(())
    }

    /// Starts an interface module, e.g. `"dummy"` or `"http"`.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Native`] if the module does not exist or fails to start.
    pub fn add_intf(&self, name: &str) -> Result<()> {
        let call = self.object.enter()?;
        let instance = call.handle();
        let name = CString::new(name)?;
        unsafe { self.api().add_intf(instance, &name) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_detection() {
        assert!(has_scheme("file:///tmp/foo.avi"));
        assert!(has_scheme("http://example.com/stream"));
        assert!(!has_scheme("/tmp/foo.avi"));
        assert!(!has_scheme("relative/foo.avi"));
        assert!(!has_scheme("C:\\videos\\foo.avi"));
    }
}
