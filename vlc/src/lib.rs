// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! # vlc - libvlc bindings
//!
//! Safe Rust bindings for libvlc, the multimedia library behind the VLC media
//! player. This crate wraps the raw FFI ([`vlc_sys`]) with wrapper types whose
//! identity and lifetime mirror the reference counted native objects.
//!
//! ## Overview
//!
//! ### Key Concepts
//!
//! - **Native handle**: the address of a native object ([`NativeHandle`])
//! - **Registry**: the table mapping every live handle to its one wrapper and
//!   its count of logical references ([`Registry`])
//! - **Wrapper**: a cheap, cloneable value standing for one native object
//!   ([`Instance`], [`Media`], [`MediaPlayer`], [`MediaList`])
//! - **Event manager**: the per-object table of event handlers ([`EventManager`])
//!
//! ### Reference discipline
//!
//! Every construction, every accessor returning an object and every
//! [`Wrapper::retain`] counts as one logical reference, backed by exactly one
//! native reference. [`Wrapper::release`] gives one up. When the last one goes
//! the wrapper is invalidated: its event handlers are detached, its registry
//! entry is evicted, and any further call on it fails with
//! [`Error::UseAfterRelease`]. Accessors resolving the same live handle always
//! return the same wrapper:
//!
//! ```
//! use std::sync::Arc;
//!
//! use vlc::{Instance, Registry, Wrapper, dummy::DummyApi};
//!
//! # fn main() -> Result<(), vlc::Error> {
//! let instance = Instance::with_registry(Arc::new(DummyApi::new()), Registry::new(), &[])?;
//! let media = instance.media_new("/tmp/foo.avi")?;
//! let player = instance.media_player_new()?;
//! player.set_media(Some(&media))?;
//!
//! let same = player.media()?.expect("media was set");
//! assert!(same.same_object(&media));
//! assert_eq!(media.refcount(), Some(2));
//!
//! media.release()?;
//! media.release()?;
//! assert!(!media.is_live());
//! assert!(media.mrl().is_err());
//!
//! // The player still holds the native media: a fresh wrapper is returned.
//! let fresh = player.media()?.expect("media was set");
//! assert!(!fresh.same_object(&media));
//! # Ok(())
//! # }
//! ```
//!
//! Dropping every value of a wrapper without releasing it gives up its
//! outstanding references.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐        ┌──────────┐
//! │ Instance │───────►│ Registry │  handle ─► (kind, refcount, Weak<wrapper>)
//! └────┬─────┘        └────▲─────┘
//!      │                   │ acquire / retain / release / dispatch
//!      ├─► Media ──────────┤
//!      ├─► MediaPlayer ────┤──► EventManager ──► handlers
//!      ├─► MediaList ──────┘
//!      └─► Log
//!
//!          NativeApi ──► LibVlcApi (dlopen'ed libvlc)
//!                    └─► DummyApi  (in-process, for tests)
//! ```
//!
//! ## Thread Safety
//!
//! - All wrappers, [`EventManager`] and [`Registry`] are `Send + Sync`
//! - A single mutex serializes the registry; event handlers never run under it
//! - Event handlers run on the thread the native library emits from and may
//!   call back into the binding, including releasing the emitting object

mod api;
mod enums;
mod error;
mod event;
mod instance;
mod log;
mod media;
mod media_list;
mod media_player;
mod object;
mod registry;

pub mod config;
pub mod dummy;

pub use api::{ApiHandle, Callback, LibVlcApi, NativeApi, NativeHandle, ObjectKind, load_api};
pub use enums::{
    AudioOutputChannel, AudioOutputDeviceTypes, EventType, Meta, PlaybackMode, State,
    VideoMarqueeOption,
};
pub use error::{Error, Result};
pub use event::{Event, EventManager, EventPayload, HandlerId};
pub use instance::Instance;
pub use log::{Log, LogMessage};
pub use media::Media;
pub use media_list::MediaList;
pub use media_player::MediaPlayer;
pub use object::Wrapper;
pub use registry::{ManagedEntry, Registry};
