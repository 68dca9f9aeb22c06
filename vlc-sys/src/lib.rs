// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! # vlc-sys: Raw FFI declarations for libvlc
//!
//! This crate provides low-level, unsafe Rust declarations for the libvlc C
//! library, loaded at runtime through `libloading`.
//!
//! ## Overview
//!
//! `vlc-sys` exposes:
//! - Opaque C object types (`libvlc_instance_t`, `libvlc_media_t`, ...)
//! - The enum value tables of the C headers as constants (states, event types,
//!   meta kinds, playback modes, marquee options, audio output layouts)
//! - The event structure delivered to callbacks and the callback type itself
//! - [`LibVlc`], a table of entry points resolved from the shared library
//!
//! ## Usage
//!
//! **Most users should NOT use this crate directly.** Use the safe [`vlc`]
//! wrapper crate instead, which provides:
//! - Object identity and reference counting across wrappers
//! - Event callbacks with automatic teardown
//! - Rust-idiomatic error handling with `Result`
//!
//! ## Safety
//!
//! All entry points are `unsafe` and require the caller to uphold libvlc's
//! invariants:
//! - Objects must be retained for as long as they are used
//! - Strings returned by `libvlc_media_get_mrl` and friends must be released
//!   with `libvlc_free`
//! - Null checks are the caller's responsibility
//!
//! The declarations target the libvlc 2.x ABI (2.0 to 2.2).
//!
//! [`vlc`]: https://docs.rs/vlc

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(clippy::missing_safety_doc)]

use std::os::raw::{c_char, c_float, c_int, c_uint, c_void};

extern crate libloading;

macro_rules! opaque_types {
    ($($name:ident),* $(,)?) => {
        $(
            #[repr(C)]
            pub struct $name {
                _unused: [u8; 0],
            }
        )*
    };
}

opaque_types!(
    libvlc_instance_t,
    libvlc_media_t,
    libvlc_media_player_t,
    libvlc_media_list_t,
    libvlc_event_manager_t,
    libvlc_log_t,
    libvlc_log_iterator_t,
);

pub type libvlc_time_t = i64;

pub type libvlc_state_t = c_uint;
pub const libvlc_NothingSpecial: libvlc_state_t = 0;
pub const libvlc_Opening: libvlc_state_t = 1;
pub const libvlc_Buffering: libvlc_state_t = 2;
pub const libvlc_Playing: libvlc_state_t = 3;
pub const libvlc_Paused: libvlc_state_t = 4;
pub const libvlc_Stopped: libvlc_state_t = 5;
pub const libvlc_Ended: libvlc_state_t = 6;
pub const libvlc_Error: libvlc_state_t = 7;

pub type libvlc_meta_t = c_uint;
pub const libvlc_meta_Title: libvlc_meta_t = 0;
pub const libvlc_meta_Artist: libvlc_meta_t = 1;
pub const libvlc_meta_Genre: libvlc_meta_t = 2;
pub const libvlc_meta_Copyright: libvlc_meta_t = 3;
pub const libvlc_meta_Album: libvlc_meta_t = 4;
pub const libvlc_meta_TrackNumber: libvlc_meta_t = 5;
pub const libvlc_meta_Description: libvlc_meta_t = 6;
pub const libvlc_meta_Rating: libvlc_meta_t = 7;
pub const libvlc_meta_Date: libvlc_meta_t = 8;
pub const libvlc_meta_Setting: libvlc_meta_t = 9;
pub const libvlc_meta_URL: libvlc_meta_t = 10;
pub const libvlc_meta_Language: libvlc_meta_t = 11;
pub const libvlc_meta_NowPlaying: libvlc_meta_t = 12;
pub const libvlc_meta_Publisher: libvlc_meta_t = 13;
pub const libvlc_meta_EncodedBy: libvlc_meta_t = 14;
pub const libvlc_meta_ArtworkURL: libvlc_meta_t = 15;
pub const libvlc_meta_TrackID: libvlc_meta_t = 16;

pub type libvlc_playback_mode_t = c_uint;
pub const libvlc_playback_mode_default: libvlc_playback_mode_t = 0;
pub const libvlc_playback_mode_loop: libvlc_playback_mode_t = 1;
pub const libvlc_playback_mode_repeat: libvlc_playback_mode_t = 2;

pub type libvlc_video_marquee_option_t = c_uint;
pub const libvlc_marquee_Enable: libvlc_video_marquee_option_t = 0;
pub const libvlc_marquee_Text: libvlc_video_marquee_option_t = 1;
pub const libvlc_marquee_Color: libvlc_video_marquee_option_t = 2;
pub const libvlc_marquee_Opacity: libvlc_video_marquee_option_t = 3;
pub const libvlc_marquee_Position: libvlc_video_marquee_option_t = 4;
pub const libvlc_marquee_Refresh: libvlc_video_marquee_option_t = 5;
pub const libvlc_marquee_Size: libvlc_video_marquee_option_t = 6;
pub const libvlc_marquee_Timeout: libvlc_video_marquee_option_t = 7;
pub const libvlc_marquee_X: libvlc_video_marquee_option_t = 8;
pub const libvlc_marquee_Y: libvlc_video_marquee_option_t = 9;

pub type libvlc_audio_output_device_types_t = c_int;
pub const libvlc_AudioOutputDevice_Error: libvlc_audio_output_device_types_t = -1;
pub const libvlc_AudioOutputDevice_Mono: libvlc_audio_output_device_types_t = 1;
pub const libvlc_AudioOutputDevice_Stereo: libvlc_audio_output_device_types_t = 2;
pub const libvlc_AudioOutputDevice_2F2R: libvlc_audio_output_device_types_t = 4;
pub const libvlc_AudioOutputDevice_3F2R: libvlc_audio_output_device_types_t = 5;
pub const libvlc_AudioOutputDevice_5_1: libvlc_audio_output_device_types_t = 6;
pub const libvlc_AudioOutputDevice_6_1: libvlc_audio_output_device_types_t = 7;
pub const libvlc_AudioOutputDevice_7_1: libvlc_audio_output_device_types_t = 8;
pub const libvlc_AudioOutputDevice_SPDIF: libvlc_audio_output_device_types_t = 10;

pub type libvlc_audio_output_channel_t = c_int;
pub const libvlc_AudioChannel_Error: libvlc_audio_output_channel_t = -1;
pub const libvlc_AudioChannel_Stereo: libvlc_audio_output_channel_t = 1;
pub const libvlc_AudioChannel_RStereo: libvlc_audio_output_channel_t = 2;
pub const libvlc_AudioChannel_Left: libvlc_audio_output_channel_t = 3;
pub const libvlc_AudioChannel_Right: libvlc_audio_output_channel_t = 4;
pub const libvlc_AudioChannel_Dolbys: libvlc_audio_output_channel_t = 5;

pub type libvlc_event_type_t = c_int;
pub const libvlc_MediaMetaChanged: libvlc_event_type_t = 0;
pub const libvlc_MediaSubItemAdded: libvlc_event_type_t = 1;
pub const libvlc_MediaDurationChanged: libvlc_event_type_t = 2;
pub const libvlc_MediaParsedChanged: libvlc_event_type_t = 3;
pub const libvlc_MediaFreed: libvlc_event_type_t = 4;
pub const libvlc_MediaStateChanged: libvlc_event_type_t = 5;

pub const libvlc_MediaPlayerMediaChanged: libvlc_event_type_t = 0x100;
pub const libvlc_MediaPlayerNothingSpecial: libvlc_event_type_t = 0x101;
pub const libvlc_MediaPlayerOpening: libvlc_event_type_t = 0x102;
pub const libvlc_MediaPlayerBuffering: libvlc_event_type_t = 0x103;
pub const libvlc_MediaPlayerPlaying: libvlc_event_type_t = 0x104;
pub const libvlc_MediaPlayerPaused: libvlc_event_type_t = 0x105;
pub const libvlc_MediaPlayerStopped: libvlc_event_type_t = 0x106;
pub const libvlc_MediaPlayerForward: libvlc_event_type_t = 0x107;
pub const libvlc_MediaPlayerBackward: libvlc_event_type_t = 0x108;
pub const libvlc_MediaPlayerEndReached: libvlc_event_type_t = 0x109;
pub const libvlc_MediaPlayerEncounteredError: libvlc_event_type_t = 0x10A;
pub const libvlc_MediaPlayerTimeChanged: libvlc_event_type_t = 0x10B;
pub const libvlc_MediaPlayerPositionChanged: libvlc_event_type_t = 0x10C;
pub const libvlc_MediaPlayerSeekableChanged: libvlc_event_type_t = 0x10D;
pub const libvlc_MediaPlayerPausableChanged: libvlc_event_type_t = 0x10E;
pub const libvlc_MediaPlayerTitleChanged: libvlc_event_type_t = 0x10F;
pub const libvlc_MediaPlayerSnapshotTaken: libvlc_event_type_t = 0x110;
pub const libvlc_MediaPlayerLengthChanged: libvlc_event_type_t = 0x111;

pub const libvlc_MediaListItemAdded: libvlc_event_type_t = 0x200;
pub const libvlc_MediaListWillAddItem: libvlc_event_type_t = 0x201;
pub const libvlc_MediaListItemDeleted: libvlc_event_type_t = 0x202;
pub const libvlc_MediaListWillDeleteItem: libvlc_event_type_t = 0x203;

pub const libvlc_MediaListViewItemAdded: libvlc_event_type_t = 0x300;
pub const libvlc_MediaListViewWillAddItem: libvlc_event_type_t = 0x301;
pub const libvlc_MediaListViewItemDeleted: libvlc_event_type_t = 0x302;
pub const libvlc_MediaListViewWillDeleteItem: libvlc_event_type_t = 0x303;

pub const libvlc_MediaListPlayerPlayed: libvlc_event_type_t = 0x400;
pub const libvlc_MediaListPlayerNextItemSet: libvlc_event_type_t = 0x401;
pub const libvlc_MediaListPlayerStopped: libvlc_event_type_t = 0x402;

pub const libvlc_MediaDiscovererStarted: libvlc_event_type_t = 0x500;
pub const libvlc_MediaDiscovererEnded: libvlc_event_type_t = 0x501;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct libvlc_event_media_meta_changed {
    pub meta_type: libvlc_meta_t,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct libvlc_event_media_subitem_added {
    pub new_child: *mut libvlc_media_t,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct libvlc_event_media_duration_changed {
    pub new_duration: i64,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct libvlc_event_media_parsed_changed {
    pub new_status: c_int,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct libvlc_event_media_freed {
    pub md: *mut libvlc_media_t,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct libvlc_event_media_state_changed {
    pub new_state: libvlc_state_t,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct libvlc_event_media_player_buffering {
    pub new_cache: c_float,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct libvlc_event_media_player_position_changed {
    pub new_position: c_float,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct libvlc_event_media_player_time_changed {
    pub new_time: libvlc_time_t,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct libvlc_event_media_player_title_changed {
    pub new_title: c_int,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct libvlc_event_media_player_seekable_changed {
    pub new_seekable: c_int,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct libvlc_event_media_player_pausable_changed {
    pub new_pausable: c_int,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct libvlc_event_media_player_length_changed {
    pub new_length: libvlc_time_t,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct libvlc_event_media_player_snapshot_taken {
    pub psz_filename: *mut c_char,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct libvlc_event_media_player_media_changed {
    pub new_media: *mut libvlc_media_t,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct libvlc_event_media_list_item {
    pub item: *mut libvlc_media_t,
    pub index: c_int,
}

/// Event-specific payload of [`libvlc_event_t`], discriminated by `type_`.
#[repr(C)]
#[derive(Copy, Clone)]
pub union libvlc_event_u {
    pub media_meta_changed: libvlc_event_media_meta_changed,
    pub media_subitem_added: libvlc_event_media_subitem_added,
    pub media_duration_changed: libvlc_event_media_duration_changed,
    pub media_parsed_changed: libvlc_event_media_parsed_changed,
    pub media_freed: libvlc_event_media_freed,
    pub media_state_changed: libvlc_event_media_state_changed,
    pub media_player_buffering: libvlc_event_media_player_buffering,
    pub media_player_position_changed: libvlc_event_media_player_position_changed,
    pub media_player_time_changed: libvlc_event_media_player_time_changed,
    pub media_player_title_changed: libvlc_event_media_player_title_changed,
    pub media_player_seekable_changed: libvlc_event_media_player_seekable_changed,
    pub media_player_pausable_changed: libvlc_event_media_player_pausable_changed,
    pub media_player_length_changed: libvlc_event_media_player_length_changed,
    pub media_player_snapshot_taken: libvlc_event_media_player_snapshot_taken,
    pub media_player_media_changed: libvlc_event_media_player_media_changed,
    pub media_list_item_added: libvlc_event_media_list_item,
    pub media_list_will_add_item: libvlc_event_media_list_item,
    pub media_list_item_deleted: libvlc_event_media_list_item,
    pub media_list_will_delete_item: libvlc_event_media_list_item,
}

/// A libvlc event as handed to a [`libvlc_callback_t`].
#[repr(C)]
#[derive(Copy, Clone)]
pub struct libvlc_event_t {
    pub type_: libvlc_event_type_t,
    pub p_obj: *mut c_void,
    pub u: libvlc_event_u,
}

pub type libvlc_callback_t =
    Option<unsafe extern "C" fn(p_event: *const libvlc_event_t, p_data: *mut c_void)>;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct libvlc_log_message_t {
    pub i_severity: c_int,
    pub psz_type: *const c_char,
    pub psz_name: *const c_char,
    pub psz_header: *const c_char,
    pub psz_message: *const c_char,
}

impl Default for libvlc_log_message_t {
    fn default() -> Self {
        Self {
            i_severity: 0,
            psz_type: std::ptr::null(),
            psz_name: std::ptr::null(),
            psz_header: std::ptr::null(),
            psz_message: std::ptr::null(),
        }
    }
}

/// Declares the entry-point table of the shared library.
///
/// Generates the [`LibVlc`] struct holding one resolved function pointer per
/// symbol, a loader that fails if any symbol is missing, and an `unsafe`
/// forwarding method per entry point.
macro_rules! libvlc_api {
    ($(pub fn $name:ident($($arg:ident: $ty:ty),* $(,)?) $(-> $ret:ty)?;)*) => {
        /// Entry points of a dynamically loaded libvlc.
        pub struct LibVlc {
            #[allow(dead_code)]
            __library: ::libloading::Library,
            $(pub $name: unsafe extern "C" fn($($ty),*) $(-> $ret)?,)*
        }

        impl LibVlc {
            /// Loads the shared library at `path` and resolves every entry point.
            pub unsafe fn new<P>(path: P) -> Result<Self, ::libloading::Error>
            where
                P: AsRef<::std::ffi::OsStr>,
            {
                let library = unsafe { ::libloading::Library::new(path)? };
                unsafe { Self::from_library(library) }
            }

            /// Resolves every entry point from an already opened library.
            pub unsafe fn from_library<L>(library: L) -> Result<Self, ::libloading::Error>
            where
                L: Into<::libloading::Library>,
            {
                let __library = library.into();
                $(
                    let $name = unsafe {
                        __library
                            .get::<unsafe extern "C" fn($($ty),*) $(-> $ret)?>(
                                concat!(stringify!($name), "\0").as_bytes(),
                            )
                            .map(|sym| *sym)?
                    };
                )*
                Ok(Self { __library, $($name,)* })
            }

            $(
                pub unsafe fn $name(&self, $($arg: $ty),*) $(-> $ret)? {
                    unsafe { (self.$name)($($arg),*) }
                }
            )*
        }
    };
}

libvlc_api! {
    pub fn libvlc_new(argc: c_int, argv: *const *const c_char) -> *mut libvlc_instance_t;
    pub fn libvlc_release(p_instance: *mut libvlc_instance_t);
    pub fn libvlc_retain(p_instance: *mut libvlc_instance_t);
    pub fn libvlc_add_intf(p_instance: *mut libvlc_instance_t, name: *const c_char) -> c_int;
    pub fn libvlc_errmsg() -> *const c_char;
    pub fn libvlc_clearerr();
    pub fn libvlc_free(ptr: *mut c_void);
    pub fn libvlc_get_version() -> *const c_char;

    pub fn libvlc_event_attach(
        p_event_manager: *mut libvlc_event_manager_t,
        i_event_type: libvlc_event_type_t,
        f_callback: libvlc_callback_t,
        user_data: *mut c_void,
    ) -> c_int;
    pub fn libvlc_event_detach(
        p_event_manager: *mut libvlc_event_manager_t,
        i_event_type: libvlc_event_type_t,
        f_callback: libvlc_callback_t,
        p_user_data: *mut c_void,
    );

    pub fn libvlc_media_new_location(
        p_instance: *mut libvlc_instance_t,
        psz_mrl: *const c_char,
    ) -> *mut libvlc_media_t;
    pub fn libvlc_media_new_path(
        p_instance: *mut libvlc_instance_t,
        path: *const c_char,
    ) -> *mut libvlc_media_t;
    pub fn libvlc_media_retain(p_md: *mut libvlc_media_t);
    pub fn libvlc_media_release(p_md: *mut libvlc_media_t);
    pub fn libvlc_media_get_mrl(p_md: *mut libvlc_media_t) -> *mut c_char;
    pub fn libvlc_media_get_meta(p_md: *mut libvlc_media_t, e_meta: libvlc_meta_t) -> *mut c_char;
    pub fn libvlc_media_get_state(p_md: *mut libvlc_media_t) -> libvlc_state_t;
    pub fn libvlc_media_event_manager(p_md: *mut libvlc_media_t) -> *mut libvlc_event_manager_t;

    pub fn libvlc_media_player_new(p_instance: *mut libvlc_instance_t) -> *mut libvlc_media_player_t;
    pub fn libvlc_media_player_new_from_media(p_md: *mut libvlc_media_t) -> *mut libvlc_media_player_t;
    pub fn libvlc_media_player_retain(p_mi: *mut libvlc_media_player_t);
    pub fn libvlc_media_player_release(p_mi: *mut libvlc_media_player_t);
    pub fn libvlc_media_player_set_media(p_mi: *mut libvlc_media_player_t, p_md: *mut libvlc_media_t);
    pub fn libvlc_media_player_get_media(p_mi: *mut libvlc_media_player_t) -> *mut libvlc_media_t;
    pub fn libvlc_media_player_get_state(p_mi: *mut libvlc_media_player_t) -> libvlc_state_t;
    pub fn libvlc_media_player_play(p_mi: *mut libvlc_media_player_t) -> c_int;
    pub fn libvlc_media_player_stop(p_mi: *mut libvlc_media_player_t);
    pub fn libvlc_media_player_event_manager(
        p_mi: *mut libvlc_media_player_t,
    ) -> *mut libvlc_event_manager_t;

    pub fn libvlc_media_list_new(p_instance: *mut libvlc_instance_t) -> *mut libvlc_media_list_t;
    pub fn libvlc_media_list_retain(p_ml: *mut libvlc_media_list_t);
    pub fn libvlc_media_list_release(p_ml: *mut libvlc_media_list_t);
    pub fn libvlc_media_list_add_media(p_ml: *mut libvlc_media_list_t, p_md: *mut libvlc_media_t) -> c_int;
    pub fn libvlc_media_list_count(p_ml: *mut libvlc_media_list_t) -> c_int;
    pub fn libvlc_media_list_item_at_index(p_ml: *mut libvlc_media_list_t, i_pos: c_int) -> *mut libvlc_media_t;
    pub fn libvlc_media_list_lock(p_ml: *mut libvlc_media_list_t);
    pub fn libvlc_media_list_unlock(p_ml: *mut libvlc_media_list_t);
    pub fn libvlc_media_list_event_manager(
        p_ml: *mut libvlc_media_list_t,
    ) -> *mut libvlc_event_manager_t;

    pub fn libvlc_get_log_verbosity(p_instance: *const libvlc_instance_t) -> c_uint;
    pub fn libvlc_set_log_verbosity(p_instance: *mut libvlc_instance_t, level: c_uint);
    pub fn libvlc_log_open(p_instance: *mut libvlc_instance_t) -> *mut libvlc_log_t;
    pub fn libvlc_log_close(p_log: *mut libvlc_log_t);
    pub fn libvlc_log_count(p_log: *const libvlc_log_t) -> c_uint;
    pub fn libvlc_log_clear(p_log: *mut libvlc_log_t);
    pub fn libvlc_log_get_iterator(p_log: *const libvlc_log_t) -> *mut libvlc_log_iterator_t;
    pub fn libvlc_log_iterator_free(p_iter: *mut libvlc_log_iterator_t);
    pub fn libvlc_log_iterator_has_next(p_iter: *const libvlc_log_iterator_t) -> c_int;
    pub fn libvlc_log_iterator_next(
        p_iter: *mut libvlc_log_iterator_t,
        p_buffer: *mut libvlc_log_message_t,
    ) -> *mut libvlc_log_message_t;
}
