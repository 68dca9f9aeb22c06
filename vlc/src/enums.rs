// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! Enum value tables of the native library.
//!
//! Each enum mirrors one C enum of the libvlc headers. Discriminants are taken
//! from the [`vlc_sys`] constants so the two can never drift apart silently;
//! converting a raw value back goes through `TryFrom` and fails with
//! [`Error::UnknownEnumValue`] for values this binding does not know.

use crate::Error;

macro_rules! native_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident: $raw:ty {
            $($(#[$vmeta:meta])* $variant:ident = $value:path,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(i32)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value as i32,)*
        }

        impl $name {
            /// All variants, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            /// Returns the raw value used by the C API.
            pub const fn value(self) -> $raw {
                self as i32 as $raw
            }
        }

        impl TryFrom<$raw> for $name {
            type Error = Error;

            fn try_from(value: $raw) -> Result<Self, Error> {
                match value {
                    $($value => Ok($name::$variant),)*
                    other => Err(Error::UnknownEnumValue {
                        name: stringify!($name),
                        value: other as i64,
                    }),
                }
            }
        }

        impl From<$name> for $raw {
            fn from(value: $name) -> Self {
                value.value()
            }
        }
    };
}

native_enum! {
    /// Playback state of a media or media player.
    pub enum State: vlc_sys::libvlc_state_t {
        NothingSpecial = vlc_sys::libvlc_NothingSpecial,
        Opening = vlc_sys::libvlc_Opening,
        Buffering = vlc_sys::libvlc_Buffering,
        Playing = vlc_sys::libvlc_Playing,
        Paused = vlc_sys::libvlc_Paused,
        Stopped = vlc_sys::libvlc_Stopped,
        Ended = vlc_sys::libvlc_Ended,
        Error = vlc_sys::libvlc_Error,
    }
}

native_enum! {
    /// Kind of an event emitted by an event manager.
    pub enum EventType: vlc_sys::libvlc_event_type_t {
        MediaMetaChanged = vlc_sys::libvlc_MediaMetaChanged,
        MediaSubItemAdded = vlc_sys::libvlc_MediaSubItemAdded,
        MediaDurationChanged = vlc_sys::libvlc_MediaDurationChanged,
        MediaParsedChanged = vlc_sys::libvlc_MediaParsedChanged,
        MediaFreed = vlc_sys::libvlc_MediaFreed,
        MediaStateChanged = vlc_sys::libvlc_MediaStateChanged,

        MediaPlayerMediaChanged = vlc_sys::libvlc_MediaPlayerMediaChanged,
        MediaPlayerNothingSpecial = vlc_sys::libvlc_MediaPlayerNothingSpecial,
        MediaPlayerOpening = vlc_sys::libvlc_MediaPlayerOpening,
        MediaPlayerBuffering = vlc_sys::libvlc_MediaPlayerBuffering,
        MediaPlayerPlaying = vlc_sys::libvlc_MediaPlayerPlaying,
        MediaPlayerPaused = vlc_sys::libvlc_MediaPlayerPaused,
        MediaPlayerStopped = vlc_sys::libvlc_MediaPlayerStopped,
        MediaPlayerForward = vlc_sys::libvlc_MediaPlayerForward,
        MediaPlayerBackward = vlc_sys::libvlc_MediaPlayerBackward,
        MediaPlayerEndReached = vlc_sys::libvlc_MediaPlayerEndReached,
        MediaPlayerEncounteredError = vlc_sys::libvlc_MediaPlayerEncounteredError,
        MediaPlayerTimeChanged = vlc_sys::libvlc_MediaPlayerTimeChanged,
        MediaPlayerPositionChanged = vlc_sys::libvlc_MediaPlayerPositionChanged,
        MediaPlayerSeekableChanged = vlc_sys::libvlc_MediaPlayerSeekableChanged,
        MediaPlayerPausableChanged = vlc_sys::libvlc_MediaPlayerPausableChanged,
        MediaPlayerTitleChanged = vlc_sys::libvlc_MediaPlayerTitleChanged,
        MediaPlayerSnapshotTaken = vlc_sys::libvlc_MediaPlayerSnapshotTaken,
        MediaPlayerLengthChanged = vlc_sys::libvlc_MediaPlayerLengthChanged,

        MediaListItemAdded = vlc_sys::libvlc_MediaListItemAdded,
        MediaListWillAddItem = vlc_sys::libvlc_MediaListWillAddItem,
        MediaListItemDeleted = vlc_sys::libvlc_MediaListItemDeleted,
        MediaListWillDeleteItem = vlc_sys::libvlc_MediaListWillDeleteItem,

        MediaListViewItemAdded = vlc_sys::libvlc_MediaListViewItemAdded,
        MediaListViewWillAddItem = vlc_sys::libvlc_MediaListViewWillAddItem,
        MediaListViewItemDeleted = vlc_sys::libvlc_MediaListViewItemDeleted,
        MediaListViewWillDeleteItem = vlc_sys::libvlc_MediaListViewWillDeleteItem,

        MediaListPlayerPlayed = vlc_sys::libvlc_MediaListPlayerPlayed,
        MediaListPlayerNextItemSet = vlc_sys::libvlc_MediaListPlayerNextItemSet,
        MediaListPlayerStopped = vlc_sys::libvlc_MediaListPlayerStopped,

        MediaDiscovererStarted = vlc_sys::libvlc_MediaDiscovererStarted,
        MediaDiscovererEnded = vlc_sys::libvlc_MediaDiscovererEnded,
    }
}

native_enum! {
    /// Meta data field of a media.
    pub enum Meta: vlc_sys::libvlc_meta_t {
        Title = vlc_sys::libvlc_meta_Title,
        Artist = vlc_sys::libvlc_meta_Artist,
        Genre = vlc_sys::libvlc_meta_Genre,
        Copyright = vlc_sys::libvlc_meta_Copyright,
        Album = vlc_sys::libvlc_meta_Album,
        TrackNumber = vlc_sys::libvlc_meta_TrackNumber,
        Description = vlc_sys::libvlc_meta_Description,
        Rating = vlc_sys::libvlc_meta_Rating,
        Date = vlc_sys::libvlc_meta_Date,
        Setting = vlc_sys::libvlc_meta_Setting,
        Url = vlc_sys::libvlc_meta_URL,
        Language = vlc_sys::libvlc_meta_Language,
        NowPlaying = vlc_sys::libvlc_meta_NowPlaying,
        Publisher = vlc_sys::libvlc_meta_Publisher,
        EncodedBy = vlc_sys::libvlc_meta_EncodedBy,
        ArtworkUrl = vlc_sys::libvlc_meta_ArtworkURL,
        TrackId = vlc_sys::libvlc_meta_TrackID,
    }
}

native_enum! {
    /// Playback mode of a media list player.
    pub enum PlaybackMode: vlc_sys::libvlc_playback_mode_t {
        Default = vlc_sys::libvlc_playback_mode_default,
        Loop = vlc_sys::libvlc_playback_mode_loop,
        Repeat = vlc_sys::libvlc_playback_mode_repeat,
    }
}

native_enum! {
    /// Option of the marquee video filter.
    pub enum VideoMarqueeOption: vlc_sys::libvlc_video_marquee_option_t {
        Enable = vlc_sys::libvlc_marquee_Enable,
        Text = vlc_sys::libvlc_marquee_Text,
        Color = vlc_sys::libvlc_marquee_Color,
        Opacity = vlc_sys::libvlc_marquee_Opacity,
        Position = vlc_sys::libvlc_marquee_Position,
        Refresh = vlc_sys::libvlc_marquee_Refresh,
        Size = vlc_sys::libvlc_marquee_Size,
        Timeout = vlc_sys::libvlc_marquee_Timeout,
        X = vlc_sys::libvlc_marquee_X,
        Y = vlc_sys::libvlc_marquee_Y,
    }
}

native_enum! {
    /// Speaker layout of an audio output device.
    #[allow(non_camel_case_types)]
    pub enum AudioOutputDeviceTypes: vlc_sys::libvlc_audio_output_device_types_t {
        Error = vlc_sys::libvlc_AudioOutputDevice_Error,
        Mono = vlc_sys::libvlc_AudioOutputDevice_Mono,
        Stereo = vlc_sys::libvlc_AudioOutputDevice_Stereo,
        _2F2R = vlc_sys::libvlc_AudioOutputDevice_2F2R,
        _3F2R = vlc_sys::libvlc_AudioOutputDevice_3F2R,
        _5_1 = vlc_sys::libvlc_AudioOutputDevice_5_1,
        _6_1 = vlc_sys::libvlc_AudioOutputDevice_6_1,
        _7_1 = vlc_sys::libvlc_AudioOutputDevice_7_1,
        Spdif = vlc_sys::libvlc_AudioOutputDevice_SPDIF,
    }
}

native_enum! {
    /// Channel routing of the audio output.
    pub enum AudioOutputChannel: vlc_sys::libvlc_audio_output_channel_t {
        Error = vlc_sys::libvlc_AudioChannel_Error,
        Stereo = vlc_sys::libvlc_AudioChannel_Stereo,
        RStereo = vlc_sys::libvlc_AudioChannel_RStereo,
        Left = vlc_sys::libvlc_AudioChannel_Left,
        Right = vlc_sys::libvlc_AudioChannel_Right,
        Dolbys = vlc_sys::libvlc_AudioChannel_Dolbys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Checked against hardcoded values. In case of failure, check that the
    // reason is not a change in the .h definitions.
    #[test]
    fn enum_event_type() {
        assert_eq!(EventType::MediaStateChanged.value(), 5);
    }

    #[test]
    fn enum_meta() {
        assert_eq!(Meta::Description.value(), 6);
    }

    #[test]
    fn enum_state() {
        assert_eq!(State::Playing.value(), 3);
    }

    #[test]
    fn enum_playback_mode() {
        assert_eq!(PlaybackMode::Repeat.value(), 2);
    }

    #[test]
    fn enum_marquee_int_option() {
        assert_eq!(VideoMarqueeOption::Size.value(), 6);
    }

    #[test]
    fn enum_output_device_type() {
        assert_eq!(AudioOutputDeviceTypes::_2F2R.value(), 4);
    }

    #[test]
    fn enum_output_channel() {
        assert_eq!(AudioOutputChannel::Dolbys.value(), 5);
    }

    #[test]
    fn every_variant_converts_back() {
        for &state in State::ALL {
            assert_eq!(State::try_from(state.value()).unwrap(), state);
        }
        for &kind in EventType::ALL {
            assert_eq!(EventType::try_from(kind.value()).unwrap(), kind);
        }
        for &device in AudioOutputDeviceTypes::ALL {
            assert_eq!(AudioOutputDeviceTypes::try_from(device.value()).unwrap(), device);
        }
        for &channel in AudioOutputChannel::ALL {
            assert_eq!(AudioOutputChannel::try_from(channel.value()).unwrap(), channel);
        }
    }

    #[test]
    fn unknown_raw_value_is_rejected() {
        let err = State::try_from(42).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownEnumValue { name: "State", value: 42 }
        ));
        assert!(EventType::try_from(0x700).is_err());
        assert!(matches!(
            AudioOutputChannel::try_from(99),
            Err(Error::UnknownEnumValue { name: "AudioOutputChannel", .. })
        ));
    }
}
