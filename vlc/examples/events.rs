// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! Plays a media and prints the events of its player.
//!
//! ```text
//! cargo run --example events -- /tmp/foo.avi --seconds 5
//! cargo run --example events -- /tmp/foo.avi --dummy
//! ```

mod common;

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use tracing::info;
use vlc::{
    ApiHandle, EventType, Instance, Registry, State, Wrapper, config::InstanceConfig,
    dummy::DummyApi,
};

#[derive(Debug, Parser)]
#[command(version, about = "Prints the events of a libvlc media player.")]
struct Opts {
    /// MRL or path of the media to open.
    mrl: String,

    /// How long to listen for events.
    #[arg(long, default_value_t = 5)]
    seconds: u64,

    /// Instance configuration file (JSON).
    #[arg(long, env = "VLC_CONFIG")]
    config: Option<PathBuf>,

    /// Path of the libvlc shared library.
    #[arg(long)]
    library: Option<PathBuf>,

    /// Use the in-process stand-in instead of libvlc.
    #[arg(long)]
    dummy: bool,
}

fn main() -> Result<(), vlc::Error> {
    common::setup_logging();
    let opts = Opts::parse();

    let api: ApiHandle = if opts.dummy {
        Arc::new(DummyApi::new())
    } else {
        vlc::load_api(
            opts.library
                .clone()
                .unwrap_or_else(vlc::config::get_libvlc_so_path),
        )?
    };
    info!("Using libvlc {}", api.version());

    let config = match &opts.config {
        Some(path) => InstanceConfig::from_file(path)?,
        None => InstanceConfig::default(),
    };
    let instance = Instance::from_config(api, Registry::shared().clone(), &config)?;
    let player = instance.media_player_new_with(&opts.mrl)?;

    let events = player.event_manager()?;
    for kind in [
        EventType::MediaPlayerMediaChanged,
        EventType::MediaPlayerOpening,
        EventType::MediaPlayerBuffering,
        EventType::MediaPlayerPlaying,
        EventType::MediaPlayerPaused,
        EventType::MediaPlayerStopped,
        EventType::MediaPlayerEndReached,
        EventType::MediaPlayerEncounteredError,
        EventType::MediaPlayerLengthChanged,
    ] {
        events.event_attach(kind, |event| info!("{:?}: {:?}", event.kind, event.payload))?;
    }

    if let Some(media) = player.media()? {
        info!("Opened {}", media.mrl()?);
        media.release()?;
    }

    player.play()?;
    std::thread::sleep(Duration::from_secs(opts.seconds));
    player.stop()?;
    let state = player.state()?;
    info!("Final state: {state:?}");

    player.release()?;
    instance.release()?;
    if state == State::Error {
        return Err(vlc::Error::Other("Playback failed.".to_string()));
    }
    Ok(())
}
