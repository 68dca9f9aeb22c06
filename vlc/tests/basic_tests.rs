// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! Basic integration tests for the libvlc Rust bindings.
//!
//! These tests exercise instance creation, media, media players, media lists
//! and logs against the in-process [`DummyApi`]. Each test uses its own
//! registry and stand-in, so tests can run in parallel.
//!
//! # Test Coverage
//!
//! - Instance creation, also from a configuration document
//! - Path to `file://` MRL conversion
//! - Media list indexing
//! - Player media get/set, including no media at all
//! - Player state, play and stop
//! - Log count, clear and iteration

use std::sync::Arc;

use tracing::info;
use vlc::{
    Error, Instance, NativeApi, ObjectKind, Registry, State, Wrapper, config::InstanceConfig,
    dummy::DummyApi,
};

/// Ensures logging is initialized only once across all tests.
static LOG_ONCE: std::sync::Once = std::sync::Once::new();

/// Sets up a test by initializing logging and creating an isolated instance.
fn setup_test() -> (Arc<DummyApi>, Instance) {
    // Initialize logging once (respects RUST_LOG environment variable)
    LOG_ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .with_test_writer()
            .init();
    });

    let dummy = Arc::new(DummyApi::new());
    let instance = Instance::with_registry(dummy.clone(), Registry::new(), &[])
        .expect("Failed to create instance.");
    info!("Created instance {} ({}).", instance.handle(), dummy.version());
    (dummy, instance)
}

const MRL: &str = "/tmp/foo.avi";

#[test]
fn instance_creation() {
    let (dummy, instance) = setup_test();
    assert!(instance.is_live());
    assert_eq!(instance.refcount(), Some(1));
    assert_eq!(dummy.native_refcount(instance.handle()), Some(1));
}

#[test]
fn instance_arguments_are_forwarded() {
    setup_test();
    let dummy = Arc::new(DummyApi::new());
    let instance =
        Instance::with_registry(dummy.clone(), Registry::new(), &["--no-video", "--quiet"])
            .unwrap();
    assert_eq!(
        dummy.instance_args(instance.handle()).unwrap(),
        ["--no-video", "--quiet"]
    );
}

#[test]
fn instance_from_config() {
    setup_test();
    let config =
        InstanceConfig::from_json(r#"{ "args": ["--quiet"], "verbosity": 2, "interfaces": ["dummy"] }"#)
            .unwrap();
    let dummy = Arc::new(DummyApi::new());
    let instance = Instance::from_config(dummy.clone(), Registry::new(), &config).unwrap();

    assert_eq!(dummy.instance_args(instance.handle()).unwrap(), ["--quiet"]);
    assert_eq!(instance.log_verbosity().unwrap(), 2);
    assert_eq!(dummy.interfaces(instance.handle()), ["dummy"]);
}

#[test]
fn instance_from_config_with_unknown_interface_fails() {
    setup_test();
    let config = InstanceConfig {
        interfaces: vec!["no-such-intf".to_string()],
        ..Default::default()
    };
    let result = Instance::from_config(Arc::new(DummyApi::new()), Registry::new(), &config);
    assert!(matches!(result, Err(Error::Native(_))));
}

#[test]
fn libvlc_media() {
    let (_dummy, instance) = setup_test();
    let media = instance.media_new(MRL).unwrap();
    assert_eq!(media.mrl().unwrap(), format!("file://{MRL}"));
}

#[test]
fn media_with_scheme_is_a_location() {
    let (_dummy, instance) = setup_test();
    let media = instance.media_new("http://example.com/live.ts").unwrap();
    assert_eq!(media.mrl().unwrap(), "http://example.com/live.ts");
}

#[test]
fn media_meta_and_state() {
    let (dummy, instance) = setup_test();
    let media = instance.media_new(MRL).unwrap();
    assert_eq!(media.meta(vlc::Meta::Title).unwrap(), None);
    assert_eq!(media.state().unwrap(), State::NothingSpecial);

    dummy
        .set_meta(media.handle(), vlc::Meta::Title, "Foo")
        .unwrap();
    dummy.set_media_state(media.handle(), State::Playing).unwrap();

    assert_eq!(media.meta(vlc::Meta::Title).unwrap().as_deref(), Some("Foo"));
    assert_eq!(media.state().unwrap(), State::Playing);
}

#[test]
fn media_with_nul_byte_is_rejected() {
    let (_dummy, instance) = setup_test();
    assert!(matches!(
        instance.media_new("/tmp/foo\0.avi"),
        Err(Error::NulString(_))
    ));
}

#[test]
fn wrapper_medialist() {
    let (_dummy, instance) = setup_test();
    let list = instance
        .media_list_new(&["/tmp/foo.avi", "/tmp/bar.avi"])
        .unwrap();

    assert_eq!(list.count().unwrap(), 2);
    assert_eq!(
        list.item_at_index(1).unwrap().mrl().unwrap(),
        "file:///tmp/bar.avi"
    );
    let mrls: Vec<String> = list
        .items()
        .unwrap()
        .iter()
        .map(|media| media.mrl().unwrap())
        .collect();
    assert_eq!(mrls, ["file:///tmp/foo.avi", "file:///tmp/bar.avi"]);
}

#[test]
fn medialist_index_out_of_range() {
    let (_dummy, instance) = setup_test();
    let list = instance.media_list_new(&[MRL]).unwrap();
    assert!(matches!(
        list.item_at_index(3),
        Err(Error::IndexOutOfRange { index: 3, count: 1 })
    ));
}

#[test]
fn libvlc_player() {
    let (_dummy, instance) = setup_test();
    let player = instance.media_player_new_with(MRL).unwrap();
    let media = player.media().unwrap().expect("Player has no media.");
    assert_eq!(media.mrl().unwrap(), format!("file://{MRL}"));
    // The player's media was released by the constructor; only the accessor
    // reference remains.
    assert_eq!(media.refcount(), Some(1));
}

#[test]
fn libvlc_none_object() {
    let (_dummy, instance) = setup_test();
    let player = instance.media_player_new().unwrap();
    player.set_media(None).unwrap();
    assert!(player.media().unwrap().is_none());
}

#[test]
fn libvlc_player_state() {
    let (dummy, instance) = setup_test();
    let player = instance.media_player_new_with(MRL).unwrap();
    assert_eq!(player.state().unwrap(), State::NothingSpecial);

    dummy.set_player_state(player.handle(), State::Paused).unwrap();
    assert_eq!(player.state().unwrap(), State::Paused);
}

#[test]
fn player_play_and_stop() {
    let (dummy, instance) = setup_test();
    let empty = instance.media_player_new().unwrap();
    assert!(matches!(empty.play(), Err(Error::Native(_))));

    let player = instance.media_player_new_with(MRL).unwrap();
    player.play().unwrap();
    assert_eq!(player.state().unwrap(), State::Playing);
    player.stop().unwrap();
    assert_eq!(player.state().unwrap(), State::Stopped);

    player.release().unwrap();
    assert!(matches!(
        player.play(),
        Err(Error::UseAfterRelease(ObjectKind::MediaPlayer))
    ));
    assert!(dummy.violations().is_empty());
}

#[test]
fn libvlc_logger_clear() {
    let (_dummy, instance) = setup_test();
    let log = instance.log_open().unwrap();
    log.clear().unwrap();
    assert_eq!(log.count().unwrap(), 0);
    log.close().unwrap();
}

#[test]
fn libvlc_logger_messages() {
    let (_dummy, instance) = setup_test();
    instance.set_log_verbosity(3).unwrap();
    let log = instance.log_open().unwrap();
    instance.add_intf("dummy").unwrap();

    let messages = log.messages().unwrap();
    assert!(!messages.is_empty());
    assert_eq!(messages.len(), log.count().unwrap());
    for message in &messages {
        // Ensure that messages can be read.
        assert!(!message.message.is_empty());
    }

    log.clear().unwrap();
    assert_eq!(log.count().unwrap(), 0);
    log.close().unwrap();
}

#[test]
fn closed_log_is_unusable() {
    let (dummy, instance) = setup_test();
    let before = dummy.object_count();
    let log = instance.log_open().unwrap();
    assert_eq!(dummy.object_count(), before + 1);

    assert!(log.is_open());
    log.close().unwrap();
    assert!(!log.is_open());
    assert_eq!(dummy.object_count(), before);
    assert!(matches!(log.count(), Err(Error::UseAfterRelease(ObjectKind::Log))));
    assert!(matches!(log.close(), Err(Error::UseAfterRelease(ObjectKind::Log))));
}

#[test]
fn dropped_log_is_closed() {
    let (dummy, instance) = setup_test();
    let before = dummy.object_count();
    drop(instance.log_open().unwrap());
    assert_eq!(dummy.object_count(), before);
    assert!(dummy.violations().is_empty());
}
