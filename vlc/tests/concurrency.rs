// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! Concurrent use of the registry.

use std::sync::{Arc, Barrier};

use vlc::{Error, Instance, Media, ObjectKind, Registry, State, Wrapper, dummy::DummyApi};

static LOG_ONCE: std::sync::Once = std::sync::Once::new();

fn setup_test() -> (Arc<DummyApi>, Registry, Instance) {
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
    let registry = Registry::new();
    let instance = Instance::with_registry(dummy.clone(), registry.clone(), &[])
        .expect("Failed to create instance.");
    (dummy, registry, instance)
}

const THREADS: usize = 8;

#[test]
fn concurrent_accessors_share_one_wrapper() {
    let (dummy, registry, instance) = setup_test();
    let media = instance.media_new("/tmp/foo.avi").unwrap();
    let player = instance.media_player_new().unwrap();
    player.set_media(Some(&media)).unwrap();
    media.release().unwrap();

    let barrier = Barrier::new(THREADS);
    let wrappers: Vec<Media> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    player.media().unwrap().unwrap()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    for wrapper in &wrappers {
        assert!(wrapper.same_object(&wrappers[0]));
    }
    let handle = wrappers[0].handle();
    assert_eq!(registry.lookup(handle).unwrap().refcount, THREADS);
    assert_eq!(dummy.native_refcount(handle), Some(THREADS + 1));

    for wrapper in &wrappers {
        wrapper.release().unwrap();
    }
    assert!(registry.lookup(handle).is_none());
    assert_eq!(dummy.native_refcount(handle), Some(1));
    assert!(dummy.violations().is_empty());
}

#[test]
fn concurrent_retain_release_stays_balanced() {
    let (dummy, registry, instance) = setup_test();
    let media = instance.media_new("/tmp/foo.avi").unwrap();
    let handle = media.handle();

    std::thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..100 {
                    media.retain().unwrap();
                    media.release().unwrap();
                }
            });
        }
    });

    assert_eq!(registry.lookup(handle).unwrap().refcount, 1);
    assert_eq!(dummy.native_refcount(handle), Some(1));
}

#[test]
fn release_races_with_events() {
    let (dummy, registry, instance) = setup_test();
    let media = instance.media_new("/tmp/foo.avi").unwrap();
    let handle = media.handle();
    let player = instance.media_player_new().unwrap();
    player.set_media(Some(&media)).unwrap();
    media
        .event_manager()
        .unwrap()
        .event_attach(vlc::EventType::MediaStateChanged, |_| {})
        .unwrap();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..100 {
                dummy.set_media_state(handle, State::Playing).unwrap();
            }
        });
        scope.spawn(|| media.release().unwrap());
    });

    assert!(registry.lookup(handle).is_none());
    assert_eq!(dummy.listener_count(handle), 0);
    assert!(dummy.violations().is_empty());
}

#[test]
fn calls_in_flight_outlive_the_last_release() {
    let (dummy, registry, instance) = setup_test();
    let media = instance.media_new("/tmp/foo.avi").unwrap();
    let handle = media.handle();

    let barrier = Barrier::new(THREADS + 1);
    std::thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                barrier.wait();
                loop {
                    match media.mrl() {
                        Ok(mrl) => assert!(mrl.starts_with("file://")),
                        Err(Error::UseAfterRelease(ObjectKind::Media)) => break,
                        Err(err) => panic!("call reached a released media: {err}"),
                    }
                }
            });
        }
        barrier.wait();
        media.release().unwrap();
    });

    assert!(registry.lookup(handle).is_none());
    assert!(!dummy.is_alive(handle));
    assert!(dummy.violations().is_empty());
}

#[test]
fn accessor_races_with_the_last_release() {
    let (dummy, registry, instance) = setup_test();
    let media = instance.media_new("/tmp/foo.avi").unwrap();
    let handle = media.handle();
    let player = instance.media_player_new().unwrap();
    player.set_media(Some(&media)).unwrap();

    let barrier = Barrier::new(THREADS + 1);
    let wrappers: Vec<Media> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    player.media().unwrap().unwrap()
                })
            })
            .collect();
        barrier.wait();
        media.release().unwrap();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    for wrapper in &wrappers {
        assert!(wrapper.is_live());
        assert_eq!(wrapper.handle(), handle);
    }
    // Accessors that ran after the release share one fresh wrapper.
    let fresh: Vec<&Media> = wrappers.iter().filter(|w| !w.same_object(&media)).collect();
    for wrapper in &fresh {
        assert!(wrapper.same_object(fresh[0]));
    }
    assert_eq!(media.is_live(), fresh.len() < THREADS);

    for wrapper in &wrappers {
        wrapper.release().unwrap();
    }
    assert!(registry.lookup(handle).is_none());
    assert_eq!(dummy.native_refcount(handle), Some(1));
    assert!(dummy.violations().is_empty());
}
