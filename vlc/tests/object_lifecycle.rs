// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! Wrapper identity and reference counting.
//!
//! These tests check that accessors resolving the same native handle share one
//! wrapper, that logical and native reference counts stay in step, and that
//! released wrappers become unusable.

use std::sync::Arc;

use vlc::{
    ApiHandle, Error, Instance, MediaPlayer, ObjectKind, Registry, Wrapper, dummy::DummyApi,
};

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

#[test]
fn objects_wrapped() {
    let (_dummy, registry, instance) = setup_test();
    let media = instance.media_new("/tmp/foo.avi").unwrap();
    let player = instance.media_player_new().unwrap();
    player.set_media(Some(&media)).unwrap();
    assert_eq!(registry.lookup(media.handle()).unwrap().refcount, 1);

    // The exact same wrapper is returned...
    let current = player.media().unwrap().unwrap();
    assert!(current.same_object(&media));
    // ...and the accessor implicitly retained it.
    assert_eq!(registry.lookup(media.handle()).unwrap().refcount, 2);

    // The event manager is always the same object.
    let first = player.event_manager().unwrap();
    let second = player.event_manager().unwrap();
    assert!(first.same_object(&second));
}

#[test]
fn objects_retain_release() {
    let (dummy, registry, instance) = setup_test();
    let handle = instance.handle();
    assert_eq!(registry.lookup(handle).unwrap().refcount, 1);

    instance.retain().unwrap();
    assert_eq!(registry.lookup(handle).unwrap().refcount, 2);
    instance.retain().unwrap();
    assert_eq!(registry.lookup(handle).unwrap().refcount, 3);
    assert_eq!(dummy.native_refcount(handle), Some(3));

    instance.release().unwrap();
    assert_eq!(registry.lookup(handle).unwrap().refcount, 2);
    instance.release().unwrap();
    assert_eq!(registry.lookup(handle).unwrap().refcount, 1);
    instance.release().unwrap();

    assert!(registry.lookup(handle).is_none());
    assert!(registry.is_empty());
    assert!(!dummy.is_alive(handle));
}

#[test]
fn release_past_zero_underflows() {
    let (dummy, registry, instance) = setup_test();
    let media = instance.media_new("/tmp/foo.avi").unwrap();
    let handle = media.handle();

    for n in 0..4 {
        for _ in 0..n {
            media.retain().unwrap();
        }
        if n > 0 {
            assert_eq!(media.refcount(), Some(n + 1));
        }
        for _ in 0..n {
            media.release().unwrap();
        }
        assert_eq!(media.refcount(), Some(1));
    }
    media.release().unwrap();

    assert!(registry.lookup(handle).is_none());
    assert!(matches!(media.release(), Err(Error::Underflow(h)) if h == handle));
    assert!(matches!(media.retain(), Err(Error::UseAfterRelease(ObjectKind::Media))));
    assert_eq!(media.refcount(), None);
    assert!(dummy.violations().is_empty());
}

#[test]
fn three_retains_and_releases() {
    let (dummy, registry, instance) = setup_test();
    let media = instance.media_new("/tmp/foo.avi").unwrap();
    let handle = media.handle();

    for _ in 0..3 {
        registry.retain(handle).unwrap();
    }
    assert_eq!(dummy.native_refcount(handle), Some(4));
    for _ in 0..3 {
        registry.release(handle).unwrap();
    }
    assert_eq!(registry.lookup(handle).unwrap().refcount, 1);
    registry.release(handle).unwrap();

    assert!(registry.lookup(handle).is_none());
    assert!(!media.is_live());
    assert!(!dummy.is_alive(handle));
    assert_eq!(registry.len(), 1);
    // A fifth release finds nothing left to give up.
    assert!(matches!(registry.release(handle), Err(Error::Underflow(h)) if h == handle));
    assert!(matches!(media.release(), Err(Error::Underflow(_))));
    assert!(dummy.violations().is_empty());
}

#[test]
fn released_wrapper_is_unusable() {
    let (_dummy, _registry, instance) = setup_test();
    let media = instance.media_new("/tmp/foo.avi").unwrap();
    media.release().unwrap();

    assert!(!media.is_live());
    assert!(matches!(media.mrl(), Err(Error::UseAfterRelease(ObjectKind::Media))));
    assert!(matches!(media.state(), Err(Error::UseAfterRelease(_))));
    assert!(matches!(media.event_manager(), Err(Error::UseAfterRelease(_))));

    let player = instance.media_player_new().unwrap();
    assert!(matches!(
        player.set_media(Some(&media)),
        Err(Error::UseAfterRelease(ObjectKind::Media))
    ));
}

#[test]
fn released_instance_rejects_factories() {
    let (_dummy, _registry, instance) = setup_test();
    instance.release().unwrap();
    assert!(matches!(
        instance.media_new("/tmp/foo.avi"),
        Err(Error::UseAfterRelease(ObjectKind::Instance))
    ));
    assert!(matches!(instance.log_open(), Err(Error::UseAfterRelease(_))));
}

#[test]
fn accessor_after_release_returns_a_new_wrapper() {
    let (dummy, registry, instance) = setup_test();
    let media = instance.media_new("/tmp/foo.avi").unwrap();
    let player = instance.media_player_new().unwrap();
    player.set_media(Some(&media)).unwrap();

    media.release().unwrap();
    assert!(registry.lookup(media.handle()).is_none());
    // The player keeps the native media alive.
    assert_eq!(dummy.native_refcount(media.handle()), Some(1));

    let fresh = player.media().unwrap().unwrap();
    assert_eq!(fresh.handle(), media.handle());
    assert!(!fresh.same_object(&media));
    assert!(fresh.is_live());
    assert!(!media.is_live());
    assert_eq!(fresh.mrl().unwrap(), "file:///tmp/foo.avi");
    assert_eq!(registry.lookup(fresh.handle()).unwrap().refcount, 1);
}

#[test]
fn reused_handle_gets_a_fresh_wrapper() {
    let (dummy, registry, instance) = setup_test();
    let first = instance.media_new("/tmp/foo.avi").unwrap();
    let handle = first.handle();
    first.release().unwrap();
    assert!(!dummy.is_alive(handle));

    let second = instance.media_new("/tmp/bar.avi").unwrap();
    assert_eq!(second.handle(), handle);
    assert!(!second.same_object(&first));
    assert!(!first.is_live());
    assert_eq!(registry.lookup(handle).unwrap().refcount, 1);
    assert_eq!(second.mrl().unwrap(), "file:///tmp/bar.avi");

    // The old wrapper cannot release the new object.
    assert!(matches!(first.release(), Err(Error::Underflow(_))));
    assert_eq!(registry.lookup(handle).unwrap().refcount, 1);
}

#[test]
fn clones_share_the_references() {
    let (_dummy, _registry, instance) = setup_test();
    let media = instance.media_new("/tmp/foo.avi").unwrap();
    let clone = media.clone();
    assert!(clone.same_object(&media));
    assert_eq!(media.refcount(), Some(1));

    clone.release().unwrap();
    assert!(!media.is_live());
}

#[test]
fn dropping_all_values_gives_up_the_references() {
    let (dummy, registry, instance) = setup_test();
    let list = instance.media_list_new(&["/tmp/foo.avi"]).unwrap();
    let item = list.item_at_index(0).unwrap();
    let handle = item.handle();
    item.retain().unwrap();
    assert_eq!(dummy.native_refcount(handle), Some(3));

    drop(item);
    assert!(registry.lookup(handle).is_none());
    assert_eq!(dummy.native_refcount(handle), Some(1));

    let list_handle = list.handle();
    drop(list);
    assert!(!dummy.is_alive(list_handle));
    assert!(!dummy.is_alive(handle));
    assert!(dummy.violations().is_empty());
}

#[test]
fn acquire_as_a_different_kind_fails() {
    let (dummy, registry, instance) = setup_test();
    let media = instance.media_new("/tmp/foo.avi").unwrap();
    let api: ApiHandle = dummy.clone();
    unsafe { api.retain(ObjectKind::Media, media.handle()) };
    let result: Result<MediaPlayer, _> = unsafe { registry.acquire(&api, media.handle()) };
    assert!(matches!(result, Err(Error::KindMismatch { .. })));
    assert_eq!(dummy.native_refcount(media.handle()), Some(1));
}

#[test]
fn shared_registry_is_process_wide() {
    setup_test();
    let dummy = Arc::new(DummyApi::new());
    let instance = Instance::new(dummy, &[]).unwrap();
    assert!(std::ptr::eq(Registry::shared(), Registry::shared()));
    assert_eq!(
        Registry::shared().lookup(instance.handle()).unwrap().kind,
        ObjectKind::Instance
    );
    instance.release().unwrap();
    assert!(Registry::shared().lookup(instance.handle()).is_none());
}
