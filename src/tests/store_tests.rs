// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::error::KernelError;
use crate::event::Event;
use crate::store::Store;
use std::sync::Arc;
use std::thread;

#[test]
fn test_store_ops() {
    let store = Store::new();

    store.put("a", "1").unwrap();
    assert_eq!(store.get("a").unwrap(), "1");

    store.put("a", "2").unwrap();
    assert_eq!(store.get("a").unwrap(), "2");
    assert_eq!(store.len().unwrap(), 1);

    store.delete("a").unwrap();
    assert_eq!(store.get("a"), Err(KernelError::NoSuchKey));
    assert!(store.is_empty().unwrap());
}

#[test]
fn test_delete_missing_key_is_ok() {
    let store = Store::new();
    assert!(store.delete("ghost").is_ok());
}

#[test]
fn test_empty_key_rejected() {
    let store = Store::new();
    assert_eq!(store.put("", "x"), Err(KernelError::EmptyKey));
    assert_eq!(store.delete(""), Err(KernelError::EmptyKey));
}

#[test]
fn test_apply_events() {
    let store = Store::new();
    store.apply(&Event::put("k", "v")).unwrap();
    assert_eq!(store.get("k").unwrap(), "v");
    store.apply(&Event::delete("k")).unwrap();
    assert_eq!(store.get("k"), Err(KernelError::NoSuchKey));
}

#[test]
fn test_digest_ignores_insertion_order() {
    let a = Store::new();
    a.put("x", "1").unwrap();
    a.put("y", "2").unwrap();

    let b = Store::new();
    b.put("y", "2").unwrap();
    b.put("x", "1").unwrap();

    assert_eq!(a.digest().unwrap(), b.digest().unwrap());

    b.put("x", "3").unwrap();
    assert_ne!(a.digest().unwrap(), b.digest().unwrap());
}

#[test]
fn test_digest_separates_key_and_value_boundaries() {
    let a = Store::new();
    a.put("ab", "c").unwrap();
    let b = Store::new();
    b.put("a", "bc").unwrap();
    assert_ne!(a.digest().unwrap(), b.digest().unwrap());
}

#[test]
fn test_concurrent_readers_and_writers() {
    let store = Arc::new(Store::new());
    let mut handles = Vec::new();

    for t in 0..4 {
        let s = store.clone();
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                let key = format!("t{}-{}", t, i);
                s.put(&key, "v").unwrap();
                assert_eq!(s.get(&key).unwrap(), "v");
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.len().unwrap(), 400);
}
