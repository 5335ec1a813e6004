// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::error::KernelError;
use crate::event::Event;
use crate::replay::{check_sequence, replay_into, SequenceGuard};
use crate::store::Store;

#[test]
fn test_sequence_must_strictly_increase() {
    assert!(check_sequence(0, 1).is_ok());
    assert!(check_sequence(1, 2).is_ok());
    assert_eq!(
        check_sequence(2, 2),
        Err(KernelError::OutOfSequence { last: 2, found: 2 })
    );
    assert_eq!(
        check_sequence(5, 3),
        Err(KernelError::OutOfSequence { last: 5, found: 3 })
    );
}

#[test]
fn test_sequence_zero_is_never_valid() {
    assert!(check_sequence(0, 0).is_err());
}

#[test]
fn test_gaps_are_tolerated() {
    let mut guard = SequenceGuard::new();
    for seq in [1, 2, 4] {
        guard.observe(&Event::put("k", "v").with_sequence(seq)).unwrap();
    }
    assert_eq!(guard.last(), 4);
}

#[test]
fn test_guard_does_not_advance_on_rejection() {
    let mut guard = SequenceGuard::starting_at(3);
    assert!(guard.observe(&Event::delete("k").with_sequence(3)).is_err());
    assert_eq!(guard.last(), 3);
}

#[test]
fn test_replay_into_stops_at_violation() {
    let events = vec![
        Event::put("a", "1").with_sequence(1),
        Event::put("b", "2").with_sequence(2),
        Event::put("c", "3").with_sequence(2),
        Event::put("d", "4").with_sequence(3),
    ];

    let store = Store::new();
    let err = replay_into(&store, &events).unwrap_err();
    assert_eq!(err, KernelError::OutOfSequence { last: 2, found: 2 });

    assert_eq!(store.get("b").unwrap(), "2");
    assert_eq!(store.get("c"), Err(KernelError::NoSuchKey));
    assert_eq!(store.get("d"), Err(KernelError::NoSuchKey));
}
