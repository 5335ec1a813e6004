// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
mod common;

use common::{keys, sequences, RecordingBackend};
use kvlog_kernel::{Event, EventType};
use kvlog_node::events::{LoggerError, TransactionLogger};
use kvlog_persistence::PersistenceError;
use std::time::Duration;
use tokio::time::{sleep, timeout};

#[tokio::test]
async fn test_pump_appends_in_enqueue_order() {
    let (backend, journal) = RecordingBackend::new();
    let mut logger = TransactionLogger::new(Box::new(backend), 16);
    logger.run().await.unwrap();

    for i in 0..50 {
        if i % 4 == 0 {
            logger.write_delete(&format!("k{}", i)).await;
        } else {
            logger.write_put(&format!("k{}", i), "v").await;
        }
    }
    logger.shutdown().await.unwrap();

    let expected: Vec<String> = (0..50).map(|i| format!("k{}", i)).collect();
    assert_eq!(keys(&journal), expected);
    assert_eq!(sequences(&journal), (1..=50).collect::<Vec<u64>>());

    let journal = journal.lock().unwrap();
    assert_eq!(journal[0].event_type, EventType::Delete);
    assert_eq!(journal[1].event_type, EventType::Put);
}

#[tokio::test]
async fn test_full_queue_blocks_writer_until_pump_runs() {
    let (backend, journal) = RecordingBackend::new();
    let mut logger = TransactionLogger::new(Box::new(backend), 1);

    // Fills the only slot.
    logger.write_put("a", "1").await;

    let writer = logger.writer();
    let blocked = tokio::spawn(async move { writer.write_put("b", "2").await });

    sleep(Duration::from_millis(50)).await;
    assert!(!blocked.is_finished(), "enqueue should wait for capacity");
    assert!(journal.lock().unwrap().is_empty());

    logger.run().await.unwrap();
    timeout(Duration::from_secs(5), blocked).await.unwrap().unwrap();

    logger.shutdown().await.unwrap();
    assert_eq!(keys(&journal), vec!["a", "b"]);
}

#[tokio::test]
async fn test_append_failure_halts_pump_and_reports_once() {
    let (backend, journal) = RecordingBackend::new();
    let mut logger = TransactionLogger::new(Box::new(backend.failing_after(2)), 16);

    let mut errors = logger.errors().unwrap();
    assert!(logger.errors().is_none(), "error channel is handed out once");

    logger.run().await.unwrap();
    for i in 0..3 {
        logger.write_put(&format!("k{}", i), "v").await;
    }

    let err = timeout(Duration::from_secs(5), errors.recv()).await.unwrap().unwrap();
    assert!(matches!(err, LoggerError::Backend(PersistenceError::IoError(_))));

    // Writes after the halt are accepted by the caller and silently dropped.
    logger.write_put("late", "v").await;
    logger.shutdown().await.unwrap();

    assert!(errors.recv().await.is_none());
    assert_eq!(keys(&journal), vec!["k0", "k1"]);
}

#[tokio::test]
async fn test_run_twice_rejected() {
    let (backend, _journal) = RecordingBackend::new();
    let mut logger = TransactionLogger::new(Box::new(backend), 4);

    assert!(!logger.is_running());
    logger.run().await.unwrap();
    assert!(logger.is_running());

    assert!(matches!(logger.run().await, Err(LoggerError::AlreadyRunning)));
    assert!(matches!(logger.read_events().await, Err(LoggerError::AlreadyRunning)));

    logger.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_read_events_streams_history_then_closes() {
    let history = vec![Event::put("a", "1"), Event::delete("a"), Event::put("b", "2")];
    let (backend, _journal) = RecordingBackend::new();
    let mut logger = TransactionLogger::new(Box::new(backend.with_history(history)), 4);

    let mut stream = logger.read_events().await.unwrap();
    let mut seen = Vec::new();
    while let Some(item) = stream.next().await {
        seen.push(item.unwrap());
    }
    assert_eq!(stream.delivered(), 3);
    assert!(stream.next().await.is_none());
    drop(stream);

    assert_eq!(seen.iter().map(|e| e.sequence).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(seen[1], Event::delete("a").with_sequence(2));

    // The backend came back and can be replayed again.
    let mut again = logger.read_events().await.unwrap();
    let mut count = 0;
    while let Some(item) = again.next().await {
        item.unwrap();
        count += 1;
    }
    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_replay_error_is_terminal() {
    let history = vec![Event::put("a", "1"), Event::put("b", "2"), Event::put("c", "3")];
    let (backend, _journal) = RecordingBackend::new();
    let backend = backend.with_history(history).with_replay_error_at(2);
    let mut logger = TransactionLogger::new(Box::new(backend), 4);

    let mut stream = logger.read_events().await.unwrap();
    assert_eq!(stream.next().await.unwrap().unwrap().key, "a");
    assert_eq!(stream.next().await.unwrap().unwrap().key, "b");
    assert!(matches!(
        stream.next().await,
        Some(Err(LoggerError::Backend(PersistenceError::Parse { record: 3, .. })))
    ));
    assert!(stream.next().await.is_none());
    drop(stream);

    assert!(matches!(logger.run().await, Err(LoggerError::ReplayIncomplete)));
}

#[tokio::test]
async fn test_run_without_replay_starts_from_backend_counter() {
    let (backend, journal) = RecordingBackend::new();
    let mut logger = TransactionLogger::new(Box::new(backend), 4);

    logger.run().await.unwrap();
    logger.write_put("a", "1").await;
    logger.shutdown().await.unwrap();

    assert_eq!(sequences(&journal), vec![1]);
}

#[tokio::test]
async fn test_abandoned_replay_releases_backend() {
    let history: Vec<Event> = (0..500).map(|i| Event::put(format!("k{}", i), "v")).collect();
    let (backend, journal) = RecordingBackend::new();
    let mut logger = TransactionLogger::new(Box::new(backend.with_history(history)), 4);

    {
        let mut stream = logger.read_events().await.unwrap();
        stream.next().await.unwrap().unwrap();
    }

    // The counter stopped partway through the history.
    let refused = timeout(Duration::from_secs(5), logger.run()).await.unwrap();
    assert!(matches!(refused, Err(LoggerError::ReplayIncomplete)));
    assert!(!logger.is_running());

    // A full replay settles the backend again.
    let mut stream = logger.read_events().await.unwrap();
    while let Some(item) = stream.next().await {
        item.unwrap();
    }
    drop(stream);

    logger.run().await.unwrap();
    logger.write_put("after", "v").await;
    logger.shutdown().await.unwrap();

    assert_eq!(keys(&journal), vec!["after"]);
    assert_eq!(sequences(&journal), vec![501]);
}

#[tokio::test]
async fn test_writes_before_run_are_kept() {
    let (backend, journal) = RecordingBackend::new();
    let mut logger = TransactionLogger::new(Box::new(backend), 8);

    logger.write_put("early", "1").await;
    logger.run().await.unwrap();
    logger.write_put("late", "2").await;
    logger.shutdown().await.unwrap();

    assert_eq!(keys(&journal), vec!["early", "late"]);
}
