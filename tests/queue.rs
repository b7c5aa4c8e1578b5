//! Queue engine integration tests
//!
//! The unit tests cover single-threaded semantics; these exercise the
//! engine the way the gateway does, with voice commands and device
//! notifications hammering the same instance from multiple threads.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use perch_gateway::{QueueEngine, Track};

fn playlist(prefix: &str, len: usize) -> Vec<Track> {
    (0..len)
        .map(|i| {
            Track::new(
                format!("{prefix}-{i}"),
                format!("http://media.test/{prefix}/{i}.mp3"),
                format!("{prefix} {i}"),
            )
        })
        .collect()
}

/// Every URI the engine hands out must belong to one of the playlists
/// that were actually queued, no matter how operations interleave.
#[test]
fn concurrent_navigation_only_yields_queued_uris() {
    let engine = Arc::new(QueueEngine::new());
    engine.start_queue(playlist("seed", 5)).unwrap();

    let known: HashSet<String> = (0..8)
        .flat_map(|t| playlist(&format!("p{t}"), 5))
        .chain(playlist("seed", 5))
        .map(|track| track.uri)
        .collect();
    let known = Arc::new(known);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let engine = Arc::clone(&engine);
            let known = Arc::clone(&known);
            thread::spawn(move || {
                for round in 0..200 {
                    match round % 5 {
                        0 => {
                            let uri = engine.start_queue(playlist(&format!("p{t}"), 5)).unwrap();
                            assert!(known.contains(&uri));
                        }
                        1 | 2 => {
                            if let Some(uri) = engine.next_item() {
                                assert!(known.contains(&uri));
                            }
                        }
                        3 => {
                            if let Some(uri) = engine.previous_item() {
                                assert!(known.contains(&uri));
                            }
                        }
                        _ => {
                            if let Some(uri) = engine.current() {
                                assert!(known.contains(&uri));
                            }
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Whatever won the final race, the cursor still points inside the queue
    assert_eq!(engine.len(), 5);
    assert!(engine.current().is_some());
}

/// Interleaved clears must never leave a dangling cursor: after a clear
/// wins a race, navigation reports empty rather than panicking.
#[test]
fn concurrent_clear_and_restart_stay_consistent() {
    let engine = Arc::new(QueueEngine::new());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for round in 0..500 {
                    if (round + t) % 3 == 0 {
                        engine.clear();
                    } else {
                        let _ = engine.start_queue(playlist("r", 3));
                        let _ = engine.next_item();
                        let _ = engine.current();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Terminal state is one of the two legal outcomes
    if engine.is_empty() {
        assert_eq!(engine.current(), None);
        assert_eq!(engine.next_item(), None);
    } else {
        assert_eq!(engine.len(), 3);
        assert!(engine.current().is_some());
    }
}

/// A failed restart must not corrupt the position a racing reader observes.
#[test]
fn empty_restart_never_disturbs_readers() {
    let engine = Arc::new(QueueEngine::new());
    engine.start_queue(playlist("base", 4)).unwrap();

    let writer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for _ in 0..1000 {
                assert!(engine.start_queue(Vec::new()).is_err());
            }
        })
    };
    let reader = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for _ in 0..1000 {
                assert!(engine.current().is_some());
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
    assert_eq!(engine.len(), 4);
}
