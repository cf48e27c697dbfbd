//! Concurrency tests for the class registry
//!
//! Registration and lookup must be safe from many threads at once, and a
//! contested name must be registered exactly once.

use polyglue_core::GlueError;
use polyglue_reflect::{ClassDescriptor, Registry, TypeTag};
use std::sync::{Arc, Barrier};
use std::thread;

fn leaked(name: String) -> &'static ClassDescriptor {
    ClassDescriptor::builder(name)
        .field("id", TypeTag::String)
        .finish()
        .leak()
}

#[test]
fn test_concurrent_registration_of_distinct_names() {
    let registry = Arc::new(Registry::new());
    let num_threads = 32;
    let barrier = Arc::new(Barrier::new(num_threads));

    let mut handles = vec![];
    for i in 0..num_threads {
        let registry_clone = registry.clone();
        let barrier_clone = barrier.clone();
        let descriptor = leaked(format!("race.Distinct{}", i));

        handles.push(thread::spawn(move || {
            barrier_clone.wait();
            registry_clone.register(descriptor)
        }));
    }

    for handle in handles {
        let result = handle.join().expect("Thread should complete");
        assert!(result.is_ok());
    }

    assert_eq!(registry.len(), num_threads);
    for i in 0..num_threads {
        assert!(registry.contains(&format!("race.Distinct{}", i)));
    }
}

#[test]
fn test_concurrent_registration_of_one_name_succeeds_once() {
    let registry = Arc::new(Registry::new());
    let num_threads = 32;
    let barrier = Arc::new(Barrier::new(num_threads));

    let mut handles = vec![];
    for _ in 0..num_threads {
        let registry_clone = registry.clone();
        let barrier_clone = barrier.clone();
        let descriptor = leaked("race.Contested".to_string());

        handles.push(thread::spawn(move || {
            barrier_clone.wait();
            registry_clone
                .register(descriptor)
                .map(|d| d as *const ClassDescriptor as usize)
        }));
    }

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("Thread should complete"))
        .collect();

    let winners: Vec<usize> = results.iter().filter_map(|r| r.clone().ok()).collect();
    assert_eq!(winners.len(), 1, "Exactly one registration should win");
    assert!(
        results
            .iter()
            .filter_map(|r| r.clone().err())
            .all(|e| e == GlueError::DuplicateClass("race.Contested".into()))
    );

    let stored = registry.lookup("race.Contested").unwrap() as *const ClassDescriptor as usize;
    assert_eq!(stored, winners[0]);
}

#[test]
fn test_lookup_during_registration() {
    let registry = Arc::new(Registry::new());
    registry.register(leaked("race.Stable".into())).unwrap();

    let num_writers = 8;
    let num_readers = 8;
    let barrier = Arc::new(Barrier::new(num_writers + num_readers));
    let mut handles = vec![];

    for i in 0..num_writers {
        let registry_clone = registry.clone();
        let barrier_clone = barrier.clone();
        handles.push(thread::spawn(move || {
            barrier_clone.wait();
            for j in 0..25 {
                let _ = registry_clone.register(leaked(format!("race.W{}x{}", i, j)));
            }
        }));
    }

    for _ in 0..num_readers {
        let registry_clone = registry.clone();
        let barrier_clone = barrier.clone();
        handles.push(thread::spawn(move || {
            barrier_clone.wait();
            for _ in 0..100 {
                assert!(registry_clone.lookup("race.Stable").is_ok());
                let _ = registry_clone.all();
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread should complete");
    }

    assert_eq!(registry.len(), 1 + num_writers * 25);
}
