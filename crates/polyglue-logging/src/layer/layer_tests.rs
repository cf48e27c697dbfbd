#![allow(non_snake_case)]

use super::*;
use crate::sink::LogSink;
use parking_lot::Mutex;
use std::sync::Arc;
use test_case::test_case;
use tracing_subscriber::prelude::*;

type Lines = Arc<Mutex<Vec<(LogLevel, String, String)>>>;

fn leaked_manager(level: LogLevel) -> (&'static LogSinkManager, Lines) {
    let manager: &'static LogSinkManager = Box::leak(Box::new(LogSinkManager::new()));
    manager.set_level(level);
    let lines: Lines = Arc::new(Mutex::new(Vec::new()));
    let captured = lines.clone();
    let sink: LogSink = Arc::new(move |level: LogLevel, target: &str, message: &str| {
        captured
            .lock()
            .push((level, target.to_string(), message.to_string()));
    });
    manager.set_sink(sink);
    (manager, lines)
}

#[test_case(Level::TRACE, LogLevel::Trace)]
#[test_case(Level::DEBUG, LogLevel::Debug)]
#[test_case(Level::INFO, LogLevel::Info)]
#[test_case(Level::WARN, LogLevel::Warn)]
#[test_case(Level::ERROR, LogLevel::Error)]
fn HostLoggingLayer___convert_level___maps_each_level(level: Level, expected: LogLevel) {
    assert_eq!(HostLoggingLayer::convert_level(&level), expected);
}

#[test]
fn HostLoggingLayer___event_with_fields___appends_key_values() {
    let (manager, lines) = leaked_manager(LogLevel::Info);
    let subscriber = tracing_subscriber::registry().with(HostLoggingLayer::with_manager(manager));

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(target: "chat", user = "U1", event_id = 3, "message received");
    });

    let lines = lines.lock();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, LogLevel::Info);
    assert_eq!(lines[0].1, "chat");
    assert_eq!(lines[0].2, "message received user=U1 event_id=3");
}

#[test]
fn HostLoggingLayer___event_without_message___renders_fields_only() {
    let (manager, lines) = leaked_manager(LogLevel::Info);
    let subscriber = tracing_subscriber::registry().with(HostLoggingLayer::with_manager(manager));

    tracing::subscriber::with_default(subscriber, || {
        tracing::warn!(state = "Failed");
    });

    assert_eq!(lines.lock()[0].2, "state=Failed");
}

#[test]
fn HostLoggingLayer___below_threshold___not_forwarded() {
    let (manager, lines) = leaked_manager(LogLevel::Warn);
    let subscriber = tracing_subscriber::registry().with(HostLoggingLayer::with_manager(manager));

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("quiet");
        tracing::error!("loud");
    });

    let lines = lines.lock();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].2, "loud");
}
