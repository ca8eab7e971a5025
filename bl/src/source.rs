//! Event source - the host side of logger registration
//!
//! A build host exposes an [`EventSource`] to each logger during
//! initialization; the logger subscribes to the kinds it wants. The
//! [`EventBus`] plays the host: it owns registered loggers, delivers events
//! synchronously in registration order, and shuts loggers down when the
//! build ends.

use std::collections::HashSet;
use std::io::BufRead;

use async_trait::async_trait;
use eyre::{Context, Result};
use tracing::debug;

use crate::error::{LoggerError, SinkError};
use crate::events::{BuildEvent, EventKind};

/// Notification surface a logger subscribes against
pub trait EventSource {
    /// Register interest in one kind of event
    fn subscribe(&mut self, kind: EventKind);
}

/// A build logger driven by the host
///
/// The host calls `initialize` once before any event fires, `handle` for
/// every event of a subscribed kind, and `shutdown` once after the last
/// event. Handlers are never re-entered and never run concurrently.
#[async_trait]
pub trait Logger: Send {
    /// Validate parameters and subscribe to event kinds
    fn initialize(&mut self, source: &mut dyn EventSource) -> Result<(), LoggerError>;

    /// Handle one event
    fn handle(&mut self, event: &BuildEvent);

    /// Flush whatever the logger accumulated
    async fn shutdown(&mut self) -> Result<(), SinkError>;
}

/// Set of kinds a single logger subscribed to
#[derive(Debug, Default)]
struct Subscriptions {
    kinds: HashSet<EventKind>,
}

impl EventSource for Subscriptions {
    fn subscribe(&mut self, kind: EventKind) {
        self.kinds.insert(kind);
    }
}

struct Registration {
    logger: Box<dyn Logger>,
    subscriptions: Subscriptions,
}

/// Single-threaded host that fans events out to registered loggers
#[derive(Default)]
pub struct EventBus {
    registrations: Vec<Registration>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize a logger and, on success, start delivering events to it
    ///
    /// A logger whose initialization fails is dropped and receives nothing.
    pub fn register(&mut self, mut logger: Box<dyn Logger>) -> Result<(), LoggerError> {
        let mut subscriptions = Subscriptions::default();
        logger.initialize(&mut subscriptions)?;
        debug!(
            kinds = subscriptions.kinds.len(),
            position = self.registrations.len(),
            "EventBus::register: logger initialized"
        );
        self.registrations.push(Registration { logger, subscriptions });
        Ok(())
    }

    /// Deliver an event to every logger subscribed to its kind
    pub fn emit(&mut self, event: &BuildEvent) {
        let kind = event.kind();
        for registration in &mut self.registrations {
            if registration.subscriptions.kinds.contains(&kind) {
                registration.logger.handle(event);
            }
        }
    }

    /// Shut every logger down in registration order
    ///
    /// Stops at the first sink failure and returns it.
    pub async fn shutdown(&mut self) -> Result<(), LoggerError> {
        debug!(loggers = self.registrations.len(), "EventBus::shutdown");
        for registration in &mut self.registrations {
            registration.logger.shutdown().await?;
        }
        Ok(())
    }

    /// Number of registered loggers
    pub fn logger_count(&self) -> usize {
        self.registrations.len()
    }

    /// Number of loggers subscribed to `kind`
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.registrations
            .iter()
            .filter(|r| r.subscriptions.kinds.contains(&kind))
            .count()
    }
}

/// Parse a JSON-lines event log
///
/// Blank lines are skipped. A malformed line fails the whole read with its
/// line number.
pub fn read_events<R: BufRead>(reader: R) -> Result<Vec<BuildEvent>> {
    let mut events = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read event log")?;
        if line.trim().is_empty() {
            continue;
        }
        let event: BuildEvent =
            serde_json::from_str(&line).context(format!("Invalid event on line {}", index + 1))?;
        events.push(event);
    }

    debug!(count = events.len(), "read_events: loaded events");
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Logger that records the kinds it saw into a shared log
    struct RecordingLogger {
        name: &'static str,
        kinds: Vec<EventKind>,
        fail_init: bool,
        fail_shutdown: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingLogger {
        fn new(name: &'static str, kinds: &[EventKind], log: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name,
                kinds: kinds.to_vec(),
                fail_init: false,
                fail_shutdown: false,
                log,
            }
        }
    }

    #[async_trait]
    impl Logger for RecordingLogger {
        fn initialize(&mut self, source: &mut dyn EventSource) -> Result<(), LoggerError> {
            if self.fail_init {
                return Err(LoggerError::Configuration("Parameter was not specified.".to_string()));
            }
            for kind in &self.kinds {
                source.subscribe(*kind);
            }
            Ok(())
        }

        fn handle(&mut self, event: &BuildEvent) {
            self.log.lock().unwrap().push(format!("{}:{}", self.name, event.kind()));
        }

        async fn shutdown(&mut self) -> Result<(), SinkError> {
            self.log.lock().unwrap().push(format!("{}:shutdown", self.name));
            if self.fail_shutdown {
                return Err(SinkError::Api {
                    status: 500,
                    message: "down".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_emit_only_to_subscribed_kinds() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.register(Box::new(RecordingLogger::new(
            "a",
            &[EventKind::BuildStarted, EventKind::ErrorRaised],
            log.clone(),
        )))
        .unwrap();

        bus.emit(&BuildEvent::build_started("MSBuild", "Build started."));
        bus.emit(&BuildEvent::project_started("MSBuild", "p"));
        bus.emit(&BuildEvent::error("csc", "a.cs", 1, 1, "e"));

        assert_eq!(*log.lock().unwrap(), vec!["a:BuildStarted", "a:ErrorRaised"]);
        assert_eq!(bus.subscriber_count(EventKind::BuildStarted), 1);
        assert_eq!(bus.subscriber_count(EventKind::ProjectStarted), 0);
    }

    #[test]
    fn test_delivery_follows_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.register(Box::new(RecordingLogger::new("a", &EventKind::ALL, log.clone())))
            .unwrap();
        bus.register(Box::new(RecordingLogger::new("b", &EventKind::ALL, log.clone())))
            .unwrap();

        bus.emit(&BuildEvent::task_started("MSBuild", "t"));

        assert_eq!(*log.lock().unwrap(), vec!["a:TaskStarted", "b:TaskStarted"]);
    }

    #[test]
    fn test_failed_initialize_is_not_registered() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut logger = RecordingLogger::new("a", &EventKind::ALL, log.clone());
        logger.fail_init = true;

        let mut bus = EventBus::new();
        let err = bus.register(Box::new(logger)).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(bus.logger_count(), 0);

        bus.emit(&BuildEvent::build_started("MSBuild", "Build started."));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_propagates_first_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut failing = RecordingLogger::new("a", &[], log.clone());
        failing.fail_shutdown = true;

        let mut bus = EventBus::new();
        bus.register(Box::new(failing)).unwrap();
        bus.register(Box::new(RecordingLogger::new("b", &[], log.clone())))
            .unwrap();

        let err = bus.shutdown().await.unwrap_err();
        assert!(matches!(err, LoggerError::Sink(SinkError::Api { status: 500, .. })));
        assert_eq!(*log.lock().unwrap(), vec!["a:shutdown"]);
    }

    #[test]
    fn test_read_events_skips_blank_lines() {
        let input = concat!(
            r#"{"type":"BuildStarted","sender_name":"MSBuild","message":"Build started."}"#,
            "\n\n",
            r#"{"type":"WarningRaised","sender_name":"csc","message":"CS0168","file":"a.cs","line":3,"column":9}"#,
            "\n",
        );

        let events = read_events(input.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], BuildEvent::build_started("MSBuild", "Build started."));
        assert_eq!(events[1], BuildEvent::warning("csc", "a.cs", 3, 9, "CS0168"));
    }

    #[test]
    fn test_read_events_reports_bad_line() {
        let input = concat!(
            r#"{"type":"BuildStarted","sender_name":"MSBuild","message":"Build started."}"#,
            "\n",
            r#"{"type":"Unknown"}"#,
            "\n",
        );

        let err = read_events(input.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
