//! BuildLog - build event transcript logger
//!
//! Attaches to a build host's event notifications, records every lifecycle
//! event as one indented line of text, and hands the whole transcript to the
//! configured sinks when the build shuts down.
//!
//! # Architecture
//!
//! ```text
//!  build host ──emit──▶ EventBus ──handle──▶ TranscriptLogger
//!                                              │  format_line()
//!                                              ▼
//!                                         transcript (String)
//!                                              │  shutdown()
//!                                              ▼
//!                                         Dispatcher ──▶ ConsoleSink
//!                                                   └──▶ WebhookSink (opt-in)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use buildlog::{BuildEvent, EventBus, RecorderSettings, TranscriptLogger, Verbosity};
//!
//! let logger = TranscriptLogger::new(Some("abcd1234".into()), Verbosity::Normal, RecorderSettings::default());
//! let mut bus = EventBus::new();
//! bus.register(Box::new(logger))?;
//! bus.emit(&BuildEvent::build_started("MSBuild", "Build started."));
//! bus.shutdown().await?;
//! ```

pub mod cli;
pub mod config;
mod error;
mod events;
mod format;
mod recorder;
mod sink;
mod source;

pub use error::{LoggerError, SinkError};
pub use events::{BuildEvent, EventKind, MessageImportance, Verbosity};
pub use format::{format_line, location_prefix};
pub use recorder::{RecorderSettings, TranscriptLogger, resolve_endpoint};
pub use sink::{ConsoleSink, Dispatcher, Sink, WebhookSink};
pub use source::{EventBus, EventSource, Logger, read_events};

/// Sender name the build host uses for its own events
pub const HOST_SENDER_NAME: &str = "MSBuild";

/// Base address a bare webhook token is appended to
pub const DEFAULT_WEBHOOK_BASE: &str = "https://hook.lesschat.com/incoming/";

/// Indentation emitted per nesting level
pub const INDENT: &str = "    ";

/// Default webhook request timeout (10s)
pub const DEFAULT_WEBHOOK_TIMEOUT_MS: u64 = 10_000;
