//! Transcript recorder - the logger registered with the build host
//!
//! Validates the logger parameters, resolves the webhook endpoint, and turns
//! each subscribed event into one indented transcript line. The indent depth
//! follows the nesting kinds:
//!
//! ```text
//! *Started   append at depth, then depth += 1
//! *Finished  depth -= 1, then append at depth
//! other      append at depth
//! ```
//!
//! On shutdown the transcript is handed to the dispatcher: console always,
//! webhook only when enabled.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, info};

use crate::error::{LoggerError, SinkError};
use crate::events::{BuildEvent, EventKind, Verbosity};
use crate::format::{event_prefix, format_line};
use crate::sink::{ConsoleSink, Dispatcher, Sink, WebhookSink};
use crate::source::{EventSource, Logger};
use crate::{DEFAULT_WEBHOOK_BASE, DEFAULT_WEBHOOK_TIMEOUT_MS, HOST_SENDER_NAME};

/// Settings that shape how the recorder formats and delivers
#[derive(Debug, Clone)]
pub struct RecorderSettings {
    /// Sender name whose events carry no sender title
    pub host_sender: String,
    /// Base a bare webhook token is appended to
    pub webhook_base: String,
    /// Post the transcript to the webhook on shutdown
    pub webhook_enabled: bool,
    pub webhook_timeout: Duration,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            host_sender: HOST_SENDER_NAME.to_string(),
            webhook_base: DEFAULT_WEBHOOK_BASE.to_string(),
            webhook_enabled: false,
            webhook_timeout: Duration::from_millis(DEFAULT_WEBHOOK_TIMEOUT_MS),
        }
    }
}

/// Resolve the webhook endpoint from a logger parameter string
///
/// Only the first `;`-separated segment is used. An absolute URL is taken as
/// is; anything else is appended to `base`.
pub fn resolve_endpoint(parameters: Option<&str>, base: &str) -> Result<Url, LoggerError> {
    let parameters =
        parameters.ok_or_else(|| LoggerError::Configuration("Parameter was not specified.".to_string()))?;

    let Some(first) = parameters.split(';').next() else {
        return Err(LoggerError::Configuration("Parameter was not specified.".to_string()));
    };

    let webhook = first.trim();
    if webhook.is_empty() {
        return Err(LoggerError::Configuration(
            "Lesschat incoming message webhook URL was not specified.".to_string(),
        ));
    }

    if let Ok(url) = Url::parse(webhook) {
        return Ok(url);
    }

    Url::parse(&format!("{}{}", base, webhook)).map_err(|e| {
        debug!(webhook, base, error = %e, "resolve_endpoint: template did not parse");
        LoggerError::Configuration(format!("Invalid incoming message webhook URL ({}).", webhook))
    })
}

/// Logger that accumulates an indented transcript of build events
pub struct TranscriptLogger {
    parameters: Option<String>,
    verbosity: Verbosity,
    settings: RecorderSettings,
    transcript: String,
    depth: i32,
    lines: usize,
    endpoint: Option<Url>,
    dispatcher: Dispatcher,
    extra_sinks: Vec<Box<dyn Sink>>,
}

impl TranscriptLogger {
    /// Create a logger; nothing is validated until `initialize`
    pub fn new(parameters: Option<String>, verbosity: Verbosity, settings: RecorderSettings) -> Self {
        Self {
            parameters,
            verbosity,
            settings,
            transcript: String::new(),
            depth: 0,
            lines: 0,
            endpoint: None,
            dispatcher: Dispatcher::new(),
            extra_sinks: Vec::new(),
        }
    }

    /// Deliver the transcript to an additional sink after the built-in ones
    pub fn with_sink(mut self, sink: Box<dyn Sink>) -> Self {
        self.extra_sinks.push(sink);
        self
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn line_count(&self) -> usize {
        self.lines
    }

    /// Endpoint resolved during `initialize`
    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    fn append(&mut self, event: &BuildEvent, kind: EventKind) {
        let line = format_line(
            &event_prefix(event),
            event,
            kind.category(),
            self.depth,
            &self.settings.host_sender,
        );
        self.transcript.push_str(&line);
        self.transcript.push('\n');
        self.lines += 1;
    }
}

#[async_trait]
impl Logger for TranscriptLogger {
    fn initialize(&mut self, source: &mut dyn EventSource) -> Result<(), LoggerError> {
        let endpoint = resolve_endpoint(self.parameters.as_deref(), &self.settings.webhook_base)?;

        let mut dispatcher = Dispatcher::new().with_sink(Box::new(ConsoleSink));
        if self.settings.webhook_enabled {
            dispatcher.push(Box::new(WebhookSink::new(
                endpoint.clone(),
                self.settings.webhook_timeout,
            )?));
        }
        for sink in self.extra_sinks.drain(..) {
            dispatcher.push(sink);
        }

        for kind in EventKind::ALL {
            source.subscribe(kind);
        }

        info!(
            endpoint = %endpoint,
            verbosity = %self.verbosity,
            sinks = ?dispatcher.sink_names(),
            "TranscriptLogger initialized"
        );
        self.endpoint = Some(endpoint);
        self.dispatcher = dispatcher;
        Ok(())
    }

    fn handle(&mut self, event: &BuildEvent) {
        let kind = event.kind();

        if let BuildEvent::MessageRaised { importance, .. } = event {
            if !self.verbosity.admits(*importance) {
                debug!(?importance, verbosity = %self.verbosity, "TranscriptLogger: message filtered");
                return;
            }
        }

        if kind.is_finished() {
            self.depth -= 1;
        }
        self.append(event, kind);
        if kind.is_started() {
            self.depth += 1;
        }
    }

    async fn shutdown(&mut self) -> Result<(), SinkError> {
        let transcript = std::mem::take(&mut self.transcript);
        debug!(lines = self.lines, depth = self.depth, "TranscriptLogger::shutdown");
        self.dispatcher.dispatch(&transcript).await
    }
}
