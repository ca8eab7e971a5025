//! Transcript sinks and the dispatcher that feeds them

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::SinkError;

/// Destination for a finished transcript
#[async_trait]
pub trait Sink: Send + Sync {
    /// Sink name for diagnostics
    fn name(&self) -> &'static str;

    /// Deliver the whole transcript
    async fn deliver(&self, transcript: &str) -> Result<(), SinkError>;
}

/// Writes the transcript to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

#[async_trait]
impl Sink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn deliver(&self, transcript: &str) -> Result<(), SinkError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", transcript)?;
        stdout.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// What the webhook answered, logged after delivery
#[derive(Debug, Serialize)]
struct WebhookReceipt {
    status: u16,
    body: Value,
}

/// Posts the transcript to an incoming-message webhook
pub struct WebhookSink {
    client: Client,
    endpoint: Url,
}

impl WebhookSink {
    /// Create a sink posting to `endpoint` with a request timeout
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, SinkError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Sink for WebhookSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, transcript: &str) -> Result<(), SinkError> {
        debug!(endpoint = %self.endpoint, bytes = transcript.len(), "WebhookSink::deliver");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&WebhookPayload { text: transcript })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SinkError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        // Not every hook answers with JSON; keep plain bodies as strings
        let body = serde_json::from_str(&body).unwrap_or(Value::String(body));
        let receipt = WebhookReceipt {
            status: status.as_u16(),
            body,
        };
        info!("Webhook response:\n{}", serde_json::to_string_pretty(&receipt)?);
        Ok(())
    }
}

/// Ordered set of sinks a transcript is delivered to
#[derive(Default)]
pub struct Dispatcher {
    sinks: Vec<Box<dyn Sink>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sink; delivery follows insertion order
    pub fn with_sink(mut self, sink: Box<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn push(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    /// Names of the configured sinks, in delivery order
    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Deliver to every sink in order, stopping at the first failure
    pub async fn dispatch(&self, transcript: &str) -> Result<(), SinkError> {
        for sink in &self.sinks {
            debug!(sink = sink.name(), "Dispatcher::dispatch");
            sink.deliver(transcript).await?;
        }
        Ok(())
    }
}
