/*!
 * Tracing
 * Structured logging for the dispatcher using the tracing crate
 *
 * Logs go to stderr; stdout carries responses only.
 */

use crate::core::limits::{ENV_TRACE_JSON, SLOW_REQUEST_THRESHOLD};
use crate::server::protocol::Command;
use std::time::Instant;
use tracing::{debug, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - FEED_TRACE_JSON: Enable JSON output (default: false)
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        let _ = registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init();
    } else {
        let _ = registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_names(true)
                    .compact(),
            )
            .try_init();
    }
}

/// Span covering the application of one request to the feed
pub struct RequestSpan {
    span: tracing::Span,
    start: Instant,
    command: Command,
    id: i64,
}

impl RequestSpan {
    pub fn new(command: Command, id: i64) -> Self {
        let span = span!(
            Level::DEBUG,
            "request",
            command = ?command,
            id = id,
            success = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            command,
            id,
        }
    }

    pub fn record_success(&self, success: bool) {
        self.span.record("success", success);
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for RequestSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();

        if duration > SLOW_REQUEST_THRESHOLD {
            warn!(
                command = ?self.command,
                id = self.id,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow request"
            );
        } else {
            debug!(
                command = ?self.command,
                id = self.id,
                duration_us = duration.as_micros() as u64,
                "request applied"
            );
        }
    }
}

/// Helper to create a request span
#[inline]
pub fn span_request(command: Command, id: i64) -> RequestSpan {
    RequestSpan::new(command, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::subscriber::with_default;

    fn test_subscriber() -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(Level::DEBUG)
            .finish()
    }

    #[test]
    fn test_request_span() {
        with_default(test_subscriber(), || {
            let span = span_request(Command::Add, 1);
            let _guard = span.enter();
            span.record_success(true);
        });
    }

    #[test]
    fn test_slow_request_span() {
        with_default(test_subscriber(), || {
            let span = span_request(Command::Feed, 2);
            std::thread::sleep(SLOW_REQUEST_THRESHOLD + std::time::Duration::from_millis(1));
            span.record_success(false);
        });
    }
}
