//! Pluggable sink for request lifecycle events.

use std::time::Duration;

use super::{ApiError, ApiRequest, ErrorClass};

/// Receives structured events from [`AbstractClient`](super::AbstractClient).
///
/// All methods default to no-ops. Requests never carry the API key.
pub trait Diagnostics: Send + Sync + std::fmt::Debug {
    /// A request is about to be sent
    fn request_started(&self, _request: &ApiRequest) {}

    /// The upstream answered with a 2xx status
    fn request_succeeded(&self, _request: &ApiRequest, _status: u16, _elapsed: Duration) {}

    /// The call failed, before or after reaching the network
    fn request_failed(&self, _request: &ApiRequest, _error: &ApiError, _elapsed: Duration) {}
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn request_started(&self, request: &ApiRequest) {
        tracing::debug!(
            service = %request.service,
            operation = request.operation,
            path = request.path,
            "Calling Abstract API"
        );
    }

    fn request_succeeded(&self, request: &ApiRequest, status: u16, elapsed: Duration) {
        tracing::debug!(
            service = %request.service,
            operation = request.operation,
            status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Abstract API call succeeded"
        );
    }

    fn request_failed(&self, request: &ApiRequest, error: &ApiError, elapsed: Duration) {
        match error.class() {
            ErrorClass::Transport => {
                let cause = std::error::Error::source(error)
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                tracing::warn!(
                    service = %request.service,
                    operation = request.operation,
                    elapsed_ms = elapsed.as_millis() as u64,
                    cause = %cause,
                    "{}",
                    error
                );
            }
            ErrorClass::Configuration | ErrorClass::InvalidRequest => {
                tracing::warn!(
                    service = %request.service,
                    operation = request.operation,
                    "{}",
                    error
                );
            }
            ErrorClass::Upstream | ErrorClass::Decode => {
                tracing::warn!(
                    service = %request.service,
                    operation = request.operation,
                    status = error.status(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "{}",
                    error
                );
            }
        }
    }
}
