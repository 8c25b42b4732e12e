//! Error types for the exporter.

use thiserror::Error;

/// Failure of a single upstream API call.
///
/// The three variants map to the three ways a third-party API disappoints:
/// it does not answer, it answers garbage, or it answers a well-formed
/// refusal.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request never produced a usable HTTP response, or the response
    /// carried a non-2xx status. The body is not interpreted.
    #[error("transport error for {url}: {reason}")]
    Transport { url: String, reason: String },

    /// A 2xx response whose body does not match the shape this source is
    /// known to return, including numeric strings that fail to parse.
    #[error("malformed response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// A well-formed response reporting an application-level failure, with
    /// the upstream message carried verbatim.
    #[error("upstream error from {url}: {message}")]
    Upstream { url: String, message: String },
}

impl SourceError {
    pub(crate) fn transport(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::Transport {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn decode(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn upstream(url: &str, message: impl Into<String>) -> Self {
        Self::Upstream {
            url: url.to_string(),
            message: message.into(),
        }
    }
}

/// Failures that terminate the exporter.
#[derive(Debug, Error)]
pub enum ExporterErrorKind {
    /// The configuration would make the exporter start in a broken state.
    #[error("invalid configuration: {0}")]
    BadConfig(String),

    /// Startup work before the main loop failed.
    #[error("startup failed: {0}")]
    Startup(String),

    /// The first gather cycle failed. Later cycles degrade gracefully, but
    /// a broken first cycle means a misconfigured deployment and the
    /// exporter refuses to serve zeros.
    #[error("initial gather cycle failed: {0}")]
    InitialGather(#[from] SourceError),

    /// The metrics HTTP server failed to start or crashed.
    #[error("metrics server error: {0}")]
    Monitoring(String),
}
