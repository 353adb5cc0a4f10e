use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogIntelligenceError>;

/// Error taxonomy for the AI pipeline.
///
/// `Config`, `Validation` and `Store` propagate to the caller as hard failures.
/// `Transport` is caught at the service boundary and converted into a uniform
/// `ActionOutcome::Failed`. Parse degradation never appears here at all; it is
/// absorbed into `ActionOutcome::Degraded`.
#[derive(Debug, Error)]
pub enum CatalogIntelligenceError {
    /// No usable provider key, or other configuration the operator must fix.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown action or a context field the action cannot run without.
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP or network failure talking to the LLM provider. Carries the
    /// upstream status code when one was received.
    #[error("LLM transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// Catalog store query failed. Never masked as an empty result set.
    #[error("Catalog store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogIntelligenceError {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = match status {
            Some(code) => format!("HTTP {code}: {message}"),
            None => message,
        };
        Self::Transport { status, message }
    }
}
