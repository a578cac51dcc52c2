//! Chain query error types

use thiserror::Error;

/// Chain query error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ChainError {
    pub kind: ChainErrorKind,
    pub message: String,
}

impl ChainError {
    pub fn new(kind: ChainErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new(ChainErrorKind::NotConfigured, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ChainErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ChainErrorKind::Timeout, message)
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::new(ChainErrorKind::Status(code), message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ChainErrorKind::Malformed, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ChainErrorKind::NotFound, message)
    }
}

/// Error classification.
///
/// `NotFound` is the only kind that describes the queried account itself;
/// every other kind means the chain could not answer and the user should
/// retry later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainErrorKind {
    /// RPC endpoint or vault address missing
    NotConfigured,
    /// Connection refused, DNS, TLS, body read failures
    Network,
    /// Query exceeded its deadline
    Timeout,
    /// Non-success HTTP status
    Status(u16),
    /// Response parsed but did not have the expected shape
    Malformed,
    /// Account absent on-chain (HTTP 404 from the resources endpoint)
    NotFound,
}

impl ChainErrorKind {
    pub fn is_not_found(self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Status(_) => "status",
            Self::Malformed => "malformed",
            Self::NotFound => "not_found",
        }
    }
}
