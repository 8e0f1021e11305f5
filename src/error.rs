use thiserror::Error;

/// Failures surfaced by `TaskStore`
///
/// Unknown ids are not errors; they come back as `Outcome::NotFound`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("failed to persist '{key}': {report:#}")]
    Persistence { key: String, report: eyre::Report },

    #[error("stored data under '{key}' is corrupt: {report:#}")]
    Corrupt { key: String, report: eyre::Report },

    #[error("failed to read '{key}' from storage: {report:#}")]
    Unavailable { key: String, report: eyre::Report },
}

impl StoreError {
    pub fn validation<M: Into<String>>(message: M) -> Self {
        Self::Validation(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Persistence { .. } => "persistence",
            Self::Corrupt { .. } => "corrupt_state",
            Self::Unavailable { .. } => "storage_unavailable",
        }
    }

    /// True for errors after which in-memory state is still authoritative
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Persistence { .. })
    }
}
