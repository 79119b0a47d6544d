use alloy_primitives::Address;
use thiserror::Error;

/// Why a stream-completion event produced no path record.
///
/// The first three variants are expected outcomes for malformed or unrelated
/// events: the caller logs them and moves on to the next event.
/// `InvariantViolation` means the engine itself misbehaved; the event is
/// dropped rather than emitting a wrong record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconstructionError {
    #[error("no transfers to reconstruct stream from {sender} to {recipient}")]
    EmptyTransferSet { sender: Address, recipient: Address },

    #[error("no route with available flow from {sender} to {recipient}")]
    NoPathFound { sender: Address, recipient: Address },

    #[error("extraction cap of {cap} paths reached with flow still unassigned")]
    CapacityExceeded { cap: usize },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl ReconstructionError {
    /// Recoverable errors skip the event with a warning; the rest are defects.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ReconstructionError::InvariantViolation(_))
    }
}

/// Errors arising from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("max_paths must be at least 1, got {0}")]
    InvalidMaxPaths(usize),
}
