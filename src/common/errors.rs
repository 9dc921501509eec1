//! Error types for the engine

use thiserror::Error;

/// Result type alias using our EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Pool state handed over by a collaborator is malformed
    #[error("Invalid pool state: {0}")]
    InvalidPoolState(String),

    /// Unsettled collateral lookup failed
    #[error("Unsettled collateral query failed: {0}")]
    CollateralQueryFailed(String),

    /// Transaction submission or confirmation failure
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Account fetch or other RPC-level failure
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Pool subscription could not be established
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Failure reported by a transaction executor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The ledger rejected the transaction
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The transaction could not be built, signed or sent
    #[error("transaction submission failed: {0}")]
    Submission(String),

    /// No confirmation arrived in time; treated as a failed transaction
    #[error("confirmation timed out after {seconds}s")]
    ConfirmationTimeout { seconds: u64 },
}

impl EngineError {
    /// Returns true if this error came out of the transaction executor
    pub fn is_execution(&self) -> bool {
        matches!(self, EngineError::Execution(_))
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Configuration(err.to_string())
    }
}
