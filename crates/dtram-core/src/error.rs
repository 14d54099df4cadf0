//! Error types
//!
//! Inference itself never rejects a model: shapes it cannot use are skipped.
//! Errors come from building a malformed model and from a propagation loop
//! that fails to settle.

use thiserror::Error;

/// Errors raised while assembling an [`ArchitectureModel`](crate::model::ArchitectureModel).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown symbol `{0}`")]
    UnknownSymbol(String),

    #[error("symbol `{0}` is already declared")]
    DuplicateSymbol(String),

    #[error("symbol `{symbol}` expects {expected} argument(s), found {found}")]
    ArityMismatch {
        symbol: String,
        expected: usize,
        found: usize,
    },

    #[error("signature of `{symbol}` lists {found} argument type(s) for arity {expected}")]
    SignatureArity {
        symbol: String,
        expected: usize,
        found: usize,
    },

    #[error("unknown resource #{0}")]
    UnknownResource(usize),

    #[error("unknown expression #{0}")]
    UnknownExpression(usize),

    #[error("I/O channel `{channel}` cannot have an input member")]
    InputOnIoChannel { channel: String },
}

/// Errors raised by the propagation engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("propagation did not reach a fixpoint within {limit} steps")]
    StepLimitExceeded { limit: usize },
}

pub type Result<T, E = ModelError> = std::result::Result<T, E>;
