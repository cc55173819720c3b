//! Error types for the uniform-graph planner.
//!
//! [`PlannerError::Internal`] covers every invariant violation: a vertex
//! without provenance, a dangling child reference, a fresh symbol that
//! collides with an existing vertex. Such errors point at a bug in an earlier
//! phase (or in the pass itself) and are never retried.
//!
//! ```ignore
//! // Stage tagging while propagating:
//! reify(graph).map_err(|e| e.with_stage(Pass::ReifyProvenance))?;
//! // => "[reify-provenance] Missing provenance for vertex `a`"
//! ```

use std::fmt::Display;

use thiserror::Error;

use crate::query_planner::provenance::errors::ProvenanceError;

pub type PlannerResult<T> = Result<T, PlannerError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Pass {
    ReifyProvenance,
    VerifyReified,
}

impl Display for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pass::ReifyProvenance => write!(f, "reify-provenance"),
            Pass::VerifyReified => write!(f, "verify-reified"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlannerError {
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        cause: Option<Box<PlannerError>>,
    },

    #[error("Provenance: {pass}: {source}")]
    Provenance {
        pass: Pass,
        #[source]
        source: ProvenanceError,
    },
}

impl PlannerError {
    pub fn internal(message: impl Into<String>) -> Self {
        PlannerError::Internal {
            message: message.into(),
            cause: None,
        }
    }

    pub fn internal_with_cause(message: impl Into<String>, cause: PlannerError) -> Self {
        PlannerError::Internal {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn missing_provenance(symbol: impl Display) -> Self {
        Self::internal(format!("Missing provenance for vertex `{}`", symbol))
    }

    /// Prefix an internal error's message with `[pass]`. Other kinds pass
    /// through untouched, and the cause chain is kept as is.
    pub fn with_stage(self, pass: Pass) -> Self {
        match self {
            PlannerError::Internal { message, cause } => PlannerError::Internal {
                message: format!("[{}] {}", pass, message),
                cause,
            },
            other => other,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, PlannerError::Internal { .. })
    }
}
