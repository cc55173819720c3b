//! Error types for provenance operations.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProvenanceError {
    #[error(
        "No common identity between provenances ({left_alternatives} vs {right_alternatives} alternatives). Refusing to synthesize an all-rows join condition."
    )]
    NoCommonIdentity {
        left_alternatives: usize,
        right_alternatives: usize,
    },

    #[error("Unknown disjoint provenance policy `{0}` (expected `reject` or `cross_join`)")]
    UnknownPolicy(String),
}
