use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::query_planner::provenance::DisjointProvenancePolicy;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Planner configuration with validation
#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Prefix of the symbol introduced for the inner join of a ternary auto-join
    #[validate(
        length(max = 64, message = "Join prefix must be at most 64 characters"),
        custom(function = "validate_symbol_prefix")
    )]
    pub join_prefix: String,

    /// Map key under which the inner join keeps its left row
    #[validate(
        length(max = 64, message = "Left tag prefix must be at most 64 characters"),
        custom(function = "validate_symbol_prefix")
    )]
    pub left_tag_prefix: String,

    /// Map key under which the inner join keeps its center row
    #[validate(
        length(max = 64, message = "Center tag prefix must be at most 64 characters"),
        custom(function = "validate_symbol_prefix")
    )]
    pub center_tag_prefix: String,

    /// What to do when two joined inputs share no identity
    pub disjoint_provenance: DisjointProvenancePolicy,

    /// Check the rewritten graph before handing it on
    pub verify_output: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            join_prefix: "autojoin".to_string(),
            left_tag_prefix: "leftAccess".to_string(),
            center_tag_prefix: "centerAccess".to_string(),
            disjoint_provenance: DisjointProvenancePolicy::Reject,
            verify_output: true,
        }
    }
}

impl PlannerConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            join_prefix: env::var("QSU_JOIN_PREFIX").unwrap_or_else(|_| "autojoin".to_string()),
            left_tag_prefix: env::var("QSU_LEFT_TAG_PREFIX")
                .unwrap_or_else(|_| "leftAccess".to_string()),
            center_tag_prefix: env::var("QSU_CENTER_TAG_PREFIX")
                .unwrap_or_else(|_| "centerAccess".to_string()),
            disjoint_provenance: parse_env_var("QSU_DISJOINT_PROVENANCE", "reject")?,
            verify_output: parse_env_var("QSU_VERIFY_OUTPUT", "true")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }
}

/// Symbol prefixes end up inside generated names and map keys.
fn validate_symbol_prefix(prefix: &str) -> Result<(), ValidationError> {
    if prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        let mut err = ValidationError::new("symbol_prefix");
        err.message = Some("Prefix may only contain ASCII letters, digits and '_'".into());
        Err(err)
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
