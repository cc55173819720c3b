//! Integration tests - Whole reification pipeline
//!
//! These tests build authenticated graphs the way lowering hands them over and
//! run them through `reify_graph`, including verification and configuration.

mod config_pipeline_tests;
mod reify_pipeline_tests;
