//! qsu-planner - provenance-guided reification of the uniform operator graph
//!
//! This crate provides the stage of a federated query compiler that sits
//! between lowering and physical planning:
//! - A symbol-indexed operator graph (QSU) with per-vertex provenance
//! - A provenance algebra that derives join conditions
//! - The reification pass turning auto-joins and untyped reduces into
//!   explicit theta-joins and typed reduces

pub mod utils;

pub mod config;
pub mod query_planner;
