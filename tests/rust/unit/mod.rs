//! Unit tests - Exercise single components through the public API
//!
//! No pass pipeline involved: naming and the provenance algebra on their own.

mod provenance_tests;
mod symbol_naming_tests;
