//! # Graph Analyzer
//!
//! Passes over the uniform operator graph that run between lowering and
//! physical planning.
//!
//! ## Pass Pipeline Overview
//!
//! ```text
//! 1. ReifyProvenance  - AutoJoin2/AutoJoin3/LPReduce -> ThetaJoin/QSReduce
//! 2. VerifyReified    - no implicit operators left, graph invariants hold
//!                       (only when `verify_output` is set)
//! ```
//!
//! Internal errors leaving a step are tagged with the step name, e.g.
//! "[reify-provenance] Missing provenance for vertex `a`".

use crate::query_planner::{
    errors::{Pass, PlannerError, PlannerResult},
    plan_ctx::PlanCtx,
    qsu::AuthenticatedGraph,
};

pub mod analyzer_pass;
pub mod reify_provenance;

pub use analyzer_pass::GraphPass;
pub use reify_provenance::ReifyProvenance;

pub fn reify_analyzing(
    graph: &AuthenticatedGraph,
    plan_ctx: &mut PlanCtx,
) -> PlannerResult<AuthenticatedGraph> {
    log::info!(
        "ANALYZER: Running ReifyProvenance over {} vertices (root `{}`)",
        graph.graph.len(),
        graph.root()
    );

    let reified = ReifyProvenance::new()
        .apply(graph, plan_ctx)
        .map_err(|e| e.with_stage(Pass::ReifyProvenance))?;
    if !reified.is_yes() {
        log::debug!("ANALYZER: ReifyProvenance left the graph unchanged");
    }
    let reified = reified.into_inner();

    if log::log_enabled!(log::Level::Trace) {
        log::trace!("ANALYZER: graph after ReifyProvenance:\n{}", reified.graph);
    }

    if plan_ctx.config().verify_output {
        log::info!("ANALYZER: Running VerifyReified");
        verify_reified(&reified).map_err(|e| e.with_stage(Pass::VerifyReified))?;
    }

    Ok(reified)
}

/// Check what physical planning relies on: no implicit operator is left, the
/// root exists, nothing dangles and every vertex has provenance.
pub fn verify_reified(graph: &AuthenticatedGraph) -> PlannerResult<()> {
    if let Some((symbol, node)) = graph
        .graph
        .vertices
        .iter()
        .find(|(_, node)| node.needs_reification())
    {
        return Err(PlannerError::internal(format!(
            "Vertex `{}` is still {} after reification",
            symbol,
            node.variant_name()
        )));
    }

    graph
        .validate()
        .map_err(|e| PlannerError::internal_with_cause("Reified graph is malformed", e))
}
