use crate::config::PlannerConfig;

use errors::PlannerResult;
use plan_ctx::PlanCtx;
use qsu::AuthenticatedGraph;

pub mod analyzer;
pub mod errors;
pub mod map_func;
pub mod plan_ctx;
pub mod provenance;
pub mod qsu;
pub mod symbol;
pub mod transformed;

/// Replace every implicit join and reduce of `graph` with its explicit form.
///
/// The input is never modified. On failure no graph is returned; internal
/// errors carry the stage that raised them (`[reify-provenance] ...`).
pub fn reify_graph(
    graph: &AuthenticatedGraph,
    plan_ctx: &mut PlanCtx,
) -> PlannerResult<AuthenticatedGraph> {
    analyzer::reify_analyzing(graph, plan_ctx)
}

/// [`reify_graph`] in a fresh session whose symbols continue after the ones
/// already present in `graph` (vertices and provenance keys).
pub fn reify_graph_with_config(
    graph: &AuthenticatedGraph,
    config: PlannerConfig,
) -> PlannerResult<AuthenticatedGraph> {
    let mut plan_ctx = PlanCtx::for_graph(config, graph);
    reify_graph(graph, &mut plan_ctx)
}
