use crate::query_planner::{
    errors::PlannerResult, plan_ctx::PlanCtx, qsu::AuthenticatedGraph, transformed::Transformed,
};

/// A whole-graph rewrite. Implementations never mutate their input: a changed
/// graph is returned as [`Transformed::Yes`], an untouched one as
/// [`Transformed::No`].
pub trait GraphPass {
    fn apply(
        &self,
        graph: &AuthenticatedGraph,
        _plan_ctx: &mut PlanCtx,
    ) -> PlannerResult<Transformed<AuthenticatedGraph>> {
        Ok(Transformed::No(graph.clone()))
    }
}
