//! Provenance-guided join reification.
//!
//! Rewrites every `AutoJoin2`, `AutoJoin3` and `LPReduce` vertex into its
//! explicit form (`ThetaJoin`, a pair of nested `ThetaJoin`s, `QSReduce`).
//! Join conditions come from the provenance of the joined vertices.
//!
//! ```text
//! Root := AutoJoin3(L, C, R, f)
//!
//!   ==>
//!
//! Root       := ThetaJoin(autojoin_0, R, cond2, Inner, f[L -> left.leftAccess_1,
//!                                                      C -> left.centerAccess_2,
//!                                                      R -> right])
//! autojoin_0 := ThetaJoin(L, C, cond1, Inner,
//!                         {leftAccess_1: left} ++ {centerAccess_2: right})
//! ```
//!
//! Vertices are visited in symbol order. New vertices are collected while
//! visiting and merged only once every vertex has been rewritten, so a failure
//! never leaves a partially rewritten graph behind.

use std::collections::BTreeMap;

use crate::query_planner::{
    analyzer::analyzer_pass::GraphPass,
    errors::{PlannerError, PlannerResult},
    plan_ctx::PlanCtx,
    provenance::QDims,
    qsu::{AuthenticatedGraph, QsuNode, QueryGraph},
    symbol::Symbol,
    transformed::Transformed,
};

mod rewrite;

use rewrite::{reify_vertex, NewVertex};

#[derive(Debug, Default)]
pub struct ReifyProvenance;

impl GraphPass for ReifyProvenance {
    fn apply(
        &self,
        input: &AuthenticatedGraph,
        plan_ctx: &mut PlanCtx,
    ) -> PlannerResult<Transformed<AuthenticatedGraph>> {
        let qprov = plan_ctx.qprov();
        let mut emitted: Vec<NewVertex> = vec![];
        let mut vertices = BTreeMap::new();
        let mut changed = false;

        for (symbol, node) in &input.graph.vertices {
            let rewritten = reify_vertex(symbol, node, input, &qprov, plan_ctx, &mut emitted)?;
            changed |= rewritten.is_yes();
            vertices.insert(symbol.clone(), rewritten.into_inner());
        }

        if !changed {
            return Ok(Transformed::No(input.clone()));
        }

        let mut dims = input.dims.clone();
        Self::merge_new_vertices(&mut vertices, &mut dims, emitted)?;

        Ok(Transformed::Yes(AuthenticatedGraph::new(
            QueryGraph::new(input.graph.root.clone(), vertices),
            dims,
        )))
    }
}

impl ReifyProvenance {
    pub fn new() -> Self {
        ReifyProvenance
    }

    fn merge_new_vertices(
        vertices: &mut BTreeMap<Symbol, QsuNode>,
        dims: &mut BTreeMap<Symbol, QDims>,
        emitted: Vec<NewVertex>,
    ) -> PlannerResult<()> {
        for NewVertex { name, node, dims: new_dims } in emitted {
            if vertices.contains_key(&name) || dims.contains_key(&name) {
                return Err(PlannerError::internal(format!(
                    "Fresh symbol `{}` collides with an existing vertex",
                    name
                )));
            }
            log::debug!("ReifyProvenance: adding vertex `{}` := {}", name, node);
            vertices.insert(name.clone(), node);
            dims.insert(name, new_dims);
        }
        Ok(())
    }
}
