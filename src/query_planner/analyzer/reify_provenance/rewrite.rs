//! Per-vertex rewrite rules of [`super::ReifyProvenance`].

use crate::query_planner::{
    errors::{Pass, PlannerError, PlannerResult},
    map_func::{Hole, JoinFunc, JoinSide, MapFunc, ReduceIndex, TernarySide},
    plan_ctx::PlanCtx,
    provenance::{errors::ProvenanceError, identity_rewrite, QDims, QProv},
    qsu::{
        AuthenticatedGraph, AutoJoin2, AutoJoin3, JoinType, LpReduce, QsReduce, QsuNode, ThetaJoin,
    },
    symbol::Symbol,
    transformed::Transformed,
};

/// A vertex minted while rewriting another one, merged after the traversal.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct NewVertex {
    pub name: Symbol,
    pub node: QsuNode,
    pub dims: QDims,
}

pub(super) fn reify_vertex(
    symbol: &Symbol,
    node: &QsuNode,
    input: &AuthenticatedGraph,
    qprov: &QProv,
    plan_ctx: &mut PlanCtx,
    emitted: &mut Vec<NewVertex>,
) -> PlannerResult<Transformed<QsuNode>> {
    let rewritten = match node {
        QsuNode::AutoJoin2(aj) => reify_autojoin2(aj, input, qprov)?,
        QsuNode::AutoJoin3(aj) => {
            let (node, new_vertex) = reify_autojoin3(aj, input, qprov, plan_ctx)?;
            emitted.push(new_vertex);
            node
        }
        QsuNode::LpReduce(reduce) => reify_reduce(symbol, reduce),
        QsuNode::Read(_)
        | QsuNode::Unreferenced
        | QsuNode::Map(_)
        | QsuNode::QsFilter(_)
        | QsuNode::LeftShift(_)
        | QsuNode::Union(_)
        | QsuNode::Subset(_)
        | QsuNode::Sort(_)
        | QsuNode::Distinct(_)
        | QsuNode::ThetaJoin(_)
        | QsuNode::QsReduce(_) => return Ok(Transformed::No(node.clone())),
    };

    log::debug!(
        "ReifyProvenance: `{}` {} -> {}",
        symbol,
        node.variant_name(),
        rewritten.variant_name()
    );
    Ok(Transformed::Yes(rewritten))
}

fn provenance_error(source: ProvenanceError) -> PlannerError {
    PlannerError::Provenance {
        pass: Pass::ReifyProvenance,
        source,
    }
}

fn reify_autojoin2(
    aj: &AutoJoin2,
    input: &AuthenticatedGraph,
    qprov: &QProv,
) -> PlannerResult<QsuNode> {
    let left_dims = input.dims_of(&aj.left)?;
    let right_dims = input.dims_of(&aj.right)?;

    let condition = qprov
        .autojoin_condition(left_dims, right_dims, identity_rewrite)
        .map_err(provenance_error)?;
    let combiner: JoinFunc = aj
        .combiner
        .clone()
        .map_holes(&mut |side| JoinSide::from(side));

    Ok(QsuNode::ThetaJoin(ThetaJoin {
        left: aj.left.clone(),
        right: aj.right.clone(),
        condition,
        join_type: JoinType::Inner,
        combiner,
    }))
}

/// `AutoJoin3(l, c, r)` becomes `ThetaJoin(ThetaJoin(l, c), r)`.
///
/// The inner join keeps each input under its own tag so the outer condition
/// and combiner can still tell left rows from center rows.
fn reify_autojoin3(
    aj: &AutoJoin3,
    input: &AuthenticatedGraph,
    qprov: &QProv,
    plan_ctx: &mut PlanCtx,
) -> PlannerResult<(QsuNode, NewVertex)> {
    let left_dims = input.dims_of(&aj.left)?;
    let center_dims = input.dims_of(&aj.center)?;
    let right_dims = input.dims_of(&aj.right)?;

    let config = plan_ctx.config().clone();
    let join_name = plan_ctx.fresh_symbol(&config.join_prefix)?;
    let l_name = plan_ctx.fresh_symbol(&config.left_tag_prefix)?;
    let c_name = plan_ctx.fresh_symbol(&config.center_tag_prefix)?;

    let inner_condition = qprov
        .autojoin_condition(left_dims, center_dims, identity_rewrite)
        .map_err(provenance_error)?;
    let inner_combiner = MapFunc::concat_maps(
        MapFunc::make_map(l_name.as_str(), MapFunc::hole(JoinSide::LeftSide)),
        MapFunc::make_map(c_name.as_str(), MapFunc::hole(JoinSide::RightSide)),
    );
    let inner_dims = qprov.join(left_dims, center_dims);

    let combiner = aj.combiner.clone().bind_holes(&mut |side| match side {
        TernarySide::Left => MapFunc::hole(JoinSide::LeftSide).project_key(l_name.as_str()),
        TernarySide::Center => MapFunc::hole(JoinSide::LeftSide).project_key(c_name.as_str()),
        TernarySide::Right => MapFunc::hole(JoinSide::RightSide),
    });

    // Accesses rooted at l or c now live one key deeper in the inner join's rows.
    let redirect = |sym: &Symbol| {
        if sym == &aj.left {
            MapFunc::hole(Hole).project_key(l_name.as_str())
        } else if sym == &aj.center {
            MapFunc::hole(Hole).project_key(c_name.as_str())
        } else {
            MapFunc::hole(Hole)
        }
    };
    let condition = qprov
        .autojoin_condition(&inner_dims, right_dims, redirect)
        .map_err(provenance_error)?;

    let outer = QsuNode::ThetaJoin(ThetaJoin {
        left: join_name.clone(),
        right: aj.right.clone(),
        condition,
        join_type: JoinType::Inner,
        combiner,
    });
    let inner = NewVertex {
        name: join_name,
        node: QsuNode::ThetaJoin(ThetaJoin {
            left: aj.left.clone(),
            right: aj.center.clone(),
            condition: inner_condition,
            join_type: JoinType::Inner,
            combiner: inner_combiner,
        }),
        dims: inner_dims,
    };
    Ok((outer, inner))
}

fn reify_reduce(symbol: &Symbol, reduce: &LpReduce) -> QsuNode {
    // TODO: derive grouping buckets from source provenance
    log::warn!(
        "ReifyProvenance: `{}` reduces `{}` with no grouping buckets",
        symbol,
        reduce.source
    );
    QsuNode::QsReduce(QsReduce {
        source: reduce.source.clone(),
        buckets: vec![],
        reducers: vec![reduce.reduce.clone().map(|_| MapFunc::hole(Hole))],
        repair: MapFunc::hole(ReduceIndex::Reducer(0)),
    })
}
