// Integration test for the reification pipeline (pass + verification)
use std::collections::BTreeMap;

use anyhow::Result;
use qsu_planner::{
    config::PlannerConfig,
    query_planner::{
        errors::{Pass, PlannerError},
        map_func::{BinarySide, Hole, MapFunc, ReduceFunc, TernarySide},
        plan_ctx::PlanCtx,
        provenance::{Access, IdType, QDims},
        qsu::{
            AuthenticatedGraph, AutoJoin2, AutoJoin3, LpReduce, Map, QsFilter, QsuNode,
            QueryGraph, Read,
        },
        reify_graph, reify_graph_with_config,
        symbol::Symbol,
    },
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn sym(name: &str) -> Symbol {
    Symbol::new(name)
}

fn rows_of(source: &str) -> QDims {
    QDims::value(Access::field(source, "_id"), IdType::Dataset)
}

/// `orders ⋈ customers ⋈ products`, filtered, then summed:
///
/// ```text
/// root    := LPReduce(matched, sum)
/// matched := QSFilter(joined, ...)
/// joined  := AutoJoin3(orders, customers, products)
/// ```
///
/// plus a detached branch `totals := Map(pairs)` over
/// `pairs := AutoJoin2(orders, customers)`. Vertex provenance is what lowering
/// would have produced.
fn orders_graph() -> AuthenticatedGraph {
    let combiner = MapFunc::concat_maps(
        MapFunc::concat_maps(
            MapFunc::make_map("order", MapFunc::hole(TernarySide::Left)),
            MapFunc::make_map("customer", MapFunc::hole(TernarySide::Center)),
        ),
        MapFunc::make_map("product", MapFunc::hole(TernarySide::Right)),
    );

    let graph = QueryGraph::single(
        sym("root"),
        QsuNode::LpReduce(LpReduce {
            source: sym("matched"),
            reduce: ReduceFunc::Sum(()),
        }),
    )
    .with_vertex(
        "matched",
        QsuNode::QsFilter(QsFilter {
            source: sym("joined"),
            predicate: MapFunc::hole(Hole).project_key("product").project_key("active"),
        }),
    )
    .with_vertex(
        "joined",
        QsuNode::AutoJoin3(AutoJoin3 {
            left: sym("orders"),
            center: sym("customers"),
            right: sym("products"),
            combiner,
        }),
    )
    .with_vertex(
        "pairs",
        QsuNode::AutoJoin2(AutoJoin2 {
            left: sym("orders"),
            right: sym("customers"),
            combiner: MapFunc::hole(BinarySide::Left),
        }),
    )
    .with_vertex(
        "totals",
        QsuNode::Map(Map {
            source: sym("pairs"),
            func: MapFunc::hole(Hole).project_key("total"),
        }),
    )
    .with_vertex("orders", QsuNode::Read(Read { path: "/shop/orders".to_string() }))
    .with_vertex("customers", QsuNode::Read(Read { path: "/shop/customers".to_string() }))
    .with_vertex("products", QsuNode::Read(Read { path: "/shop/products".to_string() }));

    let joined = rows_of("orders")
        .join(&rows_of("customers"))
        .join(&rows_of("products"));
    let dims = BTreeMap::from([
        (sym("orders"), rows_of("orders")),
        (sym("customers"), rows_of("customers")),
        (sym("products"), rows_of("products")),
        (sym("joined"), joined.clone()),
        (sym("matched"), joined),
        (sym("root"), QDims::empty()),
        (sym("pairs"), rows_of("orders").join(&rows_of("customers"))),
        (sym("totals"), rows_of("orders").join(&rows_of("customers"))),
    ]);
    AuthenticatedGraph::new(graph, dims)
}

#[test]
fn test_pipeline_reifies_every_implicit_operator() -> Result<()> {
    init_logging();
    let input = orders_graph();
    let output = reify_graph(&input, &mut PlanCtx::default())?;

    assert_eq!(output.root(), &sym("root"));
    assert!(output
        .graph
        .vertices
        .values()
        .all(|node| !node.needs_reification()));
    assert_eq!(output.graph.len(), input.graph.len() + 1);
    assert!(output.graph.contains(&sym("autojoin_0")));
    assert!(output.graph.dangling_references().is_empty());
    assert!(output.missing_provenance().is_empty());

    for untouched in ["matched", "totals", "orders", "customers", "products"] {
        assert_eq!(
            output.graph.vertex(&sym(untouched)),
            input.graph.vertex(&sym(untouched)),
            "{} should pass through",
            untouched
        );
    }
    Ok(())
}

#[test]
fn test_input_graph_is_left_untouched() -> Result<()> {
    let input = orders_graph();
    let snapshot = serde_json::to_value(&input)?;
    let _ = reify_graph(&input, &mut PlanCtx::default())?;
    assert_eq!(serde_json::to_value(&input)?, snapshot);
    Ok(())
}

#[test]
fn test_output_survives_json_snapshot() -> Result<()> {
    let output = reify_graph(&orders_graph(), &mut PlanCtx::default())?;
    let text = serde_json::to_string_pretty(&output)?;
    let back: AuthenticatedGraph = serde_json::from_str(&text)?;
    assert_eq!(back, output);
    Ok(())
}

#[test]
fn test_two_sessions_produce_equal_graphs() -> Result<()> {
    let first = reify_graph(&orders_graph(), &mut PlanCtx::default())?;
    let second = reify_graph(&orders_graph(), &mut PlanCtx::default())?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_second_run_is_a_no_op() -> Result<()> {
    let once = reify_graph_with_config(&orders_graph(), PlannerConfig::default())?;
    let twice = reify_graph_with_config(&once, PlannerConfig::default())?;
    assert_eq!(once, twice);
    Ok(())
}

#[test]
fn test_missing_provenance_is_tagged_with_stage() {
    init_logging();
    let mut input = orders_graph();
    input.dims.remove(&sym("customers"));

    let err = reify_graph(&input, &mut PlanCtx::default()).unwrap_err();
    assert!(err.is_internal());
    assert_eq!(
        err.to_string(),
        "[reify-provenance] Missing provenance for vertex `customers`"
    );
}

#[test]
fn test_verification_rejects_malformed_output() {
    let mut input = orders_graph();
    input.graph = input.graph.clone().with_vertex(
        "totals",
        QsuNode::Map(Map {
            source: sym("vanished"),
            func: MapFunc::hole(Hole),
        }),
    );

    let err = reify_graph(&input, &mut PlanCtx::default()).unwrap_err();
    assert!(err
        .to_string()
        .starts_with("[verify-reified] Reified graph is malformed"));
    match err {
        PlannerError::Internal { cause: Some(cause), .. } => {
            assert!(cause.to_string().contains("`vanished`"));
        }
        other => panic!("expected internal error with cause, got {:?}", other),
    }

    let config = PlannerConfig {
        verify_output: false,
        ..Default::default()
    };
    assert!(reify_graph(&input, &mut PlanCtx::new(config)).is_ok());
}

#[test]
fn test_disjoint_inputs_surface_provenance_error() {
    let mut input = orders_graph();
    input.dims.insert(
        sym("customers"),
        QDims::empty().inflate(Access::field("customers", "emails"), IdType::Expr),
    );

    let err = reify_graph(&input, &mut PlanCtx::default()).unwrap_err();
    assert!(matches!(
        err,
        PlannerError::Provenance {
            pass: Pass::ReifyProvenance,
            ..
        }
    ));
}

#[test]
fn test_exhausted_symbol_counter_is_reported_not_panicked() {
    let mut input = orders_graph();
    let last = sym(&format!("archive_{}", u64::MAX));
    input.graph = input.graph.clone().with_vertex(
        last.clone(),
        QsuNode::Read(Read { path: "/shop/archive".to_string() }),
    );
    input.dims.insert(last, QDims::empty());

    let err = reify_graph_with_config(&input, PlannerConfig::default()).unwrap_err();
    assert!(err.is_internal());
    assert!(err
        .to_string()
        .starts_with("[reify-provenance] Fresh symbol counter exhausted"));
}

#[test]
fn test_constant_side_joins_every_row() -> Result<()> {
    let mut input = orders_graph();
    input.dims.insert(sym("customers"), QDims::empty());

    let output = reify_graph(&input, &mut PlanCtx::default())?;
    assert!(output
        .graph
        .vertices
        .values()
        .all(|node| !node.needs_reification()));
    Ok(())
}
