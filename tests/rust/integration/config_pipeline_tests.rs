// Integration test: configuration sources driving the reification pipeline
use std::{collections::BTreeMap, env, io::Write};

use anyhow::Result;
use qsu_planner::{
    config::{ConfigError, PlannerConfig},
    query_planner::{
        map_func::{MapFunc, TernarySide},
        provenance::{Access, DisjointProvenancePolicy, IdType, QDims},
        qsu::{AuthenticatedGraph, AutoJoin3, QsuNode, QueryGraph, Read},
        reify_graph_with_config,
        symbol::Symbol,
    },
};
use serial_test::serial;

fn ternary_graph() -> AuthenticatedGraph {
    let mut graph = QueryGraph::single(
        Symbol::new("root"),
        QsuNode::AutoJoin3(AutoJoin3 {
            left: Symbol::new("l"),
            center: Symbol::new("c"),
            right: Symbol::new("r"),
            combiner: MapFunc::hole(TernarySide::Center),
        }),
    );
    let mut dims = BTreeMap::from([(Symbol::new("root"), QDims::empty())]);
    for name in ["l", "c", "r"] {
        graph = graph.with_vertex(
            name,
            QsuNode::Read(Read {
                path: format!("/t/{}", name),
            }),
        );
        dims.insert(
            Symbol::new(name),
            QDims::value(Access::field(name, "id"), IdType::Dataset),
        );
    }
    AuthenticatedGraph::new(graph, dims)
}

#[test]
fn test_yaml_prefixes_name_new_vertices() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "join_prefix: inner\nleft_tag_prefix: lhs\ncenter_tag_prefix: mid")?;
    let config = PlannerConfig::from_yaml_file(file.path())?;

    let output = reify_graph_with_config(&ternary_graph(), config)?;
    assert!(output.graph.contains(&Symbol::new("inner_0")));

    let root = output.graph.vertex(&Symbol::new("root"));
    let Some(QsuNode::ThetaJoin(root)) = root else {
        panic!("root should be a ThetaJoin, got {:?}", root);
    };
    assert_eq!(root.combiner.to_string(), "LeftSide[\"mid_2\"]");
    Ok(())
}

#[test]
fn test_invalid_yaml_prefix_rejected() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "join_prefix: \"auto join\"")?;
    let result = PlannerConfig::from_yaml_file(file.path());
    assert!(matches!(result, Err(ConfigError::Validation(_))));
    Ok(())
}

#[test]
#[serial]
fn test_env_policy_reaches_the_pass() -> Result<()> {
    let mut input = ternary_graph();
    input.dims.insert(
        Symbol::new("c"),
        QDims::empty().inflate(Access::value("c"), IdType::Expr),
    );

    unsafe { env::set_var("QSU_DISJOINT_PROVENANCE", "cross_join") };
    let config = PlannerConfig::from_env();
    unsafe { env::remove_var("QSU_DISJOINT_PROVENANCE") };
    let config = config?;
    assert_eq!(
        config.disjoint_provenance,
        DisjointProvenancePolicy::CrossJoin
    );

    let output = reify_graph_with_config(&input, config)?;
    assert!(output.graph.contains(&Symbol::new("autojoin_0")));

    assert!(reify_graph_with_config(&input, PlannerConfig::default()).is_err());
    Ok(())
}
