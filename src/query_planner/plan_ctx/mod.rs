//! Planning context.
//!
//! [`PlanCtx`] is the state threaded through graph passes of one compilation
//! session:
//! - the fresh-symbol sequence (one per session, never reset)
//! - the planner configuration (prefixes, provenance policy)
//!
//! Passes receive it as `&mut PlanCtx`; it is the only mutable state they see.

use std::fmt;

use crate::{
    config::PlannerConfig,
    query_planner::{
        errors::{PlannerError, PlannerResult},
        provenance::QProv,
        qsu::AuthenticatedGraph,
        symbol::Symbol,
    },
    utils::symbol_naming::NameGenerator,
};

#[derive(Debug, Clone, Default)]
pub struct PlanCtx {
    name_gen: NameGenerator,
    config: PlannerConfig,
}

impl PlanCtx {
    pub fn new(config: PlannerConfig) -> Self {
        PlanCtx {
            name_gen: NameGenerator::new(),
            config,
        }
    }

    pub fn with_name_generator(config: PlannerConfig, name_gen: NameGenerator) -> Self {
        PlanCtx { name_gen, config }
    }

    /// Context for a graph that may already contain generated symbols, either
    /// as vertices or as provenance keys.
    pub fn for_graph(config: PlannerConfig, graph: &AuthenticatedGraph) -> Self {
        let name_gen =
            NameGenerator::resume_after(graph.graph.vertices.keys().chain(graph.dims.keys()));
        log::debug!(
            "PlanCtx: resuming symbol counter at {} for graph rooted at `{}`",
            name_gen.peek_counter(),
            graph.root()
        );
        PlanCtx { name_gen, config }
    }

    pub fn fresh_symbol(&mut self, prefix: &str) -> PlannerResult<Symbol> {
        self.name_gen.next(prefix).ok_or_else(|| {
            PlannerError::internal(format!(
                "Fresh symbol counter exhausted at {} (prefix `{}`)",
                self.name_gen.peek_counter(),
                prefix
            ))
        })
    }

    pub fn name_generator(&self) -> &NameGenerator {
        &self.name_gen
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Provenance algebra configured for this session.
    pub fn qprov(&self) -> QProv {
        QProv::new(self.config.disjoint_provenance)
    }
}

impl fmt::Display for PlanCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "---- PlanCtx ----")?;
        writeln!(f, "next symbol: {}", self.name_gen.peek_counter())?;
        writeln!(
            f,
            "prefixes: join={:?} left={:?} center={:?}",
            self.config.join_prefix, self.config.left_tag_prefix, self.config.center_tag_prefix
        )?;
        writeln!(f, "disjoint provenance: {:?}", self.config.disjoint_provenance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_planner::{
        provenance::{DisjointProvenancePolicy, QDims},
        qsu::{QsuNode, QueryGraph, Read},
    };

    fn read_graph(names: &[&str]) -> AuthenticatedGraph {
        let vertices = names
            .iter()
            .map(|name| {
                (
                    Symbol::new(*name),
                    QsuNode::Read(Read {
                        path: format!("/t/{}", name),
                    }),
                )
            })
            .collect();
        let dims = names
            .iter()
            .map(|name| (Symbol::new(*name), QDims::empty()))
            .collect();
        AuthenticatedGraph::new(QueryGraph::new(Symbol::new(names[0]), vertices), dims)
    }

    #[test]
    fn test_fresh_symbols_are_sequential() {
        let mut ctx = PlanCtx::default();
        assert_eq!(ctx.fresh_symbol("autojoin").unwrap().as_str(), "autojoin_0");
        assert_eq!(
            ctx.fresh_symbol("leftAccess").unwrap().as_str(),
            "leftAccess_1"
        );
        assert_eq!(ctx.name_generator().peek_counter(), 2);
    }

    #[test]
    fn test_for_graph_skips_existing_names() {
        let graph = read_graph(&["autojoin_4", "src"]);
        let mut ctx = PlanCtx::for_graph(PlannerConfig::default(), &graph);
        assert_eq!(ctx.fresh_symbol("autojoin").unwrap().as_str(), "autojoin_5");
    }

    #[test]
    fn test_for_graph_skips_names_only_in_provenance() {
        let mut graph = read_graph(&["src"]);
        graph.dims.insert(Symbol::new("autojoin_9"), QDims::empty());
        let mut ctx = PlanCtx::for_graph(PlannerConfig::default(), &graph);
        assert_eq!(ctx.fresh_symbol("autojoin").unwrap().as_str(), "autojoin_10");
    }

    #[test]
    fn test_exhausted_counter_is_internal_error() {
        let last = format!("x_{}", u64::MAX);
        let graph = read_graph(&["src", last.as_str()]);
        let mut ctx = PlanCtx::for_graph(PlannerConfig::default(), &graph);
        let err = ctx.fresh_symbol("autojoin").unwrap_err();
        assert!(err.is_internal());
        assert!(err.to_string().contains("exhausted"));
    }

    #[test]
    fn test_qprov_follows_config() {
        let config = PlannerConfig {
            disjoint_provenance: DisjointProvenancePolicy::CrossJoin,
            ..Default::default()
        };
        let ctx = PlanCtx::new(config);
        assert_eq!(
            ctx.qprov().disjoint_policy(),
            DisjointProvenancePolicy::CrossJoin
        );
    }
}
