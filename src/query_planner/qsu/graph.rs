//! Symbol-indexed graph of [`QsuNode`]s and its provenance-carrying wrapper.
//!
//! Vertices are kept in ordered maps: iteration order depends only on the
//! symbols, never on how the graph was assembled. Rewrites that walk the
//! vertex map therefore allocate fresh names in a reproducible order.

use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    fmt,
};

use crate::query_planner::{
    errors::{PlannerError, PlannerResult},
    provenance::QDims,
    qsu::QsuNode,
    symbol::Symbol,
};

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct QueryGraph {
    pub root: Symbol,
    pub vertices: BTreeMap<Symbol, QsuNode>,
}

impl QueryGraph {
    pub fn new(root: Symbol, vertices: BTreeMap<Symbol, QsuNode>) -> Self {
        QueryGraph { root, vertices }
    }

    /// Graph with a single vertex that is also the root.
    pub fn single(root: Symbol, node: QsuNode) -> Self {
        QueryGraph::new(root.clone(), BTreeMap::from([(root, node)]))
    }

    pub fn with_vertex(mut self, symbol: impl Into<Symbol>, node: QsuNode) -> Self {
        self.vertices.insert(symbol.into(), node);
        self
    }

    pub fn vertex(&self, symbol: &Symbol) -> Option<&QsuNode> {
        self.vertices.get(symbol)
    }

    /// Children of `symbol`, empty when the vertex does not exist.
    pub fn children_of(&self, symbol: &Symbol) -> Vec<&Symbol> {
        self.vertices
            .get(symbol)
            .map(QsuNode::children)
            .unwrap_or_default()
    }

    pub fn root_vertex(&self) -> Option<&QsuNode> {
        self.vertices.get(&self.root)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.vertices.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// `(referencing vertex, missing child)` for every child reference that is
    /// not a key of the vertex map.
    pub fn dangling_references(&self) -> Vec<(Symbol, Symbol)> {
        self.vertices
            .iter()
            .flat_map(|(symbol, node)| {
                node.children()
                    .into_iter()
                    .filter(move |child| !self.vertices.contains_key(*child))
                    .map(move |child| (symbol.clone(), child.clone()))
            })
            .collect()
    }

    /// Vertices reachable from the root, following child references that exist.
    pub fn reachable_from_root(&self) -> BTreeSet<Symbol> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![self.root.clone()];
        while let Some(symbol) = stack.pop() {
            let Some(node) = self.vertices.get(&symbol) else {
                continue;
            };
            if !seen.insert(symbol) {
                continue;
            }
            stack.extend(node.children().into_iter().cloned());
        }
        seen
    }

    /// Check that the root exists and no child reference dangles.
    pub fn validate(&self) -> PlannerResult<()> {
        if !self.contains(&self.root) {
            return Err(PlannerError::internal(format!(
                "Root `{}` is not a vertex of the graph",
                self.root
            )));
        }
        if let Some((parent, child)) = self.dangling_references().into_iter().next() {
            return Err(PlannerError::internal(format!(
                "Vertex `{}` references missing vertex `{}`",
                parent, child
            )));
        }
        Ok(())
    }

    fn fmt_with_tree(
        &self,
        f: &mut fmt::Formatter<'_>,
        symbol: &Symbol,
        prefix: &str,
        is_last: bool,
        is_root: bool,
        printed: &mut HashSet<Symbol>,
    ) -> fmt::Result {
        let (branch, next_prefix) = if is_last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        let lead = if is_root {
            String::new()
        } else {
            format!("{}{}", prefix, branch)
        };

        let Some(node) = self.vertices.get(symbol) else {
            return writeln!(f, "{}{} <missing>", lead, symbol);
        };
        if !printed.insert(symbol.clone()) {
            return writeln!(f, "{}{} (shared)", lead, symbol);
        }
        writeln!(f, "{}{} := {}", lead, symbol, node)?;

        let child_prefix = if is_root {
            String::new()
        } else {
            format!("{}{}", prefix, next_prefix)
        };
        let children = node.children();
        for (i, child) in children.iter().enumerate() {
            let last = i + 1 == children.len();
            self.fmt_with_tree(f, child, &child_prefix, last, false, printed)?;
        }
        Ok(())
    }
}

impl fmt::Display for QueryGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printed = HashSet::new();
        self.fmt_with_tree(f, &self.root, "", true, true, &mut printed)
    }
}

/// A graph paired with the provenance of each of its vertices.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct AuthenticatedGraph {
    pub graph: QueryGraph,
    pub dims: BTreeMap<Symbol, QDims>,
}

impl AuthenticatedGraph {
    pub fn new(graph: QueryGraph, dims: BTreeMap<Symbol, QDims>) -> Self {
        AuthenticatedGraph { graph, dims }
    }

    pub fn root(&self) -> &Symbol {
        &self.graph.root
    }

    /// Provenance of `symbol`. A missing entry is an upstream invariant violation.
    pub fn dims_of(&self, symbol: &Symbol) -> PlannerResult<&QDims> {
        self.dims
            .get(symbol)
            .ok_or_else(|| PlannerError::missing_provenance(symbol))
    }

    /// Vertices that have no provenance entry.
    pub fn missing_provenance(&self) -> Vec<&Symbol> {
        self.graph
            .vertices
            .keys()
            .filter(|symbol| !self.dims.contains_key(*symbol))
            .collect()
    }

    /// Graph invariants plus provenance completeness.
    pub fn validate(&self) -> PlannerResult<()> {
        self.graph.validate()?;
        match self.missing_provenance().first() {
            Some(symbol) => Err(PlannerError::missing_provenance(symbol)),
            None => Ok(()),
        }
    }
}
