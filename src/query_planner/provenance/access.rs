use serde::{Deserialize, Serialize};
use std::fmt;

use crate::query_planner::{
    map_func::{FreeMap, Hole, MapFunc},
    symbol::Symbol,
};

/// How an identity-bearing provenance component reaches its value.
///
/// The symbol is the vertex whose output the access starts from. Join
/// conditions pass it through a caller-supplied rewrite so that accesses can be
/// redirected into one side of an enclosing join.
pub trait IdentityAccess {
    fn symbol(&self) -> &Symbol;

    /// Apply the rest of the access path on top of `base`.
    fn project_from(&self, base: FreeMap) -> FreeMap;
}

/// Value found at `path` (a sequence of record keys) in rows of `source`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Access {
    pub source: Symbol,
    pub path: Vec<String>,
}

impl Access {
    /// The whole row of `source`.
    pub fn value(source: impl Into<Symbol>) -> Self {
        Access {
            source: source.into(),
            path: vec![],
        }
    }

    /// The `key` field of rows of `source`.
    pub fn field(source: impl Into<Symbol>, key: impl Into<String>) -> Self {
        Access {
            source: source.into(),
            path: vec![key.into()],
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.path.push(key.into());
        self
    }
}

impl IdentityAccess for Access {
    fn symbol(&self) -> &Symbol {
        &self.source
    }

    fn project_from(&self, base: FreeMap) -> FreeMap {
        self.path
            .iter()
            .fold(base, |acc, key| acc.project_key(key.clone()))
    }
}

impl From<Symbol> for Access {
    fn from(source: Symbol) -> Self {
        Access::value(source)
    }
}

/// Type tag of an identity. Only identities with equal tags are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IdType {
    /// Identity of a row read from a dataset.
    Dataset,
    /// Identity synthesized by an expression (e.g. a flattened array position).
    Expr,
}

/// Access rooted at the identity hole; what `rewrite` returns by default.
pub fn identity_rewrite(_: &Symbol) -> FreeMap {
    MapFunc::hole(Hole)
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)?;
        for key in &self.path {
            write!(f, ".{}", key)?;
        }
        Ok(())
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdType::Dataset => write!(f, "dataset"),
            IdType::Expr => write!(f, "expr"),
        }
    }
}
