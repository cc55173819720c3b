//! # Provenance Model
//!
//! Every vertex of the uniform graph carries [`Dimensions`]: the lineage of the
//! rows it produces. Join reification reads provenance to decide *on what* two
//! inputs of an auto-join must agree.
//!
//! ## Representation
//!
//! ```text
//! Dimensions = { alternative, ... }          one per possible origin (union)
//! alternative = [level_0, level_1, ...]      outermost dimension first
//! level       = { identity, ... }            identities joined at this depth
//! identity    = Value(access, tag)           identity-bearing
//!             | Inflate(access, tag)         identity-bearing (flatten)
//!             | Project(key, tag)            structural
//!             | Inject(key, tag)             structural
//! ```
//!
//! All collections are ordered sets, so two provenance values describing the
//! same lineage are structurally equal.
//!
//! ## Operations used by the planner
//!
//! - [`Dimensions::join`] - provenance of a join of two inputs
//! - [`QProv::autojoin_condition`] - join predicate equating common identities

use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};

use crate::query_planner::{
    map_func::{FreeMap, JoinFunc, JoinSide, MapFunc},
    symbol::Symbol,
};

mod access;
pub mod errors;

pub use access::{identity_rewrite, Access, IdType, IdentityAccess};
use errors::ProvenanceError;

/// Provenance as used by the uniform graph.
pub type QDims = Dimensions<String, Access, IdType>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Identity<S, V, T> {
    Value(V, T),
    Inflate(V, T),
    Project(S, T),
    Inject(S, T),
}

impl<S, V, T> Identity<S, V, T> {
    /// Access of an identity-bearing component, `None` for structural ones.
    pub fn access(&self) -> Option<&V> {
        match self {
            Identity::Value(v, _) | Identity::Inflate(v, _) => Some(v),
            Identity::Project(_, _) | Identity::Inject(_, _) => None,
        }
    }

    pub fn tag(&self) -> &T {
        match self {
            Identity::Value(_, t)
            | Identity::Inflate(_, t)
            | Identity::Project(_, t)
            | Identity::Inject(_, t) => t,
        }
    }

    fn same_kind(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Identities joined at one depth.
pub type Level<S, V, T> = BTreeSet<Identity<S, V, T>>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize, V: Serialize, T: Serialize",
    deserialize = "S: Deserialize<'de> + Ord, V: Deserialize<'de> + Ord, T: Deserialize<'de> + Ord"
))]
pub struct Dimensions<S, V, T> {
    alternatives: BTreeSet<Vec<Level<S, V, T>>>,
}

impl<S: Ord + Clone, V: Ord + Clone, T: Ord + Clone> Dimensions<S, V, T> {
    /// No lineage at all (constants).
    pub fn empty() -> Self {
        Dimensions {
            alternatives: BTreeSet::new(),
        }
    }

    /// Rows identified by the value at `access`.
    pub fn value(access: V, tag: T) -> Self {
        Self::single_level(Identity::Value(access, tag))
    }

    fn single_level(identity: Identity<S, V, T>) -> Self {
        let mut alternatives = BTreeSet::new();
        alternatives.insert(vec![BTreeSet::from([identity])]);
        Dimensions { alternatives }
    }

    pub fn alternatives(&self) -> impl Iterator<Item = &[Level<S, V, T>]> {
        self.alternatives.iter().map(Vec::as_slice)
    }

    pub fn alternative_count(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// True when no identity-bearing component exists anywhere.
    pub fn is_vacuous(&self) -> bool {
        self.alternatives
            .iter()
            .flatten()
            .flatten()
            .all(|identity| identity.access().is_none())
    }

    pub fn project_static(self, key: S, tag: T) -> Self {
        self.extend_innermost(Identity::Project(key, tag))
    }

    pub fn inject_static(self, key: S, tag: T) -> Self {
        self.extend_innermost(Identity::Inject(key, tag))
    }

    /// Add a new innermost dimension identified by the values at `access`.
    pub fn inflate(self, access: V, tag: T) -> Self {
        let identity = Identity::Inflate(access, tag);
        if self.is_empty() {
            return Self::single_level(identity);
        }
        let alternatives = self
            .alternatives
            .into_iter()
            .map(|mut stack| {
                stack.push(BTreeSet::from([identity.clone()]));
                stack
            })
            .collect();
        Dimensions { alternatives }
    }

    fn extend_innermost(self, identity: Identity<S, V, T>) -> Self {
        if self.is_empty() {
            return Self::single_level(identity);
        }
        let alternatives = self
            .alternatives
            .into_iter()
            .map(|mut stack| {
                match stack.last_mut() {
                    Some(level) => {
                        level.insert(identity.clone());
                    }
                    None => stack.push(BTreeSet::from([identity.clone()])),
                }
                stack
            })
            .collect();
        Dimensions { alternatives }
    }

    /// Provenance of rows that may come from either input.
    pub fn union(mut self, other: Self) -> Self {
        self.alternatives.extend(other.alternatives);
        self
    }

    /// Provenance of a join of `self` and `other`.
    ///
    /// Alternatives combine pairwise; within a pair, levels at the same depth
    /// are merged and the longer stack keeps its extra levels. [`Dimensions::empty`]
    /// is the unit, and the operation is associative.
    pub fn join(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }

        let mut alternatives = BTreeSet::new();
        for left in &self.alternatives {
            for right in &other.alternatives {
                let depth = left.len().max(right.len());
                let merged: Vec<Level<S, V, T>> = (0..depth)
                    .map(|i| {
                        let mut level = left.get(i).cloned().unwrap_or_default();
                        if let Some(r) = right.get(i) {
                            level.extend(r.iter().cloned());
                        }
                        level
                    })
                    .collect();
                alternatives.insert(merged);
            }
        }
        Dimensions { alternatives }
    }
}

/// What [`QProv::autojoin_condition`] does when two non-vacuous provenances
/// share no identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisjointProvenancePolicy {
    /// Fail with [`ProvenanceError::NoCommonIdentity`].
    #[default]
    Reject,
    /// Join every row pair (`true` condition) and log a warning.
    CrossJoin,
}

impl FromStr for DisjointProvenancePolicy {
    type Err = ProvenanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(DisjointProvenancePolicy::Reject),
            "cross_join" | "crossjoin" => Ok(DisjointProvenancePolicy::CrossJoin),
            other => Err(ProvenanceError::UnknownPolicy(other.to_string())),
        }
    }
}

/// The provenance algebra: combinators plus the policy for disjoint lineage.
#[derive(Debug, Clone, Copy, Default)]
pub struct QProv {
    disjoint: DisjointProvenancePolicy,
}

impl QProv {
    pub fn new(disjoint: DisjointProvenancePolicy) -> Self {
        QProv { disjoint }
    }

    pub fn disjoint_policy(&self) -> DisjointProvenancePolicy {
        self.disjoint
    }

    pub fn join<S, V, T>(
        &self,
        left: &Dimensions<S, V, T>,
        right: &Dimensions<S, V, T>,
    ) -> Dimensions<S, V, T>
    where
        S: Ord + Clone,
        V: Ord + Clone,
        T: Ord + Clone,
    {
        left.join(right)
    }

    /// Predicate under which a row of `left` and a row of `right` describe the
    /// same identity.
    ///
    /// For every pair of alternatives, identity-bearing components of the same
    /// kind and tag found at the same depth are equated. Equalities of one pair
    /// are AND-ed, pairs are OR-ed. Each access is rooted at `rewrite(symbol)`
    /// and placed on its side of the join.
    ///
    /// A side without identity-bearing lineage (a constant, say) is compatible
    /// with every row of the other side, and the condition is `true`.
    pub fn autojoin_condition<S, V, T, F>(
        &self,
        left: &Dimensions<S, V, T>,
        right: &Dimensions<S, V, T>,
        rewrite: F,
    ) -> Result<JoinFunc, ProvenanceError>
    where
        S: Ord + Clone,
        V: Ord + Clone + IdentityAccess,
        T: Ord + Clone,
        F: Fn(&Symbol) -> FreeMap,
    {
        if left.is_vacuous() || right.is_vacuous() {
            return Ok(MapFunc::bool_lit(true));
        }

        let mut disjuncts: Vec<JoinFunc> = vec![];
        for l_stack in left.alternatives() {
            for r_stack in right.alternatives() {
                let keys = join_keys(l_stack, r_stack, &rewrite);
                if keys.is_empty() {
                    continue;
                }
                let conjunction = MapFunc::and_all(keys);
                if !disjuncts.contains(&conjunction) {
                    disjuncts.push(conjunction);
                }
            }
        }

        if disjuncts.is_empty() {
            return match self.disjoint {
                DisjointProvenancePolicy::Reject => Err(ProvenanceError::NoCommonIdentity {
                    left_alternatives: left.alternative_count(),
                    right_alternatives: right.alternative_count(),
                }),
                DisjointProvenancePolicy::CrossJoin => {
                    log::warn!(
                        "autojoin: provenances share no identity, emitting cross join condition"
                    );
                    Ok(MapFunc::bool_lit(true))
                }
            };
        }

        Ok(MapFunc::or_all(disjuncts))
    }
}

fn join_keys<S, V, T, F>(
    left: &[Level<S, V, T>],
    right: &[Level<S, V, T>],
    rewrite: &F,
) -> Vec<JoinFunc>
where
    V: IdentityAccess + PartialEq,
    T: PartialEq,
    S: PartialEq,
    F: Fn(&Symbol) -> FreeMap,
{
    let mut keys: Vec<JoinFunc> = vec![];
    for (l_level, r_level) in left.iter().zip(right.iter()) {
        for l_id in l_level {
            let Some(l_access) = l_id.access() else {
                continue;
            };
            for r_id in r_level {
                let Some(r_access) = r_id.access() else {
                    continue;
                };
                if !l_id.same_kind(r_id) || l_id.tag() != r_id.tag() {
                    continue;
                }
                let key = MapFunc::eq(
                    side_access(l_access, rewrite, JoinSide::LeftSide),
                    side_access(r_access, rewrite, JoinSide::RightSide),
                );
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
    }
    keys
}

fn side_access<V, F>(access: &V, rewrite: &F, side: JoinSide) -> JoinFunc
where
    V: IdentityAccess,
    F: Fn(&Symbol) -> FreeMap,
{
    access
        .project_from(rewrite(access.symbol()))
        .map_holes(&mut |_| side)
}

impl<S: fmt::Display, V: fmt::Display, T: fmt::Display> fmt::Display for Identity<S, V, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Value(v, t) => write!(f, "value({}: {})", v, t),
            Identity::Inflate(v, t) => write!(f, "inflate({}: {})", v, t),
            Identity::Project(s, t) => write!(f, "project({}: {})", s, t),
            Identity::Inject(s, t) => write!(f, "inject({}: {})", s, t),
        }
    }
}

impl<S: fmt::Display, V: fmt::Display, T: fmt::Display> fmt::Display for Dimensions<S, V, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alternatives.is_empty() {
            return write!(f, "∅");
        }
        for (a, stack) in self.alternatives.iter().enumerate() {
            if a > 0 {
                write!(f, " | ")?;
            }
            write!(f, "[")?;
            for (i, level) in stack.iter().enumerate() {
                if i > 0 {
                    write!(f, " / ")?;
                }
                write!(f, "{{")?;
                for (j, identity) in level.iter().enumerate() {
                    if j > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", identity)?;
                }
                write!(f, "}}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}
