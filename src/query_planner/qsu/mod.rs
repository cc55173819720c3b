//! # Uniform Operator Graph (QSU)
//!
//! Operators of the intermediate "uniform" representation. Children are
//! referenced by [`Symbol`], never embedded, so a graph may share vertices
//! freely. The graph itself lives in [`graph`].
//!
//! ## Operators handled by provenance reification
//!
//! | before                         | after                          |
//! |--------------------------------|--------------------------------|
//! | `AutoJoin2(l, r, f)`           | `ThetaJoin(l, r, cond, Inner, f')` |
//! | `AutoJoin3(l, c, r, f)`        | `ThetaJoin(j, r, ...)` + new `j = ThetaJoin(l, c, ...)` |
//! | `LPReduce(src, op)`            | `QSReduce(src, buckets, [op], repair)` |
//!
//! Everything else is opaque to that pass.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::query_planner::{
    map_func::{BinaryFunc, FreeMap, JoinFunc, ReduceFunc, ReduceOp, RepairFunc, TernaryFunc},
    symbol::Symbol,
};

pub mod graph;

pub use graph::{AuthenticatedGraph, QueryGraph};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
pub enum JoinType {
    #[default]
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum SortDir {
    Ascending,
    Descending,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum SubsetOp {
    Take,
    Drop,
    Sample,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum ShiftType {
    Array,
    Map,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Read {
    pub path: String,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Map {
    pub source: Symbol,
    pub func: FreeMap,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct QsFilter {
    pub source: Symbol,
    pub predicate: FreeMap,
}

/// Flatten the array or map found at `structure`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LeftShift {
    pub source: Symbol,
    pub structure: FreeMap,
    pub shift_type: ShiftType,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Union {
    pub left: Symbol,
    pub right: Symbol,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Subset {
    pub from: Symbol,
    pub op: SubsetOp,
    pub count: Symbol,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Sort {
    pub source: Symbol,
    pub order: Vec<(FreeMap, SortDir)>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Distinct {
    pub source: Symbol,
}

/// Implicit binary join; the condition has not been derived yet.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct AutoJoin2 {
    pub left: Symbol,
    pub right: Symbol,
    pub combiner: BinaryFunc,
}

/// Implicit ternary join; the condition has not been derived yet.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct AutoJoin3 {
    pub left: Symbol,
    pub center: Symbol,
    pub right: Symbol,
    pub combiner: TernaryFunc,
}

/// Aggregate whose grouping buckets are not derived yet.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LpReduce {
    pub source: Symbol,
    pub reduce: ReduceOp,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ThetaJoin {
    pub left: Symbol,
    pub right: Symbol,
    pub condition: JoinFunc,
    pub join_type: JoinType,
    pub combiner: JoinFunc,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct QsReduce {
    pub source: Symbol,
    pub buckets: Vec<FreeMap>,
    pub reducers: Vec<ReduceFunc<FreeMap>>,
    pub repair: RepairFunc,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum QsuNode {
    Read(Read),
    /// Source with no rows of interest (e.g. the input of a constant).
    Unreferenced,
    Map(Map),
    QsFilter(QsFilter),
    LeftShift(LeftShift),
    Union(Union),
    Subset(Subset),
    Sort(Sort),
    Distinct(Distinct),
    AutoJoin2(AutoJoin2),
    AutoJoin3(AutoJoin3),
    LpReduce(LpReduce),
    ThetaJoin(ThetaJoin),
    QsReduce(QsReduce),
}

impl QsuNode {
    /// Symbols this node references, in operand order.
    pub fn children(&self) -> Vec<&Symbol> {
        match self {
            QsuNode::Read(_) | QsuNode::Unreferenced => vec![],
            QsuNode::Map(m) => vec![&m.source],
            QsuNode::QsFilter(f) => vec![&f.source],
            QsuNode::LeftShift(ls) => vec![&ls.source],
            QsuNode::Union(u) => vec![&u.left, &u.right],
            QsuNode::Subset(s) => vec![&s.from, &s.count],
            QsuNode::Sort(s) => vec![&s.source],
            QsuNode::Distinct(d) => vec![&d.source],
            QsuNode::AutoJoin2(aj) => vec![&aj.left, &aj.right],
            QsuNode::AutoJoin3(aj) => vec![&aj.left, &aj.center, &aj.right],
            QsuNode::LpReduce(r) => vec![&r.source],
            QsuNode::ThetaJoin(tj) => vec![&tj.left, &tj.right],
            QsuNode::QsReduce(r) => vec![&r.source],
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            QsuNode::Read(_) => "Read",
            QsuNode::Unreferenced => "Unreferenced",
            QsuNode::Map(_) => "Map",
            QsuNode::QsFilter(_) => "QSFilter",
            QsuNode::LeftShift(_) => "LeftShift",
            QsuNode::Union(_) => "Union",
            QsuNode::Subset(_) => "Subset",
            QsuNode::Sort(_) => "Sort",
            QsuNode::Distinct(_) => "Distinct",
            QsuNode::AutoJoin2(_) => "AutoJoin2",
            QsuNode::AutoJoin3(_) => "AutoJoin3",
            QsuNode::LpReduce(_) => "LPReduce",
            QsuNode::ThetaJoin(_) => "ThetaJoin",
            QsuNode::QsReduce(_) => "QSReduce",
        }
    }

    /// True for operators that provenance reification must replace.
    pub fn needs_reification(&self) -> bool {
        matches!(
            self,
            QsuNode::AutoJoin2(_) | QsuNode::AutoJoin3(_) | QsuNode::LpReduce(_)
        )
    }
}

impl fmt::Display for QsuNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QsuNode::Read(r) => write!(f, "Read({})", r.path),
            QsuNode::Unreferenced => write!(f, "Unreferenced"),
            QsuNode::Map(m) => write!(f, "Map({}, {})", m.source, m.func),
            QsuNode::QsFilter(q) => write!(f, "QSFilter({}, {})", q.source, q.predicate),
            QsuNode::LeftShift(ls) => write!(
                f,
                "LeftShift({}, {}, {:?})",
                ls.source, ls.structure, ls.shift_type
            ),
            QsuNode::Union(u) => write!(f, "Union({}, {})", u.left, u.right),
            QsuNode::Subset(s) => write!(f, "Subset({}, {:?}, {})", s.from, s.op, s.count),
            QsuNode::Sort(s) => write!(f, "Sort({}, {} keys)", s.source, s.order.len()),
            QsuNode::Distinct(d) => write!(f, "Distinct({})", d.source),
            QsuNode::AutoJoin2(aj) => {
                write!(f, "AutoJoin2({}, {}, {})", aj.left, aj.right, aj.combiner)
            }
            QsuNode::AutoJoin3(aj) => write!(
                f,
                "AutoJoin3({}, {}, {}, {})",
                aj.left, aj.center, aj.right, aj.combiner
            ),
            QsuNode::LpReduce(r) => write!(f, "LPReduce({}, {})", r.source, r.reduce.name()),
            QsuNode::ThetaJoin(tj) => write!(
                f,
                "ThetaJoin({}, {}, {}, {:?}, {})",
                tj.left, tj.right, tj.condition, tj.join_type, tj.combiner
            ),
            QsuNode::QsReduce(r) => {
                write!(f, "QSReduce({}, [", r.source)?;
                for (i, bucket) in r.buckets.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", bucket)?;
                }
                write!(f, "], [")?;
                for (i, reducer) in r.reducers.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", reducer)?;
                }
                write!(f, "], {})", r.repair)
            }
        }
    }
}
