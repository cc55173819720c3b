use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate functions. `A` is the argument: `()` on an untyped `LpReduce`,
/// a [`FreeMap`](super::FreeMap) once the reduce is explicit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReduceFunc<A> {
    Count(A),
    Sum(A),
    Min(A),
    Max(A),
    Avg(A),
    Arbitrary(A),
    First(A),
    Last(A),
    UnshiftArray(A),
    /// (key, value)
    UnshiftMap(A, A),
}

/// Reduce operator of an `LpReduce`, before any argument is attached.
pub type ReduceOp = ReduceFunc<()>;

impl<A> ReduceFunc<A> {
    pub fn map<B>(self, mut f: impl FnMut(A) -> B) -> ReduceFunc<B> {
        match self {
            ReduceFunc::Count(a) => ReduceFunc::Count(f(a)),
            ReduceFunc::Sum(a) => ReduceFunc::Sum(f(a)),
            ReduceFunc::Min(a) => ReduceFunc::Min(f(a)),
            ReduceFunc::Max(a) => ReduceFunc::Max(f(a)),
            ReduceFunc::Avg(a) => ReduceFunc::Avg(f(a)),
            ReduceFunc::Arbitrary(a) => ReduceFunc::Arbitrary(f(a)),
            ReduceFunc::First(a) => ReduceFunc::First(f(a)),
            ReduceFunc::Last(a) => ReduceFunc::Last(f(a)),
            ReduceFunc::UnshiftArray(a) => ReduceFunc::UnshiftArray(f(a)),
            ReduceFunc::UnshiftMap(k, v) => {
                let k = f(k);
                ReduceFunc::UnshiftMap(k, f(v))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReduceFunc::Count(_) => "count",
            ReduceFunc::Sum(_) => "sum",
            ReduceFunc::Min(_) => "min",
            ReduceFunc::Max(_) => "max",
            ReduceFunc::Avg(_) => "avg",
            ReduceFunc::Arbitrary(_) => "arbitrary",
            ReduceFunc::First(_) => "first",
            ReduceFunc::Last(_) => "last",
            ReduceFunc::UnshiftArray(_) => "unshift_array",
            ReduceFunc::UnshiftMap(_, _) => "unshift_map",
        }
    }

    pub fn args(&self) -> Vec<&A> {
        match self {
            ReduceFunc::Count(a)
            | ReduceFunc::Sum(a)
            | ReduceFunc::Min(a)
            | ReduceFunc::Max(a)
            | ReduceFunc::Avg(a)
            | ReduceFunc::Arbitrary(a)
            | ReduceFunc::First(a)
            | ReduceFunc::Last(a)
            | ReduceFunc::UnshiftArray(a) => vec![a],
            ReduceFunc::UnshiftMap(k, v) => vec![k, v],
        }
    }
}

impl<A: fmt::Display> fmt::Display for ReduceFunc<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name())?;
        for (i, arg) in self.args().into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}
