//! Scalar function language of the uniform graph.
//!
//! A [`MapFunc<H>`] is an expression tree whose free variables ("holes") have
//! type `H`. The hole type says what the expression is a function of:
//!
//! | alias           | hole            | used for                                  |
//! |-----------------|-----------------|-------------------------------------------|
//! | [`FreeMap`]     | [`Hole`]        | `Map`, filters, buckets, reducer args     |
//! | [`JoinFunc`]    | [`JoinSide`]    | `ThetaJoin` condition and combiner        |
//! | [`BinaryFunc`]  | [`BinarySide`]  | `AutoJoin2` combiner                      |
//! | [`TernaryFunc`] | [`TernarySide`] | `AutoJoin3` combiner                      |
//! | [`RepairFunc`]  | [`ReduceIndex`] | `QsReduce` repair                         |
//!
//! Rewrites never evaluate anything: they relabel holes ([`MapFunc::map_holes`])
//! or substitute expressions for them ([`MapFunc::bind_holes`]). [`MapFunc::eval`]
//! is a small interpreter over JSON values used for constant folding and for
//! checking how a rewritten combiner routes its inputs.

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};
use std::fmt;

pub mod holes;
pub mod reduce;

pub use holes::{BinarySide, Hole, JoinSide, ReduceIndex, TernarySide};
pub use reduce::{ReduceFunc, ReduceOp};

pub type FreeMap = MapFunc<Hole>;
pub type JoinFunc = MapFunc<JoinSide>;
pub type BinaryFunc = MapFunc<BinarySide>;
pub type TernaryFunc = MapFunc<TernarySide>;
pub type RepairFunc = MapFunc<ReduceIndex>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Operator {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperatorApplication<H> {
    pub operator: Operator,
    pub operands: Vec<MapFunc<H>>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MapFunc<H> {
    Hole(H),

    Literal(Literal),

    /// Absence of a value (projection of a missing key, etc.).
    Undefined,

    ProjectKey {
        src: Box<MapFunc<H>>,
        key: String,
    },

    ProjectIndex {
        src: Box<MapFunc<H>>,
        index: i64,
    },

    /// Single-key record `{key: value}`.
    MakeMap {
        key: String,
        value: Box<MapFunc<H>>,
    },

    /// Record concatenation; keys of the right operand win.
    ConcatMaps(Box<MapFunc<H>>, Box<MapFunc<H>>),

    /// Single-element array `[value]`.
    MakeArray(Box<MapFunc<H>>),

    ConcatArrays(Box<MapFunc<H>>, Box<MapFunc<H>>),

    Operator(OperatorApplication<H>),

    Cond {
        test: Box<MapFunc<H>>,
        then: Box<MapFunc<H>>,
        otherwise: Box<MapFunc<H>>,
    },
}

impl<H> MapFunc<H> {
    pub fn hole(h: H) -> Self {
        MapFunc::Hole(h)
    }

    pub fn bool_lit(value: bool) -> Self {
        MapFunc::Literal(Literal::Boolean(value))
    }

    pub fn project_key(self, key: impl Into<String>) -> Self {
        MapFunc::ProjectKey {
            src: Box::new(self),
            key: key.into(),
        }
    }

    pub fn make_map(key: impl Into<String>, value: MapFunc<H>) -> Self {
        MapFunc::MakeMap {
            key: key.into(),
            value: Box::new(value),
        }
    }

    pub fn concat_maps(left: MapFunc<H>, right: MapFunc<H>) -> Self {
        MapFunc::ConcatMaps(Box::new(left), Box::new(right))
    }

    pub fn apply(operator: Operator, operands: Vec<MapFunc<H>>) -> Self {
        MapFunc::Operator(OperatorApplication { operator, operands })
    }

    pub fn eq(left: MapFunc<H>, right: MapFunc<H>) -> Self {
        Self::apply(Operator::Equal, vec![left, right])
    }

    /// Conjunction of `preds`; `true` when empty.
    pub fn and_all(preds: impl IntoIterator<Item = MapFunc<H>>) -> Self {
        Self::fold_logical(Operator::And, preds, true)
    }

    /// Disjunction of `preds`; `false` when empty.
    pub fn or_all(preds: impl IntoIterator<Item = MapFunc<H>>) -> Self {
        Self::fold_logical(Operator::Or, preds, false)
    }

    fn fold_logical(
        operator: Operator,
        preds: impl IntoIterator<Item = MapFunc<H>>,
        unit: bool,
    ) -> Self {
        let mut operands: Vec<MapFunc<H>> = preds.into_iter().collect();
        match operands.len() {
            0 => Self::bool_lit(unit),
            1 => operands.remove(0),
            _ => Self::apply(operator, operands),
        }
    }

    /// Relabel every hole. The structure of the expression is unchanged.
    pub fn map_holes<G, F>(self, f: &mut F) -> MapFunc<G>
    where
        F: FnMut(H) -> G,
    {
        self.bind_holes(&mut |h| MapFunc::Hole(f(h)))
    }

    /// Replace every hole by the expression `f` returns for it.
    pub fn bind_holes<G, F>(self, f: &mut F) -> MapFunc<G>
    where
        F: FnMut(H) -> MapFunc<G>,
    {
        match self {
            MapFunc::Hole(h) => f(h),
            MapFunc::Literal(lit) => MapFunc::Literal(lit),
            MapFunc::Undefined => MapFunc::Undefined,
            MapFunc::ProjectKey { src, key } => MapFunc::ProjectKey {
                src: Box::new(src.bind_holes(f)),
                key,
            },
            MapFunc::ProjectIndex { src, index } => MapFunc::ProjectIndex {
                src: Box::new(src.bind_holes(f)),
                index,
            },
            MapFunc::MakeMap { key, value } => MapFunc::MakeMap {
                key,
                value: Box::new(value.bind_holes(f)),
            },
            MapFunc::ConcatMaps(left, right) => {
                let left = left.bind_holes(f);
                MapFunc::ConcatMaps(Box::new(left), Box::new(right.bind_holes(f)))
            }
            MapFunc::MakeArray(value) => MapFunc::MakeArray(Box::new(value.bind_holes(f))),
            MapFunc::ConcatArrays(left, right) => {
                let left = left.bind_holes(f);
                MapFunc::ConcatArrays(Box::new(left), Box::new(right.bind_holes(f)))
            }
            MapFunc::Operator(app) => MapFunc::Operator(OperatorApplication {
                operator: app.operator,
                operands: app
                    .operands
                    .into_iter()
                    .map(|operand| operand.bind_holes(f))
                    .collect(),
            }),
            MapFunc::Cond {
                test,
                then,
                otherwise,
            } => {
                let test = test.bind_holes(f);
                let then = then.bind_holes(f);
                MapFunc::Cond {
                    test: Box::new(test),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise.bind_holes(f)),
                }
            }
        }
    }

    /// All holes in left-to-right order, duplicates included.
    pub fn holes(&self) -> Vec<&H> {
        let mut acc = vec![];
        self.collect_holes(&mut acc);
        acc
    }

    fn collect_holes<'a>(&'a self, acc: &mut Vec<&'a H>) {
        match self {
            MapFunc::Hole(h) => acc.push(h),
            MapFunc::Literal(_) | MapFunc::Undefined => {}
            MapFunc::ProjectKey { src, .. } | MapFunc::ProjectIndex { src, .. } => {
                src.collect_holes(acc)
            }
            MapFunc::MakeMap { value, .. } | MapFunc::MakeArray(value) => value.collect_holes(acc),
            MapFunc::ConcatMaps(left, right) | MapFunc::ConcatArrays(left, right) => {
                left.collect_holes(acc);
                right.collect_holes(acc);
            }
            MapFunc::Operator(app) => {
                for operand in &app.operands {
                    operand.collect_holes(acc);
                }
            }
            MapFunc::Cond {
                test,
                then,
                otherwise,
            } => {
                test.collect_holes(acc);
                then.collect_holes(acc);
                otherwise.collect_holes(acc);
            }
        }
    }

    /// Evaluate against JSON inputs. Type mismatches evaluate to `null`.
    pub fn eval<F>(&self, input: &mut F) -> Value
    where
        F: FnMut(&H) -> Value,
    {
        match self {
            MapFunc::Hole(h) => input(h),
            MapFunc::Literal(lit) => lit.to_json(),
            MapFunc::Undefined => Value::Null,
            MapFunc::ProjectKey { src, key } => match src.eval(input) {
                Value::Object(mut fields) => fields.remove(key).unwrap_or(Value::Null),
                _ => Value::Null,
            },
            MapFunc::ProjectIndex { src, index } => match (src.eval(input), usize::try_from(*index)) {
                (Value::Array(mut items), Ok(i)) if i < items.len() => items.swap_remove(i),
                _ => Value::Null,
            },
            MapFunc::MakeMap { key, value } => {
                let mut fields = JsonMap::new();
                fields.insert(key.clone(), value.eval(input));
                Value::Object(fields)
            }
            MapFunc::ConcatMaps(left, right) => match (left.eval(input), right.eval(input)) {
                (Value::Object(mut l), Value::Object(r)) => {
                    l.extend(r);
                    Value::Object(l)
                }
                _ => Value::Null,
            },
            MapFunc::MakeArray(value) => Value::Array(vec![value.eval(input)]),
            MapFunc::ConcatArrays(left, right) => match (left.eval(input), right.eval(input)) {
                (Value::Array(mut l), Value::Array(r)) => {
                    l.extend(r);
                    Value::Array(l)
                }
                _ => Value::Null,
            },
            MapFunc::Operator(app) => {
                let values: Vec<Value> = app.operands.iter().map(|o| o.eval(input)).collect();
                eval_operator(app.operator, values)
            }
            MapFunc::Cond {
                test,
                then,
                otherwise,
            } => {
                if test.eval(input).as_bool() == Some(true) {
                    then.eval(input)
                } else {
                    otherwise.eval(input)
                }
            }
        }
    }
}

impl Literal {
    pub fn to_json(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Boolean(b) => Value::Bool(*b),
            Literal::Integer(i) => Value::from(*i),
            Literal::String(s) => Value::String(s.clone()),
        }
    }
}

fn eval_operator(operator: Operator, values: Vec<Value>) -> Value {
    match operator {
        Operator::And => values
            .iter()
            .map(Value::as_bool)
            .collect::<Option<Vec<bool>>>()
            .map_or(Value::Null, |bs| Value::Bool(bs.into_iter().all(|b| b))),
        Operator::Or => values
            .iter()
            .map(Value::as_bool)
            .collect::<Option<Vec<bool>>>()
            .map_or(Value::Null, |bs| Value::Bool(bs.into_iter().any(|b| b))),
        Operator::Not => match values.as_slice() {
            [v] => v.as_bool().map_or(Value::Null, |b| Value::Bool(!b)),
            _ => Value::Null,
        },
        Operator::Equal | Operator::NotEqual => match values.as_slice() {
            [l, r] if !l.is_null() && !r.is_null() => {
                Value::Bool((l == r) == (operator == Operator::Equal))
            }
            _ => Value::Null,
        },
        Operator::LessThan
        | Operator::GreaterThan
        | Operator::LessThanEqual
        | Operator::GreaterThanEqual => {
            let ordering = match values.as_slice() {
                [l, r] => match (l, r) {
                    (Value::Number(_), Value::Number(_)) => l
                        .as_i64()
                        .zip(r.as_i64())
                        .map(|(a, b)| a.cmp(&b)),
                    (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                    _ => None,
                },
                _ => None,
            };
            ordering.map_or(Value::Null, |ord| {
                Value::Bool(match operator {
                    Operator::LessThan => ord.is_lt(),
                    Operator::GreaterThan => ord.is_gt(),
                    Operator::LessThanEqual => ord.is_le(),
                    _ => ord.is_ge(),
                })
            })
        }
        Operator::Addition
        | Operator::Subtraction
        | Operator::Multiplication
        | Operator::Division => {
            let result = match values.as_slice() {
                [l, r] => l.as_i64().zip(r.as_i64()).and_then(|(a, b)| match operator {
                    Operator::Addition => a.checked_add(b),
                    Operator::Subtraction => a.checked_sub(b),
                    Operator::Multiplication => a.checked_mul(b),
                    _ => a.checked_div(b),
                }),
                _ => None,
            };
            result.map_or(Value::Null, Value::from)
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Addition => "+",
            Operator::Subtraction => "-",
            Operator::Multiplication => "*",
            Operator::Division => "/",
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::LessThanEqual => "<=",
            Operator::GreaterThanEqual => ">=",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
        };
        write!(f, "{}", symbol)
    }
}

impl<H: fmt::Display> fmt::Display for MapFunc<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapFunc::Hole(h) => write!(f, "{}", h),
            MapFunc::Literal(lit) => write!(f, "{}", lit),
            MapFunc::Undefined => write!(f, "undefined"),
            MapFunc::ProjectKey { src, key } => write!(f, "{}[{:?}]", src, key),
            MapFunc::ProjectIndex { src, index } => write!(f, "{}[{}]", src, index),
            MapFunc::MakeMap { key, value } => write!(f, "{{{:?}: {}}}", key, value),
            MapFunc::ConcatMaps(left, right) => write!(f, "concat_maps({}, {})", left, right),
            MapFunc::MakeArray(value) => write!(f, "[{}]", value),
            MapFunc::ConcatArrays(left, right) => write!(f, "concat_arrays({}, {})", left, right),
            MapFunc::Operator(app) => match app.operands.as_slice() {
                [operand] => write!(f, "{} {}", app.operator, operand),
                operands => {
                    write!(f, "(")?;
                    for (i, operand) in operands.iter().enumerate() {
                        if i > 0 {
                            write!(f, " {} ", app.operator)?;
                        }
                        write!(f, "{}", operand)?;
                    }
                    write!(f, ")")
                }
            },
            MapFunc::Cond {
                test,
                then,
                otherwise,
            } => write!(f, "CASE WHEN {} THEN {} ELSE {} END", test, then, otherwise),
        }
    }
}
