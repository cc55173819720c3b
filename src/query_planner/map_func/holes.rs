//! Hole types: what a [`MapFunc`](super::MapFunc) is a function *of*.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The single input of a [`FreeMap`](super::FreeMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hole;

/// Sides of an explicit binary join (`ThetaJoin` conditions and combiners).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JoinSide {
    LeftSide,
    RightSide,
}

/// Inputs of an implicit binary auto-join combiner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BinarySide {
    Left,
    Right,
}

/// Inputs of an implicit ternary auto-join combiner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TernarySide {
    Left,
    Center,
    Right,
}

/// Reference to a bucket or reducer output inside a reduce repair function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReduceIndex {
    Bucket(usize),
    Reducer(usize),
}

impl From<BinarySide> for JoinSide {
    fn from(side: BinarySide) -> Self {
        match side {
            BinarySide::Left => JoinSide::LeftSide,
            BinarySide::Right => JoinSide::RightSide,
        }
    }
}

impl fmt::Display for Hole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SrcHole")
    }
}

impl fmt::Display for JoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinSide::LeftSide => write!(f, "LeftSide"),
            JoinSide::RightSide => write!(f, "RightSide"),
        }
    }
}

impl fmt::Display for BinarySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinarySide::Left => write!(f, "Left"),
            BinarySide::Right => write!(f, "Right"),
        }
    }
}

impl fmt::Display for TernarySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TernarySide::Left => write!(f, "Left3"),
            TernarySide::Center => write!(f, "Center"),
            TernarySide::Right => write!(f, "Right3"),
        }
    }
}

impl fmt::Display for ReduceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReduceIndex::Bucket(i) => write!(f, "bucket[{}]", i),
            ReduceIndex::Reducer(i) => write!(f, "reducer[{}]", i),
        }
    }
}
