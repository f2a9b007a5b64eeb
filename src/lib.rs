//! Storylens: behavior browser engine for story analyses
//!
//! This library loads a pre-computed analysis of fictional stories and the
//! behaviors of their AI characters, and provides the filter-and-aggregation
//! engine a presentation layer drives: faceted filtering, a benevolence by
//! alignment grid (optionally split by portrayal) and summary tallies.

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod reporter;

pub use config::{Capabilities, Config, MatchPolicy, TallyKind};
pub use dataset::{Behavior, Character, Dataset, Story};
pub use engine::{Explorer, FilterState, GridMode, Session};
pub use error::{LoadError, LoadResult};

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;

/// One of the three closed rating axes of a behavior.
///
/// Raw values in the document may use any casing; `parse` lowercases before
/// matching and returns `None` for anything outside the closed set.
pub trait Axis: Copy + Ord + std::fmt::Debug + 'static {
    /// Every value of the axis, in grid order
    const ALL: [Self; 3];

    /// Lowercase wire name
    fn as_str(&self) -> &'static str;

    /// Position in `ALL`, used as the grid index
    fn index(&self) -> usize;

    fn parse(raw: &str) -> Option<Self> {
        let lower = raw.to_lowercase();
        Self::ALL.into_iter().find(|v| v.as_str() == lower)
    }

    /// The full domain of the axis as a set
    fn full() -> BTreeSet<Self> {
        Self::ALL.into_iter().collect()
    }
}

/// Intent of a behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Benevolence {
    Benevolent,
    Ambiguous,
    Malevolent,
}

impl Axis for Benevolence {
    const ALL: [Self; 3] = [
        Benevolence::Benevolent,
        Benevolence::Ambiguous,
        Benevolence::Malevolent,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Benevolence::Benevolent => "benevolent",
            Benevolence::Ambiguous => "ambiguous",
            Benevolence::Malevolent => "malevolent",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Effect of a behavior relative to human intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Aligned,
    Ambiguous,
    Misaligned,
}

impl Axis for Alignment {
    const ALL: [Self; 3] = [
        Alignment::Aligned,
        Alignment::Ambiguous,
        Alignment::Misaligned,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Alignment::Aligned => "aligned",
            Alignment::Ambiguous => "ambiguous",
            Alignment::Misaligned => "misaligned",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// How the narrative frames a behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Portrayal {
    Positive,
    Neutral,
    Negative,
}

impl Axis for Portrayal {
    const ALL: [Self; 3] = [Portrayal::Positive, Portrayal::Neutral, Portrayal::Negative];

    fn as_str(&self) -> &'static str {
        match self {
            Portrayal::Positive => "positive",
            Portrayal::Neutral => "neutral",
            Portrayal::Negative => "negative",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

macro_rules! impl_axis_display {
    ($($ty:ty),*) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

impl_axis_display!(Benevolence, Alignment, Portrayal);

/// Story outcome bucket used for filtering: anything that is not exactly
/// "success" (case-insensitive) counts as a failure, including a missing level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assessment {
    Success,
    Failure,
}

impl Assessment {
    pub const ALL: [Assessment; 2] = [Assessment::Success, Assessment::Failure];

    pub fn from_level(level: Option<&str>) -> Self {
        match level {
            Some(l) if l.to_lowercase() == "success" => Assessment::Success,
            _ => Assessment::Failure,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Assessment::Success => "success",
            Assessment::Failure => "failure",
        }
    }

    pub fn full() -> BTreeSet<Self> {
        Self::ALL.into_iter().collect()
    }
}

impl std::fmt::Display for Assessment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grid-side selector for one axis: a concrete value, or the "any" wildcard
/// that stands for the whole axis (row/column totals).
///
/// The wildcard never appears in data and never compares equal to an axis value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisSelector<T: Axis> {
    Any,
    Only(T),
}

impl<T: Axis> AxisSelector<T> {
    /// Whether a concrete value falls under this selector
    pub fn admits(&self, value: T) -> bool {
        match self {
            AxisSelector::Any => true,
            AxisSelector::Only(v) => *v == value,
        }
    }

    /// The facet values this selector implies: the full axis for `Any`
    pub fn implied(&self) -> BTreeSet<T> {
        match self {
            AxisSelector::Any => T::full(),
            AxisSelector::Only(v) => BTreeSet::from([*v]),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AxisSelector::Any => "any",
            AxisSelector::Only(v) => v.as_str(),
        }
    }

    /// Selectors for every grid column or row, wildcard last
    pub fn with_total() -> [AxisSelector<T>; 4] {
        let [a, b, c] = T::ALL;
        [
            AxisSelector::Only(a),
            AxisSelector::Only(b),
            AxisSelector::Only(c),
            AxisSelector::Any,
        ]
    }
}

impl<T: Axis> Serialize for AxisSelector<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Grid key for a (benevolence, alignment) pair, e.g. `benevolent_misaligned`
pub fn category_key(benevolence: Benevolence, alignment: Alignment) -> String {
    format!("{}_{}", benevolence.as_str(), alignment.as_str())
}

/// Inverse of [`category_key`]; `None` for keys outside the nine categories
pub fn parse_category_key(key: &str) -> Option<(Benevolence, Alignment)> {
    let (b, a) = key.split_once('_')?;
    Some((Benevolence::parse(b)?, Alignment::parse(a)?))
}
