//! Filter state and its updates
//!
//! Every update returns a new `FilterState`; the explorer swaps it in as one
//! atomic replacement.

use crate::config::{Capabilities, FacetKind, MatchPolicy};
use crate::dataset::Dataset;
use crate::{Alignment, Assessment, Axis, AxisSelector, Benevolence, Portrayal};
use serde::Serialize;
use std::collections::BTreeSet;

/// A clicked grid cell. Wildcard axes stand for row, column or grand totals;
/// `portrayal` is set only for cells of the per-portrayal grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridCell {
    pub benevolence: AxisSelector<Benevolence>,
    pub alignment: AxisSelector<Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portrayal: Option<Portrayal>,
}

impl GridCell {
    pub fn new(benevolence: Benevolence, alignment: Alignment) -> Self {
        Self {
            benevolence: AxisSelector::Only(benevolence),
            alignment: AxisSelector::Only(alignment),
            portrayal: None,
        }
    }

    pub fn with_portrayal(mut self, portrayal: Portrayal) -> Self {
        self.portrayal = Some(portrayal);
        self
    }
}

/// A single toggleable facet value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FacetValue {
    Portrayal(Portrayal),
    Benevolence(Benevolence),
    Alignment(Alignment),
    Genre(String),
    Assessment(Assessment),
    Batch(u32),
}

impl FacetValue {
    pub fn kind(&self) -> FacetKind {
        match self {
            FacetValue::Portrayal(_) => FacetKind::Portrayal,
            FacetValue::Benevolence(_) => FacetKind::Benevolence,
            FacetValue::Alignment(_) => FacetKind::Alignment,
            FacetValue::Genre(_) => FacetKind::Genre,
            FacetValue::Assessment(_) => FacetKind::Assessment,
            FacetValue::Batch(_) => FacetKind::Batch,
        }
    }
}

/// Active values of every facet. A facet holding its whole domain does not
/// restrict anything; an empty facet matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub portrayal: BTreeSet<Portrayal>,
    pub benevolence: BTreeSet<Benevolence>,
    pub alignment: BTreeSet<Alignment>,
    pub assessment: BTreeSet<Assessment>,
    pub batches: BTreeSet<u32>,
    pub genres: BTreeSet<String>,
    pub search: String,
    /// Single selected cell, used only under cell-select matching
    pub selected_cell: Option<GridCell>,
}

impl FilterState {
    /// Full default domain for every facet of the dataset
    pub fn initial(dataset: &Dataset) -> Self {
        Self {
            portrayal: Portrayal::full(),
            benevolence: Benevolence::full(),
            alignment: Alignment::full(),
            assessment: Assessment::full(),
            batches: dataset.batches().iter().copied().collect(),
            genres: dataset.genres().iter().cloned().collect(),
            search: String::new(),
            selected_cell: None,
        }
    }

    pub fn is_active(&self, value: &FacetValue) -> bool {
        match value {
            FacetValue::Portrayal(p) => self.portrayal.contains(p),
            FacetValue::Benevolence(b) => self.benevolence.contains(b),
            FacetValue::Alignment(a) => self.alignment.contains(a),
            FacetValue::Genre(g) => self.genres.contains(g),
            FacetValue::Assessment(s) => self.assessment.contains(s),
            FacetValue::Batch(n) => self.batches.contains(n),
        }
    }

    /// Add or remove one value from its facet
    pub fn with_facet(&self, value: &FacetValue, active: bool) -> Self {
        fn set<T: Ord + Clone>(values: &mut BTreeSet<T>, value: &T, active: bool) {
            if active {
                values.insert(value.clone());
            } else {
                values.remove(value);
            }
        }

        let mut next = self.clone();
        match value {
            FacetValue::Portrayal(p) => set(&mut next.portrayal, p, active),
            FacetValue::Benevolence(b) => set(&mut next.benevolence, b, active),
            FacetValue::Alignment(a) => set(&mut next.alignment, a, active),
            FacetValue::Genre(g) => set(&mut next.genres, g, active),
            FacetValue::Assessment(s) => set(&mut next.assessment, s, active),
            FacetValue::Batch(n) => set(&mut next.batches, n, active),
        }
        next
    }

    /// Flip membership of one facet value
    pub fn toggled(&self, value: &FacetValue) -> Self {
        self.with_facet(value, !self.is_active(value))
    }

    pub fn with_search(&self, search: &str) -> Self {
        Self {
            search: search.to_string(),
            ..self.clone()
        }
    }

    /// Show only one assessment bucket, or both again if it is already the only one
    pub fn focused_assessment(&self, bucket: Assessment) -> Self {
        let only = BTreeSet::from([bucket]);
        let assessment = if self.assessment == only {
            Assessment::full()
        } else {
            only
        };
        Self {
            assessment,
            ..self.clone()
        }
    }

    /// Reset the grid axes and the assessment facet, keeping genres, batches and search
    pub fn with_grid_cleared(&self) -> Self {
        Self {
            portrayal: Portrayal::full(),
            benevolence: Benevolence::full(),
            alignment: Alignment::full(),
            assessment: Assessment::full(),
            selected_cell: None,
            ..self.clone()
        }
    }

    /// Reset to the full domain exactly the axes a cell names
    pub fn with_axes_reset(&self, cell: &GridCell) -> Self {
        let mut next = self.clone();
        next.benevolence = Benevolence::full();
        next.alignment = Alignment::full();
        if cell.portrayal.is_some() {
            next.portrayal = Portrayal::full();
        }
        next
    }

    /// True while the cell's implied values are the sole active values on its axes
    fn is_sole_selection(&self, cell: &GridCell) -> bool {
        let portrayal_matches = match cell.portrayal {
            Some(p) => self.portrayal == BTreeSet::from([p]),
            None => true,
        };
        self.benevolence == cell.benevolence.implied()
            && self.alignment == cell.alignment.implied()
            && portrayal_matches
    }
}

/// Toggle a grid cell into or out of the filter.
///
/// Conjunctive matching narrows the cell's axes to its values (wildcards keep
/// the whole axis); clicking a cell that is already the sole selection resets
/// those axes. Cell-select matching swaps the single selected cell in or out.
pub fn apply_cell_selection(state: &FilterState, caps: &Capabilities, cell: GridCell) -> FilterState {
    match caps.matching {
        MatchPolicy::Conjunctive => {
            if state.is_sole_selection(&cell) {
                return state.with_axes_reset(&cell);
            }
            let mut next = state.clone();
            next.benevolence = cell.benevolence.implied();
            next.alignment = cell.alignment.implied();
            if let Some(p) = cell.portrayal {
                next.portrayal = BTreeSet::from([p]);
            }
            next
        }
        MatchPolicy::CellSelect => {
            let cell = GridCell {
                portrayal: None,
                ..cell
            };
            let selected_cell = if state.selected_cell == Some(cell) {
                None
            } else {
                Some(cell)
            };
            FilterState {
                selected_cell,
                ..state.clone()
            }
        }
    }
}
