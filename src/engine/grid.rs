//! Benevolence by alignment grid aggregation

use crate::config::{Capabilities, MatchPolicy};
use crate::dataset::Story;
use crate::engine::state::{FilterState, GridCell};
use crate::{category_key, parse_category_key, Alignment, Axis, AxisSelector, Benevolence, Portrayal};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Which grid the presentation shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GridMode {
    /// One grid over behaviors whose portrayal is active
    #[default]
    Single,
    /// One grid per portrayal value
    Triple,
}

/// Behavior counts for the nine (benevolence, alignment) cells.
///
/// Row, column and grand totals are always derived from the cells, never
/// stored, so they cannot drift from what the cells show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridCounts {
    cells: [[u64; 3]; 3],
}

impl GridCounts {
    pub fn add(&mut self, benevolence: Benevolence, alignment: Alignment) {
        let cell = &mut self.cells[benevolence.index()][alignment.index()];
        *cell = cell.saturating_add(1);
    }

    pub fn get(&self, benevolence: Benevolence, alignment: Alignment) -> u64 {
        self.cells[benevolence.index()][alignment.index()]
    }

    /// Count under a pair of selectors; wildcards sum the whole axis.
    /// Sums saturate at `u64::MAX`.
    pub fn count(
        &self,
        benevolence: AxisSelector<Benevolence>,
        alignment: AxisSelector<Alignment>,
    ) -> u64 {
        let mut total: u64 = 0;
        for b in Benevolence::ALL {
            for a in Alignment::ALL {
                if benevolence.admits(b) && alignment.admits(a) {
                    total = total.saturating_add(self.get(b, a));
                }
            }
        }
        total
    }

    pub fn row_total(&self, benevolence: Benevolence) -> u64 {
        self.count(AxisSelector::Only(benevolence), AxisSelector::Any)
    }

    pub fn column_total(&self, alignment: Alignment) -> u64 {
        self.count(AxisSelector::Any, AxisSelector::Only(alignment))
    }

    pub fn grand_total(&self) -> u64 {
        self.count(AxisSelector::Any, AxisSelector::Any)
    }

    /// All nine cells keyed `benevolence_alignment`, zeros included
    pub fn keyed(&self) -> BTreeMap<String, u64> {
        let mut keyed = BTreeMap::new();
        for b in Benevolence::ALL {
            for a in Alignment::ALL {
                keyed.insert(category_key(b, a), self.get(b, a));
            }
        }
        keyed
    }

    /// Grid from a precomputed `by_category` table. Unknown keys are skipped;
    /// keys differing only in case add into the same cell.
    pub fn from_aggregate(by_category: &BTreeMap<String, u64>) -> Self {
        let mut grid = Self::default();
        for (key, count) in by_category {
            if let Some((b, a)) = parse_category_key(key) {
                let cell = &mut grid.cells[b.index()][a.index()];
                *cell = cell.saturating_add(*count);
            }
        }
        grid
    }
}

impl Serialize for GridCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let keyed = self.keyed();
        let mut map = serializer.serialize_map(Some(keyed.len()))?;
        for (key, count) in &keyed {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

/// One grid per portrayal value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TripleGrid {
    by_portrayal: [GridCounts; 3],
}

impl TripleGrid {
    pub fn get(&self, portrayal: Portrayal) -> &GridCounts {
        &self.by_portrayal[portrayal.index()]
    }

    /// Collapse the per-portrayal grids over the given portrayal values
    pub fn combined(&self, portrayal: &BTreeSet<Portrayal>) -> GridCounts {
        let mut combined = GridCounts::default();
        for p in portrayal {
            let grid = self.get(*p);
            for b in Benevolence::ALL {
                for a in Alignment::ALL {
                    let cell = &mut combined.cells[b.index()][a.index()];
                    *cell = cell.saturating_add(grid.get(b, a));
                }
            }
        }
        combined
    }
}

impl Serialize for TripleGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Portrayal::ALL.len()))?;
        for p in Portrayal::ALL {
            map.serialize_entry(p.as_str(), self.get(p))?;
        }
        map.end()
    }
}

/// Counts for the grid mode on display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "counts", rename_all = "lowercase")]
pub enum GridView {
    Single(GridCounts),
    Triple(TripleGrid),
}

impl GridView {
    pub fn mode(&self) -> GridMode {
        match self {
            GridView::Single(_) => GridMode::Single,
            GridView::Triple(_) => GridMode::Triple,
        }
    }

    /// Count for one cell of the current layout. A portrayal on the cell
    /// picks the sub-grid in triple mode and is ignored in single mode.
    pub fn count(&self, cell: &GridCell) -> u64 {
        match (self, cell.portrayal) {
            (GridView::Single(grid), _) => grid.count(cell.benevolence, cell.alignment),
            (GridView::Triple(grids), Some(p)) => {
                grids.get(p).count(cell.benevolence, cell.alignment)
            }
            (GridView::Triple(grids), None) => Portrayal::ALL
                .into_iter()
                .map(|p| grids.get(p).count(cell.benevolence, cell.alignment))
                .fold(0, u64::saturating_add),
        }
    }
}

/// Count behaviors of the given stories whose portrayal is active
pub fn single_counts(stories: &[&Story], portrayal: &BTreeSet<Portrayal>) -> GridCounts {
    let mut grid = GridCounts::default();
    for behavior in stories.iter().flat_map(|s| &s.behaviors) {
        let Some((b, a, p)) = behavior.rating() else {
            continue;
        };
        if portrayal.contains(&p) {
            grid.add(b, a);
        }
    }
    grid
}

/// Count behaviors of the given stories separately per portrayal value
pub fn triple_counts(stories: &[&Story]) -> TripleGrid {
    let mut grids = TripleGrid::default();
    for behavior in stories.iter().flat_map(|s| &s.behaviors) {
        if let Some((b, a, p)) = behavior.rating() {
            grids.by_portrayal[p.index()].add(b, a);
        }
    }
    grids
}

/// Aggregate the visible stories for the requested mode. Triple mode falls
/// back to single when the capabilities do not offer it.
pub fn aggregate(
    stories: &[&Story],
    state: &FilterState,
    caps: &Capabilities,
    mode: GridMode,
) -> GridView {
    match mode {
        GridMode::Triple if caps.triple_grid => GridView::Triple(triple_counts(stories)),
        _ => GridView::Single(single_counts(stories, &state.portrayal)),
    }
}

/// Whether a cell is highlighted as part of the current selection
pub fn is_cell_selected(state: &FilterState, caps: &Capabilities, cell: &GridCell) -> bool {
    match caps.matching {
        MatchPolicy::Conjunctive => {
            let benevolence = match cell.benevolence {
                AxisSelector::Any => true,
                AxisSelector::Only(b) => state.benevolence.contains(&b),
            };
            let alignment = match cell.alignment {
                AxisSelector::Any => true,
                AxisSelector::Only(a) => state.alignment.contains(&a),
            };
            let portrayal = cell
                .portrayal
                .map_or(true, |p| state.portrayal.contains(&p));
            benevolence && alignment && portrayal
        }
        MatchPolicy::CellSelect => state.selected_cell.as_ref() == Some(cell),
    }
}

/// One drawable grid cell, totals included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellView {
    #[serde(flatten)]
    pub cell: GridCell,
    pub count: u64,
    pub selected: bool,
}

/// Every cell of the current layout: a 4x4 block (three values plus the
/// wildcard total on each axis), repeated per portrayal in triple mode.
pub fn layout(view: &GridView, state: &FilterState, caps: &Capabilities) -> Vec<CellView> {
    let portrayals: Vec<Option<Portrayal>> = match view {
        GridView::Single(_) => vec![None],
        GridView::Triple(_) => Portrayal::ALL.into_iter().map(Some).collect(),
    };

    let mut cells = Vec::with_capacity(portrayals.len() * 16);
    for portrayal in portrayals {
        for benevolence in AxisSelector::<Benevolence>::with_total() {
            for alignment in AxisSelector::<Alignment>::with_total() {
                let cell = GridCell {
                    benevolence,
                    alignment,
                    portrayal,
                };
                cells.push(CellView {
                    cell,
                    count: view.count(&cell),
                    selected: is_cell_selected(state, caps, &cell),
                });
            }
        }
    }
    cells
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::dataset::{AnalysisDocument, Behavior, Dataset};
    use crate::engine::filter::visible_stories;
    use proptest::prelude::*;

    /// Raw rating strings, mostly valid with the occasional unknown value
    fn raw_rating(valid: &'static [&'static str]) -> impl Strategy<Value = String> {
        prop_oneof![
            8 => prop::sample::select(valid).prop_map(str::to_string),
            1 => Just("Unclear".to_string()),
        ]
    }

    fn arbitrary_behavior() -> impl Strategy<Value = Behavior> {
        (
            raw_rating(&["Benevolent", "ambiguous", "MALEVOLENT"]),
            raw_rating(&["Aligned", "Ambiguous", "misaligned"]),
            raw_rating(&["Positive", "neutral", "Negative"]),
        )
            .prop_map(|(benevolence, alignment, portrayal)| Behavior {
                benevolence,
                alignment,
                portrayal,
                ..Behavior::default()
            })
    }

    fn arbitrary_dataset() -> impl Strategy<Value = Dataset> {
        prop::collection::vec(
            (
                prop::sample::select(vec!["Drama", "Horror", "Satire"]),
                prop::collection::vec(arbitrary_behavior(), 0..5),
            ),
            0..12,
        )
        .prop_map(|stories| {
            let stories = stories
                .into_iter()
                .map(|(genre, behaviors)| Story {
                    genre: genre.to_string(),
                    behaviors,
                    ..Story::default()
                })
                .collect();
            Dataset::from_document(AnalysisDocument {
                metadata: Default::default(),
                aggregate_stats: Default::default(),
                stories,
            })
        })
    }

    fn subset<T: Axis>() -> impl Strategy<Value = BTreeSet<T>> {
        prop::sample::subsequence(T::ALL.to_vec(), 0..=3)
            .prop_map(|values| values.into_iter().collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn grand_total_counts_visible_active_behaviors(
            dataset in arbitrary_dataset(),
            benevolence in subset::<Benevolence>(),
            alignment in subset::<Alignment>(),
            portrayal in subset::<Portrayal>(),
        ) {
            let caps = Capabilities::rich();
            let mut state = FilterState::initial(&dataset);
            state.benevolence = benevolence;
            state.alignment = alignment;
            state.portrayal = portrayal;

            let visible = visible_stories(&dataset, &state, &caps);
            let expected = visible
                .iter()
                .flat_map(|s| &s.behaviors)
                .filter(|b| b.rating().is_some_and(|(_, _, p)| state.portrayal.contains(&p)))
                .count() as u64;

            let GridView::Single(grid) = aggregate(&visible, &state, &caps, GridMode::Single) else {
                panic!("single mode must produce a single grid");
            };
            prop_assert_eq!(grid.grand_total(), expected);

            let rows: u64 = Benevolence::ALL.iter().map(|b| grid.row_total(*b)).sum();
            prop_assert_eq!(rows, grid.grand_total());
        }

        #[test]
        fn triple_grids_sum_to_full_single_grid(dataset in arbitrary_dataset()) {
            let caps = Capabilities::rich();
            let state = FilterState::initial(&dataset);
            let visible = visible_stories(&dataset, &state, &caps);
            let triple = triple_counts(&visible);
            prop_assert_eq!(
                triple.combined(&Portrayal::full()),
                single_counts(&visible, &Portrayal::full())
            );
        }
    }
}
