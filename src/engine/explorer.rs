//! Explorer - owns the filter state and drives recomputation

use crate::config::Capabilities;
use crate::dataset::{Dataset, Story};
use crate::engine::filter::{group_by_genre, visible_stories, GenreGroup};
use crate::engine::grid::{
    aggregate, layout, single_counts, CellView, GridCounts, GridMode, GridView,
};
use crate::engine::state::{apply_cell_selection, FacetValue, FilterState, GridCell};
use crate::engine::tally::{backfire_risk, summary_tallies, Tallies};
use crate::{Assessment, Axis, Portrayal};
use serde::Serialize;
use tracing::debug;

type StateListener = Box<dyn FnMut(&FilterState)>;

/// Everything the presentation layer needs to redraw, computed in one pass
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub state: &'a FilterState,
    pub capabilities: Capabilities,
    pub grid_mode: GridMode,
    pub show_totals: bool,
    pub total_stories: usize,
    pub total_behaviors: usize,
    pub generated_date: &'a str,
    pub visible_count: usize,
    pub grid: GridView,
    pub cells: Vec<CellView>,
    pub tallies: Tallies,
    pub genres: Vec<GenreGroup<'a>>,
}

/// Filter-and-aggregation engine over one loaded dataset.
///
/// Owns the single `FilterState`. Every mutation replaces the state as a
/// whole and notifies subscribers, who redraw from `snapshot()`.
pub struct Explorer {
    dataset: Dataset,
    caps: Capabilities,
    state: FilterState,
    grid_mode: GridMode,
    show_totals: bool,
    listeners: Vec<StateListener>,
}

impl Explorer {
    pub fn new(dataset: Dataset, caps: Capabilities) -> Self {
        let state = FilterState::initial(&dataset);
        Self {
            dataset,
            caps,
            state,
            grid_mode: GridMode::Single,
            show_totals: false,
            listeners: Vec::new(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn grid_mode(&self) -> GridMode {
        self.grid_mode
    }

    pub fn show_totals(&self) -> bool {
        self.show_totals
    }

    /// Register a callback run after every state change
    pub fn subscribe(&mut self, listener: impl FnMut(&FilterState) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn visible_stories(&self) -> Vec<&Story> {
        visible_stories(&self.dataset, &self.state, &self.caps)
    }

    pub fn genre_groups(&self) -> Vec<GenreGroup<'_>> {
        group_by_genre(&self.visible_stories())
    }

    pub fn grid_counts(&self) -> GridView {
        aggregate(&self.visible_stories(), &self.state, &self.caps, self.grid_mode)
    }

    pub fn tallies(&self) -> Tallies {
        summary_tallies(&self.visible_stories(), &self.state, &self.caps)
    }

    /// Whole-dataset grid shown before any interaction, taken from the
    /// document's aggregates when it carries them
    pub fn initial_grid(&self) -> GridCounts {
        let by_category = &self.dataset.aggregate().by_category;
        if by_category.is_empty() {
            let stories: Vec<&Story> = self.dataset.stories().iter().collect();
            return single_counts(&stories, &Portrayal::full());
        }
        GridCounts::from_aggregate(by_category)
    }

    /// Whole-dataset backfire risk shown before any interaction, taken from
    /// the document's aggregates when it carries one
    pub fn initial_backfire_risk(&self) -> u64 {
        if let Some(count) = self.dataset.aggregate().backfire_risk {
            return count;
        }
        let stories: Vec<&Story> = self.dataset.stories().iter().collect();
        let state = FilterState::initial(&self.dataset);
        backfire_risk(&stories, &state) as u64
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let visible = self.visible_stories();
        let grid = aggregate(&visible, &self.state, &self.caps, self.grid_mode);
        Snapshot {
            state: &self.state,
            capabilities: self.caps,
            grid_mode: grid.mode(),
            show_totals: self.show_totals,
            total_stories: self.dataset.total_stories(),
            total_behaviors: self.dataset.total_behaviors(),
            generated_date: self.dataset.generated_date(),
            visible_count: visible.len(),
            cells: layout(&grid, &self.state, &self.caps),
            grid,
            tallies: summary_tallies(&visible, &self.state, &self.caps),
            genres: group_by_genre(&visible),
        }
    }

    /// Toggle one facet value. Returns false, leaving the state untouched,
    /// when the facet is not offered by the capabilities.
    pub fn toggle(&mut self, value: FacetValue) -> bool {
        if !self.caps.supports(value.kind()) {
            debug!(facet = ?value.kind(), "ignoring toggle of unsupported facet");
            return false;
        }
        let next = self.state.toggled(&value);
        self.replace_state(next, "toggle");
        true
    }

    pub fn select_cell(&mut self, cell: GridCell) {
        let next = apply_cell_selection(&self.state, &self.caps, cell);
        self.replace_state(next, "select_cell");
    }

    pub fn set_search(&mut self, search: &str) {
        let next = self.state.with_search(search);
        self.replace_state(next, "search");
    }

    /// Show only one assessment bucket, or both if it is already the only one
    pub fn focus_assessment(&mut self, bucket: Assessment) -> bool {
        if !self.caps.assessment_facet {
            return false;
        }
        let next = self.state.focused_assessment(bucket);
        self.replace_state(next, "focus_assessment");
        true
    }

    pub fn clear_grid_filter(&mut self) {
        let next = self.state.with_grid_cleared();
        self.replace_state(next, "clear_grid");
    }

    pub fn reset(&mut self) {
        let next = FilterState::initial(&self.dataset);
        self.replace_state(next, "reset");
    }

    /// Switch between single and per-portrayal grids; stays single when the
    /// capabilities do not offer the triple grid.
    pub fn toggle_grid_mode(&mut self) -> GridMode {
        self.grid_mode = match self.grid_mode {
            GridMode::Single if self.caps.triple_grid => GridMode::Triple,
            _ => GridMode::Single,
        };
        self.grid_mode
    }

    pub fn toggle_totals(&mut self) -> bool {
        self.show_totals = !self.show_totals;
        self.show_totals
    }

    fn replace_state(&mut self, next: FilterState, action: &'static str) {
        self.state = next;
        debug!(
            action,
            visible = self.visible_stories().len(),
            "filter state changed"
        );
        for listener in &mut self.listeners {
            listener(&self.state);
        }
    }
}

impl std::fmt::Debug for Explorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explorer")
            .field("stories", &self.dataset.stories().len())
            .field("caps", &self.caps)
            .field("state", &self.state)
            .field("grid_mode", &self.grid_mode)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
