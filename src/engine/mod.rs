//! Engine module - filtering and aggregation over a loaded dataset
//!
//! The free functions here are pure over `(dataset, state)`; [`Explorer`]
//! wraps them with the owned filter state and change notification.

pub mod explorer;
pub mod filter;
pub mod grid;
pub mod session;
pub mod state;
pub mod tally;

pub use explorer::{Explorer, Snapshot};
pub use filter::{group_by_genre, GenreGroup};
pub use grid::{CellView, GridCounts, GridMode, GridView, TripleGrid};
pub use session::Session;
pub use state::{apply_cell_selection, FacetValue, FilterState, GridCell};
pub use tally::Tallies;

use crate::config::Capabilities;
use crate::dataset::{Dataset, Story};

/// Stories visible under `state`, grouped by genre ascending
pub fn visible_stories<'a>(
    dataset: &'a Dataset,
    state: &FilterState,
    caps: &Capabilities,
) -> Vec<&'a Story> {
    filter::visible_stories(dataset, state, caps)
}

/// Behavior counts over the visible stories for the requested grid mode
pub fn grid_counts(
    dataset: &Dataset,
    state: &FilterState,
    caps: &Capabilities,
    mode: GridMode,
) -> GridView {
    let visible = filter::visible_stories(dataset, state, caps);
    grid::aggregate(&visible, state, caps, mode)
}

/// Headline tallies over the visible stories
pub fn summary_tallies(dataset: &Dataset, state: &FilterState, caps: &Capabilities) -> Tallies {
    let visible = filter::visible_stories(dataset, state, caps);
    tally::summary_tallies(&visible, state, caps)
}
