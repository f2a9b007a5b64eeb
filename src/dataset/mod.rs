//! Dataset loading for Storylens

mod schema;

pub use schema::{
    batch_from_file, AggregateStats, AnalysisDocument, Behavior, Character, Metadata,
    ProjectAssessment, Story, UNKNOWN_GENRE,
};

use crate::error::{LoadError, LoadResult};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Immutable, in-memory analysis loaded once at startup
#[derive(Debug, Clone)]
pub struct Dataset {
    metadata: Metadata,
    aggregate: AggregateStats,
    stories: Vec<Story>,
    /// Distinct genres, ascending
    genres: Vec<String>,
    /// Distinct batch numbers, ascending
    batches: Vec<u32>,
    /// Behaviors with at least one rating outside the closed axes
    unrated_behaviors: usize,
}

/// Load the analysis document from disk
pub fn load_dataset(path: &Path) -> LoadResult<Dataset> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    Dataset::from_json_str(&content)
}

impl Dataset {
    pub fn from_json_str(content: &str) -> LoadResult<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    pub fn from_reader<R: Read>(reader: R) -> LoadResult<Self> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_value(value)
    }

    /// Validate the document shape, then deserialize it
    pub fn from_value(value: Value) -> LoadResult<Self> {
        let Some(root) = value.as_object() else {
            return Err(LoadError::Schema("document root is not an object".into()));
        };
        match root.get("stories") {
            None => return Err(LoadError::Schema("missing `stories`".into())),
            Some(Value::Array(stories)) => {
                if let Some(idx) = stories.iter().position(|s| !s.is_object()) {
                    return Err(LoadError::Schema(format!(
                        "story #{} is not an object",
                        idx
                    )));
                }
            }
            Some(_) => return Err(LoadError::Schema("`stories` is not an array".into())),
        }

        let document: AnalysisDocument = serde_json::from_value(value)?;
        Ok(Self::from_document(document))
    }

    /// Build the dataset from an already-deserialized document
    pub fn from_document(document: AnalysisDocument) -> Self {
        let AnalysisDocument {
            metadata,
            aggregate_stats,
            mut stories,
        } = document;

        for story in &mut stories {
            story.normalize();
        }

        let genres: BTreeSet<String> = stories.iter().map(|s| s.genre.clone()).collect();
        let batches: BTreeSet<u32> = stories.iter().filter_map(|s| s.batch).collect();
        let behavior_total: usize = stories.iter().map(|s| s.behaviors.len()).sum();
        let unrated_behaviors = stories
            .iter()
            .flat_map(|s| &s.behaviors)
            .filter(|b| b.rating().is_none())
            .count();

        let mismatches = mismatched_totals(&metadata, stories.len(), behavior_total);
        for (total, declared, actual) in mismatches {
            warn!(total, declared, actual, "metadata total disagrees with document");
        }
        if unrated_behaviors > 0 {
            warn!(
                unrated_behaviors,
                "behaviors with unknown ratings are excluded from the grid"
            );
        }
        info!(
            stories = stories.len(),
            behaviors = behavior_total,
            genres = genres.len(),
            "analysis loaded"
        );

        Self {
            metadata,
            aggregate: aggregate_stats,
            stories,
            genres: genres.into_iter().collect(),
            batches: batches.into_iter().collect(),
            unrated_behaviors,
        }
    }

    /// Stories in document order
    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn aggregate(&self) -> &AggregateStats {
        &self.aggregate
    }

    /// Distinct genres observed in the stories, ascending
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    /// Distinct batch numbers observed in the stories, ascending
    pub fn batches(&self) -> &[u32] {
        &self.batches
    }

    /// Story total as declared by the document, else counted
    pub fn total_stories(&self) -> usize {
        self.metadata.total_stories.unwrap_or(self.stories.len())
    }

    /// Behavior total as declared by the document, else counted
    pub fn total_behaviors(&self) -> usize {
        self.metadata
            .total_behaviors
            .unwrap_or_else(|| self.stories.iter().map(|s| s.behaviors.len()).sum())
    }

    pub fn generated_date(&self) -> &str {
        &self.metadata.generated_date
    }

    /// Generation date, when the document uses `YYYY-MM-DD`
    pub fn generated_on(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.metadata.generated_date.trim(), "%Y-%m-%d").ok()
    }

    /// Number of stories per genre across the whole dataset
    pub fn genre_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for story in &self.stories {
            *counts.entry(story.genre.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Behaviors excluded from every grid cell because a rating is unknown
    pub fn unrated_behaviors(&self) -> usize {
        self.unrated_behaviors
    }
}

/// Declared metadata totals that differ from the counted ones, as
/// `(name, declared, actual)`
fn mismatched_totals(
    metadata: &Metadata,
    stories: usize,
    behaviors: usize,
) -> Vec<(&'static str, usize, usize)> {
    [
        ("stories", metadata.total_stories, stories),
        ("behaviors", metadata.total_behaviors, behaviors),
    ]
    .into_iter()
    .filter_map(|(name, declared, actual)| match declared {
        Some(declared) if declared != actual => Some((name, declared, actual)),
        _ => None,
    })
    .collect()
}
