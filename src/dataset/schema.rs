//! Analysis document schema and deserialization
//!
//! The document is produced by an LLM-driven pipeline, so every field except
//! `stories` is tolerated when missing, `null` or of the wrong type: arrays
//! become empty, strings become empty, optional values become `None`. A bad
//! field never fails the whole load.

use crate::{Alignment, Assessment, Axis, Benevolence, Portrayal};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Genre assigned to stories whose genre is missing or blank
pub const UNKNOWN_GENRE: &str = "Unknown";

/// Treat `null` or a value of the wrong type like a missing field
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Root of the analysis document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisDocument {
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Metadata,
    #[serde(default, deserialize_with = "lenient")]
    pub aggregate_stats: AggregateStats,
    pub stories: Vec<Story>,
}

/// Document-level metadata written by the aggregation step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, deserialize_with = "lenient")]
    pub total_stories: Option<usize>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_behaviors: Option<usize>,
    #[serde(default, deserialize_with = "lenient")]
    pub generated_date: String,
}

/// Whole-dataset aggregates, computed before any filtering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Behavior counts keyed by `benevolence_alignment`
    #[serde(default, deserialize_with = "lenient")]
    pub by_category: BTreeMap<String, u64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub backfire_risk: Option<u64>,
}

/// Outcome judgement for a story
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectAssessment {
    #[serde(default, deserialize_with = "lenient")]
    pub success_level: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// An AI character appearing in a story
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Character {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub character_type: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub overall_benevolence: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub overall_alignment: Option<String>,
}

/// A single rated behavior of an AI character.
///
/// Ratings keep the casing found in the document; the typed accessors
/// normalize and return `None` for values outside the closed axes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Behavior {
    #[serde(default, deserialize_with = "lenient")]
    pub character: String,
    #[serde(default, deserialize_with = "lenient")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub benevolence: String,
    #[serde(default, deserialize_with = "lenient")]
    pub alignment: String,
    #[serde(default, deserialize_with = "lenient")]
    pub portrayal: String,
}

impl Behavior {
    pub fn benevolence(&self) -> Option<Benevolence> {
        Benevolence::parse(&self.benevolence)
    }

    pub fn alignment(&self) -> Option<Alignment> {
        Alignment::parse(&self.alignment)
    }

    pub fn portrayal(&self) -> Option<Portrayal> {
        Portrayal::parse(&self.portrayal)
    }

    /// The grid cell this behavior falls into, if both ratings are known
    pub fn category(&self) -> Option<(Benevolence, Alignment)> {
        Some((self.benevolence()?, self.alignment()?))
    }

    /// All three ratings, if every one of them is known
    pub fn rating(&self) -> Option<(Benevolence, Alignment, Portrayal)> {
        Some((self.benevolence()?, self.alignment()?, self.portrayal()?))
    }
}

/// One analyzed story. Identity is its position in the dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Story {
    /// Source path of the story, `<batch dir>/<name>.md`
    #[serde(default, deserialize_with = "lenient")]
    pub file: String,
    #[serde(
        rename = "story_title",
        default,
        deserialize_with = "lenient"
    )]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub genre: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub genre_description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub batch: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub project_assessment: ProjectAssessment,
    #[serde(
        rename = "ai_characters",
        default,
        deserialize_with = "lenient"
    )]
    pub characters: Vec<Character>,
    #[serde(default, deserialize_with = "lenient")]
    pub behaviors: Vec<Behavior>,
    /// Raw markdown reports keyed by report name
    #[serde(default, deserialize_with = "lenient")]
    pub reports: BTreeMap<String, String>,
}

impl Story {
    /// Success/failure bucket used by the assessment facet
    pub fn assessment(&self) -> Assessment {
        Assessment::from_level(self.project_assessment.success_level.as_deref())
    }

    /// Freeform lowercase outcome label (`success`, `backfire`, ...), `unknown` when absent
    pub fn assessment_label(&self) -> String {
        match self.project_assessment.success_level.as_deref() {
            Some(level) if !level.trim().is_empty() => level.to_lowercase(),
            _ => "unknown".to_string(),
        }
    }

    /// Fill in the genre and batch when the document leaves them out
    pub(crate) fn normalize(&mut self) {
        if self.genre.trim().is_empty() {
            self.genre = UNKNOWN_GENRE.to_string();
        }
        if self.batch.is_none() {
            self.batch = batch_from_file(&self.file);
        }
    }
}

/// Batch number from the leading digits of the batch directory,
/// e.g. `"2 Claude 500/story.md"` is batch 2.
pub fn batch_from_file(file: &str) -> Option<u32> {
    let (dir, _) = file.split_once('/')?;
    let digits: String = dir.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
