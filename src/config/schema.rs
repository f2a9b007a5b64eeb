//! Config schema and deserialization

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Starting point for the capability descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Triple grid, assessment and batch facets, conjunctive matching
    #[default]
    Rich,
    /// Single grid with one selected cell, backfire-risk tally
    Simple,
}

/// How behavior facets decide whether a story is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchPolicy {
    /// One behavior must satisfy benevolence, alignment and portrayal at once
    Conjunctive,
    /// Selected grid cell and portrayal facet are checked independently
    CellSelect,
}

/// Which summary tally the engine reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TallyKind {
    /// Success and failure story counts
    Assessment,
    /// Benevolent, misaligned, positively portrayed behaviors
    BackfireRisk,
}

/// Optional facet switches on top of the preset
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetOverrides {
    #[serde(default)]
    pub assessment: Option<bool>,
    #[serde(default)]
    pub batch: Option<bool>,
}

/// Root config structure for the engine
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Preset the remaining fields override. Default: rich
    #[serde(default)]
    pub preset: Preset,

    #[serde(default)]
    pub matching: Option<MatchPolicy>,

    #[serde(default)]
    pub tally: Option<TallyKind>,

    /// Allow the per-portrayal grid view
    #[serde(default)]
    pub triple_grid: Option<bool>,

    #[serde(default)]
    pub facets: FacetOverrides,
}

impl Config {
    /// Config for a preset with no overrides
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    /// Apply the overrides to the preset and validate the result
    pub fn resolve(&self) -> Result<Capabilities> {
        let base = match self.preset {
            Preset::Rich => Capabilities::rich(),
            Preset::Simple => Capabilities::simple(),
        };

        let caps = Capabilities {
            matching: self.matching.unwrap_or(base.matching),
            tally: self.tally.unwrap_or(base.tally),
            triple_grid: self.triple_grid.unwrap_or(base.triple_grid),
            assessment_facet: self.facets.assessment.unwrap_or(base.assessment_facet),
            batch_facet: self.facets.batch.unwrap_or(base.batch_facet),
        };

        if caps.triple_grid && caps.matching == MatchPolicy::CellSelect {
            anyhow::bail!("tripleGrid requires conjunctive matching");
        }

        Ok(caps)
    }
}

/// Filter dimensions a user can toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKind {
    Portrayal,
    Benevolence,
    Alignment,
    Genre,
    Assessment,
    Batch,
}

/// Effective capability descriptor (after applying overrides)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub matching: MatchPolicy,
    pub tally: TallyKind,
    pub triple_grid: bool,
    pub assessment_facet: bool,
    pub batch_facet: bool,
}

impl Capabilities {
    pub fn rich() -> Self {
        Self {
            matching: MatchPolicy::Conjunctive,
            tally: TallyKind::Assessment,
            triple_grid: true,
            assessment_facet: true,
            batch_facet: true,
        }
    }

    pub fn simple() -> Self {
        Self {
            matching: MatchPolicy::CellSelect,
            tally: TallyKind::BackfireRisk,
            triple_grid: false,
            assessment_facet: false,
            batch_facet: false,
        }
    }

    /// Whether the facet is exposed for toggling and takes part in filtering
    pub fn supports(&self, facet: FacetKind) -> bool {
        match facet {
            FacetKind::Portrayal | FacetKind::Genre => true,
            // Under cell selection the grid cell replaces these two facets
            FacetKind::Benevolence | FacetKind::Alignment => {
                self.matching == MatchPolicy::Conjunctive
            }
            FacetKind::Assessment => self.assessment_facet,
            FacetKind::Batch => self.batch_facet,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::rich()
    }
}
