//! Configuration parsing for Storylens
//!
//! The host passes the capability descriptor in as JSON; nothing is read from
//! disk or the environment.

mod schema;

pub use schema::{Capabilities, Config, FacetKind, FacetOverrides, MatchPolicy, Preset, TallyKind};

use anyhow::{Context, Result};
use serde_json::Value;

/// Parse a config document and resolve it to capabilities
pub fn parse_config(content: &str) -> Result<Capabilities> {
    let config: Config = serde_json::from_str(content).context("Invalid JSON in config")?;
    config.resolve().context("Inconsistent config")
}

/// Resolve capabilities from a config value embedded in a larger document
pub fn config_from_value(value: Value) -> Result<Capabilities> {
    let config: Config = serde_json::from_value(value).context("Invalid config value")?;
    config.resolve().context("Inconsistent config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_rich() {
        let caps = parse_config("{}").unwrap();
        assert_eq!(caps, Capabilities::rich());
        assert!(caps.supports(FacetKind::Batch));
        assert!(caps.supports(FacetKind::Benevolence));
    }

    #[test]
    fn test_simple_preset() {
        let caps = parse_config(r#"{ "preset": "simple" }"#).unwrap();
        assert_eq!(caps.matching, MatchPolicy::CellSelect);
        assert_eq!(caps.tally, TallyKind::BackfireRisk);
        assert!(!caps.supports(FacetKind::Assessment));
        assert!(!caps.supports(FacetKind::Benevolence));
        assert!(caps.supports(FacetKind::Portrayal));
    }

    #[test]
    fn test_overrides_apply_on_preset() {
        let caps = parse_config(
            r#"{
                "preset": "simple",
                "tally": "assessment",
                "facets": { "batch": true }
            }"#,
        )
        .unwrap();
        assert_eq!(caps.matching, MatchPolicy::CellSelect);
        assert_eq!(caps.tally, TallyKind::Assessment);
        assert!(caps.batch_facet);
        assert!(!caps.assessment_facet);
    }

    #[test]
    fn test_triple_grid_with_cell_select_rejected() {
        let err = parse_config(r#"{ "preset": "simple", "tripleGrid": true }"#).unwrap_err();
        assert!(format!("{:#}", err).contains("tripleGrid requires conjunctive matching"));
    }

    #[test]
    fn test_rich_without_triple_grid() {
        let caps = config_from_value(serde_json::json!({
            "matching": "conjunctive",
            "tripleGrid": false,
            "facets": { "assessment": false }
        }))
        .unwrap();
        assert!(!caps.triple_grid);
        assert!(!caps.supports(FacetKind::Assessment));
    }

    #[test]
    fn test_unknown_preset_rejected() {
        assert!(parse_config(r#"{ "preset": "deluxe" }"#).is_err());
    }
}
