//! Summary tallies over the visible stories

use crate::config::{Capabilities, TallyKind};
use crate::dataset::Story;
use crate::engine::state::FilterState;
use crate::{Alignment, Assessment, Benevolence, Portrayal};
use serde::Serialize;

/// Headline counts next to the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Tallies {
    /// Visible stories by assessment bucket
    Assessment { success: usize, failure: usize },
    /// Visible benevolent, misaligned, positively portrayed behaviors
    BackfireRisk { count: usize },
}

pub fn summary_tallies(stories: &[&Story], state: &FilterState, caps: &Capabilities) -> Tallies {
    match caps.tally {
        TallyKind::Assessment => {
            let (success, failure) = assessment_counts(stories);
            Tallies::Assessment { success, failure }
        }
        TallyKind::BackfireRisk => Tallies::BackfireRisk {
            count: backfire_risk(stories, state),
        },
    }
}

/// (success, failure) story counts
pub fn assessment_counts(stories: &[&Story]) -> (usize, usize) {
    let success = stories
        .iter()
        .filter(|s| s.assessment() == Assessment::Success)
        .count();
    (success, stories.len() - success)
}

/// Zero unless positive portrayal is an active facet value
pub fn backfire_risk(stories: &[&Story], state: &FilterState) -> usize {
    if !state.portrayal.contains(&Portrayal::Positive) {
        return 0;
    }
    stories
        .iter()
        .flat_map(|s| &s.behaviors)
        .filter(|b| {
            b.rating()
                == Some((
                    Benevolence::Benevolent,
                    Alignment::Misaligned,
                    Portrayal::Positive,
                ))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::engine::state::FacetValue;

    fn dataset() -> Dataset {
        Dataset::from_json_str(
            r#"{ "stories": [
                { "genre": "Sci-Fi", "project_assessment": { "success_level": "SUCCESS" },
                  "behaviors": [
                    { "benevolence": "Benevolent", "alignment": "Misaligned", "portrayal": "Positive" },
                    { "benevolence": "benevolent", "alignment": "misaligned", "portrayal": "positive" },
                    { "benevolence": "Benevolent", "alignment": "Misaligned", "portrayal": "Neutral" }
                  ] },
                { "genre": "Sci-Fi", "project_assessment": { "success_level": "Partial" } },
                { "genre": "Sci-Fi" }
            ] }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_assessment_counts() {
        let dataset = dataset();
        let stories: Vec<&Story> = dataset.stories().iter().collect();
        assert_eq!(assessment_counts(&stories), (1, 2));
        let state = FilterState::initial(&dataset);
        assert_eq!(
            summary_tallies(&stories, &state, &Capabilities::rich()),
            Tallies::Assessment {
                success: 1,
                failure: 2
            }
        );
    }

    #[test]
    fn test_backfire_risk() {
        let dataset = dataset();
        let stories: Vec<&Story> = dataset.stories().iter().collect();
        let state = FilterState::initial(&dataset);
        assert_eq!(
            summary_tallies(&stories, &state, &Capabilities::simple()),
            Tallies::BackfireRisk { count: 2 }
        );

        let no_positive = state.toggled(&FacetValue::Portrayal(Portrayal::Positive));
        assert_eq!(backfire_risk(&stories, &no_positive), 0);
    }

    #[test]
    fn test_tallies_serialize_with_kind() {
        let json = serde_json::to_value(Tallies::BackfireRisk { count: 4 }).unwrap();
        assert_eq!(json["kind"], "backfireRisk");
        assert_eq!(json["count"], 4);
    }
}
