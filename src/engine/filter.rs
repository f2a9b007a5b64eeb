//! Story visibility: facet predicates, search and genre grouping

use crate::config::{Capabilities, MatchPolicy};
use crate::dataset::{Dataset, Story};
use crate::engine::state::FilterState;
use crate::{Assessment, Axis, Portrayal};
use serde::Serialize;

/// Stories passing every active facet, grouped by genre (ascending) with
/// document order kept inside each genre.
pub fn visible_stories<'a>(
    dataset: &'a Dataset,
    state: &FilterState,
    caps: &Capabilities,
) -> Vec<&'a Story> {
    let needle = state.search.to_lowercase();
    let batches_unrestricted = state.batches.iter().eq(dataset.batches().iter());

    let mut visible: Vec<&Story> = dataset
        .stories()
        .iter()
        .filter(|story| {
            if !state.genres.contains(&story.genre) {
                return false;
            }
            if caps.batch_facet {
                let in_batch = match story.batch {
                    Some(batch) => state.batches.contains(&batch),
                    None => batches_unrestricted,
                };
                if !in_batch {
                    return false;
                }
            }
            if caps.assessment_facet && !state.assessment.contains(&story.assessment()) {
                return false;
            }
            if !needle.is_empty() && !matches_search(story, &needle) {
                return false;
            }
            matches_behaviors(story, state, caps)
        })
        .collect();

    // Stable: keeps document order within a genre
    visible.sort_by(|a, b| a.genre.cmp(&b.genre));
    visible
}

/// Case-insensitive substring search over title, characters and behaviors.
/// `needle` must already be lowercase.
pub fn matches_search(story: &Story, needle: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(needle);

    contains(&story.title)
        || story.characters.iter().any(|c| {
            contains(&c.name) || c.description.as_deref().is_some_and(contains)
        })
        || story.behaviors.iter().any(|b| {
            contains(&b.description) || b.quote.as_deref().is_some_and(contains)
        })
}

/// Behavior-facet check under the configured matching policy
pub fn matches_behaviors(story: &Story, state: &FilterState, caps: &Capabilities) -> bool {
    match caps.matching {
        MatchPolicy::Conjunctive => story.behaviors.iter().any(|b| {
            b.rating().is_some_and(|(benevolence, alignment, portrayal)| {
                state.benevolence.contains(&benevolence)
                    && state.alignment.contains(&alignment)
                    && state.portrayal.contains(&portrayal)
            })
        }),
        MatchPolicy::CellSelect => {
            if let Some(cell) = state.selected_cell {
                let in_cell = story.behaviors.iter().any(|b| {
                    b.category().is_some_and(|(benevolence, alignment)| {
                        cell.benevolence.admits(benevolence) && cell.alignment.admits(alignment)
                    })
                });
                if !in_cell {
                    return false;
                }
            }
            if state.portrayal.len() < Portrayal::ALL.len() {
                return story.behaviors.iter().any(|b| {
                    b.portrayal()
                        .is_some_and(|portrayal| state.portrayal.contains(&portrayal))
                });
            }
            true
        }
    }
}

/// Visible stories of one genre with its section stats
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreGroup<'a> {
    pub genre: &'a str,
    pub stories: Vec<&'a Story>,
    pub behaviors: usize,
    pub success: usize,
    pub failure: usize,
}

/// Split an already genre-ordered story list into per-genre sections
pub fn group_by_genre<'a>(stories: &[&'a Story]) -> Vec<GenreGroup<'a>> {
    let mut groups: Vec<GenreGroup<'a>> = Vec::new();
    for &story in stories {
        if groups.last().map_or(true, |g| g.genre != story.genre) {
            groups.push(GenreGroup {
                genre: &story.genre,
                stories: Vec::new(),
                behaviors: 0,
                success: 0,
                failure: 0,
            });
        }
        if let Some(group) = groups.last_mut() {
            group.behaviors += story.behaviors.len();
            match story.assessment() {
                Assessment::Success => group.success += 1,
                Assessment::Failure => group.failure += 1,
            }
            group.stories.push(story);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::{FacetValue, GridCell};
    use crate::{Alignment, AxisSelector, Benevolence};

    const DOC: &str = r#"{ "stories": [
        { "story_title": "Signal Fire", "genre": "Thriller", "batch": 0,
          "project_assessment": { "success_level": "Success" },
          "ai_characters": [{ "name": "ARGUS", "description": "A coastal defense net" }],
          "behaviors": [
            { "description": "Warns the harbor", "quote": "Lights out at nine.",
              "benevolence": "Benevolent", "alignment": "Aligned", "portrayal": "Positive" },
            { "description": "Locks the doors",
              "benevolence": "Ambiguous", "alignment": "Misaligned", "portrayal": "Negative" }
          ] },
        { "story_title": "Quiet Hours", "genre": "Drama", "batch": 1,
          "project_assessment": { "success_level": "Backfire" },
          "behaviors": [
            { "description": "Edits the diary",
              "benevolence": "malevolent", "alignment": "MISALIGNED", "portrayal": "neutral" }
          ] },
        { "story_title": "Empty Room", "genre": "Drama", "batch": 1, "behaviors": [] },
        { "story_title": "Second Draft", "genre": "Drama", "batch": 2,
          "behaviors": [
            { "description": "Helps revise",
              "benevolence": "Benevolent", "alignment": "Aligned", "portrayal": "Neutral" }
          ] }
    ] }"#;

    fn titles(stories: &[&Story]) -> Vec<String> {
        stories.iter().map(|s| s.title.clone()).collect()
    }

    fn setup() -> (Dataset, FilterState) {
        let dataset = Dataset::from_json_str(DOC).unwrap();
        let state = FilterState::initial(&dataset);
        (dataset, state)
    }

    #[test]
    fn test_defaults_group_by_genre_and_drop_empty() {
        let (dataset, state) = setup();
        let visible = visible_stories(&dataset, &state, &Capabilities::rich());
        assert_eq!(titles(&visible), ["Quiet Hours", "Second Draft", "Signal Fire"]);
    }

    #[test]
    fn test_conjunctive_needs_single_behavior() {
        let (dataset, state) = setup();
        // Signal Fire has benevolent-aligned-positive and ambiguous-misaligned-negative,
        // but no single benevolent + negative behavior.
        let state = state
            .toggled(&FacetValue::Benevolence(Benevolence::Ambiguous))
            .toggled(&FacetValue::Benevolence(Benevolence::Malevolent))
            .toggled(&FacetValue::Portrayal(Portrayal::Positive))
            .toggled(&FacetValue::Portrayal(Portrayal::Neutral));
        let visible = visible_stories(&dataset, &state, &Capabilities::rich());
        assert!(visible.is_empty(), "got {:?}", titles(&visible));
    }

    #[test]
    fn test_batch_and_assessment_facets() {
        let (dataset, state) = setup();
        let caps = Capabilities::rich();
        let no_batch_one = state.toggled(&FacetValue::Batch(1));
        assert_eq!(
            titles(&visible_stories(&dataset, &no_batch_one, &caps)),
            ["Second Draft", "Signal Fire"]
        );
        let success_only = state.focused_assessment(Assessment::Success);
        assert_eq!(
            titles(&visible_stories(&dataset, &success_only, &caps)),
            ["Signal Fire"]
        );
    }

    #[test]
    fn test_facets_ignored_when_not_exposed() {
        let (dataset, state) = setup();
        let state = state
            .toggled(&FacetValue::Batch(0))
            .toggled(&FacetValue::Batch(1))
            .toggled(&FacetValue::Batch(2));
        let visible = visible_stories(&dataset, &state, &Capabilities::simple());
        assert_eq!(visible.len(), 4);
    }

    #[test]
    fn test_search_fields() {
        let (dataset, state) = setup();
        let caps = Capabilities::rich();
        for needle in ["signal", "SIGNAL", "argus", "coastal", "harbor", "lights out"] {
            let visible = visible_stories(&dataset, &state.with_search(needle), &caps);
            assert_eq!(titles(&visible), ["Signal Fire"], "search {:?}", needle);
        }
        let none = visible_stories(&dataset, &state.with_search("xyz123"), &caps);
        assert!(none.is_empty());
    }

    #[test]
    fn test_cell_select_policy() {
        let (dataset, mut state) = setup();
        let caps = Capabilities::simple();
        state.selected_cell = Some(GridCell::new(Benevolence::Benevolent, Alignment::Aligned));
        let visible = visible_stories(&dataset, &state, &caps);
        assert_eq!(titles(&visible), ["Second Draft", "Signal Fire"]);

        // Portrayal is checked independently from the cell
        let state = state.toggled(&FacetValue::Portrayal(Portrayal::Neutral));
        let visible = visible_stories(&dataset, &state, &caps);
        assert_eq!(titles(&visible), ["Signal Fire"]);
    }

    #[test]
    fn test_cell_select_row_total() {
        let (dataset, mut state) = setup();
        state.selected_cell = Some(GridCell {
            benevolence: AxisSelector::Only(Benevolence::Malevolent),
            alignment: AxisSelector::Any,
            portrayal: None,
        });
        let visible = visible_stories(&dataset, &state, &Capabilities::simple());
        assert_eq!(titles(&visible), ["Quiet Hours"]);
    }

    #[test]
    fn test_cell_select_keeps_empty_story_without_filters() {
        let (dataset, state) = setup();
        let visible = visible_stories(&dataset, &state, &Capabilities::simple());
        assert!(titles(&visible).contains(&"Empty Room".to_string()));
    }

    #[test]
    fn test_group_by_genre_stats() {
        let (dataset, state) = setup();
        let visible = visible_stories(&dataset, &state, &Capabilities::rich());
        let groups = group_by_genre(&visible);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].genre, "Drama");
        assert_eq!(groups[0].stories.len(), 2);
        assert_eq!(groups[0].behaviors, 2);
        assert_eq!(groups[0].success, 0);
        assert_eq!(groups[0].failure, 2);
        assert_eq!(groups[1].genre, "Thriller");
        assert_eq!(groups[1].success, 1);
    }
}
