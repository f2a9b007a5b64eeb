//! Console reporter with colored output

use crate::dataset::Story;
use crate::engine::{CellView, GenreGroup, GridCell, GridMode, Snapshot, Tallies};
use crate::reporter::report_display_name;
use crate::{Alignment, Axis, AxisSelector, Benevolence, Portrayal};
use colored::{ColoredString, Colorize};

/// Reporter for terminal output
pub struct ConsoleReporter {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show characters, behaviors and reports per story
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
        }
    }

    /// Disable colors
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Print a full redraw of the snapshot
    pub fn report(&self, snapshot: &Snapshot<'_>) {
        print!("{}", self.render(snapshot));
    }

    /// Render the snapshot as terminal text
    pub fn render(&self, snapshot: &Snapshot<'_>) -> String {
        let mut lines = Vec::new();
        self.header(snapshot, &mut lines);
        self.tallies(&snapshot.tallies, &mut lines);
        self.grid(snapshot, &mut lines);
        self.stories(snapshot, &mut lines);
        lines.push(String::new());
        lines.join("\n")
    }

    fn header(&self, snapshot: &Snapshot<'_>, lines: &mut Vec<String>) {
        lines.push(String::new());
        lines.push(self.paint("📊 Story Behavior Analysis".into(), |s| s.bold()));
        lines.push(format!(
            "   Stories: {} | Behaviors: {} | Showing: {}",
            snapshot.total_stories, snapshot.total_behaviors, snapshot.visible_count
        ));
        if !snapshot.generated_date.is_empty() {
            lines.push(self.paint(
                format!("   Data generated: {}", snapshot.generated_date),
                |s| s.dimmed(),
            ));
        }
        lines.push(String::new());
    }

    fn tallies(&self, tallies: &Tallies, lines: &mut Vec<String>) {
        let line = match tallies {
            Tallies::Assessment { success, failure } => format!(
                "   {}  {}",
                self.paint(format!("✓ {} success", success), |s| s.green()),
                self.paint(format!("✗ {} failure", failure), |s| s.red()),
            ),
            Tallies::BackfireRisk { count } => format!(
                "   {}",
                self.paint(format!("⚠ {} backfire risk", count), |s| s.yellow())
            ),
        };
        lines.push(line);
        lines.push(String::new());
    }

    fn grid(&self, snapshot: &Snapshot<'_>, lines: &mut Vec<String>) {
        let portrayals: Vec<Option<Portrayal>> = match snapshot.grid_mode {
            GridMode::Triple => Portrayal::ALL.into_iter().map(Some).collect(),
            GridMode::Single => vec![None],
        };

        for portrayal in portrayals {
            let title = match portrayal {
                Some(p) => format!("Portrayed {}:", p),
                None => "Benevolence × Alignment:".to_string(),
            };
            lines.push(format!("   {}", self.paint(title, |s| s.bold())));

            let mut header = format!("   {:<12}", "");
            for a in Alignment::ALL {
                header.push_str(&format!("{:>12}", a.as_str()));
            }
            if snapshot.show_totals {
                header.push_str(&format!("{:>12}", "total"));
            }
            lines.push(self.paint(header, |s| s.dimmed()));

            let mut rows: Vec<AxisSelector<Benevolence>> =
                Benevolence::ALL.into_iter().map(AxisSelector::Only).collect();
            if snapshot.show_totals {
                rows.push(AxisSelector::Any);
            }
            for benevolence in rows {
                let label = match benevolence {
                    AxisSelector::Any => "total",
                    AxisSelector::Only(b) => b.as_str(),
                };
                let mut line = format!("   {:<12}", label);
                let mut columns: Vec<AxisSelector<Alignment>> =
                    Alignment::ALL.into_iter().map(AxisSelector::Only).collect();
                if snapshot.show_totals {
                    columns.push(AxisSelector::Any);
                }
                for alignment in columns {
                    let cell = GridCell {
                        benevolence,
                        alignment,
                        portrayal,
                    };
                    line.push_str(&self.cell(find_cell(&snapshot.cells, &cell)));
                }
                lines.push(line);
            }
            lines.push(String::new());
        }
    }

    fn cell(&self, view: Option<&CellView>) -> String {
        let Some(view) = view else {
            return format!("{:>12}", "-");
        };
        if view.selected {
            let text = format!("{:>10}", format!("[{}]", view.count));
            format!("  {}", self.paint(text, |s| s.cyan().bold()))
        } else {
            format!("{:>12}", view.count)
        }
    }

    fn stories(&self, snapshot: &Snapshot<'_>, lines: &mut Vec<String>) {
        if snapshot.genres.is_empty() {
            lines.push(self.paint("   No stories match the current filters".into(), |s| {
                s.italic()
            }));
            return;
        }
        let show_bucket = snapshot.capabilities.assessment_facet;
        for group in &snapshot.genres {
            self.genre_header(group, lines);
            for story in &group.stories {
                self.story(story, show_bucket, lines);
            }
        }
    }

    fn genre_header(&self, group: &GenreGroup<'_>, lines: &mut Vec<String>) {
        lines.push(format!(
            "{} {}  {}",
            self.paint("▶".into(), |s| s.cyan()),
            self.paint(group.genre.to_string(), |s| s.bold()),
            self.paint(
                format!(
                    "{} stories · {} behaviors · {} success · {} failure",
                    group.stories.len(),
                    group.behaviors,
                    group.success,
                    group.failure
                ),
                |s| s.dimmed()
            )
        ));
    }

    fn story(&self, story: &Story, show_bucket: bool, lines: &mut Vec<String>) {
        let label = if show_bucket {
            story.assessment().to_string()
        } else {
            story.assessment_label()
        };
        let label = match label.as_str() {
            "success" => self.paint(label.clone(), |s| s.green()),
            "failure" | "backfire" => self.paint(label.clone(), |s| s.red()),
            _ => self.paint(label.clone(), |s| s.yellow()),
        };
        lines.push(format!("   • {} ({})", story.title, label));

        if !self.verbose {
            return;
        }
        if let Some(ref explanation) = story.project_assessment.explanation {
            lines.push(format!("       Assessment: {}", explanation));
        }
        for character in &story.characters {
            lines.push(format!(
                "       {} {} | Benevolence: {} | Alignment: {}",
                self.paint(character.name.clone(), |s| s.bold()),
                character.character_type.as_deref().unwrap_or(""),
                character.overall_benevolence.as_deref().unwrap_or("N/A"),
                character.overall_alignment.as_deref().unwrap_or("N/A"),
            ));
        }
        for behavior in &story.behaviors {
            lines.push(format!(
                "       {} {} {}",
                self.paint("→".into(), |s| s.dimmed()),
                behavior.description,
                self.paint(
                    format!(
                        "[{} | {} | {} | Portrayed: {}]",
                        behavior.character,
                        behavior.benevolence,
                        behavior.alignment,
                        behavior.portrayal
                    ),
                    |s| s.dimmed()
                )
            ));
            if let Some(ref quote) = behavior.quote {
                lines.push(format!(
                    "         {}",
                    self.paint(format!("\"{}\"", quote), |s| s.italic())
                ));
            }
        }
        if !story.reports.is_empty() {
            let names: Vec<&str> = story.reports.keys().map(|k| report_display_name(k)).collect();
            lines.push(self.paint(format!("       Reports: {}", names.join(", ")), |s| {
                s.dimmed()
            }));
        }
    }

    fn paint(&self, text: String, style: impl Fn(ColoredString) -> ColoredString) -> String {
        if self.use_colors {
            style(text.normal()).to_string()
        } else {
            text
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn find_cell<'a>(cells: &'a [CellView], cell: &GridCell) -> Option<&'a CellView> {
    cells.iter().find(|c| c.cell == *cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Capabilities;
    use crate::dataset::Dataset;
    use crate::engine::{Explorer, FacetValue};

    fn explorer(caps: Capabilities) -> Explorer {
        let dataset = Dataset::from_json_str(
            r#"{
                "metadata": { "generated_date": "2025-02-01" },
                "stories": [
                    { "story_title": "Tin Heart", "genre": "Romance",
                      "project_assessment": { "success_level": "Backfire", "explanation": "Too eager" },
                      "ai_characters": [{ "name": "Tin", "character_type": "Robot" }],
                      "behaviors": [{ "character": "Tin", "description": "Rewrites the letters",
                        "quote": "I only fixed the spelling.",
                        "benevolence": "Benevolent", "alignment": "Misaligned", "portrayal": "Positive" }],
                      "reports": { "harmful_v1": "..." } }
                ]
            }"#,
        )
        .unwrap();
        Explorer::new(dataset, caps)
    }

    #[test]
    fn test_render_plain() {
        let explorer = explorer(Capabilities::rich());
        let text = ConsoleReporter::new()
            .without_colors()
            .render(&explorer.snapshot());
        assert!(text.contains("Stories: 1 | Behaviors: 1 | Showing: 1"));
        assert!(text.contains("Data generated: 2025-02-01"));
        assert!(text.contains("✓ 0 success"));
        assert!(text.contains("✗ 1 failure"));
        assert!(text.contains("Romance"));
        assert!(text.contains("• Tin Heart (failure)"));
        assert!(!text.contains("\u{1b}["), "no ANSI codes without colors");
    }

    #[test]
    fn test_render_simple_variant_label_and_backfire() {
        let explorer = explorer(Capabilities::simple());
        let text = ConsoleReporter::new()
            .without_colors()
            .render(&explorer.snapshot());
        assert!(text.contains("⚠ 1 backfire risk"));
        assert!(text.contains("• Tin Heart (backfire)"));
    }

    #[test]
    fn test_render_verbose_details() {
        let explorer = explorer(Capabilities::rich());
        let text = ConsoleReporter::new()
            .without_colors()
            .verbose()
            .render(&explorer.snapshot());
        assert!(text.contains("Assessment: Too eager"));
        assert!(text.contains("Benevolence: N/A"));
        assert!(text.contains("Rewrites the letters"));
        assert!(text.contains("\"I only fixed the spelling.\""));
        assert!(text.contains("Reports: Harmful Behaviors (v1)"));
    }

    #[test]
    fn test_render_totals_and_triple_grid() {
        let mut explorer = explorer(Capabilities::rich());
        explorer.toggle_totals();
        explorer.toggle_grid_mode();
        let text = ConsoleReporter::new()
            .without_colors()
            .render(&explorer.snapshot());
        assert!(text.contains("Portrayed positive:"));
        assert!(text.contains("Portrayed negative:"));
        assert!(text.contains("total"));
    }

    #[test]
    fn test_render_follows_grid_mode() {
        let mut explorer = explorer(Capabilities::rich());
        let reporter = ConsoleReporter::new().without_colors();
        let single = reporter.render(&explorer.snapshot());
        assert!(single.contains("Benevolence × Alignment:"));
        assert!(!single.contains("Portrayed"));

        explorer.toggle_grid_mode();
        let triple = reporter.render(&explorer.snapshot());
        assert!(!triple.contains("Benevolence × Alignment:"));
        assert_eq!(triple.matches("Portrayed ").count(), 3);
    }

    #[test]
    fn test_render_empty_result() {
        let mut explorer = explorer(Capabilities::rich());
        explorer.toggle(FacetValue::Genre("Romance".to_string()));
        let text = ConsoleReporter::new()
            .without_colors()
            .render(&explorer.snapshot());
        assert!(text.contains("No stories match the current filters"));
        assert!(text.contains("Showing: 0"));
    }
}
