//! Reporter module for output formatting

pub mod console;
pub mod json;

pub use console::ConsoleReporter;
pub use json::JsonReporter;

/// Display name for a story report key; unknown keys are shown as-is
pub fn report_display_name(key: &str) -> &str {
    match key {
        "misalignment_v1" => "Misalignment Report (v1)",
        "misalignment_v2" => "Misalignment Report (v2)",
        "categorization_v1" => "Categorization (v1)",
        "categorization_v2" => "Categorization (v2)",
        "benevolent_v1" => "Benevolent Behaviors (v1)",
        "benevolent_v2" => "Benevolent Behaviors (v2)",
        "harmful_v1" => "Harmful Behaviors (v1)",
        "harmful_v2" => "Harmful Behaviors (v2)",
        other => other,
    }
}
