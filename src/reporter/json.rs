//! JSON reporter for machine-readable output

use crate::dataset::Story;
use crate::engine::Snapshot;
use serde::Serialize;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Report a full snapshot as JSON
    pub fn report(&self, snapshot: &Snapshot<'_>) -> String {
        self.to_json(snapshot, "{}")
    }

    /// Report only the visible stories as a JSON array
    pub fn report_stories(&self, stories: &[&Story]) -> String {
        self.to_json(&stories, "[]")
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T, fallback: &str) -> String {
        let result = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        result.unwrap_or_else(|_| fallback.to_string())
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}
