//! Session lifecycle: loading, then ready or failed for good

use crate::config::Capabilities;
use crate::dataset::{load_dataset, Dataset};
use crate::engine::explorer::Explorer;
use crate::error::{LoadError, LoadResult};
use std::path::Path;
use tracing::warn;

/// A browsing session. The engine only exists once the dataset has loaded;
/// a failed load is terminal and the engine is never built.
#[derive(Debug, Default)]
pub enum Session {
    #[default]
    Loading,
    Ready(Box<Explorer>),
    Failed(LoadError),
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the document at `path` and finish the session with the result
    pub fn open(path: &Path, caps: Capabilities) -> Self {
        let mut session = Self::new();
        session.finish(load_dataset(path), caps);
        session
    }

    /// Complete a loading session. Ready and failed sessions keep their
    /// state; there is no reload or retry.
    pub fn finish(&mut self, result: LoadResult<Dataset>, caps: Capabilities) {
        if !self.is_loading() {
            warn!("session already finished; ignoring load result");
            return;
        }
        *self = match result {
            Ok(dataset) => Session::Ready(Box::new(Explorer::new(dataset, caps))),
            Err(err) => {
                warn!(error = %err, "analysis failed to load");
                Session::Failed(err)
            }
        };
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Session::Loading)
    }

    pub fn explorer(&self) -> Option<&Explorer> {
        match self {
            Session::Ready(explorer) => Some(explorer.as_ref()),
            _ => None,
        }
    }

    pub fn explorer_mut(&mut self) -> Option<&mut Explorer> {
        match self {
            Session::Ready(explorer) => Some(explorer.as_mut()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            Session::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_has_no_engine() {
        let session = Session::new();
        assert!(session.is_loading());
        assert!(session.explorer().is_none());
        assert!(session.error().is_none());
    }

    #[test]
    fn test_ready_after_load() {
        let mut session = Session::new();
        let dataset = Dataset::from_json_str(r#"{ "stories": [] }"#);
        session.finish(dataset, Capabilities::rich());
        assert!(session.explorer().is_some());
        assert!(session.explorer_mut().is_some());
    }

    #[test]
    fn test_failure_is_terminal() {
        let mut session = Session::new();
        session.finish(Dataset::from_json_str("oops"), Capabilities::rich());
        assert!(session.error().is_some());

        // A later successful result does not revive the session
        session.finish(
            Dataset::from_json_str(r#"{ "stories": [] }"#),
            Capabilities::rich(),
        );
        assert!(session.explorer().is_none());
        assert!(matches!(session.error(), Some(LoadError::Json(_))));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let session = Session::open(&dir.path().join("analysis.json"), Capabilities::rich());
        assert!(matches!(session.error(), Some(LoadError::NotFound(_))));
    }
}
