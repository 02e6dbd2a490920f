use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{error::VocabError, orchestrator::GenerationReport};

/// Progress reported by the watcher, one event per generation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenerationEvent {
    /// Artifacts were already newer than every input.
    Skipped,
    Generated(GenerationReport),
    /// The cycle failed; `failures` is the running total since `watch()`.
    Failed { error: VocabError, failures: u64 },
    /// The watcher stopped observing the file system.
    Unwatched(Vec<PathBuf>),
}

impl GenerationEvent {
    pub fn is_failure(&self) -> bool {
        matches!(self, GenerationEvent::Failed { .. })
    }
}
