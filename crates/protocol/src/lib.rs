//! Types shared by every tfagent stage.
//!
//! The loader produces a [`Corpus`], the graph builder and selector read it,
//! and the orchestrator reports an [`EnhancementOutcome`]. Every component
//! is constructed with a [`RunContext`] so log lines from independent runs
//! can be told apart.

mod context;
mod corpus;
mod outcome;
pub mod path_filters;

pub use context::RunContext;
pub use corpus::{Corpus, FileRecord};
pub use outcome::{EnhancementOutcome, ModificationResult};

/// Literal marker that introduces a file section in prompts and replies.
pub const FILE_MARKER_PREFIX: &str = "--- File:";

/// Render the section header for `path` (`--- File: <path> ---`).
#[must_use]
pub fn file_marker(path: &str) -> String {
    format!("{FILE_MARKER_PREFIX} {path} ---")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_marker_layout() {
        assert_eq!(file_marker("modules/vpc/main.tf"), "--- File: modules/vpc/main.tf ---");
    }
}
