use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Files proposed by the generation backend (`path -> new content`).
///
/// Keys are whatever the backend returned; they are not guaranteed to exist
/// in the corpus.
pub type ModificationResult = BTreeMap<String, String>;

/// Result of one enhancement run, distinguishing why a result is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnhancementOutcome {
    /// The reply was reconciled into a file mapping (possibly empty when the
    /// backend explicitly returned no files).
    Modified { files: ModificationResult },

    /// The backend could not be reached or rejected the request.
    BackendUnavailable { reason: String },

    /// The backend answered, but no reconciliation tier could extract files.
    Unparseable,
}

impl EnhancementOutcome {
    /// Modified files; empty for both failure variants.
    #[must_use]
    pub fn files(&self) -> &ModificationResult {
        static EMPTY: ModificationResult = BTreeMap::new();
        match self {
            Self::Modified { files } => files,
            Self::BackendUnavailable { .. } | Self::Unparseable => &EMPTY,
        }
    }

    pub fn into_files(self) -> ModificationResult {
        match self {
            Self::Modified { files } => files,
            Self::BackendUnavailable { .. } | Self::Unparseable => ModificationResult::new(),
        }
    }

    #[must_use]
    pub const fn is_modified(&self) -> bool {
        matches!(self, Self::Modified { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn failure_variants_expose_empty_files() {
        let unavailable = EnhancementOutcome::BackendUnavailable {
            reason: "quota".to_string(),
        };
        assert!(unavailable.files().is_empty());
        assert!(EnhancementOutcome::Unparseable.files().is_empty());
        assert!(!EnhancementOutcome::Unparseable.is_modified());
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let mut files = ModificationResult::new();
        files.insert("main.tf".to_string(), "x".to_string());
        let outcome = EnhancementOutcome::Modified { files };

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "modified");
        assert_eq!(value["files"]["main.tf"], "x");
        assert_eq!(outcome.into_files().len(), 1);
    }
}
