use serde::{Deserialize, Serialize};

/// Statistics about one corpus load
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadStats {
    /// Number of files loaded into the corpus
    pub files: usize,

    /// Total bytes of loaded content
    pub bytes: usize,

    /// Files found by the scanner but not loaded
    pub skipped: usize,

    /// Per-file read errors (path and reason)
    pub errors: Vec<String>,
}

impl LoadStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, bytes: usize) {
        self.files += 1;
        self.bytes += bytes;
    }

    pub fn add_error(&mut self, error: String) {
        self.skipped += 1;
        self.errors.push(error);
    }
}
