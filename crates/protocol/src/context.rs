use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

static RUN_SEQ: AtomicU64 = AtomicU64::new(0);

/// Per-run identity handed to each component at construction.
///
/// Components prefix their log lines with [`RunContext::id`] instead of
/// relying on process-wide state, so two runs in one process never mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    id: Arc<str>,
}

impl RunContext {
    /// Create a context with a fresh, process-unique id.
    pub fn new() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let seq = RUN_SEQ.fetch_add(1, Ordering::Relaxed);
        Self::with_id(format!("run-{millis:x}-{seq}"))
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Arc::from(id.into()),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
