//! # tfagent Indexer
//!
//! Loads Terraform sources into an in-memory [`Corpus`](tfagent_protocol::Corpus)
//! and writes proposed changes back to disk.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> File Scanner (.gitignore aware, *.tf only)
//!     │      └─> Terraform files
//!     │
//!     ├──> Corpus Loader (best-effort reads)
//!     │      └─> path -> content
//!     │
//!     └──> Result Sink
//!            └─> <output>/<path>
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use tfagent_indexer::CorpusLoader;
//! use tfagent_protocol::RunContext;
//!
//! let (corpus, stats) = CorpusLoader::new("/path/to/terraform", RunContext::new()).load()?;
//! println!("Loaded {} files ({} bytes)", stats.files, stats.bytes);
//! # Ok::<(), tfagent_indexer::IndexerError>(())
//! ```

mod error;
mod loader;
mod scanner;
mod sink;
mod stats;

pub use error::{IndexerError, Result};
pub use loader::CorpusLoader;
pub use scanner::{FileScanner, ScanOptions};
pub use sink::ResultSink;
pub use stats::LoadStats;
