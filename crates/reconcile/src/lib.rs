//! # tfagent Reconcile
//!
//! Turns a generation backend's raw reply into a `path -> content` mapping.
//!
//! Strategies are tried in order until one succeeds:
//!
//! ```text
//! raw reply
//!     ├──> FencedJson   ```json { "main.tf": "..." } ```
//!     ├──> WholeText    { "main.tf": "..." }
//!     └──> FileMarkers  --- File: main.tf ---\n...
//! ```
//!
//! Nothing here validates Terraform; only structure is extracted.

mod error;
mod reconciler;
mod strategy;

pub use error::ParseFailure;
pub use reconciler::{Reconciler, Reconciliation};
pub use strategy::{FencedJson, FileMarkers, ParseStrategy, ParseTier, WholeText};
