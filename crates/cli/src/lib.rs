//! Orchestration for the `tfagent` binary: configuration, repository
//! acquisition and the enhancement pipeline.

pub mod config;
pub mod enhancer;
pub mod repo;

pub use config::AgentConfig;
pub use enhancer::{DependencyLink, Enhancer, SelectedFile, SelectionPlan};
pub use repo::{RepoCheckout, RepoSource, RepoUrl};
