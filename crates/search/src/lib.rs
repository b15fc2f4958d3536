//! # tfagent Search
//!
//! Chooses the working set of Terraform files for a change request.
//!
//! ```text
//! prompt ──> KeywordSet (vocabulary hits, else prompt tokens)
//!              │
//! corpus ──────┼──> 1. keyword match (content or path)
//!              ├──> 2. network augmentation (vpc/network prompts)
//! graph ───────┼──> 3. transitive dependency closure
//!              └──> 4. minimum-coverage fallback (main/variables/outputs)
//! ```

mod keywords;
mod selector;

pub use keywords::{
    domain_keywords, extract_keywords, KeywordSet, KeywordSource, NETWORK_KEYWORDS, STOP_WORDS,
    TERRAFORM_VOCABULARY,
};
pub use selector::{RelevanceSelector, RelevantFileSet, SelectionStage, SelectorConfig};
