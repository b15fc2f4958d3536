use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;

/// Terraform resource types and concepts recognised in prompts.
pub const TERRAFORM_VOCABULARY: &[&str] = &[
    // networking
    "vpc",
    "subnet",
    "security_group",
    "nacl",
    "sg",
    "security",
    "network",
    "flow_log",
    "encryption",
    "firewall",
    "route",
    "gateway",
    // identity
    "iam",
    "policy",
    // compute / data
    "ec2",
    "rds",
    "lambda",
    "s3",
    "kms",
    // transport
    "ssl",
    "tls",
    "https",
    "alb",
    "elb",
    "load_balancer",
    "autoscaling",
    // observability
    "cloudwatch",
    "logs",
    "cloudtrail",
    "monitoring",
    "alerts",
    // storage
    "backup",
    "storage",
];

/// Words dropped when falling back to prompt tokens.
pub const STOP_WORDS: &[&str] = &[
    "update", "the", "by", "adding", "and", "or", "with", "for", "to", "in", "on", "a", "an",
    "this", "that", "these", "those", "our", "your", "my", "mine", "we", "need", "want", "should",
    "will",
];

/// Prompt terms that switch on network augmentation.
const NETWORK_TRIGGERS: &[&str] = &["vpc", "network"];

/// Secondary keywords matched when a prompt is about networking.
pub const NETWORK_KEYWORDS: &[&str] = &["vpc", "subnet", "cidr", "network", "route", "gateway"];

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w{3,}\b").expect("word pattern is valid"));

/// Where a keyword set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordSource {
    /// At least one vocabulary term occurred in the prompt
    Vocabulary,

    /// No vocabulary hit; significant prompt words were used instead
    PromptTokens,
}

/// Lowercase keywords derived from a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordSet {
    keywords: BTreeSet<String>,
    source: KeywordSource,
}

impl KeywordSet {
    /// Fixed keyword list (lowercased), tagged as vocabulary.
    pub fn from_terms(terms: &[&str]) -> Self {
        Self {
            keywords: terms.iter().map(|t| t.to_lowercase()).collect(),
            source: KeywordSource::Vocabulary,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    #[must_use]
    pub const fn source(&self) -> KeywordSource {
        self.source
    }

    /// True when any keyword occurs in the (already lowercased) text.
    #[must_use]
    pub fn any_in(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// Extract keywords from a prompt. Pure: equal prompts give equal sets.
#[must_use]
pub fn extract_keywords(prompt: &str) -> KeywordSet {
    let prompt_lower = prompt.to_lowercase();

    let found: BTreeSet<String> = TERRAFORM_VOCABULARY
        .iter()
        .filter(|keyword| prompt_lower.contains(*keyword))
        .map(|keyword| (*keyword).to_string())
        .collect();
    if !found.is_empty() {
        return KeywordSet {
            keywords: found,
            source: KeywordSource::Vocabulary,
        };
    }

    let keywords = WORD_RE
        .find_iter(&prompt_lower)
        .map(|m| m.as_str())
        .filter(|word| !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect();
    KeywordSet {
        keywords,
        source: KeywordSource::PromptTokens,
    }
}

/// Secondary keywords for prompts that mention a VPC or network.
#[must_use]
pub fn domain_keywords(prompt: &str) -> Option<&'static [&'static str]> {
    let prompt_lower = prompt.to_lowercase();
    NETWORK_TRIGGERS
        .iter()
        .any(|term| prompt_lower.contains(term))
        .then_some(NETWORK_KEYWORDS)
}
