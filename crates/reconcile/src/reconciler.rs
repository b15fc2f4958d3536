use crate::error::ParseFailure;
use crate::strategy::{FencedJson, FileMarkers, ParseStrategy, ParseTier, WholeText};
use tfagent_protocol::{ModificationResult, RunContext};

/// Result of reconciling one backend reply
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub files: ModificationResult,
    /// Tier that produced `files`; `None` when every tier failed
    pub tier: Option<ParseTier>,
    pub failures: Vec<(ParseTier, ParseFailure)>,
}

impl Reconciliation {
    pub fn is_parsed(&self) -> bool {
        self.tier.is_some()
    }

    /// `tier: reason` for every rejected tier, in the order they ran
    pub fn failure_summary(&self) -> String {
        self.failures
            .iter()
            .map(|(tier, failure)| format!("{tier}: {failure}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Runs parse strategies in order and keeps the first success
pub struct Reconciler {
    ctx: RunContext,
    strategies: Vec<Box<dyn ParseStrategy>>,
}

impl Reconciler {
    pub fn new(ctx: RunContext) -> Self {
        Self::with_strategies(
            ctx,
            vec![Box::new(FencedJson), Box::new(WholeText), Box::new(FileMarkers)],
        )
    }

    pub fn with_strategies(ctx: RunContext, strategies: Vec<Box<dyn ParseStrategy>>) -> Self {
        Self { ctx, strategies }
    }

    /// Never fails: an unusable reply yields an empty mapping with `tier == None`
    pub fn reconcile(&self, raw: &str) -> Reconciliation {
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            let tier = strategy.tier();
            match strategy.parse(raw) {
                Ok(files) => {
                    log::info!(
                        "[{}] Extracted {} modified files via {}",
                        self.ctx,
                        files.len(),
                        tier
                    );
                    return Reconciliation {
                        files,
                        tier: Some(tier),
                        failures,
                    };
                }
                Err(failure) => {
                    log::warn!("[{}] {} rejected reply: {}", self.ctx, tier, failure);
                    failures.push((tier, failure));
                }
            }
        }

        let reconciliation = Reconciliation {
            files: ModificationResult::new(),
            tier: None,
            failures,
        };
        log::error!(
            "[{}] Could not extract any files from a {}-byte reply ({})",
            self.ctx,
            raw.len(),
            reconciliation.failure_summary()
        );
        reconciliation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tfagent_protocol::file_marker;

    fn reconciler() -> Reconciler {
        Reconciler::new(RunContext::with_id("test"))
    }

    fn map(entries: &[(&str, &str)]) -> ModificationResult {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn fenced_json_wins_over_later_tiers() {
        let raw = format!(
            "Sure.\n```json\n{{\"a.tf\": \"content-A\"}}\n```\n{}\nignored",
            file_marker("b.tf")
        );
        let result = reconciler().reconcile(&raw);
        assert_eq!(result.tier, Some(ParseTier::FencedJson));
        assert_eq!(result.files, map(&[("a.tf", "content-A")]));
        assert!(result.failures.is_empty());
    }

    #[test]
    fn fenced_mapping_is_returned_exactly() {
        let raw = "```json\n{\"a.tf\": \"content-A\", \"b.tf\": \"content-B\"}\n```";
        let result = reconciler().reconcile(raw);
        assert_eq!(
            result.files,
            map(&[("a.tf", "content-A"), ("b.tf", "content-B")])
        );
    }

    #[test]
    fn bare_json_reply_parses_as_whole_text() {
        let result = reconciler().reconcile("  {\"main.tf\": \"resource {}\"}\n");
        assert_eq!(result.tier, Some(ParseTier::WholeText));
        assert_eq!(result.files, map(&[("main.tf", "resource {}")]));
    }

    #[test]
    fn empty_object_is_a_successful_empty_parse() {
        let result = reconciler().reconcile("{}");
        assert!(result.is_parsed());
        assert!(result.files.is_empty());
    }

    #[test]
    fn broken_fence_falls_back_to_markers() {
        let raw = "```json\n{not json}\n```\n--- File: a.tf ---\nHELLO\n--- File: b.tf ---\nWORLD";
        let result = reconciler().reconcile(raw);
        assert_eq!(result.tier, Some(ParseTier::FileMarkers));
        assert_eq!(result.files, map(&[("a.tf", "HELLO"), ("b.tf", "WORLD")]));
        assert_eq!(result.failures.len(), 2);
        assert_eq!(result.failures[0].0, ParseTier::FencedJson);
        assert_eq!(result.failures[1].0, ParseTier::WholeText);
    }

    #[test]
    fn non_string_values_fall_through() {
        let raw = "```json\n{\"a.tf\": {\"nested\": true}}\n```";
        let result = reconciler().reconcile(raw);
        assert!(!result.is_parsed());
        assert!(result.files.is_empty());
        assert_eq!(
            result.failures[0].1,
            ParseFailure::NonStringValue("a.tf".to_string())
        );
    }

    #[test]
    fn later_duplicate_marker_overwrites() {
        let raw = "--- File: a.tf ---\nfirst\n--- File: a.tf ---\nsecond";
        let result = reconciler().reconcile(raw);
        assert_eq!(result.files, map(&[("a.tf", "second")]));
    }

    #[test]
    fn unusable_reply_yields_empty_result() {
        let result = reconciler().reconcile("I'm sorry, I can't help with that.");
        assert_eq!(result.tier, None);
        assert!(result.files.is_empty());
        assert_eq!(result.failures.len(), 3);
    }

    #[test]
    fn failure_summary_names_every_rejected_tier() {
        let result = reconciler().reconcile("```json\n{broken}\n```\nno markers");
        let summary = result.failure_summary();
        for tier in [ParseTier::FencedJson, ParseTier::WholeText, ParseTier::FileMarkers] {
            assert!(summary.contains(&tier.to_string()), "{tier} missing from {summary}");
        }
        assert!(summary.contains(&ParseFailure::NoFileSections.to_string()));
    }

    #[test]
    fn custom_strategy_order_is_respected() {
        let reconciler =
            Reconciler::with_strategies(RunContext::with_id("test"), vec![Box::new(FileMarkers)]);
        let result = reconciler.reconcile("{\"a.tf\": \"x\"}");
        assert_eq!(result.tier, None);
        assert_eq!(result.failures, vec![(ParseTier::FileMarkers, ParseFailure::NoFileSections)]);
    }
}
