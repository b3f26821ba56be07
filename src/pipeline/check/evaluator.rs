use std::sync::Arc;

use super::prompt::build_rule_prompt;
use super::reply::parse_verdict_reply;
use super::types::{TextGenerate, Verdict};
use crate::pipeline::extraction::ExtractedText;

/// Evaluates one rule against one document's text.
///
/// Never fails outward: blank rules short-circuit to `Not Provided`,
/// transport and parsing failures degrade to `Error` verdicts. The
/// client sits behind `TextGenerate` so tests substitute a mock.
pub struct RuleEvaluator {
    client: Arc<dyn TextGenerate>,
}

impl RuleEvaluator {
    pub fn new(client: Arc<dyn TextGenerate>) -> Self {
        Self { client }
    }

    /// One prompt, one call, one verdict. No retry.
    pub async fn evaluate(&self, text: &ExtractedText, rule: &str) -> Verdict {
        if rule.trim().is_empty() {
            return Verdict::not_provided(rule);
        }

        let prompt = build_rule_prompt(text.as_str(), rule);

        match self.client.generate(&prompt).await {
            Ok(raw) => parse_verdict_reply(rule, &raw),
            Err(e) => {
                tracing::warn!(rule = %rule, error = %e, "rule check call failed");
                Verdict::service_error(rule)
            }
        }
    }
}
