use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::CheckError;

/// Outcome label for one rule. Closed set — free-text labels from the
/// model are mapped onto it, never passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictStatus {
    Satisfied,
    #[serde(rename = "Not Satisfied")]
    NotSatisfied,
    Error,
    #[serde(rename = "Not Provided")]
    NotProvided,
}

impl VerdictStatus {
    /// Map a model-supplied label onto the closed set. Unknown labels
    /// become `Error` so arbitrary strings never leak into the schema.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("satisfied") || label.eq_ignore_ascii_case("pass") {
            VerdictStatus::Satisfied
        } else if label.eq_ignore_ascii_case("not satisfied")
            || label.eq_ignore_ascii_case("unsatisfied")
            || label.eq_ignore_ascii_case("fail")
        {
            VerdictStatus::NotSatisfied
        } else if label.eq_ignore_ascii_case("not provided") {
            VerdictStatus::NotProvided
        } else {
            VerdictStatus::Error
        }
    }
}

/// Structured outcome of checking one rule against one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Echo of the submitted rule; never empty even if the model omits it.
    pub rule: String,
    pub status: VerdictStatus,
    pub evidence: String,
    pub reasoning: String,
    /// Always clamped to [0, 100].
    pub confidence: u8,
}

impl Verdict {
    /// Placeholder verdict for a blank/whitespace rule. No external call
    /// is ever made for these.
    pub fn not_provided(rule: &str) -> Self {
        Self {
            rule: rule.to_string(),
            status: VerdictStatus::NotProvided,
            evidence: String::new(),
            reasoning: String::new(),
            confidence: 0,
        }
    }

    /// Degraded verdict for a failed external call.
    pub fn service_error(rule: &str) -> Self {
        Self {
            rule: rule.to_string(),
            status: VerdictStatus::Error,
            evidence: String::new(),
            reasoning: "external service error".to_string(),
            confidence: 0,
        }
    }
}

/// Ordered verdicts, one per submitted rule. Owned by the request that
/// produced it; never persisted.
pub type VerdictBatch = Vec<Verdict>;

/// Seam to the external text-generation service: one prompt in, the raw
/// reply text out. The real client is `GeminiClient`; tests substitute
/// `MockTextClient`.
#[async_trait]
pub trait TextGenerate: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, CheckError>;
}
