use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::Semaphore;

use super::evaluator::RuleEvaluator;
use super::types::{Verdict, VerdictBatch};
use crate::pipeline::extraction::ExtractedText;

/// Evaluate every rule against the document text.
///
/// Fan-out is capped at `max_concurrent` simultaneous outbound calls;
/// remaining rules wait for a permit. Output order is input order
/// regardless of completion order, and the batch always has exactly one
/// verdict per submitted rule — a failed call only degrades its own slot.
pub async fn evaluate_all(
    evaluator: &RuleEvaluator,
    text: &ExtractedText,
    rules: &[String],
    max_concurrent: usize,
) -> VerdictBatch {
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));

    let checks = rules.iter().map(|rule| {
        let semaphore = semaphore.clone();
        async move {
            // Blank rules never contact the service, so they skip the
            // permit queue entirely.
            if rule.trim().is_empty() {
                return Verdict::not_provided(rule);
            }
            let _permit = semaphore
                .acquire()
                .await
                .expect("evaluation semaphore closed");
            evaluator.evaluate(text, rule).await
        }
    });

    // join_all keeps position i of the output bound to rule i.
    join_all(checks).await
}
