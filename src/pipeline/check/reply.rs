//! Defensive parsing of free-text model replies into `Verdict`s.
//!
//! The model is asked for a bare JSON object but routinely wraps it in
//! code fences or prose. Recovery path: strip fences, take the greedy
//! `{...}` span, parse, then default every field. Parsing never fails
//! outward — a hopeless reply becomes an `Error` verdict carrying an
//! excerpt of what the model actually said.

use serde_json::Value;

use super::types::{Verdict, VerdictStatus};

/// Max characters of the raw reply quoted in a parse-failure verdict.
const EXCERPT_MAX_CHARS: usize = 100;

/// Coerce a raw model reply into a `Verdict` for `rule`.
pub fn parse_verdict_reply(rule: &str, raw: &str) -> Verdict {
    let cleaned = strip_fences(raw.trim());

    let parsed = json_object_span(cleaned).and_then(|span| serde_json::from_str::<Value>(span).ok());

    let Some(value) = parsed else {
        return recovery_verdict(rule, raw);
    };
    let Some(obj) = value.as_object() else {
        return recovery_verdict(rule, raw);
    };

    let echoed_rule = obj
        .get("rule")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(rule);

    let status = obj
        .get("status")
        .and_then(Value::as_str)
        .map(VerdictStatus::from_label)
        .unwrap_or(VerdictStatus::Error);

    Verdict {
        rule: echoed_rule.to_string(),
        status,
        evidence: string_field(obj, "evidence"),
        reasoning: string_field(obj, "reasoning"),
        confidence: coerce_confidence(obj.get("confidence")),
    }
}

/// Verdict for a reply that contained no parseable JSON object.
fn recovery_verdict(rule: &str, raw: &str) -> Verdict {
    Verdict {
        rule: rule.to_string(),
        status: VerdictStatus::Error,
        evidence: String::new(),
        reasoning: format!("unparseable model reply: {}", truncated_excerpt(raw)),
        confidence: 0,
    }
}

/// Strip leading/trailing markdown code fences (``` or ```json).
fn strip_fences(text: &str) -> &str {
    let mut text = text;
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Greedy object span: first `{` through last `}`. The model emits one
/// object, so greedy matching tolerates prose on either side.
fn json_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn string_field(obj: &serde_json::Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Numerically parse a confidence value and clamp it into [0, 100].
/// Accepts integers, floats, and numeric strings; anything else is 0.
fn coerce_confidence(value: Option<&Value>) -> u8 {
    let numeric = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match numeric {
        Some(n) if n.is_finite() => n.round().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}

fn truncated_excerpt(raw: &str) -> String {
    raw.trim().chars().take(EXCERPT_MAX_CHARS).collect()
}
