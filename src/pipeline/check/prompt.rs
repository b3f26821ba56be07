/// Build the rule-check prompt for one rule against one document.
///
/// The model is told to answer with a bare JSON object — no prose, no
/// markdown fencing — but the reply is still treated as untrusted free
/// text by `reply::parse_verdict_reply`.
pub fn build_rule_prompt(document_text: &str, rule: &str) -> String {
    format!(
        r#"You are a document rule-checker. You verify whether a document satisfies a compliance rule, citing evidence from the document itself.

<document>
{document_text}
</document>

Rule to check: "{rule}"

Return ONLY a valid JSON object in exactly this shape:
{{
  "rule": "the rule being checked",
  "status": "Satisfied" or "Not Satisfied",
  "evidence": "exact text from the document that supports your conclusion, or empty",
  "reasoning": "brief explanation of why the rule is or is not satisfied",
  "confidence": 1-100
}}

IMPORTANT: Return ONLY the JSON object. No additional text, no markdown code blocks.
"#
    )
}
