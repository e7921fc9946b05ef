/// Longest prefix of `s` that fits in `max_bytes` without splitting a
/// UTF-8 sequence.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = (0..=max_bytes)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0);
    &s[..end]
}

/// Body of a fenced markdown block (any info string), or the trimmed input
/// when it is not fenced.
pub fn strip_code_blocks(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(fenced) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match fenced.find('\n') {
        Some(newline) => &fenced[newline + 1..],
        None => fenced,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_multibyte_boundary() {
        let text = "Bloating 世界";
        let truncated = truncate_to_char_boundary(text, 11);
        assert!(truncated.len() <= 11);
        assert!(text.starts_with(truncated));
        assert_eq!(truncated, "Bloating ");
    }

    #[test]
    fn truncate_within_bounds_is_identity() {
        assert_eq!(truncate_to_char_boundary("creatine", 4000), "creatine");
    }

    #[test]
    fn strip_code_blocks_handles_fenced_json() {
        assert_eq!(strip_code_blocks("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("  {}  "), "{}");
    }

    #[test]
    fn strip_code_blocks_ignores_info_string_case() {
        assert_eq!(
            strip_code_blocks("```JSON\n{\"Relations\": []}\n```"),
            "{\"Relations\": []}"
        );
    }

    #[test]
    fn unfenced_json_with_backticks_inside_is_untouched() {
        assert_eq!(strip_code_blocks(r#"{"a": "```"}"#), r#"{"a": "```"}"#);
    }
}
