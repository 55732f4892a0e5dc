use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Strip markup tags and truncate to `max_len` characters, appending a
/// truncation marker when cut. Empty input (before or after stripping)
/// maps to `None`.
pub fn clean_description(text: Option<&str>, max_len: usize) -> Option<String> {
    let text = text?;
    let stripped = MARKUP_TAG.replace_all(text, "");
    let stripped = stripped.trim();
    if stripped.is_empty() {
        return None;
    }

    if stripped.chars().count() > max_len {
        let cut: String = stripped.chars().take(max_len).collect();
        Some(format!("{}...", cut))
    } else {
        Some(stripped.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_markup_tags() {
        let cleaned = clean_description(Some("A <b>bold</b> plot<br>twist"), 100);
        assert_eq!(cleaned.as_deref(), Some("A bold plottwist"));
    }

    #[test]
    fn test_truncates_with_marker() {
        let cleaned = clean_description(Some("abcdefghij"), 5);
        assert_eq!(cleaned.as_deref(), Some("abcde..."));
    }

    #[test]
    fn test_short_text_untouched() {
        let cleaned = clean_description(Some("short"), 300);
        assert_eq!(cleaned.as_deref(), Some("short"));
    }

    #[test]
    fn test_empty_and_missing_map_to_none() {
        assert_eq!(clean_description(None, 300), None);
        assert_eq!(clean_description(Some(""), 300), None);
        assert_eq!(clean_description(Some("<i></i>"), 300), None);
    }

    #[test]
    fn test_multibyte_truncation_is_char_based() {
        let cleaned = clean_description(Some("進撃の巨人の最終章です"), 4);
        assert_eq!(cleaned.as_deref(), Some("進撃の巨..."));
    }
}
