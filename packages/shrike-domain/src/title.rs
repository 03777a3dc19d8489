use std::sync::LazyLock;

use regex::Regex;

const MAX_TITLE_CHARS: usize = 80;
const FALLBACK_TITLE: &str = "Intelligence report";

static FIRST_SENTENCE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^(.+?[.!?])\s").expect("first-sentence pattern is valid"));

/// Event title derived from the item: explicit title, else the first sentence
/// of summary or content, capped at 80 characters with an ellipsis.
pub fn derive_title(title: Option<&str>, summary: Option<&str>, content: &str) -> String {
	let base = [title, summary, Some(content)]
		.into_iter()
		.flatten()
		.map(str::trim)
		.find(|text| !text.is_empty())
		.unwrap_or(FALLBACK_TITLE);
	let sentence = FIRST_SENTENCE
		.captures(base)
		.and_then(|caps| caps.get(1))
		.map(|m| m.as_str())
		.unwrap_or(base);

	truncate_chars(sentence.trim(), MAX_TITLE_CHARS)
}

/// Event summary: the item's summary when present, else its content.
pub fn derive_summary(summary: Option<&str>, content: &str) -> String {
	summary
		.map(str::trim)
		.filter(|text| !text.is_empty())
		.unwrap_or(content.trim())
		.to_string()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
	if text.chars().count() <= max_chars {
		return text.to_string();
	}

	let mut truncated = text.chars().take(max_chars - 1).collect::<String>();

	truncated.push('…');

	truncated
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn explicit_title_wins() {
		assert_eq!(derive_title(Some("Bridge hit"), Some("other"), "content"), "Bridge hit");
	}

	#[test]
	fn first_sentence_is_extracted_from_content() {
		let content = "Explosion reported downtown. Several follow-up posts mention smoke.";

		assert_eq!(derive_title(None, None, content), "Explosion reported downtown.");
	}

	#[test]
	fn long_single_sentence_is_capped_with_an_ellipsis() {
		let content = "a".repeat(120);
		let title = derive_title(None, None, &content);

		assert_eq!(title.chars().count(), 80);
		assert!(title.ends_with('…'));
	}

	#[test]
	fn blank_inputs_fall_back() {
		assert_eq!(derive_title(Some("  "), Some(""), "   "), FALLBACK_TITLE);
	}

	#[test]
	fn multibyte_content_truncates_on_char_boundaries() {
		let content = "п".repeat(100);
		let title = derive_title(None, None, &content);

		assert_eq!(title.chars().count(), 80);
	}

	#[test]
	fn summary_prefers_the_explicit_field() {
		assert_eq!(derive_summary(Some(" short "), "long body"), "short");
		assert_eq!(derive_summary(None, " long body "), "long body");
	}
}
