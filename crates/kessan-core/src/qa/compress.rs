//! Answer length compression
//!
//! Answers are a sequence of paragraph blocks separated by a blank line.
//! Within a paragraph, sentences end with `。`.
//!
//! - `long`: unchanged
//! - `medium`: first two paragraphs
//! - `short`: first sentence of the first paragraph, emphasis removed

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::AnswerLength;

/// Separator between paragraph blocks
pub const PARAGRAPH_DELIMITER: &str = "\n\n";

/// Sentence terminator used as the `short` cut point
pub const SENTENCE_TERMINATOR: char = '。';

static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("emphasis pattern is valid"));

/// Compress an answer to the requested length tier
///
/// `medium` and `short` rebuild the answer from [`paragraphs`], so blocks
/// come back trimmed and blank blocks never count toward the limit.
/// `long` returns the text untouched.
pub fn compress(answer: &str, length: AnswerLength) -> String {
    match length {
        AnswerLength::Long => answer.to_string(),
        AnswerLength::Medium => paragraphs(answer)
            .take(2)
            .collect::<Vec<_>>()
            .join(PARAGRAPH_DELIMITER),
        AnswerLength::Short => {
            let first = paragraphs(answer).next().unwrap_or_default();
            first_sentence(&strip_emphasis(first)).to_string()
        }
    }
}

/// Non-empty paragraph blocks, trimmed
pub fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split(PARAGRAPH_DELIMITER)
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

/// Remove `**bold**` markers, keeping the enclosed text
pub fn strip_emphasis(text: &str) -> String {
    EMPHASIS.replace_all(text, "$1").replace("**", "")
}

/// Text up to and including the first terminator, or all of it
fn first_sentence(text: &str) -> &str {
    match text.find(SENTENCE_TERMINATOR) {
        Some(pos) => &text[..pos + SENTENCE_TERMINATOR.len_utf8()],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWER: &str = "初年度売上は**1.5億円**です。業界標準の範囲内です。\n\n- FY2: 2.0億円\n- FY3: 2.6億円\n\n補足として成長率は30.0%です。";

    #[test]
    fn test_long_is_identity() {
        assert_eq!(compress(ANSWER, AnswerLength::Long), ANSWER);
    }

    #[test]
    fn test_medium_keeps_two_paragraphs() {
        let medium = compress(ANSWER, AnswerLength::Medium);
        assert_eq!(
            medium,
            "初年度売上は**1.5億円**です。業界標準の範囲内です。\n\n- FY2: 2.0億円\n- FY3: 2.6億円"
        );
        assert_eq!(paragraphs(&medium).count(), 2);
    }

    #[test]
    fn test_medium_with_single_paragraph() {
        assert_eq!(compress("一文のみ。", AnswerLength::Medium), "一文のみ。");
    }

    #[test]
    fn test_short_cuts_first_sentence_and_strips_emphasis() {
        let short = compress(ANSWER, AnswerLength::Short);
        assert_eq!(short, "初年度売上は1.5億円です。");
        assert!(!short.contains(PARAGRAPH_DELIMITER));
        assert_eq!(short.matches(SENTENCE_TERMINATOR).count(), 1);
    }

    #[test]
    fn test_short_without_terminator_returns_paragraph() {
        assert_eq!(
            compress("**要点**のみ\n\n次の段落。", AnswerLength::Short),
            "要点のみ"
        );
    }

    #[test]
    fn test_blank_blocks_are_ignored() {
        let text = "\n\n第一段落。\n\n\n\n第二段落。\n\n第三段落。";
        assert_eq!(
            compress(text, AnswerLength::Medium),
            "第一段落。\n\n第二段落。"
        );
        assert_eq!(compress("", AnswerLength::Short), "");
    }

    #[test]
    fn test_compressed_blocks_are_trimmed() {
        let text = "  第一段落です。 \n\n\t第二段落です。\n\n第三段落。\n";
        assert_eq!(
            compress(text, AnswerLength::Medium),
            "第一段落です。\n\n第二段落です。"
        );
        assert_eq!(compress(text, AnswerLength::Short), "第一段落です。");
        assert_eq!(compress(text, AnswerLength::Long), text);
    }

    #[test]
    fn test_strip_unbalanced_emphasis() {
        assert_eq!(strip_emphasis("**A** と **B"), "A と B");
    }
}
