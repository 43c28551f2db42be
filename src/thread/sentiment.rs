//! Positive-sentiment heuristics for comment bodies.
//!
//! The table is plain data: each entry is a pattern plus an optional
//! "excluded context" that must not directly precede the match. The
//! excluded context stands in for a look-behind assertion, which the
//! `regex` crate does not support, e.g. 「いいですね」 counts but
//! 「方がいいですね」 (a suggestion, not praise) does not.

use once_cell::sync::Lazy;
use regex::Regex;

/// One entry of the positive-sentiment table.
pub struct PositivePattern {
    pub label: &'static str,
    pub pattern: Regex,
    /// Matched against the text *before* the candidate match; anchored with `$`.
    pub excluded_before: Option<Regex>,
}

impl PositivePattern {
    fn new(label: &'static str, pattern: &str) -> Self {
        Self {
            label,
            pattern: Regex::new(pattern).unwrap(),
            excluded_before: None,
        }
    }

    fn excluding(mut self, before: &str) -> Self {
        self.excluded_before = Some(Regex::new(before).unwrap());
        self
    }

    /// First accepted match in `text`, if any.
    ///
    /// A rejected candidate only advances the search by one character, so a
    /// later overlapping occurrence still gets its own look-behind check.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        let mut start = 0;
        while let Some(m) = self.pattern.find_at(text, start) {
            let excluded = self
                .excluded_before
                .as_ref()
                .map(|ex| ex.is_match(&text[..m.start()]))
                .unwrap_or(false);
            if !excluded {
                return Some(m.as_str());
            }
            start = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
            if start > text.len() {
                break;
            }
        }
        None
    }
}

pub static POSITIVE_PATTERNS: Lazy<Vec<PositivePattern>> = Lazy::new(|| {
    vec![
        PositivePattern::new("wonderful", r"(素晴|すば)らしい"),
        PositivePattern::new("thanks", r"(有り?難|ありがと)う"),
        PositivePattern::new("grateful", r"(有り?難|ありがた)い"),
        PositivePattern::new("gratitude", r"(お|御)礼"),
        PositivePattern::new("appreciate", r"感謝(です|します)"),
        PositivePattern::new("learned", r"勉強になりま(した|す)"),
        PositivePattern::new("clear", r"(わか|分か|解|判)り(やす|易)かった"),
        PositivePattern::new("helpful-reference", r"参考になりま(した|す)"),
        PositivePattern::new("good-article", r"(?m)(良い?|とてもよい|^いい)記事"),
        PositivePattern::new("well-received", r"好評"),
        PositivePattern::new("nice", r"(良|い)いですね").excluding(r"(方|ほう)が$"),
        PositivePattern::new("saved-me", r"助かりま"),
        PositivePattern::new("lovely", r"素敵(な|です)"),
        PositivePattern::new("amazing", r"(すご|凄)いです"),
    ]
});

/// Whether the comment body reads as positive.
pub fn is_positive(text: &str) -> bool {
    for pattern in POSITIVE_PATTERNS.iter() {
        if let Some(m) = pattern.find(text) {
            log::trace!("positive comment ({}): {}", pattern.label, m);
            return true;
        }
    }
    false
}
