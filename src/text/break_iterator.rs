//! # Break Opportunities
//!
//! Classifies offsets in a paragraph as line break opportunities, following
//! UAX#14 (via `unicode-linebreak`) adjusted by CSS `word-break` and
//! `hyphens`.
//!
//! A break next to spaces is reported *before* the space run: spaces hang at
//! the end of a line and are not part of its content, so a line that breaks at
//! "The quick| brown" ends at the first space. The opportunity is only valid
//! when UAX#14 allows a break after the run.

use serde::{Deserialize, Serialize};
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

use crate::style::Hyphens;

/// Line breaking strictness, as selected by CSS `word-break`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineBreakType {
    /// UAX#14 opportunities.
    #[default]
    Normal,
    /// Additionally break between any two letters.
    BreakAll,
    /// Never break between two letters (CJK text keeps words together).
    KeepAll,
}

const SOFT_HYPHEN: char = '\u{00AD}';

fn is_breaking_space(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric()
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Returns a vec of length `text.chars().count() + 1`. Each entry is the
/// break opportunity *before* that char position; the last entry is the end
/// of the text. Index 0 is always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count + 1];

    // linebreaks() yields (byte_offset, opportunity) where byte_offset is the
    // position AFTER the break, i.e. the start of the next segment.
    let byte_to_char: Vec<usize> = {
        let mut map = vec![0usize; text.len() + 1];
        for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
            map[byte_idx] = char_idx;
        }
        map[text.len()] = char_count;
        map
    };

    for (byte_offset, opp) in linebreaks(text) {
        result[byte_to_char[byte_offset]] = Some(opp);
    }
    result[0] = None;

    result
}

/// Char offsets at which a new grapheme cluster starts.
fn compute_grapheme_starts(text: &str, char_count: usize) -> Vec<bool> {
    let mut starts = vec![false; char_count + 1];
    let mut char_idx = 0;
    for grapheme in text.graphemes(true) {
        starts[char_idx] = true;
        char_idx += grapheme.chars().count();
    }
    starts[char_count] = true;
    starts
}

/// Primary language subtags with a hyphenation dictionary.
const HYPHENATION_LANGS: &[(&str, hypher::Lang)] = &[
    ("af", hypher::Lang::Afrikaans),
    ("be", hypher::Lang::Belarusian),
    ("bg", hypher::Lang::Bulgarian),
    ("ca", hypher::Lang::Catalan),
    ("cs", hypher::Lang::Czech),
    ("da", hypher::Lang::Danish),
    ("de", hypher::Lang::German),
    ("el", hypher::Lang::Greek),
    ("en", hypher::Lang::English),
    ("es", hypher::Lang::Spanish),
    ("et", hypher::Lang::Estonian),
    ("fi", hypher::Lang::Finnish),
    ("fr", hypher::Lang::French),
    ("hr", hypher::Lang::Croatian),
    ("hu", hypher::Lang::Hungarian),
    ("is", hypher::Lang::Icelandic),
    ("it", hypher::Lang::Italian),
    ("ka", hypher::Lang::Georgian),
    ("ku", hypher::Lang::Kurmanji),
    ("la", hypher::Lang::Latin),
    ("lt", hypher::Lang::Lithuanian),
    ("mn", hypher::Lang::Mongolian),
    ("nb", hypher::Lang::Norwegian),
    ("nl", hypher::Lang::Dutch),
    ("nn", hypher::Lang::Norwegian),
    ("no", hypher::Lang::Norwegian),
    ("pl", hypher::Lang::Polish),
    ("pt", hypher::Lang::Portuguese),
    ("ru", hypher::Lang::Russian),
    ("sk", hypher::Lang::Slovak),
    ("sl", hypher::Lang::Slovenian),
    ("sq", hypher::Lang::Albanian),
    ("sr", hypher::Lang::Serbian),
    ("sv", hypher::Lang::Swedish),
    ("tk", hypher::Lang::Turkmen),
    ("tr", hypher::Lang::Turkish),
    ("uk", hypher::Lang::Ukrainian),
];

/// The hyphenation dictionary for a paragraph's locale. Paragraphs without a
/// locale hyphenate as English; unknown languages do not hyphenate.
fn hyphenation_lang(locale: Option<&str>) -> Option<hypher::Lang> {
    let Some(locale) = locale else {
        return Some(hypher::Lang::English);
    };
    let primary = locale.split(['-', '_']).next().unwrap_or_default();
    HYPHENATION_LANGS
        .iter()
        .find(|(subtag, _)| subtag.eq_ignore_ascii_case(primary))
        .map(|&(_, lang)| lang)
}

/// Break opportunity lookup for one paragraph.
///
/// Everything is computed once in [`LineBreakIterator::new`]; queries take
/// `&self` and can be issued for any line in any order.
#[derive(Debug)]
pub struct LineBreakIterator {
    chars: Vec<char>,
    opportunities: Vec<Option<BreakOpportunity>>,
    grapheme_starts: Option<Vec<bool>>,
    break_type: LineBreakType,
    hyphens: Hyphens,
    hyphenation_lang: Option<hypher::Lang>,
}

impl LineBreakIterator {
    pub fn new(
        text: &str,
        locale: Option<&str>,
        break_type: LineBreakType,
        hyphens: Hyphens,
    ) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let grapheme_starts = (break_type == LineBreakType::BreakAll)
            .then(|| compute_grapheme_starts(text, chars.len()));
        let hyphenation_lang = if hyphens == Hyphens::Auto {
            hyphenation_lang(locale)
        } else {
            None
        };
        Self {
            opportunities: compute_break_opportunities(text),
            chars,
            grapheme_starts,
            break_type,
            hyphens,
            hyphenation_lang,
        }
    }

    /// Number of chars in the paragraph.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn break_type(&self) -> LineBreakType {
        self.break_type
    }

    /// Whether a line must end at `offset` (after a newline or paragraph
    /// separator). The end of the text is not reported.
    pub fn is_mandatory_break(&self, offset: usize) -> bool {
        offset > 0
            && offset < self.len()
            && matches!(self.opportunities[offset], Some(BreakOpportunity::Mandatory))
    }

    /// Whether a line may end at `offset`.
    pub fn is_breakable(&self, offset: usize) -> bool {
        if offset == 0 {
            return false;
        }
        if offset >= self.len() {
            return true;
        }
        if self.is_mandatory_break(offset) {
            return true;
        }

        let prev = self.chars[offset - 1];
        let current = self.chars[offset];

        if is_breaking_space(current) {
            if is_breaking_space(prev) {
                return false;
            }
            let run_end = (offset..self.len())
                .find(|&i| !is_breaking_space(self.chars[i]))
                .unwrap_or(self.len());
            return run_end == self.len() || self.opportunities[run_end].is_some();
        }
        if is_breaking_space(prev) {
            // Reported at the start of the space run.
            return false;
        }
        if prev == SOFT_HYPHEN {
            return self.hyphens != Hyphens::None;
        }

        let allowed = matches!(self.opportunities[offset], Some(BreakOpportunity::Allowed));
        match self.break_type {
            LineBreakType::Normal => allowed,
            LineBreakType::KeepAll => allowed && !(is_word_char(prev) && is_word_char(current)),
            LineBreakType::BreakAll => {
                let Some(starts) = self.grapheme_starts.as_ref() else {
                    return allowed;
                };
                // Letters carrying combining marks count by their base char.
                let mut base = offset - 1;
                while base > 0 && !starts[base] {
                    base -= 1;
                }
                allowed || (starts[offset] && is_word_char(self.chars[base]) && is_word_char(current))
            }
        }
    }

    /// The last break opportunity in `(start, offset]`, or `start` if there
    /// is none.
    pub fn previous_break_opportunity(&self, start: usize, offset: usize) -> usize {
        let offset = offset.min(self.len());
        (start + 1..=offset)
            .rev()
            .find(|&i| self.is_breakable(i))
            .unwrap_or(start)
    }

    /// The first break opportunity at or after `offset`; the end of the
    /// text always is one.
    pub fn next_break_opportunity(&self, offset: usize) -> usize {
        (offset..self.len())
            .find(|&i| self.is_breakable(i))
            .unwrap_or(self.len())
    }

    /// The first mandatory break in `(start, end]`.
    pub fn next_mandatory_break(&self, start: usize, end: usize) -> Option<usize> {
        (start + 1..=end.min(self.len())).find(|&i| self.is_mandatory_break(i))
    }

    /// Whether a line ending at `offset` ends at a soft hyphen and must show
    /// a visible hyphen.
    pub fn is_soft_hyphen_break(&self, offset: usize) -> bool {
        self.hyphens != Hyphens::None
            && offset > 0
            && offset <= self.len()
            && self.chars[offset - 1] == SOFT_HYPHEN
    }

    /// Dictionary hyphenation points of the word containing `around`, in
    /// ascending order, restricted to offsets after `start`.
    ///
    /// Empty unless `hyphens: auto` is in effect for a supported language.
    pub fn hyphenation_opportunities(&self, start: usize, around: usize) -> Vec<usize> {
        let Some(lang) = self.hyphenation_lang else {
            return Vec::new();
        };
        let around = around.min(self.len());

        let mut word_start = around;
        while word_start > start && self.chars[word_start - 1].is_alphabetic() {
            word_start -= 1;
        }
        let mut word_end = around;
        while word_end < self.len() && self.chars[word_end].is_alphabetic() {
            word_end += 1;
        }
        if word_end <= word_start {
            return Vec::new();
        }

        let word: String = self.chars[word_start..word_end].iter().collect();
        let mut boundaries = Vec::new();
        let mut offset = word_start;
        let syllables: Vec<&str> = hypher::hyphenate(&word, lang).collect();
        for syllable in syllables.iter().take(syllables.len().saturating_sub(1)) {
            offset += syllable.chars().count();
            if offset > start {
                boundaries.push(offset);
            }
        }
        boundaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal(text: &str) -> LineBreakIterator {
        LineBreakIterator::new(text, None, LineBreakType::Normal, Hyphens::Manual)
    }

    #[test]
    fn test_breaks_before_spaces() {
        let it = normal("The quick brown fox");
        assert!(it.is_breakable(3));
        assert!(!it.is_breakable(4));
        assert!(it.is_breakable(9));
        assert!(!it.is_breakable(10));
        assert!(it.is_breakable(15));
        assert!(it.is_breakable(19));
        assert!(!it.is_breakable(0));
        assert!(!it.is_breakable(2));
    }

    #[test]
    fn test_space_runs_report_first_space() {
        let it = normal("quick   brown");
        assert!(it.is_breakable(5));
        assert!(!it.is_breakable(6));
        assert!(!it.is_breakable(7));
        assert!(!it.is_breakable(8));
        assert_eq!(it.previous_break_opportunity(0, 7), 5);
    }

    #[test]
    fn test_no_break_before_exclamation() {
        // UAX#14 LB13: no break before '!' even after a space
        let it = normal("a !");
        assert!(!it.is_breakable(1));
        assert_eq!(it.next_break_opportunity(1), 3);
    }

    #[test]
    fn test_hyphen_break() {
        let it = normal("well-known");
        assert!(it.is_breakable(5));
        assert!(!it.is_breakable(4));
    }

    #[test]
    fn test_previous_and_next() {
        let it = normal("The quick brown fox");
        assert_eq!(it.previous_break_opportunity(0, 12), 9);
        assert_eq!(it.previous_break_opportunity(0, 2), 0);
        assert_eq!(it.previous_break_opportunity(10, 12), 10);
        assert_eq!(it.next_break_opportunity(10), 15);
        assert_eq!(it.next_break_opportunity(16), 19);
    }

    #[test]
    fn test_mandatory_break() {
        let it = normal("ab\ncd");
        assert!(it.is_mandatory_break(3));
        assert!(it.is_breakable(3));
        assert!(!it.is_mandatory_break(5));
        assert_eq!(it.next_mandatory_break(0, 4), Some(3));
        assert_eq!(it.next_mandatory_break(3, 5), None);
    }

    #[test]
    fn test_cjk_break_opportunities() {
        // 你好世界
        let it = normal("\u{4F60}\u{597D}\u{4E16}\u{754C}");
        let allowed = (1..4).filter(|&i| it.is_breakable(i)).count();
        assert!(
            allowed >= 2,
            "Should have at least 2 break opportunities between 4 CJK chars, got {allowed}"
        );
    }

    #[test]
    fn test_keep_all_suppresses_cjk_breaks() {
        let it = LineBreakIterator::new(
            "\u{4F60}\u{597D} \u{4E16}\u{754C}",
            None,
            LineBreakType::KeepAll,
            Hyphens::Manual,
        );
        assert!(!it.is_breakable(1));
        assert!(it.is_breakable(2));
        assert!(!it.is_breakable(4));
    }

    #[test]
    fn test_break_all_breaks_inside_words() {
        let it = LineBreakIterator::new("abc def", None, LineBreakType::BreakAll, Hyphens::Manual);
        assert!(it.is_breakable(1));
        assert!(it.is_breakable(2));
        assert!(it.is_breakable(3));
        assert!(!it.is_breakable(4));
        assert!(it.is_breakable(5));
    }

    #[test]
    fn test_break_all_respects_graphemes() {
        // 'e' + combining acute is one grapheme
        let it = LineBreakIterator::new(
            "ae\u{0301}b",
            None,
            LineBreakType::BreakAll,
            Hyphens::Manual,
        );
        assert!(it.is_breakable(1));
        assert!(!it.is_breakable(2));
        assert!(it.is_breakable(3));
    }

    #[test]
    fn test_soft_hyphen() {
        let text = "extra\u{00AD}ordinary";
        let manual = LineBreakIterator::new(text, None, LineBreakType::Normal, Hyphens::Manual);
        assert!(manual.is_breakable(6));
        assert!(manual.is_soft_hyphen_break(6));
        let none = LineBreakIterator::new(text, None, LineBreakType::Normal, Hyphens::None);
        assert!(!none.is_breakable(6));
        assert!(!none.is_soft_hyphen_break(6));
    }

    #[test]
    fn test_hyphenation_opportunities() {
        let it = LineBreakIterator::new(
            "an extraordinary word",
            Some("en"),
            LineBreakType::Normal,
            Hyphens::Auto,
        );
        let points = it.hyphenation_opportunities(0, 8);
        assert!(!points.is_empty(), "extraordinary should hyphenate");
        assert!(points.iter().all(|&p| p > 3 && p < 16));
        assert!(points.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_hyphenation_disabled_without_auto() {
        let it = normal("extraordinary");
        assert!(it.hyphenation_opportunities(0, 5).is_empty());
    }

    #[test]
    fn test_hyphenation_unsupported_lang() {
        let it = LineBreakIterator::new(
            "extraordinary",
            Some("xx-unknown"),
            LineBreakType::Normal,
            Hyphens::Auto,
        );
        assert!(it.hyphenation_opportunities(0, 5).is_empty());
    }

    #[test]
    fn test_hyphenation_lang_from_locale() {
        assert!(matches!(
            hyphenation_lang(None),
            Some(hypher::Lang::English)
        ));
        assert!(matches!(
            hyphenation_lang(Some("en-US")),
            Some(hypher::Lang::English)
        ));
        assert!(matches!(
            hyphenation_lang(Some("de")),
            Some(hypher::Lang::German)
        ));
        assert!(matches!(
            hyphenation_lang(Some("nn")),
            Some(hypher::Lang::Norwegian)
        ));
        assert!(matches!(
            hyphenation_lang(Some("PT_br")),
            Some(hypher::Lang::Portuguese)
        ));
        assert!(hyphenation_lang(Some("zz")).is_none());
        assert!(hyphenation_lang(Some("")).is_none());
    }
}
