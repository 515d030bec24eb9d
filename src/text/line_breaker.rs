//! # Shaping Line Breaker
//!
//! Cuts a paragraph into lines using the shape result of the whole paragraph.
//!
//! The ideal break position is found by measuring the precomputed advances,
//! then the break opportunities are scanned backwards from there. Unless the
//! chosen opportunity is a safe-to-break boundary of the paragraph result, the
//! edges of the line are reshaped in isolation: a cut inside a ligature or a
//! kerned pair changes the glyphs on both sides of it. Everything between the
//! first and last safe boundary of the line is copied from the paragraph
//! result as-is.
//!
//! This only evaluates likely candidate breaks and only reshapes when the cut
//! requires it, instead of measuring every possible option.

use std::sync::OnceLock;

use crate::font::Font;
use crate::style::Hyphens;
use crate::text::break_iterator::{LineBreakIterator, LineBreakType};
use crate::text::shaping::{char_to_byte_offsets, ShapeResult, Shaper};

/// Slack for comparing accumulated advances against the available space.
const FIT_EPSILON: f64 = 1e-6;

/// One line produced by [`ShapingLineBreaker::shape_line`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedLine {
    /// Glyphs for `[start_offset, break_offset)`.
    pub shape_result: ShapeResult,
    /// Where the line ends and the next one starts.
    pub break_offset: usize,
    /// A visible hyphen to draw after the line, when it ends at a soft hyphen
    /// or a dictionary hyphenation point. Its clusters point at `break_offset`.
    pub hyphen: Option<ShapeResult>,
}

impl ShapedLine {
    /// Advance width of the line, hyphen included.
    pub fn width(&self) -> f64 {
        self.shape_result.width() + self.hyphen.as_ref().map_or(0.0, ShapeResult::width)
    }

    pub fn start_offset(&self) -> usize {
        self.shape_result.start_offset()
    }
}

/// Breaks one paragraph into lines.
///
/// The breaker borrows the shaper, font, paragraph shape result and text for
/// its lifetime and never mutates them. Char positions are computed in
/// [`new`](Self::new); break opportunities on the first line request, once the
/// hyphenation mode is settled. [`shape_line`](Self::shape_line) keeps no
/// other state between calls, so lines can be requested in any order.
pub struct ShapingLineBreaker<'a, S: Shaper + ?Sized> {
    shaper: &'a S,
    font: &'a Font<'a>,
    result: &'a ShapeResult,
    text: &'a str,
    locale: Option<String>,
    break_type: LineBreakType,
    hyphens: Hyphens,
    break_iterator: OnceLock<LineBreakIterator>,
    char_to_byte: Vec<usize>,
    /// X position of each char offset relative to the paragraph start.
    positions: Vec<f64>,
}

impl<'a, S: Shaper + ?Sized> ShapingLineBreaker<'a, S> {
    /// `result` must be the shape result of all of `text`, starting at offset 0.
    pub fn new(
        shaper: &'a S,
        font: &'a Font<'a>,
        result: &'a ShapeResult,
        text: &'a str,
        locale: Option<&str>,
        break_type: LineBreakType,
    ) -> Self {
        let char_to_byte = char_to_byte_offsets(text);
        let num_chars = char_to_byte.len() - 1;
        assert!(
            result.start_offset() == 0 && result.end_offset() == num_chars,
            "paragraph shape result [{}, {}) does not cover text of length {num_chars}",
            result.start_offset(),
            result.end_offset()
        );
        Self {
            shaper,
            font,
            result,
            text,
            locale: locale.map(str::to_string),
            break_type,
            hyphens: Hyphens::default(),
            break_iterator: OnceLock::new(),
            char_to_byte,
            positions: result.char_positions(),
        }
    }

    /// Selects how hyphens are handled. Soft hyphens are honoured by default.
    pub fn with_hyphens(mut self, hyphens: Hyphens) -> Self {
        self.hyphens = hyphens;
        self.break_iterator = OnceLock::new();
        self
    }

    /// Number of chars in the paragraph.
    pub fn text_length(&self) -> usize {
        self.positions.len() - 1
    }

    fn break_iterator(&self) -> &LineBreakIterator {
        self.break_iterator.get_or_init(|| {
            LineBreakIterator::new(self.text, self.locale.as_deref(), self.break_type, self.hyphens)
        })
    }

    /// Shapes the line starting at `start_offset` so that it fits in
    /// `available_space` where possible.
    ///
    /// The returned break offset is always greater than `start_offset`: when
    /// not even one word fits (including `available_space <= 0`), the line
    /// extends to the first break opportunity and overflows.
    ///
    /// # Panics
    ///
    /// Panics if `start_offset` is not inside the text.
    pub fn shape_line(&self, start_offset: usize, available_space: f64) -> ShapedLine {
        let text_length = self.text_length();
        assert!(
            start_offset < text_length,
            "start offset {start_offset} out of range for text of length {text_length}"
        );

        let candidate = self.offset_for_position(start_offset, available_space);
        if let Some(mandatory) = self
            .break_iterator()
            .next_mandatory_break(start_offset, candidate)
        {
            return self.make_line(start_offset, mandatory);
        }
        if candidate >= text_length {
            return self.make_line(start_offset, text_length);
        }

        let mut break_offset = self
            .break_iterator()
            .previous_break_opportunity(start_offset, candidate);
        let forced = break_offset <= start_offset;
        if forced {
            if let Some(line) = self.hyphenate(start_offset, candidate, available_space) {
                return line;
            }
            break_offset = self
                .break_iterator()
                .next_break_opportunity(candidate.max(start_offset + 1));
            log::trace!(
                "no break opportunity in [{start_offset}, {candidate}], forcing break at {break_offset}"
            );
        }

        loop {
            let line = self.make_line(start_offset, break_offset);
            if forced || line.width() <= available_space + FIT_EPSILON {
                return line;
            }
            // Reshaping the edges made the line wider than the measurement
            // promised; fall back to an earlier opportunity if there is one.
            let previous = self
                .break_iterator()
                .previous_break_opportunity(start_offset, break_offset - 1);
            if previous <= start_offset {
                return line;
            }
            log::debug!(
                "reshaped line [{start_offset}, {break_offset}) overflows by {}, retrying at {previous}",
                line.width() - available_space
            );
            break_offset = previous;
        }
    }

    /// The largest offset whose position from `start` is within
    /// `available_space`, never less than `start`.
    fn offset_for_position(&self, start: usize, available_space: f64) -> usize {
        let end_position = self.positions[start] + available_space + FIT_EPSILON;
        let fitting = self.positions.partition_point(|&x| x <= end_position);
        fitting.saturating_sub(1).max(start)
    }

    fn make_line(&self, start: usize, break_offset: usize) -> ShapedLine {
        let hyphen = self
            .break_iterator()
            .is_soft_hyphen_break(break_offset)
            .then(|| self.shape_hyphen(break_offset));
        ShapedLine {
            shape_result: self.shape_range(start, break_offset),
            break_offset,
            hyphen,
        }
    }

    /// Tries the dictionary hyphenation points of the word at `candidate`,
    /// rightmost first.
    fn hyphenate(&self, start: usize, candidate: usize, available_space: f64) -> Option<ShapedLine> {
        let points = self.break_iterator().hyphenation_opportunities(start, candidate);
        points
            .into_iter()
            .rev()
            .filter(|&point| point <= candidate)
            .map(|point| ShapedLine {
                shape_result: self.shape_range(start, point),
                break_offset: point,
                hyphen: Some(self.shape_hyphen(point)),
            })
            .find(|line| line.width() <= available_space + FIT_EPSILON)
    }

    fn shape_hyphen(&self, at: usize) -> ShapeResult {
        self.shaper.shape(self.font, "-", at)
    }

    /// Glyphs for `[start, end)`, reusing the paragraph result between the
    /// first and last safe-to-break boundaries of the range.
    fn shape_range(&self, start: usize, end: usize) -> ShapeResult {
        let first_safe = self.result.next_safe_to_break_offset(start);
        let last_safe = self.result.previous_safe_to_break_offset(end);
        if first_safe >= last_safe {
            return self.reshape(start, end);
        }

        let mut line = self.result.empty_at(start);
        if first_safe > start {
            line.append(self.reshape(start, first_safe));
        }
        line.append(self.result.sub_range(first_safe, last_safe));
        if last_safe < end {
            line.append(self.reshape(last_safe, end));
        }
        line
    }

    fn reshape(&self, start: usize, end: usize) -> ShapeResult {
        log::debug!("reshaping [{start}, {end}) at an unsafe line edge");
        let text = &self.text[self.char_to_byte[start]..self.char_to_byte[end]];
        self.shaper.shape(self.font, text, start)
    }
}
