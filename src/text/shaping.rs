//! # OpenType Shaping
//!
//! Produces [`ShapeResult`]s: glyph runs with advances and safe-to-break
//! flags. Custom fonts go through rustybuzz (GSUB/GPOS); the built-in faces
//! are shaped from their metrics tables, applying pair kerning and the
//! `fi`/`fl` ligatures so that they report unsafe break positions the same way
//! an OpenType shaper does.
//!
//! All offsets are char indices into the paragraph text, not byte offsets.

use serde::Serialize;

use crate::font::{Font, FontData, StandardFontMetrics};

/// A single glyph produced by shaping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapedGlyph {
    /// Glyph ID in the font (for built-in faces, the code point).
    pub glyph_id: u16,
    /// Paragraph char index of the first character that maps to this glyph.
    /// Multiple chars may map to one glyph (ligatures), or one char may
    /// produce multiple glyphs (decomposition).
    pub cluster: u32,
    /// Horizontal advance in font units.
    pub x_advance: i32,
    /// Vertical advance in font units (usually 0 for horizontal text).
    pub y_advance: i32,
    /// Horizontal offset from GPOS (kerning, mark positioning).
    pub x_offset: i32,
    /// Vertical offset from GPOS.
    pub y_offset: i32,
    /// Cutting the text right before this glyph's cluster would change the
    /// shaping on either side of the cut.
    pub unsafe_to_break: bool,
}

/// Glyphs for the char range `[start, end)` of a paragraph, in logical order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeResult {
    start: usize,
    end: usize,
    glyphs: Vec<ShapedGlyph>,
    /// Points per font unit.
    scale: f64,
    letter_spacing: f64,
}

impl ShapeResult {
    pub fn new(
        start: usize,
        end: usize,
        glyphs: Vec<ShapedGlyph>,
        scale: f64,
        letter_spacing: f64,
    ) -> Self {
        debug_assert!(start <= end);
        debug_assert!(glyphs
            .windows(2)
            .all(|pair| pair[0].cluster <= pair[1].cluster));
        Self {
            start,
            end,
            glyphs,
            scale,
            letter_spacing,
        }
    }

    /// An empty result positioned at `offset`, ready to be appended to.
    pub fn empty(offset: usize, scale: f64, letter_spacing: f64) -> Self {
        Self::new(offset, offset, Vec::new(), scale, letter_spacing)
    }

    /// An empty result at `offset` using this result's font scale.
    pub fn empty_at(&self, offset: usize) -> Self {
        Self::empty(offset, self.scale, self.letter_spacing)
    }

    pub fn start_offset(&self) -> usize {
        self.start
    }

    pub fn end_offset(&self) -> usize {
        self.end
    }

    pub fn num_characters(&self) -> usize {
        self.end - self.start
    }

    pub fn glyphs(&self) -> &[ShapedGlyph] {
        &self.glyphs
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Advance of one glyph in points, letter spacing included.
    pub fn glyph_advance(&self, glyph: &ShapedGlyph) -> f64 {
        glyph.x_advance as f64 * self.scale + self.letter_spacing
    }

    /// Total advance width in points.
    pub fn width(&self) -> f64 {
        self.glyphs.iter().map(|g| self.glyph_advance(g)).sum()
    }

    /// X position of every char offset in `[start, end]`, relative to the
    /// start of this result. Entry `i` is the position before char
    /// `start + i`; the last entry equals [`ShapeResult::width`].
    pub fn char_positions(&self) -> Vec<f64> {
        let widths = cluster_widths(
            &self.glyphs,
            self.start,
            self.num_characters(),
            self.scale,
            self.letter_spacing,
        );
        let mut positions = Vec::with_capacity(widths.len() + 1);
        let mut x = 0.0;
        positions.push(x);
        for w in widths {
            x += w;
            positions.push(x);
        }
        positions
    }

    /// Index of the first glyph whose cluster is at or after `offset`.
    fn glyph_index_for_offset(&self, offset: usize) -> usize {
        self.glyphs
            .partition_point(|g| (g.cluster as usize) < offset)
    }

    /// Whether glyph `i` starts a new cluster.
    fn is_cluster_start(&self, i: usize) -> bool {
        i == 0 || self.glyphs[i - 1].cluster != self.glyphs[i].cluster
    }

    /// Whether the result can be cut at `offset` without reshaping.
    ///
    /// The edges of the result are always safe. Inside, the offset must
    /// start a cluster whose first glyph is not flagged unsafe; offsets
    /// inside a ligature have no glyph of their own and are never safe.
    pub fn is_safe_to_break(&self, offset: usize) -> bool {
        assert!(
            (self.start..=self.end).contains(&offset),
            "offset {offset} outside shape result [{}, {}]",
            self.start,
            self.end
        );
        if offset == self.start || offset == self.end {
            return true;
        }
        let i = self.glyph_index_for_offset(offset);
        self.glyphs
            .get(i)
            .is_some_and(|g| g.cluster as usize == offset && !g.unsafe_to_break)
    }

    /// The first safe-to-break offset at or after `offset`.
    pub fn next_safe_to_break_offset(&self, offset: usize) -> usize {
        if self.is_safe_to_break(offset) {
            return offset;
        }
        let first = self.glyph_index_for_offset(offset);
        (first..self.glyphs.len())
            .filter(|&i| self.is_cluster_start(i))
            .map(|i| &self.glyphs[i])
            .find(|g| g.cluster as usize > offset && !g.unsafe_to_break)
            .map(|g| g.cluster as usize)
            .unwrap_or(self.end)
    }

    /// The last safe-to-break offset at or before `offset`.
    pub fn previous_safe_to_break_offset(&self, offset: usize) -> usize {
        if self.is_safe_to_break(offset) {
            return offset;
        }
        let first = self.glyph_index_for_offset(offset);
        (0..first)
            .rev()
            .filter(|&i| self.is_cluster_start(i))
            .map(|i| &self.glyphs[i])
            .find(|g| !g.unsafe_to_break)
            .map(|g| (g.cluster as usize).max(self.start))
            .unwrap_or(self.start)
    }

    /// Copy of the glyphs covering `[start, end)`. Both ends should be safe
    /// to break, otherwise the copy is not what shaping that range would give.
    pub fn sub_range(&self, start: usize, end: usize) -> ShapeResult {
        assert!(
            self.start <= start && start <= end && end <= self.end,
            "range [{start}, {end}) outside shape result [{}, {})",
            self.start,
            self.end
        );
        let from = self.glyph_index_for_offset(start);
        let to = self.glyph_index_for_offset(end);
        let mut glyphs = self.glyphs[from..to].to_vec();
        // The cut edges no longer have a neighbour to interact with.
        if let Some(first) = glyphs.first_mut() {
            first.unsafe_to_break = false;
        }
        ShapeResult::new(start, end, glyphs, self.scale, self.letter_spacing)
    }

    /// Append a result that starts where this one ends.
    pub fn append(&mut self, other: ShapeResult) {
        assert_eq!(
            self.end, other.start,
            "appended shape result must be contiguous"
        );
        debug_assert!((self.scale - other.scale).abs() < f64::EPSILON);
        self.end = other.end;
        self.glyphs.extend(other.glyphs);
    }
}

/// Compute per-char widths from shaped glyphs.
///
/// Returns a Vec where index i is the width contributed by the glyph(s)
/// whose cluster is `start + i`. For ligatures, the first char of the cluster
/// gets the full width and the chars it swallowed get zero.
pub fn cluster_widths(
    glyphs: &[ShapedGlyph],
    start: usize,
    num_chars: usize,
    scale: f64,
    letter_spacing: f64,
) -> Vec<f64> {
    let mut widths = vec![0.0_f64; num_chars];
    for glyph in glyphs {
        let Some(i) = (glyph.cluster as usize).checked_sub(start) else {
            continue;
        };
        if i < num_chars {
            widths[i] += glyph.x_advance as f64 * scale + letter_spacing;
        }
    }
    widths
}

/// Builds the char index → byte offset table for `text`, with a trailing
/// entry for `text.len()`.
pub fn char_to_byte_offsets(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(text.len()))
        .collect()
}

/// Produces shape results for runs of text.
///
/// The line breaker calls this to reshape the edges of a line in isolation.
/// Implementations must be deterministic: shaping the same text with the
/// same font always yields the same glyphs.
pub trait Shaper {
    /// Shape `text`, whose first char sits at paragraph offset `char_offset`.
    fn shape(&self, font: &Font<'_>, text: &str, char_offset: usize) -> ShapeResult;
}

/// The default shaper: rustybuzz for custom fonts, metrics tables for the
/// built-in faces.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextShaper;

impl Shaper for TextShaper {
    fn shape(&self, font: &Font<'_>, text: &str, char_offset: usize) -> ShapeResult {
        let num_chars = text.chars().count();
        let glyphs = match (font.data(), font.shaping_face()) {
            (FontData::Standard(standard), _) => {
                shape_standard(text, standard.metrics(), font.ligatures, char_offset)
            }
            (FontData::Custom { .. }, Some(face)) => {
                shape_opentype(text, face, font.ligatures, char_offset)
            }
            (FontData::Custom { metrics, .. }, None) => {
                notdef_glyphs(num_chars, metrics.units_per_em, char_offset)
            }
        };
        log::trace!(
            "shaped [{}, {}) into {} glyphs",
            char_offset,
            char_offset + num_chars,
            glyphs.len()
        );
        ShapeResult::new(
            char_offset,
            char_offset + num_chars,
            glyphs,
            font.scale(),
            font.letter_spacing,
        )
    }
}

fn shape_standard(
    text: &str,
    metrics: &StandardFontMetrics,
    ligatures: bool,
    char_offset: usize,
) -> Vec<ShapedGlyph> {
    let chars: Vec<char> = text.chars().collect();
    let mut glyphs = Vec::with_capacity(chars.len());
    // First and last source char of every glyph, for kerning.
    let mut sources: Vec<(char, char)> = Vec::with_capacity(chars.len());

    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        let ligature = chars
            .get(i + 1)
            .filter(|_| ligatures)
            .and_then(|&next| metrics.ligature(ch, next).map(|lig| (next, lig)));
        let (glyph_char, advance, consumed, last) = match ligature {
            Some((next, (lig, width))) => (lig, width, 2, next),
            None => (ch, metrics.advance(ch), 1, ch),
        };
        glyphs.push(ShapedGlyph {
            glyph_id: u16::try_from(glyph_char as u32).unwrap_or(0),
            cluster: (char_offset + i) as u32,
            x_advance: advance as i32,
            y_advance: 0,
            x_offset: 0,
            y_offset: 0,
            unsafe_to_break: false,
        });
        sources.push((ch, last));
        i += consumed;
    }

    for k in 1..glyphs.len() {
        let kern = metrics.kerning(sources[k - 1].1, sources[k].0);
        if kern != 0 {
            glyphs[k - 1].x_advance += kern as i32;
            glyphs[k].unsafe_to_break = true;
        }
    }

    glyphs
}

fn shape_opentype(
    text: &str,
    face: &rustybuzz::Face<'_>,
    ligatures: bool,
    char_offset: usize,
) -> Vec<ShapedGlyph> {
    let mut buffer = rustybuzz::UnicodeBuffer::new();
    buffer.push_str(text);
    buffer.set_direction(rustybuzz::Direction::LeftToRight);

    let features: Vec<rustybuzz::Feature> = if ligatures {
        Vec::new()
    } else {
        [b"liga", b"clig"]
            .iter()
            .map(|tag| rustybuzz::Feature::new(rustybuzz::ttf_parser::Tag::from_bytes(tag), 0, ..))
            .collect()
    };

    let output = rustybuzz::shape(face, &features, buffer);

    // rustybuzz clusters are byte offsets into the pushed text.
    let byte_to_char: Vec<usize> = {
        let mut map = vec![0usize; text.len() + 1];
        for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
            map[byte_idx] = char_idx;
        }
        map[text.len()] = text.chars().count();
        map
    };

    output
        .glyph_infos()
        .iter()
        .zip(output.glyph_positions().iter())
        .map(|(info, pos)| ShapedGlyph {
            glyph_id: info.glyph_id as u16,
            cluster: (char_offset + byte_to_char[info.cluster as usize]) as u32,
            x_advance: pos.x_advance,
            y_advance: pos.y_advance,
            x_offset: pos.x_offset,
            y_offset: pos.y_offset,
            unsafe_to_break: info.unsafe_to_break(),
        })
        .collect()
}

fn notdef_glyphs(num_chars: usize, units_per_em: u16, char_offset: usize) -> Vec<ShapedGlyph> {
    (0..num_chars)
        .map(|i| ShapedGlyph {
            glyph_id: 0,
            cluster: (char_offset + i) as u32,
            x_advance: units_per_em as i32 / 2,
            y_advance: 0,
            x_offset: 0,
            y_offset: 0,
            unsafe_to_break: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{CustomFontMetrics, StandardFont};

    fn helvetica() -> Font<'static> {
        Font::standard(StandardFont::Helvetica, 10.0)
    }

    fn glyph(cluster: u32, x_advance: i32) -> ShapedGlyph {
        ShapedGlyph {
            glyph_id: 1,
            cluster,
            x_advance,
            y_advance: 0,
            x_offset: 0,
            y_offset: 0,
            unsafe_to_break: false,
        }
    }

    #[test]
    fn test_shape_plain_text() {
        let result = TextShaper.shape(&helvetica(), "Hello", 0);
        assert_eq!(result.glyphs().len(), 5);
        assert_eq!(result.num_characters(), 5);
        assert!(result.glyphs().iter().all(|g| !g.unsafe_to_break));
        // H=722 e=556 l=222 l=222 o=556 → 2278 units at 10pt
        assert!((result.width() - 22.78).abs() < 1e-9);
    }

    #[test]
    fn test_shape_with_offset() {
        let result = TextShaper.shape(&helvetica(), "ab", 7);
        assert_eq!(result.start_offset(), 7);
        assert_eq!(result.end_offset(), 9);
        assert_eq!(result.glyphs()[1].cluster, 8);
    }

    #[test]
    fn test_ligature_makes_inner_offset_unsafe() {
        let result = TextShaper.shape(&helvetica(), "fit", 0);
        assert_eq!(result.glyphs().len(), 2);
        assert_eq!(result.glyphs()[0].glyph_id, 0xFB01);
        assert!(result.is_safe_to_break(0));
        assert!(!result.is_safe_to_break(1));
        assert!(result.is_safe_to_break(2));
        assert_eq!(result.next_safe_to_break_offset(1), 2);
        assert_eq!(result.previous_safe_to_break_offset(1), 0);
    }

    #[test]
    fn test_ligatures_disabled() {
        let font = helvetica().with_ligatures(false);
        let result = TextShaper.shape(&font, "fit", 0);
        assert_eq!(result.glyphs().len(), 3);
        assert!(result.is_safe_to_break(1));
    }

    #[test]
    fn test_kerning_marks_unsafe() {
        let result = TextShaper.shape(&helvetica(), "AV", 0);
        // A=667 kerned by -70
        assert_eq!(result.glyphs()[0].x_advance, 597);
        assert!(result.glyphs()[1].unsafe_to_break);
        assert!(!result.is_safe_to_break(1));
    }

    #[test]
    fn test_sub_range_and_append_rebuild_result() {
        let full = TextShaper.shape(&helvetica(), "one two", 0);
        let mut rebuilt = full.sub_range(0, 3);
        rebuilt.append(full.sub_range(3, 7));
        assert_eq!(rebuilt, full);
    }

    #[test]
    fn test_sub_range_matches_reshape_at_safe_offsets() {
        let full = TextShaper.shape(&helvetica(), "one two", 0);
        let tail = TextShaper.shape(&helvetica(), "two", 4);
        assert_eq!(full.sub_range(4, 7), tail);
    }

    #[test]
    fn test_char_positions() {
        let result = TextShaper.shape(&helvetica(), "fix", 0);
        let positions = result.char_positions();
        assert_eq!(positions.len(), 4);
        assert_eq!(positions[0], 0.0);
        // The ligature's width lands on 'f', the 'i' adds nothing.
        assert!((positions[1] - 5.0).abs() < 1e-9);
        assert!((positions[2] - 5.0).abs() < 1e-9);
        assert!((positions[3] - result.width()).abs() < 1e-9);
    }

    #[test]
    fn test_letter_spacing_applies_per_glyph() {
        let font = helvetica().with_letter_spacing(1.0);
        let spaced = TextShaper.shape(&font, "ab", 0);
        let plain = TextShaper.shape(&helvetica(), "ab", 0);
        assert!((spaced.width() - plain.width() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_shape_empty() {
        let result = TextShaper.shape(&helvetica(), "", 3);
        assert!(result.is_empty());
        assert_eq!(result.width(), 0.0);
    }

    #[test]
    fn test_cluster_widths_basic() {
        let glyphs = vec![glyph(0, 500), glyph(1, 600), glyph(2, 500)];
        let widths = cluster_widths(&glyphs, 0, 3, 0.01, 0.0);
        assert_eq!(widths.len(), 3);
        assert!((widths[0] - 5.0).abs() < 0.001);
        assert!((widths[1] - 6.0).abs() < 0.001);
        assert!((widths[2] - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_cluster_widths_ligature() {
        // One glyph for chars 0 and 1
        let glyphs = vec![glyph(10, 800), glyph(12, 500)];
        let widths = cluster_widths(&glyphs, 10, 3, 0.01, 0.0);
        assert!((widths[0] - 8.0).abs() < 0.001);
        assert!((widths[1] - 0.0).abs() < 0.001);
        assert!((widths[2] - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_char_to_byte_offsets() {
        assert_eq!(char_to_byte_offsets("aé b"), vec![0, 1, 3, 4, 5]);
    }

    #[test]
    fn test_invalid_custom_font_falls_back_to_notdef() {
        let data = FontData::Custom {
            data: vec![0, 1, 2, 3],
            metrics: CustomFontMetrics {
                units_per_em: 1000,
                ascender: 800,
                descender: -200,
            },
        };
        let font = Font::new(&data, 10.0);
        let result = TextShaper.shape(&font, "Hello", 4);
        assert_eq!(result.glyphs().len(), 5);
        assert!(result.glyphs().iter().all(|g| g.glyph_id == 0));
        assert_eq!(result.glyphs()[0].cluster, 4);
        assert!((result.width() - 25.0).abs() < 1e-9);
    }
}
