//! Built-in metrics for the standard PDF faces.
//!
//! Advance widths are in 1/1000 em, taken from the Adobe font metrics for the
//! printable ASCII range. Characters outside that range fall back to a
//! per-face default, except for control and format characters which are
//! zero-width and CJK ideographs which are a full em.

/// Metrics for one standard face.
#[derive(Debug)]
pub struct StandardFontMetrics {
    /// Widths for U+0020..=U+007E.
    widths: &'static [u16; 95],
    default_width: u16,
    pub ascender: i16,
    pub descender: i16,
    kerning: &'static [(char, char, i16)],
    /// `(first, second, ligature glyph, width)`.
    ligatures: &'static [(char, char, char, u16)],
}

pub const UNITS_PER_EM: u16 = 1000;

impl StandardFontMetrics {
    /// Advance width of `ch` in font units.
    pub fn advance(&self, ch: char) -> u16 {
        match ch {
            ' '..='~' => self.widths[ch as usize - 0x20],
            '\t' | '\u{00A0}' => self.widths[0],
            '\n' | '\r' | '\u{00AD}' | '\u{200B}' | '\u{2028}' | '\u{2029}' => 0,
            c if c.is_control() => 0,
            '\u{3000}'..='\u{9FFF}' | '\u{F900}'..='\u{FAFF}' | '\u{FF00}'..='\u{FF60}' => {
                UNITS_PER_EM
            }
            _ => self.default_width,
        }
    }

    /// Width of `ch` in points at `font_size`.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.advance(ch) as f64 * font_size / UNITS_PER_EM as f64
    }

    /// Width of a string in points, ignoring kerning and ligatures.
    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size) + letter_spacing)
            .sum()
    }

    /// Pair adjustment applied to the advance of `first` when followed by `second`.
    pub fn kerning(&self, first: char, second: char) -> i16 {
        self.kerning
            .iter()
            .find(|(a, b, _)| *a == first && *b == second)
            .map(|(_, _, k)| *k)
            .unwrap_or(0)
    }

    /// Ligature glyph and width replacing the pair, if the face has one.
    pub fn ligature(&self, first: char, second: char) -> Option<(char, u16)> {
        self.ligatures
            .iter()
            .find(|(a, b, _, _)| *a == first && *b == second)
            .map(|(_, _, glyph, width)| (*glyph, *width))
    }
}

pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    widths: &[
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
        278, 278, 584, 584, 584, 556, 1015, // :..@
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
        278, 278, 278, 469, 556, 333, // [..`
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
        334, 260, 334, 584, // {..~
    ],
    default_width: 556,
    ascender: 718,
    descender: -207,
    kerning: HELVETICA_KERNING,
    ligatures: &[('f', 'i', '\u{FB01}', 500), ('f', 'l', '\u{FB02}', 500)],
};

pub static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    widths: &[
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
        333, 333, 584, 584, 584, 611, 975, // :..@
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A-M
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
        333, 278, 333, 584, 556, 333, // [..`
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a-m
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n-z
        389, 280, 389, 584, // {..~
    ],
    default_width: 611,
    ascender: 718,
    descender: -207,
    kerning: HELVETICA_KERNING,
    ligatures: &[('f', 'i', '\u{FB01}', 611), ('f', 'l', '\u{FB02}', 611)],
};

pub static COURIER: StandardFontMetrics = StandardFontMetrics {
    widths: &[600; 95],
    default_width: 600,
    ascender: 629,
    descender: -157,
    kerning: &[],
    ligatures: &[],
};

static HELVETICA_KERNING: &[(char, char, i16)] = &[
    ('A', 'T', -120),
    ('A', 'V', -70),
    ('A', 'W', -50),
    ('A', 'Y', -100),
    ('F', ',', -150),
    ('F', '.', -150),
    ('L', 'T', -110),
    ('L', 'V', -110),
    ('L', 'Y', -140),
    ('P', ',', -180),
    ('P', '.', -180),
    ('T', ',', -120),
    ('T', '.', -120),
    ('T', 'a', -120),
    ('T', 'e', -120),
    ('T', 'o', -120),
    ('V', 'a', -70),
    ('V', 'o', -80),
    ('W', 'a', -40),
    ('Y', 'a', -140),
    ('Y', 'o', -140),
    ('r', ',', -50),
    ('r', '.', -50),
    (' ', 'A', -55),
    (' ', 'T', -50),
    (' ', 'V', -50),
    (' ', 'W', -40),
    (' ', 'Y', -90),
];
