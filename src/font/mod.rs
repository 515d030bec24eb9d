//! # Font Management
//!
//! Maps font family + weight + style to font data, and resolves a style to a
//! concrete [`Font`] that the shaper and line breaker consume.
//!
//! The standard faces (Helvetica, Courier) ship with built-in metrics and need
//! no font file. Custom TrueType/OpenType fonts are registered as raw bytes and
//! shaped with rustybuzz.

pub mod metrics;

use std::collections::HashMap;
use std::fmt;

use crate::error::LayoutError;
use crate::style::{FontVariantLigatures, ResolvedStyle};
pub use metrics::StandardFontMetrics;

/// A font registry that maps font family + weight + style to font data.
pub struct FontRegistry {
    fonts: HashMap<FontKey, FontData>,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

#[derive(Debug)]
pub enum FontData {
    /// One of the built-in faces.
    Standard(StandardFont),
    /// A TrueType/OpenType font shaped through rustybuzz.
    Custom {
        data: Vec<u8>,
        metrics: CustomFontMetrics,
    },
}

/// Vertical metrics parsed from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone, Copy)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
}

impl CustomFontMetrics {
    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        Some(CustomFontMetrics {
            units_per_em: face.units_per_em(),
            ascender: face.ascender(),
            descender: face.descender(),
        })
    }
}

/// The built-in faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    Courier,
}

impl StandardFont {
    /// The PostScript name for this font.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::Courier => "Courier",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
            Self::Courier => &metrics::COURIER,
        }
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();

        // Obliques share the upright metrics.
        let standard_mappings = [
            (("Helvetica", 400, false), StandardFont::Helvetica),
            (("Helvetica", 700, false), StandardFont::HelveticaBold),
            (("Helvetica", 400, true), StandardFont::Helvetica),
            (("Helvetica", 700, true), StandardFont::HelveticaBold),
            (("Courier", 400, false), StandardFont::Courier),
            (("Courier", 700, false), StandardFont::Courier),
            (("Courier", 400, true), StandardFont::Courier),
            (("Courier", 700, true), StandardFont::Courier),
        ];

        for ((family, weight, italic), font) in standard_mappings {
            fonts.insert(
                FontKey {
                    family: family.to_string(),
                    weight,
                    italic,
                },
                FontData::Standard(font),
            );
        }

        Self { fonts }
    }

    /// Look up a font, falling back to Helvetica if not found.
    pub fn resolve(&self, family: &str, weight: u32, italic: bool) -> &FontData {
        let key = FontKey {
            family: family.to_string(),
            weight,
            italic,
        };
        if let Some(font) = self.fonts.get(&key) {
            return font;
        }

        // Try with normalized weight (snap to 400 or 700)
        let snapped_weight = if weight >= 600 { 700 } else { 400 };
        let key = FontKey {
            family: family.to_string(),
            weight: snapped_weight,
            italic,
        };
        if let Some(font) = self.fonts.get(&key) {
            return font;
        }

        log::debug!("font {family:?} {weight} italic={italic} not registered, using Helvetica");
        let key = FontKey {
            family: "Helvetica".to_string(),
            weight: snapped_weight,
            italic,
        };
        self.fonts
            .get(&key)
            .expect("standard Helvetica faces are always registered")
    }

    /// Register a custom TrueType/OpenType font.
    pub fn register(
        &mut self,
        family: &str,
        weight: u32,
        italic: bool,
        data: Vec<u8>,
    ) -> Result<(), LayoutError> {
        let metrics = CustomFontMetrics::from_font_data(&data).ok_or_else(|| {
            LayoutError::Font(format!("'{family}' is not a valid TrueType/OpenType font"))
        })?;
        log::debug!(
            "registered font {family:?} weight={weight} italic={italic} ({} bytes, {} upem)",
            data.len(),
            metrics.units_per_em
        );
        self.fonts.insert(
            FontKey {
                family: family.to_string(),
                weight,
                italic,
            },
            FontData::Custom { data, metrics },
        );
        Ok(())
    }

}

static HELVETICA: FontData = FontData::Standard(StandardFont::Helvetica);
static HELVETICA_BOLD: FontData = FontData::Standard(StandardFont::HelveticaBold);
static COURIER: FontData = FontData::Standard(StandardFont::Courier);

/// A face at a given size with the rendering options that affect shaping.
///
/// Custom faces are parsed for rustybuzz once, when the `Font` is made, and
/// every shaping call on it (the paragraph and each reshaped line edge)
/// reuses that parse. The font borrows its bytes from the [`FontRegistry`].
pub struct Font<'a> {
    data: &'a FontData,
    face: Option<rustybuzz::Face<'a>>,
    pub size: f64,
    pub letter_spacing: f64,
    pub ligatures: bool,
}

impl<'a> Font<'a> {
    pub fn new(data: &'a FontData, size: f64) -> Self {
        let face = match data {
            FontData::Standard(_) => None,
            FontData::Custom { data: bytes, .. } => {
                let face = rustybuzz::Face::from_slice(bytes, 0);
                if face.is_none() {
                    log::warn!("rustybuzz could not load face, text will shape as .notdef");
                }
                face
            }
        };
        Self {
            data,
            face,
            size,
            letter_spacing: 0.0,
            ligatures: true,
        }
    }

    pub fn with_letter_spacing(mut self, letter_spacing: f64) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }

    pub fn with_ligatures(mut self, ligatures: bool) -> Self {
        self.ligatures = ligatures;
        self
    }

    pub fn data(&self) -> &'a FontData {
        self.data
    }

    /// The parsed face of a custom font. `None` for the built-in faces and
    /// for bytes rustybuzz rejects.
    pub(crate) fn shaping_face(&self) -> Option<&rustybuzz::Face<'a>> {
        self.face.as_ref()
    }

    pub fn units_per_em(&self) -> u16 {
        match self.data {
            FontData::Standard(_) => metrics::UNITS_PER_EM,
            FontData::Custom { metrics, .. } => metrics.units_per_em,
        }
    }

    /// Points per font unit.
    pub fn scale(&self) -> f64 {
        self.size / self.units_per_em() as f64
    }

    /// Distance from the baseline to the top of the em box, in points.
    pub fn ascent(&self) -> f64 {
        let ascender = match self.data {
            FontData::Standard(font) => font.metrics().ascender,
            FontData::Custom { metrics, .. } => metrics.ascender,
        };
        ascender as f64 * self.scale()
    }

    /// Distance from the baseline to the bottom of the em box, in points (positive).
    pub fn descent(&self) -> f64 {
        let descender = match self.data {
            FontData::Standard(font) => font.metrics().descender,
            FontData::Custom { metrics, .. } => metrics.descender,
        };
        -(descender as f64) * self.scale()
    }
}

impl Font<'static> {
    /// A built-in face, used by tests and as the shaping fallback.
    pub fn standard(font: StandardFont, size: f64) -> Self {
        let data = match font {
            StandardFont::Helvetica => &HELVETICA,
            StandardFont::HelveticaBold => &HELVETICA_BOLD,
            StandardFont::Courier => &COURIER,
        };
        Self::new(data, size)
    }
}

impl fmt::Debug for Font<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("data", &self.data)
            .field("parsed", &self.face.is_some())
            .field("size", &self.size)
            .field("letter_spacing", &self.letter_spacing)
            .field("ligatures", &self.ligatures)
            .finish()
    }
}

/// Shared font context used by layout. Resolves styles to fonts.
pub struct FontContext {
    registry: FontRegistry,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
        }
    }

    /// Resolve the font a style asks for.
    pub fn font_for_style(&self, style: &ResolvedStyle) -> Font<'_> {
        let data = self.registry.resolve(
            &style.font_family,
            style.font_weight,
            style.font_style.is_italic(),
        );
        Font::new(data, style.font_size)
            .with_letter_spacing(style.letter_spacing)
            .with_ligatures(style.font_variant_ligatures == FontVariantLigatures::Normal)
    }

    /// Access the underlying font registry.
    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }

    /// Access the underlying font registry mutably.
    pub fn registry_mut(&mut self) -> &mut FontRegistry {
        &mut self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;

    fn style(family: &str, weight: u32) -> ResolvedStyle {
        Style {
            font_family: Some(family.to_string()),
            font_weight: Some(weight),
            ..Default::default()
        }
        .resolve(None, 0.0)
    }

    #[test]
    fn test_font_context_helvetica() {
        let ctx = FontContext::new();
        let font = ctx.font_for_style(&style("Helvetica", 400));
        assert!(matches!(
            font.data(),
            FontData::Standard(StandardFont::Helvetica)
        ));
        assert!((font.scale() - 0.012).abs() < 1e-12);
    }

    #[test]
    fn test_font_context_weight_resolution() {
        let ctx = FontContext::new();
        let font = ctx.font_for_style(&style("Helvetica", 800));
        assert!(matches!(
            font.data(),
            FontData::Standard(StandardFont::HelveticaBold)
        ));
    }

    #[test]
    fn test_font_context_fallback() {
        let ctx = FontContext::new();
        let font = ctx.font_for_style(&style("UnknownFont", 400));
        assert!(matches!(
            font.data(),
            FontData::Standard(StandardFont::Helvetica)
        ));
    }

    #[test]
    fn test_register_rejects_garbage() {
        let mut registry = FontRegistry::new();
        let err = registry.register("Broken", 400, false, vec![0, 1, 2, 3]);
        assert!(matches!(err, Err(LayoutError::Font(_))));
    }

    #[test]
    fn test_ascent_descent() {
        let font = Font::standard(StandardFont::Helvetica, 10.0);
        assert!((font.ascent() - 7.18).abs() < 1e-9);
        assert!((font.descent() - 2.07).abs() < 1e-9);
    }

    #[test]
    fn test_standard_font_has_no_parsed_face() {
        let font = Font::standard(StandardFont::Courier, 10.0);
        assert!(font.shaping_face().is_none());
        assert!(matches!(font.data(), FontData::Standard(StandardFont::Courier)));
    }

    #[test]
    fn test_unparseable_custom_face_is_kept_without_face() {
        let data = FontData::Custom {
            data: vec![0, 1, 2, 3],
            metrics: CustomFontMetrics {
                units_per_em: 1000,
                ascender: 800,
                descender: -200,
            },
        };
        let font = Font::new(&data, 10.0);
        assert!(font.shaping_face().is_none());
        assert!((font.ascent() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_registered_font_is_parsed_once_per_font() {
        let paths = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
        ];
        let Some(bytes) = paths.iter().find_map(|path| std::fs::read(path).ok()) else {
            eprintln!("Skipping: no system TTF font found");
            return;
        };
        let mut ctx = FontContext::new();
        ctx.registry_mut().register("DejaVu", 400, false, bytes).unwrap();
        let font = ctx.font_for_style(&style("DejaVu", 400));
        let face = font.shaping_face().expect("registered font parses");
        assert_eq!(face.units_per_em() as u16, font.units_per_em());
        // The face borrows the registry's bytes rather than a copy.
        let FontData::Custom { data, .. } = font.data() else {
            panic!("expected a custom font");
        };
        assert!(std::ptr::eq(face.raw_face().data.as_ptr(), data.as_ptr()));
    }

    #[test]
    fn test_ligatures_follow_style() {
        let ctx = FontContext::new();
        let mut s = style("Helvetica", 400);
        assert!(ctx.font_for_style(&s).ligatures);
        s.font_variant_ligatures = FontVariantLigatures::None;
        assert!(!ctx.font_for_style(&s).ligatures);
    }
}
