use serde::Deserialize;

use crate::error::PosterError;
use crate::fonts::FontFamily;
use crate::geometry::BBox;
use crate::graphics::Color;
use crate::markup::{self, Macros, Style};
use crate::surface::{ContentBlock, Surface, TextRun};
use crate::textflow::{self, TextLayout};
use crate::units::{pt_to_mm, CM};

/// Width of the text container used by
/// [`Typesetter::render_markup_to_block`], before scaling.
pub const CONTAINER_WIDTH: f64 = 9.2 * CM;

/// How characters outside the output encoding are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// Accept any Unicode input; characters the fonts cannot encode
    /// are replaced by `?` with a warning.
    #[default]
    Utf8,
    /// Reject characters outside the Latin-1/WinAnsi repertoire.
    Latin1,
}

/// Typesetting settings, passed once to [`Typesetter::new`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TypesetConfig {
    /// Macro definitions (`\newcommand`, `\usepackage`).
    pub preamble: String,
    pub encoding: TextEncoding,
    /// Factor applied to typeset text when placed on the poster.
    pub scale: f64,
}

impl Default for TypesetConfig {
    fn default() -> Self {
        TypesetConfig {
            preamble: String::new(),
            encoding: TextEncoding::Utf8,
            scale: 4.0,
        }
    }
}

/// Turns markup into [`ContentBlock`]s in poster units (mm).
#[derive(Debug, Clone)]
pub struct Typesetter {
    config: TypesetConfig,
    macros: Macros,
    family: FontFamily,
}

impl Typesetter {
    /// Parse the preamble. Fails if it contains anything other than
    /// declarations.
    pub fn new(config: TypesetConfig) -> Result<Self, PosterError> {
        let macros = Macros::from_preamble(&config.preamble)?;
        let family = macros.default_family();
        tracing::debug!(
            scale = config.scale,
            encoding = ?config.encoding,
            family = ?family,
            "typesetter ready"
        );
        Ok(Typesetter {
            config,
            macros,
            family,
        })
    }

    pub fn config(&self) -> &TypesetConfig {
        &self.config
    }

    fn base_style(&self) -> Style {
        Style::normal(self.family)
    }

    /// Millimetres per typeset point on the poster.
    fn factor(&self) -> f64 {
        pt_to_mm(1.0) * self.config.scale
    }

    fn flow(&self, source: &str, width_pt: f64) -> Result<TextLayout, PosterError> {
        let base = self.base_style();
        let paragraphs = markup::parse(source, &self.macros, base, self.config.encoding)?;
        Ok(textflow::layout(&paragraphs, width_pt, base))
    }

    /// Convert a layout to surface text, shifted so the first
    /// baseline sits at y = 0.
    fn to_surface(&self, layout: &TextLayout, color: Color) -> Surface {
        let k = self.factor();
        let mut surface = Surface::new();
        for run in &layout.runs {
            surface.text(TextRun {
                x: run.x * k,
                y: (run.y + layout.first_baseline) * k,
                text: run.text.clone(),
                font: run.style.font(),
                size: run.style.size * k,
                color,
            });
        }
        surface
    }

    /// Typeset markup without a width limit. The block's origin is
    /// the left end of the first baseline; its bounding box is the
    /// ink extent.
    pub fn text(&self, source: &str, color: Color) -> Result<ContentBlock, PosterError> {
        let layout = self.flow(source, f64::INFINITY)?;
        Ok(ContentBlock::from_surface(self.to_surface(&layout, color)))
    }

    /// Typeset markup into a fixed-width container (9.2 cm before
    /// scaling). The origin is the left end of the first baseline and
    /// the bounding box spans the full container width.
    pub fn render_markup_to_block(&self, source: &str) -> Result<ContentBlock, PosterError> {
        self.container(source, CONTAINER_WIDTH)
    }

    /// Like [`Self::render_markup_to_block`] with a custom width in
    /// millimetres before scaling.
    pub fn container(&self, source: &str, width_mm: f64) -> Result<ContentBlock, PosterError> {
        let width_pt = width_mm / pt_to_mm(1.0);
        let layout = self.flow(source, width_pt)?;
        let k = self.factor();
        let top = layout.first_baseline * k;
        let bbox = BBox::new(
            0.0,
            top - layout.height * k,
            width_mm * self.config.scale,
            layout.height * k,
        );
        tracing::debug!(
            runs = layout.runs.len(),
            width = bbox.width,
            height = bbox.height,
            "typeset container"
        );
        Ok(ContentBlock::new(self.to_surface(&layout, Color::BLACK), bbox))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarkupError;
    use crate::fonts::BuiltinFont;
    use crate::surface::DrawOp;

    fn typesetter(preamble: &str) -> Typesetter {
        Typesetter::new(TypesetConfig {
            preamble: preamble.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn runs(block: &ContentBlock) -> Vec<TextRun> {
        block
            .surface()
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(run) => Some(run.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn container_spans_scaled_width() {
        let ts = typesetter("");
        let block = ts.render_markup_to_block("Some words").unwrap();
        assert!((block.width() - 368.0).abs() < 1e-9);
        assert!(block.bbox().bottom < 0.0);
        assert!(block.bbox().top() > 0.0);
    }

    #[test]
    fn first_baseline_at_origin() {
        let ts = typesetter("");
        let block = ts.render_markup_to_block("x").unwrap();
        let r = runs(&block);
        assert_eq!(r[0].y, 0.0);
        assert_eq!(r[0].x, 0.0);
        // 10pt scaled by 4, in millimetres.
        assert!((r[0].size - 40.0 * 25.4 / 72.0).abs() < 1e-9);
    }

    #[test]
    fn default_family_is_roman() {
        let r = runs(&typesetter("").text("x", Color::BLACK).unwrap());
        assert_eq!(r[0].font, BuiltinFont::TimesRoman);
    }

    #[test]
    fn preamble_switches_family_and_defines_macros() {
        let ts = typesetter(
            "\\renewcommand{\\familydefault}{\\sfdefault}\n\\newcommand{\\org}{ACME}",
        );
        let r = runs(&ts.text("\\bfseries\\org", Color::WHITE).unwrap());
        assert_eq!(r[0].font, BuiltinFont::HelveticaBold);
        assert_eq!(r[0].text, "ACME");
        assert_eq!(r[0].color, Color::WHITE);
    }

    #[test]
    fn malformed_markup_is_an_error() {
        let err = typesetter("").render_markup_to_block("{oops").unwrap_err();
        assert!(matches!(err, PosterError::Markup(MarkupError::UnclosedGroup(0))));
    }

    #[test]
    fn bad_preamble_is_an_error() {
        let err = Typesetter::new(TypesetConfig {
            preamble: "stray text".into(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, PosterError::Markup(_)));
    }

    #[test]
    fn independent_typesetters_do_not_share_state() {
        let sans = typesetter("\\renewcommand{\\familydefault}{\\sfdefault}");
        let roman = typesetter("");
        assert_eq!(runs(&sans.text("a", Color::BLACK).unwrap())[0].font, BuiltinFont::Helvetica);
        assert_eq!(runs(&roman.text("a", Color::BLACK).unwrap())[0].font, BuiltinFont::TimesRoman);
    }
}
