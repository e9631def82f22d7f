/// Typeface family selected by the markup switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamily {
    /// Times (`\rmfamily`).
    Roman,
    /// Helvetica (`\sffamily`).
    Sans,
    /// Courier (`\ttfamily`).
    Mono,
}

/// Font identifier for the standard PDF text fonts.
/// These fonts are guaranteed available in all PDF viewers and
/// PostScript interpreters without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl BuiltinFont {
    /// Pick the face for a family and weight/slant combination.
    pub fn select(family: FontFamily, bold: bool, italic: bool) -> Self {
        use BuiltinFont::*;
        match (family, bold, italic) {
            (FontFamily::Sans, false, false) => Helvetica,
            (FontFamily::Sans, true, false) => HelveticaBold,
            (FontFamily::Sans, false, true) => HelveticaOblique,
            (FontFamily::Sans, true, true) => HelveticaBoldOblique,
            (FontFamily::Roman, false, false) => TimesRoman,
            (FontFamily::Roman, true, false) => TimesBold,
            (FontFamily::Roman, false, true) => TimesItalic,
            (FontFamily::Roman, true, true) => TimesBoldItalic,
            (FontFamily::Mono, false, false) => Courier,
            (FontFamily::Mono, true, false) => CourierBold,
            (FontFamily::Mono, false, true) => CourierOblique,
            (FontFamily::Mono, true, true) => CourierBoldOblique,
        }
    }

    /// PDF resource name used in content streams (e.g. "F1").
    /// Fixed mapping by variant order.
    pub fn resource_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "F1",
            BuiltinFont::HelveticaBold => "F2",
            BuiltinFont::HelveticaOblique => "F3",
            BuiltinFont::HelveticaBoldOblique => "F4",
            BuiltinFont::TimesRoman => "F5",
            BuiltinFont::TimesBold => "F6",
            BuiltinFont::TimesItalic => "F7",
            BuiltinFont::TimesBoldItalic => "F8",
            BuiltinFont::Courier => "F9",
            BuiltinFont::CourierBold => "F10",
            BuiltinFont::CourierOblique => "F11",
            BuiltinFont::CourierBoldOblique => "F12",
        }
    }

    /// PostScript font name, shared by PDF `BaseFont` and EPS
    /// `findfont`.
    pub fn base_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
            BuiltinFont::HelveticaOblique => "Helvetica-Oblique",
            BuiltinFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            BuiltinFont::TimesRoman => "Times-Roman",
            BuiltinFont::TimesBold => "Times-Bold",
            BuiltinFont::TimesItalic => "Times-Italic",
            BuiltinFont::TimesBoldItalic => "Times-BoldItalic",
            BuiltinFont::Courier => "Courier",
            BuiltinFont::CourierBold => "Courier-Bold",
            BuiltinFont::CourierOblique => "Courier-Oblique",
            BuiltinFont::CourierBoldOblique => "Courier-BoldOblique",
        }
    }
}

// Character widths (ASCII 32..=126) in units of 1/1000 em.
// Source: Adobe AFM data for the standard fonts.

const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584,
    278, 333, 278, 278, 556, 556, 556, 556, 556, 556, 556, 556,
    556, 556, 278, 278, 584, 584, 584, 556, 1015, 667, 667, 722,
    722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278,
    278, 278, 469, 556, 333, 556, 556, 500, 556, 556, 278, 556,
    556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584,
    278, 333, 278, 278, 556, 556, 556, 556, 556, 556, 556, 556,
    556, 556, 333, 333, 584, 584, 584, 611, 975, 722, 722, 722,
    722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333,
    278, 333, 584, 556, 333, 556, 611, 556, 611, 556, 333, 611,
    611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564,
    250, 333, 250, 278, 500, 500, 500, 500, 500, 500, 500, 500,
    500, 500, 278, 278, 564, 564, 564, 444, 921, 722, 667, 667,
    722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333,
    278, 333, 469, 500, 333, 444, 500, 444, 500, 444, 333, 500,
    500, 278, 278, 500, 278, 778, 500, 500, 500, 500, 333, 389,
    278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

const TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570,
    250, 333, 250, 278, 500, 500, 500, 500, 500, 500, 500, 500,
    500, 500, 333, 333, 570, 570, 570, 500, 930, 722, 667, 722,
    722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333,
    278, 333, 581, 500, 333, 500, 556, 444, 556, 444, 333, 500,
    556, 278, 333, 556, 278, 833, 556, 500, 556, 556, 444, 389,
    333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

const TIMES_ITALIC_WIDTHS: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675,
    250, 333, 250, 278, 500, 500, 500, 500, 500, 500, 500, 500,
    500, 500, 333, 333, 675, 675, 675, 500, 920, 611, 611, 667,
    722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389,
    278, 389, 422, 500, 333, 500, 500, 444, 500, 444, 278, 500,
    500, 278, 278, 444, 278, 722, 500, 500, 500, 500, 389, 389,
    278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
];

const TIMES_BOLD_ITALIC_WIDTHS: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570,
    250, 333, 250, 278, 500, 500, 500, 500, 500, 500, 500, 500,
    500, 500, 333, 333, 570, 570, 570, 500, 832, 667, 667, 667,
    722, 667, 667, 722, 778, 389, 500, 667, 611, 889, 722, 722,
    611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611, 333,
    278, 333, 570, 500, 333, 500, 500, 444, 500, 444, 333, 500,
    556, 278, 278, 500, 278, 778, 556, 500, 556, 556, 389, 389,
    278, 556, 444, 667, 500, 444, 389, 348, 220, 348, 570,
];

/// Courier uses a uniform width of 600 for all characters.
const COURIER_WIDTH: u16 = 600;

/// Default width for characters without a metric (1/1000 em).
const DEFAULT_WIDTH: u16 = 500;

/// Unaccented stand-ins for Latin-1 letters U+00C0..=U+00FF, used
/// to approximate their advance width.
const LATIN1_BASE: &[u8; 64] =
    b"AAAAAAACEEEEIIIIDNOOOOO*OUUUUYPsaaaaaaaceeeeiiiidnooooo/ouuuuypy";

/// Font metrics for built-in fonts.
pub struct FontMetrics;

impl FontMetrics {
    /// Returns the width of a character in 1/1000 em units.
    pub fn char_width(font: BuiltinFont, ch: char) -> u16 {
        if matches!(
            font,
            BuiltinFont::Courier
                | BuiltinFont::CourierBold
                | BuiltinFont::CourierOblique
                | BuiltinFont::CourierBoldOblique
        ) {
            return COURIER_WIDTH;
        }

        let code = ch as u32;
        let ascii = match code {
            32..=126 => code,
            0xA0 => 32,
            0xC0..=0xFF => LATIN1_BASE[(code - 0xC0) as usize] as u32,
            _ => return DEFAULT_WIDTH,
        };
        let index = (ascii - 32) as usize;
        match font {
            BuiltinFont::Helvetica | BuiltinFont::HelveticaOblique => HELVETICA_WIDTHS[index],
            BuiltinFont::HelveticaBold | BuiltinFont::HelveticaBoldOblique => {
                HELVETICA_BOLD_WIDTHS[index]
            }
            BuiltinFont::TimesRoman => TIMES_ROMAN_WIDTHS[index],
            BuiltinFont::TimesBold => TIMES_BOLD_WIDTHS[index],
            BuiltinFont::TimesItalic => TIMES_ITALIC_WIDTHS[index],
            BuiltinFont::TimesBoldItalic => TIMES_BOLD_ITALIC_WIDTHS[index],
            _ => DEFAULT_WIDTH,
        }
    }

    /// Measures the width of a text string in points.
    pub fn measure_text(text: &str, font: BuiltinFont, font_size: f64) -> f64 {
        let total: u32 = text
            .chars()
            .map(|ch| Self::char_width(font, ch) as u32)
            .sum();
        total as f64 * font_size / 1000.0
    }

    /// Baseline-to-baseline distance (1.2x the font size).
    pub fn line_height(font_size: f64) -> f64 {
        font_size * 1.2
    }

    /// Height above the baseline used for ink bounding boxes.
    pub fn ascent(font_size: f64) -> f64 {
        font_size * 0.75
    }

    /// Depth below the baseline used for ink bounding boxes.
    pub fn descent(font_size: f64) -> f64 {
        font_size * 0.25
    }
}

/// Map a character to its byte in WinAnsiEncoding (Windows-1252).
/// Returns None for characters the encoding cannot represent.
pub fn win_ansi_byte(ch: char) -> Option<u8> {
    let code = ch as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => WIN_ANSI_EXTRAS
            .iter()
            .find(|(c, _, _)| *c == ch)
            .map(|(_, byte, _)| *byte),
    }
}

/// PostScript glyph name for a WinAnsi byte in 0x80..=0x9F.
pub fn win_ansi_glyph_name(byte: u8) -> Option<&'static str> {
    WIN_ANSI_EXTRAS
        .iter()
        .find(|(_, b, _)| *b == byte)
        .map(|(_, _, name)| *name)
}

/// The Windows-1252 code points that differ from Latin-1.
const WIN_ANSI_EXTRAS: [(char, u8, &str); 27] = [
    ('\u{20AC}', 0x80, "Euro"),
    ('\u{201A}', 0x82, "quotesinglbase"),
    ('\u{0192}', 0x83, "florin"),
    ('\u{201E}', 0x84, "quotedblbase"),
    ('\u{2026}', 0x85, "ellipsis"),
    ('\u{2020}', 0x86, "dagger"),
    ('\u{2021}', 0x87, "daggerdbl"),
    ('\u{02C6}', 0x88, "circumflex"),
    ('\u{2030}', 0x89, "perthousand"),
    ('\u{0160}', 0x8A, "Scaron"),
    ('\u{2039}', 0x8B, "guilsinglleft"),
    ('\u{0152}', 0x8C, "OE"),
    ('\u{017D}', 0x8E, "Zcaron"),
    ('\u{2018}', 0x91, "quoteleft"),
    ('\u{2019}', 0x92, "quoteright"),
    ('\u{201C}', 0x93, "quotedblleft"),
    ('\u{201D}', 0x94, "quotedblright"),
    ('\u{2022}', 0x95, "bullet"),
    ('\u{2013}', 0x96, "endash"),
    ('\u{2014}', 0x97, "emdash"),
    ('\u{02DC}', 0x98, "tilde"),
    ('\u{2122}', 0x99, "trademark"),
    ('\u{0161}', 0x9A, "scaron"),
    ('\u{203A}', 0x9B, "guilsinglright"),
    ('\u{0153}', 0x9C, "oe"),
    ('\u{017E}', 0x9E, "zcaron"),
    ('\u{0178}', 0x9F, "Ydieresis"),
];
