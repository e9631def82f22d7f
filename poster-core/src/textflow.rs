use crate::fonts::FontMetrics;
use crate::markup::{Align, Inline, Paragraph, Style};

/// Indentation per list level, in ems of the normal size.
const LIST_INDENT_EM: f64 = 1.5;

/// Extra space between paragraphs, in ems of the normal size.
const PAR_SKIP_EM: f64 = 0.4;

/// Bullet glyph used for `\item`.
const BULLET: &str = "\u{2022}";

/// A run of same-styled text placed on a baseline. Coordinates are
/// in points with the top of the text block at y = 0 and y
/// decreasing downwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidRun {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub style: Style,
}

/// Result of flowing paragraphs into a column.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub runs: Vec<LaidRun>,
    /// Distance from the top to the lowest descender.
    pub height: f64,
    /// Depth of the first baseline below the top, or 0 if empty.
    pub first_baseline: f64,
}

/// One unbreakable word: adjacent pieces without a space between.
#[derive(Debug, Clone)]
struct Word {
    pieces: Vec<(String, Style)>,
    /// Style of the text before the preceding space, if any.
    space_before: Option<Style>,
    forced_break: bool,
}

impl Word {
    fn width(&self) -> f64 {
        self.pieces
            .iter()
            .map(|(t, s)| FontMetrics::measure_text(t, s.font(), s.size))
            .sum()
    }

    fn space_width(&self) -> f64 {
        self.space_before
            .map(|s| FontMetrics::measure_text(" ", s.font(), s.size))
            .unwrap_or(0.0)
    }

    fn max_size(&self) -> f64 {
        self.pieces.iter().map(|(_, s)| s.size).fold(0.0, f64::max)
    }
}

/// Break paragraph inlines into words. A `LineBreak` marks the next
/// word as starting a new line.
fn extract_words(inlines: &[Inline]) -> Vec<Word> {
    let mut words: Vec<Word> = Vec::new();
    let mut current: Option<Word> = None;
    let mut pending_space: Option<Style> = None;
    let mut pending_break = false;
    let mut last_style: Option<Style> = None;

    for inline in inlines {
        match inline {
            Inline::Text { text, style } => {
                let word = current.get_or_insert_with(|| Word {
                    pieces: Vec::new(),
                    space_before: pending_space.take(),
                    forced_break: std::mem::take(&mut pending_break),
                });
                word.pieces.push((text.clone(), *style));
                last_style = Some(*style);
            }
            Inline::Space => {
                if let Some(w) = current.take() {
                    words.push(w);
                }
                pending_space = last_style;
            }
            Inline::LineBreak => {
                if let Some(w) = current.take() {
                    words.push(w);
                }
                pending_space = None;
                pending_break = true;
            }
        }
    }
    if let Some(w) = current.take() {
        words.push(w);
    }
    words
}

/// Flow paragraphs into lines no wider than `width` points. Words
/// wider than the line overflow rather than being split.
pub fn layout(paragraphs: &[Paragraph], width: f64, base: Style) -> TextLayout {
    let em = base.size;
    let mut runs = Vec::new();
    let mut y = 0.0;
    let mut first_baseline = None;
    let mut bottom: f64 = 0.0;

    for (index, para) in paragraphs.iter().enumerate() {
        if index > 0 {
            y -= PAR_SKIP_EM * em;
        }
        let indent = para.depth as f64 * LIST_INDENT_EM * em;
        let avail = (width - indent).max(0.0);
        let lines = break_lines(&extract_words(&para.inlines), avail);

        for (line_no, line) in lines.iter().enumerate() {
            let size = line
                .iter()
                .map(|w| w.max_size())
                .fold(0.0, f64::max)
                .max(if line.is_empty() { em } else { 0.0 });
            let baseline = match first_baseline {
                None => {
                    first_baseline = Some(size);
                    y - size
                }
                Some(_) => y - FontMetrics::line_height(size),
            };
            y = baseline;
            bottom = bottom.min(baseline - FontMetrics::descent(size));

            let line_width = line_width(line);
            // Without a width limit there is nothing to center in.
            let x0 = match para.align {
                Align::Center if avail.is_finite() => indent + (avail - line_width) / 2.0,
                _ => indent,
            };

            if para.bullet && line_no == 0 {
                let style = line
                    .first()
                    .and_then(|w| w.pieces.first())
                    .map(|(_, s)| Style {
                        bold: false,
                        italic: false,
                        ..*s
                    })
                    .unwrap_or(base);
                runs.push(LaidRun {
                    x: indent - LIST_INDENT_EM * em * 0.6,
                    y: baseline,
                    text: BULLET.to_string(),
                    style,
                });
            }
            emit_line(line, x0, baseline, &mut runs);
        }
    }

    TextLayout {
        runs,
        height: -bottom,
        first_baseline: first_baseline.unwrap_or(0.0),
    }
}

/// Greedy line breaking. Every paragraph yields at least one line.
fn break_lines(words: &[Word], avail: f64) -> Vec<Vec<Word>> {
    let mut lines: Vec<Vec<Word>> = vec![Vec::new()];
    let mut width = 0.0;
    for word in words {
        let line_empty = lines.last().map(|l| l.is_empty()).unwrap_or(true);
        let w = word.width();
        let needed = if line_empty {
            w
        } else {
            width + word.space_width() + w
        };
        if word.forced_break || (!line_empty && needed > avail) {
            lines.push(Vec::new());
            width = w;
        } else {
            width = needed;
        }
        if let Some(last) = lines.last_mut() {
            last.push(word.clone());
        }
    }
    lines
}

fn line_width(line: &[Word]) -> f64 {
    line.iter()
        .enumerate()
        .map(|(i, w)| if i == 0 { w.width() } else { w.space_width() + w.width() })
        .sum()
}

/// Merge the words of one line into runs of identical style. The
/// space before a word is measured in the style of the text it
/// follows, which is always the open run's style.
fn emit_line(line: &[Word], x0: f64, baseline: f64, runs: &mut Vec<LaidRun>) {
    let mut x = x0;
    let mut current: Option<LaidRun> = None;
    for (i, word) in line.iter().enumerate() {
        if i > 0 && word.space_before.is_some() {
            if let Some(run) = current.as_mut() {
                run.text.push(' ');
            }
            x += word.space_width();
        }
        for (text, style) in &word.pieces {
            match current.as_mut() {
                Some(run) if run.style == *style => run.text.push_str(text),
                _ => {
                    runs.extend(current.take());
                    current = Some(LaidRun {
                        x,
                        y: baseline,
                        text: text.clone(),
                        style: *style,
                    });
                }
            }
            x += FontMetrics::measure_text(text, style.font(), style.size);
        }
    }
    runs.extend(current);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{BuiltinFont, FontFamily};
    use crate::markup::{parse, Macros};
    use crate::typeset::TextEncoding;

    fn sans() -> Style {
        Style::normal(FontFamily::Sans)
    }

    fn flow(src: &str, width: f64) -> TextLayout {
        let paras = parse(src, &Macros::default(), sans(), TextEncoding::Utf8).unwrap();
        layout(&paras, width, sans())
    }

    #[test]
    fn single_line_is_one_run() {
        let l = flow("Hello world", 1000.0);
        assert_eq!(l.runs.len(), 1);
        assert_eq!(l.runs[0].text, "Hello world");
        assert_eq!((l.runs[0].x, l.runs[0].y), (0.0, -10.0));
        assert_eq!(l.first_baseline, 10.0);
        assert!((l.height - 12.5).abs() < 1e-9);
    }

    #[test]
    fn narrow_width_wraps() {
        let l = flow("Hello world", 30.0);
        assert_eq!(l.runs.len(), 2);
        assert_eq!(l.runs[0].text, "Hello");
        assert_eq!(l.runs[1].text, "world");
        assert_eq!(l.runs[1].x, 0.0);
        assert!((l.runs[1].y - -22.0).abs() < 1e-9);
    }

    #[test]
    fn forced_line_break() {
        let l = flow("a\\\\b", 1000.0);
        assert_eq!(l.runs.len(), 2);
        assert!(l.runs[1].y < l.runs[0].y);
    }

    #[test]
    fn overlong_word_overflows_on_its_own_line() {
        let l = flow("a Supercalifragilistic b", 20.0);
        let texts: Vec<_> = l.runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "Supercalifragilistic", "b"]);
    }

    #[test]
    fn centered_line_offset() {
        let l = flow("\\begin{center}ab\\end{center}", 100.0);
        let w = FontMetrics::measure_text("ab", BuiltinFont::Helvetica, 10.0);
        assert!((l.runs[0].x - (100.0 - w) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn style_change_splits_runs() {
        let l = flow("a \\textbf{b}", 1000.0);
        assert_eq!(l.runs.len(), 2);
        assert_eq!(l.runs[0].text, "a ");
        assert_eq!(l.runs[1].style.font(), BuiltinFont::HelveticaBold);
        let w = FontMetrics::measure_text("a ", BuiltinFont::Helvetica, 10.0);
        assert!((l.runs[1].x - w).abs() < 1e-9);
    }

    #[test]
    fn items_are_indented_with_bullets() {
        let l = flow("\\begin{itemize}\\item one\\end{itemize}", 1000.0);
        assert_eq!(l.runs.len(), 2);
        assert_eq!(l.runs[0].text, BULLET);
        assert!((l.runs[0].x - 6.0).abs() < 1e-9);
        assert_eq!(l.runs[1].text, "one");
        assert_eq!(l.runs[1].x, 15.0);
    }

    #[test]
    fn paragraphs_are_separated() {
        let l = flow("one\n\ntwo", 1000.0);
        assert_eq!(l.runs.len(), 2);
        assert!((l.runs[1].y - (-10.0 - 4.0 - 12.0)).abs() < 1e-9);
    }

    #[test]
    fn empty_input_has_no_height() {
        let l = flow("", 100.0);
        assert!(l.runs.is_empty());
        assert_eq!(l.height, 0.0);
    }
}
