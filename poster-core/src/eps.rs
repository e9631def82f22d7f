//! Encapsulated PostScript (EPSF-3.0, level 2) output.

use std::io::{self, Write};

use crate::fonts::{win_ansi_byte, win_ansi_glyph_name};
use crate::geometry::{Path, Segment, Transform};
use crate::graphics::{Color, LineStyle, StrokeStyle};
use crate::images::{ImageData, ImageFormat};
use crate::surface::{DrawOp, Surface, TextRun};
use crate::units::{mm_to_pt, PageOptions, PT_PER_MM};
use crate::writer::{escape_string_bytes, format_coord};

/// Image bytes per line of inline hex data.
const HEX_LINE_BYTES: usize = 32;

/// Write `surface` as a single-page EPS file. The bounding box is the
/// paper; the canvas of `canvas_width` × `canvas_height` millimetres
/// is mapped onto it by `page`. Returns the writer.
pub fn write_eps<W: Write>(
    mut out: W,
    surface: &Surface,
    canvas_width: f64,
    canvas_height: f64,
    page: &PageOptions,
    title: &str,
) -> io::Result<W> {
    let (pw, ph) = page.paper.size_pt();
    let mut ps = PsStream::default();

    ps.line("%!PS-Adobe-3.0 EPSF-3.0");
    ps.line(&format!(
        "%%BoundingBox: 0 0 {} {}",
        pw.ceil() as i64,
        ph.ceil() as i64
    ));
    ps.line(&format!(
        "%%HiResBoundingBox: 0 0 {:.4} {:.4}",
        pw, ph
    ));
    ps.line("%%Creator: poster");
    let title: String = title.chars().filter(|c| !c.is_control()).collect();
    if !title.is_empty() {
        ps.line(&format!("%%Title: {}", title));
    }
    ps.line("%%LanguageLevel: 2");
    ps.line("%%EndComments");

    ps.line("%%BeginProlog");
    ps.line("/reencodefont {");
    ps.line("  exch findfont dup length dict begin");
    ps.line("  { 1 index /FID ne { def } { pop pop } ifelse } forall");
    // ISOLatin1Encoding puts minus and curly quotes at 0x2D, 0x27 and 0x60.
    ps.line("  /Encoding ISOLatin1Encoding 256 array copy");
    ps.line("  dup 16#2D /hyphen put dup 16#27 /quotesingle put dup 16#60 /grave put def");
    ps.line("  currentdict end definefont pop");
    ps.line("} bind def");
    ps.line("%%EndProlog");

    ps.line("%%BeginSetup");
    for font in surface.fonts_used() {
        ps.line(&format!(
            "/{} /{} reencodefont",
            font.base_name(),
            font.resource_name()
        ));
    }
    ps.line("%%EndSetup");

    let (scale, tx, ty) = page.canvas_mapping(canvas_width, canvas_height);
    ps.transform(&Transform {
        a: PT_PER_MM * scale,
        d: PT_PER_MM * scale,
        e: mm_to_pt(tx),
        f: mm_to_pt(ty),
        ..Transform::identity()
    });
    ps.surface(surface);
    ps.line("grestore");
    ps.line("showpage");
    ps.line("%%EOF");

    out.write_all(&ps.buf)?;
    out.flush()?;
    Ok(out)
}

#[derive(Default)]
struct PsStream {
    buf: Vec<u8>,
}

impl PsStream {
    fn line(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(b'\n');
    }

    fn nums(values: &[f64]) -> String {
        values
            .iter()
            .map(|v| format_coord(*v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Opens a `gsave` group; caller closes with `grestore`.
    fn transform(&mut self, t: &Transform) {
        self.line("gsave");
        if !t.is_identity() {
            self.line(&format!("[{}] concat", Self::nums(&t.components())));
        }
    }

    fn color(&mut self, c: &Color) {
        self.line(&format!("{} setrgbcolor", Self::nums(&[c.r, c.g, c.b])));
    }

    fn path(&mut self, path: &Path) {
        self.line("newpath");
        for seg in path.segments() {
            match *seg {
                Segment::MoveTo(x, y) => self.line(&format!("{} moveto", Self::nums(&[x, y]))),
                Segment::LineTo(x, y) => self.line(&format!("{} lineto", Self::nums(&[x, y]))),
                Segment::CurveTo(x1, y1, x2, y2, x3, y3) => {
                    self.line(&format!("{} curveto", Self::nums(&[x1, y1, x2, y2, x3, y3])))
                }
                Segment::Close => self.line("closepath"),
            }
        }
    }

    fn stroke(&mut self, path: &Path, style: &StrokeStyle) {
        self.line("gsave");
        self.color(&style.color);
        self.line(&format!("{} setlinewidth", format_coord(style.width)));
        if let LineStyle::Dashed { on, off } = style.line_style {
            self.line(&format!("[{}] 0 setdash", Self::nums(&[on, off])));
        }
        self.path(path);
        self.line("stroke");
        self.line("grestore");
    }

    fn show(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.buf.push(b'(');
        self.buf.extend_from_slice(&escape_string_bytes(bytes));
        self.line(") show");
    }

    /// Bytes 0x80..=0x9F have no ISOLatin1 glyph and go through
    /// `glyphshow` by name.
    fn text(&mut self, run: &TextRun) {
        self.color(&run.color);
        self.line(&format!(
            "/{} findfont {} scalefont setfont",
            run.font.resource_name(),
            format_coord(run.size)
        ));
        self.line(&format!("{} moveto", Self::nums(&[run.x, run.y])));
        let mut pending = Vec::new();
        for ch in run.text.chars() {
            let byte = win_ansi_byte(ch).unwrap_or(b'?');
            match win_ansi_glyph_name(byte) {
                Some(name) => {
                    self.show(&pending);
                    pending.clear();
                    self.line(&format!("/{} glyphshow", name));
                }
                None => pending.push(byte),
            }
        }
        self.show(&pending);
    }

    fn image(&mut self, image: &ImageData, rect_origin: (f64, f64), size: (f64, f64)) {
        let components = image.color_space.components();
        let decode = vec!["0 1"; components].join(" ");
        let filters = match image.format {
            ImageFormat::Jpeg => "/ASCIIHexDecode filter /DCTDecode filter",
            ImageFormat::Png => "/ASCIIHexDecode filter",
        };
        self.line("gsave");
        self.line(&format!("{} translate", Self::nums(&[rect_origin.0, rect_origin.1])));
        self.line(&format!("{} scale", Self::nums(&[size.0, size.1])));
        self.line(&format!("/{} setcolorspace", image.color_space.name()));
        self.line(&format!(
            "<< /ImageType 1 /Width {w} /Height {h} /BitsPerComponent {bpc} /Decode [{decode}] \
             /ImageMatrix [{w} 0 0 -{h} 0 {h}] /DataSource currentfile {filters} >> image",
            w = image.width,
            h = image.height,
            bpc = image.bits_per_component,
        ));
        for chunk in image.data.chunks(HEX_LINE_BYTES) {
            let hex: String = chunk.iter().map(|b| format!("{:02X}", b)).collect();
            self.line(&hex);
        }
        self.line(">");
        self.line("grestore");
    }

    fn surface(&mut self, surface: &Surface) {
        for op in surface.ops() {
            match op {
                DrawOp::Fill { path, color } => {
                    self.color(color);
                    self.path(path);
                    self.line("fill");
                }
                DrawOp::Stroke { path, style } => self.stroke(path, style),
                DrawOp::Text(run) => self.text(run),
                DrawOp::Image { image, rect } => {
                    self.image(image, (rect.left, rect.bottom), (rect.width, rect.height))
                }
                DrawOp::Insert { surface, transform } => {
                    self.transform(transform);
                    self.surface(surface);
                    self.line("grestore");
                }
            }
        }
    }
}
