use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::fonts::{win_ansi_byte, BuiltinFont};
use crate::geometry::{Path, Segment, Transform};
use crate::graphics::{Color, LineStyle, StrokeStyle};
use crate::images::{ImageData, ImageFormat};
use crate::objects::{ObjId, PdfObject};
use crate::surface::{DrawOp, Surface, TextRun};
use crate::units::{mm_to_pt, PageOptions, PT_PER_MM};
use crate::writer::{escape_string_bytes, format_coord, PdfWriter};

const CATALOG_OBJ: ObjId = ObjId(1, 0);
const PAGES_OBJ: ObjId = ObjId(2, 0);
const FIRST_FREE_OBJ_NUM: u32 = 3;

/// Writes surfaces as PDF pages.
///
/// Generic over `Write` so it works with files (`BufWriter<File>`),
/// in-memory buffers (`Vec<u8>`), or any other writer. Each page is
/// written as soon as it is added; fonts and images are written once
/// and shared by later pages.
pub struct PdfDocument<W: Write> {
    writer: PdfWriter<W>,
    info: Vec<(String, String)>,
    page_obj_ids: Vec<ObjId>,
    next_obj_num: u32,
    compress: bool,
    fonts: BTreeMap<BuiltinFont, ObjId>,
    images: Vec<(Arc<ImageData>, ObjId)>,
}

impl<W: Write> PdfDocument<W> {
    /// Start a document on `writer`. The header is written
    /// immediately.
    pub fn new(writer: W) -> io::Result<Self> {
        let mut pdf_writer = PdfWriter::new(writer);
        pdf_writer.write_header()?;
        Ok(PdfDocument {
            writer: pdf_writer,
            info: Vec::new(),
            page_obj_ids: Vec::new(),
            next_obj_num: FIRST_FREE_OBJ_NUM,
            compress: false,
            fonts: BTreeMap::new(),
            images: Vec::new(),
        })
    }

    /// Set a document info entry (e.g. "Creator", "Title").
    pub fn set_info(&mut self, key: &str, value: &str) -> &mut Self {
        self.info.push((key.to_string(), value.to_string()));
        self
    }

    /// Flate-compress page content streams.
    pub fn set_compression(&mut self, enabled: bool) -> &mut Self {
        self.compress = enabled;
        self
    }

    fn alloc(&mut self) -> ObjId {
        let id = ObjId(self.next_obj_num, 0);
        self.next_obj_num += 1;
        id
    }

    fn font_id(&mut self, font: BuiltinFont) -> io::Result<ObjId> {
        if let Some(id) = self.fonts.get(&font) {
            return Ok(*id);
        }
        let id = self.alloc();
        let dict = PdfObject::dict(vec![
            ("Type", PdfObject::name("Font")),
            ("Subtype", PdfObject::name("Type1")),
            ("BaseFont", PdfObject::name(font.base_name())),
            ("Encoding", PdfObject::name("WinAnsiEncoding")),
        ]);
        self.writer.write_object(id, &dict)?;
        self.fonts.insert(font, id);
        Ok(id)
    }

    /// Index of the image in the document's XObject list, writing it
    /// on first use.
    fn image_index(&mut self, image: &Arc<ImageData>) -> io::Result<usize> {
        if let Some(i) = self.images.iter().position(|(img, _)| Arc::ptr_eq(img, image)) {
            return Ok(i);
        }
        let smask = match &image.alpha {
            Some(alpha) => {
                let id = self.alloc();
                let obj = PdfObject::stream(
                    vec![
                        ("Type", PdfObject::name("XObject")),
                        ("Subtype", PdfObject::name("Image")),
                        ("Width", PdfObject::Integer(image.width as i64)),
                        ("Height", PdfObject::Integer(image.height as i64)),
                        ("ColorSpace", PdfObject::name("DeviceGray")),
                        ("BitsPerComponent", PdfObject::Integer(8)),
                        ("Filter", PdfObject::name("FlateDecode")),
                    ],
                    deflate(alpha)?,
                );
                self.writer.write_object(id, &obj)?;
                Some(id)
            }
            None => None,
        };

        let (filter, data) = match image.format {
            ImageFormat::Jpeg => ("DCTDecode", image.data.clone()),
            ImageFormat::Png => ("FlateDecode", deflate(&image.data)?),
        };
        let mut dict = vec![
            ("Type", PdfObject::name("XObject")),
            ("Subtype", PdfObject::name("Image")),
            ("Width", PdfObject::Integer(image.width as i64)),
            ("Height", PdfObject::Integer(image.height as i64)),
            ("ColorSpace", PdfObject::name(image.color_space.name())),
            (
                "BitsPerComponent",
                PdfObject::Integer(image.bits_per_component as i64),
            ),
            ("Filter", PdfObject::name(filter)),
        ];
        if let Some(smask) = smask {
            dict.push(("SMask", PdfObject::Reference(smask)));
        }
        let id = self.alloc();
        self.writer.write_object(id, &PdfObject::stream(dict, data))?;
        self.images.push((Arc::clone(image), id));
        Ok(self.images.len() - 1)
    }

    /// Add one page showing `surface`, a canvas of `canvas_width` ×
    /// `canvas_height` millimetres mapped onto the paper by `page`.
    pub fn add_page(
        &mut self,
        surface: &Surface,
        canvas_width: f64,
        canvas_height: f64,
        page: &PageOptions,
    ) -> io::Result<()> {
        let mut font_resources = Vec::new();
        for font in surface.fonts_used() {
            let id = self.font_id(font)?;
            font_resources.push((font.resource_name(), PdfObject::Reference(id)));
        }
        let mut image_names = Vec::new();
        let mut image_resources = Vec::new();
        for image in surface.images() {
            let index = self.image_index(&image)?;
            let name = format!("Im{}", index + 1);
            image_resources.push((name.clone(), PdfObject::Reference(self.images[index].1)));
            image_names.push((image, name));
        }

        let (scale, tx, ty) = page.canvas_mapping(canvas_width, canvas_height);
        let mut content = ContentStream {
            buf: Vec::new(),
            image_names: &image_names,
        };
        content.transform(&Transform {
            a: PT_PER_MM * scale,
            d: PT_PER_MM * scale,
            e: mm_to_pt(tx),
            f: mm_to_pt(ty),
            ..Transform::identity()
        });
        content.surface(surface);
        content.op("Q");
        let ops = content.buf;

        let content_id = self.alloc();
        let page_id = self.alloc();
        let stream = if self.compress {
            PdfObject::stream(vec![("Filter", PdfObject::name("FlateDecode"))], deflate(&ops)?)
        } else {
            PdfObject::stream(vec![], ops)
        };
        self.writer.write_object(content_id, &stream)?;

        let (pw, ph) = page.paper.size_pt();
        let mut resources = Vec::new();
        if !font_resources.is_empty() {
            resources.push(("Font", PdfObject::dict(font_resources)));
        }
        if !image_resources.is_empty() {
            resources.push((
                "XObject",
                PdfObject::Dictionary(image_resources),
            ));
        }
        let page_dict = PdfObject::dict(vec![
            ("Type", PdfObject::name("Page")),
            ("Parent", PdfObject::Reference(PAGES_OBJ)),
            ("MediaBox", PdfObject::rect(0.0, 0.0, pw, ph)),
            ("Contents", PdfObject::Reference(content_id)),
            ("Resources", PdfObject::dict(resources)),
        ]);
        self.writer.write_object(page_id, &page_dict)?;
        self.page_obj_ids.push(page_id);
        Ok(())
    }

    /// Finish the document: info dictionary, pages tree, catalog,
    /// xref table and trailer. Returns the underlying writer.
    pub fn end_document(mut self) -> io::Result<W> {
        let info_id = if self.info.is_empty() {
            None
        } else {
            let id = self.alloc();
            let entries = self
                .info
                .iter()
                .map(|(k, v)| (k.as_str(), PdfObject::text_string(v)))
                .collect();
            self.writer.write_object(id, &PdfObject::dict(entries))?;
            Some(id)
        };

        let kids = self
            .page_obj_ids
            .iter()
            .map(|id| PdfObject::Reference(*id))
            .collect();
        let pages = PdfObject::dict(vec![
            ("Type", PdfObject::name("Pages")),
            ("Kids", PdfObject::Array(kids)),
            ("Count", PdfObject::Integer(self.page_obj_ids.len() as i64)),
        ]);
        self.writer.write_object(PAGES_OBJ, &pages)?;

        let catalog = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::Reference(PAGES_OBJ)),
        ]);
        self.writer.write_object(CATALOG_OBJ, &catalog)?;
        self.writer.write_xref_and_trailer(CATALOG_OBJ, info_id)?;
        let mut inner = self.writer.into_inner();
        inner.flush()?;
        Ok(inner)
    }
}

fn deflate(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Builds a page content stream from a display list.
struct ContentStream<'a> {
    buf: Vec<u8>,
    image_names: &'a [(Arc<ImageData>, String)],
}

impl ContentStream<'_> {
    fn op(&mut self, s: &str) {
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

    /// Opens a `q` group with the transform; caller closes with `Q`.
    fn transform(&mut self, t: &Transform) {
        self.op("q");
        if !t.is_identity() {
            self.op(&format!("{} cm", Self::nums(&t.components())));
        }
    }

    fn color(&mut self, c: &Color, operator: &str) {
        self.op(&format!("{} {}", Self::nums(&[c.r, c.g, c.b]), operator));
    }

    fn path(&mut self, path: &Path) {
        for seg in path.segments() {
            match *seg {
                Segment::MoveTo(x, y) => self.op(&format!("{} m", Self::nums(&[x, y]))),
                Segment::LineTo(x, y) => self.op(&format!("{} l", Self::nums(&[x, y]))),
                Segment::CurveTo(x1, y1, x2, y2, x3, y3) => {
                    self.op(&format!("{} c", Self::nums(&[x1, y1, x2, y2, x3, y3])))
                }
                Segment::Close => self.op("h"),
            }
        }
    }

    fn stroke(&mut self, path: &Path, style: &StrokeStyle) {
        self.op("q");
        self.color(&style.color, "RG");
        self.op(&format!("{} w", format_coord(style.width)));
        if let LineStyle::Dashed { on, off } = style.line_style {
            self.op(&format!("[{}] 0 d", Self::nums(&[on, off])));
        }
        self.path(path);
        self.op("S");
        self.op("Q");
    }

    fn text(&mut self, run: &TextRun) {
        let bytes: Vec<u8> = run
            .text
            .chars()
            .map(|c| win_ansi_byte(c).unwrap_or(b'?'))
            .collect();
        self.op("BT");
        self.op(&format!("/{} {} Tf", run.font.resource_name(), format_coord(run.size)));
        self.color(&run.color, "rg");
        self.op(&format!("{} Td", Self::nums(&[run.x, run.y])));
        self.buf.push(b'(');
        self.buf.extend_from_slice(&escape_string_bytes(&bytes));
        self.op(") Tj");
        self.op("ET");
    }

    fn surface(&mut self, surface: &Surface) {
        for op in surface.ops() {
            match op {
                DrawOp::Fill { path, color } => {
                    self.color(color, "rg");
                    self.path(path);
                    self.op("f");
                }
                DrawOp::Stroke { path, style } => self.stroke(path, style),
                DrawOp::Text(run) => self.text(run),
                DrawOp::Image { image, rect } => {
                    let name = self
                        .image_names
                        .iter()
                        .find(|(img, _)| Arc::ptr_eq(img, image))
                        .map(|(_, name)| name.clone());
                    if let Some(name) = name {
                        self.op("q");
                        self.op(&format!(
                            "{} cm",
                            Self::nums(&[rect.width, 0.0, 0.0, rect.height, rect.left, rect.bottom])
                        ));
                        self.op(&format!("/{} Do", name));
                        self.op("Q");
                    }
                }
                DrawOp::Insert { surface, transform } => {
                    self.transform(transform);
                    self.surface(surface);
                    self.op("Q");
                }
            }
        }
    }
}
