use std::collections::BTreeSet;
use std::sync::Arc;

use crate::fonts::{BuiltinFont, FontMetrics};
use crate::geometry::{BBox, Path, Transform};
use crate::graphics::{Color, StrokeStyle};
use crate::images::ImageData;

/// A single line of text placed at a baseline origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Left end of the baseline.
    pub x: f64,
    /// Baseline height.
    pub y: f64,
    pub text: String,
    pub font: BuiltinFont,
    /// Font size in the surface's units.
    pub size: f64,
    pub color: Color,
}

impl TextRun {
    /// Approximate ink extent from font metrics.
    pub fn bbox(&self) -> BBox {
        let width = FontMetrics::measure_text(&self.text, self.font, self.size);
        let descent = FontMetrics::descent(self.size);
        BBox::new(
            self.x,
            self.y - descent,
            width,
            descent + FontMetrics::ascent(self.size),
        )
    }
}

/// One recorded drawing call.
#[derive(Debug, Clone)]
pub enum DrawOp {
    Fill {
        path: Path,
        color: Color,
    },
    Stroke {
        path: Path,
        style: StrokeStyle,
    },
    Text(TextRun),
    /// Image painted into `rect` (lower-left origin).
    Image {
        image: Arc<ImageData>,
        rect: BBox,
    },
    /// Another surface drawn under an extra transform.
    Insert {
        surface: Arc<Surface>,
        transform: Transform,
    },
}

/// Display list of drawing calls, replayed by the PDF and EPS
/// writers. Coordinates use a bottom-left origin.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    ops: Vec<DrawOp>,
}

impl Surface {
    pub fn new() -> Self {
        Surface { ops: Vec::new() }
    }

    pub fn fill(&mut self, path: Path, color: Color) -> &mut Self {
        self.ops.push(DrawOp::Fill { path, color });
        self
    }

    pub fn stroke(&mut self, path: Path, style: StrokeStyle) -> &mut Self {
        self.ops.push(DrawOp::Stroke { path, style });
        self
    }

    pub fn text(&mut self, run: TextRun) -> &mut Self {
        self.ops.push(DrawOp::Text(run));
        self
    }

    pub fn image(&mut self, image: Arc<ImageData>, rect: BBox) -> &mut Self {
        self.ops.push(DrawOp::Image { image, rect });
        self
    }

    /// Draw `surface` under `transform`. The surface is shared, not
    /// copied.
    pub fn insert(
        &mut self,
        surface: Arc<Surface>,
        transform: Transform,
    ) -> &mut Self {
        self.ops.push(DrawOp::Insert { surface, transform });
        self
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Ink bounding box of everything drawn. Stroke widths are not
    /// included. Returns None for an empty surface.
    pub fn bbox(&self) -> Option<BBox> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Fill { path, .. } | DrawOp::Stroke { path, .. } => {
                    path.bbox()
                }
                DrawOp::Text(run) => Some(run.bbox()),
                DrawOp::Image { rect, .. } => Some(*rect),
                DrawOp::Insert { surface, transform } => surface
                    .bbox()
                    .map(|bb| bb.transformed(transform)),
            })
            .reduce(|acc, bb| acc.union(&bb))
    }

    /// All fonts referenced, including inside inserted surfaces.
    pub fn fonts_used(&self) -> BTreeSet<BuiltinFont> {
        let mut fonts = BTreeSet::new();
        self.collect_fonts(&mut fonts);
        fonts
    }

    fn collect_fonts(&self, fonts: &mut BTreeSet<BuiltinFont>) {
        for op in &self.ops {
            match op {
                DrawOp::Text(run) => {
                    fonts.insert(run.font);
                }
                DrawOp::Insert { surface, .. } => surface.collect_fonts(fonts),
                _ => {}
            }
        }
    }

    /// Distinct images referenced, in first-use order. Identity is
    /// the shared allocation, so one image placed twice is listed once.
    pub fn images(&self) -> Vec<Arc<ImageData>> {
        let mut images = Vec::new();
        self.collect_images(&mut images);
        images
    }

    fn collect_images(&self, images: &mut Vec<Arc<ImageData>>) {
        for op in &self.ops {
            match op {
                DrawOp::Image { image, .. } => {
                    if !images.iter().any(|i| Arc::ptr_eq(i, image)) {
                        images.push(Arc::clone(image));
                    }
                }
                DrawOp::Insert { surface, .. } => surface.collect_images(images),
                _ => {}
            }
        }
    }
}

/// A pre-rendered unit with its own bounding box, ready to be placed
/// in a poster box. Cloning shares the underlying surface.
#[derive(Debug, Clone)]
pub struct ContentBlock {
    surface: Arc<Surface>,
    bbox: BBox,
}

impl ContentBlock {
    /// Block with an explicit bounding box, which may differ from the
    /// ink extent (e.g. a fixed-width text container).
    pub fn new(surface: Surface, bbox: BBox) -> Self {
        ContentBlock {
            surface: Arc::new(surface),
            bbox,
        }
    }

    /// Block whose bounding box is the surface's ink extent. An empty
    /// surface gets a zero-sized box at the origin.
    pub fn from_surface(surface: Surface) -> Self {
        let bbox = surface
            .bbox()
            .unwrap_or_else(|| BBox::new(0.0, 0.0, 0.0, 0.0));
        ContentBlock::new(surface, bbox)
    }

    pub fn surface(&self) -> &Arc<Surface> {
        &self.surface
    }

    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn width(&self) -> f64 {
        self.bbox.width
    }

    pub fn height(&self) -> f64 {
        self.bbox.height
    }
}
