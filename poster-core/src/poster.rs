use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::PosterConfig;
use crate::document::PdfDocument;
use crate::eps;
use crate::error::PosterError;
use crate::geometry::{BBox, Path, Transform};
use crate::graphics::{Color, StrokeStyle};
use crate::images::{fit_into, load_image_file};
use crate::layout::{place_box, BoxPlacement, Column, ColumnCursors, PageGeometry, PANEL_RADIUS};
use crate::surface::{ContentBlock, Surface};
use crate::typeset::{TypesetConfig, Typesetter};
use crate::units::{CM, MM};

/// Title baseline origin: x from the left edge, y from the top edge.
const TITLE_POSITION: (f64, f64) = (24.0 * MM, 55.0 * MM);
/// Authors baseline origin, measured like [`TITLE_POSITION`].
const AUTHORS_POSITION: (f64, f64) = (25.0 * MM, 88.0 * MM);
/// Logo lower-left corner: x from the right edge, y from the top edge.
const LOGO_POSITION: (f64, f64) = (145.0 * MM, 88.0 * MM);
/// Area the logo is scaled into, keeping its aspect ratio.
const LOGO_MAX_SIZE: (f64, f64) = (120.0 * MM, 76.0 * MM);
/// Gray level of the background panel.
const BACKGROUND_GRAY: f64 = 0.8;
const GRID_STEP: f64 = 5.0 * CM;
/// Line width of grid and bounding-box strokes.
const DEBUG_LINE_WIDTH: f64 = 0.8 * MM;

/// Accent color of the title bar and box titles.
pub fn accent_color() -> Color {
    Color::hsb(178.0 / 360.0, 1.0, 0.4)
}

/// A two-column poster under construction.
///
/// Construction paints the title bar (title, authors, logo) and the
/// background. Each [`Poster::add_box`] appends a titled panel to the
/// bottom of a column. Exporting borrows the poster, so boxes can still
/// be added afterwards.
#[derive(Debug)]
pub struct Poster {
    config: PosterConfig,
    geometry: PageGeometry,
    typesetter: Typesetter,
    surface: Surface,
    cursors: ColumnCursors,
}

impl Poster {
    /// Build the typesetter from `typeset`, then paint the title bar
    /// and background. Fails on a bad preamble, bad title markup or a
    /// missing/undecodable logo.
    pub fn new(config: PosterConfig, typeset: TypesetConfig) -> Result<Self, PosterError> {
        let typesetter = Typesetter::new(typeset)?;
        let geometry = PageGeometry {
            width: config.width,
            height: config.height,
            title_height: config.title_height,
        };
        let mut poster = Poster {
            config,
            geometry,
            typesetter,
            surface: Surface::new(),
            cursors: ColumnCursors::default(),
        };
        poster.paint_title_bar()?;
        tracing::debug!(
            width = geometry.width,
            height = geometry.height,
            title_height = geometry.title_height,
            "poster created"
        );
        Ok(poster)
    }

    fn paint_title_bar(&mut self) -> Result<(), PosterError> {
        let PageGeometry {
            width: w,
            height: h,
            title_height: th,
        } = self.geometry;

        self.surface.fill(Path::rect(0.0, h - th, w, th), accent_color());

        let title = self.typesetter.text(&self.config.title, Color::WHITE)?;
        self.insert_block(&title, Transform::translate(TITLE_POSITION.0, h - TITLE_POSITION.1));
        let authors = self.typesetter.text(&self.config.authors, Color::WHITE)?;
        self.insert_block(
            &authors,
            Transform::translate(AUTHORS_POSITION.0, h - AUTHORS_POSITION.1),
        );

        let logo = Arc::new(load_image_file(&self.config.logo)?);
        let area = BBox::new(
            w - LOGO_POSITION.0,
            h - LOGO_POSITION.1,
            LOGO_MAX_SIZE.0,
            LOGO_MAX_SIZE.1,
        );
        let rect = fit_into(logo.width, logo.height, &area);
        self.surface.image(logo, rect);

        self.surface.fill(
            Path::rect(0.0, 0.0, w, self.geometry.background_top()),
            Color::gray(BACKGROUND_GRAY),
        );
        Ok(())
    }

    fn insert_block(&mut self, block: &ContentBlock, transform: Transform) {
        if !block.surface().is_empty() {
            self.surface.insert(Arc::clone(block.surface()), transform);
        }
    }

    /// Place `block` in a titled panel at the bottom of `column` and
    /// move that column's cursor down. With `draw_bbox` the block's
    /// bounding box is stroked for debugging.
    pub fn add_box(
        &mut self,
        block: &ContentBlock,
        column: Column,
        title: &str,
        draw_bbox: bool,
    ) -> Result<BoxPlacement, PosterError> {
        let placement = place_box(&self.geometry, &self.cursors, column, &block.bbox());
        let title_block = self
            .typesetter
            .text(&format!("\\large\\bfseries {}", title), accent_color())?;

        let panel = placement.panel;
        self.surface.fill(
            Path::rounded_rect(panel.left, panel.bottom, panel.width, panel.height, PANEL_RADIUS),
            Color::WHITE,
        );
        self.insert_block(
            &title_block,
            Transform::translate(placement.title_origin.0, placement.title_origin.1),
        );
        if draw_bbox {
            let outline = block.bbox().transformed(&placement.block_transform);
            self.surface.stroke(
                outline.to_path(),
                StrokeStyle::solid(Color::BLACK, DEBUG_LINE_WIDTH),
            );
        }
        self.insert_block(block, placement.block_transform);
        self.cursors.advance(column, placement.advance());

        tracing::debug!(
            column = %column,
            offset = placement.offset,
            panel_height = panel.height,
            title,
            "placed box"
        );
        if panel.bottom < 0.0 {
            tracing::warn!(
                column = %column,
                overflow = -panel.bottom,
                "box extends below the poster bottom"
            );
        }
        Ok(placement)
    }

    /// [`Poster::add_box`] with the column given by name
    /// (`"left"`/`"right"`, any case).
    pub fn add_box_named(
        &mut self,
        block: &ContentBlock,
        column: &str,
        title: &str,
        draw_bbox: bool,
    ) -> Result<BoxPlacement, PosterError> {
        let column: Column = column.parse()?;
        self.add_box(block, column, title, draw_bbox)
    }

    /// Dashed lines every 5 cm across the whole canvas.
    pub fn print_grid(&mut self) {
        let PageGeometry { width, height, .. } = self.geometry;
        let style = StrokeStyle::dashed(Color::BLACK, DEBUG_LINE_WIDTH);
        let mut x = 0.0;
        while x <= width {
            self.surface.stroke(Path::line(x, 0.0, x, height), style);
            x += GRID_STEP;
        }
        let mut y = 0.0;
        while y <= height {
            self.surface.stroke(Path::line(0.0, y, width, y), style);
            y += GRID_STEP;
        }
    }

    /// Typeset markup into a 9.2 cm container (before scaling).
    pub fn render_markup_to_block(&self, markup: &str) -> Result<ContentBlock, PosterError> {
        self.typesetter.render_markup_to_block(markup)
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn cursors(&self) -> &ColumnCursors {
        &self.cursors
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Serialize the poster as a one-page PDF.
    pub fn write_pdf<W: Write>(&self, writer: W) -> Result<W, PosterError> {
        let mut doc = PdfDocument::new(writer)?;
        doc.set_compression(true);
        doc.set_info("Creator", "poster");
        if !self.config.title.is_empty() {
            doc.set_info("Title", &self.config.title);
        }
        if !self.config.authors.is_empty() {
            doc.set_info("Author", &self.config.authors);
        }
        doc.add_page(
            &self.surface,
            self.geometry.width,
            self.geometry.height,
            &self.config.page,
        )?;
        Ok(doc.end_document()?)
    }

    /// Serialize the poster as EPS.
    pub fn write_eps<W: Write>(&self, writer: W) -> Result<W, PosterError> {
        Ok(eps::write_eps(
            writer,
            &self.surface,
            self.geometry.width,
            self.geometry.height,
            &self.config.page,
            &self.config.title,
        )?)
    }

    /// Write `<output_stem>.pdf` and return its path.
    pub fn export_as_pdf(&self) -> Result<PathBuf, PosterError> {
        let path = self.output_path("pdf");
        self.write_pdf(BufWriter::new(File::create(&path)?))?;
        tracing::info!(path = %path.display(), "exported PDF");
        Ok(path)
    }

    /// Write `<output_stem>.eps` and return its path.
    pub fn export_as_eps(&self) -> Result<PathBuf, PosterError> {
        let path = self.output_path("eps");
        self.write_eps(BufWriter::new(File::create(&path)?))?;
        tracing::info!(path = %path.display(), "exported EPS");
        Ok(path)
    }

    fn output_path(&self, extension: &str) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.config.output_stem, extension))
    }
}
