//! Placement arithmetic for poster boxes, free of drawing side
//! effects. All lengths are millimetres with a bottom-left origin.

use std::fmt;
use std::str::FromStr;

use crate::error::PosterError;
use crate::geometry::{BBox, Transform};
use crate::units::{CM, MM};

/// Fraction of the poster width taken by a box panel.
pub const PANEL_WIDTH_RATIO: f64 = 0.47;
/// Left margin of the left column, as a fraction of the poster width.
pub const LEFT_MARGIN_RATIO: f64 = 0.02;
/// Vertical space added to a block's height to make room for the
/// box title and padding.
pub const BOX_PADDING: f64 = 7.0 * CM;
/// Space between a block's bottom and the panel's bottom edge.
pub const BLOCK_BOTTOM_PADDING: f64 = 1.0 * CM;
/// Gap between consecutive boxes in a column.
pub const COLUMN_GAP: f64 = 1.0 * CM;
/// Initial cursor offset below the background's top edge.
pub const TOP_MARGIN: f64 = 1.0 * CM;
/// Strip between the title bar and the background.
pub const TITLE_SEPARATION: f64 = 3.0 * MM;
/// Corner radius of box panels.
pub const PANEL_RADIUS: f64 = 3.0 * CM;
/// Offset of the box title from the panel's top-left corner.
pub const TITLE_OFFSET: (f64, f64) = (1.5 * CM, -3.0 * CM);

/// One of the poster's two columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Left,
    Right,
}

impl FromStr for Column {
    type Err = PosterError;

    /// Case-insensitive `"left"` or `"right"`; anything else is an
    /// error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("left") {
            Ok(Column::Left)
        } else if s.eq_ignore_ascii_case("right") {
            Ok(Column::Right)
        } else {
            Err(PosterError::InvalidColumn(s.to_string()))
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Left => f.write_str("left"),
            Column::Right => f.write_str("right"),
        }
    }
}

/// Canvas dimensions shared by all placements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub title_height: f64,
}

impl PageGeometry {
    /// Top edge of the background area below the title bar.
    pub fn background_top(&self) -> f64 {
        self.height - self.title_height - TITLE_SEPARATION
    }

    pub fn panel_width(&self) -> f64 {
        PANEL_WIDTH_RATIO * self.width
    }

    /// Left edge of a column's panels.
    pub fn column_x(&self, column: Column) -> f64 {
        let margin = LEFT_MARGIN_RATIO * self.width;
        match column {
            Column::Left => margin,
            Column::Right => 0.5 * self.width + 0.5 * margin,
        }
    }
}

/// Running vertical offsets, measured down from the background's top
/// edge, of the next free slot in each column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnCursors {
    left: f64,
    right: f64,
}

impl Default for ColumnCursors {
    fn default() -> Self {
        ColumnCursors {
            left: TOP_MARGIN,
            right: TOP_MARGIN,
        }
    }
}

impl ColumnCursors {
    pub fn get(&self, column: Column) -> f64 {
        match column {
            Column::Left => self.left,
            Column::Right => self.right,
        }
    }

    /// Move a column's cursor down by `amount`. Negative amounts are
    /// ignored so cursors never move up.
    pub fn advance(&mut self, column: Column, amount: f64) {
        let step = amount.max(0.0);
        match column {
            Column::Left => self.left += step,
            Column::Right => self.right += step,
        }
    }
}

/// Where a box lands on the poster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxPlacement {
    pub column: Column,
    /// Cursor value the box was placed at.
    pub offset: f64,
    /// Rounded panel behind the block.
    pub panel: BBox,
    /// Baseline origin of the box title.
    pub title_origin: (f64, f64),
    /// Translation applied to the content block.
    pub block_transform: Transform,
}

impl BoxPlacement {
    /// Vertical space the box consumes in its column, gap included.
    pub fn advance(&self) -> f64 {
        self.panel.height + COLUMN_GAP
    }
}

/// Panel rectangle for a block of `block_height` placed at `offset`
/// below the background top.
pub fn panel_rect(geometry: &PageGeometry, column: Column, offset: f64, block_height: f64) -> BBox {
    let height = block_height + BOX_PADDING;
    let top = geometry.background_top() - offset;
    BBox::new(geometry.column_x(column), top - height, geometry.panel_width(), height)
}

/// Translation that centers a block horizontally in `panel` and rests
/// its bottom `BLOCK_BOTTOM_PADDING` above the panel's bottom edge,
/// compensating for a bounding box that does not start at the origin.
pub fn block_translation(panel: &BBox, block: &BBox) -> Transform {
    Transform::translate(
        panel.left - block.left + 0.5 * (panel.width - block.width),
        panel.bottom - block.bottom + BLOCK_BOTTOM_PADDING,
    )
}

/// Full placement of a block at the column's current cursor.
pub fn place_box(
    geometry: &PageGeometry,
    cursors: &ColumnCursors,
    column: Column,
    block: &BBox,
) -> BoxPlacement {
    let offset = cursors.get(column);
    let panel = panel_rect(geometry, column, offset, block.height);
    BoxPlacement {
        column,
        offset,
        panel,
        title_origin: (panel.left + TITLE_OFFSET.0, panel.top() + TITLE_OFFSET.1),
        block_transform: block_translation(&panel, block),
    }
}
