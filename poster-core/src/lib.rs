pub mod config;
pub mod document;
pub mod eps;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod graphics;
pub mod images;
pub mod layout;
pub mod markup;
pub mod objects;
pub mod poster;
pub mod surface;
pub mod textflow;
pub mod typeset;
pub mod units;
pub mod writer;

pub use config::PosterConfig;
pub use document::PdfDocument;
pub use error::{ImageError, MarkupError, PosterError};
pub use geometry::{BBox, Path, Transform};
pub use graphics::{Color, StrokeStyle};
pub use layout::{BoxPlacement, Column, ColumnCursors, PageGeometry};
pub use poster::Poster;
pub use surface::{ContentBlock, Surface};
pub use typeset::{TextEncoding, TypesetConfig, Typesetter};
pub use units::{PageOptions, PaperFormat};
