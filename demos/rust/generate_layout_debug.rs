use std::path::Path;

use poster_core::geometry::Path as Shape;
use poster_core::{
    Color, Column, ContentBlock, PageOptions, PaperFormat, Poster, PosterConfig, Surface,
    TypesetConfig,
};

/// Lays out plain rectangles of known heights with the grid and
/// bounding boxes switched on, scaled down onto A3.
fn main() {
    poster_demos::ensure_logo(Path::new("images/logo.png")).unwrap();

    let config = PosterConfig {
        output_stem: "layout_debug".to_string(),
        page: PageOptions {
            paper: PaperFormat::A3,
            centered: true,
            fit_to_size: true,
        },
        ..PosterConfig::new("Layout check", "grid every 5 cm")
    };
    let mut poster = Poster::new(config, TypesetConfig::default()).unwrap();

    for (i, height) in [50.0, 120.0, 80.0, 200.0].into_iter().enumerate() {
        let mut surface = Surface::new();
        surface.fill(Shape::rect(0.0, 0.0, 300.0, height), Color::gray(0.6));
        let block = ContentBlock::from_surface(surface);
        let column = if i % 2 == 0 { Column::Left } else { Column::Right };
        let placement = poster
            .add_box(&block, column, &format!("Block {}", i + 1), true)
            .unwrap();
        println!(
            "{} box at offset {:.1} mm, panel {:.1} x {:.1} mm",
            column, placement.offset, placement.panel.width, placement.panel.height
        );
    }
    poster.print_grid();

    let path = poster.export_as_pdf().unwrap();
    println!("Generated: {}", path.display());
}
