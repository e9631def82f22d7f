use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path as FsPath;

use proptest::prelude::*;

use poster_core::layout::{COLUMN_GAP, TOP_MARGIN};
use poster_core::{
    BBox, Color, Column, ContentBlock, Path, Poster, PosterConfig, PosterError, Surface,
    TypesetConfig,
};

fn write_logo(dir: &FsPath) -> std::path::PathBuf {
    let path = dir.join("logo.png");
    let file = File::create(&path).unwrap();
    let mut encoder = png::Encoder::new(BufWriter::new(file), 3, 2);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(&[200u8; 18]).unwrap();
    writer.finish().unwrap();
    path
}

fn new_poster(dir: &FsPath) -> Poster {
    let config = PosterConfig {
        title: "Sparse Graphs".into(),
        authors: "A. Author, B. Author".into(),
        logo: write_logo(dir),
        output_stem: dir.join("poster").to_string_lossy().into_owned(),
        ..Default::default()
    };
    Poster::new(config, TypesetConfig::default()).unwrap()
}

fn block(left: f64, bottom: f64, width: f64, height: f64) -> ContentBlock {
    let mut s = Surface::new();
    s.fill(Path::rect(left, bottom, width, height), Color::BLACK);
    ContentBlock::from_surface(s)
}

#[test]
fn block_of_height_50_moves_left_cursor_to_140() {
    let dir = tempfile::tempdir().unwrap();
    let mut poster = new_poster(dir.path());
    poster
        .add_box(&block(0.0, 0.0, 100.0, 50.0), Column::Left, "Intro", false)
        .unwrap();
    assert_eq!(poster.cursors().get(Column::Left), 140.0);
    assert_eq!(poster.cursors().get(Column::Right), TOP_MARGIN);
}

#[test]
fn columns_advance_independently() {
    let dir = tempfile::tempdir().unwrap();
    let mut poster = new_poster(dir.path());
    let b = block(0.0, 0.0, 100.0, 30.0);
    poster.add_box(&b, Column::Right, "One", false).unwrap();
    poster.add_box(&b, Column::Right, "Two", false).unwrap();
    let left = poster.add_box(&b, Column::Left, "Three", false).unwrap();
    assert_eq!(left.offset, TOP_MARGIN);
    assert_eq!(poster.cursors().get(Column::Right), TOP_MARGIN + 2.0 * (30.0 + 70.0 + COLUMN_GAP));
}

#[test]
fn panel_is_47_percent_wide_and_block_centered() {
    let dir = tempfile::tempdir().unwrap();
    let mut poster = new_poster(dir.path());
    let b = block(-12.0, -40.0, 80.0, 60.0);
    let placement = poster.add_box(&b, Column::Right, "Results", false).unwrap();
    assert_eq!(placement.panel.width, 0.47 * 840.0);
    let placed = b.bbox().transformed(&placement.block_transform);
    assert!((placed.center_x() - placement.panel.center_x()).abs() < 1e-9);
    assert!((placed.bottom - (placement.panel.bottom + 10.0)).abs() < 1e-9);
}

#[test]
fn column_names_are_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let b = block(0.0, 0.0, 50.0, 50.0);
    let mut upper = new_poster(dir.path());
    let mut lower = new_poster(dir.path());
    let a = upper.add_box_named(&b, "LEFT", "T", false).unwrap();
    let c = lower.add_box_named(&b, "left", "T", false).unwrap();
    assert_eq!(a, c);
}

#[test]
fn unknown_column_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut poster = new_poster(dir.path());
    let err = poster
        .add_box_named(&block(0.0, 0.0, 1.0, 1.0), "center", "T", false)
        .unwrap_err();
    assert!(matches!(err, PosterError::InvalidColumn(ref s) if s == "center"));
    assert_eq!(poster.cursors().get(Column::Left), TOP_MARGIN);
}

#[test]
fn overflowing_box_is_still_placed() {
    let dir = tempfile::tempdir().unwrap();
    let mut poster = new_poster(dir.path());
    let placement = poster
        .add_box(&block(0.0, 0.0, 10.0, 2000.0), Column::Left, "Huge", false)
        .unwrap();
    assert!(placement.panel.bottom < 0.0);
}

#[test]
fn markup_block_places_like_any_other() {
    let dir = tempfile::tempdir().unwrap();
    let mut poster = new_poster(dir.path());
    let b = poster
        .render_markup_to_block("\\begin{itemize}\\item one\\item two\\end{itemize}")
        .unwrap();
    let placement = poster.add_box(&b, Column::Left, "List", false).unwrap();
    assert!((placement.panel.height - (b.height() + 70.0)).abs() < 1e-9);
}

#[test]
fn malformed_markup_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let poster = new_poster(dir.path());
    let err = poster.render_markup_to_block("\\textbf{open").unwrap_err();
    assert!(matches!(err, PosterError::Markup(_)));
}

#[test]
fn fresh_poster_exports_single_a0_page() {
    let dir = tempfile::tempdir().unwrap();
    let poster = new_poster(dir.path());
    let path = poster.export_as_pdf().unwrap();
    assert_eq!(path, dir.path().join("poster.pdf"));
    let bytes = fs::read(&path).unwrap();
    let out = String::from_utf8_lossy(&bytes);
    assert!(out.starts_with("%PDF-1.7"));
    assert!(out.contains("/Type /Pages /Kids [") && out.contains("/Count 1"));
    assert!(out.contains("/MediaBox [0.0 0.0 2383.937008 3370.393701]"));
    assert!(out.contains("/Title (Sparse Graphs)"));
    assert!(out.contains("/Subtype /Image"));
    assert!(out.ends_with("%%EOF\n"));
}

#[test]
fn fresh_poster_eps_has_title_bar_and_background() {
    let dir = tempfile::tempdir().unwrap();
    let poster = new_poster(dir.path());
    let path = poster.export_as_eps().unwrap();
    assert_eq!(path, dir.path().join("poster.eps"));
    let out = fs::read_to_string(&path).unwrap();
    assert!(out.contains("%%BoundingBox: 0 0 2384 3371"));
    // Title bar, then background.
    let bar = out.find("0 0.4 0.3867 setrgbcolor\nnewpath\n0 1100 moveto").unwrap();
    let background = out.find("0.8 0.8 0.8 setrgbcolor\nnewpath\n0 0 moveto").unwrap();
    assert!(bar < background);
    assert!(out.contains("(Sparse) show") || out.contains("(Sparse Graphs) show"));
    assert_eq!(out.matches("showpage").count(), 1);
}

#[test]
fn export_does_not_freeze_poster() {
    let dir = tempfile::tempdir().unwrap();
    let mut poster = new_poster(dir.path());
    let before = poster.write_pdf(Vec::new()).unwrap();
    poster
        .add_box(&block(0.0, 0.0, 10.0, 10.0), Column::Left, "Late", false)
        .unwrap();
    let after = poster.write_pdf(Vec::new()).unwrap();
    assert!(after.len() > before.len());
}

#[test]
fn debug_bbox_adds_a_stroke() {
    let dir = tempfile::tempdir().unwrap();
    let mut plain = new_poster(dir.path());
    let mut debug = new_poster(dir.path());
    let b = block(0.0, 0.0, 10.0, 10.0);
    plain.add_box(&b, Column::Left, "T", false).unwrap();
    debug.add_box(&b, Column::Left, "T", true).unwrap();
    assert_eq!(debug.surface().ops().len(), plain.surface().ops().len() + 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn column_offset_is_margin_plus_prior_heights(
        boxes in prop::collection::vec((0.0f64..400.0, any::<bool>()), 1..8)
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut poster = new_poster(dir.path());
        let mut expected_left = TOP_MARGIN;
        let mut expected_right = TOP_MARGIN;
        for (height, left) in boxes {
            let column = if left { Column::Left } else { Column::Right };
            let b = ContentBlock::new(Surface::new(), BBox::new(0.0, 0.0, 100.0, height));
            let placement = poster.add_box(&b, column, "Box", false).unwrap();
            let expected = if left { &mut expected_left } else { &mut expected_right };
            prop_assert!((placement.offset - *expected).abs() < 1e-9);
            *expected += height + 70.0 + COLUMN_GAP;
        }
        prop_assert!((poster.cursors().get(Column::Left) - expected_left).abs() < 1e-9);
        prop_assert!((poster.cursors().get(Column::Right) - expected_right).abs() < 1e-9);
    }
}
