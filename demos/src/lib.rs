//! Shared helpers for the demo programs.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;

/// Write a small gradient PNG to `path` unless a file is already
/// there, so the demos run without shipping a logo.
pub fn ensure_logo(path: &Path) -> io::Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let (width, height) = (120u32, 76u32);
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.push((255 * x / width) as u8);
            pixels.push((255 * y / height) as u8);
            pixels.push(160);
        }
    }
    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().map_err(io::Error::other)?;
    writer.write_image_data(&pixels).map_err(io::Error::other)?;
    writer.finish().map_err(io::Error::other)?;
    Ok(())
}
