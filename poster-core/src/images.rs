use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{ImageError, PosterError};
use crate::geometry::BBox;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Color space of the decoded samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceRGB,
    DeviceGray,
}

impl ColorSpace {
    pub fn name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceGray => "DeviceGray",
        }
    }

    pub fn components(&self) -> usize {
        match self {
            ColorSpace::DeviceRGB => 3,
            ColorSpace::DeviceGray => 1,
        }
    }
}

/// Parsed image data ready for embedding.
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub color_space: ColorSpace,
    pub bits_per_component: u8,
    /// Raw 8-bit samples (PNG) or the untouched JPEG stream.
    pub data: Vec<u8>,
    /// Separate alpha channel (one byte per pixel), if present.
    pub alpha: Option<Vec<u8>>,
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("color_space", &self.color_space)
            .field("bytes", &self.data.len())
            .field("alpha", &self.alpha.is_some())
            .finish()
    }
}

/// Detect image format from magic bytes.
pub fn detect_format(data: &[u8]) -> Result<ImageFormat, ImageError> {
    if data.len() < 4 {
        return Err(ImageError::TooShort);
    }
    if data[0] == 0xFF && data[1] == 0xD8 {
        Ok(ImageFormat::Jpeg)
    } else if data[..4] == [0x89, b'P', b'N', b'G'] {
        Ok(ImageFormat::Png)
    } else {
        Err(ImageError::UnsupportedFormat)
    }
}

/// Load and parse image data from raw bytes.
pub fn load_image(data: Vec<u8>) -> Result<ImageData, ImageError> {
    match detect_format(&data)? {
        ImageFormat::Jpeg => parse_jpeg(data),
        ImageFormat::Png => parse_png(data),
    }
}

/// Read and parse an image file. A missing file is reported with its
/// path.
pub fn load_image_file<P: AsRef<Path>>(path: P) -> Result<ImageData, PosterError> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| PosterError::Asset {
        path: path.to_path_buf(),
        source,
    })?;
    let image = load_image(data)?;
    tracing::debug!(
        path = %path.display(),
        width = image.width,
        height = image.height,
        format = ?image.format,
        "loaded image"
    );
    Ok(image)
}

/// JPEG is embedded as-is; only the frame header is read.
fn parse_jpeg(data: Vec<u8>) -> Result<ImageData, ImageError> {
    let (width, height, components) = jpeg_dimensions(&data)?;
    let color_space = match components {
        1 => ColorSpace::DeviceGray,
        3 => ColorSpace::DeviceRGB,
        n => return Err(ImageError::JpegComponents(n)),
    };

    Ok(ImageData {
        width,
        height,
        format: ImageFormat::Jpeg,
        color_space,
        bits_per_component: 8,
        data,
        alpha: None,
    })
}

/// Scan JPEG data for SOF0-SOF3 markers and extract width/height/components.
fn jpeg_dimensions(data: &[u8]) -> Result<(u32, u32, u8), ImageError> {
    let len = data.len();
    let mut i = 0;
    while i + 1 < len {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let marker = data[i + 1];
        if (0xC0..=0xC3).contains(&marker) {
            if i + 9 >= len {
                return Err(ImageError::JpegTruncated);
            }
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            return Ok((width, height, data[i + 9]));
        }
        match marker {
            // Fill byte or stuffed zero.
            0xFF | 0x00 => i += 1,
            // Standalone markers carry no length.
            0xD8 | 0xD9 | 0xD0..=0xD7 => i += 2,
            _ => {
                if i + 3 >= len {
                    break;
                }
                let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
                i += 2 + seg_len;
            }
        }
    }
    Err(ImageError::JpegNoFrame)
}

/// Decode PNG to 8-bit gray or RGB samples, splitting off alpha.
fn parse_png(data: Vec<u8>) -> Result<ImageData, ImageError> {
    let mut decoder = png::Decoder::new(data.as_slice());
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e| ImageError::Png(e.to_string()))?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| ImageError::Png(e.to_string()))?;
    buf.truncate(info.buffer_size());

    let (color_space, channels) = match info.color_type {
        png::ColorType::Rgb => (ColorSpace::DeviceRGB, 3),
        png::ColorType::Rgba => (ColorSpace::DeviceRGB, 4),
        png::ColorType::Grayscale => (ColorSpace::DeviceGray, 1),
        png::ColorType::GrayscaleAlpha => (ColorSpace::DeviceGray, 2),
        other => return Err(ImageError::PngColorType(format!("{:?}", other))),
    };

    let (data, alpha) = if channels == color_space.components() {
        (buf, None)
    } else {
        let pixel_count = (info.width * info.height) as usize;
        let mut color = Vec::with_capacity(pixel_count * color_space.components());
        let mut alpha = Vec::with_capacity(pixel_count);
        for chunk in buf.chunks_exact(channels) {
            let (c, a) = chunk.split_at(channels - 1);
            color.extend_from_slice(c);
            alpha.push(a[0]);
        }
        (color, Some(alpha))
    };

    Ok(ImageData {
        width: info.width,
        height: info.height,
        format: ImageFormat::Png,
        color_space,
        bits_per_component: 8,
        data,
        alpha,
    })
}

/// Largest rectangle with the image's aspect ratio that fits inside
/// `rect`, anchored at its lower-left corner.
pub fn fit_into(img_w: u32, img_h: u32, rect: &BBox) -> BBox {
    if img_w == 0 || img_h == 0 {
        return BBox::new(rect.left, rect.bottom, 0.0, 0.0);
    }
    let iw = img_w as f64;
    let ih = img_h as f64;
    let scale = (rect.width / iw).min(rect.height / ih);
    BBox::new(rect.left, rect.bottom, iw * scale, ih * scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_rejects_short_and_unknown() {
        assert_eq!(detect_format(&[0xFF]), Err(ImageError::TooShort));
        assert_eq!(
            detect_format(b"GIF89a"),
            Err(ImageError::UnsupportedFormat)
        );
        assert_eq!(detect_format(&[0xFF, 0xD8, 0xFF, 0xE0]), Ok(ImageFormat::Jpeg));
    }

    #[test]
    fn jpeg_frame_header() {
        // SOI, APP0 (length 4), SOF0 with 16x8, 3 components.
        let data = vec![
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, 0xFF, 0xC0, 0x00, 0x11, 0x08,
            0x00, 0x08, 0x00, 0x10, 0x03, 0x00,
        ];
        let img = load_image(data).unwrap();
        assert_eq!((img.width, img.height), (16, 8));
        assert_eq!(img.color_space, ColorSpace::DeviceRGB);
        assert_eq!(img.format, ImageFormat::Jpeg);
    }

    #[test]
    fn jpeg_without_frame_fails() {
        let data = vec![0xFF, 0xD8, 0xFF, 0xD9];
        assert_eq!(load_image(data).unwrap_err(), ImageError::JpegNoFrame);
    }

    #[test]
    fn fit_preserves_aspect_ratio() {
        let rect = BBox::new(10.0, 20.0, 120.0, 76.0);
        let wide = fit_into(400, 100, &rect);
        assert_eq!(wide, BBox::new(10.0, 20.0, 120.0, 30.0));
        let tall = fit_into(100, 200, &rect);
        assert_eq!(tall, BBox::new(10.0, 20.0, 38.0, 76.0));
    }
}
