use std::io::Cursor;

use anyhow::Context;

use crate::{
    foundation::core::Size,
    foundation::error::{PaintError, PaintResult},
    paint::color::{Color, PixelFormat},
    paint::image::Image,
};

/// Plain-data copy of an image: dimensions, declared format and packed pixels.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageSnapshot {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Declared format tag.
    pub format: PixelFormat,
    /// Row-major packed pixels.
    pub pixels: Vec<u32>,
}

impl ImageSnapshot {
    /// Serialize to JSON.
    pub fn to_json(&self) -> PaintResult<String> {
        serde_json::to_string(self).map_err(|e| PaintError::serde(e.to_string()))
    }

    /// Parse from JSON. Dimensions are checked against the pixel count.
    pub fn from_json(s: &str) -> PaintResult<Self> {
        let snap: Self = serde_json::from_str(s).map_err(|e| PaintError::serde(e.to_string()))?;
        Size::from_len_checked(snap.width, snap.height, snap.pixels.len())?;
        Ok(snap)
    }
}

impl Image {
    /// Copy of the pixels and metadata. The mutation counter is not part of it.
    pub fn snapshot(&self) -> ImageSnapshot {
        ImageSnapshot {
            width: self.width(),
            height: self.height(),
            format: self.format(),
            pixels: self.pixels().to_vec(),
        }
    }

    /// Rebuild an image from a snapshot.
    pub fn from_snapshot(snap: ImageSnapshot) -> PaintResult<Self> {
        Image::from_pixels(Size::new(snap.width, snap.height), snap.format, snap.pixels)
    }
}

/// Encode `img` as PNG, unpacking each pixel to straight RGBA8.
#[tracing::instrument(skip(img), fields(size = %img.size()))]
pub fn encode_png(img: &Image) -> PaintResult<Vec<u8>> {
    if !img.is_valid() {
        return Err(PaintError::validation("cannot encode a null or empty image"));
    }

    let rgba = img
        .pixels()
        .iter()
        .flat_map(|&v| Color::from_value(v).to_rgba8())
        .collect::<Vec<u8>>();
    let buf = image::RgbaImage::from_raw(img.width(), img.height(), rgba)
        .ok_or_else(|| PaintError::encode("rgba buffer does not match image size"))?;

    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(buf)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .context("write png")?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/encode.rs"]
mod tests;
