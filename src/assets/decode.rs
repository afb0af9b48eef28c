use anyhow::Context;

use crate::{
    foundation::core::Size,
    foundation::error::{PaintError, PaintResult},
    paint::color::{Color, PixelFormat},
    paint::image::Image,
};

/// Output of a pixel producer: row-major packed pixels plus a declared format tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedPixels {
    /// Dimensions.
    pub size: Size,
    /// Declared format of the encoded source (metadata only).
    pub format: PixelFormat,
    /// `size.width * size.height` packed values.
    pub pixels: Vec<u32>,
}

impl DecodedPixels {
    /// Validate the buffer length and wrap it as an [`Image`].
    pub fn into_image(self) -> PaintResult<Image> {
        Image::from_pixels(self.size, self.format, self.pixels)
    }
}

/// Decode encoded image bytes (any format the `image` crate recognizes) into packed pixels.
///
/// Every decoded pixel is unpacked to straight RGBA8 and repacked as a [`Color`]; the declared
/// format records what the file carried.
pub fn decode_image(bytes: &[u8]) -> PaintResult<DecodedPixels> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let format = declared_format(dyn_img.color());
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixels = rgba
        .as_raw()
        .chunks_exact(4)
        .map(|px| Color::rgba(px[0], px[1], px[2], px[3]).value())
        .collect::<Vec<_>>();

    let size = Size::from_len_checked(width, height, pixels.len())
        .map_err(|e| PaintError::decode(e.to_string()))?;

    Ok(DecodedPixels {
        size,
        format,
        pixels,
    })
}

fn declared_format(color: image::ColorType) -> PixelFormat {
    use image::ColorType;

    match color {
        ColorType::L8 | ColorType::L16 => PixelFormat::Gray,
        ColorType::La8 | ColorType::La16 => PixelFormat::GrayAlpha,
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => PixelFormat::Rgb,
        _ => PixelFormat::Rgba,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
