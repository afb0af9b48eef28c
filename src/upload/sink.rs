use crate::{
    foundation::core::Size,
    foundation::error::PaintResult,
    paint::color::PixelFormat,
    paint::image::Image,
};

/// Borrowed view of an image handed to a [`PixelConsumer`].
#[derive(Clone, Copy, Debug)]
pub struct PixelFrame<'a> {
    /// Dimensions.
    pub size: Size,
    /// Declared format tag.
    pub format: PixelFormat,
    /// Row-major packed pixels, `size.width * size.height` long.
    pub pixels: &'a [u32],
}

impl<'a> PixelFrame<'a> {
    /// View over `img`'s current contents.
    pub fn of(img: &'a Image) -> Self {
        Self {
            size: img.size(),
            format: img.format(),
            pixels: img.pixels(),
        }
    }
}

/// Downstream consumer of pixel data, e.g. a GPU texture uploader.
pub trait PixelConsumer {
    /// Take a copy of `frame`.
    fn upload(&mut self, frame: PixelFrame<'_>) -> PaintResult<()>;
}

/// Upload `img` to `consumer` if it changed since the last sync, then reset its counter.
///
/// Returns whether an upload happened. The counter is left alone when the upload fails, so the
/// next sync retries. A changed but invalid image is reset without uploading.
pub fn sync_if_changed(img: &mut Image, consumer: &mut dyn PixelConsumer) -> PaintResult<bool> {
    if !img.is_changed() {
        return Ok(false);
    }
    if !img.is_valid() {
        img.reset_changes();
        return Ok(false);
    }

    consumer.upload(PixelFrame::of(img))?;
    tracing::trace!(size = %img.size(), changes = img.changes(), "pixels synchronized");
    img.reset_changes();
    Ok(true)
}

/// One upload captured by [`InMemoryUploader`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upload {
    /// Dimensions at upload time.
    pub size: Size,
    /// Declared format at upload time.
    pub format: PixelFormat,
    /// Copied pixels.
    pub pixels: Vec<u32>,
}

/// In-memory consumer for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryUploader {
    uploads: Vec<Upload>,
}

impl InMemoryUploader {
    /// Create an empty uploader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads in arrival order.
    pub fn uploads(&self) -> &[Upload] {
        &self.uploads
    }

    /// Most recent upload.
    pub fn last(&self) -> Option<&Upload> {
        self.uploads.last()
    }
}

impl PixelConsumer for InMemoryUploader {
    fn upload(&mut self, frame: PixelFrame<'_>) -> PaintResult<()> {
        self.uploads.push(Upload {
            size: frame.size,
            format: frame.format,
            pixels: frame.pixels.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/upload/sink.rs"]
mod tests;
