use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::{
    foundation::core::Size,
    foundation::error::{PaintError, PaintResult},
    paint::color::{Color, PixelFormat},
};

/// Reference-counted handle shared between painters, caches and consumers.
///
/// Single-threaded by construction; no locking is involved.
pub type SharedImage = Rc<RefCell<Image>>;

/// Rectangular grid of packed pixels.
///
/// Storage is one contiguous row-major buffer indexed by `x + y * width`, one [`Color`] value per
/// pixel whatever the declared [`PixelFormat`]. An image may also be *null* (no buffer), which is
/// how allocation and load failures are reported; check [`Image::is_valid`] before relying on
/// the contents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Image {
    name: Option<String>,
    size: Size,
    format: PixelFormat,
    pixels: Option<Vec<u32>>,
    changes: Cell<u64>,
}

impl Image {
    /// The null sentinel: no buffer, zero size, [`PixelFormat::Invalid`].
    pub fn null() -> Self {
        Self {
            name: None,
            size: Size::default(),
            format: PixelFormat::Invalid,
            pixels: None,
            changes: Cell::new(0),
        }
    }

    /// Zero-filled image of `size`.
    ///
    /// Returns [`Image::null`] if the pixel count overflows or the buffer cannot be reserved.
    pub fn create(size: Size, format: PixelFormat) -> Self {
        let Some(area) = size.checked_area() else {
            tracing::warn!(%size, "image area overflows, returning null image");
            return Self::null();
        };

        let mut pixels = Vec::new();
        if let Err(err) = pixels.try_reserve_exact(area) {
            tracing::warn!(%size, %err, "pixel buffer allocation failed, returning null image");
            return Self::null();
        }
        pixels.resize(area, 0);

        Self {
            name: None,
            size,
            format,
            pixels: Some(pixels),
            changes: Cell::new(0),
        }
    }

    /// Image of `size` with every pixel set to `color`.
    pub fn create_filled(size: Size, color: Color, format: PixelFormat) -> Self {
        let mut img = Self::create(size, format);
        img.clear(color);
        img
    }

    /// Wrap a producer's row-major packed pixels.
    pub fn from_pixels(size: Size, format: PixelFormat, pixels: Vec<u32>) -> PaintResult<Self> {
        Size::from_len_checked(size.width, size.height, pixels.len())?;
        if !format.is_concrete() {
            return Err(PaintError::validation(
                "pixel producer must declare a concrete format",
            ));
        }
        Ok(Self {
            name: None,
            size,
            format,
            pixels: Some(pixels),
            changes: Cell::new(0),
        })
    }

    /// Move this image behind a [`SharedImage`] handle.
    pub fn into_shared(self) -> SharedImage {
        Rc::new(RefCell::new(self))
    }

    /// `true` when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        !self.size.is_valid()
    }

    /// `true` when there is no pixel buffer.
    pub fn is_null(&self) -> bool {
        self.pixels.is_none()
    }

    /// Non-null and non-empty.
    pub fn is_valid(&self) -> bool {
        !self.is_empty() && !self.is_null()
    }

    /// Declared format tag.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Dimensions.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.size.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Cache key the image was loaded under, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Packed pixel buffer; empty for a null image.
    pub fn pixels(&self) -> &[u32] {
        match &self.pixels {
            Some(p) => p.as_slice(),
            None => &[],
        }
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u32] {
        match &mut self.pixels {
            Some(p) => p.as_mut_slice(),
            None => &mut [],
        }
    }

    /// Pixel at `(x, y)`, `None` outside the grid or for a null image.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let idx = self.size.index_of(i64::from(x), i64::from(y))?;
        self.pixels().get(idx).copied().map(Color::from_value)
    }

    /// Pixel at `(x, y)`; reads [`Color::TRANSPARENT`] where [`Image::pixel`] would be `None`.
    pub fn get_pixel(&self, x: i32, y: i32) -> Color {
        self.pixel(x, y).unwrap_or(Color::TRANSPARENT)
    }

    /// Raw write that leaves the mutation counter alone.
    ///
    /// Coordinates outside the grid are ignored. Prefer [`Painter::set_pixel`](crate::Painter::set_pixel),
    /// which also records the change.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.size.index_of(i64::from(x), i64::from(y))
            && let Some(px) = self.pixels_mut().get_mut(idx)
        {
            *px = color.value();
        }
    }

    /// Overwrite every pixel with `color`. Does not touch the mutation counter.
    pub fn clear(&mut self, color: Color) {
        self.pixels_mut().fill(color.value());
    }

    /// Number of recorded mutations since the last reset.
    pub fn changes(&self) -> u64 {
        self.changes.get()
    }

    /// `true` when at least one mutation was recorded since the last reset.
    pub fn is_changed(&self) -> bool {
        self.changes.get() > 0
    }

    /// Forget recorded mutations. Called by a consumer once it has synchronized.
    pub fn reset_changes(&mut self) {
        self.changes.set(0);
    }

    /// Recording needs only a shared borrow, so a painter whose target is also a blit source
    /// still counts the call.
    pub(crate) fn mark_changed(&self) {
        self.changes.set(self.changes.get().saturating_add(1));
    }
}

impl std::fmt::Display for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Image ({}; {})", self.size.width, self.size.height)?;
        writeln!(f, "{{")?;
        if self.size.width > 0 {
            for row in self.pixels().chunks(self.size.width as usize) {
                write!(f, " ")?;
                for px in row {
                    write!(f, "{px:x} ")?;
                }
                writeln!(f)?;
            }
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/image.rs"]
mod tests;
