use crate::foundation::error::{PaintError, PaintResult};

/// Pixel dimensions of an image.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Build a size from width and height.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` when both dimensions are non-zero.
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Pixel count, `None` if it does not fit `usize`.
    pub fn checked_area(self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }

    /// Pixel count. Saturates on overflow.
    pub fn area(self) -> usize {
        self.checked_area().unwrap_or(usize::MAX)
    }

    /// `true` when `(x, y)` addresses a pixel of a grid of this size.
    pub fn contains(self, x: i64, y: i64) -> bool {
        in_bounds(x, y, i64::from(self.width), i64::from(self.height))
    }

    /// Row-major buffer index of an addressable `(x, y)`.
    pub fn index_of(self, x: i64, y: i64) -> Option<usize> {
        if !self.contains(x, y) {
            return None;
        }
        Some(x as usize + y as usize * self.width as usize)
    }

    pub(crate) fn from_len_checked(width: u32, height: u32, len: usize) -> PaintResult<Self> {
        let size = Self::new(width, height);
        match size.checked_area() {
            Some(area) if area == len => Ok(size),
            Some(area) => Err(PaintError::validation(format!(
                "pixel buffer length {len} does not match {width}x{height} ({area})"
            ))),
            None => Err(PaintError::validation(format!(
                "image area {width}x{height} overflows usize"
            ))),
        }
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// `0 <= x < w && 0 <= y < h`.
pub(crate) fn in_bounds(x: i64, y: i64, w: i64, h: i64) -> bool {
    x >= 0 && y >= 0 && x < w && y < h
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
