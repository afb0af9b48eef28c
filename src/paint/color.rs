use crate::foundation::math::Rng64;

/// Declared pixel-format tag.
///
/// Metadata only: storage is always one packed [`Color`] per pixel regardless of the tag.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum PixelFormat {
    /// Palette index.
    Indexed,
    /// Single luminance channel.
    Gray,
    /// Luminance plus alpha.
    GrayAlpha,
    /// Red, green, blue.
    #[default]
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
    /// Blue, green, red.
    Bgr,
    /// Blue, green, red, alpha.
    Bgra,
    /// "No format" sentinel. Never valid where a concrete format is required.
    Invalid,
}

impl PixelFormat {
    /// Number of channels the format declares.
    ///
    /// Asking the [`PixelFormat::Invalid`] sentinel is a programming error; debug builds assert,
    /// release builds answer 3.
    pub fn components(self) -> usize {
        match self {
            Self::Indexed | Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Rgb | Self::Bgr => 3,
            Self::Rgba | Self::Bgra => 4,
            Self::Invalid => {
                debug_assert!(false, "PixelFormat::Invalid has no component count");
                3
            }
        }
    }

    /// `false` only for the sentinel.
    pub fn is_concrete(self) -> bool {
        self != Self::Invalid
    }
}

/// Packed 32-bit color.
///
/// Bit layout: alpha 0-7, red 8-15, green 16-23, blue 24-31. The low byte doubles as the
/// blit transparency key: a packed value whose low byte is zero is never copied by
/// [`Painter::draw_image`](crate::Painter::draw_image).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Color(u32);

impl Color {
    /// Bit offset of the alpha channel.
    pub const ALPHA_SHIFT: u32 = 0;
    /// Bit offset of the red channel.
    pub const RED_SHIFT: u32 = 8;
    /// Bit offset of the green channel.
    pub const GREEN_SHIFT: u32 = 16;
    /// Bit offset of the blue channel.
    pub const BLUE_SHIFT: u32 = 24;

    /// Packed zero: the cleared pixel value and a keyed-out blit source.
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque color from byte components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Color from byte components.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(
            ((b as u32) << Self::BLUE_SHIFT)
                | ((g as u32) << Self::GREEN_SHIFT)
                | ((r as u32) << Self::RED_SHIFT)
                | ((a as u32) << Self::ALPHA_SHIFT),
        )
    }

    /// Color from normalized components.
    ///
    /// Each value is multiplied by 255 and truncated. Inputs are expected in `[0, 1]`; clamping is
    /// the caller's business.
    pub fn from_floats(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::rgba(
            (r * 255.0) as u8,
            (g * 255.0) as u8,
            (b * 255.0) as u8,
            (a * 255.0) as u8,
        )
    }

    /// Color from a raw packed value.
    pub const fn from_value(v: u32) -> Self {
        Self(v)
    }

    /// Opaque color with independent uniform r/g/b drawn from the inclusive range
    /// `[minimum, maximum]`.
    ///
    /// Values outside `0..=255` wrap to 8 bits.
    pub fn from_random(rng: &mut Rng64, minimum: i32, maximum: i32) -> Self {
        let mut channel = || rng.next_in_range(i64::from(minimum), i64::from(maximum)) as u8;
        let r = channel();
        let g = channel();
        let b = channel();
        Self::rgb(r, g, b)
    }

    /// Raw packed value.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Red byte.
    pub const fn red(self) -> u8 {
        (self.0 >> Self::RED_SHIFT) as u8
    }

    /// Green byte.
    pub const fn green(self) -> u8 {
        (self.0 >> Self::GREEN_SHIFT) as u8
    }

    /// Blue byte.
    pub const fn blue(self) -> u8 {
        (self.0 >> Self::BLUE_SHIFT) as u8
    }

    /// Alpha byte.
    pub const fn alpha(self) -> u8 {
        (self.0 >> Self::ALPHA_SHIFT) as u8
    }

    /// Red as `byte / 255`.
    pub fn red_f32(self) -> f32 {
        f32::from(self.red()) / 255.0
    }

    /// Green as `byte / 255`.
    pub fn green_f32(self) -> f32 {
        f32::from(self.green()) / 255.0
    }

    /// Blue as `byte / 255`.
    pub fn blue_f32(self) -> f32 {
        f32::from(self.blue()) / 255.0
    }

    /// Alpha as `byte / 255`.
    pub fn alpha_f32(self) -> f32 {
        f32::from(self.alpha()) / 255.0
    }

    /// `[r, g, b, a]` bytes, the order image codecs expect.
    pub const fn to_rgba8(self) -> [u8; 4] {
        [self.red(), self.green(), self.blue(), self.alpha()]
    }

    /// `true` when blits skip this value.
    pub const fn is_keyed_out(self) -> bool {
        is_keyed_out(self.0)
    }
}

impl From<u32> for Color {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<Color> for u32 {
    fn from(c: Color) -> Self {
        c.0
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Color ({:08x}): {:3},{:3},{:3},{:3}",
            self.0,
            self.red(),
            self.green(),
            self.blue(),
            self.alpha()
        )
    }
}

#[inline]
pub(crate) const fn is_keyed_out(packed: u32) -> bool {
    packed & 0xff == 0
}

#[cfg(test)]
#[path = "../../tests/unit/paint/color.rs"]
mod tests;
