//! softpaint is a software pixel-buffer compositing engine.
//!
//! It owns raw pixel memory and draws into it directly:
//!
//! - [`Color`]: one packed 32-bit value per pixel (alpha in the low byte, then red, green, blue)
//! - [`Image`]: a contiguous row-major buffer of packed pixels plus a mutation counter
//! - [`Painter`]: clipped pixel writes, keyed and nearest-neighbour scaled blits, integer line,
//!   rectangle and midpoint-circle rasterization, region clears
//!
//! Around that core sit the narrow collaborator surfaces: an injectable caching loader
//! ([`ImageStore`] over a [`PixelSource`]), snapshot and PNG serialization, and a
//! [`PixelConsumer`] contract driven by [`sync_if_changed`].
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Geometry never fails**: anything outside the target is clipped, never reported.
//! - **Aggregate dirty flag**: every painter call bumps the target's counter exactly once, even
//!   when nothing was written; consumers poll [`Image::is_changed`] and reset after syncing.
//! - **Binary transparency**: blits skip source pixels whose low byte is zero. There is no alpha
//!   blending.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;
mod paint;
mod screen;
mod upload;

pub use assets::decode::{DecodedPixels, decode_image};
pub use assets::encode::{ImageSnapshot, encode_png};
pub use assets::store::{
    ForceReload, FsPixelSource, ImageStore, ImageStoreOpts, PixelSource, normalize_rel_path,
};
pub use foundation::core::Size;
pub use foundation::error::{PaintError, PaintResult};
pub use foundation::math::Rng64;
pub use paint::color::{Color, PixelFormat};
pub use paint::image::{Image, SharedImage};
pub use paint::painter::{AspectRatio, Painter, PainterThreading};
pub use screen::Screen;
pub use upload::sink::{InMemoryUploader, PixelConsumer, PixelFrame, Upload, sync_if_changed};
