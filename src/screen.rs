use crate::{
    foundation::core::Size,
    foundation::error::PaintResult,
    paint::color::PixelFormat,
    paint::image::{Image, SharedImage},
    paint::painter::{Painter, PainterThreading},
    upload::sink::{PixelConsumer, sync_if_changed},
};

/// Positioned RGBA canvas with a painter bound to it.
///
/// Draw through [`Screen::painter`], then call [`Screen::present`] once per frame; pixels only
/// travel to the consumer when something was drawn since the previous present.
#[derive(Debug)]
pub struct Screen {
    x: i32,
    y: i32,
    canvas: SharedImage,
    created_size: Size,
    painter: Painter,
    rendered: bool,
}

impl Screen {
    /// Screen at `(x, y)` with a zeroed `width` x `height` canvas.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self::with_threading(x, y, width, height, PainterThreading::default())
    }

    /// As [`Screen::new`], with explicit painter threading.
    pub fn with_threading(
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        threading: PainterThreading,
    ) -> Self {
        let created_size = Size::new(width, height);
        let canvas = Image::create(created_size, PixelFormat::Rgba).into_shared();
        let painter = Painter::with_threading(canvas.clone(), threading);
        Self {
            x,
            y,
            canvas,
            created_size,
            painter,
            rendered: false,
        }
    }

    /// Painter drawing into the canvas.
    pub fn painter(&self) -> &Painter {
        &self.painter
    }

    /// Canvas handle.
    pub fn canvas(&self) -> &SharedImage {
        &self.canvas
    }

    /// Top-left placement.
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Move the screen.
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Canvas dimensions. While the canvas is mutably borrowed elsewhere this is the size it was
    /// created with.
    pub fn size(&self) -> Size {
        self.canvas
            .try_borrow()
            .map(|img| img.size())
            .unwrap_or(self.created_size)
    }

    /// Push the canvas to `consumer` if it changed; returns whether pixels were sent.
    ///
    /// If a canvas handle is borrowed elsewhere nothing is sent, the pending changes are kept for
    /// the next present, and the screen is not marked rendered.
    pub fn present(&mut self, consumer: &mut dyn PixelConsumer) -> PaintResult<bool> {
        let Ok(mut canvas) = self.canvas.try_borrow_mut() else {
            tracing::warn!(
                x = self.x,
                y = self.y,
                "screen canvas is borrowed elsewhere, skipping present"
            );
            return Ok(false);
        };
        let uploaded = sync_if_changed(&mut canvas, consumer)?;
        self.rendered = true;
        Ok(uploaded)
    }

    /// `true` once [`Screen::present`] has succeeded at least once.
    pub fn was_rendered(&self) -> bool {
        self.rendered
    }
}

#[cfg(test)]
#[path = "../tests/unit/screen.rs"]
mod tests;
