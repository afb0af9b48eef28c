use std::{ops::Range, rc::Rc};

use rayon::prelude::*;

use crate::{
    paint::color::{Color, is_keyed_out},
    paint::image::{Image, SharedImage},
};

/// How [`Painter::draw_image_sized`] maps the requested box onto the source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AspectRatio {
    /// Use the smaller of the two axis scales on both axes.
    Preserve,
    /// Scale each axis independently to fill the box.
    #[default]
    Stretch,
}

/// Row-level parallelism for fills, clears and blits.
///
/// Parallel rows never overlap, so output is identical to the sequential path.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PainterThreading {
    /// Run per-row work on the rayon pool when `true`.
    pub parallel: bool,
    /// Smallest touched pixel count worth splitting across threads.
    pub min_parallel_pixels: usize,
}

impl Default for PainterThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            min_parallel_pixels: 64 * 1024,
        }
    }
}

impl PainterThreading {
    /// Parallel rows for any workload of at least `min_parallel_pixels` pixels.
    pub fn parallel(min_parallel_pixels: usize) -> Self {
        Self {
            parallel: true,
            min_parallel_pixels,
        }
    }

    fn split(&self, touched_pixels: usize) -> bool {
        self.parallel && touched_pixels >= self.min_parallel_pixels
    }
}

/// Drawing surface bound to one shared [`Image`].
///
/// Every drawing call records exactly one mutation on the target, whether or not a pixel ended up
/// inside it. Geometry is never an error: anything outside the target is clipped away.
#[derive(Clone, Debug)]
pub struct Painter {
    target: SharedImage,
    threading: PainterThreading,
}

impl Painter {
    /// Painter drawing into `target`, sequential.
    pub fn new(target: SharedImage) -> Self {
        Self::with_threading(target, PainterThreading::default())
    }

    /// Painter drawing into `target` with explicit threading options.
    pub fn with_threading(target: SharedImage, threading: PainterThreading) -> Self {
        Self { target, threading }
    }

    /// Current target handle.
    pub fn target(&self) -> &SharedImage {
        &self.target
    }

    /// Rebind to another image.
    pub fn set_target(&mut self, target: SharedImage) {
        self.target = target;
    }

    /// Threading options in effect.
    pub fn threading(&self) -> &PainterThreading {
        &self.threading
    }

    /// Read a target pixel. Outside the target, or while the target is mutably borrowed
    /// elsewhere, reads [`Color::TRANSPARENT`].
    pub fn get_pixel(&self, x: i32, y: i32) -> Color {
        self.target
            .try_borrow()
            .map(|img| img.get_pixel(x, y))
            .unwrap_or(Color::TRANSPARENT)
    }

    /// Write one pixel if `(x, y)` lies inside the target.
    pub fn set_pixel(&self, x: i32, y: i32, color: Color) {
        self.mutate("set_pixel", |img, _| img.set_pixel(x, y, color));
    }

    /// Overwrite the whole target with `color`.
    pub fn clear(&self, color: Color) {
        self.mutate("clear", |img, threading| fill_all(img, color, threading));
    }

    /// Same as [`Painter::clear`].
    pub fn fill(&self, color: Color) {
        self.mutate("fill", |img, threading| fill_all(img, color, threading));
    }

    /// Copy `src` with its top-left corner at `(x, y)`.
    ///
    /// Source pixels whose low byte is zero are skipped, as is anything landing outside the target.
    /// A borrow of the painter's own target cannot be written through and only counts the call;
    /// use [`Painter::draw_shared_image`] to draw an image onto itself.
    pub fn draw_image(&self, x: i32, y: i32, src: &Image) {
        self.mutate("draw_image", |img, threading| {
            blit(img, i64::from(x), i64::from(y), src, threading)
        });
    }

    /// Nearest-neighbour scaled copy of `src` at `(x, y)`.
    ///
    /// The destination box is `floor(width * |scale_x|)` by `floor(height * |scale_y|)`. A negative
    /// scale mirrors that axis. Both scales equal to exactly `1.0` is the plain
    /// [`Painter::draw_image`]. Non-finite scales draw nothing.
    pub fn draw_image_scaled(&self, x: i32, y: i32, src: &Image, scale_x: f64, scale_y: f64) {
        self.mutate("draw_image_scaled", |img, threading| {
            blit_scaled(
                img,
                i64::from(x),
                i64::from(y),
                src,
                scale_x,
                scale_y,
                threading,
            )
        });
    }

    /// Scaled copy of `src` fitted into a `width` x `height` box at `(x, y)`.
    pub fn draw_image_sized(
        &self,
        x: i32,
        y: i32,
        src: &Image,
        width: i32,
        height: i32,
        aspect: AspectRatio,
    ) {
        let (scale_x, scale_y) = fit_scale(src, width, height, aspect);
        self.draw_image_scaled(x, y, src, scale_x, scale_y);
    }

    /// Line from `(x1, y1)` towards `(x2, y2)`.
    ///
    /// The end point itself is not drawn: the longer axis is stepped `|delta|` times starting at
    /// the first point.
    pub fn draw_line(&self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
        self.mutate("draw_line", |img, _| {
            line(
                img,
                i64::from(x1),
                i64::from(y1),
                i64::from(x2),
                i64::from(y2),
                color,
            )
        });
    }

    /// Outline of the rectangle spanned by two corners, both corners included.
    ///
    /// A rectangle with zero width or height is drawn as a line.
    pub fn draw_rectangle(&self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
        self.mutate("draw_rectangle", |img, _| {
            rectangle(
                img,
                i64::from(x1),
                i64::from(y1),
                i64::from(x2),
                i64::from(y2),
                color,
            )
        });
    }

    /// Zero the half-open region `[x1, x2) x [y1, y2)`; corners may come in any order.
    pub fn clear_rectangle(&self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.mutate("clear_rectangle", |img, threading| {
            clear_region(
                img,
                i64::from(x1),
                i64::from(y1),
                i64::from(x2),
                i64::from(y2),
                threading,
            )
        });
    }

    /// Midpoint circle outline centred on `(x, y)`.
    pub fn draw_circle(&self, x: i32, y: i32, radius: i32, color: Color) {
        self.mutate("draw_circle", |img, _| {
            circle(img, i64::from(x), i64::from(y), i64::from(radius), color)
        });
    }

    /// Blit from a shared handle. When `src` is this painter's own target the source pixels are
    /// copied first, so an image can be drawn onto itself.
    pub fn draw_shared_image(&self, x: i32, y: i32, src: &SharedImage) {
        if Rc::ptr_eq(src, &self.target) {
            let copy = match src.try_borrow() {
                Ok(img) => img.clone(),
                Err(_) => Image::null(),
            };
            self.draw_image(x, y, &copy);
            return;
        }
        match src.try_borrow() {
            Ok(img) => self.draw_image(x, y, &img),
            Err(_) => self.draw_image(x, y, &Image::null()),
        }
    }

    fn mutate(&self, op: &'static str, f: impl FnOnce(&mut Image, &PainterThreading)) {
        if let Ok(mut img) = self.target.try_borrow_mut() {
            if img.is_valid() {
                f(&mut *img, &self.threading);
            }
            img.mark_changed();
            return;
        }

        // Held elsewhere: pixels stay untouched but the call is still counted.
        match self.target.try_borrow() {
            Ok(img) => {
                tracing::warn!(op, "painter target is borrowed elsewhere, draw call not applied");
                img.mark_changed();
            }
            Err(_) => {
                tracing::warn!(op, "painter target is mutably borrowed elsewhere, draw call dropped");
            }
        }
    }
}

fn fit_scale(src: &Image, width: i32, height: i32, aspect: AspectRatio) -> (f64, f64) {
    let scale_x = f64::from(width) / f64::from(src.width());
    let scale_y = f64::from(height) / f64::from(src.height());
    match aspect {
        AspectRatio::Preserve => {
            let scale = if scale_y < scale_x { scale_y } else { scale_x };
            (scale, scale)
        }
        AspectRatio::Stretch => (scale_x, scale_y),
    }
}

/// Run `f(y, row)` over target rows `rows`. Rows are disjoint, so the parallel path writes the
/// same pixels as the sequential one.
fn for_each_row<F>(
    pixels: &mut [u32],
    width: usize,
    rows: Range<usize>,
    parallel: bool,
    f: F,
) where
    F: Fn(usize, &mut [u32]) + Send + Sync,
{
    if rows.is_empty() || width == 0 {
        return;
    }
    let first = rows.start;
    let band = &mut pixels[rows.start * width..rows.end * width];
    if parallel {
        band.par_chunks_mut(width)
            .enumerate()
            .for_each(|(i, row)| f(first + i, row));
    } else {
        band.chunks_mut(width)
            .enumerate()
            .for_each(|(i, row)| f(first + i, row));
    }
}

fn fill_all(img: &mut Image, color: Color, threading: &PainterThreading) {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let value = color.value();
    let parallel = threading.split(width * height);
    for_each_row(img.pixels_mut(), width, 0..height, parallel, |_, row| {
        row.fill(value)
    });
}

fn plot(img: &mut Image, x: i64, y: i64, value: u32) {
    if let Some(idx) = img.size().index_of(x, y) {
        img.pixels_mut()[idx] = value;
    }
}

fn blit(dst: &mut Image, x: i64, y: i64, src: &Image, threading: &PainterThreading) {
    if !src.is_valid() {
        return;
    }
    let tw = i64::from(dst.width());
    let th = i64::from(dst.height());
    let sw = i64::from(src.width());
    let sh = i64::from(src.height());

    let iy_start = (-y).max(0);
    let iy_end = sh.min(th - y);
    let ix_start = (-x).max(0);
    let ix_end = sw.min(tw - x);
    if iy_start >= iy_end || ix_start >= ix_end {
        return;
    }

    let src_px = src.pixels();
    let rows = (y + iy_start) as usize..(y + iy_end) as usize;
    let parallel = threading.split(rows.len() * (ix_end - ix_start) as usize);
    for_each_row(dst.pixels_mut(), tw as usize, rows, parallel, |ty, row| {
        let iy = ty as i64 - y;
        let src_row = &src_px[(iy * sw) as usize..((iy + 1) * sw) as usize];
        for ix in ix_start..ix_end {
            let v = src_row[ix as usize];
            if is_keyed_out(v) {
                continue;
            }
            row[(x + ix) as usize] = v;
        }
    });
}

fn blit_scaled(
    dst: &mut Image,
    x: i64,
    y: i64,
    src: &Image,
    scale_x: f64,
    scale_y: f64,
    threading: &PainterThreading,
) {
    if scale_x == 1.0 && scale_y == 1.0 {
        return blit(dst, x, y, src, threading);
    }
    if !src.is_valid() || !scale_x.is_finite() || !scale_y.is_finite() {
        return;
    }

    let tw = i64::from(dst.width());
    let th = i64::from(dst.height());
    let sw = i64::from(src.width());
    let sh = i64::from(src.height());

    let abs_x = scale_x.abs();
    let abs_y = scale_y.abs();
    // `as` truncates toward zero (and saturates), i.e. floor for these non-negative products.
    let new_w = (sw as f64 * abs_x) as i64;
    let new_h = (sh as f64 * abs_y) as i64;

    let ix_start = (-x).max(0);
    let ix_end = new_w.min(tw - x);
    let iy_start = (-y).max(0);
    let iy_end = new_h.min(th - y);
    if ix_start >= ix_end || iy_start >= iy_end {
        return;
    }

    let src_px = src.pixels();
    let area = src_px.len();
    let mirror_x = scale_x < 0.0;
    let mirror_y = scale_y < 0.0;

    let rows = (y + iy_start) as usize..(y + iy_end) as usize;
    let parallel = threading.split(rows.len() * (ix_end - ix_start) as usize);
    for_each_row(dst.pixels_mut(), tw as usize, rows, parallel, |ty, row| {
        let iy = ty as i64 - y;
        let mut sy = (iy as f64 / abs_y) as i64;
        if mirror_y {
            sy = sh - sy;
        }
        for ix in ix_start..ix_end {
            let mut sx = (ix as f64 / abs_x) as i64;
            if mirror_x {
                sx = sw - sx;
            }
            // Mirrored or rounded samples can run one past the source; such indices are dropped.
            let Ok(idx) = usize::try_from(sx + sy * sw) else {
                continue;
            };
            if idx >= area {
                continue;
            }
            let v = src_px[idx];
            if is_keyed_out(v) {
                continue;
            }
            row[(x + ix) as usize] = v;
        }
    });
}

fn line(img: &mut Image, x1: i64, y1: i64, x2: i64, y2: i64, color: Color) {
    let tw = i64::from(img.width());
    let th = i64::from(img.height());
    let value = color.value();

    let dx = x2 - x1;
    let dy = y2 - y1;
    let y_major = dy.abs() > dx.abs();
    let (major, minor, major_start, minor_start, major_dim) = if y_major {
        (dy, dx, y1, x1, th)
    } else {
        (dx, dy, x1, y1, tw)
    };

    let step = if major < 0 { -1 } else { 1 };
    let steps = major.abs();

    // Steps whose major coordinate falls outside the target can never plot anything.
    let (t_lo, t_hi) = if step > 0 {
        (-major_start, major_dim - major_start)
    } else {
        (major_start - major_dim + 1, major_start + 1)
    };

    for t in t_lo.max(0)..t_hi.min(steps) {
        let i = t * step;
        // trunc(i / (major / minor)), evaluated exactly.
        let off = if minor == 0 {
            0
        } else {
            (i128::from(i) * i128::from(minor) / i128::from(major)) as i64
        };
        let major_pos = major_start + i;
        let minor_pos = minor_start + off;
        let (px, py) = if y_major {
            (minor_pos, major_pos)
        } else {
            (major_pos, minor_pos)
        };
        plot(img, px, py, value);
    }
}

fn rectangle(img: &mut Image, x1: i64, y1: i64, x2: i64, y2: i64, color: Color) {
    let tw = i64::from(img.width());
    let th = i64::from(img.height());

    let (left, right) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
    let (top, bottom) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
    if right < 0 || bottom < 0 || left >= tw || top >= th {
        return;
    }

    if x1 == x2 || y1 == y2 {
        return line(img, x1, y1, x2, y2, color);
    }

    let value = color.value();
    for x in left.max(0)..=right.min(tw - 1) {
        plot(img, x, y1, value);
        plot(img, x, y2, value);
    }
    for y in top.max(0)..=bottom.min(th - 1) {
        plot(img, x1, y, value);
        plot(img, x2, y, value);
    }
}

fn clear_region(
    img: &mut Image,
    x1: i64,
    y1: i64,
    x2: i64,
    y2: i64,
    threading: &PainterThreading,
) {
    let tw = i64::from(img.width());
    let th = i64::from(img.height());

    let (x1, x2) = if x2 < x1 { (x2, x1) } else { (x1, x2) };
    let (y1, y2) = if y2 < y1 { (y2, y1) } else { (y1, y2) };
    if x2 < 0 || y2 < 0 {
        return;
    }
    let (x1, y1) = (x1.max(0), y1.max(0));
    let (x2, y2) = (x2.min(tw), y2.min(th));
    if x1 >= x2 || y1 >= y2 {
        return;
    }

    let cols = x1 as usize..x2 as usize;
    let rows = y1 as usize..y2 as usize;
    let parallel = threading.split(rows.len() * cols.len());
    for_each_row(img.pixels_mut(), tw as usize, rows, parallel, |_, row| {
        row[cols.clone()].fill(0)
    });
}

fn circle(img: &mut Image, x: i64, y: i64, radius: i64, color: Color) {
    let tw = i64::from(img.width());
    let th = i64::from(img.height());
    if x + radius < 0 || y + radius < 0 || x - radius >= tw || y - radius >= th {
        return;
    }

    let value = color.value();
    let mut xx = radius;
    let mut yy = 0i64;
    let mut err = 0i64;

    while xx >= yy {
        for (px, py) in [
            (x + xx, y + yy),
            (x + yy, y + xx),
            (x - yy, y + xx),
            (x - xx, y + yy),
            (x - xx, y - yy),
            (x - yy, y - xx),
            (x + yy, y - xx),
            (x + xx, y - yy),
        ] {
            plot(img, px, py, value);
        }

        if err <= 0 {
            yy += 1;
            err += 2 * yy + 1;
        }
        if err > 0 {
            xx -= 1;
            err -= 2 * xx + 1;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/painter.rs"]
mod tests;
