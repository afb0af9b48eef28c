use std::collections::BTreeSet;

use super::*;
use crate::{foundation::core::Size, foundation::math::Rng64, paint::color::PixelFormat};

const RED: Color = Color::rgb(255, 0, 0);
const GREEN: Color = Color::rgb(0, 255, 0);
const BLUE: Color = Color::rgb(0, 0, 255);

fn canvas(w: u32, h: u32) -> Painter {
    Painter::new(Image::create(Size::new(w, h), PixelFormat::Rgba).into_shared())
}

fn solid(w: u32, h: u32, c: Color) -> Image {
    Image::create_filled(Size::new(w, h), c, PixelFormat::Rgba)
}

fn lit(p: &Painter) -> BTreeSet<(i32, i32)> {
    let img = p.target().borrow();
    let mut out = BTreeSet::new();
    for y in 0..img.height() as i32 {
        for x in 0..img.width() as i32 {
            if img.get_pixel(x, y) != Color::TRANSPARENT {
                out.insert((x, y));
            }
        }
    }
    out
}

fn changes(p: &Painter) -> u64 {
    p.target().borrow().changes()
}

#[test]
fn set_pixel_round_trips_every_addressable_pixel() {
    let p = canvas(4, 3);
    let mut rng = Rng64::new(3);
    for y in 0..3 {
        for x in 0..4 {
            let c = Color::from_value(rng.next_u64() as u32);
            p.set_pixel(x, y, c);
            assert_eq!(p.get_pixel(x, y), c);
        }
    }
    assert_eq!(changes(&p), 12);
}

#[test]
fn set_pixel_outside_is_ignored_but_counted() {
    let p = canvas(2, 2);
    for (x, y) in [(-1, 0), (0, -1), (2, 0), (0, 2), (i32::MAX, i32::MIN)] {
        p.set_pixel(x, y, RED);
    }
    assert!(lit(&p).is_empty());
    assert_eq!(changes(&p), 5);
}

#[test]
fn draw_image_copies_at_offset() {
    let p = canvas(5, 5);
    p.draw_image(1, 2, &solid(2, 2, RED));
    let expected: BTreeSet<_> = [(1, 2), (2, 2), (1, 3), (2, 3)].into();
    assert_eq!(lit(&p), expected);
    assert_eq!(p.get_pixel(2, 3), RED);
    assert_eq!(changes(&p), 1);
}

#[test]
fn draw_image_entirely_outside_changes_nothing_but_counts() {
    let p = canvas(10, 10);
    p.fill(BLUE);
    let before = p.target().borrow().pixels().to_vec();

    let src = solid(3, 3, RED);
    p.draw_image(10, 0, &src);
    p.draw_image(0, 10, &src);
    p.draw_image(-3, 0, &src);
    p.draw_image(0, -3, &src);

    assert_eq!(p.target().borrow().pixels(), before.as_slice());
    assert_eq!(changes(&p), 5);
}

#[test]
fn draw_image_clips_negative_offsets() {
    let p = canvas(4, 4);
    let src = Image::from_pixels(
        Size::new(3, 3),
        PixelFormat::Rgba,
        (1..=9).map(|v| (v << 8) | 0xff).collect(),
    )
    .unwrap();
    p.draw_image(-1, -1, &src);

    // Destination (0,0) receives source (1,1).
    assert_eq!(p.get_pixel(0, 0), src.get_pixel(1, 1));
    assert_eq!(p.get_pixel(1, 0), src.get_pixel(2, 1));
    assert_eq!(p.get_pixel(0, 1), src.get_pixel(1, 2));
    assert_eq!(p.get_pixel(1, 1), src.get_pixel(2, 2));
    assert_eq!(lit(&p).len(), 4);
}

#[test]
fn draw_image_skips_keyed_out_pixels() {
    let p = canvas(3, 1);
    p.fill(BLUE);
    let src = Image::from_pixels(
        Size::new(3, 1),
        PixelFormat::Rgba,
        vec![RED.value(), Color::rgba(255, 255, 255, 0).value(), GREEN.value()],
    )
    .unwrap();
    p.draw_image(0, 0, &src);
    assert_eq!(p.get_pixel(0, 0), RED);
    assert_eq!(p.get_pixel(1, 0), BLUE);
    assert_eq!(p.get_pixel(2, 0), GREEN);
}

#[test]
fn scaled_blit_doubles_each_source_pixel() {
    let p = canvas(6, 6);
    p.draw_image_scaled(0, 0, &solid(2, 2, RED), 2.0, 2.0);
    let expected: BTreeSet<_> = (0..4).flat_map(|y| (0..4).map(move |x| (x, y))).collect();
    assert_eq!(lit(&p), expected);
    assert_eq!(changes(&p), 1);
}

#[test]
fn scaled_blit_maps_cells_to_source_pixels() {
    let p = canvas(4, 4);
    let src = Image::from_pixels(
        Size::new(2, 2),
        PixelFormat::Rgba,
        vec![RED.value(), GREEN.value(), BLUE.value(), Color::WHITE.value()],
    )
    .unwrap();
    p.draw_image_scaled(0, 0, &src, 2.0, 2.0);
    for (x, y, c) in [
        (0, 0, RED),
        (1, 1, RED),
        (2, 0, GREEN),
        (3, 1, GREEN),
        (0, 2, BLUE),
        (1, 3, BLUE),
        (3, 3, Color::WHITE),
    ] {
        assert_eq!(p.get_pixel(x, y), c, "at ({x},{y})");
    }
}

#[test]
fn downscale_samples_nearest() {
    let p = canvas(4, 4);
    let src = Image::from_pixels(
        Size::new(4, 4),
        PixelFormat::Rgba,
        (0..16).map(|v| (v << 8) | 0xff).collect(),
    )
    .unwrap();
    p.draw_image_scaled(0, 0, &src, 0.5, 0.5);
    assert_eq!(p.get_pixel(0, 0), src.get_pixel(0, 0));
    assert_eq!(p.get_pixel(1, 0), src.get_pixel(2, 0));
    assert_eq!(p.get_pixel(0, 1), src.get_pixel(0, 2));
    assert_eq!(p.get_pixel(1, 1), src.get_pixel(2, 2));
    assert_eq!(lit(&p).len(), 4);
}

#[test]
fn unit_scale_matches_plain_blit() {
    let src = Image::from_pixels(
        Size::new(3, 2),
        PixelFormat::Rgba,
        vec![1, 0x1ff, 0x2ff, 0x300, 0x4ff, 0x5ff],
    )
    .unwrap();
    let a = canvas(5, 5);
    let b = canvas(5, 5);
    a.draw_image(1, -1, &src);
    b.draw_image_scaled(1, -1, &src, 1.0, 1.0);
    assert_eq!(
        a.target().borrow().pixels(),
        b.target().borrow().pixels()
    );
}

#[test]
fn negative_scale_mirrors_and_drops_overflowing_samples() {
    let p = canvas(2, 1);
    let src = Image::from_pixels(
        Size::new(2, 1),
        PixelFormat::Rgba,
        vec![RED.value(), GREEN.value()],
    )
    .unwrap();
    p.draw_image_scaled(0, 0, &src, -1.0, 1.0);
    // Column 0 samples index 2, one past the source, and is dropped.
    assert_eq!(p.get_pixel(0, 0), Color::TRANSPARENT);
    assert_eq!(p.get_pixel(1, 0), GREEN);
}

#[test]
fn non_finite_or_zero_scale_draws_nothing() {
    let p = canvas(4, 4);
    let src = solid(2, 2, RED);
    p.draw_image_scaled(0, 0, &src, f64::INFINITY, 1.0);
    p.draw_image_scaled(0, 0, &src, 2.0, f64::NAN);
    p.draw_image_scaled(0, 0, &src, 0.0, 2.0);
    assert!(lit(&p).is_empty());
    assert_eq!(changes(&p), 3);
}

#[test]
fn sized_blit_stretches_or_preserves_aspect() {
    let src = solid(2, 4, RED);

    let stretch = canvas(10, 10);
    stretch.draw_image_sized(0, 0, &src, 8, 8, AspectRatio::Stretch);
    assert_eq!(lit(&stretch).len(), 64);

    let keep = canvas(10, 10);
    keep.draw_image_sized(0, 0, &src, 8, 8, AspectRatio::Preserve);
    let expected: BTreeSet<_> = (0..8).flat_map(|y| (0..4).map(move |x| (x, y))).collect();
    assert_eq!(lit(&keep), expected);
    assert_eq!(changes(&keep), 1);
}

#[test]
fn horizontal_line_excludes_end_point() {
    let p = canvas(10, 10);
    p.draw_line(0, 0, 4, 0, RED);
    let expected: BTreeSet<_> = [(0, 0), (1, 0), (2, 0), (3, 0)].into();
    assert_eq!(lit(&p), expected);
}

#[test]
fn reversed_vertical_line_steps_backwards() {
    let p = canvas(10, 10);
    p.draw_line(2, 5, 2, 1, RED);
    let expected: BTreeSet<_> = [(2, 5), (2, 4), (2, 3), (2, 2)].into();
    assert_eq!(lit(&p), expected);
}

#[test]
fn sloped_lines_truncate_minor_offset() {
    let p = canvas(10, 10);
    p.draw_line(0, 0, 3, 3, RED);
    let expected: BTreeSet<_> = [(0, 0), (1, 1), (2, 2)].into();
    assert_eq!(lit(&p), expected);

    let p = canvas(10, 10);
    p.draw_line(0, 0, 4, 2, RED);
    let expected: BTreeSet<_> = [(0, 0), (1, 0), (2, 1), (3, 1)].into();
    assert_eq!(lit(&p), expected);

    let p = canvas(10, 10);
    p.draw_line(5, 0, 3, 4, RED);
    // y-major, minor offset trunc(i * -2 / 4): 0, 0, -1, -1.
    let expected: BTreeSet<_> = [(5, 0), (5, 1), (4, 2), (4, 3)].into();
    assert_eq!(lit(&p), expected);
}

#[test]
fn clipped_lines_keep_in_bounds_points() {
    let p = canvas(10, 10);
    p.draw_line(-100, 5, 100, 5, RED);
    let expected: BTreeSet<_> = (0..10).map(|x| (x, 5)).collect();
    assert_eq!(lit(&p), expected);

    let q = canvas(10, 10);
    q.draw_line(100, 5, -100, 5, RED);
    assert_eq!(lit(&q), expected);
}

#[test]
fn zero_length_line_draws_nothing() {
    let p = canvas(4, 4);
    p.draw_line(1, 1, 1, 1, RED);
    assert!(lit(&p).is_empty());
    assert_eq!(changes(&p), 1);
}

#[test]
fn rectangle_outline_includes_both_corners() {
    let p = canvas(6, 6);
    p.draw_rectangle(1, 1, 4, 3, RED);
    let set = lit(&p);
    assert_eq!(set.len(), 10);
    for pt in [(1, 1), (4, 1), (1, 3), (4, 3), (2, 1), (1, 2), (4, 2), (3, 3)] {
        assert!(set.contains(&pt), "missing {pt:?}");
    }
    assert!(!set.contains(&(2, 2)));

    let q = canvas(6, 6);
    q.draw_rectangle(4, 3, 1, 1, RED);
    assert_eq!(lit(&q), set);
}

#[test]
fn degenerate_rectangle_is_a_line() {
    let p = canvas(6, 6);
    p.draw_rectangle(1, 1, 4, 1, RED);
    let expected: BTreeSet<_> = [(1, 1), (2, 1), (3, 1)].into();
    assert_eq!(lit(&p), expected);
    assert_eq!(changes(&p), 1);
}

#[test]
fn partially_outside_rectangle_is_clipped() {
    let p = canvas(10, 10);
    p.draw_rectangle(-2, -2, 3, 3, RED);
    let expected: BTreeSet<_> = [(0, 3), (1, 3), (2, 3), (3, 3), (3, 0), (3, 1), (3, 2)].into();
    assert_eq!(lit(&p), expected);
}

#[test]
fn rectangle_entirely_outside_is_a_counted_no_op() {
    let p = canvas(10, 10);
    p.draw_rectangle(-9, -9, -2, -3, RED);
    p.draw_rectangle(10, 12, 20, 30, RED);
    p.draw_rectangle(2, 12, 5, 30, RED);
    assert!(lit(&p).is_empty());
    assert_eq!(changes(&p), 3);
}

#[test]
fn clear_rectangle_clamps_negative_corners() {
    let p = canvas(10, 10);
    p.fill(RED);
    p.clear_rectangle(-5, -5, 3, 3);
    let img = p.target().borrow();
    for y in 0..10 {
        for x in 0..10 {
            let cleared = x < 3 && y < 3;
            assert_eq!(
                img.get_pixel(x, y) == Color::TRANSPARENT,
                cleared,
                "at ({x},{y})"
            );
        }
    }
}

#[test]
fn clear_rectangle_normalizes_corner_order() {
    let a = canvas(8, 8);
    let b = canvas(8, 8);
    a.fill(RED);
    b.fill(RED);
    a.clear_rectangle(1, 2, 6, 5);
    b.clear_rectangle(6, 5, 1, 2);
    assert_eq!(
        a.target().borrow().pixels(),
        b.target().borrow().pixels()
    );
    assert_eq!(lit(&a).len(), 64 - 15);
}

#[test]
fn clear_rectangle_is_idempotent_but_counted() {
    let p = canvas(10, 10);
    p.fill(RED);
    p.clear_rectangle(2, 2, 7, 9);
    let once = p.target().borrow().pixels().to_vec();
    p.clear_rectangle(2, 2, 7, 9);
    assert_eq!(p.target().borrow().pixels(), once.as_slice());
    assert_eq!(changes(&p), 3);
}

#[test]
fn clear_rectangle_outside_or_beyond_bounds() {
    let p = canvas(4, 4);
    p.fill(RED);
    p.clear_rectangle(-5, -5, -1, -1);
    p.clear_rectangle(4, 0, 9, 9);
    assert_eq!(lit(&p).len(), 16);

    p.clear_rectangle(2, 2, 100, 100);
    assert_eq!(lit(&p).len(), 12);
}

#[test]
fn small_circle_matches_midpoint_recurrence() {
    let p = canvas(12, 12);
    p.draw_circle(5, 5, 3, RED);
    let expected: BTreeSet<_> = [
        (3, 0),
        (0, 3),
        (-3, 0),
        (0, -3),
        (2, 1),
        (1, 2),
        (-1, 2),
        (-2, 1),
        (-2, -1),
        (-1, -2),
        (1, -2),
        (2, -1),
    ]
    .into_iter()
    .map(|(dx, dy)| (5 + dx, 5 + dy))
    .collect();
    assert_eq!(lit(&p), expected);
}

#[test]
fn circle_has_eightfold_symmetry() {
    let p = canvas(40, 40);
    p.draw_circle(20, 20, 13, RED);
    let offsets: BTreeSet<_> = lit(&p).into_iter().map(|(x, y)| (x - 20, y - 20)).collect();
    assert!(!offsets.is_empty());
    for &(dx, dy) in &offsets {
        assert!(offsets.contains(&(-dx, dy)));
        assert!(offsets.contains(&(dx, -dy)));
        assert!(offsets.contains(&(dy, dx)));
    }
}

#[test]
fn circle_clips_and_short_circuits() {
    let p = canvas(10, 10);
    p.draw_circle(0, 0, 3, RED);
    let set = lit(&p);
    assert!(set.contains(&(3, 0)));
    assert!(set.contains(&(0, 3)));
    assert!(set.iter().all(|&(x, y)| x >= 0 && y >= 0));

    let q = canvas(10, 10);
    q.draw_circle(-10, 5, 3, RED);
    q.draw_circle(5, 20, 3, RED);
    assert!(lit(&q).is_empty());
    assert_eq!(changes(&q), 2);
}

#[test]
fn zero_radius_circle_is_a_dot() {
    let p = canvas(3, 3);
    p.draw_circle(1, 1, 0, RED);
    let expected: BTreeSet<_> = [(1, 1)].into();
    assert_eq!(lit(&p), expected);
}

#[test]
fn clear_and_fill_overwrite_everything_once() {
    let p = canvas(3, 3);
    p.fill(GREEN);
    assert!(p.target().borrow().pixels().iter().all(|&v| v == GREEN.value()));
    p.clear(Color::TRANSPARENT);
    assert!(lit(&p).is_empty());
    assert_eq!(changes(&p), 2);
}

#[test]
fn null_target_absorbs_every_call() {
    let p = Painter::new(Image::null().into_shared());
    p.set_pixel(0, 0, RED);
    p.draw_image(0, 0, &solid(2, 2, RED));
    p.draw_image_scaled(0, 0, &solid(2, 2, RED), 2.0, 2.0);
    p.draw_line(0, 0, 5, 5, RED);
    p.draw_rectangle(0, 0, 5, 5, RED);
    p.clear_rectangle(0, 0, 5, 5);
    p.draw_circle(0, 0, 5, RED);
    p.fill(RED);
    assert!(p.target().borrow().pixels().is_empty());
    assert_eq!(changes(&p), 8);
}

#[test]
fn borrowed_target_still_counts_the_call() {
    let p = canvas(4, 4);
    p.fill(RED);
    let src = p.target().clone();
    {
        let guard = src.borrow();
        p.draw_image(1, 1, &guard);
        assert_eq!(guard.changes(), 2);
    }
    assert_eq!(p.get_pixel(0, 0), RED);

    // A live mutable borrow leaves nothing to record through.
    {
        let _guard = src.borrow_mut();
        p.set_pixel(0, 0, GREEN);
    }
    assert_eq!(changes(&p), 2);
    assert_eq!(p.get_pixel(0, 0), RED);
}

#[test]
fn shared_handle_blit_draws_target_onto_itself() {
    let p = canvas(4, 4);
    p.set_pixel(0, 0, RED);
    p.set_pixel(1, 0, GREEN);
    let before = changes(&p);

    p.draw_shared_image(2, 2, &p.target().clone());

    assert_eq!(changes(&p), before + 1);
    assert_eq!(p.get_pixel(0, 0), RED);
    assert_eq!(p.get_pixel(2, 2), RED);
    assert_eq!(p.get_pixel(3, 2), GREEN);
    assert_eq!(p.get_pixel(3, 3), Color::TRANSPARENT);
}

#[test]
fn shared_handle_blit_from_other_image() {
    let p = canvas(4, 4);
    let src = solid(2, 2, BLUE).into_shared();
    p.draw_shared_image(1, 1, &src);
    assert_eq!(p.get_pixel(1, 1), BLUE);
    assert_eq!(p.get_pixel(2, 2), BLUE);
    assert_eq!(changes(&p), 1);
}

#[test]
fn painters_share_one_target() {
    let shared = Image::create(Size::new(4, 4), PixelFormat::Rgba).into_shared();
    let a = Painter::new(shared.clone());
    let b = Painter::new(shared.clone());
    a.set_pixel(0, 0, RED);
    b.set_pixel(1, 0, GREEN);
    assert_eq!(b.get_pixel(0, 0), RED);
    assert_eq!(shared.borrow().changes(), 2);

    let mut c = Painter::new(Image::create(Size::new(1, 1), PixelFormat::Rgb).into_shared());
    c.set_target(shared.clone());
    assert_eq!(c.get_pixel(1, 0), GREEN);
}

#[test]
fn parallel_rows_match_sequential_output() {
    let mut rng = Rng64::new(11);
    let src_px: Vec<u32> = (0..37 * 23).map(|_| rng.next_u64() as u32).collect();
    let src = Image::from_pixels(Size::new(37, 23), PixelFormat::Rgba, src_px).unwrap();

    let seq = canvas(64, 48);
    let par = Painter::with_threading(
        Image::create(Size::new(64, 48), PixelFormat::Rgba).into_shared(),
        PainterThreading::parallel(1),
    );

    for p in [&seq, &par] {
        p.fill(BLUE);
        p.draw_image(-5, -3, &src);
        p.draw_image_scaled(10, 4, &src, 1.7, -1.3);
        p.draw_image_sized(30, 20, &src, 40, 40, AspectRatio::Preserve);
        p.clear_rectangle(3, 40, 50, 60);
        p.draw_image_scaled(-20, 30, &src, -2.5, 0.75);
    }

    assert_eq!(
        seq.target().borrow().pixels(),
        par.target().borrow().pixels()
    );
    assert_eq!(changes(&seq), changes(&par));
    assert!(par.threading().parallel);
}
