//! Diagnostic overlays rendered on the normalized 8-bit map.

use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use nalgebra::Point2;

const MARK: Luma<u8> = Luma([255]);

/// Radius of the filled disks marking measurement points.
pub const MARKER_RADIUS: i32 = 3;

/// Outline stroke width in pixels.
pub const OUTLINE_WIDTH: u32 = 2;

/// Segment stroked `OUTLINE_WIDTH` pixels wide, growing right and down.
fn thick_segment(img: &mut GrayImage, a: &Point2<f64>, b: &Point2<f64>) {
    for oy in 0..OUTLINE_WIDTH {
        for ox in 0..OUTLINE_WIDTH {
            let (ox, oy) = (ox as f32, oy as f32);
            draw_line_segment_mut(
                img,
                (a.x as f32 + ox, a.y as f32 + oy),
                (b.x as f32 + ox, b.y as f32 + oy),
                MARK,
            );
        }
    }
}

/// Draw a closed polyline through `hull` (the last vertex joins the first).
pub fn draw_outline(img: &mut GrayImage, hull: &[Point2<f64>]) {
    match hull {
        [] => {}
        [p] => thick_segment(img, p, p),
        _ => {
            for (i, a) in hull.iter().enumerate() {
                thick_segment(img, a, &hull[(i + 1) % hull.len()]);
            }
        }
    }
}

/// Mark a measurement point with a filled disk.
pub fn mark_point(img: &mut GrayImage, p: Point2<i32>) {
    draw_filled_circle_mut(img, (p.x, p.y), MARKER_RADIUS, MARK);
}

/// Copy of `base` with every outline drawn in.
pub fn outlines_overlay<'a>(
    base: &GrayImage,
    hulls: impl IntoIterator<Item = &'a [Point2<f64>]>,
) -> GrayImage {
    let mut img = base.clone();
    for hull in hulls {
        draw_outline(&mut img, hull);
    }
    img
}

/// Copy of `base` with each of `points` marked.
pub fn points_overlay(base: &GrayImage, points: &[Point2<i32>]) -> GrayImage {
    let mut img = base.clone();
    for &p in points {
        mark_point(&mut img, p);
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_is_closed() {
        let mut img = GrayImage::new(20, 20);
        let square = [
            Point2::new(2.0, 2.0),
            Point2::new(12.0, 2.0),
            Point2::new(12.0, 12.0),
            Point2::new(2.0, 12.0),
        ];
        draw_outline(&mut img, &square);
        // closing edge x = 2
        assert_eq!(img.get_pixel(2, 7)[0], 255);
        assert_eq!(img.get_pixel(12, 7)[0], 255);
        assert_eq!(img.get_pixel(7, 7)[0], 0);
    }

    #[test]
    fn outline_is_two_pixels_wide() {
        let mut img = GrayImage::new(20, 20);
        draw_outline(&mut img, &[Point2::new(5.0, 5.0), Point2::new(15.0, 5.0)]);
        assert_eq!(img.get_pixel(10, 5)[0], 255);
        assert_eq!(img.get_pixel(10, 6)[0], 255);
        assert_eq!(img.get_pixel(10, 4)[0], 0);
        assert_eq!(img.get_pixel(10, 7)[0], 0);

        let mut dot = GrayImage::new(6, 6);
        draw_outline(&mut dot, &[Point2::new(2.0, 2.0)]);
        assert_eq!(dot.as_raw().iter().filter(|&&v| v == 255).count(), 4);
    }

    #[test]
    fn markers_are_filled_disks() {
        let base = GrayImage::new(20, 20);
        let img = points_overlay(&base, &[Point2::new(10, 10)]);
        assert_eq!(img.get_pixel(10, 10)[0], 255);
        assert_eq!(img.get_pixel(12, 10)[0], 255);
        assert_eq!(img.get_pixel(10, 15)[0], 0);
        // source untouched
        assert!(base.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn points_off_canvas_are_ignored() {
        let img = points_overlay(&GrayImage::new(8, 8), &[Point2::new(-20, 40)]);
        assert!(img.as_raw().iter().all(|&v| v == 0));
    }
}
