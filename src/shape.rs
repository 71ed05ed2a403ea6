//! Background shape paths.

use resvg::tiny_skia::{Path, PathBuilder, Rect};

use crate::config::CornerStyle;

/// Distance of a cubic handle from its endpoint, as a fraction of the
/// radius, for the closest cubic fit of a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Builds the square background clipped to `style`.
///
/// `radius` is clamped to half of `size`. Returns `None` for a non-finite
/// square.
pub fn background_path(style: CornerStyle, size: f32, radius: f32) -> Option<Path> {
    match style {
        CornerStyle::Rounded => rounded_rect(size, radius),
        CornerStyle::Bezier => bezier_rounded_rect(size, radius),
    }
}

/// A square with circular corners.
pub fn rounded_rect(size: f32, radius: f32) -> Option<Path> {
    let radius = radius.clamp(0.0, size / 2.0);
    if radius == 0.0 {
        return Rect::from_xywh(0.0, 0.0, size, size).map(PathBuilder::from_rect);
    }
    corner_path(size, radius, radius * (1.0 - KAPPA))
}

/// A square whose corners are cubics with both control points on the
/// corner itself. Curve endpoints match [`rounded_rect`]; the curve bulges
/// slightly further towards the corner.
pub fn bezier_rounded_rect(size: f32, radius: f32) -> Option<Path> {
    corner_path(size, radius.clamp(0.0, size / 2.0), 0.0)
}

/// Edges and corner curves, clockwise from the top edge. `inset` is the
/// distance from the square's corner to each control point.
fn corner_path(size: f32, radius: f32, inset: f32) -> Option<Path> {
    let (s, r, k) = (size, radius, inset);
    let mut pb = PathBuilder::new();
    pb.move_to(r, 0.0);
    pb.line_to(s - r, 0.0);
    pb.cubic_to(s - k, 0.0, s, k, s, r);
    pb.line_to(s, s - r);
    pb.cubic_to(s, s - k, s - k, s, s - r, s);
    pb.line_to(r, s);
    pb.cubic_to(k, s, 0.0, s - k, 0.0, s - r);
    pb.line_to(0.0, r);
    pb.cubic_to(0.0, k, k, 0.0, r, 0.0);
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use resvg::tiny_skia::{FillRule, Paint, Pixmap, Point, Transform};

    fn coverage(path: &Path, size: u32) -> Vec<u8> {
        let mut pixmap = Pixmap::new(size, size).unwrap();
        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);
        paint.anti_alias = true;
        pixmap.fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
        pixmap.pixels().iter().map(|p| p.alpha()).collect()
    }

    /// Points at the start and end of each corner curve.
    fn curve_endpoints(path: &Path) -> Vec<Point> {
        // move, line, cubic(3), line, cubic(3), line, cubic(3), line, cubic(3)
        let points = path.points();
        [0, 1, 4, 5, 8, 9, 12, 13, 16]
            .iter()
            .map(|&i| points[i])
            .collect()
    }

    #[test]
    fn corner_endpoints_match() {
        for (size, radius) in [(16.0, 0.0), (64.0, 10.0), (256.0, 32.0), (48.0, 24.0)] {
            let native = rounded_rect(size, radius).unwrap();
            let bezier = bezier_rounded_rect(size, radius).unwrap();
            assert_eq!(native.bounds(), bezier.bounds());
            if radius > 0.0 {
                assert_eq!(curve_endpoints(&native), curve_endpoints(&bezier));
            }
        }
    }

    #[test]
    fn shapes_cover_equivalent_regions() {
        let (size, radius) = (128u32, 32.0);
        let native = coverage(&rounded_rect(size as f32, radius).unwrap(), size);
        let bezier = coverage(&bezier_rounded_rect(size as f32, radius).unwrap(), size);

        let differing = native
            .iter()
            .zip(&bezier)
            .filter(|(a, b)| a.abs_diff(**b) > 127)
            .count();
        // Each corner of a circular cut removes about 0.215 r^2.
        let bound = (4.0 * 0.215 * radius * radius) as usize;
        assert!(differing < bound, "{differing} pixels differ (bound {bound})");

        // Both leave the center filled and the extreme corner empty.
        let center = (size / 2 * size + size / 2) as usize;
        assert_eq!(native[center], 255);
        assert_eq!(bezier[center], 255);
        assert_eq!(native[0], 0);
        assert_eq!(bezier[0], 0);
    }

    #[test]
    fn zero_radius_is_full_square() {
        let alpha = coverage(&rounded_rect(8.0, 0.0).unwrap(), 8);
        assert!(alpha.iter().all(|&a| a == 255));
        let alpha = coverage(&bezier_rounded_rect(8.0, 0.0).unwrap(), 8);
        assert!(alpha.iter().all(|&a| a == 255));
    }

    #[test]
    fn radius_is_clamped_to_half_size() {
        let path = background_path(CornerStyle::Rounded, 20.0, 500.0).unwrap();
        assert_eq!(path.points()[0], Point::from_xy(10.0, 0.0));
    }
}
