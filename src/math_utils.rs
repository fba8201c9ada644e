//! Small geometric helpers for the stroke tessellator.

use crate::math::{point, vector, Point, Rect, Vector};

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// Determinant magnitude below which two segments are considered parallel,
/// in source units.
pub(crate) const INTERSECTION_EPSILON: f32 = 1e-3;

/// The outcome of intersecting two bounded segments.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SegmentIntersection {
    Parallel,
    NoIntersection,
    Intersection(Point),
}

/// Intersects the segments `a -> b` and `c -> d`.
///
/// Solves the 2x2 system via the cross-product determinant, reporting
/// `Parallel` when the determinant magnitude is within
/// `INTERSECTION_EPSILON` and `NoIntersection` when the lines cross
/// outside of either segment.
pub fn segment_intersection(a: Point, b: Point, c: Point, d: Point) -> SegmentIntersection {
    let ab = b - a;
    let cd = d - c;
    let div = cd.y * ab.x - cd.x * ab.y;

    if div.abs() <= INTERSECTION_EPSILON {
        return SegmentIntersection::Parallel;
    }

    let ua = (cd.x * (a.y - c.y) - cd.y * (a.x - c.x)) / div;
    let ub = (ab.x * (a.y - c.y) - ab.y * (a.x - c.x)) / div;
    if ua >= 0.0 && ua <= 1.0 && ub >= 0.0 && ub <= 1.0 {
        SegmentIntersection::Intersection(a + ab * ua)
    } else {
        SegmentIntersection::NoIntersection
    }
}

/// Bounded segment intersection with a single failure mode.
///
/// Returns `None` for collinear segments (zero denominator) and whenever
/// either parametric value falls outside `[0, 1]`. Used by the tiled arc
/// band walk, which only needs to know whether and where a chord crosses
/// a band boundary.
pub fn find_intersection(p0: Point, p1: Point, p2: Point, p3: Point) -> Option<Point> {
    let s10 = p1 - p0;
    let s32 = p3 - p2;

    let denom = s10.x * s32.y - s32.x * s10.y;
    if denom == 0.0 {
        return None;
    }
    let denom_is_positive = denom > 0.0;

    let s02 = p0 - p2;
    let s_numer = s10.x * s02.y - s10.y * s02.x;
    if (s_numer < 0.0) == denom_is_positive {
        return None;
    }

    let t_numer = s32.x * s02.y - s32.y * s02.x;
    if (t_numer < 0.0) == denom_is_positive {
        return None;
    }
    if (s_numer > denom) == denom_is_positive || (t_numer > denom) == denom_is_positive {
        return None;
    }

    let t = t_numer / denom;
    Some(p0 + s10 * t)
}

/// Rotates 90 degrees. The 2D referential is X-right, Y-down, so this
/// points to the left of `v`.
#[inline]
pub(crate) fn rotated_90(v: Vector) -> Vector {
    vector(v.y, -v.x)
}

/// Like `normalize` but returns the zero vector for near-zero input, so
/// degenerate polyline segments produce flat geometry instead of NaNs.
#[inline]
pub(crate) fn normalized_or_zero(v: Vector) -> Vector {
    let sq = v.square_length();
    if sq < 1e-12 {
        vector(0.0, 0.0)
    } else {
        v / sq.sqrt()
    }
}

/// Maps a unit-square uv into `r`.
#[inline]
pub(crate) fn lerp_rect(r: &Rect, uv: Point) -> Point {
    point(
        r.origin.x + r.size.width * uv.x,
        r.origin.y + r.size.height * uv.y,
    )
}
