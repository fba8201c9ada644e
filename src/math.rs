//! f32 geometric types, aliases for the corresponding euclid types in the
//! default (unit-less) coordinate space.

pub use euclid;

/// Alias for `euclid::default::Point2D<f32>`.
pub type Point = euclid::default::Point2D<f32>;

/// Alias for `euclid::default::Vector2D<f32>`.
pub type Vector = euclid::default::Vector2D<f32>;

/// Alias for `euclid::default::Size2D<f32>`.
pub type Size = euclid::default::Size2D<f32>;

/// Alias for `euclid::default::Rect<f32>`.
pub type Rect = euclid::default::Rect<f32>;

/// Alias for `euclid::Angle<f32>`.
pub type Angle = euclid::Angle<f32>;

/// Shorthand for `Point::new(x, y)`.
#[inline]
pub fn point(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

/// Shorthand for `Vector::new(x, y)`.
#[inline]
pub fn vector(x: f32, y: f32) -> Vector {
    Vector::new(x, y)
}

/// Shorthand for `Size::new(w, h)`.
#[inline]
pub fn size(w: f32, h: f32) -> Size {
    Size::new(w, h)
}

/// Shorthand for `Rect::new(Point::new(x, y), Size::new(w, h))`.
#[inline]
pub fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
    Rect {
        origin: point(x, y),
        size: size(w, h),
    }
}
