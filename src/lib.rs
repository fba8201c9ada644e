#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]
#![allow(dead_code)]
#![no_std]

//! Tessellation of stroked 2D polylines into triangle meshes.
//!
//! ## Overview
//!
//! Given an ordered sequence of points and a [`StrokeStyle`], the
//! [`StrokeTessellator`] produces the vertex, color, uv and index buffers
//! of a triangle mesh drawing the stroked line, with miter, bevel or
//! round joints, square or round caps, a width profile and a color ramp
//! sampled along the stroke, and texture coordinates that either stretch
//! over the stroke or repeat tile by tile.
//!
//! The tessellation is a strip of triangles along the path. This is fast
//! and simple, but if the polyline overlaps itself the triangles will
//! overlap in the intersecting region, which has to be kept in mind when
//! rendering transparent strokes.
//!
//! The output goes into a [`StrokeMeshBuffers`], a set of plain parallel
//! vectors that a rendering layer can upload as-is as a triangle list.
//!
//! ## Example
//!
//! ```
//! use polyline_stroke::{LineCap, StrokeMeshBuffers, StrokeStyle, StrokeTessellator};
//! use polyline_stroke::math::point;
//!
//! let points = [point(0.0, 0.0), point(40.0, 0.0), point(40.0, 30.0)];
//!
//! let mut buffers = StrokeMeshBuffers::new();
//! let mut tessellator = StrokeTessellator::new();
//!
//! tessellator
//!     .tessellate(
//!         &points,
//!         &StrokeStyle::default()
//!             .with_line_width(8.0)
//!             .with_line_cap(LineCap::Round),
//!         &mut buffers,
//!     )
//!     .unwrap();
//!
//! assert!(buffers.is_valid());
//! ```
//!
//! The width profile and color ramp are opaque sampling functions over
//! the normalized arc length; closures work directly:
//!
//! ```
//! use polyline_stroke::{Rgba, StrokeMeshBuffers, StrokeStyle, StrokeTessellator};
//! use polyline_stroke::math::point;
//!
//! let points = [point(0.0, 0.0), point(100.0, 0.0)];
//! let mut buffers = StrokeMeshBuffers::new();
//! let mut tessellator = StrokeTessellator::new();
//!
//! let taper = |t: f32| 1.0 - t * 0.5;
//! let ramp = |t: f32| Rgba::new(t, 0.0, 1.0 - t, 1.0);
//!
//! tessellator
//!     .tessellate_with_modulators(
//!         &points,
//!         &StrokeStyle::default(),
//!         Some(&taper),
//!         Some(&ramp),
//!         &mut buffers,
//!     )
//!     .unwrap();
//!
//! assert_eq!(buffers.colors.len(), buffers.vertices.len());
//! ```

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod arc;
mod color;
mod error;
pub mod math;
mod math_utils;
mod mesh;
mod stroke;
mod tiling;

#[doc(inline)]
pub use crate::color::Rgba;
#[doc(inline)]
pub use crate::error::*;
#[doc(inline)]
pub use crate::math_utils::{find_intersection, segment_intersection, SegmentIntersection};
#[doc(inline)]
pub use crate::mesh::{StrokeMeshBuffers, VertexId};
#[doc(inline)]
pub use crate::stroke::StrokeTessellator;

use crate::math::Rect;

/// Line cap as defined by the SVG specification.
///
/// `Butt` ends the stroke flat at the endpoint, `Square` extends it by
/// half the line width, `Round` closes it with a half disc.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineCap {
    Butt,
    Square,
    Round,
}

/// Joint geometry between two consecutive segments of a polyline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineJoin {
    /// Sharp corners extending both segment edges to their intersection.
    /// Falls back to `Bevel` per joint when the miter limit is exceeded
    /// or the edges fail to intersect.
    Miter,
    /// A single triangle closing the outer side of the turn.
    Bevel,
    /// A circular fillet around the joint point.
    Round,
}

/// How texture coordinates are generated along the stroke.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum TextureMode {
    /// No uvs are emitted.
    None,
    /// The texture stretches once over the stroke's full length.
    Stretch,
    /// The texture repeats every `tile_aspect` times the line width.
    Tile,
}

/// A width multiplier sampled over the stroke's normalized arc length.
pub trait WidthProfile {
    fn width_at(&self, t: f32) -> f32;
}

impl<F> WidthProfile for F
where
    F: Fn(f32) -> f32,
{
    fn width_at(&self, t: f32) -> f32 {
        self(t)
    }
}

/// A color gradient sampled over the stroke's normalized arc length.
pub trait ColorRamp {
    fn color_at(&self, t: f32) -> Rgba;
}

impl<F> ColorRamp for F
where
    F: Fn(f32) -> Rgba,
{
    fn color_at(&self, t: f32) -> Rgba {
        self(t)
    }
}

/// Parameters for the stroke tessellator.
///
/// The width profile and color ramp are not part of the style so that it
/// stays `Copy`; they are passed separately to
/// [`StrokeTessellator::tessellate_with_modulators`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct StrokeStyle {
    /// Line width.
    ///
    /// Must be finite and greater than zero.
    /// Default value: `StrokeStyle::DEFAULT_LINE_WIDTH`.
    pub line_width: f32,

    /// What joint geometry to build at interior points.
    ///
    /// Default value: `LineJoin::Miter`.
    pub line_join: LineJoin,

    /// What cap to use at the start of the stroke.
    ///
    /// Default value: `LineCap::Butt`.
    pub start_cap: LineCap,

    /// What cap to use at the end of the stroke.
    ///
    /// Default value: `LineCap::Butt`.
    pub end_cap: LineCap,

    /// The stroke color when no color ramp is supplied.
    ///
    /// Default value: `StrokeStyle::DEFAULT_COLOR`.
    pub color: Rgba,

    /// How texture coordinates are generated.
    ///
    /// Default value: `TextureMode::None`.
    pub texture_mode: TextureMode,

    /// Texture tiles per line-width of stroke length in
    /// `TextureMode::Tile`.
    ///
    /// Must be finite and greater than zero.
    /// Default value: `StrokeStyle::DEFAULT_TILE_ASPECT`.
    pub tile_aspect: f32,

    /// The sub-rectangle of the texture, in normalized uv space, mapped
    /// onto one repeat unit of the stroke. Selecting anything other than
    /// the full unit rect turns on tile-aligned geometry splitting in
    /// `TextureMode::Tile`, so sub-atlas textures repeat without
    /// stretching.
    ///
    /// Default value: the unit rect.
    pub tile_region: Rect,

    /// How far a miter corner may extend from the joint point, in units
    /// of half the line width, before the joint falls back to bevel.
    ///
    /// Default value: `StrokeStyle::DEFAULT_MITER_LIMIT`.
    pub miter_limit: f32,

    /// Number of segments used to approximate half a turn of round
    /// joint and cap arcs. Must be at least 1.
    ///
    /// Default value: `StrokeStyle::DEFAULT_ROUND_PRECISION`.
    pub round_precision: u32,
}

impl StrokeStyle {
    pub const DEFAULT_LINE_WIDTH: f32 = 10.0;
    pub const DEFAULT_MITER_LIMIT: f32 = 2.0;
    pub const DEFAULT_ROUND_PRECISION: u32 = 8;
    pub const DEFAULT_TILE_ASPECT: f32 = 1.0;
    pub const DEFAULT_COLOR: Rgba = Rgba::new(0.4, 0.5, 1.0, 1.0);

    pub const DEFAULT: Self = StrokeStyle {
        line_width: Self::DEFAULT_LINE_WIDTH,
        line_join: LineJoin::Miter,
        start_cap: LineCap::Butt,
        end_cap: LineCap::Butt,
        color: Self::DEFAULT_COLOR,
        texture_mode: TextureMode::None,
        tile_aspect: Self::DEFAULT_TILE_ASPECT,
        tile_region: Rect {
            origin: math::Point::new(0.0, 0.0),
            size: math::Size::new(1.0, 1.0),
        },
        miter_limit: Self::DEFAULT_MITER_LIMIT,
        round_precision: Self::DEFAULT_ROUND_PRECISION,
    };

    #[inline]
    pub const fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    #[inline]
    pub const fn with_line_join(mut self, join: LineJoin) -> Self {
        self.line_join = join;
        self
    }

    #[inline]
    pub const fn with_line_cap(mut self, cap: LineCap) -> Self {
        self.start_cap = cap;
        self.end_cap = cap;
        self
    }

    #[inline]
    pub const fn with_start_cap(mut self, cap: LineCap) -> Self {
        self.start_cap = cap;
        self
    }

    #[inline]
    pub const fn with_end_cap(mut self, cap: LineCap) -> Self {
        self.end_cap = cap;
        self
    }

    #[inline]
    pub const fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    #[inline]
    pub const fn with_texture_mode(mut self, mode: TextureMode) -> Self {
        self.texture_mode = mode;
        self
    }

    #[inline]
    pub const fn with_tile_aspect(mut self, tile_aspect: f32) -> Self {
        self.tile_aspect = tile_aspect;
        self
    }

    #[inline]
    pub const fn with_tile_region(mut self, region: Rect) -> Self {
        self.tile_region = region;
        self
    }

    #[inline]
    pub fn with_miter_limit(mut self, limit: f32) -> Self {
        assert!(limit >= 0.0);
        self.miter_limit = limit;
        self
    }

    #[inline]
    pub fn with_round_precision(mut self, precision: u32) -> Self {
        assert!(precision >= 1);
        self.round_precision = precision;
        self
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[test]
fn default_style() {
    use crate::math::rect;

    let style = StrokeStyle::default();

    assert_eq!(style.line_width, 10.0);
    assert_eq!(style.miter_limit, 2.0);
    assert_eq!(style.line_join, LineJoin::Miter);
    assert_eq!(style.start_cap, LineCap::Butt);
    assert_eq!(style.end_cap, LineCap::Butt);
    assert_eq!(style.tile_region, rect(0.0, 0.0, 1.0, 1.0));
}

#[test]
fn style_builder_methods() {
    let style = StrokeStyle::default()
        .with_line_width(4.0)
        .with_line_cap(LineCap::Square)
        .with_miter_limit(3.0);

    assert_eq!(style.line_width, 4.0);
    assert_eq!(style.start_cap, LineCap::Square);
    assert_eq!(style.end_cap, LineCap::Square);
    assert_eq!(style.miter_limit, 3.0);
}

#[test]
#[should_panic]
fn style_invalid_miter_limit() {
    let _ = StrokeStyle::default().with_miter_limit(-1.0);
}

#[test]
fn sampling_closures() {
    fn takes_profile(profile: &dyn WidthProfile) -> f32 {
        profile.width_at(0.5)
    }
    fn takes_ramp(ramp: &dyn ColorRamp) -> Rgba {
        ramp.color_at(1.0)
    }

    let half = |t: f32| t * 0.5;
    assert_eq!(takes_profile(&half), 0.25);

    let ramp = |t: f32| Rgba::new(t, t, t, 1.0);
    assert_eq!(takes_ramp(&ramp), Rgba::new(1.0, 1.0, 1.0, 1.0));
}
