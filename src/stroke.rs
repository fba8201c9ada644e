//! The polyline stroke tessellator.
//!
//! The tessellation is a single left-to-right pass over the input points.
//! A quad strip runs along the polyline body; the strip keeps a trailing
//! edge of one "up" and one "down" vertex that every new quad connects
//! to, so the body stays watertight. Interior points go through the joint
//! resolver, which miters, bevels or rounds the turn, and the open ends
//! receive caps. When a tile-repeating texture sub-region is active,
//! quads that cross a tile boundary are split so that every emitted
//! sub-quad covers exactly one tile of uv space.

use crate::arc::{tessellate_cap_arc, tessellate_tiled_cap_arc};
use crate::color::Rgba;
use crate::error::{TessellationResult, UnsupportedParameter};
use crate::math::{point, rect, vector, Point, Rect, Vector};
use crate::math_utils::{
    normalized_or_zero, rotated_90, segment_intersection, SegmentIntersection,
};
use crate::mesh::{StrokeMeshBuffers, VertexId};
use crate::tiling::Band;
use crate::{ColorRamp, LineCap, LineJoin, StrokeStyle, TextureMode, WidthProfile};

use alloc::vec::Vec;
use core::f32::consts::PI;

#[cfg(not(feature = "std"))]
use num_traits::Float;

#[cfg(all(debug_assertions, feature = "std"))]
macro_rules! tess_log {
    ($obj:ident, $fmt:expr) => (
        if $obj.log {
            std::println!($fmt);
        }
    );
    ($obj:ident, $fmt:expr, $($arg:tt)*) => (
        if $obj.log {
            std::println!($fmt, $($arg)*);
        }
    );
}

#[cfg(not(all(debug_assertions, feature = "std")))]
macro_rules! tess_log {
    ($obj:ident, $fmt:expr) => {};
    ($obj:ident, $fmt:expr, $($arg:tt)*) => {};
}

/// Which side of the strip a vertex belongs to, relative to the
/// per-segment rotated normal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Up,
    Down,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Up => Side::Down,
            Side::Down => Side::Up,
        }
    }
}

/// The strip's trailing edge: the most recently emitted vertex pair that
/// the next quad has to connect to.
#[derive(Copy, Clone, Debug)]
struct StripState {
    last_up: VertexId,
    last_down: VertexId,
}

impl StripState {
    fn last(&self, side: Side) -> VertexId {
        match side {
            Side::Up => self.last_up,
            Side::Down => self.last_down,
        }
    }

    fn set_last(&mut self, side: Side, id: VertexId) {
        match side {
            Side::Up => self.last_up = id,
            Side::Down => self.last_down = id,
        }
    }
}

/// Builds triangle meshes from stroked polylines.
///
/// Each tessellation call is a pure function of its inputs: the output
/// buffers are cleared and fully rebuilt, and no state is retained from
/// one call to the next apart from reusable scratch allocations. The
/// tessellator can therefore be reused freely, but a single instance must
/// not be driven from two calls at once.
///
/// # Examples
///
/// ```
/// use polyline_stroke::{StrokeMeshBuffers, StrokeStyle, StrokeTessellator, LineJoin};
/// use polyline_stroke::math::point;
///
/// let points = [point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)];
///
/// let mut buffers = StrokeMeshBuffers::new();
/// let mut tessellator = StrokeTessellator::new();
/// tessellator
///     .tessellate(
///         &points,
///         &StrokeStyle::default()
///             .with_line_width(2.0)
///             .with_line_join(LineJoin::Round),
///         &mut buffers,
///     )
///     .unwrap();
///
/// assert!(buffers.is_valid());
/// println!(
///     " -- {} vertices, {} indices",
///     buffers.vertices.len(),
///     buffers.indices.len()
/// );
/// ```
#[derive(Default)]
pub struct StrokeTessellator {
    band_scratch: Vec<Band>,
    log: bool,
}

impl StrokeTessellator {
    pub fn new() -> Self {
        StrokeTessellator {
            band_scratch: Vec::new(),
            log: false,
        }
    }

    /// Enable verbose debugging output (debug builds only).
    pub fn set_logging(&mut self, is_enabled: bool) {
        self.log = is_enabled;
    }

    /// Compute the tessellation of a polyline with a uniform width and
    /// color.
    pub fn tessellate(
        &mut self,
        points: &[Point],
        style: &StrokeStyle,
        output: &mut StrokeMeshBuffers,
    ) -> TessellationResult {
        self.tessellate_with_modulators(points, style, None, None, output)
    }

    /// Compute the tessellation of a polyline, sampling the optional
    /// width profile and color ramp along the stroke's arc length.
    ///
    /// When `color_ramp` is provided the output color buffer is populated
    /// with one color per vertex; otherwise it is left empty and
    /// `style.color` applies to the whole stroke.
    pub fn tessellate_with_modulators(
        &mut self,
        points: &[Point],
        style: &StrokeStyle,
        width_profile: Option<&dyn WidthProfile>,
        color_ramp: Option<&dyn ColorRamp>,
        output: &mut StrokeMeshBuffers,
    ) -> TessellationResult {
        output.clear();

        // Fewer than two points is a valid, empty stroke.
        if points.len() < 2 {
            return Ok(());
        }

        if !(style.tile_aspect > 0.0) || !style.tile_aspect.is_finite() {
            return Err(UnsupportedParameter::InvalidTileAspect.into());
        }
        if !(style.line_width > 0.0) || !style.line_width.is_finite() {
            return Err(UnsupportedParameter::InvalidLineWidth.into());
        }

        let mut builder = StrokeBuilderImpl {
            style: *style,
            width_profile,
            color_ramp,
            interpolate_color: color_ramp.is_some(),
            emit_uvs: style.texture_mode != TextureMode::None,
            tiled_region: style.tile_region != rect(0.0, 0.0, 1.0, 1.0),
            strip: StripState {
                last_up: VertexId(0),
                last_down: VertexId(0),
            },
            last_uvx: 0.0,
            bands: &mut self.band_scratch,
            output,
            log: self.log,
        };
        builder.build(points);

        Ok(())
    }
}

struct StrokeBuilderImpl<'l> {
    style: StrokeStyle,
    width_profile: Option<&'l dyn WidthProfile>,
    color_ramp: Option<&'l dyn ColorRamp>,
    interpolate_color: bool,
    emit_uvs: bool,
    /// Whether `tile_region` selects a texture sub-region, which turns on
    /// tile-aligned geometry splitting in `TextureMode::Tile`.
    tiled_region: bool,
    strip: StripState,
    /// Running uv x of the trailing edge, in tile units.
    last_uvx: f32,
    bands: &'l mut Vec<Band>,
    output: &'l mut StrokeMeshBuffers,
    log: bool,
}

impl<'l> StrokeBuilderImpl<'l> {
    fn build(&mut self, points: &[Point]) {
        let style = self.style;
        let hw = style.line_width / 2.0;
        let hw_sq = hw * hw;
        let sharp_limit_sq = style.miter_limit * style.miter_limit;
        let len = points.len();

        let mut pos0 = points[0];
        let mut pos1 = points[1];
        let mut f0 = normalized_or_zero(pos1 - pos0);
        let mut u0 = rotated_90(f0);
        let mut pos_up0 = pos0;
        let mut pos_down0 = pos0;

        let mut color0 = style.color;
        let mut color1 = style.color;

        let mut current_distance = 0.0;
        let mut total_distance = 0.0;
        let mut width_factor = 1.0;

        let retrieve_curve = self.width_profile.is_some();
        let distance_required = self.interpolate_color
            || retrieve_curve
            || style.texture_mode == TextureMode::Tile
            || style.texture_mode == TextureMode::Stretch;
        if distance_required {
            total_distance = polyline_length(points);
            // The stroke's outer length is a little higher than the
            // polyline's: square and round caps extend past the endpoints
            // by half the local width.
            if style.start_cap == LineCap::Square || style.start_cap == LineCap::Round {
                total_distance += style.line_width * self.width_at(0.0) * 0.5;
            }
            if style.end_cap == LineCap::Square || style.end_cap == LineCap::Round {
                total_distance += style.line_width * self.width_at(1.0) * 0.5;
            }
        }
        if self.interpolate_color {
            color0 = self.color_at(0.0);
        }

        let mut uvx0 = 0.0;
        let mut uvx1;

        if retrieve_curve {
            width_factor = self.width_at(0.0);
        }

        pos_up0 += u0 * hw * width_factor;
        pos_down0 -= u0 * hw * width_factor;

        /*
         *  pos_up0 ------------- pos_up1 --------------------
         *     |                     |
         *   pos0 - - - - - - - - - pos1 - - - - - - - - - pos2
         *     |                     |
         * pos_down0 ------------ pos_down1 ------------------
         *
         *   i-1                     i                      i+1
         */

        // Begin cap.
        match style.start_cap {
            LineCap::Square => {
                // Push the first vertices back a little.
                pos_up0 -= f0 * hw * width_factor;
                pos_down0 -= f0 * hw * width_factor;
                current_distance += hw * width_factor;
            }
            LineCap::Round => {
                match style.texture_mode {
                    TextureMode::Tile => {
                        uvx0 = width_factor * 0.5 / style.tile_aspect;
                    }
                    TextureMode::Stretch => {
                        uvx0 = fraction_along(style.line_width * width_factor, total_distance);
                    }
                    TextureMode::None => {}
                }
                self.cap_arc(
                    pos0,
                    pos_up0 - pos0,
                    -PI,
                    color0,
                    &rect(0.0, 0.0, uvx0 * 2.0, 1.0),
                );
                current_distance += hw * width_factor;
            }
            LineCap::Butt => {}
        }

        self.strip_begin(pos_up0, pos_down0, color0, uvx0);

        // Interior points.
        for i in 1..len - 1 {
            pos1 = points[i];
            let pos2 = points[i + 1];

            let f1 = normalized_or_zero(pos2 - pos1);
            let u1 = rotated_90(f1);

            // The turn direction decides which side is the inner (miter)
            // one; the outer side falls back to the previous segment's
            // plain offset.
            let orientation = if u0.dot(f1) > 0.0 { Side::Up } else { Side::Down };

            if distance_required {
                current_distance += (pos1 - pos0).length();
            }
            if self.interpolate_color {
                color1 = self.color_at(fraction_along(current_distance, total_distance));
            }
            if retrieve_curve {
                width_factor = self.width_at(fraction_along(current_distance, total_distance));
            }

            let (inner_normal0, inner_normal1) = match orientation {
                Side::Up => (u0 * hw * width_factor, u1 * hw * width_factor),
                Side::Down => (-u0 * hw * width_factor, -u1 * hw * width_factor),
            };

            /*
             * ---------------------------
             *                        /
             * 0                     /    1
             *                      /          /
             * --------------------x------    /
             *                    /          /    (shown with orientation == Down)
             *                   /          /
             *                  /          /
             *                 /          /
             *                     2     /
             *                          /
             */

            // Inner intersection at the joint.
            let intersection = segment_intersection(
                pos0 + inner_normal0,
                pos1 + inner_normal0,
                pos1 + inner_normal1,
                pos2 + inner_normal1,
            );

            let (corner_in, corner_out, intersects) = match intersection {
                SegmentIntersection::Intersection(p) => {
                    // The outer corner is the inner one reflected through
                    // the joint point.
                    (p, pos1 + (pos1 - p), true)
                }
                // Parallel or too sharp: default both corners to the
                // previous segment's offsets.
                _ => (pos1 + inner_normal0, pos1 - inner_normal0, false),
            };

            let (corner_up, corner_down) = match orientation {
                Side::Up => (corner_in, corner_out),
                Side::Down => (corner_out, corner_in),
            };

            let mut current_join = style.line_join;

            let pos_up1;
            let pos_down1;
            if intersects {
                // Fall back to bevel when the miter would be too long.
                let width_factor_sq = width_factor * width_factor;
                if current_join == LineJoin::Miter
                    && (corner_out - pos1).square_length() / (hw_sq * width_factor_sq)
                        > sharp_limit_sq
                {
                    tess_log!(self, "sharp joint at {:?} exceeds the miter limit", pos1);
                    current_join = LineJoin::Bevel;
                }
                if current_join == LineJoin::Miter {
                    // No joint geometry: the previous and next body quads
                    // directly share an edge.
                    pos_up1 = corner_up;
                    pos_down1 = corner_down;
                } else {
                    // Bevel or round.
                    match orientation {
                        Side::Up => {
                            pos_up1 = corner_up;
                            pos_down1 = pos1 - u0 * hw * width_factor;
                        }
                        Side::Down => {
                            pos_up1 = pos1 + u0 * hw * width_factor;
                            pos_down1 = corner_down;
                        }
                    }
                }
            } else {
                if current_join == LineJoin::Miter && f0.dot(f1) <= 0.0 {
                    // A miter has no fallback shape for a degenerate turn;
                    // a 180 degree turn-back gets bevel geometry instead.
                    // Segments that keep going in the same direction pass
                    // straight through: the default corners already form a
                    // valid shared edge.
                    current_join = LineJoin::Bevel;
                }
                pos_up1 = corner_up;
                pos_down1 = corner_down;
            }

            // The body quad, up to the corner positions.
            uvx1 = self.uvx_at(current_distance, total_distance);
            self.strip_add_quad(pos_up1, pos_down1, color1, uvx1);

            // Roll the state over to the next segment.
            u0 = u1;
            f0 = f1;
            pos0 = pos1;
            if intersects {
                if current_join == LineJoin::Miter {
                    pos_up0 = pos_up1;
                    pos_down0 = pos_down1;
                } else {
                    match orientation {
                        Side::Up => {
                            pos_up0 = corner_up;
                            pos_down0 = pos1 - u1 * hw * width_factor;
                        }
                        Side::Down => {
                            pos_up0 = pos1 + u1 * hw * width_factor;
                            pos_down0 = corner_down;
                        }
                    }
                }
            } else {
                pos_up0 = pos1 + u1 * hw * width_factor;
                pos_down0 = pos1 - u1 * hw * width_factor;
            }
            // From here on pos_up0 and pos_down0 concern the next segment.

            // Joint geometry, on the outer side only.
            if current_join != LineJoin::Miter {
                /* ________________ cbegin
                 *               / \
                 *              /   \
                 * ____________/_ _ _\ cend
                 *             |     |
                 *             |     |
                 *             |     |
                 */

                let (cbegin, cend) = match orientation {
                    Side::Up => (pos_down1, pos_down0),
                    Side::Down => (pos_up1, pos_up0),
                };

                match current_join {
                    LineJoin::Bevel => {
                        self.strip_add_tri(cend, orientation);
                    }
                    LineJoin::Round => {
                        let vbegin = cbegin - pos1;
                        let vend = cend - pos1;
                        self.strip_add_arc(pos1, vbegin.angle_to(vend).radians, orientation);
                    }
                    LineJoin::Miter => {}
                }

                if !intersects {
                    // The joint is too corrupted to be reused; restart the
                    // strip from the fallback points.
                    tess_log!(self, "restarting the strip at {:?}", pos1);
                    self.strip_begin(pos_up0, pos_down0, color1, uvx1);
                }
            }
        }

        // Last (or only) segment.
        let pos_end = points[len - 1];

        if distance_required {
            current_distance += (pos_end - pos0).length();
        }
        if self.interpolate_color {
            color1 = self.color_at(1.0);
        }
        if retrieve_curve {
            width_factor = self.width_at(1.0);
        }

        let mut pos_up1 = pos_end + u0 * hw * width_factor;
        let mut pos_down1 = pos_end - u0 * hw * width_factor;

        // End cap (square).
        if style.end_cap == LineCap::Square {
            pos_up1 += f0 * hw * width_factor;
            pos_down1 += f0 * hw * width_factor;
        }

        uvx1 = self.uvx_at(current_distance, total_distance);
        self.strip_add_quad(pos_up1, pos_down1, color1, uvx1);

        // End cap (round).
        if style.end_cap == LineCap::Round {
            let dist = match style.texture_mode {
                TextureMode::Tile => width_factor / style.tile_aspect,
                TextureMode::Stretch => {
                    fraction_along(style.line_width * width_factor, total_distance)
                }
                TextureMode::None => 0.0,
            };
            self.cap_arc(
                pos_end,
                pos_up1 - pos_end,
                PI,
                color1,
                &rect(uvx1 - 0.5 * dist, 0.0, dist, 1.0),
            );
        }

        if !self.tiled_region {
            return;
        }

        // Rescale the uvs into the requested sub-region.
        let region = style.tile_region;
        for uv in self.output.uvs.iter_mut() {
            *uv = point(
                region.origin.x + uv.x * region.size.width,
                region.origin.y + uv.y * region.size.height,
            );
        }
    }

    fn width_at(&self, t: f32) -> f32 {
        match self.width_profile {
            Some(profile) => profile.width_at(t),
            None => 1.0,
        }
    }

    fn color_at(&self, t: f32) -> Rgba {
        match self.color_ramp {
            Some(ramp) => ramp.color_at(t),
            None => self.style.color,
        }
    }

    fn uvx_at(&self, distance: f32, total_distance: f32) -> f32 {
        match self.style.texture_mode {
            TextureMode::Tile => distance / (self.style.line_width * self.style.tile_aspect),
            TextureMode::Stretch => fraction_along(distance, total_distance),
            TextureMode::None => 0.0,
        }
    }

    fn cap_arc(
        &mut self,
        center: Point,
        radius_vector: Vector,
        angle_delta: f32,
        color: Rgba,
        uv_rect: &Rect,
    ) {
        let color = if self.interpolate_color {
            Some(color)
        } else {
            None
        };
        if self.tiled_region && self.style.texture_mode == TextureMode::Tile {
            tess_log!(self, "tiled cap arc, uv rect {:?}", uv_rect);
            tessellate_tiled_cap_arc(
                center,
                radius_vector,
                angle_delta,
                color,
                uv_rect,
                self.style.round_precision,
                self.bands,
                self.output,
            );
        } else {
            tessellate_cap_arc(
                center,
                radius_vector,
                angle_delta,
                color,
                uv_rect,
                self.style.round_precision,
                self.emit_uvs,
                self.output,
            );
        }
    }

    /// Starts (or restarts) the strip at a fresh vertex pair.
    fn strip_begin(&mut self, up: Point, down: Point, color: Rgba, uvx: f32) {
        let repeating = self.tiled_region && self.style.texture_mode == TextureMode::Tile;
        let emitted_uvx = if repeating { uvx - uvx.floor() } else { uvx };

        let vi = self.output.push_vertex(up);
        self.output.push_vertex(down);

        if self.interpolate_color {
            self.output.colors.push(color);
            self.output.colors.push(color);
        }
        if self.emit_uvs {
            self.output.uvs.push(point(emitted_uvx, 0.0));
            self.output.uvs.push(point(emitted_uvx, 1.0));
        }

        if repeating {
            self.last_uvx = uvx;
        }
        self.strip = StripState {
            last_up: vi,
            last_down: vi + 1,
        };
    }

    /// Appends a quad connected to the trailing edge. In tile-repeat mode
    /// the quad is split at texture tile boundaries first.
    fn strip_add_quad(&mut self, up: Point, down: Point, color: Rgba, uvx: f32) {
        let repeating = self.tiled_region && self.style.texture_mode == TextureMode::Tile;
        if repeating && uvx > 1.0 && !self.output.vertices.is_empty() {
            self.strip_add_quad_tiled(up, down, color, uvx);
            return;
        }
        if repeating {
            self.last_uvx = uvx;
        }
        self.strip_emit_quad(up, down, color, uvx);
    }

    /// Splits a body quad on every texture tile boundary it crosses.
    ///
    /// Each crossed boundary emits two coincident vertex pairs: one
    /// closing the current tile at uv x 1 and one reopening the next tile
    /// at uv x 0, so the repeating texture never stretches across a
    /// boundary. Positions and colors are interpolated proportionally to
    /// the distance each sub-quad covers. The fractional remainder goes
    /// through the plain quad path.
    ///
    /// ```text
    /// [0,1] ................ [2,2] ................ [3,3]
    /// [0,1] .. 1|0 .. 1|0 .. [0,2] .. 1|0 .. 1|0 .. [0,3]
    /// ```
    fn strip_add_quad_tiled(&mut self, up: Point, down: Point, color: Rgba, mut uvx: f32) {
        let last_remaining = self.last_uvx.ceil() - self.last_uvx;
        let dist = uvx - self.last_uvx;

        if dist > 0.0 {
            let prev_up = self.output.vertices[self.strip.last_up.to_usize()];
            let prev_down = self.output.vertices[self.strip.last_down.to_usize()];
            let step_up = (up - prev_up) / dist;
            let step_down = (down - prev_down) / dist;
            let prev_color = self
                .output
                .colors
                .last()
                .copied()
                .unwrap_or(self.style.color);

            if last_remaining == 0.0
                && self.output.uvs[self.strip.last_up.to_usize()].x == 1.0
            {
                // The trailing edge closed a tile exactly on its boundary;
                // reopen the next tile before moving on.
                self.strip_emit_quad(prev_up, prev_down, prev_color, 0.0);
            }

            let has_remaining = last_remaining > 0.0;
            let segs = (dist - last_remaining).floor() as i32 + has_remaining as i32;

            let mut cursor_up = prev_up;
            let mut cursor_down = prev_down;
            let mut covered = 0.0;
            for s in 0..segs {
                let advance = if s == 0 && has_remaining {
                    last_remaining
                } else {
                    1.0
                };
                covered += advance;
                cursor_up += step_up * advance;
                cursor_down += step_down * advance;
                let seg_color = prev_color.lerp(color, covered / dist);

                // Close the current tile, then reopen the next one with a
                // coincident pair.
                self.strip_emit_quad(cursor_up, cursor_down, seg_color, 1.0);
                self.strip_emit_quad(cursor_up, cursor_down, seg_color, 0.0);
            }
        }

        self.last_uvx = uvx;

        // The fractional remainder of the last tile.
        uvx -= uvx.floor();
        if uvx == 0.0 {
            return;
        }
        self.strip_emit_quad(up, down, color, uvx);
    }

    /// The plain quad path: two vertices, two triangles, clockwise
    /// winding, trailing edge advanced to the new pair.
    fn strip_emit_quad(&mut self, up: Point, down: Point, color: Rgba, uvx: f32) {
        let vi = self.output.push_vertex(up);
        self.output.push_vertex(down);

        if self.interpolate_color {
            self.output.colors.push(color);
            self.output.colors.push(color);
        }
        if self.emit_uvs {
            self.output.uvs.push(point(uvx, 0.0));
            self.output.uvs.push(point(uvx, 1.0));
        }

        self.output
            .push_triangle(self.strip.last_up, vi + 1, self.strip.last_down);
        self.output.push_triangle(self.strip.last_up, vi, vi + 1);

        self.strip = StripState {
            last_up: vi,
            last_down: vi + 1,
        };
    }

    /// Like `strip_emit_quad` but duplicates the trailing pair first, for
    /// callers that need a quad with an unshared seam.
    fn strip_new_quad(&mut self, up: Point, down: Point, color: Rgba, uvx: f32) {
        let vi = self
            .output
            .push_vertex(self.output.vertices[self.strip.last_up.to_usize()]);
        self.output
            .push_vertex(self.output.vertices[self.strip.last_down.to_usize()]);
        self.output.push_vertex(up);
        self.output.push_vertex(down);

        if self.interpolate_color {
            for _ in 0..4 {
                self.output.colors.push(color);
            }
        }
        if self.emit_uvs {
            let last_up_uv = self.output.uvs[self.strip.last_up.to_usize()];
            let last_down_uv = self.output.uvs[self.strip.last_down.to_usize()];
            self.output.uvs.push(last_up_uv);
            self.output.uvs.push(last_down_uv);
            self.output.uvs.push(point(uvx, 0.0));
            self.output.uvs.push(point(uvx, 1.0));
        }

        self.output.push_triangle(vi, vi + 3, vi + 1);
        self.output.push_triangle(vi, vi + 2, vi + 3);

        self.strip = StripState {
            last_up: vi + 2,
            last_down: vi + 3,
        };
    }

    /// Appends a single triangle sharing the opposite side's trailing
    /// vertices; only the opposite side's trailing index advances. Used
    /// by bevel joints and arc fans, where one side stays anchored.
    fn strip_add_tri(&mut self, apex: Point, orientation: Side) {
        let vi = self.output.push_vertex(apex);

        if self.interpolate_color {
            let last = self
                .output
                .colors
                .last()
                .copied()
                .unwrap_or(self.style.color);
            self.output.colors.push(last);
        }

        let opposite = orientation.opposite();

        if self.emit_uvs {
            // One slice of the texture across the whole joint, so the
            // anchored vertex can be shared.
            let uv = self.output.uvs[self.strip.last(opposite).to_usize()];
            self.output.uvs.push(uv);
        }

        self.output
            .push_triangle(self.strip.last(opposite), vi, self.strip.last(orientation));

        self.strip.set_last(opposite, vi);
    }

    /// Extrudes an arc of triangles from the trailing edge, all sharing
    /// the anchored side's vertex. Used by round joints.
    fn strip_add_arc(&mut self, center: Point, angle_delta: f32, orientation: Side) {
        let opposite = orientation.opposite();
        let vbegin = self.output.vertices[self.strip.last(opposite).to_usize()] - center;
        let radius = vbegin.length();
        let mut angle_step = PI / self.style.round_precision as f32;
        let steps = angle_delta.abs() / angle_step;

        if angle_delta < 0.0 {
            angle_step = -angle_step;
        }

        let mut t = vbegin.angle_from_x_axis().radians;
        let end_angle = t + angle_delta;

        let mut ti = 0;
        while (ti as f32) < steps {
            let rpos = center + vector(t.cos(), t.sin()) * radius;
            self.strip_add_tri(rpos, orientation);
            t += angle_step;
            ti += 1;
        }

        // Closing arc vertex.
        let rpos = center + vector(end_angle.cos(), end_angle.sin()) * radius;
        self.strip_add_tri(rpos, orientation);
    }
}

fn polyline_length(points: &[Point]) -> f32 {
    let mut d = 0.0;
    for i in 1..points.len() {
        d += (points[i] - points[i - 1]).length();
    }
    d
}

fn fraction_along(distance: f32, total: f32) -> f32 {
    if total > 0.0 {
        distance / total
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TessellationError;

    fn check(output: &StrokeMeshBuffers) {
        assert!(output.is_valid(), "inconsistent buffers");
        assert_eq!(output.indices.len() % 3, 0);
        for v in &output.vertices {
            assert!(v.x.is_finite() && v.y.is_finite());
        }
    }

    fn tessellate(points: &[Point], style: &StrokeStyle) -> StrokeMeshBuffers {
        let mut output = StrokeMeshBuffers::new();
        StrokeTessellator::new()
            .tessellate(points, style, &mut output)
            .unwrap();
        check(&output);
        output
    }

    fn assert_point_eq(a: Point, b: Point) {
        assert!(
            (a - b).square_length() < 1e-8,
            "expected {:?} to be {:?}",
            a,
            b
        );
    }

    #[test]
    fn collinear_miter_passes_straight_through() {
        // A perfectly straight miter stroke is a plain strip: two vertices
        // per input point, two triangles per segment, no joint geometry.
        let points = [
            point(0.0, 0.0),
            point(1.0, 0.0),
            point(2.0, 0.0),
            point(3.0, 0.0),
        ];
        let output = tessellate(&points, &StrokeStyle::default().with_line_width(2.0));

        assert_eq!(output.vertices.len(), 2 * points.len());
        assert_eq!(output.indices.len(), 2 * (points.len() - 1) * 3);
        assert!(output.colors.is_empty());
        assert!(output.uvs.is_empty());
    }

    #[test]
    fn square_caps_make_a_rectangle() {
        // A two point stroke of length L with square caps on both ends
        // covers a rectangle of length L + width.
        let points = [point(0.0, 0.0), point(10.0, 0.0)];
        let output = tessellate(
            &points,
            &StrokeStyle::default()
                .with_line_width(2.0)
                .with_line_cap(LineCap::Square),
        );

        assert_eq!(output.vertices.len(), 4);
        let mut min = point(f32::MAX, f32::MAX);
        let mut max = point(f32::MIN, f32::MIN);
        for v in &output.vertices {
            min = point(min.x.min(v.x), min.y.min(v.y));
            max = point(max.x.max(v.x), max.y.max(v.y));
        }
        assert_point_eq(min, point(-1.0, -1.0));
        assert_point_eq(max, point(11.0, 1.0));
    }

    #[test]
    fn sharp_angle_falls_back_to_bevel() {
        // A 30 degree interior angle produces a miter about 3.9 half
        // widths long, beyond the default limit of 2.
        let points = [point(0.0, 0.0), point(10.0, 0.0), point(10.0 - 8.66, 5.0)];
        let style = StrokeStyle::default().with_line_width(2.0);
        let output = tessellate(&points, &style);

        // Two body quads, one bevel triangle, no strip restart.
        assert_eq!(output.vertices.len(), 7);
        assert_eq!(output.indices.len(), 5 * 3);
        // The reflected miter corner would sit at x > 13; the bevel keeps
        // every vertex close to the stroke.
        for v in &output.vertices {
            assert!(v.x <= 11.0, "runaway miter vertex {:?}", v);
        }

        // A gentle turn keeps the sharp joint: no extra geometry.
        let gentle = [point(0.0, 0.0), point(10.0, 0.0), point(20.0, 1.0)];
        let output = tessellate(&gentle, &style);
        assert_eq!(output.vertices.len(), 6);
        assert_eq!(output.indices.len(), 4 * 3);
    }

    #[test]
    fn bevel_joint_adds_one_triangle() {
        let points = [point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)];
        let output = tessellate(
            &points,
            &StrokeStyle::default()
                .with_line_width(2.0)
                .with_line_join(LineJoin::Bevel),
        );

        assert_eq!(output.vertices.len(), 7);
        assert_eq!(output.indices.len(), 5 * 3);
    }

    #[test]
    fn round_joint_arc() {
        // Quarter turn, round joint, two arc steps plus the closing
        // vertex.
        let points = [point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)];
        let output = tessellate(
            &points,
            &StrokeStyle::default()
                .with_line_width(2.0)
                .with_line_join(LineJoin::Round)
                .with_round_precision(4),
        );

        // Two body quads (sharing the strip), three arc vertices.
        assert_eq!(output.vertices.len(), 9);
        assert_eq!(output.indices.len(), 7 * 3);

        // The arc is centered on the corner with a half-width radius.
        let corner = point(10.0, 0.0);
        for v in &output.vertices[4..7] {
            assert!(((*v - corner).length() - 1.0).abs() < 1e-5);
        }
        assert_point_eq(output.vertices[6], point(11.0, 0.0));
    }

    #[test]
    fn round_caps() {
        let points = [point(0.0, 0.0), point(10.0, 0.0)];
        let output = tessellate(
            &points,
            &StrokeStyle::default()
                .with_line_width(2.0)
                .with_line_cap(LineCap::Round)
                .with_round_precision(4),
        );

        // Each cap is a standalone fan: center, four arc steps and the
        // closing vertex.
        assert_eq!(output.vertices.len(), 6 + 2 + 2 + 6);
        assert_eq!(output.indices.len(), (4 + 2 + 4) * 3);

        // Begin cap rim vertices lie half a width away from the start.
        for v in &output.vertices[1..6] {
            assert!(((*v - point(0.0, 0.0)).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn stretch_uvs_span_the_stroke() {
        let points = [point(0.0, 0.0), point(5.0, 0.0), point(10.0, 0.0)];
        let output = tessellate(
            &points,
            &StrokeStyle::default()
                .with_line_width(2.0)
                .with_texture_mode(TextureMode::Stretch),
        );

        assert_eq!(output.uvs.len(), output.vertices.len());
        let expected = [0.0, 0.0, 0.5, 0.5, 1.0, 1.0];
        for (uv, x) in output.uvs.iter().zip(expected.iter()) {
            assert!((uv.x - x).abs() < 1e-6);
        }
        for (i, uv) in output.uvs.iter().enumerate() {
            assert_eq!(uv.y, (i % 2) as f32);
        }
    }

    #[test]
    fn tile_splitting_on_whole_tiles() {
        // Three tiles of length exactly line_width * tile_aspect: three
        // unit-uv sub-quads, each closed and reopened on its boundary.
        let points = [point(0.0, 0.0), point(3.0, 0.0)];
        let output = tessellate(
            &points,
            &StrokeStyle::default()
                .with_line_width(1.0)
                .with_texture_mode(TextureMode::Tile)
                .with_tile_region(rect(0.0, 0.0, 0.5, 0.5)),
        );

        // Two strip-begin vertices plus four per tile (a closing and a
        // reopening pair), no fractional remainder.
        assert_eq!(output.vertices.len(), 2 + 3 * 4);
        assert_eq!(output.indices.len(), 3 * 4 * 3);

        // Boundary pairs sit exactly on the tile edges.
        assert_point_eq(output.vertices[2], point(1.0, -0.5));
        assert_point_eq(output.vertices[6], point(2.0, -0.5));
        assert_point_eq(output.vertices[10], point(3.0, -0.5));

        // Each sub-quad spans the full tile in uv x, rescaled into the
        // requested sub-region.
        assert_point_eq(output.uvs[2], point(0.5, 0.0));
        assert_point_eq(output.uvs[3], point(0.5, 0.5));
        assert_point_eq(output.uvs[4], point(0.0, 0.0));
        for uv in &output.uvs {
            assert!(uv.x >= 0.0 && uv.x <= 0.5);
            assert!(uv.y >= 0.0 && uv.y <= 0.5);
        }
    }

    #[test]
    fn tile_splitting_mid_segment_boundary() {
        // The tile boundary falls in the middle of the second segment;
        // the boundary pair must sit exactly on it.
        let points = [point(0.0, 0.0), point(0.5, 0.0), point(1.5, 0.0)];
        let output = tessellate(
            &points,
            &StrokeStyle::default()
                .with_line_width(1.0)
                .with_texture_mode(TextureMode::Tile)
                .with_tile_region(rect(0.0, 0.0, 0.5, 1.0)),
        );

        assert_eq!(output.vertices.len(), 10);
        assert_eq!(output.indices.len(), 8 * 3);
        assert_point_eq(output.vertices[4], point(1.0, -0.5));
        assert_point_eq(output.vertices[5], point(1.0, 0.5));
    }

    #[test]
    fn gradient_fills_the_color_buffer() {
        let points = [point(0.0, 0.0), point(10.0, 0.0)];
        let style = StrokeStyle::default().with_line_width(2.0);

        let ramp = |t: f32| Rgba::new(t, 0.0, 1.0 - t, 1.0);
        let mut output = StrokeMeshBuffers::new();
        StrokeTessellator::new()
            .tessellate_with_modulators(&points, &style, None, Some(&ramp), &mut output)
            .unwrap();
        check(&output);

        assert_eq!(output.colors.len(), output.vertices.len());
        assert_eq!(output.colors[0], Rgba::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(output.colors[3], Rgba::new(1.0, 0.0, 0.0, 1.0));

        // Without a ramp the color buffer stays empty.
        let output = tessellate(&points, &style);
        assert!(output.colors.is_empty());
    }

    #[test]
    fn width_profile_tapers_the_stroke() {
        let points = [point(0.0, 0.0), point(10.0, 0.0)];
        let style = StrokeStyle::default().with_line_width(2.0);

        let taper = |t: f32| if t < 0.5 { 1.0 } else { 0.5 };
        let mut output = StrokeMeshBuffers::new();
        StrokeTessellator::new()
            .tessellate_with_modulators(&points, &style, Some(&taper), None, &mut output)
            .unwrap();
        check(&output);

        assert_eq!(output.vertices.len(), 4);
        let begin_width = (output.vertices[0] - output.vertices[1]).length();
        let end_width = (output.vertices[2] - output.vertices[3]).length();
        assert!((begin_width - 2.0).abs() < 1e-5);
        assert!((end_width - 1.0).abs() < 1e-5);
    }

    #[test]
    fn tiled_round_cap_stays_in_the_region() {
        // A tile-repeating sub-region with a round end cap spanning
        // several tiles exercises the banded cap path end to end.
        let points = [point(0.0, 0.0), point(10.0, 0.0)];
        let region = rect(0.0, 0.0, 0.5, 1.0);
        let output = tessellate(
            &points,
            &StrokeStyle::default()
                .with_line_width(2.0)
                .with_tile_aspect(0.2)
                .with_texture_mode(TextureMode::Tile)
                .with_tile_region(region)
                .with_end_cap(LineCap::Round)
                .with_round_precision(4),
        );

        assert_eq!(output.uvs.len(), output.vertices.len());
        for uv in &output.uvs {
            assert!(uv.x >= -1e-4 && uv.x <= 0.5 + 1e-4, "uv.x = {}", uv.x);
            assert!(uv.y >= -1e-4 && uv.y <= 1.0 + 1e-4, "uv.y = {}", uv.y);
        }
    }

    #[test]
    fn degenerate_input() {
        let mut output = StrokeMeshBuffers::new();
        let mut tess = StrokeTessellator::new();
        let style = StrokeStyle::default();

        // Too few points: a valid, empty stroke. Stale output is cleared.
        output.vertices.push(point(1.0, 1.0));
        assert!(tess.tessellate(&[], &style, &mut output).is_ok());
        assert!(output.vertices.is_empty());

        assert!(tess
            .tessellate(&[point(0.0, 0.0)], &style, &mut output)
            .is_ok());
        assert!(output.vertices.is_empty());

        // Duplicate points yield flat geometry but no NaNs.
        let dup = [
            point(0.0, 0.0),
            point(0.0, 0.0),
            point(5.0, 0.0),
            point(5.0, 0.0),
            point(10.0, 3.0),
        ];
        let output = tessellate(&dup, &StrokeStyle::default().with_line_width(2.0));
        assert!(!output.vertices.is_empty());
    }

    #[test]
    fn invalid_style_parameters() {
        let mut output = StrokeMeshBuffers::new();
        let mut tess = StrokeTessellator::new();
        let points = [point(0.0, 0.0), point(10.0, 0.0)];

        assert_eq!(
            tess.tessellate(
                &points,
                &StrokeStyle::default().with_tile_aspect(0.0),
                &mut output,
            ),
            Err(TessellationError::UnsupportedParameter(
                UnsupportedParameter::InvalidTileAspect
            )),
        );
        assert_eq!(
            tess.tessellate(
                &points,
                &StrokeStyle::default().with_line_width(0.0),
                &mut output,
            ),
            Err(TessellationError::UnsupportedParameter(
                UnsupportedParameter::InvalidLineWidth
            )),
        );
    }

    #[test]
    fn joint_and_cap_combinations_stay_valid() {
        let points = [
            point(0.0, 0.0),
            point(10.0, 0.0),
            point(10.0, 10.0),
            point(0.0, 10.0),
            point(-2.0, 3.0),
        ];
        let joins = [LineJoin::Miter, LineJoin::Bevel, LineJoin::Round];
        let caps = [LineCap::Butt, LineCap::Square, LineCap::Round];
        let textures = [TextureMode::None, TextureMode::Stretch, TextureMode::Tile];

        let taper = |t: f32| 1.0 - 0.4 * t;
        let ramp = |t: f32| Rgba::new(t, 1.0 - t, 0.2, 1.0);

        for &join in &joins {
            for &cap in &caps {
                for &texture in &textures {
                    let style = StrokeStyle::default()
                        .with_line_width(3.0)
                        .with_line_join(join)
                        .with_line_cap(cap)
                        .with_texture_mode(texture)
                        .with_tile_region(rect(0.25, 0.25, 0.5, 0.5))
                        .with_round_precision(3);

                    let mut output = StrokeMeshBuffers::new();
                    StrokeTessellator::new()
                        .tessellate_with_modulators(
                            &points,
                            &style,
                            Some(&taper),
                            Some(&ramp),
                            &mut output,
                        )
                        .unwrap();
                    check(&output);
                    assert_eq!(output.colors.len(), output.vertices.len());
                    if texture == TextureMode::None {
                        assert!(output.uvs.is_empty());
                    } else {
                        assert_eq!(output.uvs.len(), output.vertices.len());
                    }
                }
            }
        }
    }

    #[test]
    fn strip_new_quad_duplicates_the_seam() {
        let mut output = StrokeMeshBuffers::new();
        let mut bands = Vec::new();
        let mut builder = StrokeBuilderImpl {
            style: StrokeStyle::default().with_texture_mode(TextureMode::Stretch),
            width_profile: None,
            color_ramp: None,
            interpolate_color: false,
            emit_uvs: true,
            tiled_region: false,
            strip: StripState {
                last_up: VertexId(0),
                last_down: VertexId(0),
            },
            last_uvx: 0.0,
            bands: &mut bands,
            output: &mut output,
            log: false,
        };

        builder.strip_begin(point(0.0, -1.0), point(0.0, 1.0), Rgba::WHITE, 0.0);
        builder.strip_new_quad(point(5.0, -1.0), point(5.0, 1.0), Rgba::WHITE, 0.5);

        assert_eq!(output.vertices.len(), 6);
        // The trailing pair is duplicated so the seam is not shared.
        assert_eq!(output.vertices[2], output.vertices[0]);
        assert_eq!(output.vertices[3], output.vertices[1]);
        assert_eq!(output.indices.len(), 6);
        assert!(output.is_valid());
    }
}
