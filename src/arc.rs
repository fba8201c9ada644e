//! Standalone arc tessellation for round caps.
//!
//! Round caps are emitted as self-contained fans that do not share
//! vertices with the body strip. Two variants exist: the plain fan maps
//! the whole arc into a single texture rectangle with undistorted
//! circular uvs, while the tile-banded variant splits the cap into
//! radial bands aligned with texture tile boundaries so a repeating
//! texture renders without stretching.

use crate::color::Rgba;
use crate::math::{point, vector, Point, Rect, Vector};
use crate::math_utils::{find_intersection, lerp_rect, rotated_90};
use crate::mesh::StrokeMeshBuffers;
use crate::tiling::{cap_bands, Band};

use alloc::vec::Vec;
use core::f32::consts::PI;

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// Tessellates a cap arc as a fan around a fresh center vertex.
///
/// `radius_vector` points from `center` to the first arc vertex. The uv of
/// each arc vertex comes from mapping the arc's local angle onto the unit
/// circle (`0.5 * (cos, sin) + 0.5`) and interpolating the result into
/// `uv_rect`, which keeps the circular patch undistorted whatever the
/// rect's size.
#[allow(clippy::too_many_arguments)]
pub(crate) fn tessellate_cap_arc(
    center: Point,
    radius_vector: Vector,
    angle_delta: f32,
    color: Option<Rgba>,
    uv_rect: &Rect,
    round_precision: u32,
    emit_uvs: bool,
    output: &mut StrokeMeshBuffers,
) {
    let radius = radius_vector.length();
    let mut angle_step = PI / round_precision as f32;
    let steps = angle_delta.abs() / angle_step;
    if angle_delta < 0.0 {
        angle_step = -angle_step;
    }

    let mut t = radius_vector.angle_from_x_axis().radians;
    let end_angle = t + angle_delta;
    let tt_begin = -PI / 2.0;
    let mut tt = tt_begin;

    // Center vertex.
    let vi0 = output.push_vertex(center);
    if let Some(color) = color {
        output.colors.push(color);
    }
    if emit_uvs {
        output.uvs.push(lerp_rect(uv_rect, point(0.5, 0.5)));
    }

    // Arc vertices.
    let mut ti = 0;
    while (ti as f32) < steps {
        output.push_vertex(center + vector(t.cos(), t.sin()) * radius);
        if let Some(color) = color {
            output.colors.push(color);
        }
        if emit_uvs {
            let sc = point(0.5 * (tt.cos() + 1.0), 0.5 * (tt.sin() + 1.0));
            output.uvs.push(lerp_rect(uv_rect, sc));
        }
        t += angle_step;
        tt += angle_step;
        ti += 1;
    }

    // Closing arc vertex.
    output.push_vertex(center + vector(end_angle.cos(), end_angle.sin()) * radius);
    if let Some(color) = color {
        output.colors.push(color);
    }
    if emit_uvs {
        let tt = tt_begin + angle_delta;
        let sc = point(0.5 * (tt.cos() + 1.0), 0.5 * (tt.sin() + 1.0));
        output.uvs.push(lerp_rect(uv_rect, sc));
    }

    // Fan triangles.
    let mut vi = vi0;
    let mut ti = 0;
    while (ti as f32) < steps {
        output.push_triangle(vi0, vi + 1, vi + 2);
        vi = vi + 1;
        ti += 1;
    }
}

/// Tessellates a cap arc split into texture-tile-aligned radial bands.
///
/// Only used when a tile-repeating sub-region texture is active. Cap arcs
/// sweep half a disc; the flat edge of the half disc sits on the stroke's
/// end, and tile boundaries cut the cap along lines parallel to that
/// edge. Each angular step emits one "spoke" of `2N - 1` vertices for `N`
/// bands: a duplicated vertex pair where the spoke crosses each interior
/// band boundary (one copy per adjacent tile, so uv x stays within
/// `[0, 1]` on both sides of the seam) and the rim vertex. Boundaries a
/// shallow spoke does not reach collapse onto the rim, which keeps every
/// band represented in every spoke at the cost of a few zero-area
/// triangles. Triangles are then emitted in fixed-stride blocks around
/// the shared center vertex.
///
/// ```text
///               *  apex
///              /|
///             / |
///            /  |
///           +---+-- band boundary 1
///          +----+-- (duplicated pair)
///         /     |
///        /      |
///       +-------+-- band boundary 0
///      +--------+--
///     /         |
///    /          |
///   +-----------+
///  rim          flat edge
/// ```
#[allow(clippy::too_many_arguments)]
pub(crate) fn tessellate_tiled_cap_arc(
    center: Point,
    radius_vector: Vector,
    angle_delta: f32,
    color: Option<Rgba>,
    uv_rect: &Rect,
    round_precision: u32,
    bands: &mut Vec<Band>,
    output: &mut StrokeMeshBuffers,
) {
    let radius = radius_vector.length();
    let mut angle_step = PI / round_precision as f32;
    let steps = angle_delta.abs() / angle_step;
    if angle_delta < 0.0 {
        angle_step = -angle_step;
    }

    let t0 = radius_vector.angle_from_x_axis().radians;
    let end_angle = t0 + angle_delta;
    let tt_begin = -PI / 2.0;

    cap_bands(uv_rect, angle_delta >= 0.0, radius, bands);
    let band_count = bands.len();
    let stride = (2 * band_count - 1) as u32;

    // Band boundaries are lines perpendicular to the half-angle axis.
    let half_angle = t0 + angle_delta * 0.5;
    let ho = vector(half_angle.cos(), half_angle.sin());
    let boundary_dir = rotated_90(ho);

    // Center vertex, normalized into the innermost band's tile.
    let vi0 = output.push_vertex(center);
    if let Some(color) = color {
        output.colors.push(color);
    }
    let center_uv = lerp_rect(uv_rect, point(0.5, 0.5));
    output.uvs.push(banded_uv(center_uv, bands[0].base));

    let emit_spoke = |t: f32, output: &mut StrokeMeshBuffers| {
        let rim = center + vector(t.cos(), t.sin()) * radius;
        let uv_t = tt_begin + (t - t0);
        let uv_dir = vector(uv_t.cos(), uv_t.sin());

        for k in 0..band_count - 1 {
            let b = center + ho * bands[k].proj;
            let pos = find_intersection(
                center,
                rim,
                b - boundary_dir * radius,
                b + boundary_dir * radius,
            )
            .unwrap_or(rim);
            let f = if radius > 0.0 {
                (pos - center).length() / radius
            } else {
                0.0
            };
            let uv = lerp_rect(
                uv_rect,
                point(0.5 * (1.0 + f * uv_dir.x), 0.5 * (1.0 + f * uv_dir.y)),
            );

            output.push_vertex(pos);
            output.push_vertex(pos);
            if let Some(color) = color {
                output.colors.push(color);
                output.colors.push(color);
            }
            output.uvs.push(banded_uv(uv, bands[k].base));
            output.uvs.push(banded_uv(uv, bands[k + 1].base));
        }

        output.push_vertex(rim);
        if let Some(color) = color {
            output.colors.push(color);
        }
        let uv = lerp_rect(
            uv_rect,
            point(0.5 * (1.0 + uv_dir.x), 0.5 * (1.0 + uv_dir.y)),
        );
        output.uvs.push(banded_uv(uv, bands[band_count - 1].base));
    };

    let mut ti = 0u32;
    let mut t = t0;
    while (ti as f32) < steps {
        emit_spoke(t, output);
        t += angle_step;
        ti += 1;
    }
    emit_spoke(end_angle, output);

    // Fixed-stride triangle blocks, one per pair of adjacent spokes.
    let mut vi = vi0 + 1;
    for _ in 0..ti {
        output.push_triangle(vi0, vi, vi + stride);
        for k in 0..band_count as u32 - 1 {
            let inner = 2 * k + 1;
            let outer = 2 * k + 2;
            output.push_triangle(vi + inner, vi + outer, vi + stride + outer);
            output.push_triangle(vi + inner, vi + stride + outer, vi + stride + inner);
        }
        vi = vi + stride;
    }
}

fn banded_uv(global: Point, base: f32) -> Point {
    point((global.x - base).clamp(0.0, 1.0), global.y)
}
