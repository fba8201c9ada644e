//! Partitioning of the texture-tile range crossed by a round cap.
//!
//! When a tile-repeating texture is mapped onto a round cap, the cap's uv
//! rectangle can span several texture tiles along the stroke direction.
//! The cap geometry is then split into radial bands, one per crossed tile
//! (with fractional leading and trailing bands), so that each band can
//! carry uv x values normalized to its own tile.

use crate::math::Rect;

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// One radial band of a tiled round cap.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Band {
    /// Distance of the band's outer boundary from the cap's flat edge,
    /// measured along the half-angle axis, in geometry units. The last
    /// band's boundary is the cap radius itself.
    pub proj: f32,
    /// The tile index this band's uv x values are normalized against.
    pub base: f32,
}

/// Computes the tile-aligned radial bands of a round cap.
///
/// Cap arcs sweep half a disc, so only half of `uv_rect`'s x range is
/// actually covered: from the rect's midpoint (the cap's flat edge) to one
/// of its x edges, picked by the sweep direction. Band boundaries sit on
/// integer tile coordinates in that range; the first and last bands absorb
/// the fractional ends. Always produces at least one band.
pub(crate) fn cap_bands(uv_rect: &Rect, sweep_positive: bool, radius: f32, out: &mut Vec<Band>) {
    out.clear();

    let w = uv_rect.size.width;
    let from = uv_rect.origin.x + 0.5 * w;
    let dir = if sweep_positive { 1.0 } else { -1.0 };
    let to = uv_rect.origin.x + if sweep_positive { w } else { 0.0 };

    let span = (to - from) * dir;
    if !(span > 0.0) || !(radius > 0.0) {
        out.push(Band {
            proj: radius,
            base: from.floor(),
        });
        return;
    }

    // Geometry units per tile unit along the half-angle axis.
    let geo = radius / span;

    let mut prev_s = 0.0;
    let mut m = if sweep_positive {
        from.floor() + 1.0
    } else {
        from.ceil() - 1.0
    };
    loop {
        let s = (m - from) * dir;
        if s >= span {
            break;
        }
        if s > 0.0 {
            out.push(Band {
                proj: s * geo,
                base: (from + dir * (prev_s + s) * 0.5).floor(),
            });
            prev_s = s;
        }
        m += dir;
    }
    out.push(Band {
        proj: radius,
        base: (from + dir * (prev_s + span) * 0.5).floor(),
    });
}
