//! The output geometry buffers.
//!
//! The tessellator writes plain vertex, color, uv and index vectors rather
//! than going through an abstract sink: the texture tile splitter needs to
//! read back the trailing vertices of the strip, which only a concrete
//! buffer set allows. The buffers are laid out so that a rendering layer
//! can upload them verbatim as a triangle-list mesh.

use crate::color::Rgba;
use crate::math::Point;

use alloc::vec::Vec;

pub(crate) type Index = u32;

/// A vertex offset in the output buffers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct VertexId(pub Index);

impl VertexId {
    pub fn offset(self) -> Index {
        self.0
    }

    pub fn to_usize(self) -> usize {
        self.0 as usize
    }

    pub fn from_usize(v: usize) -> Self {
        VertexId(v as Index)
    }
}

impl core::ops::Add<u32> for VertexId {
    type Output = Self;
    fn add(self, rhs: u32) -> Self {
        VertexId(self.0 + rhs)
    }
}

/// Vertex, color, uv and index buffers for a stroked polyline mesh.
///
/// All four vectors are parallel: `colors` and `uvs` are either empty or
/// exactly as long as `vertices`. `colors` is only populated when a color
/// ramp drives the stroke, `uvs` only when a texture mode is active.
/// The buffers are cleared and fully rebuilt by every tessellation call.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct StrokeMeshBuffers {
    pub vertices: Vec<Point>,
    pub colors: Vec<Rgba>,
    pub uvs: Vec<Point>,
    pub indices: Vec<Index>,
}

impl StrokeMeshBuffers {
    /// Constructor
    pub fn new() -> Self {
        StrokeMeshBuffers::with_capacity(512, 1024)
    }

    /// Constructor
    pub fn with_capacity(num_vertices: usize, num_indices: usize) -> Self {
        StrokeMeshBuffers {
            vertices: Vec::with_capacity(num_vertices),
            colors: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::with_capacity(num_indices),
        }
    }

    /// Empty the buffers without freeing memory, for reuse without
    /// reallocation.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.colors.clear();
        self.uvs.clear();
        self.indices.clear();
    }

    /// Are the buffers consistent? Every index in bounds, the index count a
    /// multiple of three and the optional attribute buffers either empty or
    /// parallel to `vertices`.
    pub fn is_valid(&self) -> bool {
        let n = self.vertices.len();
        self.indices.len() % 3 == 0
            && self.indices.iter().all(|&i| (i as usize) < n)
            && (self.colors.is_empty() || self.colors.len() == n)
            && (self.uvs.is_empty() || self.uvs.len() == n)
    }

    pub(crate) fn push_vertex(&mut self, position: Point) -> VertexId {
        let id = VertexId(self.vertices.len() as Index);
        self.vertices.push(position);
        id
    }

    pub(crate) fn push_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) {
        debug_assert!(a != b);
        debug_assert!(a != c);
        debug_assert!(b != c);
        self.indices.push(a.0);
        self.indices.push(b.0);
        self.indices.push(c.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;

    #[test]
    fn validity() {
        let mut buffers = StrokeMeshBuffers::new();
        assert!(buffers.is_valid());

        let a = buffers.push_vertex(point(0.0, 0.0));
        let b = buffers.push_vertex(point(1.0, 0.0));
        let c = buffers.push_vertex(point(0.0, 1.0));
        buffers.push_triangle(a, b, c);
        assert!(buffers.is_valid());

        buffers.indices.push(17);
        assert!(!buffers.is_valid());

        buffers.clear();
        assert!(buffers.is_valid());
        assert!(buffers.vertices.is_empty());
        assert!(buffers.indices.is_empty());
    }

    #[test]
    fn attribute_buffers_must_be_parallel() {
        let mut buffers = StrokeMeshBuffers::new();
        buffers.push_vertex(point(0.0, 0.0));
        buffers.push_vertex(point(1.0, 0.0));
        assert!(buffers.is_valid());

        buffers.uvs.push(point(0.0, 0.0));
        assert!(!buffers.is_valid());
        buffers.uvs.push(point(1.0, 0.0));
        assert!(buffers.is_valid());
    }
}
