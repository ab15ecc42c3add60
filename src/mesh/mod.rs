//! In-memory mesh representation: vertex attributes plus indexed polygons.
//!
//! Meshes come out of the wavefront parser and are handed by reference to
//! the rasterizer for one frame at a time.

pub mod wavefront;

use crate::math::{Vec2, Vec3};

/// A polygonal mesh with four parallel attribute sequences.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// 2D texture coordinates.
    pub tex_coords: Vec<Vec2>,
    /// Vertex normals.
    pub normals: Vec<Vec3>,
    /// Faces as index tuples into the sequences above.
    pub polygons: Vec<Polygon>,
}

impl Mesh {
    /// Recenters the model on the origin and uniformly scales it into the
    /// unit cube so arbitrary inputs frame correctly.
    pub fn normalize_vertices(&mut self) {
        let Some(first) = self.positions.first() else {
            return;
        };

        let mut min = *first;
        let mut max = *first;
        for v in &self.positions {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }

        let center = (min + max) * 0.5;
        let half = (max - min) * 0.5;
        let half_extent = half.x.max(half.y).max(half.z);
        if half_extent <= 1.0 && center.length() == 0.0 {
            // already centered inside the unit cube
            return;
        }

        let scale = if half_extent > 0.0 { 1.0 / half_extent } else { 1.0 };
        for v in &mut self.positions {
            *v = (*v - center) * scale;
        }
    }
}

/// A face: an ordered ring of vertex references with optional texture and
/// normal channels.
///
/// The texture and normal index sequences are either empty (channel absent)
/// or exactly as long as the vertex sequence; anything else is inconsistent
/// and is dropped by the parser rather than partially trusted.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Polygon {
    pub vertex_indices: Vec<usize>,
    pub texture_indices: Vec<usize>,
    pub normal_indices: Vec<usize>,
}

impl Polygon {
    pub fn vertex_count(&self) -> usize {
        self.vertex_indices.len()
    }

    /// True when every vertex carries a texture coordinate.
    pub fn has_texture(&self) -> bool {
        !self.texture_indices.is_empty()
            && self.texture_indices.len() == self.vertex_indices.len()
    }

    /// True when every vertex carries a normal.
    pub fn has_normals(&self) -> bool {
        !self.normal_indices.is_empty()
            && self.normal_indices.len() == self.vertex_indices.len()
    }

    /// Splits the polygon into triangles by fanning from vertex 0.
    ///
    /// A fan is only correct for convex polygons; concave inputs produce
    /// overlapping triangles. Channel consistency is re-checked here per
    /// polygon, and inconsistent channels are not carried into the output.
    /// Fewer than 3 vertices yields no triangles.
    pub fn triangulate(&self) -> Vec<Polygon> {
        let n = self.vertex_indices.len();
        if n < 3 {
            return Vec::new();
        }

        let has_texture = self.has_texture();
        let has_normals = self.has_normals();

        let mut triangles = Vec::with_capacity(n - 2);
        for i in 1..n - 1 {
            let pick = |indices: &[usize]| vec![indices[0], indices[i], indices[i + 1]];
            triangles.push(Polygon {
                vertex_indices: pick(&self.vertex_indices),
                texture_indices: if has_texture {
                    pick(&self.texture_indices)
                } else {
                    Vec::new()
                },
                normal_indices: if has_normals {
                    pick(&self.normal_indices)
                } else {
                    Vec::new()
                },
            });
        }
        triangles
    }
}
