//! A read-only triangle mesh used as the input to the samplers.

mod primitives;
mod sampling;

use crate::errors::SamplingError;
use crate::{Aabb3, Point3, Result, Vector3};
use parry3d_f64::shape::{TriMesh, TriMeshFlags, Triangle};
use rayon::prelude::*;

/// An indexed triangle mesh. Every face index is guaranteed to be within the bounds of the
/// vertex list; no other topological validation (manifoldness, orientation) is performed.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Point3>,
    faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create a new mesh from a list of vertices and a list of triangles referencing them.
    ///
    /// # Arguments
    ///
    /// * `vertices`: the vertex positions
    /// * `faces`: triplets of indices into `vertices`, one per triangle
    ///
    /// returns: Result<Mesh, Box<dyn Error, Global>>
    ///
    /// # Examples
    ///
    /// ```
    /// use meshpds::{Mesh, Point3};
    /// let vertices = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// ];
    /// let mesh = Mesh::try_new(vertices.clone(), vec![[0, 1, 2]]).unwrap();
    /// assert_eq!(mesh.faces().len(), 1);
    /// assert!(Mesh::try_new(vertices, vec![[0, 1, 3]]).is_err());
    /// ```
    pub fn try_new(vertices: Vec<Point3>, faces: Vec<[u32; 3]>) -> Result<Self> {
        for (i, face) in faces.iter().enumerate() {
            if let Some(&index) = face.iter().find(|&&v| v as usize >= vertices.len()) {
                return Err(SamplingError::FaceIndexOutOfBounds {
                    face: i,
                    index,
                    vertex_count: vertices.len(),
                }
                .into());
            }
        }

        Ok(Self { vertices, faces })
    }

    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// True if the mesh has no vertices or no faces, in which case there is nothing to sample.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Get the triangle of the face with the given index.
    pub fn triangle(&self, face: usize) -> Triangle {
        let [a, b, c] = self.faces[face];
        Triangle::new(
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        )
    }

    /// The axis-aligned bounding box of all vertices, or `None` if there are no vertices.
    pub fn aabb(&self) -> Option<Aabb3> {
        if self.vertices.is_empty() {
            None
        } else {
            Some(Aabb3::from_points(&self.vertices))
        }
    }

    /// Compute the area of every face, in face order.
    pub fn face_areas(&self) -> Vec<f64> {
        (0..self.faces.len())
            .into_par_iter()
            .map(|i| {
                let t = self.triangle(i);
                (t.b - t.a).cross(&(t.c - t.a)).norm() * 0.5
            })
            .collect()
    }

    /// Compute the unit normal of every face, in face order, following the counter-clockwise
    /// winding of the face indices. Degenerate faces get a zero vector.
    pub fn face_normals(&self) -> Vec<Vector3> {
        (0..self.faces.len())
            .into_par_iter()
            .map(|i| {
                self.triangle(i)
                    .normal()
                    .map(|n| n.into_inner())
                    .unwrap_or_else(Vector3::zeros)
            })
            .collect()
    }

    /// Build an oriented parry triangle mesh from this mesh. Duplicate vertices are merged so
    /// that the pseudo-normals used for inside/outside classification are consistent across
    /// shared edges.
    pub fn to_oriented_trimesh(&self) -> std::result::Result<TriMesh, SamplingError> {
        TriMesh::with_flags(
            self.vertices.clone(),
            self.faces.clone(),
            TriMeshFlags::ORIENTED | TriMeshFlags::MERGE_DUPLICATE_VERTICES,
        )
        .map_err(|e| SamplingError::DistanceField(format!("{e:?}")))
    }
}
