//! Simple closed and open meshes, mostly useful as sampling fixtures.

use super::Mesh;
use crate::Point3;
use parry3d_f64::shape::Ball;

impl Mesh {
    /// Create an axis-aligned box spanning from `mins` to `maxs`, with twelve triangles whose
    /// normals face outward.
    pub fn create_box(mins: &Point3, maxs: &Point3) -> Self {
        // Vertex i sits at the max corner on axis a if bit a of i is set
        let vertices = (0..8)
            .map(|i| {
                Point3::new(
                    if i & 1 == 0 { mins.x } else { maxs.x },
                    if i & 2 == 0 { mins.y } else { maxs.y },
                    if i & 4 == 0 { mins.z } else { maxs.z },
                )
            })
            .collect();

        let faces = vec![
            [0, 2, 1],
            [1, 2, 3],
            [4, 5, 6],
            [5, 7, 6],
            [0, 1, 5],
            [0, 5, 4],
            [2, 6, 7],
            [2, 7, 3],
            [0, 4, 6],
            [0, 6, 2],
            [1, 3, 7],
            [1, 7, 5],
        ];

        Self { vertices, faces }
    }

    /// Create a flat rectangle in the xy plane at height `z`, made of two triangles facing +z.
    pub fn create_rect(mins: (f64, f64), maxs: (f64, f64), z: f64) -> Self {
        let vertices = vec![
            Point3::new(mins.0, mins.1, z),
            Point3::new(maxs.0, mins.1, z),
            Point3::new(maxs.0, maxs.1, z),
            Point3::new(mins.0, maxs.1, z),
        ];

        Self {
            vertices,
            faces: vec![[0, 1, 2], [0, 2, 3]],
        }
    }

    /// Create a UV sphere around the origin.
    ///
    /// # Arguments
    ///
    /// * `radius`: the radius of the sphere
    /// * `n_theta`: the number of subdivisions around the polar axis
    /// * `n_phi`: the number of subdivisions from pole to pole
    ///
    /// returns: Mesh
    pub fn create_sphere(radius: f64, n_theta: u32, n_phi: u32) -> Self {
        let (vertices, faces) = Ball::new(radius).to_trimesh(n_theta, n_phi);
        Self { vertices, faces }
    }
}
