//! Signed distance queries used to decide whether a point lies inside a volume.

use crate::errors::SamplingError;
use crate::geom3::{Aabb3, Mesh, Point3, Vector3, aabb_expanded};
use parry3d_f64::query::PointQuery;
use rayon::prelude::*;

/// Value returned for queries outside of a field's domain. Any inside test against it fails.
pub const FAR_OUTSIDE: f64 = f64::MAX;

/// Relative amount (of the bounding box diagonal) by which a mesh distance field's domain is
/// grown beyond the mesh bounding box on every side.
const DOMAIN_MARGIN: f64 = 1.0e-3;

/// A continuous signed distance function, negative inside the volume and positive outside. The
/// volume samplers query it from many threads at once, so implementations must be `Sync`.
pub trait DistanceField: Sync {
    fn distance(&self, point: &Point3) -> f64;
}

impl<F> DistanceField for F
where
    F: Fn(&Point3) -> f64 + Sync,
{
    fn distance(&self, point: &Point3) -> f64 {
        self(point)
    }
}

/// A signed distance field of a closed triangle mesh, cached on a regular lattice of nodes and
/// interpolated trilinearly between them.
///
/// The node values are exact signed distances to the mesh, with the sign taken from the
/// pseudo-normals of the closest feature, so the mesh should be closed and consistently wound
/// with its normals facing out. Because the interpolation of a distance function under-estimates
/// depth near creases, the field errs toward "less inside" rather than "more inside".
pub struct MeshDistanceField {
    domain: Aabb3,
    resolution: [usize; 3],
    spacing: Vector3,
    values: Vec<f64>,
}

impl MeshDistanceField {
    /// Build a distance field for a mesh.
    ///
    /// # Arguments
    ///
    /// * `mesh`: the closed, outward-facing mesh
    /// * `resolution`: the number of lattice cells along each axis of the domain; every entry
    ///   must be at least one
    /// * `invert`: if true, the sign of the field is flipped so that the region between the mesh
    ///   and the edge of the domain counts as the inside
    ///
    /// returns: Result<MeshDistanceField, SamplingError>
    pub fn build(
        mesh: &Mesh,
        resolution: [u32; 3],
        invert: bool,
    ) -> Result<Self, SamplingError> {
        if resolution.contains(&0) {
            return Err(SamplingError::invalid(
                "sdf_resolution",
                format!("every axis needs at least one cell, got {resolution:?}"),
            ));
        }

        let aabb = match mesh.aabb() {
            Some(aabb) if !mesh.faces().is_empty() => aabb,
            _ => return Err(SamplingError::DistanceField("the mesh is empty".into())),
        };

        let domain = aabb_expanded(&aabb, DOMAIN_MARGIN * aabb.extents().norm());
        let resolution = resolution.map(|r| r as usize);
        let extents = domain.extents();
        let spacing = Vector3::new(
            extents.x / resolution[0] as f64,
            extents.y / resolution[1] as f64,
            extents.z / resolution[2] as f64,
        );

        let shape = mesh.to_oriented_trimesh()?;
        let sign = if invert { -1.0 } else { 1.0 };

        let [nx, ny, nz] = resolution.map(|r| r + 1);
        let values = (0..nx * ny * nz)
            .into_par_iter()
            .map(|n| {
                let (i, j, k) = (n % nx, (n / nx) % ny, n / (nx * ny));
                let p = domain.mins
                    + Vector3::new(
                        i as f64 * spacing.x,
                        j as f64 * spacing.y,
                        k as f64 * spacing.z,
                    );
                let proj = shape.project_local_point(&p, false);
                let d = (p - proj.point).norm();
                if proj.is_inside { -sign * d } else { sign * d }
            })
            .collect();

        Ok(Self {
            domain,
            resolution,
            spacing,
            values,
        })
    }

    /// The region of space in which the field is defined. Queries outside of it return
    /// [`FAR_OUTSIDE`].
    pub fn domain(&self) -> &Aabb3 {
        &self.domain
    }

    /// The number of lattice cells along each axis.
    pub fn resolution(&self) -> [usize; 3] {
        self.resolution
    }

    fn node(&self, i: usize, j: usize, k: usize) -> f64 {
        let nx = self.resolution[0] + 1;
        let ny = self.resolution[1] + 1;
        self.values[i + nx * (j + ny * k)]
    }
}

impl DistanceField for MeshDistanceField {
    fn distance(&self, point: &Point3) -> f64 {
        let local = point - self.domain.mins;
        let mut base = [0usize; 3];
        let mut t = [0.0; 3];

        for axis in 0..3 {
            let u = local[axis] / self.spacing[axis];
            // Also rejects NaN
            if !(u >= 0.0 && u <= self.resolution[axis] as f64) {
                return FAR_OUTSIDE;
            }
            let i = (u.floor() as usize).min(self.resolution[axis] - 1);
            base[axis] = i;
            t[axis] = u - i as f64;
        }

        let [i, j, k] = base;
        let [tx, ty, tz] = t;
        let lerp = |a: f64, b: f64, f: f64| a + (b - a) * f;

        let c00 = lerp(self.node(i, j, k), self.node(i + 1, j, k), tx);
        let c10 = lerp(self.node(i, j + 1, k), self.node(i + 1, j + 1, k), tx);
        let c01 = lerp(self.node(i, j, k + 1), self.node(i + 1, j, k + 1), tx);
        let c11 = lerp(self.node(i, j + 1, k + 1), self.node(i + 1, j + 1, k + 1), tx);

        lerp(lerp(c00, c10, ty), lerp(c01, c11, ty), tz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_cube() -> Mesh {
        Mesh::create_box(&Point3::origin(), &Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn center_of_cube_is_inside() {
        let field = MeshDistanceField::build(&unit_cube(), [20, 20, 20], false).unwrap();
        assert_relative_eq!(
            field.distance(&Point3::new(0.5, 0.5, 0.5)),
            -0.5,
            epsilon = 1e-6
        );
    }

    #[test]
    fn inverted_field_flips_sign() {
        let field = MeshDistanceField::build(&unit_cube(), [20, 20, 20], true).unwrap();
        assert_relative_eq!(
            field.distance(&Point3::new(0.5, 0.5, 0.5)),
            0.5,
            epsilon = 1e-6
        );
    }

    #[test]
    fn outside_domain_is_far_outside() {
        let field = MeshDistanceField::build(&unit_cube(), [10, 10, 10], false).unwrap();
        assert_eq!(field.distance(&Point3::new(1.5, 0.5, 0.5)), FAR_OUTSIDE);
        assert_eq!(field.distance(&Point3::new(0.5, -0.1, 0.5)), FAR_OUTSIDE);
        assert_eq!(field.distance(&Point3::new(f64::NAN, 0.5, 0.5)), FAR_OUTSIDE);
    }

    #[test]
    fn near_face_is_shallow() {
        let field = MeshDistanceField::build(&unit_cube(), [20, 20, 20], false).unwrap();
        let d = field.distance(&Point3::new(0.5, 0.5, 0.95));
        assert!(d < 0.0);
        assert!(d > -0.1);
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let result = MeshDistanceField::build(&unit_cube(), [20, 0, 20], false);
        assert!(matches!(
            result,
            Err(SamplingError::InvalidParameter {
                name: "sdf_resolution",
                ..
            })
        ));
    }

    #[test]
    fn closures_are_distance_fields() {
        let sphere = |p: &Point3| p.coords.norm() - 1.0;
        assert_relative_eq!(sphere.distance(&Point3::new(0.0, 0.0, 0.5)), -0.5);
    }
}
