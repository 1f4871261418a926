use crate::config::SurfaceParams;
use crate::geom3::Mesh;
use crate::sampling::candidates::{
    FaceAreas, seed_or_entropy, surface_candidate_count, surface_candidates,
};
use crate::sampling::cell::CellQuantizer;
use crate::sampling::dart::throw_darts;
use crate::sampling::grid::SpatialHashGrid;
use crate::sampling::oracle::{Metric, NeighborOracle};
use crate::sampling::sorter::{assign_cells, sort_by_cell};
use crate::{Point3, Result, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

/// A point sampled from the surface of a mesh, with the face it lies on and that face's normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSample {
    pub point: Point3,
    pub face: u32,
    pub normal: Vector3,
}

/// Poisson-disk sample the surface of a mesh given as vertex and face lists.
///
/// # Arguments
///
/// * `vertices`: the vertex positions
/// * `faces`: triplets of indices into `vertices`
/// * `params`: the minimum radius, trial count, oversampling density, distance norm and seed
///
/// returns: Result<Vec<Point3>, Box<dyn Error, Global>>
///
/// # Examples
///
/// ```
/// use meshpds::{DistanceNorm, Point3, SurfaceParams, sample_surface};
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2], [0, 2, 3]];
/// let params = SurfaceParams::new(0.1, 20, 40.0, DistanceNorm::Euclidean).with_seed(1);
/// let points = sample_surface(&vertices, &faces, &params).unwrap();
/// assert!(points.len() > 40);
/// ```
pub fn sample_surface(
    vertices: &[Point3],
    faces: &[[u32; 3]],
    params: &SurfaceParams,
) -> Result<Vec<Point3>> {
    let mesh = Mesh::try_new(vertices.to_vec(), faces.to_vec())?;
    let samples = sample_mesh_surface(&mesh, params)?;
    Ok(samples.into_iter().map(|s| s.point).collect())
}

pub(crate) fn sample_mesh_surface(mesh: &Mesh, params: &SurfaceParams) -> Result<Vec<SurfaceSample>> {
    params.validate()?;
    let _span = debug_span!(
        "sample_surface",
        min_radius = params.min_radius,
        num_trials = params.num_trials,
        density = params.initial_points_density,
        norm = ?params.distance_norm,
    )
    .entered();

    let Some(bounds) = mesh.aabb().filter(|_| !mesh.is_empty()) else {
        debug!("mesh is empty, nothing to sample");
        return Ok(Vec::new());
    };

    let areas = FaceAreas::from_mesh(mesh);
    if !(areas.total() > 0.0) {
        debug!(total_area = areas.total(), "mesh has no area, nothing to sample");
        return Ok(Vec::new());
    }

    let quantizer = CellQuantizer::for_min_radius(bounds.mins, params.min_radius);
    quantizer.check_bounds(&bounds)?;

    let count = surface_candidate_count(
        areas.total(),
        params.min_radius,
        params.initial_points_density,
    );
    let mut candidates = surface_candidates(mesh, &areas, count, seed_or_entropy(params.seed));
    assign_cells(&mut candidates, &quantizer)?;
    sort_by_cell(&mut candidates);

    let mut grid = SpatialHashGrid::build(&candidates);
    debug!(
        total_area = areas.total(),
        candidates = candidates.len(),
        buckets = grid.len(),
        "built surface grid"
    );

    let normals = mesh.face_normals();
    let metric = Metric::new(params.distance_norm, &normals);
    let oracle = NeighborOracle::new(&candidates, params.min_radius, metric);
    let accepted = throw_darts(&candidates, &mut grid, &oracle, params.num_trials as usize);
    debug!(samples = accepted.len(), "surface sampling finished");

    Ok(accepted
        .into_iter()
        .filter_map(|i| {
            let c = &candidates[i];
            c.face.map(|face| SurfaceSample {
                point: c.position,
                face,
                normal: normals[face as usize],
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistanceNorm;
    use crate::errors::SamplingError;

    #[test]
    fn samples_carry_their_face() {
        let mesh = Mesh::create_box(&Point3::origin(), &Point3::new(1.0, 1.0, 1.0));
        let params = SurfaceParams::defaults(0.1).with_seed(3);
        let samples = sample_mesh_surface(&mesh, &params).unwrap();
        assert!(!samples.is_empty());

        let normals = mesh.face_normals();
        for s in &samples {
            assert_eq!(s.normal, normals[s.face as usize]);
            let t = mesh.triangle(s.face as usize);
            assert!(s.normal.dot(&(s.point - t.a)).abs() < 1e-12);
        }
    }

    #[test]
    fn flat_mesh_is_sampled() {
        // The bounding box of a flat mesh has no volume but the surface still has area
        let mesh = Mesh::create_rect((0.0, 0.0), (1.0, 1.0), 0.0);
        let params = SurfaceParams::new(0.1, 10, 40.0, DistanceNorm::Geodesic).with_seed(4);
        assert!(!sample_mesh_surface(&mesh, &params).unwrap().is_empty());
    }

    #[test]
    fn degenerate_faces_give_nothing() {
        let vertices = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        let mesh = Mesh::try_new(vertices, vec![[0, 1, 2]]).unwrap();
        let params = SurfaceParams::defaults(0.1);
        assert!(sample_mesh_surface(&mesh, &params).unwrap().is_empty());
    }

    #[test]
    fn invalid_radius_is_rejected() {
        let mesh = Mesh::create_rect((0.0, 0.0), (1.0, 1.0), 0.0);
        let err = sample_mesh_surface(&mesh, &SurfaceParams::defaults(-1.0)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SamplingError>(),
            Some(SamplingError::InvalidParameter { name: "min_radius", .. })
        ));
    }

    #[test]
    fn tiny_radius_on_a_large_mesh_is_out_of_range() {
        // Rejected from the bounding box alone, before any of the ~1e9 candidates exist
        let mesh = Mesh::create_rect((0.0, 0.0), (1.0e4, 1.0), 0.0);
        let params = SurfaceParams::defaults(0.01).with_seed(5);
        let err = sample_mesh_surface(&mesh, &params).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SamplingError>(),
            Some(SamplingError::CellOutOfRange { .. })
        ));
    }
}
