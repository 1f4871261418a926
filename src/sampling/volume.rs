use crate::config::{VolumeDenseParams, VolumeRandomParams};
use crate::geom3::{Aabb3, DistanceField, Mesh, MeshDistanceField, aabb_volume};
use crate::sampling::candidates::{
    is_inside, seed_or_entropy, volume_candidate_count, volume_candidates,
};
use crate::errors::SamplingError;
use crate::sampling::cell::{CellQuantizer, offset_floor};
use crate::sampling::dart::throw_darts;
use crate::sampling::grid::SpatialHashGrid;
use crate::sampling::oracle::{Metric, NeighborOracle};
use crate::sampling::sorter::{assign_cells, sort_by_cell};
use crate::{Point3, Result, Vector3};
use rayon::prelude::*;
use tracing::{debug, debug_span};

/// Tolerance for a lattice row landing exactly on the far side of the bounding box.
const LATTICE_EPSILON: f64 = 1.0e-9;

/// Fill the interior of a closed mesh with randomly placed particles of radius `part_radius`
/// whose centers are at least `2 * part_radius` apart and at least `part_radius` inside the
/// surface. The inside test uses a [`MeshDistanceField`] built at the requested resolution.
///
/// # Arguments
///
/// * `vertices`: the vertex positions
/// * `faces`: triplets of indices into `vertices`, wound so that the normals face outward
/// * `params`: the particle radius, trials, candidate density, inversion, field resolution and
///   seed
///
/// returns: Result<Vec<Point3>, Box<dyn Error, Global>>
pub fn sample_volume_random(
    vertices: &[Point3],
    faces: &[[u32; 3]],
    params: &VolumeRandomParams,
) -> Result<Vec<Point3>> {
    let mesh = Mesh::try_new(vertices.to_vec(), faces.to_vec())?;
    sample_mesh_volume_random(&mesh, params)
}

/// Fill the interior of a closed mesh with particles on a regular lattice of spacing
/// `cell_size`, keeping the lattice cell centers which lie at least `part_radius` inside the
/// surface.
///
/// # Arguments
///
/// * `vertices`: the vertex positions
/// * `faces`: triplets of indices into `vertices`, wound so that the normals face outward
/// * `params`: the particle radius, lattice spacing, sample limit, inversion and field
///   resolution
///
/// returns: Result<Vec<Point3>, Box<dyn Error, Global>>
pub fn sample_volume_dense(
    vertices: &[Point3],
    faces: &[[u32; 3]],
    params: &VolumeDenseParams,
) -> Result<Vec<Point3>> {
    let mesh = Mesh::try_new(vertices.to_vec(), faces.to_vec())?;
    sample_mesh_volume_dense(&mesh, params)
}

/// Returns the mesh bounding box if the mesh has something to sample inside of it.
fn volume_bounds(mesh: &Mesh) -> Option<Aabb3> {
    mesh.aabb()
        .filter(|b| !mesh.is_empty() && aabb_volume(b) > 0.0)
}

pub(crate) fn sample_mesh_volume_random(
    mesh: &Mesh,
    params: &VolumeRandomParams,
) -> Result<Vec<Point3>> {
    params.validate()?;
    let Some(bounds) = volume_bounds(mesh) else {
        debug!("mesh encloses no volume, nothing to sample");
        return Ok(Vec::new());
    };

    let field = MeshDistanceField::build(mesh, params.sdf_resolution, params.invert)?;
    sample_volume_random_with(&field, &bounds, params)
}

pub(crate) fn sample_mesh_volume_dense(
    mesh: &Mesh,
    params: &VolumeDenseParams,
) -> Result<Vec<Point3>> {
    params.validate()?;
    let Some(bounds) = volume_bounds(mesh) else {
        debug!("mesh encloses no volume, nothing to sample");
        return Ok(Vec::new());
    };

    let field = MeshDistanceField::build(mesh, params.sdf_resolution, params.invert)?;
    sample_volume_dense_with(&field, &bounds, params)
}

/// Random volume sampling against an arbitrary distance field. Candidates are drawn uniformly
/// inside `bounds`, which should enclose the region where the field is negative.
///
/// # Arguments
///
/// * `field`: the signed distance field, negative inside
/// * `bounds`: the box candidates are drawn from
/// * `params`: the sampling parameters; `invert` and `sdf_resolution` are not used since the
///   field is already built
///
/// returns: Result<Vec<Point3>, Box<dyn Error, Global>>
///
/// # Examples
///
/// ```
/// use meshpds::{Aabb3, Point3, VolumeRandomParams, sample_volume_random_with};
/// let sphere = |p: &Point3| p.coords.norm() - 1.0;
/// let bounds = Aabb3::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
/// let params = VolumeRandomParams::defaults(0.1).with_seed(7);
/// let points = sample_volume_random_with(&sphere, &bounds, &params).unwrap();
/// assert!(points.iter().all(|p| p.coords.norm() < 0.9));
/// ```
pub fn sample_volume_random_with<F: DistanceField + ?Sized>(
    field: &F,
    bounds: &Aabb3,
    params: &VolumeRandomParams,
) -> Result<Vec<Point3>> {
    params.validate()?;
    let _span = debug_span!(
        "sample_volume_random",
        part_radius = params.part_radius,
        num_trials = params.num_trials,
        density = params.initial_points_density,
    )
    .entered();

    let volume = aabb_volume(bounds);
    if volume <= 0.0 {
        debug!("bounds have no volume, nothing to sample");
        return Ok(Vec::new());
    }

    let min_radius = params.min_radius();
    let quantizer = CellQuantizer::for_min_radius(bounds.mins, min_radius);
    quantizer.check_bounds(bounds)?;
    let count = volume_candidate_count(
        volume,
        quantizer.cell_size(),
        params.initial_points_density,
    );

    let seed = seed_or_entropy(params.seed);
    let mut candidates = volume_candidates(bounds, field, params.part_radius, count, seed);
    if candidates.is_empty() {
        debug!(drawn = count, "no candidate fell inside the volume");
        return Ok(Vec::new());
    }

    assign_cells(&mut candidates, &quantizer)?;
    sort_by_cell(&mut candidates);

    let mut grid = SpatialHashGrid::build(&candidates);
    debug!(
        drawn = count,
        candidates = candidates.len(),
        buckets = grid.len(),
        "built volume grid"
    );

    let oracle = NeighborOracle::new(&candidates, min_radius, Metric::Euclidean);
    let accepted = throw_darts(&candidates, &mut grid, &oracle, params.num_trials as usize);
    debug!(samples = accepted.len(), "volume sampling finished");

    Ok(accepted
        .into_iter()
        .map(|i| candidates[i].position)
        .collect())
}

/// Dense lattice volume sampling against an arbitrary distance field. The lattice starts at the
/// minimum corner of `bounds` and particles sit at the centers of its cells, in order of
/// increasing z, then y, then x.
///
/// # Arguments
///
/// * `field`: the signed distance field, negative inside
/// * `bounds`: the box the lattice spans
/// * `params`: the sampling parameters; `invert` and `sdf_resolution` are not used since the
///   field is already built
///
/// returns: Result<Vec<Point3>, Box<dyn Error, Global>>
pub fn sample_volume_dense_with<F: DistanceField + ?Sized>(
    field: &F,
    bounds: &Aabb3,
    params: &VolumeDenseParams,
) -> Result<Vec<Point3>> {
    params.validate()?;
    let cell_size = params.effective_cell_size();
    let _span = debug_span!(
        "sample_volume_dense",
        part_radius = params.part_radius,
        cell_size,
    )
    .entered();

    if aabb_volume(bounds) <= 0.0 {
        debug!("bounds have no volume, nothing to sample");
        return Ok(Vec::new());
    }

    let [nx, ny, nz] = lattice_dims(bounds, cell_size)?;
    let half = Vector3::repeat(cell_size * 0.5);

    let lattice = nx * ny * nz;
    let mut samples: Vec<Point3> = (0..lattice)
        .into_par_iter()
        .filter_map(|n| {
            let (i, j, k) = (n % nx, (n / nx) % ny, n / (nx * ny));
            let corner = Vector3::new(i as f64, j as f64, k as f64) * cell_size;
            let p = bounds.mins + corner + half;
            is_inside(field, &p, params.part_radius).then_some(p)
        })
        .collect();

    if let Some(limit) = params.max_samples {
        samples.truncate(limit);
    }

    debug!(
        lattice,
        samples = samples.len(),
        "dense volume sampling finished"
    );
    Ok(samples)
}

/// The number of lattice rows along each axis. Each axis is limited to the same range as the
/// sampling grid cells, and the total count must fit in a `usize`.
fn lattice_dims(bounds: &Aabb3, cell_size: f64) -> std::result::Result<[usize; 3], SamplingError> {
    let e = bounds.extents();
    let mut dims = [0; 3];
    for (d, v) in dims.iter_mut().zip([e.x, e.y, e.z]) {
        *d = offset_floor(v / cell_size + LATTICE_EPSILON)? as usize + 1;
    }

    dims.iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .map(|_| dims)
        .ok_or_else(|| {
            SamplingError::invalid(
                "cell_size",
                format!("a lattice of {dims:?} rows is too large"),
            )
        })
}
