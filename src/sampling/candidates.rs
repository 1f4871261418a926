//! Generation of the oversampled random candidate sets from which the samples are drawn.
//!
//! Generation is split into fixed-size chunks, each drawing from its own ChaCha stream of the
//! same base seed. The candidates for a given seed are therefore the same no matter how many
//! threads run the chunks.

use crate::common::points::from_barycentric;
use crate::geom3::{Aabb3, DistanceField, Mesh};
use crate::sampling::cell::CellCoord;
use crate::{Point3, Vector3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Number of candidates generated by one work unit, each with its own random stream.
const CHUNK_SIZE: usize = 4096;

/// A possible sample position. The cell is filled in after generation by the cell sorter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub cell: CellCoord,
    pub position: Point3,

    /// The face the candidate was generated on, only present for surface candidates.
    pub face: Option<u32>,
}

impl Candidate {
    pub fn new(position: Point3, face: Option<u32>) -> Self {
        Self {
            cell: CellCoord::default(),
            position,
            face,
        }
    }
}

/// Returns the given seed, or a fresh one from the thread-local entropy source.
pub fn seed_or_entropy(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::rng().random())
}

fn chunk_rng(seed: u64, chunk: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(chunk as u64);
    rng
}

/// Runs `generate` for `count` slots split into chunks with independent random streams, keeping
/// the results in slot order.
fn generate_chunked<T, F>(count: usize, seed: u64, generate: F) -> Vec<T>
where
    T: Send,
    F: Fn(&mut ChaCha8Rng) -> Option<T> + Sync,
{
    (0..count.div_ceil(CHUNK_SIZE))
        .into_par_iter()
        .flat_map_iter(|chunk| {
            let mut rng = chunk_rng(seed, chunk);
            let n = CHUNK_SIZE.min(count - chunk * CHUNK_SIZE);
            let generate = &generate;
            (0..n).filter_map(move |_| generate(&mut rng))
        })
        .collect()
}

/// The per-face areas of a mesh along with their sum and maximum.
#[derive(Debug, Clone)]
pub struct FaceAreas {
    areas: Vec<f64>,
    total: f64,
    max: f64,
}

impl FaceAreas {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        Self::from_areas(mesh.face_areas())
    }

    pub fn from_areas(areas: Vec<f64>) -> Self {
        let total = areas.par_iter().sum();
        let max = areas.par_iter().copied().reduce(|| 0.0, f64::max);
        Self { areas, total, max }
    }

    pub fn areas(&self) -> &[f64] {
        &self.areas
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Picks a face index with probability proportional to its area, by drawing a uniform index
    /// and accepting it with probability `area / max_area`. Must not be called when every face
    /// has zero area.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> usize {
        loop {
            let index = rng.random_range(0..self.areas.len());
            if rng.random::<f64>() < self.areas[index] / self.max {
                return index;
            }
        }
    }
}

/// Draws barycentric weights for a point uniformly distributed over the area of a triangle. The
/// square root on the first variate is what makes the distribution uniform over area rather than
/// over the weights themselves.
pub fn sample_barycentric<R: Rng>(rng: &mut R) -> [f64; 3] {
    let r1 = rng.random::<f64>().sqrt();
    let a = 1.0 - r1;
    let b = rng.random::<f64>() * r1;
    [a, b, 1.0 - a - b]
}

/// The number of surface candidates to generate: `density` candidates per disk of `min_radius`
/// worth of area.
pub fn surface_candidate_count(total_area: f64, min_radius: f64, density: f64) -> usize {
    let disk = std::f64::consts::PI * min_radius * min_radius;
    (density * total_area / disk) as usize
}

/// Generates `count` candidates on the surface of the mesh, area-weighted across faces. The
/// caller must ensure the mesh has a positive total area.
pub fn surface_candidates(
    mesh: &Mesh,
    areas: &FaceAreas,
    count: usize,
    seed: u64,
) -> Vec<Candidate> {
    generate_chunked(count, seed, |rng| {
        let face = areas.pick(rng);
        let weights = sample_barycentric(rng);
        let t = mesh.triangle(face);
        let position = from_barycentric(&t.a, &t.b, &t.c, weights);
        Some(Candidate::new(position, Some(face as u32)))
    })
}

/// The number of volume candidates to generate: `density` candidates per grid cell of volume.
pub fn volume_candidate_count(volume: f64, cell_size: f64, density: f64) -> usize {
    (density * volume / cell_size.powi(3)) as usize
}

/// Draws `count` points uniformly inside `bounds` and keeps the ones which lie at least
/// `part_radius` inside the distance field.
pub fn volume_candidates<F: DistanceField + ?Sized>(
    bounds: &Aabb3,
    field: &F,
    part_radius: f64,
    count: usize,
    seed: u64,
) -> Vec<Candidate> {
    let extents = bounds.extents();
    generate_chunked(count, seed, |rng| {
        let offset = Vector3::new(
            rng.random::<f64>() * extents.x,
            rng.random::<f64>() * extents.y,
            rng.random::<f64>() * extents.z,
        );
        let position = bounds.mins + offset;
        is_inside(field, &position, part_radius).then(|| Candidate::new(position, None))
    })
}

/// True if `p` lies at least `part_radius` inside the field. Sentinel values for queries outside
/// of the field's domain never pass.
pub fn is_inside<F: DistanceField + ?Sized>(field: &F, p: &Point3, part_radius: f64) -> bool {
    field.distance(p) + part_radius < 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom3::FAR_OUTSIDE;
    use approx::assert_relative_eq;

    #[test]
    fn barycentric_weights_are_convex() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..1000 {
            let w = sample_barycentric(&mut rng);
            assert!(w.iter().all(|v| (0.0..=1.0).contains(v)));
            assert_relative_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn barycentric_samples_are_area_uniform() {
        // The sub-triangle next to vertex `a` with half the edge length has a quarter of the
        // area, so a quarter of the samples should land in it.
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let n = 40_000;
        let near_a = (0..n)
            .filter(|_| sample_barycentric(&mut rng)[0] > 0.5)
            .count();
        let fraction = near_a as f64 / n as f64;
        assert!((fraction - 0.25).abs() < 0.02, "fraction {}", fraction);
    }

    #[test]
    fn face_picking_follows_area() {
        let areas = FaceAreas::from_areas(vec![1.0, 3.0, 0.0]);
        assert_eq!(areas.total(), 4.0);
        assert_eq!(areas.max(), 3.0);

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut counts = [0usize; 3];
        for _ in 0..20_000 {
            counts[areas.pick(&mut rng)] += 1;
        }
        assert_eq!(counts[2], 0);
        let ratio = counts[1] as f64 / counts[0] as f64;
        assert!((ratio - 3.0).abs() < 0.3, "ratio {}", ratio);
    }

    #[test]
    fn surface_candidates_lie_on_their_face() {
        let mesh = Mesh::create_box(&Point3::origin(), &Point3::new(1.0, 2.0, 0.5));
        let areas = FaceAreas::from_mesh(&mesh);
        let normals = mesh.face_normals();
        let candidates = surface_candidates(&mesh, &areas, 5000, 1);

        assert_eq!(candidates.len(), 5000);
        for c in &candidates {
            let face = c.face.unwrap() as usize;
            let t = mesh.triangle(face);
            assert_relative_eq!(normals[face].dot(&(c.position - t.a)), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn generation_is_reproducible() {
        let mesh = Mesh::create_rect((0.0, 0.0), (1.0, 1.0), 0.0);
        let areas = FaceAreas::from_mesh(&mesh);
        let a = surface_candidates(&mesh, &areas, 3 * CHUNK_SIZE + 17, 99);
        let b = surface_candidates(&mesh, &areas, 3 * CHUNK_SIZE + 17, 99);
        let c = surface_candidates(&mesh, &areas, 3 * CHUNK_SIZE + 17, 100);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn volume_candidates_are_filtered() {
        let bounds = Aabb3::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let sphere = |p: &Point3| p.coords.norm() - 1.0;
        let candidates = volume_candidates(&bounds, &sphere, 0.25, 10_000, 2);

        // Roughly the volume ratio of a 0.75 sphere to the 2x2x2 box
        let expected = 10_000.0 * (4.0 / 3.0 * std::f64::consts::PI * 0.75_f64.powi(3)) / 8.0;
        assert!((candidates.len() as f64 - expected).abs() < 0.1 * expected);

        for c in &candidates {
            assert!(c.position.coords.norm() < 0.75);
            assert!(c.face.is_none());
        }
    }

    #[test]
    fn far_outside_is_never_inside() {
        let field = |_: &Point3| FAR_OUTSIDE;
        assert!(!is_inside(&field, &Point3::origin(), 0.1));
    }

    #[test]
    fn candidate_counts() {
        assert_eq!(surface_candidate_count(1.0, 0.1, 40.0), 1273);
        assert_eq!(volume_candidate_count(1.0, 0.5, 10.0), 80);
    }
}
