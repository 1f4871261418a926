//! Parallel Poisson-disk sampling of triangle meshes.
//!
//! Samples are produced by a race-free parallel dart-throwing scheme (after Bowers et al.,
//! "Parallel Poisson disk sampling with spectrum analysis on surfaces"): an oversampled set of
//! random candidates is bucketed on a uniform grid, and the grid is processed in 27 phase groups
//! whose cells are far enough apart to be checked concurrently without locking.
//!
//! * [`sample_surface`] places points on the mesh surface, no two closer than a minimum radius
//!   under either the Euclidean or an approximate geodesic metric.
//! * [`sample_volume_random`] fills the interior with non-overlapping particles of a given radius.
//! * [`sample_volume_dense`] fills the interior with particles on a regular lattice.

use std::error::Error;

pub mod common;
pub mod config;
pub mod errors;
pub mod geom3;
pub mod sampling;

pub use config::{
    DistanceNorm, SamplerConfig, SurfaceParams, VolumeDenseParams, VolumeRandomParams,
};
pub use errors::SamplingError;
pub use geom3::{Aabb3, DistanceField, Mesh, MeshDistanceField, Point3, UnitVec3, Vector3};
pub use sampling::{
    SurfaceSample, sample_surface, sample_volume_dense, sample_volume_dense_with,
    sample_volume_random, sample_volume_random_with,
};

pub type Result<T> = std::result::Result<T, Box<dyn Error>>;
