//! Parallel dart-throwing Poisson-disk sampling.
//!
//! All three samplers share the same pipeline: random candidates are generated (on the surface
//! or inside the volume), each is assigned the integer cell of a uniform grid, the candidates
//! are sorted so that every cell's candidates are contiguous, one bucket is opened per occupied
//! cell, and the dart-throwing engine then tries the buckets' candidates one trial at a time,
//! accepting each candidate that has no accepted neighbor within the minimum radius.
//!
//! The grid cell edge is `min_radius / sqrt(3)`, so a cell's diagonal equals the minimum radius
//! and at most one sample can be accepted per cell. Any two points closer than the minimum radius
//! are at most two cells apart on every axis, which bounds the neighbor search to the 5x5x5 block
//! around a cell. Cells whose coordinates agree modulo 3 on every axis are at least three cells
//! apart, so the buckets of one of these 27 phase groups can be checked concurrently.

pub mod candidates;
pub mod cell;
pub mod dart;
pub mod grid;
pub mod oracle;
pub mod sorter;
mod surface;
mod volume;

pub use surface::{SurfaceSample, sample_surface};
pub use volume::{
    sample_volume_dense, sample_volume_dense_with, sample_volume_random,
    sample_volume_random_with,
};

pub(crate) use surface::sample_mesh_surface;
pub(crate) use volume::{sample_mesh_volume_dense, sample_mesh_volume_random};
