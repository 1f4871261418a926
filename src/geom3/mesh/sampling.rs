use super::Mesh;
use crate::config::{SurfaceParams, VolumeDenseParams, VolumeRandomParams};
use crate::sampling::{
    SurfaceSample, sample_mesh_surface, sample_mesh_volume_dense, sample_mesh_volume_random,
};
use crate::{Point3, Result};

impl Mesh {
    /// Poisson-disk sample the surface of the mesh. Each sample carries the face it was drawn on
    /// and that face's normal.
    ///
    /// # Arguments
    ///
    /// * `params`: the minimum radius, trial count, oversampling density, distance norm and seed
    ///
    /// returns: Result<Vec<SurfaceSample>, Box<dyn Error, Global>>
    ///
    /// # Examples
    ///
    /// ```
    /// use meshpds::{Mesh, Point3, SurfaceParams};
    /// let mesh = Mesh::create_box(&Point3::origin(), &Point3::new(1.0, 1.0, 1.0));
    /// let samples = mesh.sample_poisson_surface(&SurfaceParams::defaults(0.2)).unwrap();
    /// assert!(samples.iter().all(|s| (s.normal.norm() - 1.0).abs() < 1e-12));
    /// ```
    pub fn sample_poisson_surface(&self, params: &SurfaceParams) -> Result<Vec<SurfaceSample>> {
        sample_mesh_surface(self, params)
    }

    /// Fill the volume enclosed by the mesh with randomly placed, non-overlapping particles.
    pub fn sample_volume_random(&self, params: &VolumeRandomParams) -> Result<Vec<Point3>> {
        sample_mesh_volume_random(self, params)
    }

    /// Fill the volume enclosed by the mesh with particles on a regular lattice.
    pub fn sample_volume_dense(&self, params: &VolumeDenseParams) -> Result<Vec<Point3>> {
        sample_mesh_volume_dense(self, params)
    }
}
