//! Parameters for the surface and volume samplers, and a bundle of all of them which can be
//! loaded from JSON.

use crate::Result;
use crate::errors::{SamplingError, require_positive};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_RADIUS: f64 = 0.02;
const DEFAULT_TRIALS: u32 = 10;
const DEFAULT_DENSITY: f64 = 40.0;
const DEFAULT_SDF_RESOLUTION: [u32; 3] = [20, 20, 20];

/// The metric used to compare the distance between two surface samples against the minimum
/// radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceNorm {
    /// Straight-line distance through space.
    Euclidean,

    /// Euclidean distance corrected by the angle between the two samples' face normals, which
    /// approximates the length of the path along a curved surface.
    Geodesic,
}

impl DistanceNorm {
    /// The numeric code of the metric: 0 for Euclidean, 1 for geodesic.
    pub fn code(&self) -> u32 {
        match self {
            DistanceNorm::Euclidean => 0,
            DistanceNorm::Geodesic => 1,
        }
    }
}

impl TryFrom<u32> for DistanceNorm {
    type Error = SamplingError;

    fn try_from(value: u32) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(DistanceNorm::Euclidean),
            1 => Ok(DistanceNorm::Geodesic),
            other => Err(SamplingError::UnsupportedDistanceNorm(other)),
        }
    }
}

/// Parameters for Poisson-disk sampling of a mesh surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceParams {
    pub min_radius: f64,
    pub num_trials: u32,
    pub initial_points_density: f64,
    pub distance_norm: DistanceNorm,
    pub seed: Option<u64>,
}

impl SurfaceParams {
    /// Creates a new set of parameters for surface sampling.
    ///
    /// # Arguments
    ///
    /// * `min_radius`: no two accepted samples will be closer than this under the selected
    ///   metric
    /// * `num_trials`: the number of candidates tried in each grid cell before it is given up on.
    ///   More trials resolve contention in dense regions at the cost of run time.
    /// * `initial_points_density`: the oversampling factor of the random candidates, as the
    ///   number of candidates per disk of `min_radius` worth of surface area
    /// * `distance_norm`: the metric used for the spacing check
    ///
    /// returns: SurfaceParams
    pub fn new(
        min_radius: f64,
        num_trials: u32,
        initial_points_density: f64,
        distance_norm: DistanceNorm,
    ) -> Self {
        Self {
            min_radius,
            num_trials,
            initial_points_density,
            distance_norm,
            seed: None,
        }
    }

    /// Creates a set of default parameters, requiring only the minimum radius. Uses 10 trials, a
    /// density of 40 and the geodesic metric.
    pub fn defaults(min_radius: f64) -> Self {
        Self::new(
            min_radius,
            DEFAULT_TRIALS,
            DEFAULT_DENSITY,
            DistanceNorm::Geodesic,
        )
    }

    /// Fix the random seed, making the result reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> std::result::Result<(), SamplingError> {
        require_positive("min_radius", self.min_radius)?;
        require_positive("initial_points_density", self.initial_points_density)
    }
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self::defaults(DEFAULT_RADIUS)
    }
}

/// Parameters for filling a mesh volume with randomly placed, non-overlapping particles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeRandomParams {
    pub part_radius: f64,
    pub num_trials: u32,
    pub initial_points_density: f64,
    pub invert: bool,
    pub sdf_resolution: [u32; 3],
    pub seed: Option<u64>,
}

impl VolumeRandomParams {
    /// Creates a new set of parameters for random volume sampling.
    ///
    /// # Arguments
    ///
    /// * `part_radius`: the particle radius. Particle centers stay at least this far inside the
    ///   surface and at least twice this far from each other.
    /// * `num_trials`: the number of candidates tried in each grid cell
    /// * `initial_points_density`: the number of random candidates per grid cell volume
    /// * `invert`: sample the region between the mesh and its bounding box instead of the
    ///   interior
    /// * `sdf_resolution`: the number of distance field cells along each axis
    ///
    /// returns: VolumeRandomParams
    pub fn new(
        part_radius: f64,
        num_trials: u32,
        initial_points_density: f64,
        invert: bool,
        sdf_resolution: [u32; 3],
    ) -> Self {
        Self {
            part_radius,
            num_trials,
            initial_points_density,
            invert,
            sdf_resolution,
            seed: None,
        }
    }

    pub fn defaults(part_radius: f64) -> Self {
        Self::new(
            part_radius,
            DEFAULT_TRIALS,
            DEFAULT_DENSITY,
            false,
            DEFAULT_SDF_RESOLUTION,
        )
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The minimum distance between two particle centers.
    pub fn min_radius(&self) -> f64 {
        2.0 * self.part_radius
    }

    pub fn validate(&self) -> std::result::Result<(), SamplingError> {
        require_positive("part_radius", self.part_radius)?;
        require_positive("initial_points_density", self.initial_points_density)?;
        validate_resolution(self.sdf_resolution)
    }
}

impl Default for VolumeRandomParams {
    fn default() -> Self {
        Self::defaults(DEFAULT_RADIUS)
    }
}

/// Parameters for filling a mesh volume with particles on a regular lattice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeDenseParams {
    pub part_radius: f64,

    /// Lattice spacing, `2 * part_radius` when not given.
    pub cell_size: Option<f64>,

    /// Keep at most this many particles, in lattice order (z slowest, x fastest).
    pub max_samples: Option<usize>,
    pub invert: bool,
    pub sdf_resolution: [u32; 3],
}

impl VolumeDenseParams {
    pub fn new(
        part_radius: f64,
        cell_size: Option<f64>,
        invert: bool,
        sdf_resolution: [u32; 3],
    ) -> Self {
        Self {
            part_radius,
            cell_size,
            max_samples: None,
            invert,
            sdf_resolution,
        }
    }

    pub fn defaults(part_radius: f64) -> Self {
        Self::new(part_radius, None, false, DEFAULT_SDF_RESOLUTION)
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = Some(max_samples);
        self
    }

    /// The lattice spacing actually used.
    pub fn effective_cell_size(&self) -> f64 {
        self.cell_size.unwrap_or(2.0 * self.part_radius)
    }

    pub fn validate(&self) -> std::result::Result<(), SamplingError> {
        require_positive("part_radius", self.part_radius)?;
        require_positive("cell_size", self.effective_cell_size())?;
        validate_resolution(self.sdf_resolution)
    }
}

impl Default for VolumeDenseParams {
    fn default() -> Self {
        Self::defaults(DEFAULT_RADIUS)
    }
}

fn validate_resolution(resolution: [u32; 3]) -> std::result::Result<(), SamplingError> {
    if resolution.contains(&0) {
        Err(SamplingError::invalid(
            "sdf_resolution",
            format!("every axis needs at least one cell, got {resolution:?}"),
        ))
    } else {
        Ok(())
    }
}

/// The parameters of all three samplers. Any section or field missing from a JSON document takes
/// its default value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub surface: SurfaceParams,
    pub volume_random: VolumeRandomParams,
    pub volume_dense: VolumeDenseParams,
}

impl SamplerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, DistanceNorm::Euclidean)]
    #[test_case(1, DistanceNorm::Geodesic)]
    fn distance_norm_codes(code: u32, expected: DistanceNorm) {
        let norm = DistanceNorm::try_from(code).unwrap();
        assert_eq!(norm, expected);
        assert_eq!(norm.code(), code);
    }

    #[test_case(2)]
    #[test_case(17)]
    #[test_case(u32::MAX)]
    fn unknown_distance_norm_is_rejected(code: u32) {
        let result = DistanceNorm::try_from(code);
        assert!(matches!(result, Err(SamplingError::UnsupportedDistanceNorm(c)) if c == code));
    }

    #[test_case(0.0)]
    #[test_case(-0.1)]
    #[test_case(f64::NAN)]
    #[test_case(f64::INFINITY)]
    fn bad_radius_is_rejected(radius: f64) {
        assert!(SurfaceParams::defaults(radius).validate().is_err());
        assert!(VolumeRandomParams::defaults(radius).validate().is_err());
        assert!(VolumeDenseParams::defaults(radius).validate().is_err());
    }

    #[test]
    fn dense_cell_size_defaults_to_diameter() {
        let params = VolumeDenseParams::defaults(0.1);
        assert_eq!(params.effective_cell_size(), 0.2);
        let params = VolumeDenseParams::new(0.1, Some(0.25), false, [20, 20, 20]);
        assert_eq!(params.effective_cell_size(), 0.25);
    }

    #[test]
    fn partial_json_uses_defaults() -> Result<()> {
        let config = SamplerConfig::from_json_str(
            r#"{
                "surface": { "min_radius": 0.1, "distance_norm": "euclidean" },
                "volume_dense": { "part_radius": 0.05, "max_samples": 100 }
            }"#,
        )?;

        assert_eq!(config.surface.min_radius, 0.1);
        assert_eq!(config.surface.num_trials, 10);
        assert_eq!(config.surface.initial_points_density, 40.0);
        assert_eq!(config.surface.distance_norm, DistanceNorm::Euclidean);
        assert_eq!(config.surface.seed, None);

        assert_eq!(config.volume_random, VolumeRandomParams::default());
        assert_eq!(config.volume_dense.part_radius, 0.05);
        assert_eq!(config.volume_dense.max_samples, Some(100));
        assert_eq!(config.volume_dense.sdf_resolution, [20, 20, 20]);
        Ok(())
    }

    #[test]
    fn json_round_trip() -> Result<()> {
        let mut config = SamplerConfig::default();
        config.surface = SurfaceParams::defaults(0.3).with_seed(7);
        let text = config.to_json_string()?;
        assert_eq!(SamplerConfig::from_json_str(&text)?, config);
        Ok(())
    }

    #[test]
    fn load_from_file() -> Result<()> {
        let path = std::env::temp_dir().join(format!("meshpds-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "volume_random": { "part_radius": 0.4, "invert": true } }"#)?;
        let config = SamplerConfig::from_json_file(&path);
        std::fs::remove_file(&path)?;

        let config = config?;
        assert_eq!(config.volume_random.part_radius, 0.4);
        assert!(config.volume_random.invert);
        assert_eq!(config.surface, SurfaceParams::default());
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(SamplerConfig::from_json_file("/nonexistent/meshpds.json").is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SamplerConfig::from_json_str("{ \"surface\": 3 }").is_err());
    }
}
