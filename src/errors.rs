use thiserror::Error;

/// Errors raised by the samplers when their input cannot be processed. Degenerate but valid
/// input (an empty mesh, a zero area surface, a flat volume) is not an error and simply yields an
/// empty sample set.
#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("unsupported distance norm {0}, expected 0 (euclidean) or 1 (geodesic)")]
    UnsupportedDistanceNorm(u32),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("face {face} references vertex {index} but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfBounds {
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("quantized coordinate {value} is outside the valid cell range of +/-{limit}")]
    CellOutOfRange { value: f64, limit: i32 },

    #[error("could not build the distance field: {0}")]
    DistanceField(String),
}

impl SamplingError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Fails with `InvalidParameter` unless the value is finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<(), SamplingError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SamplingError::invalid(
            name,
            format!("must be finite and greater than zero, got {value}"),
        ))
    }
}
