//! Integer grid cells, the quantization of positions into them, and the spatial hash used to key
//! them in hash maps.

use crate::errors::SamplingError;
use crate::{Aabb3, Point3, Vector3};
use std::hash::{BuildHasherDefault, Hash, Hasher};

/// Half-width of the range of values [`offset_floor`] accepts. Cell coordinates are measured from
/// the bounding box minimum, so this is also the largest number of cells a sampled region may
/// span along one axis.
pub const CELL_RANGE: i32 = 32768;

/// The number of phase groups, one per combination of cell coordinates modulo 3.
pub const PHASE_COUNT: usize = 27;

/// Floor of `v` computed by shifting into the positive range and truncating, which is only valid
/// for `|v| < CELL_RANGE`. Values outside of that range (and NaN) produce an error instead of
/// wrapping around.
///
/// # Examples
///
/// ```
/// use meshpds::sampling::cell::offset_floor;
/// assert_eq!(offset_floor(2.7).unwrap(), 2);
/// assert_eq!(offset_floor(-0.5).unwrap(), -1);
/// assert!(offset_floor(40000.0).is_err());
/// ```
pub fn offset_floor(v: f64) -> Result<i32, SamplingError> {
    let range = CELL_RANGE as f64;
    if !(v.abs() < range) {
        return Err(SamplingError::CellOutOfRange {
            value: v,
            limit: CELL_RANGE,
        });
    }

    Ok((v + range) as i32 - CELL_RANGE)
}

/// The integer coordinate of one cell of a uniform grid. Ordering is lexicographic over
/// `x`, `y`, `z`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellCoord {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The cell displaced by the given number of cells along each axis.
    pub fn offset(&self, (dx, dy, dz): (i32, i32, i32)) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The index (0..27) of the phase group this cell belongs to.
    pub fn phase(&self) -> usize {
        (self.x.rem_euclid(3) + 3 * self.y.rem_euclid(3) + 9 * self.z.rem_euclid(3)) as usize
    }

    /// Combines the three axes with large odd multipliers, then scrambles the sum so that the high
    /// bits (which hash tables use for tagging) depend on every axis.
    pub fn spatial_hash(&self) -> u64 {
        let sum = (self.x as i64)
            .wrapping_mul(73_856_093)
            .wrapping_add((self.y as i64).wrapping_mul(19_349_663))
            .wrapping_add((self.z as i64).wrapping_mul(83_492_791));
        (sum as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

impl Hash for CellCoord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.spatial_hash());
    }
}

/// A hasher that passes through the value computed by [`CellCoord::spatial_hash`]. Other input
/// is folded in with the same odd-multiplier mixing so the hasher stays usable for any key.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpatialHasher(u64);

impl Hasher for SpatialHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = (self.0 ^ b as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        }
    }

    fn write_u64(&mut self, i: u64) {
        self.0 = if self.0 == 0 {
            i
        } else {
            (self.0 ^ i).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        };
    }
}

pub type CellBuildHasher = BuildHasherDefault<SpatialHasher>;

/// Maps world positions to grid cells. Cell indices start at 1 for positions at the origin (the
/// bounding box minimum), so every position inside the bounding box gets strictly positive
/// coordinates.
#[derive(Debug, Clone, Copy)]
pub struct CellQuantizer {
    origin: Point3,
    cell_size: f64,
    inv_cell_size: f64,
}

impl CellQuantizer {
    pub fn new(origin: Point3, cell_size: f64) -> Self {
        Self {
            origin,
            cell_size,
            inv_cell_size: 1.0 / cell_size,
        }
    }

    /// A quantizer whose cell diagonal equals `min_radius`, guaranteeing at most one sample per
    /// cell.
    pub fn for_min_radius(origin: Point3, min_radius: f64) -> Self {
        Self::new(origin, min_radius / 3.0_f64.sqrt())
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    pub fn cell_of(&self, p: &Point3) -> Result<CellCoord, SamplingError> {
        let v: Vector3 = (p - self.origin) * self.inv_cell_size;
        Ok(CellCoord::new(
            offset_floor(v.x)? + 1,
            offset_floor(v.y)? + 1,
            offset_floor(v.z)? + 1,
        ))
    }

    /// Fails with `CellOutOfRange` if any corner of `bounds` cannot be quantized. Every point
    /// inside the box then can be, so this is checked before any candidates are generated.
    pub fn check_bounds(&self, bounds: &Aabb3) -> Result<(), SamplingError> {
        self.cell_of(&bounds.mins)?;
        self.cell_of(&bounds.maxs)?;
        Ok(())
    }
}
