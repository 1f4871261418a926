pub mod distance_field;
pub mod mesh;

pub use distance_field::{DistanceField, FAR_OUTSIDE, MeshDistanceField};
pub use mesh::Mesh;

pub type Point3 = parry3d_f64::na::Point3<f64>;
pub type Vector3 = parry3d_f64::na::Vector3<f64>;
pub type UnitVec3 = parry3d_f64::na::Unit<Vector3>;
pub type Aabb3 = parry3d_f64::bounding_volume::Aabb;

/// Returns the volume enclosed by an axis-aligned bounding box. Flat or inverted boxes have a
/// volume of zero.
pub fn aabb_volume(aabb: &Aabb3) -> f64 {
    let e = aabb.extents();
    if e.x <= 0.0 || e.y <= 0.0 || e.z <= 0.0 {
        0.0
    } else {
        e.x * e.y * e.z
    }
}

/// Returns a copy of the bounding box grown by `margin` on every side.
pub fn aabb_expanded(aabb: &Aabb3, margin: f64) -> Aabb3 {
    let m = Vector3::repeat(margin);
    Aabb3::new(aabb.mins - m, aabb.maxs + m)
}
