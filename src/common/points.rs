//! Common operations on f64 points in D-dimensional space.

use parry3d_f64::na::Point;

/// Returns the distance between two points in D-dimensional space.
///
/// # Arguments
///
/// * `a`: the first point
/// * `b`: the second point
///
/// returns: f64
///
/// # Examples
///
/// ```
/// use meshpds::common::points::dist;
/// use meshpds::Point3;
/// let a = Point3::new(1.0, 2.0, 0.0);
/// let b = Point3::new(3.0, 2.0, 0.0);
/// assert_eq!(dist(&a, &b), 2.0);
/// ```
pub fn dist<const D: usize>(a: &Point<f64, D>, b: &Point<f64, D>) -> f64 {
    (a - b).norm()
}

/// Returns the point described by the barycentric weights `w` over the corners `a`, `b`, `c`.
/// The weights are expected to sum to one, but this is not checked.
///
/// # Arguments
///
/// * `a`, `b`, `c`: the corners of the triangle
/// * `w`: the weights of `a`, `b` and `c` respectively
///
/// returns: OPoint<f64, Const<{ D }>>
///
/// # Examples
///
/// ```
/// use meshpds::common::points::from_barycentric;
/// use meshpds::Point3;
/// let a = Point3::new(0.0, 0.0, 0.0);
/// let b = Point3::new(2.0, 0.0, 0.0);
/// let c = Point3::new(0.0, 2.0, 0.0);
/// let p = from_barycentric(&a, &b, &c, [0.5, 0.25, 0.25]);
/// assert_eq!(p, Point3::new(0.5, 0.5, 0.0));
/// ```
pub fn from_barycentric<const D: usize>(
    a: &Point<f64, D>,
    b: &Point<f64, D>,
    c: &Point<f64, D>,
    w: [f64; 3],
) -> Point<f64, D> {
    Point::from(a.coords * w[0] + b.coords * w[1] + c.coords * w[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn corners_from_unit_weights() {
        let a = Point3::new(1.0, -1.0, 3.0);
        let b = Point3::new(4.0, 2.0, 0.5);
        let c = Point3::new(-2.0, 7.0, 1.0);

        assert_relative_eq!(from_barycentric(&a, &b, &c, [1.0, 0.0, 0.0]), a);
        assert_relative_eq!(from_barycentric(&a, &b, &c, [0.0, 1.0, 0.0]), b);
        assert_relative_eq!(from_barycentric(&a, &b, &c, [0.0, 0.0, 1.0]), c);
    }

    #[test]
    fn dist_is_symmetric() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(4.0, 6.0, 3.0);
        assert_relative_eq!(dist(&a, &b), 5.0);
        assert_relative_eq!(dist(&b, &a), 5.0);
    }
}
