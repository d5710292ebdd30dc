//! Derived geometric constructions on points and triangles.
//!
//! These are plain floating-point computations; none of them make topology
//! decisions, so they do not go through a [`Kernel`](super::Kernel).

use nalgebra::{Point2, Vector2};

/// Distance between two points.
#[inline]
pub fn distance(p: &Point2<f64>, q: &Point2<f64>) -> f64 {
    nalgebra::distance(p, q)
}

/// Linear interpolation: `p` at `t = 0`, `q` at `t = 1`.
#[inline]
pub fn interpolate(p: &Point2<f64>, q: &Point2<f64>, t: f64) -> Point2<f64> {
    p + (q - p) * t
}

/// Midpoint of a segment.
#[inline]
pub fn midpoint(p: &Point2<f64>, q: &Point2<f64>) -> Point2<f64> {
    nalgebra::center(p, q)
}

/// Signed area of a triangle; positive when counter-clockwise.
#[inline]
pub fn signed_area(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    0.5 * ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x))
}

/// Unsigned area of a triangle.
#[inline]
pub fn triangle_area(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    signed_area(a, b, c).abs()
}

/// Center of the circle through three points, or `None` if they are collinear.
pub fn circumcenter(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Option<Point2<f64>> {
    let b = b - a;
    let c = c - a;
    let d = 2.0 * (b.x * c.y - b.y * c.x);
    if d == 0.0 {
        return None;
    }

    let b2 = b.norm_squared();
    let c2 = c.norm_squared();
    let ux = (c.y * b2 - b.y * c2) / d;
    let uy = (b.x * c2 - c.x * b2) / d;
    Some(a + Vector2::new(ux, uy))
}

/// Radius of the circle through three points; infinite for collinear points.
pub fn circumradius(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let area = triangle_area(a, b, c);
    if area == 0.0 {
        return f64::INFINITY;
    }
    distance(a, b) * distance(b, c) * distance(c, a) / (4.0 * area)
}

/// Interior angles at `a`, `b` and `c`, in radians, by the law of cosines.
///
/// Degenerate triangles with a zero-length side report zero angles.
pub fn triangle_angles(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> [f64; 3] {
    // Side lengths opposite each vertex.
    let la = distance(b, c);
    let lb = distance(c, a);
    let lc = distance(a, b);
    if la == 0.0 || lb == 0.0 || lc == 0.0 {
        return [0.0; 3];
    }

    let angle = |opposite: f64, s1: f64, s2: f64| {
        ((s1 * s1 + s2 * s2 - opposite * opposite) / (2.0 * s1 * s2))
            .clamp(-1.0, 1.0)
            .acos()
    };

    [angle(la, lb, lc), angle(lb, lc, la), angle(lc, la, lb)]
}

/// Smallest interior angle of a triangle, in radians.
pub fn min_angle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let [alpha, beta, gamma] = triangle_angles(a, b, c);
    alpha.min(beta).min(gamma)
}

/// Whether `p` encroaches upon segment `u-v`, i.e. lies inside its diametral circle.
#[inline]
pub fn is_encroached(u: &Point2<f64>, v: &Point2<f64>, p: &Point2<f64>) -> bool {
    (u - p).dot(&(v - p)) < 0.0
}

/// Apex of the isosceles triangle on the left of `a -> b` whose legs have the given length.
///
/// With `length == |ab|` this is the third vertex of the equilateral triangle
/// erected on the segment.
pub fn ideal_point(a: &Point2<f64>, b: &Point2<f64>, length: f64) -> Point2<f64> {
    let mid = midpoint(a, b);
    let ab = b - a;
    let base = ab.norm();
    if base == 0.0 {
        return mid;
    }
    let half = 0.5 * base;
    let height = (length * length - half * half).max(0.0).sqrt();
    let normal = Vector2::new(-ab.y, ab.x) / base;
    mid + normal * height
}

/// Shape quality used for finite-element meshes: inradius over longest edge,
/// normalized so that an equilateral triangle scores 1.
pub fn fem_quality(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let la = distance(a, b);
    let lb = distance(b, c);
    let lc = distance(c, a);
    let h_max = la.max(lb).max(lc);
    let s = 0.5 * (la + lb + lc);
    if h_max == 0.0 || s == 0.0 {
        return 0.0;
    }
    let inradius = ((s - la) * (s - lb) * (s - lc) / s).max(0.0).sqrt();
    2.0 * 3f64.sqrt() * inradius / h_max
}

/// Off-center of a counter-clockwise triangle.
///
/// The point lies on the perpendicular bisector of the shortest edge, at
/// `beta * |edge|` from its midpoint, unless the circumcenter is closer to
/// that edge, in which case the circumcenter is returned.
pub fn offcenter(
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    beta: f64,
) -> Option<Point2<f64>> {
    let center = circumcenter(a, b, c)?;

    let edges = [(a, b), (b, c), (c, a)];
    let (u, v) = edges
        .iter()
        .copied()
        .min_by(|(p, q), (r, s)| distance(p, q).total_cmp(&distance(r, s)))?;

    let uv = v - u;
    let off = midpoint(u, v) + Vector2::new(-uv.y, uv.x) * beta;
    if distance(u, &off) < distance(u, &center) {
        Some(off)
    } else {
        Some(center)
    }
}

/// Off-center distance factor for a target minimum angle (radians).
pub fn offcenter_beta(min_angle: f64) -> f64 {
    let cos = min_angle.cos();
    if cos >= 1.0 {
        return 0.0;
    }
    0.475 * ((1.0 + cos) / (1.0 - cos)).sqrt()
}

/// Axis-aligned bounding box of a set of points.
pub fn bounding_box<'a, I>(points: I) -> Option<(Point2<f64>, Point2<f64>)>
where
    I: IntoIterator<Item = &'a Point2<f64>>,
{
    points.into_iter().fold(None, |acc, p| match acc {
        None => Some((*p, *p)),
        Some((min, max)) => Some((
            Point2::new(min.x.min(p.x), min.y.min(p.y)),
            Point2::new(max.x.max(p.x), max.y.max(p.y)),
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4};

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn test_interpolate() {
        let q = interpolate(&p(0.0, 0.0), &p(2.0, 4.0), 0.25);
        assert_relative_eq!(q, p(0.5, 1.0));
        assert_relative_eq!(midpoint(&p(0.0, 0.0), &p(2.0, 4.0)), p(1.0, 2.0));
    }

    #[test]
    fn test_circumcenter_right_triangle() {
        let cc = circumcenter(&p(0.0, 0.0), &p(2.0, 0.0), &p(0.0, 2.0)).unwrap();
        assert_relative_eq!(cc, p(1.0, 1.0));
        assert_relative_eq!(
            circumradius(&p(0.0, 0.0), &p(2.0, 0.0), &p(0.0, 2.0)),
            2f64.sqrt()
        );
    }

    #[test]
    fn test_circumcenter_collinear() {
        assert!(circumcenter(&p(0.0, 0.0), &p(1.0, 1.0), &p(2.0, 2.0)).is_none());
        assert!(circumradius(&p(0.0, 0.0), &p(1.0, 1.0), &p(2.0, 2.0)).is_infinite());
    }

    #[test]
    fn test_triangle_angles() {
        let [a, b, c] = triangle_angles(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.0, 1.0));
        assert_relative_eq!(a, FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(b, FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(c, FRAC_PI_4, epsilon = 1e-12);

        let h = 3f64.sqrt() / 2.0;
        let m = min_angle(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.5, h));
        assert_relative_eq!(m, FRAC_PI_3, epsilon = 1e-12);
    }

    #[test]
    fn test_encroachment() {
        let u = p(0.0, 0.0);
        let v = p(2.0, 0.0);
        assert!(!is_encroached(&u, &v, &p(1.0, 1.5)));
        assert!(is_encroached(&u, &v, &p(1.0, 0.0)));
        assert!(is_encroached(&u, &v, &p(1.0, 0.5)));
        // On the diametral circle itself is not strictly inside.
        assert!(!is_encroached(&u, &v, &p(1.0, 1.0)));
    }

    #[test]
    fn test_ideal_point_equilateral() {
        let a = p(0.0, 0.0);
        let b = p(1.0, 0.0);
        let apex = ideal_point(&a, &b, 1.0);
        assert_relative_eq!(apex, p(0.5, 3f64.sqrt() / 2.0), epsilon = 1e-12);
        assert_relative_eq!(fem_quality(&a, &b, &apex), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fem_quality_degrades() {
        let q = fem_quality(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.5, 0.05));
        assert!(q > 0.0 && q < 0.2, "flat triangle quality {}", q);
    }

    #[test]
    fn test_offcenter_skinny_triangle() {
        let a = p(0.0, 0.0);
        let b = p(1.0, 0.0);
        let c = p(0.5, 8.0);
        let beta = offcenter_beta(20f64.to_radians());
        let off = offcenter(&a, &b, &c, beta).unwrap();
        let cc = circumcenter(&a, &b, &c).unwrap();
        // Off-center sits on the bisector of the short edge, closer than the circumcenter.
        assert_relative_eq!(off.x, 0.5, epsilon = 1e-12);
        assert!(off.y < cc.y);
    }

    #[test]
    fn test_offcenter_well_shaped_uses_circumcenter() {
        let a = p(0.0, 0.0);
        let b = p(1.0, 0.0);
        let c = p(0.5, 3f64.sqrt() / 2.0);
        let beta = offcenter_beta(20f64.to_radians());
        let off = offcenter(&a, &b, &c, beta).unwrap();
        assert_relative_eq!(off, circumcenter(&a, &b, &c).unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_bounding_box() {
        let pts = [p(1.0, -1.0), p(-2.0, 3.0), p(0.5, 0.5)];
        let (min, max) = bounding_box(&pts).unwrap();
        assert_eq!(min, p(-2.0, -1.0));
        assert_eq!(max, p(1.0, 3.0));
        assert!(bounding_box(&[]).is_none());
    }
}
