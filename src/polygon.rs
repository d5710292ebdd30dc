//! Simple polygons, the input to mesh generation.
//!
//! A [`Polygon`] is an ordered ring of points with an implicit closing edge
//! from the last point back to the first. Mesh generation requires it to be
//! simple and counter-clockwise; [`Polygon::validate`] checks both.

use nalgebra::Point2;

use crate::error::{MeshError, Result};
use crate::geometry::{Kernel, RobustKernel};

/// A closed ring of points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    points: Vec<Point2<f64>>,
}

impl Polygon {
    /// Create a polygon and validate it.
    ///
    /// # Errors
    ///
    /// Returns the first problem reported by [`Polygon::validate`].
    pub fn new(points: Vec<Point2<f64>>) -> Result<Self> {
        let polygon = Self { points };
        polygon.validate()?;
        Ok(polygon)
    }

    /// Wrap points without validation.
    ///
    /// Useful for building a polygon incrementally with [`Polygon::push`].
    pub fn from_points_unchecked(points: Vec<Point2<f64>>) -> Self {
        Self { points }
    }

    /// Append a vertex.
    pub fn push(&mut self, p: Point2<f64>) {
        self.points.push(p);
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the polygon has no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The vertices in order.
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// Consume the polygon and return its vertices.
    pub fn into_points(self) -> Vec<Point2<f64>> {
        self.points
    }

    /// Iterate over the edges as `(start, end)` pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point2<f64>, Point2<f64>)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Signed area (shoelace formula); positive for counter-clockwise order.
    pub fn signed_area(&self) -> f64 {
        0.5 * self
            .edges()
            .map(|(a, b)| a.x * b.y - b.x * a.y)
            .sum::<f64>()
    }

    /// Whether the vertices are listed counter-clockwise.
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// The same polygon with the vertex order reversed.
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self { points }
    }

    /// Total length of all edges.
    pub fn perimeter(&self) -> f64 {
        self.edges().map(|(a, b)| (b - a).norm()).sum()
    }

    /// Validate with the robust kernel.
    ///
    /// Checks, in this order: at least three vertices, no repeated
    /// consecutive vertices and non-zero area, counter-clockwise order, and
    /// no two non-adjacent edges touching or crossing.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(&RobustKernel)
    }

    /// Validate using the given kernel for orientation tests.
    pub fn validate_with<K: Kernel>(&self, kernel: &K) -> Result<()> {
        let n = self.points.len();
        if n < 3 {
            return Err(MeshError::TooFewVertices { count: n });
        }

        for i in 0..n {
            if self.points[i] == self.points[(i + 1) % n] {
                return Err(MeshError::DegeneratePolygon {
                    details: format!("vertices {} and {} coincide", i, (i + 1) % n),
                });
            }
        }

        let area = self.signed_area();
        if area == 0.0 {
            return Err(MeshError::DegeneratePolygon {
                details: "polygon has zero area".to_string(),
            });
        }
        if area < 0.0 {
            return Err(MeshError::NotCounterClockwise);
        }

        for i in 0..n {
            // Skip the neighbours of edge i; edge n-1 is adjacent to edge 0.
            let last = if i == 0 { n - 1 } else { n };
            for j in (i + 2)..last {
                let (a, b) = (self.points[i], self.points[(i + 1) % n]);
                let (c, d) = (self.points[j], self.points[(j + 1) % n]);
                if segments_touch(kernel, &a, &b, &c, &d) {
                    return Err(MeshError::SelfIntersecting { first: i, second: j });
                }
            }
        }

        Ok(())
    }

    /// Axis-aligned rectangle with its lower-left corner at the origin.
    pub fn rectangle(width: f64, height: f64) -> Self {
        Self {
            points: vec![
                Point2::new(0.0, 0.0),
                Point2::new(width, 0.0),
                Point2::new(width, height),
                Point2::new(0.0, height),
            ],
        }
    }

    /// Regular `n`-gon centred on the origin with its first vertex on the positive x axis.
    pub fn regular(n: usize, radius: f64) -> Self {
        let points = (0..n)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / n as f64;
                Point2::new(radius * t.cos(), radius * t.sin())
            })
            .collect();
        Self { points }
    }

    /// Outline of a serif capital letter A in the unit square.
    ///
    /// A non-convex test shape with several sharp input angles.
    pub fn letter_a() -> Self {
        const OUTLINE: [[f64; 2]; 26] = [
            [0.00000000, 0.00000000],
            [0.28533333, 0.00000000],
            [0.28533333, 0.02735978],
            [0.22400000, 0.03556772],
            [0.19733333, 0.05335157],
            [0.18666667, 0.09028728],
            [0.19866667, 0.14637483],
            [0.26800000, 0.32147743],
            [0.64533333, 0.32147743],
            [0.70133333, 0.18467852],
            [0.73200000, 0.08207934],
            [0.72266667, 0.05061560],
            [0.70266667, 0.03556772],
            [0.63200000, 0.02735978],
            [0.63200000, 0.00000000],
            [1.00000000, 0.00000000],
            [1.00000000, 0.02735978],
            [0.95733333, 0.03419973],
            [0.92666667, 0.05335157],
            [0.90133333, 0.09028728],
            [0.50800000, 1.00000000],
            [0.48133333, 1.00000000],
            [0.12933333, 0.15458276],
            [0.07600000, 0.06155951],
            [0.03333333, 0.03283174],
            [0.00000000, 0.02735978],
        ];
        Self {
            points: OUTLINE.iter().map(|&[x, y]| Point2::new(x, y)).collect(),
        }
    }
}

/// Whether closed segments `a-b` and `c-d` share at least one point.
fn segments_touch<K: Kernel>(
    kernel: &K,
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    d: &Point2<f64>,
) -> bool {
    let d1 = kernel.orient2d(c, d, a);
    let d2 = kernel.orient2d(c, d, b);
    let d3 = kernel.orient2d(a, b, c);
    let d4 = kernel.orient2d(a, b, d);

    if d1 * d2 < 0.0 && d3 * d4 < 0.0 {
        return true;
    }

    (d1 == 0.0 && within_box(c, d, a))
        || (d2 == 0.0 && within_box(c, d, b))
        || (d3 == 0.0 && within_box(a, b, c))
        || (d4 == 0.0 && within_box(a, b, d))
}

/// Whether `p`, known to be collinear with `u-v`, lies on the segment.
fn within_box(u: &Point2<f64>, v: &Point2<f64>, p: &Point2<f64>) -> bool {
    p.x >= u.x.min(v.x) && p.x <= u.x.max(v.x) && p.y >= u.y.min(v.y) && p.y <= u.y.max(v.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_rectangle() {
        let poly = Polygon::rectangle(2.0, 3.0);
        assert_eq!(poly.len(), 4);
        assert_relative_eq!(poly.signed_area(), 6.0);
        assert_relative_eq!(poly.perimeter(), 10.0);
        assert!(poly.is_ccw());
        assert!(poly.validate().is_ok());
    }

    #[test]
    fn test_reversed_is_clockwise() {
        let poly = Polygon::rectangle(1.0, 1.0).reversed();
        assert!(!poly.is_ccw());
        assert!(matches!(poly.validate(), Err(MeshError::NotCounterClockwise)));
    }

    #[test]
    fn test_too_few_vertices() {
        let result = Polygon::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]);
        assert!(matches!(result, Err(MeshError::TooFewVertices { count: 2 })));
    }

    #[test]
    fn test_repeated_vertex() {
        let result = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ]);
        assert!(matches!(result, Err(MeshError::DegeneratePolygon { .. })));
    }

    #[test]
    fn test_collinear_is_degenerate() {
        let result = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ]);
        assert!(matches!(result, Err(MeshError::DegeneratePolygon { .. })));
    }

    #[test]
    fn test_bow_tie_self_intersects() {
        // Positive net area, but the first and third edges cross.
        let result = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, -1.0),
            Point2::new(2.0, -0.5),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
        ]);
        assert!(matches!(result, Err(MeshError::SelfIntersecting { .. })));
    }

    #[test]
    fn test_touching_vertex_self_intersects() {
        // Vertex 4 touches edge 0 without crossing it.
        let result = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(2.0, 4.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 4.0),
        ]);
        assert!(matches!(result, Err(MeshError::SelfIntersecting { .. })));
    }

    #[test]
    fn test_letter_a_is_valid() {
        let poly = Polygon::letter_a();
        assert_eq!(poly.len(), 26);
        assert!(poly.validate().is_ok());
    }

    #[test]
    fn test_push_builds_polygon() {
        let mut poly = Polygon::default();
        assert!(poly.is_empty());
        poly.push(Point2::new(0.0, 0.0));
        poly.push(Point2::new(1.0, 0.0));
        poly.push(Point2::new(0.0, 1.0));
        assert_eq!(poly.edges().count(), 3);
        assert!(poly.validate().is_ok());
    }

    proptest! {
        #[test]
        fn regular_polygons_are_valid(n in 3usize..64, radius in 0.1f64..100.0) {
            let poly = Polygon::regular(n, radius);
            prop_assert!(poly.validate().is_ok());
            let expected = 0.5 * n as f64 * radius * radius
                * (std::f64::consts::TAU / n as f64).sin();
            prop_assert!((poly.signed_area() - expected).abs() < 1e-9 * expected.max(1.0));
        }
    }
}
