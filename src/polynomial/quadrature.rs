//! Quadrature on edges and triangles.
//!
//! Edges use Gauss-Legendre rules on [-1, 1] mapped onto the segment, so a
//! rule integrates `Σ f(x_i) w_i · L/2`. Triangles use the 4-point
//! Strang-Fix rule (one negative weight) which is exact for cubics; its
//! weights sum to one and are scaled by the triangle area.

use crate::types::Point2;

/// Largest number of Gauss points available on an edge.
pub const MAX_LINE_POINTS: usize = 4;

const GAUSS_1_POINTS: [f64; 1] = [0.0];
const GAUSS_1_WEIGHTS: [f64; 1] = [2.0];

const GAUSS_2_POINTS: [f64; 2] = [-0.577_350_269_189_625_7, 0.577_350_269_189_625_7];
const GAUSS_2_WEIGHTS: [f64; 2] = [1.0, 1.0];

const GAUSS_3_POINTS: [f64; 3] = [-0.774_596_669_241_483_4, 0.0, 0.774_596_669_241_483_4];
const GAUSS_3_WEIGHTS: [f64; 3] = [
    0.555_555_555_555_555_6,
    0.888_888_888_888_888_9,
    0.555_555_555_555_555_6,
];

const GAUSS_4_POINTS: [f64; 4] = [
    -0.861_136_311_594_052_6,
    -0.339_981_043_584_856_3,
    0.339_981_043_584_856_3,
    0.861_136_311_594_052_6,
];
const GAUSS_4_WEIGHTS: [f64; 4] = [
    0.347_854_845_137_453_8,
    0.652_145_154_862_546_1,
    0.652_145_154_862_546_1,
    0.347_854_845_137_453_8,
];

/// Barycentric coordinates of the triangle rule.
pub const TRIANGLE_BARYCENTRIC: [[f64; 3]; 4] = [
    [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0],
    [0.6, 0.2, 0.2],
    [0.2, 0.2, 0.6],
    [0.2, 0.6, 0.2],
];

/// Weights of the triangle rule (sum to one).
pub const TRIANGLE_WEIGHTS: [f64; 4] = [-27.0 / 48.0, 25.0 / 48.0, 25.0 / 48.0, 25.0 / 48.0];

/// Gauss-Legendre rule on the reference interval [-1, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineRule {
    points: &'static [f64],
    weights: &'static [f64],
}

impl LineRule {
    /// Rule with `n_points` Gauss points, clamped to `1..=MAX_LINE_POINTS`.
    pub fn gauss(n_points: usize) -> Self {
        match n_points.clamp(1, MAX_LINE_POINTS) {
            1 => Self {
                points: &GAUSS_1_POINTS,
                weights: &GAUSS_1_WEIGHTS,
            },
            2 => Self {
                points: &GAUSS_2_POINTS,
                weights: &GAUSS_2_WEIGHTS,
            },
            3 => Self {
                points: &GAUSS_3_POINTS,
                weights: &GAUSS_3_WEIGHTS,
            },
            _ => Self {
                points: &GAUSS_4_POINTS,
                weights: &GAUSS_4_WEIGHTS,
            },
        }
    }

    /// Cheapest rule that integrates polynomials of `degree` exactly.
    pub fn for_degree(degree: usize) -> Self {
        Self::gauss(degree / 2 + 1)
    }

    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    /// Reference abscissae in [-1, 1].
    pub fn points(&self) -> &'static [f64] {
        self.points
    }

    pub fn weights(&self) -> &'static [f64] {
        self.weights
    }

    /// Physical points and scaled weights on the segment `a`–`b`.
    ///
    /// Summing `f(p) * w` over the result integrates `f` along the segment.
    pub fn segment_points(&self, a: Point2, b: Point2) -> Vec<(Point2, f64)> {
        let center = a.midpoint(b);
        let half = (b - a) * 0.5;
        let jacobian = 0.5 * a.distance(b);
        self.points
            .iter()
            .zip(self.weights)
            .map(|(&t, &w)| (center + half * t, w * jacobian))
            .collect()
    }

    /// Integrate a scalar function along the segment `a`–`b`.
    pub fn integrate_segment<F>(&self, a: Point2, b: Point2, mut f: F) -> f64
    where
        F: FnMut(Point2) -> f64,
    {
        self.segment_points(a, b)
            .into_iter()
            .map(|(p, w)| f(p) * w)
            .sum()
    }
}

/// Physical points and area-scaled weights of the triangle rule.
pub fn triangle_points(a: Point2, b: Point2, c: Point2) -> [(Point2, f64); 4] {
    let area = 0.5 * (b - a).cross(c - a).abs();
    let mut out = [(Point2::ORIGIN, 0.0); 4];
    for (slot, (bary, &w)) in out
        .iter_mut()
        .zip(TRIANGLE_BARYCENTRIC.iter().zip(TRIANGLE_WEIGHTS.iter()))
    {
        let p = Point2::new(
            bary[0] * a.x + bary[1] * b.x + bary[2] * c.x,
            bary[0] * a.y + bary[1] * b.y + bary[2] * c.y,
        );
        *slot = (p, w * area);
    }
    out
}

/// Integrate a scalar function over the triangle `abc`.
pub fn integrate_triangle<F>(a: Point2, b: Point2, c: Point2, mut f: F) -> f64
where
    F: FnMut(Point2) -> f64,
{
    triangle_points(a, b, c)
        .iter()
        .map(|&(p, w)| f(p) * w)
        .sum()
}
