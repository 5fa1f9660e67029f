//! Zero-mean monomial basis of a triangle for variational reconstruction.
//!
//! For a cell with centroid (x_c, y_c) and bounding-box half extents
//! (Δx, Δy) the local coordinates are
//!
//! ξ = (x - x_c) / Δx,   η = (y - y_c) / Δy
//!
//! and the basis of degree d holds the monomials ξ^a η^b with
//! 1 ≤ a + b ≤ d, each shifted by its cell average so that
//!
//! ∫_cell φ_l dA = 0.
//!
//! A reconstruction is then u(x) = ū + Σ_l c_l φ_l(x), whose cell average is
//! ū for any coefficients. Degree-1 monomials have zero mean at the centroid
//! already and are left untouched.
//!
//! Periodic neighbours are evaluated by shifting the query point back into
//! the frame of the real cell, so a basis never needs to be rebuilt for a
//! translated copy of its triangle.

use faer::Mat;

use crate::polynomial::{binomial, falling_factorial, integrate_triangle, monomial_exponents};
use crate::types::Point2;

/// Reconstruction basis of one triangle.
#[derive(Clone, Debug)]
pub struct VrBasis2D {
    degree: usize,
    center: Point2,
    inv_dx: f64,
    inv_dy: f64,
    exponents: Vec<(u32, u32)>,
    /// Cell average of each raw monomial (zero for degree 1).
    means: Vec<f64>,
}

impl VrBasis2D {
    /// Build the basis of `degree` for the triangle with the given vertices.
    ///
    /// The triangle must have positive area; degree must not exceed
    /// [`MAX_DEGREE`](crate::polynomial::MAX_DEGREE).
    pub fn new(degree: usize, vertices: [Point2; 3], center: Point2) -> Self {
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for v in &vertices {
            x_min = x_min.min(v.x);
            x_max = x_max.max(v.x);
            y_min = y_min.min(v.y);
            y_max = y_max.max(v.y);
        }
        let inv_dx = 2.0 / (x_max - x_min);
        let inv_dy = 2.0 / (y_max - y_min);

        let exponents = monomial_exponents(degree);
        let mut basis = Self {
            degree,
            center,
            inv_dx,
            inv_dy,
            means: vec![0.0; exponents.len()],
            exponents,
        };

        let [a, b, c] = vertices;
        let area = 0.5 * (b - a).cross(c - a).abs();
        for l in 0..basis.exponents.len() {
            let (ea, eb) = basis.exponents[l];
            if ea + eb < 2 {
                continue;
            }
            let integral = integrate_triangle(a, b, c, |p| basis.raw_monomial(l, p));
            basis.means[l] = integral / area;
        }
        basis
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of basis functions, `(d+1)(d+2)/2 - 1`.
    pub fn n_coefficients(&self) -> usize {
        self.exponents.len()
    }

    pub fn center(&self) -> Point2 {
        self.center
    }

    /// Inverse half extents `(1/Δx, 1/Δy)`.
    pub fn scales(&self) -> (f64, f64) {
        (self.inv_dx, self.inv_dy)
    }

    /// Cell average subtracted from the raw monomial `l`.
    pub fn mean(&self, l: usize) -> f64 {
        self.means[l]
    }

    #[inline]
    fn local(&self, p: Point2) -> (f64, f64) {
        (
            (p.x - self.center.x) * self.inv_dx,
            (p.y - self.center.y) * self.inv_dy,
        )
    }

    #[inline]
    fn raw_monomial(&self, l: usize, p: Point2) -> f64 {
        let (xi, eta) = self.local(p);
        let (a, b) = self.exponents[l];
        xi.powi(a as i32) * eta.powi(b as i32)
    }

    /// Value of basis function `l` at `p`.
    #[inline]
    pub fn value(&self, l: usize, p: Point2) -> f64 {
        self.raw_monomial(l, p) - self.means[l]
    }

    /// Values of all basis functions at `p`, written into `out`.
    pub fn values_into(&self, p: Point2, out: &mut [f64]) {
        for (l, slot) in out.iter_mut().enumerate().take(self.exponents.len()) {
            *slot = self.value(l, p);
        }
    }

    /// Values of all basis functions at `p`.
    pub fn values(&self, p: Point2) -> Vec<f64> {
        let mut out = vec![0.0; self.n_coefficients()];
        self.values_into(p, &mut out);
        out
    }

    /// Mixed partial derivative `∂x^ax ∂y^ay φ_l` at `p`.
    ///
    /// With `ax = ay = 0` this is the (mean-corrected) value.
    pub fn derivative(&self, l: usize, p: Point2, ax: u32, ay: u32) -> f64 {
        if ax == 0 && ay == 0 {
            return self.value(l, p);
        }
        let (a, b) = self.exponents[l];
        if ax > a || ay > b {
            return 0.0;
        }
        let (xi, eta) = self.local(p);
        falling_factorial(a, ax)
            * falling_factorial(b, ay)
            * xi.powi((a - ax) as i32)
            * eta.powi((b - ay) as i32)
            * self.inv_dx.powi(ax as i32)
            * self.inv_dy.powi(ay as i32)
    }

    /// Gradient `(∂φ_l/∂x, ∂φ_l/∂y)` at `p`.
    pub fn gradient(&self, l: usize, p: Point2) -> (f64, f64) {
        (self.derivative(l, p, 1, 0), self.derivative(l, p, 0, 1))
    }

    /// k-th directional derivative along `normal`:
    ///
    /// D_n^k φ = Σ_m C(k, m) n_x^m n_y^(k-m) ∂x^m ∂y^(k-m) φ
    pub fn normal_derivative(&self, l: usize, p: Point2, normal: (f64, f64), k: u32) -> f64 {
        if k == 0 {
            return self.value(l, p);
        }
        let (nx, ny) = normal;
        (0..=k)
            .map(|m| {
                binomial(k, m)
                    * nx.powi(m as i32)
                    * ny.powi((k - m) as i32)
                    * self.derivative(l, p, m, k - m)
            })
            .sum()
    }

    /// Function table at `p`: row `l` holds `[φ_l, D_n φ_l, ..., D_n^d φ_l]`.
    ///
    /// Shape: `(n_coefficients, degree + 1)`.
    pub fn func_table(&self, p: Point2, normal: (f64, f64)) -> Mat<f64> {
        let n = self.n_coefficients();
        let mut table = Mat::zeros(n, self.degree + 1);
        for l in 0..n {
            for k in 0..=self.degree {
                table[(l, k)] = self.normal_derivative(l, p, normal, k as u32);
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::n_coefficients;

    fn triangle() -> ([Point2; 3], Point2) {
        let v = [
            Point2::new(0.1, 0.2),
            Point2::new(1.3, 0.4),
            Point2::new(0.5, 1.1),
        ];
        let c = Point2::new(
            (v[0].x + v[1].x + v[2].x) / 3.0,
            (v[0].y + v[1].y + v[2].y) / 3.0,
        );
        (v, c)
    }

    #[test]
    fn test_basis_has_zero_mean() {
        let (v, c) = triangle();
        for degree in 0..=3 {
            let basis = VrBasis2D::new(degree, v, c);
            assert_eq!(basis.n_coefficients(), n_coefficients(degree));
            for l in 0..basis.n_coefficients() {
                let integral = integrate_triangle(v[0], v[1], v[2], |p| basis.value(l, p));
                assert!(
                    integral.abs() < 1e-14,
                    "degree {} function {} integrates to {}",
                    degree,
                    l,
                    integral
                );
            }
        }
    }

    #[test]
    fn test_local_coordinates_span_unit_box() {
        let v = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 4.0),
        ];
        let basis = VrBasis2D::new(1, v, Point2::new(1.0, 2.0));
        let (sx, sy) = basis.scales();
        assert!((sx - 1.0).abs() < 1e-15);
        assert!((sy - 0.5).abs() < 1e-15);
        // ξ at x = 2 is 1, η at y = 4 is 1
        assert!((basis.value(0, Point2::new(2.0, 2.0)) - 1.0).abs() < 1e-15);
        assert!((basis.value(1, Point2::new(1.0, 4.0)) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_derivatives_match_finite_differences() {
        let (v, c) = triangle();
        let basis = VrBasis2D::new(3, v, c);
        let p = Point2::new(0.7, 0.5);
        let h = 1e-6;
        for l in 0..basis.n_coefficients() {
            let (gx, gy) = basis.gradient(l, p);
            let fx = (basis.value(l, Point2::new(p.x + h, p.y))
                - basis.value(l, Point2::new(p.x - h, p.y)))
                / (2.0 * h);
            let fy = (basis.value(l, Point2::new(p.x, p.y + h))
                - basis.value(l, Point2::new(p.x, p.y - h)))
                / (2.0 * h);
            assert!((gx - fx).abs() < 1e-6, "l = {}: {} vs {}", l, gx, fx);
            assert!((gy - fy).abs() < 1e-6, "l = {}: {} vs {}", l, gy, fy);
        }
    }

    #[test]
    fn test_func_table_first_column_is_value() {
        let (v, c) = triangle();
        let basis = VrBasis2D::new(2, v, c);
        let p = Point2::new(0.6, 0.6);
        let n = (0.6, 0.8);
        let table = basis.func_table(p, n);
        assert_eq!(table.nrows(), 5);
        assert_eq!(table.ncols(), 3);
        for l in 0..5 {
            assert_eq!(table[(l, 0)], basis.value(l, p));
            let (gx, gy) = basis.gradient(l, p);
            assert!((table[(l, 1)] - (gx * n.0 + gy * n.1)).abs() < 1e-13);
        }
    }

    #[test]
    fn test_second_normal_derivative_of_quadratic() {
        // ξ² has D_n² = 2 n_x² / Δx², ξη has 2 n_x n_y / (Δx Δy)
        let (v, c) = triangle();
        let basis = VrBasis2D::new(2, v, c);
        let (sx, sy) = basis.scales();
        let n = (0.6, 0.8);
        let p = Point2::new(0.3, 0.9);
        let d2_xx = basis.normal_derivative(2, p, n, 2);
        let d2_xy = basis.normal_derivative(3, p, n, 2);
        assert!((d2_xx - 2.0 * n.0 * n.0 * sx * sx).abs() < 1e-12);
        assert!((d2_xy - 2.0 * n.0 * n.1 * sx * sy).abs() < 1e-12);
        // Third derivatives of a quadratic vanish
        assert_eq!(basis.normal_derivative(3, p, n, 3), 0.0);
    }

    #[test]
    fn test_translated_basis_matches_shifted_evaluation() {
        let (v, c) = triangle();
        let shift = Point2::new(2.0, -1.0);
        let moved = [v[0] + shift, v[1] + shift, v[2] + shift];
        let original = VrBasis2D::new(3, v, c);
        let translated = VrBasis2D::new(3, moved, c + shift);
        let p = Point2::new(2.4, -0.3);
        for l in 0..original.n_coefficients() {
            let a = translated.value(l, p);
            let b = original.value(l, p - shift);
            assert!((a - b).abs() < 1e-13, "l = {}: {} vs {}", l, a, b);
        }
    }
}
