//! Monomial bookkeeping for the reconstruction basis.
//!
//! Monomials `ξ^a η^b` are ordered by total degree and, within a degree, by
//! decreasing power of `ξ`:
//!
//! ```text
//! degree 1: ξ,  η
//! degree 2: ξ², ξη, η²
//! degree 3: ξ³, ξ²η, ξη², η³
//! ```
//!
//! The constant monomial is not part of the basis: the cell average carries it.

/// Highest supported reconstruction degree.
pub const MAX_DEGREE: usize = 3;

/// Number of non-constant monomials of total degree `1..=degree`.
///
/// ```
/// use vr_fv::polynomial::n_coefficients;
///
/// assert_eq!(n_coefficients(0), 0);
/// assert_eq!(n_coefficients(1), 2);
/// assert_eq!(n_coefficients(2), 5);
/// assert_eq!(n_coefficients(3), 9);
/// ```
pub const fn n_coefficients(degree: usize) -> usize {
    (degree + 1) * (degree + 2) / 2 - 1
}

/// Exponent pairs `(a, b)` of the monomials `ξ^a η^b`, in basis order.
pub fn monomial_exponents(degree: usize) -> Vec<(u32, u32)> {
    let mut exps = Vec::with_capacity(n_coefficients(degree));
    for p in 1..=degree as u32 {
        for m in 0..=p {
            exps.push((p - m, m));
        }
    }
    exps
}

/// `n!` as a float.
pub fn factorial(n: u32) -> f64 {
    (1..=n).map(f64::from).product()
}

/// Falling factorial `n (n-1) ... (n-k+1)`; zero when `k > n`.
pub fn falling_factorial(n: u32, k: u32) -> f64 {
    if k > n {
        return 0.0;
    }
    (n - k + 1..=n).map(f64::from).product()
}

/// Binomial coefficient `C(n, k)`.
pub fn binomial(n: u32, k: u32) -> f64 {
    if k > n {
        return 0.0;
    }
    falling_factorial(n, k) / factorial(k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponent_order() {
        assert_eq!(monomial_exponents(1), vec![(1, 0), (0, 1)]);
        assert_eq!(
            monomial_exponents(3),
            vec![
                (1, 0),
                (0, 1),
                (2, 0),
                (1, 1),
                (0, 2),
                (3, 0),
                (2, 1),
                (1, 2),
                (0, 3)
            ]
        );
        for d in 0..=MAX_DEGREE {
            assert_eq!(monomial_exponents(d).len(), n_coefficients(d));
        }
    }

    #[test]
    fn test_factorials() {
        assert_eq!(factorial(0), 1.0);
        assert_eq!(factorial(3), 6.0);
        assert_eq!(falling_factorial(3, 2), 6.0);
        assert_eq!(falling_factorial(3, 0), 1.0);
        assert_eq!(falling_factorial(2, 3), 0.0);
        assert_eq!(binomial(3, 1), 3.0);
        assert_eq!(binomial(3, 3), 1.0);
        assert_eq!(binomial(2, 3), 0.0);
    }
}
