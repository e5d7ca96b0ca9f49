//! Transcendental factors of the state integrand.
//!
//! # Functions
//!
//! ```text
//! G_q(z) = Π_{n≥1} (1 + qⁿ/z) / Π_{n≥0} (1 − qⁿ·z)
//! c(q)   = Π_{n≥1} (1 − qⁿ)² / (1 − q²ⁿ)
//! ```
//!
//! Both products converge for `|q| < 1`. They are evaluated by keeping a
//! running numerator and a running denominator and dividing exactly once at
//! the end. The loops stop as soon as the running power of `q` is subnormal:
//! from that point on no factor can change the product at double precision.
//!
//! `G_q` has an essential singularity at `z = 0` and a pole at `z = 1`; both
//! are reported as [`INFINITY`] rather than as an error. So is a nome with
//! `|q| >= 1`, for which neither product converges.

use std::ops::Mul;

use num_complex::Complex64;

use crate::constants::{COMPLEX_ONE, INFINITY, SMALLEST_NORMAL};

/// True when both parts of `z` are below the smallest normalized double.
#[inline]
pub fn is_subnormal(z: Complex64) -> bool {
    z.re.abs() < SMALLEST_NORMAL && z.im.abs() < SMALLEST_NORMAL
}

/// `G_q(z)` for complex `q`.
pub fn g_q(q: Complex64, z: Complex64) -> Complex64 {
    if q.norm() >= 1.0 {
        return INFINITY;
    }
    g_q_product(q, z)
}

/// `G_q(z)` for real `q`.
///
/// Same product as [`g_q`] with every power of `q` multiplied in as a real
/// scalar, which halves the multiplications per factor.
pub fn g_q_real(q: f64, z: Complex64) -> Complex64 {
    if q.abs() >= 1.0 {
        return INFINITY;
    }
    g_q_product(q, z)
}

fn g_q_product<Q>(q: Q, z: Complex64) -> Complex64
where
    Q: Copy,
    Complex64: Mul<Q, Output = Complex64>,
{
    if is_subnormal(z) {
        return INFINITY;
    }

    let mut numerator = COMPLEX_ONE;
    let mut denominator = COMPLEX_ONE - z;

    // n = 1
    let mut q_n_times_z = z * q;
    let mut q_n_over_z = z.inv() * q;

    while !is_subnormal(q_n_over_z) {
        if !q_n_over_z.is_finite() {
            return INFINITY;
        }
        numerator *= COMPLEX_ONE + q_n_over_z;
        denominator *= COMPLEX_ONE - q_n_times_z;
        q_n_times_z = q_n_times_z * q;
        q_n_over_z = q_n_over_z * q;
    }

    if is_subnormal(denominator) {
        return INFINITY;
    }
    numerator / denominator
}

/// `c(q) = Π (1 − qⁿ)² / (1 − q²ⁿ)`.
///
/// `c(0)` is the empty product and equals one exactly.
pub fn c_q(q: Complex64) -> Complex64 {
    if q.norm() >= 1.0 {
        return INFINITY;
    }
    let mut numerator = COMPLEX_ONE;
    let mut denominator = COMPLEX_ONE;
    let mut q_n = q;

    while !is_subnormal(q_n) {
        if !q_n.is_finite() {
            return INFINITY;
        }
        let one_minus = COMPLEX_ONE - q_n;
        numerator *= one_minus * one_minus;
        denominator *= COMPLEX_ONE - q_n * q_n;
        q_n *= q;
    }

    if is_subnormal(denominator) {
        return INFINITY;
    }
    numerator / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::COMPLEX_ZERO;

    fn q_of(hbar: f64) -> f64 {
        hbar.exp()
    }

    #[test]
    fn test_subnormal_requires_both_parts() {
        assert!(is_subnormal(COMPLEX_ZERO));
        assert!(is_subnormal(Complex64::new(1e-310, -1e-310)));
        assert!(!is_subnormal(Complex64::new(1e-310, 1e-300)));
        assert!(!is_subnormal(Complex64::new(f64::MIN_POSITIVE, 0.0)));
    }

    #[test]
    fn test_g_q_essential_singularity_at_zero() {
        let q = Complex64::new(q_of(-0.1), 0.0);
        assert_eq!(g_q(q, COMPLEX_ZERO), INFINITY);
        assert_eq!(g_q_real(q.re, COMPLEX_ZERO), INFINITY);
    }

    #[test]
    fn test_g_q_pole_at_one() {
        let q = Complex64::new(q_of(-0.2), 0.05);
        assert_eq!(g_q(q, COMPLEX_ONE), INFINITY);
    }

    #[test]
    fn test_g_q_diverges_towards_one() {
        let q = Complex64::new(q_of(-0.1), 0.0);
        let mut previous = 0.0;
        for eps in [1e-2, 1e-4, 1e-6, 1e-8] {
            let value = g_q(q, Complex64::new(1.0 - eps, 0.0)).norm();
            assert!(
                value > previous,
                "|G_q| should grow as z approaches 1 (eps = {}, |G| = {})",
                eps,
                value
            );
            previous = value;
        }
        assert!(previous > 1e6);
    }

    #[test]
    fn test_g_q_at_zero_nome_is_geometric_factor() {
        // With q = 0 only the n = 0 denominator survives: G = 1/(1-z).
        let z = Complex64::new(0.5, 0.0);
        assert_eq!(g_q(COMPLEX_ZERO, z), Complex64::new(2.0, 0.0));
        assert_eq!(g_q_real(0.0, z), Complex64::new(2.0, 0.0));
    }

    #[test]
    fn test_real_fast_path_matches_complex() {
        let q = q_of(-0.15);
        for k in 0..16 {
            let z = Complex64::from_polar(0.93, k as f64 * 0.4 + 0.1);
            let fast = g_q_real(q, z);
            let general = g_q(Complex64::new(q, 0.0), z);
            assert!(
                (fast - general).norm() <= 1e-12 * general.norm(),
                "real and complex paths disagree at k = {}: {} vs {}",
                k,
                fast,
                general
            );
        }
    }

    #[test]
    fn test_g_q_matches_truncated_product() {
        let q = Complex64::new(0.3, 0.2);
        let z = Complex64::new(0.4, -0.7);
        let mut expected = COMPLEX_ONE / (COMPLEX_ONE - z);
        for n in 1..200 {
            let q_n = q.powu(n);
            expected *= (COMPLEX_ONE + q_n / z) / (COMPLEX_ONE - q_n * z);
        }
        let value = g_q(q, z);
        assert!(
            (value - expected).norm() < 1e-12 * expected.norm(),
            "G_q = {}, truncated product = {}",
            value,
            expected
        );
    }

    #[test]
    fn test_c_at_zero_is_exactly_one() {
        assert_eq!(c_q(COMPLEX_ZERO), COMPLEX_ONE);
    }

    #[test]
    fn test_c_matches_truncated_product() {
        let q = Complex64::new(0.5, 0.1);
        let mut expected = COMPLEX_ONE;
        for n in 1..200 {
            let q_n = q.powu(n);
            expected *= (COMPLEX_ONE - q_n) * (COMPLEX_ONE - q_n) / (COMPLEX_ONE - q_n * q_n);
        }
        let value = c_q(q);
        assert!((value - expected).norm() < 1e-12 * expected.norm());
    }

    #[test]
    fn test_divergent_nome_returns_sentinel() {
        let z = Complex64::new(0.5, 0.5);
        assert_eq!(g_q_real(1.5, z), INFINITY);
        assert_eq!(c_q(Complex64::new(1.5, 0.0)), INFINITY);
        // the powers of a unimodular nome never shrink
        assert_eq!(g_q(Complex64::new(0.0, 1.0), z), INFINITY);
        assert_eq!(g_q_real(1.0, z), INFINITY);
    }
}
