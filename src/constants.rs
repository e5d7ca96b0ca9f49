//! Process-wide numerical constants.

use num_complex::Complex64;

pub use std::f64::consts::PI;

/// 2π, the full turn used to space sample points on a circle.
pub const TWO_PI: f64 = 2.0 * PI;

pub const COMPLEX_ZERO: Complex64 = Complex64::new(0.0, 0.0);
pub const COMPLEX_ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Value returned by the transcendental evaluator at singularities.
///
/// Real part is `+inf`, imaginary part is zero. It is ordinary data: the
/// integrator sums it like any other sample and the result becomes
/// infinite or NaN.
pub const INFINITY: Complex64 = Complex64::new(f64::INFINITY, 0.0);

/// Smallest positive normalized double. Anything below it in magnitude is
/// treated as zero by the infinite products.
pub const SMALLEST_NORMAL: f64 = f64::MIN_POSITIVE;
