//! Compensated summation of complex numbers.
//!
//! Kahan–Neumaier running compensation applied separately to the real and
//! imaginary parts. Each addition records the rounding error of the naive
//! sum in a compensation term, taking the residual of whichever operand has
//! the larger magnitude, so large cancelling terms cannot swamp small ones.

use std::iter::FromIterator;
use std::ops::AddAssign;

use num_complex::Complex64;

/// Running compensated sum of `Complex64` values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KahanSum {
    re_sum: f64,
    im_sum: f64,
    re_compensation: f64,
    im_compensation: f64,
}

#[inline]
fn neumaier_step(sum: &mut f64, compensation: &mut f64, increment: f64) {
    let tentative = *sum + increment;
    *compensation += if sum.abs() >= increment.abs() {
        (*sum - tentative) + increment
    } else {
        (increment - tentative) + *sum
    };
    *sum = tentative;
}

impl KahanSum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one value to the running sum.
    #[inline]
    pub fn add(&mut self, increment: Complex64) {
        neumaier_step(&mut self.re_sum, &mut self.re_compensation, increment.re);
        neumaier_step(&mut self.im_sum, &mut self.im_compensation, increment.im);
    }

    /// Add every value of `values`, in order.
    pub fn accumulate<'a, I>(&mut self, values: I)
    where
        I: IntoIterator<Item = &'a Complex64>,
    {
        for value in values {
            self.add(*value);
        }
    }

    /// Compensated total of everything added so far.
    #[inline]
    pub fn total(&self) -> Complex64 {
        Complex64::new(
            self.re_sum + self.re_compensation,
            self.im_sum + self.im_compensation,
        )
    }

    /// Clear the accumulator for another summation.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl AddAssign<Complex64> for KahanSum {
    #[inline]
    fn add_assign(&mut self, increment: Complex64) {
        self.add(increment);
    }
}

impl Extend<Complex64> for KahanSum {
    fn extend<I: IntoIterator<Item = Complex64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl FromIterator<Complex64> for KahanSum {
    fn from_iter<I: IntoIterator<Item = Complex64>>(iter: I) -> Self {
        let mut sum = KahanSum::new();
        sum.extend(iter);
        sum
    }
}

/// Compensated sum of a slice.
pub fn kahan_sum(values: &[Complex64]) -> Complex64 {
    let mut sum = KahanSum::new();
    sum.accumulate(values);
    sum.total()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    #[test]
    fn test_cancellation_keeps_small_term() {
        let values = [
            Complex64::new(1e16, -1e16),
            Complex64::new(1.0, 1.0),
            Complex64::new(-1e16, 1e16),
        ];
        let naive: Complex64 = values.iter().sum();
        assert_eq!(naive, Complex64::new(0.0, 0.0), "naive sum loses the small term");
        assert_eq!(kahan_sum(&values), Complex64::new(1.0, 1.0));
    }

    #[test]
    fn test_operator_and_collect_agree() {
        let values: Vec<Complex64> = (0..100)
            .map(|k| Complex64::new(k as f64 * 0.1, -(k as f64) * 0.01))
            .collect();
        let mut by_operator = KahanSum::new();
        for v in &values {
            by_operator += *v;
        }
        let collected: KahanSum = values.iter().copied().collect();
        assert_eq!(by_operator.total(), collected.total());
        assert_eq!(by_operator.total(), kahan_sum(&values));
    }

    #[test]
    fn test_reset_clears_state() {
        let mut sum = KahanSum::new();
        sum += Complex64::new(1e16, 3.0);
        sum += Complex64::new(1.0, 0.0);
        sum.reset();
        assert_eq!(sum, KahanSum::default());
        sum += Complex64::new(2.5, -1.0);
        assert_eq!(sum.total(), Complex64::new(2.5, -1.0));
    }

    #[test]
    fn test_empty_sum_is_zero() {
        assert_eq!(kahan_sum(&[]), Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_order_independence() {
        // 0.1 is not representable; ten thousand copies drift under naive summation.
        let mut values = vec![Complex64::new(0.1, -0.3); 10_000];
        values.push(Complex64::new(1e10, 0.0));
        values.push(Complex64::new(-1e10, 0.0));
        let expected = Complex64::new(1000.0, -3000.0);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            values.shuffle(&mut rng);
            let total = kahan_sum(&values);
            assert!(
                (total - expected).norm() < 1e-9,
                "compensated total drifted: {}",
                total
            );
        }
    }
}
