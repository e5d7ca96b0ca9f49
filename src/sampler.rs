//! Integrand values over the whole sample grid (`m3di write`).
//!
//! After tabulation every grid point `y ∈ [0, S)^D` is evaluated and
//! reported with its angular coordinates `t_i = 2π·y_i/S`. The reported
//! value is the full integrand, provider prefactor included. With the
//! `parallel` feature the points are evaluated on rayon's pool.

use log::{debug, warn};
use num_complex::Complex64;
use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::constants::TWO_PI;
use crate::error::{IntegrationError, Result};
use crate::integrator::check_nome;
use crate::multi_index::{MultiIndex, SampleIndices};
use crate::provider::IntegrandProvider;
use crate::report::Component;

/// Grids larger than this produce a warning; the output is one JSON object
/// per point.
const LARGE_GRID: u128 = 10_000_000;

/// One evaluated grid point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrandSample {
    pub t: Vec<f64>,
    pub real: Component,
    pub imag: Component,
}

impl IntegrandSample {
    fn new(t: Vec<f64>, value: Complex64) -> Self {
        Self {
            t,
            real: value.re.into(),
            imag: value.im.into(),
        }
    }
}

/// Tabulate `manifold` for `hbar` and evaluate the integrand at every point
/// of `[0, samples)^D`, in odometer order (first coordinate fastest).
pub fn sample_integrand<M: IntegrandProvider>(
    manifold: &mut M,
    hbar: Complex64,
    samples: usize,
) -> Result<Vec<IntegrandSample>> {
    check_nome(hbar)?;
    let samples = samples.clamp(1, u32::MAX as usize);
    manifold.tabulate(hbar, samples)?;
    if !manifold.is_ready() {
        return Err(IntegrationError::ProviderNotReady);
    }

    let manifold: &M = &*manifold;
    let grid = MultiIndex::new(samples as u32, manifold.nesting());
    if grid.len() > LARGE_GRID {
        warn!("writing {} integrand samples", grid.len());
    } else {
        debug!("writing {} integrand samples", grid.len());
    }
    let points: Vec<SampleIndices> = grid.collect();

    let step = TWO_PI / samples as f64;
    let prefactor = manifold.prefactor();
    let evaluate = |indices: &SampleIndices| {
        let t = indices.iter().map(|&y| step * y as f64).collect();
        IntegrandSample::new(t, prefactor * manifold.integrand_value(indices))
    };

    #[cfg(feature = "parallel")]
    let values = points.par_iter().map(evaluate).collect();
    #[cfg(not(feature = "parallel"))]
    let values = points.iter().map(evaluate).collect();

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::Triangulation;
    use crate::transcendental::c_q;

    #[test]
    fn test_grid_covers_every_point_in_order() {
        let mut t = Triangulation::new(
            3,
            vec![
                vec![1, 0, -1, 0, 1, -1, 1, 1, 0],
                vec![0, 1, 1, -1, 0, 0, 1, -1, 0],
                vec![0; 9],
                vec![0; 9],
                vec![0; 9],
            ],
            vec![0.3, 0.3, 0.4, 0.25, 0.25, 0.5, 0.2, 0.3, 0.5],
        )
        .unwrap();
        let hbar = Complex64::new(-0.2, 0.0);
        let points = sample_integrand(&mut t, hbar, 5).unwrap();
        assert_eq!(points.len(), 25);

        let step = TWO_PI / 5.0;
        assert_eq!(points[0].t, vec![0.0, 0.0]);
        assert_eq!(points[1].t, vec![step, 0.0]);
        assert_eq!(points[5].t, vec![0.0, step]);

        let direct = t.prefactor() * t.integrand_value(&[3, 4]);
        assert_eq!(points[3 + 5 * 4].real, Component::from(direct.re));
        assert_eq!(points[3 + 5 * 4].imag, Component::from(direct.im));
    }

    #[test]
    fn test_samples_include_c_q_factors() {
        // c(q)^N is tiny at small |ħ|, so leaving it out shifts every value
        // by many orders of magnitude.
        let mut t = Triangulation::new(
            2,
            vec![vec![1, -2, 1, 1, -2, 1], vec![-1, 2, -1, -1, 2, -1], vec![0; 6], vec![0; 6]],
            vec![1.0 / 3.0; 6],
        )
        .unwrap();
        let hbar = Complex64::new(-0.1, 0.0);
        let points = sample_integrand(&mut t, hbar, 10).unwrap();

        let cq = c_q(hbar.exp());
        assert!(cq.norm() < 1e-5, "c(q) = {} should be small here", cq);
        for (y, point) in points.iter().enumerate() {
            let expected = cq * cq * t.integrand_value(&[y as u32]);
            match (point.real, point.imag) {
                (Component::Value(re), Component::Value(im)) => {
                    let value = Complex64::new(re, im);
                    assert!(
                        (value - expected).norm() <= 1e-12 * expected.norm(),
                        "sample {}: {} vs {}",
                        y,
                        value,
                        expected
                    );
                }
                other => panic!("sample {} is singular: {:?}", y, other),
            }
        }
    }

    #[test]
    fn test_divergent_nome_is_rejected() {
        let mut t = Triangulation::new(2, vec![vec![0; 6]; 4], vec![0.3; 6]).unwrap();
        let err = sample_integrand(&mut t, Complex64::new(0.5, 0.0), 4).unwrap_err();
        assert!(matches!(err, IntegrationError::NomeOutOfRange { .. }));
    }
}
