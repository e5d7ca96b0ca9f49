//! Riemann-sum evaluation of the state integral.
//!
//! # Fubini recursion
//!
//! The integral over the cube `[0,1)^D` is approximated by a Riemann sum
//! with `S` samples per direction. The sum is peeled one dimension at a
//! time:
//!
//! ```text
//! sum(y_0..y_{l-1}) = (1/S) · Σ_k term(y_0..y_{l-1}, k)
//! term = integrand(y, k)          when l + 1 = D
//!      = sum(y_0..y_{l-1}, k)     otherwise
//! ```
//!
//! and the `S` terms of every level go through a [`KahanSum`] before the
//! `1/S` scaling.
//!
//! # Domain decomposition
//!
//! Only the outermost dimension is split: worker `t` of `T` takes the block
//! `[t·S/T, (t+1)·S/T)` and the full range of every inner dimension. The
//! sample count is rounded up to a multiple of `T` so the blocks have equal
//! size. Workers return their partial sums through their join handles; the
//! partials are combined with one more compensated sum and scaled by the
//! provider's prefactor.

use std::ops::Range;
use std::thread;

use log::{debug, error, info};
use num_complex::Complex64;

use crate::concurrency::{decide_thread_count, make_divisible};
use crate::constants::SMALLEST_NORMAL;
use crate::error::{IntegrationError, Result};
use crate::kahan::KahanSum;
use crate::multi_index::SampleIndices;
use crate::progress::{NoProgress, ProgressSink, Stage};
use crate::provider::IntegrandProvider;

/// Parameters of one integral computation.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorConfig {
    /// Sample points per dimension (a multiple of `threads` when `threads > 1`)
    pub samples: usize,
    /// Number of nested integrals D
    pub nesting: usize,
    /// Worker threads T
    pub threads: usize,
    /// Complex parameter of the state integral
    pub hbar: Complex64,
    /// Length of one Riemann-sum interval, 1/samples
    pub step_length: f64,
}

/// Sample indices are stored as `u32`.
pub const MAX_SAMPLES: usize = u32::MAX as usize;

impl IntegratorConfig {
    /// Normalize the requested values: at least one sample and one thread,
    /// and the sample count rounded up to a multiple of the thread count.
    /// Near [`MAX_SAMPLES`] the count is rounded down instead, so it always
    /// fits the index type.
    pub fn new(samples: usize, nesting: usize, threads: usize, hbar: Complex64) -> Self {
        let requested = samples.clamp(1, MAX_SAMPLES);
        let threads = threads.clamp(1, MAX_SAMPLES);
        let mut samples = make_divisible(requested, threads);
        if samples > MAX_SAMPLES {
            samples = MAX_SAMPLES - MAX_SAMPLES % threads;
        }
        if samples != requested {
            info!(
                "sample count changed from {} to {} to split evenly across {} threads",
                requested, samples, threads
            );
        }
        Self {
            samples,
            nesting,
            threads,
            hbar,
            step_length: 1.0 / samples as f64,
        }
    }

    /// Width of each worker's block of the outermost dimension.
    pub fn samples_per_thread(&self) -> usize {
        self.samples / self.threads
    }
}

/// Fail unless `0 < |q| < 1` for `q = e^ħ`, the region where the infinite
/// products converge.
pub fn check_nome(hbar: Complex64) -> Result<()> {
    let modulus = hbar.re.exp();
    if (SMALLEST_NORMAL..1.0).contains(&modulus) {
        Ok(())
    } else {
        Err(IntegrationError::NomeOutOfRange { modulus })
    }
}

/// Recursive Riemann summation over a read-only provider.
struct FubiniSum<'m, M> {
    manifold: &'m M,
    samples: u32,
    nesting: usize,
    step_length: f64,
}

impl<'m, M: IntegrandProvider> FubiniSum<'m, M> {
    /// Sum with the outermost index restricted to `outer`.
    fn outer(&self, outer: Range<u32>) -> Complex64 {
        let mut indices = SampleIndices::new();
        self.sum(&mut indices, outer)
    }

    fn sum(&self, indices: &mut SampleIndices, range: Range<u32>) -> Complex64 {
        let level = indices.len();
        let mut sum = KahanSum::new();
        indices.push(0);
        if level + 1 == self.nesting {
            for k in range {
                indices[level] = k;
                sum += self.manifold.integrand_value(indices);
            }
        } else {
            for k in range {
                indices[level] = k;
                sum += self.sum(indices, 0..self.samples);
            }
        }
        indices.pop();
        self.step_length * sum.total()
    }
}

/// Computes the state integral for one provider and one value of ħ.
pub struct Integrator<'a, M: IntegrandProvider> {
    manifold: &'a mut M,
    config: IntegratorConfig,
}

impl<'a, M: IntegrandProvider> Integrator<'a, M> {
    /// Integrator with the thread count chosen from the grid size.
    pub fn new(manifold: &'a mut M, hbar: Complex64, samples: usize) -> Self {
        let threads = decide_thread_count(manifold.nesting(), samples.max(1));
        Self::with_threads(manifold, hbar, samples, threads)
    }

    /// Integrator with an explicit worker count.
    pub fn with_threads(
        manifold: &'a mut M,
        hbar: Complex64,
        samples: usize,
        threads: usize,
    ) -> Self {
        let config = IntegratorConfig::new(samples, manifold.nesting(), threads, hbar);
        Self { manifold, config }
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    /// Tabulate the integrand factors, sum over the grid and scale by the
    /// prefactor.
    ///
    /// Signals [`Stage::FinishTabulation`] and [`Stage::FinishIntegration`]
    /// to `progress`. Singular integrand values are not errors; they make
    /// the returned value infinite or NaN.
    pub fn compute_integral(&mut self, progress: &mut dyn ProgressSink) -> Result<Complex64> {
        let config = self.config.clone();
        check_nome(config.hbar)?;

        self.manifold.tabulate(config.hbar, config.samples)?;
        if !self.manifold.is_ready() {
            return Err(IntegrationError::ProviderNotReady);
        }
        progress.signal(Stage::FinishTabulation);

        let manifold: &M = &*self.manifold;
        info!(
            "integrating: nesting {}, {} samples, {} thread(s)",
            config.nesting, config.samples, config.threads
        );
        let fubini = FubiniSum {
            manifold,
            samples: config.samples as u32,
            nesting: config.nesting,
            step_length: config.step_length,
        };

        let sum = if config.nesting == 0 {
            manifold.integrand_value(&[])
        } else if config.threads == 1 {
            fubini.outer(0..fubini.samples)
        } else {
            sum_in_parallel(&fubini, &config)?
        };
        let result = manifold.prefactor() * sum;

        progress.signal(Stage::FinishIntegration);
        debug!("integral = {}", result);
        Ok(result)
    }
}

/// One scoped worker per block of the outer dimension.
fn sum_in_parallel<M: IntegrandProvider>(
    fubini: &FubiniSum<'_, M>,
    config: &IntegratorConfig,
) -> Result<Complex64> {
    let block = config.samples_per_thread() as u32;

    thread::scope(|scope| {
        let mut first_error = None;
        let mut handles = Vec::with_capacity(config.threads);
        for worker in 0..config.threads {
            let from = worker as u32 * block;
            let to = from + block;
            let spawned = thread::Builder::new()
                .name(format!("fubini-{}", worker))
                .spawn_scoped(scope, move || fubini.outer(from..to));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    first_error = Some(IntegrationError::Spawn { worker, source });
                    break;
                }
            }
        }

        let mut partials = KahanSum::new();
        for (worker, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(partial) => partials += partial,
                Err(_) => {
                    error!("integration worker #{} terminated abnormally", worker);
                    first_error.get_or_insert(IntegrationError::WorkerPanicked { worker });
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(partials.total()),
        }
    })
}

/// Compute the integral with the default thread policy and no progress
/// reporting.
pub fn compute_integral<M: IntegrandProvider>(
    manifold: &mut M,
    hbar: Complex64,
    samples: usize,
) -> Result<Complex64> {
    Integrator::new(manifold, hbar, samples).compute_integral(&mut NoProgress)
}
