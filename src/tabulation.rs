//! Per-quad tables of `G_q` values.
//!
//! For a quad with angle `a` (in units of π) the table holds
//!
//! ```text
//! table[j] = G_q(q, r · exp(i(a·π + j·2π/S))),   q = e^ħ,  r = e^{ħ·a}
//! ```
//!
//! for `j = 0..S`. Each table is filled by its own thread. A table is first
//! a [`PendingTable`] (running) and becomes a [`QuadTable`] (finished) only
//! through [`PendingTable::finish`], so values cannot be read before the
//! computation is complete.

use std::thread::{self, JoinHandle};

use log::{debug, trace};
use num_complex::Complex64;

use crate::constants::{PI, TWO_PI};
use crate::error::TabulationError;
use crate::transcendental::{g_q, g_q_real};

/// Parameters of one table, fixed before its task starts.
#[derive(Debug, Clone, Copy)]
struct TableParams {
    hbar: Complex64,
    start_angle: f64,
    step: f64,
    radius: Complex64,
    samples: usize,
}

impl TableParams {
    fn new(angle: f64, hbar: Complex64, samples: usize) -> Self {
        Self {
            hbar,
            start_angle: angle * PI,
            step: TWO_PI / samples as f64,
            radius: (hbar * angle).exp(),
            samples,
        }
    }

    fn compute(&self) -> Vec<Complex64> {
        let q = self.hbar.exp();
        let mut buffer = Vec::with_capacity(self.samples);

        if self.hbar.im == 0.0 {
            // q and the radius are real
            let q = q.re;
            let r = self.radius.re;
            for j in 0..self.samples {
                let theta = self.start_angle + j as f64 * self.step;
                buffer.push(g_q_real(q, Complex64::from_polar(r, theta)));
            }
        } else {
            for j in 0..self.samples {
                let theta = self.start_angle + j as f64 * self.step;
                buffer.push(g_q(q, self.radius * Complex64::from_polar(1.0, theta)));
            }
        }
        buffer
    }
}

/// A table whose values are still being computed.
#[derive(Debug)]
pub struct PendingTable {
    quad: usize,
    handle: JoinHandle<Vec<Complex64>>,
}

impl PendingTable {
    /// Launch the computation of the table for `quad` on a new thread.
    pub fn launch(
        quad: usize,
        angle: f64,
        hbar: Complex64,
        samples: usize,
    ) -> Result<Self, TabulationError> {
        let params = TableParams::new(angle, hbar, samples);
        let handle = thread::Builder::new()
            .name(format!("tabulate-quad-{}", quad))
            .spawn(move || params.compute())
            .map_err(|source| TabulationError::Spawn { quad, source })?;
        trace!("launched tabulation of quad #{} ({} samples)", quad, samples);
        Ok(Self { quad, handle })
    }

    pub fn quad(&self) -> usize {
        self.quad
    }

    /// Block until the task is done and hand back the finished table.
    pub fn finish(self) -> Result<QuadTable, TabulationError> {
        let quad = self.quad;
        let values = self
            .handle
            .join()
            .map_err(|_| TabulationError::WorkerPanicked { quad })?;
        Ok(QuadTable { values })
    }
}

/// A finished, read-only table of `G_q` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadTable {
    values: Vec<Complex64>,
}

impl QuadTable {
    /// Compute a table on the calling thread.
    pub fn compute(angle: f64, hbar: Complex64, samples: usize) -> Self {
        Self {
            values: TableParams::new(angle, hbar, samples).compute(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Complex64] {
        &self.values
    }

    /// Value at `position` reduced modulo the table length; negative
    /// positions wrap from the end.
    #[inline]
    pub fn get(&self, position: i64) -> Complex64 {
        let index = position.rem_euclid(self.values.len() as i64);
        self.values[index as usize]
    }
}

/// Tabulate every quad concurrently and wait for all of them.
///
/// All tasks are launched before any is waited on. On failure the remaining
/// tasks are still joined, and the first error is returned.
pub fn tabulate_quads(
    angles: &[f64],
    hbar: Complex64,
    samples: usize,
) -> Result<Vec<QuadTable>, TabulationError> {
    debug!(
        "tabulating {} quads with {} samples at hbar = {}",
        angles.len(),
        samples,
        hbar
    );

    let mut pending = Vec::with_capacity(angles.len());
    let mut first_error = None;
    for (quad, &angle) in angles.iter().enumerate() {
        match PendingTable::launch(quad, angle, hbar, samples) {
            Ok(table) => pending.push(table),
            Err(e) => {
                first_error = Some(e);
                break;
            }
        }
    }

    let mut tables = Vec::with_capacity(pending.len());
    for table in pending {
        match table.finish() {
            Ok(table) => tables.push(table),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(tables),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HBAR: Complex64 = Complex64::new(-0.1, 0.0);

    #[test]
    fn test_wraparound() {
        let samples = 64;
        let table = QuadTable::compute(1.0 / 3.0, HBAR, samples);
        let s = samples as i64;
        assert_eq!(table.get(s), table.get(0));
        assert_eq!(table.get(-1), table.get(s - 1));
        assert_eq!(table.get(2 * s + 5), table.get(5));
        assert_eq!(table.get(-3 * s - 2), table.get(s - 2));
    }

    #[test]
    fn test_entries_follow_definition() {
        let samples = 32;
        let angle = 0.25;
        let hbar = Complex64::new(-0.2, 0.3);
        let table = QuadTable::compute(angle, hbar, samples);
        let q = hbar.exp();
        let radius = (hbar * angle).exp();
        for j in 0..samples {
            let theta = angle * PI + j as f64 * TWO_PI / samples as f64;
            let expected = g_q(q, radius * Complex64::from_polar(1.0, theta));
            assert_eq!(table.get(j as i64), expected, "entry {} differs", j);
        }
    }

    #[test]
    fn test_real_hbar_uses_real_radius() {
        let samples = 16;
        let table = QuadTable::compute(0.5, HBAR, samples);
        let q = HBAR.re.exp();
        let r = (HBAR.re * 0.5).exp();
        for j in 0..samples {
            let theta = 0.5 * PI + j as f64 * TWO_PI / samples as f64;
            let expected = g_q(Complex64::new(q, 0.0), Complex64::from_polar(r, theta));
            assert!((table.get(j as i64) - expected).norm() <= 1e-12 * expected.norm());
        }
    }

    #[test]
    fn test_threaded_tables_match_inline() {
        let angles = [1.0 / 3.0, 1.0 / 6.0, 0.5, 0.0];
        let tables = tabulate_quads(&angles, HBAR, 50).unwrap();
        assert_eq!(tables.len(), angles.len());
        for (table, &angle) in tables.iter().zip(angles.iter()) {
            assert_eq!(table.len(), 50);
            assert_eq!(*table, QuadTable::compute(angle, HBAR, 50));
        }
    }

    #[test]
    fn test_pending_table_finishes() {
        let pending = PendingTable::launch(3, 0.2, HBAR, 10).unwrap();
        assert_eq!(pending.quad(), 3);
        let table = pending.finish().unwrap();
        assert_eq!(table.len(), 10);
        assert!(table.values().iter().all(|v| v.is_finite()));
    }
}
