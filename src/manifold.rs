//! Combinatorial data of an ideal triangulation.
//!
//! A triangulation file is a JSON object:
//!
//! ```text
//! {
//!   "N": 2,                         number of tetrahedra
//!   "L": [[..3N ints..], ...],      leading-trailing matrix, N + 2k rows
//!   "a": [..3N floats..]            angle structure, in units of π
//! }
//! ```
//!
//! Column `3j + m` of `L` and entry `3j + m` of `a` belong to quad `m` of
//! tetrahedron `j`. The number of cusps `k` is recovered from the row count;
//! only `k = 1` is supported.
//!
//! The integrand at a grid point `y ∈ [0, S)^(N-1)` is
//!
//! ```text
//! Π_j  T_{3j}(⟨y, L_{3j}⟩) · T_{3j+1}(⟨y, L_{3j+1}⟩) · T_{3j+2}(⟨y, L_{3j+2}⟩)
//! ```
//!
//! where `T_i` is the tabulated `G_q` factor of quad `i` and `L_i` is column
//! `i` restricted to the first `N - 1` rows. The `c(q)` factor of each
//! tetrahedron is pulled out into the prefactor `c(q)^N`.

use std::fs;
use std::path::Path;

use log::{debug, info};
use num_complex::Complex64;
use serde::Deserialize;

use crate::constants::COMPLEX_ONE;
use crate::error::{ManifoldError, TabulationError};
use crate::provider::IntegrandProvider;
use crate::tabulation::{tabulate_quads, QuadTable};
use crate::transcendental::c_q;

/// Raw contents of a triangulation file.
#[derive(Debug, Clone, Deserialize)]
pub struct TriangulationFile {
    #[serde(rename = "N")]
    pub n: i64,
    #[serde(rename = "L")]
    pub l: Vec<Vec<i32>>,
    #[serde(rename = "a")]
    pub a: Vec<f64>,
}

/// Validated triangulation, and after [`tabulate`](IntegrandProvider::tabulate)
/// its integrand factor tables.
#[derive(Debug, Clone)]
pub struct Triangulation {
    tetrahedra: usize,
    cusps: usize,
    /// Row-major, `tetrahedra + 2 * cusps` rows of `3 * tetrahedra` entries.
    ltd: Vec<i32>,
    angles: Vec<f64>,
    tables: Vec<QuadTable>,
    prefactor: Complex64,
    ready: bool,
}

impl Triangulation {
    /// Validate the matrix `l` and the angle structure `a` for `n` tetrahedra.
    pub fn new(n: i64, l: Vec<Vec<i32>>, a: Vec<f64>) -> Result<Self, ManifoldError> {
        if n < 1 {
            return Err(ManifoldError::InvalidTetrahedra(n));
        }
        let tetrahedra = n as usize;
        let cols = 3 * tetrahedra;
        let rows = l.len();

        let cusps = rows.saturating_sub(tetrahedra) / 2;
        if cusps < 1 {
            return Err(ManifoldError::NoCusp);
        }
        if cusps > 1 {
            return Err(ManifoldError::MultipleCusps(cusps));
        }

        for (row, entries) in l.iter().enumerate() {
            if entries.len() != cols {
                return Err(ManifoldError::RaggedMatrix {
                    row,
                    expected: cols,
                    found: entries.len(),
                });
            }
        }
        if a.len() != cols {
            return Err(ManifoldError::AngleLength {
                expected: cols,
                found: a.len(),
            });
        }

        Ok(Self {
            tetrahedra,
            cusps,
            ltd: l.into_iter().flatten().collect(),
            angles: a,
            tables: Vec::new(),
            prefactor: COMPLEX_ONE,
            ready: false,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ManifoldError> {
        let file: TriangulationFile = serde_json::from_str(json)?;
        Self::new(file.n, file.l, file.a)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ManifoldError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let triangulation = Self::from_json_str(&contents)?;
        info!(
            "loaded {}: {} tetrahedra, {} cusp(s)",
            path.display(),
            triangulation.tetrahedra,
            triangulation.cusps
        );
        Ok(triangulation)
    }

    pub fn num_quads(&self) -> usize {
        3 * self.tetrahedra
    }

    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Entry of the leading-trailing matrix at (`row`, `quad`).
    pub fn ltd_entry(&self, row: usize, quad: usize) -> i32 {
        self.ltd[row * self.num_quads() + quad]
    }

    /// Sample position feeding `quad`: the dot product of `indices` with
    /// column `quad` of the leading-trailing matrix.
    pub fn ltd_exponent(&self, indices: &[u32], quad: usize) -> i64 {
        let cols = self.num_quads();
        indices
            .iter()
            .enumerate()
            .map(|(edge, &y)| y as i64 * self.ltd[edge * cols + quad] as i64)
            .sum()
    }

    /// Tabulated factor table of `quad`, if tabulation has run.
    pub fn table(&self, quad: usize) -> Option<&QuadTable> {
        self.tables.get(quad)
    }
}

impl IntegrandProvider for Triangulation {
    fn tabulate(&mut self, hbar: Complex64, samples: usize) -> Result<(), TabulationError> {
        self.ready = false;
        self.tables.clear();

        let cq = c_q(hbar.exp());
        self.prefactor = cq.powu(self.tetrahedra as u32);
        debug!("c(q) = {}, prefactor = {}", cq, self.prefactor);

        self.tables = tabulate_quads(&self.angles, hbar, samples)?;
        self.ready = true;
        Ok(())
    }

    #[inline]
    fn integrand_value(&self, indices: &[u32]) -> Complex64 {
        debug_assert!(self.ready, "integrand requested before tabulation finished");
        let mut product = COMPLEX_ONE;
        for (quad, table) in self.tables.iter().enumerate() {
            product *= table.get(self.ltd_exponent(indices, quad));
        }
        product
    }

    fn prefactor(&self) -> Complex64 {
        self.prefactor
    }

    fn num_tetrahedra(&self) -> usize {
        self.tetrahedra
    }

    fn num_cusps(&self) -> usize {
        self.cusps
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}
