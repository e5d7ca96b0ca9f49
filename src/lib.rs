//! # m3di
//!
//! Numerical evaluation of the state integral of the meromorphic 3D-index
//! of an ideal triangulation with one cusp.
//!
//! ```text
//! triangulation (N, L, a)  +  ħ  +  S samples
//!   ↓ tabulation: one thread per quad, S values of G_q each
//! quad factor tables (read-only)
//!   ↓ Fubini recursion over [0,S)^(N-1), outer dimension split across T threads
//! compensated partial sums
//!   ↓ Kahan–Neumaier combination × c(q)^N
//! integral value
//! ```
//!
//! Singularities of the integrand are data, not errors: a sample landing on
//! a pole makes the result infinite or NaN, and the driver labels it.
//!
//! ## Usage
//!
//! ```no_run
//! use m3di::prelude::*;
//! use num_complex::Complex64;
//!
//! let mut manifold = Triangulation::from_path("4_1.json").unwrap();
//! let hbar = Complex64::new(-0.1, 0.0);
//! let mut integrator = Integrator::new(&mut manifold, hbar, 5000);
//! let value = integrator.compute_integral(&mut NoProgress).unwrap();
//! println!("{}", value);
//! ```

pub mod concurrency;
pub mod constants;
pub mod error;
pub mod integrator;
pub mod kahan;
pub mod manifold;
pub mod multi_index;
pub mod progress;
pub mod provider;
pub mod report;
pub mod sampler;
pub mod stats;
pub mod tabulation;
pub mod transcendental;

pub mod prelude {
    pub use crate::error::{IntegrationError, ManifoldError, TabulationError};
    pub use crate::integrator::{compute_integral, Integrator, IntegratorConfig};
    pub use crate::kahan::KahanSum;
    pub use crate::manifold::Triangulation;
    pub use crate::progress::{NoProgress, ProgressSink, Stage};
    pub use crate::provider::IntegrandProvider;
    pub use crate::stats::Stats;
    pub use crate::transcendental::{c_q, g_q, g_q_real};
}
