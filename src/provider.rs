//! The seam between the integrator and the combinatorics of a triangulation.

use num_complex::Complex64;

use crate::error::TabulationError;

/// Source of integrand values for the state integral.
///
/// The integrator calls [`tabulate`](Self::tabulate) once, then shares the
/// provider read-only across its worker threads and calls
/// [`integrand_value`](Self::integrand_value) for every grid point.
pub trait IntegrandProvider: Sync {
    /// Precompute every factor of the integrand for `hbar` on a grid with
    /// `samples` points per dimension. Must be complete on return.
    fn tabulate(&mut self, hbar: Complex64, samples: usize) -> Result<(), TabulationError>;

    /// Integrand at the grid point `indices` (length [`nesting`](Self::nesting)).
    fn integrand_value(&self, indices: &[u32]) -> Complex64;

    /// Constant factor applied to the whole integral.
    fn prefactor(&self) -> Complex64;

    fn num_tetrahedra(&self) -> usize;

    fn num_cusps(&self) -> usize;

    /// True once tabulation has completed successfully.
    fn is_ready(&self) -> bool;

    /// Number of nested integrals, tetrahedra minus cusps.
    fn nesting(&self) -> usize {
        self.num_tetrahedra().saturating_sub(self.num_cusps())
    }
}
