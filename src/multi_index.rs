//! Iteration over the sample grid `[0, S)^D`.
//!
//! [`MultiIndex`] is an odometer: the first coordinate turns fastest and a
//! carry moves to the next coordinate when one wraps around. It visits all
//! `S^D` points exactly once. The zero-dimensional grid has exactly one
//! point, the empty index.

use smallvec::SmallVec;

/// Inline capacity of a sample index vector. Census manifolds with a single
/// cusp stay well below this nesting depth.
pub const INLINE_DEPTH: usize = 8;

/// Sample index vector: one index per nested integral.
pub type SampleIndices = SmallVec<[u32; INLINE_DEPTH]>;

#[derive(Debug, Clone)]
pub struct MultiIndex {
    samples: u32,
    current: SampleIndices,
    exhausted: bool,
}

impl MultiIndex {
    /// Start at the origin of `[0, samples)^depth`.
    pub fn new(samples: u32, depth: usize) -> Self {
        Self {
            samples,
            current: SmallVec::from_elem(0, depth),
            exhausted: samples == 0 && depth > 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.current.len()
    }

    /// The current grid point.
    pub fn item(&self) -> &[u32] {
        &self.current
    }

    /// Step to the next grid point. Returns `false` (and leaves the index
    /// unchanged) once the last point has been passed.
    pub fn advance(&mut self) -> bool {
        let last = self.samples.saturating_sub(1);
        let mut pos = 0;
        while pos < self.current.len() && self.current[pos] == last {
            pos += 1;
        }
        if pos == self.current.len() {
            return false;
        }
        for index in &mut self.current[..pos] {
            *index = 0;
        }
        self.current[pos] += 1;
        true
    }

    /// Number of points in the grid, `samples^depth`.
    pub fn len(&self) -> u128 {
        (self.samples as u128).pow(self.current.len() as u32)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Iterator for MultiIndex {
    type Item = SampleIndices;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let item = self.current.clone();
        if !self.advance() {
            self.exhausted = true;
        }
        Some(item)
    }
}
