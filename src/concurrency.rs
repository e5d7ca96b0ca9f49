//! Thread-count policy.
//!
//! One worker per `10^THREAD_BASE` grid points, capped at the hardware
//! concurrency times [`OVERLOAD`]. The sample count is then rounded up to a
//! multiple of the thread count so the outer dimension splits evenly.

use std::thread;

use log::debug;

/// One worker thread per `10^THREAD_BASE` integrand evaluations.
pub const THREAD_BASE: i32 = 5;

/// Assumed core count when the platform reports fewer (or nothing).
pub const REASONABLE_CONCURRENCY: usize = 8;

/// Maximum number of workers per core.
pub const OVERLOAD: usize = 8;

/// Number of cores reported by the platform, at least
/// [`REASONABLE_CONCURRENCY`].
pub fn hardware_concurrency() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(REASONABLE_CONCURRENCY)
        .max(REASONABLE_CONCURRENCY)
}

/// Worker count for a grid of `samples^nesting` points.
pub fn decide_thread_count(nesting: usize, samples: usize) -> usize {
    thread_count_for(nesting, samples, hardware_concurrency())
}

fn thread_count_for(nesting: usize, samples: usize, concurrency: usize) -> usize {
    let points = (samples as f64).powi(nesting as i32);
    let wanted = (points / 10f64.powi(THREAD_BASE)).ceil();
    let cap = concurrency * OVERLOAD;
    let threads = if wanted >= cap as f64 {
        cap
    } else {
        (wanted as usize).max(1)
    };
    debug!(
        "{:.3e} grid points, {} cores: {} worker thread(s)",
        points, concurrency, threads
    );
    threads
}

/// Smallest multiple of `divisor` that is at least `n`, or the largest one
/// below `n` when that would overflow.
pub fn make_divisible(n: usize, divisor: usize) -> usize {
    if divisor == 0 {
        return n;
    }
    match n % divisor {
        0 => n,
        r => n.checked_add(divisor - r).unwrap_or(n - r),
    }
}
