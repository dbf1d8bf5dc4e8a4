//! Finalization depth search
//!
//! An adversary with a fraction `q` of proposal power tries to overtake a
//! block buried `k` deep. While honest nodes mine `k` blocks the adversary
//! makes Poisson(`k q / p`) progress; from a deficit `z` it catches up with
//! probability `(q/p)^z`. The depth is the smallest `k` whose catch-up
//! probability
//!
//! ```text
//! 1 - sum_{i=0}^{k-1} Pois(i; k q/p) * (1 - (q/p)^(k-i))
//! ```
//!
//! is at most `epsilon`.

use crate::error::{FinalityError, FinalityResult};
use tracing::debug;

/// Upper bound on the searched depth.
pub const MAX_FINALIZATION_DEPTH: u64 = 10_000;

/// Smallest depth at which a block is final with error at most `epsilon`.
///
/// Fails fast when the search could not terminate: no nodes, an adversary
/// holding at least half the proposal power, or `epsilon` outside `(0, 1]`.
pub fn compute_finalization_depth(epsilon: f64, num_nodes: usize, num_adversaries: usize) -> FinalityResult<u64> {
    let invalid = |reason| FinalityError::InvalidSecurityParameters {
        epsilon,
        num_nodes,
        num_adversaries,
        reason,
    };
    if num_nodes == 0 {
        return Err(invalid("no nodes"));
    }
    if num_adversaries >= num_nodes {
        return Err(invalid("adversaries must be fewer than nodes"));
    }
    if !(epsilon > 0.0 && epsilon <= 1.0) {
        return Err(invalid("epsilon must lie in (0, 1]"));
    }

    let q = num_adversaries as f64 / num_nodes as f64;
    let p = 1.0 - q;
    if q >= p {
        return Err(invalid("adversary controls at least half the proposal power"));
    }

    for k in 0..=MAX_FINALIZATION_DEPTH {
        let risk = catch_up_probability(k, q, p);
        if risk <= epsilon {
            debug!(k, q, epsilon, risk, "Finalization depth found");
            return Ok(k);
        }
    }
    Err(FinalityError::SearchExhausted {
        epsilon,
        limit: MAX_FINALIZATION_DEPTH,
    })
}

/// Probability that the adversary ever overtakes a block `k` deep.
pub fn catch_up_probability(k: u64, q: f64, p: f64) -> f64 {
    let ratio = q / p;
    let lambda = k as f64 * ratio;
    let mut covered = 0.0;
    let mut ln_factorial = 0.0;
    for i in 0..k {
        if i > 0 {
            ln_factorial += (i as f64).ln();
        }
        let pmf = poisson_pmf(i, lambda, ln_factorial);
        covered += pmf * (1.0 - ratio.powi((k - i) as i32));
    }
    1.0 - covered
}

/// `Pois(i; lambda)` evaluated in log space, given `ln(i!)`.
fn poisson_pmf(i: u64, lambda: f64, ln_factorial: f64) -> f64 {
    if lambda == 0.0 {
        return if i == 0 { 1.0 } else { 0.0 };
    }
    (i as f64 * lambda.ln() - lambda - ln_factorial).exp()
}
