//! Reference inputs for demonstrations.
//!
//! The transforms themselves never draw random numbers. These helpers build
//! seeded input vectors and the parameter grids a front end sweeps over, so
//! the same picture can be reproduced run after run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, SamplerError};
use crate::vector::{LogitVector, ProbabilityVector};

/// Seed used by the reference setup.
pub const REFERENCE_SEED: u64 = 12345;
/// Number of candidate outcomes in the reference setup.
pub const REFERENCE_OUTCOMES: usize = 20;
/// Lower bound of reference logits.
pub const REFERENCE_LOGIT_MIN: f64 = -4.0;
/// Upper bound of reference logits.
pub const REFERENCE_LOGIT_MAX: f64 = 4.0;

/// `k` logits drawn uniformly from `[min, max)` with a seeded generator.
pub fn seeded_logits(seed: u64, k: usize, min: f64, max: f64) -> Result<LogitVector> {
    if !(min.is_finite() && max.is_finite() && min < max) {
        return Err(SamplerError::InvalidDistribution(format!(
            "logit range [{}, {}) is empty or not finite",
            min, max
        )));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let values: Vec<f64> = (0..k).map(|_| rng.gen_range(min..max)).collect();
    LogitVector::new(values)
}

/// The reference logits: 20 values in `[-4, 4)` from seed 12345.
pub fn reference_logits() -> Result<LogitVector> {
    seeded_logits(
        REFERENCE_SEED,
        REFERENCE_OUTCOMES,
        REFERENCE_LOGIT_MIN,
        REFERENCE_LOGIT_MAX,
    )
}

/// `k` uniform weights in `[0, 1)` normalized into a distribution.
pub fn seeded_distribution(seed: u64, k: usize) -> Result<ProbabilityVector> {
    let mut rng = StdRng::seed_from_u64(seed);
    let weights: Vec<f64> = (0..k).map(|_| rng.gen::<f64>()).collect();
    ProbabilityVector::normalize(weights)
}

/// 41 temperatures spaced evenly in log10 from 0.1 to 10.
pub fn temperature_grid() -> Vec<f64> {
    const STEPS: usize = 41;
    (0..STEPS)
        .map(|i| {
            let exponent = -1.0 + 2.0 * i as f64 / (STEPS - 1) as f64;
            10f64.powf(exponent)
        })
        .collect()
}

/// Top-p thresholds from 0.00 to 1.00 in steps of 0.01.
pub fn top_p_grid() -> Vec<f64> {
    (0..=100).map(|i| i as f64 / 100.0).collect()
}
