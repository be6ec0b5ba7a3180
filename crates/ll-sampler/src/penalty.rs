use tracing::{trace, warn};

use crate::error::{Result, SamplerError};
use crate::vector::{presence_flag, LogitVector, OccurrenceCounts};

/// Conventional range for both penalty coefficients. Values outside it are
/// accepted but logged.
pub const CONVENTIONAL_PENALTY_RANGE: std::ops::RangeInclusive<f64> = -2.0..=2.0;

/// Applies presence and frequency penalties to outcomes that have already
/// appeared.
///
/// For every outcome `i` with `c_i` prior occurrences:
///
/// `z'_i = z_i - presence_penalty * [c_i > 0] - frequency_penalty * c_i`
///
/// Positive coefficients discourage repeats, negative ones encourage them.
#[derive(Debug, Clone, PartialEq)]
pub struct PenaltySampler {
    presence_penalty: f64,
    frequency_penalty: f64,
    counts: OccurrenceCounts,
}

impl PenaltySampler {
    /// Create a new penalty sampler.
    ///
    /// - `presence_penalty`: flat deduction for any outcome seen at least once.
    /// - `frequency_penalty`: deduction per prior occurrence.
    /// - `counts`: prior occurrences, parallel to the logits it will adjust.
    pub fn new(presence_penalty: f64, frequency_penalty: f64, counts: OccurrenceCounts) -> Self {
        Self {
            presence_penalty,
            frequency_penalty,
            counts,
        }
    }

    pub fn counts(&self) -> &OccurrenceCounts {
        &self.counts
    }

    pub fn adjust(&self, logits: &LogitVector) -> Result<LogitVector> {
        apply_penalties(
            logits,
            &self.counts,
            self.presence_penalty,
            self.frequency_penalty,
        )
    }
}

/// Ensure a penalty coefficient is finite. Range is not checked here.
pub fn check_penalty(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SamplerError::NonFinitePenalty { name, value })
    }
}

fn warn_if_unconventional(name: &'static str, value: f64) {
    if !CONVENTIONAL_PENALTY_RANGE.contains(&value) {
        warn!(penalty = name, value, "penalty outside the conventional [-2, 2] range");
    }
}

/// Subtract presence and frequency penalties from `logits`.
///
/// Neither the coefficients nor the results are clamped; a coefficient
/// outside [`CONVENTIONAL_PENALTY_RANGE`] is applied and logged.
pub fn apply_penalties(
    logits: &LogitVector,
    counts: &OccurrenceCounts,
    presence_penalty: f64,
    frequency_penalty: f64,
) -> Result<LogitVector> {
    if logits.len() != counts.len() {
        return Err(SamplerError::LengthMismatch {
            logits: logits.len(),
            counts: counts.len(),
        });
    }
    check_penalty("presence_penalty", presence_penalty)?;
    check_penalty("frequency_penalty", frequency_penalty)?;
    warn_if_unconventional("presence_penalty", presence_penalty);
    warn_if_unconventional("frequency_penalty", frequency_penalty);

    let adjusted: Vec<f64> = logits
        .as_slice()
        .iter()
        .zip(counts.as_slice())
        .map(|(&z, &c)| {
            z - presence_penalty * f64::from(presence_flag(c)) - frequency_penalty * f64::from(c)
        })
        .collect();

    trace!(
        presence_penalty,
        frequency_penalty,
        penalized = counts.as_slice().iter().filter(|&&c| c > 0).count(),
        "applied penalties"
    );
    LogitVector::new(adjusted)
}
