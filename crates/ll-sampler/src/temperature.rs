use tracing::trace;

use crate::error::{Result, SamplerError};
use crate::vector::{LogitVector, ProbabilityVector};

/// Converts logits into a probability distribution, dividing every logit by
/// a temperature before the softmax.
///
/// Higher temperatures flatten the distribution towards uniform, lower
/// temperatures concentrate it on the largest logit(s).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureSampler {
    temperature: f64,
}

impl TemperatureSampler {
    /// Create a new temperature sampler. The temperature is checked when
    /// [`build`](Self::build) runs.
    pub fn new(temperature: f64) -> Self {
        Self { temperature }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn build(&self, logits: &LogitVector) -> Result<ProbabilityVector> {
        softmax_with_temperature(logits, self.temperature)
    }
}

impl Default for TemperatureSampler {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Ensure `temperature` is a finite, strictly positive number.
pub fn check_temperature(temperature: f64) -> Result<()> {
    if temperature.is_finite() && temperature > 0.0 {
        Ok(())
    } else {
        Err(SamplerError::InvalidTemperature(temperature))
    }
}

/// `p_i = exp(x_i / T) / sum_j exp(x_j / T)`.
///
/// The maximum logit is subtracted before exponentiating, so the largest
/// term is always `exp(0) = 1` and the sum can neither overflow nor vanish.
/// Equal logits produce bit-identical probabilities.
///
/// Infinite logits are handled as limits: if any logit is `+inf` the mass is
/// shared equally by the `+inf` entries, and if every logit is `-inf` the
/// result is uniform.
pub fn softmax_with_temperature(
    logits: &LogitVector,
    temperature: f64,
) -> Result<ProbabilityVector> {
    check_temperature(temperature)?;

    let max_logit = logits.max();
    let weights: Vec<f64> = if max_logit == f64::INFINITY {
        logits
            .as_slice()
            .iter()
            .map(|&x| if x == f64::INFINITY { 1.0 } else { 0.0 })
            .collect()
    } else if max_logit == f64::NEG_INFINITY {
        vec![1.0; logits.len()]
    } else {
        logits
            .as_slice()
            .iter()
            .map(|&x| ((x - max_logit) / temperature).exp())
            .collect()
    };

    let dist = ProbabilityVector::from_weights(weights);
    trace!(
        temperature,
        k = dist.len(),
        argmax = dist.argmax(),
        "built distribution"
    );
    Ok(dist)
}
