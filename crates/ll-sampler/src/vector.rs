use crate::error::{Result, SamplerError};

/// Maximum deviation from 1.0 accepted when validating a caller-supplied
/// probability vector.
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

/// Unnormalized scores, one per candidate outcome.
///
/// Never empty and never contains NaN. Infinite entries are allowed:
/// `-inf` marks an outcome that can never be chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct LogitVector {
    values: Vec<f64>,
}

impl LogitVector {
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(SamplerError::EmptyLogits);
        }
        if let Some(index) = values.iter().position(|v| v.is_nan()) {
            return Err(SamplerError::NanLogit { index });
        }
        Ok(Self { values })
    }

    /// Number of candidate outcomes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; kept for parity with `len`.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }

    /// Largest logit, or `-inf` if every entry is `-inf`.
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

impl TryFrom<Vec<f64>> for LogitVector {
    type Error = SamplerError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        LogitVector::new(values)
    }
}

/// A distribution over candidate outcomes: non-negative entries summing to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityVector {
    probs: Vec<f64>,
}

impl ProbabilityVector {
    /// Validate a caller-supplied distribution.
    ///
    /// Entries must be finite and non-negative, and their sum must be within
    /// [`DISTRIBUTION_TOLERANCE`] of 1.
    pub fn new(probs: Vec<f64>) -> Result<Self> {
        if probs.is_empty() {
            return Err(SamplerError::InvalidDistribution(
                "distribution must not be empty".to_string(),
            ));
        }
        if let Some((i, p)) = probs
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(SamplerError::InvalidDistribution(format!(
                "entry {} is {}, expected a finite non-negative value",
                i, p
            )));
        }
        let sum: f64 = probs.iter().sum();
        if (sum - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(SamplerError::InvalidDistribution(format!(
                "entries sum to {}, expected 1",
                sum
            )));
        }
        Ok(Self { probs })
    }

    /// Normalize non-negative weights into a distribution.
    ///
    /// Callers guarantee the weights are finite, non-negative and have a
    /// strictly positive sum.
    pub(crate) fn from_weights(mut weights: Vec<f64>) -> Self {
        let sum: f64 = weights.iter().sum();
        for w in weights.iter_mut() {
            *w /= sum;
        }
        Self { probs: weights }
    }

    /// Normalize arbitrary non-negative weights, validating them first.
    pub fn normalize(weights: Vec<f64>) -> Result<Self> {
        if weights.is_empty() {
            return Err(SamplerError::InvalidDistribution(
                "distribution must not be empty".to_string(),
            ));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SamplerError::InvalidDistribution(
                "weights must be finite and non-negative".to_string(),
            ));
        }
        let sum: f64 = weights.iter().sum();
        if sum <= 0.0 || !sum.is_finite() {
            return Err(SamplerError::InvalidDistribution(format!(
                "weights sum to {}, cannot normalize",
                sum
            )));
        }
        Ok(Self::from_weights(weights))
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.probs
    }

    /// Index of the most probable outcome. Ties resolve to the lowest index.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &p) in self.probs.iter().enumerate().skip(1) {
            if p > self.probs[best] {
                best = i;
            }
        }
        best
    }

    /// Indices with non-zero probability, in ascending order.
    pub fn support(&self) -> Vec<usize> {
        self.probs
            .iter()
            .enumerate()
            .filter(|(_, p)| **p > 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Natural log of each entry, for log-scale display. Zero maps to `-inf`.
    pub fn log_probs(&self) -> Vec<f64> {
        self.probs.iter().map(|p| p.ln()).collect()
    }
}

impl TryFrom<Vec<f64>> for ProbabilityVector {
    type Error = SamplerError;

    fn try_from(probs: Vec<f64>) -> Result<Self> {
        ProbabilityVector::new(probs)
    }
}

/// How many times each outcome has already been produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OccurrenceCounts {
    counts: Vec<u32>,
}

impl OccurrenceCounts {
    pub fn new(counts: Vec<u32>) -> Self {
        Self { counts }
    }

    /// Counts for `k` outcomes that have never appeared.
    pub fn zeros(k: usize) -> Self {
        Self {
            counts: vec![0; k],
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.counts
    }
}

impl From<Vec<u32>> for OccurrenceCounts {
    fn from(counts: Vec<u32>) -> Self {
        OccurrenceCounts::new(counts)
    }
}

/// 0 for an unseen outcome, 1 otherwise.
pub fn presence_flag(count: u32) -> u32 {
    u32::from(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logits_reject_empty() {
        assert!(matches!(
            LogitVector::new(vec![]),
            Err(SamplerError::EmptyLogits)
        ));
    }

    #[test]
    fn test_logits_reject_nan() {
        let err = LogitVector::new(vec![0.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, SamplerError::NanLogit { index: 1 }));
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_logits_accept_infinities() {
        let l = LogitVector::new(vec![f64::NEG_INFINITY, 1.0, f64::INFINITY]).unwrap();
        assert_eq!(l.len(), 3);
        assert_eq!(l.max(), f64::INFINITY);
    }

    #[test]
    fn test_probabilities_validate_sum() {
        assert!(ProbabilityVector::new(vec![0.5, 0.5]).is_ok());
        assert!(ProbabilityVector::new(vec![0.5, 0.4]).is_err());
        assert!(ProbabilityVector::new(vec![1.5, -0.5]).is_err());
        assert!(ProbabilityVector::new(vec![]).is_err());
        assert!(ProbabilityVector::new(vec![f64::NAN, 1.0]).is_err());
    }

    #[test]
    fn test_normalize() {
        let p = ProbabilityVector::normalize(vec![1.0, 3.0]).unwrap();
        assert_eq!(p.as_slice(), &[0.25, 0.75]);
        assert!(ProbabilityVector::normalize(vec![0.0, 0.0]).is_err());
    }

    #[test]
    fn test_argmax_prefers_lowest_index_on_tie() {
        let p = ProbabilityVector::new(vec![0.1, 0.45, 0.45]).unwrap();
        assert_eq!(p.argmax(), 1);
    }

    #[test]
    fn test_support_and_log_probs() {
        let p = ProbabilityVector::new(vec![0.0, 0.25, 0.75]).unwrap();
        assert_eq!(p.support(), vec![1, 2]);
        let lp = p.log_probs();
        assert_eq!(lp[0], f64::NEG_INFINITY);
        assert!((lp[1] - 0.25f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_presence_flag() {
        let flags: Vec<u32> = OccurrenceCounts::new(vec![0, 1, 7])
            .as_slice()
            .iter()
            .map(|&c| presence_flag(c))
            .collect();
        assert_eq!(flags, vec![0, 1, 1]);
        assert_eq!(OccurrenceCounts::zeros(4).as_slice(), &[0, 0, 0, 0]);
    }
}
