use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Result, SamplerError};
use crate::vector::ProbabilityVector;

/// Decides whether the next outcome, in descending-probability order, joins
/// the nucleus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NucleusRule {
    /// Include an outcome while the mass already kept is still below `p`.
    /// The outcome that crosses `p` is kept. `p = 1` keeps every positive
    /// outcome even when rounding lets the running sum reach 1 early.
    #[default]
    MassBeforeInclusion,
    /// Include an outcome only if the kept mass *including it* stays below
    /// `p`. The kept mass never reaches `p` (except for the arg-max, which is
    /// always kept).
    MassAfterInclusion,
}

impl NucleusRule {
    fn admits(self, kept_mass: f64, prob: f64, p: f64) -> bool {
        match self {
            NucleusRule::MassBeforeInclusion => p >= 1.0 || kept_mass < p,
            NucleusRule::MassAfterInclusion => kept_mass + prob < p,
        }
    }
}

/// An outcome index paired with its probability.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    prob: f64,
}

/// Nucleus sampling: keeps the most probable outcomes until the cumulative
/// probability reaches the threshold `p`, then renormalizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopPSampler {
    p: f64,
    rule: NucleusRule,
}

impl TopPSampler {
    /// Create a new top-p (nucleus) sampler with the given probability threshold.
    pub fn new(p: f64) -> Self {
        Self {
            p,
            rule: NucleusRule::default(),
        }
    }

    pub fn with_rule(mut self, rule: NucleusRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    pub fn rule(&self) -> NucleusRule {
        self.rule
    }

    pub fn filter(&self, dist: &ProbabilityVector) -> Result<ProbabilityVector> {
        top_p_filter_with_rule(dist, self.p, self.rule)
    }
}

/// Ensure `p` lies in `[0, 1]`.
pub fn check_top_p(p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(SamplerError::InvalidTopP(p))
    }
}

/// Truncate `dist` to its nucleus under [`NucleusRule::MassBeforeInclusion`].
pub fn top_p_filter(dist: &ProbabilityVector, p: f64) -> Result<ProbabilityVector> {
    top_p_filter_with_rule(dist, p, NucleusRule::default())
}

/// Truncate `dist` to its nucleus and renormalize.
///
/// Outcomes are visited in descending probability. The sort is stable, so
/// among equal probabilities the lower index is visited first; this decides
/// which of several tied outcomes lands inside the nucleus at the boundary.
/// The first visited outcome is always kept, which makes the result
/// non-empty even for `p = 0`. Walking stops at the first outcome `rule`
/// rejects, or at the first zero-probability outcome.
pub fn top_p_filter_with_rule(
    dist: &ProbabilityVector,
    p: f64,
    rule: NucleusRule,
) -> Result<ProbabilityVector> {
    check_top_p(p)?;

    let mut candidates: Vec<Candidate> = dist
        .as_slice()
        .iter()
        .enumerate()
        .map(|(index, &prob)| Candidate { index, prob })
        .collect();

    // Sort descending by probability; `sort_by` is stable.
    candidates.sort_by(|a, b| b.prob.partial_cmp(&a.prob).unwrap_or(std::cmp::Ordering::Equal));

    let mut kept = vec![0.0f64; dist.len()];
    let top = candidates[0];
    kept[top.index] = top.prob;
    let mut kept_mass = top.prob;
    let mut kept_count = 1usize;

    for c in &candidates[1..] {
        if c.prob <= 0.0 || !rule.admits(kept_mass, c.prob, p) {
            break;
        }
        kept[c.index] = c.prob;
        kept_mass += c.prob;
        kept_count += 1;
    }

    trace!(p, ?rule, kept_count, kept_mass, "applied nucleus filter");
    Ok(ProbabilityVector::from_weights(kept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{seeded_distribution, top_p_grid};
    use crate::temperature::softmax_with_temperature;
    use crate::vector::LogitVector;
    use approx::assert_relative_eq;

    fn dist(v: &[f64]) -> ProbabilityVector {
        ProbabilityVector::new(v.to_vec()).unwrap()
    }

    fn assert_normalized(d: &ProbabilityVector) {
        let sum: f64 = d.as_slice().iter().sum();
        assert_relative_eq!(sum, 1.0, max_relative = 1e-9);
        assert!(d.as_slice().iter().all(|&x| x >= 0.0));
    }

    #[test]
    fn test_p_zero_keeps_only_argmax() {
        let d = dist(&[0.2, 0.5, 0.3]);
        let f = top_p_filter(&d, 0.0).unwrap();
        assert_eq!(f.as_slice(), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_p_one_keeps_full_support() {
        let d = dist(&[0.1, 0.0, 0.4, 0.2, 0.3]);
        let f = top_p_filter(&d, 1.0).unwrap();
        assert_eq!(f.support(), d.support());
        for (a, b) in f.as_slice().iter().zip(d.as_slice()) {
            assert_relative_eq!(a, b, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_boundary_outcome_is_kept_when_mass_before_is_below_p() {
        // Sorted: 0.5 (idx 1), 0.3 (idx 2), 0.2 (idx 0).
        // p = 0.6: 0.5 < 0.6 admits idx 2, then 0.8 >= 0.6 stops.
        let d = dist(&[0.2, 0.5, 0.3]);
        let f = top_p_filter(&d, 0.6).unwrap();
        assert_eq!(f.support(), vec![1, 2]);
        assert_relative_eq!(f.as_slice()[1], 0.625, max_relative = 1e-12);
        assert_relative_eq!(f.as_slice()[2], 0.375, max_relative = 1e-12);
    }

    #[test]
    fn test_p_one_keeps_tail_lost_to_rounding() {
        // 1.0 + 4.25e-18 rounds to 1.0, so the running sum is already 1
        // before the second outcome is visited.
        let l = LogitVector::new(vec![0.0, -40.0]).unwrap();
        let d = softmax_with_temperature(&l, 1.0).unwrap();
        assert_eq!(d.support(), vec![0, 1]);
        let f = top_p_filter(&d, 1.0).unwrap();
        assert_eq!(f.support(), vec![0, 1]);
    }

    #[test]
    fn test_p_one_keeps_tail_of_slightly_overweight_input() {
        // Sums to 1 + 6e-7, inside the accepted tolerance.
        let d = dist(&[0.6, 0.4000005, 1e-7]);
        let f = top_p_filter(&d, 1.0).unwrap();
        assert_eq!(f.support(), vec![0, 1, 2]);
        assert_normalized(&f);
    }

    #[test]
    fn test_mass_exactly_at_p_stops() {
        let d = dist(&[0.5, 0.25, 0.25]);
        let f = top_p_filter(&d, 0.5).unwrap();
        assert_eq!(f.support(), vec![0]);
    }

    #[test]
    fn test_mass_after_inclusion_rule() {
        let d = dist(&[0.2, 0.5, 0.3]);
        // 0.5 + 0.3 = 0.8 is not < 0.6, so only the arg-max survives.
        let f = top_p_filter_with_rule(&d, 0.6, NucleusRule::MassAfterInclusion).unwrap();
        assert_eq!(f.support(), vec![1]);
        let f = top_p_filter_with_rule(&d, 0.9, NucleusRule::MassAfterInclusion).unwrap();
        assert_eq!(f.support(), vec![1, 2]);
        // The last outcome would bring the mass to 1, which is not < 1.
        let f = top_p_filter_with_rule(&d, 1.0, NucleusRule::MassAfterInclusion).unwrap();
        assert_eq!(f.support(), vec![1, 2]);
    }

    #[test]
    fn test_ties_keep_index_order() {
        // Three-way tie: the lowest index is the arg-max, and the next
        // lowest wins the single remaining slot.
        let d = dist(&[0.1, 0.3, 0.3, 0.3]);
        let f = top_p_filter(&d, 0.5).unwrap();
        assert_eq!(f.support(), vec![1, 2]);
        let f = top_p_filter(&d, 0.0).unwrap();
        assert_eq!(f.support(), vec![1]);
    }

    #[test]
    fn test_zero_probability_never_included() {
        let d = dist(&[0.0, 1.0, 0.0]);
        let f = top_p_filter(&d, 1.0).unwrap();
        assert_eq!(f.as_slice(), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_invalid_threshold() {
        let d = dist(&[0.5, 0.5]);
        for p in [-0.01, 1.01, f64::NAN] {
            let err = top_p_filter(&d, p).unwrap_err();
            assert!(matches!(err, SamplerError::InvalidTopP(_)));
            assert!(err.is_invalid_argument());
        }
    }

    #[test]
    fn test_non_empty_and_contains_argmax() {
        for seed in 0..20 {
            let d = seeded_distribution(seed, 20).unwrap();
            for p in top_p_grid() {
                let f = top_p_filter(&d, p).unwrap();
                assert_normalized(&f);
                assert!(f.as_slice()[d.argmax()] > 0.0);
                assert!(f.support().iter().all(|i| d.as_slice()[*i] > 0.0));
            }
        }
    }

    #[test]
    fn test_support_grows_with_p() {
        for seed in 0..20 {
            let d = seeded_distribution(seed, 20).unwrap();
            let mut previous: Vec<usize> = Vec::new();
            for p in top_p_grid() {
                let support = top_p_filter(&d, p).unwrap().support();
                assert!(previous.iter().all(|i| support.contains(i)));
                previous = support;
            }
            assert_eq!(previous, d.support());
        }
    }

    #[test]
    fn test_end_to_end_small_case() {
        let l = LogitVector::new(vec![3.0, 1.0, 0.5]).unwrap();
        let d = softmax_with_temperature(&l, 1.0).unwrap();
        let sum = 3f64.exp() + 1f64.exp() + 0.5f64.exp();
        assert_relative_eq!(d.as_slice()[0], 3f64.exp() / sum, max_relative = 1e-12);
        // The arg-max alone already carries ~0.82 > 0.5.
        let f = top_p_filter(&d, 0.5).unwrap();
        assert_eq!(f.as_slice(), &[1.0, 0.0, 0.0]);
        assert_normalized(&f);
    }

    #[test]
    fn test_sampler_struct() {
        let d = dist(&[0.2, 0.5, 0.3]);
        let s = TopPSampler::new(0.6);
        assert_eq!(s.rule(), NucleusRule::MassBeforeInclusion);
        assert_eq!(s.filter(&d).unwrap().support(), vec![1, 2]);
        let s = s.with_rule(NucleusRule::MassAfterInclusion);
        assert_eq!(s.filter(&d).unwrap().support(), vec![1]);
    }
}
