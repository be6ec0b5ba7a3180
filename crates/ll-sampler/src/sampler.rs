use tracing::debug;

use crate::error::Result;
use crate::params::SamplingParams;
use crate::penalty::PenaltySampler;
use crate::temperature::TemperatureSampler;
use crate::top_p::TopPSampler;
use crate::vector::{LogitVector, OccurrenceCounts, ProbabilityVector};

/// A stage that rewrites logits before they are normalized.
pub trait LogitProcessor: Send + Sync {
    /// Returns the name of this stage.
    fn name(&self) -> &str;

    /// Produce adjusted logits. The input is left untouched.
    fn process(&self, logits: &LogitVector) -> Result<LogitVector>;
}

/// A stage that reshapes an already normalized distribution.
pub trait DistributionFilter: Send + Sync {
    /// Returns the name of this stage.
    fn name(&self) -> &str;

    /// Produce a new distribution whose support is a subset of the input's.
    fn apply(&self, dist: &ProbabilityVector) -> Result<ProbabilityVector>;
}

impl LogitProcessor for PenaltySampler {
    fn name(&self) -> &str {
        "penalty"
    }

    fn process(&self, logits: &LogitVector) -> Result<LogitVector> {
        self.adjust(logits)
    }
}

impl DistributionFilter for TopPSampler {
    fn name(&self) -> &str {
        "top_p"
    }

    fn apply(&self, dist: &ProbabilityVector) -> Result<ProbabilityVector> {
        self.filter(dist)
    }
}

/// Every intermediate vector of one pass through a [`SamplerChain`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChainTrace {
    /// Logits after all processors ran.
    pub logits: LogitVector,
    /// Softmax output before any filter.
    pub distribution: ProbabilityVector,
    /// Final distribution after all filters.
    pub filtered: ProbabilityVector,
}

/// Composes logit processors, a temperature softmax and distribution filters
/// into a pipeline:
///
/// processors (in order) → temperature softmax → filters (in order)
pub struct SamplerChain {
    processors: Vec<Box<dyn LogitProcessor>>,
    temperature: TemperatureSampler,
    filters: Vec<Box<dyn DistributionFilter>>,
}

impl SamplerChain {
    /// Create a chain with no processors or filters.
    pub fn new(temperature: TemperatureSampler) -> Self {
        Self {
            processors: Vec::new(),
            temperature,
            filters: Vec::new(),
        }
    }

    /// Build the standard penalty → softmax → top-p chain.
    ///
    /// The penalty stage is only added when `counts` is given. Parameters are
    /// validated up front so a bad value fails before any work is done.
    pub fn from_params(params: &SamplingParams, counts: Option<OccurrenceCounts>) -> Result<Self> {
        params.validate()?;
        let mut chain = SamplerChain::new(TemperatureSampler::new(params.temperature));
        if let Some(counts) = counts {
            chain = chain.with_processor(Box::new(PenaltySampler::new(
                params.presence_penalty,
                params.frequency_penalty,
                counts,
            )));
        }
        Ok(chain.with_filter(Box::new(
            TopPSampler::new(params.top_p).with_rule(params.nucleus_rule),
        )))
    }

    /// Add a logit processor after the existing ones.
    pub fn with_processor(mut self, processor: Box<dyn LogitProcessor>) -> Self {
        self.processors.push(processor);
        self
    }

    /// Add a distribution filter after the existing ones.
    pub fn with_filter(mut self, filter: Box<dyn DistributionFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.processors
            .iter()
            .map(|p| p.name())
            .chain(std::iter::once("temperature"))
            .chain(self.filters.iter().map(|f| f.name()))
            .collect()
    }

    /// Run every stage and keep the intermediate vectors.
    pub fn trace(&self, logits: &LogitVector) -> Result<ChainTrace> {
        let mut current = logits.clone();
        for processor in &self.processors {
            current = processor.process(&current)?;
        }

        let distribution = self.temperature.build(&current)?;

        let mut filtered = distribution.clone();
        for filter in &self.filters {
            filtered = filter.apply(&filtered)?;
        }

        let support = filtered.support();
        let retained_mass: f64 = support.iter().map(|&i| distribution.as_slice()[i]).sum();
        debug!(
            k = logits.len(),
            temperature = self.temperature.temperature(),
            support = support.len(),
            retained_mass,
            "ran sampler chain"
        );

        Ok(ChainTrace {
            logits: current,
            distribution,
            filtered,
        })
    }

    /// Run every stage and return the final distribution.
    pub fn run(&self, logits: &LogitVector) -> Result<ProbabilityVector> {
        Ok(self.trace(logits)?.filtered)
    }

    /// Index of the most probable outcome in the final distribution.
    pub fn most_likely(&self, logits: &LogitVector) -> Result<usize> {
        Ok(self.run(logits)?.argmax())
    }
}

impl Default for SamplerChain {
    fn default() -> Self {
        Self::new(TemperatureSampler::default())
    }
}

/// Convenience wrapper for a single pass of the standard chain.
pub fn run_pipeline(
    logits: &LogitVector,
    counts: Option<&OccurrenceCounts>,
    params: &SamplingParams,
) -> Result<ProbabilityVector> {
    SamplerChain::from_params(params, counts.cloned())?.run(logits)
}
