//! `ll-sampler` - Decoding-parameter transforms for logit-lab.
//!
//! This crate provides:
//! - Typed outcome vectors (`LogitVector`, `ProbabilityVector`, `OccurrenceCounts`)
//! - Softmax with temperature
//! - Nucleus (top-p) truncation
//! - Presence and frequency penalties
//! - A `SamplerChain` composing the stages, driven by `SamplingParams`
//! - Seeded demo inputs and parameter grids

pub mod demo;
pub mod error;
pub mod params;
pub mod penalty;
pub mod sampler;
pub mod temperature;
pub mod top_p;
pub mod vector;

pub use error::{Result, SamplerError};
pub use params::SamplingParams;
pub use penalty::{apply_penalties, PenaltySampler};
pub use sampler::{run_pipeline, ChainTrace, DistributionFilter, LogitProcessor, SamplerChain};
pub use temperature::{softmax_with_temperature, TemperatureSampler};
pub use top_p::{top_p_filter, top_p_filter_with_rule, NucleusRule, TopPSampler};
pub use vector::{LogitVector, OccurrenceCounts, ProbabilityVector};
