use ll_sampler::{NucleusRule, SamplerError, SamplingParams};

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LLStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    ErrorInternal = 2,
}

impl From<&SamplerError> for LLStatus {
    fn from(e: &SamplerError) -> Self {
        if e.is_invalid_argument() {
            LLStatus::ErrorInvalidArgument
        } else {
            LLStatus::ErrorInternal
        }
    }
}

/// Raw selector for `NucleusRule::MassBeforeInclusion`.
pub const LL_NUCLEUS_MASS_BEFORE_INCLUSION: u32 = 0;
/// Raw selector for `NucleusRule::MassAfterInclusion`.
pub const LL_NUCLEUS_MASS_AFTER_INCLUSION: u32 = 1;

/// Map a raw rule selector received from C. Unknown values yield `None`.
pub fn nucleus_rule_from_raw(raw: u32) -> Option<NucleusRule> {
    match raw {
        LL_NUCLEUS_MASS_BEFORE_INCLUSION => Some(NucleusRule::MassBeforeInclusion),
        LL_NUCLEUS_MASS_AFTER_INCLUSION => Some(NucleusRule::MassAfterInclusion),
        _ => None,
    }
}

/// Parameters controlling the penalty → softmax → top-p pipeline.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct LLSamplingParams {
    pub temperature: f64,
    pub top_p: f64,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
    /// One of the `LL_NUCLEUS_*` selectors.
    pub nucleus_rule: u32,
}

impl Default for LLSamplingParams {
    fn default() -> Self {
        let params = SamplingParams::default();
        Self {
            temperature: params.temperature,
            top_p: params.top_p,
            presence_penalty: params.presence_penalty,
            frequency_penalty: params.frequency_penalty,
            nucleus_rule: LL_NUCLEUS_MASS_BEFORE_INCLUSION,
        }
    }
}

impl TryFrom<LLSamplingParams> for SamplingParams {
    /// The unrecognized `nucleus_rule` selector.
    type Error = u32;

    fn try_from(p: LLSamplingParams) -> Result<Self, u32> {
        let rule = nucleus_rule_from_raw(p.nucleus_rule).ok_or(p.nucleus_rule)?;
        Ok(SamplingParams::default()
            .with_temperature(p.temperature)
            .with_top_p(p.top_p)
            .with_penalties(p.presence_penalty, p.frequency_penalty)
            .with_nucleus_rule(rule))
    }
}
