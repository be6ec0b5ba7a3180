mod types;
mod error;

pub use types::*;
pub use error::*;

use std::ffi::CString;
use std::os::raw::c_char;

use ll_sampler::{LogitVector, OccurrenceCounts, ProbabilityVector, SamplingParams};

/// Execute a closure that returns an `LLStatus`, catching any panics
/// and converting them into `LLStatus::ErrorInternal`.
fn catch_panic<F: FnOnce() -> LLStatus + std::panic::UnwindSafe>(f: F) -> LLStatus {
    match std::panic::catch_unwind(f) {
        Ok(status) => status,
        Err(_) => {
            set_last_error("internal panic".to_string());
            LLStatus::ErrorInternal
        }
    }
}

/// Copy `len` elements starting at `ptr`, rejecting null pointers and empty
/// input. Copying first lets callers pass the same buffer as input and output.
unsafe fn read_input<T: Copy>(ptr: *const T, len: usize, name: &str) -> Result<Vec<T>, LLStatus> {
    if ptr.is_null() {
        return Err(invalid_argument(format!("{} is null", name)));
    }
    if len == 0 {
        return Err(invalid_argument(format!("{} is empty", name)));
    }
    Ok(std::slice::from_raw_parts(ptr, len).to_vec())
}

/// Write `values` into the caller's `out` buffer of the same length.
unsafe fn write_output(out: *mut f64, values: &[f64]) -> LLStatus {
    if out.is_null() {
        return invalid_argument("out is null");
    }
    std::slice::from_raw_parts_mut(out, values.len()).copy_from_slice(values);
    LLStatus::Ok
}

/// Compute the temperature softmax of `len` logits into `out`.
///
/// `out` must have room for `len` values; it may alias `logits`.
#[no_mangle]
pub unsafe extern "C" fn ll_softmax(
    logits: *const f64,
    len: usize,
    temperature: f64,
    out: *mut f64,
) -> LLStatus {
    catch_panic(|| {
        let values = match unsafe { read_input(logits, len, "logits") } {
            Ok(v) => v,
            Err(status) => return status,
        };
        let result = LogitVector::new(values)
            .and_then(|l| ll_sampler::softmax_with_temperature(&l, temperature));
        match result {
            Ok(dist) => unsafe { write_output(out, dist.as_slice()) },
            Err(e) => report(&e),
        }
    })
}

/// Apply the nucleus filter with threshold `p` to a distribution of `len`
/// probabilities, writing the renormalized result into `out`.
///
/// `rule` is one of the `LL_NUCLEUS_*` selectors.
#[no_mangle]
pub unsafe extern "C" fn ll_top_p(
    probs: *const f64,
    len: usize,
    p: f64,
    rule: u32,
    out: *mut f64,
) -> LLStatus {
    catch_panic(|| {
        let rule = match nucleus_rule_from_raw(rule) {
            Some(r) => r,
            None => return invalid_argument(format!("unknown nucleus rule {}", rule)),
        };
        let values = match unsafe { read_input(probs, len, "probs") } {
            Ok(v) => v,
            Err(status) => return status,
        };
        let result = ProbabilityVector::new(values)
            .and_then(|d| ll_sampler::top_p_filter_with_rule(&d, p, rule));
        match result {
            Ok(dist) => unsafe { write_output(out, dist.as_slice()) },
            Err(e) => report(&e),
        }
    })
}

/// Subtract presence and frequency penalties from `len` logits, given
/// `len` prior occurrence counts.
#[no_mangle]
pub unsafe extern "C" fn ll_apply_penalties(
    logits: *const f64,
    counts: *const u32,
    len: usize,
    presence_penalty: f64,
    frequency_penalty: f64,
    out: *mut f64,
) -> LLStatus {
    catch_panic(|| {
        let values = match unsafe { read_input(logits, len, "logits") } {
            Ok(v) => v,
            Err(status) => return status,
        };
        let counts = match unsafe { read_input(counts, len, "counts") } {
            Ok(c) => OccurrenceCounts::new(c),
            Err(status) => return status,
        };
        let result = LogitVector::new(values).and_then(|l| {
            ll_sampler::apply_penalties(&l, &counts, presence_penalty, frequency_penalty)
        });
        match result {
            Ok(adjusted) => unsafe { write_output(out, adjusted.as_slice()) },
            Err(e) => report(&e),
        }
    })
}

/// Run penalty → softmax → top-p over `len` logits.
///
/// `counts` may be null, in which case the penalty stage is skipped.
#[no_mangle]
pub unsafe extern "C" fn ll_pipeline(
    logits: *const f64,
    counts: *const u32,
    len: usize,
    params: LLSamplingParams,
    out: *mut f64,
) -> LLStatus {
    catch_panic(|| {
        let values = match unsafe { read_input(logits, len, "logits") } {
            Ok(v) => v,
            Err(status) => return status,
        };
        let counts = if counts.is_null() {
            None
        } else {
            match unsafe { read_input(counts, len, "counts") } {
                Ok(c) => Some(OccurrenceCounts::new(c)),
                Err(status) => return status,
            }
        };
        let params = match SamplingParams::try_from(params) {
            Ok(p) => p,
            Err(raw) => return invalid_argument(format!("unknown nucleus rule {}", raw)),
        };
        let result = LogitVector::new(values)
            .and_then(|l| ll_sampler::run_pipeline(&l, counts.as_ref(), &params));
        match result {
            Ok(dist) => unsafe { write_output(out, dist.as_slice()) },
            Err(e) => report(&e),
        }
    })
}

/// Parameters that leave the distribution unchanged: temperature 1, top-p 1,
/// no penalties.
#[no_mangle]
pub extern "C" fn ll_sampling_params_default() -> LLSamplingParams {
    LLSamplingParams::default()
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error, or
/// null if no error has occurred. The caller must free the returned string
/// with `ll_free_string`.
#[no_mangle]
pub extern "C" fn ll_last_error() -> *const c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null(),
    }
}

/// Free a string previously returned by `ll_last_error`.
#[no_mangle]
pub unsafe extern "C" fn ll_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
