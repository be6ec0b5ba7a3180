use std::cell::RefCell;
use std::ffi::CString;

use ll_sampler::SamplerError;

use crate::types::LLStatus;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Store an error message for later retrieval via `ll_last_error`.
pub fn set_last_error(msg: String) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Take the last error message, leaving `None` in its place.
pub fn take_last_error() -> Option<CString> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}

/// Record a sampler error and return the matching status code.
pub fn report(err: &SamplerError) -> LLStatus {
    set_last_error(err.to_string());
    LLStatus::from(err)
}

/// Record an argument error detected at the boundary itself.
pub fn invalid_argument(msg: impl Into<String>) -> LLStatus {
    set_last_error(msg.into());
    LLStatus::ErrorInvalidArgument
}
