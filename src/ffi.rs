//! FFI bindings for Synheart Fit
//!
//! This module provides C-compatible functions for calling Fit from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `synfit_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::error::ComputeError;
use crate::hrv::{HrvOptions, DEFAULT_NN50_THRESHOLD_MS};
use crate::pipeline::{hrv_from_rr_json, summarize_decoded_json, FitProcessor};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Hand a pipeline result across the boundary, recording the error on failure
fn result_to_cstr(result: Result<String, ComputeError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Summarize decoder JSON and return the activity report JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `synfit_free_string`.
/// - Returns NULL on error; call `synfit_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn synfit_summarize_json(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    result_to_cstr(summarize_decoded_json(json_str))
}

/// Compute HRV metrics from a JSON array of RR intervals (ms).
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string (`null` JSON when there is too little data)
///   that must be freed with `synfit_free_string`.
/// - Returns NULL on error; call `synfit_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn synfit_hrv_from_rr_json(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    result_to_cstr(hrv_from_rr_json(json_str))
}

/// List the non-empty message groups in decoder JSON as a JSON array.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `synfit_free_string`.
/// - Returns NULL on error; call `synfit_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn synfit_catalog_json(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let processor = FitProcessor::new();
    let result = processor.normalize(&json_str).and_then(|(groups, _)| {
        serde_json::to_string(&processor.catalog(&groups)).map_err(ComputeError::JsonError)
    });
    result_to_cstr(result)
}

// ============================================================================
// Processor API
// ============================================================================

/// Opaque handle to a FitProcessor
pub struct FitProcessorHandle {
    processor: FitProcessor,
}

/// Create a new FitProcessor with the given pNN50 threshold.
///
/// # Safety
/// - Returns a pointer to a newly allocated FitProcessor.
/// - Must be freed with `synfit_processor_free`.
/// - A non-positive or non-finite threshold selects the default (50 ms).
#[no_mangle]
pub unsafe extern "C" fn synfit_processor_new(nn50_threshold_ms: f64) -> *mut FitProcessorHandle {
    clear_last_error();

    let threshold = if nn50_threshold_ms.is_finite() && nn50_threshold_ms > 0.0 {
        nn50_threshold_ms
    } else {
        DEFAULT_NN50_THRESHOLD_MS
    };

    let processor = FitProcessor::with_options(HrvOptions {
        nn50_threshold_ms: threshold,
        ..Default::default()
    });
    let handle = Box::new(FitProcessorHandle { processor });
    Box::into_raw(handle)
}

/// Free a FitProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `synfit_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn synfit_processor_free(processor: *mut FitProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Summarize decoder JSON with a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `synfit_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `synfit_free_string`.
/// - Returns NULL on error; call `synfit_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn synfit_processor_process(
    processor: *const FitProcessorHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Invalid processor pointer");
        return ptr::null_mut();
    }

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let handle = &*processor;
    result_to_cstr(handle.processor.process_to_json(&json_str))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Fit functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Fit function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn synfit_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Fit function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn synfit_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Fit library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn synfit_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_decoded_json() -> CString {
        CString::new(
            r#"{
            "sessionMesgs": [{ "sport": "running", "avgHeartRate": 150 }],
            "recordMesgs": [{ "heartRate": 140 }, { "heartRate": 160 }],
            "hrvMesgs": [{ "time": [0.8, 0.85, 0.82] }]
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_summarize_json() {
        let json = sample_decoded_json();

        unsafe {
            let result = synfit_summarize_json(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let value: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(value["summary"]["avgHeartRate"], 150.0);
            assert_eq!(value["summary"]["maxHeartRate"], 160.0);

            synfit_free_string(result);
        }
    }

    #[test]
    fn test_ffi_catalog_json() {
        let json = sample_decoded_json();

        unsafe {
            let result = synfit_catalog_json(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let value: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(value.as_array().unwrap().len(), 3);
            assert_eq!(value[1]["key"], "record");
            assert_eq!(value[1]["count"], 2);

            synfit_free_string(result);
        }
    }

    #[test]
    fn test_ffi_hrv_from_rr_json() {
        let json = CString::new("[800, 850, 820, 900, 780]").unwrap();
        let too_short = CString::new("[800]").unwrap();

        unsafe {
            let result = synfit_hrv_from_rr_json(json.as_ptr());
            assert!(!result.is_null());
            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("\"meanNN\":830.0"));
            synfit_free_string(result);

            let result = synfit_hrv_from_rr_json(too_short.as_ptr());
            assert_eq!(CStr::from_ptr(result).to_str().unwrap(), "null");
            synfit_free_string(result);
        }
    }

    #[test]
    fn test_ffi_processor_lifecycle() {
        unsafe {
            let processor = synfit_processor_new(0.0);
            assert!(!processor.is_null());

            let json = sample_decoded_json();
            let result = synfit_processor_process(processor, json.as_ptr());
            assert!(!result.is_null());
            synfit_free_string(result);

            synfit_processor_free(processor);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid_json = CString::new("not json").unwrap();

            let result = synfit_summarize_json(invalid_json.as_ptr());
            assert!(result.is_null());

            let error = synfit_last_error();
            assert!(!error.is_null());

            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());

            let result = synfit_summarize_json(ptr::null());
            assert!(result.is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = synfit_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
