//! C bindings for iOS.
//!
//! Returned strings are owned by the library until released with
//! `FreePointer`.

#![allow(non_snake_case)]

use std::{os::raw::c_char, ptr};

use flutter_greeter::api::dart::utils::{c_str_into_string, string_into_c_str};

pub use flutter_greeter::api::dart::utils::FreePointer;

/// Returns a greeting message for the provided `name`.
///
/// On failure returns null and, if `error` is not null, stores an error
/// description into it.
///
/// # Safety
///
/// `name` must be either null or a valid NUL-terminated string. `error` must
/// be either null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn MobileSayHi(
    name: *const c_char,
    error: *mut *mut c_char,
) -> *mut c_char {
    let res = c_str_into_string(name)
        .ok_or_else(|| missing("name"))
        .and_then(|name| crate::say_hi(&name).map_err(describe));
    respond(res, error)
}

/// Returns a greeting message for the provided `name` after the provided
/// `duration` elapses, blocking the calling thread.
///
/// On failure returns null and, if `error` is not null, stores an error
/// description into it.
///
/// # Safety
///
/// `name` and `duration` must be either null or valid NUL-terminated strings.
/// `error` must be either null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn MobileSayHiWithDuration(
    name: *const c_char,
    duration: *const c_char,
    error: *mut *mut c_char,
) -> *mut c_char {
    let res = c_str_into_string(name)
        .ok_or_else(|| missing("name"))
        .and_then(|name| {
            let duration = c_str_into_string(duration)
                .ok_or_else(|| missing("duration"))?;
            crate::say_hi_with_duration(&name, &duration).map_err(describe)
        });
    respond(res, error)
}

/// Describes a null argument with the provided `name`.
fn missing(name: &str) -> String {
    format!("`{}` must not be null", name)
}

/// Describes the provided error.
fn describe(e: tracerr::Traced<flutter_greeter::GreetError>) -> String {
    e.as_ref().to_string()
}

/// Hands out the provided result to the C caller.
unsafe fn respond(
    res: Result<String, String>,
    error: *mut *mut c_char,
) -> *mut c_char {
    match res {
        Ok(greeting) => {
            if !error.is_null() {
                *error = ptr::null_mut();
            }
            string_into_c_str(greeting)
        }
        Err(e) => {
            if !error.is_null() {
                *error = string_into_c_str(e);
            }
            ptr::null_mut()
        }
    }
}
