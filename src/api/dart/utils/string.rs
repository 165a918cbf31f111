//! Helper functionality for passing [`String`]s through FFI boundaries.

use std::{
    collections::HashSet,
    ffi::{CStr, CString},
    os::raw::{c_char, c_int},
    slice,
    sync::{Mutex, PoisonError},
};

use once_cell::sync::Lazy;

use crate::log::prelude::*;

/// Addresses of the C strings handed out by [`string_into_c_str()`] and not
/// released yet.
static HANDED_OUT: Lazy<Mutex<HashSet<usize>>> =
    Lazy::new(|| Mutex::new(HashSet::new()));

/// Copies a Rust [`String`] out of the provided raw buffer of `len` UTF-8
/// bytes.
///
/// Invalid UTF-8 sequences are replaced with `U+FFFD`. A null `ptr` or a
/// negative `len` produce an empty [`String`].
///
/// # Safety
///
/// If not null, `ptr` must be valid for reads of `len` bytes.
#[must_use]
pub unsafe fn c_str_n_into_string(ptr: *const c_char, len: c_int) -> String {
    if ptr.is_null() || len <= 0 {
        return String::new();
    }
    #[allow(clippy::cast_sign_loss)]
    let bytes = slice::from_raw_parts(ptr.cast::<u8>(), len as usize);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Copies a Rust [`String`] out of the provided NUL-terminated C string.
///
/// Invalid UTF-8 sequences are replaced with `U+FFFD`. Returns [`None`] if
/// `ptr` is null.
///
/// # Safety
///
/// Same as for [`CStr::from_ptr()`], if `ptr` is not null.
#[must_use]
pub unsafe fn c_str_into_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

/// Leaks the given [`String`] returning a raw C string that can be passed
/// through FFI boundaries.
///
/// The returned pointer must be released via [`FreePointer()`]. Interior NUL
/// bytes are stripped.
#[must_use]
pub fn string_into_c_str(string: String) -> *mut c_char {
    let c_str = CString::new(string)
        .unwrap_or_else(|e| {
            let mut bytes = e.into_vec();
            bytes.retain(|b| *b != 0);
            CString::new(bytes).unwrap_or_default()
        })
        .into_raw();
    HANDED_OUT
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(c_str as usize);
    c_str
}

/// Retakes ownership over a C string previously handed out by
/// [`string_into_c_str()`] and deallocates it.
///
/// Returns `false` without touching the memory if `ptr` is null, unknown or
/// already released.
///
/// # Safety
///
/// Must not be called concurrently with any reads of `ptr`.
pub unsafe fn release_c_str(ptr: *mut c_char) -> bool {
    if ptr.is_null() {
        return false;
    }
    let known = HANDED_OUT
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&(ptr as usize));
    if known {
        drop(CString::from_raw(ptr));
    }
    known
}

/// Frees a string previously handed out by this library.
///
/// Releasing a null, unknown or already released pointer is a no-op.
///
/// # Safety
///
/// Same as for [`release_c_str()`].
#[allow(non_snake_case)]
#[no_mangle]
pub unsafe extern "C" fn FreePointer(ptr: *mut c_char) {
    if !release_c_str(ptr) {
        warn!("Ignored release of unknown pointer {:p}", ptr);
    }
}
