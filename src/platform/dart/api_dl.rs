//! Functionality for calling [`Dart DL API`] from Rust.
//!
//! The API is resolved at runtime from the data passed by Dart code, so no
//! Dart SDK sources need to be linked into the library.
//!
//! [`Dart DL API`]: https://tinyurl.com/32e7fudh

use std::{
    ffi::{c_void, CStr},
    mem,
    os::raw::{c_char, c_int},
    ptr::NonNull,
};

use dart_sys::{Dart_CObject, Dart_Port};
use derive_more::Display;
use once_cell::sync::OnceCell;
use tracerr::Traced;

/// Major version of the Dart DL API this library is compatible with.
pub const DART_API_DL_MAJOR_VERSION: c_int = 2;

/// Name of the posting function in the Dart DL API functions table.
const POST_C_OBJECT_NAME: &str = "Dart_PostCObject";

/// Signature of the [`Dart_PostCObject`][1] function.
///
/// [1]: https://tinyurl.com/2p8kxdbx
pub type PostCObjectFn = unsafe extern "C" fn(
    port_id: Dart_Port,
    message: *mut Dart_CObject,
) -> bool;

/// Resolved [`PostCObjectFn`].
///
/// Set once by [`initialize()`].
static POST_C_OBJECT: OnceCell<PostCObjectFn> = OnceCell::new();

/// Entry of the Dart DL API functions table.
#[repr(C)]
struct DartApiEntry {
    /// NUL-terminated name of the function. Null for the terminating entry.
    name: *const c_char,

    /// Pointer to the function.
    function: Option<unsafe extern "C" fn()>,
}

/// Data structure returned by [`NativeApi.initializeApiDLData`][1].
///
/// [1]: https://api.dart.dev/dart-ffi/NativeApi/initializeApiDLData.html
#[repr(C)]
struct DartApi {
    /// Major version of the provided API.
    major: c_int,

    /// Minor version of the provided API.
    minor: c_int,

    /// Null-terminated table of the provided functions.
    functions: *const DartApiEntry,
}

/// Errors of using Dart DL API.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ApiDlError {
    /// Initialization data pointer is null.
    #[display(fmt = "Dart API DL data is null")]
    NullData,

    /// Dart provides an incompatible API version.
    #[display(
        fmt = "Dart API DL major version mismatch: expected {}, got {}",
        expected,
        actual
    )]
    VersionMismatch {
        /// Supported major version.
        expected: c_int,

        /// Provided major version.
        actual: c_int,
    },

    /// A required function is absent in the functions table.
    #[display(fmt = "Dart API DL doesn't provide `{}` function", _0)]
    MissingFunction(&'static str),

    /// API is used before [`initialize()`] succeeded.
    #[display(fmt = "Dart API DL is not initialized")]
    NotInitialized,
}

type Result<T> = std::result::Result<T, Traced<ApiDlError>>;

/// Initializes usage of Dynamically Linked Dart API.
///
/// Only the first successful call registers the API, subsequent ones just
/// validate the provided `data`.
///
/// # Errors
///
/// If `data` is null, has incompatible version, or lacks required functions.
///
/// # Safety
///
/// `data` must be either null or the pointer returned by
/// [`NativeApi.initializeApiDLData`][1] in Dart.
///
/// [1]: https://api.dart.dev/dart-ffi/NativeApi/initializeApiDLData.html
pub unsafe fn initialize(data: *mut c_void) -> Result<()> {
    let post = resolve(data)?;
    let _ = POST_C_OBJECT.set(post);
    Ok(())
}

/// Indicates whether Dart DL API is initialized.
#[inline]
#[must_use]
pub fn is_initialized() -> bool {
    POST_C_OBJECT.get().is_some()
}

/// Posts a message on the provided port. The message will contain the
/// [`Dart_CObject`] object graph rooted in `message`.
///
/// Returns `true` if the message was enqueued, `false` otherwise.
///
/// # Errors
///
/// With [`ApiDlError::NotInitialized`] if called before [`initialize()`].
///
/// # Safety
///
/// `message` must point to a valid [`Dart_CObject`] graph, which must not be
/// accessed while the message is being sent.
pub unsafe fn post_c_object(
    port: Dart_Port,
    message: *mut Dart_CObject,
) -> Result<bool> {
    let post = POST_C_OBJECT
        .get()
        .ok_or_else(|| tracerr::new!(ApiDlError::NotInitialized))?;
    Ok(post(port, message))
}

/// Validates the provided Dart DL API `data` and resolves the
/// [`PostCObjectFn`] from it.
unsafe fn resolve(data: *mut c_void) -> Result<PostCObjectFn> {
    let api = NonNull::new(data.cast::<DartApi>())
        .ok_or_else(|| tracerr::new!(ApiDlError::NullData))?;
    let api = api.as_ref();

    if api.major != DART_API_DL_MAJOR_VERSION {
        return Err(tracerr::new!(ApiDlError::VersionMismatch {
            expected: DART_API_DL_MAJOR_VERSION,
            actual: api.major,
        }));
    }

    let function = lookup(api.functions, POST_C_OBJECT_NAME).ok_or_else(|| {
        tracerr::new!(ApiDlError::MissingFunction(POST_C_OBJECT_NAME))
    })?;
    Ok(mem::transmute::<unsafe extern "C" fn(), PostCObjectFn>(function))
}

/// Looks up a function with the provided `name` in a null-terminated
/// functions table.
unsafe fn lookup(
    mut entry: *const DartApiEntry,
    name: &str,
) -> Option<unsafe extern "C" fn()> {
    if entry.is_null() {
        return None;
    }
    while !(*entry).name.is_null() {
        if CStr::from_ptr((*entry).name).to_bytes() == name.as_bytes() {
            return (*entry).function;
        }
        entry = entry.add(1);
    }
    None
}
