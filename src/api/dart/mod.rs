//! External API exposing functions that can be called via FFI and designed to
//! be integrated into a [Flutter] application.
//!
//! [`Init`] must be called before any other function of this module.
//!
//! [Flutter]: https://flutter.dev

#![allow(non_snake_case)]

pub mod utils;

use std::{
    ffi::c_void,
    os::raw::{c_char, c_int},
};

use dart_sys::Dart_Port;
use once_cell::sync::OnceCell;

use crate::{
    bridge::{PortBridge, Request},
    conf::Conf,
    executor::Executor,
    log::{self, prelude::*},
    platform::dart::{api_dl, DartPortSink},
};

use self::utils::c_str_n_into_string;

pub use self::utils::FreePointer;

/// Configuration loaded on the first use of this API.
static CONF: OnceCell<Conf> = OnceCell::new();

/// [`PortBridge`] serving all the requests of this API.
static BRIDGE: OnceCell<PortBridge<DartPortSink>> = OnceCell::new();

/// Initializes the library: loads its [`Conf`], starts logging, registers the
/// Dart DL API and the background executor.
///
/// Returns `0` on success, or `-1` on failure.
///
/// # Safety
///
/// Intended to be called ONLY with [`NativeApi.initializeApiDLData`][1] from
/// Dart.
///
/// [1]: https://api.dart.dev/dart-ffi/NativeApi/initializeApiDLData.html
#[no_mangle]
pub unsafe extern "C" fn Init(api: *mut c_void) -> libc::intptr_t {
    let _ = conf();

    if let Err(e) = api_dl::initialize(api) {
        error!("Failed to initialize Dart API DL: {}", e.as_ref());
        return -1;
    }
    if bridge().is_none() {
        return -1;
    }

    info!("Library initialized");
    0
}

/// Greets the provided `name` asynchronously, posting the greeting to the
/// provided `port`.
///
/// # Safety
///
/// `name` must be either null or valid for reads of `name_len` bytes. It's
/// copied before this function returns.
#[no_mangle]
pub unsafe extern "C" fn SayHi(
    port: Dart_Port,
    name: *const c_char,
    name_len: c_int,
) {
    let name = c_str_n_into_string(name, name_len);
    dispatch(port, Request::SayHi { name });
}

/// Greets the provided `name` asynchronously after the provided `duration`
/// elapses, posting the greeting to the provided `port`.
///
/// If `duration` can't be parsed, an error description prefixed with
/// `Error: ` is posted to the `port` instead.
///
/// # Safety
///
/// `name` and `duration` must be either null or valid for reads of
/// `name_len` and `duration_len` bytes respectively. They're copied before
/// this function returns.
#[no_mangle]
pub unsafe extern "C" fn SayHiWithDuration(
    port: Dart_Port,
    name: *const c_char,
    name_len: c_int,
    duration: *const c_char,
    duration_len: c_int,
) {
    let name = c_str_n_into_string(name, name_len);
    let duration = c_str_n_into_string(duration, duration_len);
    dispatch(port, Request::SayHiWithDuration { name, duration });
}

/// Dispatches the provided [`Request`] to the global [`PortBridge`].
fn dispatch(port: Dart_Port, request: Request) {
    match bridge() {
        Some(bridge) => drop(bridge.dispatch(port, request)),
        None => error!(
            "Request is dropped, as executor is unavailable";
            "op" => request.operation(), "port" => port,
        ),
    }
}

/// Returns the global [`Conf`], loading it on the first call.
///
/// Logging is initialized along with it. Malformed configuration is reported
/// and replaced with the default one.
fn conf() -> &'static Conf {
    CONF.get_or_init(|| {
        let (conf, err) = match Conf::parse() {
            Ok(conf) => (conf, None),
            Err(e) => (Conf::default(), Some(e)),
        };
        log::init(&conf.log);
        if let Some(e) = err {
            warn!("Failed to load configuration, using defaults: {}", e);
        }
        conf
    })
}

/// Returns the global [`PortBridge`], starting it on the first call.
///
/// Returns [`None`] if its [`Executor`] can't be started.
fn bridge() -> Option<&'static PortBridge<DartPortSink>> {
    BRIDGE
        .get_or_try_init(|| {
            Executor::new(&conf().executor)
                .map(|executor| PortBridge::new(DartPortSink, executor))
        })
        .map_err(|e| error!("Failed to start executor: {}", e))
        .ok()
}
