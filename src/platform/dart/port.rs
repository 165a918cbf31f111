//! [`PortSink`] posting into Dart native ports.

use std::{ffi::CString, os::raw::c_char};

use dart_sys::{Dart_CObject, Dart_CObjectValue, Dart_CObject_Type};

use crate::{
    bridge::{PortId, PortSink},
    log::prelude::*,
    platform::dart::api_dl,
};

/// [`PortSink`] posting messages as Dart `String`s via
/// [`api_dl::post_c_object()`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DartPortSink;

impl PortSink for DartPortSink {
    fn post(&self, port: PortId, message: String) -> bool {
        let message = into_c_string(message);
        let mut obj = Dart_CObject {
            type_: Dart_CObject_Type::String,
            value: Dart_CObjectValue {
                as_string: message.as_ptr() as *mut c_char,
            },
        };

        // Dart copies string payloads, so `message` may be freed right after.
        match unsafe { api_dl::post_c_object(port, &mut obj) } {
            Ok(true) => true,
            Ok(false) => {
                warn!("Could not send message to Dart's native port";
                      "port" => port);
                false
            }
            Err(e) => {
                error!("Could not send message to Dart's native port: {}",
                       e.as_ref(); "port" => port);
                false
            }
        }
    }
}

/// Converts the provided `string` into a [`CString`], stripping interior NUL
/// bytes.
fn into_c_string(string: String) -> CString {
    CString::new(string).unwrap_or_else(|e| {
        let mut bytes = e.into_vec();
        bytes.retain(|b| *b != 0);
        CString::new(bytes).unwrap_or_default()
    })
}
