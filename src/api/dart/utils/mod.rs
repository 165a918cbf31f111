//! Helpers for passing data through FFI boundaries.

mod string;

pub use self::string::{
    c_str_into_string, c_str_n_into_string, release_c_str, string_into_c_str,
    FreePointer,
};
