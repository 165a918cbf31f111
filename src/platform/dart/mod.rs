//! Integration with the Dart runtime hosting this library.

pub mod api_dl;
mod port;

pub use self::port::DartPortSink;
