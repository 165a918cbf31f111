//! Greeting library exposed to a [Flutter] host over Dart FFI.
//!
//! Requests are dispatched without blocking the caller, and their results are
//! posted asynchronously into Dart native ports: exactly one message per
//! request, either a greeting or an error description.
//!
//! [Flutter]: https://flutter.dev

#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

pub mod api;
pub mod bridge;
pub mod conf;
pub mod duration;
pub mod executor;
pub mod greeting;
pub mod log;
pub mod platform;

#[doc(inline)]
pub use self::{
    bridge::{PortBridge, PortSink, Request},
    conf::Conf,
    executor::Executor,
    greeting::{GreetError, GREETING_TEMPLATE},
};
