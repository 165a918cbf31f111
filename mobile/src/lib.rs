//! In-process greeting API for mobile platforms, where no asynchronous port
//! bridge is needed.
//!
//! Exposed as plain Rust functions, as JNI methods of the `mobile.Mobile`
//! Java class, and as C functions for iOS.

#![allow(clippy::module_name_repetitions)]

pub mod android;
pub mod ios;

use std::sync::Once;

use flutter_greeter::{
    greeting,
    log::{self, prelude::*},
    Conf, GreetError,
};
use tracerr::Traced;

/// Result of a mobile greeting operation.
pub type Result<T> = std::result::Result<T, Traced<GreetError>>;

/// Guards [`init()`] from running more than once.
static INIT: Once = Once::new();

/// Loads [`Conf`] and starts logging on the first call.
fn init() {
    INIT.call_once(|| match Conf::parse() {
        Ok(conf) => log::init(&conf.log),
        Err(e) => {
            log::init(&Conf::default().log);
            warn!("Failed to load configuration, using defaults: {}", e);
        }
    });
}

/// Returns a greeting message for the provided `name`.
///
/// # Errors
///
/// Never fails, returns a [`Result`] to be uniform with
/// [`say_hi_with_duration()`].
pub fn say_hi(name: &str) -> Result<String> {
    init();
    Ok(greeting::say_hi(name))
}

/// Returns a greeting message for the provided `name`, but simulates a
/// heavier task by blocking the current thread for the provided `duration`
/// first.
///
/// # Errors
///
/// With [`GreetError::InvalidDuration`] if `duration` can't be parsed.
pub fn say_hi_with_duration(name: &str, duration: &str) -> Result<String> {
    init();
    greeting::say_hi_with_duration_blocking(name, duration).map_err(|e| {
        debug!("Failed to greet: {}", e.as_ref());
        e
    })
}

#[cfg(test)]
mod spec {
    use std::time::{Duration, Instant};

    use flutter_greeter::{duration::ParseDurationError, GreetError};

    use super::{say_hi, say_hi_with_duration};

    #[test]
    fn greets_by_template() {
        assert_eq!(say_hi("Android").unwrap(), "Hi Android!");
    }

    #[test]
    fn greets_after_duration() {
        let start = Instant::now();

        let greeting = say_hi_with_duration("iOS", "120ms").unwrap();

        assert_eq!(greeting, "Hi iOS!");
        assert!(start.elapsed() >= Duration::from_millis(120));
    }

    #[test]
    fn returns_error_on_malformed_duration() {
        let err = say_hi_with_duration("iOS", "1 second").unwrap_err();

        assert_eq!(
            err.as_ref(),
            &GreetError::InvalidDuration(ParseDurationError::UnknownUnit {
                unit: " second".into(),
                input: "1 second".into(),
            }),
        );
    }
}
