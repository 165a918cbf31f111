//! Greeting formatting, optionally delayed by a parsed duration.

use std::thread;

use derive_more::{Display, From};
use tracerr::Traced;

use crate::duration::{self, ParseDurationError, SignedDuration};

/// Pattern of every successful result, with `{name}` being substituted.
pub const GREETING_TEMPLATE: &str = "Hi {name}!";

/// Errors of producing a greeting.
#[derive(Clone, Debug, Display, From, Eq, PartialEq)]
pub enum GreetError {
    /// Provided delay is not a valid duration string.
    #[display(fmt = "{}", _0)]
    InvalidDuration(ParseDurationError),
}

type Result<T> = std::result::Result<T, Traced<GreetError>>;

/// Applies the [`GREETING_TEMPLATE`] to the provided `name`.
#[inline]
#[must_use]
pub fn say_hi(name: &str) -> String {
    GREETING_TEMPLATE.replace("{name}", name)
}

/// Greets the provided `name` after waiting for the provided `duration`,
/// simulating a heavier task.
///
/// Waiting suspends only the calling task, not the executor thread.
///
/// # Errors
///
/// With [`GreetError::InvalidDuration`] if `duration` can't be parsed. No
/// waiting happens in this case.
pub async fn say_hi_with_duration(
    name: &str,
    duration: &str,
) -> Result<String> {
    let delay = parse_delay(duration)?.delay();
    tokio::time::sleep(delay).await;
    Ok(say_hi(name))
}

/// Same as [`say_hi_with_duration()`], but blocks the current thread while
/// waiting.
///
/// # Errors
///
/// With [`GreetError::InvalidDuration`] if `duration` can't be parsed.
pub fn say_hi_with_duration_blocking(
    name: &str,
    duration: &str,
) -> Result<String> {
    let delay = parse_delay(duration)?.delay();
    thread::sleep(delay);
    Ok(say_hi(name))
}

/// Parses the provided `duration` mapping its error into a [`GreetError`].
fn parse_delay(duration: &str) -> Result<SignedDuration> {
    duration::parse(duration).map_err(tracerr::map_from_and_wrap!())
}
