//! Provides logging utilities, used by the library.

use std::{io, sync::Once};

use chrono::Local;
use slog::{o, Discard, Drain, FnValue, Level, Logger, PushFnValue, Record};
use slog_async::Async;
use slog_json::Json;

use crate::conf;

/// Re-exports common definitions for logging.
///
/// Use this module as following:
/// ```rust
/// use flutter_greeter::log::prelude::*;
/// ```
pub mod prelude {
    pub use slog::{slog_debug, slog_error, slog_info, slog_trace, slog_warn};
    pub use slog_scope::{debug, error, info, trace, warn};
}

/// Guards [`init()`] from installing the global [`Logger`] more than once.
static INIT: Once = Once::new();

/// Installs a JSON [`Logger`] writing to [`io::stderr()`] as the global
/// [`slog_scope`] logger.
///
/// Only the first call has effect. Until it happens, all log records are
/// discarded.
pub fn init(conf: &conf::Log) {
    let level = conf.level();
    INIT.call_once(|| {
        slog_scope::set_global_logger(new_logger(io::stderr(), level))
            .cancel_reset();
    });
}

/// Builds a JSON [`Logger`] which prints all its log records with at least
/// the provided `level` to `w` writer. [`None`] `level` disables logging at
/// all.
///
/// Logger will use [`Async`] drain with channel size of 2048 entries and
/// [`OverflowStrategy::DropAndReport`][1].
///
/// Created [`Logger`] produces log records with `fqn`, `lvl`, `time` and `msg`
/// fields by default.
///
/// [1]: slog_async::OverflowStrategy::DropAndReport
pub fn new_logger<W>(w: W, level: Option<Level>) -> Logger
where
    W: io::Write + Send + 'static,
{
    let level = match level {
        Some(level) => level,
        None => return Logger::root(Discard, o!()),
    };
    let drain = Json::new(w).build().fuse();
    let drain = drain.filter_level(level).fuse();
    let drain = Async::new(drain).chan_size(2048).build().fuse();
    add_default_keys(&Logger::root(drain, o!()))
}

/// Adds default log record data (key-value pairs) to specified [`Logger`]:
/// - `msg`: log record message.
/// - `fqn`: path to code line that called log function.
/// - `time`: creation date and time of log record in [RFC 3339] format.
/// - `lvl`: logging level of log record.
///
/// [RFC 3339]: https://www.ietf.org/rfc/rfc3339.txt
fn add_default_keys(logger: &Logger) -> Logger {
    logger.new(o!(
        "msg" => PushFnValue(move |record : &Record, ser| {
            ser.emit(record.msg())
        }),
        "fqn" => PushFnValue(move |record : &Record, ser| {
             ser.emit(format_args!("{}:{}", record.module(), record.line()))
        }),
        "time" => PushFnValue(move |_ : &Record, ser| {
            ser.emit(Local::now().to_rfc3339())
        }),
        "lvl" => FnValue(move |rinfo : &Record| {
            rinfo.level().as_str()
        }),
    ))
}
