//! Bridge delivering results of asynchronously executed [`Request`]s into
//! host-owned ports.

use std::sync::Arc;

use futures::channel::oneshot;
use tracerr::Traced;

use crate::{
    executor::Executor,
    greeting::{self, GreetError},
    log::prelude::*,
};

/// Prefix distinguishing error descriptions from greetings on the wire.
pub const ERROR_PREFIX: &str = "Error: ";

/// Opaque identifier of a host-owned port.
pub type PortId = i64;

/// Single-shot completion handle of a dispatched [`Request`].
///
/// Resolves to `true` if the result message was accepted by the host, or
/// `false` otherwise.
pub type Delivery = oneshot::Receiver<bool>;

/// Destination of result messages.
pub trait PortSink: Send + Sync + 'static {
    /// Posts the provided `message` to the provided `port`.
    ///
    /// Returns `false` if the message wasn't accepted.
    fn post(&self, port: PortId, message: String) -> bool;
}

/// Operation requested by a host along with its owned arguments.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Request {
    /// Greet the `name` right away.
    SayHi {
        /// Name to greet.
        name: String,
    },

    /// Greet the `name` after the `duration` elapses.
    SayHiWithDuration {
        /// Name to greet.
        name: String,

        /// Unparsed delay before greeting.
        duration: String,
    },
}

impl Request {
    /// Returns a name of this [`Request`]'s operation, for logging purposes.
    #[inline]
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::SayHi { .. } => "SayHi",
            Self::SayHiWithDuration { .. } => "SayHiWithDuration",
        }
    }

    /// Executes this [`Request`].
    ///
    /// # Errors
    ///
    /// If the delay of a [`Request::SayHiWithDuration`] can't be parsed.
    pub async fn execute(self) -> Result<String, Traced<GreetError>> {
        match self {
            Self::SayHi { name } => Ok(greeting::say_hi(&name)),
            Self::SayHiWithDuration { name, duration } => {
                greeting::say_hi_with_duration(&name, &duration).await
            }
        }
    }
}

/// Serializes the outcome of a [`Request`] into a result message.
///
/// Errors are described with the [`ERROR_PREFIX`].
#[must_use]
pub fn into_message(outcome: Result<String, Traced<GreetError>>) -> String {
    match outcome {
        Ok(greeting) => greeting,
        Err(e) => format!("{}{}", ERROR_PREFIX, e.as_ref()),
    }
}

/// Executes [`Request`]s on an [`Executor`] and posts exactly one result
/// message for each of them into a [`PortSink`].
pub struct PortBridge<S> {
    /// Destination of result messages.
    sink: Arc<S>,

    /// [`Executor`] running dispatched [`Request`]s.
    executor: Executor,
}

impl<S: PortSink> PortBridge<S> {
    /// Creates a new [`PortBridge`] posting into the provided `sink`.
    #[inline]
    pub fn new(sink: S, executor: Executor) -> Self {
        Self {
            sink: Arc::new(sink),
            executor,
        }
    }

    /// Dispatches the provided [`Request`] without waiting for its result.
    ///
    /// Its result message is posted to the provided `port` once ready. A
    /// failed post is not retried.
    pub fn dispatch(&self, port: PortId, request: Request) -> Delivery {
        let sink = Arc::clone(&self.sink);
        self.executor.spawn(async move {
            let operation = request.operation();
            debug!("Executing request"; "op" => operation, "port" => port);

            let message = into_message(request.execute().await);
            let delivered = sink.post(port, message);
            if !delivered {
                warn!(
                    "Result message is not delivered";
                    "op" => operation, "port" => port,
                );
            }
            delivered
        })
    }
}
