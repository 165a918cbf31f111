//! Executor running dispatched [`Future`]s in the background.

use std::{future::Future, io, thread};

use futures::{
    channel::{mpsc, oneshot},
    future::BoxFuture,
    FutureExt as _, StreamExt as _,
};

use crate::{conf, log::prelude::*};

/// Handle to a background [`tokio`] runtime executing spawned [`Future`]s.
///
/// The runtime is driven by a dedicated dispatcher thread and is shut down
/// once all the clones of this [`Executor`] are dropped. Tasks still pending
/// at that moment are dropped along with the runtime.
#[derive(Clone)]
pub struct Executor(mpsc::UnboundedSender<BoxFuture<'static, ()>>);

impl Executor {
    /// Starts a new [`Executor`] with the provided settings.
    ///
    /// # Errors
    ///
    /// If the runtime thread can't be spawned, or the runtime can't be built.
    pub fn new(conf: &conf::Executor) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(conf.worker_threads.max(1))
            .thread_name(conf.thread_name.to_string())
            .thread_keep_alive(conf.thread_keep_alive)
            .enable_time()
            .build()?;

        let (tx, mut rx) = mpsc::unbounded::<BoxFuture<'static, ()>>();
        drop(
            thread::Builder::new()
                .name(format!("{}-dispatcher", conf.thread_name))
                .spawn(move || {
                    runtime.block_on(async move {
                        while let Some(task) = rx.next().await {
                            drop(tokio::spawn(task));
                        }
                    });
                    debug!("Executor stopped");
                })?,
        );

        Ok(Self(tx))
    }

    /// Spawns the provided `task` as an independent unit of execution.
    ///
    /// Returns immediately. The returned [`oneshot::Receiver`] resolves with
    /// the `task`'s output once it completes. Dropping the receiver doesn't
    /// cancel the `task`.
    pub fn spawn<F>(&self, task: F) -> oneshot::Receiver<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send,
    {
        let (tx, rx) = oneshot::channel();
        let task = async move {
            let _ = tx.send(task.await);
        };
        if self.0.unbounded_send(task.boxed()).is_err() {
            error!("Executor is stopped, task is dropped");
        }
        rx
    }
}
