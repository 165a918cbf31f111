#![allow(clippy::module_name_repetitions)]
#![forbid(non_ascii_idents, unsafe_code)]

mod bridge;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use flutter_greeter::{bridge::PortId, PortSink};
use futures::channel::mpsc;

/// [`PortSink`] forwarding every posted message into a channel.
pub struct ChannelSink {
    /// Sending side of the channel.
    tx: mpsc::UnboundedSender<(PortId, String)>,

    /// Number of performed posts.
    posts: Arc<AtomicUsize>,

    /// Whether posts should be refused.
    refuse: bool,
}

impl ChannelSink {
    /// Creates a new [`ChannelSink`] along with the receiving side of its
    /// channel and its posts counter.
    pub fn new(
        refuse: bool,
    ) -> (Self, mpsc::UnboundedReceiver<(PortId, String)>, Arc<AtomicUsize>)
    {
        let (tx, rx) = mpsc::unbounded();
        let posts = Arc::new(AtomicUsize::new(0));
        let sink = Self {
            tx,
            posts: Arc::clone(&posts),
            refuse,
        };
        (sink, rx, posts)
    }
}

impl PortSink for ChannelSink {
    fn post(&self, port: PortId, message: String) -> bool {
        self.posts.fetch_add(1, Ordering::SeqCst);
        if self.refuse {
            return false;
        }
        self.tx.unbounded_send((port, message)).is_ok()
    }
}
