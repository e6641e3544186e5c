//! # Chunk Events
//!
//! The "chunk rendered" notification a chunk sends the first time its
//! buffers are published.
//!
//! Each subscriber hands the chunk a `crossbeam_channel` sender. The
//! chunk pushes into every sender before `commit()` returns, so the
//! event is in the channel by the time the caller looks.

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Sent once per chunk, on its first commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkRendered {
    /// The chunk's integer world position.
    pub position: [i32; 3],
}

/// Creates an unbounded channel for rendered events.
#[must_use]
pub fn rendered_channel() -> (Sender<ChunkRendered>, Receiver<ChunkRendered>) {
    unbounded()
}

/// The senders registered on one chunk.
#[derive(Clone, Debug, Default)]
pub(crate) struct Subscribers {
    senders: Vec<Sender<ChunkRendered>>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, sender: Sender<ChunkRendered>) {
        self.senders.push(sender);
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }

    /// Delivers `event` to every live subscriber, forgetting dead ones.
    pub(crate) fn notify(&mut self, event: ChunkRendered) {
        self.senders.retain(|sender| match sender.send(event) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(position = ?event.position, "dropping disconnected chunk subscriber");
                false
            }
        });
    }
}
