//! Event channel.
//!
//! Synchronous publish/listen mechanism: `notify` delivers the event to every
//! registered observer before it returns. There is no queue and no threading.

mod channel;
mod event;

pub use channel::{EventChannel, ListenerId, Observer, SharedObserver};
pub use event::{Event, EventKind, EventPayload};
