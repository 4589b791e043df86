//! Async streams for registry change notifications.
//!
//! Producers in this crate are synchronous, so events are only ever pushed
//! with [`EventSender::try_send`]; a full or closed channel never blocks a
//! registry operation.

use std::pin::Pin;

use futures_core::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Default channel capacity for subscriptions.
pub const DEFAULT_BUFFER_SIZE: usize = 100;

/// Type alias for a boxed async stream of events.
pub type EventStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// Why an event could not be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendFailure {
    /// The subscriber is not keeping up
    Full,
    /// The subscriber dropped its stream
    Closed,
}

/// Sending half of an event stream.
#[derive(Debug)]
pub struct EventSender<T> {
    tx: mpsc::Sender<T>,
}

impl<T> EventSender<T> {
    /// Push an event without waiting.
    pub fn try_send(&self, event: T) -> Result<(), SendFailure> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendFailure::Full,
            mpsc::error::TrySendError::Closed(_) => SendFailure::Closed,
        })
    }

    /// Check if the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Create an event stream with a specific buffer size.
///
/// Returns a tuple of (sender, stream).
pub fn create_stream<T: Send + 'static>(buffer_size: usize) -> (EventSender<T>, EventStream<T>) {
    let (tx, rx) = mpsc::channel(buffer_size.max(1));
    let stream: EventStream<T> = Box::pin(ReceiverStream::new(rx));
    (EventSender { tx }, stream)
}
