//! Delivery of request outcomes to the caller
//!
//! Every request is represented by a [`GatewayCall`]. Awaiting it runs the
//! request wherever the caller polls it. Alternatively [`GatewayCall::deliver`]
//! runs it on a spawned Tokio task and posts the outcome to a
//! [`CallbackQueue`] owned by the calling context, which invokes the callback
//! when that context drains the queue.

use crate::{GatewayError, Result};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

type BoxedCall<T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'static>>;
type Message = Box<dyn FnOnce() + Send + 'static>;

/// Receives the outcome of a request
///
/// Exactly one of the two methods is called, once.
pub trait GatewayCallback<T>: Send + 'static {
    /// Called with the decoded response
    fn on_success(self, response: T);

    /// Called with the failure
    fn on_error(self, error: GatewayError);
}

impl<T, F> GatewayCallback<T> for F
where
    F: FnOnce(Result<T>) + Send + 'static,
{
    fn on_success(self, response: T) {
        self(Ok(response))
    }

    fn on_error(self, error: GatewayError) {
        self(Err(error))
    }
}

/// A single gateway request that has not started yet
///
/// Nothing is sent until the call is awaited or handed to [`deliver`].
///
/// [`deliver`]: GatewayCall::deliver
#[must_use = "a gateway call does nothing unless awaited or delivered"]
pub struct GatewayCall<T> {
    inner: BoxedCall<T>,
}

impl<T: Send + 'static> GatewayCall<T> {
    /// Wrap a future producing the request outcome
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            inner: Box::pin(future),
        }
    }

    /// Run the request on a new task and post its outcome to `queue`
    ///
    /// Requires a Tokio runtime on the calling context. The callback runs
    /// when the owner of `queue` dispatches it.
    pub fn deliver<C>(self, queue: &CallbackQueue, callback: C) -> Result<()>
    where
        C: GatewayCallback<T>,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            GatewayError::invalid_argument_with("Callback delivery requires a Tokio runtime", e)
        })?;
        let sender = queue.sender.clone();

        runtime.spawn(async move {
            let outcome = self.await;
            let message: Message = Box::new(move || match outcome {
                Ok(response) => callback.on_success(response),
                Err(error) => callback.on_error(error),
            });

            if sender.send(message).is_err() {
                tracing::warn!("callback queue was dropped before the outcome was delivered");
            }
        });

        Ok(())
    }
}

impl<T> Future for GatewayCall<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl<T> fmt::Debug for GatewayCall<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayCall").finish_non_exhaustive()
    }
}

/// Queue of completed outcomes bound to the context that owns it
///
/// Outcomes are only handed to callbacks when the owner calls
/// [`dispatch_pending`](CallbackQueue::dispatch_pending) or
/// [`dispatch_next`](CallbackQueue::dispatch_next).
pub struct CallbackQueue {
    sender: mpsc::UnboundedSender<Message>,
    receiver: mpsc::UnboundedReceiver<Message>,
}

impl CallbackQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    /// Invoke callbacks for every outcome already delivered, without waiting
    pub fn dispatch_pending(&mut self) -> usize {
        let mut dispatched = 0;
        while let Ok(message) = self.receiver.try_recv() {
            message();
            dispatched += 1;
        }
        dispatched
    }

    /// Wait for the next outcome and invoke its callback
    ///
    /// Waits indefinitely if no request delivering to this queue is in
    /// flight.
    pub async fn dispatch_next(&mut self) {
        if let Some(message) = self.receiver.recv().await {
            message();
        }
    }
}

impl Default for CallbackQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallbackQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackQueue").finish_non_exhaustive()
    }
}
