//! Blocking call bridge
//!
//! Turns one asynchronous engine call into a blocking call. Each call gets
//! its own one-shot slot; the engine's completion handler fills it and the
//! calling thread waits on it. Nothing is shared between calls, so any
//! number of threads may bridge calls through the same engine concurrently.
//!
//! The bridge never times out on its own. Request timeouts are enforced by
//! the engine, which then completes the call with a timeout status.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

use syncbase_core::Error;

use crate::engine::Handler;

/// One-shot completion slot.
struct Slot<T> {
    value: Mutex<Option<T>>,
    ready: Condvar,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            value: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    fn fulfill(&self, value: T) {
        let mut guard = self.value.lock();
        *guard = Some(value);
        self.ready.notify_one();
    }

    fn wait(&self) -> T {
        let mut guard = self.value.lock();
        loop {
            if let Some(value) = guard.take() {
                return value;
            }
            self.ready.wait(&mut guard);
        }
    }
}

/// Submit one engine call and block until its handler runs.
///
/// `submit` receives the completion handler and must pass it to the engine.
/// The handler may run on any thread, including inline inside `submit`.
pub fn call<T, F>(submit: F) -> T
where
    T: Send + 'static,
    F: FnOnce(Handler<T>),
{
    let slot = Arc::new(Slot::new());
    let completer = Arc::clone(&slot);
    submit(Box::new(move |value| completer.fulfill(value)));
    slot.wait()
}

/// Response of a bridged call plus the error built from it, if it failed.
///
/// The response is kept even on failure; some operations read it anyway.
#[derive(Debug)]
pub struct Outcome<T> {
    pub response: T,
    pub error: Option<Error>,
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Drop the response on failure.
    pub fn into_result(self) -> Result<T, Error> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.response),
        }
    }
}
