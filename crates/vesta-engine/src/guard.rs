//! Re-entry protection for mutating entry points.
//!
//! Built on a `parking_lot::ReentrantMutex` holding an "in flight" flag:
//! other threads block until the running operation finishes, so operations
//! execute one at a time; the owning thread can re-acquire the mutex (for
//! example from inside a plugin callback) but then finds the flag set and is
//! rejected with [`StateError::Reentrant`].

use std::cell::Cell;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use vesta_core::error::StateError;

#[derive(Debug, Default)]
pub(crate) struct ReentrancyGuard {
    in_flight: ReentrantMutex<Cell<bool>>,
}

/// Proof that the current call stack holds the guard. Clears the flag on drop.
pub(crate) struct Entered<'a> {
    lock: ReentrantMutexGuard<'a, Cell<bool>>,
}

impl ReentrancyGuard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn enter(&self) -> Result<Entered<'_>, StateError> {
        let lock = self.in_flight.lock();
        if lock.get() {
            return Err(StateError::Reentrant);
        }
        lock.set(true);
        Ok(Entered { lock })
    }
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        self.lock.set(false);
    }
}
