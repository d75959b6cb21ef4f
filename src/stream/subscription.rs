//! # Disposable upstream connection.
//!
//! A [`Subscription`] owns the teardown of one observer registration. The
//! teardown runs at most once: the first [`Subscription::dispose`] releases it
//! and reports `true`, every later call is a no-op reporting `false`.
//!
//! Dropping a subscription does **not** dispose it. Release is always explicit,
//! which is what lets proxies hand connections around without tearing them down
//! by accident.

use std::fmt;
use std::sync::Mutex;

use super::lock;

type Teardown = Box<dyn FnOnce() + Send>;

/// Handle to an active observer registration.
pub struct Subscription {
    teardown: Mutex<Option<Teardown>>,
}

impl Subscription {
    /// Creates a subscription that runs `teardown` on first disposal.
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Mutex::new(Some(Box::new(teardown))),
        }
    }

    /// Creates a subscription with nothing to release.
    ///
    /// Returned by streams that complete synchronously during `subscribe`.
    pub fn empty() -> Self {
        Self {
            teardown: Mutex::new(None),
        }
    }

    /// Releases the registration.
    ///
    /// Returns `true` if this call ran the teardown, `false` if it had already
    /// been released (or there was nothing to release).
    pub fn dispose(&self) -> bool {
        // Take under the lock, run outside it: teardown may re-enter the stream.
        let teardown = lock(&self.teardown).take();
        match teardown {
            Some(f) => {
                f();
                true
            }
            None => false,
        }
    }

    /// True once the teardown has run (or if there never was one).
    pub fn is_disposed(&self) -> bool {
        lock(&self.teardown).is_none()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
