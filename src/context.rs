//! Call context for unpack operations
//!
//! An unpack call blocks the calling thread until the fetch completes. The
//! [`Context`] carries the signals that let the caller abort it early:
//!
//! - [`CancellationToken`]: cloneable handle checked at the fetch boundary
//! - [`CancellationSource`]: controller that triggers cancellation
//! - [`Deadline`]: absolute point in time after which the call is abandoned
//!
//! Tokens are `Send + Sync`, so a controller thread can cancel a fetch
//! running on a worker thread.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Why a call was cancelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancellationReason {
    /// The caller requested cancellation
    Requested,
    /// The context deadline passed
    DeadlineExceeded,
    /// Custom reason with description
    Custom(String),
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => write!(f, "cancelled by caller"),
            Self::DeadlineExceeded => write!(f, "deadline exceeded"),
            Self::Custom(reason) => write!(f, "{reason}"),
        }
    }
}

/// A cloneable token that can be checked for cancellation
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<Mutex<Option<CancellationReason>>>,
}

impl CancellationToken {
    /// Creates a token that is never cancelled
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Checks if cancellation has been requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    /// Returns the reason for cancellation, if cancelled
    #[must_use]
    pub fn reason(&self) -> Option<CancellationReason> {
        // A poisoned lock still holds a valid Option
        match self.state.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// A controller that can trigger cancellation
///
/// All tokens created from one source observe the same cancellation.
#[derive(Debug, Clone, Default)]
pub struct CancellationSource {
    token: CancellationToken,
}

impl CancellationSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token from this source
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancels all tokens from this source. The first reason wins.
    pub fn cancel(&self, reason: CancellationReason) {
        let mut guard = match self.token.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.is_none() {
            *guard = Some(reason);
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// A deadline represents a point in time when an operation should stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline {
    instant: Instant,
}

impl Deadline {
    /// Creates a deadline at the specified instant
    #[must_use]
    pub fn at(instant: Instant) -> Self {
        Self { instant }
    }

    /// Creates a deadline `duration` from now
    #[must_use]
    pub fn after(duration: Duration) -> Self {
        Self {
            instant: Instant::now() + duration,
        }
    }

    #[must_use]
    pub fn has_passed(&self) -> bool {
        Instant::now() >= self.instant
    }

    /// Returns time remaining until the deadline, None if it has passed
    #[must_use]
    pub fn time_remaining(&self) -> Option<Duration> {
        self.instant.checked_duration_since(Instant::now())
    }
}

/// Per-call context passed to [`crate::unpack::Fetch::unpack`]
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Deadline>,
}

impl Context {
    /// A context that is never cancelled and has no deadline
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// A context observing the given cancellation token
    #[must_use]
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Sets a deadline on this context
    #[must_use]
    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Deadline> {
        self.deadline
    }

    /// Returns why this context is done, or None while it is still live
    #[must_use]
    pub fn cancelled(&self) -> Option<CancellationReason> {
        if let Some(reason) = self.token.reason() {
            return Some(reason);
        }
        self.deadline
            .filter(Deadline::has_passed)
            .map(|_| CancellationReason::DeadlineExceeded)
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.cancelled().is_some()
    }
}
