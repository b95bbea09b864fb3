//! Cooperative cancellation shared between the search and its host.
//!
//! The search polls a single [`CancellationToken`] after every iteration of
//! every enumeration loop. Timeouts, user interrupts, termination requests
//! and a satisfied heuristic all end up as one store into the same atomic,
//! so the recursion unwinds within one loop iteration per active frame.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const RUNNING: u8 = 0;

/// Why a search stopped before exhausting its schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The configured time limit elapsed.
    Timeout,
    /// The host asked the search to stop (SIGINT, SIGTERM, ...).
    Interrupted,
    /// The active heuristic cannot improve its conjectures any further.
    HeuristicSatisfied,
}

impl StopReason {
    fn code(self) -> u8 {
        match self {
            StopReason::Timeout => 1,
            StopReason::Interrupted => 2,
            StopReason::HeuristicSatisfied => 3,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(StopReason::Timeout),
            2 => Some(StopReason::Interrupted),
            3 => Some(StopReason::HeuristicSatisfied),
            _ => None,
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Timeout => write!(f, "timeout"),
            StopReason::Interrupted => write!(f, "interrupted"),
            StopReason::HeuristicSatisfied => write!(f, "heuristic satisfied"),
        }
    }
}

/// Cloneable handle to a shared stop flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<AtomicU8>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Returns true if this call set the reason;
    /// a token that is already cancelled keeps its first reason.
    pub fn cancel(&self, reason: StopReason) -> bool {
        self.state
            .compare_exchange(RUNNING, reason.code(), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Check if the search should stop.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Relaxed) != RUNNING
    }

    /// The reason recorded by the first `cancel`, if any.
    pub fn reason(&self) -> Option<StopReason> {
        StopReason::from_code(self.state.load(Ordering::SeqCst))
    }

    /// Cancel with [`StopReason::Timeout`] once `timeout` has elapsed.
    ///
    /// The watchdog thread is detached; a zero duration disables it.
    pub fn cancel_after(&self, timeout: Duration) {
        if timeout.is_zero() {
            return;
        }
        let token = self.clone();
        thread::spawn(move || {
            thread::sleep(timeout);
            token.cancel(StopReason::Timeout);
        });
    }
}
