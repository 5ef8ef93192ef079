//! Animator lifecycle
//!
//! ```text
//!   Idle ──submit──▶ Scheduled ──converge──▶ Converged
//!    ▲                  │  ▲                      │
//!    │                  └──┘ submit/invalidate    │
//!    └───────────────── invalidate ───────────────┘
//!   any ──drop──▶ Dropped (terminal)
//! ```

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Nothing running
    Idle,
    /// A keyframe run is live, possibly chained
    Scheduled,
    /// Final frame held, finish emitted
    Converged,
    /// Terminal
    Dropped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// An input changed
    Invalidate,
    /// Keyframes were handed to the surfaces
    Submit,
    /// The last run of a converging chain finished
    Converge,
    Drop,
}

impl Phase {
    /// Next phase, or `None` if the transition is not allowed
    pub fn next(self, transition: Transition) -> Option<Phase> {
        use Phase::*;
        use Transition::*;

        match (self, transition) {
            (Dropped, _) => None,
            (_, Drop) => Some(Dropped),

            (Idle, Invalidate) => Some(Idle),
            (Idle, Submit) => Some(Scheduled),
            (Idle, Converge) => None,

            (Scheduled, Invalidate) => Some(Scheduled),
            (Scheduled, Submit) => Some(Scheduled),
            (Scheduled, Converge) => Some(Converged),

            (Converged, Invalidate) => Some(Idle),
            (Converged, Submit) => Some(Scheduled),
            (Converged, Converge) => None,
        }
    }
}
