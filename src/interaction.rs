//! Interaction state machine and settle debounce
//!
//! Full-dataset redraw cost scales with the population, so it must not be paid
//! on every intermediate gesture tick. The controller tracks whether the
//! viewport is actively being manipulated and debounces the full-fidelity
//! redraw until a quiet period after the last gesture.
//!
//! Timers are owned by the host; the controller hands out a [`SettleToken`]
//! carrying a generation counter when a gesture ends. A token whose generation
//! no longer matches (because a new gesture began in the meantime) is a
//! guaranteed no-op when fired, so a stale timer callback can never trigger a
//! redraw. All context is passed into each call explicitly; nothing is
//! captured in closures.

use instant::{Duration, Instant};

/// Which draw set the render planner should use
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionState {
    /// No gesture in progress; frames draw the full dataset
    Idle,
    /// A zoom/pan gesture is in progress; frames draw the LOD subset
    Interacting,
    /// The gesture ended; one full redraw is pending at `deadline`
    Settling { deadline: Instant },
}

/// Handle for a pending settle timer
///
/// Captures the generation current when the gesture ended. Firing it commits
/// the settle only if no newer gesture has started since.
#[derive(Clone, Copy, Debug)]
pub struct SettleToken {
    generation: u64,
    deadline: Instant,
}

impl SettleToken {
    /// When the host's timer should fire
    #[inline]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

/// State machine driving Idle/Interacting/Settling transitions
#[derive(Clone, Debug)]
pub struct InteractionController {
    state: InteractionState,
    generation: u64,
    settle_delay: Duration,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl InteractionController {
    /// Create a controller with the given debounce delay (reference: 250ms)
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            state: InteractionState::Idle,
            generation: 0,
            settle_delay,
        }
    }

    /// A zoom/pan gesture began or ticked
    ///
    /// Entering `Interacting` from `Idle` or `Settling` bumps the generation,
    /// which invalidates any token handed out for the previous cycle. Ticks
    /// while already interacting are free.
    pub fn begin_gesture(&mut self) {
        if self.state != InteractionState::Interacting {
            self.generation = self.generation.wrapping_add(1);
            self.state = InteractionState::Interacting;
        }
    }

    /// The gesture ended; start the settle debounce
    ///
    /// Returns the token the host should fire back at `token.deadline()`.
    /// Returns `None` when no gesture was in progress.
    pub fn end_gesture(&mut self, now: Instant) -> Option<SettleToken> {
        if self.state != InteractionState::Interacting {
            return None;
        }

        let deadline = now + self.settle_delay;
        self.state = InteractionState::Settling { deadline };
        Some(SettleToken {
            generation: self.generation,
            deadline,
        })
    }

    /// A settle timer fired
    ///
    /// Commits `Settling -> Idle` and returns `true` only when the token's
    /// generation still matches and the deadline has passed. Stale tokens,
    /// early fires and fires in any other state are no-ops.
    pub fn fire(&mut self, token: SettleToken, now: Instant) -> bool {
        let InteractionState::Settling { deadline } = self.state else {
            return false;
        };
        if token.generation != self.generation || now < deadline {
            return false;
        }

        self.state = InteractionState::Idle;
        true
    }

    /// Whether a gesture is in progress (LOD subset frames)
    #[inline]
    pub fn is_interacting(&self) -> bool {
        self.state == InteractionState::Interacting
    }

    /// Current state
    #[inline]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Configured debounce delay
    #[inline]
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }
}
