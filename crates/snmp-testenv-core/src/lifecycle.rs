//! Environment lifecycle state machine
//!
//! `Launching` → `Ready` → `Stopped`, with `Launching` → `Stopped` for an
//! environment torn down before its agent came up.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

use strum::Display;

/// Shared contract for lifecycle state machines
///
/// # Contract Requirements
///
/// 1. **Transition Consistency**: `can_transition_to(next)` must return true if and only if `next`
///    is in `valid_next_states()`
///
/// 2. **Terminal States**: If `is_terminal()` returns true, `valid_next_states()` must return an
///    empty vec
///
/// 3. **Non-Terminal States**: If `is_terminal()` returns false, `valid_next_states()` must return
///    at least one state
///
/// 4. **Exhaustive Matching**: `all_states()` must return all possible enum variants
pub trait LifecycleState: Copy + Eq + Sized + 'static {
    /// Returns true if transition from `self` to `next` is valid
    fn can_transition_to(self, next: Self) -> bool;

    /// Returns all valid next states from current state
    fn valid_next_states(self) -> Vec<Self>;

    /// Returns true if this is a terminal state (no transitions out)
    fn is_terminal(self) -> bool;

    /// Returns all possible states for this state machine
    fn all_states() -> &'static [Self];
}

/// Where a `TestEnvironment` is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum EnvState {
    /// Agent launched, PID file not observed yet
    Launching,
    /// PID file observed, agent PID known
    Ready,
    /// Agent terminated and temp directory removed
    Stopped,
}

impl LifecycleState for EnvState {
    fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Launching, Self::Ready | Self::Stopped) | (Self::Ready, Self::Stopped)
        )
    }

    fn valid_next_states(self) -> Vec<Self> {
        match self {
            Self::Launching => vec![Self::Ready, Self::Stopped],
            Self::Ready => vec![Self::Stopped],
            Self::Stopped => Vec::new(),
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped)
    }

    fn all_states() -> &'static [Self] {
        &[Self::Launching, Self::Ready, Self::Stopped]
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SHARED CONFORMANCE TESTS
// ═══════════════════════════════════════════════════════════════════════════
