//! # Run tokens and the packed lifecycle word.
//!
//! The lifecycle of one supervised stream is a single `AtomicU64`:
//!
//! ```text
//!  63                                   2 1 0
//! ┌──────────────────────────────────────┬───┐
//! │ current run token (0 = none bound)   │ s │   s: 0 Stopped, 1 Running, 2 Paused
//! └──────────────────────────────────────┴───┘
//! ```
//!
//! Every transition is one compare-and-swap, so the binding and the status can
//! never be observed out of step. In particular the exit path of a unit of work
//! ([`StateCell::release`]) clears the binding **only** if the word still holds
//! that unit's token; a unit that was replaced by a restart leaves the newer
//! binding untouched.
//!
//! ## Invariant
//! `status == Stopped` ⇔ no token bound.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Process-wide token counter; tokens are never reused.
static TOKEN_SEQ: AtomicU64 = AtomicU64::new(1);

const STATUS_BITS: u32 = 2;
const STATUS_MASK: u64 = (1 << STATUS_BITS) - 1;

/// Opaque identity of one unit of work.
///
/// Minted on every (re)start; at most one token is current per stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunToken(NonZeroU64);

impl RunToken {
    /// Mints a token never handed out before in this process.
    pub(crate) fn mint() -> Self {
        let n = TOKEN_SEQ.fetch_add(1, Ordering::Relaxed);
        RunToken(NonZeroU64::new(n).unwrap_or(NonZeroU64::MIN))
    }

    /// Numeric value, for logs and events.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for RunToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Status of a supervised stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    /// No unit bound.
    Stopped,
    /// Unit bound and emitting.
    Running,
    /// Unit bound, alive, not emitting.
    Paused,
}

impl LifecycleStatus {
    /// Lower-case name, as reported over HTTP.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStatus::Stopped => "stopped",
            LifecycleStatus::Running => "running",
            LifecycleStatus::Paused => "paused",
        }
    }

    fn bits(self) -> u64 {
        match self {
            LifecycleStatus::Stopped => 0,
            LifecycleStatus::Running => 1,
            LifecycleStatus::Paused => 2,
        }
    }

    fn from_bits(bits: u64) -> Self {
        match bits & STATUS_MASK {
            1 => LifecycleStatus::Running,
            2 => LifecycleStatus::Paused,
            _ => LifecycleStatus::Stopped,
        }
    }
}

/// Snapshot of a stream's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorState {
    /// Current status.
    pub status: LifecycleStatus,
    /// Token of the authoritative unit, if any.
    pub current: Option<RunToken>,
}

impl SupervisorState {
    /// Nothing bound.
    pub const STOPPED: SupervisorState = SupervisorState {
        status: LifecycleStatus::Stopped,
        current: None,
    };

    fn bound(token: RunToken, status: LifecycleStatus) -> Self {
        Self {
            status,
            current: Some(token),
        }
    }

    fn encode(self) -> u64 {
        let token = self.current.map_or(0, RunToken::get);
        (token << STATUS_BITS) | self.status.bits()
    }

    fn decode(word: u64) -> Self {
        let current = NonZeroU64::new(word >> STATUS_BITS).map(RunToken);
        match current {
            Some(token) => Self::bound(token, LifecycleStatus::from_bits(word)),
            None => Self::STOPPED,
        }
    }
}

/// Atomic cell holding one [`SupervisorState`].
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU64);

impl Default for StateCell {
    fn default() -> Self {
        Self(AtomicU64::new(SupervisorState::STOPPED.encode()))
    }
}

impl StateCell {
    pub(crate) fn load(&self) -> SupervisorState {
        SupervisorState::decode(self.0.load(Ordering::Acquire))
    }

    /// Applies `f` atomically; `None` from `f` leaves the cell untouched.
    ///
    /// Returns the state observed before the successful swap, or the state that
    /// made `f` refuse.
    fn update<F>(&self, mut f: F) -> Result<SupervisorState, SupervisorState>
    where
        F: FnMut(SupervisorState) -> Option<SupervisorState>,
    {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                f(SupervisorState::decode(word)).map(SupervisorState::encode)
            })
            .map(SupervisorState::decode)
            .map_err(SupervisorState::decode)
    }

    /// Binds `token` as `Running` if nothing is bound.
    pub(crate) fn bind_if_free(&self, token: RunToken) -> Result<(), SupervisorState> {
        self.update(|s| match s.current {
            None => Some(SupervisorState::bound(token, LifecycleStatus::Running)),
            Some(_) => None,
        })
        .map(|_| ())
    }

    /// Binds `token` as `Running` unconditionally; returns the replaced state.
    pub(crate) fn rebind(&self, token: RunToken) -> SupervisorState {
        let word = SupervisorState::bound(token, LifecycleStatus::Running).encode();
        SupervisorState::decode(self.0.swap(word, Ordering::AcqRel))
    }

    /// `Running → Paused`; returns the bound token on success.
    pub(crate) fn pause(&self) -> Option<RunToken> {
        self.transition(LifecycleStatus::Running, LifecycleStatus::Paused)
    }

    /// `Paused → Running`; returns the bound token on success.
    pub(crate) fn resume(&self) -> Option<RunToken> {
        self.transition(LifecycleStatus::Paused, LifecycleStatus::Running)
    }

    fn transition(&self, from: LifecycleStatus, to: LifecycleStatus) -> Option<RunToken> {
        self.update(|s| match s.current {
            Some(token) if s.status == from => Some(SupervisorState::bound(token, to)),
            _ => None,
        })
        .ok()
        .and_then(|prev| prev.current)
    }

    /// Exit path: unbinds only if `token` is still the current one.
    pub(crate) fn release(&self, token: RunToken) -> bool {
        self.update(|s| (s.current == Some(token)).then_some(SupervisorState::STOPPED))
            .is_ok()
    }
}
