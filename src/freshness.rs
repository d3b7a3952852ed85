//! Freshness clock for the cached IPO snapshot
//!
//! Drives the once-per-second countdown shown in the tracker header and
//! triggers a single silent refresh when the snapshot's validity window
//! elapses. The clock holds no timestamp of its own: every tick it is
//! handed the authoritative last-updated value (read back from the durable
//! store), so a fallback rewrite can never leave it counting from a stale
//! in-memory copy.

use crate::cache::CACHE_WINDOW_MS;

/// Recomputation cadence, in milliseconds
pub const TICK_MS: i64 = 1000;

/// Phase of the freshness clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockPhase {
    /// No snapshot timestamp known yet
    Idle,
    /// Timestamp known, validity window still running
    Counting,
    /// Window elapsed and the auto-refresh has been triggered
    Expired,
}

/// Snapshot age readout, recomputed each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessState {
    /// Whole minutes since the snapshot was accepted
    pub minutes_since_update: i64,
    /// Milliseconds left in the validity window, clamped to zero
    pub remaining_ms: i64,
}

impl FreshnessState {
    /// Derives the readout from the snapshot's age.
    pub fn from_elapsed(elapsed_ms: i64) -> Self {
        let elapsed = elapsed_ms.max(0);
        Self {
            minutes_since_update: elapsed / 60_000,
            remaining_ms: (CACHE_WINDOW_MS - elapsed).max(0),
        }
    }

    /// Formats the remaining window as `MM:SS`.
    pub fn format_remaining(&self) -> String {
        let total_secs = self.remaining_ms / 1000;
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

impl Default for FreshnessState {
    /// A full, untouched window - what the header shows before any
    /// snapshot timestamp is known.
    fn default() -> Self {
        Self {
            minutes_since_update: 0,
            remaining_ms: CACHE_WINDOW_MS,
        }
    }
}

/// The clock itself: phase machine plus the current readout
#[derive(Debug)]
pub struct FreshnessClock {
    phase: ClockPhase,
    state: FreshnessState,
    last_tick_ms: i64,
}

impl Default for FreshnessClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FreshnessClock {
    /// Creates a clock in the Idle phase with a full window.
    pub fn new() -> Self {
        Self {
            phase: ClockPhase::Idle,
            state: FreshnessState::default(),
            last_tick_ms: 0,
        }
    }

    /// Current phase.
    #[allow(dead_code)]
    pub fn phase(&self) -> ClockPhase {
        self.phase
    }

    /// Current readout.
    pub fn state(&self) -> FreshnessState {
        self.state
    }

    /// Rate-limited tick for callers polling faster than once a second.
    /// Returns true when a silent refresh should be triggered.
    pub fn maybe_tick(
        &mut self,
        now_ms: i64,
        last_updated_ms: Option<i64>,
        refresh_in_flight: bool,
        wants_live: bool,
    ) -> bool {
        if now_ms - self.last_tick_ms < TICK_MS {
            return false;
        }
        self.last_tick_ms = now_ms;
        self.tick(now_ms, last_updated_ms, refresh_in_flight, wants_live)
    }

    /// Advances the clock one tick.
    ///
    /// The refresh trigger fires exactly once per expiry: entering Expired
    /// requires that no refresh is in flight and that the consumer is on a
    /// view that wants live data. While a guard blocks the transition the
    /// clock keeps counting at zero remaining, so the trigger fires on a
    /// later tick once the guard clears. A timestamp update puts the clock
    /// back into Counting with a fresh window.
    pub fn tick(
        &mut self,
        now_ms: i64,
        last_updated_ms: Option<i64>,
        refresh_in_flight: bool,
        wants_live: bool,
    ) -> bool {
        let Some(ts) = last_updated_ms.filter(|ts| *ts > 0) else {
            self.phase = ClockPhase::Idle;
            self.state = FreshnessState::default();
            return false;
        };

        self.state = FreshnessState::from_elapsed(now_ms - ts);

        if self.state.remaining_ms > 0 {
            self.phase = ClockPhase::Counting;
            return false;
        }

        if self.phase != ClockPhase::Expired && !refresh_in_flight && wants_live {
            self.phase = ClockPhase::Expired;
            return true;
        }

        false
    }
}
