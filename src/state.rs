//! Shared runtime state.
//!
//! One [`ChaosState`] is created at startup and passed by `Arc` to every
//! component. Each field sits behind its own primitive; no invariant spans
//! multiple fields, so there is no multi-lock ordering to get wrong.

use std::time::Duration;

use parking_lot::{Condvar, Mutex, RwLock};

use crate::platform::PointerOps;
use crate::settings::EffectSettings;
use crate::types::Position;

/// Cooperative stop signal.
///
/// A condvar-backed flag so sleepers wake immediately when stop is requested
/// instead of running out their interval.
pub struct StopSignal {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        Self {
            stopped: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    pub fn trigger(&self) {
        let mut stopped = self.stopped.lock();
        *stopped = true;
        self.condvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.stopped.lock()
    }

    /// Sleep for up to `timeout`, waking early on stop. Returns whether stop
    /// has been requested.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut stopped = self.stopped.lock();
        if *stopped {
            return true;
        }
        self.condvar.wait_for(&mut stopped, timeout);
        *stopped
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide shared context: settings, stop signal, and the bits of
/// cross-thread scratch state the effects need.
pub struct ChaosState {
    settings: RwLock<EffectSettings>,
    stop: StopSignal,
    last_observed: Mutex<Option<Position>>,
    /// Remaining flash ticks. The lock prevents overlapping flashes.
    flash_gate: Mutex<u8>,
}

impl ChaosState {
    pub fn new(mut settings: EffectSettings) -> Self {
        settings.validate();
        Self {
            settings: RwLock::new(settings),
            stop: StopSignal::new(),
            last_observed: Mutex::new(None),
            flash_gate: Mutex::new(0),
        }
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> EffectSettings {
        self.settings.read().clone()
    }

    /// The single mutation entry point. Applies `mutate`, re-clamps, and
    /// returns the resulting snapshot so callers can log the new value.
    pub fn update_settings(&self, mutate: impl FnOnce(&mut EffectSettings)) -> EffectSettings {
        let mut settings = self.settings.write();
        mutate(&mut settings);
        settings.validate();
        settings.clone()
    }

    pub fn request_stop(&self) {
        self.stop.trigger();
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.is_triggered()
    }

    /// Sleep for up to `timeout`, waking early on stop. Returns whether stop
    /// has been requested.
    pub fn wait_for_stop(&self, timeout: Duration) -> bool {
        self.stop.wait_timeout(timeout)
    }

    /// Replace the last observed cursor position, returning the previous one.
    pub fn swap_last_observed(&self, pos: Option<Position>) -> Option<Position> {
        std::mem::replace(&mut *self.last_observed.lock(), pos)
    }

    pub fn last_observed(&self) -> Option<Position> {
        *self.last_observed.lock()
    }

    /// Arm the flash gate for `ticks` ticks. Returns `false` while a flash
    /// is already in progress.
    pub fn try_begin_flash(&self, ticks: u8) -> bool {
        let mut gate = self.flash_gate.lock();
        if *gate > 0 {
            return false;
        }
        *gate = ticks;
        true
    }

    /// Count down the flash gate by one tick. Returns `true` exactly when
    /// the flash expires and should be cleared.
    pub fn flash_tick(&self) -> bool {
        let mut gate = self.flash_gate.lock();
        if *gate == 0 {
            return false;
        }
        *gate -= 1;
        *gate == 0
    }

    pub fn flash_active(&self) -> bool {
        *self.flash_gate.lock() > 0
    }
}

/// Combined gate for the chaotic-movement and flicker/flash phases: effects
/// run only while not paused, not stopping, and the control surface does not
/// hold input focus — so adjusting settings suspends the chaos.
pub fn is_effect_active(state: &ChaosState, pointer: &dyn PointerOps) -> bool {
    if state.stop_requested() || state.settings().paused {
        return false;
    }
    !pointer.control_surface_focused()
}
