//! Application wiring and lifecycle.
//!
//! Startup: load settings, build the platform backends, hook the interrupt
//! handler, spawn the movement worker and hotkey listener, then run the
//! effect scheduler on this thread until stop. Shutdown: bounded wait for
//! the worker, restore the OS pointer speed, persist settings.

use std::sync::Arc;
use std::time::Duration;

use crate::controls;
use crate::effects::EffectScheduler;
use crate::error::Result;
use crate::motion::WorkerHandle;
use crate::platform::{self, OS_DEFAULT_POINTER_SPEED};
use crate::settings;
use crate::state::ChaosState;

/// How long shutdown waits for the movement worker before detaching it.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Run the application until quit is requested.
pub fn run() -> Result<()> {
    let settings_path = settings::default_path();
    let loaded = settings::load(&settings_path)?;

    let state = Arc::new(ChaosState::new(loaded));
    let pointer = platform::create_pointer();
    let overlay = platform::create_overlay();

    platform::install_interrupt_handler(state.clone());

    // Normalize the pointer speed up front in case an earlier run died
    // without restoring it.
    pointer.set_pointer_speed(OS_DEFAULT_POINTER_SPEED);

    controls::log_key_help();

    let (events_tx, events_rx) = crossbeam_channel::unbounded();
    let hotkeys = platform::spawn_hotkey_listener(state.clone(), events_tx);
    let worker = WorkerHandle::spawn(state.clone(), pointer.clone())?;

    // Blocks this thread until stop; all overlay windows live and die here.
    EffectScheduler::new(state.clone(), pointer.clone(), overlay).run(&events_rx);

    state.request_stop();
    worker.shutdown(SHUTDOWN_TIMEOUT);
    if let Some(listener) = hotkeys {
        let _ = listener.join();
    }
    pointer.set_pointer_speed(OS_DEFAULT_POINTER_SPEED);

    if let Err(err) = settings::save(&settings_path, &state.settings()) {
        log::warn!("[settings] could not save settings: {err}");
    }

    log::info!("goodbye");
    Ok(())
}
