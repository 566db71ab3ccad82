//! Platform abstraction for OS pointer access and overlay windows.
//!
//! Two narrow traits with one implementation per target OS:
//!
//! - [`PointerOps`]: real cursor position/movement, OS pointer speed, screen
//!   dimensions, and the control-surface focus check. Shared across threads.
//! - [`OverlayOps`]: creation and manipulation of the decorative overlay
//!   windows. Owned by the effect scheduler and confined to its thread.
//!
//! On unsupported hosts the factory functions return no-op backends that log
//! and succeed, matching the warn-and-continue failure policy used for
//! individual OS calls on Windows.

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;

use crate::controls::ControlEvent;
use crate::error::Result;
use crate::settings::SpriteShape;
use crate::state::ChaosState;
use crate::types::{Position, Rgb, ScreenBounds};

#[cfg(windows)]
pub mod win;

#[cfg(not(windows))]
pub mod noop;

#[cfg(test)]
pub(crate) mod mock;

/// The OS default pointer speed, restored on shutdown.
pub const OS_DEFAULT_POINTER_SPEED: u32 = 10;

/// Pointer speed range accepted by the OS.
pub const OS_POINTER_SPEED_MIN: u32 = 1;
pub const OS_POINTER_SPEED_MAX: u32 = 20;

/// Opaque identifier for a live overlay sprite window.
pub type SpriteHandle = u64;

/// Everything the backend needs to materialize a sprite window.
#[derive(Clone, Copy, Debug)]
pub struct SpriteDesc {
    pub shape: SpriteShape,
    pub size: u32,
    pub color: Rgb,
    pub position: Position,
}

/// Real-cursor and screen operations.
///
/// Failures are handled inside the implementation: logged as warnings and
/// treated as no-ops, never surfaced as errors.
pub trait PointerOps: Send + Sync {
    /// Current cursor position, or `None` when it cannot be read.
    fn cursor_position(&self) -> Option<Position>;

    /// Move the real cursor. Callers clamp to screen bounds first.
    fn move_cursor(&self, pos: Position);

    /// Primary screen dimensions.
    fn screen_size(&self) -> ScreenBounds;

    /// Set the system pointer speed. Values are clamped to the OS range.
    fn set_pointer_speed(&self, speed: u32);

    /// Whether the control surface currently holds input focus.
    ///
    /// Returns `true` when focus cannot be determined, which reads as
    /// "effects inactive" downstream.
    fn control_surface_focused(&self) -> bool;
}

/// Overlay window operations. Not `Send`: windows belong to the thread that
/// created them.
pub trait OverlayOps {
    fn create_sprite(&mut self, desc: &SpriteDesc) -> Result<SpriteHandle>;

    fn move_sprite(&mut self, handle: SpriteHandle, pos: Position);

    /// Redraw with a new shape/color without recreating the window.
    fn restyle_sprite(&mut self, handle: SpriteHandle, shape: SpriteShape, color: Rgb);

    /// Per-window opacity in `[0.0, 1.0]`, used by fading trail dots.
    fn set_sprite_opacity(&mut self, handle: SpriteHandle, opacity: f32);

    fn destroy_sprite(&mut self, handle: SpriteHandle);

    /// Show a full-screen white overlay at the given opacity.
    fn flash_screen(&mut self, opacity: f32);

    fn clear_flash(&mut self);

    /// Drain pending window events. Called once per scheduler tick.
    fn pump_events(&mut self);
}

#[cfg(windows)]
pub fn create_pointer() -> Arc<dyn PointerOps> {
    Arc::new(win::WinPointer::new())
}

#[cfg(not(windows))]
pub fn create_pointer() -> Arc<dyn PointerOps> {
    Arc::new(noop::NoopPointer::new())
}

#[cfg(windows)]
pub fn create_overlay() -> Box<dyn OverlayOps> {
    Box::new(win::WinOverlay::new())
}

#[cfg(not(windows))]
pub fn create_overlay() -> Box<dyn OverlayOps> {
    Box::new(noop::NoopOverlay::new())
}

/// Route console interrupts (Ctrl+C) into the shared stop signal.
#[cfg(windows)]
pub fn install_interrupt_handler(state: Arc<ChaosState>) {
    win::install_interrupt_handler(state);
}

#[cfg(not(windows))]
pub fn install_interrupt_handler(_state: Arc<ChaosState>) {
    log::debug!("[platform] no interrupt handler on this platform");
}

/// Spawn the keyboard control-surface listener, if the platform supports it.
#[cfg(windows)]
pub fn spawn_hotkey_listener(
    state: Arc<ChaosState>,
    events: Sender<ControlEvent>,
) -> Option<JoinHandle<()>> {
    win::spawn_hotkey_listener(state, events)
}

#[cfg(not(windows))]
pub fn spawn_hotkey_listener(
    _state: Arc<ChaosState>,
    _events: Sender<ControlEvent>,
) -> Option<JoinHandle<()>> {
    log::info!("[platform] keyboard control surface unavailable on this platform");
    None
}
