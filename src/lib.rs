//! jitterbug: a chaotic mouse toy for Windows.
//!
//! A background worker randomizes the real cursor's position and the OS
//! pointer speed while a fixed-rate scheduler animates fake-cursor overlay
//! sprites, trail dots, flicker shakes, and screen flashes. A keyboard
//! control surface tunes everything live; Q or Ctrl+C shuts down and
//! restores the pointer speed.
//!
//! - `motion`: random target generation and the background movement worker
//! - `effects`: overlay sprites and the fixed-rate effect scheduler
//! - `platform`: per-OS pointer/overlay backends behind narrow traits
//! - `controls`: keyboard control events and settings mutation
//! - `state` / `settings`: the shared context and persisted configuration

pub mod app;
pub mod controls;
pub mod effects;
pub mod error;
pub mod motion;
pub mod platform;
pub mod settings;
pub mod state;
pub mod types;

pub use error::{JitterError, Result};
pub use settings::{EffectSettings, MotionTuning, SpriteShape};
pub use state::ChaosState;
pub use types::{Position, Rgb, ScreenBounds};
