//! Decorative overlay effects: fake-cursor sprites, trail dots, flicker,
//! and the full-screen flash, driven by a fixed-rate scheduler.

pub mod scheduler;
pub mod sprite;


pub use scheduler::EffectScheduler;
pub use sprite::{PulsePhase, Sprite};
