//! Keyboard control surface.
//!
//! The platform hotkey listener translates key presses into [`ControlEvent`]s
//! and sends them over a channel; the effect scheduler drains the channel at
//! the start of every tick and applies each event here. All settings writes
//! funnel through [`apply`], which clamps and logs the new value.

use crate::state::ChaosState;

/// One user action from the control surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlEvent {
    TogglePause,
    ToggleChaotic,
    ToggleFlicker,
    ToggleTrail,
    ToggleFlash,
    RaiseIntensity,
    LowerIntensity,
    MoreCursors,
    FewerCursors,
    CycleShape,
    Quit,
}

/// Apply one control event to the shared state.
pub fn apply(event: ControlEvent, state: &ChaosState) {
    match event {
        ControlEvent::TogglePause => {
            let s = state.update_settings(|s| s.paused = !s.paused);
            log::info!("[controls] paused: {}", s.paused);
        }
        ControlEvent::ToggleChaotic => {
            let s = state.update_settings(|s| s.chaotic_enabled = !s.chaotic_enabled);
            log::info!("[controls] chaotic movement: {}", s.chaotic_enabled);
        }
        ControlEvent::ToggleFlicker => {
            let s = state.update_settings(|s| s.flicker_enabled = !s.flicker_enabled);
            log::info!("[controls] flicker: {}", s.flicker_enabled);
        }
        ControlEvent::ToggleTrail => {
            let s = state.update_settings(|s| s.trail_enabled = !s.trail_enabled);
            log::info!("[controls] trail: {}", s.trail_enabled);
        }
        ControlEvent::ToggleFlash => {
            let s = state.update_settings(|s| s.flash_enabled = !s.flash_enabled);
            log::info!("[controls] flash: {}", s.flash_enabled);
        }
        ControlEvent::RaiseIntensity => {
            let s = state.update_settings(|s| s.effect_intensity = s.effect_intensity.saturating_add(1));
            log::info!("[controls] intensity: {}", s.effect_intensity);
        }
        ControlEvent::LowerIntensity => {
            let s = state.update_settings(|s| s.effect_intensity = s.effect_intensity.saturating_sub(1));
            log::info!("[controls] intensity: {}", s.effect_intensity);
        }
        ControlEvent::MoreCursors => {
            let s = state.update_settings(|s| s.cursor_count = s.cursor_count.saturating_add(1));
            log::info!("[controls] fake cursors: {}", s.cursor_count);
        }
        ControlEvent::FewerCursors => {
            let s = state.update_settings(|s| s.cursor_count = s.cursor_count.saturating_sub(1));
            log::info!("[controls] fake cursors: {}", s.cursor_count);
        }
        ControlEvent::CycleShape => {
            let s = state.update_settings(|s| s.cursor_shape = s.cursor_shape.cycled());
            log::info!("[controls] shape: {:?}", s.cursor_shape);
        }
        ControlEvent::Quit => {
            log::info!("[controls] quit requested");
            state.request_stop();
        }
    }
}

/// Log the key bindings once at startup.
pub fn log_key_help() {
    log::info!("[controls] P pause | M chaotic | F flicker | T trail | X flash");
    log::info!("[controls] =/- intensity | ]/[ fake cursors | S shape | Q quit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{EffectSettings, SpriteShape};

    #[test]
    fn toggles_flip_flags() {
        let state = ChaosState::new(EffectSettings::default());
        assert!(!state.settings().paused);
        apply(ControlEvent::TogglePause, &state);
        assert!(state.settings().paused);
        apply(ControlEvent::TogglePause, &state);
        assert!(!state.settings().paused);
    }

    #[test]
    fn intensity_saturates_at_documented_range() {
        let state = ChaosState::new(EffectSettings::default());
        for _ in 0..20 {
            apply(ControlEvent::RaiseIntensity, &state);
        }
        assert_eq!(state.settings().effect_intensity, 10);
        for _ in 0..20 {
            apply(ControlEvent::LowerIntensity, &state);
        }
        assert_eq!(state.settings().effect_intensity, 1);
    }

    #[test]
    fn cursor_count_stays_within_range() {
        let state = ChaosState::new(EffectSettings::default());
        for _ in 0..30 {
            apply(ControlEvent::MoreCursors, &state);
        }
        assert_eq!(state.settings().cursor_count, 15);
        for _ in 0..30 {
            apply(ControlEvent::FewerCursors, &state);
        }
        assert_eq!(state.settings().cursor_count, 0);
    }

    #[test]
    fn shape_cycles_and_quit_stops() {
        let state = ChaosState::new(EffectSettings::default());
        apply(ControlEvent::CycleShape, &state);
        assert_eq!(state.settings().cursor_shape, SpriteShape::Square);
        assert!(!state.stop_requested());
        apply(ControlEvent::Quit, &state);
        assert!(state.stop_requested());
    }
}
