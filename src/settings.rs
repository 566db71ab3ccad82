//! User-tunable effect settings.
//!
//! All settings live in a single typed struct with a `validate()` pass that
//! clamps every field into its documented range, so out-of-range values from
//! a hand-edited settings file can never reach the effect loops. Persisted
//! as JSON under the platform config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Shape drawn for fake cursors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpriteShape {
    #[default]
    Dot,
    Square,
    Cross,
}

impl SpriteShape {
    /// Next shape in the dot -> square -> cross -> dot cycle.
    pub fn cycled(self) -> SpriteShape {
        match self {
            SpriteShape::Dot => SpriteShape::Square,
            SpriteShape::Square => SpriteShape::Cross,
            SpriteShape::Cross => SpriteShape::Dot,
        }
    }
}

/// Tunables for the random motion generator.
///
/// None of these numbers are load-bearing, so they are configuration with
/// sensible defaults rather than constants.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MotionTuning {
    /// Probability of jumping to a fully random location instead of nudging.
    pub jump_probability: f64,

    /// Probability that a move becomes a rapid jitter burst.
    pub jitter_probability: f64,

    /// Maximum per-axis nudge distance in pixels.
    pub nudge_range: i32,

    /// How far beyond the screen edge a jump target may land.
    pub offscreen_margin: i32,

    /// Pointer speed range handed to the OS (clamped to 1-20 at the
    /// platform boundary).
    pub min_speed: u32,
    pub max_speed: u32,

    /// Probability of snapping the speed to an extreme instead of a
    /// mid-range value.
    pub extreme_speed_probability: f64,

    /// Base radius for the fake-cursor swarm around the real cursor.
    pub swarm_radius: i32,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            jump_probability: 0.15,
            jitter_probability: 0.25,
            nudge_range: 150,
            offscreen_margin: 100,
            min_speed: 1,
            max_speed: 30,
            extreme_speed_probability: 0.2,
            swarm_radius: 100,
        }
    }
}

impl MotionTuning {
    /// Clamp all fields to acceptable ranges.
    pub fn validate(&mut self) {
        self.jump_probability = self.jump_probability.clamp(0.0, 1.0);
        self.jitter_probability = self.jitter_probability.clamp(0.0, 1.0);
        self.extreme_speed_probability = self.extreme_speed_probability.clamp(0.0, 1.0);
        self.nudge_range = self.nudge_range.clamp(1, 2000);
        self.offscreen_margin = self.offscreen_margin.clamp(0, 2000);
        self.swarm_radius = self.swarm_radius.clamp(1, 2000);
        self.min_speed = self.min_speed.clamp(1, 30);
        self.max_speed = self.max_speed.clamp(self.min_speed, 30);
    }
}

/// Centralized effect settings.
///
/// Mutated through [`crate::state::ChaosState::update_settings`] and read by
/// the movement worker and effect scheduler on their next tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectSettings {
    /// Suspend every effect without exiting.
    pub paused: bool,

    /// Background chaotic movement of the real cursor.
    pub chaotic_enabled: bool,

    /// Shake the real cursor when it moves faster than `speed_threshold`.
    pub flicker_enabled: bool,

    /// Leave fading dots behind the real cursor.
    pub trail_enabled: bool,

    /// Flash the screen white on fast cursor movement.
    pub flash_enabled: bool,

    /// Flicker displacement in pixels (1-20).
    pub flicker_intensity: u32,

    /// Per-tick cursor travel (pixels) above which flicker triggers (1-50).
    pub speed_threshold: u32,

    /// Overall chaos level (1-10). Higher means shorter rests between moves,
    /// a wider swarm, and a lower flash threshold.
    pub effect_intensity: u32,

    /// Shape drawn for fake cursors.
    pub cursor_shape: SpriteShape,

    /// Number of fake cursors (0-15).
    pub cursor_count: u32,

    /// Side length of a fake-cursor window in pixels (4-64).
    pub sprite_size: u32,

    /// Motion generator tunables.
    pub tuning: MotionTuning,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            paused: false,
            chaotic_enabled: true,
            flicker_enabled: true,
            trail_enabled: true,
            flash_enabled: true,
            flicker_intensity: 5,
            speed_threshold: 15,
            effect_intensity: 5,
            cursor_shape: SpriteShape::Dot,
            cursor_count: 5,
            sprite_size: 12,
            tuning: MotionTuning::default(),
        }
    }
}

impl EffectSettings {
    /// Validate and clamp settings to acceptable ranges.
    pub fn validate(&mut self) {
        self.flicker_intensity = self.flicker_intensity.clamp(1, 20);
        self.speed_threshold = self.speed_threshold.clamp(1, 50);
        self.effect_intensity = self.effect_intensity.clamp(1, 10);
        self.cursor_count = self.cursor_count.min(15);
        self.sprite_size = self.sprite_size.clamp(4, 64);
        self.tuning.validate();
    }
}

/// Default settings file location: `<config_dir>/jitterbug/settings.json`.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jitterbug")
        .join("settings.json")
}

/// Load settings from `path`. A missing file yields defaults; a malformed
/// file is an error so a typo does not silently reset everything.
pub fn load(path: &Path) -> Result<EffectSettings> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            log::info!("[settings] no settings file at {}, using defaults", path.display());
            return Ok(EffectSettings::default());
        }
        Err(err) => return Err(err.into()),
    };
    let mut settings: EffectSettings = serde_json::from_str(&raw)?;
    settings.validate();
    log::info!("[settings] loaded {}", path.display());
    Ok(settings)
}

/// Persist settings to `path`, creating parent directories as needed.
pub fn save(path: &Path, settings: &EffectSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(settings)?)?;
    log::info!("[settings] saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_clamps_every_field() {
        let mut settings = EffectSettings {
            flicker_intensity: 99,
            speed_threshold: 0,
            effect_intensity: 0,
            cursor_count: 40,
            sprite_size: 1,
            ..Default::default()
        };
        settings.tuning.jump_probability = 3.0;
        settings.tuning.max_speed = 500;
        settings.validate();

        assert_eq!(settings.flicker_intensity, 20);
        assert_eq!(settings.speed_threshold, 1);
        assert_eq!(settings.effect_intensity, 1);
        assert_eq!(settings.cursor_count, 15);
        assert_eq!(settings.sprite_size, 4);
        assert_eq!(settings.tuning.jump_probability, 1.0);
        assert_eq!(settings.tuning.max_speed, 30);
    }

    #[test]
    fn validate_keeps_speed_range_ordered() {
        let mut tuning = MotionTuning {
            min_speed: 25,
            max_speed: 3,
            ..Default::default()
        };
        tuning.validate();
        assert!(tuning.min_speed <= tuning.max_speed);
    }

    #[test]
    fn shape_cycle_covers_all_shapes() {
        let mut shape = SpriteShape::Dot;
        let mut seen = vec![shape];
        for _ in 0..2 {
            shape = shape.cycled();
            seen.push(shape);
        }
        assert_eq!(
            seen,
            vec![SpriteShape::Dot, SpriteShape::Square, SpriteShape::Cross]
        );
        assert_eq!(shape.cycled(), SpriteShape::Dot);
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("jitterbug-test-does-not-exist.json");
        let settings = load(&path).unwrap();
        assert_eq!(settings.cursor_count, EffectSettings::default().cursor_count);
    }
}
