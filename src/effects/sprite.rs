//! Sprite model: the crate-side state of one overlay window.
//!
//! The backend owns the actual window; this struct owns the animation state
//! (pulse phase, trail fade) and guards every operation against an already
//! destroyed window.

use crate::error::Result;
use crate::platform::{OverlayOps, SpriteDesc, SpriteHandle};
use crate::settings::SpriteShape;
use crate::types::{Position, Rgb, ScreenBounds};

/// Brightness pulse bounds and step.
const PULSE_MIN: f32 = 0.5;
const PULSE_MAX: f32 = 1.0;
const PULSE_STEP: f32 = 0.05;

/// Number of fade ticks a trail dot lives for.
pub const TRAIL_TICKS: u8 = 10;

/// Opacity lost per trail fade tick.
const TRAIL_FADE_STEP: f32 = 0.1;

/// Triangle-wave brightness phase in `[PULSE_MIN, PULSE_MAX]`.
///
/// Direction reverses exactly at the bounds; the level is clamped there so
/// repeated advances can never escape the range.
#[derive(Clone, Copy, Debug)]
pub struct PulsePhase {
    level: f32,
    rising: bool,
}

impl PulsePhase {
    pub fn new() -> Self {
        Self {
            level: PULSE_MAX,
            rising: true,
        }
    }

    /// Advance one step and return the new level.
    pub fn advance(&mut self) -> f32 {
        if self.rising {
            self.level += PULSE_STEP;
        } else {
            self.level -= PULSE_STEP;
        }
        if self.level >= PULSE_MAX {
            self.level = PULSE_MAX;
            self.rising = false;
        } else if self.level <= PULSE_MIN {
            self.level = PULSE_MIN;
            self.rising = true;
        }
        self.level
    }

    pub fn level(&self) -> f32 {
        self.level
    }
}

impl Default for PulsePhase {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SpriteKind {
    Fake,
    Trail { ticks_left: u8 },
}

/// One live overlay sprite.
#[derive(Debug)]
pub struct Sprite {
    handle: SpriteHandle,
    kind: SpriteKind,
    shape: SpriteShape,
    size: u32,
    color: Rgb,
    position: Position,
    pulse: PulsePhase,
    destroyed: bool,
}

impl Sprite {
    /// Create a fake-cursor sprite.
    pub fn fake(
        overlay: &mut dyn OverlayOps,
        shape: SpriteShape,
        size: u32,
        color: Rgb,
        position: Position,
    ) -> Result<Self> {
        let handle = overlay.create_sprite(&SpriteDesc {
            shape,
            size,
            color,
            position,
        })?;
        Ok(Self {
            handle,
            kind: SpriteKind::Fake,
            shape,
            size,
            color,
            position,
            pulse: PulsePhase::new(),
            destroyed: false,
        })
    }

    /// Create a trail dot at `position`. It lives for [`TRAIL_TICKS`] fade
    /// ticks and then destroys itself.
    pub fn trail(
        overlay: &mut dyn OverlayOps,
        size: u32,
        color: Rgb,
        position: Position,
    ) -> Result<Self> {
        let handle = overlay.create_sprite(&SpriteDesc {
            shape: SpriteShape::Dot,
            size,
            color,
            position,
        })?;
        Ok(Self {
            handle,
            kind: SpriteKind::Trail {
                ticks_left: TRAIL_TICKS,
            },
            shape: SpriteShape::Dot,
            size,
            color,
            position,
            pulse: PulsePhase::new(),
            destroyed: false,
        })
    }

    /// Move the sprite, keeping its bounding box fully on screen.
    pub fn move_to(&mut self, overlay: &mut dyn OverlayOps, pos: Position, bounds: ScreenBounds) {
        if self.destroyed {
            return;
        }
        let clamped = pos.clamped(bounds, self.size as i32);
        self.position = clamped;
        overlay.move_sprite(self.handle, clamped);
    }

    /// Advance the brightness pulse and redraw at the new level.
    pub fn pulse(&mut self, overlay: &mut dyn OverlayOps) {
        if self.destroyed {
            return;
        }
        let level = self.pulse.advance();
        overlay.restyle_sprite(self.handle, self.shape, self.color.scaled(level));
    }

    /// Switch shape in place; the window is redrawn, not recreated.
    pub fn set_shape(&mut self, overlay: &mut dyn OverlayOps, shape: SpriteShape) {
        if self.destroyed || self.shape == shape {
            return;
        }
        self.shape = shape;
        overlay.restyle_sprite(self.handle, shape, self.color.scaled(self.pulse.level()));
    }

    /// Advance a trail dot's fade by one tick. Returns `true` when the
    /// sprite expired (and destroyed itself) on this tick. Fake sprites
    /// never expire.
    pub fn fade_tick(&mut self, overlay: &mut dyn OverlayOps) -> bool {
        let SpriteKind::Trail { ticks_left } = &mut self.kind else {
            return false;
        };
        if self.destroyed {
            return true;
        }
        *ticks_left -= 1;
        if *ticks_left == 0 {
            self.destroy(overlay);
            return true;
        }
        overlay.set_sprite_opacity(self.handle, *ticks_left as f32 * TRAIL_FADE_STEP);
        false
    }

    /// Release the window. Safe to call more than once.
    pub fn destroy(&mut self, overlay: &mut dyn OverlayOps) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        overlay.destroy_sprite(self.handle);
    }

    pub fn shape(&self) -> SpriteShape {
        self.shape
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
