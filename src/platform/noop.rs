//! Fallback backend for hosts without pointer-speed or overlay support.
//!
//! Every operation logs and succeeds, so the rest of the application runs
//! unchanged (useful for development on non-Windows machines). The warning
//! is emitted once, at construction.

use crate::error::Result;
use crate::platform::{OverlayOps, PointerOps, SpriteDesc, SpriteHandle};
use crate::settings::SpriteShape;
use crate::types::{Position, Rgb, ScreenBounds};

/// Assumed screen size when the host cannot be queried.
const FALLBACK_BOUNDS: ScreenBounds = ScreenBounds {
    width: 1920,
    height: 1080,
};

pub struct NoopPointer;

impl NoopPointer {
    pub fn new() -> Self {
        log::warn!("[platform] pointer control is not supported on this platform; running no-op");
        Self
    }
}

impl PointerOps for NoopPointer {
    fn cursor_position(&self) -> Option<Position> {
        None
    }

    fn move_cursor(&self, pos: Position) {
        log::debug!("[platform] move_cursor({}, {}) ignored", pos.x, pos.y);
    }

    fn screen_size(&self) -> ScreenBounds {
        FALLBACK_BOUNDS
    }

    fn set_pointer_speed(&self, speed: u32) {
        log::debug!("[platform] set_pointer_speed({speed}) ignored");
    }

    fn control_surface_focused(&self) -> bool {
        false
    }
}

pub struct NoopOverlay {
    next_handle: SpriteHandle,
}

impl NoopOverlay {
    pub fn new() -> Self {
        log::warn!("[platform] overlay windows are not supported on this platform; running no-op");
        Self { next_handle: 1 }
    }
}

impl OverlayOps for NoopOverlay {
    fn create_sprite(&mut self, desc: &SpriteDesc) -> Result<SpriteHandle> {
        let handle = self.next_handle;
        self.next_handle += 1;
        log::debug!("[platform] sprite {handle} ({:?}) ignored", desc.shape);
        Ok(handle)
    }

    fn move_sprite(&mut self, _handle: SpriteHandle, _pos: Position) {}

    fn restyle_sprite(&mut self, _handle: SpriteHandle, _shape: SpriteShape, _color: Rgb) {}

    fn set_sprite_opacity(&mut self, _handle: SpriteHandle, _opacity: f32) {}

    fn destroy_sprite(&mut self, _handle: SpriteHandle) {}

    fn flash_screen(&mut self, _opacity: f32) {}

    fn clear_flash(&mut self) {}

    fn pump_events(&mut self) {}
}
