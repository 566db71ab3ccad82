//! Recording test doubles for the platform traits.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{JitterError, Result};
use crate::platform::{OverlayOps, PointerOps, SpriteDesc, SpriteHandle};
use crate::settings::SpriteShape;
use crate::types::{Position, Rgb, ScreenBounds};

/// Pointer double: scripted position readings, recorded writes.
pub struct MockPointer {
    /// Positions handed out by `cursor_position`, in order. When empty the
    /// last known position is repeated.
    pub positions: Mutex<VecDeque<Position>>,
    current: Mutex<Position>,
    pub moves: Mutex<Vec<Position>>,
    pub speeds: Mutex<Vec<u32>>,
    focused: AtomicBool,
    bounds: ScreenBounds,
}

impl MockPointer {
    pub fn new() -> Self {
        Self {
            positions: Mutex::new(VecDeque::new()),
            current: Mutex::new(Position::new(500, 400)),
            moves: Mutex::new(Vec::new()),
            speeds: Mutex::new(Vec::new()),
            focused: AtomicBool::new(false),
            bounds: ScreenBounds::new(1920, 1080),
        }
    }

    pub fn push_position(&self, pos: Position) {
        self.positions.lock().push_back(pos);
    }

    pub fn set_focused(&self, focused: bool) {
        self.focused.store(focused, Ordering::SeqCst);
    }
}

impl PointerOps for MockPointer {
    fn cursor_position(&self) -> Option<Position> {
        if let Some(next) = self.positions.lock().pop_front() {
            *self.current.lock() = next;
            return Some(next);
        }
        Some(*self.current.lock())
    }

    fn move_cursor(&self, pos: Position) {
        self.moves.lock().push(pos);
        *self.current.lock() = pos;
    }

    fn screen_size(&self) -> ScreenBounds {
        self.bounds
    }

    fn set_pointer_speed(&self, speed: u32) {
        self.speeds.lock().push(speed);
    }

    fn control_surface_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }
}

/// Everything the mock overlay backend observed.
#[derive(Default)]
pub struct OverlayLog {
    pub created: Vec<(SpriteHandle, SpriteDesc)>,
    pub destroyed: Vec<SpriteHandle>,
    pub moved: Vec<(SpriteHandle, Position)>,
    pub restyled: Vec<(SpriteHandle, SpriteShape, Rgb)>,
    pub opacities: Vec<(SpriteHandle, f32)>,
    pub flashes: u32,
    pub flash_clears: u32,
    pub live: HashSet<SpriteHandle>,
    /// When set, `create_sprite` fails.
    pub fail_creates: bool,
}

pub type LogHandle = Arc<Mutex<OverlayLog>>;

/// Overlay double that records every call into a shared log.
pub struct MockOverlay {
    next_handle: SpriteHandle,
    log: LogHandle,
}

impl MockOverlay {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            log: Arc::new(Mutex::new(OverlayLog::default())),
        }
    }

    /// Handle for inspecting the log after the overlay is boxed away.
    pub fn log_handle(&self) -> LogHandle {
        self.log.clone()
    }

    /// Direct access for single-threaded tests.
    pub fn log(&self) -> parking_lot::MutexGuard<'_, OverlayLog> {
        self.log.lock()
    }
}

impl OverlayOps for MockOverlay {
    fn create_sprite(&mut self, desc: &SpriteDesc) -> Result<SpriteHandle> {
        let mut log = self.log.lock();
        if log.fail_creates {
            return Err(JitterError::Overlay("mock create failure".into()));
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        log.created.push((handle, *desc));
        log.live.insert(handle);
        Ok(handle)
    }

    fn move_sprite(&mut self, handle: SpriteHandle, pos: Position) {
        self.log.lock().moved.push((handle, pos));
    }

    fn restyle_sprite(&mut self, handle: SpriteHandle, shape: SpriteShape, color: Rgb) {
        self.log.lock().restyled.push((handle, shape, color));
    }

    fn set_sprite_opacity(&mut self, handle: SpriteHandle, opacity: f32) {
        self.log.lock().opacities.push((handle, opacity));
    }

    fn destroy_sprite(&mut self, handle: SpriteHandle) {
        let mut log = self.log.lock();
        log.destroyed.push(handle);
        log.live.remove(&handle);
    }

    fn flash_screen(&mut self, _opacity: f32) {
        self.log.lock().flashes += 1;
    }

    fn clear_flash(&mut self) {
        self.log.lock().flash_clears += 1;
    }

    fn pump_events(&mut self) {}
}
