//! Fixed-rate effect scheduler.
//!
//! Runs on the thread that owns the overlay backend. Every tick it drains
//! control events, reconciles the fake-cursor set against the desired count
//! and shape, swarms the fakes around the real cursor, runs the speed-gated
//! flicker and flash effects, and advances trail fades. One full pass per
//! tick; sprites never schedule their own callbacks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use rand::rngs::ThreadRng;
use rand::Rng;

use crate::controls::{self, ControlEvent};
use crate::effects::sprite::Sprite;
use crate::platform::{OverlayOps, PointerOps};
use crate::settings::EffectSettings;
use crate::state::{is_effect_active, ChaosState};
use crate::types::{Position, Rgb, ScreenBounds};

/// Scheduler period.
pub const TICK: Duration = Duration::from_millis(50);

/// Flash lifetime in ticks (~100 ms) and its opacity.
const FLASH_TICKS: u8 = 2;
const FLASH_OPACITY: f32 = 0.3;

/// Trail dot side length.
const TRAIL_DOT_SIZE: u32 = 8;

pub struct EffectScheduler {
    state: Arc<ChaosState>,
    pointer: Arc<dyn PointerOps>,
    overlay: Box<dyn OverlayOps>,
    fakes: Vec<Sprite>,
    trails: Vec<Sprite>,
    last_trail_origin: Option<Position>,
    rng: ThreadRng,
}

impl EffectScheduler {
    pub fn new(
        state: Arc<ChaosState>,
        pointer: Arc<dyn PointerOps>,
        overlay: Box<dyn OverlayOps>,
    ) -> Self {
        Self {
            state,
            pointer,
            overlay,
            fakes: Vec::new(),
            trails: Vec::new(),
            last_trail_origin: None,
            rng: rand::thread_rng(),
        }
    }

    /// Run the effect loop until stop is requested, then tear down all
    /// visuals. Blocks the calling thread.
    pub fn run(&mut self, events: &Receiver<ControlEvent>) {
        log::info!("[effects] scheduler started ({} ms tick)", TICK.as_millis());
        loop {
            let started = Instant::now();

            while let Ok(event) = events.try_recv() {
                controls::apply(event, &self.state);
            }
            if self.state.stop_requested() {
                self.shutdown_visuals();
                return;
            }

            self.tick();
            self.overlay.pump_events();

            let elapsed = started.elapsed();
            if elapsed < TICK {
                self.state.wait_for_stop(TICK - elapsed);
            }
        }
    }

    /// One scheduler pass. Split out from [`run`] so tests can drive ticks
    /// without the timing loop.
    pub(crate) fn tick(&mut self) {
        let settings = self.state.settings();
        let bounds = self.pointer.screen_size();

        self.reconcile(&settings, bounds);

        let active = is_effect_active(&self.state, self.pointer.as_ref());
        let cursor = self.pointer.cursor_position();

        if let Some(pos) = cursor {
            if !settings.paused && !self.state.stop_requested() {
                self.swarm(pos, &settings, bounds);
                self.spawn_trail(pos, &settings, bounds);
            }
            self.speed_effects(pos, &settings, active);
        }

        self.fade_trails();

        if self.state.flash_tick() {
            self.overlay.clear_flash();
        }
    }

    /// Create or destroy fake cursors until the live set matches the desired
    /// count, and restyle on shape changes. Must only run on this thread.
    fn reconcile(&mut self, settings: &EffectSettings, bounds: ScreenBounds) {
        let desired = settings.cursor_count as usize;

        while self.fakes.len() < desired {
            let color = Rgb::random_pastel(&mut self.rng);
            let center = Position::new(bounds.width / 2, bounds.height / 2);
            match Sprite::fake(
                self.overlay.as_mut(),
                settings.cursor_shape,
                settings.sprite_size,
                color,
                center,
            ) {
                Ok(sprite) => self.fakes.push(sprite),
                Err(err) => {
                    // Retried on the next reconcile pass.
                    log::warn!("[effects] fake cursor creation failed: {err}");
                    break;
                }
            }
        }

        while self.fakes.len() > desired {
            if let Some(mut sprite) = self.fakes.pop() {
                sprite.destroy(self.overlay.as_mut());
            }
        }

        for sprite in &mut self.fakes {
            sprite.set_shape(self.overlay.as_mut(), settings.cursor_shape);
        }
    }

    /// Scatter the fake cursors around the real one and pulse them.
    fn swarm(&mut self, cursor: Position, settings: &EffectSettings, bounds: ScreenBounds) {
        let radius = settings.tuning.swarm_radius + 20 * settings.effect_intensity as i32;
        for sprite in &mut self.fakes {
            let target = cursor.offset(
                self.rng.gen_range(-radius..=radius),
                self.rng.gen_range(-radius..=radius),
            );
            sprite.move_to(self.overlay.as_mut(), target, bounds);
            sprite.pulse(self.overlay.as_mut());
        }
    }

    /// Drop a fading dot at the cursor position whenever it has moved.
    fn spawn_trail(&mut self, cursor: Position, settings: &EffectSettings, bounds: ScreenBounds) {
        if !settings.trail_enabled {
            self.last_trail_origin = Some(cursor);
            return;
        }
        match self.last_trail_origin {
            Some(origin) if origin == cursor => return,
            None => {
                self.last_trail_origin = Some(cursor);
                return;
            }
            Some(_) => {}
        }
        self.last_trail_origin = Some(cursor);

        let color = Rgb::random_pastel(&mut self.rng);
        match Sprite::trail(self.overlay.as_mut(), TRAIL_DOT_SIZE, color, cursor) {
            Ok(mut dot) => {
                dot.move_to(self.overlay.as_mut(), cursor, bounds);
                self.trails.push(dot);
            }
            Err(err) => log::warn!("[effects] trail dot creation failed: {err}"),
        }
    }

    /// Flicker and flash, both gated on the effect-active predicate and
    /// driven by the distance the cursor travelled since the last pass.
    fn speed_effects(&mut self, cursor: Position, settings: &EffectSettings, active: bool) {
        if !active || (!settings.flicker_enabled && !settings.flash_enabled) {
            return;
        }

        let previous = self.state.swap_last_observed(Some(cursor));
        let Some(previous) = previous else {
            return;
        };
        let distance = previous.distance_to(cursor);

        if settings.flicker_enabled && distance > settings.speed_threshold as f64 {
            let offset = settings.flicker_intensity as i32;
            // Right then left, landing back where the cursor was.
            self.pointer.move_cursor(cursor.offset(offset, 0));
            std::thread::sleep(Duration::from_millis(5));
            self.pointer.move_cursor(cursor);
        }

        let flash_threshold = (settings.effect_intensity * 10) as f64;
        if settings.flash_enabled
            && distance > flash_threshold
            && self.state.try_begin_flash(FLASH_TICKS)
        {
            self.overlay.flash_screen(FLASH_OPACITY);
        }
    }

    /// Advance every trail fade; expired dots destroy themselves.
    fn fade_trails(&mut self) {
        let overlay = &mut self.overlay;
        self.trails.retain_mut(|dot| !dot.fade_tick(overlay.as_mut()));
    }

    /// Terminal state: destroy every sprite and clear any flash.
    fn shutdown_visuals(&mut self) {
        let fakes = self.fakes.len();
        let trails = self.trails.len();
        for mut sprite in self.fakes.drain(..) {
            sprite.destroy(self.overlay.as_mut());
        }
        for mut dot in self.trails.drain(..) {
            dot.destroy(self.overlay.as_mut());
        }
        self.overlay.clear_flash();
        self.overlay.pump_events();
        log::info!("[effects] scheduler stopped ({fakes} fakes, {trails} trail dots destroyed)");
    }

    #[cfg(test)]
    pub(crate) fn fake_count(&self) -> usize {
        self.fakes.len()
    }

    #[cfg(test)]
    pub(crate) fn trail_count(&self) -> usize {
        self.trails.len()
    }

    #[cfg(test)]
    pub(crate) fn fake_shapes(&self) -> Vec<crate::settings::SpriteShape> {
        self.fakes.iter().map(|s| s.shape()).collect()
    }

    #[cfg(test)]
    pub(crate) fn finish(&mut self) {
        self.shutdown_visuals();
    }
}
