//! Background movement worker.
//!
//! One thread that perturbs the real cursor and the OS pointer speed until
//! stop is requested. All sleeps go through the shared stop signal so the
//! thread wakes immediately on shutdown, and a drop guard restores the OS
//! pointer speed on every exit path, panics included.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver};
use rand::Rng;

use crate::error::{JitterError, Result};
use crate::motion::generator;
use crate::platform::{PointerOps, OS_DEFAULT_POINTER_SPEED};
use crate::state::{is_effect_active, ChaosState};
use crate::types::Position;

/// Re-check cadence while effects are paused or disabled.
const IDLE_RECHECK: Duration = Duration::from_millis(100);

/// Step interval for tweened moves and jitter sub-moves.
const MOVE_STEP: Duration = Duration::from_millis(5);

/// Restores the OS pointer speed when dropped.
struct SpeedResetGuard {
    pointer: Arc<dyn PointerOps>,
}

impl Drop for SpeedResetGuard {
    fn drop(&mut self) {
        self.pointer.set_pointer_speed(OS_DEFAULT_POINTER_SPEED);
        log::info!(
            "[worker] pointer speed restored to {}",
            OS_DEFAULT_POINTER_SPEED
        );
    }
}

/// Handle to the running movement worker.
pub struct WorkerHandle {
    thread: Option<JoinHandle<()>>,
    done: Receiver<()>,
}

impl WorkerHandle {
    /// Spawn the worker thread.
    pub fn spawn(state: Arc<ChaosState>, pointer: Arc<dyn PointerOps>) -> Result<Self> {
        let (done_tx, done_rx) = bounded(1);
        let thread = std::thread::Builder::new()
            .name("movement-worker".into())
            .spawn(move || {
                run_loop(&state, &pointer);
                let _ = done_tx.send(());
            })
            .map_err(|err| JitterError::Worker(err.to_string()))?;
        Ok(Self {
            thread: Some(thread),
            done: done_rx,
        })
    }

    /// Wait for the worker to finish, up to `timeout`. Returns whether it
    /// exited in time; if not, the thread is left detached (its drop guard
    /// still runs whenever it does exit).
    pub fn shutdown(mut self, timeout: Duration) -> bool {
        match self.done.recv_timeout(timeout) {
            Ok(()) => {
                if let Some(thread) = self.thread.take() {
                    let _ = thread.join();
                }
                true
            }
            Err(_) => {
                log::warn!("[worker] did not stop within {:?}, detaching", timeout);
                false
            }
        }
    }
}

fn run_loop(state: &ChaosState, pointer: &Arc<dyn PointerOps>) {
    let _reset = SpeedResetGuard {
        pointer: pointer.clone(),
    };
    let mut rng = rand::thread_rng();
    log::info!("[worker] chaotic movement loop started");

    while !state.stop_requested() {
        let settings = state.settings();
        if !settings.chaotic_enabled || !is_effect_active(state, pointer.as_ref()) {
            if state.wait_for_stop(IDLE_RECHECK) {
                break;
            }
            continue;
        }

        let Some(current) = pointer.cursor_position() else {
            if state.wait_for_stop(IDLE_RECHECK) {
                break;
            }
            continue;
        };
        let bounds = pointer.screen_size();

        let mv = generator::next_move(current, bounds, &settings.tuning, &mut rng);
        pointer.set_pointer_speed(mv.speed);

        if mv.jitter_burst {
            jitter_burst(state, pointer, mv.target, &mut rng);
        } else {
            smooth_move(state, pointer, current, mv.target, &mut rng);
        }

        if state.wait_for_stop(rest_interval(settings.effect_intensity, &mut rng)) {
            break;
        }
    }
    log::info!("[worker] chaotic movement loop exiting");
}

/// Tween from `from` to `to` over a randomized duration, abandoning the move
/// as soon as effects go inactive or stop is requested.
fn smooth_move(
    state: &ChaosState,
    pointer: &Arc<dyn PointerOps>,
    from: Position,
    to: Position,
    rng: &mut impl Rng,
) {
    let bounds = pointer.screen_size();
    let duration_ms: u64 = rng.gen_range(5..=700);
    let steps = (duration_ms / MOVE_STEP.as_millis() as u64).max(1) as i32;

    for step in 1..=steps {
        if state.stop_requested() || !is_effect_active(state, pointer.as_ref()) {
            return;
        }
        let x = from.x + (to.x - from.x) * step / steps;
        let y = from.y + (to.y - from.y) * step / steps;
        pointer.move_cursor(Position::new(x, y).clamped(bounds, 1));
        if state.wait_for_stop(MOVE_STEP) {
            return;
        }
    }
}

/// Rapid small-amplitude sub-moves around the target.
fn jitter_burst(
    state: &ChaosState,
    pointer: &Arc<dyn PointerOps>,
    around: Position,
    rng: &mut impl Rng,
) {
    let bounds = pointer.screen_size();
    let count = rng.gen_range(10..=25);
    for _ in 0..count {
        if state.stop_requested() || !is_effect_active(state, pointer.as_ref()) {
            return;
        }
        let target = around
            .offset(rng.gen_range(-20..=20), rng.gen_range(-20..=20))
            .clamped(bounds, 1);
        pointer.move_cursor(target);
        if state.wait_for_stop(MOVE_STEP) {
            return;
        }
    }
}

/// Randomized pause between moves, shrinking as intensity rises.
fn rest_interval(intensity: u32, rng: &mut impl Rng) -> Duration {
    let base_ms: u64 = rng.gen_range(50..=1200);
    let factor = (11 - intensity.clamp(1, 10)) as f64 / 10.0;
    Duration::from_millis(((base_ms as f64 * factor) as u64).max(10))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockPointer;
    use crate::platform::OS_DEFAULT_POINTER_SPEED;
    use crate::settings::EffectSettings;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Instant;

    fn make_state(mutate: impl FnOnce(&mut EffectSettings)) -> Arc<ChaosState> {
        let mut settings = EffectSettings::default();
        mutate(&mut settings);
        Arc::new(ChaosState::new(settings))
    }

    #[test]
    fn stop_during_sleep_exits_promptly_and_resets_speed() {
        let state = make_state(|_| {});
        let pointer = Arc::new(MockPointer::new());
        let shared: Arc<dyn PointerOps> = pointer.clone();

        let worker = WorkerHandle::spawn(state.clone(), shared).unwrap();
        std::thread::sleep(Duration::from_millis(80));

        let started = Instant::now();
        state.request_stop();
        assert!(worker.shutdown(Duration::from_secs(2)));
        assert!(started.elapsed() < Duration::from_millis(500));

        assert_eq!(
            pointer.speeds.lock().last().copied(),
            Some(OS_DEFAULT_POINTER_SPEED)
        );
    }

    #[test]
    fn idle_worker_never_touches_the_cursor() {
        let state = make_state(|s| s.chaotic_enabled = false);
        let pointer = Arc::new(MockPointer::new());
        let shared: Arc<dyn PointerOps> = pointer.clone();

        let worker = WorkerHandle::spawn(state.clone(), shared).unwrap();
        std::thread::sleep(Duration::from_millis(150));
        state.request_stop();
        assert!(worker.shutdown(Duration::from_secs(2)));

        assert!(pointer.moves.lock().is_empty());
        // Only the shutdown reset touched the pointer speed.
        assert_eq!(pointer.speeds.lock().as_slice(), &[OS_DEFAULT_POINTER_SPEED]);
    }

    #[test]
    fn focused_control_surface_suppresses_movement() {
        let state = make_state(|_| {});
        let pointer = Arc::new(MockPointer::new());
        pointer.set_focused(true);
        let shared: Arc<dyn PointerOps> = pointer.clone();

        let worker = WorkerHandle::spawn(state.clone(), shared).unwrap();
        std::thread::sleep(Duration::from_millis(150));
        state.request_stop();
        assert!(worker.shutdown(Duration::from_secs(2)));

        assert!(pointer.moves.lock().is_empty());
    }

    #[test]
    fn active_worker_moves_cursor_and_sets_speed() {
        let state = make_state(|_| {});
        let pointer = Arc::new(MockPointer::new());
        let shared: Arc<dyn PointerOps> = pointer.clone();

        let worker = WorkerHandle::spawn(state.clone(), shared).unwrap();
        std::thread::sleep(Duration::from_millis(400));
        state.request_stop();
        assert!(worker.shutdown(Duration::from_secs(2)));

        assert!(!pointer.moves.lock().is_empty());
        // At least one generated speed plus the final reset.
        assert!(pointer.speeds.lock().len() >= 2);
        let bounds = pointer.screen_size();
        for pos in pointer.moves.lock().iter() {
            assert!(bounds.contains(*pos), "cursor applied off screen: {:?}", pos);
        }
    }

    #[test]
    fn rest_interval_shrinks_with_intensity() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut calm = Duration::ZERO;
        let mut frantic = Duration::ZERO;
        for _ in 0..200 {
            calm += rest_interval(1, &mut rng);
            frantic += rest_interval(10, &mut rng);
        }
        assert!(frantic < calm);
        assert!(frantic >= Duration::from_millis(200 * 10));
    }
}
