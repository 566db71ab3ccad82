//! Random motion generator.
//!
//! Pure function of the current position, screen bounds, tuning, and an
//! injected RNG. Stateless so it can be driven with a seeded RNG in tests.

use rand::Rng;

use crate::settings::MotionTuning;
use crate::types::{Position, ScreenBounds};

/// One step of chaotic movement.
#[derive(Clone, Copy, Debug)]
pub struct NextMove {
    /// Where the cursor should go. Inside the screen for nudges; may land in
    /// the margin-expanded area for jumps.
    pub target: Position,

    /// OS pointer speed to apply before moving.
    pub speed: u32,

    /// When set, the caller should perform a burst of rapid small sub-moves
    /// around the target instead of one smooth move.
    pub jitter_burst: bool,
}

/// Produce the next cursor target and pointer speed.
pub fn next_move(
    current: Position,
    bounds: ScreenBounds,
    tuning: &MotionTuning,
    rng: &mut impl Rng,
) -> NextMove {
    // Occasionally snap the speed to an extreme to mimic erratic hardware.
    let speed = if rng.gen_bool(tuning.extreme_speed_probability) {
        if rng.gen_bool(0.5) {
            tuning.min_speed
        } else {
            tuning.max_speed
        }
    } else {
        rng.gen_range(tuning.min_speed..=tuning.max_speed)
    };

    let target = if rng.gen_bool(tuning.jump_probability) {
        // Wild jump anywhere in the screen expanded by the margin.
        let margin = tuning.offscreen_margin;
        Position::new(
            rng.gen_range(-margin..=bounds.width + margin),
            rng.gen_range(-margin..=bounds.height + margin),
        )
    } else {
        let nudge = tuning.nudge_range;
        current
            .offset(rng.gen_range(-nudge..=nudge), rng.gen_range(-nudge..=nudge))
            .clamped(bounds, 1)
    };

    NextMove {
        target,
        speed,
        jitter_burst: rng.gen_bool(tuning.jitter_probability),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bounds() -> ScreenBounds {
        ScreenBounds::new(1920, 1080)
    }

    #[test]
    fn nudge_targets_stay_on_screen() {
        let mut rng = StdRng::seed_from_u64(42);
        let tuning = MotionTuning {
            jump_probability: 0.0,
            ..Default::default()
        };
        let mut current = Position::new(960, 540);
        for _ in 0..500 {
            let mv = next_move(current, bounds(), &tuning, &mut rng);
            assert!(bounds().contains(mv.target), "target {:?} off screen", mv.target);
            current = mv.target;
        }
    }

    #[test]
    fn nudge_from_screen_corner_is_clamped() {
        let mut rng = StdRng::seed_from_u64(1);
        let tuning = MotionTuning {
            jump_probability: 0.0,
            nudge_range: 2000,
            ..Default::default()
        };
        for _ in 0..200 {
            let mv = next_move(Position::new(0, 0), bounds(), &tuning, &mut rng);
            assert!(bounds().contains(mv.target));
        }
    }

    #[test]
    fn jump_targets_stay_within_expanded_area() {
        let mut rng = StdRng::seed_from_u64(7);
        let tuning = MotionTuning {
            jump_probability: 1.0,
            offscreen_margin: 100,
            ..Default::default()
        };
        let mut saw_offscreen = false;
        for _ in 0..500 {
            let mv = next_move(Position::new(960, 540), bounds(), &tuning, &mut rng);
            assert!(mv.target.x >= -100 && mv.target.x <= 1920 + 100);
            assert!(mv.target.y >= -100 && mv.target.y <= 1080 + 100);
            saw_offscreen |= !bounds().contains(mv.target);
        }
        assert!(saw_offscreen, "expanded area never produced an excursion");
    }

    #[test]
    fn speed_stays_in_configured_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let tuning = MotionTuning::default();
        for _ in 0..500 {
            let mv = next_move(Position::new(10, 10), bounds(), &tuning, &mut rng);
            assert!(mv.speed >= tuning.min_speed && mv.speed <= tuning.max_speed);
        }
    }

    #[test]
    fn jitter_probability_extremes() {
        let mut rng = StdRng::seed_from_u64(9);
        let always = MotionTuning {
            jitter_probability: 1.0,
            ..Default::default()
        };
        let never = MotionTuning {
            jitter_probability: 0.0,
            ..Default::default()
        };
        for _ in 0..50 {
            assert!(next_move(Position::new(5, 5), bounds(), &always, &mut rng).jitter_burst);
            assert!(!next_move(Position::new(5, 5), bounds(), &never, &mut rng).jitter_burst);
        }
    }
}
