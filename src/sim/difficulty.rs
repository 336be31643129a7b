//! Difficulty curve: forward speed, distance, and the spawn pressure derived
//! from distance

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Forward motion of the run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Current forward speed (m/s)
    pub speed: f32,
    /// Meters traveled this run
    pub distance: f32,
    /// Speed gained per second
    pub acceleration: f32,
}

impl Difficulty {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            speed: tuning.start_speed,
            distance: 0.0,
            acceleration: tuning.acceleration,
        }
    }

    /// Advance one frame: distance at the current speed, then accelerate
    pub fn advance(&mut self, dt: f32) {
        self.distance += self.speed * dt;
        self.speed += self.acceleration * dt;
    }

    /// Meters shown to the player and stored as a score
    pub fn meters(&self) -> u32 {
        self.distance.max(0.0).floor() as u32
    }
}

/// Enemy cap for a distance: one extra enemy per 100 m, from 12 up to 150.
/// A limit below the base cap pins the cap at the base.
pub fn max_active_enemies(distance: f32, tuning: &Tuning) -> u32 {
    let base = tuning.base_max_enemies;
    let extra = (distance.max(0.0) / tuning.meters_per_extra_enemy).floor() as u32;
    base.saturating_add(extra).min(tuning.enemy_limit.max(base))
}

/// Seconds between wave spawns for a distance: 1.0 shrinking to 0.3
pub fn spawn_interval(distance: f32, tuning: &Tuning) -> f32 {
    (tuning.base_spawn_interval - distance.max(0.0) / tuning.spawn_interval_falloff)
        .max(tuning.min_spawn_interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_constant_speed_run_covers_800m() {
        let tuning = Tuning::constant_speed(8.0);
        let mut difficulty = Difficulty::new(&tuning);
        let dt = 1.0 / 60.0;
        let mut crossed_at = None;

        for frame in 0..6000 {
            let before = max_active_enemies(difficulty.distance, &tuning);
            difficulty.advance(dt);
            let after = max_active_enemies(difficulty.distance, &tuning);
            if before != after && crossed_at.is_none() {
                crossed_at = Some((frame, before, after, difficulty.distance));
            }
        }

        assert!((difficulty.distance - 800.0).abs() < 0.5, "distance {}", difficulty.distance);
        assert_eq!(difficulty.speed, 8.0);
        let (_, before, after, at) = crossed_at.expect("cap never changed");
        assert_eq!((before, after), (12, 13));
        assert!(at >= 100.0 && at < 100.0 + 8.0 * dt + 1e-3);
    }

    #[test]
    fn test_cap_steps_exactly_at_100m() {
        let tuning = Tuning::default();
        assert_eq!(max_active_enemies(0.0, &tuning), 12);
        assert_eq!(max_active_enemies(99.99, &tuning), 12);
        assert_eq!(max_active_enemies(100.0, &tuning), 13);
        assert_eq!(max_active_enemies(1e9, &tuning), 150);
    }

    #[test]
    fn test_limit_below_base_pins_cap() {
        let tuning = Tuning::from_json(r#"{ "base_max_enemies": 200 }"#).unwrap();
        assert_eq!(max_active_enemies(0.0, &tuning), 200);
        assert_eq!(max_active_enemies(5000.0, &tuning), 200);
    }

    #[test]
    fn test_interval_floor() {
        let tuning = Tuning::default();
        assert_eq!(spawn_interval(0.0, &tuning), 1.0);
        assert!((spawn_interval(1250.0, &tuning) - 0.5).abs() < 1e-6);
        assert_eq!(spawn_interval(10_000.0, &tuning), 0.3);
    }

    #[test]
    fn test_speed_ramps_while_playing() {
        let tuning = Tuning::default();
        let mut difficulty = Difficulty::new(&tuning);
        difficulty.advance(1.0);
        assert_eq!(difficulty.distance, 8.0);
        assert!((difficulty.speed - 8.3).abs() < 1e-6);
        assert_eq!(difficulty.meters(), 8);
    }

    proptest! {
        #[test]
        fn prop_cap_monotone_and_bounded(a in 0.0f32..1e6, b in 0.0f32..1e6) {
            let tuning = Tuning::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(max_active_enemies(lo, &tuning) <= max_active_enemies(hi, &tuning));
            prop_assert!(max_active_enemies(hi, &tuning) <= 150);
        }

        #[test]
        fn prop_interval_monotone_and_floored(a in 0.0f32..1e6, b in 0.0f32..1e6) {
            let tuning = Tuning::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(spawn_interval(lo, &tuning) >= spawn_interval(hi, &tuning));
            prop_assert!(spawn_interval(hi, &tuning) >= 0.3);
        }
    }
}
