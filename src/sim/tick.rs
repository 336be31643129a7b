//! Per-frame simulation tick
//!
//! Advances the session by one variable timestep. Order within a frame:
//! difficulty, track, enemies, pickups, player, then collision resolution.

use rand::Rng;

use super::collision::resolve;
use super::kind::EnemyKind;
use super::player::InputIntent;
use super::state::{GamePhase, GameSession};
use crate::lane_x;

/// Longest frame the simulation accepts; longer hitches are clamped
pub const MAX_DT: f32 = 0.1;

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Intents delivered since the previous frame, in arrival order
    pub intents: Vec<InputIntent>,
    /// Demo mode - the session dodges by itself
    pub autopilot: bool,
}

/// Advance the session by `dt` seconds
pub fn tick<R: Rng>(session: &mut GameSession<R>, input: &TickInput, dt: f32) {
    let dt = dt.clamp(0.0, MAX_DT);

    match session.phase {
        GamePhase::Menu | GamePhase::GameOver => return,
        GamePhase::Dying => {
            // World is frozen; only the death sequence advances
            session.player.update(dt, &mut session.events);
            if session.player.death_finished() {
                session.finish_run();
            }
            return;
        }
        GamePhase::Playing => {}
    }

    for &intent in &input.intents {
        session.handle_input(intent);
    }
    if input.autopilot {
        if let Some(intent) = autopilot_intent(session) {
            session.handle_input(intent);
        }
    }

    session.difficulty.advance(dt);
    let speed = session.difficulty.speed;
    let distance = session.difficulty.distance;

    session.track.update(dt, speed);

    session.enemies.update(
        dt,
        speed,
        distance,
        &session.tuning,
        &session.catalog,
        &mut session.rng,
        &mut session.events,
    );

    let player_box = session.player.bounding_box();
    let reference_z = session.enemies.spawn_reference_z();
    session.shields.update(
        dt,
        speed,
        Some(player_box),
        reference_z,
        &session.catalog,
        &mut session.rng,
        &mut session.events,
    );

    session.player.update(dt, &mut session.events);

    let resolution = resolve(
        &session.player,
        &session.enemies.enemies,
        session.shields.has_shield,
    );
    for id in resolution.kills {
        session
            .enemies
            .kill(id, &session.catalog, &mut session.events);
    }
    if let Some(killer) = resolution.fatal {
        session.end_run(killer);
    }
}

/// How far ahead (seconds to contact) the autopilot starts changing lanes
const DODGE_HORIZON: f32 = 1.2;
/// Seconds to contact at which it jumps or rolls
const DUCK_HORIZON: f32 = 0.3;
/// Lateral distance at which an enemy counts as sharing a lane
const LANE_TOLERANCE: f32 = 1.0;

/// Seconds until the nearest live enemy in `lane` reaches the player, if one
/// is inside `horizon`
fn threat_in_lane<R: Rng>(session: &GameSession<R>, lane: usize, horizon: f32) -> Option<(f32, EnemyKind)> {
    let player_z = session.player.pos.z;
    let x = lane_x(lane);
    let speed = session.difficulty.speed;

    session
        .enemies
        .enemies
        .iter()
        .filter(|e| !e.is_dead() && (e.pos.x - x).abs() < LANE_TOLERANCE)
        .filter_map(|e| {
            let closing = speed + e.kind.config().run_speed;
            let gap = player_z - e.pos.z;
            if gap < -1.5 {
                return None;
            }
            // Already alongside counts as imminent
            let ttc = if closing > 0.0 {
                gap.max(0.0) / closing
            } else {
                f32::INFINITY
            };
            (ttc <= horizon).then_some((ttc, e.kind))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
}

/// Pick an intent for the demo player: sidestep walkers and runners, jump
/// crawlers, roll under flyers. With the shield up it just runs through.
pub fn autopilot_intent<R: Rng>(session: &GameSession<R>) -> Option<InputIntent> {
    if session.phase != GamePhase::Playing || session.shields.has_shield {
        return None;
    }
    let player = &session.player;
    let lane = player.lane;
    let (ttc, kind) = threat_in_lane(session, lane, DODGE_HORIZON)?;

    let clear = |l: usize| threat_in_lane(session, l, DODGE_HORIZON).is_none();
    let mut candidates = Vec::with_capacity(2);
    if lane > 0 {
        candidates.push((lane - 1, InputIntent::LaneLeft));
    }
    if lane < 2 {
        candidates.push((lane + 1, InputIntent::LaneRight));
    }
    // Prefer heading back toward the center
    candidates.sort_by_key(|(l, _)| l.abs_diff(1));

    if let Some(&(_, intent)) = candidates.iter().find(|(l, _)| clear(*l)) {
        return Some(intent);
    }

    if ttc <= DUCK_HORIZON && !player.is_jumping() && !player.is_rolling() {
        return match kind {
            EnemyKind::Crawler => Some(InputIntent::Jump),
            EnemyKind::Flyer => Some(InputIntent::Roll),
            EnemyKind::Walker | EnemyKind::Runner => None,
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetCatalog;
    use crate::consts::PLAYER_Z;
    use crate::sim::enemy::EnemyStatus;
    use crate::sim::rng::seeded_rng;
    use crate::sim::state::{EnemyRef, GameEvent};
    use crate::tuning::Tuning;

    fn session_with(tuning: Tuning, seed: u64) -> GameSession {
        GameSession::with_rng(tuning, AssetCatalog::builtin(), seeded_rng(seed))
    }

    fn playing(seed: u64) -> GameSession {
        let mut s = session_with(Tuning::default(), seed);
        s.start();
        s
    }

    /// Drop every enemy so a test controls the field
    fn clear_field(s: &mut GameSession) {
        s.enemies.reset(&s.tuning, &mut s.events);
    }

    #[test]
    fn test_menu_is_inert() {
        let mut s = session_with(Tuning::default(), 1);
        let before = s.track.sorted_z();
        tick(&mut s, &TickInput::default(), 0.05);
        assert_eq!(s.distance(), 0.0);
        assert_eq!(s.track.sorted_z(), before);
    }

    #[test]
    fn test_constant_speed_distance_and_cap() {
        let mut s = session_with(Tuning::constant_speed(8.0), 2);
        s.start();
        // Keep the run alive: no enemies ever reach the player
        let mut crossed_at = None;
        for frame in 0..10_000 {
            clear_field(&mut s);
            tick(&mut s, &TickInput::default(), 0.01);
            if crossed_at.is_none() && s.enemies.max_active == 13 {
                crossed_at = Some(frame);
            }
            if s.distance() < 100.0 {
                assert_eq!(s.enemies.max_active, 12);
            }
        }
        assert_eq!(s.phase, GamePhase::Playing);
        assert!((s.distance() - 800.0).abs() < 0.5, "distance {}", s.distance());
        assert_eq!(s.speed(), 8.0);
        // 100 m at 8 m/s is 12.5 s, i.e. frame 1249
        let frame = crossed_at.unwrap();
        assert!((1248..=1250).contains(&frame), "crossed at {}", frame);
    }

    #[test]
    fn test_speed_ramps_while_playing() {
        let mut s = playing(3);
        for _ in 0..100 {
            clear_field(&mut s);
            tick(&mut s, &TickInput::default(), 0.1);
        }
        assert!((s.speed() - 11.0).abs() < 1e-3);
    }

    #[test]
    fn test_double_lane_left_in_one_frame() {
        let mut s = playing(4);
        clear_field(&mut s);
        let input = TickInput {
            intents: vec![InputIntent::LaneLeft, InputIntent::LaneLeft],
            autopilot: false,
        };
        tick(&mut s, &input, 1.0 / 60.0);
        assert_eq!(s.player.lane, 0);
    }

    #[test]
    fn test_walker_contact_ends_run() {
        let mut s = playing(5);
        clear_field(&mut s);
        let id = s
            .enemies
            .spawn_one(EnemyKind::Walker, 1, PLAYER_Z - 0.1, &s.catalog, &mut s.events);
        s.drain_events();
        tick(&mut s, &TickInput::default(), 0.001);

        assert_eq!(s.phase, GamePhase::Dying);
        assert_eq!(
            s.killer,
            Some(EnemyRef {
                id,
                kind: EnemyKind::Walker
            })
        );
        assert!(s.player.is_dying());
        assert!(!s.player.is_jumping() && !s.player.is_rolling());
        assert_eq!(s.player.killer_type.map(|k| k.key()), Some("zombie1"));
        assert_eq!(s.player.pos.y, 0.0);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::MusicStop));
        assert!(events.contains(&GameEvent::DeathCue));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::Animate { intent, .. } if intent.clip == "Attack"
        )));
    }

    #[test]
    fn test_dying_freezes_world_then_game_over() {
        let mut s = playing(6);
        clear_field(&mut s);
        s.enemies
            .spawn_one(EnemyKind::Runner, 1, PLAYER_Z, &s.catalog, &mut s.events);
        tick(&mut s, &TickInput::default(), 0.001);
        assert_eq!(s.phase, GamePhase::Dying);

        let distance = s.distance();
        let track = s.track.sorted_z();
        let enemy_z = s.enemies.enemies[0].pos.z;

        // Hit 0.6s + death 2.0s
        for _ in 0..25 {
            tick(&mut s, &TickInput::default(), 0.1);
        }
        assert_eq!(s.phase, GamePhase::Dying);
        assert_eq!(s.distance(), distance);
        assert_eq!(s.track.sorted_z(), track);
        assert_eq!(s.enemies.enemies[0].pos.z, enemy_z);

        s.drain_events();
        for _ in 0..5 {
            tick(&mut s, &TickInput::default(), 0.1);
        }
        assert_eq!(s.phase, GamePhase::GameOver);
        assert!(s
            .events()
            .iter()
            .any(|e| matches!(e, GameEvent::RunEnded { .. })));
    }

    #[test]
    fn test_shielded_contact_kills_enemy() {
        let mut s = playing(7);
        clear_field(&mut s);
        s.shields.collect(&s.catalog, &mut s.events);
        let id = s
            .enemies
            .spawn_one(EnemyKind::Walker, 1, PLAYER_Z, &s.catalog, &mut s.events);
        tick(&mut s, &TickInput::default(), 0.001);
        assert_eq!(s.phase, GamePhase::Playing);
        assert!(matches!(
            s.enemies.get(id).unwrap().status,
            EnemyStatus::Dead { .. }
        ));
    }

    #[test]
    fn test_rolling_under_flyer_survives() {
        let mut s = playing(8);
        clear_field(&mut s);
        let input = TickInput {
            intents: vec![InputIntent::Roll],
            autopilot: false,
        };
        tick(&mut s, &input, 0.001);
        s.enemies
            .spawn_one(EnemyKind::Flyer, 1, PLAYER_Z, &s.catalog, &mut s.events);
        tick(&mut s, &TickInput::default(), 0.001);
        assert_eq!(s.phase, GamePhase::Playing);
    }

    #[test]
    fn test_autopilot_reactions() {
        let mut s = playing(9);
        clear_field(&mut s);
        assert_eq!(autopilot_intent(&s), None);

        // Walker ahead in the center: sidestep
        let id = s
            .enemies
            .spawn_one(EnemyKind::Walker, 1, PLAYER_Z - 5.0, &s.catalog, &mut s.events);
        assert!(matches!(
            autopilot_intent(&s),
            Some(InputIntent::LaneLeft | InputIntent::LaneRight)
        ));

        // Every lane blocked, crawler about to arrive in ours: jump
        clear_field(&mut s);
        s.enemies
            .spawn_one(EnemyKind::Runner, 0, PLAYER_Z - 5.0, &s.catalog, &mut s.events);
        s.enemies
            .spawn_one(EnemyKind::Runner, 2, PLAYER_Z - 5.0, &s.catalog, &mut s.events);
        s.enemies
            .spawn_one(EnemyKind::Crawler, 1, PLAYER_Z - 1.0, &s.catalog, &mut s.events);
        assert_eq!(autopilot_intent(&s), Some(InputIntent::Jump));
        assert!(s.enemies.get(id).is_none());
    }

    #[test]
    fn test_autopilot_runs_for_a_while() {
        let mut s = playing(10);
        let input = TickInput {
            intents: Vec::new(),
            autopilot: true,
        };
        for _ in 0..600 {
            tick(&mut s, &input, 1.0 / 60.0);
            if s.phase != GamePhase::Playing {
                break;
            }
        }
        assert!(s.distance() > 0.0);
    }

    #[test]
    fn test_hitch_is_clamped() {
        let mut s = playing(11);
        clear_field(&mut s);
        tick(&mut s, &TickInput::default(), 5.0);
        assert!((s.distance() - 0.8).abs() < 1e-4);
    }
}
