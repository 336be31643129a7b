//! Player state machine
//!
//! Locomotion is a single enum, so jumping, rolling and dying can never be
//! active together. Lane changes are independent of it: the lane index moves
//! instantly, the body eases toward it, so a lane change can overlap a jump
//! or roll.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::anim::{AnimationIntent, Clip, PlayerClips};
use super::kind::{EnemyKind, LoopMode, Reaction, RestPose};
use super::state::{EntityRef, GameEvent};
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{lane_x, lerp};

/// Raw half-extents of the player model (scale 1.5)
const BODY_HALF_EXTENTS: Vec3 = Vec3::new(0.9, 1.4, 0.9);
/// Every face of the body box is pulled in by this much
const BODY_SHRINK: f32 = 0.5;
/// Rolling lowers the top of the box by this much
const ROLL_CROUCH: f32 = 1.0;
/// Run clip time scale is capped at this multiple of the start speed
const MAX_RUN_TIME_SCALE: f32 = 1.5;

/// Discrete player commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputIntent {
    LaneLeft,
    LaneRight,
    Jump,
    Roll,
}

impl InputIntent {
    /// Keyboard mapping: WASD and arrow keys
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "a" | "A" | "ArrowLeft" => Some(InputIntent::LaneLeft),
            "d" | "D" | "ArrowRight" => Some(InputIntent::LaneRight),
            "w" | "W" | "ArrowUp" => Some(InputIntent::Jump),
            "s" | "S" | "ArrowDown" => Some(InputIntent::Roll),
            _ => None,
        }
    }
}

/// Which clip of the death sequence is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathStage {
    /// Hit reaction, followed by the death clip unless skipped
    Hit,
    /// Death clip
    Death,
    /// Sequence over; the run can end
    Finished,
}

/// Locomotion state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlayerState {
    Running,
    Jumping,
    Rolling { elapsed: f32 },
    Dying { stage: DeathStage, elapsed: f32 },
}

/// The runner
#[derive(Debug, Clone)]
pub struct Player {
    /// Target lane index (0..=2)
    pub lane: usize,
    pub pos: Vec3,
    pub state: PlayerState,
    pub jump_velocity: f32,
    /// Kind of the enemy that ended the run
    pub killer_type: Option<EnemyKind>,
    /// Drawn at all; the session toggles this with its phase
    pub visible: bool,
    clips: PlayerClips,
    gravity: f32,
    jump_force: f32,
    lane_ease_rate: f32,
    roll_duration: f32,
}

impl Player {
    pub fn new(tuning: &Tuning, clips: PlayerClips) -> Self {
        let roll_duration = clips
            .roll
            .as_ref()
            .map(|c| c.duration / tuning.roll_time_scale.max(f32::EPSILON))
            .unwrap_or(tuning.roll_duration_fallback);
        Self {
            lane: START_LANE,
            pos: Vec3::new(0.0, 0.0, PLAYER_Z),
            state: PlayerState::Running,
            jump_velocity: 0.0,
            killer_type: None,
            visible: false,
            clips,
            gravity: tuning.gravity,
            jump_force: tuning.jump_force,
            lane_ease_rate: tuning.lane_ease_rate,
            roll_duration,
        }
    }

    pub fn is_jumping(&self) -> bool {
        matches!(self.state, PlayerState::Jumping)
    }

    pub fn is_rolling(&self) -> bool {
        matches!(self.state, PlayerState::Rolling { .. })
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.state, PlayerState::Dying { .. })
    }

    /// Death sequence has played out
    pub fn death_finished(&self) -> bool {
        matches!(
            self.state,
            PlayerState::Dying {
                stage: DeathStage::Finished,
                ..
            }
        )
    }

    pub fn roll_duration(&self) -> f32 {
        self.roll_duration
    }

    /// Back to the center lane, on the ground, running
    pub fn reset(&mut self, events: &mut Vec<GameEvent>) {
        self.killer_type = None;
        self.lane = START_LANE;
        self.pos = Vec3::new(0.0, 0.0, PLAYER_Z);
        self.state = PlayerState::Running;
        self.jump_velocity = 0.0;
        events.push(GameEvent::StopAnimation {
            entity: EntityRef::Player,
        });
        self.play_run(events);
    }

    fn play(&self, clip: Option<&Clip>, mode: LoopMode, time_scale: f32, events: &mut Vec<GameEvent>) {
        if let Some(clip) = clip {
            events.push(GameEvent::Animate {
                entity: EntityRef::Player,
                intent: AnimationIntent::new(clip.name.clone(), mode).with_time_scale(time_scale),
            });
        }
    }

    fn play_run(&self, events: &mut Vec<GameEvent>) {
        self.play(self.clips.run.as_ref(), LoopMode::Repeat, 1.0, events);
    }

    /// Apply one input; returns whether it changed anything
    pub fn handle_input(&mut self, intent: InputIntent, events: &mut Vec<GameEvent>) -> bool {
        if self.is_dying() {
            return false;
        }
        match intent {
            InputIntent::LaneLeft if self.lane > 0 => {
                self.lane -= 1;
                true
            }
            InputIntent::LaneRight if self.lane < LANE_COUNT - 1 => {
                self.lane += 1;
                true
            }
            InputIntent::Jump if self.state == PlayerState::Running => {
                self.state = PlayerState::Jumping;
                self.jump_velocity = self.jump_force;
                self.play(self.clips.jump.as_ref(), LoopMode::Once, 1.0, events);
                true
            }
            InputIntent::Roll if self.state == PlayerState::Running => {
                self.state = PlayerState::Rolling { elapsed: 0.0 };
                let scale = self
                    .clips
                    .roll
                    .as_ref()
                    .map(|c| c.duration / self.roll_duration)
                    .unwrap_or(1.0);
                self.play(self.clips.roll.as_ref(), LoopMode::Once, scale, events);
                true
            }
            _ => false,
        }
    }

    /// Time scale of the run clip at a given forward speed
    pub fn run_time_scale(speed: f32, start_speed: f32) -> f32 {
        if start_speed <= 0.0 {
            return 1.0;
        }
        (speed / start_speed).min(MAX_RUN_TIME_SCALE)
    }

    /// Ease toward the target lane and advance jump/roll/death timers
    pub fn update(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        self.pos.x = lerp(self.pos.x, lane_x(self.lane), self.lane_ease_rate * dt);

        match &mut self.state {
            PlayerState::Running => {}
            PlayerState::Jumping => {
                self.jump_velocity -= self.gravity * dt;
                self.pos.y += self.jump_velocity * dt;
                if self.pos.y <= 0.0 {
                    self.pos.y = 0.0;
                    self.jump_velocity = 0.0;
                    self.state = PlayerState::Running;
                    self.play_run(events);
                }
            }
            PlayerState::Rolling { elapsed } => {
                *elapsed += dt;
                if *elapsed >= self.roll_duration {
                    self.state = PlayerState::Running;
                    self.play_run(events);
                }
            }
            PlayerState::Dying { stage, elapsed } => {
                *elapsed += dt;
                let stage = *stage;
                let done = match stage {
                    DeathStage::Hit => self.clips.hit.as_ref().is_none_or(|c| *elapsed >= c.duration),
                    DeathStage::Death => self.clips.death.as_ref().is_none_or(|c| *elapsed >= c.duration),
                    DeathStage::Finished => false,
                };
                if done {
                    self.complete_stage(stage, events);
                }
            }
        }
    }

    /// Move the death sequence past `stage`. Ignored unless `stage` is the one
    /// currently playing, so late or duplicate completions are harmless.
    pub fn complete_stage(&mut self, stage: DeathStage, events: &mut Vec<GameEvent>) {
        let PlayerState::Dying { stage: current, .. } = self.state else {
            return;
        };
        if current != stage {
            return;
        }
        let next = match stage {
            DeathStage::Hit => {
                let skip = self
                    .killer_type
                    .is_some_and(|k| k.config().skip_death_anim);
                if !skip && self.clips.death.is_some() {
                    self.play(self.clips.death.as_ref(), LoopMode::Once, 1.0, events);
                    DeathStage::Death
                } else {
                    DeathStage::Finished
                }
            }
            DeathStage::Death | DeathStage::Finished => DeathStage::Finished,
        };
        self.state = PlayerState::Dying {
            stage: next,
            elapsed: 0.0,
        };
    }

    /// Enter the terminal dying state, reacting to the killer's kind
    pub fn trigger_death(&mut self, killer: Option<EnemyKind>, events: &mut Vec<GameEvent>) {
        if self.is_dying() {
            return;
        }
        self.killer_type = killer;

        let config = killer.map(|k| k.config());
        let reaction = config.map(|c| c.reaction).unwrap_or(Reaction::Death);
        let rest = config.map(|c| c.rest_pose).unwrap_or(RestPose::Ground);

        if rest == RestPose::Ground {
            self.pos.y = 0.0;
        }
        self.jump_velocity = 0.0;

        events.push(GameEvent::StopAnimation {
            entity: EntityRef::Player,
        });

        let stage = if reaction == Reaction::Hit && self.clips.hit.is_some() {
            self.play(self.clips.hit.as_ref(), LoopMode::Once, 1.0, events);
            DeathStage::Hit
        } else if self.clips.death.is_some() {
            self.play(self.clips.death.as_ref(), LoopMode::Once, 1.0, events);
            DeathStage::Death
        } else {
            DeathStage::Finished
        };
        self.state = PlayerState::Dying { stage, elapsed: 0.0 };
        log::info!(
            "Player down ({}), stage {:?}",
            killer.map(|k| k.key()).unwrap_or("unknown"),
            stage
        );
    }

    /// Collision box: the body shrunk on every side, crouched while rolling
    pub fn bounding_box(&self) -> Aabb {
        let mut bounds = Aabb::from_base(self.pos, BODY_HALF_EXTENTS).expanded(-BODY_SHRINK);
        if self.is_rolling() {
            bounds.max.y -= ROLL_CROUCH;
        }
        bounds
    }
}
