//! Enemy spawner and scheduler
//!
//! Spawns waves of zombies behind the visible window at a rate driven by
//! distance, moves them toward the player, and removes them once they pass the
//! camera or linger dead for long enough.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::anim::AnimationIntent;
use super::difficulty::{max_active_enemies, spawn_interval};
use super::kind::{EnemyKind, LoopMode};
use super::rng;
use super::state::{EntityRef, GameEvent, Transform, Visual};
use crate::assets::AssetCatalog;
use crate::consts::*;
use crate::lane_x;
use crate::tuning::Tuning;

/// Waves in the opening burst
const INITIAL_WAVES: usize = 12;
/// z of the first opening wave
const INITIAL_START_Z: f32 = -80.0;
/// Gap between opening waves: 35 plus up to 20
const INITIAL_GAP: f32 = 35.0;
const INITIAL_GAP_JITTER: f32 = 20.0;
/// Chance an opening wave holds two enemies
const INITIAL_DOUBLE_CHANCE: f64 = 0.3;
/// New waves spawn this far behind the rearmost enemy, plus up to 10
const WAVE_BACKOFF: f32 = 30.0;
const WAVE_JITTER: f32 = 10.0;

/// Life state of an enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyStatus {
    /// Running at the player
    Chasing,
    /// Killed by the shield; removed when `remaining` runs out
    Dead { remaining: f32 },
}

/// A spawned enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    /// x = lane position, y = height, z = depth
    pub pos: Vec3,
    pub status: EnemyStatus,
    pub mark_for_removal: bool,
}

impl Enemy {
    pub fn is_dead(&self) -> bool {
        matches!(self.status, EnemyStatus::Dead { .. })
    }

    /// Model bounds (no collision margin)
    pub fn bounds(&self) -> Aabb {
        Aabb::from_base(self.pos, self.kind.config().half_extents)
    }

    /// Bounds grown by the kind's collision margin
    pub fn hitbox(&self) -> Aabb {
        self.bounds().expanded(self.kind.config().hit_margin)
    }

    pub fn transform(&self) -> Transform {
        let config = self.kind.config();
        Transform::new(self.pos, config.spawn_yaw, Vec3::splat(config.scale))
    }
}

/// Owns every live enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpawner {
    pub enemies: Vec<Enemy>,
    pub spawn_timer: f32,
    pub spawn_interval: f32,
    pub max_active: u32,
    next_id: u32,
}

impl EnemySpawner {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            enemies: Vec::new(),
            spawn_timer: 0.0,
            spawn_interval: tuning.base_spawn_interval,
            max_active: tuning.base_max_enemies,
            next_id: 1,
        }
    }

    /// Remove every enemy and restore the scheduler to its starting values
    pub fn reset(&mut self, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        for enemy in self.enemies.drain(..) {
            events.push(GameEvent::Despawn {
                entity: EntityRef::Enemy(enemy.id),
            });
        }
        self.spawn_timer = 0.0;
        self.spawn_interval = tuning.base_spawn_interval;
        self.max_active = tuning.base_max_enemies;
    }

    pub fn active_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn get(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// z of the rearmost enemy, if any
    pub fn min_z(&self) -> Option<f32> {
        self.enemies.iter().map(|e| e.pos.z).reduce(f32::min)
    }

    /// Reference z for placing new spawns behind everything alive
    pub fn spawn_reference_z(&self) -> f32 {
        self.min_z().unwrap_or(DEFAULT_ENEMY_MIN_Z)
    }

    /// Spawn a single enemy and start its locomotion clip
    pub fn spawn_one(
        &mut self,
        kind: EnemyKind,
        lane: usize,
        z: f32,
        catalog: &AssetCatalog,
        events: &mut Vec<GameEvent>,
    ) -> u32 {
        let config = kind.config();
        let id = self.next_id;
        self.next_id += 1;

        let enemy = Enemy {
            id,
            kind,
            pos: Vec3::new(lane_x(lane), config.spawn_height, z),
            status: EnemyStatus::Chasing,
            mark_for_removal: false,
        };
        let entity = EntityRef::Enemy(id);
        events.push(GameEvent::Spawn {
            entity,
            visual: Visual::Model(kind.key().to_string()),
            transform: enemy.transform(),
        });

        match catalog
            .enemy_clips(kind)
            .and_then(|clips| clips.locomotion(config.move_anim))
        {
            Some(clip) => events.push(GameEvent::Animate {
                entity,
                intent: AnimationIntent::new(clip.name.clone(), LoopMode::Repeat),
            }),
            None => log::warn!("No locomotion clip for {}", kind.key()),
        }

        self.enemies.push(enemy);
        id
    }

    /// Opening burst laid out ahead of a fresh run
    pub fn spawn_initial(
        &mut self,
        catalog: &AssetCatalog,
        rng: &mut impl Rng,
        events: &mut Vec<GameEvent>,
    ) {
        let mut z = INITIAL_START_Z;
        for _ in 0..INITIAL_WAVES {
            if rng::chance(rng, INITIAL_DOUBLE_CHANCE) {
                let mut lanes = [0usize, 1, 2];
                rng::shuffle(rng, &mut lanes);
                for &lane in &lanes[..2] {
                    let kind = rng::pick(rng, &EnemyKind::ALL);
                    self.spawn_one(kind, lane, z, catalog, events);
                }
            } else {
                let lane = rng::index(rng, LANE_COUNT);
                let kind = rng::pick(rng, &EnemyKind::ALL);
                self.spawn_one(kind, lane, z, catalog, events);
            }
            z -= INITIAL_GAP + rng::range(rng, 0.0, INITIAL_GAP_JITTER);
        }
        log::debug!("Opening burst: {} enemies", self.enemies.len());
    }

    /// Advance every enemy, drop the expired ones, and run the spawn scheduler
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt: f32,
        speed: f32,
        distance: f32,
        tuning: &Tuning,
        catalog: &AssetCatalog,
        rng: &mut impl Rng,
        events: &mut Vec<GameEvent>,
    ) {
        for enemy in &mut self.enemies {
            let step = match &mut enemy.status {
                EnemyStatus::Chasing => speed + enemy.kind.config().run_speed,
                EnemyStatus::Dead { remaining } => {
                    *remaining -= dt;
                    if *remaining <= 0.0 {
                        enemy.mark_for_removal = true;
                    }
                    speed
                }
            };
            enemy.pos.z += step * dt;
            if enemy.pos.z > DESPAWN_Z {
                enemy.mark_for_removal = true;
            }
        }

        self.enemies.retain(|enemy| {
            if enemy.mark_for_removal {
                events.push(GameEvent::Despawn {
                    entity: EntityRef::Enemy(enemy.id),
                });
            }
            !enemy.mark_for_removal
        });

        self.max_active = max_active_enemies(distance, tuning);
        self.spawn_interval = spawn_interval(distance, tuning);
        self.spawn_timer += dt;

        if self.spawn_timer > self.spawn_interval && self.enemies.len() < self.max_active as usize {
            self.spawn_timer = 0.0;
            self.spawn_wave(speed, catalog, rng, events);
        }
    }

    /// Spawn one wave of 1-3 enemies in distinct lanes behind the rearmost enemy
    pub fn spawn_wave(
        &mut self,
        speed: f32,
        catalog: &AssetCatalog,
        rng: &mut impl Rng,
        events: &mut Vec<GameEvent>,
    ) {
        let base_z = self.spawn_reference_z();
        let size = wave_size(speed, rng::unit(rng));
        let kinds = wave_kinds(size, rng);

        let mut lanes = [0usize, 1, 2];
        rng::shuffle(rng, &mut lanes);

        for (&lane, &kind) in lanes.iter().zip(&kinds) {
            let z = base_z - WAVE_BACKOFF - rng::range(rng, 0.0, WAVE_JITTER);
            self.spawn_one(kind, lane, z, catalog, events);
        }
        log::debug!("Wave of {} at z<{:.1} (speed {:.1})", size, base_z, speed);
    }

    /// Shield kill: play the death clip and remove after the grace period
    pub fn kill(&mut self, id: u32, catalog: &AssetCatalog, events: &mut Vec<GameEvent>) {
        let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == id) else {
            return;
        };
        if enemy.is_dead() {
            return;
        }
        enemy.status = EnemyStatus::Dead {
            remaining: DEAD_ENEMY_GRACE,
        };

        let entity = EntityRef::Enemy(id);
        match catalog.enemy_clips(enemy.kind).and_then(|c| c.enemy_death()) {
            Some(clip) => events.push(GameEvent::Animate {
                entity,
                intent: AnimationIntent::new(clip.name.clone(), LoopMode::Once),
            }),
            None => events.push(GameEvent::StopAnimation { entity }),
        }
        log::debug!("Enemy {} ({}) killed by shield", id, enemy.kind.key());
    }

    /// Play the attack clip of the enemy that ended the run
    pub fn play_attack(&self, id: u32, catalog: &AssetCatalog, events: &mut Vec<GameEvent>) {
        let Some(enemy) = self.get(id) else {
            return;
        };
        let config = enemy.kind.config();
        let clip = catalog
            .enemy_clips(enemy.kind)
            .and_then(|c| c.find_any(&[config.attack_anim, "attack"]));
        if let Some(clip) = clip {
            events.push(GameEvent::Animate {
                entity: EntityRef::Enemy(id),
                intent: AnimationIntent::new(clip.name.clone(), config.attack_loop),
            });
        }
    }
}

/// Wave size from one uniform draw: 3 (30%) above speed 12, else 2 (50%)
/// above speed 8, else 1
pub fn wave_size(speed: f32, draw: f32) -> usize {
    if speed > 12.0 && draw < 0.30 {
        3
    } else if speed > 8.0 && draw < 0.50 {
        2
    } else {
        1
    }
}

/// Kinds for a wave; a full three-lane wave always holds a passable kind
pub fn wave_kinds(size: usize, rng: &mut impl Rng) -> Vec<EnemyKind> {
    let mut kinds = Vec::with_capacity(size);
    if size >= LANE_COUNT {
        kinds.push(rng::pick(rng, &EnemyKind::PASSABLE));
    }
    while kinds.len() < size {
        kinds.push(rng::pick(rng, &EnemyKind::ALL));
    }
    kinds
}
