//! Shield pickups and the carried shield buff
//!
//! Only one buff exists at a time. Collecting a pickup while already shielded
//! refills the countdown instead of starting a second one.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::rng;
use super::state::{EntityRef, GameEvent, Transform, Visual};
use crate::assets::AssetCatalog;
use crate::consts::{DESPAWN_Z, LANE_COUNT};
use crate::lane_x;
use crate::tuning::Tuning;

/// Asset key of the shield model
pub const SHIELD_KEY: &str = "shield";
/// Pickups spawn this far behind the rearmost enemy
const SPAWN_BACKOFF: f32 = 20.0;
/// Pickups drift toward the player slightly faster than the ground
const PICKUP_EXTRA_SPEED: f32 = 2.0;
/// Spin rate (rad/s)
const PICKUP_SPIN: f32 = 2.0;
/// Bob: base height, amplitude, angular frequency
const BOB_BASE: f32 = 1.0;
const BOB_AMPLITUDE: f32 = 0.3;
const BOB_FREQUENCY: f32 = 3.0;
/// Pickup model half-extents at scale 0.5
const PICKUP_HALF_EXTENTS: Vec3 = Vec3::new(0.4, 0.4, 0.15);
/// Extra reach of the player when grabbing pickups
const PICKUP_REACH: f32 = 0.2;

/// A collectible shield floating on the track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldPickup {
    pub id: u32,
    pub pos: Vec3,
    pub yaw: f32,
    /// Bob phase offset so pickups don't bob in sync
    pub float_phase: f32,
}

impl ShieldPickup {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, PICKUP_HALF_EXTENTS)
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.pos, self.yaw, Vec3::splat(0.5))
    }
}

/// Owns pickups and the buff countdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldSpawner {
    pub pickups: Vec<ShieldPickup>,
    pub has_shield: bool,
    /// Seconds of buff left
    pub duration: f32,
    pub max_duration: f32,
    pub spawn_timer: f32,
    pub spawn_interval: f32,
    spawn_chance: f64,
    /// Cosmetic clock driving the bob
    clock: f32,
    next_id: u32,
}

impl ShieldSpawner {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pickups: Vec::new(),
            has_shield: false,
            duration: 0.0,
            max_duration: tuning.shield_max_duration,
            spawn_timer: 0.0,
            spawn_interval: tuning.shield_spawn_interval,
            spawn_chance: tuning.shield_spawn_chance,
            clock: 0.0,
            next_id: 1,
        }
    }

    pub fn reset(&mut self, events: &mut Vec<GameEvent>) {
        if self.has_shield {
            events.push(GameEvent::Despawn {
                entity: EntityRef::ShieldAura,
            });
            events.push(GameEvent::ShieldIndicator(false));
        }
        self.has_shield = false;
        self.duration = 0.0;
        self.spawn_timer = 0.0;

        for pickup in self.pickups.drain(..) {
            events.push(GameEvent::Despawn {
                entity: EntityRef::Pickup(pickup.id),
            });
        }
    }

    /// Remaining buff as a percentage of the full duration
    pub fn percent(&self) -> f32 {
        if self.max_duration <= 0.0 {
            return 0.0;
        }
        (self.duration / self.max_duration * 100.0).clamp(0.0, 100.0)
    }

    /// Place a pickup in a random lane at depth `z`
    pub fn spawn_pickup(
        &mut self,
        z: f32,
        catalog: &AssetCatalog,
        rng: &mut impl Rng,
        events: &mut Vec<GameEvent>,
    ) -> Option<u32> {
        if !catalog.has(SHIELD_KEY) {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;

        let lane = rng::index(rng, LANE_COUNT);
        let pickup = ShieldPickup {
            id,
            pos: Vec3::new(lane_x(lane), BOB_BASE, z),
            yaw: 0.0,
            float_phase: rng::range(rng, 0.0, std::f32::consts::TAU),
        };
        events.push(GameEvent::Spawn {
            entity: EntityRef::Pickup(id),
            visual: Visual::Model(SHIELD_KEY.to_string()),
            transform: pickup.transform(),
        });
        log::debug!("Shield pickup {} in lane {} at z={:.1}", id, lane, z);
        self.pickups.push(pickup);
        Some(id)
    }

    /// Apply a collected pickup: activate, or refill if already carrying
    pub fn collect(&mut self, catalog: &AssetCatalog, events: &mut Vec<GameEvent>) {
        if self.has_shield {
            self.duration = self.max_duration;
            events.push(GameEvent::ShieldLevel(100.0));
            return;
        }

        self.has_shield = true;
        self.duration = self.max_duration;
        events.push(GameEvent::ShieldIndicator(true));
        events.push(GameEvent::ShieldLevel(100.0));
        if catalog.has(SHIELD_KEY) {
            events.push(GameEvent::Spawn {
                entity: EntityRef::ShieldAura,
                visual: Visual::Model(SHIELD_KEY.to_string()),
                transform: Transform::new(Vec3::ZERO, std::f32::consts::PI, Vec3::ONE),
            });
        }
        log::info!("Shield up ({}s)", self.max_duration);
    }

    fn deactivate(&mut self, events: &mut Vec<GameEvent>) {
        self.has_shield = false;
        self.duration = 0.0;
        events.push(GameEvent::ShieldIndicator(false));
        events.push(GameEvent::Despawn {
            entity: EntityRef::ShieldAura,
        });
        log::info!("Shield down");
    }

    /// Move pickups, run the spawn timer, count down the buff, and test pickup
    /// contact against the player's box
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt: f32,
        speed: f32,
        player_box: Option<Aabb>,
        enemy_reference_z: f32,
        catalog: &AssetCatalog,
        rng: &mut impl Rng,
        events: &mut Vec<GameEvent>,
    ) {
        self.clock += dt;
        let clock = self.clock;

        self.pickups.retain_mut(|pickup| {
            pickup.yaw += PICKUP_SPIN * dt;
            pickup.pos.y = BOB_BASE + (clock * BOB_FREQUENCY + pickup.float_phase).sin() * BOB_AMPLITUDE;
            pickup.pos.z += (speed + PICKUP_EXTRA_SPEED) * dt;
            if pickup.pos.z > DESPAWN_Z {
                events.push(GameEvent::Despawn {
                    entity: EntityRef::Pickup(pickup.id),
                });
                return false;
            }
            true
        });

        self.spawn_timer += dt;
        if self.spawn_timer >= self.spawn_interval {
            self.spawn_timer = 0.0;
            if !self.has_shield && rng::chance(rng, self.spawn_chance) {
                self.spawn_pickup(enemy_reference_z - SPAWN_BACKOFF, catalog, rng, events);
            }
        }

        if self.has_shield {
            self.duration -= dt;
            events.push(GameEvent::ShieldLevel(self.percent()));
            if self.duration <= 0.0 {
                self.deactivate(events);
            }
        }

        let Some(player_box) = player_box else {
            return;
        };
        let reach = player_box.expanded(PICKUP_REACH);
        if let Some(i) = self
            .pickups
            .iter()
            .rposition(|p| reach.intersects(&p.bounds()))
        {
            let pickup = self.pickups.remove(i);
            events.push(GameEvent::Despawn {
                entity: EntityRef::Pickup(pickup.id),
            });
            self.collect(catalog, events);
        }
    }
}
