//! Track generator: an endless corridor built from a fixed ring of segments
//!
//! Segments are generated once and then only translated. When one scrolls
//! past the despawn threshold it is moved behind the current rearmost
//! segment, so the ring never grows, shrinks, or opens a gap.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rng;
use crate::assets::AssetCatalog;
use crate::consts::{DESPAWN_Z, LANE_X};
use crate::tuning::Tuning;

/// Decoration models placed on a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecorationKind {
    Road,
    Fence,
    FenceDamaged,
    Tree,
    Lantern,
    Rock,
    Grave,
    Trunk,
    Crypt,
}

impl DecorationKind {
    pub fn key(self) -> &'static str {
        match self {
            DecorationKind::Road => "road",
            DecorationKind::Fence => "fence",
            DecorationKind::FenceDamaged => "fenceDamaged",
            DecorationKind::Tree => "tree",
            DecorationKind::Lantern => "lantern",
            DecorationKind::Rock => "rock",
            DecorationKind::Grave => "grave",
            DecorationKind::Trunk => "trunk",
            DecorationKind::Crypt => "crypt",
        }
    }
}

/// One decoration, positioned relative to its segment's origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub kind: DecorationKind,
    pub offset: Vec3,
    pub yaw: f32,
    pub scale: Vec3,
}

/// A slab of corridor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSegment {
    pub id: u32,
    /// World z of the segment's center
    pub z: f32,
    pub decorations: Vec<Decoration>,
}

/// Road tile spacing along z and per-lane tile chance
const ROAD_STRIDE: f32 = 2.0;
const ROAD_CHANCE: f64 = 0.6;
/// Fence spacing and per-side chance
const FENCE_STRIDE: f32 = 4.0;
const FENCE_CHANCE: f64 = 0.8;
const FENCE_X: f32 = 4.5;
/// Roadside tree/lantern spacing
const ROADSIDE_STRIDE: f32 = 5.0;
const TREE_CHANCE: f64 = 0.7;
const LANTERN_CHANCE: f64 = 0.3;
/// Off-track scatter
const SCATTER_COUNT: usize = 20;

/// Owns the segment ring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub segments: Vec<TrackSegment>,
    pub segment_length: f32,
}

impl Track {
    /// Build `segment_count` segments back to back from z = 0 going negative
    pub fn new(tuning: &Tuning, catalog: &AssetCatalog, rng: &mut impl Rng) -> Self {
        let length = tuning.segment_length;
        let segments = (0..tuning.segment_count)
            .map(|i| TrackSegment {
                id: i as u32,
                z: -(i as f32) * length,
                decorations: generate_decorations(length, catalog, rng),
            })
            .collect();
        log::debug!("Track built: {} segments of {}m", tuning.segment_count, length);
        Self {
            segments,
            segment_length: length,
        }
    }

    /// Scroll every segment forward and recycle those past the threshold
    pub fn update(&mut self, dt: f32, speed: f32) {
        if speed <= 0.0 {
            return;
        }
        for segment in &mut self.segments {
            segment.z += speed * dt;
        }
        for i in 0..self.segments.len() {
            if self.segments[i].z > DESPAWN_Z {
                let rear = self.rear_z();
                self.segments[i].z = rear - self.segment_length;
                log::trace!("Recycled segment {} to z={}", self.segments[i].id, self.segments[i].z);
            }
        }
    }

    /// z of the rearmost (most negative) segment
    pub fn rear_z(&self) -> f32 {
        self.segments
            .iter()
            .map(|s| s.z)
            .fold(f32::INFINITY, f32::min)
    }

    /// Segment z positions, sorted front to back
    pub fn sorted_z(&self) -> Vec<f32> {
        let mut zs: Vec<f32> = self.segments.iter().map(|s| s.z).collect();
        zs.sort_by(|a, b| b.total_cmp(a));
        zs
    }
}

fn push_if(
    out: &mut Vec<Decoration>,
    catalog: &AssetCatalog,
    kind: DecorationKind,
    offset: Vec3,
    yaw: f32,
    scale: Vec3,
) {
    if catalog.has(kind.key()) {
        out.push(Decoration {
            kind,
            offset,
            yaw,
            scale,
        });
    }
}

/// Random dressing for one segment; kinds missing from the catalog are skipped
pub fn generate_decorations(
    length: f32,
    catalog: &AssetCatalog,
    rng: &mut impl Rng,
) -> Vec<Decoration> {
    use std::f32::consts::{FRAC_PI_2, PI};

    let mut out = Vec::new();
    let half = length / 2.0;

    // Road tiles with random gaps
    if catalog.has(DecorationKind::Road.key()) {
        let mut z = 0.0;
        while z < length {
            for x in LANE_X {
                if rng::chance(rng, ROAD_CHANCE) {
                    let yaw = rng::index(rng, 4) as f32 * FRAC_PI_2;
                    push_if(
                        &mut out,
                        catalog,
                        DecorationKind::Road,
                        Vec3::new(x, 0.0, z - half),
                        yaw,
                        Vec3::new(2.0, 2.0, 2.1),
                    );
                }
            }
            z += ROAD_STRIDE;
        }
    }

    // Fences on both edges
    let mut z = -half;
    while z < half {
        for (x, yaw) in [(-FENCE_X, FRAC_PI_2), (FENCE_X, -FRAC_PI_2)] {
            if rng::chance(rng, FENCE_CHANCE) {
                let kind = if rng::chance(rng, 0.5) {
                    DecorationKind::Fence
                } else {
                    DecorationKind::FenceDamaged
                };
                push_if(&mut out, catalog, kind, Vec3::new(x, 0.0, z), yaw, Vec3::splat(1.5));
            }
        }
        z += FENCE_STRIDE;
    }

    // Roadside trees and lanterns
    let mut z = -half;
    while z < half {
        if catalog.has(DecorationKind::Tree.key()) && rng::chance(rng, TREE_CHANCE) {
            let x = if rng::chance(rng, 0.5) { -8.0 } else { 8.0 };
            let height = 4.0 + rng::unit(rng);
            push_if(
                &mut out,
                catalog,
                DecorationKind::Tree,
                Vec3::new(x, 0.0, z),
                0.0,
                Vec3::new(3.0, height, 3.0),
            );
        }
        if catalog.has(DecorationKind::Lantern.key()) && rng::chance(rng, LANTERN_CHANCE) {
            let x = if rng::chance(rng, 0.5) { -4.0 } else { 4.0 };
            push_if(
                &mut out,
                catalog,
                DecorationKind::Lantern,
                Vec3::new(x, 0.0, z),
                0.0,
                Vec3::splat(1.5),
            );
        }
        z += ROADSIDE_STRIDE;
    }

    // Off-track scatter from a cumulative table
    for _ in 0..SCATTER_COUNT {
        let x = if rng::chance(rng, 0.5) {
            -15.0 - rng::range(rng, 0.0, 30.0)
        } else {
            15.0 + rng::range(rng, 0.0, 30.0)
        };
        let z = (rng::unit(rng) - 0.5) * length;
        let offset = Vec3::new(x, 0.0, z);
        let roll = rng::unit(rng);

        if roll < 0.3 && catalog.has(DecorationKind::Tree.key()) {
            let height = rng::range(rng, 3.0, 5.0);
            push_if(&mut out, catalog, DecorationKind::Tree, offset, 0.0, Vec3::new(3.0, height, 3.0));
        } else if roll < 0.5 && catalog.has(DecorationKind::Rock.key()) {
            let yaw = rng::range(rng, 0.0, PI);
            push_if(&mut out, catalog, DecorationKind::Rock, offset, yaw, Vec3::splat(2.0));
        } else if roll < 0.7 && catalog.has(DecorationKind::Grave.key()) {
            let yaw = rng::unit(rng) - 0.5;
            push_if(&mut out, catalog, DecorationKind::Grave, offset, yaw, Vec3::splat(1.5));
        } else if roll < 0.85 && catalog.has(DecorationKind::Trunk.key()) {
            push_if(&mut out, catalog, DecorationKind::Trunk, offset, 0.0, Vec3::splat(2.0));
        } else if catalog.has(DecorationKind::Crypt.key()) && rng::chance(rng, 0.1) {
            let yaw = rng::range(rng, 0.0, PI);
            push_if(&mut out, catalog, DecorationKind::Crypt, offset, yaw, Vec3::splat(3.0));
        }
    }

    out
}
