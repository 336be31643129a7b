//! Collision and outcome resolution between the player and enemies
//!
//! Resolution only reads positions. The returned [`Resolution`] is applied by
//! the caller through the spawner and session, which own the state.

use super::enemy::Enemy;
use super::kind::EnemyKind;
use super::player::Player;
use super::state::EnemyRef;

/// Outcome of one frame of contact tests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Enemies defeated by the shield, in enumeration order
    pub kills: Vec<u32>,
    /// Enemy that ends the run, if any
    pub fatal: Option<EnemyRef>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.kills.is_empty() && self.fatal.is_none()
    }
}

/// Test the player's box against every live enemy.
///
/// Shielded contacts are collected and resolution continues. The first
/// unshielded contact ends the run and nothing after it is examined.
pub fn resolve(player: &Player, enemies: &[Enemy], shielded: bool) -> Resolution {
    let mut resolution = Resolution::default();
    if player.is_dying() {
        return resolution;
    }

    let player_box = player.bounding_box();
    let rolling = player.is_rolling();

    for enemy in enemies {
        if enemy.is_dead() {
            continue;
        }
        // Ducking under the bat
        if rolling && enemy.kind == EnemyKind::Flyer {
            continue;
        }
        if !player_box.intersects(&enemy.hitbox()) {
            continue;
        }

        if shielded {
            resolution.kills.push(enemy.id);
            continue;
        }

        resolution.fatal = Some(EnemyRef {
            id: enemy.id,
            kind: enemy.kind,
        });
        break;
    }
    resolution
}
