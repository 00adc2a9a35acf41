//! Path-following enemies.

use std::sync::Arc;

use glam::Vec2;
use lane_defense_core::{EnemyArchetype, EnemyId, EnemySnapshot, EnemySpec, Health, Money, Path};

use crate::economy::Economy;

/// Result of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    /// The enemy is still standing.
    Survived,
    /// The blow was lethal and the reward has been credited.
    Killed { reward: Money },
    /// The enemy was already dead; nothing changed.
    AlreadyDead,
}

/// Result of advancing an enemy by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stride {
    Moving,
    ReachedGoal,
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    path: Arc<Path>,
    pub(crate) position: Vec2,
    path_index: usize,
    speed: f32,
    health: Health,
    max_health: Health,
    reward: Money,
    archetype: EnemyArchetype,
}

impl Enemy {
    pub(crate) fn spawn(id: EnemyId, spec: EnemySpec) -> Self {
        Self {
            id,
            position: spec.path.start(),
            path: spec.path,
            path_index: 0,
            speed: spec.speed,
            health: spec.health,
            max_health: spec.health,
            reward: spec.reward,
            archetype: spec.archetype,
        }
    }

    pub(crate) const fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    /// Subtracts `amount` from the enemy's health, crediting the reward to
    /// `economy` on the lethal hit only.
    pub(crate) fn take_damage(&mut self, amount: u32, economy: &mut Economy) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::AlreadyDead;
        }

        self.health = self.health.saturating_sub(amount);
        if self.health.is_depleted() {
            economy.credit(self.reward);
            DamageOutcome::Killed {
                reward: self.reward,
            }
        } else {
            DamageOutcome::Survived
        }
    }

    /// Moves `speed` units along the current path segment.
    ///
    /// Once the enemy is closer than `speed` to the next waypoint it snaps onto
    /// it and starts the following segment.
    pub(crate) fn advance(&mut self) -> Stride {
        let last = self.path.last_index();
        if self.path_index >= last {
            return Stride::ReachedGoal;
        }

        let waypoints = self.path.waypoints();
        let start = waypoints[self.path_index];
        let end = waypoints[self.path_index + 1];
        let direction = (end - start).normalize_or_zero();

        self.position += direction * self.speed;
        if self.position.distance(end) < self.speed {
            self.path_index += 1;
            self.position = end;
        }

        if self.path_index >= last {
            Stride::ReachedGoal
        } else {
            Stride::Moving
        }
    }

    pub(crate) fn health(&self) -> Health {
        self.health
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            position: self.position,
            path_index: self.path_index,
            health: self.health,
            max_health: self.max_health,
            speed: self.speed,
            reward: self.reward,
            archetype: self.archetype,
        }
    }
}
