//! Level configuration consumed read-only by the simulation, except for the
//! starting money which seeds the mutable economy.

use std::{sync::Arc, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{EnemyArchetype, EnemySpec, Health, Money, Path, PathError, PlacementGrid, WavePlan};

/// Complete description of a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Waypoints every enemy follows, from spawn to goal.
    pub enemy_path: Vec<Vec2>,
    /// Money available when the level starts.
    pub starting_money: u32,
    /// Flat price of placing any tower.
    pub tower_cost: u32,
    /// Suggested tower positions drawn as markers over the map.
    pub tower_slots: Vec<Vec2>,
    /// Grid that tower placements snap to.
    pub grid: PlacementGrid,
    /// Minimum time between two spawns of the same wave, in milliseconds.
    pub spawn_delay_ms: u64,
    /// Distance a projectile covers per tick.
    pub projectile_speed: f32,
    /// Distance under which a projectile strikes an enemy.
    pub hit_radius: f32,
    /// Ordered waves released during the level.
    pub waves: Vec<WaveSettings>,
}

/// Configuration of a single wave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaveSettings {
    /// Groups of identical enemies, spawned in order.
    pub groups: Vec<EnemyGroup>,
}

/// Run of identical enemies inside a wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnemyGroup {
    /// Number of enemies in the run.
    pub count: u32,
    /// Distance covered per tick.
    pub speed: f32,
    /// Initial health.
    pub health: i32,
    /// Money credited per kill.
    pub reward: u32,
    /// Visual archetype.
    pub archetype: EnemyArchetype,
}

impl EnemyGroup {
    const fn new(
        count: u32,
        speed: f32,
        health: i32,
        reward: u32,
        archetype: EnemyArchetype,
    ) -> Self {
        Self {
            count,
            speed,
            health,
            reward,
            archetype,
        }
    }
}

/// Reasons a level configuration may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SettingsError {
    /// The enemy path is unusable.
    #[error(transparent)]
    Path(#[from] PathError),
    /// The wave plan contains no waves.
    #[error("wave plan must contain at least one wave")]
    NoWaves,
    /// A wave would release no enemies.
    #[error("wave {wave} contains no enemies")]
    EmptyWave {
        /// One-based wave number.
        wave: usize,
    },
    /// An enemy group declared a speed that is not finite and strictly positive.
    #[error("enemy speed in wave {wave} must be positive and finite, found {speed}")]
    NonPositiveSpeed {
        /// One-based wave number.
        wave: usize,
        /// Offending speed.
        speed: f32,
    },
    /// An enemy group declared a health that is not strictly positive.
    #[error("enemy health in wave {wave} must be positive, found {health}")]
    NonPositiveHealth {
        /// One-based wave number.
        wave: usize,
        /// Offending health.
        health: i32,
    },
    /// The placement grid has no usable cells.
    #[error("placement grid must contain at least one cell")]
    EmptyGrid,
    /// Projectiles would never move.
    #[error("projectile speed must be positive and finite, found {0}")]
    NonPositiveProjectileSpeed(f32),
    /// Projectiles could never strike anything.
    #[error("hit radius must be positive and finite, found {0}")]
    NonPositiveHitRadius(f32),
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enemy_path: vec![
                Vec2::new(0.0, 125.0),
                Vec2::new(375.0, 125.0),
                Vec2::new(375.0, 325.0),
                Vec2::new(125.0, 325.0),
                Vec2::new(125.0, 475.0),
                Vec2::new(800.0, 475.0),
            ],
            starting_money: 200,
            tower_cost: 50,
            tower_slots: vec![
                Vec2::new(225.0, 225.0),
                Vec2::new(475.0, 225.0),
                Vec2::new(275.0, 425.0),
                Vec2::new(475.0, 375.0),
                Vec2::new(625.0, 375.0),
            ],
            grid: PlacementGrid::new(16, 12, 50.0),
            spawn_delay_ms: 1000,
            projectile_speed: 10.0,
            hit_radius: 20.0,
            waves: vec![
                WaveSettings {
                    groups: vec![EnemyGroup::new(10, 3.0, 50, 10, EnemyArchetype::Fast)],
                },
                WaveSettings {
                    groups: vec![EnemyGroup::new(5, 1.0, 200, 30, EnemyArchetype::Strong)],
                },
                WaveSettings {
                    groups: vec![EnemyGroup::new(8, 2.0, 100, 20, EnemyArchetype::Basic)],
                },
            ],
        }
    }
}

impl Settings {
    /// Checks that the configuration describes a playable level.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.grid.is_empty() {
            return Err(SettingsError::EmptyGrid);
        }

        if !is_positive_finite(self.projectile_speed) {
            return Err(SettingsError::NonPositiveProjectileSpeed(
                self.projectile_speed,
            ));
        }

        if !is_positive_finite(self.hit_radius) {
            return Err(SettingsError::NonPositiveHitRadius(self.hit_radius));
        }

        let _ = self.wave_plan()?;
        Ok(())
    }

    /// Builds the shared enemy path.
    pub fn path(&self) -> Result<Arc<Path>, SettingsError> {
        Ok(Arc::new(Path::new(self.enemy_path.clone())?))
    }

    /// Expands the configured waves into an ordered spawn plan.
    pub fn wave_plan(&self) -> Result<WavePlan, SettingsError> {
        let path = self.path()?;
        if self.waves.is_empty() {
            return Err(SettingsError::NoWaves);
        }

        let mut waves = Vec::with_capacity(self.waves.len());
        for (index, wave) in self.waves.iter().enumerate() {
            let number = index + 1;
            let mut spawns = Vec::new();
            for group in &wave.groups {
                if !is_positive_finite(group.speed) {
                    return Err(SettingsError::NonPositiveSpeed {
                        wave: number,
                        speed: group.speed,
                    });
                }
                if group.health <= 0 {
                    return Err(SettingsError::NonPositiveHealth {
                        wave: number,
                        health: group.health,
                    });
                }

                for _ in 0..group.count {
                    spawns.push(EnemySpec {
                        path: Arc::clone(&path),
                        speed: group.speed,
                        health: Health::new(group.health),
                        reward: Money::new(group.reward),
                        archetype: group.archetype,
                    });
                }
            }

            if spawns.is_empty() {
                return Err(SettingsError::EmptyWave { wave: number });
            }
            waves.push(spawns);
        }

        Ok(WavePlan::new(waves))
    }

    /// Minimum time between two spawns of the same wave.
    #[must_use]
    pub const fn spawn_delay(&self) -> Duration {
        Duration::from_millis(self.spawn_delay_ms)
    }

    /// Money available when the level starts.
    #[must_use]
    pub const fn starting_money(&self) -> Money {
        Money::new(self.starting_money)
    }

    /// Flat price of placing any tower.
    #[must_use]
    pub const fn tower_cost(&self) -> Money {
        Money::new(self.tower_cost)
    }
}

fn is_positive_finite(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
