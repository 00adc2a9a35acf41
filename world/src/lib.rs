#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lane Defense.

mod economy;
mod enemies;
mod projectiles;
mod towers;

use std::{sync::Arc, time::Duration};

use glam::Vec2;
use lane_defense_core::{
    CellCoord, Command, EnemyId, Event, Money, Path, PlacementError, PlacementGrid, ProjectileId,
    Settings, SettingsError, TowerId, TowerKind, TowerProfile, TowerUpgrade, UpgradeError,
    WELCOME_BANNER,
};
use tracing::{debug, info};

use self::{
    economy::Economy,
    enemies::{DamageOutcome, Enemy, Stride},
    projectiles::{Flight, Projectile},
    towers::TowerRegistry,
};

/// Represents the authoritative Lane Defense world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: PlacementGrid,
    path: Arc<Path>,
    tower_slots: Vec<Vec2>,
    tower_cost: Money,
    projectile_speed: f32,
    hit_radius: f32,
    economy: Economy,
    clock: Duration,
    enemies: Vec<Enemy>,
    towers: TowerRegistry,
    projectiles: Vec<Projectile>,
    next_enemy_id: EnemyId,
    next_projectile_id: ProjectileId,
}

impl World {
    /// Creates a new world ready for simulation from validated settings.
    pub fn new(settings: &Settings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            banner: WELCOME_BANNER,
            grid: settings.grid,
            path: settings.path()?,
            tower_slots: settings.tower_slots.clone(),
            tower_cost: settings.tower_cost(),
            projectile_speed: settings.projectile_speed,
            hit_radius: settings.hit_radius,
            economy: Economy::new(settings.starting_money()),
            clock: Duration::ZERO,
            enemies: Vec::new(),
            towers: TowerRegistry::new(),
            projectiles: Vec::new(),
            next_enemy_id: EnemyId::new(0),
            next_projectile_id: ProjectileId::new(0),
        })
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        id
    }

    fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        id
    }

    fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        if self.projectiles.is_empty() || self.enemies.is_empty() {
            return;
        }

        let radius = self.hit_radius;
        let in_flight = std::mem::take(&mut self.projectiles);
        let mut missed = Vec::with_capacity(in_flight.len());

        for projectile in in_flight {
            let struck = self.enemies.iter_mut().find(|enemy| {
                enemy.is_alive() && enemy.position.distance(projectile.position) <= radius
            });
            let Some(enemy) = struck else {
                missed.push(projectile);
                continue;
            };

            out_events.push(Event::ProjectileHit {
                projectile: projectile.id,
                enemy: enemy.id,
            });

            let outcome = enemy.take_damage(projectile.damage, &mut self.economy);
            out_events.push(Event::EnemyDamaged {
                enemy: enemy.id,
                amount: projectile.damage,
                remaining: enemy.health(),
            });
            if let DamageOutcome::Killed { reward } = outcome {
                debug!(enemy = enemy.id.get(), reward = reward.get(), "enemy destroyed");
                out_events.push(Event::EnemyKilled {
                    enemy: enemy.id,
                    reward,
                });
            }
        }

        self.projectiles = missed;
        self.enemies.retain(Enemy::is_alive);
    }

    fn advance_enemies(&mut self, out_events: &mut Vec<Event>) {
        let mut escaped: Vec<EnemyId> = Vec::new();
        for enemy in &mut self.enemies {
            if enemy.advance() == Stride::ReachedGoal {
                escaped.push(enemy.id);
            }
        }

        if escaped.is_empty() {
            return;
        }

        self.enemies.retain(|enemy| !escaped.contains(&enemy.id));
        for enemy in escaped {
            info!(enemy = enemy.get(), "enemy reached the end of the path");
            out_events.push(Event::EnemyReachedGoal { enemy });
        }
        out_events.push(Event::LevelFailed);
    }

    fn fire_projectile(
        &mut self,
        tower_id: TowerId,
        target: EnemyId,
        out_events: &mut Vec<Event>,
    ) {
        let Some(destination) = self
            .enemies
            .iter()
            .find(|enemy| enemy.id == target)
            .map(|enemy| enemy.position)
        else {
            debug!(tower = tower_id.get(), enemy = target.get(), "fire ignored: target gone");
            return;
        };

        let now = self.clock;
        let Some(tower) = self.towers.get_mut(tower_id) else {
            return;
        };
        let TowerProfile::Combat { damage, .. } = tower.profile else {
            return;
        };
        if !tower.is_ready(now) {
            debug!(tower = tower_id.get(), "fire ignored: tower reloading");
            return;
        }

        tower.last_trigger = now;
        tower.aim = Some(destination);
        let origin = tower.position;

        let id = self.allocate_projectile_id();
        self.projectiles.push(Projectile::new(
            id,
            tower_id,
            origin,
            destination,
            damage,
            self.projectile_speed,
        ));
        out_events.push(Event::ProjectileFired {
            projectile: id,
            tower: tower_id,
            from: origin,
            destination,
        });
    }

    fn generate_income(&mut self, tower_id: TowerId, out_events: &mut Vec<Event>) {
        let now = self.clock;
        let Some(tower) = self.towers.get_mut(tower_id) else {
            return;
        };
        let TowerProfile::Income {
            generation_rate, ..
        } = tower.profile
        else {
            return;
        };
        if !tower.is_ready(now) {
            return;
        }

        tower.last_trigger = now;
        self.economy.credit(generation_rate);
        info!(
            tower = tower_id.get(),
            amount = generation_rate.get(),
            balance = self.economy.balance().get(),
            "money generated"
        );
        out_events.push(Event::MoneyGenerated {
            tower: tower_id,
            amount: generation_rate,
        });
    }

    fn advance_projectiles(&mut self, out_events: &mut Vec<Event>) {
        self.projectiles.retain_mut(|projectile| {
            if projectile.advance() == Flight::Expired {
                out_events.push(Event::ProjectileExpired {
                    projectile: projectile.id,
                });
                false
            } else {
                true
            }
        });
    }

    fn place_tower(
        &mut self,
        kind: TowerKind,
        at: Vec2,
        out_events: &mut Vec<Event>,
    ) -> Result<TowerId, PlacementError> {
        let cell = match self.check_placement(at) {
            Ok(cell) => cell,
            Err(reason) => {
                debug!(%kind, x = at.x, y = at.y, %reason, "tower placement rejected");
                out_events.push(Event::TowerPlacementRejected { kind, at, reason });
                return Err(reason);
            }
        };

        let spent = self.economy.try_spend(self.tower_cost);
        debug_assert!(spent, "placement was validated as affordable");

        let position = self.grid.cell_center(cell);
        let tower = self.towers.insert(kind, cell, position, self.clock);
        info!(
            tower = tower.get(),
            %kind,
            column = cell.column(),
            row = cell.row(),
            "tower placed"
        );
        out_events.push(Event::TowerPlaced {
            tower,
            kind,
            cell,
            position,
        });
        Ok(tower)
    }

    fn check_placement(&self, at: Vec2) -> Result<CellCoord, PlacementError> {
        if self.economy.balance() < self.tower_cost {
            return Err(PlacementError::InsufficientFunds);
        }

        let cell = self.grid.cell_at(at).ok_or(PlacementError::OutOfBounds)?;
        if self.towers.is_occupied(cell) {
            return Err(PlacementError::Occupied);
        }

        Ok(cell)
    }

    fn upgrade_tower(
        &mut self,
        tower_id: TowerId,
        out_events: &mut Vec<Event>,
    ) -> Result<TowerUpgrade, UpgradeError> {
        let result = match self.towers.get_mut(tower_id) {
            Some(tower) => tower.upgrade(&mut self.economy).map(|cost| TowerUpgrade {
                tower: tower_id,
                level: tower.level,
                cost,
            }),
            None => Err(UpgradeError::MissingTower),
        };

        match result {
            Ok(upgrade) => {
                info!(
                    tower = tower_id.get(),
                    level = upgrade.level,
                    cost = upgrade.cost.get(),
                    "tower upgraded"
                );
                out_events.push(Event::TowerUpgraded {
                    tower: tower_id,
                    level: upgrade.level,
                    cost: upgrade.cost,
                });
            }
            Err(reason) => {
                debug!(tower = tower_id.get(), %reason, "tower upgrade rejected");
                out_events.push(Event::TowerUpgradeRejected {
                    tower: tower_id,
                    reason,
                });
            }
        }
        result
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced {
                dt,
                now: world.clock,
            });
        }
        Command::SpawnEnemy { wave, spec } => {
            let id = world.allocate_enemy_id();
            let enemy = Enemy::spawn(id, spec);
            out_events.push(Event::EnemySpawned {
                enemy: id,
                wave,
                position: enemy.position,
            });
            world.enemies.push(enemy);
        }
        Command::ResolveCollisions => world.resolve_collisions(out_events),
        Command::AdvanceEnemies => world.advance_enemies(out_events),
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::GenerateIncome { tower } => world.generate_income(tower, out_events),
        Command::AdvanceProjectiles => world.advance_projectiles(out_events),
        Command::PlaceTower { kind, at } => {
            let _ = world.place_tower(kind, at, out_events);
        }
        Command::UpgradeTower { tower } => {
            let _ = world.upgrade_tower(tower, out_events);
        }
    }
}

/// Places a tower of `kind` in the grid cell containing `at`.
///
/// Emits the same events as applying [`Command::PlaceTower`] and also returns
/// the outcome to the caller.
pub fn place_tower(
    world: &mut World,
    kind: TowerKind,
    at: Vec2,
    out_events: &mut Vec<Event>,
) -> Result<TowerId, PlacementError> {
    world.place_tower(kind, at, out_events)
}

/// Upgrades `tower`, spending the cost of its current level.
///
/// Emits the same events as applying [`Command::UpgradeTower`].
pub fn upgrade_tower(
    world: &mut World,
    tower: TowerId,
    out_events: &mut Vec<Event>,
) -> Result<TowerUpgrade, UpgradeError> {
    world.upgrade_tower(tower, out_events)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec2;
    use lane_defense_core::{
        EnemyView, Money, Path, PlacementGrid, ProjectileView, TowerCooldownSnapshot,
        TowerCooldownView, TowerId, TowerSnapshot, TowerView,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Time elapsed since the level started.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Current balance of the economy.
    #[must_use]
    pub fn money(world: &World) -> Money {
        world.economy.balance()
    }

    /// Flat price of placing a tower.
    #[must_use]
    pub fn tower_cost(world: &World) -> Money {
        world.tower_cost
    }

    /// Provides read-only access to the placement grid definition.
    #[must_use]
    pub fn grid(world: &World) -> &PlacementGrid {
        &world.grid
    }

    /// Path followed by every enemy of the level.
    #[must_use]
    pub fn path(world: &World) -> &Path {
        &world.path
    }

    /// Suggested tower positions drawn as map markers.
    #[must_use]
    pub fn tower_slots(world: &World) -> &[Vec2] {
        &world.tower_slots
    }

    /// Number of live enemies.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Captures a read-only view of the live enemies in spawn order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures the state of a single tower.
    #[must_use]
    pub fn tower(world: &World, tower: TowerId) -> Option<TowerSnapshot> {
        world.towers.get(tower).map(|tower| tower.snapshot())
    }

    /// Reports which towers may act at the current clock reading.
    #[must_use]
    pub fn tower_cooldowns(world: &World) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| TowerCooldownSnapshot {
                    tower: tower.id,
                    kind: tower.kind,
                    ready: tower.is_ready(world.clock),
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Identifies the tower whose cell contains `point`, if any.
    #[must_use]
    pub fn tower_at_point(world: &World, point: Vec2) -> Option<TowerId> {
        world
            .towers
            .iter()
            .find(|tower| world.grid.cell_contains_point(tower.cell, point))
            .map(|tower| tower.id)
    }
}
