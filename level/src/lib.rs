#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level orchestration for Lane Defense.
//!
//! A [`Level`] owns the authoritative world together with every pure system
//! and drives them in a fixed order once per frame:
//!
//! 0. advance the clock,
//! 1. release the next pending spawn,
//! 2. resolve projectile collisions,
//! 3. move enemies,
//! 4. let ready towers fire or generate income,
//! 5. move projectiles,
//! 6. advance the wave schedule.

use std::time::Duration;

use glam::Vec2;
use lane_defense_core::{
    Command, Event, Money, PlacementError, Settings, SettingsError, TowerId, TowerKind,
    TowerTarget, TowerUpgrade, UpgradeError,
};
use lane_defense_system_builder::{Builder, BuilderInput};
use lane_defense_system_spawning::{Config as SpawningConfig, Spawning, WavePhase};
use lane_defense_system_tower_combat::TowerCombat;
use lane_defense_system_tower_targeting::TowerTargeting;
use lane_defense_world::{self as world, query, World};
use tracing::{debug, info, warn};

/// Final or ongoing result of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Enemies or waves remain.
    InProgress,
    /// Every wave was cleared.
    Victory,
    /// An enemy reached the end of the path.
    Defeat,
}

/// A playable level: the world, its systems and the wave schedule.
#[derive(Debug)]
pub struct Level {
    world: World,
    spawning: Spawning,
    targeting: TowerTargeting,
    combat: TowerCombat,
    builder: Builder,
    outcome: Outcome,
    commands: Vec<Command>,
    targets: Vec<TowerTarget>,
    backlog: Vec<Event>,
}

impl Level {
    /// Builds a level from `settings` and starts its first wave.
    ///
    /// The first enemy of the first wave is spawned immediately. Events
    /// produced while starting are delivered by the first [`Level::update`].
    pub fn new(settings: &Settings) -> Result<Self, SettingsError> {
        let world = World::new(settings)?;
        let spawning = Spawning::new(
            settings.wave_plan()?,
            SpawningConfig::new(settings.spawn_delay()),
        );

        let mut level = Self {
            world,
            spawning,
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            builder: Builder::new(),
            outcome: Outcome::InProgress,
            commands: Vec::new(),
            targets: Vec::new(),
            backlog: Vec::new(),
        };

        info!(
            waves = level.spawning.wave_count(),
            money = %query::money(&level.world),
            "level started"
        );

        let now = query::clock(&level.world);
        let mut events = Vec::new();
        level
            .spawning
            .start(now, &mut level.commands, &mut events);
        level.flush(&mut events);
        level.observe_schedule(&events);
        level.backlog = events;
        Ok(level)
    }

    /// Advances the level by `dt`, appending every event produced to `out`.
    ///
    /// Does nothing once the outcome has been decided.
    pub fn update(&mut self, dt: Duration, out: &mut Vec<Event>) {
        if self.outcome != Outcome::InProgress {
            return;
        }

        out.append(&mut self.backlog);

        let tick_start = out.len();
        self.execute(Command::Tick { dt }, out);
        self.spawning.handle(&out[tick_start..], &mut self.commands);
        self.flush(out);

        self.execute(Command::ResolveCollisions, out);

        let movement_start = out.len();
        self.execute(Command::AdvanceEnemies, out);
        if out[movement_start..].contains(&Event::LevelFailed) {
            self.conclude(Outcome::Defeat);
            return;
        }

        let towers = query::tower_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.targeting.handle(&towers, &enemies, &mut self.targets);
        self.combat.handle(
            query::tower_cooldowns(&self.world),
            &self.targets,
            &mut self.commands,
        );
        self.flush(out);

        self.execute(Command::AdvanceProjectiles, out);

        let schedule_start = out.len();
        self.spawning.check_progress(
            query::clock(&self.world),
            query::enemy_count(&self.world),
            &mut self.commands,
            out,
        );
        self.flush(out);
        self.observe_schedule(&out[schedule_start..]);
    }

    /// Feeds one frame of player input through the builder.
    ///
    /// Placements and upgrades are resolved when the input is applied and
    /// reported as events by the next [`Level::update`]. Only an unknown tower
    /// type is returned directly. Input is ignored once the outcome is decided.
    pub fn handle_input(&mut self, input: BuilderInput<'_>) -> Result<(), PlacementError> {
        if self.outcome != Outcome::InProgress {
            return Ok(());
        }

        let world = &self.world;
        self.builder.handle(
            input,
            |point| query::tower_at_point(world, point),
            &mut self.commands,
        )?;

        let mut backlog = std::mem::take(&mut self.backlog);
        self.flush(&mut backlog);
        self.backlog = backlog;
        Ok(())
    }

    /// Places a tower of the named type in the grid cell containing `point`.
    ///
    /// Rejections leave the level untouched. Checks run in order: the level
    /// still in progress, the type name, available funds, grid bounds, then
    /// cell occupancy.
    pub fn attempt_place_tower(
        &mut self,
        point: Vec2,
        tower_type: &str,
    ) -> Result<TowerId, PlacementError> {
        if self.outcome != Outcome::InProgress {
            return Err(PlacementError::LevelOver);
        }

        let kind = match tower_type.parse::<TowerKind>() {
            Ok(kind) => kind,
            Err(reason) => {
                debug!(tower_type, %reason, "tower placement rejected");
                return Err(reason);
            }
        };
        world::place_tower(&mut self.world, kind, point, &mut self.backlog)
    }

    /// Upgrades `tower`, spending the cost of its current level.
    pub fn upgrade_tower(&mut self, tower: TowerId) -> Result<TowerUpgrade, UpgradeError> {
        if self.outcome != Outcome::InProgress {
            return Err(UpgradeError::LevelOver);
        }
        world::upgrade_tower(&mut self.world, tower, &mut self.backlog)
    }

    /// Upgrades the tower under `point`, if any.
    pub fn upgrade_at(&mut self, point: Vec2) -> Result<TowerUpgrade, UpgradeError> {
        if self.outcome != Outcome::InProgress {
            return Err(UpgradeError::LevelOver);
        }
        let tower = self.hovered_tower(point).ok_or(UpgradeError::MissingTower)?;
        self.upgrade_tower(tower)
    }

    /// Tower whose grid cell contains `point`.
    #[must_use]
    pub fn hovered_tower(&self, point: Vec2) -> Option<TowerId> {
        query::tower_at_point(&self.world, point)
    }

    /// Reports whether `point` lies within the grid cell of `tower`.
    #[must_use]
    pub fn is_hovered(&self, tower: TowerId, point: Vec2) -> bool {
        let grid = query::grid(&self.world);
        query::tower(&self.world, tower)
            .is_some_and(|snapshot| grid.cell_contains_point(snapshot.cell, point))
    }

    /// Current result of the level.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Progress through the wave plan.
    #[must_use]
    pub const fn wave_phase(&self) -> WavePhase {
        self.spawning.phase()
    }

    /// Money currently available.
    #[must_use]
    pub fn money(&self) -> Money {
        query::money(&self.world)
    }

    /// Read-only access to the world for presentation queries.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    fn execute(&mut self, command: Command, out: &mut Vec<Event>) {
        world::apply(&mut self.world, command, out);
    }

    fn flush(&mut self, out: &mut Vec<Event>) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, out);
        }
    }

    fn observe_schedule(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::WaveStarted { wave } => info!(%wave, "wave started"),
                Event::WaveCleared { wave } => info!(%wave, "wave cleared"),
                Event::AllWavesComplete => self.conclude(Outcome::Victory),
                _ => {}
            }
        }
    }

    fn conclude(&mut self, outcome: Outcome) {
        self.outcome = outcome;
        match outcome {
            Outcome::Victory => info!(money = %query::money(&self.world), "all waves cleared"),
            Outcome::Defeat => warn!(
                clock_ms = query::clock(&self.world).as_millis() as u64,
                "enemy reached the goal, level failed"
            ),
            Outcome::InProgress => {}
        }
    }
}
