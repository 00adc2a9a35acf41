#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defense engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The level orchestrator submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems and adapters to react to. Systems consume immutable views such
//! as [`EnemyView`] and [`TowerView`] and respond exclusively with new command
//! batches.

mod settings;

use std::{fmt, str::FromStr, sync::Arc, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use settings::{EnemyGroup, Settings, SettingsError, WaveSettings};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Lane Defense.";

/// Price of upgrading a tower, multiplied by the tower's current level.
pub const UPGRADE_COST_PER_LEVEL: u32 = 50;

/// Shortest interval an upgrade may reduce a tower's timer to.
pub const MIN_RATE_OF_FIRE: Duration = Duration::from_millis(100);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new enemy enters the lane at the start of its path.
    SpawnEnemy {
        /// Wave the enemy belongs to.
        wave: WaveIndex,
        /// Attributes of the enemy to create.
        spec: EnemySpec,
    },
    /// Resolves projectile and enemy intersections, applying damage.
    ResolveCollisions,
    /// Advances every live enemy along its path.
    AdvanceEnemies,
    /// Requests that a tower fires a projectile at the provided enemy.
    FireProjectile {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy whose current position becomes the projectile destination.
        target: EnemyId,
    },
    /// Requests that an income tower credits its generation rate.
    GenerateIncome {
        /// Tower producing the income.
        tower: TowerId,
    },
    /// Advances every live projectile toward its destination.
    AdvanceProjectiles,
    /// Requests placement of a tower at the grid cell containing `at`.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// World position used to select the grid cell.
        at: Vec2,
    },
    /// Requests an upgrade of an existing tower.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
}

/// Events broadcast by the world and the wave scheduler.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Clock reading after the tick.
        now: Duration,
    },
    /// Confirms that an enemy entered the lane.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Wave the enemy belongs to.
        wave: WaveIndex,
        /// Position the enemy starts from.
        position: Vec2,
    },
    /// Reports that an enemy absorbed damage and survived or died.
    EnemyDamaged {
        /// Identifier of the struck enemy.
        enemy: EnemyId,
        /// Damage applied.
        amount: u32,
        /// Health remaining after the hit.
        remaining: Health,
    },
    /// Reports that an enemy was destroyed by damage.
    EnemyKilled {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Money credited to the economy for the kill.
        reward: Money,
    },
    /// Reports that an enemy reached the final waypoint of its path.
    EnemyReachedGoal {
        /// Identifier of the enemy that escaped.
        enemy: EnemyId,
    },
    /// Announces that the level was lost.
    LevelFailed,
    /// Confirms that a tower fired a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Position the projectile starts from.
        from: Vec2,
        /// Fixed destination captured at firing time.
        destination: Vec2,
    },
    /// Reports that a projectile struck an enemy and was consumed.
    ProjectileHit {
        /// Identifier of the consumed projectile.
        projectile: ProjectileId,
        /// Identifier of the struck enemy.
        enemy: EnemyId,
    },
    /// Reports that a projectile reached its destination without a hit.
    ProjectileExpired {
        /// Identifier of the despawned projectile.
        projectile: ProjectileId,
    },
    /// Reports passive income credited by a tower.
    MoneyGenerated {
        /// Tower that produced the income.
        tower: TowerId,
        /// Amount credited.
        amount: Money,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Grid cell occupied by the tower.
        cell: CellCoord,
        /// Canonical position of the tower.
        position: Vec2,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Position provided in the placement request.
        at: Vec2,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower was upgraded.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level reached by the upgrade.
        level: u32,
        /// Money deducted for the upgrade.
        cost: Money,
    },
    /// Reports that an upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier of the tower targeted by the request.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Announces that a wave began releasing enemies.
    WaveStarted {
        /// Wave that started.
        wave: WaveIndex,
    },
    /// Announces that every enemy of a wave was spawned and removed.
    WaveCleared {
        /// Wave that was cleared.
        wave: WaveIndex,
    },
    /// Announces that the final wave was cleared.
    AllWavesComplete,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Zero-based index of a wave within the wave plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaveIndex(u32);

impl WaveIndex {
    /// Creates a new wave index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index of the wave that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for WaveIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.saturating_add(1))
    }
}

/// Amount of currency held by or flowing through the economy.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u32);

impl Money {
    /// No money at all.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw currency amount.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the raw currency amount.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Adds two amounts, saturating at the numeric bound.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts `other`, returning `None` when the balance would go negative.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Hit points carried by an enemy. May drop below zero on the killing blow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Health(i32);

impl Health {
    /// Wraps a raw hit point value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Retrieves the raw hit point value.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// Reports whether the health has run out.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 <= 0
    }

    /// Removes `amount` hit points.
    #[must_use]
    pub fn saturating_sub(self, amount: u32) -> Self {
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        Self(self.0.saturating_sub(amount))
    }
}

/// Location of a single placement cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Describes the discrete cell layout that towers are placed on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementGrid {
    columns: u32,
    rows: u32,
    cell_length: f32,
}

impl PlacementGrid {
    /// Creates a new placement grid description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, cell_length: f32) -> Self {
        Self {
            columns,
            rows,
            cell_length,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square cell expressed in world units.
    #[must_use]
    pub const fn cell_length(&self) -> f32 {
        self.cell_length
    }

    /// Total width of the grid measured in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Total height of the grid measured in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }

    /// Reports whether the grid contains at least one usable cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns == 0
            || self.rows == 0
            || !(self.cell_length.is_finite() && self.cell_length > 0.0)
    }

    /// Reports whether the cell lies inside the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column < self.columns && cell.row < self.rows
    }

    /// Maps a world position onto the cell containing it.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> Option<CellCoord> {
        if self.is_empty() || !point.is_finite() || point.x < 0.0 || point.y < 0.0 {
            return None;
        }

        let column = (point.x / self.cell_length).floor() as u32;
        let row = (point.y / self.cell_length).floor() as u32;
        let cell = CellCoord::new(column, row);
        self.contains(cell).then_some(cell)
    }

    /// Canonical world position of the provided cell, located at its centre.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        let half = self.cell_length / 2.0;
        Vec2::new(
            cell.column as f32 * self.cell_length + half,
            cell.row as f32 * self.cell_length + half,
        )
    }

    /// Reports whether `point` falls inside the square covered by `cell`.
    #[must_use]
    pub fn cell_contains_point(&self, cell: CellCoord, point: Vec2) -> bool {
        let min = Vec2::new(
            cell.column as f32 * self.cell_length,
            cell.row as f32 * self.cell_length,
        );
        let max = min + Vec2::splat(self.cell_length);
        point.x >= min.x && point.x < max.x && point.y >= min.y && point.y < max.y
    }
}

/// Reasons a path definition may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// Fewer than two waypoints were supplied.
    #[error("enemy path needs at least two waypoints, found {0}")]
    TooShort(usize),
    /// A waypoint contained a NaN or infinite coordinate.
    #[error("enemy path waypoint {0} is not finite")]
    NonFinite(usize),
}

/// Ordered sequence of waypoints that enemies follow from start to goal.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    waypoints: Vec<Vec2>,
}

impl Path {
    /// Creates a path from the provided waypoints.
    pub fn new(waypoints: Vec<Vec2>) -> Result<Self, PathError> {
        if waypoints.len() < 2 {
            return Err(PathError::TooShort(waypoints.len()));
        }

        if let Some(index) = waypoints.iter().position(|point| !point.is_finite()) {
            return Err(PathError::NonFinite(index));
        }

        Ok(Self { waypoints })
    }

    /// Waypoints composing the path.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// First waypoint, where enemies spawn.
    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.waypoints[0]
    }

    /// Index of the final waypoint, the goal.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.waypoints.len() - 1
    }

    /// Waypoint stored at `index`, if any.
    #[must_use]
    pub fn waypoint(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }
}

/// Visual archetype of an enemy, resolved to a sprite by adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyArchetype {
    /// Quick but fragile enemy.
    Fast,
    /// Slow enemy with a large health pool.
    Strong,
    /// Middle-of-the-road enemy.
    Basic,
}

/// Attributes of a single enemy released by a wave.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySpec {
    /// Path followed by the enemy, shared by every enemy of the level.
    pub path: Arc<Path>,
    /// Distance covered per simulation tick.
    pub speed: f32,
    /// Initial health.
    pub health: Health,
    /// Money credited when the enemy is destroyed by damage.
    pub reward: Money,
    /// Visual archetype.
    pub archetype: EnemyArchetype,
}

/// Immutable ordered list of waves, each an ordered list of spawns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WavePlan {
    waves: Vec<Vec<EnemySpec>>,
}

impl WavePlan {
    /// Creates a wave plan from the provided waves.
    #[must_use]
    pub fn new(waves: Vec<Vec<EnemySpec>>) -> Self {
        Self { waves }
    }

    /// Number of waves in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Reports whether the plan contains no waves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Spawns belonging to the provided wave.
    #[must_use]
    pub fn wave(&self, index: WaveIndex) -> Option<&[EnemySpec]> {
        let index = usize::try_from(index.get()).ok()?;
        self.waves.get(index).map(Vec::as_slice)
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TowerKind {
    /// Balanced tower that shoots the nearest enemy.
    Basic,
    /// Long range tower that shoots the healthiest enemy.
    Sniper,
    /// Tower that never fires and produces money instead.
    Money,
}

impl TowerKind {
    /// Every constructible tower kind.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Sniper, Self::Money];

    /// Canonical lowercase name used by configuration and input adapters.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Sniper => "sniper",
            Self::Money => "money",
        }
    }

    /// Baseline statistics of a freshly placed tower.
    #[must_use]
    pub const fn profile(self) -> TowerProfile {
        match self {
            Self::Basic => TowerProfile::Combat {
                damage: 20,
                rate_of_fire: Duration::from_millis(1000),
                range: 150.0,
                policy: TargetPolicy::Nearest,
            },
            Self::Sniper => TowerProfile::Combat {
                damage: 40,
                rate_of_fire: Duration::from_millis(2000),
                range: 300.0,
                policy: TargetPolicy::Healthiest,
            },
            Self::Money => TowerProfile::Income {
                generation_rate: Money::new(50),
                generation_interval: Duration::from_millis(5000),
            },
        }
    }
}

impl fmt::Display for TowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TowerKind {
    type Err = PlacementError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(value))
            .ok_or(PlacementError::UnknownTowerKind)
    }
}

/// Rule a combat tower uses to choose among enemies in range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetPolicy {
    /// Closest enemy; the first one seen wins ties.
    Nearest,
    /// Enemy with the most remaining health; the first one seen wins ties.
    Healthiest,
}

/// Variant-specific statistics of a tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TowerProfile {
    /// Tower that acquires targets and fires projectiles.
    Combat {
        /// Damage carried by each projectile.
        damage: u32,
        /// Minimum time between two shots.
        rate_of_fire: Duration,
        /// Maximum distance at which a target may be selected.
        range: f32,
        /// Targeting rule.
        policy: TargetPolicy,
    },
    /// Tower that periodically credits money.
    Income {
        /// Money credited per generation.
        generation_rate: Money,
        /// Minimum time between two generations.
        generation_interval: Duration,
    },
}

impl TowerProfile {
    /// Statistics after one upgrade step.
    ///
    /// Damage and income grow by 20% and timers shrink by 20%, truncating to
    /// whole units. Timers never drop below [`MIN_RATE_OF_FIRE`] unless they
    /// already started below it, and never grow.
    #[must_use]
    pub fn upgraded(self) -> Self {
        match self {
            Self::Combat {
                damage,
                rate_of_fire,
                range,
                policy,
            } => Self::Combat {
                damage: grow(damage),
                rate_of_fire: shorten(rate_of_fire),
                range,
                policy,
            },
            Self::Income {
                generation_rate,
                generation_interval,
            } => Self::Income {
                generation_rate: Money::new(grow(generation_rate.get())),
                generation_interval: shorten(generation_interval),
            },
        }
    }

    /// Targeting range, if the tower fights.
    #[must_use]
    pub const fn range(&self) -> Option<f32> {
        match self {
            Self::Combat { range, .. } => Some(*range),
            Self::Income { .. } => None,
        }
    }

    /// Projectile damage, if the tower fights.
    #[must_use]
    pub const fn damage(&self) -> Option<u32> {
        match self {
            Self::Combat { damage, .. } => Some(*damage),
            Self::Income { .. } => None,
        }
    }
}

fn grow(value: u32) -> u32 {
    let scaled = u64::from(value) * 6 / 5;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

fn shorten(interval: Duration) -> Duration {
    let millis = interval.as_millis().saturating_mul(4) / 5;
    let shortened = Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX));
    shortened.max(MIN_RATE_OF_FIRE).min(interval)
}

/// Cost of upgrading a tower that currently sits at `level`.
#[must_use]
pub const fn upgrade_cost(level: u32) -> Money {
    Money::new(UPGRADE_COST_PER_LEVEL.saturating_mul(level))
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested tower type is not one of the known kinds.
    #[error("unknown tower type")]
    UnknownTowerKind,
    /// The economy cannot afford the tower.
    #[error("not enough money to place the tower")]
    InsufficientFunds,
    /// The requested position lies outside the placement grid.
    #[error("position lies outside the placement grid")]
    OutOfBounds,
    /// The requested cell already holds a tower.
    #[error("grid cell is already occupied")]
    Occupied,
    /// The level has already been won or lost.
    #[error("the level is already over")]
    LevelOver,
}

/// Reasons a tower upgrade request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
    /// The economy cannot afford the upgrade.
    #[error("not enough money to upgrade the tower")]
    InsufficientFunds,
    /// The level has already been won or lost.
    #[error("the level is already over")]
    LevelOver,
}

/// Successful tower upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerUpgrade {
    /// Tower that was upgraded.
    pub tower: TowerId,
    /// Level reached by the upgrade.
    pub level: u32,
    /// Money spent on the upgrade.
    pub cost: Money,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Current position.
    pub position: Vec2,
    /// Index of the waypoint the enemy last reached.
    pub path_index: usize,
    /// Remaining health.
    pub health: Health,
    /// Health at spawn.
    pub max_health: Health,
    /// Distance covered per tick.
    pub speed: f32,
    /// Money credited when the enemy is destroyed.
    pub reward: Money,
    /// Visual archetype.
    pub archetype: EnemyArchetype,
}

/// Read-only snapshot describing all live enemies in spawn order.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of live enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemy is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Grid cell occupied by the tower.
    pub cell: CellCoord,
    /// Canonical position of the tower.
    pub position: Vec2,
    /// Current upgrade level, starting at one.
    pub level: u32,
    /// Current statistics.
    pub profile: TowerProfile,
    /// Point the tower last fired at, used for orientation only.
    pub aim: Option<Vec2>,
}

impl TowerSnapshot {
    /// Cost of the next upgrade.
    #[must_use]
    pub const fn upgrade_cost(&self) -> Money {
        upgrade_cost(self.level)
    }
}

/// Read-only snapshot describing all towers placed in the level.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Readiness of a tower's timer at the current clock reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Identifier of the tower.
    pub tower: TowerId,
    /// Kind of the tower.
    pub kind: TowerKind,
    /// Whether strictly more than the tower's interval has elapsed.
    pub ready: bool,
}

/// Read-only collection of tower cooldowns sorted by tower identifier.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new cooldown view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Iterator over the captured cooldowns in tower order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerCooldownSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Tower that fired the projectile.
    pub tower: TowerId,
    /// Current position.
    pub position: Vec2,
    /// Fixed destination captured at firing time.
    pub destination: Vec2,
    /// Damage delivered on impact.
    pub damage: u32,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the projectiles in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectile is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Target assignment computed for a combat tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Enemy selected by the tower's policy.
    pub enemy: EnemyId,
    /// Position of the tower.
    pub tower_position: Vec2,
    /// Position of the enemy at acquisition time.
    pub enemy_position: Vec2,
}

#[cfg(test)]
mod tests {
    use super::{
        upgrade_cost, CellCoord, Health, Money, Path, PathError, PlacementError, PlacementGrid,
        TowerKind, TowerProfile, UpgradeError, MIN_RATE_OF_FIRE,
    };
    use glam::Vec2;
    use serde::{de::DeserializeOwned, Serialize};
    use std::time::Duration;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tower_kind_round_trips_through_bincode() {
        assert_round_trip(&TowerKind::Sniper);
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::Occupied);
    }

    #[test]
    fn upgrade_error_round_trips_through_bincode() {
        assert_round_trip(&UpgradeError::InsufficientFunds);
    }

    #[test]
    fn tower_kind_parses_case_insensitively() {
        assert_eq!("basic".parse::<TowerKind>(), Ok(TowerKind::Basic));
        assert_eq!(" Sniper ".parse::<TowerKind>(), Ok(TowerKind::Sniper));
        assert_eq!("MONEY".parse::<TowerKind>(), Ok(TowerKind::Money));
        assert_eq!(
            "laser".parse::<TowerKind>(),
            Err(PlacementError::UnknownTowerKind)
        );
    }

    #[test]
    fn upgrade_cost_scales_with_level() {
        assert_eq!(upgrade_cost(1), Money::new(50));
        assert_eq!(upgrade_cost(4), Money::new(200));
    }

    #[test]
    fn combat_upgrade_truncates_damage_and_rate() {
        let upgraded = TowerKind::Basic.profile().upgraded();
        let TowerProfile::Combat {
            damage,
            rate_of_fire,
            range,
            ..
        } = upgraded
        else {
            panic!("basic tower should fight");
        };
        assert_eq!(damage, 24);
        assert_eq!(rate_of_fire, Duration::from_millis(800));
        assert!((range - 150.0).abs() < f32::EPSILON);

        let twice = upgraded.upgraded();
        assert_eq!(twice.damage(), Some(28));
    }

    #[test]
    fn repeated_upgrades_stop_at_minimum_rate_of_fire() {
        let mut profile = TowerKind::Sniper.profile();
        for _ in 0..40 {
            profile = profile.upgraded();
        }
        let TowerProfile::Combat { rate_of_fire, .. } = profile else {
            panic!("sniper tower should fight");
        };
        assert_eq!(rate_of_fire, MIN_RATE_OF_FIRE);
    }

    #[test]
    fn income_upgrade_grows_rate_and_shortens_interval() {
        let upgraded = TowerKind::Money.profile().upgraded();
        assert_eq!(
            upgraded,
            TowerProfile::Income {
                generation_rate: Money::new(60),
                generation_interval: Duration::from_millis(4000),
            }
        );
    }

    #[test]
    fn money_subtraction_refuses_to_go_negative() {
        assert_eq!(Money::new(40).checked_sub(Money::new(50)), None);
        assert_eq!(Money::new(60).checked_sub(Money::new(50)), Some(Money::new(10)));
    }

    #[test]
    fn health_depletes_at_zero() {
        let health = Health::new(50).saturating_sub(20).saturating_sub(30);
        assert!(health.is_depleted());
        assert!(!Health::new(1).is_depleted());
    }

    #[test]
    fn path_requires_two_waypoints() {
        assert_eq!(
            Path::new(vec![Vec2::ZERO]).map(|_| ()),
            Err(PathError::TooShort(1))
        );
        assert_eq!(
            Path::new(vec![Vec2::ZERO, Vec2::new(f32::NAN, 0.0)]).map(|_| ()),
            Err(PathError::NonFinite(1))
        );
        let path = Path::new(vec![Vec2::ZERO, Vec2::X]).expect("valid path");
        assert_eq!(path.last_index(), 1);
        assert_eq!(path.start(), Vec2::ZERO);
    }

    #[test]
    fn grid_maps_points_to_cells_and_back() {
        let grid = PlacementGrid::new(4, 3, 50.0);
        assert_eq!(grid.cell_at(Vec2::new(75.0, 20.0)), Some(CellCoord::new(1, 0)));
        assert_eq!(grid.cell_at(Vec2::new(200.0, 20.0)), None);
        assert_eq!(grid.cell_at(Vec2::new(-1.0, 20.0)), None);
        assert_eq!(grid.cell_center(CellCoord::new(1, 2)), Vec2::new(75.0, 125.0));
        assert!(grid.cell_contains_point(CellCoord::new(1, 2), Vec2::new(51.0, 149.0)));
        assert!(!grid.cell_contains_point(CellCoord::new(1, 2), Vec2::new(100.0, 149.0)));
    }
}
