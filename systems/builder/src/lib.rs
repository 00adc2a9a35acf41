#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system responsible for emitting tower placement and upgrade commands.

use glam::Vec2;
use lane_defense_core::{Command, PlacementError, TowerId, TowerKind};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BuilderInput<'a> {
    /// Point currently under the cursor, if any.
    pub cursor: Option<Vec2>,
    /// Name of the tower type the player asked to place at the cursor.
    pub place: Option<&'a str>,
    /// Indicates whether the player requested an upgrade of the hovered tower.
    pub upgrade: bool,
}

impl<'a> BuilderInput<'a> {
    /// Input requesting placement of `tower_type` at `point`.
    #[must_use]
    pub const fn place(point: Vec2, tower_type: &'a str) -> Self {
        Self {
            cursor: Some(point),
            place: Some(tower_type),
            upgrade: false,
        }
    }

    /// Input requesting an upgrade of the tower under `point`.
    #[must_use]
    pub const fn upgrade(point: Vec2) -> Self {
        Self {
            cursor: Some(point),
            place: None,
            upgrade: true,
        }
    }
}

/// System that translates cursor input into placement and upgrade commands.
///
/// Funds, bounds and occupancy are validated by the world when the emitted
/// commands are applied; the builder only resolves names and hover targets.
#[derive(Clone, Copy, Debug, Default)]
pub struct Builder;

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Consumes adapter-derived input to emit builder commands.
    ///
    /// The `tower_at` closure should mirror the semantics of the world's
    /// `query::tower_at_point` helper so the system can identify the hovered
    /// tower. Returns `PlacementError::UnknownTowerKind` without emitting a
    /// placement when the requested name matches no tower type.
    pub fn handle<F>(
        &self,
        input: BuilderInput<'_>,
        tower_at: F,
        out: &mut Vec<Command>,
    ) -> Result<(), PlacementError>
    where
        F: FnOnce(Vec2) -> Option<TowerId>,
    {
        let Some(cursor) = input.cursor else {
            return Ok(());
        };

        if input.upgrade {
            if let Some(tower) = tower_at(cursor) {
                out.push(Command::UpgradeTower { tower });
            }
        }

        if let Some(name) = input.place {
            let kind: TowerKind = name.parse()?;
            out.push(Command::PlaceTower { kind, at: cursor });
        }

        Ok(())
    }
}
