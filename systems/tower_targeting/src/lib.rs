#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes tower targets from world snapshots.

use glam::Vec2;
use lane_defense_core::{
    EnemyId, EnemyView, TargetPolicy, TowerId, TowerProfile, TowerTarget, TowerView,
};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. Income towers never acquire targets. Assignments are
    /// emitted in tower identifier order.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if enemies.is_empty() {
            return;
        }

        self.prepare_tower_workspace(towers);
        if self.tower_workspace.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);

        for tower in &self.tower_workspace {
            let selected = match tower.policy {
                TargetPolicy::Nearest => nearest(tower, &self.enemy_workspace),
                TargetPolicy::Healthiest => healthiest(tower, &self.enemy_workspace),
            };

            if let Some(candidate) = selected {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: candidate.id,
                    tower_position: tower.position,
                    enemy_position: candidate.position,
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, towers: &TowerView) {
        self.tower_workspace.clear();
        let (lower, _) = towers.iter().size_hint();
        self.tower_workspace.reserve(lower);

        for snapshot in towers.iter() {
            let TowerProfile::Combat { range, policy, .. } = snapshot.profile else {
                continue;
            };

            self.tower_workspace.push(TowerWorkspace {
                id: snapshot.id,
                position: snapshot.position,
                range,
                policy,
            });
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());

        for snapshot in enemies.iter() {
            if snapshot.health.is_depleted() {
                continue;
            }

            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
                health: snapshot.health.get(),
            });
        }
    }
}

/// Closest enemy within range; an equally distant later enemy never displaces
/// the incumbent.
fn nearest<'a>(
    tower: &TowerWorkspace,
    candidates: &'a [EnemyCandidate],
) -> Option<&'a EnemyCandidate> {
    let mut best: Option<(&EnemyCandidate, f32)> = None;

    for candidate in candidates {
        let distance = tower.position.distance(candidate.position);
        if distance > tower.range {
            continue;
        }

        match best {
            Some((_, closest)) if distance >= closest => {}
            _ => best = Some((candidate, distance)),
        }
    }

    best.map(|(candidate, _)| candidate)
}

/// Enemy within range with the most remaining health; ties keep the first seen.
fn healthiest<'a>(
    tower: &TowerWorkspace,
    candidates: &'a [EnemyCandidate],
) -> Option<&'a EnemyCandidate> {
    let mut best: Option<&EnemyCandidate> = None;
    let mut max_health = 0;

    for candidate in candidates {
        if tower.position.distance(candidate.position) > tower.range {
            continue;
        }

        if candidate.health > max_health {
            max_health = candidate.health;
            best = Some(candidate);
        }
    }

    best
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    position: Vec2,
    range: f32,
    policy: TargetPolicy,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
    health: i32,
}
