#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns tower readiness into firing and income commands.

use lane_defense_core::{Command, TowerCooldownView, TowerId, TowerProfile, TowerTarget};

/// Tower combat system that queues commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireProjectile` for ready combat towers holding a
    /// target and `Command::GenerateIncome` for ready income towers.
    ///
    /// `tower_targets` must be sorted by tower identifier. Commands are
    /// emitted in tower identifier order.
    pub fn handle(
        &mut self,
        tower_cooldowns: TowerCooldownView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        let cooldowns = tower_cooldowns.into_vec();
        if cooldowns.is_empty() {
            return;
        }

        self.scratch.clear();

        for cooldown in cooldowns.iter().filter(|cooldown| cooldown.ready) {
            match cooldown.kind.profile() {
                TowerProfile::Income { .. } => {
                    self.scratch.push(Command::GenerateIncome {
                        tower: cooldown.tower,
                    });
                }
                TowerProfile::Combat { .. } => {
                    if let Some(target) = find_target(tower_targets, cooldown.tower) {
                        self.scratch.push(Command::FireProjectile {
                            tower: cooldown.tower,
                            target: target.enemy,
                        });
                    }
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn find_target(targets: &[TowerTarget], tower: TowerId) -> Option<&TowerTarget> {
    targets
        .binary_search_by_key(&tower, |target| target.tower)
        .ok()
        .map(|index| &targets[index])
}
