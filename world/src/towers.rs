//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use lane_defense_core::{
    upgrade_cost, CellCoord, Money, TowerId, TowerKind, TowerProfile, TowerSnapshot, UpgradeError,
};

use crate::economy::Economy;

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Tower {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Grid cell occupied by the tower.
    pub(crate) cell: CellCoord,
    /// Cell centre the tower sits on.
    pub(crate) position: Vec2,
    /// Upgrade level, starting at one.
    pub(crate) level: u32,
    /// Current variant-specific statistics.
    pub(crate) profile: TowerProfile,
    /// Clock reading of the last shot or generation, or of placement.
    pub(crate) last_trigger: Duration,
    /// Destination of the most recent shot.
    pub(crate) aim: Option<Vec2>,
}

impl Tower {
    /// Interval that must be strictly exceeded before the tower acts again.
    pub(crate) const fn interval(&self) -> Duration {
        match self.profile {
            TowerProfile::Combat { rate_of_fire, .. } => rate_of_fire,
            TowerProfile::Income {
                generation_interval,
                ..
            } => generation_interval,
        }
    }

    pub(crate) fn is_ready(&self, now: Duration) -> bool {
        now.saturating_sub(self.last_trigger) > self.interval()
    }

    /// Spends the upgrade cost from `economy` and improves the tower.
    ///
    /// Leaves both the tower and the economy untouched when funds are short.
    pub(crate) fn upgrade(&mut self, economy: &mut Economy) -> Result<Money, UpgradeError> {
        let cost = upgrade_cost(self.level);
        if !economy.try_spend(cost) {
            return Err(UpgradeError::InsufficientFunds);
        }

        self.level = self.level.saturating_add(1);
        self.profile = self.profile.upgraded();
        Ok(cost)
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            level: self.level,
            profile: self.profile,
            aim: self.aim,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, Tower>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a freshly placed tower and returns its identifier.
    pub(crate) fn insert(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
        position: Vec2,
        placed_at: Duration,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let tower = Tower {
            id,
            kind,
            cell,
            position,
            level: 1,
            profile: kind.profile(),
            last_trigger: placed_at,
            aim: None,
        };
        let _ = self.entries.insert(id, tower);
        id
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&Tower> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut Tower> {
        self.entries.get_mut(&id)
    }

    /// Towers in placement order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.entries.values()
    }

    pub(crate) fn is_occupied(&self, cell: CellCoord) -> bool {
        self.entries.values().any(|tower| tower.cell == cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_allocates_sequential_identifiers() {
        let mut registry = TowerRegistry::new();
        let first = registry.insert(
            TowerKind::Basic,
            CellCoord::new(1, 1),
            Vec2::ONE,
            Duration::ZERO,
        );
        let second = registry.insert(
            TowerKind::Money,
            CellCoord::new(2, 1),
            Vec2::ONE,
            Duration::ZERO,
        );

        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        assert!(registry.is_occupied(CellCoord::new(2, 1)));
        assert!(!registry.is_occupied(CellCoord::new(3, 1)));
        assert_eq!(registry.iter().count(), 2);
    }

    #[test]
    fn readiness_requires_strictly_more_than_the_interval() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(
            TowerKind::Basic,
            CellCoord::new(0, 0),
            Vec2::ZERO,
            Duration::from_millis(500),
        );
        let tower = registry.get(id).expect("tower");

        assert!(!tower.is_ready(Duration::from_millis(1500)));
        assert!(tower.is_ready(Duration::from_millis(1501)));
    }

    #[test]
    fn upgrade_without_funds_changes_nothing() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(
            TowerKind::Basic,
            CellCoord::new(0, 0),
            Vec2::ZERO,
            Duration::ZERO,
        );
        let mut economy = Economy::new(Money::new(49));
        let tower = registry.get_mut(id).expect("tower");

        assert_eq!(
            tower.upgrade(&mut economy),
            Err(UpgradeError::InsufficientFunds)
        );
        assert_eq!(tower.level, 1);
        assert_eq!(tower.profile, TowerKind::Basic.profile());
        assert_eq!(economy.balance(), Money::new(49));
    }

    #[test]
    fn upgrade_spends_exact_cost_and_raises_level() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(
            TowerKind::Sniper,
            CellCoord::new(0, 0),
            Vec2::ZERO,
            Duration::ZERO,
        );
        let mut economy = Economy::new(Money::new(175));
        let tower = registry.get_mut(id).expect("tower");

        assert_eq!(tower.upgrade(&mut economy), Ok(Money::new(50)));
        assert_eq!(tower.upgrade(&mut economy), Ok(Money::new(100)));
        assert_eq!(tower.level, 3);
        assert_eq!(tower.profile.damage(), Some(57));
        assert_eq!(tower.interval(), Duration::from_millis(1280));
        assert_eq!(economy.balance(), Money::new(25));
        assert_eq!(tower.snapshot().upgrade_cost(), Money::new(150));
    }
}
