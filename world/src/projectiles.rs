//! Projectiles flying toward a fixed destination.

use glam::Vec2;
use lane_defense_core::{ProjectileId, ProjectileSnapshot, TowerId};

/// Result of advancing a projectile by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flight {
    InFlight,
    /// The projectile reached its destination this tick and remains for one
    /// more collision pass.
    Arrived,
    /// The projectile had already arrived and missed; it must be removed.
    Expired,
}

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    tower: TowerId,
    pub(crate) position: Vec2,
    destination: Vec2,
    pub(crate) damage: u32,
    speed: f32,
    arrived: bool,
}

impl Projectile {
    pub(crate) fn new(
        id: ProjectileId,
        tower: TowerId,
        origin: Vec2,
        destination: Vec2,
        damage: u32,
        speed: f32,
    ) -> Self {
        Self {
            id,
            tower,
            position: origin,
            destination,
            damage,
            speed,
            arrived: false,
        }
    }

    pub(crate) fn advance(&mut self) -> Flight {
        if self.arrived {
            return Flight::Expired;
        }

        let offset = self.destination - self.position;
        let remaining = offset.length();
        if remaining <= self.speed {
            self.position = self.destination;
            self.arrived = true;
            Flight::Arrived
        } else {
            self.position += offset / remaining * self.speed;
            Flight::InFlight
        }
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            tower: self.tower,
            position: self.position,
            destination: self.destination,
            damage: self.damage,
        }
    }
}
