use std::time::Duration;

use glam::Vec2;
use lane_defense_core::{
    Command, EnemyArchetype, EnemySpec, Event, Health, Money, Settings, TowerKind, WaveIndex,
};
use lane_defense_system_tower_targeting::TowerTargeting;
use lane_defense_world::{self as world, query, World};

fn spawn(world: &mut World, settings: &Settings, health: i32, events: &mut Vec<Event>) {
    world::apply(
        world,
        Command::SpawnEnemy {
            wave: WaveIndex::new(0),
            spec: EnemySpec {
                path: settings.path().expect("default path"),
                speed: 2.0,
                health: Health::new(health),
                reward: Money::new(20),
                archetype: EnemyArchetype::Basic,
            },
        },
        events,
    );
}

#[test]
fn towers_placed_in_the_world_acquire_live_enemies() {
    let settings = Settings::default();
    let mut world = World::new(&settings).expect("default settings are valid");
    let mut events = Vec::new();

    world::apply(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            at: Vec2::new(30.0, 180.0),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Money,
            at: Vec2::new(80.0, 180.0),
        },
        &mut events,
    );
    spawn(&mut world, &settings, 100, &mut events);
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );

    let mut system = TowerTargeting::new();
    let mut targets = Vec::new();
    system.handle(
        &query::tower_view(&world),
        &query::enemy_view(&world),
        &mut targets,
    );

    assert_eq!(targets.len(), 1, "only the combat tower acquires a target");
    let target = targets[0];
    assert_eq!(target.tower_position, Vec2::new(25.0, 175.0));
    assert_eq!(target.enemy_position, settings.enemy_path[0]);
}

#[test]
fn sniper_prefers_the_sturdier_enemy() {
    let settings = Settings::default();
    let mut world = World::new(&settings).expect("default settings are valid");
    let mut events = Vec::new();

    world::apply(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Sniper,
            at: Vec2::new(130.0, 230.0),
        },
        &mut events,
    );
    spawn(&mut world, &settings, 50, &mut events);
    spawn(&mut world, &settings, 200, &mut events);
    spawn(&mut world, &settings, 100, &mut events);

    let enemies = query::enemy_view(&world);
    let sturdy = enemies
        .iter()
        .find(|enemy| enemy.health == Health::new(200))
        .map(|enemy| enemy.id)
        .expect("spawned enemy");

    let mut system = TowerTargeting::new();
    let mut targets = Vec::new();
    system.handle(&query::tower_view(&world), &enemies, &mut targets);

    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].enemy, sturdy);
}
