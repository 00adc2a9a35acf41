use std::{sync::Arc, time::Duration};

use glam::Vec2;
use lane_defense_core::{
    Command, EnemyArchetype, EnemySpec, Event, Health, Money, Path, Settings, WaveIndex, WavePlan,
};
use lane_defense_system_spawning::{Config, Spawning, WavePhase};
use lane_defense_world::{self as world, query, World};

fn spec(health: i32) -> EnemySpec {
    EnemySpec {
        path: Arc::new(Path::new(vec![Vec2::ZERO, Vec2::new(100.0, 0.0)]).expect("path")),
        speed: 1.0,
        health: Health::new(health),
        reward: Money::new(5),
        archetype: EnemyArchetype::Basic,
    }
}

fn tick(now_ms: u64) -> Event {
    Event::TimeAdvanced {
        dt: Duration::from_millis(16),
        now: Duration::from_millis(now_ms),
    }
}

#[test]
fn first_enemy_of_a_wave_spawns_immediately() {
    let plan = WavePlan::new(vec![vec![spec(10), spec(20)]]);
    let mut spawning = Spawning::new(plan, Config::new(Duration::from_millis(1000)));
    let mut commands = Vec::new();
    let mut events = Vec::new();

    spawning.start(Duration::ZERO, &mut commands, &mut events);

    assert_eq!(
        events,
        vec![Event::WaveStarted {
            wave: WaveIndex::new(0)
        }]
    );
    assert_eq!(
        commands,
        vec![Command::SpawnEnemy {
            wave: WaveIndex::new(0),
            spec: spec(10),
        }]
    );
    assert_eq!(
        spawning.phase(),
        WavePhase::Spawning {
            wave: WaveIndex::new(0),
            spawned: 1
        }
    );
}

#[test]
fn later_spawns_wait_strictly_longer_than_the_delay() {
    let plan = WavePlan::new(vec![vec![spec(10), spec(20), spec(30)]]);
    let mut spawning = Spawning::new(plan, Config::new(Duration::from_millis(1000)));
    let mut commands = Vec::new();
    let mut events = Vec::new();
    spawning.start(Duration::ZERO, &mut commands, &mut events);
    commands.clear();

    spawning.handle(&[tick(1000)], &mut commands);
    assert!(commands.is_empty(), "exactly the delay must not spawn");

    spawning.handle(&[tick(1016)], &mut commands);
    assert_eq!(commands.len(), 1);

    // A long frame still releases a single enemy.
    spawning.handle(&[tick(5000)], &mut commands);
    assert_eq!(commands.len(), 2);
    assert_eq!(
        spawning.phase(),
        WavePhase::Active {
            wave: WaveIndex::new(0)
        }
    );

    spawning.handle(&[tick(9000)], &mut commands);
    assert_eq!(commands.len(), 2, "fully spawned wave emits nothing more");
}

#[test]
fn wave_does_not_advance_while_spawns_remain() {
    let plan = WavePlan::new(vec![vec![spec(10), spec(20)], vec![spec(30)]]);
    let mut spawning = Spawning::new(plan, Config::new(Duration::from_millis(1000)));
    let mut commands = Vec::new();
    let mut events = Vec::new();
    spawning.start(Duration::ZERO, &mut commands, &mut events);
    events.clear();

    spawning.check_progress(Duration::from_millis(500), 0, &mut commands, &mut events);

    assert!(events.is_empty());
    assert_eq!(
        spawning.phase(),
        WavePhase::Spawning {
            wave: WaveIndex::new(0),
            spawned: 1
        }
    );
}

#[test]
fn cleared_wave_starts_the_next_with_an_immediate_spawn() {
    let plan = WavePlan::new(vec![vec![spec(10)], vec![spec(30), spec(40)]]);
    let mut spawning = Spawning::new(plan, Config::new(Duration::from_millis(1000)));
    let mut commands = Vec::new();
    let mut events = Vec::new();
    spawning.start(Duration::ZERO, &mut commands, &mut events);
    commands.clear();
    events.clear();

    spawning.check_progress(Duration::from_millis(200), 1, &mut commands, &mut events);
    assert!(events.is_empty(), "live enemies hold the wave open");

    spawning.check_progress(Duration::from_millis(300), 0, &mut commands, &mut events);
    assert_eq!(
        events,
        vec![
            Event::WaveCleared {
                wave: WaveIndex::new(0)
            },
            Event::WaveStarted {
                wave: WaveIndex::new(1)
            },
        ]
    );
    assert_eq!(
        commands,
        vec![Command::SpawnEnemy {
            wave: WaveIndex::new(1),
            spec: spec(30),
        }]
    );

    // The delay is measured from the immediate spawn of the new wave.
    commands.clear();
    spawning.handle(&[tick(1300)], &mut commands);
    assert!(commands.is_empty());
    spawning.handle(&[tick(1301)], &mut commands);
    assert_eq!(commands.len(), 1);
}

#[test]
fn clearing_the_final_wave_completes_the_schedule() {
    let plan = WavePlan::new(vec![vec![spec(10)]]);
    let mut spawning = Spawning::new(plan, Config::new(Duration::from_millis(1000)));
    let mut commands = Vec::new();
    let mut events = Vec::new();
    spawning.start(Duration::ZERO, &mut commands, &mut events);
    events.clear();

    spawning.check_progress(Duration::from_millis(50), 0, &mut commands, &mut events);

    assert_eq!(
        events,
        vec![
            Event::WaveCleared {
                wave: WaveIndex::new(0)
            },
            Event::AllWavesComplete,
        ]
    );
    assert!(spawning.is_complete());
}

#[test]
fn spawn_commands_create_enemies_in_the_world() {
    let settings = Settings::default();
    let mut world = World::new(&settings).expect("default settings are valid");
    let mut spawning = Spawning::new(
        settings.wave_plan().expect("default waves are valid"),
        Config::new(settings.spawn_delay()),
    );
    let mut commands = Vec::new();
    let mut events = Vec::new();
    spawning.start(query::clock(&world), &mut commands, &mut events);

    for command in commands.drain(..) {
        world::apply(&mut world, command, &mut events);
    }

    assert_eq!(query::enemy_count(&world), 1);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemySpawned { .. })));
}
