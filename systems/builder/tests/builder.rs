use glam::Vec2;
use lane_defense_core::{Command, PlacementError, TowerId, TowerKind};
use lane_defense_system_builder::{Builder, BuilderInput};

#[test]
fn placement_resolves_the_tower_type_name() {
    let builder = Builder::new();
    let mut commands = Vec::new();

    builder
        .handle(
            BuilderInput::place(Vec2::new(120.0, 80.0), "Sniper"),
            |_| None,
            &mut commands,
        )
        .expect("known tower type");

    assert_eq!(
        commands,
        vec![Command::PlaceTower {
            kind: TowerKind::Sniper,
            at: Vec2::new(120.0, 80.0),
        }],
    );
}

#[test]
fn unknown_tower_type_is_rejected_without_commands() {
    let builder = Builder::new();
    let mut commands = Vec::new();

    let result = builder.handle(
        BuilderInput::place(Vec2::new(10.0, 10.0), "laser"),
        |_| None,
        &mut commands,
    );

    assert_eq!(result, Err(PlacementError::UnknownTowerKind));
    assert!(commands.is_empty(), "unknown names must not emit commands");
}

#[test]
fn upgrade_targets_the_hovered_tower() {
    let builder = Builder::new();
    let mut commands = Vec::new();
    let mut queried = None;

    builder
        .handle(
            BuilderInput::upgrade(Vec2::new(75.0, 25.0)),
            |point| {
                queried = Some(point);
                Some(TowerId::new(3))
            },
            &mut commands,
        )
        .expect("upgrades never fail to resolve");

    assert_eq!(queried, Some(Vec2::new(75.0, 25.0)));
    assert_eq!(
        commands,
        vec![Command::UpgradeTower {
            tower: TowerId::new(3)
        }],
    );
}

#[test]
fn upgrade_without_hovered_tower_is_silent() {
    let builder = Builder::new();
    let mut commands = Vec::new();

    builder
        .handle(BuilderInput::upgrade(Vec2::ZERO), |_| None, &mut commands)
        .expect("upgrades never fail to resolve");

    assert!(commands.is_empty());
}

#[test]
fn missing_cursor_ignores_requests() {
    let builder = Builder::new();
    let mut commands = Vec::new();

    builder
        .handle(
            BuilderInput {
                cursor: None,
                place: Some("basic"),
                upgrade: true,
            },
            |_| Some(TowerId::new(0)),
            &mut commands,
        )
        .expect("nothing to resolve");

    assert!(commands.is_empty());
}
