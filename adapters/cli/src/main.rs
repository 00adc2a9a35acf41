#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Lane Defense levels without a window.

mod args;
mod config;
mod headless;
mod telemetry;

use std::{cell::Cell, path::PathBuf, rc::Rc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use lane_defense_core::{Settings, TowerKind};
use lane_defense_level::{Level, Outcome};
use lane_defense_rendering::{
    dispatch_sound_cues, Color, FrameInput, Presentation, RenderingBackend, Scene, SceneSources,
};
use lane_defense_system_builder::BuilderInput;
use lane_defense_world::query;
use tracing::{info, warn};

use self::{
    args::{PlacementRequest, Point},
    headless::{HeadlessBackend, TracingSoundSink},
};

/// Plays a Lane Defense level headlessly and reports the outcome.
#[derive(Debug, Parser)]
#[command(name = "lane-defense", version)]
struct Cli {
    /// TOML file describing the level; the built-in level is used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Simulated milliseconds per frame.
    #[arg(long, value_name = "MS", default_value_t = 16)]
    frame_ms: u64,

    /// Frames to simulate before giving up on a result.
    #[arg(long, value_name = "COUNT", default_value_t = 100_000)]
    max_frames: u64,

    /// Places a tower before the first frame, e.g. `basic@225,225`.
    #[arg(long = "place", value_name = "KIND@X,Y")]
    place: Vec<PlacementRequest>,

    /// Upgrades the tower under a point once every placement is done.
    #[arg(long = "upgrade-at", value_name = "X,Y")]
    upgrade_at: Vec<Point>,

    /// Log filter directives, overriding `RUST_LOG`.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

/// Entry point for the Lane Defense command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_level.as_deref())?;

    let settings = match &cli.config {
        Some(path) => config::load_settings(path)?,
        None => Settings::default(),
    };
    let mut level = Level::new(&settings).context("failed to build the level")?;
    println!("{}", query::welcome_banner(level.world()));

    prepare(&mut level, &cli.place, &cli.upgrade_at);

    let outcome = Rc::new(Cell::new(level.outcome()));
    let reported = Rc::clone(&outcome);
    let presentation = Presentation::new(
        "Lane Defense",
        Color::from_rgb_u8(0, 0, 0),
        compose_scene(&level, None),
    );
    let mut sink = TracingSoundSink;
    let mut events = Vec::new();

    HeadlessBackend::new(Duration::from_millis(cli.frame_ms), cli.max_frames).run(
        presentation,
        move |dt, input, scene| {
            apply_input(&mut level, &input);
            events.clear();
            level.update(dt, &mut events);
            dispatch_sound_cues(&events, &mut sink);
            *scene = compose_scene(&level, input.cursor);
            reported.set(level.outcome());
            level.outcome() == Outcome::InProgress
        },
    )?;

    match outcome.get() {
        Outcome::Victory => println!("Victory! Every wave was cleared."),
        Outcome::Defeat => println!("Defeat. An enemy reached the end of the path."),
        Outcome::InProgress => println!(
            "Stopped after {} frames without a result.",
            cli.max_frames
        ),
    }
    Ok(())
}

/// Applies the command-line placements and upgrades in order.
///
/// Rejections are logged and skipped.
fn prepare(level: &mut Level, placements: &[PlacementRequest], upgrades: &[Point]) {
    for request in placements {
        match level.attempt_place_tower(request.at, &request.tower_type) {
            Ok(tower) => info!(
                tower = tower.get(),
                tower_type = %request.tower_type,
                money = %level.money(),
                "placed tower"
            ),
            Err(reason) => warn!(tower_type = %request.tower_type, %reason, "skipped placement"),
        }
    }

    for Point(point) in upgrades {
        match level.upgrade_at(*point) {
            Ok(upgrade) => info!(
                tower = upgrade.tower.get(),
                level = upgrade.level,
                cost = %upgrade.cost,
                "upgraded tower"
            ),
            Err(reason) => warn!(x = point.x, y = point.y, %reason, "skipped upgrade"),
        }
    }
}

fn apply_input(level: &mut Level, input: &FrameInput) {
    let builder_input = BuilderInput {
        cursor: input.cursor,
        place: input.place.map(TowerKind::name),
        upgrade: input.upgrade,
    };
    if let Err(reason) = level.handle_input(builder_input) {
        warn!(%reason, "input rejected");
    }
}

fn compose_scene(level: &Level, cursor: Option<Vec2>) -> Scene {
    let world = level.world();
    Scene::compose(SceneSources {
        grid: query::grid(world),
        path: query::path(world),
        tower_slots: query::tower_slots(world),
        enemies: &query::enemy_view(world),
        towers: &query::tower_view(world),
        projectiles: &query::projectile_view(world),
        money: query::money(world),
        cursor,
    })
}
