#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Lane Defense adapters.

use std::time::Duration;

use anyhow::Result as AnyResult;
use glam::Vec2;
use lane_defense_core::{
    EnemyArchetype, EnemyId, EnemyView, Event, Health, Money, Path, PlacementGrid, ProjectileId,
    ProjectileView, TowerId, TowerKind, TowerProfile, TowerSnapshot, TowerView,
};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Color of the enemy path overlay.
pub const PATH_COLOR: Color = Color::from_rgb_u8(0, 128, 0);
/// Stroke width of the enemy path overlay.
pub const PATH_WIDTH: f32 = 5.0;
/// Color of the tower slot markers.
pub const SLOT_COLOR: Color = Color::from_rgb_u8(128, 0, 0);
/// Radius of the tower slot markers.
pub const SLOT_RADIUS: f32 = 10.0;
/// Color of hover labels.
pub const LABEL_COLOR: Color = Color::from_rgb_u8(255, 255, 255);
/// Vertical distance between consecutive hover label lines.
pub const LABEL_LINE_HEIGHT: f32 = 20.0;

/// Rotation in degrees that turns a sprite drawn facing up so it faces `to`
/// when placed at `from`.
///
/// Angles are counter-clockwise in screen space, where `y` grows downwards.
#[must_use]
pub fn sprite_rotation_degrees(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    -delta.y.atan2(delta.x).to_degrees() - 90.0
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Cursor position expressed in world units.
    pub cursor: Option<Vec2>,
    /// Tower type the player asked to place at the cursor on this frame.
    pub place: Option<TowerKind>,
    /// Whether the player requested an upgrade of the hovered tower.
    pub upgrade: bool,
}

/// Enemy sprite within the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEnemy {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Sprite family.
    pub archetype: EnemyArchetype,
    /// Sprite centre.
    pub position: Vec2,
    /// Sprite rotation facing the direction of travel.
    pub rotation_degrees: f32,
    /// Remaining health.
    pub health: Health,
    /// Health at spawn.
    pub max_health: Health,
}

/// Tower sprite within the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTower {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Sprite family.
    pub kind: TowerKind,
    /// Sprite centre.
    pub position: Vec2,
    /// Sprite rotation facing the last shot, or zero before the first one.
    pub rotation_degrees: f32,
    /// Whether the cursor lies within the tower's grid cell.
    pub hovered: bool,
}

/// Projectile sprite within the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneProjectile {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Sprite centre.
    pub position: Vec2,
    /// Sprite rotation facing the destination.
    pub rotation_degrees: f32,
}

/// Polyline drawn under the sprites to show where enemies walk.
#[derive(Clone, Debug, PartialEq)]
pub struct PathOverlay {
    /// Waypoints of the path in order.
    pub waypoints: Vec<Vec2>,
    /// Stroke color.
    pub color: Color,
    /// Stroke width.
    pub width: f32,
}

/// Text lines shown next to the hovered tower.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverLabels {
    /// Tower the labels describe.
    pub tower: TowerId,
    /// Top-left anchor of the first line.
    pub anchor: Vec2,
    /// Lines of text from top to bottom.
    pub lines: Vec<String>,
    /// Text color.
    pub color: Color,
}

impl HoverLabels {
    /// Builds the labels for `tower`, anchored above its grid cell.
    #[must_use]
    pub fn for_tower(tower: &TowerSnapshot, grid: &PlacementGrid) -> Self {
        let mut lines = Vec::with_capacity(3);
        if let TowerProfile::Combat { damage, range, .. } = tower.profile {
            lines.push(format!("Damage: {damage}, Range: {range}"));
        }
        lines.push(format!("Level: {}", tower.level));
        lines.push(format!("Upgrade: {}", tower.upgrade_cost()));

        let half = grid.cell_length() / 2.0;
        let top_left = tower.position - Vec2::splat(half);
        Self {
            tower: tower.id,
            anchor: top_left - Vec2::new(0.0, LABEL_LINE_HEIGHT * lines.len() as f32),
            lines,
            color: LABEL_COLOR,
        }
    }
}

/// Read-only inputs a scene is composed from.
#[derive(Clone, Copy, Debug)]
pub struct SceneSources<'a> {
    /// Placement grid of the level.
    pub grid: &'a PlacementGrid,
    /// Path enemies follow.
    pub path: &'a Path,
    /// Suggested tower positions.
    pub tower_slots: &'a [Vec2],
    /// Live enemies.
    pub enemies: &'a EnemyView,
    /// Placed towers.
    pub towers: &'a TowerView,
    /// Projectiles in flight.
    pub projectiles: &'a ProjectileView,
    /// Money available.
    pub money: Money,
    /// Cursor position, if known.
    pub cursor: Option<Vec2>,
}

/// Declarative description of everything a backend draws in a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Placement grid, used for sizing the window.
    pub grid: PlacementGrid,
    /// Enemy path overlay.
    pub path: PathOverlay,
    /// Tower slot markers.
    pub tower_slots: Vec<Vec2>,
    /// Enemies in spawn order.
    pub enemies: Vec<SceneEnemy>,
    /// Towers in placement order.
    pub towers: Vec<SceneTower>,
    /// Projectiles in firing order.
    pub projectiles: Vec<SceneProjectile>,
    /// Labels of the hovered tower, if any.
    pub hover: Option<HoverLabels>,
    /// Money available.
    pub money: Money,
}

impl Scene {
    /// Composes a scene from world snapshots.
    #[must_use]
    pub fn compose(sources: SceneSources<'_>) -> Self {
        let enemies = sources
            .enemies
            .iter()
            .map(|enemy| {
                let heading = sources
                    .path
                    .waypoint(enemy.path_index + 1)
                    .unwrap_or(enemy.position);
                SceneEnemy {
                    id: enemy.id,
                    archetype: enemy.archetype,
                    position: enemy.position,
                    rotation_degrees: if heading == enemy.position {
                        0.0
                    } else {
                        sprite_rotation_degrees(enemy.position, heading)
                    },
                    health: enemy.health,
                    max_health: enemy.max_health,
                }
            })
            .collect();

        let mut hover = None;
        let towers = sources
            .towers
            .iter()
            .map(|tower| {
                let hovered = sources.cursor.is_some_and(|cursor| {
                    sources.grid.cell_contains_point(tower.cell, cursor)
                });
                if hovered && hover.is_none() {
                    hover = Some(HoverLabels::for_tower(tower, sources.grid));
                }
                SceneTower {
                    id: tower.id,
                    kind: tower.kind,
                    position: tower.position,
                    rotation_degrees: tower
                        .aim
                        .map_or(0.0, |aim| sprite_rotation_degrees(tower.position, aim)),
                    hovered,
                }
            })
            .collect();

        let projectiles = sources
            .projectiles
            .iter()
            .map(|projectile| SceneProjectile {
                id: projectile.id,
                position: projectile.position,
                rotation_degrees: sprite_rotation_degrees(
                    projectile.position,
                    projectile.destination,
                ),
            })
            .collect();

        Self {
            grid: *sources.grid,
            path: PathOverlay {
                waypoints: sources.path.waypoints().to_vec(),
                color: PATH_COLOR,
                width: PATH_WIDTH,
            },
            tower_slots: sources.tower_slots.to_vec(),
            enemies,
            towers,
            projectiles,
            hover,
            money: sources.money,
        }
    }
}

/// Audio cue triggered by a simulation event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// An enemy entered the lane.
    EnemySpawned,
    /// A tower fired a projectile.
    Shot,
}

impl SoundCue {
    /// Cue associated with `event`, if any.
    #[must_use]
    pub fn for_event(event: &Event) -> Option<Self> {
        match event {
            Event::EnemySpawned { .. } => Some(Self::EnemySpawned),
            Event::ProjectileFired { .. } => Some(Self::Shot),
            _ => None,
        }
    }
}

/// Fire-and-forget consumer of sound cues.
pub trait SoundSink {
    /// Starts playing `cue`. Must not block the simulation.
    fn play(&mut self, cue: SoundCue);
}

/// Forwards the cue of every event in `events` to `sink`, in order.
pub fn dispatch_sound_cues<S>(events: &[Event], sink: &mut S)
where
    S: SoundSink + ?Sized,
{
    for cue in events.iter().filter_map(SoundCue::for_event) {
        sink.play(cue);
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Lane Defense scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta,
    /// per-frame input captured by the adapter, and may mutate the scene before
    /// it is rendered. Returning `false` asks the backend to stop.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> bool + 'static;
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defense_core::{CellCoord, EnemySnapshot, ProjectileSnapshot, WaveIndex};

    fn assert_degrees(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected} degrees, got {actual}"
        );
    }

    fn grid() -> PlacementGrid {
        PlacementGrid::new(4, 4, 50.0)
    }

    fn path() -> Path {
        Path::new(vec![
            Vec2::new(0.0, 25.0),
            Vec2::new(200.0, 25.0),
            Vec2::new(200.0, 200.0),
        ])
        .expect("valid path")
    }

    fn tower(id: u32, kind: TowerKind, cell: CellCoord, aim: Option<Vec2>) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind,
            cell,
            position: grid().cell_center(cell),
            level: 1,
            profile: kind.profile(),
            aim,
        }
    }

    fn compose(towers: &TowerView, enemies: &EnemyView, cursor: Option<Vec2>) -> Scene {
        let grid = grid();
        let path = path();
        Scene::compose(SceneSources {
            grid: &grid,
            path: &path,
            tower_slots: &[Vec2::new(75.0, 75.0)],
            enemies,
            towers,
            projectiles: &ProjectileView::default(),
            money: Money::new(120),
            cursor,
        })
    }

    #[test]
    fn rotation_turns_up_facing_sprites_toward_the_target() {
        let origin = Vec2::new(100.0, 100.0);
        assert_degrees(sprite_rotation_degrees(origin, Vec2::new(200.0, 100.0)), -90.0);
        assert_degrees(sprite_rotation_degrees(origin, Vec2::new(100.0, 0.0)), 0.0);
        assert_degrees(sprite_rotation_degrees(origin, Vec2::new(0.0, 100.0)), -270.0);
    }

    #[test]
    fn hovered_combat_tower_shows_stats_level_and_upgrade_cost() {
        let towers = TowerView::from_snapshots(vec![tower(
            0,
            TowerKind::Basic,
            CellCoord::new(1, 2),
            None,
        )]);
        let scene = compose(&towers, &EnemyView::default(), Some(Vec2::new(60.0, 140.0)));

        let hover = scene.hover.expect("tower is hovered");
        assert_eq!(
            hover.lines,
            vec![
                "Damage: 20, Range: 150".to_owned(),
                "Level: 1".to_owned(),
                "Upgrade: $50".to_owned(),
            ]
        );
        assert_eq!(hover.anchor, Vec2::new(50.0, 40.0));
        assert!(scene.towers[0].hovered);
    }

    #[test]
    fn income_tower_labels_skip_combat_stats() {
        let towers = TowerView::from_snapshots(vec![tower(
            0,
            TowerKind::Money,
            CellCoord::new(0, 0),
            None,
        )]);
        let scene = compose(&towers, &EnemyView::default(), Some(Vec2::new(10.0, 10.0)));

        let hover = scene.hover.expect("tower is hovered");
        assert_eq!(hover.lines, vec!["Level: 1".to_owned(), "Upgrade: $50".to_owned()]);
    }

    #[test]
    fn cursor_outside_every_cell_shows_no_labels() {
        let towers = TowerView::from_snapshots(vec![tower(
            0,
            TowerKind::Sniper,
            CellCoord::new(0, 0),
            Some(Vec2::new(125.0, 25.0)),
        )]);
        let scene = compose(&towers, &EnemyView::default(), Some(Vec2::new(180.0, 180.0)));

        assert!(scene.hover.is_none());
        assert!(!scene.towers[0].hovered);
        assert_degrees(scene.towers[0].rotation_degrees, -90.0);
        assert_eq!(scene.path.waypoints.len(), 3);
        assert_eq!(scene.tower_slots, vec![Vec2::new(75.0, 75.0)]);
        assert_eq!(scene.money, Money::new(120));
    }

    #[test]
    fn enemies_face_their_next_waypoint() {
        let enemies = EnemyView::from_snapshots(vec![EnemySnapshot {
            id: EnemyId::new(0),
            position: Vec2::new(200.0, 100.0),
            path_index: 1,
            health: Health::new(40),
            max_health: Health::new(50),
            speed: 2.0,
            reward: Money::new(10),
            archetype: EnemyArchetype::Fast,
        }]);
        let scene = compose(&TowerView::default(), &enemies, None);

        assert_degrees(scene.enemies[0].rotation_degrees, -180.0);
        assert_eq!(scene.enemies[0].health, Health::new(40));
    }

    #[test]
    fn projectiles_face_their_destination() {
        let grid = grid();
        let path = path();
        let projectiles = ProjectileView::from_snapshots(vec![ProjectileSnapshot {
            id: ProjectileId::new(2),
            tower: TowerId::new(0),
            position: Vec2::new(10.0, 10.0),
            destination: Vec2::new(60.0, 10.0),
            damage: 20,
        }]);
        let scene = Scene::compose(SceneSources {
            grid: &grid,
            path: &path,
            tower_slots: &[],
            enemies: &EnemyView::default(),
            towers: &TowerView::default(),
            projectiles: &projectiles,
            money: Money::ZERO,
            cursor: None,
        });

        assert_degrees(scene.projectiles[0].rotation_degrees, -90.0);
    }

    #[derive(Default)]
    struct RecordingSink {
        cues: Vec<SoundCue>,
    }

    impl SoundSink for RecordingSink {
        fn play(&mut self, cue: SoundCue) {
            self.cues.push(cue);
        }
    }

    #[test]
    fn spawn_and_fire_events_become_sound_cues() {
        let events = [
            Event::EnemySpawned {
                enemy: EnemyId::new(0),
                wave: WaveIndex::new(0),
                position: Vec2::ZERO,
            },
            Event::LevelFailed,
            Event::ProjectileFired {
                projectile: ProjectileId::new(0),
                tower: TowerId::new(0),
                from: Vec2::ZERO,
                destination: Vec2::ONE,
            },
        ];
        let mut sink = RecordingSink::default();

        dispatch_sound_cues(&events, &mut sink);

        assert_eq!(sink.cues, vec![SoundCue::EnemySpawned, SoundCue::Shot]);
    }
}
