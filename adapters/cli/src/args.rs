//! Parsers for structured command-line values.

use std::str::FromStr;

use anyhow::{bail, Context, Error};
use glam::Vec2;

/// World-space point written as `X,Y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Point(pub(crate) Vec2);

impl FromStr for Point {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (x, y) = value
            .split_once(',')
            .with_context(|| format!("expected `X,Y`, found `{value}`"))?;
        let x: f32 = x
            .trim()
            .parse()
            .with_context(|| format!("invalid x coordinate `{x}`"))?;
        let y: f32 = y
            .trim()
            .parse()
            .with_context(|| format!("invalid y coordinate `{y}`"))?;
        if !x.is_finite() || !y.is_finite() {
            bail!("coordinates must be finite, found `{value}`");
        }
        Ok(Self(Vec2::new(x, y)))
    }
}

/// Tower placement written as `KIND@X,Y`.
///
/// The tower type name is kept verbatim so the level decides whether it is
/// known.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PlacementRequest {
    pub(crate) tower_type: String,
    pub(crate) at: Vec2,
}

impl FromStr for PlacementRequest {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (tower_type, point) = value
            .split_once('@')
            .with_context(|| format!("expected `KIND@X,Y`, found `{value}`"))?;
        let tower_type = tower_type.trim();
        if tower_type.is_empty() {
            bail!("missing tower type in `{value}`");
        }
        let Point(at) = point.parse()?;
        Ok(Self {
            tower_type: tower_type.to_owned(),
            at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_points_with_whitespace() {
        let point: Point = " 12.5, 40 ".parse().expect("valid point");
        assert_eq!(point, Point(Vec2::new(12.5, 40.0)));
    }

    #[test]
    fn rejects_malformed_points() {
        assert!("12".parse::<Point>().is_err());
        assert!("a,3".parse::<Point>().is_err());
        assert!("inf,3".parse::<Point>().is_err());
    }

    #[test]
    fn parses_placement_requests() {
        let request: PlacementRequest = "Sniper@225,425".parse().expect("valid request");
        assert_eq!(request.tower_type, "Sniper");
        assert_eq!(request.at, Vec2::new(225.0, 425.0));
    }

    #[test]
    fn keeps_unknown_tower_names_for_the_level_to_reject() {
        let request: PlacementRequest = "laser@1,1".parse().expect("syntactically valid");
        assert_eq!(request.tower_type, "laser");
    }

    #[test]
    fn rejects_malformed_placements() {
        assert!("basic".parse::<PlacementRequest>().is_err());
        assert!("@1,1".parse::<PlacementRequest>().is_err());
        assert!("basic@1".parse::<PlacementRequest>().is_err());
    }
}
