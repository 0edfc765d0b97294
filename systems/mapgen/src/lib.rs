#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Map generation system that produces the tile grid a game is played on.
//!
//! Maps come from one of two places: a seeded procedural generator that
//! partitions the board into soft geographic regions, or the textual map
//! description format used for hand-authored boards. Both produce a
//! [`MapLayout`]; the world takes ownership of it and never consults this
//! crate again.

use frontier_core::{
    default_start_coords, Coord, MapLayout, MapParseError, MapSource, Resource, Terrain, TileSpec,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Tuning knobs for the procedural generator.
///
/// Every tile draws a roll in `0..roll_sides`; the thresholds below decide
/// what the roll becomes inside each region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapGenConfig {
    /// Number of faces on the per-tile die.
    pub roll_sides: u32,
    /// Rolls below this value turn wet corner tiles into water.
    pub corner_water_below: u32,
    /// Rolls at or above this value turn wet corner tiles into fields instead of swamp.
    pub corner_field_from: u32,
    /// Rolls at or above this value turn ridge tiles into hills.
    pub ridge_hill_from: u32,
    /// Rolls at or above this value turn ridge tiles into mountains instead of hills.
    pub ridge_mountain_from: u32,
    /// Roll that places a resource on tiles with odd x and odd y.
    pub resource_roll: u32,
}

impl Default for MapGenConfig {
    fn default() -> Self {
        Self {
            roll_sides: 10,
            corner_water_below: 3,
            corner_field_from: 8,
            ridge_hill_from: 4,
            ridge_mountain_from: 9,
            resource_roll: 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Region {
    WetCorner,
    Ridge,
    Lowland,
}

/// Builds the layout described by the map source.
///
/// Procedural maps keep every coordinate in `starts` passable; an empty slice
/// protects the default inner corners.
pub fn layout_for(source: &MapSource, starts: &[Coord]) -> Result<MapLayout, MapParseError> {
    match source {
        MapSource::Procedural { size, seed } => {
            if *size < 3 {
                return Err(MapParseError::InvalidSize(size.to_string()));
            }
            Ok(generate(*size, *seed, &MapGenConfig::default(), starts))
        }
        MapSource::Description { text } => parse_description(text),
        MapSource::Layout { layout } => Ok(layout.clone()),
    }
}

/// Procedurally generates a square map.
///
/// The two wet corners lean towards swamp and water, the anti-diagonal band
/// leans towards hills and mountains, and the rest is mostly field. The outer
/// ring is always water and each start coordinate is forced to plain field.
#[must_use]
pub fn generate(size: u32, seed: u64, config: &MapGenConfig, starts: &[Coord]) -> MapLayout {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut layout = MapLayout::filled(size, Terrain::Field);
    let sides = config.roll_sides.max(1);

    let side = i32::try_from(size).unwrap_or(i32::MAX);
    for y in 0..side {
        for x in 0..side {
            let coord = Coord::new(x, y);
            let roll = rng.gen_range(0..sides);
            let spec = roll_tile(region_of(coord, size), roll, coord, config);
            let _ = layout.set_tile(coord, spec);
        }
    }

    let last = side.saturating_sub(1);
    for index in 0..=last {
        for coord in [
            Coord::new(index, 0),
            Coord::new(0, index),
            Coord::new(index, last),
            Coord::new(last, index),
        ] {
            let _ = layout.set_tile(coord, TileSpec::plain(Terrain::Water));
        }
    }

    let defaults = default_start_coords(size);
    let protected = if starts.is_empty() { &defaults[..] } else { starts };
    for start in protected {
        let _ = layout.set_tile(*start, TileSpec::plain(Terrain::Field));
    }

    tracing::debug!(size, seed, "generated procedural map");
    layout
}

fn region_of(coord: Coord, size: u32) -> Region {
    let size = i64::from(size);
    let one_third = size / 3;
    let two_thirds = size * 2 / 3;
    let (x, y) = (i64::from(coord.x()), i64::from(coord.y()));

    let top_corner = y < one_third && x < one_third;
    let bottom_corner = y > two_thirds && x > two_thirds;
    if top_corner || bottom_corner {
        return Region::WetCorner;
    }

    let sum = x + y;
    if sum > size - one_third && sum < size + one_third {
        Region::Ridge
    } else {
        Region::Lowland
    }
}

fn roll_tile(region: Region, roll: u32, coord: Coord, config: &MapGenConfig) -> TileSpec {
    let resource_site =
        roll == config.resource_roll && coord.x() % 2 == 1 && coord.y() % 2 == 1;
    match region {
        Region::WetCorner if roll < config.corner_water_below => TileSpec::plain(Terrain::Water),
        Region::WetCorner if resource_site => {
            TileSpec::with_resource(Terrain::Swamp, Resource::Horse)
        }
        Region::WetCorner if roll < config.corner_field_from => TileSpec::plain(Terrain::Swamp),
        Region::WetCorner => TileSpec::plain(Terrain::Field),
        Region::Ridge if roll >= config.ridge_hill_from => {
            if resource_site {
                TileSpec::with_resource(Terrain::Hill, Resource::Iron)
            } else if roll < config.ridge_mountain_from {
                TileSpec::plain(Terrain::Hill)
            } else {
                TileSpec::plain(Terrain::Mountain)
            }
        }
        Region::Ridge | Region::Lowland if resource_site => {
            TileSpec::with_resource(Terrain::Field, Resource::Wheat)
        }
        Region::Ridge | Region::Lowland => TileSpec::plain(Terrain::Field),
    }
}

/// Parses the textual map description format.
///
/// The first line holds the board size; each following line describes one
/// tile as `"<terrain> [<resource>]"`. Tiles are listed column by column:
/// the first `size` lines are x = 0 with y counting up, the next `size`
/// lines are x = 1, and so on. Blank lines are ignored.
pub fn parse_description(text: &str) -> Result<MapLayout, MapParseError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (_, size_line) = lines.next().ok_or(MapParseError::MissingSize)?;
    let size: u32 = size_line
        .parse()
        .ok()
        .filter(|size| *size > 0)
        .ok_or_else(|| MapParseError::InvalidSize(size_line.to_owned()))?;

    let expected = usize::try_from(u64::from(size) * u64::from(size)).unwrap_or(usize::MAX);
    let mut layout = MapLayout::filled(size, Terrain::Field);
    let mut found = 0_usize;
    let side = usize::try_from(size).unwrap_or(usize::MAX);

    for (line_number, line) in lines {
        let mut tokens = line.split_whitespace();
        let terrain_token = tokens.next().unwrap_or_default();
        let terrain =
            Terrain::from_token(terrain_token).ok_or_else(|| MapParseError::UnknownTerrain {
                line: line_number,
                token: terrain_token.to_owned(),
            })?;
        let resource = match tokens.next() {
            None => None,
            Some(token) => Some(Resource::from_token(token).ok_or_else(|| {
                MapParseError::UnknownResource {
                    line: line_number,
                    token: token.to_owned(),
                }
            })?),
        };

        if found < expected {
            let x = i32::try_from(found / side).unwrap_or(i32::MAX);
            let y = i32::try_from(found % side).unwrap_or(i32::MAX);
            let _ = layout.set_tile(Coord::new(x, y), TileSpec { terrain, resource });
        }
        found += 1;
    }

    if found != expected {
        return Err(MapParseError::TileCount { expected, found });
    }

    Ok(layout)
}

/// Writes a layout back out in the textual map description format.
#[must_use]
pub fn describe(layout: &MapLayout) -> String {
    let size = layout.size();
    let mut out = format!("{size}\n");
    let side = i32::try_from(size).unwrap_or(i32::MAX);
    for x in 0..side {
        for y in 0..side {
            if let Some(spec) = layout.tile(Coord::new(x, y)) {
                out.push_str(spec.terrain.token());
                if let Some(resource) = spec.resource {
                    out.push(' ');
                    out.push_str(resource.token());
                }
                out.push('\n');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_follow_corners_and_ridge() {
        assert_eq!(region_of(Coord::new(1, 1), 20), Region::WetCorner);
        assert_eq!(region_of(Coord::new(18, 18), 20), Region::WetCorner);
        assert_eq!(region_of(Coord::new(10, 10), 20), Region::Ridge);
        assert_eq!(region_of(Coord::new(2, 10), 20), Region::Lowland);
    }

    #[test]
    fn resources_only_appear_on_odd_coordinates() {
        let config = MapGenConfig::default();
        let odd = roll_tile(Region::Lowland, config.resource_roll, Coord::new(3, 5), &config);
        let even = roll_tile(Region::Lowland, config.resource_roll, Coord::new(4, 5), &config);
        assert_eq!(odd, TileSpec::with_resource(Terrain::Field, Resource::Wheat));
        assert_eq!(even, TileSpec::plain(Terrain::Field));
    }

    #[test]
    fn ridge_rolls_map_to_hills_and_mountains() {
        let config = MapGenConfig::default();
        let coord = Coord::new(2, 2);
        assert_eq!(
            roll_tile(Region::Ridge, 9, coord, &config).terrain,
            Terrain::Mountain
        );
        assert_eq!(
            roll_tile(Region::Ridge, 5, coord, &config).terrain,
            Terrain::Hill
        );
        assert_eq!(
            roll_tile(Region::Ridge, 1, coord, &config).terrain,
            Terrain::Field
        );
    }

    #[test]
    fn wet_corner_low_rolls_become_water() {
        let config = MapGenConfig::default();
        let coord = Coord::new(1, 2);
        assert_eq!(
            roll_tile(Region::WetCorner, 0, coord, &config).terrain,
            Terrain::Water
        );
        assert_eq!(
            roll_tile(Region::WetCorner, 5, coord, &config).terrain,
            Terrain::Swamp
        );
        assert_eq!(
            roll_tile(Region::WetCorner, 8, coord, &config).terrain,
            Terrain::Field
        );
    }

    #[test]
    fn procedural_source_rejects_tiny_boards() {
        let source = MapSource::Procedural { size: 2, seed: 1 };
        assert!(matches!(
            layout_for(&source, &[]),
            Err(MapParseError::InvalidSize(_))
        ));
    }
}
