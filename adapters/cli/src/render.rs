//! ASCII rendering of map layouts and worlds.

use std::fmt::Write as _;

use frontier_core::{Coord, MapLayout, PlayerId, Resource, Terrain, TileSpec, UnitKind};
use frontier_world::{query, World};

const FOG: char = ' ';
const CITY: char = '@';

fn terrain_glyph(terrain: Terrain) -> char {
    match terrain {
        Terrain::Field => '.',
        Terrain::Hill => 'n',
        Terrain::Swamp => '%',
        Terrain::Water => '~',
        Terrain::Mountain => '^',
    }
}

fn resource_glyph(resource: Resource) -> char {
    match resource {
        Resource::Wheat => 'w',
        Resource::Horse => 'h',
        Resource::Iron => 'i',
    }
}

fn unit_glyph(kind: UnitKind) -> char {
    match kind {
        UnitKind::Settler => 'S',
        UnitKind::Scout => 'C',
        UnitKind::Warrior => 'W',
        UnitKind::Militia => 'L',
        UnitKind::Swordsman => 'X',
        UnitKind::Cavalry => 'H',
    }
}

fn spec_glyph(spec: &TileSpec) -> char {
    spec.resource
        .map_or_else(|| terrain_glyph(spec.terrain), resource_glyph)
}

/// Renders a layout one row per line.
pub(crate) fn render_layout(layout: &MapLayout) -> String {
    let size = i32::try_from(layout.size()).unwrap_or(i32::MAX);
    let mut out = String::new();
    for y in 0..size {
        for x in 0..size {
            out.push(layout.tile(Coord::new(x, y)).map_or(FOG, spec_glyph));
        }
        out.push('\n');
    }
    out
}

/// Renders the world, hiding tiles `viewer` has never revealed.
pub(crate) fn render_world(world: &World, viewer: Option<PlayerId>) -> String {
    let size = i32::try_from(query::size(world)).unwrap_or(i32::MAX);
    let mut out = String::new();
    for y in 0..size {
        for x in 0..size {
            out.push(world_glyph(world, Coord::new(x, y), viewer));
        }
        out.push('\n');
    }
    out
}

fn world_glyph(world: &World, at: Coord, viewer: Option<PlayerId>) -> char {
    let Some(tile) = query::tile_at(world, at) else {
        return FOG;
    };
    if viewer.is_some_and(|player| !tile.is_revealed_to(player)) {
        return FOG;
    }
    if let Some(unit) = query::unit_at(world, at) {
        return unit_glyph(unit.kind());
    }
    if tile.is_city() {
        return CITY;
    }
    tile.resource()
        .map_or_else(|| terrain_glyph(tile.terrain()), resource_glyph)
}

/// Renders one status line per player.
pub(crate) fn render_summaries(world: &World) -> String {
    let mut out = String::new();
    for player in query::players(world) {
        let Some(summary) = query::player_summary(world, player.id()) else {
            continue;
        };
        let _ = writeln!(
            out,
            "{:<16} {:?}  units {:>3}  cities {:>2}  explored {:>4}{}",
            summary.name,
            summary.controller,
            summary.units,
            summary.cities,
            summary.revealed_tiles,
            if summary.in_rotation { "" } else { "  (eliminated)" },
        );
    }
    out
}
