#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text renderers for Skirmish diagnostics.
//!
//! Both renderers implement [`fmt::Display`], so they can be printed, written
//! to any formatter, or collected with `to_string()` for comparisons.

use std::fmt::{self, Write as _};

use skirmish_core::{CellCoord, Tile};
use skirmish_system_pathfinding::{DistanceMap, Reach};
use skirmish_world::{query, World};

/// Renders the battlefield one row per line using the layout alphabet.
///
/// With hit points enabled, every row holding units is followed by three
/// spaces and the units of that row in reading order, e.g. `E(197), G(200)`.
#[derive(Clone, Copy, Debug)]
pub struct GridDump<'a> {
    world: &'a World,
    hit_points: bool,
}

impl<'a> GridDump<'a> {
    /// Creates a renderer that prints terrain and units only.
    #[must_use]
    pub const fn new(world: &'a World) -> Self {
        Self {
            world,
            hit_points: false,
        }
    }

    /// Enables or disables per-row hit point annotations.
    #[must_use]
    pub fn with_hit_points(mut self, enabled: bool) -> Self {
        self.hit_points = enabled;
        self
    }
}

impl fmt::Display for GridDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (columns, rows) = query::dimensions(self.world);
        let mut stats = String::new();

        for row in 0..rows {
            stats.clear();
            for column in 0..columns {
                let cell = CellCoord::new(column, row);
                let glyph = match query::unit_at(self.world, cell) {
                    Some(unit) => {
                        if self.hit_points {
                            stats.push_str(if stats.is_empty() { "   " } else { ", " });
                            write!(stats, "{}({})", unit.team.glyph(), unit.hit_points)?;
                        }
                        unit.team.glyph()
                    }
                    None => match query::tile_at(self.world, cell) {
                        Some(Tile::Wall) => '#',
                        Some(Tile::Open) | None => '.',
                    },
                };
                f.write_char(glyph)?;
            }
            writeln!(f, "{stats}")?;
        }
        Ok(())
    }
}

/// Renders the slots of a distance map right-aligned in three columns.
///
/// Unreached slots print as `.`, blocked slots as `#` and reached slots as
/// their distance from the flood origin.
#[derive(Clone, Copy, Debug)]
pub struct DistanceMapDump<'a>(pub &'a DistanceMap);

impl fmt::Display for DistanceMapDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (columns, _) = self.0.dimensions();
        let width = usize::try_from(columns).map_err(|_| fmt::Error)?;
        if width == 0 {
            return Ok(());
        }

        for row in self.0.slots().chunks(width) {
            for slot in row {
                match slot {
                    Reach::Unreached => f.write_str("  .")?,
                    Reach::Blocked => f.write_str("  #")?,
                    Reach::Steps(distance) => write!(f, "{distance:>3}")?,
                }
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}
