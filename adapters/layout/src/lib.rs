#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text layout parser that turns cavern maps into validated [`Layout`] values.
//!
//! A layout is a rectangle of `.` (open floor), `#` (wall), `E` (elf) and `G`
//! (goblin) glyphs, one row per line. Leading and trailing blank space around
//! the whole map is ignored; every row must have the same width.

use skirmish_core::{CellCoord, Layout, Placement, Team, Tile};
use thiserror::Error;

/// Errors that can occur while parsing a layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The input contained no rows or only empty rows.
    #[error("layout is empty")]
    Empty,
    /// A row did not match the width of the first row.
    #[error("row {row} is {found} cells wide, expected {expected}")]
    IrregularWidth {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A glyph outside the layout alphabet was found.
    #[error("row {row} has invalid glyph {glyph:?} at column {column}")]
    InvalidGlyph {
        /// Zero-based row of the glyph.
        row: usize,
        /// Zero-based column of the glyph.
        column: usize,
        /// Offending character.
        glyph: char,
    },
    /// The layout does not fit the engine's coordinate range.
    #[error("layout dimension {0} exceeds the supported range")]
    TooLarge(usize),
}

/// Parses a layout from its textual representation.
///
/// Units are listed in reading order, so the world assigns their identifiers
/// in reading order as well.
///
/// # Errors
///
/// Returns [`LayoutError`] when the text is empty, rows differ in width, or a
/// glyph outside `.#EG` appears.
pub fn parse(source: &str) -> Result<Layout, LayoutError> {
    let lines: Vec<&str> = source
        .trim()
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .collect();

    let expected = lines.first().map_or(0, |line| line.chars().count());
    if expected == 0 {
        return Err(LayoutError::Empty);
    }

    let mut tiles = Vec::with_capacity(expected * lines.len());
    let mut placements = Vec::new();

    for (row, line) in lines.iter().enumerate() {
        let found = line.chars().count();
        if found != expected {
            return Err(LayoutError::IrregularWidth {
                row,
                expected,
                found,
            });
        }

        for (column, glyph) in line.chars().enumerate() {
            let (tile, team) = match glyph {
                '.' => (Tile::Open, None),
                '#' => (Tile::Wall, None),
                'E' => (Tile::Open, Some(Team::Elf)),
                'G' => (Tile::Open, Some(Team::Goblin)),
                _ => return Err(LayoutError::InvalidGlyph { row, column, glyph }),
            };
            tiles.push(tile);
            if let Some(team) = team {
                placements.push(Placement {
                    team,
                    cell: CellCoord::new(coordinate(column)?, coordinate(row)?),
                });
            }
        }
    }

    Ok(Layout::new(
        coordinate(expected)?,
        coordinate(lines.len())?,
        tiles,
        placements,
    ))
}

fn coordinate(value: usize) -> Result<u32, LayoutError> {
    u32::try_from(value).map_err(|_| LayoutError::TooLarge(value))
}
