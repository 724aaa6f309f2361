#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish combat engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems read the battlefield through
//! a [`GridView`] and respond exclusively with [`Command`] values; the world
//! executes those commands via its `apply` entry point and reports every
//! mutation as an [`Event`].
//!
//! Every ordering decision in the engine is expressed through the [`Ord`]
//! implementation of [`CellCoord`], which follows reading order: rows top to
//! bottom, then columns left to right.

use serde::{Deserialize, Serialize};

/// Hit points every unit starts a battle with.
pub const DEFAULT_HIT_POINTS: u32 = 200;

/// Damage dealt by a single attack unless a team override is configured.
pub const DEFAULT_ATTACK_POWER: u32 = 3;

/// Sides taking part in a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    /// Units rendered as `E`.
    Elf,
    /// Units rendered as `G`.
    Goblin,
}

impl Team {
    /// Both teams in a stable order.
    pub const ALL: [Team; 2] = [Team::Elf, Team::Goblin];

    /// Team that units of this team attack.
    #[must_use]
    pub const fn enemy(self) -> Self {
        match self {
            Self::Elf => Self::Goblin,
            Self::Goblin => Self::Elf,
        }
    }

    /// Character used for the team in layouts and renderings.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Elf => 'E',
            Self::Goblin => 'G',
        }
    }

    /// Dense index suitable for per-team arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Elf => 0,
            Self::Goblin => 1,
        }
    }
}

/// Unique identifier assigned to a unit when it is placed.
///
/// Identifiers are dense and never reused within a world, so they double as
/// indices into per-unit arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Position of the unit inside dense per-unit storage.
    #[must_use]
    pub fn index(&self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// The field order is significant: the derived ordering compares rows first
/// and columns second, which is reading order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether `other` shares an edge with this cell.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Orthogonal neighbours inside a `columns` x `rows` grid, in reading order.
    pub fn neighbors(self, columns: u32, rows: u32) -> impl Iterator<Item = CellCoord> {
        let mut candidates = [None; 4];
        let mut count = 0;

        if let Some(row) = self.row.checked_sub(1) {
            candidates[count] = Some(CellCoord::new(self.column, row));
            count += 1;
        }

        if let Some(column) = self.column.checked_sub(1) {
            candidates[count] = Some(CellCoord::new(column, self.row));
            count += 1;
        }

        if let Some(column) = self.column.checked_add(1) {
            if column < columns {
                candidates[count] = Some(CellCoord::new(column, self.row));
                count += 1;
            }
        }

        if let Some(row) = self.row.checked_add(1) {
            if row < rows {
                candidates[count] = Some(CellCoord::new(self.column, row));
                count += 1;
            }
        }

        candidates.into_iter().take(count).flatten()
    }
}

/// Static terrain of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Walkable cavern floor.
    Open,
    /// Impassable rock.
    Wall,
}

/// Contents of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Walkable floor with nobody standing on it.
    Open,
    /// Impassable rock.
    Wall,
    /// Floor occupied by the referenced live unit.
    Occupied(UnitId),
}

impl Cell {
    /// Terrain underneath the cell contents.
    #[must_use]
    pub const fn tile(self) -> Tile {
        match self {
            Self::Wall => Tile::Wall,
            Self::Open | Self::Occupied(_) => Tile::Open,
        }
    }

    /// Identifier of the unit standing on the cell, if any.
    #[must_use]
    pub const fn occupant(self) -> Option<UnitId> {
        match self {
            Self::Occupied(unit) => Some(unit),
            Self::Open | Self::Wall => None,
        }
    }
}

/// State of a single live combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Unit {
    /// Identifier assigned when the unit was placed.
    pub id: UnitId,
    /// Side the unit fights for.
    pub team: Team,
    /// Grid cell currently occupied by the unit.
    pub cell: CellCoord,
    /// Remaining hit points; always positive for a live unit.
    pub hit_points: u32,
}

/// Read-only view into the battlefield used by systems.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [Cell],
    units: &'a [Option<Unit>],
    columns: u32,
    rows: u32,
}

impl<'a> GridView<'a> {
    /// Captures a new view backed by the provided cell and unit slices.
    ///
    /// `cells` is stored in row-major order and `units` is indexed by
    /// [`UnitId::index`], holding `None` for units that died.
    #[must_use]
    pub fn new(cells: &'a [Cell], units: &'a [Option<Unit>], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            units,
            columns,
            rows,
        }
    }

    /// Contents of the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<Cell> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Live unit with the provided identifier.
    #[must_use]
    pub fn unit(&self, unit: UnitId) -> Option<&'a Unit> {
        self.units.get(unit.index()).and_then(Option::as_ref)
    }

    /// Live unit standing on the provided cell.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<&'a Unit> {
        self.cell(cell)
            .and_then(Cell::occupant)
            .and_then(|unit| self.unit(unit))
    }

    /// Reports whether the cell is floor with nobody on it.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.cell(cell) == Some(Cell::Open)
    }

    /// Orthogonal neighbours of `cell` that lie inside the grid, in reading order.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        cell.neighbors(self.columns, self.rows)
    }

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Starting position of a unit described by a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    /// Side the unit fights for.
    pub team: Team,
    /// Cell the unit starts on.
    pub cell: CellCoord,
}

/// Validated starting configuration of a battle.
///
/// Layouts are produced by the layout adapter; the engine assumes the tile
/// vector matches the dimensions and that every placement sits on open floor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
    placements: Vec<Placement>,
}

impl Layout {
    /// Creates a layout from row-major tiles and unit placements.
    #[must_use]
    pub fn new(columns: u32, rows: u32, tiles: Vec<Tile>, placements: Vec<Placement>) -> Self {
        Self {
            columns,
            rows,
            tiles,
            placements,
        }
    }

    /// Number of columns in the layout.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the layout.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Terrain in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Unit placements in the order they should be created.
    #[must_use]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Creates a new unit with the configured starting hit points.
    PlaceUnit {
        /// Side the new unit fights for.
        team: Team,
        /// Open cell the unit is placed on.
        cell: CellCoord,
    },
    /// Moves a live unit onto an open cell.
    MoveUnit {
        /// Unit being moved.
        unit: UnitId,
        /// Destination cell, which must be open.
        to: CellCoord,
    },
    /// Applies one attack from `attacker` to an adjacent enemy.
    Attack {
        /// Unit dealing damage with its team's attack power.
        attacker: UnitId,
        /// Adjacent enemy receiving the damage.
        target: UnitId,
    },
    /// Removes the unit occupying the provided cell.
    RemoveUnit {
        /// Occupied cell to clear.
        cell: CellCoord,
    },
    /// Overrides the attack power used by every unit of a team.
    SetAttackPower {
        /// Team receiving the override.
        team: Team,
        /// New positive attack power.
        power: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Confirms that a unit was created.
    UnitPlaced {
        /// Identifier assigned to the unit.
        unit: UnitId,
        /// Side the unit fights for.
        team: Team,
        /// Cell the unit occupies.
        cell: CellCoord,
    },
    /// Confirms that a unit moved between two cells.
    UnitMoved {
        /// Unit that moved.
        unit: UnitId,
        /// Cell the unit occupied before moving.
        from: CellCoord,
        /// Cell the unit occupies after moving.
        to: CellCoord,
    },
    /// Reports a resolved attack.
    UnitAttacked {
        /// Unit that attacked.
        attacker: UnitId,
        /// Unit that was hit.
        target: UnitId,
        /// Hit points subtracted from the target.
        damage: u32,
        /// Hit points the target has left, zero when it died.
        remaining: u32,
    },
    /// Reports that a unit left the battlefield for good.
    UnitRemoved {
        /// Unit that was removed.
        unit: UnitId,
        /// Side the unit fought for.
        team: Team,
        /// Cell the unit occupied.
        cell: CellCoord,
    },
    /// Confirms an attack power override.
    AttackPowerChanged {
        /// Team whose attack power changed.
        team: Team,
        /// Attack power now in effect.
        power: u32,
    },
}

/// Aggregate state of one team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TeamSnapshot {
    /// Team described by the snapshot.
    pub team: Team,
    /// Sum of hit points over the team's live units.
    pub hit_points: u32,
    /// Number of live units on the team.
    pub count: usize,
    /// Damage dealt by each attack of the team's units.
    pub attack_power: u32,
}

/// Observable result of simulating a single round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RoundReport {
    /// Whether any unit moved or attacked during the round.
    pub advanced: bool,
    /// Whether no unit started its turn after one team had been wiped out.
    pub full_round: bool,
}

/// Terminal state of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Outcome {
    /// At most one team is left standing.
    Resolved {
        /// Surviving team, or `None` when no unit survived.
        winner: Option<Team>,
        /// Rounds counted toward the outcome value.
        completed_rounds: u32,
        /// Hit points summed over all surviving units.
        remaining_hit_points: u32,
    },
    /// A round passed in which no unit could move or attack.
    Unresolved {
        /// Rounds simulated, including the one that made no progress.
        rounds: u32,
    },
}

impl Outcome {
    /// Completed rounds multiplied by remaining hit points, if resolved.
    #[must_use]
    pub fn value(&self) -> Option<u64> {
        match self {
            Self::Resolved {
                completed_rounds,
                remaining_hit_points,
                ..
            } => Some(u64::from(*completed_rounds) * u64::from(*remaining_hit_points)),
            Self::Unresolved { .. } => None,
        }
    }

    /// Surviving team of a resolved battle.
    #[must_use]
    pub fn winner(&self) -> Option<Team> {
        match self {
            Self::Resolved { winner, .. } => *winner,
            Self::Unresolved { .. } => None,
        }
    }
}

/// Strategy used to reset the distance map between floods.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearPolicy {
    /// Reset only the rectangle touched by the previous flood.
    #[default]
    BoundingBox,
    /// Reset every slot before each flood.
    Full,
}

/// Tunable parameters of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Hit points assigned to every placed unit.
    pub starting_hit_points: u32,
    /// Attack power of elves.
    pub elf_attack_power: u32,
    /// Attack power of goblins.
    pub goblin_attack_power: u32,
    /// Distance map reset strategy.
    pub clear_policy: ClearPolicy,
}

impl BattleConfig {
    /// Attack power configured for `team`.
    #[must_use]
    pub const fn attack_power(&self, team: Team) -> u32 {
        match team {
            Team::Elf => self.elf_attack_power,
            Team::Goblin => self.goblin_attack_power,
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            starting_hit_points: DEFAULT_HIT_POINTS,
            elf_attack_power: DEFAULT_ATTACK_POWER,
            goblin_attack_power: DEFAULT_ATTACK_POWER,
            clear_policy: ClearPolicy::default(),
        }
    }
}
