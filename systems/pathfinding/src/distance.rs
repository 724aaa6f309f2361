//! Reusable breadth-first distance map driven by a caller-supplied classifier.

use skirmish_core::{CellCoord, ClearPolicy};

/// Verdict returned by a flood classifier for a newly reached cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloodStep {
    /// The cell is impassable; it is recorded but never expanded.
    Blocked,
    /// The cell is passable and joins the next frontier.
    Continue,
    /// The cell is a destination; the flood ends once the current layer is done.
    Stop,
}

/// Contents of a single distance map slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reach {
    /// The latest flood never reached the cell.
    Unreached,
    /// The latest flood classified the cell as impassable.
    Blocked,
    /// Shortest number of steps from the flood origin.
    Steps(u32),
}

/// Dense breadth-first distance grid reused across floods.
///
/// Only the latest flood's results are meaningful; every call to
/// [`DistanceMap::flood`] discards the previous ones. Depending on the
/// [`ClearPolicy`] the reset either wipes the whole grid or only the rectangle
/// the previous flood touched.
#[derive(Clone, Debug)]
pub struct DistanceMap {
    columns: u32,
    rows: u32,
    policy: ClearPolicy,
    slots: Vec<Reach>,
    touched: Option<Bounds>,
    frontier: Vec<CellCoord>,
    next_frontier: Vec<CellCoord>,
}

impl DistanceMap {
    /// Allocates a map covering a `columns` x `rows` grid.
    #[must_use]
    pub fn new(columns: u32, rows: u32, policy: ClearPolicy) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            policy,
            slots: vec![Reach::Unreached; capacity],
            touched: None,
            frontier: Vec::new(),
            next_frontier: Vec::new(),
        }
    }

    /// Floods outward from `start` one breadth layer at a time.
    ///
    /// `classify` is invoked exactly once for every cell discovered after the
    /// origin. When it returns [`FloodStep::Stop`] the remaining cells of the
    /// same layer are still classified before the flood ends, so every cell at
    /// the stopping distance is recorded.
    ///
    /// Returns the distance of the first stop, or `None` when the frontier
    /// empties without one.
    pub fn flood<F>(&mut self, start: CellCoord, mut classify: F) -> Option<u32>
    where
        F: FnMut(CellCoord) -> FloodStep,
    {
        self.reset();

        let start_index = self.index(start)?;
        self.slots[start_index] = Reach::Steps(0);
        self.touched = Some(Bounds::around(start));
        self.frontier.clear();
        self.frontier.push(start);

        let mut distance = 0;
        let mut stopped = false;

        while !stopped && !self.frontier.is_empty() {
            distance += 1;
            self.next_frontier.clear();

            for position in 0..self.frontier.len() {
                let cell = self.frontier[position];
                for neighbor in cell.neighbors(self.columns, self.rows) {
                    let Some(index) = self.index(neighbor) else {
                        continue;
                    };
                    if self.slots[index] != Reach::Unreached {
                        continue;
                    }

                    if let Some(bounds) = self.touched.as_mut() {
                        bounds.include(neighbor);
                    }

                    match classify(neighbor) {
                        FloodStep::Blocked => self.slots[index] = Reach::Blocked,
                        FloodStep::Continue => {
                            self.slots[index] = Reach::Steps(distance);
                            self.next_frontier.push(neighbor);
                        }
                        FloodStep::Stop => {
                            self.slots[index] = Reach::Steps(distance);
                            stopped = true;
                        }
                    }
                }
            }

            std::mem::swap(&mut self.frontier, &mut self.next_frontier);
        }

        stopped.then_some(distance)
    }

    /// Slot recorded for the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn reach(&self, cell: CellCoord) -> Option<Reach> {
        self.index(cell)
            .and_then(|index| self.slots.get(index).copied())
    }

    /// Distance recorded for the provided cell, if the latest flood reached it.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u32> {
        match self.reach(cell)? {
            Reach::Steps(distance) => Some(distance),
            Reach::Unreached | Reach::Blocked => None,
        }
    }

    /// Slots stored in row-major order.
    #[must_use]
    pub fn slots(&self) -> &[Reach] {
        &self.slots
    }

    /// Provides the dimensions of the map as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reset strategy applied before each flood.
    #[must_use]
    pub const fn policy(&self) -> ClearPolicy {
        self.policy
    }

    fn reset(&mut self) {
        let touched = self.touched.take();
        match self.policy {
            ClearPolicy::Full => self.slots.fill(Reach::Unreached),
            ClearPolicy::BoundingBox => {
                let Some(bounds) = touched else {
                    return;
                };
                for row in bounds.min_row..=bounds.max_row {
                    for column in bounds.min_column..=bounds.max_column {
                        if let Some(index) = self.index(CellCoord::new(column, row)) {
                            self.slots[index] = Reach::Unreached;
                        }
                    }
                }
            }
        }
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

/// Inclusive rectangle of cells touched by a flood.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Bounds {
    min_column: u32,
    min_row: u32,
    max_column: u32,
    max_row: u32,
}

impl Bounds {
    const fn around(cell: CellCoord) -> Self {
        Self {
            min_column: cell.column(),
            min_row: cell.row(),
            max_column: cell.column(),
            max_row: cell.row(),
        }
    }

    fn include(&mut self, cell: CellCoord) {
        self.min_column = self.min_column.min(cell.column());
        self.min_row = self.min_row.min(cell.row());
        self.max_column = self.max_column.max(cell.column());
        self.max_row = self.max_row.max(cell.row());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_map(policy: ClearPolicy) -> DistanceMap {
        DistanceMap::new(4, 3, policy)
    }

    #[test]
    fn flood_records_manhattan_distances_on_open_floor() {
        let mut map = open_map(ClearPolicy::Full);

        let stop = map.flood(CellCoord::new(0, 0), |_| FloodStep::Continue);

        assert_eq!(stop, None);
        assert_eq!(map.distance(CellCoord::new(0, 0)), Some(0));
        assert_eq!(map.distance(CellCoord::new(3, 0)), Some(3));
        assert_eq!(map.distance(CellCoord::new(3, 2)), Some(5));
    }

    #[test]
    fn blocked_cells_are_recorded_but_not_expanded() {
        let mut map = open_map(ClearPolicy::Full);
        let wall = [CellCoord::new(1, 0), CellCoord::new(1, 1)];

        let _ = map.flood(CellCoord::new(0, 0), |cell| {
            if wall.contains(&cell) {
                FloodStep::Blocked
            } else {
                FloodStep::Continue
            }
        });

        assert_eq!(map.reach(CellCoord::new(1, 0)), Some(Reach::Blocked));
        assert_eq!(map.distance(CellCoord::new(1, 1)), None);
        assert_eq!(map.distance(CellCoord::new(1, 2)), Some(3));
        assert_eq!(map.distance(CellCoord::new(2, 0)), Some(6));
    }

    #[test]
    fn stop_finishes_the_current_layer_only() {
        let mut map = open_map(ClearPolicy::Full);
        let mut classified = Vec::new();

        let stop = map.flood(CellCoord::new(0, 0), |cell| {
            classified.push(cell);
            if cell == CellCoord::new(1, 0) {
                FloodStep::Stop
            } else {
                FloodStep::Continue
            }
        });

        assert_eq!(stop, Some(1));
        assert_eq!(map.distance(CellCoord::new(0, 1)), Some(1));
        assert_eq!(map.reach(CellCoord::new(1, 1)), Some(Reach::Unreached));
        assert_eq!(classified.len(), 2);
    }

    #[test]
    fn every_stop_in_the_stopping_layer_is_recorded() {
        let mut map = open_map(ClearPolicy::BoundingBox);
        let targets = [CellCoord::new(2, 0), CellCoord::new(0, 2)];

        let stop = map.flood(CellCoord::new(0, 0), |cell| {
            if targets.contains(&cell) {
                FloodStep::Stop
            } else {
                FloodStep::Continue
            }
        });

        assert_eq!(stop, Some(2));
        for target in targets {
            assert_eq!(map.distance(target), Some(2));
        }
    }

    #[test]
    fn bounding_box_reset_matches_full_reset() {
        let mut boxed = open_map(ClearPolicy::BoundingBox);
        let mut full = open_map(ClearPolicy::Full);

        for map in [&mut boxed, &mut full] {
            let _ = map.flood(CellCoord::new(3, 2), |_| FloodStep::Continue);
            let _ = map.flood(CellCoord::new(0, 0), |cell| {
                if cell.column() > 1 {
                    FloodStep::Blocked
                } else {
                    FloodStep::Continue
                }
            });
        }

        assert_eq!(boxed.slots(), full.slots());
        assert_eq!(boxed.reach(CellCoord::new(3, 2)), Some(Reach::Unreached));
    }

    #[test]
    fn flood_from_outside_the_grid_reaches_nothing() {
        let mut map = open_map(ClearPolicy::BoundingBox);
        let _ = map.flood(CellCoord::new(1, 1), |_| FloodStep::Continue);

        let stop = map.flood(CellCoord::new(9, 9), |_| FloodStep::Stop);

        assert_eq!(stop, None);
        assert!(map.slots().iter().all(|slot| *slot == Reach::Unreached));
    }
}
