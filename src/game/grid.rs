//! The rectangular grid of settled bubbles.
//!
//! Cells are addressed by (row, col) and stored in a flat vector. The grid
//! also owns the mapping between cell addresses and continuous field
//! positions; that mapping is the geometric contract the collision and
//! attachment logic build on.
//!
//! Field space has its origin at the top-left of the play field with y
//! growing downward. The rendering layer converts to world space; nothing in
//! here ever sees world coordinates.

use bevy::prelude::*;

use super::bubble::BubbleColor;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Cell>();
}

/// Radius of a bubble in field pixels.
pub const BUBBLE_RADIUS: f32 = 40.0;

/// Distance between adjacent cell centers. The packing factor spaces centers
/// slightly more than one radius apart, so neighboring bubbles overlap and
/// read as touching. Attachment, collision tolerance, and rendering must all
/// use this same constant.
pub const CELL_SPACING: f32 = BUBBLE_RADIUS * 1.05;

/// One slot in the grid: empty, or holding a settled bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum Cell {
    #[default]
    Empty,
    Bubble(BubbleColor),
}

impl Cell {
    /// The color held by this cell, if any.
    pub fn color(self) -> Option<BubbleColor> {
        match self {
            Cell::Empty => None,
            Cell::Bubble(color) => Some(color),
        }
    }
}

/// Errors from grid construction and access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// A (row, col) access outside the grid bounds.
    ///
    /// Unreachable in normal flow because `position_to_cell` clamps; if it
    /// ever fires, the coordinate mapping has drifted from the grid's
    /// declared bounds and the round must report it loudly.
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    /// A layout row whose length differs from the declared column count.
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A grid with zero rows or zero columns.
    EmptyGrid,
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::OutOfBounds {
                row,
                col,
                rows,
                cols,
            } => write!(f, "cell ({row}, {col}) is outside the {rows}x{cols} grid"),
            GridError::RaggedRow {
                row,
                expected,
                found,
            } => write!(f, "row {row} has {found} cells, expected {expected}"),
            GridError::EmptyGrid => write!(f, "grid must be at least 1x1"),
        }
    }
}

impl std::error::Error for GridError {}

/// The grid of settled bubbles.
///
/// The shape is fixed for the lifetime of a level; only cell contents change.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Grid {
    cells: Vec<Cell>,
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Create an empty grid with the given shape.
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyGrid);
        }
        Ok(Self {
            cells: vec![Cell::Empty; rows * cols],
            rows,
            cols,
        })
    }

    /// Build a grid from explicit rows, rejecting ragged input.
    ///
    /// The level loader normalizes its layouts before calling this; a ragged
    /// row reaching here is a loader bug, not a recoverable condition.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, GridError> {
        let Some(first) = rows.first() else {
            return Err(GridError::EmptyGrid);
        };
        let cols = first.len();
        if cols == 0 {
            return Err(GridError::EmptyGrid);
        }
        for (index, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(GridError::RaggedRow {
                    row: index,
                    expected: cols,
                    found: row.len(),
                });
            }
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, GridError> {
        if row >= self.rows || col >= self.cols {
            return Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    /// Read a cell, bounds-checked.
    pub fn get(&self, row: usize, col: usize) -> Result<Cell, GridError> {
        Ok(self.cells[self.index(row, col)?])
    }

    /// Write a cell, bounds-checked. Overwrites whatever was there.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) -> Result<(), GridError> {
        let index = self.index(row, col)?;
        self.cells[index] = cell;
        Ok(())
    }

    /// Center of a cell in field space.
    ///
    /// This is the exact mapping used when levels are laid out; attachment
    /// would misplace bubbles relative to what was drawn if it drifted.
    pub fn cell_center(&self, row: usize, col: usize) -> Vec2 {
        Vec2::new(
            col as f32 * CELL_SPACING + BUBBLE_RADIUS,
            row as f32 * CELL_SPACING + BUBBLE_RADIUS,
        )
    }

    /// The cell containing a field-space position, clamped to the grid.
    ///
    /// A projectile that settles past the last row or column (large step
    /// sizes make this possible) is slammed into the nearest edge cell
    /// rather than indexing out of bounds. The clamp is deliberate policy.
    pub fn position_to_cell(&self, position: Vec2) -> (usize, usize) {
        let row = (position.y / CELL_SPACING).floor() as i64;
        let col = (position.x / CELL_SPACING).floor() as i64;
        let row = row.clamp(0, self.rows as i64 - 1) as usize;
        let col = col.clamp(0, self.cols as i64 - 1) as usize;
        (row, col)
    }

    /// The cardinal neighbors of a cell, filtered to grid bounds.
    pub fn neighbors(&self, row: usize, col: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(4);
        if row > 0 {
            out.push((row - 1, col));
        }
        if row + 1 < self.rows {
            out.push((row + 1, col));
        }
        if col > 0 {
            out.push((row, col - 1));
        }
        if col + 1 < self.cols {
            out.push((row, col + 1));
        }
        out
    }

    /// Iterate over every occupied cell as (row, col, color).
    ///
    /// This is the read-only snapshot the collision scan and the renderer
    /// both consume.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, BubbleColor)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, cell)| {
            cell.color()
                .map(|color| (i / self.cols, i % self.cols, color))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_round_trip_covers_every_cell() {
        let grid = Grid::new(6, 8).unwrap();
        for row in 0..6 {
            for col in 0..8 {
                let center = grid.cell_center(row, col);
                assert_eq!(grid.position_to_cell(center), (row, col));
            }
        }
    }

    #[test]
    fn position_to_cell_clamps_far_outside() {
        let grid = Grid::new(6, 8).unwrap();
        assert_eq!(
            grid.position_to_cell(Vec2::new(-10_000.0, -10_000.0)),
            (0, 0)
        );
        assert_eq!(grid.position_to_cell(Vec2::new(1.0e6, 1.0e6)), (5, 7));
    }

    #[test]
    fn out_of_bounds_access_is_an_error() {
        let mut grid = Grid::new(2, 2).unwrap();
        assert!(matches!(
            grid.get(2, 0),
            Err(GridError::OutOfBounds { row: 2, col: 0, .. })
        ));
        assert!(matches!(
            grid.set(0, 5, Cell::Empty),
            Err(GridError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn neighbors_are_filtered_to_bounds() {
        let grid = Grid::new(3, 3).unwrap();
        let corner = grid.neighbors(0, 0);
        assert_eq!(corner.len(), 2);
        assert!(corner.contains(&(1, 0)));
        assert!(corner.contains(&(0, 1)));
        assert_eq!(grid.neighbors(1, 1).len(), 4);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let rows = vec![vec![Cell::Empty, Cell::Empty], vec![Cell::Empty]];
        assert_eq!(
            Grid::from_rows(rows),
            Err(GridError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn zero_sized_grids_are_rejected() {
        assert_eq!(Grid::new(0, 5), Err(GridError::EmptyGrid));
        assert_eq!(Grid::new(5, 0), Err(GridError::EmptyGrid));
        assert_eq!(Grid::from_rows(Vec::new()), Err(GridError::EmptyGrid));
    }

    #[test]
    fn set_overwrites_occupied_cells() {
        let mut grid = Grid::new(1, 1).unwrap();
        grid.set(0, 0, Cell::Bubble(BubbleColor::Red)).unwrap();
        grid.set(0, 0, Cell::Bubble(BubbleColor::Green)).unwrap();
        assert_eq!(grid.get(0, 0).unwrap(), Cell::Bubble(BubbleColor::Green));
    }
}
