//! Level boundary - materializing the initial grid.
//!
//! The core consumes an already-built grid and tolerates any well-formed
//! one, empty cells included. This module is the loader side of that
//! boundary: it normalizes layout strings to the declared shape (the core
//! does not defend against ragged input) and generates the ad-hoc random
//! levels the game starts with.

use bevy::prelude::*;
use rand::Rng;

use super::{
    bubble::BubbleColor,
    grid::{Cell, Grid, GridError},
    projectile::PlayField,
    round::RoundController,
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, setup_level);
}

/// Rows in a generated level.
const LEVEL_ROWS: usize = 6;

/// Columns in a generated level.
const LEVEL_COLS: usize = 8;

/// Chance that a generated cell holds a bubble.
const FILL_CHANCE: f64 = 0.5;

/// Build a grid from layout strings, normalized to the declared shape.
///
/// Short or missing rows are padded with empty cells, long rows are
/// truncated, and unknown letters read as empty. Ragged input never reaches
/// `Grid::from_rows`.
pub fn grid_from_layout(rows: usize, cols: usize, layout: &[&str]) -> Result<Grid, GridError> {
    let mut normalized = Vec::with_capacity(rows);
    for r in 0..rows {
        let letters: Vec<char> = layout
            .get(r)
            .map(|row| row.chars().collect())
            .unwrap_or_default();
        let mut row = Vec::with_capacity(cols);
        for c in 0..cols {
            let cell = match letters.get(c).copied().and_then(BubbleColor::from_letter) {
                Some(color) => Cell::Bubble(color),
                None => Cell::Empty,
            };
            row.push(cell);
        }
        normalized.push(row);
    }
    Grid::from_rows(normalized)
}

/// Generate a level with random colors at the given shape.
pub fn random_grid(rows: usize, cols: usize) -> Result<Grid, GridError> {
    let mut grid = Grid::new(rows, cols)?;
    let mut rng = rand::rng();
    for row in 0..rows {
        for col in 0..cols {
            if rng.random_bool(FILL_CHANCE) {
                grid.set(row, col, Cell::Bubble(BubbleColor::random()))?;
            }
        }
    }
    Ok(grid)
}

/// Materialize the starting grid and the round controller.
pub(super) fn setup_level(mut commands: Commands, field: Res<PlayField>) {
    match random_grid(LEVEL_ROWS, LEVEL_COLS) {
        Ok(grid) => {
            info!(
                "Generated a {LEVEL_ROWS}x{LEVEL_COLS} level with {} bubbles",
                grid.occupied().count()
            );
            commands.insert_resource(grid);
        }
        Err(error) => {
            error!("Failed to generate the starting level: {error}");
            return;
        }
    }

    commands.insert_resource(RoundController::new(&field));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_are_normalized_to_the_declared_shape() {
        // Second row is short, third is missing entirely.
        let grid = grid_from_layout(3, 4, &["RGBP", "R"]).unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.get(0, 3).unwrap(), Cell::Bubble(BubbleColor::Purple));
        assert_eq!(grid.get(1, 0).unwrap(), Cell::Bubble(BubbleColor::Red));
        assert_eq!(grid.get(1, 1).unwrap(), Cell::Empty);
        assert_eq!(grid.get(2, 0).unwrap(), Cell::Empty);
    }

    #[test]
    fn long_rows_are_truncated() {
        let grid = grid_from_layout(1, 2, &["RGBP"]).unwrap();
        assert_eq!(grid.cols(), 2);
        assert_eq!(grid.get(0, 1).unwrap(), Cell::Bubble(BubbleColor::Green));
    }

    #[test]
    fn unknown_letters_read_as_empty() {
        let grid = grid_from_layout(1, 3, &["-xR"]).unwrap();
        assert_eq!(grid.get(0, 0).unwrap(), Cell::Empty);
        assert_eq!(grid.get(0, 1).unwrap(), Cell::Empty);
        assert_eq!(grid.get(0, 2).unwrap(), Cell::Bubble(BubbleColor::Red));
    }

    #[test]
    fn zero_shapes_are_rejected_at_the_boundary() {
        assert_eq!(grid_from_layout(0, 4, &[]), Err(GridError::EmptyGrid));
        assert_eq!(random_grid(4, 0), Err(GridError::EmptyGrid));
    }

    #[test]
    fn random_levels_have_the_requested_shape() {
        let grid = random_grid(6, 8).unwrap();
        assert_eq!(grid.rows(), 6);
        assert_eq!(grid.cols(), 8);
        for (_, _, color) in grid.occupied() {
            assert!(BubbleColor::ALL.contains(&color));
        }
    }
}
