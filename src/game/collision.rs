//! Collision resolution - deciding when the projectile comes to rest.
//!
//! Runs once per tick, immediately after motion. A projectile settles when it
//! reaches the ceiling or gets within one packed spacing unit of any settled
//! bubble; the target cell comes from the grid's clamped position mapping.
//!
//! A very large step combined with high speed can still tunnel through a
//! cluster between two checks. No substepping is done; that risk is accepted.

use super::{
    grid::{BUBBLE_RADIUS, CELL_SPACING, Grid},
    projectile::Projectile,
};

/// The outcome of one collision check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    /// The projectile has come to rest and should attach at this cell.
    Settled { row: usize, col: usize },
    StillFlying,
}

/// The projectile has reached the top boundary with nothing above to strike.
pub fn has_reached_ceiling(projectile: &Projectile) -> bool {
    projectile.position.y < BUBBLE_RADIUS
}

/// The projectile is touching a settled bubble.
///
/// Centers closer than one spacing unit count as touching, not just exact
/// outline intersection. The looser tolerance is what makes attachment feel
/// forgiving.
pub fn has_touched_settled(projectile: &Projectile, grid: &Grid) -> bool {
    grid.occupied().any(|(row, col, _)| {
        grid.cell_center(row, col).distance(projectile.position) < CELL_SPACING
    })
}

/// Decide whether the projectile has settled, and where.
pub fn resolve(projectile: &Projectile, grid: &Grid) -> Impact {
    if has_reached_ceiling(projectile) || has_touched_settled(projectile, grid) {
        let (row, col) = grid.position_to_cell(projectile.position);
        Impact::Settled { row, col }
    } else {
        Impact::StillFlying
    }
}
