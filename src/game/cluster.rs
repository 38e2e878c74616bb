//! Cluster matching - finding and removing connected same-colored groups.
//!
//! Flood fill over cardinal neighbors with an explicit worklist, so stack
//! depth stays bounded no matter how large the grid is. Groups of three or
//! more are cleared; smaller groups stay put. Bubbles left floating without
//! support are not detected or dropped.

use std::collections::HashSet;

use super::{
    bubble::BubbleColor,
    grid::{Cell, Grid, GridError},
};

/// Minimum connected group size that gets removed (match-3).
pub const MIN_CLUSTER_SIZE: usize = 3;

/// Every cell reachable from the seed through same-colored cardinal steps.
///
/// The seed itself is included only if it holds `color` (it always does
/// immediately after attachment). Each cell is visited at most once, so a
/// fully filled single-color grid terminates in O(rows * cols).
pub fn find_cluster(
    grid: &Grid,
    seed_row: usize,
    seed_col: usize,
    color: BubbleColor,
) -> Result<Vec<(usize, usize)>, GridError> {
    let mut visited: HashSet<(usize, usize)> = HashSet::new();
    let mut stack = vec![(seed_row, seed_col)];
    let mut cluster = Vec::new();

    while let Some((row, col)) = stack.pop() {
        if !visited.insert((row, col)) {
            continue;
        }
        if grid.get(row, col)? == Cell::Bubble(color) {
            cluster.push((row, col));
            stack.extend(grid.neighbors(row, col));
        }
    }

    Ok(cluster)
}

/// Clear the cluster around the seed if it is large enough.
///
/// Returns the cleared cells; an empty vec means the group was below the
/// threshold and the grid was left untouched.
pub fn resolve_match(
    grid: &mut Grid,
    seed_row: usize,
    seed_col: usize,
    color: BubbleColor,
    min_size: usize,
) -> Result<Vec<(usize, usize)>, GridError> {
    let cluster = find_cluster(grid, seed_row, seed_col, color)?;
    if cluster.len() < min_size {
        return Ok(Vec::new());
    }
    for &(row, col) in &cluster {
        grid.set(row, col, Cell::Empty)?;
    }
    Ok(cluster)
}
