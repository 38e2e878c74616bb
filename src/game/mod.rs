//! The bubble-matching game.
//!
//! This module contains the simulation core and its thin driver shell:
//! - Rectangular grid of settled bubbles and the cell/position mapping
//! - Projectile motion with wall bounces
//! - Collision resolution and attachment
//! - Cluster matching (match-3 flood fill)
//! - Round orchestration, input, level generation, and rendering

mod bubble;
mod cluster;
mod collision;
mod grid;
mod level;
mod projectile;
mod round;
mod shooter;

use bevy::prelude::*;

pub use projectile::{FIELD_HEIGHT, FIELD_WIDTH};

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        grid::plugin,
        bubble::plugin,
        level::plugin,
        projectile::plugin,
        round::plugin,
        shooter::plugin,
    ));
}
