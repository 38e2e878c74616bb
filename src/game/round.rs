//! Round orchestration - one simulation tick.
//!
//! The controller owns the single projectile and sequences each tick:
//! advance motion, resolve collision, attach, match, respawn. That order is
//! load-bearing; matching before motion would act on stale position data.
//! The whole chain runs synchronously inside one frame.

use bevy::prelude::*;

use super::{
    bubble::BubbleColor,
    cluster::{self, MIN_CLUSTER_SIZE},
    collision::{self, Impact},
    grid::{Cell, Grid, GridError},
    projectile::{LaunchError, PROJECTILE_SPEED, PlayField, Projectile},
};
use crate::AppSystems;

pub(super) fn plugin(app: &mut App) {
    app.add_message::<FireRequested>();

    app.configure_sets(Update, RoundSystems.in_set(AppSystems::Update));

    // Fire handling runs before the tick so a shot advances on the frame it
    // was requested.
    app.add_systems(
        Update,
        (handle_fire, advance_round).chain().in_set(RoundSystems),
    );
}

/// System set for the round tick; rendering orders itself after this.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoundSystems;

/// Message from the input layer asking to launch the loaded projectile.
#[derive(Message, Debug, Clone)]
pub struct FireRequested {
    /// Aim position in field space.
    pub aim: Vec2,
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No projectile in flight, nothing to advance.
    Idle,
    /// Advanced without settling.
    Flying,
    /// The projectile attached to the grid and was replaced.
    Settled {
        row: usize,
        col: usize,
        color: BubbleColor,
        /// Cells cleared by the match, empty when the group was too small.
        cleared: Vec<(usize, usize)>,
    },
}

/// Owner of the single active projectile and the tick sequence.
#[derive(Resource, Debug)]
pub struct RoundController {
    projectile: Projectile,
}

impl RoundController {
    pub fn new(field: &PlayField) -> Self {
        Self::with_color(field, BubbleColor::random())
    }

    /// Start a round with a chosen first color.
    pub fn with_color(field: &PlayField, color: BubbleColor) -> Self {
        Self {
            projectile: Projectile::spawn(field.muzzle(), color),
        }
    }

    /// Read-only view of the current projectile, for input and rendering.
    pub fn projectile(&self) -> &Projectile {
        &self.projectile
    }

    /// Launch the loaded projectile toward `aim`.
    ///
    /// No-op while a projectile is airborne; degenerate aims are rejected.
    pub fn fire(&mut self, aim: Vec2) -> Result<(), LaunchError> {
        self.projectile.launch(aim, PROJECTILE_SPEED)
    }

    /// Advance one tick: motion, then collision, then attach and match.
    pub fn tick(
        &mut self,
        grid: &mut Grid,
        field: &PlayField,
        dt: f32,
    ) -> Result<TickOutcome, GridError> {
        if !self.projectile.in_flight {
            return Ok(TickOutcome::Idle);
        }

        self.projectile.advance(dt, field);

        match collision::resolve(&self.projectile, grid) {
            Impact::StillFlying => Ok(TickOutcome::Flying),
            Impact::Settled { row, col } => {
                let color = self.projectile.color;
                // A clamped target that is already occupied gets silently
                // overwritten; that quirk of the mapping is preserved.
                grid.set(row, col, Cell::Bubble(color))?;
                let cleared = cluster::resolve_match(grid, row, col, color, MIN_CLUSTER_SIZE)?;
                self.projectile = Projectile::spawn(field.muzzle(), BubbleColor::random());
                Ok(TickOutcome::Settled {
                    row,
                    col,
                    color,
                    cleared,
                })
            }
        }
    }
}

/// Launch the projectile when the input layer requests it.
fn handle_fire(
    mut round: ResMut<RoundController>,
    mut fire_events: MessageReader<FireRequested>,
) {
    for event in fire_events.read() {
        let was_in_flight = round.projectile().in_flight;
        match round.fire(event.aim) {
            Ok(()) if !was_in_flight => {
                info!(
                    "Fired {:?} bubble toward ({:.0}, {:.0})",
                    round.projectile().color,
                    event.aim.x,
                    event.aim.y
                );
            }
            // Already airborne; the request is dropped.
            Ok(()) => {}
            Err(error) => debug!("Ignoring fire request: {error}"),
        }
    }
}

/// Run one simulation tick per frame.
fn advance_round(
    time: Res<Time>,
    field: Res<PlayField>,
    mut round: ResMut<RoundController>,
    mut grid: ResMut<Grid>,
) {
    // The grid only mutates on a settle; flag the change ourselves so the
    // renderer does not rebuild on every airborne frame.
    let outcome = round.tick(grid.bypass_change_detection(), &field, time.delta_secs());

    match outcome {
        Ok(TickOutcome::Settled {
            row,
            col,
            color,
            cleared,
        }) => {
            grid.set_changed();
            info!("Bubble {color:?} settled at ({row}, {col})");
            if !cleared.is_empty() {
                info!("Popped a cluster of {} {color:?} bubbles", cleared.len());
            }
        }
        Ok(_) => {}
        Err(error) => {
            // Out-of-bounds here means the coordinate mapping has drifted;
            // never swallow it.
            error!("Grid invariant violated during tick: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn grid_from(rows: &[&str]) -> Grid {
        let cells = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|letter| match BubbleColor::from_letter(letter) {
                        Some(color) => Cell::Bubble(color),
                        None => Cell::Empty,
                    })
                    .collect()
            })
            .collect();
        Grid::from_rows(cells).unwrap()
    }

    /// Tick until the projectile settles, with a generous frame cap.
    fn tick_until_settled(
        round: &mut RoundController,
        grid: &mut Grid,
        field: &PlayField,
    ) -> TickOutcome {
        for _ in 0..2_000 {
            let outcome = round.tick(grid, field, DT).unwrap();
            if matches!(outcome, TickOutcome::Settled { .. }) {
                return outcome;
            }
        }
        panic!("projectile never settled");
    }

    #[test]
    fn tick_is_idle_until_fired() {
        let field = PlayField::default();
        let mut grid = grid_from(&["RR-"]);
        let mut round = RoundController::with_color(&field, BubbleColor::Red);
        assert_eq!(round.tick(&mut grid, &field, DT).unwrap(), TickOutcome::Idle);
        assert_eq!(round.projectile().position, field.muzzle());
    }

    #[test]
    fn straight_shot_completes_the_match_three() {
        // One row, "R R -": a red shot straight up lands at the clamped
        // shooter column and clears all three.
        let field = PlayField::default();
        let mut grid = grid_from(&["RR-"]);
        let mut round = RoundController::with_color(&field, BubbleColor::Red);

        round.fire(field.muzzle() - Vec2::new(0.0, 200.0)).unwrap();
        let outcome = tick_until_settled(&mut round, &mut grid, &field);

        let TickOutcome::Settled {
            row,
            col,
            color,
            cleared,
        } = outcome
        else {
            unreachable!();
        };
        assert_eq!((row, col, color), (0, 2, BubbleColor::Red));
        assert_eq!(cleared.len(), 3);
        assert_eq!(grid.occupied().count(), 0);
    }

    #[test]
    fn undersized_groups_stay_on_the_grid() {
        let field = PlayField::default();
        let mut grid = grid_from(&["R--"]);
        let mut round = RoundController::with_color(&field, BubbleColor::Red);

        round.fire(field.muzzle() - Vec2::new(0.0, 200.0)).unwrap();
        let outcome = tick_until_settled(&mut round, &mut grid, &field);

        assert!(matches!(
            outcome,
            TickOutcome::Settled { cleared, .. } if cleared.is_empty()
        ));
        assert_eq!(grid.occupied().count(), 2);
    }

    #[test]
    fn a_settle_reloads_an_idle_projectile_at_the_muzzle() {
        let field = PlayField::default();
        let mut grid = grid_from(&["---"]);
        let mut round = RoundController::with_color(&field, BubbleColor::Blue);

        round.fire(field.muzzle() - Vec2::new(0.0, 200.0)).unwrap();
        tick_until_settled(&mut round, &mut grid, &field);

        assert!(!round.projectile().in_flight);
        assert_eq!(round.projectile().position, field.muzzle());
    }

    #[test]
    fn only_the_first_fire_assigns_a_velocity() {
        let field = PlayField::default();
        let mut grid = grid_from(&["---"]);
        let mut round = RoundController::with_color(&field, BubbleColor::Green);

        round.fire(field.muzzle() - Vec2::new(0.0, 200.0)).unwrap();
        let velocity = round.projectile().velocity;
        round.tick(&mut grid, &field, DT).unwrap();

        round.fire(field.muzzle() - Vec2::new(150.0, 50.0)).unwrap();
        assert_eq!(round.projectile().velocity, velocity);
    }

    #[test]
    fn clamped_settles_overwrite_the_occupied_edge_cell() {
        // A 1x1 grid: everything clamps to (0, 0), so a second settle
        // replaces the first color. Preserved policy, not a bug fix.
        let field = PlayField::default();
        let mut grid = grid_from(&["G"]);
        let mut round = RoundController::with_color(&field, BubbleColor::Red);

        round.fire(field.muzzle() - Vec2::new(0.0, 200.0)).unwrap();
        let outcome = tick_until_settled(&mut round, &mut grid, &field);

        assert!(matches!(outcome, TickOutcome::Settled { row: 0, col: 0, .. }));
        assert_eq!(grid.get(0, 0).unwrap(), Cell::Bubble(BubbleColor::Red));
    }
}
