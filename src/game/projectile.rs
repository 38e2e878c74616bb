//! The projectile - the single bubble in flight.
//!
//! The projectile travels in a straight line at constant speed, bouncing off
//! the side walls, until the collision resolver decides it has settled. There
//! is never more than one; the round controller owns it and replaces it after
//! every settle.

use bevy::prelude::*;

use super::{
    bubble::{BubbleAssets, BubbleColor},
    grid::BUBBLE_RADIUS,
    round::{RoundController, RoundSystems},
};
use crate::AppSystems;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<PlayField>();
    app.register_type::<PlayField>();

    app.add_systems(
        Startup,
        spawn_projectile_visual
            .after(super::bubble::setup_bubble_assets)
            .after(super::level::setup_level),
    );

    app.add_systems(
        Update,
        update_projectile_visual
            .in_set(AppSystems::Update)
            .after(RoundSystems),
    );
}

/// Speed of a launched projectile in field pixels per second.
pub const PROJECTILE_SPEED: f32 = 900.0;

/// Width of the play field in field pixels.
pub const FIELD_WIDTH: f32 = 420.0;

/// Height of the play field in field pixels.
pub const FIELD_HEIGHT: f32 = 760.0;

/// How far above the bottom edge the muzzle sits.
const MUZZLE_OFFSET: f32 = 100.0;

/// The continuous space the projectile flies through.
///
/// Field space: origin at the top-left, y down. `to_world`/`from_world`
/// convert to Bevy's centered, y-up world space for rendering and input.
#[derive(Resource, Debug, Clone, Copy, Reflect)]
#[reflect(Resource)]
pub struct PlayField {
    pub width: f32,
    pub height: f32,
}

impl Default for PlayField {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
        }
    }
}

impl PlayField {
    /// Where new projectiles spawn and launch from.
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height - MUZZLE_OFFSET)
    }

    /// Field space to world space.
    pub fn to_world(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            position.x - self.width / 2.0,
            self.height / 2.0 - position.y,
        )
    }

    /// World space to field space.
    pub fn from_world(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            position.x + self.width / 2.0,
            self.height / 2.0 - position.y,
        )
    }
}

/// A fire request with an aim position that coincides with the projectile.
///
/// The direction would be undefined, so the request is ignored and the
/// projectile left unmoved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchError {
    DegenerateAim,
}

impl std::fmt::Display for LaunchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchError::DegenerateAim => {
                write!(f, "aim position coincides with the projectile")
            }
        }
    }
}

impl std::error::Error for LaunchError {}

/// The bubble currently loaded or in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: BubbleColor,
    pub in_flight: bool,
}

impl Projectile {
    /// A motionless projectile sitting at the muzzle.
    pub fn spawn(origin: Vec2, color: BubbleColor) -> Self {
        Self {
            position: origin,
            velocity: Vec2::ZERO,
            color,
            in_flight: false,
        }
    }

    /// Launch toward `aim` at the given speed.
    ///
    /// A projectile already in flight ignores the request; exactly one may be
    /// airborne at a time.
    pub fn launch(&mut self, aim: Vec2, speed: f32) -> Result<(), LaunchError> {
        if self.in_flight {
            return Ok(());
        }
        let Some(direction) = (aim - self.position).try_normalize() else {
            return Err(LaunchError::DegenerateAim);
        };
        self.velocity = direction * speed;
        self.in_flight = true;
        Ok(())
    }

    /// Integrate one step of constant-velocity motion and bounce off walls.
    ///
    /// When x crosses a side wall the x velocity is negated; the position is
    /// not corrected, so the bubble may overlap the wall by at most one
    /// frame's travel. That bounded overlap is accepted.
    pub fn advance(&mut self, dt: f32, field: &PlayField) {
        self.position += self.velocity * dt;
        if self.position.x < BUBBLE_RADIUS || self.position.x > field.width - BUBBLE_RADIUS {
            self.velocity.x = -self.velocity.x;
        }
    }
}

/// Marker for the projectile's render entity.
#[derive(Component)]
struct ProjectileVisual;

/// Spawn the single visual entity that tracks the projectile.
fn spawn_projectile_visual(
    mut commands: Commands,
    round: Res<RoundController>,
    field: Res<PlayField>,
    assets: Res<BubbleAssets>,
) {
    let projectile = round.projectile();
    commands.spawn((
        Name::new("Projectile"),
        ProjectileVisual,
        Mesh2d(assets.mesh.clone()),
        MeshMaterial2d(assets.material(projectile.color)),
        Transform::from_translation(field.to_world(projectile.position).extend(1.0)),
    ));
}

/// Keep the visual entity on the projectile's position and color.
///
/// The color handle is rewritten every frame; it changes whenever a settle
/// swaps in a fresh projectile.
fn update_projectile_visual(
    round: Res<RoundController>,
    field: Res<PlayField>,
    assets: Res<BubbleAssets>,
    mut query: Query<(&mut Transform, &mut MeshMaterial2d<ColorMaterial>), With<ProjectileVisual>>,
) {
    let Ok((mut transform, mut material)) = query.single_mut() else {
        return;
    };
    let projectile = round.projectile();
    transform.translation = field.to_world(projectile.position).extend(1.0);
    material.0 = assets.material(projectile.color);
}
