//! Aim and fire input - the driver side of the simulation core.
//!
//! The core only ever receives an aim position and a fire trigger; pointer
//! and touch handling stop here. The aim line is drawn from the muzzle
//! toward the current aim point while the shooter is loaded.

use bevy::{prelude::*, window::PrimaryWindow};

use super::{
    projectile::{FIELD_HEIGHT, FIELD_WIDTH, PlayField},
    round::{FireRequested, RoundController, RoundSystems},
};
use crate::AppSystems;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<AimTarget>();
    app.register_type::<AimTarget>();

    app.add_systems(
        Update,
        (update_aim_target, handle_fire_input).in_set(AppSystems::RecordInput),
    );

    app.add_systems(
        Update,
        draw_aim_line.in_set(AppSystems::Update).after(RoundSystems),
    );
}

/// The current aim position in field space.
#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource)]
pub struct AimTarget(pub Vec2);

impl Default for AimTarget {
    fn default() -> Self {
        // Straight above the muzzle until the pointer moves.
        Self(Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT - 300.0))
    }
}

/// Track the pointer (mouse or first touch) as the aim position.
fn update_aim_target(
    window: Query<&Window, With<PrimaryWindow>>,
    camera: Query<(&Camera, &GlobalTransform)>,
    touches: Res<Touches>,
    field: Res<PlayField>,
    mut aim: ResMut<AimTarget>,
) {
    let Ok(window) = window.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera.single() else {
        return;
    };

    let pointer = window
        .cursor_position()
        .or_else(|| touches.iter().next().map(|touch| touch.position()));
    let Some(screen_position) = pointer else {
        return;
    };

    let Ok(world) = camera.viewport_to_world_2d(camera_transform, screen_position) else {
        return;
    };
    aim.0 = field.from_world(world);
}

/// Emit a fire request on click, space, or touch.
fn handle_fire_input(
    mouse: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    touches: Res<Touches>,
    aim: Res<AimTarget>,
    mut fire_events: MessageWriter<FireRequested>,
) {
    let fire_pressed = mouse.just_pressed(MouseButton::Left)
        || keyboard.just_pressed(KeyCode::Space)
        || touches.any_just_pressed();
    if !fire_pressed {
        return;
    }

    fire_events.write(FireRequested { aim: aim.0 });
}

/// Draw a dotted aim line from the muzzle to the aim point.
fn draw_aim_line(
    mut gizmos: Gizmos,
    round: Res<RoundController>,
    field: Res<PlayField>,
    aim: Res<AimTarget>,
) {
    // No aim line while the shot is airborne.
    if round.projectile().in_flight {
        return;
    }

    let start = field.to_world(field.muzzle());
    let end = field.to_world(aim.0);

    let segments = 15;
    let segment = (end - start) / segments as f32;
    for i in 0..segments {
        if i % 2 == 0 {
            let seg_start = start + segment * i as f32;
            let seg_end = start + segment * (i as f32 + 0.7);
            gizmos.line_2d(seg_start, seg_end, Color::srgba(1.0, 1.0, 1.0, 0.6));
        }
    }
}
