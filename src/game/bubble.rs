//! Bubble colors and grid rendering.
//!
//! The palette is fixed per game instance; the grid and the matcher only
//! ever see `BubbleColor` values, and the mapping to display colors lives
//! here with the rest of the rendering concern. Grid bubbles are drawn from
//! the grid's read-only snapshot, rebuilt whenever the grid changes.

use bevy::prelude::*;
use rand::Rng;

use super::{
    grid::{BUBBLE_RADIUS, Grid},
    projectile::PlayField,
    round::RoundSystems,
};
use crate::AppSystems;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<BubbleColor>();
    app.add_systems(Startup, setup_bubble_assets);
    app.add_systems(
        Update,
        sync_grid_visuals.in_set(AppSystems::Update).after(RoundSystems),
    );
}

/// The four palette colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default)]
pub enum BubbleColor {
    #[default]
    Red,
    Green,
    Blue,
    Purple,
}

impl BubbleColor {
    /// Every palette color, in layout-letter order.
    pub const ALL: [BubbleColor; 4] = [
        BubbleColor::Red,
        BubbleColor::Green,
        BubbleColor::Blue,
        BubbleColor::Purple,
    ];

    /// The display color for rendering.
    pub fn to_color(self) -> Color {
        match self {
            BubbleColor::Red => Color::srgb(1.0, 0.0, 0.0),
            BubbleColor::Green => Color::srgb(0.0, 1.0, 0.0),
            BubbleColor::Blue => Color::srgb(0.0, 0.0, 1.0),
            BubbleColor::Purple => Color::srgb(0.5, 0.0, 0.5),
        }
    }

    /// A uniformly random palette color.
    pub fn random() -> Self {
        let mut rng = rand::rng();
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Parse a level-layout letter. Anything unrecognized is not a color.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'R' => Some(BubbleColor::Red),
            'G' => Some(BubbleColor::Green),
            'B' => Some(BubbleColor::Blue),
            'P' => Some(BubbleColor::Purple),
            _ => None,
        }
    }
}

/// Shared mesh and per-color material handles for bubble rendering.
#[derive(Resource)]
pub struct BubbleAssets {
    pub mesh: Handle<Mesh>,
    materials: [Handle<ColorMaterial>; 4],
}

impl BubbleAssets {
    pub fn material(&self, color: BubbleColor) -> Handle<ColorMaterial> {
        self.materials[color as usize].clone()
    }
}

/// Create the shared bubble mesh and materials.
///
/// Bubbles are drawn two pixels inside their logical radius so adjacent,
/// slightly overlapping bubbles keep a visible seam.
pub(super) fn setup_bubble_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let mesh = meshes.add(Circle::new(BUBBLE_RADIUS - 2.0));
    let handles =
        BubbleColor::ALL.map(|color| materials.add(ColorMaterial::from_color(color.to_color())));
    commands.insert_resource(BubbleAssets {
        mesh,
        materials: handles,
    });
}

/// Marker for grid bubble render entities.
#[derive(Component)]
struct GridBubbleVisual;

/// Rebuild the grid's render entities whenever its contents change.
fn sync_grid_visuals(
    mut commands: Commands,
    grid: Res<Grid>,
    field: Res<PlayField>,
    assets: Res<BubbleAssets>,
    existing: Query<Entity, With<GridBubbleVisual>>,
) {
    if !grid.is_changed() {
        return;
    }

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let mut count = 0;
    for (row, col, color) in grid.occupied() {
        let world = field.to_world(grid.cell_center(row, col));
        commands.spawn((
            Name::new(format!("Bubble {color:?} at ({row}, {col})")),
            GridBubbleVisual,
            Mesh2d(assets.mesh.clone()),
            MeshMaterial2d(assets.material(color)),
            Transform::from_translation(world.extend(0.0)),
        ));
        count += 1;
    }

    debug!("Rebuilt {count} grid bubble visuals");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_letters_cover_the_whole_palette() {
        for color in BubbleColor::ALL {
            let letter = match color {
                BubbleColor::Red => 'R',
                BubbleColor::Green => 'G',
                BubbleColor::Blue => 'B',
                BubbleColor::Purple => 'P',
            };
            assert_eq!(BubbleColor::from_letter(letter), Some(color));
        }
        assert_eq!(BubbleColor::from_letter('-'), None);
        assert_eq!(BubbleColor::from_letter('x'), None);
    }

    #[test]
    fn display_colors_are_distinct() {
        for (i, a) in BubbleColor::ALL.iter().enumerate() {
            for (j, b) in BubbleColor::ALL.iter().enumerate() {
                if i != j {
                    assert_ne!(a.to_color(), b.to_color());
                }
            }
        }
    }

    #[test]
    fn random_stays_inside_the_palette() {
        for _ in 0..32 {
            assert!(BubbleColor::ALL.contains(&BubbleColor::random()));
        }
    }
}
