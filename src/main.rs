use bevy::prelude::*;
use bubbleworlds::AppPlugin;

fn main() -> AppExit {
    App::new().add_plugins(AppPlugin).run()
}
