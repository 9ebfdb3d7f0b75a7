//! Chronoscope: computing history explorer. Runs the history_explorer app.

use bevy::prelude::*;
use history_explorer::prelude::ExplorerBuilder;

fn main() -> AppExit {
    let _ = dotenvy::dotenv();

    match ExplorerBuilder::new().build() {
        Ok(mut app) => app.run(),
        Err(err) => {
            eprintln!("chronoscope: {err}");
            AppExit::error()
        }
    }
}
