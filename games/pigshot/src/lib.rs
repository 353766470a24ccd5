use wasm_bindgen::prelude::*;

mod boundary;
mod game;
mod launch;
mod score;
mod targets;
mod tuning;

use game::PigShot;

pigshot_web::export_game!(PigShot, "pigshot");
