mod game;
mod ids;
mod player;
mod room;
mod stats;
mod status;

pub use game::*;
pub use ids::*;
pub use player::*;
pub use room::*;
pub use stats::*;
pub use status::*;
