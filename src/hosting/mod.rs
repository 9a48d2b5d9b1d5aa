mod arena;
mod bridge;
mod limiter;
mod reaper;
mod request;
mod server;

pub use arena::*;
pub use bridge::*;
pub use limiter::*;
pub use reaper::*;
pub use request::*;
pub use server::*;
