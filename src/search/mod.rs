mod cache;
mod decision;
mod fingerprint;
mod minimax;
mod opening;
mod opponent;
mod patterns;

pub use cache::*;
pub use decision::*;
pub use fingerprint::*;
pub use minimax::*;
pub use opening::*;
pub use opponent::*;
pub use patterns::*;
