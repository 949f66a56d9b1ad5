//! Built-in monitors of the daemon.
mod clock;
pub use clock::Clock;

mod load;
pub use load::LoadAvg;
