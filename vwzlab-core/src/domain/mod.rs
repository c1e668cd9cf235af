//! Domain types shared across the engine.

pub mod bar;
pub mod position;
pub mod trade;

pub use bar::Bar;
pub use position::{Direction, Position};
pub use trade::{ExitReason, Trade};
