//! Random simulation over any `Game`.

pub mod playout;

pub use playout::{random_playout, random_playouts, Playout, PlayoutConfig};
