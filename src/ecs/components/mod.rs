pub mod physics;

pub use physics::*;
