//! hecs integration.

pub mod components;

pub mod prelude {
    pub use super::components::physics::{
        Controls, FlightModel, Hull, Motion, PhysicalBody, RigidState,
    };
    pub use crate::physics::interpolation::StateHistory;
}
