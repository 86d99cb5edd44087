//! Vehicle module containing kinematics, range sensors and collision footprint.

mod footprint;
mod kinematics;
pub mod radar;

pub use footprint::{Footprint, SpriteLoadError};
pub use kinematics::*;
pub use radar::RadarReading;
