//! drive - engine-agnostic arcade vehicle dynamics (pure types + tick function)

pub mod types;
pub mod handbrake;
pub mod longitudinal;
pub mod steering;
pub mod state;
pub mod solve;

pub use types::*;
pub use solve::advance;
