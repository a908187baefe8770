pub mod camera;
pub mod config;
pub mod controls;
pub mod events;

pub use camera::*;
pub use config::*;
pub use controls::*;
pub use events::*;
