pub mod geodesy;
pub mod projection;
pub mod ray;
pub mod vec;

pub use geodesy::*;
pub use projection::*;
pub use ray::*;
pub use vec::*;
