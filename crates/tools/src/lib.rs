pub mod input;
pub mod report;

pub use input::*;
pub use report::*;
