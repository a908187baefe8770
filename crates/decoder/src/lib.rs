pub mod collector;
pub mod decoder;
pub mod environment;
pub mod filter;
pub mod processor;
pub mod transform;

pub use collector::*;
pub use decoder::*;
pub use environment::*;
pub use filter::*;
pub use processor::*;
pub use transform::*;
