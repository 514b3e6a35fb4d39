pub mod accumulator;
pub mod filter;
pub mod flatten;
pub mod groups;

// Re-export the main types for easy access
pub use accumulator::*;
pub use filter::*;
pub use flatten::*;
pub use groups::*;
