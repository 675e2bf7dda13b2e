pub mod execution;
pub mod strategy;

pub use execution::*;
pub use strategy::*;
