pub mod backend;
pub mod executor;
pub mod factory;
pub mod memory;
pub mod search;
pub mod tools;
