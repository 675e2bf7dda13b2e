pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod executor;
pub mod search;
pub mod task;
pub mod tool;
