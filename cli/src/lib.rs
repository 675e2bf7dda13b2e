//! taskweave-cli library: exposes the command wiring for tests.

pub mod app;
pub mod commands;
