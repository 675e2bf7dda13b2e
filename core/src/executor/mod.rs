//! Retrying execution of tasks.
//!
//! ```text
//! PENDING → RUNNING ─┬→ SUCCESS
//!                    ├→ FAILED
//!                    └→ RETRYING ─(sleep next_delay)→ RUNNING …
//! ```

mod backoff;
mod engine;
pub mod traits;

pub use backoff::ExponentialBackoff;
pub use engine::TaskExecutor;
pub use traits::{RetryStrategy, TaskExecution};
