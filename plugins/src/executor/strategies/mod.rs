pub mod retry;

pub use retry::LinearRetry;
