use std::time::Duration;

/// 重试策略
///
/// `attempt` is the 0-based index of the attempt that just failed.
pub trait RetryStrategy: Send + Sync {
    fn name(&self) -> &str;
    fn next_delay(&self, attempt: u32) -> Duration;
}
