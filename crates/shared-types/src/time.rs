//! Wall-clock access for timestamps stored in records.
//!
//! Deadlines themselves are driven by `tokio::time`; this source only stamps
//! records with unix milliseconds.

/// Time source for record timestamps
pub trait TimeSource: Send + Sync {
    /// Current unix timestamp in milliseconds
    fn now_millis(&self) -> u64;
}

/// Default time source using system time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}
