use std::time::Duration;

/// Dispatch policy
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Per-attempt deadline; restarts on every retry.
    pub task_timeout: Duration,
    /// Additional attempts after the first one when miners stay silent.
    pub retry_budget: u32,
    /// Finished tasks kept in memory for status queries and late
    /// responses. Older ones are answered from the task history.
    pub archive_capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            task_timeout: Duration::from_secs(30),
            retry_budget: 1,
            archive_capacity: 1024,
        }
    }
}

impl DispatchConfig {
    pub fn task_timeout_ms(&self) -> u64 {
        u64::try_from(self.task_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}
