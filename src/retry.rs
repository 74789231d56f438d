use async_trait::async_trait;
use std::time::Duration;

/// 失败类型，决定下一次重试前的等待时间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailure {
    /// 行情源返回空数据
    Empty,
    /// 请求或解析出错
    Error,
}

/// Retry policy for price fetches. `max_attempts` counts every attempt,
/// including the first.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub empty_backoff: Duration,
    pub error_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            empty_backoff: Duration::from_secs(2),
            error_backoff: Duration::from_secs(3),
        }
    }

    /// Delay before the attempt following failed attempt `attempt` (1-based),
    /// or `None` when no attempts remain.
    pub fn next_delay(&self, attempt: u32, failure: FetchFailure) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        Some(match failure {
            FetchFailure::Empty => self.empty_backoff,
            FetchFailure::Error => self.error_backoff,
        })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// 等待抽象，测试中可替换为不真正睡眠的实现
#[async_trait]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_depends_on_failure_kind() {
        let policy = RetryPolicy::new(3);
        assert_eq!(policy.next_delay(1, FetchFailure::Empty), Some(Duration::from_secs(2)));
        assert_eq!(policy.next_delay(2, FetchFailure::Error), Some(Duration::from_secs(3)));
    }

    #[test]
    fn no_delay_after_last_attempt() {
        let policy = RetryPolicy::new(3);
        assert_eq!(policy.next_delay(3, FetchFailure::Empty), None);
        assert_eq!(policy.next_delay(3, FetchFailure::Error), None);
    }

    #[test]
    fn single_attempt_policy_never_waits() {
        let policy = RetryPolicy::new(1);
        assert_eq!(policy.next_delay(1, FetchFailure::Error), None);
    }
}
