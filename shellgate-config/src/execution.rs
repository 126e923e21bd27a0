use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Wall-clock limit (in seconds) for foreground commands.
    #[serde(default = "ExecutionConfig::default_foreground_timeout_seconds")]
    pub foreground_timeout_seconds: u64,
    /// Maximum characters kept from each of stdout and stderr.
    #[serde(default = "ExecutionConfig::default_max_output_chars")]
    pub max_output_chars: usize,
    /// Maximum characters returned when tailing a background log.
    #[serde(default = "ExecutionConfig::default_tail_max_chars")]
    pub tail_max_chars: usize,
    /// Time (in milliseconds) between SIGTERM and SIGKILL when stopping.
    #[serde(default = "ExecutionConfig::default_stop_grace_period_ms")]
    pub stop_grace_period_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            foreground_timeout_seconds: Self::default_foreground_timeout_seconds(),
            max_output_chars: Self::default_max_output_chars(),
            tail_max_chars: Self::default_tail_max_chars(),
            stop_grace_period_ms: Self::default_stop_grace_period_ms(),
        }
    }
}

impl ExecutionConfig {
    const fn default_foreground_timeout_seconds() -> u64 {
        60
    }

    const fn default_max_output_chars() -> usize {
        4000
    }

    const fn default_tail_max_chars() -> usize {
        3500
    }

    const fn default_stop_grace_period_ms() -> u64 {
        500
    }

    pub fn foreground_timeout(&self) -> Duration {
        Duration::from_secs(self.foreground_timeout_seconds)
    }

    pub fn stop_grace_period(&self) -> Duration {
        Duration::from_millis(self.stop_grace_period_ms)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.foreground_timeout_seconds >= 1,
            "execution.foreground_timeout_seconds must be at least 1 second"
        );
        ensure!(
            self.max_output_chars >= 1,
            "execution.max_output_chars must be at least 1"
        );
        ensure!(
            self.tail_max_chars >= 1,
            "execution.tail_max_chars must be at least 1"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let config = ExecutionConfig::default();
        assert_eq!(config.foreground_timeout(), Duration::from_secs(60));
        assert_eq!(config.max_output_chars, 4000);
        assert_eq!(config.tail_max_chars, 3500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = ExecutionConfig {
            foreground_timeout_seconds: 0,
            ..ExecutionConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
