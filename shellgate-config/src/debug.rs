//! Logging configuration

use serde::{Deserialize, Serialize};

/// Trace level for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl TraceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }
}

impl std::fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TraceLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw).unwrap_or_default())
    }
}

/// Logging configuration used when `RUST_LOG` is not set.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct DebugConfig {
    /// Trace level (error, warn, info, debug, trace)
    #[serde(default)]
    pub trace_level: TraceLevel,

    /// Tracing targets to enable at `trace_level`.
    /// Examples: "shellgate_core::registry", "shellgate_bash_runner"
    #[serde(default)]
    pub trace_targets: Vec<String>,
}

impl DebugConfig {
    /// Default crate targets filtered at the configured level.
    const DEFAULT_TARGETS: &'static [&'static str] = &[
        "shellgate",
        "shellgate_core",
        "shellgate_bash_runner",
        "shellgate_config",
        "shellgate_commons",
    ];

    /// Build an `EnvFilter`-compatible directive string.
    pub fn filter_directive(&self) -> String {
        let level = self.trace_level.as_str();
        if self.trace_targets.is_empty() {
            Self::DEFAULT_TARGETS
                .iter()
                .map(|target| format!("{target}={level}"))
                .collect::<Vec<_>>()
                .join(",")
        } else {
            self.trace_targets
                .iter()
                .map(|target| format!("{target}={level}"))
                .collect::<Vec<_>>()
                .join(",")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_level_parsing() {
        assert_eq!(TraceLevel::parse("DEBUG"), Some(TraceLevel::Debug));
        assert_eq!(TraceLevel::parse(" warn "), Some(TraceLevel::Warn));
        assert_eq!(TraceLevel::parse("verbose"), None);
    }

    #[test]
    fn filter_directive_uses_targets() {
        let config = DebugConfig {
            trace_level: TraceLevel::Debug,
            trace_targets: vec!["shellgate_core::registry".to_string()],
        };
        assert_eq!(config.filter_directive(), "shellgate_core::registry=debug");
    }

    #[test]
    fn default_filter_covers_workspace_crates() {
        let directive = DebugConfig::default().filter_directive();
        assert!(directive.contains("shellgate_core=info"));
        assert!(directive.contains("shellgate_bash_runner=info"));
    }
}
