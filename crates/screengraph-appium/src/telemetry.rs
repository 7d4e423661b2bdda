//! Per-facade health, usage counters and the invocation log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use screengraph_core::ToolErrorType;

/// Lifecycle state of an [`crate::AppiumTools`] facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolState {
    Uninitialized,
    Initialized,
    Connected,
    Disconnected,
    Disposed,
}

impl ToolState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolState::Uninitialized => "UNINITIALIZED",
            ToolState::Initialized => "INITIALIZED",
            ToolState::Connected => "CONNECTED",
            ToolState::Disconnected => "DISCONNECTED",
            ToolState::Disposed => "DISPOSED",
        }
    }
}

impl std::fmt::Display for ToolState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time health snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolHealthStatus {
    pub state: ToolState,
    pub is_connected: bool,
    pub last_success_at: Option<DateTime<Utc>>,
    /// Failures since the last successful call.
    pub consecutive_failures: u32,
    pub last_error_kind: Option<ToolErrorType>,
}

/// Cumulative call counters. `attempted == succeeded + failed` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolUsageStats {
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub failures_by_kind: BTreeMap<ToolErrorType, u64>,
    pub total_latency_ms: u64,
}

impl ToolUsageStats {
    pub fn average_latency_ms(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.total_latency_ms as f64 / self.attempted as f64
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.attempted as f64
        }
    }
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolLogEntry {
    pub tool: String,
    /// Short human-readable summary of the arguments.
    pub arguments: String,
    pub success: bool,
    pub error_kind: Option<ToolErrorType>,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// Mutable bookkeeping owned by one facade.
#[derive(Debug, Default)]
pub(crate) struct Telemetry {
    stats: ToolUsageStats,
    log: Vec<ToolLogEntry>,
    consecutive_failures: u32,
    last_success_at: Option<DateTime<Utc>>,
    last_error_kind: Option<ToolErrorType>,
}

impl Telemetry {
    pub(crate) fn record(
        &mut self,
        tool: &str,
        arguments: String,
        error_kind: Option<ToolErrorType>,
        elapsed: Duration,
    ) {
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let now = Utc::now();

        self.stats.attempted += 1;
        self.stats.total_latency_ms = self.stats.total_latency_ms.saturating_add(duration_ms);
        match error_kind {
            None => {
                self.stats.succeeded += 1;
                self.consecutive_failures = 0;
                self.last_success_at = Some(now);
            }
            Some(kind) => {
                self.stats.failed += 1;
                *self.stats.failures_by_kind.entry(kind).or_insert(0) += 1;
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.last_error_kind = Some(kind);
            }
        }

        self.log.push(ToolLogEntry {
            tool: tool.to_string(),
            arguments,
            success: error_kind.is_none(),
            error_kind,
            duration_ms,
            timestamp: now,
        });
    }

    pub(crate) fn stats(&self) -> ToolUsageStats {
        self.stats.clone()
    }

    pub(crate) fn reset_stats(&mut self) {
        self.stats = ToolUsageStats::default();
    }

    pub(crate) fn log(&self) -> Vec<ToolLogEntry> {
        self.log.clone()
    }

    pub(crate) fn health(&self, state: ToolState, is_connected: bool) -> ToolHealthStatus {
        ToolHealthStatus {
            state,
            is_connected,
            last_success_at: self.last_success_at,
            consecutive_failures: self.consecutive_failures,
            last_error_kind: self.last_error_kind,
        }
    }
}
