//! Execution status and its fixed total order.
//!
//! Capability flags are derived from "greater than" / "less than" comparisons
//! over this order, so the order is defined by an explicit rank table rather
//! than by the declaration order of the enum.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdminError;

/// Status of a job or step execution.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Completed,
    Starting,
    Started,
    Stopping,
    Stopped,
    Failed,
    Abandoned,
    /// Sentinel for a status the store could not determine.
    Unknown,
}

impl BatchStatus {
    /// Every status, lowest rank first.
    pub const ALL: [BatchStatus; 8] = [
        BatchStatus::Starting,
        BatchStatus::Started,
        BatchStatus::Stopping,
        BatchStatus::Stopped,
        BatchStatus::Completed,
        BatchStatus::Failed,
        BatchStatus::Abandoned,
        BatchStatus::Unknown,
    ];

    /// Position in the total order. Any new status must be slotted in here.
    pub const fn rank(self) -> u8 {
        match self {
            BatchStatus::Starting => 0,
            BatchStatus::Started => 1,
            BatchStatus::Stopping => 2,
            BatchStatus::Stopped => 3,
            BatchStatus::Completed => 4,
            BatchStatus::Failed => 5,
            BatchStatus::Abandoned => 6,
            BatchStatus::Unknown => 7,
        }
    }

    pub fn is_greater_than(self, other: BatchStatus) -> bool {
        self > other
    }

    pub fn is_less_than(self, other: BatchStatus) -> bool {
        self < other
    }

    /// Still owned by a running process (starting, started or stopping).
    pub fn is_running(self) -> bool {
        matches!(
            self,
            BatchStatus::Starting | BatchStatus::Started | BatchStatus::Stopping
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BatchStatus::Completed => "COMPLETED",
            BatchStatus::Starting => "STARTING",
            BatchStatus::Started => "STARTED",
            BatchStatus::Stopping => "STOPPING",
            BatchStatus::Stopped => "STOPPED",
            BatchStatus::Failed => "FAILED",
            BatchStatus::Abandoned => "ABANDONED",
            BatchStatus::Unknown => "UNKNOWN",
        }
    }
}

impl PartialOrd for BatchStatus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BatchStatus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchStatus {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BatchStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AdminError::validation("invalid.status", format!("unknown status: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_follows_rank_table_not_declaration() {
        // Completed is declared first but ranks after Stopped.
        assert!(BatchStatus::Completed > BatchStatus::Stopped);
        assert!(BatchStatus::Completed < BatchStatus::Failed);
        assert!(BatchStatus::Starting < BatchStatus::Started);
        assert!(BatchStatus::Abandoned < BatchStatus::Unknown);
    }

    #[test]
    fn all_is_sorted_and_total() {
        let mut sorted = BatchStatus::ALL;
        sorted.sort();
        assert_eq!(sorted, BatchStatus::ALL);

        for (i, a) in BatchStatus::ALL.iter().enumerate() {
            for (j, b) in BatchStatus::ALL.iter().enumerate() {
                assert_eq!(a.cmp(b), i.cmp(&j), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn running_statuses() {
        let running: Vec<_> = BatchStatus::ALL.into_iter().filter(|s| s.is_running()).collect();
        assert_eq!(
            running,
            vec![BatchStatus::Starting, BatchStatus::Started, BatchStatus::Stopping]
        );
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("started".parse::<BatchStatus>().unwrap(), BatchStatus::Started);
        assert_eq!("ABANDONED".parse::<BatchStatus>().unwrap(), BatchStatus::Abandoned);
        assert!("RUNNING".parse::<BatchStatus>().is_err());
    }

    #[test]
    fn serializes_as_upper_case_name() {
        let json = serde_json::to_value(BatchStatus::Stopping).unwrap();
        assert_eq!(json, serde_json::json!("STOPPING"));
    }
}
