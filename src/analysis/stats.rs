use crate::assembly::path_assembler::TransferPath;
use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Activity summary of one account across reconstructed path records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathStats {
    /// Records the account originated.
    pub sent_count: usize,
    /// Records the account received without having originated them.
    pub received_count: usize,
    /// Counted records that are circular.
    pub circular_count: usize,
    pub total_hops: usize,
    pub max_hops: usize,
}

impl PathStats {
    /// Summarise the records in which `address` is the sender or the recipient.
    /// Records not involving `address` are ignored.
    pub fn for_address<'a>(
        paths: impl IntoIterator<Item = &'a TransferPath>,
        address: Address,
    ) -> Self {
        let mut stats = Self::default();
        for path in paths {
            if path.original_sender == address {
                stats.sent_count += 1;
            } else if path.final_recipient == address {
                stats.received_count += 1;
            } else {
                continue;
            }

            if path.is_circular {
                stats.circular_count += 1;
            }
            stats.total_hops += path.total_hops;
            stats.max_hops = stats.max_hops.max(path.total_hops);
        }
        stats
    }

    pub fn path_count(&self) -> usize {
        self.sent_count + self.received_count
    }

    /// Mean hops per counted record, 0 when there are none.
    pub fn average_hops(&self) -> f64 {
        if self.path_count() == 0 {
            return 0.0;
        }
        self.total_hops as f64 / self.path_count() as f64
    }
}

impl fmt::Display for PathStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sent:      {}", self.sent_count)?;
        writeln!(f, "Received:  {}", self.received_count)?;
        writeln!(f, "Circular:  {}", self.circular_count)?;
        writeln!(f, "Max hops:  {}", self.max_hops)?;
        writeln!(f, "Avg hops:  {:.1}", self.average_hops())
    }
}

/// Selection criteria over path records. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathFilter {
    pub min_hops: Option<usize>,
    pub max_hops: Option<usize>,
    pub circular_only: bool,
    /// Inclusive lower bound on the block timestamp.
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the block timestamp.
    pub until: Option<DateTime<Utc>>,
}

impl PathFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_hops(mut self, hops: usize) -> Self {
        self.min_hops = Some(hops);
        self
    }

    pub fn max_hops(mut self, hops: usize) -> Self {
        self.max_hops = Some(hops);
        self
    }

    pub fn circular_only(mut self) -> Self {
        self.circular_only = true;
        self
    }

    pub fn between(mut self, since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self.until = Some(until);
        self
    }

    pub fn matches(&self, path: &TransferPath) -> bool {
        if self.min_hops.is_some_and(|min| path.total_hops < min) {
            return false;
        }
        if self.max_hops.is_some_and(|max| path.total_hops > max) {
            return false;
        }
        if self.circular_only && !path.is_circular {
            return false;
        }
        if self.since.is_some_and(|since| path.timestamp < since) {
            return false;
        }
        if self.until.is_some_and(|until| path.timestamp > until) {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, paths: &'a [TransferPath]) -> Vec<&'a TransferPath> {
        paths.iter().filter(|p| self.matches(p)).collect()
    }
}
