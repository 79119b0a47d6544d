use crate::assembly::path_assembler::TransferPath;
use crate::core::error::ReconstructionError;
use crate::core::stream::StreamCompleted;
use crate::core::transfer::{ElementaryTransfer, TransferSet};
use crate::reconstruction::engine::PathReconstructor;
use alloy_primitives::B256;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Everything the ingestion layer observed in one transaction that matters
/// for path reconstruction: its elementary transfers and its
/// stream-completion events.
///
/// The snapshot is read-only input. Each stream event is reconstructed from
/// the transfers logged before it, never from shared mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSnapshot {
    pub transaction_hash: B256,
    #[serde(default)]
    pub transfers: TransferSet,
    #[serde(default)]
    pub streams: Vec<StreamCompleted>,
}

impl TransactionSnapshot {
    pub fn new(transaction_hash: B256) -> Self {
        Self {
            transaction_hash,
            transfers: TransferSet::new(),
            streams: Vec::new(),
        }
    }

    pub fn add_transfer(&mut self, transfer: ElementaryTransfer) {
        self.transfers.add(transfer);
    }

    pub fn add_stream(&mut self, stream: StreamCompleted) {
        self.streams.push(stream);
    }

    /// Transfers logged before `log_index`, in log-position order.
    pub fn transfers_before(&self, log_index: u64) -> Vec<ElementaryTransfer> {
        self.transfers.preceding(log_index)
    }
}

/// A stream event that produced no path record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedStream {
    pub path_id: String,
    #[serde(rename = "reason", serialize_with = "serialize_display")]
    pub error: ReconstructionError,
}

fn serialize_display<S: Serializer>(
    error: &ReconstructionError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Outcome of reconstructing every stream event of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionReport {
    pub transaction_hash: B256,
    /// Emitted records, in stream log order.
    pub paths: Vec<TransferPath>,
    pub skipped: Vec<SkippedStream>,
}

impl TransactionReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl fmt::Display for TransactionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transaction {}", self.transaction_hash)?;
        writeln!(
            f,
            "Reconstructed: {}   Skipped: {}\n",
            self.paths.len(),
            self.skipped.len()
        )?;
        for path in &self.paths {
            writeln!(f, "{}", path)?;
        }
        for skipped in &self.skipped {
            writeln!(f, "Skipped {}: {}", skipped.path_id, skipped.error)?;
        }
        Ok(())
    }
}

impl PathReconstructor {
    /// Reconstruct every stream event of a transaction, in log order.
    ///
    /// A failed event is recorded in `skipped` and never affects the others,
    /// including invariant violations.
    pub fn reconstruct_transaction(&self, snapshot: &TransactionSnapshot) -> TransactionReport {
        let mut streams: Vec<&StreamCompleted> = snapshot.streams.iter().collect();
        streams.sort_by_key(|s| s.log_index);

        let mut paths = Vec::new();
        let mut skipped = Vec::new();
        for stream in streams {
            let transfers = snapshot.transfers_before(stream.log_index);
            match self.reconstruct(stream, &transfers) {
                Ok(path) => paths.push(path),
                Err(error) => skipped.push(SkippedStream {
                    path_id: stream.path_id(),
                    error,
                }),
            }
        }

        TransactionReport {
            transaction_hash: snapshot.transaction_hash,
            paths,
            skipped,
        }
    }
}
