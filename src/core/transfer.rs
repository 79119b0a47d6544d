use alloy_primitives::{hex, Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference back to the transfer record an edge was built from.
///
/// Derived from the transaction hash and the log position of the transfer:
/// `"{txHash}-{logIndex}-{batchIndex}"`.
///
/// # Examples
///
/// ```
/// use stream_path_engine::core::transfer::TransferId;
/// use alloy_primitives::B256;
///
/// let id = TransferId::derive(B256::repeat_byte(0xab), 7, 2);
/// assert!(id.as_str().ends_with("-7-2"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(String);

impl TransferId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the id the ingestion layer assigns to a transfer.
    pub fn derive(transaction_hash: B256, log_index: u64, batch_index: u32) -> Self {
        Self(format!(
            "{}-{}-{}",
            hex::encode_prefixed(transaction_hash),
            log_index,
            batch_index
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which on-chain event an elementary transfer was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferKind {
    #[serde(rename = "TransferSingle")]
    Single,
    #[serde(rename = "TransferBatch")]
    Batch,
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferKind::Single => write!(f, "TransferSingle"),
            TransferKind::Batch => write!(f, "TransferBatch"),
        }
    }
}

/// A single token movement between two accounts.
///
/// This is the atomic unit observed on-chain. A `TransferSingle` log yields
/// one elementary transfer with `batch_index == 0`; a `TransferBatch` log
/// yields one per item, numbered by position in the batch.
///
/// Transfers are immutable once created and ordered by
/// `(log_index, batch_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementaryTransfer {
    id: TransferId,
    from: Address,
    to: Address,
    token_id: U256,
    token_address: Address,
    value: U256,
    kind: TransferKind,
    log_index: u64,
    #[serde(default)]
    batch_index: u32,
}

impl ElementaryTransfer {
    /// Create a transfer decoded from a `TransferSingle` log.
    pub fn single(
        transaction_hash: B256,
        log_index: u64,
        from: Address,
        to: Address,
        token_id: U256,
        token_address: Address,
        value: U256,
    ) -> Self {
        Self {
            id: TransferId::derive(transaction_hash, log_index, 0),
            from,
            to,
            token_id,
            token_address,
            value,
            kind: TransferKind::Single,
            log_index,
            batch_index: 0,
        }
    }

    /// Create one item of a `TransferBatch` log.
    #[allow(clippy::too_many_arguments)]
    pub fn batch_item(
        transaction_hash: B256,
        log_index: u64,
        batch_index: u32,
        from: Address,
        to: Address,
        token_id: U256,
        token_address: Address,
        value: U256,
    ) -> Self {
        Self {
            id: TransferId::derive(transaction_hash, log_index, batch_index),
            from,
            to,
            token_id,
            token_address,
            value,
            kind: TransferKind::Batch,
            log_index,
            batch_index,
        }
    }

    // --- Accessors ---

    pub fn id(&self) -> &TransferId {
        &self.id
    }

    pub fn from(&self) -> Address {
        self.from
    }

    pub fn to(&self) -> Address {
        self.to
    }

    pub fn token_id(&self) -> U256 {
        self.token_id
    }

    pub fn token_address(&self) -> Address {
        self.token_address
    }

    pub fn value(&self) -> U256 {
        self.value
    }

    pub fn kind(&self) -> TransferKind {
        self.kind
    }

    pub fn log_index(&self) -> u64 {
        self.log_index
    }

    pub fn batch_index(&self) -> u32 {
        self.batch_index
    }

    /// Ordering key within a transaction.
    pub fn position(&self) -> (u64, u32) {
        (self.log_index, self.batch_index)
    }
}

/// All elementary transfers observed in one transaction, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferSet {
    transfers: Vec<ElementaryTransfer>,
}

impl TransferSet {
    pub fn new() -> Self {
        Self {
            transfers: Vec::new(),
        }
    }

    pub fn add(&mut self, transfer: ElementaryTransfer) {
        self.transfers.push(transfer);
    }

    pub fn transfers(&self) -> &[ElementaryTransfer] {
        &self.transfers
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// The read-only snapshot a stream event at `log_index` is reconstructed from:
    /// every transfer logged strictly before it, in log-position order.
    pub fn preceding(&self, log_index: u64) -> Vec<ElementaryTransfer> {
        let mut snapshot: Vec<ElementaryTransfer> = self
            .transfers
            .iter()
            .filter(|t| t.log_index < log_index)
            .cloned()
            .collect();
        // Stable sort keeps arrival order for duplicate positions.
        snapshot.sort_by_key(|t| t.position());
        snapshot
    }
}

impl FromIterator<ElementaryTransfer> for TransferSet {
    fn from_iter<T: IntoIterator<Item = ElementaryTransfer>>(iter: T) -> Self {
        Self {
            transfers: iter.into_iter().collect(),
        }
    }
}
