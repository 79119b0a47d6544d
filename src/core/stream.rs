use alloy_primitives::{hex, Address, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stream-completion event: the protocol's signal that a multi-hop payment
/// from `from` to `to` has finished.
///
/// `ids` and `amounts` are the tokens the sink reports as received. They are
/// carried through to the output record untouched and play no part in the
/// decomposition itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCompleted {
    pub transaction_hash: B256,
    pub log_index: u64,
    #[serde(default)]
    pub block_number: u64,
    #[serde(default = "epoch")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub operator: Address,
    pub from: Address,
    pub to: Address,
    #[serde(default)]
    pub ids: Vec<U256>,
    #[serde(default)]
    pub amounts: Vec<U256>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

impl StreamCompleted {
    /// Minimal event with only the fields the decomposition needs.
    pub fn new(transaction_hash: B256, log_index: u64, from: Address, to: Address) -> Self {
        Self {
            transaction_hash,
            log_index,
            block_number: 0,
            timestamp: epoch(),
            operator: Address::ZERO,
            from,
            to,
            ids: Vec::new(),
            amounts: Vec::new(),
        }
    }

    pub fn with_block(mut self, block_number: u64, timestamp: DateTime<Utc>) -> Self {
        self.block_number = block_number;
        self.timestamp = timestamp;
        self
    }

    pub fn with_operator(mut self, operator: Address) -> Self {
        self.operator = operator;
        self
    }

    pub fn with_received(mut self, ids: Vec<U256>, amounts: Vec<U256>) -> Self {
        self.ids = ids;
        self.amounts = amounts;
        self
    }

    /// A stream is circular when it pays back into its own source.
    pub fn is_circular(&self) -> bool {
        self.from == self.to
    }

    /// Identifier of the path record built for this event: `"{txHash}-{logIndex}"`.
    pub fn path_id(&self) -> String {
        format!(
            "{}-{}",
            hex::encode_prefixed(self.transaction_hash),
            self.log_index
        )
    }
}

/// Identifier of the hop at `hop_index` within the path `path_id`.
pub fn hop_id(path_id: &str, hop_index: usize) -> String {
    format!("{}-{}", path_id, hop_index)
}
