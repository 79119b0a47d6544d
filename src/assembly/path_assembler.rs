use crate::core::stream::{hop_id, StreamCompleted};
use crate::core::transfer::{TransferId, TransferKind};
use crate::extraction::path_extractor::Path;
use alloy_primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a path record covers all flow the search could find.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecompositionStatus {
    /// No route with available flow remained when extraction stopped.
    #[default]
    Complete,
    /// Extraction stopped at the path ceiling with flow still unassigned.
    Partial,
}

/// One hop of a reconstructed payment path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferHop {
    pub id: String,
    pub path_id: String,
    /// Position across all hops of the record, starting at 0.
    pub hop_index: usize,
    /// Which extracted path this hop belongs to, in discovery order.
    pub path_number: usize,
    pub from: Address,
    pub to: Address,
    pub token_id: U256,
    pub token_address: Address,
    /// The owning path's bottleneck flow, not the transfer's gross value.
    pub value: U256,
    pub transfer_type: TransferKind,
    pub transfer_id: TransferId,
    pub log_index: u64,
    pub batch_index: u32,
}

/// The reconstructed payment paths of one stream-completion event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPath {
    pub id: String,
    pub transaction_hash: B256,
    pub log_index: u64,
    pub block_number: u64,
    pub timestamp: DateTime<Utc>,
    pub operator: Address,
    /// The declared stream source.
    pub original_sender: Address,
    /// The declared stream sink.
    pub final_recipient: Address,
    pub is_circular: bool,
    pub total_hops: usize,
    pub total_paths: usize,
    pub received_token_ids: Vec<U256>,
    pub received_amounts: Vec<U256>,
    pub status: DecompositionStatus,
    /// All hops, ordered by `hop_index`.
    pub hops: Vec<TransferHop>,
}

impl TransferPath {
    pub fn is_complete(&self) -> bool {
        self.status == DecompositionStatus::Complete
    }

    /// Hops of the path numbered `path_number`.
    pub fn path_hops(&self, path_number: usize) -> impl Iterator<Item = &TransferHop> {
        self.hops
            .iter()
            .filter(move |hop| hop.path_number == path_number)
    }

    /// Bottleneck flow of each path, in path-number order.
    pub fn path_flows(&self) -> Vec<U256> {
        (0..self.total_paths)
            .map(|n| self.path_hops(n).next().map(|hop| hop.value).unwrap_or(U256::ZERO))
            .collect()
    }

    /// Combined flow of all paths.
    pub fn total_flow(&self) -> U256 {
        self.path_flows()
            .into_iter()
            .fold(U256::ZERO, |acc, flow| acc.saturating_add(flow))
    }
}

impl fmt::Display for TransferPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Transfer Path {} ===", self.id)?;
        writeln!(f, "Sender:     {}", self.original_sender)?;
        writeln!(f, "Recipient:  {}", self.final_recipient)?;
        writeln!(f, "Circular:   {}", self.is_circular)?;
        writeln!(f, "Status:     {:?}", self.status)?;
        writeln!(f, "Paths:      {}", self.total_paths)?;
        writeln!(f, "Hops:       {}", self.total_hops)?;
        writeln!(f, "Total flow: {}", self.total_flow())?;

        for path_number in 0..self.total_paths {
            let hops: Vec<&TransferHop> = self.path_hops(path_number).collect();
            let value = hops.first().map(|hop| hop.value).unwrap_or(U256::ZERO);
            writeln!(f, "\n--- Path {} (flow {}) ---", path_number, value)?;
            for hop in hops {
                writeln!(
                    f,
                    "  #{:<3} {} -> {}  token {}",
                    hop.hop_index, hop.from, hop.to, hop.token_id
                )?;
            }
        }
        Ok(())
    }
}

/// Turns extracted paths into the external path/hop records.
pub struct PathAssembler;

impl PathAssembler {
    /// Number paths in discovery order and hops globally across them.
    ///
    /// Every hop is attributed its path's bottleneck flow. `total_hops` is the
    /// sum of path lengths and `total_paths` the number of paths.
    pub fn assemble(
        paths: &[Path],
        stream: &StreamCompleted,
        status: DecompositionStatus,
    ) -> TransferPath {
        let path_id = stream.path_id();
        let mut hops = Vec::with_capacity(paths.iter().map(Path::len).sum());

        for (path_number, path) in paths.iter().enumerate() {
            for edge in path.edges() {
                let hop_index = hops.len();
                let transfer = &edge.transfer;
                hops.push(TransferHop {
                    id: hop_id(&path_id, hop_index),
                    path_id: path_id.clone(),
                    hop_index,
                    path_number,
                    from: edge.from,
                    to: edge.to,
                    token_id: transfer.token_id(),
                    token_address: transfer.token_address(),
                    value: path.flow(),
                    transfer_type: transfer.kind(),
                    transfer_id: transfer.id().clone(),
                    log_index: transfer.log_index(),
                    batch_index: transfer.batch_index(),
                });
            }
        }

        TransferPath {
            id: path_id,
            transaction_hash: stream.transaction_hash,
            log_index: stream.log_index,
            block_number: stream.block_number,
            timestamp: stream.timestamp,
            operator: stream.operator,
            original_sender: stream.from,
            final_recipient: stream.to,
            is_circular: stream.is_circular(),
            total_hops: hops.len(),
            total_paths: paths.len(),
            received_token_ids: stream.ids.clone(),
            received_amounts: stream.amounts.clone(),
            status,
            hops,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transfer::ElementaryTransfer;
    use crate::extraction::path_extractor::PathExtractor;
    use crate::graph::flow_network::FlowNetwork;

    fn addr(n: u8) -> Address {
        Address::with_last_byte(n)
    }

    fn transfer(log_index: u64, from: u8, to: u8, value: u64) -> ElementaryTransfer {
        ElementaryTransfer::single(
            B256::repeat_byte(0x77),
            log_index,
            addr(from),
            addr(to),
            U256::from(3),
            addr(0xee),
            U256::from(value),
        )
    }

    fn assemble(transfers: &[ElementaryTransfer], source: u8, sink: u8) -> TransferPath {
        let mut network = FlowNetwork::build(transfers, addr(source), addr(sink)).unwrap();
        let extraction = PathExtractor::default().extract_all(&mut network).unwrap();
        let stream = StreamCompleted::new(B256::repeat_byte(0x77), 99, addr(source), addr(sink))
            .with_received(vec![U256::from(3)], vec![U256::from(100)]);
        PathAssembler::assemble(&extraction.paths, &stream, DecompositionStatus::Complete)
    }

    #[test]
    fn test_hop_numbering_is_global() {
        // Two paths: A->B->D (flow 40) then A->C->D (flow 25).
        let record = assemble(
            &[
                transfer(0, 1, 2, 40),
                transfer(1, 1, 3, 25),
                transfer(2, 2, 4, 40),
                transfer(3, 3, 4, 25),
            ],
            1,
            4,
        );
        assert_eq!(record.total_paths, 2);
        assert_eq!(record.total_hops, 4);

        let indices: Vec<usize> = record.hops.iter().map(|h| h.hop_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        let numbers: Vec<usize> = record.hops.iter().map(|h| h.path_number).collect();
        assert_eq!(numbers, vec![0, 0, 1, 1]);
        assert_eq!(record.path_flows(), vec![U256::from(40), U256::from(25)]);
        assert_eq!(record.total_flow(), U256::from(65));
    }

    #[test]
    fn test_hop_value_is_bottleneck_not_capacity() {
        let record = assemble(&[transfer(0, 1, 2, 100), transfer(1, 2, 3, 30)], 1, 3);
        assert_eq!(record.total_paths, 1);
        assert!(record.hops.iter().all(|h| h.value == U256::from(30)));
    }

    #[test]
    fn test_record_carries_stream_metadata() {
        let record = assemble(&[transfer(0, 1, 2, 10)], 1, 2);
        assert_eq!(record.id, format!("0x{}-99", "77".repeat(32)));
        assert_eq!(record.log_index, 99);
        assert_eq!(record.original_sender, addr(1));
        assert_eq!(record.final_recipient, addr(2));
        assert!(!record.is_circular);
        assert_eq!(record.received_amounts, vec![U256::from(100)]);
        assert!(record.is_complete());

        let hop = &record.hops[0];
        assert_eq!(hop.id, format!("{}-0", record.id));
        assert_eq!(hop.path_id, record.id);
        assert_eq!(hop.transfer_type, TransferKind::Single);
        assert_eq!(hop.log_index, 0);
        assert_eq!(hop.token_address, addr(0xee));
    }

    #[test]
    fn test_empty_paths_produce_empty_record() {
        let stream = StreamCompleted::new(B256::ZERO, 1, addr(1), addr(2));
        let record = PathAssembler::assemble(&[], &stream, DecompositionStatus::Complete);
        assert_eq!(record.total_paths, 0);
        assert_eq!(record.total_hops, 0);
        assert_eq!(record.total_flow(), U256::ZERO);
    }

    #[test]
    fn test_display_lists_paths() {
        let record = assemble(&[transfer(0, 1, 2, 10)], 1, 2);
        let text = record.to_string();
        assert!(text.contains("Paths:      1"));
        assert!(text.contains("--- Path 0 (flow 10) ---"));
    }
}
