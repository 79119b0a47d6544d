use crate::assembly::path_assembler::{DecompositionStatus, PathAssembler, TransferPath};
use crate::core::config::{CapPolicy, ReconstructionConfig};
use crate::core::error::ReconstructionError;
use crate::core::stream::StreamCompleted;
use crate::core::transfer::ElementaryTransfer;
use crate::extraction::path_extractor::PathExtractor;
use crate::graph::flow_network::FlowNetwork;

/// Reconstructs the payment paths of stream-completion events.
///
/// Reconstruction is a pure function of the event and its transfer snapshot:
/// each call builds its own network, decomposes it and throws it away. The
/// reconstructor holds nothing but its configuration, so one instance can be
/// shared across threads that each handle different events.
///
/// # Examples
///
/// ```
/// use stream_path_engine::prelude::*;
/// use alloy_primitives::{Address, B256, U256};
///
/// let (a, b, c) = (
///     Address::with_last_byte(1),
///     Address::with_last_byte(2),
///     Address::with_last_byte(3),
/// );
/// let tx = B256::repeat_byte(1);
/// let transfers = vec![
///     ElementaryTransfer::single(tx, 0, a, b, U256::from(1), a, U256::from(60)),
///     ElementaryTransfer::single(tx, 1, b, c, U256::from(2), b, U256::from(60)),
/// ];
/// let stream = StreamCompleted::new(tx, 2, a, c);
///
/// let record = PathReconstructor::default().reconstruct(&stream, &transfers).unwrap();
/// assert_eq!(record.total_paths, 1);
/// assert_eq!(record.total_hops, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PathReconstructor {
    config: ReconstructionConfig,
}

impl PathReconstructor {
    pub fn new(config: ReconstructionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconstructionConfig {
        &self.config
    }

    /// Reconstruct the paths of `stream` from `transfers`.
    ///
    /// `transfers` must be the transfers logged before the stream event in the
    /// same transaction, in log-position order (see
    /// [`TransferSet::preceding`](crate::core::transfer::TransferSet::preceding)).
    ///
    /// Errors are logged here: recoverable ones as warnings, invariant
    /// violations as errors.
    pub fn reconstruct(
        &self,
        stream: &StreamCompleted,
        transfers: &[ElementaryTransfer],
    ) -> Result<TransferPath, ReconstructionError> {
        let result = self.decompose(stream, transfers);
        if let Err(err) = &result {
            if err.is_recoverable() {
                log::warn!("skipping stream {}: {}", stream.path_id(), err);
            } else {
                log::error!("dropping stream {}: {}", stream.path_id(), err);
            }
        }
        result
    }

    fn decompose(
        &self,
        stream: &StreamCompleted,
        transfers: &[ElementaryTransfer],
    ) -> Result<TransferPath, ReconstructionError> {
        log::info!(
            "Reconstructing paths for {} transfers from {} to {}",
            transfers.len(),
            stream.from,
            stream.to
        );

        let mut network = FlowNetwork::build(transfers, stream.from, stream.to)?;
        let extraction = PathExtractor::new(self.config.max_paths).extract_all(&mut network)?;

        if extraction.paths.is_empty() {
            return Err(ReconstructionError::NoPathFound {
                sender: stream.from,
                recipient: stream.to,
            });
        }

        let status = if extraction.capped {
            match self.config.cap_policy {
                CapPolicy::Reject => {
                    return Err(ReconstructionError::CapacityExceeded {
                        cap: self.config.max_paths,
                    })
                }
                CapPolicy::Partial => {
                    log::warn!(
                        "stream {} capped at {} paths, emitting partial decomposition",
                        stream.path_id(),
                        self.config.max_paths
                    );
                    DecompositionStatus::Partial
                }
            }
        } else {
            DecompositionStatus::Complete
        };

        log::info!(
            "Found {} paths with total flow {}",
            extraction.paths.len(),
            extraction.total_flow()
        );

        Ok(PathAssembler::assemble(&extraction.paths, stream, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, U256};

    fn addr(n: u8) -> Address {
        Address::with_last_byte(n)
    }

    fn tx() -> B256 {
        B256::repeat_byte(0x42)
    }

    fn transfer(log_index: u64, from: u8, to: u8, value: u64) -> ElementaryTransfer {
        ElementaryTransfer::single(
            tx(),
            log_index,
            addr(from),
            addr(to),
            U256::from(1),
            addr(0xee),
            U256::from(value),
        )
    }

    fn fan_out(count: u64) -> Vec<ElementaryTransfer> {
        (0..count).map(|i| transfer(i, 1, 2, 10)).collect()
    }

    #[test]
    fn test_empty_transfers() {
        let stream = StreamCompleted::new(tx(), 5, addr(1), addr(2));
        let err = PathReconstructor::default()
            .reconstruct(&stream, &[])
            .unwrap_err();
        assert!(matches!(err, ReconstructionError::EmptyTransferSet { .. }));
    }

    #[test]
    fn test_no_path_found() {
        let stream = StreamCompleted::new(tx(), 5, addr(1), addr(4));
        let err = PathReconstructor::default()
            .reconstruct(&stream, &[transfer(0, 1, 2, 10), transfer(1, 3, 4, 10)])
            .unwrap_err();
        assert_eq!(
            err,
            ReconstructionError::NoPathFound {
                sender: addr(1),
                recipient: addr(4)
            }
        );
    }

    #[test]
    fn test_partial_policy_marks_record() {
        let config = ReconstructionConfig::default().with_max_paths(2);
        let stream = StreamCompleted::new(tx(), 9, addr(1), addr(2));
        let record = PathReconstructor::new(config)
            .reconstruct(&stream, &fan_out(5))
            .unwrap();
        assert_eq!(record.total_paths, 2);
        assert_eq!(record.status, DecompositionStatus::Partial);
        assert!(!record.is_complete());
    }

    #[test]
    fn test_reject_policy_reports_capacity_exceeded() {
        let config = ReconstructionConfig::default()
            .with_max_paths(2)
            .with_cap_policy(CapPolicy::Reject);
        let stream = StreamCompleted::new(tx(), 9, addr(1), addr(2));
        let err = PathReconstructor::new(config)
            .reconstruct(&stream, &fan_out(5))
            .unwrap_err();
        assert_eq!(err, ReconstructionError::CapacityExceeded { cap: 2 });
    }

    #[test]
    fn test_default_cap_is_one_hundred_paths() {
        let stream = StreamCompleted::new(tx(), 200, addr(1), addr(2));
        let record = PathReconstructor::default()
            .reconstruct(&stream, &fan_out(150))
            .unwrap();
        assert_eq!(record.total_paths, 100);
        assert_eq!(record.status, DecompositionStatus::Partial);
    }

    #[test]
    fn test_cap_not_hit_is_complete_under_reject() {
        let config = ReconstructionConfig::default()
            .with_max_paths(5)
            .with_cap_policy(CapPolicy::Reject);
        let stream = StreamCompleted::new(tx(), 9, addr(1), addr(2));
        let record = PathReconstructor::new(config)
            .reconstruct(&stream, &fan_out(5))
            .unwrap();
        assert_eq!(record.total_paths, 5);
        assert!(record.is_complete());
    }

    #[test]
    fn test_reconstructor_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PathReconstructor>();

        let reconstructor = PathReconstructor::default();
        let streams: Vec<StreamCompleted> = (0..4)
            .map(|i| StreamCompleted::new(B256::repeat_byte(i), 10, addr(1), addr(2)))
            .collect();
        let transfers = fan_out(3);

        let sequential: Vec<_> = streams
            .iter()
            .map(|s| reconstructor.reconstruct(s, &transfers).unwrap())
            .collect();
        let (shared, snapshot) = (&reconstructor, &transfers);
        let parallel: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = streams
                .iter()
                .map(|s| scope.spawn(move || shared.reconstruct(s, snapshot).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(sequential, parallel);
    }
}
