//! # stream-path-engine
//!
//! Reconstructs the multi-hop payment paths behind a stream-completion event.
//!
//! A stream settles a payment from one account to another through a chain of
//! intermediaries, one token transfer per hop. Given the transfers logged
//! before the event, this engine recovers the individual routes the payment
//! took and the flow each one carried, including circular streams where the
//! sender pays itself.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: transfers, stream events, configuration, errors
//! - **graph** — Flow network over transfers, circular-stream terminal handling
//! - **extraction** — Augmenting-path decomposition of the network
//! - **assembly** — Numbered hop records for each decomposed path
//! - **reconstruction** — Per-event entry point and per-transaction batching
//! - **analysis** — Statistics and filters over reconstructed records
//! - **simulation** — Random stream generation for testing and benchmarking

pub mod analysis;
pub mod assembly;
pub mod core;
pub mod extraction;
pub mod graph;
pub mod reconstruction;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::analysis::stats::{PathFilter, PathStats};
    pub use crate::assembly::path_assembler::{
        DecompositionStatus, PathAssembler, TransferHop, TransferPath,
    };
    pub use crate::core::config::{CapPolicy, ReconstructionConfig};
    pub use crate::core::error::ReconstructionError;
    pub use crate::core::stream::StreamCompleted;
    pub use crate::core::transfer::{ElementaryTransfer, TransferKind, TransferSet};
    pub use crate::extraction::path_extractor::PathExtractor;
    pub use crate::graph::flow_network::FlowNetwork;
    pub use crate::reconstruction::engine::PathReconstructor;
    pub use crate::reconstruction::transaction::{TransactionReport, TransactionSnapshot};
}
