use crate::core::error::ReconstructionError;
use crate::core::transfer::ElementaryTransfer;
use crate::graph::circularity::Vertex;
use alloy_primitives::{Address, U256};

/// One observed transfer as a directed, capacity-bearing edge.
///
/// Identity is `(from, to, token_id)`, but parallel edges with the same
/// identity are kept apart: each carries its own `capacity` and `used`.
/// `to` is the *effective* destination, which for the closing edges of a
/// circular stream is the virtual terminal rather than the real sink.
///
/// Invariant: `used <= capacity` at all times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEdge {
    from: Address,
    to: Vertex,
    capacity: U256,
    used: U256,
    transfer: ElementaryTransfer,
}

impl FlowEdge {
    /// Build an edge for `transfer` that ends at `to`.
    pub fn new(transfer: ElementaryTransfer, to: Vertex) -> Self {
        Self {
            from: transfer.from(),
            to,
            capacity: transfer.value(),
            used: U256::ZERO,
            transfer,
        }
    }

    pub fn from(&self) -> Address {
        self.from
    }

    /// The destination the path search sees.
    pub fn to(&self) -> Vertex {
        self.to
    }

    pub fn token_id(&self) -> U256 {
        self.transfer.token_id()
    }

    /// The transfer this edge was built from.
    pub fn transfer(&self) -> &ElementaryTransfer {
        &self.transfer
    }

    pub fn capacity(&self) -> U256 {
        self.capacity
    }

    pub fn used(&self) -> U256 {
        self.used
    }

    /// Flow not yet assigned to an extracted path.
    pub fn available_flow(&self) -> U256 {
        // `used <= capacity` is upheld by `consume`.
        self.capacity - self.used
    }

    pub fn has_available_flow(&self) -> bool {
        self.used < self.capacity
    }

    /// Whether this edge was rerouted to the virtual terminal.
    pub fn is_remapped(&self) -> bool {
        self.to == Vertex::VirtualTerminal
    }

    /// Assign `amount` of this edge's capacity to an extracted path.
    pub fn consume(&mut self, amount: U256) -> Result<(), ReconstructionError> {
        let used = self
            .used
            .checked_add(amount)
            .filter(|used| *used <= self.capacity)
            .ok_or_else(|| {
                ReconstructionError::InvariantViolation(format!(
                    "edge {} -> {} (transfer {}) would carry {} + {} over capacity {}",
                    self.from,
                    self.to,
                    self.transfer.id(),
                    self.used,
                    amount,
                    self.capacity
                ))
            })?;
        self.used = used;
        Ok(())
    }
}
