use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of the flow network.
///
/// `VirtualTerminal` is a synthetic sink used only while searching a circular
/// stream. It can never be confused with a real account because it is not an
/// address at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Vertex {
    Account(Address),
    VirtualTerminal,
}

impl Vertex {
    pub fn as_account(&self) -> Option<Address> {
        match self {
            Vertex::Account(address) => Some(*address),
            Vertex::VirtualTerminal => None,
        }
    }
}

impl From<Address> for Vertex {
    fn from(address: Address) -> Self {
        Vertex::Account(address)
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vertex::Account(address) => write!(f, "{address}"),
            Vertex::VirtualTerminal => write!(f, "(virtual terminal)"),
        }
    }
}

/// Decides where each transfer's edge ends so that circular streams
/// (source == sink) can be solved by ordinary source-to-sink search, and maps
/// the virtual terminal back to the real sink afterwards.
///
/// In a circular stream, a transfer into the sink may either close the cycle
/// or merely pass through the sink account mid-route; the addresses alone do
/// not tell them apart. The rule used is positional: a transfer into the sink
/// that sits in the second half of the ordered transfer list
/// (`index >= len / 2`) is treated as closing the cycle and rerouted to the
/// virtual terminal.
///
/// This is a heuristic, kept exactly as is for compatibility with already
/// indexed data. A stream with several terminal-bound transfers in irregular
/// order can be misclassified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircularityAdapter {
    source: Address,
    sink: Address,
    transfer_count: usize,
}

impl CircularityAdapter {
    pub fn new(source: Address, sink: Address, transfer_count: usize) -> Self {
        Self {
            source,
            sink,
            transfer_count,
        }
    }

    pub fn source(&self) -> Address {
        self.source
    }

    pub fn sink(&self) -> Address {
        self.sink
    }

    pub fn is_circular(&self) -> bool {
        self.source == self.sink
    }

    /// Effective destination of the transfer at `index` whose real destination is `to`.
    pub fn destination(&self, index: usize, to: Address) -> Vertex {
        if self.is_circular() && to == self.sink && index >= self.transfer_count / 2 {
            Vertex::VirtualTerminal
        } else {
            Vertex::Account(to)
        }
    }

    /// The node path search must reach.
    pub fn effective_sink(&self) -> Vertex {
        if self.is_circular() {
            Vertex::VirtualTerminal
        } else {
            Vertex::Account(self.sink)
        }
    }

    /// Undo the remapping: the virtual terminal stands for the real sink.
    pub fn restore(&self, vertex: Vertex) -> Address {
        match vertex {
            Vertex::Account(address) => address,
            Vertex::VirtualTerminal => self.sink,
        }
    }
}
