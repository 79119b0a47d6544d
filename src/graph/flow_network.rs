use crate::core::error::ReconstructionError;
use crate::core::transfer::ElementaryTransfer;
use crate::graph::circularity::{CircularityAdapter, Vertex};
use crate::graph::edge::FlowEdge;
use alloy_primitives::{Address, U256};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use std::collections::HashMap;

/// All edges from one node to one neighbour, in exploration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor {
    pub target: NodeIndex,
    pub edges: Vec<EdgeIndex>,
}

/// The flow multigraph of one stream event.
///
/// Nodes and edges live in a `petgraph` arena and are addressed by their
/// integer handles. Exploration order is kept separately in `adjacency`,
/// because it must be stable and independent of how the arena links its
/// edges:
///
/// - a node's neighbours appear in order of the first transfer between the pair;
/// - edges towards one neighbour are grouped by token id, groups in order of
///   first appearance, each group in transfer order.
///
/// The same transfer list therefore always yields the same network and the
/// same search order.
///
/// # Examples
///
/// ```
/// use stream_path_engine::core::transfer::ElementaryTransfer;
/// use stream_path_engine::graph::flow_network::FlowNetwork;
/// use alloy_primitives::{Address, B256, U256};
///
/// let (a, b) = (Address::with_last_byte(1), Address::with_last_byte(2));
/// let transfers = vec![
///     ElementaryTransfer::single(B256::ZERO, 0, a, b, U256::from(1), a, U256::from(50)),
///     ElementaryTransfer::single(B256::ZERO, 1, a, b, U256::from(1), a, U256::from(30)),
/// ];
///
/// let network = FlowNetwork::build(&transfers, a, b).unwrap();
/// assert_eq!(network.node_count(), 2);
/// assert_eq!(network.edge_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    graph: DiGraph<Vertex, FlowEdge>,
    nodes: HashMap<Vertex, NodeIndex>,
    adjacency: Vec<Vec<Neighbor>>,
    adapter: CircularityAdapter,
}

impl FlowNetwork {
    /// Build the network for a stream from `source` to `sink`.
    ///
    /// `transfers` must already be in log-position order: for circular
    /// streams the position of a transfer decides whether it closes the cycle.
    pub fn build(
        transfers: &[ElementaryTransfer],
        source: Address,
        sink: Address,
    ) -> Result<Self, ReconstructionError> {
        if transfers.is_empty() {
            return Err(ReconstructionError::EmptyTransferSet {
                sender: source,
                recipient: sink,
            });
        }

        let adapter = CircularityAdapter::new(source, sink, transfers.len());

        // Group by (from, effective to, token id), first appearance first.
        let mut groups: Vec<Vec<FlowEdge>> = Vec::new();
        let mut group_of: HashMap<(Address, Vertex, U256), usize> = HashMap::new();
        for (index, transfer) in transfers.iter().enumerate() {
            let to = adapter.destination(index, transfer.to());
            let key = (transfer.from(), to, transfer.token_id());
            let slot = *group_of.entry(key).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(FlowEdge::new(transfer.clone(), to));
        }

        let mut network = Self {
            graph: DiGraph::new(),
            nodes: HashMap::new(),
            adjacency: Vec::new(),
            adapter,
        };
        for edge in groups.into_iter().flatten() {
            network.insert(edge);
        }

        log::debug!(
            "built flow network: {} nodes, {} edges, circular: {}",
            network.node_count(),
            network.edge_count(),
            adapter.is_circular()
        );
        Ok(network)
    }

    fn insert(&mut self, edge: FlowEdge) {
        let from = self.intern(Vertex::Account(edge.from()));
        let to = self.intern(edge.to());
        let index = self.graph.add_edge(from, to, edge);

        let neighbors = &mut self.adjacency[from.index()];
        match neighbors.iter_mut().find(|n| n.target == to) {
            Some(neighbor) => neighbor.edges.push(index),
            None => neighbors.push(Neighbor {
                target: to,
                edges: vec![index],
            }),
        }
    }

    fn intern(&mut self, vertex: Vertex) -> NodeIndex {
        if let Some(&index) = self.nodes.get(&vertex) {
            return index;
        }
        let index = self.graph.add_node(vertex);
        self.nodes.insert(vertex, index);
        self.adjacency.push(Vec::new());
        index
    }

    /// The circularity policy this network was built with.
    pub fn adapter(&self) -> &CircularityAdapter {
        &self.adapter
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Handle of `vertex`, if any transfer touches it.
    pub fn node_index(&self, vertex: Vertex) -> Option<NodeIndex> {
        self.nodes.get(&vertex).copied()
    }

    pub fn vertex(&self, node: NodeIndex) -> Vertex {
        self.graph[node]
    }

    /// Neighbours of `node` in exploration order.
    pub fn neighbors(&self, node: NodeIndex) -> &[Neighbor] {
        self.adjacency
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn edge(&self, edge: EdgeIndex) -> &FlowEdge {
        &self.graph[edge]
    }

    pub fn edge_mut(&mut self, edge: EdgeIndex) -> &mut FlowEdge {
        &mut self.graph[edge]
    }

    /// Source and target handles of `edge`.
    pub fn endpoints(&self, edge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(edge)
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &FlowEdge> {
        self.graph.edge_weights()
    }

    /// Total flow not yet assigned to any path.
    pub fn remaining_flow(&self) -> U256 {
        self.edges()
            .fold(U256::ZERO, |acc, e| acc.saturating_add(e.available_flow()))
    }
}
