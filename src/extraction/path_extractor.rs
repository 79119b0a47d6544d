use crate::core::config::DEFAULT_MAX_PATHS;
use crate::core::error::ReconstructionError;
use crate::core::transfer::ElementaryTransfer;
use crate::graph::circularity::Vertex;
use crate::graph::flow_network::FlowNetwork;
use alloy_primitives::{Address, U256};
use petgraph::graph::{EdgeIndex, NodeIndex};
use std::collections::VecDeque;

/// One hop of an extracted path.
///
/// `to` is always a real account: edges rerouted to the virtual terminal are
/// mapped back to the sink before a path leaves the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversedEdge {
    pub from: Address,
    pub to: Address,
    /// Whether the search reached this hop's destination as the virtual terminal.
    pub remapped: bool,
    pub transfer: ElementaryTransfer,
}

/// A source-to-sink route and the flow it carries.
///
/// `flow` is the bottleneck: the smallest available flow among the edges at
/// the moment the path was extracted. It is always positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    edges: Vec<TraversedEdge>,
    flow: U256,
}

impl Path {
    /// Hops in traversal order.
    pub fn edges(&self) -> &[TraversedEdge] {
        &self.edges
    }

    pub fn flow(&self) -> U256 {
        self.flow
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Result of decomposing one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Paths in discovery order.
    pub paths: Vec<Path>,
    /// The path ceiling was reached while a route with available flow remained.
    pub capped: bool,
}

impl Extraction {
    pub fn total_flow(&self) -> U256 {
        self.paths
            .iter()
            .fold(U256::ZERO, |acc, p| acc.saturating_add(p.flow()))
    }

    pub fn total_hops(&self) -> usize {
        self.paths.iter().map(Path::len).sum()
    }
}

/// Decomposes a flow network into source-to-sink paths by repeated
/// breadth-first augmenting-path search.
///
/// # Algorithm
///
/// 1. BFS from the source over edges with available flow, visiting each node
///    at most once and exploring neighbours in the network's stable order.
///    For each newly reached neighbour, the first edge with flow left is taken.
/// 2. On reaching the effective sink, walk the parent links back to the source.
/// 3. The bottleneck is the minimum available flow along that route; it is
///    assigned to every edge of the route.
/// 4. Repeat until no route remains or `max_paths` paths have been extracted.
///
/// Each round costs at most one pass over the network, and the number of
/// rounds is bounded by `max_paths`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathExtractor {
    max_paths: usize,
}

impl Default for PathExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PATHS)
    }
}

impl PathExtractor {
    pub fn new(max_paths: usize) -> Self {
        Self { max_paths }
    }

    pub fn max_paths(&self) -> usize {
        self.max_paths
    }

    /// Extract paths until the network is exhausted or the ceiling is hit.
    pub fn extract_all(&self, network: &mut FlowNetwork) -> Result<Extraction, ReconstructionError> {
        let mut paths = Vec::new();
        while paths.len() < self.max_paths {
            match Self::extract_one(network)? {
                Some(path) => {
                    log::trace!(
                        "path {}: {} hops, flow {}",
                        paths.len(),
                        path.len(),
                        path.flow()
                    );
                    paths.push(path);
                }
                None => break,
            }
        }

        let capped = paths.len() >= self.max_paths && Self::has_route(network)?;
        if capped {
            log::debug!(
                "stopped at {} paths with {} flow unassigned",
                paths.len(),
                network.remaining_flow()
            );
        }

        Ok(Extraction { paths, capped })
    }

    /// Find one route, assign its bottleneck flow and return it as a path.
    ///
    /// Returns `None` once no route with available flow reaches the sink.
    pub fn extract_one(network: &mut FlowNetwork) -> Result<Option<Path>, ReconstructionError> {
        let Some((source, sink)) = Self::endpoints(network) else {
            return Ok(None);
        };
        let Some(route) = Self::find_route(network, source, sink)? else {
            return Ok(None);
        };

        let flow = route
            .iter()
            .map(|&e| network.edge(e).available_flow())
            .min()
            .unwrap_or(U256::ZERO);
        // Unreachable while the search only follows edges with flow left.
        if flow.is_zero() {
            return Ok(None);
        }

        for &e in &route {
            network.edge_mut(e).consume(flow)?;
        }

        let adapter = *network.adapter();
        let edges = route
            .iter()
            .map(|&e| {
                let edge = network.edge(e);
                TraversedEdge {
                    from: edge.from(),
                    to: adapter.restore(edge.to()),
                    remapped: edge.is_remapped(),
                    transfer: edge.transfer().clone(),
                }
            })
            .collect();

        Ok(Some(Path { edges, flow }))
    }

    fn has_route(network: &FlowNetwork) -> Result<bool, ReconstructionError> {
        match Self::endpoints(network) {
            Some((source, sink)) => Ok(Self::find_route(network, source, sink)?.is_some()),
            None => Ok(false),
        }
    }

    fn endpoints(network: &FlowNetwork) -> Option<(NodeIndex, NodeIndex)> {
        let adapter = network.adapter();
        let source = network.node_index(Vertex::Account(adapter.source()))?;
        let sink = network.node_index(adapter.effective_sink())?;
        Some((source, sink))
    }

    fn find_route(
        network: &FlowNetwork,
        source: NodeIndex,
        sink: NodeIndex,
    ) -> Result<Option<Vec<EdgeIndex>>, ReconstructionError> {
        let node_count = network.node_count();
        let mut visited = vec![false; node_count];
        let mut parent: Vec<Option<(NodeIndex, EdgeIndex)>> = vec![None; node_count];
        let mut queue = VecDeque::new();

        visited[source.index()] = true;
        queue.push_back(source);

        while let Some(current) = queue.pop_front() {
            if current == sink {
                return Self::trace_back(&parent, source, sink).map(Some);
            }

            for neighbor in network.neighbors(current) {
                let target = neighbor.target.index();
                if visited[target] {
                    continue;
                }
                let usable = neighbor
                    .edges
                    .iter()
                    .copied()
                    .find(|&e| network.edge(e).has_available_flow());
                if let Some(edge) = usable {
                    visited[target] = true;
                    parent[target] = Some((current, edge));
                    queue.push_back(neighbor.target);
                }
            }
        }

        Ok(None)
    }

    fn trace_back(
        parent: &[Option<(NodeIndex, EdgeIndex)>],
        source: NodeIndex,
        sink: NodeIndex,
    ) -> Result<Vec<EdgeIndex>, ReconstructionError> {
        let mut edges = Vec::new();
        let mut node = sink;
        while let Some((prev, edge)) = parent[node.index()] {
            edges.push(edge);
            node = prev;
            if edges.len() > parent.len() {
                return Err(violation("parent links form a cycle".to_string()));
            }
        }

        if node != source {
            return Err(violation(format!(
                "parent links end at node {} instead of the source",
                node.index()
            )));
        }
        if edges.is_empty() {
            return Err(violation("route to the sink has no edges".to_string()));
        }

        edges.reverse();
        Ok(edges)
    }
}

/// Report an internal defect: panic in debug builds, error out in release.
fn violation(message: String) -> ReconstructionError {
    log::error!("invariant violated during path extraction: {}", message);
    if cfg!(debug_assertions) {
        panic!("invariant violated: {message}");
    }
    ReconstructionError::InvariantViolation(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;

    fn addr(n: u8) -> Address {
        Address::with_last_byte(n)
    }

    fn transfer(log_index: u64, from: u8, to: u8, value: u64) -> ElementaryTransfer {
        ElementaryTransfer::single(
            B256::ZERO,
            log_index,
            addr(from),
            addr(to),
            U256::from(1),
            addr(0xee),
            U256::from(value),
        )
    }

    fn extract(transfers: &[ElementaryTransfer], source: u8, sink: u8) -> Extraction {
        let mut network = FlowNetwork::build(transfers, addr(source), addr(sink)).unwrap();
        PathExtractor::default().extract_all(&mut network).unwrap()
    }

    fn route(path: &Path) -> Vec<(Address, Address)> {
        path.edges().iter().map(|e| (e.from, e.to)).collect()
    }

    #[test]
    fn test_single_transfer() {
        let result = extract(&[transfer(0, 1, 2, 100)], 1, 2);
        assert_eq!(result.paths.len(), 1);
        assert_eq!(result.paths[0].len(), 1);
        assert_eq!(result.paths[0].flow(), U256::from(100));
        assert!(!result.capped);
    }

    #[test]
    fn test_two_hop_chain() {
        let result = extract(&[transfer(0, 1, 2, 60), transfer(1, 2, 3, 60)], 1, 3);
        assert_eq!(result.paths.len(), 1);
        assert_eq!(route(&result.paths[0]), vec![(addr(1), addr(2)), (addr(2), addr(3))]);
        assert_eq!(result.paths[0].flow(), U256::from(60));
    }

    #[test]
    fn test_parallel_edges_in_discovery_order() {
        let result = extract(&[transfer(0, 1, 2, 50), transfer(1, 1, 2, 30)], 1, 2);
        let flows: Vec<U256> = result.paths.iter().map(Path::flow).collect();
        assert_eq!(flows, vec![U256::from(50), U256::from(30)]);
    }

    #[test]
    fn test_bottleneck_limits_flow() {
        // A->B 100, B->C 30, B->C 70
        let result = extract(
            &[transfer(0, 1, 2, 100), transfer(1, 2, 3, 30), transfer(2, 2, 3, 70)],
            1,
            3,
        );
        let flows: Vec<U256> = result.paths.iter().map(Path::flow).collect();
        assert_eq!(flows, vec![U256::from(30), U256::from(70)]);
        assert_eq!(result.total_flow(), U256::from(100));
        assert_eq!(result.total_hops(), 4);
    }

    #[test]
    fn test_circular_stream_unremaps_sink() {
        let result = extract(&[transfer(0, 1, 2, 40), transfer(1, 2, 1, 40)], 1, 1);
        assert_eq!(result.paths.len(), 1);
        let path = &result.paths[0];
        assert_eq!(route(path), vec![(addr(1), addr(2)), (addr(2), addr(1))]);
        assert!(!path.edges()[0].remapped);
        assert!(path.edges()[1].remapped);
        assert_eq!(path.flow(), U256::from(40));
    }

    #[test]
    fn test_unreachable_sink() {
        let result = extract(&[transfer(0, 1, 2, 10), transfer(1, 3, 4, 10)], 1, 4);
        assert!(result.paths.is_empty());
        assert!(!result.capped);
    }

    #[test]
    fn test_source_without_edges() {
        let result = extract(&[transfer(0, 2, 3, 10)], 1, 3);
        assert!(result.paths.is_empty());
    }

    #[test]
    fn test_bfs_prefers_fewest_hops() {
        // A->B->C->D and A->D; the direct edge is found first.
        let result = extract(
            &[
                transfer(0, 1, 2, 10),
                transfer(1, 2, 3, 10),
                transfer(2, 3, 4, 10),
                transfer(3, 1, 4, 5),
            ],
            1,
            4,
        );
        assert_eq!(result.paths.len(), 2);
        assert_eq!(result.paths[0].len(), 1);
        assert_eq!(result.paths[1].len(), 3);
    }

    #[test]
    fn test_cap_with_flow_remaining_is_flagged() {
        let transfers: Vec<_> = (0..3).map(|i| transfer(i, 1, 2, 10)).collect();
        let mut network = FlowNetwork::build(&transfers, addr(1), addr(2)).unwrap();
        let result = PathExtractor::new(2).extract_all(&mut network).unwrap();
        assert_eq!(result.paths.len(), 2);
        assert!(result.capped);
        assert_eq!(network.remaining_flow(), U256::from(10));
    }

    #[test]
    fn test_cap_reached_exactly_is_complete() {
        let transfers: Vec<_> = (0..3).map(|i| transfer(i, 1, 2, 10)).collect();
        let mut network = FlowNetwork::build(&transfers, addr(1), addr(2)).unwrap();
        let result = PathExtractor::new(3).extract_all(&mut network).unwrap();
        assert_eq!(result.paths.len(), 3);
        assert!(!result.capped);
    }

    #[test]
    fn test_used_never_exceeds_capacity() {
        let transfers = vec![
            transfer(0, 1, 2, 100),
            transfer(1, 1, 3, 50),
            transfer(2, 2, 3, 70),
            transfer(3, 3, 4, 90),
            transfer(4, 2, 4, 20),
        ];
        let mut network = FlowNetwork::build(&transfers, addr(1), addr(4)).unwrap();
        PathExtractor::default().extract_all(&mut network).unwrap();
        assert!(network.edges().all(|e| e.used() <= e.capacity()));
    }

    #[test]
    fn test_extract_one_on_exhausted_network() {
        let mut network = FlowNetwork::build(&[transfer(0, 1, 2, 5)], addr(1), addr(2)).unwrap();
        assert!(PathExtractor::extract_one(&mut network).unwrap().is_some());
        assert!(PathExtractor::extract_one(&mut network).unwrap().is_none());
    }
}
