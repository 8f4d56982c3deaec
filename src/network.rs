// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use crate::geodesy::{distance, interpolate};
use crate::osm::MapStore;
use crate::{AdjacencyMatrix, GeoNode, IdTranslation, NodeId, NodeRecord};

/// Routable network built from a [MapStore].
///
/// Every node has a compact index in `0..len()`, which is used to address
/// the [AdjacencyMatrix]. Nodes read from the map come first (in order of the first
/// reference by a way), followed by nodes created by interpolation.
///
/// A network is never modified after being built, except for [Network::delete_edge]
/// and [start point](Network::set_start_point) changes. Loading a different map requires
/// building a new network.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Network {
    pub(crate) nodes: Vec<NodeRecord>,
    pub(crate) translation: IdTranslation,
    pub(crate) matrix: AdjacencyMatrix,
    pub(crate) start: GeoNode,
    synthetic_count: usize,
}

impl Network {
    /// Returns the number of nodes in the network.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of nodes created by interpolation.
    pub fn interpolated_count(&self) -> usize {
        self.synthetic_count
    }

    /// Returns all nodes, in index order.
    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    /// Retrieves the node at the provided compact index.
    pub fn node_at(&self, idx: usize) -> Option<&NodeRecord> {
        self.nodes.get(idx)
    }

    /// Returns the compact index of a node, or `None` if the node
    /// isn't a part of the network.
    pub fn translate(&self, id: NodeId) -> Option<usize> {
        self.translation.index(id)
    }

    /// Returns the id of the node at the provided compact index.
    pub fn id_at(&self, idx: usize) -> Option<NodeId> {
        self.translation.id(idx)
    }

    pub fn translation(&self) -> &IdTranslation {
        &self.translation
    }

    /// Returns the adjacency matrix, indexed by compact node indices.
    pub fn matrix(&self) -> &AdjacencyMatrix {
        &self.matrix
    }

    /// Gets the length (in meters) of the direct edge between two nodes.
    pub fn edge(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.matrix.get(self.translate(a)?, self.translate(b)?)
    }

    /// Returns an iterator over all `(neighbor index, weight)` pairs for a node index.
    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.matrix.neighbors(idx)
    }

    /// Returns every edge of the network once.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, f64)> + '_ {
        self.matrix
            .edges()
            .map(|(i, j, w)| (self.nodes[i].id, self.nodes[j].id, w))
    }

    /// Removes the edge between two nodes, in both directions,
    /// e.g. after a route over it was rejected.
    ///
    /// Does nothing if either node isn't a part of the network.
    pub fn delete_edge(&mut self, a: NodeId, b: NodeId) {
        match (self.translate(a), self.translate(b)) {
            (Some(i), Some(j)) => {
                if self.matrix.remove(i, j) {
                    log::debug!("deleted edge {}-{}", a, b);
                }
            }
            _ => log::debug!("can't delete edge {}-{}: unknown node", a, b),
        }
    }
}

/// Smallest accepted [NetworkBuilder::interpolation] distance, in meters.
pub const MIN_INTERPOLATION_DISTANCE: f64 = 0.01;

/// Maximum number of parts a single segment can be split into by interpolation.
pub const MAX_SEGMENT_PARTS: usize = 1 << 20;

/// Helper object converting a [MapStore] into a [Network].
#[derive(Debug)]
pub struct NetworkBuilder<'a> {
    store: &'a MapStore,
    max_distance: Option<f64>,
}

impl<'a> NetworkBuilder<'a> {
    /// Creates a builder for the provided store, with interpolation disabled.
    pub fn new(store: &'a MapStore) -> Self {
        Self {
            store,
            max_distance: None,
        }
    }

    /// Sets the maximum distance (in meters) between two consecutive nodes of a way.
    /// Longer segments are split with synthetic nodes, placed evenly in latitude/longitude
    /// space. On long segments far from the equator this needs more nodes than
    /// `ceil(d / max_distance) - 1`, and these are added until every part fits.
    ///
    /// Zero, negative or non-finite values disable interpolation, and so do values
    /// below [MIN_INTERPOLATION_DISTANCE]. Segments which would need more than
    /// [MAX_SEGMENT_PARTS] parts are kept as a single edge.
    pub fn interpolation(mut self, max_distance: f64) -> Self {
        let accepted = max_distance.is_finite() && max_distance >= MIN_INTERPOLATION_DISTANCE;
        self.max_distance = if accepted {
            Some(max_distance)
        } else {
            if max_distance < MIN_INTERPOLATION_DISTANCE && max_distance > 0.0 {
                log::warn!(
                    "interpolation distance {} m is below {} m - interpolation disabled",
                    max_distance,
                    MIN_INTERPOLATION_DISTANCE,
                );
            } else if max_distance < 0.0 || max_distance.is_nan() {
                log::warn!(
                    "invalid interpolation distance {} - interpolation disabled",
                    max_distance
                );
            }
            None
        };
        self
    }

    pub fn build(self) -> Network {
        let mut state = BuildState::default();

        for record in self.store.nodes() {
            state.add_node(*record);
        }
        let original_count = state.nodes.len();

        for w in self.store.ways() {
            for pair in w.nodes.windows(2) {
                // MapStore guarantees that all referenced nodes were loaded
                let (Some(u), Some(v)) = (
                    state.translation.index(NodeId::Osm(pair[0])),
                    state.translation.index(NodeId::Osm(pair[1])),
                ) else {
                    continue;
                };

                state.add_segment(u, v, self.max_distance);
            }
        }

        let mut matrix = AdjacencyMatrix::new(state.nodes.len());
        for &(i, j, w) in &state.edges {
            matrix.set(i, j, w);
        }

        let start = state
            .nodes
            .first()
            .map(|r| r.node)
            .unwrap_or(GeoNode::ORIGIN);

        log::debug!(
            "built network with {} nodes ({} interpolated) and {} edge writes",
            state.nodes.len(),
            state.nodes.len() - original_count,
            state.edges.len(),
        );

        Network {
            synthetic_count: state.nodes.len() - original_count,
            nodes: state.nodes,
            translation: state.translation,
            matrix,
            start,
        }
    }
}

/// Intermediate state of [NetworkBuilder::build]. Edges are only collected,
/// as the matrix size is known only after interpolation.
#[derive(Debug, Default)]
struct BuildState {
    nodes: Vec<NodeRecord>,
    translation: IdTranslation,
    edges: Vec<(usize, usize, f64)>,
    interpolated_segments: HashSet<(usize, usize)>,
    synthetic_id_counter: u64,
}

impl BuildState {
    fn add_node(&mut self, record: NodeRecord) -> usize {
        let idx = self.translation.insert(record.id);
        if idx == self.nodes.len() {
            self.nodes.push(record);
        }
        idx
    }

    fn add_segment(&mut self, u: usize, v: usize, max_distance: Option<f64>) {
        let a = self.nodes[u].node;
        let b = self.nodes[v].node;
        let d = distance(&a, &b);

        match max_distance {
            Some(max) if d > max => self.add_interpolated_segment(u, v, d, max),
            _ => self.edges.push((u, v, d)),
        }
    }

    /// Replaces the u-v segment by a chain of edges through
    /// `ceil(d / max) - 1` synthetic nodes.
    fn add_interpolated_segment(&mut self, u: usize, v: usize, d: f64, max: f64) {
        // Segments shared by multiple ways (in any direction) share the synthetic nodes
        if !self.interpolated_segments.insert((u.min(v), u.max(v))) {
            return;
        }

        let a = self.nodes[u].node;
        let b = self.nodes[v].node;
        let Some(parts) = segment_parts(&a, &b, d, max) else {
            log::warn!(
                "segment {}-{} of {:.1} m needs more than {} parts - not interpolating",
                self.nodes[u].id,
                self.nodes[v].id,
                d,
                MAX_SEGMENT_PARTS,
            );
            self.edges.push((u, v, d));
            return;
        };

        let mut previous = u;
        for i in 1..parts {
            let node = interpolate(&a, &b, i as f64 / parts as f64);
            let id = NodeId::Synthetic(self.synthetic_id_counter);
            self.synthetic_id_counter += 1;

            let current = self.add_node(NodeRecord { id, node });
            self.push_edge(previous, current);
            previous = current;
        }
        self.push_edge(previous, v);
    }

    fn push_edge(&mut self, i: usize, j: usize) {
        let d = distance(&self.nodes[i].node, &self.nodes[j].node);
        self.edges.push((i, j, d));
    }
}

/// Number of evenly spaced (in latitude/longitude) parts of the a-b segment
/// needed for every part to be at most `max` long. `None` if that exceeds [MAX_SEGMENT_PARTS].
fn segment_parts(a: &GeoNode, b: &GeoNode, d: f64, max: f64) -> Option<usize> {
    let estimate = (d / max).ceil();
    if !(estimate <= MAX_SEGMENT_PARTS as f64) {
        return None;
    }

    let mut parts = (estimate as usize).max(1);
    while longest_part(a, b, parts) > max {
        if parts >= MAX_SEGMENT_PARTS {
            return None;
        }
        parts += 1;
    }
    Some(parts)
}

fn longest_part(a: &GeoNode, b: &GeoNode, parts: usize) -> f64 {
    let at = |i: usize| interpolate(a, b, i as f64 / parts as f64);
    (0..parts)
        .map(|i| distance(&at(i), &at(i + 1)))
        .fold(0.0, f64::max)
}
