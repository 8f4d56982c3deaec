// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use super::reader::{Document, Way};
use crate::{GeoNode, NodeId, NodeRecord};

/// Selects which ways of a [Document] take part in routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WayFilter {
    /// Tag key checked on every way, e.g. "highway".
    pub key: String,

    /// Accepted values under [WayFilter::key], e.g. "footway" or "path".
    ///
    /// An empty list disables value matching - every way
    /// with [WayFilter::key] present is then accepted.
    pub values: Vec<String>,
}

impl Default for WayFilter {
    fn default() -> Self {
        Self {
            key: "highway".to_string(),
            values: vec!["footway".to_string()],
        }
    }
}

impl WayFilter {
    pub fn new<K: Into<String>, V: IntoIterator<Item = S>, S: Into<String>>(
        key: K,
        values: V,
    ) -> Self {
        Self {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Checks whether a way with the given tags should be retained.
    pub fn matches(&self, tags: &HashMap<String, String>) -> bool {
        match tags.get(&self.key) {
            Some(v) => self.values.is_empty() || self.values.iter().any(|accepted| accepted == v),
            None => false,
        }
    }
}

/// Ways and nodes of a [Document] retained by a [WayFilter].
///
/// Every retained way has at least two nodes, and every node
/// referenced by a retained way is present in the store.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MapStore {
    ways: Vec<Way>,
    nodes: Vec<NodeRecord>,
    by_id: HashMap<i64, usize>,
}

impl MapStore {
    /// Runs [MapStore::load_ways] and [MapStore::load_nodes] on a fresh store.
    pub fn load(doc: &Document, filter: &WayFilter) -> Self {
        let mut store = Self::default();
        store.load_ways(doc, filter);
        store.load_nodes(doc);
        store
    }

    /// Replaces all ways (and forgets all nodes) with the ways from the document
    /// accepted by the filter.
    ///
    /// References to nodes missing from the document are dropped, consecutive
    /// repeated references are merged, and ways left with fewer than 2 nodes are skipped.
    pub fn load_ways(&mut self, doc: &Document, filter: &WayFilter) {
        if filter.values.is_empty() {
            log::warn!(
                "no accepted values for the {:?} way filter - accepting all values",
                filter.key
            );
        }

        self.ways.clear();
        self.nodes.clear();
        self.by_id.clear();

        for w in doc.ways().iter().filter(|w| filter.matches(&w.tags)) {
            let nodes = Self::get_way_nodes(doc, w);
            if nodes.len() < 2 {
                log::debug!("way {} has fewer than 2 usable nodes - skipping", w.id);
                continue;
            }

            self.ways.push(Way {
                id: w.id,
                nodes,
                tags: w.tags.clone(),
            });
        }

        log::debug!(
            "retained {} out of {} ways",
            self.ways.len(),
            doc.ways().len()
        );
    }

    fn get_way_nodes(doc: &Document, w: &Way) -> Vec<i64> {
        let mut nodes: Vec<i64> = Vec::with_capacity(w.nodes.len());
        for &node_id in &w.nodes {
            if doc.node(node_id).is_none() {
                log::warn!("way {} references unknown node {}", w.id, node_id);
            } else if nodes.last() != Some(&node_id) {
                nodes.push(node_id);
            }
        }
        nodes
    }

    /// Records the position of every node referenced by a retained way,
    /// in order of the first reference. Nodes not used by any retained way are dropped.
    pub fn load_nodes(&mut self, doc: &Document) {
        self.nodes.clear();
        self.by_id.clear();

        for w in &self.ways {
            for &node_id in &w.nodes {
                if self.by_id.contains_key(&node_id) {
                    continue;
                }

                // load_ways only keeps references to known nodes
                if let Some(&node) = doc.node(node_id) {
                    self.by_id.insert(node_id, self.nodes.len());
                    self.nodes.push(NodeRecord {
                        id: NodeId::Osm(node_id),
                        node,
                    });
                }
            }
        }

        log::debug!(
            "retained {} out of {} nodes",
            self.nodes.len(),
            doc.node_count()
        );
    }

    /// Returns all retained ways, in document order.
    pub fn ways(&self) -> &[Way] {
        &self.ways
    }

    /// Returns all retained nodes, in order of the first reference.
    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    /// Retrieves the position of a retained node.
    pub fn node(&self, id: i64) -> Option<GeoNode> {
        self.by_id.get(&id).map(|&idx| self.nodes[idx].node)
    }

    /// Returns `true` if no ways were retained.
    pub fn is_empty(&self) -> bool {
        self.ways.is_empty()
    }
}
