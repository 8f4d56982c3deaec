// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::hash_map::{Entry, HashMap};

use crate::GeoNode;

/// Represents an [OSM way](https://wiki.openstreetmap.org/wiki/Way).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Way {
    pub id: i64,
    pub nodes: Vec<i64>,
    pub tags: HashMap<String, String>,
}

/// Union over the [OSM features/elements](https://wiki.openstreetmap.org/wiki/Elements)
/// relevant for building a network. Relations are skipped by the readers.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Node(i64, GeoNode),
    Way(Way),
}

/// All nodes and ways from a single OSM document, before any filtering.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Document {
    nodes: HashMap<i64, GeoNode>,
    ways: Vec<Way>,
}

impl Document {
    /// Collects all features into a document, stopping at the first error.
    ///
    /// If a node id appears more than once, the first position is kept.
    pub fn from_features<I, E>(features: I) -> Result<Self, E>
    where
        I: IntoIterator<Item = Result<Feature, E>>,
    {
        let mut doc = Self::default();
        for f in features {
            match f? {
                Feature::Node(id, node) => doc.add_node(id, node),
                Feature::Way(w) => doc.ways.push(w),
            }
        }
        Ok(doc)
    }

    fn add_node(&mut self, id: i64, node: GeoNode) {
        match self.nodes.entry(id) {
            Entry::Vacant(e) => {
                e.insert(node);
            }
            Entry::Occupied(e) => {
                if *e.get() != node {
                    log::warn!(
                        "node {} defined twice with different positions, keeping ({}, {})",
                        id,
                        e.get().lat,
                        e.get().lon,
                    );
                }
            }
        }
    }

    /// Retrieves the position of a node with the provided id.
    pub fn node(&self, id: i64) -> Option<&GeoNode> {
        self.nodes.get(&id)
    }

    /// Returns the number of nodes in the document.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns all ways, in document order.
    pub fn ways(&self) -> &[Way] {
        &self.ways
    }
}
