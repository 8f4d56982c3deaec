// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::hash_map::{Entry, HashMap};

use crate::NodeId;

/// Bidirectional mapping between [NodeIds](NodeId) and compact indices.
///
/// Indices always form the dense range `0..len()`, assigned in insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IdTranslation {
    to_index: HashMap<NodeId, usize>,
    to_id: Vec<NodeId>,
}

impl IdTranslation {
    /// Returns the index of `id`, assigning the next free index if `id` is new.
    pub fn insert(&mut self, id: NodeId) -> usize {
        match self.to_index.entry(id) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let idx = self.to_id.len();
                e.insert(idx);
                self.to_id.push(id);
                idx
            }
        }
    }

    /// Returns the compact index of a node, or `None` if the node is unknown.
    pub fn index(&self, id: NodeId) -> Option<usize> {
        self.to_index.get(&id).copied()
    }

    /// Returns the node id behind a compact index.
    pub fn id(&self, idx: usize) -> Option<NodeId> {
        self.to_id.get(idx).copied()
    }

    pub fn len(&self) -> usize {
        self.to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_id.is_empty()
    }

    /// Returns an iterator over all node ids, in index order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.to_id.iter().copied()
    }
}

/// Square matrix of edge weights (in meters) between compact node indices.
///
/// Absent edges are represented by `None`, so zero-length edges
/// remain distinguishable from missing ones. All writes are symmetric.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AdjacencyMatrix {
    size: usize,
    weights: Vec<Option<f64>>,
}

impl AdjacencyMatrix {
    /// Creates a `size × size` matrix without any edges.
    ///
    /// Panics if `size × size` overflows, see [AdjacencyMatrix::try_new].
    pub fn new(size: usize) -> Self {
        match Self::try_new(size) {
            Some(m) => m,
            None => panic!("adjacency matrix of {size} nodes is too large"),
        }
    }

    /// Creates a `size × size` matrix without any edges,
    /// or returns `None` if the number of cells overflows.
    pub fn try_new(size: usize) -> Option<Self> {
        let cells = size.checked_mul(size)?;
        Some(Self {
            size,
            weights: vec![None; cells],
        })
    }

    /// Returns the number of rows (and columns) of the matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> Option<usize> {
        if i < self.size && j < self.size {
            Some(i * self.size + j)
        } else {
            None
        }
    }

    /// Gets the weight of the edge between two indices.
    /// Out-of-range indices have no edges.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.offset(i, j).and_then(|o| self.weights[o])
    }

    /// Creates or updates the edge between two indices, in both directions.
    ///
    /// Out-of-range indices are a programming error and cause a panic.
    pub fn set(&mut self, i: usize, j: usize, weight: f64) {
        assert!(i < self.size && j < self.size, "edge {i}-{j} out of range");
        debug_assert!(weight >= 0.0);

        self.weights[i * self.size + j] = Some(weight);
        self.weights[j * self.size + i] = Some(weight);
    }

    /// Removes the edge between two indices, in both directions.
    /// Returns `true` if an edge was removed.
    pub fn remove(&mut self, i: usize, j: usize) -> bool {
        match (self.offset(i, j), self.offset(j, i)) {
            (Some(a), Some(b)) => {
                let existed = self.weights[a].is_some() || self.weights[b].is_some();
                self.weights[a] = None;
                self.weights[b] = None;
                existed
            }
            _ => false,
        }
    }

    /// Returns an iterator over all `(neighbor, weight)` pairs of a row.
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let row = self
            .weights
            .get(i * self.size..(i + 1) * self.size)
            .unwrap_or(&[]);

        row.iter()
            .enumerate()
            .filter_map(|(j, w)| w.map(|w| (j, w)))
    }

    /// Returns every edge once, as `(i, j, weight)` with `i < j`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.size).flat_map(move |i| {
            self.neighbors(i)
                .filter(move |&(j, _)| j > i)
                .map(move |(j, w)| (i, j, w))
        })
    }

    /// Returns the matrix as rows of weights, using `no_edge` for absent edges.
    pub fn to_rows(&self, no_edge: f64) -> Vec<Vec<f64>> {
        self.weights
            .chunks(self.size.max(1))
            .take(self.size)
            .map(|row| row.iter().map(|w| w.unwrap_or(no_edge)).collect())
            .collect()
    }
}
