// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Read-only views of a [Network] for visualization.
//!
//! All positions are expressed in the local planar frame of the network
//! (see [Network::start_point]). Delivering the snapshots anywhere is the job
//! of a [Publisher] implementation.

use crate::{GeoNode, LocalPoint, LookupError, Network, NodeId, PathError};

/// Role of a single highlighted position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    CurrentPosition,
    TargetPosition,
}

/// A single highlighted position, drawn as a circle of the given radius (in meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMarker {
    pub kind: MarkerKind,
    pub position: LocalPoint,
    pub radius: f64,
}

/// All nodes and edges of a [Network].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NetworkSnapshot {
    pub points: Vec<LocalPoint>,
    pub edges: Vec<(LocalPoint, LocalPoint)>,
}

/// Receiver of visualization snapshots, e.g. a message bus adapter.
///
/// `frame` is the name of the coordinate frame the snapshot is expressed in,
/// passed through unchanged from [Options::map_frame](crate::Options::map_frame).
pub trait Publisher {
    fn publish_point(&mut self, frame: &str, marker: &PointMarker);
    fn publish_network(&mut self, frame: &str, network: &NetworkSnapshot);
    fn publish_refused_path(&mut self, frame: &str, path: &[LocalPoint]);
}

impl PointMarker {
    pub fn new(kind: MarkerKind, position: LocalPoint, radius: f64) -> Self {
        Self {
            kind,
            position,
            radius,
        }
    }
}

impl Network {
    /// Creates a [PointMarker] at the position of a node.
    pub fn node_marker(
        &self,
        id: NodeId,
        kind: MarkerKind,
        radius: f64,
    ) -> Result<PointMarker, LookupError> {
        let node = self.node_by_id(id)?;
        Ok(self.geo_marker(&node, kind, radius))
    }

    /// Creates a [PointMarker] at a geographic position.
    pub fn geo_marker(&self, node: &GeoNode, kind: MarkerKind, radius: f64) -> PointMarker {
        PointMarker::new(kind, self.to_local(node), radius)
    }

    /// Captures all nodes and edges of the network.
    pub fn snapshot(&self) -> NetworkSnapshot {
        let points: Vec<LocalPoint> = self.nodes.iter().map(|r| self.to_local(&r.node)).collect();
        let edges = self
            .matrix
            .edges()
            .map(|(i, j, _)| (points[i], points[j]))
            .collect();
        NetworkSnapshot { points, edges }
    }

    /// Captures a path which was rejected by the caller.
    pub fn refused_path(&self, ids: &[NodeId]) -> Result<Vec<LocalPoint>, PathError> {
        self.path_from_ids(ids)
    }
}
