// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Routable networks built from [OpenStreetMap](https://www.openstreetmap.org/) XML data.
//!
//! Ways matching a tag filter are turned into a [Network]: a dense, symmetric
//! [adjacency matrix](AdjacencyMatrix) of geodesic distances (in meters) over a compact
//! index space, together with the [translation](IdTranslation) between node ids and
//! matrix indices. Long segments may be densified with synthetic nodes, see
//! [NetworkBuilder::interpolation]. Search over the matrix is left to the caller;
//! the resulting index or id sequence can be turned back into local planar coordinates
//! with [Network::path_from_ids].
//!
//! # Example
//!
//! ```no_run
//! let options = osmnet::Options {
//!     source: osmnet::Source::Path("path/to/campus.osm".into()),
//!     interpolation_max_distance: 5.0,
//!     ..Default::default()
//! };
//! let mut planner = osmnet::Planner::new(options);
//! planner.load().expect("failed to load campus.osm");
//!
//! let network = planner.network().unwrap();
//! let start = network.nearest_node(49.0814, 19.6227).unwrap();
//! let end = network.nearest_node(49.0831, 19.6251).unwrap();
//! println!("{} nodes, from {} to {}", network.len(), start, end);
//! ```

mod error;
pub mod geodesy;
mod matrix;
mod network;
pub mod osm;
mod path;
mod planner;
mod query;
pub mod snapshot;

pub use error::{LookupError, PathError};
pub use matrix::{AdjacencyMatrix, IdTranslation};
pub use network::{Network, NetworkBuilder, MAX_SEGMENT_PARTS, MIN_INTERPOLATION_DISTANCE};
pub use planner::{Options, Planner, Source};
pub use snapshot::{MarkerKind, NetworkSnapshot, PointMarker, Publisher};

/// Identifier of a [Network] node.
///
/// Nodes read from the OSM document keep their OSM id, while nodes
/// created by interpolation live in a separate namespace, and thus
/// can never collide with OSM ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Osm(i64),
    Synthetic(u64),
}

impl NodeId {
    #[inline]
    pub fn is_synthetic(self) -> bool {
        matches!(self, Self::Synthetic(_))
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        Self::Osm(id)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Osm(id) => write!(f, "{}", id),
            Self::Synthetic(id) => write!(f, "s{}", id),
        }
    }
}

/// A geographic position, in degrees.
///
/// `angle` is only present on positions produced by
/// [Network::geo_path_from_ids], and holds the initial bearing (in radians)
/// towards the following position of the path.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoNode {
    pub lat: f64,
    pub lon: f64,
    pub angle: Option<f64>,
}

impl GeoNode {
    pub const ORIGIN: Self = Self {
        lat: 0.0,
        lon: 0.0,
        angle: None,
    };

    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            angle: None,
        }
    }
}

/// A [GeoNode] together with its identifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub node: GeoNode,
}

/// Position in the local planar frame centered at the [start point](Network::start_point),
/// in meters. `x` grows eastwards, `y` grows northwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocalPoint {
    pub x: f64,
    pub y: f64,
}

/// A [LocalPoint] oriented along a path, see [Network::oriented_path_from_ids].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
    pub bearing: f64,
}

#[cfg(test)]
macro_rules! assert_almost_eq {
    ($a:expr, $b:expr) => {{
        let (a, b): (f64, f64) = ($a, $b);
        assert!((a - b).abs() < 1e-6, "assertion failed: {} ≈ {}", a, b)
    }};
    ($a:expr, $b:expr, $eps:expr) => {{
        let (a, b): (f64, f64) = ($a, $b);
        assert!((a - b).abs() < $eps, "assertion failed: {} ≈ {}", a, b)
    }};
}

#[cfg(test)]
pub(crate) use assert_almost_eq;
