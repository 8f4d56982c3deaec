// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::NodeId;

/// Error conditions of [Network](crate::Network) queries.
///
/// These failures are always local to the query;
/// the network stays usable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The node is not a part of the routable network.
    #[error("node {0} is not a part of the network")]
    UnknownNode(NodeId),

    /// The network has no nodes.
    #[error("network is empty")]
    EmptyNetwork,

    /// The queried position has a NaN or infinite coordinate.
    #[error("queried position is not finite")]
    InvalidPosition,
}

/// Error returned when a sequence of node ids can't be turned into a path.
/// No partial paths are ever returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path element {position}: {source}")]
    Lookup {
        position: usize,
        #[source]
        source: LookupError,
    },
}
