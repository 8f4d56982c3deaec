// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::geodesy::{bearing, local_x, local_y};
use crate::{GeoNode, LocalPoint, Network, NodeId, PathError, PathPoint};

impl Network {
    /// Returns the origin of the local planar frame.
    pub fn start_point(&self) -> GeoNode {
        self.start
    }

    /// Moves the origin of the local planar frame to the provided position.
    /// Previously returned local coordinates are not updated.
    pub fn set_start_point(&mut self, lat: f64, lon: f64) {
        self.start = GeoNode::new(lat, lon);
    }

    /// Moves the origin of the local planar frame to the first node of the network,
    /// or to (0, 0) if the network is empty.
    pub fn set_default_start_point(&mut self) {
        self.start = self
            .nodes
            .first()
            .map(|r| r.node)
            .unwrap_or(GeoNode::ORIGIN);
    }

    /// Converts a geographic position into the local planar frame.
    pub fn to_local(&self, node: &GeoNode) -> LocalPoint {
        LocalPoint {
            x: local_x(&self.start, node),
            y: local_y(&self.start, node),
        }
    }

    /// Retrieves positions of all nodes of a path, setting [GeoNode::angle]
    /// to the bearing towards the next node. The last node keeps the bearing
    /// of the previous one.
    ///
    /// Fails if any of the nodes isn't a part of the network.
    pub fn geo_path_from_ids(&self, ids: &[NodeId]) -> Result<Vec<GeoNode>, PathError> {
        let mut path = ids
            .iter()
            .enumerate()
            .map(|(position, &id)| {
                self.node_by_id(id)
                    .map_err(|source| PathError::Lookup { position, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut previous_angle = 0.0;
        for i in 0..path.len() {
            let angle = match path.get(i + 1) {
                Some(next) => bearing(&path[i], next),
                None => previous_angle,
            };
            path[i].angle = Some(angle);
            previous_angle = angle;
        }

        Ok(path)
    }

    /// Converts a sequence of node ids into local planar coordinates,
    /// preserving the order.
    ///
    /// Fails if any of the nodes isn't a part of the network -
    /// partial paths are never returned.
    pub fn path_from_ids(&self, ids: &[NodeId]) -> Result<Vec<LocalPoint>, PathError> {
        ids.iter()
            .enumerate()
            .map(|(position, &id)| {
                self.node_by_id(id)
                    .map(|n| self.to_local(&n))
                    .map_err(|source| PathError::Lookup { position, source })
            })
            .collect()
    }

    /// Like [Network::path_from_ids], but every point also carries
    /// the bearing towards the next point.
    pub fn oriented_path_from_ids(&self, ids: &[NodeId]) -> Result<Vec<PathPoint>, PathError> {
        Ok(self
            .geo_path_from_ids(ids)?
            .iter()
            .map(|n| {
                let p = self.to_local(n);
                PathPoint {
                    x: p.x,
                    y: p.y,
                    bearing: n.angle.unwrap_or_default(),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use crate::assert_almost_eq;
    use crate::osm::{read_document_from_buffer, FileFormat, MapStore, WayFilter};
    use crate::{GeoNode, LookupError, Network, NetworkBuilder, NodeId, PathError};

    const SIMPLE_XML: &[u8] = include_bytes!("osm/reader/test_fixtures/simple.osm");

    fn network() -> Network {
        let doc = read_document_from_buffer(FileFormat::Xml, SIMPLE_XML).unwrap();
        NetworkBuilder::new(&MapStore::load(&doc, &WayFilter::default())).build()
    }

    fn ids(raw: &[i64]) -> Vec<NodeId> {
        raw.iter().map(|&id| NodeId::Osm(id)).collect()
    }

    #[test]
    fn default_start_point() {
        let mut n = network();
        assert_eq!(n.start_point(), GeoNode::new(50.0, 19.0));

        n.set_start_point(1.0, 2.0);
        assert_eq!(n.start_point(), GeoNode::new(1.0, 2.0));

        n.set_default_start_point();
        assert_eq!(n.start_point(), GeoNode::new(50.0, 19.0));

        let mut empty = Network::default();
        empty.set_start_point(1.0, 2.0);
        empty.set_default_start_point();
        assert_eq!(empty.start_point(), GeoNode::ORIGIN);
    }

    #[test]
    fn path_from_ids() {
        let n = network();
        let path = n.path_from_ids(&ids(&[1, 2, 3])).unwrap();

        assert_eq!(path.len(), 3);
        assert_eq!(path[0].x, 0.0);
        assert_eq!(path[0].y, 0.0);
        assert_almost_eq!(path[1].x, 71.4747, 1e-3);
        assert_almost_eq!(path[1].y, 0.0);
        assert_almost_eq!(path[2].x, 71.4740, 1e-3);
        assert_almost_eq!(path[2].y, 111.1949, 1e-3);
    }

    #[test]
    fn path_with_unknown_node() {
        let n = network();
        assert_eq!(
            n.path_from_ids(&ids(&[1, 5, 3])),
            Err(PathError::Lookup {
                position: 1,
                source: LookupError::UnknownNode(NodeId::Osm(5)),
            }),
        );
        assert!(n.oriented_path_from_ids(&ids(&[1, 2, 6])).is_err());
        assert!(n.geo_path_from_ids(&ids(&[99])).is_err());
    }

    #[test]
    fn empty_path() {
        assert_eq!(network().path_from_ids(&[]), Ok(vec![]));
    }

    #[test]
    fn path_follows_start_point() {
        let mut n = network();
        let before = n.path_from_ids(&ids(&[3])).unwrap();

        n.set_start_point(50.001, 19.001);
        let after = n.path_from_ids(&ids(&[3])).unwrap();

        assert!(before[0].y > 100.0);
        assert_eq!(after[0].x.abs(), 0.0);
        assert_eq!(after[0].y.abs(), 0.0);
    }

    #[test]
    fn oriented_path() {
        let n = network();
        let path = n.oriented_path_from_ids(&ids(&[1, 2, 3])).unwrap();

        assert_eq!(path.len(), 3);
        assert_almost_eq!(path[0].bearing, FRAC_PI_2, 1e-3);
        assert_almost_eq!(path[1].bearing, 0.0, 1e-6);
        assert_almost_eq!(path[2].bearing, path[1].bearing);

        let single = n.oriented_path_from_ids(&ids(&[4])).unwrap();
        assert_eq!(single[0].bearing, 0.0);
    }

    #[test]
    fn geo_path_angles() {
        let n = network();
        let path = n.geo_path_from_ids(&ids(&[3, 4])).unwrap();
        assert_eq!(path[0].lat, 50.001);
        assert_almost_eq!(path[0].angle.unwrap(), -FRAC_PI_2, 1e-3);
        assert_eq!(path[1].angle, path[0].angle);
    }
}
