// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::geodesy::{distance, local_x, local_y};
use crate::{GeoNode, LookupError, Network, NodeId, NodeRecord};

impl Network {
    /// Retrieves the position of a node.
    pub fn node_by_id(&self, id: NodeId) -> Result<GeoNode, LookupError> {
        self.translate(id)
            .map(|idx| self.nodes[idx].node)
            .ok_or(LookupError::UnknownNode(id))
    }

    /// Finds the node (including interpolated ones) closest to the given position.
    /// Ties are resolved in favor of the node with the lowest index.
    ///
    /// This function requires computing the distance to every node in the network.
    pub fn nearest_node(&self, lat: f64, lon: f64) -> Result<NodeId, LookupError> {
        check_position(lat, lon)?;
        let target = GeoNode::new(lat, lon);
        self.nearest_by(|n| distance(&target, n))
    }

    /// Finds the node closest to a position given in the local planar frame
    /// (see [Network::start_point]). Ties are resolved in favor of the node
    /// with the lowest index.
    pub fn nearest_node_local(&self, x: f64, y: f64) -> Result<NodeId, LookupError> {
        check_position(x, y)?;
        self.nearest_by(|n| {
            let dx = local_x(&self.start, n) - x;
            let dy = local_y(&self.start, n) - y;
            dx.hypot(dy)
        })
    }

    fn nearest_by<F: Fn(&GeoNode) -> f64>(&self, dist: F) -> Result<NodeId, LookupError> {
        let mut best: Option<(&NodeRecord, f64)> = None;
        for record in &self.nodes {
            let d = dist(&record.node);
            if d.is_nan() {
                continue;
            }

            // Strict comparison keeps the first of equally distant nodes
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((record, d));
            }
        }
        best.map(|(record, _)| record.id)
            .ok_or(LookupError::EmptyNetwork)
    }
}

fn check_position(a: f64, b: f64) -> Result<(), LookupError> {
    if a.is_finite() && b.is_finite() {
        Ok(())
    } else {
        Err(LookupError::InvalidPosition)
    }
}

#[cfg(test)]
mod tests {
    use crate::osm::{read_document_from_buffer, FileFormat, MapStore, WayFilter};
    use crate::{GeoNode, LookupError, Network, NetworkBuilder, NodeId};

    const SIMPLE_XML: &[u8] = include_bytes!("osm/reader/test_fixtures/simple.osm");

    fn network(interpolation: f64) -> Network {
        let doc = read_document_from_buffer(FileFormat::Xml, SIMPLE_XML).unwrap();
        let store = MapStore::load(&doc, &WayFilter::default());
        NetworkBuilder::new(&store)
            .interpolation(interpolation)
            .build()
    }

    #[test]
    fn node_by_id() {
        let n = network(0.0);
        assert_eq!(n.node_by_id(NodeId::Osm(3)), Ok(GeoNode::new(50.001, 19.001)));
        assert_eq!(
            n.node_by_id(NodeId::Osm(5)),
            Err(LookupError::UnknownNode(NodeId::Osm(5))),
        );
    }

    #[test]
    fn nearest_node() {
        let n = network(0.0);
        assert_eq!(n.nearest_node(49.9999, 18.9999), Ok(NodeId::Osm(1)));
        assert_eq!(n.nearest_node(50.0011, 19.0012), Ok(NodeId::Osm(3)));
        assert_eq!(n.nearest_node(50.0021, 19.0), Ok(NodeId::Osm(4)));
    }

    #[test]
    fn nearest_node_ties() {
        for (first, second) in [(7, 8), (8, 7)] {
            let xml = format!(
                "<osm>
                    <node id='7' lat='0' lon='0.001'/>
                    <node id='8' lat='0' lon='-0.001'/>
                    <way id='1'><nd ref='{first}'/><nd ref='{second}'/><tag k='highway' v='footway'/></way>
                </osm>"
            );
            let doc = read_document_from_buffer(FileFormat::Xml, xml.as_bytes()).unwrap();
            let n = NetworkBuilder::new(&MapStore::load(&doc, &WayFilter::default())).build();

            assert_eq!(n.nearest_node(0.0, 0.0), Ok(NodeId::Osm(first)));
        }
    }

    #[test]
    fn nearest_node_returns_itself() {
        for n in [network(0.0), network(20.0)] {
            for record in n.nodes() {
                assert_eq!(
                    n.nearest_node(record.node.lat, record.node.lon),
                    Ok(record.id),
                );
            }
        }
    }

    #[test]
    fn nearest_node_finds_interpolated_nodes() {
        let n = network(20.0);
        let id = n.nearest_node(50.0, 19.0005).unwrap();
        assert!(id.is_synthetic());
    }

    #[test]
    fn nearest_node_local() {
        let mut n = network(0.0);
        assert_eq!(n.nearest_node_local(0.0, 0.0), Ok(NodeId::Osm(1)));
        assert_eq!(n.nearest_node_local(70.0, 2.0), Ok(NodeId::Osm(2)));
        assert_eq!(n.nearest_node_local(70.0, 110.0), Ok(NodeId::Osm(3)));
        assert_eq!(n.nearest_node_local(-5.0, 120.0), Ok(NodeId::Osm(4)));

        n.set_start_point(50.001, 19.001);
        assert_eq!(n.nearest_node_local(0.0, 0.0), Ok(NodeId::Osm(3)));
        assert_eq!(n.nearest_node_local(-70.0, -110.0), Ok(NodeId::Osm(1)));
    }

    #[test]
    fn nearest_node_rejects_non_finite_positions() {
        let n = network(0.0);
        for (a, b) in [
            (f64::NAN, 19.0),
            (50.0, f64::NAN),
            (f64::INFINITY, 19.0),
            (50.0, f64::NEG_INFINITY),
        ] {
            assert_eq!(n.nearest_node(a, b), Err(LookupError::InvalidPosition));
            assert_eq!(n.nearest_node_local(a, b), Err(LookupError::InvalidPosition));
        }
        assert_eq!(
            Network::default().nearest_node(f64::NAN, 0.0),
            Err(LookupError::InvalidPosition),
        );
    }

    #[test]
    fn queries_on_empty_network() {
        let n = Network::default();
        assert_eq!(n.nearest_node(0.0, 0.0), Err(LookupError::EmptyNetwork));
        assert_eq!(n.nearest_node_local(0.0, 0.0), Err(LookupError::EmptyNetwork));
        assert_eq!(
            n.node_by_id(NodeId::Osm(1)),
            Err(LookupError::UnknownNode(NodeId::Osm(1))),
        );
    }
}
