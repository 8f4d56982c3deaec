// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use crate::osm::{self, Document, FileFormat, MapStore, WayFilter};
use crate::snapshot::{MarkerKind, PointMarker, Publisher};
use crate::{GeoNode, LookupError, Network, NetworkBuilder, NodeId, PathError};

/// Location of an OSM document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Path to a file on disk.
    Path(PathBuf),

    /// In-memory contents of a document.
    Content(Vec<u8>),
}

impl Default for Source {
    fn default() -> Self {
        Self::Content(Vec::default())
    }
}

/// Controls how a map is read and turned into a [Network].
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Where the OSM document is read from.
    pub source: Source,

    /// Format of [Options::source].
    pub file_format: FileFormat,

    /// Which ways take part in routing.
    pub filter: WayFilter,

    /// Maximum distance (in meters) between consecutive network nodes on a way,
    /// see [NetworkBuilder::interpolation]. Zero or negative values disable interpolation.
    pub interpolation_max_distance: f64,

    /// Name of the coordinate frame, passed to [Publisher]s as-is.
    pub map_frame: String,

    /// Whether snapshots are created and handed over to [Publisher]s at all.
    pub visualization: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            source: Source::default(),
            file_format: FileFormat::Unknown,
            filter: WayFilter::default(),
            interpolation_max_distance: 0.0,
            map_frame: "map".to_string(),
            visualization: false,
        }
    }
}

/// Owns the currently active [Network], and rebuilds it when the map
/// or the interpolation distance changes.
///
/// A failed load never replaces the active network.
#[derive(Debug, Default)]
pub struct Planner {
    options: Options,
    document: Option<Document>,
    network: Option<Network>,
    start_point: Option<GeoNode>,
}

impl Planner {
    /// Creates a planner without any network. Call [Planner::load] to read
    /// the map from [Options::source].
    pub fn new(options: Options) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Returns the active network, if any map was loaded successfully.
    pub fn network(&self) -> Option<&Network> {
        self.network.as_ref()
    }

    pub fn network_mut(&mut self) -> Option<&mut Network> {
        self.network.as_mut()
    }

    /// Reads the map from [Options::source] and builds a new network.
    ///
    /// On failure, the previous network (if any) stays active.
    pub fn load(&mut self) -> Result<&Network, osm::Error> {
        let doc = self.read_document()?;
        Ok(self.activate(doc))
    }

    /// Replaces the map source and loads it.
    ///
    /// On success, any start point set with [Planner::set_start_point] is forgotten.
    /// On failure, the previous source and network stay active.
    pub fn set_new_map(&mut self, source: Source) -> Result<&Network, osm::Error> {
        let previous_source = std::mem::replace(&mut self.options.source, source);
        match self.read_document() {
            Ok(doc) => {
                self.start_point = None;
                Ok(self.activate(doc))
            }
            Err(e) => {
                log::warn!("failed to load the new map: {}", e);
                self.options.source = previous_source;
                Err(e)
            }
        }
    }

    fn read_document(&self) -> Result<Document, osm::Error> {
        match &self.options.source {
            Source::Path(path) => {
                log::info!("loading map from {}", path.display());
                osm::read_document_from_file(self.options.file_format, path)
            }
            Source::Content(data) => {
                log::info!("loading map from a {} byte buffer", data.len());
                osm::read_document_from_buffer(self.options.file_format, data)
            }
        }
    }

    /// Builds a network from a freshly read document and makes both active.
    fn activate(&mut self, doc: Document) -> &Network {
        let network = self.build(&doc);
        self.document = Some(doc);
        self.network.insert(network)
    }

    /// Changes the interpolation distance, rebuilding the network
    /// from the already loaded map.
    pub fn set_interpolation_max_distance(&mut self, max_distance: f64) {
        self.options.interpolation_max_distance = max_distance;
        if let Some(doc) = self.document.take() {
            self.network = Some(self.build(&doc));
            self.document = Some(doc);
        }
    }

    /// Sets the origin of the local frame of the active network,
    /// and of all networks rebuilt from the same map.
    pub fn set_start_point(&mut self, lat: f64, lon: f64) {
        self.start_point = Some(GeoNode::new(lat, lon));
        if let Some(network) = &mut self.network {
            network.set_start_point(lat, lon);
        }
    }

    /// Resets the origin of the local frame to the first node of the network.
    pub fn set_default_start_point(&mut self) {
        self.start_point = None;
        if let Some(network) = &mut self.network {
            network.set_default_start_point();
        }
    }

    fn build(&self, doc: &Document) -> Network {
        let store = MapStore::load(doc, &self.options.filter);
        if store.is_empty() {
            log::warn!(
                "no ways match {}={:?} - the network is empty",
                self.options.filter.key,
                self.options.filter.values,
            );
        }

        let mut network = NetworkBuilder::new(&store)
            .interpolation(self.options.interpolation_max_distance)
            .build();
        if let Some(start) = self.start_point {
            network.set_start_point(start.lat, start.lon);
        }

        log::info!(
            "network ready: {} nodes ({} interpolated), {} edges",
            network.len(),
            network.interpolated_count(),
            network.matrix().edges().count(),
        );
        network
    }

    fn active_network(&self) -> Result<&Network, LookupError> {
        self.network.as_ref().ok_or(LookupError::EmptyNetwork)
    }

    /// Sends a marker at the position of a node to the publisher.
    /// Does nothing when visualization is disabled.
    pub fn publish_point<P: Publisher>(
        &self,
        publisher: &mut P,
        id: NodeId,
        kind: MarkerKind,
        radius: f64,
    ) -> Result<(), LookupError> {
        if self.options.visualization {
            let marker = self.active_network()?.node_marker(id, kind, radius)?;
            publisher.publish_point(&self.options.map_frame, &marker);
        }
        Ok(())
    }

    /// Sends a marker at a geographic position to the publisher.
    /// Does nothing when visualization is disabled.
    pub fn publish_geo_point<P: Publisher>(
        &self,
        publisher: &mut P,
        position: &GeoNode,
        kind: MarkerKind,
        radius: f64,
    ) -> Result<(), LookupError> {
        if self.options.visualization {
            let marker = self.active_network()?.geo_marker(position, kind, radius);
            publisher.publish_point(&self.options.map_frame, &marker);
        }
        Ok(())
    }

    /// Sends a marker at a local planar position to the publisher.
    /// Does nothing when visualization is disabled.
    pub fn publish_local_point<P: Publisher>(&self, publisher: &mut P, marker: &PointMarker) {
        if self.options.visualization {
            publisher.publish_point(&self.options.map_frame, marker);
        }
    }

    /// Sends a snapshot of the whole network to the publisher.
    /// Does nothing when visualization is disabled.
    pub fn publish_route_network<P: Publisher>(
        &self,
        publisher: &mut P,
    ) -> Result<(), LookupError> {
        if self.options.visualization {
            let snapshot = self.active_network()?.snapshot();
            publisher.publish_network(&self.options.map_frame, &snapshot);
        }
        Ok(())
    }

    /// Sends a rejected path to the publisher.
    /// Does nothing when visualization is disabled.
    pub fn publish_refused_path<P: Publisher>(
        &self,
        publisher: &mut P,
        ids: &[NodeId],
    ) -> Result<(), PathError> {
        if self.options.visualization {
            let network = self.active_network().map_err(|source| PathError::Lookup {
                position: 0,
                source,
            })?;
            let path = network.refused_path(ids)?;
            publisher.publish_refused_path(&self.options.map_frame, &path);
        }
        Ok(())
    }
}
