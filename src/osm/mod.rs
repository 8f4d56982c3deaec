// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Reading [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML) documents
//! and selecting the ways used for routing.

mod reader;
mod store;

pub use reader::{
    read_document_from_buffer, read_document_from_file, read_document_from_io, Document, Error,
    Feature, FileFormat, Way,
};
pub use store::{MapStore, WayFilter};
