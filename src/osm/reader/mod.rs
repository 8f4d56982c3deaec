// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

pub use model::{Document, Feature, Way};

mod model;
mod xml;

/// Format of the input OSM file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    #[default]
    Unknown,

    /// Force uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    Xml,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Guesses the format from the first bytes of a file.
    /// Anything which isn't gzip or bzip2-compressed is assumed to be plain XML.
    pub fn detect(head: &[u8]) -> Self {
        if head.starts_with(&[0x1F, 0x8B]) {
            Self::XmlGz
        } else if head.starts_with(b"BZh") {
            Self::XmlBz2
        } else {
            Self::Xml
        }
    }
}

/// Error which can occur when reading an OSM document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("missing <osm> root element")]
    MissingRoot,

    #[error("<{element}> without the required {attribute:?} attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("<{element}> with an invalid {attribute:?} attribute: {value:?}")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
}

/// Parse an OSM [Document] from a reader.
///
/// The provided stream will be automatically wrapped in a buffered reader when needed.
pub fn read_document_from_io<R: io::Read>(
    format: FileFormat,
    reader: R,
) -> Result<Document, Error> {
    let mut b = io::BufReader::new(reader);
    let format = match format {
        FileFormat::Unknown => {
            let detected = FileFormat::detect(b.fill_buf()?);
            log::debug!("detected input format: {:?}", detected);
            detected
        }
        f => f,
    };

    match format {
        FileFormat::Unknown | FileFormat::Xml => Document::from_features(xml::Reader::from_io(b)),

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(b);
            let b = io::BufReader::new(d);
            Document::from_features(xml::Reader::from_io(b))
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(b);
            let b = io::BufReader::new(d);
            Document::from_features(xml::Reader::from_io(b))
        }
    }
}

/// Parse an OSM [Document] from a file at the provided path.
pub fn read_document_from_file<P: AsRef<Path>>(
    format: FileFormat,
    path: P,
) -> Result<Document, Error> {
    let f = File::open(path)?;
    read_document_from_io(format, f)
}

/// Parse an OSM [Document] from an in-memory buffer.
pub fn read_document_from_buffer(format: FileFormat, data: &[u8]) -> Result<Document, Error> {
    let format = match format {
        FileFormat::Unknown => FileFormat::detect(data),
        f => f,
    };

    if format == FileFormat::Xml {
        // Fast path is available for in-memory XML data
        Document::from_features(xml::Reader::from_buffer(data))
    } else {
        // Wrap the buffer in a cursor and use the IO path
        read_document_from_io(format, io::Cursor::new(data))
    }
}
