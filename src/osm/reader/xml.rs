// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;
use std::str::{from_utf8, FromStr};

use quick_xml::events::{BytesStart, Event};

use super::model::{Feature, Way};
use super::Error;
use crate::GeoNode;

/// Parser is a trait for objects which can parse XML.
///
/// This trait only exists to fix the mismatch of
/// [quick_xml::Reader::read_event] when working on buffered data
/// and [quick_xml::Reader::read_event_into] when working on IO.
pub(super) trait Parser {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>>;
}

/// IoParser implements [Parser] over an [std::io::BufRead].
pub(super) struct IoParser<R: io::BufRead>(quick_xml::Reader<R>, Vec<u8>);

impl<R: io::BufRead> Parser for IoParser<R> {
    #[inline]
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>> {
        self.1.clear();
        self.0.read_event_into(&mut self.1)
    }
}

/// BufParser implements [Parser] over a slice of bytes (`&[u8]`).
pub(super) struct BufParser<'a>(quick_xml::Reader<&'a [u8]>);

impl<'a> Parser for BufParser<'a> {
    #[inline]
    fn read_event<'b>(&'b mut self) -> quick_xml::Result<Event<'b>> {
        self.0.read_event()
    }
}

/// Element whose children are currently being read.
enum Open {
    Node(i64, GeoNode),
    Way(Way),

    /// Relations and other elements with children which are of no interest.
    Skipped,
}

/// Reader reads OSM [Features](Feature) from an XML document.
///
/// The first error ends the iteration.
pub(super) struct Reader<P: Parser> {
    parser: P,
    open: Option<Open>,
    has_root: bool,
    done: bool,
}

impl<P: Parser> Reader<P> {
    #[inline]
    fn new(parser: P) -> Self {
        Self {
            parser,
            open: None,
            has_root: false,
            done: false,
        }
    }

    fn next_feature(&mut self) -> Result<Option<Feature>, Error> {
        loop {
            let event = self.parser.read_event()?;
            let empty = matches!(event, Event::Empty(_));
            match event {
                Event::Start(start) | Event::Empty(start) => {
                    check_root(&mut self.has_root, &start)?;
                    if let Some(f) = open_element(&mut self.open, &start, empty)? {
                        return Ok(Some(f));
                    }
                }

                Event::End(end) => match end.local_name().as_ref() {
                    b"node" | b"way" | b"relation" => match self.open.take() {
                        Some(Open::Node(id, node)) => return Ok(Some(Feature::Node(id, node))),
                        Some(Open::Way(w)) => return Ok(Some(Feature::Way(w))),
                        Some(Open::Skipped) | None => {}
                    },
                    _ => {}
                },

                Event::Eof => {
                    return if self.has_root {
                        Ok(None)
                    } else {
                        Err(Error::MissingRoot)
                    };
                }

                _ => {}
            }
        }
    }
}

impl<P: Parser> Iterator for Reader<P> {
    type Item = Result<Feature, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.next_feature();
        self.done = !matches!(result, Ok(Some(_)));
        result.transpose()
    }
}

impl<'a> Reader<BufParser<'a>> {
    #[inline]
    pub(super) fn from_buffer(data: &'a [u8]) -> Self {
        Self::new(BufParser(quick_xml::Reader::from_reader(data)))
    }
}

impl<R: io::BufRead> Reader<IoParser<R>> {
    #[inline]
    pub(super) fn from_io(reader: R) -> Self {
        Self::new(IoParser(quick_xml::Reader::from_reader(reader), Vec::default()))
    }
}

/// The outermost element of the document must be `<osm>`.
fn check_root(has_root: &mut bool, start: &BytesStart<'_>) -> Result<(), Error> {
    if *has_root {
        Ok(())
    } else if start.local_name().as_ref() == b"osm" {
        *has_root = true;
        Ok(())
    } else {
        Err(Error::MissingRoot)
    }
}

/// Handles an opening (or self-closing) tag. Returns a complete [Feature]
/// if a self-closing `<node>` or `<way>` was encountered.
fn open_element(
    open: &mut Option<Open>,
    start: &BytesStart<'_>,
    empty: bool,
) -> Result<Option<Feature>, Error> {
    match start.local_name().as_ref() {
        b"node" => {
            let (id, node) = parse_node(start)?;
            if empty {
                return Ok(Some(Feature::Node(id, node)));
            }
            *open = Some(Open::Node(id, node));
        }

        b"way" => {
            let w = parse_way(start)?;
            if empty {
                return Ok(Some(Feature::Way(w)));
            }
            *open = Some(Open::Way(w));
        }

        b"relation" => {
            if !empty {
                *open = Some(Open::Skipped);
            }
        }

        b"nd" => {
            if let Some(Open::Way(ref mut w)) = open {
                w.nodes.push(attribute(start, "nd", "ref")?);
            }
        }

        b"tag" => {
            if let Some(Open::Way(ref mut w)) = open {
                let (k, v) = parse_tag(start)?;
                w.tags.insert(k, v);
            }
        }

        _ => {}
    }

    Ok(None)
}

fn parse_node(start: &BytesStart<'_>) -> Result<(i64, GeoNode), Error> {
    let id = attribute(start, "node", "id")?;
    let lat: f64 = attribute(start, "node", "lat")?;
    let lon: f64 = attribute(start, "node", "lon")?;

    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        Err(Error::InvalidAttribute {
            element: "node",
            attribute: "lat",
            value: lat.to_string(),
        })
    } else if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        Err(Error::InvalidAttribute {
            element: "node",
            attribute: "lon",
            value: lon.to_string(),
        })
    } else {
        Ok((id, GeoNode::new(lat, lon)))
    }
}

fn parse_way(start: &BytesStart<'_>) -> Result<Way, Error> {
    Ok(Way {
        id: attribute(start, "way", "id")?,
        nodes: Vec::default(),
        tags: HashMap::default(),
    })
}

fn parse_tag(start: &BytesStart<'_>) -> Result<(String, String), Error> {
    let k = string_attribute(start, "tag", "k")?;
    let v = string_attribute(start, "tag", "v")?;
    Ok((k, v))
}

/// Reads and unescapes a required attribute.
fn string_attribute(
    start: &BytesStart<'_>,
    element: &'static str,
    name: &'static str,
) -> Result<String, Error> {
    let attr = start
        .try_get_attribute(name)
        .map_err(quick_xml::Error::InvalidAttr)?
        .ok_or(Error::MissingAttribute {
            element,
            attribute: name,
        })?;
    Ok(attr.unescape_value()?.into_owned())
}

/// Reads and parses a required attribute.
fn attribute<T: FromStr>(
    start: &BytesStart<'_>,
    element: &'static str,
    name: &'static str,
) -> Result<T, Error> {
    let attr = start
        .try_get_attribute(name)
        .map_err(quick_xml::Error::InvalidAttr)?
        .ok_or(Error::MissingAttribute {
            element,
            attribute: name,
        })?;

    let invalid = || Error::InvalidAttribute {
        element,
        attribute: name,
        value: String::from_utf8_lossy(&attr.value).into_owned(),
    };

    from_utf8(&attr.value)
        .map_err(|_| invalid())?
        .trim()
        .parse()
        .map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_XML: &[u8] = include_bytes!("test_fixtures/simple.osm");

    macro_rules! tags {
        {$( $k:literal : $v:literal ),+} => {
            HashMap::from_iter([ $( ($k.to_string(), $v.to_string()) ),+ ])
        };
    }

    fn get_expected_nodes() -> Vec<(i64, GeoNode)> {
        vec![
            (1, GeoNode::new(50.0, 19.0)),
            (2, GeoNode::new(50.0, 19.001)),
            (3, GeoNode::new(50.001, 19.001)),
            (4, GeoNode::new(50.001, 19.0)),
            (5, GeoNode::new(50.002, 19.0)),
            (6, GeoNode::new(50.0005, 19.0005)),
        ]
    }

    fn get_expected_ways() -> Vec<Way> {
        vec![
            Way {
                id: 10,
                nodes: vec![1, 2, 3],
                tags: tags! {"highway": "footway", "name": "Ogrodowa & Polna"},
            },
            Way {
                id: 11,
                nodes: vec![3, 4, 1],
                tags: tags! {"highway": "footway"},
            },
            Way {
                id: 12,
                nodes: vec![4, 5],
                tags: tags! {"highway": "primary"},
            },
            Way {
                id: 13,
                nodes: vec![2],
                tags: tags! {"highway": "footway"},
            },
            Way {
                id: 14,
                nodes: vec![2, 4, 99],
                tags: tags! {"highway": "path"},
            },
            Way {
                id: 15,
                nodes: vec![5, 6],
                tags: tags! {"footway": "sidewalk"},
            },
        ]
    }

    fn check_against_expected<I: Iterator<Item = Result<Feature, Error>>>(
        features: I,
    ) -> Result<(), Error> {
        let mut nodes = Vec::default();
        let mut ways = Vec::default();
        for f in features {
            match f? {
                Feature::Node(id, node) => nodes.push((id, node)),
                Feature::Way(w) => ways.push(w),
            }
        }

        assert_eq!(nodes, get_expected_nodes());
        assert_eq!(ways, get_expected_ways());
        Ok(())
    }

    fn first_error(data: &[u8]) -> Error {
        Reader::from_buffer(data)
            .find_map(|f| f.err())
            .expect("document should be rejected")
    }

    #[test]
    fn parse_from_buf() -> Result<(), Error> {
        check_against_expected(Reader::from_buffer(SIMPLE_XML))
    }

    #[test]
    fn parse_from_io() -> Result<(), Error> {
        check_against_expected(Reader::from_io(io::Cursor::new(SIMPLE_XML)))
    }

    #[test]
    fn missing_root() {
        assert!(matches!(first_error(b""), Error::MissingRoot));
        assert!(matches!(
            first_error(b"<map><node id='1' lat='0' lon='0'/></map>"),
            Error::MissingRoot,
        ));
    }

    #[test]
    fn empty_root() {
        assert_eq!(Reader::from_buffer(b"<osm/>").count(), 0);
    }

    #[test]
    fn missing_node_attribute() {
        let err = first_error(b"<osm><node id='1' lat='50.0'/></osm>");
        assert!(matches!(
            err,
            Error::MissingAttribute {
                element: "node",
                attribute: "lon",
            }
        ));
    }

    #[test]
    fn invalid_node_attribute() {
        let err = first_error(b"<osm><node id='1' lat='north' lon='19.0'/></osm>");
        match err {
            Error::InvalidAttribute {
                element, attribute, value,
            } => {
                assert_eq!(element, "node");
                assert_eq!(attribute, "lat");
                assert_eq!(value, "north");
            }
            _ => panic!("unexpected error: {}", err),
        }

        let err = first_error(b"<osm><node id='1' lat='91.0' lon='19.0'/></osm>");
        assert!(matches!(err, Error::InvalidAttribute { attribute: "lat", .. }));
    }

    #[test]
    fn missing_nd_ref() {
        let err = first_error(b"<osm><way id='1'><nd/></way></osm>");
        assert!(matches!(
            err,
            Error::MissingAttribute {
                element: "nd",
                attribute: "ref",
            }
        ));
    }

    #[test]
    fn relation_children_are_ignored() {
        let features = Reader::from_buffer(
            b"<osm><relation id='1'><tag k='highway' v='footway'/></relation></osm>",
        )
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn iteration_stops_after_error() {
        let mut r = Reader::from_buffer(b"<osm><way/><node id='1' lat='0' lon='0'/></osm>");
        assert!(matches!(r.next(), Some(Err(_))));
        assert!(r.next().is_none());
    }
}
