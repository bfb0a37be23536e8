//! Object/property tree for MSA XML API responses
//!
//! Every response is a `RESPONSE` root holding `OBJECT` elements. Each object
//! carries `name`/`basetype` attributes, a flat list of `PROPERTY` children
//! (attribute `name`, text value) and optionally nested objects. The tree is
//! built once per response so mappers only ask for properties by name.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::ApiError;

type Result<T> = std::result::Result<T, ApiError>;

const OBJECT_TAG: &[u8] = b"OBJECT";
const PROPERTY_TAG: &[u8] = b"PROPERTY";

/// Parsed response document: the top-level objects in payload order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    objects: Vec<Object>,
}

/// One `OBJECT` node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    name: String,
    basetype: Option<String>,
    properties: Vec<(String, String)>,
    objects: Vec<Object>,
}

impl Document {
    /// Parse a response body. Fails on malformed XML or an empty body.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(data);
        reader.config_mut().trim_text(true);

        let mut saw_root = false;
        let mut depth = 0usize;
        let mut stack: Vec<Object> = Vec::new();
        let mut roots: Vec<Object> = Vec::new();
        // Name and collected text of the PROPERTY currently open
        let mut property: Option<(String, String)> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                ApiError::Parse(format!(
                    "invalid xml at position {}: {}",
                    reader.error_position(),
                    e
                ))
            })?;

            match event {
                Event::Start(ref e) => {
                    saw_root = true;
                    depth += 1;
                    match e.name().as_ref() {
                        OBJECT_TAG => stack.push(Object::from_start(e)?),
                        PROPERTY_TAG => property = Some((attribute(e, "name")?, String::new())),
                        _ => {}
                    }
                }
                Event::Empty(ref e) => {
                    saw_root = true;
                    match e.name().as_ref() {
                        OBJECT_TAG => attach(&mut stack, &mut roots, Object::from_start(e)?),
                        PROPERTY_TAG => {
                            if let Some(object) = stack.last_mut() {
                                object.properties.push((attribute(e, "name")?, String::new()));
                            }
                        }
                        _ => {}
                    }
                }
                Event::Text(ref t) => {
                    if let Some((_, value)) = property.as_mut() {
                        let text = t.unescape().map_err(ApiError::from)?;
                        value.push_str(&text);
                    }
                }
                Event::CData(ref t) => {
                    if let Some((_, value)) = property.as_mut() {
                        value.push_str(&String::from_utf8_lossy(t));
                    }
                }
                Event::End(ref e) => {
                    depth = depth.saturating_sub(1);
                    match e.name().as_ref() {
                        OBJECT_TAG => {
                            if let Some(object) = stack.pop() {
                                attach(&mut stack, &mut roots, object);
                            }
                        }
                        PROPERTY_TAG => {
                            if let (Some(prop), Some(object)) = (property.take(), stack.last_mut()) {
                                object.properties.push(prop);
                            }
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(ApiError::Parse("empty document".to_string()));
        }
        if depth != 0 || !stack.is_empty() {
            return Err(ApiError::Parse("unexpected end of document".to_string()));
        }

        Ok(Self { objects: roots })
    }

    /// Top-level objects with the given `name` attribute, in payload order
    pub fn objects_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Object> + 'a {
        self.objects.iter().filter(move |o| o.name == name)
    }

    /// First top-level object with the given `name` attribute
    pub fn object_named(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.name == name)
    }
}

impl Object {
    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        let mut object = Object::default();
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let value = attr.unescape_value()?.into_owned();
            match attr.key.as_ref() {
                b"name" => object.name = value,
                b"basetype" => object.basetype = Some(value),
                _ => {}
            }
        }
        Ok(object)
    }

    /// First property with this name, if present
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Property that must be present
    pub fn require(&self, name: &str) -> Result<&str> {
        self.property(name).ok_or_else(|| ApiError::MissingProperty {
            object: self.name.clone(),
            property: name.to_string(),
        })
    }

    /// Optional property parsed as a number.
    ///
    /// An empty or unparsable value counts as absent so one odd item does
    /// not fail the whole response.
    pub fn numeric<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        let raw = self.property(name)?;
        match raw.trim().parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!(
                    "Ignoring non-numeric property '{}' of '{}': '{}'",
                    name,
                    self.name,
                    raw
                );
                None
            }
        }
    }

    /// Nested objects with the given `name` attribute
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Object> + 'a {
        self.objects.iter().filter(move |o| o.name == name)
    }

    /// First nested object with the given `name` attribute
    pub fn child_named(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// First nested object with the given `basetype` attribute
    pub fn child_by_basetype(&self, basetype: &str) -> Option<&Object> {
        self.objects
            .iter()
            .find(|o| o.basetype.as_deref() == Some(basetype))
    }
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Result<String> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == key.as_bytes() {
            return Ok(attr.unescape_value()?.into_owned());
        }
    }
    Ok(String::new())
}

fn attach(stack: &mut [Object], roots: &mut Vec<Object>, object: Object) {
    match stack.last_mut() {
        Some(parent) => parent.objects.push(object),
        None => roots.push(object),
    }
}
