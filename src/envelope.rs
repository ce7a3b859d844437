//! Request envelope for the ServiceDesk Plus XML API.
//!
//! Every operation that takes input sends it as the `INPUT_DATA` query
//! parameter, shaped by the vendor as:
//!
//! ```text
//! <Operation>
//!   <Details>
//!     [<wrapper>...]
//!       <parameter><name>K</name><value>V</value></parameter>
//!       ...
//! </Operation>
//! ```
//!
//! Field names and values are escaped by the writer but otherwise passed
//! through; the server decides what is legal.

use std::io;

use quick_xml::events::BytesText;
use quick_xml::Writer;

use crate::error::SdpError;

/// Ordered field name to value pairs for one request.
///
/// Inserting a name that is already present replaces its value and keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    entries: Vec<(String, String)>,
}

impl Fields {
    /// Creates an empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a field.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the value of a field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over the fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

/// Serializes `fields` into the operation envelope.
///
/// `wrappers` are nested, outermost first, between `Details` and the
/// parameter list. No XML declaration is emitted.
///
/// # Errors
///
/// Returns `SdpError::Xml` if the writer fails, which an in-memory buffer
/// does not do in practice.
pub fn build_envelope(fields: &Fields, wrappers: &[&str]) -> Result<String, SdpError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .create_element("Operation")
        .write_inner_content(|w| {
            w.create_element("Details")
                .write_inner_content(|w| write_wrapped(w, wrappers, fields))?;
            Ok(())
        })
        .map_err(quick_xml::Error::from)?;

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn write_wrapped(writer: &mut Writer<Vec<u8>>, wrappers: &[&str], fields: &Fields) -> io::Result<()> {
    if let Some((outer, rest)) = wrappers.split_first() {
        writer
            .create_element(*outer)
            .write_inner_content(|w| write_wrapped(w, rest, fields))?;
        return Ok(());
    }

    for (name, value) in fields.iter() {
        writer.create_element("parameter").write_inner_content(|w| {
            w.create_element("name")
                .write_text_content(BytesText::new(name))?;
            w.create_element("value")
                .write_text_content(BytesText::new(value))?;
            Ok(())
        })?;
    }
    Ok(())
}
