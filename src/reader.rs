//! Composite loads of DDS, DAS and DODS documents.
//!
//! Fetching is delegated to a [`Source`]; the reader only parses what the
//! source hands back. [`FileSource`] serves documents from disk.

use crate::error::{DapError, Result};
use crate::parser::{parse_das, parse_dds};
use crate::schema::SchemaNode;
use crate::xdr::{unpack, Value};
use std::path::PathBuf;
use tracing::{debug, info};

/// Separator between the DDS text and the XDR payload of a DODS response.
pub const DATA_MARKER: &[u8] = b"\nData:\n";

/// Supplier of raw DAP2 documents, typically an HTTP client.
pub trait Source {
    /// Fetch a textual document (DDS or DAS).
    fn fetch_text(&self, location: &str) -> Result<String>;

    /// Fetch a binary document (DODS).
    fn fetch_bytes(&self, location: &str) -> Result<Vec<u8>>;
}

/// A [`Source`] that reads documents from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    root: Option<PathBuf>,
}

impl FileSource {
    /// Resolve locations relative to the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve locations relative to `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(location),
            None => PathBuf::from(location),
        }
    }
}

impl Source for FileSource {
    fn fetch_text(&self, location: &str) -> Result<String> {
        let path = self.resolve(location);
        std::fs::read_to_string(&path).map_err(|e| DapError::file_open(path, e))
    }

    fn fetch_bytes(&self, location: &str) -> Result<Vec<u8>> {
        let path = self.resolve(location);
        std::fs::read(&path).map_err(|e| DapError::file_open(path, e))
    }
}

/// A decoded DODS response.
#[derive(Debug, Clone, PartialEq)]
pub struct DodsResponse {
    /// Schema of the requested data, parsed from the response header.
    pub schema: SchemaNode,
    /// Decoded values.
    pub values: Value,
}

/// Split a DODS body into its DDS text and XDR payload.
pub fn split_dods(body: &[u8]) -> Result<(String, &[u8])> {
    let start = body
        .windows(DATA_MARKER.len())
        .position(|w| w == DATA_MARKER)
        .ok_or(DapError::MissingDataMarker)?;
    // Header bytes are single-byte characters.
    let dds = body[..start].iter().map(|&b| b as char).collect();
    Ok((dds, &body[start + DATA_MARKER.len()..]))
}

/// Parse and unpack a complete DODS body.
pub fn decode_dods(body: &[u8]) -> Result<DodsResponse> {
    let (dds, payload) = split_dods(body)?;
    let schema = parse_dds(&dds)?;
    let values = unpack(payload, &schema)?;
    Ok(DodsResponse { schema, values })
}

/// DAP2 reader over a [`Source`].
#[derive(Debug, Clone)]
pub struct DapReader<S> {
    source: S,
}

impl<S: Source> DapReader<S> {
    /// Create a reader.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetch and parse a DDS.
    pub fn load_dds(&self, location: &str) -> Result<SchemaNode> {
        let text = self.source.fetch_text(location)?;
        Ok(parse_dds(&text)?)
    }

    /// Fetch a DAS and merge it into `schema`, or into an empty dataset.
    pub fn load_das(&self, location: &str, schema: Option<SchemaNode>) -> Result<SchemaNode> {
        let text = self.source.fetch_text(location)?;
        let schema = schema.unwrap_or_else(SchemaNode::empty_dataset);
        Ok(parse_das(&text, schema)?)
    }

    /// Fetch `<base>.dds` then `<base>.das` and return the merged schema.
    pub fn load_dataset(&self, base: &str) -> Result<SchemaNode> {
        info!("Loading dataset {}", base);
        let schema = self.load_dds(&format!("{}.dds", base))?;
        let schema = self.load_das(&format!("{}.das", base), Some(schema))?;
        debug!("Dataset {} has {} variables", base, schema.variable_count());
        Ok(schema)
    }

    /// Fetch a DODS response and decode both its schema and values.
    pub fn load_data_and_dds(&self, location: &str) -> Result<DodsResponse> {
        info!("Loading data {}", location);
        let body = self.source.fetch_bytes(location)?;
        decode_dods(&body)
    }

    /// Fetch a DODS response and return only the values.
    pub fn load_data(&self, location: &str) -> Result<Value> {
        Ok(self.load_data_and_dds(location)?.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xdr::Scalar;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_dods_separates_header_and_payload() {
        let body = b"Dataset { Int32 x; } d;\nData:\n\x00\x00\x00\x07";
        let (dds, payload) = split_dods(body).unwrap();
        assert_eq!(dds, "Dataset { Int32 x; } d;");
        assert_eq!(payload, &[0, 0, 0, 7]);
    }

    #[test]
    fn split_dods_requires_marker() {
        let err = split_dods(b"Dataset { Int32 x; } d;").unwrap_err();
        assert!(matches!(err, DapError::MissingDataMarker));
    }

    #[test]
    fn decode_dods_end_to_end() {
        let mut body = b"Dataset {\n    Int32 x[2];\n} d;\nData:\n".to_vec();
        for word in [2u32, 2, 1, 2] {
            body.extend(word.to_be_bytes());
        }
        let response = decode_dods(&body).unwrap();
        assert_eq!(response.schema.name, "d");
        assert_eq!(
            response.values.field("x").unwrap().flatten(),
            vec![Scalar::Int32(1), Scalar::Int32(2)]
        );
    }

    #[test]
    fn file_source_reports_missing_files() {
        let reader = DapReader::new(FileSource::with_root("/nonexistent"));
        let err = reader.load_dds("nothing.dds").unwrap_err();
        assert!(matches!(err, DapError::FileOpen { .. }));
    }
}
