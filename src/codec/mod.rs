//! MusicXML codec facade
//!
//! # Public contract
//!
//! - [`decode`] / [`decode_with`]: bytes → [`ScoreDocument`]
//! - [`encode`] / [`encode_with`] / [`encode_to_string`]: [`ScoreDocument`] → bytes
//!
//! Decoding is atomic: either the whole document decodes or an error
//! with the failing element's path is returned. Encoding cannot fail
//! except for errors passed through from the XML writer.

#[macro_use]
mod macros;

pub mod context;
pub mod errors;
pub mod traits;

pub use context::{DecodeContext, DecodeOptions, EnumPolicy};
pub use errors::{
    DecodeError, DecodeErrorKind, DecodeResult, DecodeWarning, ElementPath, EncodeError, PathSegment,
};
pub use traits::{
    decode_child, format_decimal, unknown_enum_value, AttributeGroup, ChoiceItem, DecodeFn, FromXml,
    ToXml, XmlValue,
};

use crate::model::ScoreDocument;
use crate::xml;
use serde::{Deserialize, Serialize};

/// Public identifier and system literal of the partwise document type
pub const PARTWISE_DOCTYPE: &str = r#"score-partwise PUBLIC "-//Recordare//DTD MusicXML 4.0 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd""#;

/// Public identifier and system literal of the timewise document type
pub const TIMEWISE_DOCTYPE: &str = r#"score-timewise PUBLIC "-//Recordare//DTD MusicXML 4.0 Timewise//EN" "http://www.musicxml.org/dtds/timewise.dtd""#;

// ============================================================================
// DECODE
// ============================================================================

/// Result of [`decode_with`]: the document plus every non-fatal finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoded {
    pub document: ScoreDocument,
    pub warnings: Vec<DecodeWarning>,
}

/// Decode with default options, discarding warnings
pub fn decode(bytes: &[u8]) -> Result<ScoreDocument, DecodeError> {
    decode_with(bytes, &DecodeOptions::default()).map(|decoded| decoded.document)
}

pub fn decode_with(bytes: &[u8], options: &DecodeOptions) -> Result<Decoded, DecodeError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| DecodeError::new(DecodeErrorKind::MalformedXml(e.to_string())))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut parse_options = roxmltree::ParsingOptions::default();
    parse_options.allow_dtd = true;
    parse_options.nodes_limit = options.nodes_limit;

    let xml = roxmltree::Document::parse_with_options(text, parse_options)
        .map_err(|e| DecodeError::new(DecodeErrorKind::MalformedXml(e.to_string())))?;

    let mut cx = DecodeContext::new(options.clone());
    let document = ScoreDocument::from_root(xml.root_element(), &mut cx)?;

    if options.check_references {
        check_references(&document, &mut cx);
    }

    log::debug!(
        "decoded {} document: {} parts, {} measures, {} warnings",
        document.layout_name(),
        document.part_count(),
        document.measure_count(),
        cx.warnings().len()
    );

    Ok(Decoded {
        document,
        warnings: cx.into_warnings(),
    })
}

/// Semantic cross-reference lint, reported as warnings only
fn check_references(document: &ScoreDocument, cx: &mut DecodeContext) {
    let root = document.root_name();
    cx.enter(root, None);

    for id in document.unresolved_part_ids() {
        cx.warn(format!("part '{}' is not declared in the part-list", id));
    }

    cx.enter("part-list", None);
    for number in document.header().part_list.unbalanced_groups() {
        cx.warn(format!("part-group number {} is not properly started and stopped", number));
    }
    cx.leave();

    cx.leave();
}

// ============================================================================
// ENCODE
// ============================================================================

/// Configuration options for encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Spaces per nesting level; `None` writes everything on one line
    pub indent: Option<usize>,

    /// Emit the MusicXML 4.0 DOCTYPE for the document's layout
    pub doctype: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            indent: Some(2),
            doctype: true,
        }
    }
}

pub fn encode(document: &ScoreDocument) -> Result<Vec<u8>, EncodeError> {
    encode_with(document, &EncodeOptions::default())
}

pub fn encode_with(document: &ScoreDocument, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    let root = document.to_root_element();
    let doctype = options.doctype.then(|| match document {
        ScoreDocument::Partwise(_) => PARTWISE_DOCTYPE,
        ScoreDocument::Timewise(_) => TIMEWISE_DOCTYPE,
    });

    let bytes = xml::write_document(&root, doctype, options.indent)?;
    log::debug!("encoded {} document into {} bytes", document.layout_name(), bytes.len());
    Ok(bytes)
}

pub fn encode_to_string(document: &ScoreDocument, options: &EncodeOptions) -> Result<String, EncodeError> {
    Ok(String::from_utf8(encode_with(document, options)?)?)
}
