//! Generic XML layer underneath the MusicXML codec
//!
//! # Architecture
//!
//! ```text
//! bytes ──[roxmltree]──> Node tree ──[ElementReader + FromXml]──> document
//! document ──[ToXml]──> XmlElement tree ──[quick-xml Writer]──> bytes
//! ```

pub mod reader;
pub mod tree;
pub mod writer;

pub use reader::ElementReader;
pub use tree::{XmlElement, XmlNode, XLINK_NAMESPACE, XML_NAMESPACE};
pub use writer::write_document;
