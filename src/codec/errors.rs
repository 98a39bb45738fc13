//! Error types for MusicXML decoding and encoding
//!
//! Decode failures are fatal and carry the path of the element where they
//! occurred. Non-fatal findings (out-of-range numbers, unknown enum
//! literals kept in lenient mode, dangling part references) are reported
//! as [`DecodeWarning`]s instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// ELEMENT PATH
// ============================================================================

/// One step in an element path: a tag name plus its position among
/// same-named siblings when the element is repeatable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    pub name: String,
    pub index: Option<usize>,
}

impl PathSegment {
    pub fn new(name: impl Into<String>, index: Option<usize>) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}]", self.name, index),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Location of a node in the source document, outermost element first.
///
/// Rendered as `score-partwise/part[0]/measure[1]/note[2]/pitch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementPath(pub Vec<PathSegment>);

impl ElementPath {
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tag names along the path, without indices
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|s| s.name.as_str()).collect()
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

// ============================================================================
// DECODE ERRORS
// ============================================================================

/// What went wrong while decoding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeErrorKind {
    /// Input is not well-formed XML (or not UTF-8)
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// Root tag is neither `score-partwise` nor `score-timewise`
    #[error("unexpected root element <{0}>, expected <score-partwise> or <score-timewise>")]
    UnexpectedRootElement(String),

    /// Child tag not allowed at this position
    #[error("unexpected element <{name}>")]
    UnexpectedElement { name: String },

    /// Required attribute (`@name`) or child element is absent
    #[error("missing required field {field}")]
    MissingRequiredField { field: String },

    /// Enumerated value outside the token set (strict mode only)
    #[error("unknown {type_name} value '{value}'")]
    UnknownEnumValue {
        type_name: &'static str,
        value: String,
    },

    /// Dual-form value that matches neither of its forms
    #[error("'{value}' is neither form of {type_name}")]
    UnparseableUnion {
        type_name: &'static str,
        value: String,
    },

    /// Scalar text that does not parse as its type (e.g. `abc` for a decimal)
    #[error("invalid {type_name} value '{value}'")]
    InvalidValue {
        type_name: &'static str,
        value: String,
    },
}

/// Fatal decode failure with the path of the element that caused it
#[derive(Debug, Clone, PartialEq, Error)]
pub struct DecodeError {
    kind: DecodeErrorKind,
    path: ElementPath,
}

impl DecodeError {
    pub fn new(kind: DecodeErrorKind) -> Self {
        Self {
            kind,
            path: ElementPath::default(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::MissingRequiredField {
            field: field.into(),
        })
    }

    pub fn unexpected(name: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::UnexpectedElement { name: name.into() })
    }

    pub fn invalid(type_name: &'static str, value: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::InvalidValue {
            type_name,
            value: value.into(),
        })
    }

    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    pub fn path(&self) -> &ElementPath {
        &self.path
    }

    /// Prefix the path with the enclosing element.
    pub(crate) fn at(mut self, name: &str, index: Option<usize>) -> Self {
        self.path.0.insert(0, PathSegment::new(name, index));
        self
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} at {}", self.kind, self.path)
        }
    }
}

/// Result type for decode operations
pub type DecodeResult<T> = Result<T, DecodeError>;

// ============================================================================
// WARNINGS
// ============================================================================

/// Non-fatal finding recorded during decode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeWarning {
    pub path: ElementPath,
    pub message: String,
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

// ============================================================================
// ENCODE ERRORS
// ============================================================================

/// Failures signalled by the underlying XML writer, passed through unchanged
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("encoded output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_rendering() {
        let err = DecodeError::missing("step")
            .at("pitch", None)
            .at("note", Some(2))
            .at("measure", Some(0))
            .at("part", Some(1))
            .at("score-partwise", None);

        assert_eq!(
            err.path().to_string(),
            "score-partwise/part[1]/measure[0]/note[2]/pitch"
        );
        assert_eq!(
            err.to_string(),
            "missing required field step at score-partwise/part[1]/measure[0]/note[2]/pitch"
        );
    }

    #[test]
    fn test_root_error_has_no_location() {
        let err = DecodeError::new(DecodeErrorKind::UnexpectedRootElement("html".to_string()));
        assert!(err.path().is_empty());
        assert!(err.to_string().starts_with("unexpected root element <html>"));
    }
}
