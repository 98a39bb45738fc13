//! Decode configuration and per-call decode state

use super::errors::{DecodeWarning, ElementPath, PathSegment};
use serde::{Deserialize, Serialize};

/// How to treat enumerated values outside the declared token set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnumPolicy {
    /// Keep the raw literal in the type's `Unrecognized` variant and record a warning
    #[default]
    Lenient,
    /// Fail with `UnknownEnumValue`
    Strict,
}

/// Configuration options for decoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub enum_policy: EnumPolicy,

    /// Record warnings for numbers outside their schema range
    pub check_ranges: bool,

    /// Record warnings for undeclared part ids and unbalanced part groups
    pub check_references: bool,

    /// Upper bound on XML nodes, forwarded to the parser
    pub nodes_limit: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            enum_policy: EnumPolicy::Lenient,
            check_ranges: true,
            check_references: true,
            nodes_limit: u32::MAX,
        }
    }
}

impl DecodeOptions {
    pub fn strict() -> Self {
        Self {
            enum_policy: EnumPolicy::Strict,
            ..Self::default()
        }
    }
}

/// State threaded through one decode call.
///
/// Tracks the current element path so that warnings raised deep inside a
/// value parser still know where they came from.
#[derive(Debug)]
pub struct DecodeContext {
    options: DecodeOptions,
    path: Vec<PathSegment>,
    warnings: Vec<DecodeWarning>,
}

impl DecodeContext {
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            options,
            path: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    pub(crate) fn enter(&mut self, name: &str, index: Option<usize>) {
        self.path.push(PathSegment::new(name, index));
    }

    pub(crate) fn leave(&mut self) {
        self.path.pop();
    }

    pub fn current_path(&self) -> ElementPath {
        ElementPath(self.path.clone())
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let warning = DecodeWarning {
            path: self.current_path(),
            message: message.into(),
        };
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[DecodeWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<DecodeWarning> {
        self.warnings
    }
}

impl Default for DecodeContext {
    fn default() -> Self {
        Self::new(DecodeOptions::default())
    }
}
