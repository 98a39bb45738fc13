//! Conversion traits between the document model and XML
//!
//! - [`XmlValue`]: scalar text of an attribute or a text-only element
//! - [`AttributeGroup`]: reusable bundle of optional attributes
//! - [`FromXml`] / [`ToXml`]: element content in both directions
//! - [`ChoiceItem`]: one entry of an ordered-choice sequence

use super::context::{DecodeContext, EnumPolicy};
use super::errors::{DecodeError, DecodeErrorKind, DecodeResult};
use crate::xml::{ElementReader, XmlElement};
use roxmltree::Node;

/// Scalar value with a single textual form
pub trait XmlValue: Sized {
    fn parse_value(text: &str, cx: &mut DecodeContext) -> DecodeResult<Self>;
    fn to_value(&self) -> String;
}

/// Decode an element's attributes and children
pub trait FromXml: Sized {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self>;
}

/// Lower a value to an element with the given tag name.
///
/// The tag is supplied by the owner because many types appear under
/// several names (`accent`, `staccato` and `tenuto` share one type).
pub trait ToXml {
    fn to_xml(&self, tag: &str) -> XmlElement;
}

/// Bundle of optional attributes embedded by composition
pub trait AttributeGroup: Sized {
    fn read(el: &ElementReader<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self>;
    fn write(&self, element: &mut XmlElement);
    fn is_empty(&self) -> bool;
}

/// Item of an ordered, repeatable choice among a fixed set of element kinds
pub trait ChoiceItem: Sized {
    /// Decode `node` when `name` is part of the repertoire, `None` otherwise
    fn decode_item(name: &str, node: Node<'_, '_>, cx: &mut DecodeContext) -> Option<DecodeResult<Self>>;

    fn to_element(&self) -> XmlElement;
}

impl<T: FromXml> FromXml for Box<T> {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        T::from_xml(node, cx).map(Box::new)
    }
}

impl<T: ToXml> ToXml for Box<T> {
    fn to_xml(&self, tag: &str) -> XmlElement {
        (**self).to_xml(tag)
    }
}

/// Signature of the entries in the tag-name dispatch tables
pub type DecodeFn<T> = fn(Node<'_, '_>, &mut DecodeContext) -> DecodeResult<T>;

/// Decode a child element, tracking its path for warnings and errors
pub fn decode_child<T: FromXml>(node: Node<'_, '_>, index: Option<usize>, cx: &mut DecodeContext) -> DecodeResult<T> {
    let name = node.tag_name().name();
    cx.enter(name, index);
    let value = T::from_xml(node, cx);
    cx.leave();
    value.map_err(|e| e.at(name, index))
}

/// Apply the enum policy to a literal outside a type's token set
pub fn unknown_enum_value(type_name: &'static str, literal: &str, cx: &mut DecodeContext) -> DecodeResult<String> {
    match cx.options().enum_policy {
        EnumPolicy::Strict => Err(DecodeError::new(DecodeErrorKind::UnknownEnumValue {
            type_name,
            value: literal.to_string(),
        })),
        EnumPolicy::Lenient => {
            cx.warn(format!("unknown {} value '{}' kept as-is", type_name, literal));
            Ok(literal.to_string())
        }
    }
}

/// Shortest round-trip decimal text, never in exponent form
pub fn format_decimal(value: f64) -> String {
    if value == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    value.to_string()
}

// ============================================================================
// PRIMITIVE IMPLEMENTATIONS
// ============================================================================

impl XmlValue for String {
    fn parse_value(text: &str, _cx: &mut DecodeContext) -> DecodeResult<Self> {
        Ok(text.to_string())
    }

    fn to_value(&self) -> String {
        self.clone()
    }
}

macro_rules! integer_value {
    ($($ty:ty),+) => {
        $(
            impl XmlValue for $ty {
                fn parse_value(text: &str, _cx: &mut DecodeContext) -> DecodeResult<Self> {
                    let trimmed = text.trim();
                    trimmed
                        .parse::<$ty>()
                        .map_err(|_| DecodeError::invalid(stringify!($ty), trimmed))
                }

                fn to_value(&self) -> String {
                    self.to_string()
                }
            }
        )+
    };
}

integer_value!(u8, u16, u32, u64, i8, i16, i32, i64);

impl XmlValue for f64 {
    fn parse_value(text: &str, _cx: &mut DecodeContext) -> DecodeResult<Self> {
        let trimmed = text.trim();
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(DecodeError::invalid("decimal", trimmed)),
        }
    }

    fn to_value(&self) -> String {
        format_decimal(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_formatting() {
        assert_eq!(format_decimal(4.0), "4");
        assert_eq!(format_decimal(0.5), "0.5");
        assert_eq!(format_decimal(-0.0), "0");
        assert_eq!(format_decimal(-12.25), "-12.25");
        assert_eq!(format_decimal(1e21), "1000000000000000000000");
    }

    #[test]
    fn test_decimal_rejects_non_numbers() {
        let mut cx = DecodeContext::default();
        assert!(f64::parse_value("abc", &mut cx).is_err());
        assert!(f64::parse_value("NaN", &mut cx).is_err());
        assert_eq!(f64::parse_value(" 2.5 ", &mut cx).expect("decimal parses"), 2.5);
    }

    #[test]
    fn test_strict_policy_rejects_unknown_literal() {
        let mut cx = DecodeContext::new(crate::codec::DecodeOptions::strict());
        let err = unknown_enum_value("StartStop", "begin", &mut cx).expect_err("strict mode fails");
        assert!(matches!(err.kind(), DecodeErrorKind::UnknownEnumValue { .. }));
        assert!(cx.warnings().is_empty());
    }
}
