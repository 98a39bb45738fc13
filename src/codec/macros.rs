//! Declarative helpers for the repetitive parts of the schema
//!
//! - `xml_enum!`: closed token set with an `Unrecognized(String)` fallback
//! - `xml_number!`: numeric newtype, optionally with a range checked into warnings
//! - `xml_string!`: string newtype
//! - `attribute_group!`: struct of attributes (optional unless listed as
//!   `required`) plus embedded groups
//! - `empty_element!`: `FromXml`/`ToXml` for attribute-only elements

macro_rules! xml_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $lit:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Literal outside the token set, kept in lenient mode
            Unrecognized(String),
        }

        impl $name {
            /// Exact, case-sensitive match against the token set
            pub fn from_literal(text: &str) -> Option<Self> {
                match text {
                    $( $lit => Some(Self::$variant), )+
                    _ => None,
                }
            }

            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $lit, )+
                    Self::Unrecognized(raw) => raw.as_str(),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::codec::XmlValue for $name {
            fn parse_value(
                text: &str,
                cx: &mut $crate::codec::DecodeContext,
            ) -> $crate::codec::DecodeResult<Self> {
                let literal = text.trim();
                match Self::from_literal(literal) {
                    Some(value) => Ok(value),
                    None => $crate::codec::unknown_enum_value(stringify!($name), literal, cx)
                        .map(Self::Unrecognized),
                }
            }

            fn to_value(&self) -> String {
                self.as_str().to_string()
            }
        }
    };
}

macro_rules! xml_number {
    (@define $(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub $inner);

        impl $name {
            pub fn value(&self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&$crate::codec::XmlValue::to_value(&self.0))
            }
        }
    };

    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        xml_number!(@define $(#[$meta])* $name($inner));

        impl $crate::codec::XmlValue for $name {
            fn parse_value(
                text: &str,
                cx: &mut $crate::codec::DecodeContext,
            ) -> $crate::codec::DecodeResult<Self> {
                <$inner as $crate::codec::XmlValue>::parse_value(text, cx)
                    .map(Self)
                    .map_err(|_| $crate::codec::DecodeError::invalid(stringify!($name), text.trim()))
            }

            fn to_value(&self) -> String {
                $crate::codec::XmlValue::to_value(&self.0)
            }
        }
    };

    ($(#[$meta:meta])* $name:ident($inner:ty) in [$lo:expr, $hi:expr]) => {
        xml_number!(@define $(#[$meta])* $name($inner));

        impl $name {
            pub const MIN: $inner = $lo;
            pub const MAX: $inner = $hi;

            pub fn in_range(&self) -> bool {
                Self::MIN <= self.0 && self.0 <= Self::MAX
            }
        }

        impl $crate::codec::XmlValue for $name {
            fn parse_value(
                text: &str,
                cx: &mut $crate::codec::DecodeContext,
            ) -> $crate::codec::DecodeResult<Self> {
                let value = <$inner as $crate::codec::XmlValue>::parse_value(text, cx)
                    .map(Self)
                    .map_err(|_| $crate::codec::DecodeError::invalid(stringify!($name), text.trim()))?;
                if cx.options().check_ranges && !value.in_range() {
                    cx.warn(format!(
                        "{} value {} is outside {}..={}",
                        stringify!($name),
                        value,
                        Self::MIN,
                        Self::MAX
                    ));
                }
                Ok(value)
            }

            fn to_value(&self) -> String {
                $crate::codec::XmlValue::to_value(&self.0)
            }
        }
    };
}

macro_rules! xml_string {
    ($( $(#[$meta:meta])* $name:ident ),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
            pub struct $name(pub String);

            impl $name {
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }

            impl From<String> for $name {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }

            impl $crate::codec::XmlValue for $name {
                fn parse_value(
                    text: &str,
                    _cx: &mut $crate::codec::DecodeContext,
                ) -> $crate::codec::DecodeResult<Self> {
                    Ok(Self(text.to_string()))
                }

                fn to_value(&self) -> String {
                    self.0.clone()
                }
            }
        )+
    };
}

macro_rules! attribute_group {
    (
        $(#[$meta:meta])*
        $name:ident {
            required { $( $(#[$rmeta:meta])* $rfield:ident: $rty:ty => $rattr:literal ),+ $(,)? }
            $( $(#[$fmeta:meta])* $field:ident: $ty:ty => $attr:literal ),* $(,)?
        }
        $( embeds { $( $(#[$gmeta:meta])* $gfield:ident: $gty:ty ),* $(,)? } )?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            $( $(#[$rmeta])* pub $rfield: $rty, )+
            $( $(#[$fmeta])* pub $field: Option<$ty>, )*
            $( $( $(#[$gmeta])* pub $gfield: $gty, )* )?
        }

        impl $crate::codec::AttributeGroup for $name {
            fn read(
                el: &$crate::xml::ElementReader<'_, '_>,
                cx: &mut $crate::codec::DecodeContext,
            ) -> $crate::codec::DecodeResult<Self> {
                Ok(Self {
                    $( $rfield: el.req_attr($rattr, cx)?, )+
                    $( $field: el.attr($attr, cx)?, )*
                    $( $( $gfield: <$gty as $crate::codec::AttributeGroup>::read(el, cx)?, )* )?
                })
            }

            fn write(&self, element: &mut $crate::xml::XmlElement) {
                $( element.attr($rattr, $crate::codec::XmlValue::to_value(&self.$rfield)); )+
                $( element.opt_attr($attr, &self.$field); )*
                $( $( $crate::codec::AttributeGroup::write(&self.$gfield, element); )* )?
            }

            fn is_empty(&self) -> bool {
                false
            }
        }
    };

    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$fmeta:meta])* $field:ident: $ty:ty => $attr:literal ),* $(,)?
        }
        $( embeds { $( $(#[$gmeta:meta])* $gfield:ident: $gty:ty ),* $(,)? } )?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: Option<$ty>, )*
            $( $( $(#[$gmeta])* pub $gfield: $gty, )* )?
        }

        impl $crate::codec::AttributeGroup for $name {
            #[allow(unused_variables)]
            fn read(
                el: &$crate::xml::ElementReader<'_, '_>,
                cx: &mut $crate::codec::DecodeContext,
            ) -> $crate::codec::DecodeResult<Self> {
                Ok(Self {
                    $( $field: el.attr($attr, cx)?, )*
                    $( $( $gfield: <$gty as $crate::codec::AttributeGroup>::read(el, cx)?, )* )?
                })
            }

            #[allow(unused_variables)]
            fn write(&self, element: &mut $crate::xml::XmlElement) {
                $( element.opt_attr($attr, &self.$field); )*
                $( $( $crate::codec::AttributeGroup::write(&self.$gfield, element); )* )?
            }

            fn is_empty(&self) -> bool {
                true
                    $( && self.$field.is_none() )*
                    $( $( && $crate::codec::AttributeGroup::is_empty(&self.$gfield) )* )?
            }
        }
    };
}

macro_rules! empty_element {
    ($($name:ty),+ $(,)?) => {
        $(
            impl $crate::codec::FromXml for $name {
                fn from_xml(
                    node: roxmltree::Node<'_, '_>,
                    cx: &mut $crate::codec::DecodeContext,
                ) -> $crate::codec::DecodeResult<Self> {
                    let el = $crate::xml::ElementReader::new(node);
                    let value = <Self as $crate::codec::AttributeGroup>::read(&el, cx)?;
                    el.finish()?;
                    Ok(value)
                }
            }

            impl $crate::codec::ToXml for $name {
                fn to_xml(&self, tag: &str) -> $crate::xml::XmlElement {
                    let mut element = $crate::xml::XmlElement::new(tag);
                    $crate::codec::AttributeGroup::write(self, &mut element);
                    element
                }
            }
        )+
    };
}
