//! Typed MusicXML document model
//!
//! One module per schema area, layered bottom-up:
//!
//! - [`primitives`]: simple types (enumerations, numeric and string domains)
//! - [`groups`]: attribute groups embedded by composition
//! - [`common`]: text elements, empty elements, editorial, dynamics, MIDI
//! - [`attributes`], [`note`], [`notations`], [`direction`], [`harmony`],
//!   [`barline`], [`sound`], [`layout`]: element content
//! - [`header`] and [`score`]: part list, header and the document roots
//!
//! Every element type implements `FromXml` and `ToXml`; content models
//! that allow any order and repetition are kept as lists of tagged items.

pub mod attributes;
pub mod barline;
pub mod common;
pub mod direction;
pub mod groups;
pub mod harmony;
pub mod header;
pub mod layout;
pub mod notations;
pub mod note;
pub mod primitives;
pub mod score;
pub mod sound;

pub use attributes::*;
pub use barline::*;
pub use common::*;
pub use direction::*;
pub use groups::*;
pub use harmony::*;
pub use header::*;
pub use layout::*;
pub use notations::*;
pub use note::*;
pub use primitives::*;
pub use score::*;
pub use sound::*;
