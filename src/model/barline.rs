//! Barlines, repeats and endings

use super::common::*;
use super::groups::*;
use super::notations::{Fermata, WavyLine};
use super::primitives::*;
use crate::codec::{DecodeContext, DecodeResult, FromXml, ToXml};
use crate::xml::{ElementReader, XmlElement};
use roxmltree::Node;
use serde::{Deserialize, Serialize};

attribute_group! { BarStyleAttributes { color: Color => "color" } }

pub type BarStyleColor = Valued<BarStyle, BarStyleAttributes>;

attribute_group! {
    /// Segno or coda sign, in a barline or a direction
    SegnoCoda {}
    embeds {
        print_style_align: PrintStyleAlign,
        id: OptionalUniqueId,
        smufl: Smufl,
    }
}

empty_element!(SegnoCoda);

pub type Segno = SegnoCoda;
pub type Coda = SegnoCoda;

attribute_group! {
    EndingAttributes {
        required {
            number: EndingNumber => "number",
            kind: StartStopDiscontinue => "type",
        }
        system: SystemRelation => "system",
        end_length: Tenths => "end-length",
        text_x: Tenths => "text-x",
        text_y: Tenths => "text-y",
    }
    embeds {
        print_object: PrintObject,
        print_style: PrintStyle,
    }
}

/// Volta bracket; the text is usually the ending number list
pub type Ending = Valued<String, EndingAttributes>;

attribute_group! {
    Repeat {
        required { direction: BackwardForward => "direction" }
        times: u32 => "times",
        after_jump: YesNo => "after-jump",
        winged: Winged => "winged",
    }
}

empty_element!(Repeat);

impl Repeat {
    pub fn new(direction: BackwardForward) -> Self {
        Self {
            direction,
            times: None,
            after_jump: None,
            winged: None,
        }
    }
}

attribute_group! {
    BarlineAttributes {
        location: RightLeftMiddle => "location",
        segno: String => "segno",
        coda: String => "coda",
        divisions: Divisions => "divisions",
    }
    embeds { id: OptionalUniqueId }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Barline {
    pub bar_style: Option<BarStyleColor>,
    pub editorial: Editorial,
    pub wavy_line: Option<WavyLine>,
    pub segno: Option<Segno>,
    pub coda: Option<Coda>,
    /// At most two
    pub fermatas: Vec<Fermata>,
    pub ending: Option<Ending>,
    pub repeat: Option<Repeat>,
    pub attributes: BarlineAttributes,
}

impl Barline {
    /// Location of the barline, right when absent
    pub fn location(&self) -> RightLeftMiddle {
        self.attributes
            .location
            .clone()
            .unwrap_or(RightLeftMiddle::Right)
    }

    /// Final barline at the right of a measure
    pub fn final_bar() -> Self {
        Self {
            bar_style: Some(Valued::new(BarStyle::LightHeavy)),
            ..Self::default()
        }
    }
}

impl FromXml for Barline {
    fn from_xml(node: Node<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        let mut el = ElementReader::new(node);
        let value = Self {
            attributes: el.group(cx)?,
            bar_style: el.child("bar-style", cx)?,
            editorial: Editorial::read(&mut el, cx)?,
            wavy_line: el.child("wavy-line", cx)?,
            segno: el.child("segno", cx)?,
            coda: el.child("coda", cx)?,
            fermatas: el.children("fermata", cx)?,
            ending: el.child("ending", cx)?,
            repeat: el.child("repeat", cx)?,
        };
        el.finish()?;
        Ok(value)
    }
}

impl ToXml for Barline {
    fn to_xml(&self, tag: &str) -> XmlElement {
        let mut element = XmlElement::new(tag);
        element.group(&self.attributes);
        element.opt_child("bar-style", &self.bar_style);
        self.editorial.write(&mut element);
        element.opt_child("wavy-line", &self.wavy_line);
        element.opt_child("segno", &self.segno);
        element.opt_child("coda", &self.coda);
        element.children("fermata", &self.fermatas);
        element.opt_child("ending", &self.ending);
        element.opt_child("repeat", &self.repeat);
        element
    }
}
