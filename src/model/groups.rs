//! Attribute groups
//!
//! Reusable bundles of optional attributes. Elements embed the groups they
//! carry as plain fields; no element "is" a group. Encoding writes an
//! element's own attributes first, then each embedded group in field order.

use super::primitives::*;
use crate::codec::{AttributeGroup, DecodeContext, DecodeResult};
use crate::xml::{ElementReader, XmlElement, XLINK_NAMESPACE};
use serde::{Deserialize, Serialize};

// ============================================================================
// POSITION, FONT, COLOR
// ============================================================================

attribute_group! {
    /// Placement in tenths, absolute (`default-*`) or relative to it (`relative-*`)
    Position {
        default_x: Tenths => "default-x",
        default_y: Tenths => "default-y",
        relative_x: Tenths => "relative-x",
        relative_y: Tenths => "relative-y",
    }
}

attribute_group! {
    Font {
        font_family: CommaSeparatedText => "font-family",
        font_style: FontStyle => "font-style",
        font_size: FontSize => "font-size",
        font_weight: FontWeight => "font-weight",
    }
}

attribute_group! {
    /// Position, font and color together
    PrintStyle {
        color: Color => "color",
    }
    embeds {
        position: Position,
        font: Font,
    }
}

attribute_group! {
    PrintStyleAlign {
        halign: LeftCenterRight => "halign",
        valign: Valign => "valign",
    }
    embeds {
        print_style: PrintStyle,
    }
}

attribute_group! { Placement { placement: AboveBelow => "placement" } }
attribute_group! { PrintObject { print_object: YesNo => "print-object" } }
attribute_group! { OptionalUniqueId { id: String => "id" } }
attribute_group! { Smufl { smufl: SmuflGlyphName => "smufl" } }

attribute_group! {
    Printout {
        print_dot: YesNo => "print-dot",
        print_lyric: YesNo => "print-lyric",
        print_spacing: YesNo => "print-spacing",
    }
    embeds {
        print_object: PrintObject,
    }
}

// ============================================================================
// TEXT
// ============================================================================

attribute_group! {
    /// Number of lines for each decoration, 0-3
    TextDecoration {
        underline: NumberOfLines => "underline",
        overline: NumberOfLines => "overline",
        line_through: NumberOfLines => "line-through",
    }
}

attribute_group! {
    /// Formatting shared by every displayed text element
    TextFormatting {
        justify: LeftCenterRight => "justify",
        dir: TextDirection => "dir",
        rotation: RotationDegrees => "rotation",
        letter_spacing: NumberOrNormal => "letter-spacing",
        line_height: NumberOrNormal => "line-height",
        lang: XmlLang => "xml:lang",
        space: XmlSpace => "xml:space",
        enclosure: EnclosureShape => "enclosure",
    }
    embeds {
        print_style_align: PrintStyleAlign,
        text_decoration: TextDecoration,
    }
}

attribute_group! {
    /// Text formatting plus an optional document-unique id
    TextFormattingId {}
    embeds {
        text_formatting: TextFormatting,
        id: OptionalUniqueId,
    }
}

attribute_group! {
    SymbolFormatting {
        justify: LeftCenterRight => "justify",
        dir: TextDirection => "dir",
        rotation: RotationDegrees => "rotation",
        letter_spacing: NumberOrNormal => "letter-spacing",
        line_height: NumberOrNormal => "line-height",
        enclosure: EnclosureShape => "enclosure",
    }
    embeds {
        print_style_align: PrintStyleAlign,
        text_decoration: TextDecoration,
    }
}

attribute_group! {
    SymbolFormattingId {}
    embeds {
        symbol_formatting: SymbolFormatting,
        id: OptionalUniqueId,
    }
}

// ============================================================================
// LINES AND CURVES
// ============================================================================

attribute_group! {
    DashedFormatting {
        dash_length: Tenths => "dash-length",
        space_length: Tenths => "space-length",
    }
}

attribute_group! {
    /// Line style of spanners drawn as lines (wedges, dashes, brackets)
    LineFormatting {
        line_type: LineType => "line-type",
    }
    embeds {
        dashed_formatting: DashedFormatting,
    }
}

attribute_group! {
    /// Control points of slurs and ties
    Bezier {
        bezier_x: Tenths => "bezier-x",
        bezier_y: Tenths => "bezier-y",
        bezier_x2: Tenths => "bezier-x2",
        bezier_y2: Tenths => "bezier-y2",
        bezier_offset: Divisions => "bezier-offset",
        bezier_offset2: Divisions => "bezier-offset2",
    }
}

// ============================================================================
// PLAYBACK
// ============================================================================

attribute_group! {
    /// Playback of trills, mordents, turns, shakes and wavy lines
    TrillSound {
        start_note: StartNote => "start-note",
        trill_step: TrillStep => "trill-step",
        two_note_turn: TwoNoteTurn => "two-note-turn",
        accelerate: YesNo => "accelerate",
        beats: TrillBeats => "beats",
        second_beat: Percent => "second-beat",
        last_beat: Percent => "last-beat",
    }
}

attribute_group! {
    BendSound {
        accelerate: YesNo => "accelerate",
        beats: TrillBeats => "beats",
        first_beat: Percent => "first-beat",
        last_beat: Percent => "last-beat",
    }
}

// ============================================================================
// EDITORIAL AND LAYOUT
// ============================================================================

attribute_group! {
    LevelDisplay {
        parentheses: YesNo => "parentheses",
        bracket: YesNo => "bracket",
        size: SymbolSize => "size",
    }
}

attribute_group! {
    /// System and page breaks requested by `print`
    PrintAttributes {
        staff_spacing: Tenths => "staff-spacing",
        new_system: YesNo => "new-system",
        new_page: YesNo => "new-page",
        blank_page: u32 => "blank-page",
        page_number: String => "page-number",
    }
}

attribute_group! {
    /// Descendant targeted by a `link` or `bookmark`
    ElementPosition {
        element: String => "element",
        position: u32 => "position",
    }
}

attribute_group! {
    ImageAttributes {
        required {
            source: String => "source",
            kind: String => "type",
        }
        height: Tenths => "height",
        width: Tenths => "width",
        halign: LeftCenterRight => "halign",
        valign: ValignImage => "valign",
    }
    embeds {
        position: Position,
    }
}

// ============================================================================
// XLINK
// ============================================================================

/// Simple XLink attributes; `xlink:href` is required
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkAttributes {
    pub href: String,
    pub kind: Option<String>,
    pub role: Option<String>,
    pub title: Option<String>,
    pub show: Option<String>,
    pub actuate: Option<String>,
}

impl LinkAttributes {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }
}

impl AttributeGroup for LinkAttributes {
    fn read(el: &ElementReader<'_, '_>, cx: &mut DecodeContext) -> DecodeResult<Self> {
        Ok(Self {
            href: el.req_attr("xlink:href", cx)?,
            kind: el.attr("xlink:type", cx)?,
            role: el.attr("xlink:role", cx)?,
            title: el.attr("xlink:title", cx)?,
            show: el.attr("xlink:show", cx)?,
            actuate: el.attr("xlink:actuate", cx)?,
        })
    }

    fn write(&self, element: &mut XmlElement) {
        // the namespace is declared where it is used
        element.attr("xmlns:xlink", XLINK_NAMESPACE);
        element.attr("xlink:href", self.href.as_str());
        element.opt_attr("xlink:type", &self.kind);
        element.opt_attr("xlink:role", &self.role);
        element.opt_attr("xlink:title", &self.title);
        element.opt_attr("xlink:show", &self.show);
        element.opt_attr("xlink:actuate", &self.actuate);
    }

    fn is_empty(&self) -> bool {
        false
    }
}
