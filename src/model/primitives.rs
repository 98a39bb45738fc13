//! MusicXML simple types
//!
//! Every simple type of the schema gets its own Rust type so that the
//! codec has exactly one place that decides its textual form. Enumerated
//! tokens are matched case-sensitively; numeric domains are stored as
//! read and only checked into warnings.

use crate::codec::{format_decimal, DecodeContext, DecodeError, DecodeErrorKind, DecodeResult, XmlValue};
use serde::{Deserialize, Serialize};

// ============================================================================
// GENERAL ENUMERATIONS
// ============================================================================

xml_enum! {
    /// Literal `yes`/`no`, never `true`/`false`
    YesNo { Yes => "yes", No => "no" }
}

impl YesNo {
    pub fn is_yes(&self) -> bool {
        matches!(self, YesNo::Yes)
    }
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

xml_enum! { AboveBelow { Above => "above", Below => "below" } }
xml_enum! { UpDown { Up => "up", Down => "down" } }
xml_enum! { OverUnder { Over => "over", Under => "under" } }
xml_enum! { TopBottom { Top => "top", Bottom => "bottom" } }
xml_enum! { LeftRight { Left => "left", Right => "right" } }
xml_enum! { LeftCenterRight { Left => "left", Center => "center", Right => "right" } }
xml_enum! { Valign { Top => "top", Middle => "middle", Bottom => "bottom", Baseline => "baseline" } }
xml_enum! { ValignImage { Top => "top", Middle => "middle", Bottom => "bottom" } }
xml_enum! { StartStop { Start => "start", Stop => "stop" } }
xml_enum! { StartStopContinue { Start => "start", Stop => "stop", Continue => "continue" } }
xml_enum! { StartStopSingle { Start => "start", Stop => "stop", Single => "single" } }
xml_enum! { StartStopDiscontinue { Start => "start", Stop => "stop", Discontinue => "discontinue" } }
xml_enum! {
    StartStopChangeContinue { Start => "start", Stop => "stop", Change => "change", Continue => "continue" }
}
xml_enum! {
    /// `let-ring` is only meaningful for `tied`
    TiedType { Start => "start", Stop => "stop", Continue => "continue", LetRing => "let-ring" }
}
xml_enum! { UpDownStopContinue { Up => "up", Down => "down", Stop => "stop", Continue => "continue" } }
xml_enum! { OnOff { On => "on", Off => "off" } }
xml_enum! { RightLeftMiddle { Right => "right", Left => "left", Middle => "middle" } }
xml_enum! { UprightInverted { Upright => "upright", Inverted => "inverted" } }

// ============================================================================
// TEXT AND FORMATTING
// ============================================================================

xml_enum! { FontStyle { Normal => "normal", Italic => "italic" } }
xml_enum! { FontWeight { Normal => "normal", Bold => "bold" } }
xml_enum! {
    CssFontSize {
        XxSmall => "xx-small", XSmall => "x-small", Small => "small", Medium => "medium",
        Large => "large", XLarge => "x-large", XxLarge => "xx-large",
    }
}
xml_enum! {
    EnclosureShape {
        Rectangle => "rectangle", Square => "square", Oval => "oval", Circle => "circle",
        Bracket => "bracket", InvertedBracket => "inverted-bracket", Triangle => "triangle",
        Diamond => "diamond", Pentagon => "pentagon", Hexagon => "hexagon", Heptagon => "heptagon",
        Octagon => "octagon", Nonagon => "nonagon", Decagon => "decagon", None => "none",
    }
}
xml_enum! { TextDirection { Ltr => "ltr", Rtl => "rtl", Lro => "lro", Rlo => "rlo" } }
xml_enum! { LineShape { Straight => "straight", Curved => "curved" } }
xml_enum! { LineType { Solid => "solid", Dashed => "dashed", Dotted => "dotted", Wavy => "wavy" } }
xml_enum! { LineLength { Short => "short", Medium => "medium", Long => "long" } }
xml_enum! { LineEnd { Up => "up", Down => "down", Both => "both", Arrow => "arrow", None => "none" } }
xml_enum! { SymbolSize { Full => "full", Cue => "cue", GraceCue => "grace-cue", Large => "large" } }
xml_enum! { XmlSpace { Default => "default", Preserve => "preserve" } }

// ============================================================================
// ORNAMENT AND PLAYBACK
// ============================================================================

xml_enum! { StartNote { Upper => "upper", Main => "main", Below => "below" } }
xml_enum! { TrillStep { Whole => "whole", Half => "half", Unison => "unison" } }
xml_enum! { TwoNoteTurn { Whole => "whole", Half => "half", None => "none" } }
xml_enum! {
    TremoloType { Start => "start", Stop => "stop", Single => "single", Unmeasured => "unmeasured" }
}
xml_enum! {
    Mute {
        On => "on", Off => "off", Straight => "straight", Cup => "cup",
        HarmonNoStem => "harmon-no-stem", HarmonStem => "harmon-stem", Bucket => "bucket",
        Plunger => "plunger", Hat => "hat", Solotone => "solotone", Practice => "practice",
        StopMute => "stop-mute", StopHand => "stop-hand", Echo => "echo", Palm => "palm",
    }
}
xml_enum! {
    SemiPitched {
        High => "high", MediumHigh => "medium-high", Medium => "medium",
        MediumLow => "medium-low", Low => "low", VeryLow => "very-low",
    }
}
xml_enum! {
    FermataShape {
        Normal => "normal", Angled => "angled", Square => "square",
        DoubleAngled => "double-angled", DoubleSquare => "double-square",
        DoubleDot => "double-dot", HalfCurve => "half-curve", Curlew => "curlew", Empty => "",
    }
}
xml_enum! {
    BreathMarkValue { Empty => "", Comma => "comma", Tick => "tick", Upbow => "upbow", Salzedo => "salzedo" }
}
xml_enum! {
    CaesuraValue {
        Normal => "normal", Thick => "thick", Short => "short", Curved => "curved",
        Single => "single", Empty => "",
    }
}

// ============================================================================
// ATTRIBUTES (CLEF, KEY, TIME, STAFF)
// ============================================================================

xml_enum! {
    ClefSign {
        G => "G", F => "F", C => "C", Percussion => "percussion", Tab => "TAB",
        Jianpu => "jianpu", None => "none",
    }
}
xml_enum! {
    Mode {
        Major => "major", Minor => "minor", Dorian => "dorian", Phrygian => "phrygian",
        Lydian => "lydian", Mixolydian => "mixolydian", Aeolian => "aeolian",
        Ionian => "ionian", Locrian => "locrian", None => "none",
    }
}
xml_enum! { CancelLocation { Left => "left", Right => "right", BeforeBarline => "before-barline" } }
xml_enum! { ShowFrets { Numbers => "numbers", Letters => "letters" } }
xml_enum! {
    StaffType {
        Ossia => "ossia", Editorial => "editorial", Cue => "cue", Alternate => "alternate",
        Regular => "regular",
    }
}
xml_enum! {
    TimeRelation {
        Parentheses => "parentheses", Bracket => "bracket", Equals => "equals",
        Slash => "slash", Space => "space", Hyphen => "hyphen",
    }
}
xml_enum! {
    TimeSeparator {
        None => "none", Horizontal => "horizontal", Diagonal => "diagonal",
        Vertical => "vertical", Adjacent => "adjacent",
    }
}
xml_enum! {
    TimeSymbol {
        Common => "common", Cut => "cut", SingleNumber => "single-number", Note => "note",
        DottedNote => "dotted-note", Normal => "normal",
    }
}
xml_enum! {
    PartSymbolValue { None => "none", Brace => "brace", Line => "line", Bracket => "bracket", Square => "square" }
}

// ============================================================================
// BARLINE
// ============================================================================

xml_enum! { BackwardForward { Backward => "backward", Forward => "forward" } }
xml_enum! {
    BarStyle {
        Regular => "regular", Dotted => "dotted", Dashed => "dashed", Heavy => "heavy",
        LightLight => "light-light", LightHeavy => "light-heavy", HeavyLight => "heavy-light",
        HeavyHeavy => "heavy-heavy", Tick => "tick", Short => "short", None => "none",
    }
}
xml_enum! {
    Winged {
        None => "none", Straight => "straight", Curved => "curved",
        DoubleStraight => "double-straight", DoubleCurved => "double-curved",
    }
}

// ============================================================================
// DIRECTION
// ============================================================================

xml_enum! { WedgeType { Crescendo => "crescendo", Diminuendo => "diminuendo", Stop => "stop", Continue => "continue" } }
xml_enum! {
    PedalType {
        Start => "start", Stop => "stop", Sostenuto => "sostenuto", Change => "change",
        Continue => "continue", Discontinue => "discontinue", Resume => "resume",
    }
}
xml_enum! {
    PrincipalVoiceSymbol {
        Hauptstimme => "Hauptstimme", Nebenstimme => "Nebenstimme", Plain => "plain", None => "none",
    }
}
xml_enum! { StaffDivideSymbol { Down => "down", Up => "up", UpDown => "up-down" } }
xml_enum! { SystemRelation { OnlyTop => "only-top", AlsoTop => "also-top", None => "none" } }
xml_enum! {
    SystemRelationNumber {
        OnlyTop => "only-top", OnlyBottom => "only-bottom", AlsoTop => "also-top",
        AlsoBottom => "also-bottom", None => "none",
    }
}
xml_enum! {
    MeasureNumberingValue { None => "none", Measure => "measure", System => "system" }
}
xml_enum! {
    TipDirection {
        Up => "up", Down => "down", Left => "left", Right => "right",
        Northwest => "northwest", Northeast => "northeast", Southeast => "southeast",
        Southwest => "southwest",
    }
}
xml_enum! {
    SyncType {
        None => "none", Tempo => "tempo", MostlyTempo => "mostly-tempo",
        MostlyEvent => "mostly-event", Event => "event", AlwaysEvent => "always-event",
    }
}

// Percussion pictogram vocabularies

xml_enum! {
    BeaterValue {
        Bow => "bow", ChimeHammer => "chime hammer", Coin => "coin", DrumStick => "drum stick",
        Finger => "finger", Fingernail => "fingernail", Fist => "fist",
        GuiroScraper => "guiro scraper", Hammer => "hammer", Hand => "hand",
        JazzStick => "jazz stick", KnittingNeedle => "knitting needle",
        MetalHammer => "metal hammer", SlideBrushOnGong => "slide brush on gong",
        SnareStick => "snare stick", SpoonMallet => "spoon mallet", Superball => "superball",
        TriangleBeater => "triangle beater", TriangleBeaterPlain => "triangle beater plain",
        WireBrush => "wire brush",
    }
}
xml_enum! {
    Effect {
        Anvil => "anvil", AutoHorn => "auto horn", BirdWhistle => "bird whistle",
        Cannon => "cannon", DuckCall => "duck call", GunShot => "gun shot",
        KlaxonHorn => "klaxon horn", LionsRoar => "lions roar", LotusFlute => "lotus flute",
        Megaphone => "megaphone", PoliceWhistle => "police whistle", Siren => "siren",
        SlideWhistle => "slide whistle", ThunderSheet => "thunder sheet",
        WindMachine => "wind machine", WindWhistle => "wind whistle",
    }
}
xml_enum! {
    GlassValue { GlassHarmonica => "glass harmonica", GlassHarp => "glass harp", WindChimes => "wind chimes" }
}
xml_enum! {
    Membrane {
        BassDrum => "bass drum", BassDrumOnSide => "bass drum on side", Bongos => "bongos",
        ChineseTomtom => "Chinese tomtom", CongaDrum => "conga drum", Cuica => "cuica",
        GobletDrum => "goblet drum", IndoAmericanTomtom => "Indo-American tomtom",
        JapaneseTomtom => "Japanese tomtom", MilitaryDrum => "military drum",
        SnareDrum => "snare drum", SnareDrumSnaresOff => "snare drum snares off",
        Tabla => "tabla", Tambourine => "tambourine", TenorDrum => "tenor drum",
        Timbales => "timbales", Tomtom => "tomtom",
    }
}
xml_enum! {
    Metal {
        Agogo => "agogo", Almglocken => "almglocken", Bell => "bell", BellPlate => "bell plate",
        BellTree => "bell tree", BrakeDrum => "brake drum", Cencerro => "cencerro",
        ChainRattle => "chain rattle", ChineseCymbal => "Chinese cymbal", Cowbell => "cowbell",
        CrashCymbals => "crash cymbals", Crotale => "crotale", CymbalTongs => "cymbal tongs",
        DomedGong => "domed gong", FingerCymbals => "finger cymbals", Flexatone => "flexatone",
        Gong => "gong", HiHat => "hi-hat", HighHatCymbals => "high-hat cymbals",
        Handbell => "handbell", JawHarp => "jaw harp", JingleBells => "jingle bells",
        MusicalSaw => "musical saw", ShellBells => "shell bells", Sistrum => "sistrum",
        SizzleCymbal => "sizzle cymbal", SleighBells => "sleigh bells",
        SuspendedCymbal => "suspended cymbal", TamTam => "tam tam",
        TamTamWithBeater => "tam tam with beater", Triangle => "triangle",
        VietnameseHat => "Vietnamese hat",
    }
}
xml_enum! {
    PitchedValue {
        Celesta => "celesta", Chimes => "chimes", Glockenspiel => "glockenspiel",
        Lithophone => "lithophone", Mallet => "mallet", Marimba => "marimba",
        SteelDrums => "steel drums", Tubaphone => "tubaphone", TubularChimes => "tubular chimes",
        Vibraphone => "vibraphone", Xylophone => "xylophone",
    }
}
xml_enum! {
    StickLocation { Center => "center", Rim => "rim", CymbalBell => "cymbal bell", CymbalEdge => "cymbal edge" }
}
xml_enum! {
    StickMaterial { Soft => "soft", Medium => "medium", Hard => "hard", Shaded => "shaded", X => "x" }
}
xml_enum! {
    StickType {
        BassDrum => "bass drum", DoubleBassDrum => "double bass drum", Glockenspiel => "glockenspiel",
        Gum => "gum", Hammer => "hammer", Superball => "superball", Timpani => "timpani",
        Wound => "wound", Xylophone => "xylophone", Yarn => "yarn",
    }
}
xml_enum! {
    Wood {
        BambooScraper => "bamboo scraper", BoardClapper => "board clapper", Cabasa => "cabasa",
        Castanets => "castanets", CastanetsWithHandle => "castanets with handle", Claves => "claves",
        FootballRattle => "football rattle", Guiro => "guiro", LogDrum => "log drum",
        Maraca => "maraca", Maracas => "maracas", Quijada => "quijada", Rainstick => "rainstick",
        Ratchet => "ratchet", RecoReco => "reco-reco", SandpaperBlocks => "sandpaper blocks",
        SlitDrum => "slit drum", TempleBlock => "temple block", Vibraslap => "vibraslap",
        Whip => "whip", WoodBlock => "wood block",
    }
}

// ============================================================================
// HARMONY
// ============================================================================

xml_enum! {
    DegreeSymbolValue {
        Major => "major", Minor => "minor", Augmented => "augmented",
        Diminished => "diminished", HalfDiminished => "half-diminished",
    }
}
xml_enum! { DegreeTypeValue { Add => "add", Alter => "alter", Subtract => "subtract" } }
xml_enum! { HarmonyArrangement { Vertical => "vertical", Horizontal => "horizontal", Diagonal => "diagonal" } }
xml_enum! { HarmonyType { Explicit => "explicit", Implied => "implied", Alternate => "alternate" } }
xml_enum! {
    KindValue {
        Major => "major", Minor => "minor", Augmented => "augmented", Diminished => "diminished",
        Dominant => "dominant", MajorSeventh => "major-seventh", MinorSeventh => "minor-seventh",
        DiminishedSeventh => "diminished-seventh", AugmentedSeventh => "augmented-seventh",
        HalfDiminished => "half-diminished", MajorMinor => "major-minor",
        MajorSixth => "major-sixth", MinorSixth => "minor-sixth",
        DominantNinth => "dominant-ninth", MajorNinth => "major-ninth", MinorNinth => "minor-ninth",
        Dominant11th => "dominant-11th", Major11th => "major-11th", Minor11th => "minor-11th",
        Dominant13th => "dominant-13th", Major13th => "major-13th", Minor13th => "minor-13th",
        SuspendedSecond => "suspended-second", SuspendedFourth => "suspended-fourth",
        Neapolitan => "Neapolitan", Italian => "Italian", French => "French", German => "German",
        Pedal => "pedal", Power => "power", Tristan => "Tristan", Other => "other", None => "none",
    }
}

// ============================================================================
// NOTE
// ============================================================================

xml_enum! {
    Step { A => "A", B => "B", C => "C", D => "D", E => "E", F => "F", G => "G" }
}
xml_enum! {
    NoteTypeValue {
        N1024th => "1024th", N512th => "512th", N256th => "256th", N128th => "128th",
        N64th => "64th", N32nd => "32nd", N16th => "16th", Eighth => "eighth",
        Quarter => "quarter", Half => "half", Whole => "whole", Breve => "breve",
        Long => "long", Maxima => "maxima",
    }
}
xml_enum! {
    AccidentalValue {
        Sharp => "sharp", Natural => "natural", Flat => "flat", DoubleSharp => "double-sharp",
        SharpSharp => "sharp-sharp", FlatFlat => "flat-flat", NaturalSharp => "natural-sharp",
        NaturalFlat => "natural-flat", QuarterFlat => "quarter-flat", QuarterSharp => "quarter-sharp",
        ThreeQuartersFlat => "three-quarters-flat", ThreeQuartersSharp => "three-quarters-sharp",
        SharpDown => "sharp-down", SharpUp => "sharp-up", NaturalDown => "natural-down",
        NaturalUp => "natural-up", FlatDown => "flat-down", FlatUp => "flat-up",
        DoubleSharpDown => "double-sharp-down", DoubleSharpUp => "double-sharp-up",
        FlatFlatDown => "flat-flat-down", FlatFlatUp => "flat-flat-up", ArrowDown => "arrow-down",
        ArrowUp => "arrow-up", TripleSharp => "triple-sharp", TripleFlat => "triple-flat",
        SlashQuarterSharp => "slash-quarter-sharp", SlashSharp => "slash-sharp",
        SlashFlat => "slash-flat", DoubleSlashFlat => "double-slash-flat", Sharp1 => "sharp-1",
        Sharp2 => "sharp-2", Sharp3 => "sharp-3", Sharp5 => "sharp-5", Flat1 => "flat-1",
        Flat2 => "flat-2", Flat3 => "flat-3", Flat4 => "flat-4", Sori => "sori", Koron => "koron",
        Other => "other",
    }
}
xml_enum! {
    BeamValue {
        Begin => "begin", Continue => "continue", End => "end",
        ForwardHook => "forward hook", BackwardHook => "backward hook",
    }
}
xml_enum! { Fan { Accel => "accel", Rit => "rit", None => "none" } }
xml_enum! { StemValue { Down => "down", Up => "up", Double => "double", None => "none" } }
xml_enum! {
    NoteheadValue {
        Slash => "slash", Triangle => "triangle", Diamond => "diamond", Square => "square",
        Cross => "cross", X => "x", CircleX => "circle-x", InvertedTriangle => "inverted triangle",
        ArrowDown => "arrow down", ArrowUp => "arrow up", Circled => "circled", Slashed => "slashed",
        BackSlashed => "back slashed", Normal => "normal", Cluster => "cluster",
        CircleDot => "circle dot", LeftTriangle => "left triangle", Rectangle => "rectangle",
        None => "none", Do => "do", Re => "re", Mi => "mi", Fa => "fa", FaUp => "fa up",
        So => "so", La => "la", Ti => "ti", Other => "other",
    }
}
xml_enum! { Syllabic { Single => "single", Begin => "begin", End => "end", Middle => "middle" } }
xml_enum! { ShowTuplet { Actual => "actual", Both => "both", None => "none" } }
xml_enum! { NoteSizeType { Cue => "cue", Grace => "grace", GraceCue => "grace-cue", Large => "large" } }

// Technical marks

xml_enum! {
    ArrowDirection {
        Left => "left", Up => "up", Right => "right", Down => "down", Northwest => "northwest",
        Northeast => "northeast", Southeast => "southeast", Southwest => "southwest",
        LeftRight => "left right", UpDown => "up down",
        NorthwestSoutheast => "northwest southeast", NortheastSouthwest => "northeast southwest",
        Other => "other",
    }
}
xml_enum! {
    ArrowStyle {
        Single => "single", Double => "double", Filled => "filled", Hollow => "hollow",
        Paired => "paired", Combined => "combined", Other => "other",
    }
}
xml_enum! { BendShape { Angled => "angled", Curved => "curved" } }
xml_enum! { CircularArrow { Clockwise => "clockwise", Anticlockwise => "anticlockwise" } }
xml_enum! {
    HandbellValue {
        Belltree => "belltree", Damp => "damp", Echo => "echo", Gyro => "gyro",
        HandMartellato => "hand martellato", MalletLift => "mallet lift",
        MalletTable => "mallet table", Martellato => "martellato",
        MartellatoLift => "martellato lift", MutedMartellato => "muted martellato",
        PluckLift => "pluck lift", Swing => "swing",
    }
}
xml_enum! { HoleClosedValue { Yes => "yes", No => "no", Half => "half" } }
xml_enum! { HoleClosedLocation { Right => "right", Bottom => "bottom", Left => "left", Top => "top" } }
xml_enum! { HarmonClosedValue { Yes => "yes", No => "no", Half => "half" } }
xml_enum! { HarmonClosedLocation { Right => "right", Bottom => "bottom", Left => "left", Top => "top" } }
xml_enum! { TapHand { Left => "left", Right => "right" } }

// ============================================================================
// PART LIST AND LAYOUT
// ============================================================================

xml_enum! { GroupBarlineValue { Yes => "yes", No => "no", Mensurstrich => "Mensurstrich" } }
xml_enum! {
    GroupSymbolValue { None => "none", Brace => "brace", Line => "line", Bracket => "bracket", Square => "square" }
}
xml_enum! { MarginType { Odd => "odd", Even => "even", Both => "both" } }

// ============================================================================
// NUMERIC DOMAINS
// ============================================================================

xml_number! {
    /// Tenths of interline staff space, the unit of all layout positions
    Tenths(f64)
}
xml_number! { Millimeters(f64) }
xml_number! {
    /// Duration in the measure's `divisions` per quarter note
    Divisions(f64)
}
xml_number! { PositiveDivisions(f64) in [f64::MIN_POSITIVE, f64::INFINITY] }
xml_number! { Percent(f64) in [0.0, 100.0] }
xml_number! { RotationDegrees(f64) in [-180.0, 180.0] }
xml_number! { NonNegativeDecimal(f64) in [0.0, f64::INFINITY] }
xml_number! { PositiveDecimal(f64) in [f64::MIN_POSITIVE, f64::INFINITY] }
xml_number! { Semitones(f64) }
xml_number! { TrillBeats(f64) in [2.0, f64::INFINITY] }
xml_number! {
    /// Circle-of-fifths position; not range checked
    Fifths(i32)
}
xml_number! { Octave(i32) in [0, 9] }
xml_number! { Midi16(u32) in [1, 16] }
xml_number! { Midi128(u32) in [1, 128] }
xml_number! { Midi16384(u32) in [1, 16384] }
xml_number! { BeamLevel(u32) in [1, 8] }
xml_number! {
    /// Distinguishes overlapping spanners of the same kind
    NumberLevel(u32) in [1, 16]
}
xml_number! { NumberOfLines(u32) in [0, 3] }
xml_number! { StaffNumber(u32) in [1, u32::MAX] }
xml_number! { StaffLine(i32) }
xml_number! { StringNumber(u32) in [1, u32::MAX] }
xml_number! { TremoloMarks(u32) in [0, 8] }
xml_number! { AccordionMiddle(u32) in [1, 3] }
xml_number! { Milliseconds(u32) }

impl NumberLevel {
    /// Value assumed when the `number` attribute is absent
    pub const DEFAULT: NumberLevel = NumberLevel(1);
}

// ============================================================================
// STRING DOMAINS
// ============================================================================

xml_string! {
    /// `#RRGGBB` or `#AARRGGBB`
    Color,
    /// Comma-separated font family list
    CommaSeparatedText,
    SmuflGlyphName,
    /// Measure number; not guaranteed numeric
    MeasureText,
    /// Comma-separated list of ending numbers, or empty
    EndingNumber,
    /// Comma-separated list of pass numbers
    TimeOnly,
    /// `yyyy-mm-dd`
    YyyyMmDd,
    /// Language tag for `xml:lang`
    XmlLang,
}

// ============================================================================
// UNIONS
// ============================================================================

fn union_error(type_name: &'static str, text: &str) -> DecodeError {
    DecodeError::new(DecodeErrorKind::UnparseableUnion {
        type_name,
        value: text.to_string(),
    })
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `yes`, `no`, or a percentage; the enum form is tried first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum YesNoNumber {
    YesNo(YesNo),
    Number(f64),
}

impl XmlValue for YesNoNumber {
    fn parse_value(text: &str, _cx: &mut DecodeContext) -> DecodeResult<Self> {
        let trimmed = text.trim();
        if let Some(flag) = YesNo::from_literal(trimmed) {
            return Ok(YesNoNumber::YesNo(flag));
        }
        parse_number(trimmed)
            .map(YesNoNumber::Number)
            .ok_or_else(|| union_error("yes-no-number", trimmed))
    }

    fn to_value(&self) -> String {
        match self {
            YesNoNumber::YesNo(flag) => flag.as_str().to_string(),
            YesNoNumber::Number(n) => format_decimal(*n),
        }
    }
}

/// `normal` or a decimal (letter-spacing, line-height)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NumberOrNormal {
    Normal,
    Number(f64),
}

impl XmlValue for NumberOrNormal {
    fn parse_value(text: &str, _cx: &mut DecodeContext) -> DecodeResult<Self> {
        let trimmed = text.trim();
        if trimmed == "normal" {
            return Ok(NumberOrNormal::Normal);
        }
        parse_number(trimmed)
            .map(NumberOrNormal::Number)
            .ok_or_else(|| union_error("number-or-normal", trimmed))
    }

    fn to_value(&self) -> String {
        match self {
            NumberOrNormal::Normal => "normal".to_string(),
            NumberOrNormal::Number(n) => format_decimal(*n),
        }
    }
}

/// CSS size keyword or point size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FontSize {
    Css(CssFontSize),
    Points(f64),
}

impl XmlValue for FontSize {
    fn parse_value(text: &str, _cx: &mut DecodeContext) -> DecodeResult<Self> {
        let trimmed = text.trim();
        if let Some(size) = CssFontSize::from_literal(trimmed) {
            return Ok(FontSize::Css(size));
        }
        parse_number(trimmed)
            .map(FontSize::Points)
            .ok_or_else(|| union_error("font-size", trimmed))
    }

    fn to_value(&self) -> String {
        match self {
            FontSize::Css(size) => size.as_str().to_string(),
            FontSize::Points(points) => format_decimal(*points),
        }
    }
}

/// Positive integer or empty text (`ensemble`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositiveIntegerOrEmpty {
    Integer(u32),
    Empty,
}

impl XmlValue for PositiveIntegerOrEmpty {
    fn parse_value(text: &str, _cx: &mut DecodeContext) -> DecodeResult<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(PositiveIntegerOrEmpty::Empty);
        }
        trimmed
            .parse::<u32>()
            .map(PositiveIntegerOrEmpty::Integer)
            .map_err(|_| union_error("positive-integer-or-empty", trimmed))
    }

    fn to_value(&self) -> String {
        match self {
            PositiveIntegerOrEmpty::Integer(n) => n.to_string(),
            PositiveIntegerOrEmpty::Empty => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{DecodeOptions, EnumPolicy};

    #[test]
    fn test_enum_literals_round_trip() {
        let mut cx = DecodeContext::new(DecodeOptions::strict());
        for literal in ["G", "F", "C", "percussion", "TAB", "jianpu", "none"] {
            let sign = ClefSign::parse_value(literal, &mut cx).expect("known clef sign");
            assert_eq!(sign.to_value(), literal);
        }
        assert_eq!(BeamValue::from_literal("backward hook"), Some(BeamValue::BackwardHook));
    }

    #[test]
    fn test_enum_match_is_case_sensitive() {
        assert_eq!(ClefSign::from_literal("g"), None);
        assert_eq!(YesNo::from_literal("Yes"), None);
    }

    #[test]
    fn test_lenient_enum_keeps_raw_literal() {
        let mut cx = DecodeContext::default();
        assert_eq!(cx.options().enum_policy, EnumPolicy::Lenient);

        let value = StartStop::parse_value("begin", &mut cx).expect("lenient mode accepts");
        assert_eq!(value, StartStop::Unrecognized("begin".to_string()));
        assert_eq!(value.to_value(), "begin");
        assert_eq!(cx.warnings().len(), 1);
    }

    #[test]
    fn test_empty_literal_variant() {
        let mut cx = DecodeContext::new(DecodeOptions::strict());
        let mark = BreathMarkValue::parse_value("", &mut cx).expect("empty breath mark");
        assert_eq!(mark, BreathMarkValue::Empty);
    }

    #[test]
    fn test_union_prefers_enum_form() {
        let mut cx = DecodeContext::default();
        assert_eq!(
            YesNoNumber::parse_value("yes", &mut cx).expect("yes parses"),
            YesNoNumber::YesNo(YesNo::Yes)
        );
        assert_eq!(
            YesNoNumber::parse_value("50", &mut cx).expect("number parses"),
            YesNoNumber::Number(50.0)
        );

        let err = YesNoNumber::parse_value("maybe", &mut cx).expect_err("neither form");
        assert!(matches!(err.kind(), DecodeErrorKind::UnparseableUnion { .. }));
    }

    #[test]
    fn test_font_size_forms() {
        let mut cx = DecodeContext::default();
        assert_eq!(
            FontSize::parse_value("x-large", &mut cx).expect("css size"),
            FontSize::Css(CssFontSize::XLarge)
        );
        assert_eq!(FontSize::parse_value("10.5", &mut cx).expect("points"), FontSize::Points(10.5));
    }

    #[test]
    fn test_out_of_range_number_is_a_warning() {
        let mut cx = DecodeContext::default();
        let percent = Percent::parse_value("150", &mut cx).expect("stored as read");
        assert_eq!(percent.value(), 150.0);
        assert_eq!(percent.to_value(), "150");
        assert_eq!(cx.warnings().len(), 1);

        let mut quiet = DecodeContext::new(DecodeOptions {
            check_ranges: false,
            ..DecodeOptions::default()
        });
        Percent::parse_value("150", &mut quiet).expect("stored as read");
        assert!(quiet.warnings().is_empty());
    }

    #[test]
    fn test_invalid_number_names_type() {
        let mut cx = DecodeContext::default();
        let err = Tenths::parse_value("wide", &mut cx).expect_err("not a number");
        assert_eq!(
            err.kind(),
            &DecodeErrorKind::InvalidValue {
                type_name: "Tenths",
                value: "wide".to_string()
            }
        );
    }
}
