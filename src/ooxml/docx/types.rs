/// Simple value types used by WordprocessingML attributes.
///
/// Each type owns its own text encoding rules: how it is read from a `w:val`
/// (or similar) attribute and how it is written back.
use crate::ooxml::error::{OoxmlError, Result};
use std::fmt;
use std::str::FromStr;

/// An on/off toggle property such as `<w:b/>` or `<w:i w:val="0"/>`.
///
/// A present element without `w:val` means on.
///
/// # Examples
///
/// ```
/// use docx_delta::ooxml::docx::types::OnOff;
///
/// assert!(OnOff::parse(None).unwrap().is_on());
/// assert!(!OnOff::parse(Some("off")).unwrap().is_on());
/// assert!(OnOff::parse(Some("maybe")).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OnOff(bool);

impl OnOff {
    pub const ON: OnOff = OnOff(true);
    pub const OFF: OnOff = OnOff(false);

    /// Parse the optional `w:val` of an on/off element.
    pub fn parse(val: Option<&str>) -> Result<Self> {
        match val {
            None | Some("1") | Some("true") | Some("on") => Ok(Self(true)),
            Some("0") | Some("false") | Some("off") => Ok(Self(false)),
            Some(other) => Err(OoxmlError::InvalidFormat(format!(
                "invalid on/off value '{}'",
                other
            ))),
        }
    }

    #[inline]
    pub const fn is_on(self) -> bool {
        self.0
    }

    /// Serialize as an element named `tag` (e.g. `w:b`).
    pub fn to_xml(self, tag: &str) -> String {
        if self.0 {
            format!("<{}/>", tag)
        } else {
            format!(r#"<{} w:val="0"/>"#, tag)
        }
    }
}

impl From<bool> for OnOff {
    #[inline]
    fn from(value: bool) -> Self {
        Self(value)
    }
}

/// An 8-digit hexadecimal identifier (`w14:paraId`, `w:rsidR`, ...).
///
/// Always rendered as eight uppercase digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hex(u32);

impl Hex {
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl FromStr for Hex {
    type Err = OoxmlError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || s.len() > 8 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(OoxmlError::InvalidFormat(format!("invalid hex id '{}'", s)));
        }
        u32::from_str_radix(s, 16)
            .map(Self)
            .map_err(|e| OoxmlError::InvalidFormat(format!("invalid hex id '{}': {}", s, e)))
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// A signed decimal `w:val` (`w:ilvl`, `w:numId`, `w:start`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DecimalNumber(pub i64);

impl DecimalNumber {
    /// Parse from attribute bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        atoi_simd::parse::<i64>(bytes).map(Self).map_err(|_| {
            OoxmlError::InvalidFormat(format!(
                "invalid decimal number '{}'",
                String::from_utf8_lossy(bytes)
            ))
        })
    }

    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DecimalNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declares a single-value enumeration with its XML spellings.
///
/// The first spelling listed for a variant is the one written; any listed
/// spelling is accepted when reading.
macro_rules! xml_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => [$primary:literal $(, $alias:literal)*]),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// The XML attribute value of this variant.
            #[inline]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $primary),+
                }
            }
        }

        impl FromStr for $name {
            type Err = OoxmlError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($primary $(| $alias)* => Ok(Self::$variant),)+
                    other => Err(OoxmlError::InvalidFormat(format!(
                        concat!("invalid ", stringify!($name), " value '{}'"),
                        other
                    ))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

xml_enum! {
    /// Underline style of a run (`w:u`).
    Underline {
        Single => ["single"],
        Words => ["words"],
        Double => ["double"],
        Thick => ["thick"],
        Dotted => ["dotted"],
        DottedHeavy => ["dottedHeavy"],
        Dash => ["dash"],
        DashedHeavy => ["dashedHeavy"],
        DashLong => ["dashLong"],
        DotDash => ["dotDash"],
        DotDotDash => ["dotDotDash"],
        Wave => ["wave"],
        WavyHeavy => ["wavyHeavy"],
        WavyDouble => ["wavyDouble"],
        None => ["none"],
    }
}

xml_enum! {
    /// Numbering format of a list level (`w:numFmt`).
    NumberFormat {
        Decimal => ["decimal"],
        Bullet => ["bullet"],
        LowerLetter => ["lowerLetter"],
        UpperLetter => ["upperLetter"],
        LowerRoman => ["lowerRoman"],
        UpperRoman => ["upperRoman"],
        None => ["none"],
    }
}

xml_enum! {
    /// Paragraph alignment (`w:jc`).
    Justification {
        Start => ["start", "left"],
        Center => ["center"],
        End => ["end", "right"],
        Both => ["both"],
        Distribute => ["distribute"],
    }
}

xml_enum! {
    /// The kind of a style definition (`w:style/@w:type`).
    StyleKind {
        Paragraph => ["paragraph"],
        Character => ["character"],
        Table => ["table"],
        Numbering => ["numbering"],
    }
}

xml_enum! {
    /// Page orientation (`w:pgSz/@w:orient`).
    PageOrientation {
        Portrait => ["portrait"],
        Landscape => ["landscape"],
    }
}

impl NumberFormat {
    /// Only `decimal` counts as ordered for list conversion.
    #[inline]
    pub fn is_ordered(self) -> bool {
        matches!(self, Self::Decimal)
    }
}

impl Default for PageOrientation {
    #[inline]
    fn default() -> Self {
        Self::Portrait
    }
}

/// A run color in `RRGGBB` (or short `RGB`) form, uppercase, no `#`.
///
/// ```
/// use docx_delta::ooxml::docx::types::HexColor;
///
/// assert_eq!(HexColor::parse("#ff00aa").unwrap().as_str(), "FF00AA");
/// assert_eq!(HexColor::parse("abc").unwrap().as_str(), "ABC");
/// assert_eq!(HexColor::parse("abc").unwrap().to_rrggbb(), "AABBCC");
/// assert!(HexColor::parse("#12345").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexColor(String);

impl HexColor {
    /// Normalize a color: optional leading `#`, then 3 or 6 hex digits.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if !matches!(digits.len(), 3 | 6) || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(digits.to_ascii_uppercase()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Six-digit `RRGGBB` form; `ABC` becomes `AABBCC`.
    pub fn to_rrggbb(&self) -> String {
        if self.0.len() == 6 {
            return self.0.clone();
        }
        self.0.chars().flat_map(|c| [c, c]).collect()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_off() {
        for on in [None, Some("1"), Some("true"), Some("on")] {
            assert!(OnOff::parse(on).unwrap().is_on());
        }
        for off in ["0", "false", "off"] {
            assert!(!OnOff::parse(Some(off)).unwrap().is_on());
        }
        assert!(OnOff::parse(Some("yes")).is_err());

        assert_eq!(OnOff::ON.to_xml("w:b"), "<w:b/>");
        assert_eq!(OnOff::OFF.to_xml("w:i"), r#"<w:i w:val="0"/>"#);
    }

    #[test]
    fn test_hex() {
        assert_eq!(Hex::new(0x1a2b).to_string(), "00001A2B");
        assert_eq!("1a2b3c4d".parse::<Hex>().unwrap().value(), 0x1A2B_3C4D);
        assert!("zz".parse::<Hex>().is_err());
        assert!("123456789".parse::<Hex>().is_err());
    }

    #[test]
    fn test_decimal_number() {
        assert_eq!(DecimalNumber::parse(b"-3").unwrap().get(), -3);
        assert!(DecimalNumber::parse(b"x").is_err());
    }

    #[test]
    fn test_enums() {
        assert_eq!("left".parse::<Justification>().unwrap(), Justification::Start);
        assert_eq!(Justification::End.as_str(), "end");
        assert_eq!("bullet".parse::<NumberFormat>().unwrap(), NumberFormat::Bullet);
        assert!(NumberFormat::Decimal.is_ordered());
        assert!(!NumberFormat::LowerRoman.is_ordered());
        assert_eq!(Underline::Single.to_string(), "single");
        assert!("sideways".parse::<PageOrientation>().is_err());
        assert_eq!(StyleKind::Character.as_str(), "character");
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(HexColor::parse("FF00aa").unwrap().as_str(), "FF00AA");
        assert!(HexColor::parse("#ggg").is_none());
        assert!(HexColor::parse("").is_none());
    }
}
