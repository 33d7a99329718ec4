use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::str::FromStr;

/// An RGBA color with every channel in the `[0, 1]` range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Rgba {
    pub(crate) red: f64,
    pub(crate) green: f64,
    pub(crate) blue: f64,
    pub(crate) alpha: f64,
}

impl Rgba {
    pub(crate) const BLACK: Rgba = Rgba::opaque(0.0, 0.0, 0.0);

    pub(crate) const fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self { red, green, blue, alpha }
    }

    pub(crate) const fn opaque(red: f64, green: f64, blue: f64) -> Self {
        Self::new(red, green, blue, 1.0)
    }

    /// Build a color out of 8 bit channels.
    pub(crate) fn from_rgba8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        let channel = |value: u8| value as f64 / 255.0;
        Self::new(channel(red), channel(green), channel(blue), channel(alpha))
    }

    /// Linearly interpolate every channel towards `to`.
    ///
    /// A `fraction` of 0 yields `self` and a fraction of 1 yields `to`.
    pub(crate) fn interpolate(&self, to: &Rgba, fraction: f64) -> Rgba {
        let mix = |from: f64, to: f64| from + (to - from) * fraction;
        Rgba::new(
            mix(self.red, to.red),
            mix(self.green, to.green),
            mix(self.blue, to.blue),
            mix(self.alpha, to.alpha),
        )
    }

    /// Composite this color on top of `background`, producing an opaque color.
    ///
    /// The background is flattened over black first.
    pub(crate) fn over(&self, background: &Rgba) -> Rgba {
        let base = background.flatten();
        let alpha = self.alpha.clamp(0.0, 1.0);
        let blend = |top: f64, bottom: f64| top * alpha + bottom * (1.0 - alpha);
        Rgba::opaque(blend(self.red, base.red), blend(self.green, base.green), blend(self.blue, base.blue))
    }

    fn flatten(&self) -> Rgba {
        let alpha = self.alpha.clamp(0.0, 1.0);
        Rgba::opaque(self.red * alpha, self.green * alpha, self.blue * alpha)
    }

    pub(crate) fn to_rgba8(self) -> [u8; 4] {
        let channel = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.red), channel(self.green), channel(self.blue), channel(self.alpha)]
    }
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let digits = input.strip_prefix('#').unwrap_or(input);
        let bytes = hex::decode(digits).map_err(|e| ColorParseError::InvalidHex(input.to_string(), e))?;
        match bytes.as_slice() {
            [r, g, b] => Ok(Self::from_rgba8(*r, *g, *b, 255)),
            [r, g, b, a] => Ok(Self::from_rgba8(*r, *g, *b, *a)),
            _ => Err(ColorParseError::InvalidLength(input.to_string())),
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_rgba8();
        if bytes[3] == 255 {
            write!(f, "#{}", hex::encode(&bytes[..3]))
        } else {
            write!(f, "#{}", hex::encode(bytes))
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let input = String::deserialize(deserializer)?;
        input.parse().map_err(de::Error::custom)
    }
}

#[cfg(feature = "json-schema")]
impl schemars::JsonSchema for Rgba {
    fn schema_name() -> String {
        "Color".into()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(generator)
    }
}

/// Errors that can occur when parsing a hex color
#[derive(thiserror::Error, Debug)]
pub enum ColorParseError {
    #[error("invalid hex color '{0}': {1}")]
    InvalidHex(String, hex::FromHexError),

    #[error("color '{0}' must have the form #RRGGBB or #RRGGBBAA")]
    InvalidLength(String),
}

/// Colors the settings panel cycles through.
pub(crate) const PALETTE: &[Rgba] = &[
    Rgba::opaque(1.0, 0.0, 0.0),
    Rgba::opaque(1.0, 0.5, 0.0),
    Rgba::opaque(1.0, 0.85, 0.2),
    Rgba::opaque(0.2, 0.8, 0.4),
    Rgba::opaque(0.0, 0.6, 0.6),
    Rgba::opaque(0.0, 0.0, 1.0),
    Rgba::opaque(0.45, 0.3, 0.85),
    Rgba::opaque(1.0, 1.0, 1.0),
    Rgba::opaque(0.1, 0.1, 0.12),
    Rgba::BLACK,
];

/// Find the palette entry following `current`, or the first one if `current` isn't part of it.
pub(crate) fn palette_step(current: &Rgba, forward: bool) -> Rgba {
    let position = PALETTE.iter().position(|color| color.to_rgba8() == current.to_rgba8());
    let index = match (position, forward) {
        (None, _) => 0,
        (Some(index), true) => (index + 1) % PALETTE.len(),
        (Some(0), false) => PALETTE.len() - 1,
        (Some(index), false) => index - 1,
    };
    PALETTE[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::rgb("#ff0000", Rgba::opaque(1.0, 0.0, 0.0))]
    #[case::no_hash("0000ff", Rgba::opaque(0.0, 0.0, 1.0))]
    #[case::rgba("#00000000", Rgba::new(0.0, 0.0, 0.0, 0.0))]
    fn parse_color(#[case] input: &str, #[case] expected: Rgba) {
        let color: Rgba = input.parse().expect("parse failed");
        assert_eq!(color, expected);
    }

    #[rstest]
    #[case::bad_digits("#zzzzzz")]
    #[case::too_short("#ffff")]
    #[case::too_long("#ffffffffff")]
    fn parse_invalid_color(#[case] input: &str) {
        assert!(input.parse::<Rgba>().is_err());
    }

    #[test]
    fn display_omits_opaque_alpha() {
        assert_eq!(Rgba::opaque(1.0, 0.0, 0.0).to_string(), "#ff0000");
        assert_eq!(Rgba::from_rgba8(0, 0, 255, 128).to_string(), "#0000ff80");
    }

    #[test]
    fn interpolate_endpoints_and_midpoint() {
        let red = Rgba::opaque(1.0, 0.0, 0.0);
        let blue = Rgba::opaque(0.0, 0.0, 1.0);
        assert_eq!(red.interpolate(&blue, 0.0), red);
        assert_eq!(red.interpolate(&blue, 1.0), blue);
        assert_eq!(red.interpolate(&blue, 0.5), Rgba::opaque(0.5, 0.0, 0.5));
    }

    #[test]
    fn translucent_color_over_background() {
        let half_white = Rgba::new(1.0, 1.0, 1.0, 0.5);
        let blended = half_white.over(&Rgba::BLACK);
        assert_eq!(blended, Rgba::opaque(0.5, 0.5, 0.5));
    }

    #[test]
    fn palette_wraps_around() {
        let last = *PALETTE.last().unwrap();
        assert_eq!(palette_step(&last, true), PALETTE[0]);
        assert_eq!(palette_step(&PALETTE[0], false), last);
        assert_eq!(palette_step(&Rgba::new(0.3, 0.3, 0.3, 0.3), true), PALETTE[0]);
    }
}
