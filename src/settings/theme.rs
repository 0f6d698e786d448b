//! Theme colour conversion.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("Colour must start with '#': {0:?}")]
    MissingHash(String),
    #[error("Colour must have 3 or 6 hex digits: {0:?}")]
    BadLength(String),
    #[error("Invalid hex digit in colour {0:?}")]
    BadDigit(String),
}

/// Hue in degrees, saturation and lightness in percent, all rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsl {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

/// Rendered as the space-separated triple used by CSS custom properties.
impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}% {}%", self.hue, self.saturation, self.lightness)
    }
}

fn parse_rgb(hex: &str) -> Result<(u8, u8, u8), ColorError> {
    let digits = hex
        .strip_prefix('#')
        .ok_or_else(|| ColorError::MissingHash(hex.to_string()))?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorError::BadDigit(hex.to_string()));
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| ColorError::BadDigit(hex.to_string()));
    match digits.len() {
        3 => {
            let expand = |i: usize| channel(&digits[i..=i].repeat(2));
            Ok((expand(0)?, expand(1)?, expand(2)?))
        }
        6 => Ok((
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        _ => Err(ColorError::BadLength(hex.to_string())),
    }
}

/// Parse `#RRGGBB` or `#RGB` into HSL.
pub fn parse_hex(hex: &str) -> Result<Hsl, ColorError> {
    let (r, g, b) = parse_rgb(hex.trim())?;
    let (r, g, b) = (
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
    );

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (max + min) / 2.0;
    let delta = max - min;

    let (hue, saturation) = if delta == 0.0 {
        (0.0, 0.0)
    } else {
        let saturation = delta / (1.0 - (2.0 * lightness - 1.0).abs());
        let sector = if max == r {
            ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        (sector * 60.0, saturation)
    };

    Ok(Hsl {
        hue: (hue.round() as u16) % 360,
        saturation: (saturation * 100.0).round() as u8,
        lightness: (lightness * 100.0).round() as u8,
    })
}

/// `hex_to_hsl("#32CD32") == "120 61% 50%"`.
pub fn hex_to_hsl(hex: &str) -> Result<String, ColorError> {
    parse_hex(hex).map(|hsl| hsl.to_string())
}
