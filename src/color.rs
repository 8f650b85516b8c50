//! Color parsing and conversion helpers
//!
//! Colors travel through the editor as `image::Rgba<u8>`. Settings carry a
//! hex string plus a separate 0.0-1.0 opacity, which [`with_opacity`] folds
//! into the alpha channel.
//!
//! Supported hex forms: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.

use image::Rgba;
use thiserror::Error;

/// Fully transparent black, the initial value of every buffer pixel.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Input string doesn't start with '#'
    #[error("color must start with '#'")]
    MissingHash,
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// Parse a hex color string into an RGBA color.
///
/// # Examples
///
/// ```
/// use pixedit::color::parse_color;
///
/// let red = parse_color("#F00").unwrap();
/// assert_eq!(red, image::Rgba([255, 0, 0, 255]));
///
/// let half = parse_color("#00ff0080").unwrap();
/// assert_eq!(half, image::Rgba([0, 255, 0, 128]));
/// ```
///
/// # Errors
///
/// Returns `ColorError` if the input is empty, lacks the leading `#`, has a
/// bad length or contains non-hex characters.
pub fn parse_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    if s.is_empty() {
        return Err(ColorError::Empty);
    }
    let Some(hex) = s.strip_prefix('#') else {
        return Err(ColorError::MissingHash);
    };

    let digits = hex.chars().map(parse_hex_digit).collect::<Result<Vec<u8>, _>>()?;

    match digits.as_slice() {
        // #RGB -> #RRGGBB (doubled digits)
        [r, g, b] => Ok(Rgba([r * 17, g * 17, b * 17, 255])),
        [r, g, b, a] => Ok(Rgba([r * 17, g * 17, b * 17, a * 17])),
        [r1, r0, g1, g0, b1, b0] => Ok(Rgba([r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0, 255])),
        [r1, r0, g1, g0, b1, b0, a1, a0] => {
            Ok(Rgba([r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0, a1 * 16 + a0]))
        }
        _ => Err(ColorError::InvalidLength(digits.len())),
    }
}

/// Parse a hex color and replace its alpha with `opacity` (0.0-1.0).
///
/// This is how the settings surface turns "primary color + opacity" into a
/// paint color.
pub fn parse_color_with_opacity(s: &str, opacity: f32) -> Result<Rgba<u8>, ColorError> {
    parse_color(s).map(|c| with_opacity(c, opacity))
}

/// Replace the alpha channel of `color` with `opacity` scaled to 0-255.
pub fn with_opacity(color: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], opacity_to_alpha(opacity)])
}

/// Convert a 0.0-1.0 opacity into an alpha byte, rounding to nearest.
pub fn opacity_to_alpha(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Format a color as `#rrggbb`, dropping alpha.
pub fn to_hex(color: Rgba<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

/// Parse a single hex digit (0-9, A-F, a-f) to u8 (0-15)
fn parse_hex_digit(c: char) -> Result<u8, ColorError> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'a'..='f' => Ok(c as u8 - b'a' + 10),
        'A'..='F' => Ok(c as u8 - b'A' + 10),
        _ => Err(ColorError::InvalidHex(c)),
    }
}
