//! Hex color resolution.

/// An RGB triple, written into DrawingML `srgbClr` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// The fallback for unresolvable input.
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Uppercase `RRGGBB` form as used in `srgbClr/@val`.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Resolve a `#RRGGBB` or `#RGB` string to an RGB triple.
///
/// Total: malformed input (missing `#`, wrong length, non-hex digits)
/// resolves to black instead of an error, so a bad color degrades the
/// output rather than aborting a run. Shorthand digits are duplicated,
/// `#abc` meaning `#aabbcc`. Surrounding whitespace is tolerated.
pub fn resolve(hex: &str) -> Rgb {
    let trimmed = hex.trim();
    let digits = match trimmed.strip_prefix('#') {
        Some(d) => d,
        None => return Rgb::BLACK,
    };
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Rgb::BLACK;
    }
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Rgb::BLACK,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16);
    match (channel(0), channel(2), channel(4)) {
        (Ok(r), Ok(g), Ok(b)) => Rgb::new(r, g, b),
        _ => Rgb::BLACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_digit_forms() {
        assert_eq!(resolve("#FFFFFF"), Rgb::new(255, 255, 255));
        assert_eq!(resolve("#000000"), Rgb::new(0, 0, 0));
        assert_eq!(resolve("#ABCDEF"), Rgb::new(171, 205, 239));
        assert_eq!(resolve("#abcdef"), Rgb::new(171, 205, 239));
    }

    #[test]
    fn test_shorthand_duplicates_digits() {
        assert_eq!(resolve("#abc"), Rgb::new(170, 187, 204));
        assert_eq!(resolve("#fff"), Rgb::new(255, 255, 255));
        assert_eq!(resolve("#123"), Rgb::new(17, 34, 51));
    }

    #[test]
    fn test_malformed_input_degrades_to_black() {
        assert_eq!(resolve("invalid"), Rgb::BLACK);
        assert_eq!(resolve("#12345"), Rgb::BLACK);
        assert_eq!(resolve("##123456"), Rgb::BLACK);
        assert_eq!(resolve("123456"), Rgb::BLACK);
        assert_eq!(resolve("#GGGGGG"), Rgb::BLACK);
        assert_eq!(resolve(""), Rgb::BLACK);
    }

    #[test]
    fn test_whitespace_tolerated() {
        assert_eq!(resolve("  #FFFFFF \n"), Rgb::new(255, 255, 255));
    }

    #[test]
    fn test_hex_rendering() {
        assert_eq!(Rgb::new(13, 27, 42).hex(), "0D1B2A");
        assert_eq!(Rgb::BLACK.hex(), "000000");
    }
}
