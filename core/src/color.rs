use std::{error::Error, fmt, str::FromStr};

use bytemuck::{Pod, Zeroable};

pub const DEFAULT_BACKGROUND_COLOR: Chip8Color = Chip8Color::new(0, 0, 0);
pub const DEFAULT_FOREGROUND_COLOR: Chip8Color = Chip8Color::new(255, 255, 255);

/// A pixel colour laid out as little endian RGBX8888, so a slice of them can be
/// cast to bytes and uploaded straight into a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C, packed)]
pub struct Chip8Color {
    padding: u8,
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Chip8Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Chip8Color {
        Chip8Color { r, g, b, padding: 0 }
    }

    /// Reinterpret a pixel buffer as raw texture bytes
    pub fn as_bytes(pixels: &[Chip8Color]) -> &[u8] {
        bytemuck::cast_slice(pixels)
    }
}

impl FromStr for Chip8Color {
    type Err = Chip8ColorParseError;

    fn from_str(s: &str) -> Result<Chip8Color, Chip8ColorParseError> {
        let s = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix('#'))
            .unwrap_or(s);

        if s.len() != 6 {
            return Err(Chip8ColorParseError);
        }

        if s.chars().any(|c| !c.is_ascii_hexdigit()) {
            return Err(Chip8ColorParseError);
        }

        let r = u8::from_str_radix(&s[0..2], 16).map_err(|_| Chip8ColorParseError)?;
        let g = u8::from_str_radix(&s[2..4], 16).map_err(|_| Chip8ColorParseError)?;
        let b = u8::from_str_radix(&s[4..6], 16).map_err(|_| Chip8ColorParseError)?;

        Ok(Chip8Color::new(r, g, b))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip8ColorParseError;

impl fmt::Display for Chip8ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "failed to parse hex color, expected RRGGBB".fmt(f)
    }
}

impl Error for Chip8ColorParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!("0x102030".parse(), Ok(Chip8Color::new(0x10, 0x20, 0x30)));
        assert_eq!("#A0b0C0".parse(), Ok(Chip8Color::new(0xA0, 0xB0, 0xC0)));
        assert_eq!("ffffff".parse(), Ok(DEFAULT_FOREGROUND_COLOR));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!("0x1020".parse::<Chip8Color>(), Err(Chip8ColorParseError));
        assert_eq!("zz0000".parse::<Chip8Color>(), Err(Chip8ColorParseError));
        assert_eq!("".parse::<Chip8Color>(), Err(Chip8ColorParseError));
    }

    #[test]
    fn test_byte_layout() {
        let pixels = [Chip8Color::new(0x11, 0x22, 0x33), DEFAULT_BACKGROUND_COLOR];

        assert_eq!(
            Chip8Color::as_bytes(&pixels),
            &[0x00, 0x33, 0x22, 0x11, 0x00, 0x00, 0x00, 0x00]
        );
    }
}
