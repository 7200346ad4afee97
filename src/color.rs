use crate::palette::{self, Palette16};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//===========================================================================//

/// An opaque RGB color with 8 bits per channel.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Color {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl Color {
    /// Black, the stored color of every transparent pixel.
    pub const BLACK: Color = Color { red: 0, green: 0, blue: 0 };

    /// Creates a color from its red, green, and blue channels.
    pub const fn new(red: u8, green: u8, blue: u8) -> Color {
        Color { red, green, blue }
    }

    /// Returns the squared Euclidean distance between two colors in RGB
    /// space.
    pub fn distance_squared(&self, other: Color) -> u32 {
        let dr = self.red as i32 - other.red as i32;
        let dg = self.green as i32 - other.green as i32;
        let db = self.blue as i32 - other.blue as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

//===========================================================================//

/// One cell of an icon: a color plus an opacity flag.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Pixel {
    /// The pixel's color.  Carries no meaning when the pixel is transparent
    /// (and is conventionally black in that case).
    pub color: Color,
    /// True for a solid pixel, false for a transparent one.
    pub opaque: bool,
}

impl Pixel {
    /// A transparent pixel, stored as black.
    pub const TRANSPARENT: Pixel =
        Pixel { color: Color::BLACK, opaque: false };

    /// Creates an opaque pixel of the given color.
    pub const fn solid(color: Color) -> Pixel {
        Pixel { color, opaque: true }
    }
}

//===========================================================================//

/// The palette-fitting rule that governs how an image is drawn and encoded.
///
/// This is advisory metadata on an [`IconImage`](crate::IconImage): decoded
/// pixels are always stored as true color, whatever depth they were read at.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum ColorDepth {
    /// 4 bits per pixel, indexing the session's 16-color palette.
    Four,
    /// 8 bits per pixel, indexing the fixed web-safe palette.
    Eight,
    /// 24 bits per pixel, raw RGB.
    TwentyFour,
}

impl ColorDepth {
    /// Returns the depth with the given bits-per-pixel, if it is one of 4, 8
    /// or 24.
    pub fn from_bits_per_pixel(bits_per_pixel: u16) -> Option<ColorDepth> {
        match bits_per_pixel {
            4 => Some(ColorDepth::Four),
            8 => Some(ColorDepth::Eight),
            24 => Some(ColorDepth::TwentyFour),
            _ => None,
        }
    }

    /// Returns the number of bits used per pixel at this depth.
    pub fn bits_per_pixel(&self) -> u16 {
        match *self {
            ColorDepth::Four => 4,
            ColorDepth::Eight => 8,
            ColorDepth::TwentyFour => 24,
        }
    }

    /// Returns the number of entries in the color table written for this
    /// depth.
    pub fn num_colors(&self) -> usize {
        match *self {
            ColorDepth::Four => 16,
            ColorDepth::Eight => 256,
            ColorDepth::TwentyFour => 0,
        }
    }

    /// Returns the color that `color` is displayed (and encoded) as at this
    /// depth: the nearest 16-color palette entry at 4 bits, the nearest
    /// web-safe color at 8 bits, and the color itself at 24 bits.
    pub fn closest_color(&self, color: Color, palette: &Palette16) -> Color {
        match *self {
            ColorDepth::Four => palette.nearest_color(color),
            ColorDepth::Eight => palette::web_safe_color(color),
            ColorDepth::TwentyFour => color,
        }
    }
}

impl Default for ColorDepth {
    fn default() -> ColorDepth {
        ColorDepth::Eight
    }
}

//===========================================================================//


//===========================================================================//
