use crate::color::{Color, ColorDepth, Pixel};
use crate::error::PaletteError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

//===========================================================================//

// The standard Windows 16-color palette.  Do *not* change the order; 4-bit
// icons store indices into this table.
const WINDOWS_COLORS: [Color; 16] = [
    Color::new(0, 0, 0),
    Color::new(128, 0, 0),
    Color::new(0, 128, 0),
    Color::new(128, 128, 0),
    Color::new(0, 0, 128),
    Color::new(128, 0, 128),
    Color::new(0, 128, 128),
    Color::new(192, 192, 192),
    Color::new(128, 128, 128),
    Color::new(255, 0, 0),
    Color::new(0, 255, 0),
    Color::new(255, 255, 0),
    Color::new(0, 0, 255),
    Color::new(255, 0, 255),
    Color::new(0, 255, 255),
    Color::new(255, 255, 255),
];

const MIN_PALETTE_ENTRIES: usize = 2;
const MAX_PALETTE_ENTRIES: usize = 16;

// Channel values of the web-safe palette are multiples of this step.
const WEB_SAFE_STEP: u8 = 51;

/// The number of colors in the web-safe palette (6 x 6 x 6).
pub const WEB_SAFE_COLORS: usize = 216;

//===========================================================================//

/// The 16-color palette shared by every 4-bit icon in a session.
///
/// A palette always has exactly 16 entries; palettes loaded with fewer
/// colors are padded out with black.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Palette16 {
    colors: [Color; 16],
}

impl Palette16 {
    /// Creates a palette from up to 16 colors, padding the rest with black.
    /// Panics if more than 16 colors are given.
    pub fn from_colors(colors: &[Color]) -> Palette16 {
        if colors.len() > MAX_PALETTE_ENTRIES {
            panic!(
                "Too many palette colors (was {}, but max is {})",
                colors.len(),
                MAX_PALETTE_ENTRIES
            );
        }
        let mut table = [Color::BLACK; 16];
        table[..colors.len()].copy_from_slice(colors);
        Palette16 { colors: table }
    }

    /// Returns the palette entries in table order.
    pub fn colors(&self) -> &[Color; 16] {
        &self.colors
    }

    /// Returns true if `color` exactly equals one of the palette entries.
    pub fn contains(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    /// Returns the index of the palette entry closest to `color` by squared
    /// RGB distance.  Ties go to the lowest index.
    pub fn nearest_index(&self, color: Color) -> u8 {
        let mut best_index = 0;
        let mut best_distance = u32::MAX;
        for (index, &entry) in self.colors.iter().enumerate() {
            let distance = color.distance_squared(entry);
            if distance < best_distance {
                best_index = index;
                best_distance = distance;
            }
        }
        best_index as u8
    }

    /// Returns the palette entry closest to `color`.
    pub fn nearest_color(&self, color: Color) -> Color {
        self.colors[self.nearest_index(color) as usize]
    }

    /// Parses a palette from text.  Each line may hold an `R G B` triple of
    /// decimal numbers, optionally followed by a `#` comment; blank and
    /// comment-only lines are ignored.  Between 2 and 16 colors are
    /// required.
    pub fn parse(text: &str) -> Result<Palette16, PaletteError> {
        let mut colors = Vec::<Color>::with_capacity(MAX_PALETTE_ENTRIES);
        for (line_index, line) in text.lines().enumerate() {
            let line_number = line_index + 1;
            let content = match line.find('#') {
                Some(start) => &line[..start],
                None => line,
            };
            let fields: Vec<&str> = content.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() != 3 || !fields.iter().all(|f| is_channel(f)) {
                return Err(PaletteError::Syntax {
                    line_number,
                    line: line.to_string(),
                });
            }
            if colors.len() >= MAX_PALETTE_ENTRIES {
                return Err(PaletteError::TooManyEntries {
                    line: line.to_string(),
                });
            }
            let mut channels = [0u8; 3];
            for (channel, field) in channels.iter_mut().zip(fields.iter()) {
                // At most five digits, so this always fits in a u32.
                let value: u32 = field.parse().unwrap_or(u32::MAX);
                if value > u8::MAX as u32 {
                    return Err(PaletteError::OutOfRange {
                        line_number,
                        line: line.to_string(),
                    });
                }
                *channel = value as u8;
            }
            colors.push(Color::new(channels[0], channels[1], channels[2]));
        }
        if colors.len() < MIN_PALETTE_ENTRIES {
            return Err(PaletteError::TooFewEntries(colors.len()));
        }
        Ok(Palette16::from_colors(&colors))
    }

    /// Loads a palette from a text file (see [`Palette16::parse`] for the
    /// format).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Palette16, PaletteError> {
        let text = fs::read_to_string(path)?;
        Palette16::parse(&text)
    }

    /// Loads a palette from a text file, or logs a warning and returns the
    /// default Windows palette if the file can't be used.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Palette16 {
        let path = path.as_ref();
        match Palette16::load(path) {
            Ok(palette) => palette,
            Err(error) => {
                log::warn!(
                    "{} ({}); using the default 16-color palette",
                    error,
                    path.display()
                );
                Palette16::default()
            }
        }
    }
}

impl Default for Palette16 {
    fn default() -> Palette16 {
        Palette16 { colors: WINDOWS_COLORS }
    }
}

// A channel field is one to five decimal digits.
fn is_channel(field: &str) -> bool {
    !field.is_empty()
        && field.len() <= 5
        && field.bytes().all(|byte| byte.is_ascii_digit())
}

//===========================================================================//

/// Returns true if `color` lies on the 6-level web-safe grid.
pub fn is_web_safe(color: Color) -> bool {
    color.red % WEB_SAFE_STEP == 0
        && color.green % WEB_SAFE_STEP == 0
        && color.blue % WEB_SAFE_STEP == 0
}

// Rounds a channel to the nearest web-safe level, 0 through 5.  This is
// floor((value + 25.5) / 51) computed exactly in integers.
fn web_safe_level(value: u8) -> u8 {
    ((2 * value as u16 + WEB_SAFE_STEP as u16) / (2 * WEB_SAFE_STEP as u16))
        as u8
}

/// Returns the web-safe color nearest to `color`, rounding each channel
/// independently.
pub fn web_safe_color(color: Color) -> Color {
    Color::new(
        web_safe_level(color.red) * WEB_SAFE_STEP,
        web_safe_level(color.green) * WEB_SAFE_STEP,
        web_safe_level(color.blue) * WEB_SAFE_STEP,
    )
}

/// Returns the index of `color`'s nearest web-safe color within the 8-bit
/// palette.  The table is green-major (green * 36 + red * 6 + blue), which
/// must agree with [`web_safe_palette`].
pub fn web_safe_index(color: Color) -> u8 {
    web_safe_level(color.green) * 36
        + web_safe_level(color.red) * 6
        + web_safe_level(color.blue)
}

/// Returns the full 256-entry palette written for 8-bit icons: the 216
/// web-safe colors, iterating green, then red, then blue, followed by 40
/// black entries.
pub fn web_safe_palette() -> Vec<Color> {
    let mut colors = Vec::with_capacity(256);
    for green in 0..6 {
        for red in 0..6 {
            for blue in 0..6 {
                colors.push(Color::new(
                    red * WEB_SAFE_STEP,
                    green * WEB_SAFE_STEP,
                    blue * WEB_SAFE_STEP,
                ));
            }
        }
    }
    colors.resize(256, Color::BLACK);
    colors
}

//===========================================================================//

/// Returns the color depth suggested by an image's pixel colors: 4 bits if
/// every color (opaque or not) is in `palette`, 8 bits if every color is
/// web-safe, and 24 bits otherwise.
pub fn classify(pixels: &[Pixel], palette: &Palette16) -> ColorDepth {
    if pixels.iter().all(|pixel| palette.contains(pixel.color)) {
        ColorDepth::Four
    } else if pixels.iter().all(|pixel| is_web_safe(pixel.color)) {
        ColorDepth::Eight
    } else {
        ColorDepth::TwentyFour
    }
}

//===========================================================================//


//===========================================================================//
