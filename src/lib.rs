//! A library for encoding/decoding Windows ICO files, as used by an icon
//! editor.
//!
//! Decoding accepts uncompressed BMP-style entries at 1, 4, 8, 24, or 32 bits
//! per pixel, and turns each into an [`IconImage`]: a square grid of opaque
//! colors and transparent pixels, tagged with the color depth its colors
//! suggest.  Encoding writes each image at its own color depth (4, 8, or 24
//! bits per pixel) plus a 1-bit transparency mask.
//!
//! 4-bit images use a user-configurable [`Palette16`], and 8-bit images use
//! the 216-color web-safe palette.
//!
//! # Example
//!
//! ```
//! use icoedit::{Color, ColorDepth, DepthDecision, EncodeOptions, IconImage,
//!               Palette16};
//!
//! let palette = Palette16::default();
//! let mut image = IconImage::new(16);
//! image.paint(3, 4, Color::new(255, 0, 0));
//! image.set_color_depth(ColorDepth::Four);
//!
//! let mut images = vec![image];
//! let data = icoedit::encode_icon_file(
//!     &mut images,
//!     &palette,
//!     &EncodeOptions::default(),
//!     |_index, _image, _suggested| DepthDecision::Accept,
//! )
//! .unwrap();
//!
//! let icondir = icoedit::decode_icon_file(&data, &palette).unwrap();
//! assert_eq!(icondir.images()[0].pixels(), images[0].pixels());
//! ```

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod bmpdepth;
mod color;
mod error;
mod icondir;
mod image;
mod palette;
mod restype;
mod rows;

pub use crate::color::{Color, ColorDepth, Pixel};
pub use crate::error::{DecodeError, EncodeError, PaletteError};
pub use crate::icondir::{
    decode_icon_file, encode_icon_file, DepthDecision, EncodeOptions,
    IconDir, MAX_ENTRIES,
};
pub use crate::image::{IconImage, MAX_SIZE, MIN_SIZE};
pub use crate::palette::{
    classify, is_web_safe, web_safe_color, web_safe_index, web_safe_palette,
    Palette16, WEB_SAFE_COLORS,
};
pub use crate::restype::ResourceType;

//===========================================================================//
