use std::io;
use thiserror::Error;

//===========================================================================//

/// An error encountered while decoding an ICO file.  Any such error aborts
/// the whole file; no partially decoded images are ever returned.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A header, directory entry, or bitmap header field is out of range.
    #[error("{message}")]
    Structural {
        /// The directory entry being read, or `None` for file-level fields.
        index: Option<usize>,
        /// The name of the offending field (e.g. `"idCount"`).
        field: &'static str,
        /// A human-readable description of the problem.
        message: String,
    },
    /// The entry's bit count and color count hint don't name one of the
    /// supported pixel formats.
    #[error(
        "Unsupported color depth: index {index}, biBitCount {bit_count}, \
         bColorCount {color_count}"
    )]
    UnsupportedEncoding {
        /// The directory entry being read.
        index: usize,
        /// The `biBitCount` field of the bitmap header.
        bit_count: u16,
        /// The `bColorCount` hint of the directory entry.
        color_count: u8,
    },
    /// The entry is not square, or its size is outside 8..=256.
    #[error(
        "Unsupported icon size: index {index}, bHeight {height}, \
         bWidth {width}"
    )]
    Size {
        /// The directory entry being read.
        index: usize,
        /// The entry's width, in pixels.
        width: u32,
        /// The entry's height, in pixels.
        height: u32,
    },
    /// The underlying data could not be read (including truncated image
    /// data).
    #[error("Can't read icon data: {0}")]
    Io(#[from] io::Error),
}

impl DecodeError {
    /// Returns the index of the directory entry that caused the error, if
    /// the error is specific to one entry.
    pub fn index(&self) -> Option<usize> {
        match *self {
            DecodeError::Structural { index, .. } => index,
            DecodeError::UnsupportedEncoding { index, .. } => Some(index),
            DecodeError::Size { index, .. } => Some(index),
            DecodeError::Io(_) => None,
        }
    }

    /// Returns the name of the offending field, for structural errors.
    pub fn field(&self) -> Option<&'static str> {
        match *self {
            DecodeError::Structural { field, .. } => Some(field),
            _ => None,
        }
    }
}

//===========================================================================//

/// An error encountered while encoding an ICO file.  No bytes are produced
/// when encoding fails.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Every image was empty (fully transparent), so there was nothing to
    /// save.
    #[error("All icons are empty (completely transparent)")]
    NoImages,
    /// More images were selected for output than an ICO directory may hold.
    #[error("Too many icons to save (was {0}, but max is {max})",
            max = crate::icondir::MAX_ENTRIES)]
    TooManyImages(usize),
    /// The depth resolver asked to abort the save.
    #[error("Save aborted at icon #{index}")]
    Aborted {
        /// The position of the image whose depth advisory was aborted.
        index: usize,
    },
    /// Writing the encoded data failed.
    #[error("Can't write icon data: {0}")]
    Io(#[from] io::Error),
}

//===========================================================================//

/// An error encountered while loading a 16-color palette file.
#[derive(Debug, Error)]
pub enum PaletteError {
    /// The palette file could not be read.
    #[error("Palette file I/O error: {0}")]
    Io(#[from] io::Error),
    /// A line is neither blank, a comment, nor an `R G B` triple.
    #[error("Palette file syntax error on line {line_number}: {line}")]
    Syntax {
        /// One-based line number.
        line_number: usize,
        /// The offending line.
        line: String,
    },
    /// A color channel is greater than 255.
    #[error("Palette file out of range (0-255) on line {line_number}: {line}")]
    OutOfRange {
        /// One-based line number.
        line_number: usize,
        /// The offending line.
        line: String,
    },
    /// The file lists more than 16 colors.
    #[error("Palette file has more than 16 entries: {line}")]
    TooManyEntries {
        /// The first line past the sixteenth color.
        line: String,
    },
    /// The file lists fewer than 2 colors.
    #[error("Palette file needs at least 2 entries (found {0})")]
    TooFewEntries(usize),
}

//===========================================================================//


//===========================================================================//
