//! Packed, padded bitmap rows.
//!
//! Every pixel array in an ICO image (color data and AND mask alike) is
//! stored bottom row first, with each row padded with zero bytes out to a
//! multiple of four bytes.  Sub-byte pixels are packed most significant bits
//! first.

use std::io::{self, Read, Write};

//===========================================================================//

/// Returns the number of bytes a row of `width` pixels occupies on disk at
/// `bits_per_pixel`, including padding to a four-byte boundary.
pub(crate) fn row_stride(width: u32, bits_per_pixel: u16) -> usize {
    ((width as usize * bits_per_pixel as usize + 31) / 32) * 4
}

/// Returns the number of meaningful bytes in a row, excluding padding.
pub(crate) fn row_data_len(width: u32, bits_per_pixel: u16) -> usize {
    (width as usize * bits_per_pixel as usize + 7) / 8
}

/// Iterates over visual row numbers in on-disk order (bottom to top).
pub(crate) fn bottom_up(height: u32) -> impl Iterator<Item = usize> {
    (0..height as usize).rev()
}

//===========================================================================//

/// Reads one padded row and returns its bytes.  The padding is consumed and
/// discarded along with it.
pub(crate) fn read_row<R: Read>(
    reader: &mut R,
    width: u32,
    bits_per_pixel: u16,
) -> io::Result<Vec<u8>> {
    let mut row = vec![0u8; row_stride(width, bits_per_pixel)];
    reader.read_exact(&mut row)?;
    row.truncate(row_data_len(width, bits_per_pixel));
    Ok(row)
}

/// Writes one row of packed bytes, followed by zero padding up to the
/// row stride.
pub(crate) fn write_row<W: Write>(
    writer: &mut W,
    row: &[u8],
    width: u32,
    bits_per_pixel: u16,
) -> io::Result<()> {
    debug_assert_eq!(row.len(), row_data_len(width, bits_per_pixel));
    let stride = row_stride(width, bits_per_pixel);
    writer.write_all(row)?;
    writer.write_all(&vec![0u8; stride - row.len()])?;
    Ok(())
}

//===========================================================================//

/// Unpacks `width` indices of 1, 4, or 8 bits each from a packed row, most
/// significant bits first.
pub(crate) fn unpack_indices(
    row: &[u8],
    width: u32,
    bits_per_index: u16,
) -> Vec<u8> {
    debug_assert!(matches!(bits_per_index, 1 | 4 | 8));
    let bits = bits_per_index as usize;
    let per_byte = 8 / bits;
    let mask = ((1u16 << bits) - 1) as u8;
    (0..width as usize)
        .map(|col| {
            let byte = row[col / per_byte];
            let shift = 8 - bits * (col % per_byte + 1);
            (byte >> shift) & mask
        })
        .collect()
}

/// Packs indices of 1, 4, or 8 bits each into bytes, most significant bits
/// first.  The final byte is zero-filled if the row ends partway through.
pub(crate) fn pack_indices(indices: &[u8], bits_per_index: u16) -> Vec<u8> {
    debug_assert!(matches!(bits_per_index, 1 | 4 | 8));
    let bits = bits_per_index as usize;
    let per_byte = 8 / bits;
    let mask = ((1u16 << bits) - 1) as u8;
    let mut row = vec![0u8; (indices.len() * bits + 7) / 8];
    for (col, &index) in indices.iter().enumerate() {
        debug_assert_eq!(index & mask, index);
        let shift = 8 - bits * (col % per_byte + 1);
        row[col / per_byte] |= (index & mask) << shift;
    }
    row
}

//===========================================================================//


//===========================================================================//
