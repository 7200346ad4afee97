use crate::color::ColorDepth;
use crate::error::{DecodeError, EncodeError};
use crate::image::{self, IconImage, MAX_SIZE, MIN_SIZE};
use crate::palette::Palette16;
use crate::restype::ResourceType;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

//===========================================================================//

/// The most images an ICO file may hold.
pub const MAX_ENTRIES: usize = 99;

// The sizes of the ICONDIR header and of each ICONDIRENTRY, in bytes.
const ICONDIR_LEN: u64 = 6;
const ICONDIRENTRY_LEN: u64 = 16;

// The written file (and the trailer after it) are zero-padded to a multiple
// of this many bytes.
const FILE_ALIGNMENT: usize = 16;

//===========================================================================//

/// Options controlling which images are written and what follows them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct EncodeOptions {
    /// If true, fully transparent images are written too.
    pub include_empty: bool,
    /// Text appended after the image data (e.g. a copyright notice).  It has
    /// no effect on how the icons are displayed.  Empty means none.
    pub trailer_text: String,
}

/// The caller's answer when an image's colors suggest a different color
/// depth than the one it is set to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DepthDecision {
    /// Switch the image to the suggested depth before encoding it.
    Accept,
    /// Keep the image's depth; its colors are quantized to fit.
    Decline,
    /// Stop encoding; nothing is written.
    Abort,
}

//===========================================================================//

/// A collection of images; the contents of a single ICO file.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct IconDir {
    restype: ResourceType,
    images: Vec<IconImage>,
    trailer: Vec<u8>,
}

impl IconDir {
    /// Creates a new icon collection holding the given images.
    pub fn new(images: Vec<IconImage>) -> IconDir {
        IconDir { restype: ResourceType::Icon, images, trailer: Vec::new() }
    }

    /// Returns the type of resource named in the file header.
    pub fn resource_type(&self) -> ResourceType {
        self.restype
    }

    /// Returns the images in this collection, in file order.
    pub fn images(&self) -> &[IconImage] {
        &self.images
    }

    /// Returns the images in this collection for editing.
    pub fn images_mut(&mut self) -> &mut Vec<IconImage> {
        &mut self.images
    }

    /// Consumes the collection, returning its images.
    pub fn into_images(self) -> Vec<IconImage> {
        self.images
    }

    /// Returns the bytes found after the last image in the file, with the
    /// zero padding around them removed.  Empty if there were none.
    pub fn trailer(&self) -> &[u8] {
        &self.trailer
    }

    /// Reads an ICO file into memory, choosing each image's color depth with
    /// `palette`.  Fails on the first malformed field; no images are
    /// returned in that case.
    pub fn read<R: Read + Seek>(
        mut reader: R,
        palette: &Palette16,
    ) -> Result<IconDir, DecodeError> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        if file_size < ICONDIR_LEN {
            malformed!(
                None,
                "fileSize",
                "File too small for icon header: fileSize {}",
                file_size
            );
        }

        // Read the ICONDIR struct:
        let reserved = reader.read_u16::<LittleEndian>()?;
        if reserved != 0 {
            malformed!(
                None,
                "idReserved",
                "Unsupported icon header: idReserved {} (must be 0)",
                reserved
            );
        }
        let restype = reader.read_u16::<LittleEndian>()?;
        let restype = match ResourceType::from_number(restype) {
            Some(restype) => restype,
            None => malformed!(
                None,
                "idType",
                "Unsupported icon header: idType {} (must be 1 or 2)",
                restype
            ),
        };
        let num_entries = reader.read_u16::<LittleEndian>()? as usize;
        if num_entries < 1 || num_entries > MAX_ENTRIES {
            malformed!(
                None,
                "idCount",
                "Unsupported icon header: idCount {} (must be 1 to {})",
                num_entries,
                MAX_ENTRIES
            );
        }
        let directory_len =
            ICONDIR_LEN + ICONDIRENTRY_LEN * num_entries as u64;
        if file_size < directory_len {
            malformed!(
                None,
                "fileSize",
                "File too small for icon directory: fileSize {}, idCount {}",
                file_size,
                num_entries
            );
        }

        let mut images = Vec::<IconImage>::with_capacity(num_entries);
        let mut data_end = directory_len;
        for index in 0..num_entries {
            reader.seek(SeekFrom::Start(
                ICONDIR_LEN + ICONDIRENTRY_LEN * index as u64,
            ))?;
            let entry = IconDirEntry::read(&mut reader)?;
            // Only square icons from 8 to 256 pixels are supported.  (A
            // width or height byte of zero means 256.)
            if entry.width != entry.height
                || entry.width < MIN_SIZE
                || entry.width > MAX_SIZE
            {
                return Err(DecodeError::Size {
                    index,
                    width: entry.width,
                    height: entry.height,
                });
            }
            // Roughly check that the image data fits within the file.  The
            // data size is often understated, so it isn't used to limit how
            // much is read.
            let entry_end = entry.data_offset as u64 + entry.data_size as u64;
            if file_size < entry_end {
                malformed!(
                    Some(index),
                    "dwImageOffset",
                    "File too small for icon data: index {}, \
                     dwImageOffset 0x{:x}, dwBytesInRes {}",
                    index,
                    entry.data_offset,
                    entry.data_size
                );
            }
            data_end = data_end.max(entry_end);
            reader.seek(SeekFrom::Start(entry.data_offset as u64))?;
            let image = IconImage::read_bmp(
                &mut reader,
                index,
                entry.width,
                entry.num_colors,
                palette,
            )?;
            // The hidden text starts after whatever was actually read, even
            // if the directory understated the entry's size.
            data_end = data_end.max(reader.stream_position()?);
            images.push(image);
        }

        // Anything after the last image is hidden text.
        let mut trailer = Vec::new();
        if data_end < file_size {
            reader.seek(SeekFrom::Start(data_end))?;
            reader.read_to_end(&mut trailer)?;
            let start = trailer.iter().position(|&b| b != 0);
            let end = trailer.iter().rposition(|&b| b != 0);
            trailer = match (start, end) {
                (Some(start), Some(end)) => trailer[start..=end].to_vec(),
                _ => Vec::new(),
            };
        }

        log::debug!(
            "Read {} icon(s) and {} trailer byte(s) from {}-byte file",
            images.len(),
            trailer.len(),
            file_size
        );
        Ok(IconDir { restype, images, trailer })
    }

    /// Encodes the images (see [`encode_icon_file`]) and writes the result.
    /// Nothing is written unless encoding succeeds.
    pub fn write<W, F>(
        &mut self,
        mut writer: W,
        palette: &Palette16,
        options: &EncodeOptions,
        resolver: F,
    ) -> Result<(), EncodeError>
    where
        W: Write,
        F: FnMut(usize, &IconImage, ColorDepth) -> DepthDecision,
    {
        let data =
            encode_icon_file(&mut self.images, palette, options, resolver)?;
        writer.write_all(&data)?;
        Ok(())
    }
}

//===========================================================================//

/// Decodes a complete ICO file held in memory.
pub fn decode_icon_file(
    data: &[u8],
    palette: &Palette16,
) -> Result<IconDir, DecodeError> {
    IconDir::read(Cursor::new(data), palette)
}

/// Encodes images into a complete ICO file held in memory.
///
/// Empty images are skipped unless `options.include_empty` is set.  For each
/// remaining image whose colors suggest a different color depth than the
/// image is set to, `resolver` is called once (with the image's position in
/// `images`, the image, and the suggested depth), unless it was already
/// called for that image on an earlier save.  Returning
/// [`DepthDecision::Abort`] stops the encode with
/// [`EncodeError::Aborted`].
pub fn encode_icon_file<F>(
    images: &mut [IconImage],
    palette: &Palette16,
    options: &EncodeOptions,
    mut resolver: F,
) -> Result<Vec<u8>, EncodeError>
where
    F: FnMut(usize, &IconImage, ColorDepth) -> DepthDecision,
{
    let selected: Vec<usize> = images
        .iter()
        .enumerate()
        .filter(|(_, image)| options.include_empty || !image.is_empty())
        .map(|(index, _)| index)
        .collect();
    if selected.is_empty() {
        return Err(EncodeError::NoImages);
    }
    if selected.len() > MAX_ENTRIES {
        return Err(EncodeError::TooManyImages(selected.len()));
    }

    let mut entries = Vec::<(IconDirEntry, Vec<u8>)>::new();
    for &index in selected.iter() {
        let image = &mut images[index];
        reconcile_depth(index, image, palette, &mut resolver)?;
        let depth = image.color_depth();
        let data = image.write_bmp(palette)?;
        let size = image.size();
        let entry = IconDirEntry {
            width: size,
            height: size,
            num_colors: if depth == ColorDepth::Four { 16 } else { 0 },
            color_planes: 1,
            bits_per_pixel: depth.bits_per_pixel(),
            data_size: data.len() as u32,
            data_offset: 0,
        };
        log::debug!(
            "Encoded icon #{}: {}x{} at {} bpp, {} bytes",
            index,
            size,
            size,
            depth.bits_per_pixel(),
            data.len()
        );
        entries.push((entry, data));
    }

    let mut output = Vec::<u8>::new();
    output.write_u16::<LittleEndian>(0)?; // reserved
    output.write_u16::<LittleEndian>(ResourceType::Icon.number())?;
    output.write_u16::<LittleEndian>(entries.len() as u16)?;
    let mut data_offset =
        (ICONDIR_LEN + ICONDIRENTRY_LEN * entries.len() as u64) as u32;
    for (entry, data) in entries.iter_mut() {
        entry.data_offset = data_offset;
        entry.write(&mut output)?;
        data_offset += data.len() as u32;
    }
    for (_, data) in entries.iter() {
        output.write_all(data)?;
    }
    pad_to_alignment(&mut output);
    if !options.trailer_text.is_empty() {
        output.write_all(options.trailer_text.as_bytes())?;
        pad_to_alignment(&mut output);
    }
    Ok(output)
}

// Asks the resolver about an image whose colors suggest a different depth,
// at most once per image.
fn reconcile_depth<F>(
    index: usize,
    image: &mut IconImage,
    palette: &Palette16,
    resolver: &mut F,
) -> Result<(), EncodeError>
where
    F: FnMut(usize, &IconImage, ColorDepth) -> DepthDecision,
{
    if image.depth_warning_shown() {
        return Ok(());
    }
    let suggested = image.classify(palette);
    if suggested == image.color_depth() {
        return Ok(());
    }
    let decision = resolver(index, &*image, suggested);
    image.set_depth_warning_shown(true);
    match decision {
        DepthDecision::Accept => image.set_color_depth(suggested),
        DepthDecision::Decline => {
            log::warn!(
                "Icon #{} is saved at {} bpp, but its colors suggest {} bpp",
                index,
                image.color_depth().bits_per_pixel(),
                suggested.bits_per_pixel()
            );
        }
        DepthDecision::Abort => return Err(EncodeError::Aborted { index }),
    }
    Ok(())
}

fn pad_to_alignment(output: &mut Vec<u8>) {
    let blocks = (output.len() + FILE_ALIGNMENT - 1) / FILE_ALIGNMENT;
    let padded_len = blocks * FILE_ALIGNMENT;
    output.resize(padded_len, 0);
}

//===========================================================================//

// One ICONDIRENTRY record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct IconDirEntry {
    width: u32,
    height: u32,
    num_colors: u8,
    color_planes: u16,
    bits_per_pixel: u16,
    data_size: u32,
    data_offset: u32,
}

impl IconDirEntry {
    fn read<R: Read>(reader: &mut R) -> io::Result<IconDirEntry> {
        let width_byte = reader.read_u8()?;
        let height_byte = reader.read_u8()?;
        let num_colors = reader.read_u8()?;
        let _reserved = reader.read_u8()?;
        // The planes and bit count are often wrong or zero, so they're
        // ignored in favor of the BITMAPINFOHEADER.
        let color_planes = reader.read_u16::<LittleEndian>()?;
        let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
        let data_size = image::read_u31(reader)?;
        let data_offset = image::read_u31(reader)?;
        Ok(IconDirEntry {
            width: if width_byte == 0 { 256 } else { width_byte as u32 },
            height: if height_byte == 0 { 256 } else { height_byte as u32 },
            num_colors,
            color_planes,
            bits_per_pixel,
            data_size,
            data_offset,
        })
    }

    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        // A width/height byte of zero indicates a size of 256.
        writer.write_u8((self.width & 0xff) as u8)?;
        writer.write_u8((self.height & 0xff) as u8)?;
        writer.write_u8(self.num_colors)?;
        writer.write_u8(0)?; // reserved
        writer.write_u16::<LittleEndian>(self.color_planes)?;
        writer.write_u16::<LittleEndian>(self.bits_per_pixel)?;
        writer.write_u32::<LittleEndian>(self.data_size)?;
        writer.write_u32::<LittleEndian>(self.data_offset)?;
        Ok(())
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{
        decode_icon_file, encode_icon_file, DepthDecision, EncodeOptions,
        IconDir, IconDirEntry, ResourceType,
    };
    use crate::color::{Color, ColorDepth, Pixel};
    use crate::error::{DecodeError, EncodeError};
    use crate::image::IconImage;
    use crate::palette::Palette16;
    use std::io::Cursor;

    // An 8x8 icon at 1 bpp with a red/white palette.  The bottom row is
    // white, and every other row is half red, half white.  The bottom-left
    // and top-right pixels are masked out.
    const ICON_1BPP: &[u8] = b"\
        \x00\x00\x01\x00\x01\x00\
        \
        \x08\x08\x02\x00\x01\x00\x01\x00\
        \x70\x00\x00\x00\x16\x00\x00\x00\
        \
        \x28\x00\x00\x00\x08\x00\x00\x00\x10\x00\x00\x00\
        \x01\x00\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\
        \x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
        \x00\x00\x00\x00\
        \
        \x00\x00\xff\x00\xff\xff\xff\x00\
        \
        \xff\x00\x00\x00\x0f\x00\x00\x00\x0f\x00\x00\x00\x0f\x00\x00\x00\
        \x0f\x00\x00\x00\x0f\x00\x00\x00\x0f\x00\x00\x00\x0f\x00\x00\x00\
        \
        \x80\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
        \x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x01\x00\x00\x00";

    fn expect_structural(input: &[u8], expected_field: &str) {
        match decode_icon_file(input, &Palette16::default()) {
            Err(DecodeError::Structural { field, .. }) => {
                assert_eq!(field, expected_field);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn read_bmp_1bpp_icon() {
        let icondir =
            decode_icon_file(ICON_1BPP, &Palette16::default()).unwrap();
        assert_eq!(icondir.resource_type(), ResourceType::Icon);
        assert_eq!(icondir.images().len(), 1);
        assert!(icondir.trailer().is_empty());
        let image = &icondir.images()[0];
        let red = Pixel::solid(Color::new(255, 0, 0));
        let white = Pixel::solid(Color::new(255, 255, 255));
        assert_eq!(image.size(), 8);
        assert_eq!(image.pixel(0, 7), Pixel::TRANSPARENT);
        assert_eq!(image.pixel(1, 7), white);
        assert_eq!(image.pixel(7, 0), Pixel::TRANSPARENT);
        assert_eq!(image.pixel(0, 0), red);
        assert_eq!(image.pixel(3, 3), red);
        assert_eq!(image.pixel(4, 3), white);
        assert_eq!(image.color_depth(), ColorDepth::Four);
    }

    #[test]
    fn read_cursor_resource_type() {
        let mut input = ICON_1BPP.to_vec();
        input[2] = 2;
        let icondir = decode_icon_file(&input, &Palette16::default()).unwrap();
        assert_eq!(icondir.resource_type(), ResourceType::Cursor);
        // Cursors are only read; saving always writes an icon.
        let mut images = icondir.into_images();
        let data = encode_icon_file(
            &mut images,
            &Palette16::default(),
            &EncodeOptions::default(),
            |_, _, _| DepthDecision::Decline,
        )
        .unwrap();
        assert_eq!(&data[2..4], b"\x01\x00");
    }

    #[test]
    fn understated_data_size_is_not_trailer() {
        let mut input = ICON_1BPP.to_vec();
        input[14] = 0x28; // dwBytesInRes
        let icondir = decode_icon_file(&input, &Palette16::default()).unwrap();
        assert_eq!(icondir.images().len(), 1);
        assert!(icondir.trailer().is_empty());
        input.extend_from_slice(b"\x00note\x00");
        let icondir = decode_icon_file(&input, &Palette16::default()).unwrap();
        assert_eq!(icondir.trailer(), b"note");
    }

    #[test]
    fn read_trailer_text() {
        let mut input = ICON_1BPP.to_vec();
        input.extend_from_slice(b"\x00\x00hidden text\x00\x00\x00");
        let icondir = decode_icon_file(&input, &Palette16::default()).unwrap();
        assert_eq!(icondir.trailer(), b"hidden text");
    }

    #[test]
    fn reject_tiny_file() {
        expect_structural(b"\x00\x00\x01", "fileSize");
    }

    #[test]
    fn reject_bad_header_fields() {
        expect_structural(b"\x01\x00\x01\x00\x01\x00", "idReserved");
        expect_structural(b"\x00\x00\x03\x00\x01\x00", "idType");
        expect_structural(b"\x00\x00\x01\x00\x00\x00", "idCount");
        expect_structural(b"\x00\x00\x01\x00\x64\x00", "idCount");
    }

    #[test]
    fn reject_truncated_directory() {
        expect_structural(&ICON_1BPP[..21], "fileSize");
    }

    #[test]
    fn reject_data_past_end_of_file() {
        let truncated = &ICON_1BPP[..(ICON_1BPP.len() - 1)];
        expect_structural(truncated, "dwImageOffset");
        let mut input = ICON_1BPP.to_vec();
        input[18] = 0x17; // dwImageOffset
        expect_structural(&input, "dwImageOffset");
    }

    #[test]
    fn reject_non_square_entry() {
        let mut input = ICON_1BPP.to_vec();
        input[7] = 16; // bHeight
        match decode_icon_file(&input, &Palette16::default()) {
            Err(DecodeError::Size { index: 0, width: 8, height: 16 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn reject_small_entry() {
        let mut input = ICON_1BPP.to_vec();
        input[6] = 7; // bWidth
        input[7] = 7; // bHeight
        let error =
            decode_icon_file(&input, &Palette16::default()).unwrap_err();
        assert_eq!(error.index(), Some(0));
        assert!(matches!(error, DecodeError::Size { width: 7, .. }));
    }

    #[test]
    fn reject_unsupported_color_count() {
        let mut input = ICON_1BPP.to_vec();
        input[8] = 16; // bColorCount
        match decode_icon_file(&input, &Palette16::default()) {
            Err(DecodeError::UnsupportedEncoding {
                index: 0,
                bit_count: 1,
                color_count: 16,
            }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn directory_entry_zero_means_256() {
        let input: &[u8] = b"\x00\x00\x00\x00\x01\x00\x20\x00\
                             \x28\x00\x00\x00\x16\x00\x00\x80";
        let entry = IconDirEntry::read(&mut Cursor::new(input)).unwrap();
        assert_eq!(entry.width, 256);
        assert_eq!(entry.height, 256);
        assert_eq!(entry.bits_per_pixel, 32);
        // The high bit of each 32-bit field is masked off.
        assert_eq!(entry.data_offset, 0x16);
        let mut output = Vec::new();
        entry.write(&mut output).unwrap();
        assert_eq!(&output[..2], b"\x00\x00");
    }

    #[test]
    fn encode_nothing_to_save() {
        let mut images = IconImage::default_set();
        let result = encode_icon_file(
            &mut images,
            &Palette16::default(),
            &EncodeOptions::default(),
            |_, _, _| DepthDecision::Accept,
        );
        assert!(matches!(result, Err(EncodeError::NoImages)));
        let result = encode_icon_file(
            &mut [],
            &Palette16::default(),
            &EncodeOptions { include_empty: true, ..EncodeOptions::default() },
            |_, _, _| DepthDecision::Accept,
        );
        assert!(matches!(result, Err(EncodeError::NoImages)));
    }

    #[test]
    fn encode_empty_icons_when_asked() {
        let mut images = vec![IconImage::new(8)];
        let options =
            EncodeOptions { include_empty: true, ..EncodeOptions::default() };
        let mut prompts = Vec::new();
        let data = encode_icon_file(
            &mut images,
            &Palette16::default(),
            &options,
            |index, _, suggested| {
                prompts.push((index, suggested));
                DepthDecision::Decline
            },
        )
        .unwrap();
        // Transparent pixels are stored as black, which is in the 16-color
        // palette, so a fresh 8-bit image suggests 4 bits.
        assert_eq!(prompts, vec![(0, ColorDepth::Four)]);
        assert_eq!(images[0].color_depth(), ColorDepth::Eight);
        assert!(images[0].depth_warning_shown());
        assert_eq!(&data[4..6], b"\x01\x00");
        assert_eq!(data.len() % 16, 0);
    }

    #[test]
    fn encode_too_many_icons() {
        let mut image = IconImage::new(8);
        image.paint(0, 0, Color::BLACK);
        let mut images = vec![image; 100];
        let result = encode_icon_file(
            &mut images,
            &Palette16::default(),
            &EncodeOptions::default(),
            |_, _, _| DepthDecision::Decline,
        );
        assert!(matches!(result, Err(EncodeError::TooManyImages(100))));
    }

    #[test]
    fn write_icon_dir() {
        let palette = Palette16::default();
        let mut image = IconImage::new(8);
        image.paint(0, 0, Color::new(0, 0, 255));
        image.set_color_depth(ColorDepth::Four);
        let mut icondir = IconDir::new(vec![image]);
        let mut output = Vec::<u8>::new();
        let options = EncodeOptions::default();
        icondir
            .write(&mut output, &palette, &options, |_, _, _| {
                DepthDecision::Abort
            })
            .unwrap();
        let expected_header: &[u8] = b"\
            \x00\x00\x01\x00\x01\x00\
            \x08\x08\x10\x00\x01\x00\x04\x00\
            \xa8\x00\x00\x00\x16\x00\x00\x00";
        assert_eq!(&output[..22], expected_header);
        // 22 + 168 = 190 bytes, padded to 192.
        assert_eq!(output.len(), 192);
        let decoded = IconDir::read(Cursor::new(&output), &palette).unwrap();
        assert_eq!(decoded.images()[0].pixels(), icondir.images()[0].pixels());
    }
}

//===========================================================================//
