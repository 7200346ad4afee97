use crate::bmpdepth::BmpDepth;
use crate::color::{Color, ColorDepth, Pixel};
use crate::error::DecodeError;
use crate::palette::{self, Palette16};
use crate::rows;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Read, Write};

//===========================================================================//

// The size of a BITMAPINFOHEADER struct, in bytes.
const BMP_HEADER_LEN: u32 = 40;

/// The smallest supported icon size, in pixels.
pub const MIN_SIZE: u32 = 8;
/// The largest supported icon size, in pixels.
pub const MAX_SIZE: u32 = 256;

// The sizes of the empty icons that a new icon file starts out with.
const DEFAULT_SIZES: [u32; 5] = [16, 24, 32, 48, 64];

//===========================================================================//

/// One square icon image: a grid of colored or transparent pixels, plus the
/// color depth it will be encoded at.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "IconImageFields"))]
pub struct IconImage {
    size: u32,
    pixels: Vec<Pixel>,
    color_depth: ColorDepth,
    depth_warning_shown: bool,
}

// Deserialized fields, checked before they become an `IconImage`.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct IconImageFields {
    size: u32,
    pixels: Vec<Pixel>,
    color_depth: ColorDepth,
    depth_warning_shown: bool,
}

#[cfg(feature = "serde")]
impl TryFrom<IconImageFields> for IconImage {
    type Error = String;

    fn try_from(fields: IconImageFields) -> Result<IconImage, String> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&fields.size) {
            return Err(format!(
                "Invalid icon size (was {}, but must be from {} to {})",
                fields.size, MIN_SIZE, MAX_SIZE
            ));
        }
        let num_pixels = (fields.size * fields.size) as usize;
        if fields.pixels.len() != num_pixels {
            return Err(format!(
                "Invalid pixel count (was {}, but must be {} for {}x{} image)",
                fields.pixels.len(),
                num_pixels,
                fields.size,
                fields.size
            ));
        }
        let pixels = fields
            .pixels
            .into_iter()
            .map(|pixel| if pixel.opaque { pixel } else { Pixel::TRANSPARENT })
            .collect();
        Ok(IconImage {
            size: fields.size,
            pixels,
            color_depth: fields.color_depth,
            depth_warning_shown: fields.depth_warning_shown,
        })
    }
}

impl IconImage {
    /// Creates a new, fully transparent image of the given size, with an
    /// 8-bit color depth.  Panics if `size` is not between 8 and 256
    /// inclusive.
    pub fn new(size: u32) -> IconImage {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            panic!(
                "Invalid icon size (was {}, but must be from {} to {})",
                size, MIN_SIZE, MAX_SIZE
            );
        }
        IconImage {
            size,
            pixels: vec![Pixel::TRANSPARENT; (size * size) as usize],
            color_depth: ColorDepth::default(),
            depth_warning_shown: false,
        }
    }

    /// Returns the empty images that a new icon file starts with: 16x16,
    /// 24x24, 32x32, 48x48, and 64x64.
    pub fn default_set() -> Vec<IconImage> {
        DEFAULT_SIZES.iter().map(|&size| IconImage::new(size)).collect()
    }

    /// Creates an image from RGBA data (row-major, top to bottom) imported
    /// from an external source.  Pixels with zero alpha become transparent;
    /// all others become opaque.  The color depth is then chosen from the
    /// colors used, as with a decoded image.  Panics if `size` is out of
    /// range or if `rgba_data` is not `4 * size * size` bytes long.
    pub fn from_rgba_data(
        size: u32,
        rgba_data: &[u8],
        palette: &Palette16,
    ) -> IconImage {
        let mut image = IconImage::new(size);
        let expected_data_len = image.pixels.len() * 4;
        if rgba_data.len() != expected_data_len {
            panic!(
                "Invalid data length (was {}, but must be {} for {}x{} image)",
                rgba_data.len(),
                expected_data_len,
                size,
                size
            );
        }
        for (pixel, rgba) in
            image.pixels.iter_mut().zip(rgba_data.chunks_exact(4))
        {
            if rgba[3] != 0 {
                *pixel = Pixel::solid(Color::new(rgba[0], rgba[1], rgba[2]));
            }
        }
        image.reclassify(palette);
        image
    }

    /// Returns the width (and height) of the image, in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns all pixels in row-major order, from the top row down.
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Returns the pixel at column `x` of row `y` (row 0 is the top).
    /// Panics if the coordinates are out of range.
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        self.pixels[self.offset(x, y)]
    }

    /// Replaces the pixel at column `x` of row `y`.  Transparent pixels are
    /// always stored as black.  Panics if the coordinates are out of range.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Pixel) {
        let offset = self.offset(x, y);
        self.pixels[offset] =
            if pixel.opaque { pixel } else { Pixel::TRANSPARENT };
    }

    /// Paints one opaque pixel.
    pub fn paint(&mut self, x: u32, y: u32, color: Color) {
        self.set_pixel(x, y, Pixel::solid(color));
    }

    /// Makes one pixel transparent.
    pub fn erase(&mut self, x: u32, y: u32) {
        self.set_pixel(x, y, Pixel::TRANSPARENT);
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        if x >= self.size || y >= self.size {
            panic!(
                "Pixel ({}, {}) is outside of {}x{} image",
                x, y, self.size, self.size
            );
        }
        (y * self.size + x) as usize
    }

    fn row(&self, y: usize) -> &[Pixel] {
        let size = self.size as usize;
        &self.pixels[(y * size)..][..size]
    }

    /// Returns the color depth this image will be drawn and encoded at.
    pub fn color_depth(&self) -> ColorDepth {
        self.color_depth
    }

    /// Overrides the color depth this image will be drawn and encoded at.
    pub fn set_color_depth(&mut self, depth: ColorDepth) {
        self.color_depth = depth;
    }

    /// Returns true if the encoder has already raised a depth mismatch for
    /// this image.
    pub fn depth_warning_shown(&self) -> bool {
        self.depth_warning_shown
    }

    /// Sets or clears the one-shot depth mismatch flag.
    pub fn set_depth_warning_shown(&mut self, shown: bool) {
        self.depth_warning_shown = shown;
    }

    /// Returns true if the image has no opaque pixels.
    pub fn is_empty(&self) -> bool {
        !self.pixels.iter().any(|pixel| pixel.opaque)
    }

    /// Returns the color depth suggested by the colors in this image.
    pub fn classify(&self, palette: &Palette16) -> ColorDepth {
        palette::classify(&self.pixels, palette)
    }

    /// Sets the color depth to the one suggested by the colors in this image.
    pub fn reclassify(&mut self, palette: &Palette16) {
        self.color_depth = self.classify(palette);
    }

    /// Returns the color the pixel at (`x`, `y`) is drawn as at this image's
    /// color depth, or `None` if the pixel is transparent.
    pub fn display_color(
        &self,
        x: u32,
        y: u32,
        palette: &Palette16,
    ) -> Option<Color> {
        let pixel = self.pixel(x, y);
        if pixel.opaque {
            Some(self.color_depth.closest_color(pixel.color, palette))
        } else {
            None
        }
    }

    /// Makes transparent every pixel whose color exactly equals `color`, and
    /// returns how many opaque pixels were erased.
    pub fn erase_color(&mut self, color: Color) -> usize {
        let mut count = 0;
        for pixel in self.pixels.iter_mut() {
            if pixel.color == color {
                if pixel.opaque {
                    count += 1;
                }
                *pixel = Pixel::TRANSPARENT;
            }
        }
        count
    }

    /// Makes every pixel transparent, and resets the color depth and the
    /// depth mismatch flag.
    pub fn clear(&mut self) {
        for pixel in self.pixels.iter_mut() {
            *pixel = Pixel::TRANSPARENT;
        }
        self.color_depth = ColorDepth::default();
        self.depth_warning_shown = false;
    }

    /// Returns the RGBA data for this image, in row-major order from top to
    /// bottom.  Transparent pixels have zero alpha.
    pub fn rgba_data(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in self.pixels.iter() {
            let alpha = if pixel.opaque { u8::MAX } else { 0 };
            let color = pixel.color;
            rgba.extend_from_slice(&[
                color.red,
                color.green,
                color.blue,
                alpha,
            ]);
        }
        rgba
    }

    //=======================================================================//

    /// Decodes an image from a PNG file.  The PNG must be square, between 8
    /// and 256 pixels, and use 8 bits per channel.  Returns an error if the
    /// PNG data is malformed or can't be decoded.
    pub fn read_png<R: Read>(
        reader: R,
        palette: &Palette16,
    ) -> io::Result<IconImage> {
        let decoder = png::Decoder::new(reader);
        let mut png_reader = match decoder.read_info() {
            Ok(png_reader) => png_reader,
            Err(error) => invalid_data!("Malformed PNG data: {}", error),
        };
        let (width, height) = {
            let info = png_reader.info();
            (info.width, info.height)
        };
        if width != height || !(MIN_SIZE..=MAX_SIZE).contains(&width) {
            invalid_data!(
                "Unsupported PNG size (was {}x{}, but must be square and \
                 from {} to {})",
                width,
                height,
                MIN_SIZE,
                MAX_SIZE
            );
        }
        if png_reader.info().bit_depth != png::BitDepth::Eight {
            invalid_data!(
                "Unsupported PNG bit depth: {:?}",
                png_reader.info().bit_depth
            );
        }
        let mut buffer = vec![0u8; png_reader.output_buffer_size()];
        match png_reader.next_frame(&mut buffer) {
            Ok(_) => {}
            Err(error) => invalid_data!("Malformed PNG data: {}", error),
        }
        let num_pixels = (width * height) as usize;
        let rgba_data = match png_reader.info().color_type {
            png::ColorType::Rgba => {
                buffer.truncate(num_pixels * 4);
                buffer
            }
            png::ColorType::Rgb => {
                let mut rgba = Vec::with_capacity(num_pixels * 4);
                for rgb in buffer.chunks_exact(3).take(num_pixels) {
                    rgba.extend_from_slice(rgb);
                    rgba.push(u8::MAX);
                }
                rgba
            }
            png::ColorType::GrayscaleAlpha => {
                let mut rgba = Vec::with_capacity(num_pixels * 4);
                for gray_alpha in buffer.chunks_exact(2).take(num_pixels) {
                    let gray = gray_alpha[0];
                    rgba.extend_from_slice(&[gray, gray, gray, gray_alpha[1]]);
                }
                rgba
            }
            png::ColorType::Grayscale => {
                let mut rgba = Vec::with_capacity(num_pixels * 4);
                for &gray in buffer.iter().take(num_pixels) {
                    rgba.extend_from_slice(&[gray, gray, gray, u8::MAX]);
                }
                rgba
            }
            png::ColorType::Indexed => {
                invalid_data!(
                    "Unsupported PNG color type: {:?}",
                    png_reader.info().color_type
                );
            }
        };
        Ok(IconImage::from_rgba_data(width, &rgba_data, palette))
    }

    /// Encodes the image as an RGBA PNG file, with transparent pixels at zero
    /// alpha.  Colors are written as stored, not quantized to the image's
    /// color depth.
    pub fn write_png<W: Write>(&self, writer: W) -> io::Result<()> {
        match self.write_png_enc(writer) {
            Ok(()) => Ok(()),
            Err(png::EncodingError::IoError(error)) => Err(error),
            Err(png::EncodingError::Format(error)) => {
                invalid_input!("PNG format error: {}", error);
            }
            Err(png::EncodingError::LimitsExceeded) => {
                invalid_input!("PNG limits exceeded");
            }
            Err(png::EncodingError::Parameter(error)) => {
                invalid_input!("PNG parameter error: {}", error);
            }
        }
    }

    fn write_png_enc<W: Write>(
        &self,
        writer: W,
    ) -> Result<(), png::EncodingError> {
        let mut encoder = png::Encoder::new(writer, self.size, self.size);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_color(png::ColorType::Rgba);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.rgba_data())?;
        Ok(())
    }

    //=======================================================================//

    /// Decodes the BMP data of directory entry `index`, whose directory
    /// entry gave a size of `size` and a color count hint of `num_colors`.
    /// The reader must be positioned at the start of the BITMAPINFOHEADER.
    pub(crate) fn read_bmp<R: Read>(
        mut reader: R,
        index: usize,
        size: u32,
        num_colors: u8,
        palette: &Palette16,
    ) -> Result<IconImage, DecodeError> {
        // Read the BITMAPINFOHEADER struct:
        let header_size = read_u31(&mut reader)?;
        if header_size != BMP_HEADER_LEN {
            malformed!(
                Some(index),
                "biSize",
                "Icon entry doesn't match header: index {}, biSize {} \
                 (must be {})",
                index,
                header_size,
                BMP_HEADER_LEN
            );
        }
        let width = read_u31(&mut reader)?;
        if width != size {
            malformed!(
                Some(index),
                "biWidth",
                "Icon entry doesn't match header: index {}, biWidth {} \
                 (must be {})",
                index,
                width,
                size
            );
        }
        // The height is stored doubled, counting the rows of both the color
        // data and the AND mask.
        let height = read_u31(&mut reader)?;
        if height != 2 * size {
            malformed!(
                Some(index),
                "biHeight",
                "Icon entry doesn't match header: index {}, biHeight {} \
                 (must be {})",
                index,
                height,
                2 * size
            );
        }
        let planes = reader.read_u16::<LittleEndian>()?;
        if planes != 1 {
            malformed!(
                Some(index),
                "biPlanes",
                "Icon entry doesn't match header: index {}, biPlanes {} \
                 (must be 1)",
                index,
                planes
            );
        }
        let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
        let _compression = reader.read_u32::<LittleEndian>()?;
        let _image_size = reader.read_u32::<LittleEndian>()?;
        let _horz_ppm = reader.read_i32::<LittleEndian>()?;
        let _vert_ppm = reader.read_i32::<LittleEndian>()?;
        let _colors_used = reader.read_u32::<LittleEndian>()?;
        let _colors_important = reader.read_u32::<LittleEndian>()?;

        let depth = match BmpDepth::from_header(bits_per_pixel, num_colors) {
            Some(depth) => depth,
            None => {
                return Err(DecodeError::UnsupportedEncoding {
                    index,
                    bit_count: bits_per_pixel,
                    color_count: num_colors,
                });
            }
        };

        // Read in the color table:
        let mut color_table = Vec::<Color>::with_capacity(depth.num_colors());
        for _ in 0..depth.num_colors() {
            let blue = reader.read_u8()?;
            let green = reader.read_u8()?;
            let red = reader.read_u8()?;
            let _reserved = reader.read_u8()?;
            color_table.push(Color::new(red, green, blue));
        }

        // Read in the color data, which is stored row by row, starting from
        // the *bottom* row.  Every pixel is opaque until the AND mask says
        // otherwise.
        let mut image = IconImage::new(size);
        let bits_per_pixel = depth.bits_per_pixel();
        let width = size as usize;
        for row in rows::bottom_up(size) {
            let data = rows::read_row(&mut reader, size, bits_per_pixel)?;
            let line = &mut image.pixels[(row * width)..][..width];
            match depth {
                BmpDepth::One | BmpDepth::Four | BmpDepth::Eight => {
                    let indices =
                        rows::unpack_indices(&data, size, bits_per_pixel);
                    for (pixel, index) in line.iter_mut().zip(indices) {
                        *pixel = Pixel::solid(color_table[index as usize]);
                    }
                }
                BmpDepth::TwentyFour => {
                    for (pixel, bgr) in line.iter_mut().zip(data.chunks(3)) {
                        *pixel =
                            Pixel::solid(Color::new(bgr[2], bgr[1], bgr[0]));
                    }
                }
                BmpDepth::ThirtyTwo => {
                    // The alpha byte is ignored.
                    for (pixel, bgra) in line.iter_mut().zip(data.chunks(4)) {
                        let color = Color::new(bgra[2], bgra[1], bgra[0]);
                        *pixel = Pixel::solid(color);
                    }
                }
            }
        }

        // Read in the AND mask (1 bit per pixel, 1 = transparent), which is
        // stored the same way and always wins over the color data:
        for row in rows::bottom_up(size) {
            let data = rows::read_row(&mut reader, size, 1)?;
            let line = &mut image.pixels[(row * width)..][..width];
            let bits = rows::unpack_indices(&data, size, 1);
            for (pixel, bit) in line.iter_mut().zip(bits) {
                if bit == 1 {
                    *pixel = Pixel::TRANSPARENT;
                }
            }
        }

        image.reclassify(palette);
        log::debug!(
            "Decoded icon #{}: {}x{} at {} bpp, classified as {:?}",
            index,
            size,
            size,
            bits_per_pixel,
            image.color_depth
        );
        Ok(image)
    }

    /// Encodes the image as BMP data at its current color depth, with the
    /// given 16-color palette used for 4-bit images.
    pub(crate) fn write_bmp(
        &self,
        palette: &Palette16,
    ) -> io::Result<Vec<u8>> {
        let depth = self.color_depth;
        let size = self.size;
        let bits_per_pixel = depth.bits_per_pixel();

        // Determine the size of the encoded data:
        let color_data_size =
            size as usize * rows::row_stride(size, bits_per_pixel);
        let mask_data_size = size as usize * rows::row_stride(size, 1);
        let data_size = BMP_HEADER_LEN as usize
            + 4 * depth.num_colors()
            + color_data_size
            + mask_data_size;
        let mut data = Vec::<u8>::with_capacity(data_size);

        // Write the BITMAPINFOHEADER struct:
        data.write_u32::<LittleEndian>(BMP_HEADER_LEN)?;
        data.write_i32::<LittleEndian>(size as i32)?;
        data.write_i32::<LittleEndian>(2 * size as i32)?;
        data.write_u16::<LittleEndian>(1)?; // planes
        data.write_u16::<LittleEndian>(bits_per_pixel)?;
        data.write_u32::<LittleEndian>(0)?; // compression
        data.write_u32::<LittleEndian>(
            (color_data_size + mask_data_size) as u32,
        )?; // image size
        data.write_i32::<LittleEndian>(0)?; // horz ppm
        data.write_i32::<LittleEndian>(0)?; // vert ppm
        data.write_u32::<LittleEndian>(0)?; // colors used
        data.write_u32::<LittleEndian>(0)?; // colors important
        debug_assert_eq!(data.len(), BMP_HEADER_LEN as usize);

        // Write the color table:
        let color_table = match depth {
            ColorDepth::Four => palette.colors().to_vec(),
            ColorDepth::Eight => palette::web_safe_palette(),
            ColorDepth::TwentyFour => Vec::new(),
        };
        debug_assert_eq!(color_table.len(), depth.num_colors());
        for color in color_table.iter() {
            data.write_u8(color.blue)?;
            data.write_u8(color.green)?;
            data.write_u8(color.red)?;
            data.write_u8(0)?;
        }

        // Write the color data, bottom row first.  Transparent pixels are
        // written as index 0 (or black, at 24 bpp).
        let mut nearest = HashMap::<Color, u8>::new();
        for row in rows::bottom_up(size) {
            let line = self.row(row);
            let packed: Vec<u8> = match depth {
                ColorDepth::Four => {
                    let indices: Vec<u8> = line
                        .iter()
                        .map(|pixel| {
                            if !pixel.opaque {
                                return 0;
                            }
                            *nearest
                                .entry(pixel.color)
                                .or_insert_with(|| {
                                    palette.nearest_index(pixel.color)
                                })
                        })
                        .collect();
                    rows::pack_indices(&indices, 4)
                }
                ColorDepth::Eight => line
                    .iter()
                    .map(|pixel| {
                        if pixel.opaque {
                            palette::web_safe_index(pixel.color)
                        } else {
                            0
                        }
                    })
                    .collect(),
                ColorDepth::TwentyFour => {
                    let mut bgr = Vec::with_capacity(3 * line.len());
                    for pixel in line.iter() {
                        let color = if pixel.opaque {
                            pixel.color
                        } else {
                            Color::BLACK
                        };
                        bgr.extend_from_slice(&[
                            color.blue,
                            color.green,
                            color.red,
                        ]);
                    }
                    bgr
                }
            };
            rows::write_row(&mut data, &packed, size, bits_per_pixel)?;
        }

        // Write the AND mask, which is laid out the same at every depth:
        for row in rows::bottom_up(size) {
            let bits: Vec<u8> = self
                .row(row)
                .iter()
                .map(|pixel| if pixel.opaque { 0 } else { 1 })
                .collect();
            let packed = rows::pack_indices(&bits, 1);
            rows::write_row(&mut data, &packed, size, 1)?;
        }

        debug_assert_eq!(data.len(), data_size);
        Ok(data)
    }
}

// Reads a little-endian 32-bit value, masked to 31 bits so that it can never
// be mistaken for a negative number.
pub(crate) fn read_u31<R: Read>(reader: &mut R) -> io::Result<u32> {
    Ok(reader.read_u32::<LittleEndian>()? & 0x7fff_ffff)
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{IconImage, MAX_SIZE, MIN_SIZE};
    use crate::color::{Color, ColorDepth, Pixel};
    use crate::error::DecodeError;
    use crate::palette::Palette16;

    #[test]
    fn new_image_is_empty() {
        let image = IconImage::new(16);
        assert_eq!(image.size(), 16);
        assert_eq!(image.pixels().len(), 256);
        assert!(image.is_empty());
        assert_eq!(image.color_depth(), ColorDepth::Eight);
        assert!(!image.depth_warning_shown());
        assert!(image.pixels().iter().all(|&p| p == Pixel::TRANSPARENT));
    }

    #[test]
    fn default_set_sizes() {
        let sizes: Vec<u32> =
            IconImage::default_set().iter().map(|i| i.size()).collect();
        assert_eq!(sizes, vec![16, 24, 32, 48, 64]);
    }

    #[test]
    fn size_limits() {
        let _ = IconImage::new(MIN_SIZE);
        let _ = IconImage::new(MAX_SIZE);
    }

    #[test]
    #[should_panic]
    fn size_too_small() {
        let _ = IconImage::new(MIN_SIZE - 1);
    }

    #[test]
    #[should_panic]
    fn size_too_large() {
        let _ = IconImage::new(MAX_SIZE + 1);
    }

    #[test]
    fn transparent_pixels_are_stored_black() {
        let mut image = IconImage::new(8);
        let hidden = Pixel { color: Color::new(9, 9, 9), opaque: false };
        image.set_pixel(1, 2, hidden);
        assert_eq!(image.pixel(1, 2), Pixel::TRANSPARENT);
        image.paint(1, 2, Color::new(9, 9, 9));
        assert_eq!(image.pixel(1, 2), Pixel::solid(Color::new(9, 9, 9)));
        assert!(!image.is_empty());
        image.erase(1, 2);
        assert!(image.is_empty());
    }

    #[test]
    fn erase_color_counts_opaque_pixels() {
        let mut image = IconImage::new(8);
        let red = Color::new(255, 0, 0);
        image.paint(0, 0, red);
        image.paint(7, 7, red);
        image.paint(3, 3, Color::new(0, 0, 255));
        assert_eq!(image.erase_color(red), 2);
        assert_eq!(image.pixel(0, 0), Pixel::TRANSPARENT);
        assert_eq!(image.pixel(3, 3), Pixel::solid(Color::new(0, 0, 255)));
        // Transparent pixels are black, but aren't counted.
        assert_eq!(image.erase_color(Color::BLACK), 0);
    }

    #[test]
    fn clear_resets_image() {
        let mut image = IconImage::new(8);
        image.paint(4, 4, Color::new(1, 2, 3));
        image.set_color_depth(ColorDepth::TwentyFour);
        image.set_depth_warning_shown(true);
        image.clear();
        assert!(image.is_empty());
        assert_eq!(image.color_depth(), ColorDepth::Eight);
        assert!(!image.depth_warning_shown());
    }

    #[test]
    fn display_color_follows_depth() {
        let palette = Palette16::default();
        let mut image = IconImage::new(8);
        image.paint(0, 0, Color::new(250, 10, 130));
        assert_eq!(image.display_color(1, 0, &palette), None);
        assert_eq!(
            image.display_color(0, 0, &palette),
            Some(Color::new(255, 0, 153))
        );
        image.set_color_depth(ColorDepth::TwentyFour);
        assert_eq!(
            image.display_color(0, 0, &palette),
            Some(Color::new(250, 10, 130))
        );
    }

    #[test]
    fn rgba_import_classifies_depth() {
        let palette = Palette16::default();
        let mut rgba = vec![0u8; 8 * 8 * 4];
        rgba[0..4].copy_from_slice(&[255, 0, 0, 255]);
        rgba[4..8].copy_from_slice(&[12, 34, 56, 0]);
        let image = IconImage::from_rgba_data(8, &rgba, &palette);
        assert_eq!(image.pixel(0, 0), Pixel::solid(Color::new(255, 0, 0)));
        assert_eq!(image.pixel(1, 0), Pixel::TRANSPARENT);
        assert_eq!(image.color_depth(), ColorDepth::Four);
        let mut rgba_out = rgba.clone();
        rgba_out[4..8].copy_from_slice(&[0, 0, 0, 0]);
        assert_eq!(image.rgba_data(), rgba_out);
    }

    #[test]
    fn png_round_trip() {
        let palette = Palette16::default();
        let mut image = IconImage::new(8);
        image.paint(2, 5, Color::new(10, 20, 30));
        image.paint(7, 0, Color::new(255, 255, 255));
        let mut png = Vec::<u8>::new();
        image.write_png(&mut png).unwrap();
        let decoded = IconImage::read_png(png.as_slice(), &palette).unwrap();
        assert_eq!(decoded.pixels(), image.pixels());
        assert_eq!(decoded.color_depth(), ColorDepth::TwentyFour);
    }

    #[test]
    fn write_bmp_header() {
        let palette = Palette16::default();
        let mut image = IconImage::new(8);
        image.set_color_depth(ColorDepth::TwentyFour);
        let data = image.write_bmp(&palette).unwrap();
        // 40-byte header, 8 rows of 24 color bytes, 8 rows of 4 mask bytes.
        assert_eq!(data.len(), 40 + 8 * 24 + 8 * 4);
        let expected_header: &[u8] = b"\
            \x28\x00\x00\x00\x08\x00\x00\x00\x10\x00\x00\x00\
            \x01\x00\x18\x00\x00\x00\x00\x00\xe0\x00\x00\x00\
            \x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
            \x00\x00\x00\x00";
        assert_eq!(&data[..40], expected_header);
        // Everything is transparent: black color data, all-ones mask bits.
        assert!(data[40..(40 + 8 * 24)].iter().all(|&b| b == 0));
        assert_eq!(&data[(40 + 8 * 24)..][..4], b"\xff\x00\x00\x00");
    }

    #[test]
    fn read_bmp_rejects_bad_planes() {
        let palette = Palette16::default();
        let mut data = IconImage::new(8).write_bmp(&palette).unwrap();
        data[12] = 2; // biPlanes
        match IconImage::read_bmp(data.as_slice(), 4, 8, 0, &palette) {
            Err(DecodeError::Structural { index, field, .. }) => {
                assert_eq!(index, Some(4));
                assert_eq!(field, "biPlanes");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn read_bmp_rejects_height_mismatch() {
        let palette = Palette16::default();
        let mut data = IconImage::new(8).write_bmp(&palette).unwrap();
        data[8] = 8; // biHeight, should be 16
        let error = IconImage::read_bmp(data.as_slice(), 0, 8, 0, &palette)
            .unwrap_err();
        assert_eq!(error.field(), Some("biHeight"));
    }

    #[test]
    fn read_bmp_rejects_unsupported_depth() {
        let palette = Palette16::default();
        let data = IconImage::new(8).write_bmp(&palette).unwrap();
        // An 8-bit image must have a color count hint of zero.
        match IconImage::read_bmp(data.as_slice(), 1, 8, 16, &palette) {
            Err(DecodeError::UnsupportedEncoding {
                index: 1,
                bit_count: 8,
                color_count: 16,
            }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn read_bmp_truncated_data() {
        let palette = Palette16::default();
        let data = IconImage::new(8).write_bmp(&palette).unwrap();
        let truncated = &data[..(data.len() - 1)];
        match IconImage::read_bmp(truncated, 0, 8, 0, &palette) {
            Err(DecodeError::Io(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

//===========================================================================//
