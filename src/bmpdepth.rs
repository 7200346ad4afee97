use crate::color::ColorDepth;

//===========================================================================//

/// The pixel formats accepted when reading a BMP-encoded ICO entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BmpDepth {
    One,
    Four,
    Eight,
    TwentyFour,
    ThirtyTwo,
}

impl BmpDepth {
    /// Selects the pixel format from the bitmap header's bit count and the
    /// directory entry's color count hint.  Returns `None` for any
    /// combination this codec doesn't read.
    pub(crate) fn from_header(
        bits_per_pixel: u16,
        num_colors: u8,
    ) -> Option<BmpDepth> {
        match (bits_per_pixel, num_colors) {
            (1, 0) | (1, 2) => Some(BmpDepth::One),
            (4, 0) | (4, 16) => Some(BmpDepth::Four),
            (8, 0) => Some(BmpDepth::Eight),
            (24, 0) => Some(BmpDepth::TwentyFour),
            (32, 0) => Some(BmpDepth::ThirtyTwo),
            _ => None,
        }
    }

    pub(crate) fn bits_per_pixel(&self) -> u16 {
        match *self {
            BmpDepth::One => 1,
            BmpDepth::Four => 4,
            BmpDepth::Eight => 8,
            BmpDepth::TwentyFour => 24,
            BmpDepth::ThirtyTwo => 32,
        }
    }

    /// Returns the number of entries in the color table preceding the pixel
    /// data.
    pub(crate) fn num_colors(&self) -> usize {
        match *self {
            BmpDepth::One => 2,
            BmpDepth::Four => 16,
            BmpDepth::Eight => 256,
            BmpDepth::TwentyFour | BmpDepth::ThirtyTwo => 0,
        }
    }
}

impl From<ColorDepth> for BmpDepth {
    fn from(depth: ColorDepth) -> BmpDepth {
        match depth {
            ColorDepth::Four => BmpDepth::Four,
            ColorDepth::Eight => BmpDepth::Eight,
            ColorDepth::TwentyFour => BmpDepth::TwentyFour,
        }
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::BmpDepth;
    use crate::color::ColorDepth;

    #[test]
    fn supported_combinations() {
        assert_eq!(BmpDepth::from_header(1, 0), Some(BmpDepth::One));
        assert_eq!(BmpDepth::from_header(1, 2), Some(BmpDepth::One));
        assert_eq!(BmpDepth::from_header(4, 0), Some(BmpDepth::Four));
        assert_eq!(BmpDepth::from_header(4, 16), Some(BmpDepth::Four));
        assert_eq!(BmpDepth::from_header(8, 0), Some(BmpDepth::Eight));
        assert_eq!(BmpDepth::from_header(24, 0), Some(BmpDepth::TwentyFour));
        assert_eq!(BmpDepth::from_header(32, 0), Some(BmpDepth::ThirtyTwo));
    }

    #[test]
    fn unsupported_combinations() {
        assert_eq!(BmpDepth::from_header(1, 16), None);
        assert_eq!(BmpDepth::from_header(4, 8), None);
        assert_eq!(BmpDepth::from_header(8, 255), None);
        assert_eq!(BmpDepth::from_header(16, 0), None);
        assert_eq!(BmpDepth::from_header(24, 16), None);
        assert_eq!(BmpDepth::from_header(0, 0), None);
    }

    #[test]
    fn color_depths_map_to_bmp_depths() {
        let depths =
            &[ColorDepth::Four, ColorDepth::Eight, ColorDepth::TwentyFour];
        for &depth in depths.iter() {
            let bmp_depth = BmpDepth::from(depth);
            assert_eq!(bmp_depth.bits_per_pixel(), depth.bits_per_pixel());
            assert_eq!(bmp_depth.num_colors(), depth.num_colors());
        }
    }
}

//===========================================================================//
