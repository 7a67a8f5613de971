//! Surface formats.

/// Pixel encoding stored in a texture asset.
///
/// The numbering follows the engine's `SurfaceFormat` enumeration. Codes
/// without a decoder are kept as [`SurfaceFormat::Other`] so they survive a
/// read/write cycle untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceFormat {
    /// 32-bit RGBA, one byte per channel.
    Color,
    /// BC3 block compression, 16 bytes per 4x4 block.
    Dxt5,
    /// Two bytes per pixel: luminance then alpha.
    LuminanceAlpha8,
    /// One byte per pixel: alpha only.
    Alpha8,
    /// BC7 (BPTC) block compression, 16 bytes per 4x4 block.
    Bc7,
    /// Any other engine format code.
    Other(i32),
}

impl SurfaceFormat {
    /// Wire code of `Color`.
    pub const COLOR: i32 = 0;
    /// Wire code of `Dxt5`.
    pub const DXT5: i32 = 6;
    /// Wire code of `LuminanceAlpha8`.
    pub const LUMINANCE_ALPHA8: i32 = 7;
    /// Wire code of `Alpha8`.
    pub const ALPHA8: i32 = 12;
    /// Wire code of `Bc7`.
    pub const BC7: i32 = 23;

    /// Map a wire code to a format.
    pub fn from_code(code: i32) -> Self {
        match code {
            Self::COLOR => Self::Color,
            Self::DXT5 => Self::Dxt5,
            Self::LUMINANCE_ALPHA8 => Self::LuminanceAlpha8,
            Self::ALPHA8 => Self::Alpha8,
            Self::BC7 => Self::Bc7,
            other => Self::Other(other),
        }
    }

    /// The wire code of this format.
    pub fn code(self) -> i32 {
        match self {
            Self::Color => Self::COLOR,
            Self::Dxt5 => Self::DXT5,
            Self::LuminanceAlpha8 => Self::LUMINANCE_ALPHA8,
            Self::Alpha8 => Self::ALPHA8,
            Self::Bc7 => Self::BC7,
            Self::Other(code) => code,
        }
    }

    /// Whether the format stores 4x4 pixel blocks.
    pub fn is_block_compressed(self) -> bool {
        matches!(self, Self::Dxt5 | Self::Bc7)
    }

    /// Bytes per pixel for uncompressed formats, `None` for block formats
    /// and unknown codes.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            Self::Color => Some(4),
            Self::LuminanceAlpha8 => Some(2),
            Self::Alpha8 => Some(1),
            _ => None,
        }
    }

    /// Expected encoded size of one surface, if the format is known.
    pub fn encoded_size(self, width: usize, height: usize) -> Option<usize> {
        if self.is_block_compressed() {
            return Some(block_grid_size(width, height, 16));
        }
        self.bytes_per_pixel()
            .and_then(|bpp| width.checked_mul(height)?.checked_mul(bpp))
    }
}

/// Size in bytes of a block-compressed surface.
///
/// Dimensions are rounded up to whole 4x4 blocks.
pub fn block_grid_size(width: usize, height: usize, block_size: usize) -> usize {
    let blocks_x = (width + 3) / 4;
    let blocks_y = (height + 3) / 4;
    blocks_x * blocks_y * block_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_roundtrip_including_unknown() {
        for code in [0, 6, 7, 12, 23, 4, 99] {
            assert_eq!(SurfaceFormat::from_code(code).code(), code);
        }
        assert_eq!(SurfaceFormat::from_code(4), SurfaceFormat::Other(4));
    }

    #[test]
    fn test_block_grid_size() {
        assert_eq!(block_grid_size(1, 1, 16), 16);
        assert_eq!(block_grid_size(4, 4, 16), 16);
        assert_eq!(block_grid_size(5, 8, 16), 64);
        assert_eq!(block_grid_size(1024, 1024, 16), 1024 * 1024);
    }

    #[test]
    fn test_encoded_size() {
        assert_eq!(SurfaceFormat::Color.encoded_size(3, 2), Some(24));
        assert_eq!(SurfaceFormat::Alpha8.encoded_size(3, 2), Some(6));
        assert_eq!(SurfaceFormat::Bc7.encoded_size(6, 6), Some(64));
        assert_eq!(SurfaceFormat::Other(4).encoded_size(4, 4), None);
    }
}
