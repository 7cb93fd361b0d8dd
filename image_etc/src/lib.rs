//! # Introduction
//! ETC (Ericsson Texture Compression) is the block-based lossy texture format
//! mandated by OpenGL ES and supported by Vulkan on mobile hardware. Every
//! 4x4 pixel block compresses independently to 8 or 16 bytes, so textures
//! have a fixed compression ratio and can be decoded in hardware.
//!
//! image_etc encodes uncompressed RGBA surfaces to any of the ETC1 and ETC2
//! sub-formats, including the EAC alpha and 11-bit variants, and decodes them
//! back. Encoded data round-trips through the 16-byte PKM container commonly
//! used for single ETC textures. The KTX container can also hold ETC data but
//! is not implemented here.
//!
//! The encoder searches the sub-modes of each block (individual, differential,
//! T, H and planar for color) and keeps the candidate whose decoded output
//! minimizes a BT.601-weighted squared error, so output quality matches
//! reference encoders. Block decoding itself is provided by the companion
//! [etcdec_rs] crate, which the encoder also uses to score candidates.
//!
//! # Features
//! The `"image"` feature (enabled by default) adds conversions to and from
//! [image::RgbaImage]. Surface data can always be encoded and decoded with
//! the lower level functions, which is ideal for libraries that want to skip
//! intermediate image types.
//!
//! # Limitations
//! Mipmaps, array layers and cube maps are not supported; a PKM file holds a
//! single 2D texture. Encoding is deterministic but not real-time.
use strum::EnumIter;

mod decode;
mod encode;
mod error;
mod etc;
mod extract;
mod pkm;
mod surface;

pub use decode::*;
pub use encode::*;
pub use error::*;
pub use extract::{PixelSource, Premultiplied};
pub use pkm::*;
pub use surface::*;

/// The widest and tallest image that still block-aligns below 65536.
pub const MAX_DIMENSION: u32 = 65532;

/// A format's transparency model.
///
/// The names in the ETC documentation use non-premultiplied alpha; so do the
/// surfaces in this crate.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AlphaModel {
    /// Pixels decode fully opaque.
    Opaque,
    /// Punchthrough: pixels are either opaque or fully transparent black.
    OneBit,
    /// A separate EAC codeword stores 8-bit alpha.
    EightBit,
}

/// Supported texture formats for encoding and decoding.
///
/// The numbering of the PKM container is exposed through
/// [ImageFormat::pkm_format_byte]. [ImageFormat::Etc1S] is an encode-only
/// constrained subset of ETC1 (shared base color and modifier table for both
/// half-blocks) and is written to PKM files as plain ETC1.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, EnumIter)]
pub enum ImageFormat {
    Etc1,
    Etc1S,
    Etc2Rgb,
    Etc2Srgb,
    Etc2Rgba8,
    Etc2Srgba8,
    Etc2Rgba1,
    Etc2Srgba1,
    EacR11Unorm,
    EacR11Snorm,
    EacRg11Unorm,
    EacRg11Snorm,
}

impl ImageFormat {
    /// The number of bytes used to encode each 4x4 pixel block.
    pub fn block_size_in_bytes(&self) -> usize {
        match self {
            ImageFormat::Etc1
            | ImageFormat::Etc1S
            | ImageFormat::Etc2Rgb
            | ImageFormat::Etc2Srgb
            | ImageFormat::Etc2Rgba1
            | ImageFormat::Etc2Srgba1
            | ImageFormat::EacR11Unorm
            | ImageFormat::EacR11Snorm => 8,
            ImageFormat::Etc2Rgba8
            | ImageFormat::Etc2Srgba8
            | ImageFormat::EacRg11Unorm
            | ImageFormat::EacRg11Snorm => 16,
        }
    }

    /// Returns 1 for the ETC1 family and 2 for the ETC2 family.
    pub fn etc_version(&self) -> u8 {
        match self {
            ImageFormat::Etc1 | ImageFormat::Etc1S => 1,
            _ => 2,
        }
    }

    /// The format byte stored at offset 7 of a PKM header.
    pub fn pkm_format_byte(&self) -> u8 {
        match self {
            ImageFormat::Etc1 | ImageFormat::Etc1S => 0x00,
            ImageFormat::Etc2Rgb => 0x01,
            ImageFormat::Etc2Rgba8 => 0x03,
            ImageFormat::Etc2Rgba1 => 0x04,
            ImageFormat::EacR11Unorm => 0x05,
            ImageFormat::EacRg11Unorm => 0x06,
            ImageFormat::EacR11Snorm => 0x07,
            ImageFormat::EacRg11Snorm => 0x08,
            ImageFormat::Etc2Srgb => 0x09,
            ImageFormat::Etc2Srgba8 => 0x0A,
            ImageFormat::Etc2Srgba1 => 0x0B,
        }
    }

    /// The format for a PKM header format byte.
    ///
    /// Returns [None] for unassigned bytes, including the reserved value 0x02.
    pub fn from_pkm_format_byte(byte: u8) -> Option<ImageFormat> {
        match byte {
            0x00 => Some(ImageFormat::Etc1),
            0x01 => Some(ImageFormat::Etc2Rgb),
            0x03 => Some(ImageFormat::Etc2Rgba8),
            0x04 => Some(ImageFormat::Etc2Rgba1),
            0x05 => Some(ImageFormat::EacR11Unorm),
            0x06 => Some(ImageFormat::EacRg11Unorm),
            0x07 => Some(ImageFormat::EacR11Snorm),
            0x08 => Some(ImageFormat::EacRg11Snorm),
            0x09 => Some(ImageFormat::Etc2Srgb),
            0x0A => Some(ImageFormat::Etc2Srgba8),
            0x0B => Some(ImageFormat::Etc2Srgba1),
            _ => None,
        }
    }

    /// The OpenGL internalFormat enum for this format, suitable for
    /// glCompressedTexImage2D.
    pub fn gl_internal_format(&self) -> u32 {
        match self {
            ImageFormat::Etc1 | ImageFormat::Etc1S => 0x8D64, // GL_ETC1_RGB8_OES
            ImageFormat::Etc2Rgb => 0x9274,                   // GL_COMPRESSED_RGB8_ETC2
            ImageFormat::Etc2Srgb => 0x9275,                  // GL_COMPRESSED_SRGB8_ETC2
            ImageFormat::Etc2Rgba8 => 0x9278,                 // GL_COMPRESSED_RGBA8_ETC2_EAC
            ImageFormat::Etc2Srgba8 => 0x9279, // GL_COMPRESSED_SRGB8_ALPHA8_ETC2_EAC
            ImageFormat::Etc2Rgba1 => 0x9276,  // GL_COMPRESSED_RGB8_PUNCHTHROUGH_ALPHA1_ETC2
            ImageFormat::Etc2Srgba1 => 0x9277, // GL_COMPRESSED_SRGB8_PUNCHTHROUGH_ALPHA1_ETC2
            ImageFormat::EacR11Unorm => 0x9270, // GL_COMPRESSED_R11_EAC
            ImageFormat::EacR11Snorm => 0x9271, // GL_COMPRESSED_SIGNED_R11_EAC
            ImageFormat::EacRg11Unorm => 0x9272, // GL_COMPRESSED_RG11_EAC
            ImageFormat::EacRg11Snorm => 0x9273, // GL_COMPRESSED_SIGNED_RG11_EAC
        }
    }

    /// The format's transparency model.
    pub fn alpha_model(&self) -> AlphaModel {
        match self {
            ImageFormat::Etc2Rgba8 | ImageFormat::Etc2Srgba8 => AlphaModel::EightBit,
            ImageFormat::Etc2Rgba1 | ImageFormat::Etc2Srgba1 => AlphaModel::OneBit,
            _ => AlphaModel::Opaque,
        }
    }

    /// Whether blocks carry a separate 11-bit channel payload instead of color.
    pub(crate) fn is_eac11(&self) -> bool {
        matches!(
            self,
            ImageFormat::EacR11Unorm
                | ImageFormat::EacR11Snorm
                | ImageFormat::EacRg11Unorm
                | ImageFormat::EacRg11Snorm
        )
    }

    pub(crate) fn is_eac11_signed(&self) -> bool {
        matches!(self, ImageFormat::EacR11Snorm | ImageFormat::EacRg11Snorm)
    }

    pub(crate) fn is_eac11_two_channel(&self) -> bool {
        matches!(self, ImageFormat::EacRg11Unorm | ImageFormat::EacRg11Snorm)
    }
}

/// Rounds a dimension up to the 4-pixel block grid.
pub fn padded_dimension(dimension: u32) -> u32 {
    (dimension + 3) & !3
}

/// The number of bytes in the encoded block stream for an image of the given size.
pub(crate) fn encoded_size(width: u32, height: u32, format: ImageFormat) -> usize {
    let blocks_x = padded_dimension(width) as usize / 4;
    let blocks_y = padded_dimension(height) as usize / 4;
    blocks_x * blocks_y * format.block_size_in_bytes()
}

pub(crate) fn validate_dimensions(width: u32, height: u32) -> Result<(), SurfaceError> {
    if width == 0 || height == 0 {
        return Err(SurfaceError::ZeroSizedSurface { width, height });
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(SurfaceError::SurfaceTooLarge { width, height });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn padded_dimensions() {
        assert_eq!(0, padded_dimension(0));
        assert_eq!(4, padded_dimension(1));
        assert_eq!(4, padded_dimension(4));
        assert_eq!(24, padded_dimension(21));
        assert_eq!(65532, padded_dimension(65532));
    }

    #[test]
    fn block_sizes_match_alpha_and_channel_count() {
        // 8-bit alpha and two 11-bit channels need a second 64-bit codeword.
        for format in ImageFormat::iter() {
            let expected = if format.alpha_model() == AlphaModel::EightBit
                || format.is_eac11_two_channel()
            {
                16
            } else {
                8
            };
            assert_eq!(expected, format.block_size_in_bytes());
        }
    }

    #[test]
    fn alpha_models() {
        assert_eq!(AlphaModel::Opaque, ImageFormat::Etc1.alpha_model());
        assert_eq!(AlphaModel::Opaque, ImageFormat::EacRg11Snorm.alpha_model());
        assert_eq!(AlphaModel::OneBit, ImageFormat::Etc2Srgba1.alpha_model());
        assert_eq!(AlphaModel::EightBit, ImageFormat::Etc2Rgba8.alpha_model());
    }

    #[test]
    fn pkm_format_bytes_round_trip() {
        for format in ImageFormat::iter() {
            let byte = format.pkm_format_byte();
            let expected = if format == ImageFormat::Etc1S {
                ImageFormat::Etc1
            } else {
                format
            };
            assert_eq!(Some(expected), ImageFormat::from_pkm_format_byte(byte));
        }
        assert_eq!(None, ImageFormat::from_pkm_format_byte(0x02));
        assert_eq!(None, ImageFormat::from_pkm_format_byte(0x0C));
    }

    #[test]
    fn dimension_validation() {
        assert!(validate_dimensions(1, 1).is_ok());
        assert!(validate_dimensions(65532, 65532).is_ok());
        assert!(matches!(
            validate_dimensions(0, 16),
            Err(SurfaceError::ZeroSizedSurface {
                width: 0,
                height: 16
            })
        ));
        assert!(matches!(
            validate_dimensions(65533, 16),
            Err(SurfaceError::SurfaceTooLarge {
                width: 65533,
                height: 16
            })
        ));
    }
}
