use std::io::{Read, Write};

use crate::{
    encode_blocks, encoded_size, padded_dimension, ImageFormat, PixelSource, ReadPkmError,
    Surface, WritePkmError,
};

/// The byte string prefix of every PKM file.
pub const MAGIC: [u8; 4] = *b"PKM ";

/// The 16-byte header of a PKM file.
///
/// The header stores both the padded dimensions of the block grid and the
/// original image dimensions, so decoders can crop away the padding.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PkmHeader {
    pub image_format: ImageFormat,
    /// Image width in pixels before block padding.
    pub width: u32,
    /// Image height in pixels before block padding.
    pub height: u32,
}

impl PkmHeader {
    /// Parse and validate a 16-byte PKM header.
    ///
    /// Every field is checked: magic, version byte, the reserved bytes at
    /// offsets 5 and 6 (which must be 0x30 and 0x00; other writers are
    /// rejected), the format byte, agreement between the version and format
    /// bytes, and consistency of the padded and original dimensions.
    pub fn from_bytes(buf: &[u8; 16]) -> Result<PkmHeader, ReadPkmError> {
        if buf[0..4] != MAGIC || buf[5] != 0x30 || buf[6] != 0x00 {
            return Err(ReadPkmError::NotAPkmFile);
        }

        let etc_version = match buf[4] {
            0x31 | 0x32 => buf[4] & 0x03,
            _ => return Err(ReadPkmError::NotAPkmFile),
        };

        let image_format =
            ImageFormat::from_pkm_format_byte(buf[7]).ok_or(ReadPkmError::NotAPkmFile)?;
        if image_format.etc_version() != etc_version {
            return Err(ReadPkmError::NotAPkmFile);
        }

        let padded_width = u32::from(u16::from_be_bytes([buf[8], buf[9]]));
        let padded_height = u32::from(u16::from_be_bytes([buf[10], buf[11]]));
        let width = u32::from(u16::from_be_bytes([buf[12], buf[13]]));
        let height = u32::from(u16::from_be_bytes([buf[14], buf[15]]));

        if padded_dimension(width) != padded_width || padded_dimension(height) != padded_height {
            return Err(ReadPkmError::NotAPkmFile);
        }

        Ok(PkmHeader {
            image_format,
            width,
            height,
        })
    }

    pub fn to_bytes(&self) -> [u8; 16] {
        let mut buf = [0u8; 16];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4] = 0x30 | self.image_format.etc_version();
        buf[5] = 0x30;
        buf[6] = 0x00;
        buf[7] = self.image_format.pkm_format_byte();
        buf[8..10].copy_from_slice(&(padded_dimension(self.width) as u16).to_be_bytes());
        buf[10..12].copy_from_slice(&(padded_dimension(self.height) as u16).to_be_bytes());
        buf[12..14].copy_from_slice(&(self.width as u16).to_be_bytes());
        buf[14..16].copy_from_slice(&(self.height as u16).to_be_bytes());
        buf
    }
}

/// Read a PKM file into an encoded surface.
///
/// Note that ETC1 format bytes always parse as [ImageFormat::Etc1]; the
/// constrained [ImageFormat::Etc1S] exists only on the encoding side.
pub fn read_pkm<R: Read>(mut reader: R) -> Result<Surface<Vec<u8>>, ReadPkmError> {
    let mut header_bytes = [0u8; 16];
    reader.read_exact(&mut header_bytes)?;
    let header = PkmHeader::from_bytes(&header_bytes)?;

    let mut data = vec![0u8; encoded_size(header.width, header.height, header.image_format)];
    reader.read_exact(&mut data)?;

    Ok(Surface {
        width: header.width,
        height: header.height,
        image_format: header.image_format,
        data,
    })
}

/// Write an encoded surface as a PKM file.
pub fn write_pkm<W: Write, T: AsRef<[u8]>>(
    mut writer: W,
    surface: &Surface<T>,
) -> Result<(), WritePkmError> {
    surface.validate()?;

    let header = PkmHeader {
        image_format: surface.image_format,
        width: surface.width,
        height: surface.height,
    };
    writer.write_all(&header.to_bytes())?;
    let expected = encoded_size(surface.width, surface.height, surface.image_format);
    writer.write_all(&surface.data.as_ref()[..expected])?;
    Ok(())
}

/// Encode `source` to `format` and stream the result out as a PKM file.
pub fn encode_pkm<S: PixelSource, W: Write>(
    source: &S,
    format: ImageFormat,
    mut writer: W,
) -> Result<(), WritePkmError> {
    let (width, height) = source.dimensions();
    crate::validate_dimensions(width, height)?;

    let header = PkmHeader {
        image_format: format,
        width,
        height,
    };
    writer.write_all(&header.to_bytes())?;
    encode_blocks(source, format, writer)?;
    Ok(())
}

/// Encode `image` to `format` and return the bytes of a PKM file.
#[cfg(feature = "image")]
pub fn pkm_from_image(
    image: &image::RgbaImage,
    format: ImageFormat,
) -> Result<Vec<u8>, WritePkmError> {
    let surface = crate::SurfaceRgba8::from_image(image);
    let mut data = Vec::new();
    encode_pkm(&surface, format, &mut data)?;
    Ok(data)
}

/// Decode a PKM file to an RGBA8 image cropped to its original dimensions.
#[cfg(feature = "image")]
pub fn image_from_pkm(data: &[u8]) -> Result<image::RgbaImage, crate::CreateImageError> {
    let surface = read_pkm(data)?;
    let decoded = surface.decode_rgba8()?;
    decoded.cropped(surface.width, surface.height).to_image()
}
