use crate::{encoded_size, validate_dimensions, ImageFormat, SurfaceError};

/// A surface of encoded blocks with a format known at runtime.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Surface<T> {
    /// The width of the surface in pixels before block padding.
    pub width: u32,
    /// The height of the surface in pixels before block padding.
    pub height: u32,
    /// The format of the blocks in [data](#structfield.data).
    pub image_format: ImageFormat,
    /// The encoded blocks in raster order with no padding between blocks.
    pub data: T,
}

impl<T: AsRef<[u8]>> Surface<T> {
    pub(crate) fn validate(&self) -> Result<(), SurfaceError> {
        validate_dimensions(self.width, self.height)?;

        let expected = encoded_size(self.width, self.height, self.image_format);
        if self.data.as_ref().len() < expected {
            return Err(SurfaceError::NotEnoughData {
                expected,
                actual: self.data.as_ref().len(),
            });
        }

        Ok(())
    }
}

impl<T> Surface<Vec<T>> {
    /// Convert to a surface with borrowed data.
    pub fn as_ref(&self) -> Surface<&[T]> {
        Surface {
            width: self.width,
            height: self.height,
            image_format: self.image_format,
            data: self.data.as_ref(),
        }
    }
}

/// An uncompressed surface with 4 bytes per pixel in RGBA order.
///
/// Alpha is straight (non-premultiplied). Wrap the surface in
/// [crate::Premultiplied] if the data uses premultiplied alpha.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SurfaceRgba8<T> {
    /// The width of the surface in pixels.
    pub width: u32,
    /// The height of the surface in pixels.
    pub height: u32,
    /// The image data for the surface.
    pub data: T,
}

/// An uncompressed surface with 4 `u16` channels per pixel in RGBA order.
///
/// This is the natural source type for the 11-bit EAC formats, which encode
/// from the full 16-bit channel domain.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SurfaceRgba16<T> {
    /// The width of the surface in pixels.
    pub width: u32,
    /// The height of the surface in pixels.
    pub height: u32,
    /// The image data for the surface.
    pub data: T,
}

impl<T: AsRef<[u8]>> SurfaceRgba8<T> {
    pub(crate) fn validate(&self) -> Result<(), SurfaceError> {
        validate_dimensions(self.width, self.height)?;
        validate_pixel_count(self.width, self.height, self.data.as_ref().len())
    }
}

impl<T: AsRef<[u16]>> SurfaceRgba16<T> {
    pub(crate) fn validate(&self) -> Result<(), SurfaceError> {
        validate_dimensions(self.width, self.height)?;
        validate_pixel_count(self.width, self.height, self.data.as_ref().len())
    }
}

fn validate_pixel_count(width: u32, height: u32, actual: usize) -> Result<(), SurfaceError> {
    let expected = width as usize * height as usize * 4;
    if actual < expected {
        Err(SurfaceError::NotEnoughData { expected, actual })
    } else {
        Ok(())
    }
}

impl SurfaceRgba8<Vec<u8>> {
    /// Copy the top-left `width` x `height` pixels into a new surface.
    ///
    /// Decoded surfaces cover the full block grid; this trims the padding
    /// back to the dimensions stored in a container header.
    pub fn cropped(&self, width: u32, height: u32) -> SurfaceRgba8<Vec<u8>> {
        SurfaceRgba8 {
            width,
            height,
            data: crop_rows(self.width, width, height, 4, &self.data),
        }
    }
}

impl SurfaceRgba16<Vec<u16>> {
    /// Copy the top-left `width` x `height` pixels into a new surface.
    pub fn cropped(&self, width: u32, height: u32) -> SurfaceRgba16<Vec<u16>> {
        SurfaceRgba16 {
            width,
            height,
            data: crop_rows(self.width, width, height, 4, &self.data),
        }
    }
}

fn crop_rows<P: Copy>(
    source_width: u32,
    width: u32,
    height: u32,
    channels: usize,
    data: &[P],
) -> Vec<P> {
    let mut cropped = Vec::with_capacity(width as usize * height as usize * channels);
    for y in 0..height as usize {
        let row = y * source_width as usize * channels;
        cropped.extend_from_slice(&data[row..row + width as usize * channels]);
    }
    cropped
}

#[cfg(feature = "image")]
impl<'a> SurfaceRgba8<&'a [u8]> {
    /// Create a 2D view over the data in `image` without any copies.
    pub fn from_image(image: &'a image::RgbaImage) -> Self {
        SurfaceRgba8 {
            width: image.width(),
            height: image.height(),
            data: image.as_raw(),
        }
    }
}

#[cfg(feature = "image")]
impl<T: AsRef<[u8]>> SurfaceRgba8<T> {
    /// Create an image from the surface data.
    pub fn to_image(&self) -> Result<image::RgbaImage, crate::CreateImageError> {
        let data = self.data.as_ref().to_vec();
        let data_length = data.len();
        image::RgbaImage::from_raw(self.width, self.height, data).ok_or(
            crate::CreateImageError::InvalidSurfaceDimensions {
                width: self.width,
                height: self.height,
                data_length,
            },
        )
    }
}
