//! libwebp encode calls.

use crate::error::{EncodingError, Error, Result};
use crate::types::ColorMode;
use core::ptr;
use whereat::*;

/// Encode RGBA pixels to lossy WebP.
///
/// # Arguments
///
/// * `data` - RGBA pixel data (4 bytes per pixel)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `stride` - Bytes per row (at least `width * 4`)
/// * `quality` - Quality factor (0.0 = smallest, 100.0 = best)
pub fn encode_rgba(
    data: &[u8],
    width: u32,
    height: u32,
    stride: usize,
    quality: f32,
) -> Result<Vec<u8>> {
    encode_with(data, width, height, stride, ColorMode::Rgba, Some(quality))
}

/// Encode RGB pixels to lossy WebP (no alpha).
///
/// Same arguments as [`encode_rgba`] with 3 bytes per pixel.
pub fn encode_rgb(
    data: &[u8],
    width: u32,
    height: u32,
    stride: usize,
    quality: f32,
) -> Result<Vec<u8>> {
    encode_with(data, width, height, stride, ColorMode::Rgb, Some(quality))
}

/// Encode RGBA pixels to lossless WebP.
pub fn encode_lossless_rgba(data: &[u8], width: u32, height: u32, stride: usize) -> Result<Vec<u8>> {
    encode_with(data, width, height, stride, ColorMode::Rgba, None)
}

/// Encode RGB pixels to lossless WebP.
pub fn encode_lossless_rgb(data: &[u8], width: u32, height: u32, stride: usize) -> Result<Vec<u8>> {
    encode_with(data, width, height, stride, ColorMode::Rgb, None)
}

/// `quality == None` selects the lossless encoder.
fn encode_with(
    data: &[u8],
    width: u32,
    height: u32,
    stride: usize,
    mode: ColorMode,
    quality: Option<f32>,
) -> Result<Vec<u8>> {
    validate_dimensions(width, height)?;
    validate_stride(data.len(), width, height, stride, mode.channels())?;
    let stride = i32::try_from(stride)
        .map_err(|_| at!(Error::InvalidInput(format!("stride {} too large", stride))))?;

    let (w, h) = (width as i32, height as i32);
    let mut output: *mut u8 = ptr::null_mut();
    let size = unsafe {
        match (mode, quality) {
            (ColorMode::Rgb, Some(q)) => {
                libwebp_sys::WebPEncodeRGB(data.as_ptr(), w, h, stride, q, &mut output)
            }
            (ColorMode::Rgba, Some(q)) => {
                libwebp_sys::WebPEncodeRGBA(data.as_ptr(), w, h, stride, q, &mut output)
            }
            (ColorMode::Rgb, None) => {
                libwebp_sys::WebPEncodeLosslessRGB(data.as_ptr(), w, h, stride, &mut output)
            }
            (ColorMode::Rgba, None) => {
                libwebp_sys::WebPEncodeLosslessRGBA(data.as_ptr(), w, h, stride, &mut output)
            }
        }
    };

    if size == 0 || output.is_null() {
        if !output.is_null() {
            unsafe { libwebp_sys::WebPFree(output as *mut _) };
        }
        return Err(at!(Error::EncodeFailed(EncodingError::OutOfMemory)));
    }

    // SAFETY: libwebp returned `size` bytes at `output`, owned by us until WebPFree.
    let result = unsafe {
        let slice = core::slice::from_raw_parts(output, size);
        let vec = slice.to_vec();
        libwebp_sys::WebPFree(output as *mut _);
        vec
    };

    Ok(result)
}

pub(crate) const MAX_DIMENSION: u32 = 16383;

pub(crate) fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(at!(Error::InvalidInput(
            "width and height must be non-zero".into()
        )));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(at!(Error::InvalidInput(format!(
            "dimensions exceed maximum ({} x {})",
            MAX_DIMENSION, MAX_DIMENSION
        ))));
    }
    Ok(())
}

/// Rows are `stride` bytes apart; the buffer must hold `height` full strides.
pub(crate) fn validate_stride(
    size: usize,
    width: u32,
    height: u32,
    stride: usize,
    bpp: usize,
) -> Result<()> {
    let row = (width as usize).saturating_mul(bpp);
    if stride < row {
        return Err(at!(Error::InvalidInput(format!(
            "stride too small: got {}, minimum {}",
            stride, row
        ))));
    }

    let expected = stride.saturating_mul(height as usize);
    if size < expected {
        return Err(at!(Error::InvalidInput(format!(
            "buffer too small: got {}, expected {}",
            size, expected
        ))));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_dimensions() {
        assert!(validate_dimensions(0, 100).is_err());
        assert!(validate_dimensions(100, 0).is_err());
        assert!(validate_dimensions(20000, 100).is_err());
        assert!(validate_dimensions(100, 100).is_ok());
        assert!(validate_dimensions(MAX_DIMENSION, 1).is_ok());
    }

    #[test]
    fn test_validate_stride() {
        assert!(validate_stride(100, 10, 10, 40, 4).is_err());
        assert!(validate_stride(400, 10, 10, 40, 4).is_ok());
        assert!(validate_stride(500, 10, 10, 40, 4).is_ok());
        // stride narrower than a row
        assert!(validate_stride(400, 10, 10, 30, 4).is_err());
        // padded rows need the padding for every row
        assert!(validate_stride(480, 10, 10, 48, 4).is_ok());
        assert!(validate_stride(479, 10, 10, 48, 4).is_err());
    }

    #[test]
    fn test_encode_rejects_short_buffer() {
        let err = encode_rgb(&[0u8; 5], 2, 2, 6, 80.0).unwrap_err();
        assert!(matches!(err.error(), Error::InvalidInput(_)));
    }

    #[test]
    fn test_encode_produces_riff() {
        let rgb = [255u8, 0, 0].repeat(4);
        let webp = encode_rgb(&rgb, 2, 2, 6, 80.0).unwrap();
        assert_eq!(&webp[0..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");

        let webp = encode_lossless_rgba(&[7u8; 16], 2, 2, 8).unwrap();
        assert_eq!(&webp[8..12], b"WEBP");
    }
}
