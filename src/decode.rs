//! libwebp decode calls.

use crate::error::{DecodingError, Error, Result};
use crate::types::ColorMode;
use whereat::*;

/// Decode WebP data to RGBA pixels.
///
/// Returns the decoded pixels and dimensions.
pub fn decode_rgba(data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
    decode_with(data, ColorMode::Rgba)
}

/// Decode WebP data to RGB pixels (no alpha).
///
/// Returns the decoded pixels and dimensions.
pub fn decode_rgb(data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
    decode_with(data, ColorMode::Rgb)
}

fn decode_with(data: &[u8], mode: ColorMode) -> Result<(Vec<u8>, u32, u32)> {
    let mut width: i32 = 0;
    let mut height: i32 = 0;

    let ptr = unsafe {
        match mode {
            ColorMode::Rgb => {
                libwebp_sys::WebPDecodeRGB(data.as_ptr(), data.len(), &mut width, &mut height)
            }
            ColorMode::Rgba => {
                libwebp_sys::WebPDecodeRGBA(data.as_ptr(), data.len(), &mut width, &mut height)
            }
        }
    };

    if ptr.is_null() {
        return Err(at!(Error::DecodeFailed(DecodingError::BitstreamError)));
    }

    let size = (width as usize) * (height as usize) * mode.channels();
    // SAFETY: libwebp returned a non-null buffer of width * height * channels
    // bytes that we own until WebPFree.
    let pixels = unsafe {
        let slice = core::slice::from_raw_parts(ptr, size);
        let vec = slice.to_vec();
        libwebp_sys::WebPFree(ptr as *mut _);
        vec
    };

    Ok((pixels, width as u32, height as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_garbage() {
        let err = decode_rgb(b"RIFF\0\0\0\0WEBPgarbage").unwrap_err();
        assert_eq!(
            err.error(),
            &Error::DecodeFailed(DecodingError::BitstreamError)
        );
        assert!(decode_rgba(&[]).is_err());
    }
}
