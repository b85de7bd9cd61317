//! The boundary between the plugin and the WebP library.

use crate::error::{EncodingError, Error, Result};
use crate::types::Features;
use whereat::*;

/// Operations the plugin needs from a WebP implementation.
///
/// [`LibWebp`] forwards to libwebp. Other implementations exist mainly so
/// tests can observe or fake the library's answers.
pub trait Codec {
    /// Read dimensions and alpha presence without decoding pixels.
    fn probe(&self, data: &[u8]) -> Result<Features>;

    /// Decode to packed RGB; returns `(pixels, width, height)`.
    fn decode_rgb(&self, data: &[u8]) -> Result<(Vec<u8>, u32, u32)>;

    /// Decode to packed RGBA; returns `(pixels, width, height)`.
    fn decode_rgba(&self, data: &[u8]) -> Result<(Vec<u8>, u32, u32)>;

    /// Lossy-encode RGB rows `stride` bytes apart.
    fn encode_rgb(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        stride: usize,
        quality: f32,
    ) -> Result<Vec<u8>>;

    /// Lossy-encode RGBA rows `stride` bytes apart.
    fn encode_rgba(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        stride: usize,
        quality: f32,
    ) -> Result<Vec<u8>>;

    /// Lossless-encode RGB. Unsupported unless overridden.
    fn encode_lossless_rgb(
        &self,
        _pixels: &[u8],
        _width: u32,
        _height: u32,
        _stride: usize,
    ) -> Result<Vec<u8>> {
        Err(at!(Error::EncodeFailed(EncodingError::InvalidConfiguration)))
    }

    /// Lossless-encode RGBA. Unsupported unless overridden.
    fn encode_lossless_rgba(
        &self,
        _pixels: &[u8],
        _width: u32,
        _height: u32,
        _stride: usize,
    ) -> Result<Vec<u8>> {
        Err(at!(Error::EncodeFailed(EncodingError::InvalidConfiguration)))
    }
}

impl<C: Codec + ?Sized> Codec for &C {
    fn probe(&self, data: &[u8]) -> Result<Features> {
        (**self).probe(data)
    }

    fn decode_rgb(&self, data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
        (**self).decode_rgb(data)
    }

    fn decode_rgba(&self, data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
        (**self).decode_rgba(data)
    }

    fn encode_rgb(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        stride: usize,
        quality: f32,
    ) -> Result<Vec<u8>> {
        (**self).encode_rgb(pixels, width, height, stride, quality)
    }

    fn encode_rgba(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        stride: usize,
        quality: f32,
    ) -> Result<Vec<u8>> {
        (**self).encode_rgba(pixels, width, height, stride, quality)
    }

    fn encode_lossless_rgb(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<Vec<u8>> {
        (**self).encode_lossless_rgb(pixels, width, height, stride)
    }

    fn encode_lossless_rgba(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<Vec<u8>> {
        (**self).encode_lossless_rgba(pixels, width, height, stride)
    }
}

/// libwebp, linked through `libwebp-sys`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibWebp;

impl Codec for LibWebp {
    fn probe(&self, data: &[u8]) -> Result<Features> {
        Features::from_webp(data)
    }

    fn decode_rgb(&self, data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
        crate::decode::decode_rgb(data)
    }

    fn decode_rgba(&self, data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
        crate::decode::decode_rgba(data)
    }

    fn encode_rgb(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        stride: usize,
        quality: f32,
    ) -> Result<Vec<u8>> {
        crate::encode::encode_rgb(pixels, width, height, stride, quality)
    }

    fn encode_rgba(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        stride: usize,
        quality: f32,
    ) -> Result<Vec<u8>> {
        crate::encode::encode_rgba(pixels, width, height, stride, quality)
    }

    fn encode_lossless_rgb(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<Vec<u8>> {
        crate::encode::encode_lossless_rgb(pixels, width, height, stride)
    }

    fn encode_lossless_rgba(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<Vec<u8>> {
        crate::encode::encode_lossless_rgba(pixels, width, height, stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LossyOnly;

    impl Codec for LossyOnly {
        fn probe(&self, data: &[u8]) -> Result<Features> {
            LibWebp.probe(data)
        }
        fn decode_rgb(&self, data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
            LibWebp.decode_rgb(data)
        }
        fn decode_rgba(&self, data: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
            LibWebp.decode_rgba(data)
        }
        fn encode_rgb(&self, p: &[u8], w: u32, h: u32, s: usize, q: f32) -> Result<Vec<u8>> {
            LibWebp.encode_rgb(p, w, h, s, q)
        }
        fn encode_rgba(&self, p: &[u8], w: u32, h: u32, s: usize, q: f32) -> Result<Vec<u8>> {
            LibWebp.encode_rgba(p, w, h, s, q)
        }
    }

    #[test]
    fn test_lossless_defaults_to_unsupported() {
        let err = LossyOnly
            .encode_lossless_rgb(&[0u8; 12], 2, 2, 6)
            .unwrap_err();
        assert_eq!(
            err.error(),
            &Error::EncodeFailed(EncodingError::InvalidConfiguration)
        );
    }

    #[test]
    fn test_libwebp_probe_after_encode() {
        let rgba = [10u8, 20, 30, 128].repeat(3 * 5);
        let webp = LibWebp.encode_rgba(&rgba, 3, 5, 12, 90.0).unwrap();

        let features = LibWebp.probe(&webp).unwrap();
        assert_eq!((features.width, features.height), (3, 5));
        assert!(features.has_alpha);
        assert!(!features.has_animation);
    }

    #[test]
    fn test_reference_forwards() {
        let codec = &LibWebp;
        let rgb = [0u8; 12];
        let webp = codec.encode_lossless_rgb(&rgb, 2, 2, 6).unwrap();
        let (pixels, w, h) = codec.decode_rgb(&webp).unwrap();
        assert_eq!((w, h), (2, 2));
        assert_eq!(pixels, rgb);
    }
}
