//! Pixel modes and bitstream features.

use crate::error::{DecodingError, Error, Result};
use core::fmt;
use core::str::FromStr;
use whereat::*;

/// Pixel layout the WebP path can produce and consume.
///
/// This is a closed set: every decode and encode site matches on it
/// exhaustively, so a third layout cannot slip through unnoticed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// RGB (8 bits per channel, 24 bits per pixel).
    Rgb,
    /// RGBA (8 bits per channel, 32 bits per pixel).
    Rgba,
}

impl ColorMode {
    /// Bytes per pixel.
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
        }
    }

    /// Whether this mode has an alpha channel.
    #[must_use]
    pub const fn has_alpha(self) -> bool {
        matches!(self, ColorMode::Rgba)
    }

    /// Host mode tag for this layout.
    #[must_use]
    pub const fn image_mode(self) -> ImageMode {
        match self {
            ColorMode::Rgb => ImageMode::Rgb,
            ColorMode::Rgba => ImageMode::Rgba,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.image_mode(), f)
    }
}

impl TryFrom<ImageMode> for ColorMode {
    type Error = At<Error>;

    fn try_from(mode: ImageMode) -> Result<Self> {
        match mode {
            ImageMode::Rgb => Ok(ColorMode::Rgb),
            ImageMode::Rgba => Ok(ColorMode::Rgba),
            other => Err(at!(Error::UnsupportedMode(other))),
        }
    }
}

/// Host pixel layout tag.
///
/// Host images may carry any of these; only [`ImageMode::Rgb`] and
/// [`ImageMode::Rgba`] can be written as WebP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ImageMode {
    /// 8-bit grayscale.
    L,
    /// 8-bit grayscale with alpha.
    La,
    /// 8-bit palette indices.
    P,
    /// 8-bit RGB.
    Rgb,
    /// 8-bit RGB with alpha.
    Rgba,
    /// 8-bit CMYK.
    Cmyk,
}

impl ImageMode {
    /// Bytes per pixel.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            ImageMode::L | ImageMode::P => 1,
            ImageMode::La => 2,
            ImageMode::Rgb => 3,
            ImageMode::Rgba | ImageMode::Cmyk => 4,
        }
    }

    /// The host's string tag, e.g. `"RGBA"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ImageMode::L => "L",
            ImageMode::La => "LA",
            ImageMode::P => "P",
            ImageMode::Rgb => "RGB",
            ImageMode::Rgba => "RGBA",
            ImageMode::Cmyk => "CMYK",
        }
    }
}

impl fmt::Display for ImageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageMode {
    type Err = At<Error>;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "L" => Ok(ImageMode::L),
            "LA" => Ok(ImageMode::La),
            "P" => Ok(ImageMode::P),
            "RGB" => Ok(ImageMode::Rgb),
            "RGBA" => Ok(ImageMode::Rgba),
            "CMYK" => Ok(ImageMode::Cmyk),
            other => Err(at!(Error::InvalidInput(format!(
                "unknown image mode {:?}",
                other
            )))),
        }
    }
}

impl From<ColorMode> for ImageMode {
    fn from(mode: ColorMode) -> Self {
        mode.image_mode()
    }
}

/// Bitstream format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum BitstreamFormat {
    /// Format not determined (mixed or animated).
    #[default]
    Undefined,
    /// Lossy compression (VP8).
    Lossy,
    /// Lossless compression (VP8L).
    Lossless,
}

/// Container metadata read without a full pixel decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Features {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Whether the image has an alpha channel.
    pub has_alpha: bool,
    /// Whether the image is animated.
    pub has_animation: bool,
    /// Bitstream format (lossy or lossless).
    pub format: BitstreamFormat,
}

impl Features {
    /// Read features from WebP data via `WebPGetFeatures`.
    pub fn from_webp(data: &[u8]) -> Result<Self> {
        let mut features = core::mem::MaybeUninit::<libwebp_sys::WebPBitstreamFeatures>::uninit();
        let status = unsafe {
            libwebp_sys::WebPGetFeatures(data.as_ptr(), data.len(), features.as_mut_ptr())
        };

        if status != libwebp_sys::VP8StatusCode::VP8_STATUS_OK {
            return Err(at!(Error::DecodeFailed(DecodingError::from(
                status as i32
            ))));
        }
        // SAFETY: WebPGetFeatures fills the struct whenever it returns OK.
        let features = unsafe { features.assume_init() };

        let format = match features.format {
            1 => BitstreamFormat::Lossy,
            2 => BitstreamFormat::Lossless,
            _ => BitstreamFormat::Undefined,
        };

        Ok(Features {
            width: features.width as u32,
            height: features.height as u32,
            has_alpha: features.has_alpha != 0,
            has_animation: features.has_animation != 0,
            format,
        })
    }

    /// Layout the decoder should produce for this image.
    #[must_use]
    pub fn color_mode(&self) -> ColorMode {
        if self.has_alpha {
            ColorMode::Rgba
        } else {
            ColorMode::Rgb
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        assert_eq!(ColorMode::Rgb.channels(), 3);
        assert_eq!(ColorMode::Rgba.channels(), 4);
        assert!(ColorMode::Rgba.has_alpha());
        assert!(!ColorMode::Rgb.has_alpha());
    }

    #[test]
    fn test_mode_tags_parse() {
        for mode in [
            ImageMode::L,
            ImageMode::La,
            ImageMode::P,
            ImageMode::Rgb,
            ImageMode::Rgba,
            ImageMode::Cmyk,
        ] {
            assert_eq!(mode.as_str().parse::<ImageMode>().unwrap(), mode);
        }
        assert!("YCbCr".parse::<ImageMode>().is_err());
    }

    #[test]
    fn test_only_rgb_and_rgba_convert() {
        assert_eq!(ColorMode::try_from(ImageMode::Rgb).unwrap(), ColorMode::Rgb);
        assert_eq!(
            ColorMode::try_from(ImageMode::Rgba).unwrap(),
            ColorMode::Rgba
        );
        for mode in [ImageMode::L, ImageMode::La, ImageMode::P, ImageMode::Cmyk] {
            let err = ColorMode::try_from(mode).unwrap_err();
            assert_eq!(err.error(), &Error::UnsupportedMode(mode));
        }
    }

    #[test]
    fn test_features_invalid() {
        assert!(Features::from_webp(b"not a webp").is_err());
        assert!(Features::from_webp(&[]).is_err());
    }

    #[test]
    fn test_features_color_mode() {
        let mut features = Features {
            width: 1,
            height: 1,
            has_alpha: false,
            has_animation: false,
            format: BitstreamFormat::Lossy,
        };
        assert_eq!(features.color_mode(), ColorMode::Rgb);
        features.has_alpha = true;
        assert_eq!(features.color_mode(), ColorMode::Rgba);
    }
}
