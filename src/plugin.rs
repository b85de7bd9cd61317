//! The WebP format plugin: open and save on top of a [`Codec`].

use crate::codec::{Codec, LibWebp};
use crate::config::SaveOptions;
use crate::error::{Error, Result};
use crate::host::{FormatPlugin, Image, ImageFile};
use crate::sniff;
use crate::types::ColorMode;
use std::io::{Read, Write};
use whereat::*;

/// WebP support for an image host.
///
/// # Example
///
/// ```rust
/// use webp_plugin::{Image, ImageMode, SaveOptions, WebPPlugin};
///
/// let red = [255u8, 0, 0].repeat(4);
/// let image = Image::new(ImageMode::Rgb, 2, 2, red)?;
///
/// let plugin = WebPPlugin::new();
/// let mut webp = Vec::new();
/// plugin.save(&image, &SaveOptions::new(), &mut webp)?;
///
/// let opened = plugin.open(&mut webp.as_slice())?;
/// assert_eq!(opened.mode(), ImageMode::Rgb);
/// assert_eq!(opened.size(), (2, 2));
/// # Ok::<(), webp_plugin::At<webp_plugin::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct WebPPlugin<C = LibWebp> {
    codec: C,
}

impl WebPPlugin<LibWebp> {
    /// Plugin backed by libwebp.
    #[must_use]
    pub fn new() -> Self {
        Self { codec: LibWebp }
    }
}

impl<C: Codec> WebPPlugin<C> {
    /// Plugin backed by a custom codec.
    #[must_use]
    pub fn with_codec(codec: C) -> Self {
        Self { codec }
    }

    /// The codec doing the actual work.
    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Check a file prefix for the RIFF/WEBP signature.
    #[must_use]
    pub fn accept(&self, prefix: &[u8]) -> bool {
        sniff::accept(prefix)
    }

    /// Read a whole WebP file and decode it into a single raw tile.
    pub fn open<R: Read + ?Sized>(&self, reader: &mut R) -> Result<ImageFile> {
        let mut raw = Vec::new();
        reader
            .read_to_end(&mut raw)
            .map_err(|e| at!(Error::from(e)))?;
        self.open_bytes(&raw)
    }

    /// Decode WebP bytes already in memory.
    pub fn open_bytes(&self, raw: &[u8]) -> Result<ImageFile> {
        let features = self.codec.probe(raw)?;
        let mode = features.color_mode();
        log::trace!(
            "probed {}x{} alpha={} animated={} format={:?}",
            features.width,
            features.height,
            features.has_alpha,
            features.has_animation,
            features.format
        );

        let (pixels, width, height) = match mode {
            ColorMode::Rgb => self.codec.decode_rgb(raw)?,
            ColorMode::Rgba => self.codec.decode_rgba(raw)?,
        };

        if (width, height) != (features.width, features.height) {
            log::warn!(
                "probe said {}x{} but decoder produced {}x{}",
                features.width,
                features.height,
                width,
                height
            );
            return Err(at!(Error::DimensionMismatch {
                probed: (features.width, features.height),
                decoded: (width, height),
            }));
        }

        let expected = (width as usize) * (height as usize) * mode.channels();
        if pixels.len() != expected {
            return Err(at!(Error::InvalidInput(format!(
                "decoded buffer holds {} bytes, expected {} for {}x{} {}",
                pixels.len(),
                expected,
                width,
                height,
                mode
            ))));
        }

        log::debug!("opened {} {}x{} {}", sniff::FORMAT, width, height, mode);
        Ok(ImageFile::from_decoded(
            sniff::FORMAT,
            sniff::DESCRIPTION,
            mode,
            width,
            height,
            pixels,
        ))
    }

    /// Encode `image` and return the WebP bytes.
    ///
    /// Only RGB and RGBA images can be encoded; other modes fail before the
    /// codec is called.
    pub fn encode(&self, image: &Image, options: &SaveOptions) -> Result<Vec<u8>> {
        let mode = ColorMode::try_from(image.mode()).map_err(|e| {
            log::warn!("refusing to write {} image as {}", image.mode(), sniff::FORMAT);
            e
        })?;

        let (width, height) = image.size();
        let pixels = image.to_packed();
        let stride = width as usize * mode.channels();

        log::trace!(
            "encoding {}x{} {} lossless={} quality={}",
            width,
            height,
            mode,
            options.lossless,
            options.quality
        );
        match (mode, options.lossless) {
            (ColorMode::Rgb, false) => {
                self.codec
                    .encode_rgb(&pixels, width, height, stride, options.quality)
            }
            (ColorMode::Rgba, false) => {
                self.codec
                    .encode_rgba(&pixels, width, height, stride, options.quality)
            }
            (ColorMode::Rgb, true) => self
                .codec
                .encode_lossless_rgb(&pixels, width, height, stride),
            (ColorMode::Rgba, true) => self
                .codec
                .encode_lossless_rgba(&pixels, width, height, stride),
        }
    }

    /// Encode `image` and write all of the compressed bytes to `writer`.
    ///
    /// Nothing is written unless encoding succeeds.
    pub fn save<W: Write + ?Sized>(
        &self,
        image: &Image,
        options: &SaveOptions,
        writer: &mut W,
    ) -> Result<()> {
        let data = self.encode(image, options)?;
        writer
            .write_all(&data)
            .map_err(|e| at!(Error::from(e)))?;
        log::debug!(
            "saved {} {}x{} {} ({} bytes)",
            sniff::FORMAT,
            image.width(),
            image.height(),
            image.mode(),
            data.len()
        );
        Ok(())
    }
}

impl<C: Codec + Send + Sync> FormatPlugin for WebPPlugin<C> {
    fn format(&self) -> &'static str {
        sniff::FORMAT
    }

    fn description(&self) -> &'static str {
        sniff::DESCRIPTION
    }

    fn extension(&self) -> &'static str {
        sniff::EXTENSION
    }

    fn mime(&self) -> &'static str {
        sniff::MIME
    }

    fn accept(&self, prefix: &[u8]) -> bool {
        WebPPlugin::accept(self, prefix)
    }

    fn open(&self, reader: &mut dyn Read) -> Result<ImageFile> {
        WebPPlugin::open(self, reader)
    }

    fn save(&self, image: &Image, options: &SaveOptions, writer: &mut dyn Write) -> Result<()> {
        WebPPlugin::save(self, image, options, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageMode;

    #[test]
    fn test_open_two_by_two_red() {
        let plugin = WebPPlugin::new();
        let red = [255u8, 0, 0].repeat(4);
        let image = Image::new(ImageMode::Rgb, 2, 2, red).unwrap();

        let mut webp = Vec::new();
        plugin.save(&image, &SaveOptions::new(), &mut webp).unwrap();
        assert!(plugin.accept(&webp[..12]));
        assert!(!plugin.accept(&[0u8; 12]));

        let opened = plugin.open(&mut webp.as_slice()).unwrap();
        assert_eq!(opened.format(), "WEBP");
        assert_eq!(opened.mode(), ImageMode::Rgb);
        assert_eq!(opened.size(), (2, 2));
        assert_eq!(opened.tiles().len(), 1);
        assert_eq!(opened.tiles()[0].extent, (0, 0, 2, 2));
        assert_eq!(opened.tiles()[0].offset, 0);
    }

    #[test]
    fn test_save_rejects_grayscale_without_writing() {
        let plugin = WebPPlugin::new();
        let image = Image::new(ImageMode::L, 4, 4, vec![128; 16]).unwrap();

        let mut out = Vec::new();
        let err = plugin
            .save(&image, &SaveOptions::new(), &mut out)
            .unwrap_err();
        assert_eq!(err.error(), &Error::UnsupportedMode(ImageMode::L));
        assert!(out.is_empty());
    }

    #[test]
    fn test_open_garbage() {
        let plugin = WebPPlugin::new();
        let err = plugin.open(&mut &b"RIFF\0\0\0\0WEBPjunk"[..]).unwrap_err();
        assert!(matches!(err.error(), Error::DecodeFailed(_)));
    }
}
