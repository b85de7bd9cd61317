//! # webp-plugin
//!
//! WebP support for image hosts, backed by libwebp.
//!
//! The crate provides:
//! - RIFF/WEBP signature sniffing
//! - opening a WebP file into a single raw RGB or RGBA tile
//! - saving RGB and RGBA images with a quality setting (or losslessly)
//! - explicit registration with a host's format registry
//!
//! ## Quick Start
//!
//! ```rust
//! use webp_plugin::{FormatPlugin, FormatRegistry, Image, ImageMode, SaveOptions};
//!
//! let mut registry = FormatRegistry::new();
//! webp_plugin::register(&mut registry);
//!
//! // A 2x2 red image
//! let image = Image::new(ImageMode::Rgb, 2, 2, [255u8, 0, 0].repeat(4))?;
//!
//! let saver = registry.saver("WEBP").unwrap();
//! let mut webp = Vec::new();
//! saver.save(&image, &SaveOptions::new().quality(90.0), &mut webp)?;
//!
//! let format = registry.identify(&webp[..12]).unwrap();
//! let opened = registry.opener(format).unwrap().open(&mut webp.as_slice())?;
//! assert_eq!(opened.size(), (2, 2));
//! # Ok::<(), webp_plugin::At<webp_plugin::Error>>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

whereat::define_at_crate_info!();

mod codec;
mod config;
mod decode;
mod encode;
mod error;
mod host;
mod plugin;
mod registry;
mod sniff;
mod types;

// Re-exports
pub use codec::{Codec, LibWebp};
pub use config::{SaveOptions, DEFAULT_QUALITY};
pub use decode::{decode_rgb, decode_rgba};
pub use encode::{encode_lossless_rgb, encode_lossless_rgba, encode_rgb, encode_rgba};
pub use error::{DecodingError, EncodingError, Error, Result};
pub use host::{FormatPlugin, Image, ImageFile, Tile, RAW_DECODER};
pub use plugin::WebPPlugin;
pub use registry::{register, register_with, FormatRegistry, Registry};
pub use sniff::{accept, DESCRIPTION, EXTENSION, FORMAT, MIME, SIGNATURE_LEN};
pub use types::{BitstreamFormat, ColorMode, Features, ImageMode};
pub use whereat::At;

/// Version of the linked libwebp decoder as `(major, minor, patch)`.
pub fn version() -> (u32, u32, u32) {
    let v = unsafe { libwebp_sys::WebPGetDecoderVersion() } as u32;
    ((v >> 16) & 0xff, (v >> 8) & 0xff, v & 0xff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let (major, minor, patch) = version();
        assert!(
            major >= 1,
            "Expected libwebp 1.x, got {}.{}.{}",
            major,
            minor,
            patch
        );
    }
}
