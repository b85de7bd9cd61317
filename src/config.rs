//! Save-time configuration.

use crate::error::{Error, Result};
use whereat::*;

/// Quality used when the caller does not set one.
pub const DEFAULT_QUALITY: f32 = 80.0;

/// Options for writing a WebP file.
///
/// # Example
///
/// ```rust
/// use webp_plugin::SaveOptions;
///
/// let options = SaveOptions::new().quality(90.0);
/// assert_eq!(options.get_quality(), 90.0);
/// assert!(!options.is_lossless());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOptions {
    pub(crate) quality: f32,
    pub(crate) lossless: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            lossless: false,
        }
    }
}

impl SaveOptions {
    /// Lossy encoding at quality 80.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set encoding quality (0.0 = smallest, 100.0 = best).
    ///
    /// Ignored when lossless is enabled. Non-finite values leave the
    /// current quality unchanged.
    #[must_use]
    pub fn quality(mut self, quality: f32) -> Self {
        if quality.is_finite() {
            self.quality = quality.clamp(0.0, 100.0);
        }
        self
    }

    /// Enable or disable lossless compression.
    #[must_use]
    pub fn lossless(mut self, lossless: bool) -> Self {
        self.lossless = lossless;
        self
    }

    /// Build options from host-style string pairs such as
    /// `("quality", "90")`.
    ///
    /// Recognised keys are `quality` and `lossless`; anything else is left for
    /// other plugins and ignored.
    pub fn from_encoder_info<'a, I>(info: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = Self::default();
        for (key, value) in info {
            match key {
                "quality" => {
                    let quality: f32 = value.trim().parse().map_err(|_| {
                        at!(Error::InvalidInput(format!("quality {:?} is not a number", value)))
                    })?;
                    if !quality.is_finite() {
                        return Err(at!(Error::InvalidInput(format!(
                            "quality {:?} is not finite",
                            value
                        ))));
                    }
                    options = options.quality(quality);
                }
                "lossless" => {
                    options.lossless = parse_flag(value).ok_or_else(|| {
                        at!(Error::InvalidInput(format!("lossless {:?} is not a flag", value)))
                    })?;
                }
                _ => {}
            }
        }
        Ok(options)
    }

    /// Get the quality setting.
    #[must_use]
    pub fn get_quality(&self) -> f32 {
        self.quality
    }

    /// Check if lossless mode is enabled.
    #[must_use]
    pub fn is_lossless(&self) -> bool {
        self.lossless
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
