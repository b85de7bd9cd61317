//! Explicit registration with a host's format registry.

use crate::codec::Codec;
use crate::host::FormatPlugin;
use crate::plugin::WebPPlugin;
use std::collections::BTreeMap;
use std::sync::Arc;

/// What a host registry must accept from a format plugin.
///
/// The opener carries its own signature check ([`FormatPlugin::accept`]).
pub trait Registry {
    /// Make `format` openable through `plugin`.
    fn register_open(&mut self, format: &'static str, plugin: Arc<dyn FormatPlugin>);

    /// Make `format` savable through `plugin`.
    fn register_save(&mut self, format: &'static str, plugin: Arc<dyn FormatPlugin>);

    /// Associate a file extension (with leading dot) with `format`.
    fn register_extension(&mut self, format: &'static str, extension: &'static str);

    /// Associate a MIME type with `format`.
    fn register_mime(&mut self, format: &'static str, mime: &'static str);
}

/// Register libwebp-backed WebP support with `registry`.
///
/// Nothing is registered anywhere else; call this once per registry.
pub fn register<R: Registry + ?Sized>(registry: &mut R) {
    register_with(registry, WebPPlugin::new());
}

/// Register `plugin` under its format tag, extension and MIME type.
pub fn register_with<R, C>(registry: &mut R, plugin: WebPPlugin<C>)
where
    R: Registry + ?Sized,
    C: Codec + Send + Sync + 'static,
{
    let plugin: Arc<dyn FormatPlugin> = Arc::new(plugin);
    let format = plugin.format();

    registry.register_open(format, Arc::clone(&plugin));
    registry.register_save(format, Arc::clone(&plugin));
    registry.register_extension(format, plugin.extension());
    registry.register_mime(format, plugin.mime());
    log::debug!(
        "registered {} ({}, {})",
        format,
        plugin.extension(),
        plugin.mime()
    );
}

/// A plain in-memory [`Registry`].
///
/// Openers are tried in registration order by [`FormatRegistry::identify`].
#[derive(Default, Clone)]
pub struct FormatRegistry {
    openers: Vec<(&'static str, Arc<dyn FormatPlugin>)>,
    savers: BTreeMap<&'static str, Arc<dyn FormatPlugin>>,
    extensions: BTreeMap<String, &'static str>,
    mimes: BTreeMap<&'static str, &'static str>,
}

impl FormatRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opener registered for `format`.
    #[must_use]
    pub fn opener(&self, format: &str) -> Option<&Arc<dyn FormatPlugin>> {
        self.openers
            .iter()
            .find(|(name, _)| *name == format)
            .map(|(_, plugin)| plugin)
    }

    /// Saver registered for `format`.
    #[must_use]
    pub fn saver(&self, format: &str) -> Option<&Arc<dyn FormatPlugin>> {
        self.savers.get(format)
    }

    /// First format whose opener accepts `prefix`.
    #[must_use]
    pub fn identify(&self, prefix: &[u8]) -> Option<&'static str> {
        self.openers
            .iter()
            .find(|(_, plugin)| plugin.accept(prefix))
            .map(|(name, _)| *name)
    }

    /// Format registered for a file extension, matched case-insensitively.
    ///
    /// The leading dot is optional.
    #[must_use]
    pub fn format_for_extension(&self, extension: &str) -> Option<&'static str> {
        self.extensions.get(&normalize_extension(extension)).copied()
    }

    /// MIME type registered for `format`.
    #[must_use]
    pub fn mime(&self, format: &str) -> Option<&'static str> {
        self.mimes.get(format).copied()
    }

    /// Format registered for a MIME type.
    #[must_use]
    pub fn format_for_mime(&self, mime: &str) -> Option<&'static str> {
        self.mimes
            .iter()
            .find(|(_, m)| m.eq_ignore_ascii_case(mime))
            .map(|(format, _)| *format)
    }
}

impl core::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field(
                "openers",
                &self.openers.iter().map(|(n, _)| *n).collect::<Vec<_>>(),
            )
            .field("savers", &self.savers.keys().collect::<Vec<_>>())
            .field("extensions", &self.extensions)
            .field("mimes", &self.mimes)
            .finish()
    }
}

impl Registry for FormatRegistry {
    fn register_open(&mut self, format: &'static str, plugin: Arc<dyn FormatPlugin>) {
        match self.openers.iter_mut().find(|(name, _)| *name == format) {
            Some(slot) => slot.1 = plugin,
            None => self.openers.push((format, plugin)),
        }
    }

    fn register_save(&mut self, format: &'static str, plugin: Arc<dyn FormatPlugin>) {
        self.savers.insert(format, plugin);
    }

    fn register_extension(&mut self, format: &'static str, extension: &'static str) {
        self.extensions.insert(normalize_extension(extension), format);
    }

    fn register_mime(&mut self, format: &'static str, mime: &'static str) {
        self.mimes.insert(format, mime);
    }
}

fn normalize_extension(extension: &str) -> String {
    let ext = extension.to_ascii_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        calls: Vec<String>,
    }

    impl Registry for Recording {
        fn register_open(&mut self, format: &'static str, plugin: Arc<dyn FormatPlugin>) {
            self.calls
                .push(format!("open {} accepts={}", format, plugin.accept(b"RIFF\0\0\0\0WEBP")));
        }
        fn register_save(&mut self, format: &'static str, _plugin: Arc<dyn FormatPlugin>) {
            self.calls.push(format!("save {}", format));
        }
        fn register_extension(&mut self, format: &'static str, extension: &'static str) {
            self.calls.push(format!("extension {} {}", format, extension));
        }
        fn register_mime(&mut self, format: &'static str, mime: &'static str) {
            self.calls.push(format!("mime {} {}", format, mime));
        }
    }

    #[test]
    fn test_register_calls() {
        let mut registry = Recording::default();
        register(&mut registry);
        assert_eq!(
            registry.calls,
            vec![
                "open WEBP accepts=true",
                "save WEBP",
                "extension WEBP .webp",
                "mime WEBP image/webp",
            ]
        );
    }

    #[test]
    fn test_format_registry_lookups() {
        let mut registry = FormatRegistry::new();
        assert_eq!(registry.identify(b"RIFF\0\0\0\0WEBP"), None);

        register(&mut registry);
        assert_eq!(registry.identify(b"RIFF\0\0\0\0WEBP"), Some("WEBP"));
        assert_eq!(registry.identify(&[0u8; 12]), None);
        assert_eq!(registry.format_for_extension(".webp"), Some("WEBP"));
        assert_eq!(registry.format_for_extension("WEBP"), Some("WEBP"));
        assert_eq!(registry.format_for_extension(".png"), None);
        assert_eq!(registry.mime("WEBP"), Some("image/webp"));
        assert_eq!(registry.format_for_mime("image/webp"), Some("WEBP"));
        assert!(registry.opener("WEBP").is_some());
        assert!(registry.saver("WEBP").is_some());
    }

    #[test]
    fn test_reregistering_replaces_opener() {
        let mut registry = FormatRegistry::new();
        register(&mut registry);
        register(&mut registry);
        assert_eq!(registry.openers.len(), 1);
        assert_eq!(registry.savers.len(), 1);
    }
}
