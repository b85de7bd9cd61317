//! RIFF/WEBP signature detection.

/// Format tag registered with the host.
pub const FORMAT: &str = "WEBP";

/// Human-readable format description.
pub const DESCRIPTION: &str = "WebP image";

/// Canonical file extension.
pub const EXTENSION: &str = ".webp";

/// MIME type.
pub const MIME: &str = "image/webp";

/// Minimum prefix length [`accept`] needs to say yes.
pub const SIGNATURE_LEN: usize = 12;

/// Check whether `prefix` starts with a WebP container signature.
///
/// True iff bytes `0..4` are `RIFF` and bytes `8..12` are `WEBP`. The four
/// bytes in between (the RIFF chunk size) are not inspected. Prefixes shorter
/// than [`SIGNATURE_LEN`] never match.
#[must_use]
pub fn accept(prefix: &[u8]) -> bool {
    prefix.get(0..4) == Some(&b"RIFF"[..]) && prefix.get(8..12) == Some(&b"WEBP"[..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_signature() {
        assert!(accept(b"RIFF\x24\x00\x00\x00WEBPVP8 "));
        assert!(accept(b"RIFF\0\0\0\0WEBP"));
    }

    #[test]
    fn test_rejects_short_prefixes() {
        let full = b"RIFF\0\0\0\0WEBP";
        for len in 0..SIGNATURE_LEN {
            assert!(!accept(&full[..len]), "accepted {} bytes", len);
        }
    }

    #[test]
    fn test_rejects_other_containers() {
        assert!(!accept(&[0u8; 12]));
        assert!(!accept(b"RIFF\0\0\0\0WAVEfmt "));
        assert!(!accept(b"RIFX\0\0\0\0WEBP"));
        assert!(!accept(b"\x89PNG\r\n\x1a\n\0\0\0\r"));
    }
}
