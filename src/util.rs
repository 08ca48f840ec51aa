//! Small helpers shared across the pipeline.

use std::borrow::Cow;

/// Decode bytes to a string.
///
/// Tries UTF-8 first (BOM handled by encoding_rs), then the hint encoding if
/// one was given, and finally falls back to Windows-1252, which is what
/// pasted legacy content most often turns out to be.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Escape text for inclusion in XML content or attribute values.
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(s)
}

/// Turn a project name into a safe file stem.
///
/// Anything outside `[A-Za-z0-9_-]` becomes `_`, runs of `_` collapse, and an
/// empty result falls back to `report`.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        let c = if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            c
        } else {
            '_'
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "report".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Image formats the document writer can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Png,
    Jpeg,
    Gif,
    Unknown,
}

impl MediaFormat {
    /// Sniff the format from magic bytes.
    pub fn detect(data: &[u8]) -> Self {
        match data {
            [0x89, b'P', b'N', b'G', ..] => MediaFormat::Png,
            [0xFF, 0xD8, ..] => MediaFormat::Jpeg,
            [b'G', b'I', b'F', ..] => MediaFormat::Gif,
            _ => MediaFormat::Unknown,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            MediaFormat::Png => "png",
            MediaFormat::Jpeg => "jpeg",
            MediaFormat::Gif => "gif",
            MediaFormat::Unknown => "bin",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            MediaFormat::Png => "image/png",
            MediaFormat::Jpeg => "image/jpeg",
            MediaFormat::Gif => "image/gif",
            MediaFormat::Unknown => "application/octet-stream",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_text("Héllo".as_bytes(), None), "Héllo");
    }

    #[test]
    fn test_decode_windows_1252_fallback() {
        // 0x93/0x94 are curly quotes in CP1252 and invalid as UTF-8.
        let bytes = [0x93, b'h', b'i', 0x94];
        assert_eq!(decode_text(&bytes, None), "\u{201C}hi\u{201D}");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("ACME Q3: Audit/Report"), "ACME_Q3_Audit_Report");
        assert_eq!(sanitize_file_name("  "), "report");
        assert_eq!(sanitize_file_name("***"), "report");
        assert_eq!(sanitize_file_name("plan-v2"), "plan-v2");
    }

    #[test]
    fn test_media_format() {
        assert_eq!(MediaFormat::detect(&[0x89, b'P', b'N', b'G', 0x0D]), MediaFormat::Png);
        assert_eq!(MediaFormat::detect(&[0xFF, 0xD8, 0xFF]), MediaFormat::Jpeg);
        assert_eq!(MediaFormat::detect(b"GIF89a"), MediaFormat::Gif);
        assert_eq!(MediaFormat::detect(b"<svg"), MediaFormat::Unknown);
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }
}
