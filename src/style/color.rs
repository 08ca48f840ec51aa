//! Colour normalisation to 6-digit uppercase hex.

/// Named colours accepted in inline styles.
static NAMED_COLORS: &[(&str, &str)] = &[
    ("black", "000000"),
    ("white", "FFFFFF"),
    ("red", "FF0000"),
    ("green", "008000"),
    ("blue", "0000FF"),
    ("yellow", "FFFF00"),
    ("orange", "FFA500"),
    ("purple", "800080"),
    ("gray", "808080"),
    ("grey", "808080"),
    ("navy", "000080"),
    ("teal", "008080"),
    ("maroon", "800000"),
];

pub fn named_color(name: &str) -> Option<&'static str> {
    NAMED_COLORS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, hex)| *hex)
}

/// Normalise the digits of a hex colour (no leading `#`).
///
/// Three-digit shorthand is expanded; eight-digit values drop their alpha.
pub fn normalize_hex(hex: &str) -> Option<String> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        8 => hex[..6].to_string(),
        _ => return None,
    };
    Some(expanded.to_ascii_uppercase())
}

pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("{r:02X}{g:02X}{b:02X}")
}

/// Split a 6-digit hex colour into channels.
pub fn hex_to_rgb(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_hex() {
        assert_eq!(normalize_hex("1f3864").as_deref(), Some("1F3864"));
        assert_eq!(normalize_hex("f00").as_deref(), Some("FF0000"));
        assert_eq!(normalize_hex("11223344").as_deref(), Some("112233"));
        assert_eq!(normalize_hex("zz0000"), None);
        assert_eq!(normalize_hex("1234"), None);
    }

    #[test]
    fn test_named() {
        assert_eq!(named_color("Navy"), Some("000080"));
        assert_eq!(named_color("chartreuse"), None);
    }

    #[test]
    fn test_rgb_round_trip_channels() {
        assert_eq!(rgb_to_hex(255, 0, 16), "FF0010");
        assert_eq!(hex_to_rgb("#FF0010"), Some([255, 0, 16]));
    }

    #[test]
    fn test_hex_to_rgb_rejects_multibyte_text() {
        // Six bytes, three characters.
        assert_eq!(hex_to_rgb("ééé"), None);
        assert_eq!(hex_to_rgb("#aé012"), None);
        assert_eq!(hex_to_rgb("GG0000"), None);
    }
}
