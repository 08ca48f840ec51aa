//! Inline declaration parsing on top of cssparser.

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, Token,
};

use super::color::{named_color, normalize_hex, rgb_to_hex};
use super::units::to_font_points;
use super::{Alignment, CssLength, StyleAttributes};

/// Resolve an inline style declaration string.
///
/// Never fails: declarations that do not parse are skipped, and later
/// declarations of the same property win.
pub fn resolve(style: &str) -> StyleAttributes {
    let mut attrs = StyleAttributes::default();
    if style.trim().is_empty() {
        return attrs;
    }

    let mut input = ParserInput::new(style);
    let mut parser = Parser::new(&mut input);
    let mut decl_parser = InlineDeclarationParser { attrs: &mut attrs };

    for result in RuleBodyParser::new(&mut parser, &mut decl_parser) {
        // Lenient: a bad declaration only loses itself.
        let _ = result;
    }

    attrs
}

struct InlineDeclarationParser<'a> {
    attrs: &'a mut StyleAttributes,
}

impl<'i> AtRuleParser<'i> for InlineDeclarationParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> QualifiedRuleParser<'i> for InlineDeclarationParser<'_> {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> DeclarationParser<'i> for InlineDeclarationParser<'_> {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let property = name.to_ascii_lowercase();
        apply_property(self.attrs, &property, input);

        // Swallow `!important` and anything else left over.
        while input.next().is_ok() {}
        Ok(())
    }
}

impl<'i> RuleBodyItemParser<'i, (), ()> for InlineDeclarationParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

fn apply_property(attrs: &mut StyleAttributes, property: &str, input: &mut Parser<'_, '_>) {
    match property {
        "color" => {
            if let Some(c) = parse_color(input) {
                attrs.color = Some(c);
            }
        }
        "background-color" | "background" => {
            if let Some(c) = parse_color(input) {
                attrs.background_color = Some(c);
            }
        }
        "font-size" => {
            if let Some(pt) = parse_length(input).and_then(font_size_points) {
                attrs.font_size_pt = Some(pt);
            }
        }
        "font-family" => {
            if let Some(family) = parse_first_family(input) {
                attrs.font_family = Some(family);
            }
        }
        "text-align" => {
            if let Ok(keyword) = input.expect_ident_cloned() {
                attrs.alignment = Some(Alignment::from_keyword(&keyword));
            }
        }
        "margin-left" => {
            if let Some(units) = parse_length(input).and_then(CssLength::to_indent_units) {
                attrs.indent_left_units = Some(units);
            }
        }
        "text-indent" => {
            if let Some(units) = parse_length(input).and_then(CssLength::to_indent_units) {
                attrs.indent_first_line_units = Some(units);
            }
        }
        "font-weight" => {
            if let Some(bold) = parse_font_weight(input) {
                attrs.bold = Some(bold);
            }
        }
        "font-style" => {
            if let Ok(keyword) = input.expect_ident_cloned() {
                match keyword.to_ascii_lowercase().as_str() {
                    "italic" | "oblique" => attrs.italic = Some(true),
                    "normal" => attrs.italic = Some(false),
                    _ => {}
                }
            }
        }
        "text-decoration" | "text-decoration-line" => {
            let mut underline = None;
            while let Ok(keyword) = input.try_parse(|i| i.expect_ident_cloned()) {
                match keyword.to_ascii_lowercase().as_str() {
                    "underline" => underline = Some(true),
                    "none" => underline = underline.or(Some(false)),
                    _ => {}
                }
            }
            if underline.is_some() {
                attrs.underline = underline;
            }
        }
        "width" => {
            if let Some(len) = parse_length(input) {
                attrs.width = Some(len);
            }
        }
        "height" => {
            if let Some(len) = parse_length(input) {
                attrs.height = Some(len);
            }
        }
        _ => {}
    }
}

fn parse_color(input: &mut Parser<'_, '_>) -> Option<String> {
    let token = input.next().ok()?.clone();
    match token {
        Token::Ident(name) => named_color(&name).map(str::to_string),
        Token::Hash(hex) | Token::IDHash(hex) => normalize_hex(&hex),
        Token::Function(name)
            if name.eq_ignore_ascii_case("rgb") || name.eq_ignore_ascii_case("rgba") =>
        {
            input.parse_nested_block(parse_rgb_components).ok()
        }
        _ => None,
    }
}

fn parse_rgb_components<'i>(input: &mut Parser<'i, '_>) -> Result<String, ParseError<'i, ()>> {
    let r = parse_color_component(input)?;
    let _ = input.try_parse(|i| i.expect_comma());
    let g = parse_color_component(input)?;
    let _ = input.try_parse(|i| i.expect_comma());
    let b = parse_color_component(input)?;
    // Alpha, if any, is irrelevant to the targets.
    while input.next().is_ok() {}
    Ok(rgb_to_hex(r, g, b))
}

fn parse_color_component<'i>(input: &mut Parser<'i, '_>) -> Result<u8, ParseError<'i, ()>> {
    let location = input.current_source_location();
    match *input.next()? {
        Token::Number { value, .. } => Ok(value.round().clamp(0.0, 255.0) as u8),
        Token::Percentage { unit_value, .. } => {
            Ok((unit_value * 255.0).round().clamp(0.0, 255.0) as u8)
        }
        _ => Err(location.new_custom_error(())),
    }
}

fn parse_length(input: &mut Parser<'_, '_>) -> Option<CssLength> {
    match *input.next().ok()? {
        Token::Dimension {
            value, ref unit, ..
        } => CssLength::from_dimension(value, unit),
        Token::Percentage { unit_value, .. } => Some(CssLength::Percent(unit_value * 100.0)),
        // Unitless numbers are treated as pixels (legacy attribute style).
        Token::Number { value, .. } => Some(CssLength::Px(value)),
        _ => None,
    }
}

fn font_size_points(length: CssLength) -> Option<f32> {
    match length {
        CssLength::Pt(v) => to_font_points(v, "pt"),
        CssLength::Px(v) => to_font_points(v, "px"),
        CssLength::Em(_) | CssLength::Percent(_) => None,
    }
}

fn parse_font_weight(input: &mut Parser<'_, '_>) -> Option<bool> {
    match *input.next().ok()? {
        Token::Ident(ref keyword) => match keyword.to_ascii_lowercase().as_str() {
            "bold" | "bolder" => Some(true),
            "normal" | "lighter" => Some(false),
            _ => None,
        },
        Token::Number { value, .. } => Some(value >= 600.0),
        _ => None,
    }
}

/// First entry of a font-family list, e.g. `"Segoe UI", Arial` -> `Segoe UI`.
fn parse_first_family(input: &mut Parser<'_, '_>) -> Option<String> {
    if let Ok(quoted) = input.try_parse(|i| i.expect_string_cloned()) {
        let family = quoted.trim().to_string();
        return (!family.is_empty()).then_some(family);
    }

    // Unquoted names are a run of identifiers: Times New Roman
    let mut words = Vec::new();
    while let Ok(word) = input.try_parse(|i| i.expect_ident_cloned()) {
        words.push(word.to_string());
    }
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_color_and_unrelated_property() {
        let style = resolve("color: rgb(255,0,0); font-weight: bold");
        assert_eq!(style.color.as_deref(), Some("FF0000"));
        assert_eq!(style.bold, Some(true));
    }

    #[test]
    fn test_hex_passthrough_uppercased() {
        assert_eq!(resolve("color:#1f3864").color.as_deref(), Some("1F3864"));
        assert_eq!(resolve("color:#abc").color.as_deref(), Some("AABBCC"));
    }

    #[test]
    fn test_named_color_fallback() {
        assert_eq!(resolve("color: navy").color.as_deref(), Some("000080"));
        assert_eq!(resolve("color: papayawhip").color, None);
    }

    #[test]
    fn test_background_shorthand() {
        let style = resolve("background: #eeeeee url(x.png) no-repeat");
        assert_eq!(style.background_color.as_deref(), Some("EEEEEE"));
    }

    #[test]
    fn test_font_size_units() {
        assert_eq!(resolve("font-size: 14pt").font_size_pt, Some(14.0));
        assert_eq!(resolve("font-size: 16px").font_size_pt, Some(12.0));
        assert_eq!(resolve("font-size: 1.2em").font_size_pt, None);
    }

    #[test]
    fn test_font_family_first_token() {
        let style = resolve(r#"font-family: "Segoe UI", Arial, sans-serif"#);
        assert_eq!(style.font_family.as_deref(), Some("Segoe UI"));
        let style = resolve("font-family: Times New Roman, serif");
        assert_eq!(style.font_family.as_deref(), Some("Times New Roman"));
    }

    #[test]
    fn test_alignment_mapping() {
        assert_eq!(resolve("text-align: justify").alignment, Some(Alignment::Justify));
        assert_eq!(resolve("text-align: start").alignment, Some(Alignment::Left));
        assert_eq!(resolve("color: red").alignment, None);
    }

    #[test]
    fn test_indent_conversion() {
        let style = resolve("margin-left: 20px; text-indent: 1em");
        assert_eq!(style.indent_left_units, Some(300));
        assert_eq!(style.indent_first_line_units, Some(240));
        assert_eq!(resolve("margin-left: 10pt").indent_left_units, Some(200));
        assert_eq!(resolve("margin-left: 5%").indent_left_units, None);
    }

    #[test]
    fn test_malformed_values_ignored() {
        let style = resolve("color: ; font-size: huge; text-align: 12px; garbage");
        assert!(style.is_empty());
    }

    #[test]
    fn test_later_declaration_wins() {
        let style = resolve("color: red; color: blue !important");
        assert_eq!(style.color.as_deref(), Some("0000FF"));
    }

    #[test]
    fn test_image_dimensions() {
        let style = resolve("width: 50%; height: 120pt");
        assert_eq!(style.width, Some(CssLength::Percent(50.0)));
        assert_eq!(style.height, Some(CssLength::Pt(120.0)));
    }

    #[test]
    fn test_text_decoration() {
        assert_eq!(resolve("text-decoration: underline dotted").underline, Some(true));
        assert_eq!(resolve("text-decoration: none").underline, Some(false));
    }

    #[test]
    fn test_referentially_transparent() {
        let s = "color:#333; font-size:11pt; margin-left: 2em";
        assert_eq!(resolve(s), resolve(s));
    }
}
