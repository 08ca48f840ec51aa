use std::borrow::Cow;

use regex::Regex;

use crate::util::escape_xml;

/// Drop a heading that repeats the section title at the top of its body.
///
/// Two case-insensitive patterns are tried, each removing its first match
/// only: an `h1`-`h3` whose text is exactly the title, and one whose text is
/// a `"N. "` numeral followed by the title. Deeper headings are left alone.
/// This is text matching: a later heading that happens to equal the title is
/// removed just the same if it is the first match.
pub fn remove_duplicate_title<'a>(body: &'a str, title: &str) -> Cow<'a, str> {
    let title = title.trim();
    if title.is_empty() {
        return Cow::Borrowed(body);
    }

    let literal = regex::escape(title);
    let escaped = regex::escape(&escape_xml(title));
    let title_alt = if literal == escaped {
        literal
    } else {
        format!("(?:{literal}|{escaped})")
    };

    let exact = format!(r"(?is)<h[1-3](?:\s[^>]*)?>\s*{title_alt}\s*</h[1-3]\s*>");
    let numbered = format!(r"(?is)<h[1-3](?:\s[^>]*)?>\s*\d+\.\s+{title_alt}\s*</h[1-3]\s*>");

    let mut result = Cow::Borrowed(body);
    for pattern in [exact, numbered] {
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => {
                log::warn!("duplicate-title pattern failed to compile: {e}");
                continue;
            }
        };
        let replaced = match re.replacen(&result, 1, "") {
            Cow::Owned(replaced) => Some(replaced),
            Cow::Borrowed(_) => None,
        };
        if let Some(replaced) = replaced {
            result = Cow::Owned(replaced);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_numbered_heading() {
        let out = remove_duplicate_title("<h2>4. Introduction</h2><p>Text</p>", "Introduction");
        assert_eq!(out, "<p>Text</p>");
    }

    #[test]
    fn test_keeps_headings_without_numeral_dot() {
        for body in [
            "<h2>4 Introduction</h2><p>Text</p>",
            "<h2>4.2 Introduction</h2><p>Text</p>",
            "<h2>4.2. Introduction</h2><p>Text</p>",
        ] {
            assert_eq!(remove_duplicate_title(body, "Introduction"), body);
        }
    }

    #[test]
    fn test_removes_exact_heading_case_insensitive() {
        let out = remove_duplicate_title(
            "<H1 class=\"t\">  introduction </H1><p>Body</p>",
            "Introduction",
        );
        assert_eq!(out, "<p>Body</p>");
    }

    #[test]
    fn test_leaves_h4_and_other_text() {
        let body = "<h4>Introduction</h4><p>Introduction</p>";
        assert_eq!(remove_duplicate_title(body, "Introduction"), body);
    }

    #[test]
    fn test_only_first_match_per_pattern() {
        let out = remove_duplicate_title(
            "<h1>Scope</h1><p>a</p><h2>Scope</h2><h3>2. Scope</h3><h3>3. Scope</h3>",
            "Scope",
        );
        assert_eq!(out, "<p>a</p><h2>Scope</h2><h3>3. Scope</h3>");
    }

    #[test]
    fn test_regex_metacharacters_and_entities() {
        let out = remove_duplicate_title("<h2>R&amp;D (Phase 1)?</h2><p>x</p>", "R&D (Phase 1)?");
        assert_eq!(out, "<p>x</p>");
    }

    #[test]
    fn test_unchanged_body_is_borrowed() {
        let body = "<p>nothing</p>";
        assert!(matches!(remove_duplicate_title(body, "Title"), Cow::Borrowed(_)));
    }
}
