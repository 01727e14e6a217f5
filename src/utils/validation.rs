//! Value checks applied while comparing tool-reported element text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::normalize::eq_ignore_case;

/// Element whose values are line terminator styles.
pub const LINEBREAK_ELEMENT: &str = "linebreak";

/// Maximum size of an uploaded manifest accepted by the web service
pub const MAX_MANIFEST_SIZE: usize = 16 * 1024 * 1024; // 16MB

/// Maximum element nesting accepted when reading an XML document
pub const MAX_XML_DEPTH: usize = 256;

/// Optional sign, digits, optional fraction. No exponents, no bare dots.
static REAL_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?\d+(\.\d+)?$").expect("real number pattern is valid"));

/// Check whether a value looks like a plain real number.
///
/// # Examples
///
/// ```
/// use fileid_reconcile::utils::validation::is_real_number;
///
/// assert!(is_real_number("300"));
/// assert!(is_real_number("-0.5"));
/// assert!(!is_real_number("1e3"));
/// assert!(!is_real_number("72 dpi"));
/// ```
#[must_use]
pub fn is_real_number(s: &str) -> bool {
    REAL_NUMBER.is_match(s)
}

/// Two values agree if they match ignoring case, or if both are real
/// numbers with the same numeric value ("300" and "300.0").
#[must_use]
pub fn values_agree(a: &str, b: &str) -> bool {
    if eq_ignore_case(a, b) {
        return true;
    }
    if is_real_number(a) && is_real_number(b) {
        return match (a.parse::<f64>(), b.parse::<f64>()) {
            (Ok(x), Ok(y)) => x.total_cmp(&y).is_eq(),
            _ => false,
        };
    }
    false
}

/// Rewrite a `CRLF` line terminator label to the `CR/LF` spelling.
#[must_use]
pub fn normalize_linebreak(value: &str) -> String {
    if value == "CRLF" {
        "CR/LF".to_string()
    } else {
        value.to_string()
    }
}

/// Check if a character is allowed in an XML 1.0 document
#[must_use]
pub fn is_valid_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Drop characters that cannot appear in an XML 1.0 document.
#[must_use]
pub fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars().filter(|&c| is_valid_xml_char(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_real_number() {
        assert!(is_real_number("300"));
        assert!(is_real_number("300.0"));
        assert!(is_real_number("+12.25"));
        assert!(!is_real_number("300."));
        assert!(!is_real_number(".5"));
        assert!(!is_real_number(""));
        assert!(!is_real_number("NaN"));
    }

    #[test]
    fn test_values_agree_numeric() {
        assert!(values_agree("300", "300.0"));
        assert!(values_agree("-1", "-1.000"));
        assert!(!values_agree("300", "301"));
        // "0" and "-0" compare unequal under total ordering
        assert!(!values_agree("0", "-0"));
    }

    #[test]
    fn test_values_agree_text() {
        assert!(values_agree("JPEG", "jpeg"));
        assert!(!values_agree("JPEG", "JFIF"));
        assert!(!values_agree("300 dpi", "300.0 dpi"));
    }

    #[test]
    fn test_normalize_linebreak() {
        assert_eq!(normalize_linebreak("CRLF"), "CR/LF");
        assert_eq!(normalize_linebreak("LF"), "LF");
        assert_eq!(normalize_linebreak("CR"), "CR");
    }

    #[test]
    fn test_strip_invalid_xml_chars() {
        assert_eq!(strip_invalid_xml_chars("ok\u{0}text\u{1b}"), "oktext");
        assert_eq!(strip_invalid_xml_chars("tab\there"), "tab\there");
    }
}
