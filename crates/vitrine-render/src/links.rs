//! Outbound links: WhatsApp numbers and user-supplied URLs.

use std::sync::LazyLock;

use regex::Regex;

static NON_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\D+").expect("digit pattern is valid"));

/// Brazilian country code, prepended to national numbers.
const DEFAULT_COUNTRY_CODE: &str = "55";

/// Normalize a phone number for a `wa.me` link.
///
/// Keeps digits only and prepends the country code to 10 and 11 digit
/// national numbers. Returns `None` when nothing dialable is left.
pub fn whatsapp_number(phone: &str) -> Option<String> {
    let digits = NON_DIGITS.replace_all(phone, "");
    match digits.len() {
        0..=7 => None,
        10 | 11 => Some(format!("{}{}", DEFAULT_COUNTRY_CODE, digits)),
        _ => Some(digits.into_owned()),
    }
}

/// Schemes a user-supplied link may use.
const ALLOWED_SCHEMES: [&str; 4] = ["http", "https", "mailto", "tel"];

/// Replacement for links that fail [`safe_url`].
pub const BLOCKED_URL: &str = "#";

/// Check a user-supplied URL before it lands in an `href` or `src`.
///
/// Relative URLs, fragments and `http`, `https`, `mailto`, `tel` and
/// `data:image/` URLs pass through trimmed. Anything else, such as a
/// `javascript:` URL, becomes [`BLOCKED_URL`].
pub fn safe_url(url: &str) -> &str {
    if is_safe_url(url) {
        url.trim()
    } else {
        tracing::debug!("Blocked unsafe link");
        BLOCKED_URL
    }
}

/// Whether a URL is relative or uses an allowed scheme.
pub fn is_safe_url(url: &str) -> bool {
    // Browsers ignore tabs, newlines and other controls inside a scheme
    let compact: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();

    let scheme = match compact.find(|c: char| matches!(c, ':' | '/' | '?' | '#')) {
        Some(i) if compact[i..].starts_with(':') => compact[..i].to_ascii_lowercase(),
        _ => return true,
    };

    ALLOWED_SCHEMES.contains(&scheme.as_str())
        || (scheme == "data" && compact.to_ascii_lowercase().starts_with("data:image/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_formatting_and_adds_country_code() {
        assert_eq!(
            whatsapp_number("(11) 98765-4321").as_deref(),
            Some("5511987654321")
        );
        assert_eq!(
            whatsapp_number("+55 11 98765-4321").as_deref(),
            Some("5511987654321")
        );
    }

    #[test]
    fn rejects_numbers_without_enough_digits() {
        assert_eq!(whatsapp_number(""), None);
        assert_eq!(whatsapp_number("ligue já"), None);
        assert_eq!(whatsapp_number("1234"), None);
    }

    #[test]
    fn keeps_web_and_relative_links() {
        for url in [
            "https://example.com/a?b=c",
            "http://example.com",
            "mailto:ana@example.com",
            "tel:+5511987654321",
            "#contato",
            "/sites/ana/",
            "catalogo.html",
            "data:image/png;base64,iVBORw==",
        ] {
            assert_eq!(safe_url(url), url);
        }
    }

    #[test]
    fn blocks_script_schemes() {
        for url in [
            "javascript:alert(1)",
            "  JavaScript:alert(1)",
            "java\tscript:alert(1)",
            "vbscript:msgbox(1)",
            "data:text/html,<script>alert(1)</script>",
        ] {
            assert_eq!(safe_url(url), BLOCKED_URL, "{url}");
        }
    }
}
