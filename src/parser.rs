use regex::Regex;
use std::sync::OnceLock;

const CURRENCY_PREFIX: &str = "R$";

/// Brazilian amount: `.` groups thousands, `,` starts the cents.
fn amount_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,3}(?:\.\d{3})+|\d+)(?:,(\d{1,2}))?$").expect("amount regex is valid")
    })
}

/// Keeps the text up to the first whitespace, dropping unit labels such as
/// "m²" or "quartos".
pub fn leading_token(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

/// Parses the leading integer of a detail text like `"50 m²"`.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    leading_token(text.trim()).parse::<i64>().ok()
}

/// Parses a price text such as `"R$ 1.250"` or `"R$ 350,00 Condominio"`.
///
/// The currency prefix is optional; anything after the amount is ignored.
pub fn parse_currency(text: &str) -> Option<f64> {
    let text = text.trim();
    let text = text.strip_prefix(CURRENCY_PREFIX).unwrap_or(text);
    let amount = leading_token(text);

    let captures = amount_regex().captures(amount)?;
    let integer = captures.get(1)?.as_str().replace('.', "");
    let normalized = match captures.get(2) {
        Some(cents) => format!("{}.{}", integer, cents.as_str()),
        None => integer,
    };

    normalized.parse::<f64>().ok()
}

/// Keeps the leading clause of a descriptive sentence, cut at the first
/// comma or period.
pub fn truncate_title(text: &str) -> String {
    let text = text.trim();
    match text.find([',', '.']) {
        Some(end) => text[..end].trim().to_string(),
        None => text.to_string(),
    }
}

pub fn strip_city_suffix(location: &str, suffix: &str) -> String {
    let location = location.trim();
    location
        .strip_suffix(suffix)
        .unwrap_or(location)
        .trim()
        .to_string()
}

/// Prefixes relative hrefs with the site origin.
pub fn absolute_link(origin: &str, href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", origin.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", origin.trim_end_matches('/'), href)
    }
}
