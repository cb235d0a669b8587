use unicode_normalization::UnicodeNormalization;

/// Canonical comparison form: lowercase, NFD with combining marks
/// (U+0300..=U+036F) removed, trimmed.
pub fn normalize(input: &str) -> String {
    let lowered = input.to_lowercase();
    let stripped: String = lowered.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped.trim().to_string()
}

/// [`normalize`] for optional values; absent input yields `""`.
pub fn normalize_opt(input: Option<&str>) -> String {
    input.map(normalize).unwrap_or_default()
}

/// Splits a free-text query into normalized, non-empty terms.
pub fn query_terms(query: &str) -> Vec<String> {
    normalize(query)
        .split_whitespace()
        .map(ToString::to_string)
        .collect()
}

/// Leading-float parse: the longest numeric prefix after leading whitespace.
/// `"98.5mm"` parses as `98.5`; `"mm98"` does not parse.
pub fn parse_leading_float(input: &str) -> Option<f64> {
    let trimmed = input.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;
    let mut last_valid = None;
    while end < bytes.len() {
        let byte = bytes[end];
        match byte {
            b'0'..=b'9' => {
                seen_digit = true;
                last_valid = Some(end + 1);
            }
            b'.' if !seen_dot && !seen_exp => seen_dot = true,
            b'e' | b'E' if seen_digit && !seen_exp => {
                seen_exp = true;
                if matches!(bytes.get(end + 1), Some(b'+') | Some(b'-')) {
                    end += 1;
                }
            }
            _ => break,
        }
        end += 1;
    }
    let prefix = &trimmed[..last_valid?];
    prefix.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Whitespace-only strings count as unset.
pub fn blank_to_none(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}
