/// Hint for value formatting; `Text` still auto-detects purely numeric
/// values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Phone,
    Population,
}

/// Humanizes a raw column name for labels: `_` and `-` become spaces and
/// each word-initial letter is capitalized. The rest of the word keeps its
/// original case.
pub fn format_field_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if c == '_' || c == '-' {
            out.push(' ');
            at_word_start = true;
        } else if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Small words kept lowercase inside a humanized key, and abbreviations
/// rendered in full caps.
const LOWERCASE_WORDS: &[&str] = &[
    "in", "to", "of", "for", "and", "or", "but", "at", "by", "with", "from", "on", "as", "is",
    "the", "a", "an",
];
const UPPERCASE_WORDS: &[&str] = &["id", "url"];

/// Title-cases a key for display: underscores become spaces, the first word
/// and all non-filler words are capitalized, and ID/URL are upcased.
pub fn format_key_name(key: &str) -> String {
    key.replace('_', " ")
        .split(' ')
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if UPPERCASE_WORDS.contains(&lower.as_str()) {
                word.to_uppercase()
            } else if i == 0 || !LOWERCASE_WORDS.contains(&lower.as_str()) {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                    None => String::new(),
                }
            } else {
                lower
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats a field value for display: phone-like values are grouped as
/// `(XXX) XXX-XXXX`, and purely numeric values above 1000 gain thousands
/// separators. Anything else passes through unchanged. A `Population` hint
/// suppresses phone detection, so a ten-digit count is never mistaken for a
/// phone number.
pub fn format_field_value(value: &str, kind: FieldKind) -> String {
    if value.is_empty() {
        return String::new();
    }

    if kind == FieldKind::Phone || (kind == FieldKind::Text && phone_like(value)) {
        if let Some(formatted) = format_phone(value) {
            return formatted;
        }
    }

    if kind == FieldKind::Population || value.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(n) = value.parse::<i64>() {
            if n > 1000 {
                return group_thousands(n);
            }
        }
    }

    value.to_string()
}

/// A value that contains nothing but digits, spaces, dashes, parentheses and
/// an optional leading plus.
fn phone_like(value: &str) -> bool {
    let rest = value.strip_prefix('+').unwrap_or(value);
    !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
}

/// Rewrites the first run of ten consecutive digits as `(XXX) XXX-XXXX`,
/// leaving surrounding text intact. Returns `None` when no such run exists.
fn format_phone(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut start = None;
    let mut run = 0;
    for (i, b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            if run == 0 {
                start = Some(i);
            }
            run += 1;
            if run == 10 {
                let s = start?;
                let digits = &value[s..i + 1];
                return Some(format!(
                    "{}({}) {}-{}{}",
                    &value[..s],
                    &digits[..3],
                    &digits[3..6],
                    &digits[6..10],
                    &value[i + 1..],
                ));
            }
        } else {
            run = 0;
        }
    }
    None
}

fn group_thousands(n: i64) -> String {
    let digits = n.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
