use std::borrow::Cow;

use super::Record;

/// Splits raw CSV text into logical lines, respecting quoted sections.
/// A newline inside a quoted field stays part of the current line.
/// Handles `\n`, `\r\n` (one boundary) and lone `\r` (classic Mac) endings.
/// Lines that are blank after trimming are dropped.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '\n' if !in_quotes => {
                if !current.trim().is_empty() {
                    lines.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
            '\r' if !in_quotes => {
                // \r\n: drop the \r, the following \n closes the line.
                if chars.peek() != Some(&'\n') {
                    if !current.trim().is_empty() {
                        lines.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                }
            }
            _ => current.push(c),
        }
    }

    if !current.trim().is_empty() {
        lines.push(current);
    }

    lines
}

/// Parses one logical line into fields. A `"` toggles quote state, a `,`
/// outside quotes ends the field, and `""` inside a quoted field yields a
/// literal quote. Fields are trimmed. Unbalanced quotes never error; the
/// parser emits best-effort fields from whatever state it ends in.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    fields.push(current.trim().to_string());
    fields
}

/// Parses a whole CSV document into records, using the first non-blank line
/// as the header. Short rows are padded with empty values; values beyond the
/// header width are dropped. Returns an empty set when the input has fewer
/// than two non-blank lines.
pub fn parse_document(text: &str) -> Vec<Record> {
    let lines = split_lines(text.trim());

    if lines.len() < 2 {
        return Vec::new();
    }

    let headers = parse_line(&lines[0]);
    let mut records = Vec::with_capacity(lines.len() - 1);

    for line in &lines[1..] {
        if line.trim().is_empty() {
            continue;
        }
        let values = parse_line(line);
        let mut record = Record::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            record.insert(header.clone(), values.get(i).cloned().unwrap_or_default());
        }
        records.push(record);
    }

    records
}

/// Quote-wraps a value for CSV output iff it contains a comma, quote, or
/// newline, doubling internal quotes.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Serializes one row of fields using the `escape_field` rule.
pub fn serialize_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| escape_field(f.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}
