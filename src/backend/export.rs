use std::io::Write;

use anyhow::Result;

use super::{Record, tokenizer};

/// Writes records as CSV. Headers come from the first record; field order is
/// the record's own order. Values are quote-wrapped with the same rule the
/// parser accepts, so the output reloads losslessly.
pub fn write_csv(records: &[&Record], out: &mut dyn Write) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    writeln!(out, "{}", tokenizer::serialize_row(first.keys()))?;
    for record in records {
        writeln!(out, "{}", tokenizer::serialize_row(record.values()))?;
    }
    Ok(())
}

/// Writes records as a pretty-printed JSON array of objects.
pub fn write_json(records: &[&Record], out: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, records)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_csv_quotes_round_trip() {
        let r = record(&[("name", "Widgets, Inc."), ("note", "say \"hi\"")]);
        let mut out = Vec::new();
        write_csv(&[&r], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "name,note\n\"Widgets, Inc.\",\"say \"\"hi\"\"\"\n");

        let reloaded = tokenizer::parse_document(&text);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0], r);
    }

    #[test]
    fn test_empty_set_writes_nothing() {
        let mut out = Vec::new();
        write_csv(&[], &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_json_array_of_objects() {
        let r = record(&[("a", "1"), ("b", "2")]);
        let mut out = Vec::new();
        write_json(&[&r], &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["a"], "1");
        assert_eq!(value[0]["b"], "2");
    }
}
