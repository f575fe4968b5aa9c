//! Generic CSV rendering for raw table rows.
//!
//! Fields are always double-quoted, with embedded quotes doubled; the
//! header row comes first. An empty row set renders as an empty string,
//! never as a lone header.

use serde_json::Value;

/// Render raw JSON rows as CSV. Column set comes from the first row's
/// keys; nulls render as empty fields.
pub fn rows_to_csv(rows: &[Value]) -> Result<String, String> {
    let Some(first) = rows.first().and_then(Value::as_object) else {
        return Ok(String::new());
    };

    let headers: Vec<String> = first.keys().cloned().collect();

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer
        .write_record(&headers)
        .map_err(|error| error.to_string())?;

    for row in rows {
        let record: Vec<String> = headers
            .iter()
            .map(|header| cell_text(row.get(header)))
            .collect();
        writer
            .write_record(&record)
            .map_err(|error| error.to_string())?;
    }

    let bytes = writer.into_inner().map_err(|error| error.to_string())?;
    let csv = String::from_utf8(bytes).map_err(|error| error.to_string())?;

    Ok(csv.trim_end_matches('\n').to_string())
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_rows_render_as_an_empty_string() {
        assert_eq!(rows_to_csv(&[]).unwrap(), "");
    }

    #[test]
    fn headers_come_from_the_first_row() {
        let rows = vec![
            json!({ "id": 1, "title": "Retreat" }),
            json!({ "id": 2, "title": "Vigil" }),
        ];

        let csv = rows_to_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), "\"id\",\"title\"");
        assert_eq!(lines.next().unwrap(), "\"1\",\"Retreat\"");
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn quotes_are_escaped_and_nulls_are_blank() {
        let rows = vec![json!({ "note": "say \"amen\"", "extra": null })];

        let csv = rows_to_csv(&rows).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("\"say \"\"amen\"\"\""));
        assert!(row.contains("\"\""));
    }
}
