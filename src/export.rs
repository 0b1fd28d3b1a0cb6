//! Collection export to pretty JSON or flattened CSV.

use crate::entity::EntityType;
use crate::error::StoreError;
use crate::query::value_text;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(StoreError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub content: String,
}

/// `{collection}_{YYYY-MM-DD}.{ext}`, e.g. `rooms_2024-05-01.csv`.
pub fn file_name(entity_type: EntityType, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{}_{}.{}",
        entity_type.collection(),
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

pub fn export(
    entity_type: EntityType,
    records: &[Value],
    format: ExportFormat,
    date: NaiveDate,
) -> Result<ExportFile, StoreError> {
    let content = match format {
        ExportFormat::Json => to_json(records)?,
        ExportFormat::Csv => to_csv(records),
    };
    tracing::debug!(
        entity_type = %entity_type,
        format = %format,
        records = records.len(),
        "export"
    );
    Ok(ExportFile {
        file_name: file_name(entity_type, format, date),
        mime_type: format.mime_type(),
        content,
    })
}

pub fn to_json(records: &[Value]) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Header is the union of flattened paths in first-seen order. Every cell is
/// quoted; arrays are written as compact JSON.
pub fn to_csv(records: &[Value]) -> String {
    let rows: Vec<Vec<(String, &Value)>> = records
        .iter()
        .map(|r| {
            let mut cells = Vec::new();
            flatten("", r, &mut cells);
            cells
        })
        .collect();

    let mut headers: Vec<&str> = Vec::new();
    for row in &rows {
        for (key, _) in row {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }
    if headers.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.iter().map(|h| quote(h)).collect::<Vec<_>>().join(","));
    for row in &rows {
        let line = headers
            .iter()
            .map(|h| {
                row.iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| quote(&value_text(v)))
                    .unwrap_or_else(|| quote(""))
            })
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }
    lines.join("\n")
}

fn flatten<'a>(prefix: &str, value: &'a Value, out: &mut Vec<(String, &'a Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", prefix, k)
                };
                flatten(&key, v, out);
            }
        }
        _ if prefix.is_empty() => out.push(("value".to_string(), value)),
        _ => out.push((prefix.to_string(), value)),
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn csv_flattens_and_escapes() {
        let records = vec![
            json!({ "id": "h1", "name": "The \"Nest\"", "location": { "city": "Pune" }, "tags": ["wifi", "ac"] }),
            json!({ "id": "h2", "location": { "city": "Goa", "pincode": "403001" } }),
        ];
        let csv = to_csv(&records);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], r#""id","name","location.city","tags","location.pincode""#);
        assert_eq!(lines[1], r#""h1","The ""Nest""","Pune","[""wifi"",""ac""]","""#);
        assert_eq!(lines[2], r#""h2","","Goa","","403001""#);
    }

    #[test]
    fn json_round_trips_in_order() {
        let records = vec![json!({ "z": 1, "a": { "y": [1, 2], "b": null } }), json!({ "id": "x" })];
        let text = to_json(&records).unwrap();
        let back: Vec<Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, records);
        let keys: Vec<&String> = back[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert_eq!(
            "xml".parse::<ExportFormat>(),
            Err(StoreError::UnsupportedFormat("xml".into()))
        );
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
    }

    #[test]
    fn file_name_uses_collection_and_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(file_name(EntityType::Amenity, ExportFormat::Csv, date), "amenities_2024-05-01.csv");
    }

    #[test]
    fn empty_collection_exports_empty_csv() {
        assert_eq!(to_csv(&[]), "");
        assert_eq!(to_json(&[]).unwrap(), "[]");
    }
}
