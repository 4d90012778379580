// src/models/timestamp.rs

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

// Formatos aceitos: "2024-03-01T10:00:00", com fração de segundo, ou RFC 3339 com fuso.
pub fn parse(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.naive_local()))
}

/// Datas ilegíveis viram `None` em vez de invalidar a resposta inteira.
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(serde_json::Value::as_str).and_then(parse))
}

pub fn format(value: &Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_local_and_offset_timestamps() {
        assert!(parse("2024-03-01T10:15:30").is_some());
        assert!(parse("2024-03-01T10:15:30.123456").is_some());
        assert!(parse("2024-03-01 10:15:30").is_some());
        assert!(parse("2024-03-01T10:15:30-03:00").is_some());
        assert!(parse("ontem").is_none());
    }

    #[test]
    fn formats_for_display() {
        let dt = parse("2024-03-01T10:15:30").unwrap();
        assert_eq!(format(&Some(dt)), "01/03/2024 10:15");
        assert_eq!(format(&None), "-");
    }
}
