//! Decoding of upstream JSON bodies.
//!
//! The match and team services answer with loosely shaped JSON objects. This
//! module decides what counts as "no record" and pulls the numeric fields the
//! recommender needs, leaving anything else alone.
//!
//! Rules:
//! - an empty or whitespace-only body, `null`, or `{}` is "no record"
//! - any other non-object JSON value is an `InvalidRecord` error
//! - numeric fields accept JSON numbers and numeric strings; any other value
//!   is treated as absent

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, UpstreamError};
use crate::types::{MatchContext, MatchId, PlayerContext, PlayerId};

/// A decoded upstream JSON object
pub type Record = Map<String, Value>;

/// Parse a response body into a record.
///
/// `source` is only used to label errors (usually the request URL).
pub fn parse_record(source: &str, body: &[u8]) -> Result<Option<Record>> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| UpstreamError::InvalidRecord {
            url: source.to_string(),
            reason: e.to_string(),
        })?;

    match value {
        Value::Null => Ok(None),
        Value::Object(map) if map.is_empty() => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => Err(UpstreamError::InvalidRecord {
            url: source.to_string(),
            reason: format!("expected a JSON object, got {}", kind_of(&other)),
        }),
    }
}

/// Build a `MatchContext` from a match-service record
pub fn match_from_record(match_id: MatchId, record: &Record) -> MatchContext {
    MatchContext {
        match_id,
        weather_condition: numeric_field(record, "weather_condition"),
        pitch_condition: numeric_field(record, "pitch_condition"),
    }
}

/// Build a `PlayerContext` from a team-service stats record
pub fn player_from_record(player_id: PlayerId, record: &Record) -> PlayerContext {
    PlayerContext {
        player_id,
        historical_avg_points: numeric_field(record, "historical_avg_points"),
    }
}

/// Read a numeric field, accepting numbers and numeric strings.
fn numeric_field(record: &Record, field: &str) -> Option<f64> {
    let value = record.get(field)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Some(v),
        _ => {
            debug!(field, value = %value, "Ignoring non-numeric upstream field");
            None
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(body: &str) -> Record {
        parse_record("test", body.as_bytes())
            .expect("body should parse")
            .expect("body should contain a record")
    }

    #[test]
    fn test_empty_bodies_are_not_records() {
        assert!(parse_record("test", b"").unwrap().is_none());
        assert!(parse_record("test", b"  \n").unwrap().is_none());
        assert!(parse_record("test", b"null").unwrap().is_none());
        assert!(parse_record("test", b"{}").unwrap().is_none());
    }

    #[test]
    fn test_non_object_is_invalid() {
        let err = parse_record("http://x/matches/1", b"[1, 2]").unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidRecord { .. }));
        assert!(err.to_string().contains("an array"));

        let err = parse_record("test", b"{not json").unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidRecord { .. }));
    }

    #[test]
    fn test_match_from_record_reads_conditions() {
        let rec = record(r#"{"weather_condition": 1, "pitch_condition": 0, "venue": "Eden"}"#);
        let context = match_from_record(10, &rec);

        assert_eq!(context.match_id, 10);
        assert_eq!(context.weather_condition, Some(1.0));
        assert_eq!(context.pitch_condition, Some(0.0));
    }

    #[test]
    fn test_match_from_record_missing_fields_are_none() {
        let rec = record(r#"{"pitch_condition": "1"}"#);
        let context = match_from_record(3, &rec);

        assert_eq!(context.weather_condition, None);
        assert_eq!(context.pitch_condition, Some(1.0));
    }

    #[test]
    fn test_player_from_record_ignores_non_numeric_values() {
        let rec = record(r#"{"historical_avg_points": "n/a"}"#);
        assert_eq!(player_from_record(7, &rec).historical_avg_points, None);

        let rec = record(r#"{"historical_avg_points": true}"#);
        assert_eq!(player_from_record(7, &rec).historical_avg_points, None);

        let rec = record(r#"{"historical_avg_points": 65.5}"#);
        assert_eq!(player_from_record(7, &rec).historical_avg_points, Some(65.5));
    }
}
