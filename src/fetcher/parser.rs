//! Response parsing for the metrics API
//!
//! Stateless helpers turning the JSON envelopes returned by the API into the
//! crate's data model. Only presence is checked; metric values are kept as
//! the API sent them.

use crate::fetcher::{FetcherError, FetcherResult};
use crate::{MetricValue, ObservationRow, SeriesResult};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Fields of a series record that are not metric values
const NON_METRIC_FIELDS: [&str; 2] = ["time", "asset"];

/// Generic `{"data": ...}` envelope
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    /// Payload; absent or null when the API had nothing to return
    pub data: Option<T>,
}

/// Envelope of a time-series page
#[derive(Debug, Deserialize)]
pub struct SeriesEnvelope {
    /// Per-day records
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    /// Token of the next page, if the series was cut at the page size
    #[serde(default)]
    pub next_page_token: Option<String>,
    /// URL of the next page
    #[serde(default)]
    pub next_page_url: Option<String>,
}

/// Stateless parser for series records
pub struct SeriesParser;

impl SeriesParser {
    /// Parse the `data` array of a series response.
    ///
    /// # Errors
    /// Returns [`FetcherError::ParseError`] if a record is not an object or
    /// lacks a usable `time` field
    pub fn parse_rows(records: Vec<Value>) -> FetcherResult<SeriesResult> {
        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| match record {
                Value::Object(fields) => Self::parse_row(&fields),
                other => Err(FetcherError::ParseError(format!(
                    "Record {i} is not an object: {other}"
                ))),
            })
            .collect()
    }

    /// Parse one record into an [`ObservationRow`].
    pub fn parse_row(fields: &Map<String, Value>) -> FetcherResult<ObservationRow> {
        let time = fields
            .get("time")
            .and_then(Value::as_str)
            .ok_or_else(|| FetcherError::ParseError("Record has no time field".to_string()))?;
        let mut row = ObservationRow::new(Self::parse_day(time)?);

        for (key, value) in fields {
            if NON_METRIC_FIELDS.contains(&key.as_str()) {
                continue;
            }
            if let Some(value) = Self::parse_value(value) {
                row.values.insert(key.clone(), value);
            }
        }

        Ok(row)
    }

    /// Truncate an ISO-8601 timestamp to its calendar day.
    ///
    /// # Example
    /// `2024-01-01T00:00:00.000000000Z` → `2024-01-01`
    pub fn parse_day(timestamp: &str) -> FetcherResult<NaiveDate> {
        let day = timestamp.split('T').next().unwrap_or(timestamp);
        NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map_err(|e| FetcherError::ParseError(format!("Invalid time '{timestamp}': {e}")))
    }

    fn parse_value(value: &Value) -> Option<MetricValue> {
        match value {
            Value::Number(n) => Some(MetricValue::Number(n.clone())),
            Value::String(s) => Some(MetricValue::Text(s.clone())),
            Value::Bool(b) => Some(MetricValue::Text(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}
