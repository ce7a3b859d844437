//! Record lists from generic-mode responses.
//!
//! List operations answer with
//! `API/response/operation/Details/record[*]/parameter[*]`. After generic
//! conversion a single `record` (or a single `parameter`) is an object
//! while several are an array; [`extract_records`] hides the difference.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{OneOrMany, Parameter};
use crate::error::SdpError;

/// One result row: parameter name to value.
pub type Record = BTreeMap<String, Option<String>>;

/// JSON pointer to the record list in a generic-mode response.
pub const RECORD_PATH: &str = "/API/response/operation/Details/record";

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    parameter: Option<OneOrMany<Parameter>>,
}

/// Returns each record's parameters in source order.
///
/// An absent record path yields no records.
pub(crate) fn record_parameters(response: &Value) -> Result<Vec<Vec<Parameter>>, SdpError> {
    let records = match response.pointer(RECORD_PATH) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(records) => records,
    };

    let records = OneOrMany::<RawRecord>::deserialize(records)?.into_vec();
    Ok(records
        .into_iter()
        .map(|r| r.parameter.map(OneOrMany::into_vec).unwrap_or_default())
        .collect())
}

/// Flattens the records of a generic-mode response.
///
/// The result is always a list, in source order, whether the server sent
/// no record, one record, or many. Within a record a repeated parameter
/// name keeps its last value; parameters without a name are skipped.
///
/// # Errors
///
/// Returns `SdpError::Serialization` if `record` is present but is not an
/// object or array of objects with `parameter` children.
pub fn extract_records(response: &Value) -> Result<Vec<Record>, SdpError> {
    Ok(record_parameters(response)?
        .into_iter()
        .map(|params| {
            params
                .into_iter()
                .filter_map(|p| p.name.map(|name| (name, p.value)))
                .collect()
        })
        .collect())
}

/// Converts an epoch-millisecond string to a local date/time.
///
/// Decimal input is truncated to whole milliseconds. The conversion uses
/// the process's local time zone; the instant is the same whatever that
/// zone is.
///
/// # Errors
///
/// Returns `SdpError::InvalidTimestamp` if the input is not a number or
/// lies outside the representable range.
pub fn epoch_to_datetime(epoch: &str) -> Result<DateTime<Local>, SdpError> {
    let invalid = || SdpError::InvalidTimestamp {
        value: epoch.to_string(),
    };

    let trimmed = epoch.trim();
    let millis = match trimmed.parse::<i64>() {
        Ok(ms) => ms,
        Err(_) => trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f as i64)
            .ok_or_else(invalid)?,
    };

    Local.timestamp_millis_opt(millis).single().ok_or_else(invalid)
}

/// A record together with one of its epoch fields parsed as a date/time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatedRecord {
    /// The flattened record, raw epoch value included.
    pub fields: Record,

    /// The parsed timestamp, `None` when the field is absent or empty.
    pub timestamp: Option<DateTime<Local>>,
}

impl DatedRecord {
    /// Parses `timestamp_field` of `fields`.
    ///
    /// # Errors
    ///
    /// Returns `SdpError::InvalidTimestamp` if the field holds a non-numeric value.
    pub fn from_record(fields: Record, timestamp_field: &str) -> Result<Self, SdpError> {
        let timestamp = match fields.get(timestamp_field) {
            Some(Some(raw)) => Some(epoch_to_datetime(raw)?),
            _ => None,
        };
        Ok(Self { fields, timestamp })
    }

    /// Returns the value of a field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_deref())
    }
}

/// Extracts records and parses `timestamp_field` in each.
pub fn extract_dated_records(
    response: &Value,
    timestamp_field: &str,
) -> Result<Vec<DatedRecord>, SdpError> {
    extract_records(response)?
        .into_iter()
        .map(|record| DatedRecord::from_record(record, timestamp_field))
        .collect()
}
