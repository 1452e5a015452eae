/// Row Type Coercion
///
/// Each fetched row is post-processed before it reaches the caller: columns
/// whose description carries a TIMESTAMP, DATE or TIME category arrive from
/// the native client as text and are replaced with structured chrono values.
/// Coercion runs per row, since the description is consulted again for
/// every row handed out.

use crate::core::db::native::{ColumnDescription, Row, TypeCategory, Value};
use crate::core::{AdapterError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};

const TIMESTAMP_TZ_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// Timezone policy attached to every cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimezonePolicy {
    /// Offsets are kept as the server reported them
    #[default]
    Unset,
    /// The session must run in UTC; any other offset is rejected
    Utc,
}

impl TimezonePolicy {
    pub fn from_use_tz(use_tz: bool) -> Self {
        if use_tz {
            TimezonePolicy::Utc
        } else {
            TimezonePolicy::Unset
        }
    }

    fn apply(self, offset_seconds: i32) -> Result<Option<FixedOffset>> {
        match self {
            TimezonePolicy::Unset => Ok(None),
            TimezonePolicy::Utc => utc_tzinfo_factory(offset_seconds).map(Some),
        }
    }
}

/// Returns the UTC offset, refusing anything but a zero offset.
pub fn utc_tzinfo_factory(offset_seconds: i32) -> Result<FixedOffset> {
    if offset_seconds != 0 {
        return Err(AdapterError::NonUtcOffset { offset_seconds });
    }
    Ok(Utc.fix())
}

/// Parses one raw temporal string according to its column category.
///
/// Non-temporal categories are returned as text unchanged.
pub fn parse_temporal(category: TypeCategory, raw: &str, policy: TimezonePolicy) -> Result<Value> {
    let text = raw.trim();
    match category {
        TypeCategory::Timestamp => parse_timestamp(text, policy),
        TypeCategory::Date => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(Value::Date)
            .map_err(|e| coercion_failure(raw, e)),
        TypeCategory::Time => parse_time(text, policy),
        _ => Ok(Value::Text(raw.to_string())),
    }
}

fn parse_timestamp(text: &str, policy: TimezonePolicy) -> Result<Value> {
    for format in TIMESTAMP_TZ_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(text, format) {
            let aware = match policy.apply(parsed.offset().local_minus_utc())? {
                Some(tz) => parsed.with_timezone(&tz),
                None => parsed,
            };
            return Ok(Value::TimestampTz(aware));
        }
    }

    let mut last_error = None;
    for format in TIMESTAMP_FORMATS {
        match NaiveDateTime::parse_from_str(text, format) {
            Ok(parsed) => return Ok(Value::Timestamp(parsed)),
            Err(e) => last_error = Some(e),
        }
    }

    // A bare date in a timestamp column means midnight
    if let Some(midnight) = NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Value::Timestamp(midnight));
    }

    Err(AdapterError::Coercion {
        column: String::new(),
        value: text.to_string(),
        reason: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unrecognized timestamp".to_string()),
    })
}

fn parse_time(text: &str, policy: TimezonePolicy) -> Result<Value> {
    if let Ok(parsed) = NaiveTime::parse_from_str(text, TIME_FORMAT) {
        return Ok(Value::Time(parsed));
    }

    // timetz: "HH:MM:SS[.f]+hh[:mm]"
    let split = text
        .rfind(|c: char| c == '+' || c == '-')
        .ok_or_else(|| coercion_failure(text, "unrecognized time"))?;
    let (time_part, offset_part) = text.split_at(split);
    let offset_seconds =
        parse_offset(offset_part).ok_or_else(|| coercion_failure(text, "unrecognized time offset"))?;
    policy.apply(offset_seconds)?;

    NaiveTime::parse_from_str(time_part, TIME_FORMAT)
        .map(Value::Time)
        .map_err(|e| coercion_failure(text, e))
}

/// Parses "+hh", "+hhmm" or "+hh:mm" into seconds east of UTC.
fn parse_offset(offset: &str) -> Option<i32> {
    let sign = match offset.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits: String = offset[1..].chars().filter(|c| *c != ':').collect();
    if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = if digits.len() > 2 {
        (&digits[..2], &digits[2..])
    } else {
        (digits.as_str(), "0")
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    Some(sign * (hours * 3600 + minutes * 60))
}

fn coercion_failure(value: &str, reason: impl ToString) -> AdapterError {
    AdapterError::Coercion {
        column: String::new(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Converts the temporal columns of `row` in place.
///
/// Without a description the row comes back untouched; non-text values in
/// temporal columns (NULLs, already structured values) pass through too.
pub fn coerce_row(description: Option<&[ColumnDescription]>, mut row: Row, policy: TimezonePolicy) -> Result<Row> {
    let Some(description) = description else {
        return Ok(row);
    };

    for (index, column) in description.iter().enumerate() {
        if !column.category.is_temporal() {
            continue;
        }
        let Some(slot) = row.get_mut(index) else {
            break;
        };
        if let Value::Text(raw) = slot {
            let parsed = parse_temporal(column.category, raw, policy).map_err(|e| match e {
                AdapterError::Coercion { value, reason, .. } => AdapterError::Coercion {
                    column: column.name.clone(),
                    value,
                    reason,
                },
                other => other,
            })?;
            *slot = parsed;
        }
    }

    Ok(row)
}
