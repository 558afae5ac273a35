use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Calendar bucketing columns derived from `createdAt`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeFields {
    pub created_at: Option<DateTime<Utc>>,
    pub dt: Option<String>,
    pub iso_year: Option<i32>,
    pub iso_week: Option<String>,
    pub week_start: Option<NaiveDate>,
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Lenient timestamp parsing. Naive values are taken as UTC; numbers are epoch milliseconds.
pub fn parse_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => parse_str(s.trim()),
        Value::Number(n) => {
            let ms = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::<Utc>::from_timestamp_millis(ms)
        }
        Value::Object(m) => {
            if let Some(inner) = m.get("$date") {
                return parse_timestamp(inner);
            }
            m.get("$numberLong")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<i64>().ok())
                .and_then(DateTime::<Utc>::from_timestamp_millis)
        }
        _ => None,
    }
}

fn parse_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

pub fn time_fields(created_at: Option<&Value>) -> TimeFields {
    let Some(ts) = created_at.and_then(parse_timestamp) else {
        return TimeFields::default();
    };
    let date = ts.date_naive();
    let iso = date.iso_week();
    TimeFields {
        created_at: Some(ts),
        dt: Some(date.format("%Y-%m-%d").to_string()),
        iso_year: Some(iso.year()),
        iso_week: Some(format!("{}{:02}", iso.year(), iso.week())),
        week_start: Some(week_start(date)),
    }
}
