//! Front-matter date parsing and the date fragments used in URLs.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Naive date-time layouts accepted besides RFC 3339.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a front-matter date.
///
/// Accepts RFC 3339 (`2024-01-15T08:30:00Z`, `2024-01-15T08:30:00+02:00`),
/// naive date-times (treated as UTC) and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Zero-padded month, e.g. `"03"`.
pub fn month_string(date: &DateTime<Utc>) -> String {
    format!("{:02}", date.month())
}

/// `{year}-{MM}` prefix used for published file names.
pub fn year_month_prefix(date: &DateTime<Utc>) -> String {
    format!("{}-{}", date.year(), month_string(date))
}

/// Serde adapter for `Option<DateTime<Utc>>` that accepts every format [`parse`] does.
pub mod flexible {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => {
                serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) => super::parse(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date: `{s}`"))),
        }
    }
}

/// Serde adapter for a required `DateTime<Utc>`, written as RFC 3339.
pub mod required {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse(&s).ok_or_else(|| D::Error::custom(format!("invalid date: `{s}`")))
    }
}
