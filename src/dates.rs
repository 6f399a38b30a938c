use serde::{Deserialize, Deserializer};
use time::{macros::format_description, Date, OffsetDateTime, UtcOffset};

/// Deserializes an optional `YYYY-MM-DD` day; blank counts as absent.
pub fn day_opt<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => {
            let day = parse_day(s).map_err(serde::de::Error::custom)?;
            if day_bounds(day).is_none() {
                return Err(serde::de::Error::custom("date is out of range"));
            }
            Ok(Some(day))
        }
    }
}

pub fn parse_day(s: &str) -> Result<Date, time::error::Parse> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
}

/// `[start, end)` of a UTC calendar day, `None` for the last representable day.
pub fn day_bounds(day: Date) -> Option<(OffsetDateTime, OffsetDateTime)> {
    let end = day.next_day()?.midnight().assume_utc();
    Some((day.midnight().assume_utc(), end))
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

pub fn utc_day(at: OffsetDateTime) -> Date {
    at.to_offset(UtcOffset::UTC).date()
}
