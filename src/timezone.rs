//! Local time helpers for the configured timezone.

use time::{Date, OffsetDateTime, UtcOffset, macros::format_description};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// The current UTC offset of `canonical_timezone`, e.g. "America/Sao_Paulo".
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Today's date in `canonical_timezone`.
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if the timezone is not known.
pub fn today(canonical_timezone: &str) -> Result<Date, Error> {
    let offset = get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))?;

    Ok(OffsetDateTime::now_utc().to_offset(offset).date())
}

/// Format `date` the Brazilian way, e.g. "18/10/2026".
pub fn format_day(date: Date) -> String {
    let format = format_description!("[day]/[month]/[year]");

    date.format(format)
        .unwrap_or_else(|_| format!("{:02}/{:02}/{}", date.day(), u8::from(date.month()), date.year()))
}
