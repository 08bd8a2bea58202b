//! Date token validation.
//!
//! Date fields are reported exactly as written in the document; this module
//! only decides whether a date-shaped token is a real calendar date.

use chrono::NaiveDate;

use super::patterns::DATE_PARTS;

/// Interpret a date-shaped token, trying year-first, then day-first, then
/// month-first component order.
pub fn parse_date_token(token: &str) -> Option<NaiveDate> {
    let caps = DATE_PARTS.captures(token.trim())?;
    let a = &caps[1];
    let b: u32 = caps[2].parse().ok()?;
    let c = &caps[3];

    if a.len() == 4 {
        let year: i32 = a.parse().ok()?;
        let day: u32 = c.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, b, day);
    }

    if c.len() == 3 {
        return None;
    }
    let first: u32 = a.parse().ok()?;
    let year = parse_year(c)?;

    NaiveDate::from_ymd_opt(year, b, first).or_else(|| NaiveDate::from_ymd_opt(year, first, b))
}

/// Whether a date-shaped token names a real calendar date.
pub fn is_calendar_date(token: &str) -> bool {
    parse_date_token(token).is_some()
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if s.len() <= 2 {
        // Two-digit year: assume 2000s for 00-50, 1900s for 51-99
        if year <= 50 {
            Some(2000 + year)
        } else {
            Some(1900 + year)
        }
    } else {
        Some(year)
    }
}
