//! Temporal literal sublanguage (component I, §4.I).
//!
//! Parses the text carried by `TemporalMarker`-tagged string tokens (`زمن "..."`,
//! `نقطة_زمنية "..."`, `مقدار_زمني "..."`, `قيمة_زمنية "..."`) into the
//! [`crate::temporal`] value types. Grounded the way the teacher's
//! `temporal_parse.rs` structures FHIRPath's date/time/datetime grammar: one
//! `parse_*` function per literal shape, built from small single-purpose helpers
//! rather than a single monolithic regex.

use chrono::{NaiveDate, NaiveTime};

use crate::error::{Error, ErrorKind, Position, Result};
use crate::locale::translit_digits;
use crate::temporal::{
    month_from_name, ArabicDate, ArabicDateTime, ArabicDuration, ArabicPeriod, ArabicTime, Calendar, PeriodWithDuration,
    TemporalAmount, TemporalPoint,
};

/// `زمن "الآن"` / `زمن "now"`: the current instant, ISO calendar, system-local clock.
pub fn parse_instant(text: &str, pos: Position) -> Result<TemporalPoint> {
    let trimmed = text.trim();
    if trimmed == "الآن" || trimmed.eq_ignore_ascii_case("now") {
        let now = chrono::Local::now().naive_local();
        return Ok(TemporalPoint::DateTime(ArabicDateTime {
            date: ArabicDate { calendar: Calendar::Iso, normalized: now.date() },
            time: ArabicTime { normalized: now.time(), ampm_written: false },
            offset_seconds: None,
        }));
    }
    parse_point(trimmed, pos)
}

/// `نقطة_زمنية "..."`: a date, time, or datetime literal — whichever shape the text
/// parses as (§4.I "a point literal is disambiguated by which fields are present").
pub fn parse_point(text: &str, pos: Position) -> Result<TemporalPoint> {
    let normalized = translit_digits(text.trim());
    if let Some(dt) = try_parse_datetime(&normalized, pos)? {
        return Ok(TemporalPoint::DateTime(dt));
    }
    if let Some(date) = try_parse_date(&normalized, pos)? {
        return Ok(TemporalPoint::Date(date));
    }
    if let Some(time) = try_parse_time(&normalized)? {
        return Ok(TemporalPoint::Time(time));
    }
    Err(Error::new(ErrorKind::Syntax, format!("تعذر تفسير القيمة الزمنية: {text}"), pos))
}

/// `مقدار_زمني "..."`: a duration, period, or combined period+duration.
pub fn parse_amount(text: &str, pos: Position) -> Result<TemporalAmount> {
    let normalized = translit_digits(text.trim());
    let period = try_parse_period(&normalized);
    let duration = try_parse_duration(&normalized);
    match (period, duration) {
        (Some(p), Some(d)) => Ok(TemporalAmount::PeriodWithDuration(PeriodWithDuration { period: p, duration: d })),
        (Some(p), None) => Ok(TemporalAmount::Period(p)),
        (None, Some(d)) => Ok(TemporalAmount::Duration(d)),
        (None, None) => Err(Error::new(ErrorKind::Syntax, format!("تعذر تفسير المقدار الزمني: {text}"), pos)),
    }
}

/// `قيمة_زمنية "بين <a> و<b>"`: the minimal amount between two points (delegates to
/// [`TemporalPoint::between`] once both operands are parsed).
pub fn parse_between(text: &str, pos: Position) -> Result<TemporalAmount> {
    let normalized = translit_digits(text.trim());
    let without_prefix = normalized.strip_prefix("بين").unwrap_or(&normalized).trim();
    let mut parts = without_prefix.splitn(2, " و");
    let left = parts.next().unwrap_or_default().trim();
    let right = parts.next().unwrap_or_default().trim();
    if left.is_empty() || right.is_empty() {
        return Err(Error::new(ErrorKind::Syntax, format!("صيغة between غير صالحة: {text}"), pos));
    }
    let a = parse_point(left, pos)?;
    let b = parse_point(right, pos)?;
    Ok(TemporalPoint::between(&a, &b))
}

fn try_parse_datetime(text: &str, pos: Position) -> Result<Option<ArabicDateTime>> {
    let mut iter = text.splitn(2, ' ');
    let first = iter.next().unwrap_or_default();
    let rest = iter.next();
    let Some(rest) = rest else { return Ok(None) };
    let Some(date) = try_parse_date(first, pos)? else { return Ok(None) };
    let Some(time) = try_parse_time(rest)? else { return Ok(None) };
    Ok(Some(ArabicDateTime { date, time, offset_seconds: None }))
}

/// `"15 يناير 2024"` / ISO `"2024-01-15"` / Hijri `"1 رمضان 1446"`.
fn try_parse_date(text: &str, pos: Position) -> Result<Option<ArabicDate>> {
    if let Some(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok() {
        return Ok(Some(ArabicDate { calendar: Calendar::Iso, normalized: date }));
    }
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() == 3 {
        let day: i64 = fields[0].parse().ok().unwrap_or(0);
        let year: i64 = fields[2].parse().ok().unwrap_or(0);
        if day > 0 && year > 0 {
            if let Some((calendar, month)) = month_from_name(fields[1]) {
                return Ok(Some(ArabicDate::from_ymd(calendar, year, month, day as u32, pos)?));
            }
        }
    }
    Ok(None)
}

/// `"14:30:00"`, with optional AM/PM Arabic markers and millisecond/nanosecond digits
/// (§4.I "the fractional-second digit count selects millisecond vs. nanosecond
/// precision").
fn try_parse_time(text: &str) -> Result<Option<ArabicTime>> {
    let (body, ampm) = strip_ampm(text);
    let parts: Vec<&str> = body.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Ok(None);
    }
    let hour: u32 = match parts[0].trim().parse() {
        Ok(h) => h,
        Err(_) => return Ok(None),
    };
    let minute: u32 = match parts[1].trim().parse() {
        Ok(m) => m,
        Err(_) => return Ok(None),
    };
    let (second, nanos) = if let Some(sec_field) = parts.get(2) {
        let mut sec_parts = sec_field.splitn(2, '.');
        let second: u32 = match sec_parts.next().unwrap_or("0").trim().parse() {
            Ok(s) => s,
            Err(_) => return Ok(None),
        };
        let nanos = match sec_parts.next() {
            Some(frac) => {
                // 3 digits -> milliseconds, 9 digits -> nanoseconds, anything else scales.
                let digits = frac.trim();
                let value: u32 = digits.parse().unwrap_or(0);
                let scale = 9u32.saturating_sub(digits.len() as u32);
                value.saturating_mul(10u32.pow(scale))
            }
            None => 0,
        };
        (second, nanos)
    } else {
        (0, 0)
    };
    let hour24 = match ampm {
        Some(true) if hour < 12 => hour + 12,
        Some(false) if hour == 12 => 0,
        _ => hour,
    };
    let normalized = NaiveTime::from_hms_nano_opt(hour24, minute, second, nanos);
    Ok(normalized.map(|t| ArabicTime { normalized: t, ampm_written: ampm.is_some() }))
}

/// Strips a trailing Arabic AM/PM marker, returning `Some(true)` for PM forms
/// (`م`/`مساءً`), `Some(false)` for AM forms (`ص`/`صباحاً`).
fn strip_ampm(text: &str) -> (&str, Option<bool>) {
    let trimmed = text.trim();
    for (marker, is_pm) in [("مساءً", true), ("مساء", true), ("م", true), ("صباحاً", false), ("صباحا", false), ("ص", false)] {
        if let Some(stripped) = trimmed.strip_suffix(marker) {
            return (stripped.trim_end(), Some(is_pm));
        }
    }
    (trimmed, None)
}

/// `"سنتان و3 أشهر و5 أيام"` style period text; any subset of the three components
/// may appear, joined by `و`.
fn try_parse_period(text: &str) -> Option<ArabicPeriod> {
    let mut period = ArabicPeriod::default();
    let mut matched = false;
    for segment in text.split('و') {
        let segment = segment.trim();
        if let Some(n) = extract_number_before(segment, &["سنة", "سنوات", "سنتان"]) {
            period.years = n;
            matched = true;
        } else if let Some(n) = extract_number_before(segment, &["شهر", "أشهر", "شهرين"]) {
            period.months = n;
            matched = true;
        } else if let Some(n) = extract_number_before(segment, &["يوم", "أيام", "يومين"]) {
            period.days = n;
            matched = true;
        }
    }
    matched.then_some(period)
}

/// `"ساعة و30 دقيقة"` style duration text.
fn try_parse_duration(text: &str) -> Option<ArabicDuration> {
    let mut duration = ArabicDuration::default();
    let mut matched = false;
    for segment in text.split('و') {
        let segment = segment.trim();
        if let Some(n) = extract_number_before(segment, &["ساعة", "ساعات", "ساعتان"]) {
            duration.hours = n;
            matched = true;
        } else if let Some(n) = extract_number_before(segment, &["دقيقة", "دقائق", "دقيقتان"]) {
            duration.minutes = n;
            matched = true;
        } else if let Some(n) = extract_number_before(segment, &["ثانية", "ثواني", "ثانيتان"]) {
            duration.seconds = n;
            matched = true;
        } else if let Some(n) = extract_number_before(segment, &["نانوثانية"]) {
            duration.nanos = n;
            matched = true;
        }
    }
    matched.then_some(duration)
}

/// `"3 أيام"` -> `3`; the dual forms (`يومين`, `سنتان`, ...) imply a bare `2` with no
/// leading digit.
fn extract_number_before(segment: &str, units: &[&str]) -> Option<i64> {
    for unit in units {
        if segment == *unit {
            return Some(2);
        }
        if let Some(prefix) = segment.strip_suffix(unit) {
            let n: i64 = prefix.trim().parse().ok()?;
            return Some(n);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_iso_date() {
        let point = parse_point("2024-01-15", Position::UNKNOWN).unwrap();
        assert!(matches!(point, TemporalPoint::Date(_)));
    }

    #[test]
    fn parses_named_hijri_date() {
        let point = parse_point("1 رمضان 1446", Position::UNKNOWN).unwrap();
        if let TemporalPoint::Date(d) = point {
            assert_eq!(d.calendar, Calendar::Hijrah);
        } else {
            panic!("expected a date");
        }
    }

    #[test]
    fn parses_time_with_pm_marker() {
        let point = parse_point("2:30:00 م", Position::UNKNOWN).unwrap();
        if let TemporalPoint::Time(t) = point {
            assert_eq!(t.normalized.hour(), 14);
        } else {
            panic!("expected a time");
        }
    }

    #[test]
    fn parses_combined_period_and_duration() {
        let amount = parse_amount("3 أيام وساعتان", Position::UNKNOWN).unwrap();
        assert!(matches!(amount, TemporalAmount::PeriodWithDuration(_)));
    }

    #[test]
    fn between_yields_minimal_amount() {
        let amount = parse_between("بين 2024-01-01 و2024-02-01", Position::UNKNOWN).unwrap();
        assert!(matches!(amount, TemporalAmount::Period(_)));
    }
}
