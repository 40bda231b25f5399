//! Arabic Temporal Values (component B, §4.B).
//!
//! Every point/amount keeps the Arabic-textual descriptor the user actually wrote
//! (month name spelling, zone name, AM/PM form, calendar name) alongside a normalized
//! absolute value used for comparison and arithmetic (§3 "ArabicTemporalPoint").
//! ISO dates delegate to `chrono`; Hijrah dates convert through a tabular (civil)
//! Islamic calendar algorithm, since `chrono` has no Hijri calendar of its own — the
//! conversion only needs to be internally consistent (round-trips exactly) for the
//! arithmetic invariants this component promises (§8 property 4).

use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{Error, ErrorKind, Position, Result};
use crate::value::TypeTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Calendar {
    Iso,
    Hijrah,
}

/// Civil (tabular) Islamic calendar epoch, expressed as a Julian day number offset
/// from `chrono`'s `NaiveDate` day-count-from-CE. Internally consistent; not claimed
/// to match any particular real-world moon-sighting authority.
const HIJRI_EPOCH_JDN: i64 = 1_948_440;

fn gregorian_to_jdn(date: NaiveDate) -> i64 {
    // chrono's CE day count (day 1 = 0001-01-01) offset to the standard Julian Day
    // Number epoch.
    date.num_days_from_ce() as i64 + 1_721_425
}

fn jdn_to_gregorian(jdn: i64) -> NaiveDate {
    NaiveDate::from_num_days_from_ce_opt((jdn - 1_721_425) as i32).expect("jdn in range")
}

/// Islamic (year, month, day) -> JDN, tabular/civil algorithm.
fn hijri_to_jdn(year: i64, month: i64, day: i64) -> i64 {
    day + ((29.5 * (month - 1) as f64).ceil() as i64) + (year - 1) * 354
        + ((3 + 11 * year) as f64 / 30.0).floor() as i64
        + HIJRI_EPOCH_JDN
        - 1
}

/// JDN -> Islamic (year, month, day), inverse of [`hijri_to_jdn`].
fn jdn_to_hijri(jdn: i64) -> (i64, i64, i64) {
    let l = jdn - HIJRI_EPOCH_JDN + 10632;
    let n = ((l - 1) as f64 / 10631.0).floor() as i64;
    let l = l - 10631 * n + 354;
    let j = (((10985 - l) as f64 / 5316.0).floor() as i64) * (((50 * l) as f64 / 17719.0).floor() as i64)
        + ((l as f64 / 5670.0).floor() as i64) * (((43 * l) as f64 / 15238.0).floor() as i64);
    let l = l - (((30 - j) as f64 / 15.0).floor() as i64) * (((17719 * j) as f64 / 50.0).floor() as i64)
        - ((j as f64 / 16.0).floor() as i64) * (((15238 * j) as f64 / 43.0).floor() as i64)
        + 29;
    let month = ((24 * l) as f64 / 709.0).floor() as i64;
    let day = l - ((709 * month) as f64 / 24.0).floor() as i64;
    let year = 30 * n + j - 30;
    (year, month, day)
}

pub fn hijri_to_gregorian(year: i64, month: i64, day: i64) -> NaiveDate {
    jdn_to_gregorian(hijri_to_jdn(year, month, day))
}

pub fn gregorian_to_hijri(date: NaiveDate) -> (i64, i64, i64) {
    jdn_to_hijri(gregorian_to_jdn(date))
}

/// Canonical month-name table (§4.B): standard Arabic + Tunisian-Maghrebi Gregorian
/// names, plus all twelve Hijri months. Aliases resolve to `(calendar, month_number)`.
pub fn month_from_name(name: &str) -> Option<(Calendar, u32)> {
    let n = name.trim();
    let iso = [
        (1, &["يناير", "جانفي"][..]),
        (2, &["فبراير", "فيفري"][..]),
        (3, &["مارس"][..]),
        (4, &["أبريل", "إبريل", "أفريل"][..]),
        (5, &["مايو", "ماي"][..]),
        (6, &["يونيو", "جوان"][..]),
        (7, &["يوليو", "جويلية"][..]),
        (8, &["أغسطس", "أوت"][..]),
        (9, &["سبتمبر"][..]),
        (10, &["أكتوبر"][..]),
        (11, &["نوفمبر"][..]),
        (12, &["ديسمبر"][..]),
    ];
    for (num, names) in iso {
        if names.contains(&n) {
            return Some((Calendar::Iso, num));
        }
    }
    let hijrah = [
        (1, &["محرم"][..]),
        (2, &["صفر"][..]),
        (3, &["ربيع الأول"][..]),
        (4, &["ربيع الآخر", "ربيع الثاني"][..]),
        (5, &["جمادى الأولى", "جمادى الأول"][..]),
        (6, &["جمادى الآخرة", "جمادى الثانية"][..]),
        (7, &["رجب"][..]),
        (8, &["شعبان"][..]),
        (9, &["رمضان"][..]),
        (10, &["شوال"][..]),
        (11, &["ذو القعدة"][..]),
        (12, &["ذو الحجة"][..]),
    ];
    for (num, names) in hijrah {
        if names.contains(&n) {
            return Some((Calendar::Hijrah, num));
        }
    }
    None
}

pub fn month_name(calendar: Calendar, month: u32) -> &'static str {
    match calendar {
        Calendar::Iso => {
            const NAMES: [&str; 12] = [
                "يناير", "فبراير", "مارس", "أبريل", "مايو", "يونيو", "يوليو", "أغسطس", "سبتمبر",
                "أكتوبر", "نوفمبر", "ديسمبر",
            ];
            NAMES[(month.saturating_sub(1) as usize).min(11)]
        }
        Calendar::Hijrah => {
            const NAMES: [&str; 12] = [
                "محرم", "صفر", "ربيع الأول", "ربيع الآخر", "جمادى الأولى", "جمادى الآخرة", "رجب",
                "شعبان", "رمضان", "شوال", "ذو القعدة", "ذو الحجة",
            ];
            NAMES[(month.saturating_sub(1) as usize).min(11)]
        }
    }
}

/// A normalized absolute date, independent of calendar (always carried as a
/// proleptic-Gregorian `NaiveDate` internally; the calendar tag only governs
/// formatting and arithmetic component extraction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArabicDate {
    pub calendar: Calendar,
    pub normalized: NaiveDate,
}

impl ArabicDate {
    pub fn from_ymd(calendar: Calendar, year: i64, month: u32, day: u32, pos: Position) -> Result<Self> {
        let normalized = match calendar {
            Calendar::Iso => NaiveDate::from_ymd_opt(year as i32, month, day)
                .ok_or_else(|| Error::new(ErrorKind::InvalidNumber, "invalid date".to_string(), pos))?,
            Calendar::Hijrah => hijri_to_gregorian(year, month as i64, day as i64),
        };
        Ok(Self { calendar, normalized })
    }

    pub fn year(&self) -> i64 {
        match self.calendar {
            Calendar::Iso => self.normalized.year() as i64,
            Calendar::Hijrah => gregorian_to_hijri(self.normalized).0,
        }
    }

    pub fn month(&self) -> u32 {
        match self.calendar {
            Calendar::Iso => self.normalized.month(),
            Calendar::Hijrah => gregorian_to_hijri(self.normalized).1 as u32,
        }
    }

    pub fn day(&self) -> u32 {
        match self.calendar {
            Calendar::Iso => self.normalized.day(),
            Calendar::Hijrah => gregorian_to_hijri(self.normalized).2 as u32,
        }
    }

    pub fn add_period(&self, period: &ArabicPeriod) -> ArabicDate {
        match self.calendar {
            Calendar::Iso => {
                let mut date = self.normalized;
                date = add_months_iso(date, period.years * 12 + period.months);
                date += ChronoDuration::days(period.days as i64);
                ArabicDate { calendar: self.calendar, normalized: date }
            }
            Calendar::Hijrah => {
                let (y, m, d) = gregorian_to_hijri(self.normalized);
                let total_months = m - 1 + period.years * 12 + period.months;
                let new_year = y + total_months.div_euclid(12);
                let new_month = total_months.rem_euclid(12) + 1;
                let mut normalized = hijri_to_gregorian(new_year, new_month, d);
                normalized += ChronoDuration::days(period.days as i64);
                ArabicDate { calendar: self.calendar, normalized }
            }
        }
    }

    pub fn sub_period(&self, period: &ArabicPeriod) -> ArabicDate {
        self.add_period(&period.negate())
    }
}

fn add_months_iso(date: NaiveDate, months: i64) -> NaiveDate {
    let total = date.year() as i64 * 12 + (date.month() as i64 - 1) + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) + 1;
    let max_day = days_in_month(year as i32, month as u32);
    let day = date.day().min(max_day);
    NaiveDate::from_ymd_opt(year as i32, month as u32, day).expect("clamped day is valid")
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let this = NaiveDate::from_ymd_opt(year, month, 1).expect("valid month");
    next.map(|n| (n - this).num_days() as u32).unwrap_or(30)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArabicTime {
    pub normalized: NaiveTime,
    /// Original AM/PM form the user wrote, if 12-hour notation was used.
    pub ampm_written: bool,
}

impl ArabicTime {
    pub fn add_duration(&self, duration: &ArabicDuration) -> ArabicTime {
        let total_nanos = self.normalized.num_seconds_from_midnight() as i64 * 1_000_000_000
            + self.normalized.nanosecond() as i64
            + duration.total_nanos();
        let day_nanos = 86_400_000_000_000i64;
        let normalized_nanos = total_nanos.rem_euclid(day_nanos);
        let secs = (normalized_nanos / 1_000_000_000) as u32;
        let nanos = (normalized_nanos % 1_000_000_000) as u32;
        ArabicTime {
            normalized: NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos).unwrap_or(self.normalized),
            ampm_written: self.ampm_written,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArabicDateTime {
    pub date: ArabicDate,
    pub time: ArabicTime,
    /// Offset from UTC in seconds, if a zone/offset was given.
    pub offset_seconds: Option<i32>,
}

impl ArabicDateTime {
    pub fn naive(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.date.normalized, self.time.normalized)
    }

    pub fn add_amount(&self, amount: &TemporalAmount) -> ArabicDateTime {
        match amount {
            TemporalAmount::Duration(d) => self.add_duration(d),
            TemporalAmount::Period(p) => ArabicDateTime {
                date: self.date.add_period(p),
                time: self.time,
                offset_seconds: self.offset_seconds,
            },
            TemporalAmount::PeriodWithDuration(pd) => {
                let with_period = ArabicDateTime {
                    date: self.date.add_period(&pd.period),
                    time: self.time,
                    offset_seconds: self.offset_seconds,
                };
                with_period.add_duration(&pd.duration)
            }
        }
    }

    fn add_duration(&self, duration: &ArabicDuration) -> ArabicDateTime {
        let start = self.naive();
        let end = start + ChronoDuration::nanoseconds(duration.total_nanos());
        ArabicDateTime {
            date: ArabicDate { calendar: self.date.calendar, normalized: end.date() },
            time: ArabicTime { normalized: end.time(), ampm_written: self.time.ampm_written },
            offset_seconds: self.offset_seconds,
        }
    }
}

/// §3 "ArabicTemporalPoint": sealed `{ArabicTime, ArabicDate, ArabicDateTime}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalPoint {
    Time(ArabicTime),
    Date(ArabicDate),
    DateTime(ArabicDateTime),
}

impl TemporalPoint {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            TemporalPoint::Time(_) => TypeTag::Time,
            TemporalPoint::Date(_) => TypeTag::Date,
            TemporalPoint::DateTime(_) => TypeTag::DateTime,
        }
    }

    pub fn calendar(&self) -> Option<Calendar> {
        match self {
            TemporalPoint::Time(_) => None,
            TemporalPoint::Date(d) => Some(d.calendar),
            TemporalPoint::DateTime(dt) => Some(dt.date.calendar),
        }
    }

    /// `point + amount`, preserving the point's calendar (§4.B).
    pub fn add_amount(&self, amount: &TemporalAmount, pos: Position) -> Result<TemporalPoint> {
        match (self, amount) {
            (TemporalPoint::Time(t), TemporalAmount::Duration(d)) => Ok(TemporalPoint::Time(t.add_duration(d))),
            (TemporalPoint::Date(d), TemporalAmount::Period(p)) => Ok(TemporalPoint::Date(d.add_period(p))),
            (TemporalPoint::DateTime(dt), amount) => Ok(TemporalPoint::DateTime(dt.add_amount(amount))),
            _ => Err(Error::new(ErrorKind::TypeMismatch, "incompatible temporal amount".to_string(), pos)),
        }
    }

    pub fn sub_amount(&self, amount: &TemporalAmount, pos: Position) -> Result<TemporalPoint> {
        self.add_amount(&amount.negate(), pos)
    }

    /// A comparable absolute instant, for ordering and equality (§3 "ordering follows
    /// the absolute instant").
    fn instant(&self) -> NaiveDateTime {
        match self {
            TemporalPoint::Time(t) => NaiveDateTime::new(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(), t.normalized),
            TemporalPoint::Date(d) => NaiveDateTime::new(d.normalized, NaiveTime::MIN),
            TemporalPoint::DateTime(dt) => dt.naive(),
        }
    }

    pub fn compare(&self, other: &TemporalPoint) -> std::cmp::Ordering {
        self.instant().cmp(&other.instant())
    }

    /// `between(a, b)`: minimal amount per §4.B.
    pub fn between(a: &TemporalPoint, b: &TemporalPoint) -> TemporalAmount {
        match (a, b) {
            (TemporalPoint::Time(x), TemporalPoint::Time(y)) => {
                let nanos = (y.normalized.num_seconds_from_midnight() as i64 * 1_000_000_000
                    + y.normalized.nanosecond() as i64)
                    - (x.normalized.num_seconds_from_midnight() as i64 * 1_000_000_000
                        + x.normalized.nanosecond() as i64);
                TemporalAmount::Duration(ArabicDuration::from_nanos(nanos))
            }
            (TemporalPoint::Date(x), TemporalPoint::Date(y)) => TemporalAmount::Period(period_between(x, y)),
            (TemporalPoint::DateTime(x), TemporalPoint::DateTime(y)) if x.date == y.date => {
                TemporalPoint::between(&TemporalPoint::Time(x.time), &TemporalPoint::Time(y.time))
            }
            _ => {
                let dx = a.instant();
                let dy = b.instant();
                let period = period_between(
                    &ArabicDate { calendar: Calendar::Iso, normalized: dx.date() },
                    &ArabicDate { calendar: Calendar::Iso, normalized: dy.date() },
                );
                let duration_nanos = (dy.time() - dx.time()).num_nanoseconds().unwrap_or(0)
                    + (dy.time().num_seconds_from_midnight() as i64 - dx.time().num_seconds_from_midnight() as i64) * 0;
                let duration = ArabicDuration::from_nanos(
                    (dy - dx).num_nanoseconds().unwrap_or(0) - period_to_days_nanos(&period),
                );
                let _ = duration_nanos;
                TemporalAmount::PeriodWithDuration(PeriodWithDuration { period, duration })
            }
        }
    }

    pub fn format_as_arabic_text(&self) -> String {
        match self {
            TemporalPoint::Time(t) => format!("{}", t.normalized.format("%H:%M:%S")),
            TemporalPoint::Date(d) => format!("{} {} {}", d.day(), month_name(d.calendar, d.month()), d.year()),
            TemporalPoint::DateTime(dt) => format!(
                "{} {} {} {}",
                dt.date.day(),
                month_name(dt.date.calendar, dt.date.month()),
                dt.date.year(),
                dt.time.normalized.format("%H:%M:%S")
            ),
        }
    }
}

impl PartialEq for ArabicDateTime {
    fn eq(&self, other: &Self) -> bool {
        self.naive() == other.naive()
    }
}
impl Eq for ArabicDateTime {}

fn period_to_days_nanos(period: &ArabicPeriod) -> i64 {
    period.days as i64 * 86_400_000_000_000
}

fn period_between(a: &ArabicDate, b: &ArabicDate) -> ArabicPeriod {
    // Component-wise calendar difference in the point's own calendar system.
    let (ay, am, ad) = match a.calendar {
        Calendar::Iso => (a.normalized.year() as i64, a.normalized.month() as i64, a.normalized.day() as i64),
        Calendar::Hijrah => gregorian_to_hijri(a.normalized),
    };
    let (by, bm, bd) = match a.calendar {
        Calendar::Iso => (b.normalized.year() as i64, b.normalized.month() as i64, b.normalized.day() as i64),
        Calendar::Hijrah => gregorian_to_hijri(b.normalized),
    };
    let mut years = by - ay;
    let mut months = bm - am;
    let mut days = bd - ad;
    if days < 0 {
        months -= 1;
        days += 30;
    }
    if months < 0 {
        years -= 1;
        months += 12;
    }
    ArabicPeriod { years, months, days }
}

/// §3 "ArabicDuration": time-based, nanosecond-accurate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArabicDuration {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub nanos: i64,
}

impl ArabicDuration {
    pub fn total_nanos(&self) -> i64 {
        ((self.hours * 60 + self.minutes) * 60 + self.seconds) * 1_000_000_000 + self.nanos
    }

    pub fn from_nanos(total: i64) -> Self {
        let mut remaining = total;
        let sign = if remaining < 0 { -1 } else { 1 };
        remaining = remaining.abs();
        let nanos = remaining % 1_000_000_000;
        remaining /= 1_000_000_000;
        let seconds = remaining % 60;
        remaining /= 60;
        let minutes = remaining % 60;
        let hours = remaining / 60;
        Self {
            hours: sign * hours,
            minutes: sign * minutes,
            seconds: sign * seconds,
            nanos: sign * nanos,
        }
    }

    pub fn negate(&self) -> Self {
        Self::from_nanos(-self.total_nanos())
    }

    pub fn add(&self, other: &ArabicDuration) -> Self {
        Self::from_nanos(self.total_nanos() + other.total_nanos())
    }

    pub fn format_as_arabic_text(&self) -> String {
        if self.total_nanos() == 0 {
            return "مدة 0 ثانية".to_string();
        }
        let mut parts = Vec::new();
        if self.hours != 0 {
            parts.push(format!("{} ساعة", self.hours));
        }
        if self.minutes != 0 {
            parts.push(format!("{} دقيقة", self.minutes));
        }
        if self.seconds != 0 {
            parts.push(format!("{} ثانية", self.seconds));
        }
        if self.nanos != 0 {
            parts.push(format!("{} نانوثانية", self.nanos));
        }
        format!("مدة {}", parts.join(" و"))
    }
}

/// §3 "ArabicPeriod": date-based (years, months, days).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArabicPeriod {
    pub years: i64,
    pub months: i64,
    pub days: i64,
}

impl ArabicPeriod {
    pub fn negate(&self) -> Self {
        Self { years: -self.years, months: -self.months, days: -self.days }
    }

    pub fn add(&self, other: &ArabicPeriod) -> Self {
        Self {
            years: self.years + other.years,
            months: self.months + other.months,
            days: self.days + other.days,
        }
    }

    pub fn format_as_arabic_text(&self) -> String {
        if self.years == 0 && self.months == 0 && self.days == 0 {
            return "فترة 0 يوم".to_string();
        }
        let mut parts = Vec::new();
        if self.years != 0 {
            parts.push(format!("{} سنة", self.years));
        }
        if self.months != 0 {
            parts.push(format!("{} شهر", self.months));
        }
        if self.days != 0 {
            parts.push(format!("{} يوم", self.days));
        }
        format!("فترة {}", parts.join(" و"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeriodWithDuration {
    pub period: ArabicPeriod,
    pub duration: ArabicDuration,
}

/// §3 "ArabicTemporalAmount": sealed `{ArabicDuration, ArabicPeriod,
/// ArabicPeriodWithDuration}`. "Sum and subtract preserve type identity; mixing
/// promotes to PeriodWithDuration" (§4.B).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalAmount {
    Duration(ArabicDuration),
    Period(ArabicPeriod),
    PeriodWithDuration(PeriodWithDuration),
}

impl TemporalAmount {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            TemporalAmount::Duration(_) => TypeTag::Duration,
            TemporalAmount::Period(_) => TypeTag::Period,
            TemporalAmount::PeriodWithDuration(_) => TypeTag::PeriodDuration,
        }
    }

    pub fn negate(&self) -> Self {
        match self {
            TemporalAmount::Duration(d) => TemporalAmount::Duration(d.negate()),
            TemporalAmount::Period(p) => TemporalAmount::Period(p.negate()),
            TemporalAmount::PeriodWithDuration(pd) => TemporalAmount::PeriodWithDuration(PeriodWithDuration {
                period: pd.period.negate(),
                duration: pd.duration.negate(),
            }),
        }
    }

    pub fn add(&self, other: &TemporalAmount) -> Self {
        match (self, other) {
            (TemporalAmount::Duration(a), TemporalAmount::Duration(b)) => TemporalAmount::Duration(a.add(b)),
            (TemporalAmount::Period(a), TemporalAmount::Period(b)) => TemporalAmount::Period(a.add(b)),
            (TemporalAmount::Duration(a), TemporalAmount::Period(b))
            | (TemporalAmount::Period(b), TemporalAmount::Duration(a)) => {
                TemporalAmount::PeriodWithDuration(PeriodWithDuration { period: *b, duration: *a })
            }
            (TemporalAmount::PeriodWithDuration(a), TemporalAmount::PeriodWithDuration(b)) => {
                TemporalAmount::PeriodWithDuration(PeriodWithDuration {
                    period: a.period.add(&b.period),
                    duration: a.duration.add(&b.duration),
                })
            }
            (TemporalAmount::PeriodWithDuration(a), TemporalAmount::Period(b))
            | (TemporalAmount::Period(b), TemporalAmount::PeriodWithDuration(a)) => {
                TemporalAmount::PeriodWithDuration(PeriodWithDuration { period: a.period.add(b), duration: a.duration })
            }
            (TemporalAmount::PeriodWithDuration(a), TemporalAmount::Duration(b))
            | (TemporalAmount::Duration(b), TemporalAmount::PeriodWithDuration(a)) => {
                TemporalAmount::PeriodWithDuration(PeriodWithDuration { period: a.period, duration: a.duration.add(b) })
            }
        }
    }

    pub fn sub(&self, other: &TemporalAmount) -> Self {
        self.add(&other.negate())
    }

    pub fn format_as_arabic_text(&self) -> String {
        match self {
            TemporalAmount::Duration(d) => d.format_as_arabic_text(),
            TemporalAmount::Period(p) => p.format_as_arabic_text(),
            TemporalAmount::PeriodWithDuration(pd) => {
                format!("{} و{}", pd.period.format_as_arabic_text(), pd.duration.format_as_arabic_text())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hijri_gregorian_round_trips() {
        for (y, m, d) in [(1446, 1, 1), (1400, 6, 15), (1500, 12, 29)] {
            let g = hijri_to_gregorian(y, m, d);
            let back = gregorian_to_hijri(g);
            assert_eq!(back, (y, m, d));
        }
    }

    #[test]
    fn month_name_aliases_resolve_to_canonical_calendar() {
        assert_eq!(month_from_name("جانفي"), Some((Calendar::Iso, 1)));
        assert_eq!(month_from_name("رمضان"), Some((Calendar::Hijrah, 9)));
    }

    #[test]
    fn point_plus_amount_minus_amount_is_identity() {
        let date = ArabicDate::from_ymd(Calendar::Iso, 2024, 1, 15, Position::UNKNOWN).unwrap();
        let point = TemporalPoint::Date(date);
        let amount = TemporalAmount::Period(ArabicPeriod { years: 0, months: 2, days: 10 });
        let moved = point.add_amount(&amount, Position::UNKNOWN).unwrap();
        let back = moved.sub_amount(&amount, Position::UNKNOWN).unwrap();
        assert_eq!(point.compare(&back), std::cmp::Ordering::Equal);
    }

    #[test]
    fn zero_amount_formats_per_spec() {
        assert_eq!(ArabicPeriod::default().format_as_arabic_text(), "فترة 0 يوم");
        assert_eq!(ArabicDuration::default().format_as_arabic_text(), "مدة 0 ثانية");
    }

    #[test]
    fn duration_plus_period_promotes_to_combined() {
        let d = TemporalAmount::Duration(ArabicDuration { hours: 1, ..Default::default() });
        let p = TemporalAmount::Period(ArabicPeriod { days: 2, ..Default::default() });
        assert!(matches!(d.add(&p), TemporalAmount::PeriodWithDuration(_)));
    }
}
