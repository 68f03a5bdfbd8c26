//! FHIR date, dateTime, instant and time values.
//!
//! FHIR temporal literals may be partial (`2020`, `2020-01`). Values keep
//! their original text for round-tripping and expose the earliest and latest
//! UTC instant they can denote, so comparisons respect the stated precision.
//! A dateTime without a timezone is read as UTC.

use chrono::{
    DateTime as ChronoDateTime, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime,
    NaiveTime, TimeZone, Utc,
};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Precision of a date, dateTime or instant literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Precision {
    /// `YYYY`
    Year,
    /// `YYYY-MM`
    Month,
    /// `YYYY-MM-DD`
    Day,
    /// `YYYY-MM-DDThh:mm:ss`
    Second,
    /// `YYYY-MM-DDThh:mm:ss.fff`
    Fraction,
}

fn moment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(\d{4})(?:-(\d{2})(?:-(\d{2})(?:T(\d{2}):(\d{2}):(\d{2})(?:\.(\d{1,9}))?(Z|[+-]\d{2}:\d{2})?)?)?)?$",
        )
        .expect("dateTime regex must compile")
    })
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{2}):(\d{2}):(\d{2})(?:\.(\d{1,9}))?$").expect("time regex must compile")
    })
}

#[derive(Debug, Clone)]
struct Moment {
    text: String,
    precision: Precision,
    has_offset: bool,
    lower: ChronoDateTime<Utc>,
    upper: ChronoDateTime<Utc>,
}

impl Moment {
    fn parse(text: &str) -> Option<Self> {
        let caps = moment_pattern().captures(text)?;
        let year: i32 = caps[1].parse().ok()?;
        if year == 0 {
            return None;
        }
        let month = caps
            .get(2)
            .map(|m| m.as_str().parse::<u32>())
            .transpose()
            .ok()?;
        let day = caps
            .get(3)
            .map(|m| m.as_str().parse::<u32>())
            .transpose()
            .ok()?;
        let offset = match caps.get(8).map(|m| m.as_str()) {
            None | Some("Z") => FixedOffset::east_opt(0)?,
            Some(tz) => parse_offset(tz)?,
        };

        let date = NaiveDate::from_ymd_opt(year, month.unwrap_or(1), day.unwrap_or(1))?;
        let midnight = date.and_hms_opt(0, 0, 0)?;
        let one_ns = Duration::nanoseconds(1);

        let (precision, start, end): (Precision, NaiveDateTime, NaiveDateTime) =
            match (month, day, caps.get(4)) {
                (None, _, _) => {
                    let next = NaiveDate::from_ymd_opt(year + 1, 1, 1)?.and_hms_opt(0, 0, 0)?;
                    (Precision::Year, midnight, next - one_ns)
                }
                (Some(_), None, _) => {
                    let next = date.checked_add_months(Months::new(1))?.and_hms_opt(0, 0, 0)?;
                    (Precision::Month, midnight, next - one_ns)
                }
                (Some(_), Some(_), None) => {
                    let next = date.succ_opt()?.and_hms_opt(0, 0, 0)?;
                    (Precision::Day, midnight, next - one_ns)
                }
                (Some(_), Some(_), Some(hour)) => {
                    let time = clock_time(
                        hour.as_str(),
                        caps.get(5)?.as_str(),
                        caps.get(6)?.as_str(),
                        caps.get(7).map(|m| m.as_str()),
                    )?;
                    let start = date.and_time(time);
                    if caps.get(7).is_some() {
                        (Precision::Fraction, start, start)
                    } else {
                        (Precision::Second, start, start + Duration::seconds(1) - one_ns)
                    }
                }
            };

        Some(Self {
            text: text.to_string(),
            precision,
            has_offset: caps.get(8).is_some(),
            lower: offset.from_local_datetime(&start).single()?.with_timezone(&Utc),
            upper: offset.from_local_datetime(&end).single()?.with_timezone(&Utc),
        })
    }
}

fn parse_offset(tz: &str) -> Option<FixedOffset> {
    let sign = if tz.starts_with('-') { -1 } else { 1 };
    let hours: i32 = tz.get(1..3)?.parse().ok()?;
    let minutes: i32 = tz.get(4..6)?.parse().ok()?;
    if minutes > 59 || hours * 60 + minutes > 14 * 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Builds a wall-clock time. FHIR admits a leap second (`:60`); it is folded
/// into `:59` because the bounds are chrono instants. Anything above 60 is
/// rejected.
fn clock_time(hour: &str, minute: &str, second: &str, fraction: Option<&str>) -> Option<NaiveTime> {
    let second: u32 = second.parse().ok()?;
    if second > 60 {
        return None;
    }
    let nanos = match fraction {
        Some(digits) => format!("{digits:0<9}").parse().ok()?,
        None => 0,
    };
    NaiveTime::from_hms_nano_opt(hour.parse().ok()?, minute.parse().ok()?, second.min(59), nanos)
}

macro_rules! moment_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(Moment);

        impl $name {
            /// The literal exactly as it appeared on the wire.
            pub fn as_str(&self) -> &str {
                &self.0.text
            }

            pub fn precision(&self) -> Precision {
                self.0.precision
            }

            /// Whether the literal carried an explicit timezone.
            pub fn has_offset(&self) -> bool {
                self.0.has_offset
            }

            /// Earliest instant covered by this value.
            pub fn lower_bound(&self) -> ChronoDateTime<Utc> {
                self.0.lower
            }

            /// Latest instant covered by this value.
            pub fn upper_bound(&self) -> ChronoDateTime<Utc> {
                self.0.upper
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.0.text == other.0.text
            }
        }

        impl Eq for $name {}

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0.text)
            }
        }
    };
}

moment_type!(
    /// FHIR `date`: `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    Date
);

moment_type!(
    /// FHIR `dateTime`: a date, optionally followed by a time and timezone.
    DateTime
);

moment_type!(
    /// FHIR `instant`: a full timestamp with seconds and a timezone.
    Instant
);

impl Date {
    pub fn parse(text: &str) -> Option<Self> {
        if text.contains('T') {
            return None;
        }
        Moment::parse(text).map(Self)
    }
}

impl DateTime {
    pub fn parse(text: &str) -> Option<Self> {
        Moment::parse(text).map(Self)
    }
}

impl Instant {
    pub fn parse(text: &str) -> Option<Self> {
        let moment = Moment::parse(text)?;
        if moment.precision < Precision::Second || !moment.has_offset {
            return None;
        }
        Some(Self(moment))
    }
}

/// FHIR `time`: a time of day, `hh:mm:ss` with optional fraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Time {
    text: String,
    value: NaiveTime,
}

impl Time {
    pub fn parse(text: &str) -> Option<Self> {
        let caps = time_pattern().captures(text)?;
        let value = clock_time(&caps[1], &caps[2], &caps[3], caps.get(4).map(|m| m.as_str()))?;
        Some(Self {
            text: text.to_string(),
            value,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_naive_time(&self) -> NaiveTime {
        self.value
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_dates_cover_their_whole_period() {
        let month = DateTime::parse("2020-02").unwrap();
        assert_eq!(month.precision(), Precision::Month);
        assert_eq!(month.lower_bound().to_rfc3339(), "2020-02-01T00:00:00+00:00");
        assert_eq!(
            month.upper_bound().to_rfc3339(),
            "2020-02-29T23:59:59.999999999+00:00"
        );

        let year = Date::parse("2021").unwrap();
        assert_eq!(year.precision(), Precision::Year);
        assert_eq!(
            year.upper_bound().to_rfc3339(),
            "2021-12-31T23:59:59.999999999+00:00"
        );
    }

    #[test]
    fn offsets_shift_bounds_to_utc() {
        let value = DateTime::parse("2020-01-01T10:00:00+02:00").unwrap();
        assert!(value.has_offset());
        assert_eq!(value.lower_bound().to_rfc3339(), "2020-01-01T08:00:00+00:00");
    }

    #[test]
    fn offsets_stop_at_fourteen_hours() {
        assert!(DateTime::parse("2020-01-01T10:00:00+14:00").is_some());
        assert!(DateTime::parse("2020-01-01T10:00:00-14:00").is_some());
        assert!(DateTime::parse("2020-01-01T10:00:00+14:59").is_none());
        assert!(DateTime::parse("2020-01-01T10:00:00-14:01").is_none());
        assert!(DateTime::parse("2020-01-01T10:00:00+13:60").is_none());
    }

    #[test]
    fn leap_second_folds_and_larger_seconds_fail() {
        let leap = DateTime::parse("2016-12-31T23:59:60Z").unwrap();
        assert_eq!(leap.as_str(), "2016-12-31T23:59:60Z");
        assert_eq!(leap.lower_bound().to_rfc3339(), "2016-12-31T23:59:59+00:00");
        assert!(DateTime::parse("2016-12-31T23:59:61Z").is_none());
        assert!(Time::parse("08:30:75").is_none());
    }

    #[test]
    fn fractional_seconds_are_exact() {
        let value = DateTime::parse("2020-01-01T10:00:00.25Z").unwrap();
        assert_eq!(value.precision(), Precision::Fraction);
        assert_eq!(value.lower_bound(), value.upper_bound());
        assert_eq!(value.as_str(), "2020-01-01T10:00:00.25Z");
    }

    #[test]
    fn rejects_malformed_literals() {
        assert!(Date::parse("2020-13").is_none());
        assert!(Date::parse("2020-02-30").is_none());
        assert!(Date::parse("2020-01-01T10:00:00Z").is_none());
        assert!(DateTime::parse("0000").is_none());
        assert!(DateTime::parse("20-01-01").is_none());
        assert!(Instant::parse("2020-01-01").is_none());
        assert!(Instant::parse("2020-01-01T10:00:00").is_none());
        assert!(Instant::parse("2020-01-01T10:00:00Z").is_some());
        assert!(Time::parse("25:00:00").is_none());
        assert_eq!(Time::parse("08:30:00").unwrap().as_str(), "08:30:00");
    }
}
