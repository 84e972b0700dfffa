use crate::error::{ReportError, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};

/// Upper bound for the day-by-day ISO week scan. A year plus the
/// lead-in to the first Monday never exceeds this.
const MAX_WEEK_SCAN_DAYS: u32 = 380;

/// A reporting interval. Both bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    /// Parse `YYYY-MM` into the period covering that calendar month,
    /// ending at 23:59:59 of its last day.
    pub fn from_month(input: &str) -> Result<Self> {
        let (year, month) = split_pair(input)?;
        let month = u32::try_from(month)
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| ReportError::period(format!("month out of range in '{}'", input)))?;

        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| ReportError::period(format!("no such month '{}'", input)))?;
        // Day 0 of the next month; December ends on the 31st
        let last = if month == 12 {
            NaiveDate::from_ymd_opt(year, 12, 31)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1).and_then(|d| d.pred_opt())
        }
        .ok_or_else(|| ReportError::period(format!("no such month '{}'", input)))?;

        Ok(Self {
            start: at_time(first, 0, 0, 0)?,
            end: at_time(last, 23, 59, 59)?,
        })
    }

    /// Parse `YYYY-WW` into the seven days starting on the Monday of
    /// that ISO week.
    pub fn from_iso_week(input: &str) -> Result<Self> {
        let (year, week) = split_pair(input)?;
        let week = u32::try_from(week)
            .ok()
            .filter(|w| (1..=53).contains(w))
            .ok_or_else(|| ReportError::period(format!("week out of range in '{}'", input)))?;

        let monday = first_day_of_iso_week(year, week).ok_or_else(|| {
            ReportError::period(format!("{} has no ISO week {}", year, week))
        })?;

        let start = at_time(monday, 0, 0, 0)?;
        Ok(Self {
            start,
            end: start + Duration::days(7),
        })
    }

    /// A period that contains every representable timestamp
    pub fn unbounded() -> Self {
        Self {
            start: DateTime::<Utc>::MIN_UTC,
            end: DateTime::<Utc>::MAX_UTC,
        }
    }

    /// True iff `t` lies strictly between start and end
    pub fn contains(&self, t: &DateTime<Utc>) -> bool {
        t > &self.start && t < &self.end
    }

    /// Like [`Period::contains`], absent timestamps never match
    pub fn contains_opt(&self, t: Option<&DateTime<Utc>>) -> bool {
        t.is_some_and(|t| self.contains(t))
    }
}

/// Walk back from Jan 1 to a Monday, then forward day by day until the
/// ISO (year, week) of the running date matches.
fn first_day_of_iso_week(year: i32, week: u32) -> Option<NaiveDate> {
    let mut date = NaiveDate::from_ymd_opt(year, 1, 1)?;
    while date.weekday() != Weekday::Mon {
        date = date.pred_opt()?;
    }

    for _ in 0..MAX_WEEK_SCAN_DAYS {
        let iso = date.iso_week();
        if iso.year() == year && iso.week() == week {
            return Some(date);
        }
        if iso.year() > year {
            return None;
        }
        date = date.succ_opt()?;
    }
    None
}

fn split_pair(input: &str) -> Result<(i32, i32)> {
    let (first, second) = input
        .trim()
        .split_once('-')
        .ok_or_else(|| ReportError::period(format!("expected two fields in '{}'", input)))?;

    let parse = |field: &str| {
        field
            .parse::<i32>()
            .map_err(|e| ReportError::period(format!("'{}' in '{}': {}", field, input, e)))
    };
    Ok((parse(first)?, parse(second)?))
}

fn at_time(date: NaiveDate, hour: u32, min: u32, sec: u32) -> Result<DateTime<Utc>> {
    let naive = date
        .and_hms_opt(hour, min, sec)
        .ok_or_else(|| ReportError::period(format!("invalid time on {}", date)))?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// The window a run reports on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Window {
    /// A calendar month
    Month(Period),
    /// An ISO week
    Week { year: i32, week: u32, period: Period },
    /// The N most recently updated PRs and issues of each repository
    Recent(usize),
}

impl Window {
    /// Build the window from the mutually exclusive CLI selectors
    pub fn from_selectors(
        monthly: Option<&str>,
        weekly: Option<&str>,
        items: Option<usize>,
    ) -> Result<Self> {
        match (monthly, weekly, items) {
            (Some(month), None, None) => Ok(Self::Month(Period::from_month(month)?)),
            (None, Some(week), None) => {
                let period = Period::from_iso_week(week)?;
                let iso = period.start.date_naive().iso_week();
                Ok(Self::Week {
                    year: iso.year(),
                    week: iso.week(),
                    period,
                })
            }
            (None, None, Some(0)) => Err(ReportError::config("--items must be greater than 0")),
            (None, None, Some(n)) => Ok(Self::Recent(n)),
            (None, None, None) => Err(ReportError::config(
                "one of --monthly, --weekly or --items is required",
            )),
            _ => Err(ReportError::config(
                "--monthly, --weekly and --items are mutually exclusive",
            )),
        }
    }

    /// Period used to classify activity
    pub fn period(&self) -> Period {
        match self {
            Self::Month(period) | Self::Week { period, .. } => *period,
            Self::Recent(_) => Period::unbounded(),
        }
    }

    /// Modification cutoff passed to the fetch layer
    pub fn since(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Month(period) | Self::Week { period, .. } => Some(period.start),
            Self::Recent(_) => None,
        }
    }

    /// Per-repository record limit
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Recent(n) => Some(*n),
            _ => None,
        }
    }

    /// Human-readable description used in report headers
    pub fn describe(&self) -> String {
        match self {
            Self::Month(period) => period.start.format("%B %Y").to_string(),
            Self::Week { year, week, period } => format!(
                "week {} of {} ({} to {})",
                week,
                year,
                period.start.format("%Y-%m-%d"),
                (period.end - Duration::days(1)).format("%Y-%m-%d")
            ),
            Self::Recent(n) => format!("the {} most recently updated PRs and issues", n),
        }
    }
}
