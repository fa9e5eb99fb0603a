//! Search and filters over wheels and spin records

use std::fmt;

use time::{format_description::BorrowedFormatItem, macros::format_description, Duration, OffsetDateTime};

use crate::{SpinRecord, Wheel};

/// `20-Oct-24`, as wheels show their creation date
const WHEEL_DATE: &[BorrowedFormatItem<'_>] =
    format_description!("[day]-[month repr:short]-[year repr:last_two]");

/// `20 Oct 2024`, as spin records show their date
const RECORD_DATE: &[BorrowedFormatItem<'_>] =
    format_description!("[day] [month repr:short] [year]");

pub fn wheel_date(wheel: &Wheel) -> Option<String> {
    wheel.created_at.and_then(|at| at.format(WHEEL_DATE).ok())
}

pub fn record_date(record: &SpinRecord) -> String {
    record
        .created_at
        .format(RECORD_DATE)
        .unwrap_or_else(|_| record.created_at.to_string())
}

/// Case-insensitive search over what the wheel table shows.
/// An empty query matches everything.
pub fn wheel_matches(wheel: &Wheel, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    let mut haystack = vec![
        wheel.id.to_lowercase(),
        wheel.name.to_lowercase(),
        wheel.sections.len().to_string(),
        wheel.status_label().to_lowercase(),
    ];
    if let Some(date) = wheel_date(wheel) {
        haystack.push(date.to_lowercase());
    }

    haystack.iter().any(|field| field.contains(&query))
}

/// Time window applied to spin records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRange {
    #[default]
    All,
    Last7Days,
    Last30Days,
}

impl DateRange {
    pub const ALL: [DateRange; 3] = [DateRange::All, DateRange::Last7Days, DateRange::Last30Days];

    /// Unknown input falls back to no date filter
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "7days" | "last7days" => Self::Last7Days,
            "30days" | "last30days" => Self::Last30Days,
            _ => Self::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Last7Days => "7days",
            Self::Last30Days => "30days",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All Time",
            Self::Last7Days => "Last 7 Days",
            Self::Last30Days => "Last 30 Days",
        }
    }

    fn window(&self) -> Option<Duration> {
        match self {
            Self::All => None,
            Self::Last7Days => Some(Duration::days(7)),
            Self::Last30Days => Some(Duration::days(30)),
        }
    }

    pub fn contains(&self, at: OffsetDateTime, now: OffsetDateTime) -> bool {
        match self.window() {
            Some(window) => at >= now - window,
            None => true,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Filters applied to the spin records table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub search: String,
    /// Only records of this wheel id
    pub wheel: Option<String>,
    pub range: DateRange,
}

impl RecordFilter {
    pub fn matches(&self, record: &SpinRecord, now: OffsetDateTime) -> bool {
        if let Some(wheel) = self.wheel.as_deref().filter(|w| !w.is_empty()) {
            let record_wheel = record.spin_wheel.as_ref().map(|w| w.id.as_str());
            if record_wheel != Some(wheel) {
                return false;
            }
        }

        if !self.range.contains(record.created_at, now) {
            return false;
        }

        let query = self.search.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        let section = &record.winning_section;
        [
            Some(record.user.id.as_str()),
            record.user.name.as_deref(),
            record.user.email.as_deref(),
            Some(record.wheel_name()),
            Some(section.title.as_str()),
            Some(section.kind.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::to_lowercase)
        .chain([section.value.to_string(), record_date(record).to_lowercase()])
        .any(|field| field.contains(&query))
    }

    /// Records passing the filter, newest first
    pub fn apply<'a>(&self, records: &'a [SpinRecord], now: OffsetDateTime) -> Vec<&'a SpinRecord> {
        let mut matched: Vec<_> = records.iter().filter(|r| self.matches(r, now)).collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched
    }
}
