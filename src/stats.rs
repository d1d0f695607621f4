//! Descriptive statistics over a filtered view of trips.
//!
//! Each report is a plain snapshot computed in one call; none of them keep
//! state or depend on one another.

use std::collections::BTreeMap;

use chrono::Weekday;

use crate::data::filter::{DayFilter, FilteredView, MonthFilter};
use crate::data::model::TripField;

/// Joins start and end station names when counting station pairs.
pub const TRIP_SEPARATOR: &str = " to ";

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

// ---------------------------------------------------------------------------
// Counting helpers
// ---------------------------------------------------------------------------

fn count<T: Ord>(values: impl IntoIterator<Item = T>) -> BTreeMap<T, usize> {
    let mut counts = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
}

/// Most frequent value, or `None` for no values.
///
/// When several values share the highest count the smallest one wins.
pub fn mode<T: Ord>(values: impl IntoIterator<Item = T>) -> Option<T> {
    let mut best: Option<(T, usize)> = None;
    for (value, n) in count(values) {
        match &best {
            Some((_, top)) if *top >= n => {}
            _ => best = Some((value, n)),
        }
    }
    best.map(|(value, _)| value)
}

/// Occurrences of each value, most frequent first, ties in ascending order.
pub fn value_counts<T: Ord>(values: impl IntoIterator<Item = T>) -> Vec<(T, usize)> {
    let mut counts: Vec<(T, usize)> = count(values).into_iter().collect();
    // Stable sort keeps the ascending value order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

// ---------------------------------------------------------------------------
// Result wrappers
// ---------------------------------------------------------------------------

/// Answer to "when do people travel most" for one calendar dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum Popular<T> {
    /// The user filtered on this dimension; echo their choice.
    Selected(T),
    MostCommon(T),
    NoData,
}

/// Result of an aggregate over an optional column.
#[derive(Debug, Clone, PartialEq)]
pub enum Availability<T> {
    /// The city's dataset has no such column.
    NotAvailable,
    /// The column exists but holds no values in this view.
    NoData,
    Present(T),
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TimeStats {
    /// Month number, 1 = January.
    pub month: Popular<u32>,
    pub day: Popular<Weekday>,
    pub hour: Option<u32>,
}

impl TimeStats {
    pub fn compute(view: &FilteredView<'_>, month: MonthFilter, day: DayFilter) -> Self {
        let month = match month {
            MonthFilter::Only(m) => Popular::Selected(m.number()),
            MonthFilter::All => mode(view.iter().map(|t| t.calendar.month))
                .map_or(Popular::NoData, Popular::MostCommon),
        };
        let day = match day {
            DayFilter::Only(d) => Popular::Selected(d),
            DayFilter::All => {
                let days = view.iter().map(|t| t.calendar.weekday.num_days_from_monday());
                mode(days).map_or(Popular::NoData, |i| Popular::MostCommon(WEEKDAYS[i as usize]))
            }
        };
        let hour = mode(view.iter().map(|t| t.calendar.hour));

        TimeStats { month, day, hour }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationStats {
    pub start: Option<String>,
    pub end: Option<String>,
    /// Most frequent `"<start> to <end>"` combination.
    pub trip: Option<String>,
}

impl StationStats {
    /// Rows missing a station are left out; a pair needs both ends.
    pub fn compute(view: &FilteredView<'_>) -> Self {
        let start = mode(view.iter().filter_map(|t| t.record.start_station.as_deref()));
        let end = mode(view.iter().filter_map(|t| t.record.end_station.as_deref()));
        let trip = mode(view.iter().filter_map(|t| {
            match (&t.record.start_station, &t.record.end_station) {
                (Some(start), Some(end)) => Some(format!("{start}{TRIP_SEPARATOR}{end}")),
                _ => None,
            }
        }));

        StationStats {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
            trip,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DurationStats {
    pub trips: usize,
    pub total_hours: f64,
    /// `None` when there are no trips to average.
    pub mean_minutes: Option<f64>,
}

impl DurationStats {
    pub fn compute(view: &FilteredView<'_>) -> Self {
        let total_secs: f64 = view.iter().map(|t| t.record.duration_secs).sum();
        let trips = view.len();
        let mean_minutes = (trips > 0).then(|| total_secs / trips as f64 / 60.0);

        DurationStats {
            trips,
            total_hours: total_secs / 3600.0,
            mean_minutes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthYears {
    pub earliest: i32,
    pub most_recent: i32,
    pub most_common: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserStats {
    pub user_types: Vec<(String, usize)>,
    pub genders: Availability<Vec<(String, usize)>>,
    pub birth_years: Availability<BirthYears>,
}

impl UserStats {
    /// Rows missing a value are left out of that one aggregate only.
    pub fn compute(view: &FilteredView<'_>) -> Self {
        let user_types = value_counts(view.iter().filter_map(|t| t.record.user_type.as_deref()))
            .into_iter()
            .map(|(v, n)| (v.to_string(), n))
            .collect();

        let genders = if view.has_field(TripField::Gender) {
            let counts: Vec<(String, usize)> =
                value_counts(view.iter().filter_map(|t| t.record.gender.as_deref()))
                    .into_iter()
                    .map(|(v, n)| (v.to_string(), n))
                    .collect();
            if counts.is_empty() {
                Availability::NoData
            } else {
                Availability::Present(counts)
            }
        } else {
            Availability::NotAvailable
        };

        let birth_years = if view.has_field(TripField::BirthYear) {
            let years: Vec<i32> = view.iter().filter_map(|t| t.record.birth_year).collect();
            match (
                years.iter().min(),
                years.iter().max(),
                mode(years.iter().copied()),
            ) {
                (Some(&earliest), Some(&most_recent), Some(most_common)) => {
                    Availability::Present(BirthYears {
                        earliest,
                        most_recent,
                        most_common,
                    })
                }
                _ => Availability::NoData,
            }
        } else {
            Availability::NotAvailable
        };

        UserStats {
            user_types,
            genders,
            birth_years,
        }
    }
}
