//! Month and weekday filtering of a loaded city.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use log::debug;

use super::model::{weekday_name, City, RecordStore, Trip, TripField};
use crate::error::InvalidInputError;

// ---------------------------------------------------------------------------
// Filter choices
// ---------------------------------------------------------------------------

/// The months covered by the datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
}

impl Month {
    const ALL: [Month; 6] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
    ];

    /// 1-based calendar index (January = 1).
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
        }
    }
}

/// Month filter: everything, or a single month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthFilter {
    #[default]
    All,
    Only(Month),
}

impl FromStr for MonthFilter {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if wanted == "all" {
            return Ok(MonthFilter::All);
        }
        Month::ALL
            .into_iter()
            .find(|m| m.name().to_lowercase() == wanted)
            .map(MonthFilter::Only)
            .ok_or_else(|| InvalidInputError::Month(s.to_string()))
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => f.write_str("all"),
            MonthFilter::Only(m) => f.write_str(m.name()),
        }
    }
}

/// Day-of-week filter: everything, or a single weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayFilter {
    #[default]
    All,
    Only(Weekday),
}

impl FromStr for DayFilter {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // chrono's own parser also accepts "mon", "tue", ... which we do not.
        let day = match s.trim().to_lowercase().as_str() {
            "all" => return Ok(DayFilter::All),
            "monday" => Weekday::Mon,
            "tuesday" => Weekday::Tue,
            "wednesday" => Weekday::Wed,
            "thursday" => Weekday::Thu,
            "friday" => Weekday::Fri,
            "saturday" => Weekday::Sat,
            "sunday" => Weekday::Sun,
            _ => return Err(InvalidInputError::Day(s.to_string())),
        };
        Ok(DayFilter::Only(day))
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayFilter::All => f.write_str("all"),
            DayFilter::Only(d) => f.write_str(weekday_name(*d)),
        }
    }
}

/// A validated set of user choices for one session iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub city: City,
    pub month: MonthFilter,
    pub day: DayFilter,
}

fn matches(trip: &Trip, month: MonthFilter, day: DayFilter) -> bool {
    let month_ok = match month {
        MonthFilter::All => true,
        MonthFilter::Only(m) => trip.calendar.month == m.number(),
    };
    let day_ok = match day {
        DayFilter::All => true,
        DayFilter::Only(d) => trip.calendar.weekday == d,
    };
    month_ok && day_ok
}

// ---------------------------------------------------------------------------
// FilteredView – a read-only projection of a RecordStore
// ---------------------------------------------------------------------------

/// Rows of a [`RecordStore`] that passed the month/day filters, in store order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    store: &'a RecordStore,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every row of the store.
    #[cfg(test)]
    pub(crate) fn all(store: &'a RecordStore) -> Self {
        FilteredView {
            store,
            indices: (0..store.len()).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Trip> + '_ {
        let store = self.store;
        self.indices.iter().filter_map(move |&i| store.get(i))
    }

    /// Store row numbers of the matching trips.
    #[cfg(test)]
    pub(crate) fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn has_field(&self, field: TripField) -> bool {
        self.store.has_field(field)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the view of `store` whose trips pass both filters.
///
/// An empty result is a valid view, not an error.
pub fn apply(store: &RecordStore, month: MonthFilter, day: DayFilter) -> FilteredView<'_> {
    let indices: Vec<usize> = store
        .trips()
        .iter()
        .enumerate()
        .filter(|(_, trip)| matches(trip, month, day))
        .map(|(i, _)| i)
        .collect();

    debug!(
        "filter month={month} day={day}: {} of {} trips match",
        indices.len(),
        store.len()
    );

    FilteredView { store, indices }
}
