//! Trip records, the cities they come from and the loaded per-city table.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

use crate::error::InvalidInputError;

// ---------------------------------------------------------------------------
// City – the three datasets we know about
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum City {
    Chicago,
    NewYorkCity,
    Washington,
}

impl City {
    pub const ALL: [City; 3] = [City::Chicago, City::NewYorkCity, City::Washington];

    /// File name (without extension) of the city's dataset.
    pub fn file_stem(self) -> &'static str {
        match self {
            City::Chicago => "chicago",
            City::NewYorkCity => "new_york_city",
            City::Washington => "washington",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            City::Chicago => "Chicago",
            City::NewYorkCity => "New York City",
            City::Washington => "Washington",
        };
        f.write_str(name)
    }
}

impl FromStr for City {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chicago" => Ok(City::Chicago),
            "new york city" => Ok(City::NewYorkCity),
            "washington" => Ok(City::Washington),
            _ => Err(InvalidInputError::City(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// TripField – the columns a dataset may carry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TripField {
    StartTime,
    EndTime,
    TripDuration,
    StartStation,
    EndStation,
    UserType,
    Gender,
    BirthYear,
}

impl TripField {
    /// Columns every dataset must provide.
    pub const REQUIRED: [TripField; 5] = [
        TripField::StartTime,
        TripField::TripDuration,
        TripField::StartStation,
        TripField::EndStation,
        TripField::UserType,
    ];

    pub const ALL: [TripField; 8] = [
        TripField::StartTime,
        TripField::EndTime,
        TripField::TripDuration,
        TripField::StartStation,
        TripField::EndStation,
        TripField::UserType,
        TripField::Gender,
        TripField::BirthYear,
    ];

    /// Header name in the source files.
    pub fn column_name(self) -> &'static str {
        match self {
            TripField::StartTime => "Start Time",
            TripField::EndTime => "End Time",
            TripField::TripDuration => "Trip Duration",
            TripField::StartStation => "Start Station",
            TripField::EndStation => "End Station",
            TripField::UserType => "User Type",
            TripField::Gender => "Gender",
            TripField::BirthYear => "Birth Year",
        }
    }
}

// ---------------------------------------------------------------------------
// TripRecord – one row of the source table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    /// Trip duration in seconds.
    pub duration_secs: f64,
    pub start_station: Option<String>,
    pub end_station: Option<String>,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
}

/// Calendar fields derived from a trip's start timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    /// 1 = January … 12 = December.
    pub month: u32,
    pub weekday: Weekday,
    /// 0 – 23.
    pub hour: u32,
}

impl CalendarFields {
    pub fn from_timestamp(ts: &NaiveDateTime) -> Self {
        CalendarFields {
            month: ts.month(),
            weekday: ts.weekday(),
            hour: ts.hour(),
        }
    }
}

/// A record together with its derived calendar fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub record: TripRecord,
    pub calendar: CalendarFields,
}

/// Full English name of a weekday ("Monday", …).
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Full English name of a month number, or `None` outside 1..=12.
pub fn month_name(month: u32) -> Option<&'static str> {
    u8::try_from(month)
        .ok()
        .and_then(|m| chrono::Month::try_from(m).ok())
        .map(|m| m.name())
}

// ---------------------------------------------------------------------------
// RecordStore – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Immutable, ordered table of trips for one city.
///
/// Calendar fields are computed once here, so they always agree with the
/// start timestamp they came from.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    trips: Vec<Trip>,
    fields: BTreeSet<TripField>,
}

impl RecordStore {
    /// Build the store from parsed records and the set of columns the source
    /// actually carried.
    pub fn from_records(
        records: Vec<TripRecord>,
        fields: impl IntoIterator<Item = TripField>,
    ) -> Self {
        let trips = records
            .into_iter()
            .map(|record| {
                let calendar = CalendarFields::from_timestamp(&record.start_time);
                Trip { record, calendar }
            })
            .collect();
        RecordStore {
            trips,
            fields: fields.into_iter().collect(),
        }
    }

    /// Whether the source provided this column.
    pub fn has_field(&self, field: TripField) -> bool {
        self.fields.contains(&field)
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Trip> {
        self.trips.get(index)
    }

    /// Number of trips.
    pub fn len(&self) -> usize {
        self.trips.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}
