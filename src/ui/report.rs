//! Text rendering of the reports and raw trip pages.

use std::fmt;
use std::io::{self, Write};

use crate::data::model::{month_name, weekday_name, TripField, TripRecord};
use crate::pager::Page;
use crate::stats::{Availability, DurationStats, Popular, StationStats, TimeStats, UserStats};

// ---------------------------------------------------------------------------
// Statistics reports
// ---------------------------------------------------------------------------

fn write_popular<T>(
    f: &mut fmt::Formatter<'_>,
    what: &str,
    value: &Popular<T>,
    name: impl Fn(&T) -> String,
) -> fmt::Result {
    match value {
        Popular::Selected(v) => writeln!(f, "The selected {what} was {}.", name(v)),
        Popular::MostCommon(v) => writeln!(f, "The most popular {what} was {}.", name(v)),
        Popular::NoData => writeln!(f, "The most popular {what}: no data."),
    }
}

impl fmt::Display for TimeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_popular(f, "month", &self.month, |m| {
            month_name(*m).map_or_else(|| m.to_string(), str::to_string)
        })?;
        write_popular(f, "day", &self.day, |d| weekday_name(*d).to_string())?;
        match self.hour {
            Some(h) => writeln!(f, "The most popular hour was {h}."),
            None => writeln!(f, "The most popular hour: no data."),
        }
    }
}

impl fmt::Display for StationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = [
            ("Most commonly used start station", &self.start),
            ("Most commonly used end station", &self.end),
            (
                "Most frequent combination of start station and end station trip",
                &self.trip,
            ),
        ];
        for (label, value) in lines {
            match value {
                Some(v) => writeln!(f, "{label}: {v}.")?,
                None => writeln!(f, "{label}: no data.")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for DurationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total travel time: {:.2} hours", self.total_hours)?;
        match self.mean_minutes {
            Some(m) => writeln!(f, "Mean travel time: {m:.2} minutes."),
            None => writeln!(f, "Mean travel time: no data."),
        }
    }
}

fn write_counts(f: &mut fmt::Formatter<'_>, title: &str, counts: &[(String, usize)]) -> fmt::Result {
    if counts.is_empty() {
        return writeln!(f, "{title}: no data.");
    }
    writeln!(f, "{title}:")?;
    for (value, n) in counts {
        writeln!(f, "  {value}: {n}")?;
    }
    Ok(())
}

impl fmt::Display for UserStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_counts(f, "Counts of user types", &self.user_types)?;

        match &self.genders {
            Availability::Present(counts) => write_counts(f, "Counts of gender", counts)?,
            Availability::NoData => writeln!(f, "Counts of gender: no data.")?,
            Availability::NotAvailable => writeln!(f, "No gender data available.")?,
        }

        match &self.birth_years {
            Availability::Present(years) => {
                writeln!(f, "Earliest year of birth: {}.", years.earliest)?;
                writeln!(f, "Most recent year of birth: {}.", years.most_recent)?;
                writeln!(f, "Most common year of birth: {}.", years.most_common)
            }
            Availability::NoData => writeln!(f, "Year of birth: no data."),
            Availability::NotAvailable => writeln!(f, "No birth year data available."),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw trip pages
// ---------------------------------------------------------------------------

fn field_text(record: &TripRecord, field: TripField) -> String {
    let text = match field {
        TripField::StartTime => Some(record.start_time.to_string()),
        TripField::EndTime => record.end_time.map(|t| t.to_string()),
        TripField::TripDuration => Some(record.duration_secs.to_string()),
        TripField::StartStation => record.start_station.clone(),
        TripField::EndStation => record.end_station.clone(),
        TripField::UserType => record.user_type.clone(),
        TripField::Gender => record.gender.clone(),
        TripField::BirthYear => record.birth_year.map(|y| y.to_string()),
    };
    text.unwrap_or_else(|| "-".to_string())
}

/// Print every trip of `page`, one block per trip, showing only the columns
/// the dataset has.
pub fn write_page<W: Write>(out: &mut W, page: &Page<'_>) -> io::Result<()> {
    for (offset, trip) in page.trips.iter().enumerate() {
        writeln!(out, "\nTrip #{}", page.first_row + offset)?;
        for field in TripField::ALL {
            if page.has_field(field) {
                writeln!(
                    out,
                    "  {:<16}{}",
                    format!("{}:", field.column_name()),
                    field_text(&trip.record, field)
                )?;
            }
        }
    }
    Ok(())
}
