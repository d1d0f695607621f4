//! The interactive session: prompts, reports and raw-data paging.

use std::fmt::Display;
use std::io::{BufRead, Write};
use std::time::Instant;

use anyhow::Result;
use log::{debug, error, info};

use crate::config::Config;
use crate::data::filter::{self, DayFilter, FilterSpec, MonthFilter};
use crate::data::loader;
use crate::data::model::{City, RecordStore};
use crate::pager::RawDataPager;
use crate::state::SessionState;
use crate::stats::{DurationStats, StationStats, TimeStats, UserStats};
use crate::ui::prompt::Prompter;
use crate::ui::report;

const CITY_PROMPT: &str = "Would you like to see data for Chicago, New York City, or Washington? ";
const MONTH_PROMPT: &str =
    "For which month do you want to see data (January to June)? Type \"all\" for no filter. ";
const DAY_PROMPT: &str =
    "For which day you want to see data (Monday to Sunday)? Type \"all\" for no filter. ";
const RAW_DATA_PROMPT: &str = "\nWould you like to view individual trip data? Enter yes or no.\n";
const RESTART_PROMPT: &str = "\nWould you like to restart? Enter yes or no.\n";

fn rule() -> String {
    "-".repeat(40)
}

// ---------------------------------------------------------------------------
// Interactive session
// ---------------------------------------------------------------------------

/// Drives one user through filter selection, reports, raw-data paging and
/// restarts until they are done.
pub struct PromptSession<R, W> {
    prompter: Prompter<R, W>,
    config: Config,
}

impl<R: BufRead, W: Write> PromptSession<R, W> {
    pub fn new(input: R, output: W, config: Config) -> Self {
        Self {
            prompter: Prompter::new(input, output),
            config,
        }
    }

    pub fn into_output(self) -> W {
        self.prompter.into_output()
    }

    /// Run until the user declines to restart or input ends.
    pub fn run(&mut self) -> Result<()> {
        let mut state = SessionState::CollectingFilters;
        while !state.is_done() {
            debug!("session state: {}", state.name());
            state = self.step(state)?;
        }
        info!("session finished");
        Ok(())
    }

    fn step(&mut self, state: SessionState) -> Result<SessionState> {
        let next = match state {
            SessionState::CollectingFilters => match self.collect_filters()? {
                Some(spec) => SessionState::Loaded(spec),
                None => SessionState::Done,
            },
            SessionState::Loaded(spec) => match loader::load_city(spec.city, &self.config.data_dir) {
                Ok(store) => SessionState::Reporting { spec, store },
                Err(err) => {
                    error!("failed to load {} data: {err}", spec.city);
                    writeln!(
                        self.prompter.output(),
                        "\nCould not load data for {}: {err}",
                        spec.city
                    )?;
                    SessionState::AskRestart
                }
            },
            SessionState::Reporting { spec, store } => {
                self.report(&spec, &store)?;
                SessionState::Paging(spec.city)
            }
            SessionState::Paging(city) => {
                self.page_raw_data(city)?;
                SessionState::AskRestart
            }
            SessionState::AskRestart => {
                if self.prompter.confirm(RESTART_PROMPT)? {
                    SessionState::CollectingFilters
                } else {
                    SessionState::Done
                }
            }
            SessionState::Done => SessionState::Done,
        };
        Ok(next)
    }

    /// `None` when input ends before all three answers are given.
    fn collect_filters(&mut self) -> Result<Option<FilterSpec>> {
        writeln!(
            self.prompter.output(),
            "Hello! Let's explore some US bikeshare data!"
        )?;

        let Some(city) = self.prompter.choose::<City>(CITY_PROMPT)? else {
            return Ok(None);
        };
        let Some(month) = self.prompter.choose::<MonthFilter>(MONTH_PROMPT)? else {
            return Ok(None);
        };
        let Some(day) = self.prompter.choose::<DayFilter>(DAY_PROMPT)? else {
            return Ok(None);
        };
        writeln!(self.prompter.output(), "{}", rule())?;

        info!("filters: city={city} month={month} day={day}");
        Ok(Some(FilterSpec { city, month, day }))
    }

    fn report(&mut self, spec: &FilterSpec, store: &RecordStore) -> Result<()> {
        let view = filter::apply(store, spec.month, spec.day);
        info!("{} of {} {} trips match", view.len(), store.len(), spec.city);
        if view.is_empty() {
            writeln!(
                self.prompter.output(),
                "\nNo trips match month={} day={}.",
                spec.month,
                spec.day
            )?;
        }

        self.section("Calculating The Most Frequent Times of Travel...", || {
            TimeStats::compute(&view, spec.month, spec.day)
        })?;
        self.section("Calculating The Most Popular Stations and Trip...", || {
            StationStats::compute(&view)
        })?;
        self.section("Calculating Trip Duration...", || {
            DurationStats::compute(&view)
        })?;
        self.section("Calculating User Stats...", || UserStats::compute(&view))?;
        Ok(())
    }

    /// Print a titled report along with how long it took to compute.
    fn section<T: Display>(&mut self, title: &str, compute: impl FnOnce() -> T) -> Result<()> {
        let out = self.prompter.output();
        writeln!(out, "\n{title}\n")?;
        let started = Instant::now();
        let report = compute();
        let elapsed = started.elapsed().as_secs_f64();
        write!(out, "{report}")?;
        writeln!(out, "\nThis took {elapsed} seconds.")?;
        writeln!(out, "{}", rule())?;
        Ok(())
    }

    /// The city file is only re-read once the user asks for the first page.
    fn page_raw_data(&mut self, city: City) -> Result<()> {
        if !self.prompter.confirm(RAW_DATA_PROMPT)? {
            return Ok(());
        }

        let mut pager =
            match RawDataPager::stream(city, &self.config.data_dir, self.config.page_size) {
                Ok(pager) => pager,
                Err(err) => {
                    error!("failed to reload {city} data for paging: {err}");
                    writeln!(self.prompter.output(), "\nCould not load raw data: {err}")?;
                    return Ok(());
                }
            };

        loop {
            let page = pager.next_page();
            report::write_page(self.prompter.output(), &page)?;
            if pager.is_exhausted() {
                writeln!(self.prompter.output(), "\nNo more trip data to display.")?;
                return Ok(());
            }
            if !self.prompter.confirm(RAW_DATA_PROMPT)? {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Read};
    use std::path::{Path, PathBuf};

    use tempfile::tempdir;

    use super::*;

    // 2017-01-02 is a Monday, 2017-06-23 a Friday.
    const CHICAGO_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
1,2017-01-02 08:10:00,2017-01-02 08:20:00,600,Canal St,Clark St,Subscriber,Male,1990.0
2,2017-01-02 08:40:00,2017-01-02 09:00:00,1200,Canal St,State St,Subscriber,Female,1985.0
3,2017-06-23 17:05:00,2017-06-23 17:35:00,1800,Clark St,State St,Customer,,
";

    const WASHINGTON_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type
1,2017-03-11 10:40:00,2017-03-11 10:46:00,360,Yuma St,Tenley Circle,Subscriber
2,2017-03-12 10:10:00,2017-03-12 10:30:00,1200,Tenley Circle,Yuma St,Customer
";

    /// Replays `input` and deletes `path` once `offset` bytes have been read.
    struct DeletingReader {
        inner: Cursor<Vec<u8>>,
        offset: u64,
        path: PathBuf,
    }

    impl DeletingReader {
        fn delete_when_due(&self) {
            if self.inner.position() >= self.offset && self.path.exists() {
                std::fs::remove_file(&self.path).unwrap();
            }
        }
    }

    impl Read for DeletingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.delete_when_due();
            self.inner.read(buf)
        }
    }

    impl BufRead for DeletingReader {
        fn fill_buf(&mut self) -> io::Result<&[u8]> {
            self.delete_when_due();
            self.inner.fill_buf()
        }

        fn consume(&mut self, amt: usize) {
            self.inner.consume(amt)
        }
    }

    fn run_with<R: BufRead>(input: R, config: Config) -> String {
        let mut session = PromptSession::new(input, Vec::new(), config);
        session.run().unwrap();
        String::from_utf8(session.into_output()).unwrap()
    }

    fn config_for(data_dir: &Path) -> Config {
        Config {
            data_dir: data_dir.to_path_buf(),
            ..Config::default()
        }
    }

    fn run_session(data_dir: &Path, input: &str) -> String {
        run_with(Cursor::new(input.as_bytes().to_vec()), config_for(data_dir))
    }

    fn data_dir() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("chicago.csv"), CHICAGO_CSV).unwrap();
        std::fs::write(dir.path().join("washington.csv"), WASHINGTON_CSV).unwrap();
        dir
    }

    #[test]
    fn test_full_cycle_with_invalid_city() {
        let dir = data_dir();
        let out = run_session(dir.path(), "boston\nChicago\nall\nall\nno\nno\n");

        assert_eq!(
            out.matches("Not a valid city. Please choose between Chicago, New York City or Washington")
                .count(),
            1
        );
        assert!(out.contains("The most popular month was January."));
        assert!(out.contains("The most popular day was Monday."));
        assert!(out.contains("The most popular hour was 8."));
        assert!(out.contains("Most commonly used start station: Canal St."));
        assert!(out.contains("Most commonly used end station: State St."));
        assert!(out.contains("Total travel time: 1.00 hours"));
        assert!(out.contains("Mean travel time: 20.00 minutes."));
        assert!(out.contains("  Subscriber: 2"));
        assert!(out.contains("Earliest year of birth: 1985."));
        assert!(out.contains("This took"));

        // Reports appear in a fixed order.
        let time = out.find("Most Frequent Times").unwrap();
        let station = out.find("Most Popular Stations").unwrap();
        let duration = out.find("Calculating Trip Duration").unwrap();
        let user = out.find("Calculating User Stats").unwrap();
        assert!(time < station && station < duration && duration < user);
    }

    #[test]
    fn test_explicit_filters_echoed() {
        let dir = data_dir();
        let out = run_session(dir.path(), "chicago\njune\nfriday\nno\nno\n");
        assert!(out.contains("The selected month was June."));
        assert!(out.contains("The selected day was Friday."));
        assert!(out.contains("The most popular hour was 17."));
    }

    #[test]
    fn test_empty_filter_result_reports_no_data() {
        let dir = data_dir();
        let out = run_session(dir.path(), "chicago\nmay\nsunday\nno\nno\n");
        assert!(out.contains("No trips match"));
        assert!(out.contains("The most popular hour: no data."));
        assert!(out.contains("Mean travel time: no data."));
        assert!(out.contains("Total travel time: 0.00 hours"));
    }

    #[test]
    fn test_paging_until_exhausted() {
        let dir = data_dir();
        let out = run_session(dir.path(), "chicago\nall\nall\nyes\nno\n");
        assert!(out.contains("Trip #0"));
        assert!(out.contains("Trip #2"));
        assert!(!out.contains("Trip #3"));
        assert!(out.contains("No more trip data to display."));
        // The last page ends paging without asking again.
        assert_eq!(out.matches("view individual trip data").count(), 1);
        assert!(out.contains("Would you like to restart?"));
    }

    #[test]
    fn test_paging_stops_when_declined() {
        let dir = data_dir();
        let config = Config {
            page_size: 2,
            ..config_for(dir.path())
        };
        let input = Cursor::new(b"chicago\nall\nall\nyes\nno\nno\n".to_vec());
        let out = run_with(input, config);
        assert!(out.contains("Trip #1"));
        assert!(!out.contains("Trip #2"));
        assert!(!out.contains("No more trip data"));
        assert_eq!(out.matches("view individual trip data").count(), 2);
    }

    #[test]
    fn test_paging_with_small_pages_reaches_the_end() {
        let dir = data_dir();
        let config = Config {
            page_size: 2,
            ..config_for(dir.path())
        };
        let input = Cursor::new(b"chicago\nall\nall\nyes\nyes\nno\n".to_vec());
        let out = run_with(input, config);
        assert!(out.contains("Trip #2"));
        assert!(out.contains("No more trip data to display."));
        assert_eq!(out.matches("view individual trip data").count(), 2);
    }

    #[test]
    fn test_raw_data_reload_failure_offers_restart() {
        let dir = data_dir();
        let answers = "chicago\nall\nall\n";
        let input = DeletingReader {
            inner: Cursor::new(format!("{answers}yes\nno\n").into_bytes()),
            offset: answers.len() as u64,
            path: dir.path().join("chicago.csv"),
        };
        let out = run_with(input, config_for(dir.path()));

        assert_eq!(out.matches("Calculating User Stats").count(), 1);
        assert!(out.contains("Could not load raw data"));
        assert!(!out.contains("Trip #0"));
        assert!(out.contains("Would you like to restart?"));
        assert!(!dir.path().join("chicago.csv").exists());
    }

    #[test]
    fn test_declining_raw_data_skips_reload() {
        let dir = data_dir();
        let answers = "chicago\nall\nall\n";
        let input = DeletingReader {
            inner: Cursor::new(format!("{answers}no\nno\n").into_bytes()),
            offset: answers.len() as u64,
            path: dir.path().join("chicago.csv"),
        };
        let out = run_with(input, config_for(dir.path()));
        assert!(!out.contains("Could not load raw data"));
        assert!(out.contains("Would you like to restart?"));
    }

    #[test]
    fn test_missing_columns_not_available() {
        let dir = data_dir();
        let out = run_session(dir.path(), "washington\nall\nall\nno\nno\n");
        assert!(out.contains("No gender data available."));
        assert!(out.contains("No birth year data available."));
    }

    #[test]
    fn test_load_failure_skips_reports_and_offers_restart() {
        let dir = data_dir();
        let out = run_session(
            dir.path(),
            "new york city\nall\nall\nyes\nwashington\nall\nall\nno\nno\n",
        );
        assert!(out.contains("Could not load data for New York City"));
        assert_eq!(out.matches("Calculating User Stats").count(), 1);
        assert_eq!(out.matches("Hello! Let's explore").count(), 2);
    }

    #[test]
    fn test_restart_starts_fresh_iteration() {
        let dir = data_dir();
        let out = run_session(
            dir.path(),
            "chicago\nall\nall\nno\nYes\nwashington\nmarch\nall\nno\nno\n",
        );
        assert_eq!(out.matches("Calculating User Stats").count(), 2);
        assert!(out.contains("The selected month was March."));
    }

    #[test]
    fn test_end_of_input_finishes_cleanly() {
        let dir = data_dir();
        let out = run_session(dir.path(), "chicago\n");
        assert!(out.contains("Hello! Let's explore some US bikeshare data!"));
        assert!(!out.contains("Calculating"));
    }
}
