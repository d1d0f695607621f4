//! Page-by-page access to a city's unfiltered trips.

use std::path::Path;

use log::debug;

use crate::data::loader;
use crate::data::model::{City, RecordStore, Trip, TripField};
use crate::error::DataLoadError;

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// A contiguous run of trips; `first_row` is the store row of `trips[0]`.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub first_row: usize,
    pub trips: &'a [Trip],
    store: &'a RecordStore,
}

impl Page<'_> {
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// Whether the underlying dataset carries this column.
    pub fn has_field(&self, field: TripField) -> bool {
        self.store.has_field(field)
    }
}

/// Hands out fixed-size pages of a store in original row order.
///
/// Once the store is exhausted every further page is empty.
#[derive(Debug)]
pub struct RawDataPager {
    store: RecordStore,
    page_size: usize,
    cursor: usize,
}

impl RawDataPager {
    /// Reload the city's full dataset, independent of any filtered view.
    pub fn stream(city: City, data_dir: &Path, page_size: usize) -> Result<Self, DataLoadError> {
        let store = loader::load_city(city, data_dir)?;
        Ok(Self::new(store, page_size))
    }

    pub fn new(store: RecordStore, page_size: usize) -> Self {
        RawDataPager {
            store,
            page_size: page_size.max(1),
            cursor: 0,
        }
    }

    pub fn next_page(&mut self) -> Page<'_> {
        let store = &self.store;
        let trips = store.trips();
        let start = self.cursor.min(trips.len());
        let end = start.saturating_add(self.page_size).min(trips.len());
        self.cursor = end;
        debug!("raw data page rows {start}..{end} of {}", trips.len());
        Page {
            first_row: start,
            trips: &trips[start..end],
            store,
        }
    }

    /// Whether every row has been handed out.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.store.len()
    }
}
