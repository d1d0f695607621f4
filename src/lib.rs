//! Interactive explorer for US bikeshare trip data.
//!
//! A session asks for a city plus optional month and weekday filters, loads
//! the city's trips, prints four reports (travel times, stations, trip
//! durations, users) and then pages through the raw trips on request.

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod pager;
pub mod state;
pub mod stats;
pub mod ui;
