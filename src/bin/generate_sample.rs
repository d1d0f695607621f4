//! Writes synthetic city datasets for trying the explorer without real data.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use chrono::{Duration, NaiveDate};
use clap::{Parser, ValueEnum};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Output file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Parquet,
    Json,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Parquet => "parquet",
            Format::Json => "json",
        }
    }
}

/// Write synthetic bikeshare datasets for Chicago, New York City and Washington.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Output directory
    #[arg(long = "out-dir", default_value = ".")]
    out_dir: PathBuf,

    /// File format to write
    #[arg(long = "format", value_enum, default_value = "csv")]
    format: Format,

    /// Trips per city
    #[arg(long = "rows", default_value_t = 500)]
    rows: usize,

    /// PRNG seed
    #[arg(long = "seed", default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `0..n`.
    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

#[derive(Debug, Clone, Serialize)]
struct SampleTrip {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time")]
    end_time: String,
    #[serde(rename = "Trip Duration")]
    trip_duration: f64,
    #[serde(rename = "Start Station")]
    start_station: String,
    #[serde(rename = "End Station")]
    end_station: String,
    #[serde(rename = "User Type")]
    user_type: Option<String>,
    #[serde(rename = "Gender")]
    gender: Option<String>,
    #[serde(rename = "Birth Year")]
    birth_year: Option<f64>,
}

/// Washington's files carry no demographic columns.
#[derive(Debug, Clone, Serialize)]
struct WashingtonTrip {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time")]
    end_time: String,
    #[serde(rename = "Trip Duration")]
    trip_duration: f64,
    #[serde(rename = "Start Station")]
    start_station: String,
    #[serde(rename = "End Station")]
    end_station: String,
    #[serde(rename = "User Type")]
    user_type: Option<String>,
}

impl From<SampleTrip> for WashingtonTrip {
    fn from(t: SampleTrip) -> Self {
        WashingtonTrip {
            start_time: t.start_time,
            end_time: t.end_time,
            trip_duration: t.trip_duration,
            start_station: t.start_station,
            end_station: t.end_station,
            user_type: t.user_type,
        }
    }
}

struct CityProfile {
    stem: &'static str,
    stations: &'static [&'static str],
    demographics: bool,
}

const CITIES: [CityProfile; 3] = [
    CityProfile {
        stem: "chicago",
        stations: &[
            "Streeter Dr & Grand Ave",
            "Lake Shore Dr & Monroe St",
            "Clinton St & Washington Blvd",
            "Canal St & Adams St",
            "Theater on the Lake",
            "Michigan Ave & Oak St",
        ],
        demographics: true,
    },
    CityProfile {
        stem: "new_york_city",
        stations: &[
            "Pershing Square North",
            "E 17 St & Broadway",
            "W 21 St & 6 Ave",
            "Broadway & E 22 St",
            "West St & Chambers St",
            "8 Ave & W 31 St",
        ],
        demographics: true,
    },
    CityProfile {
        stem: "washington",
        stations: &[
            "Columbus Circle / Union Station",
            "Lincoln Memorial",
            "Jefferson Dr & 14th St SW",
            "Massachusetts Ave & Dupont Circle NW",
            "15th & P St NW",
            "Thomas Circle",
        ],
        demographics: false,
    },
];

/// Commute peaks at 8 and 17 show up twice as often.
const HOURS: [u32; 16] = [7, 8, 8, 9, 11, 12, 13, 15, 16, 17, 17, 18, 19, 20, 21, 22];

fn generate_trips(profile: &CityProfile, rows: usize, rng: &mut SimpleRng) -> Result<Vec<SampleTrip>> {
    let mut trips = Vec::with_capacity(rows);
    for _ in 0..rows {
        let month = 1 + rng.below(6) as u32;
        let day = 1 + rng.below(28) as u32;
        let hour = *rng.pick(&HOURS);
        let minute = rng.below(60) as u32;
        let second = rng.below(60) as u32;
        let start = NaiveDate::from_ymd_opt(2017, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .context("invalid generated timestamp")?;

        let duration = rng.gauss(900.0, 400.0).abs().max(60.0).round();
        let end = start + Duration::seconds(duration as i64);

        let user_type = match rng.below(10) {
            0..=6 => Some("Subscriber".to_string()),
            7..=8 => Some("Customer".to_string()),
            _ => None,
        };
        let (gender, birth_year) = if profile.demographics && rng.chance(0.85) {
            let gender = rng.pick(&["Male", "Female"]).to_string();
            let year = 1950.0 + rng.below(50) as f64;
            (Some(gender), Some(year))
        } else {
            (None, None)
        };

        trips.push(SampleTrip {
            start_time: start.format("%Y-%m-%d %H:%M:%S").to_string(),
            end_time: end.format("%Y-%m-%d %H:%M:%S").to_string(),
            trip_duration: duration,
            start_station: rng.pick(profile.stations).to_string(),
            end_station: rng.pick(profile.stations).to_string(),
            user_type,
            gender,
            birth_year,
        });
    }
    Ok(trips)
}

fn write_csv<T: Serialize>(path: &Path, trips: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for trip in trips {
        writer.serialize(trip)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, trips: &[T]) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, trips)?;
    Ok(())
}

fn to_batch(trips: &[SampleTrip], demographics: bool) -> Result<RecordBatch> {
    let text = |f: fn(&SampleTrip) -> Option<&str>| -> ArrayRef {
        Arc::new(StringArray::from(trips.iter().map(f).collect::<Vec<_>>()))
    };

    let mut fields = vec![
        Field::new("Start Time", DataType::Utf8, false),
        Field::new("End Time", DataType::Utf8, false),
        Field::new("Trip Duration", DataType::Float64, false),
        Field::new("Start Station", DataType::Utf8, false),
        Field::new("End Station", DataType::Utf8, false),
        Field::new("User Type", DataType::Utf8, true),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        text(|t| Some(t.start_time.as_str())),
        text(|t| Some(t.end_time.as_str())),
        Arc::new(Float64Array::from(
            trips.iter().map(|t| t.trip_duration).collect::<Vec<_>>(),
        )),
        text(|t| Some(t.start_station.as_str())),
        text(|t| Some(t.end_station.as_str())),
        text(|t| t.user_type.as_deref()),
    ];
    if demographics {
        fields.push(Field::new("Gender", DataType::Utf8, true));
        fields.push(Field::new("Birth Year", DataType::Float64, true));
        columns.push(text(|t| t.gender.as_deref()));
        columns.push(Arc::new(Float64Array::from(
            trips.iter().map(|t| t.birth_year).collect::<Vec<_>>(),
        )));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    for profile in &CITIES {
        let trips = generate_trips(profile, args.rows, &mut rng)?;
        let path = args
            .out_dir
            .join(format!("{}.{}", profile.stem, args.format.extension()));

        match args.format {
            Format::Csv if profile.demographics => write_csv(&path, &trips)?,
            Format::Json if profile.demographics => write_json(&path, &trips)?,
            Format::Csv | Format::Json => {
                let trips: Vec<WashingtonTrip> = trips.into_iter().map(Into::into).collect();
                if args.format == Format::Csv {
                    write_csv(&path, &trips)?
                } else {
                    write_json(&path, &trips)?
                }
            }
            Format::Parquet => {
                let batch = to_batch(&trips, profile.demographics)?;
                write_parquet(&path, &batch)?;
                println!("{}", pretty_format_batches(&[batch.slice(0, batch.num_rows().min(3))])?);
            }
        }

        println!("Wrote {} trips to {}", args.rows, path.display());
    }

    Ok(())
}
