//! Reading city trip files (csv, parquet, json) into a `RecordStore`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{City, RecordStore, TripField, TripRecord};
use crate::error::DataLoadError;

type Result<T> = std::result::Result<T, DataLoadError>;

/// Extensions tried, in order, when resolving a city's data file.
const EXTENSIONS: [&str; 3] = ["csv", "parquet", "json"];

const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the dataset of `city` from `data_dir`.
///
/// Looks for `<stem>.csv`, then `<stem>.parquet`, then `<stem>.json`.
pub fn load_city(city: City, data_dir: &Path) -> Result<RecordStore> {
    let path = resolve_city_file(city, data_dir)?;
    info!("loading {city} trips from {}", path.display());
    load_file(&path)
}

fn resolve_city_file(city: City, data_dir: &Path) -> Result<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| data_dir.join(format!("{}.{ext}", city.file_stem())))
        .find(|p| p.is_file())
        .ok_or_else(|| DataLoadError::NotFound {
            path: data_dir.join(format!("{}.csv", city.file_stem())),
        })
}

/// Load a trip table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the bikeshare column names
/// * `.parquet` – one column per field, any type castable to text
/// * `.json`    – `[{ "Start Time": "...", "Trip Duration": 600, ... }, ...]`
pub fn load_file(path: &Path) -> Result<RecordStore> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        "json" => read_json(path)?,
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string())),
    };

    let store = table.into_store()?;
    info!(
        "loaded {} trips from {} (gender: {}, birth year: {})",
        store.len(),
        path.display(),
        store.has_field(TripField::Gender),
        store.has_field(TripField::BirthYear)
    );
    Ok(store)
}

// ---------------------------------------------------------------------------
// RawTable – text cells shared by every reader
// ---------------------------------------------------------------------------

/// Header names plus rows of optional text cells (`None` = missing).
#[derive(Debug, Default)]
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Convert text cells into typed records.
    fn into_store(self) -> Result<RecordStore> {
        let columns: BTreeMap<TripField, usize> = TripField::ALL
            .into_iter()
            .filter_map(|field| {
                self.headers
                    .iter()
                    .position(|h| h.trim() == field.column_name())
                    .map(|idx| (field, idx))
            })
            .collect();

        for field in TripField::REQUIRED {
            if !columns.contains_key(&field) {
                return Err(DataLoadError::MissingColumn {
                    column: field.column_name(),
                });
            }
        }

        let mut records = Vec::with_capacity(self.rows.len());
        for (row_no, row) in self.rows.iter().enumerate() {
            let cell = |field: TripField| {
                columns
                    .get(&field)
                    .and_then(|&idx| row.get(idx))
                    .and_then(|c| c.as_deref())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
            };
            let malformed = |field: TripField| DataLoadError::Malformed {
                row: row_no,
                column: field.column_name(),
                value: cell(field).unwrap_or_default().to_string(),
            };

            let start_time = cell(TripField::StartTime)
                .and_then(parse_timestamp)
                .ok_or_else(|| malformed(TripField::StartTime))?;
            let duration_secs = cell(TripField::TripDuration)
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|d| d.is_finite())
                .ok_or_else(|| malformed(TripField::TripDuration))?;

            records.push(TripRecord {
                start_time,
                end_time: cell(TripField::EndTime).and_then(parse_timestamp),
                duration_secs,
                start_station: cell(TripField::StartStation).map(str::to_string),
                end_station: cell(TripField::EndStation).map(str::to_string),
                user_type: cell(TripField::UserType).map(str::to_string),
                gender: cell(TripField::Gender).map(str::to_string),
                birth_year: cell(TripField::BirthYear).and_then(parse_year),
            });
        }

        Ok(RecordStore::from_records(records, columns.into_keys()))
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Birth years come as `1992` or `1992.0`.
fn parse_year(s: &str) -> Option<i32> {
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    s.parse::<f64>()
        .ok()
        .filter(|y| y.is_finite() && y.fract() == 0.0)
        .map(|y| y as i32)
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|v| (!v.is_empty()).then(|| v.to_string()))
                .collect(),
        );
    }

    debug!("read {} CSV rows from {}", rows.len(), path.display());
    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Start Time": "2017-01-01 09:07:57", "Trip Duration": 1039, "Gender": null, ... },
///   ...
/// ]
/// ```
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or_else(|| DataLoadError::JsonLayout("expected top-level JSON array".into()))?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| DataLoadError::JsonLayout(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).and_then(json_to_cell))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Every column is cast to UTF-8 and fed through the same parsing as CSV,
/// so timestamp, integer and float columns all work.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let text_columns = batch
            .columns()
            .iter()
            .map(|col| cast(col, &DataType::Utf8))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            rows.push(
                text_columns
                    .iter()
                    .map(|col| {
                        if col.is_null(row) {
                            None
                        } else {
                            Some(col.as_string::<i32>().value(row).to_string())
                        }
                    })
                    .collect(),
            );
        }
    }

    if rows.is_empty() {
        warn!("{} contains no rows", path.display());
    }
    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use chrono::Weekday;
    use parquet::arrow::ArrowWriter;
    use tempfile::tempdir;

    use super::*;
    use crate::data::filter::{apply, DayFilter, MonthFilter};
    use crate::stats::StationStats;

    const CHICAGO_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
1423854,2017-06-23 15:09:32,2017-06-23 15:14:53,321,Wood St & Hubbard St,Damen Ave & Chicago Ave,Subscriber,Male,1992.0
955915,2017-05-25 18:19:03,2017-05-25 18:45:53,1610,Theater on the Lake,Sheffield Ave & Waveland Ave,Subscriber,Female,1992.0
9031,2017-01-04 08:27:49,2017-01-04 08:34:45,416,May St & Taylor St,Wood St & Taylor St,Subscriber,,
";

    const WASHINGTON_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type
1621326,2017-06-21 08:36:34,2017-06-21 08:44:43,489.066,14th & Belmont St NW,15th & K St NW,Subscriber
482740,2017-03-11 10:40:00,2017-03-11 10:46:00,402.549,Yuma St & Tenley Circle NW,Connecticut Ave & Yuma St NW,Subscriber
";

    #[test]
    fn test_load_csv_with_optional_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chicago.csv");
        std::fs::write(&path, CHICAGO_CSV).unwrap();

        let store = load_file(&path).unwrap();
        assert_eq!(store.len(), 3);
        assert!(store.has_field(TripField::Gender));
        assert!(store.has_field(TripField::BirthYear));

        let first = &store.trips()[0];
        assert_eq!(first.record.start_station.as_deref(), Some("Wood St & Hubbard St"));
        assert_eq!(first.record.duration_secs, 321.0);
        assert_eq!(first.record.birth_year, Some(1992));
        assert_eq!(first.record.gender.as_deref(), Some("Male"));
        assert!(first.record.end_time.is_some());
        assert_eq!(first.calendar.month, 6);
        assert_eq!(first.calendar.weekday, Weekday::Fri);
        assert_eq!(first.calendar.hour, 15);

        // Empty cells become missing values, not errors.
        let third = &store.trips()[2].record;
        assert_eq!(third.gender, None);
        assert_eq!(third.birth_year, None);
    }

    #[test]
    fn test_empty_station_cells_are_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chicago.csv");
        std::fs::write(
            &path,
            "\
Start Time,Trip Duration,Start Station,End Station,User Type
2017-01-02 08:00:00,60,A,,Subscriber
2017-01-02 09:00:00,60,A,,Subscriber
2017-01-02 10:00:00,60,,B,Subscriber
",
        )
        .unwrap();

        let store = load_file(&path).unwrap();
        assert_eq!(store.trips()[0].record.end_station, None);
        assert_eq!(store.trips()[2].record.start_station, None);

        let stats = StationStats::compute(&apply(&store, MonthFilter::All, DayFilter::All));
        assert_eq!(stats.start.as_deref(), Some("A"));
        assert_eq!(stats.end.as_deref(), Some("B"));
        // No row has both ends, so there is no pair to report.
        assert_eq!(stats.trip, None);
    }

    #[test]
    fn test_load_city_without_gender_columns() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("washington.csv"), WASHINGTON_CSV).unwrap();

        let store = load_city(City::Washington, dir.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert!(!store.has_field(TripField::Gender));
        assert!(!store.has_field(TripField::BirthYear));
        assert_eq!(store.trips()[0].record.duration_secs, 489.066);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        for city in City::ALL {
            let err = load_city(city, dir.path()).unwrap_err();
            assert!(matches!(err, DataLoadError::NotFound { .. }));
        }
    }

    #[test]
    fn test_missing_required_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chicago.csv");
        std::fs::write(
            &path,
            "Start Time,Trip Duration,Start Station,User Type\n2017-01-01 00:00:00,60,A,Subscriber\n",
        )
        .unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::MissingColumn {
                column: "End Station"
            }
        ));
    }

    #[test]
    fn test_bad_timestamp_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chicago.csv");
        std::fs::write(
            &path,
            "Start Time,Trip Duration,Start Station,End Station,User Type\nsoon,60,A,B,Subscriber\n",
        )
        .unwrap();

        let err = load_file(&path).unwrap_err();
        match err {
            DataLoadError::Malformed { row, column, value } => {
                assert_eq!(row, 0);
                assert_eq!(column, "Start Time");
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(Path::new("trips.xlsx")).unwrap_err();
        assert!(matches!(err, DataLoadError::UnsupportedFormat(ext) if ext == "xlsx"));
    }

    #[test]
    fn test_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new_york_city.json");
        std::fs::write(
            &path,
            r#"[
                {"Start Time": "2017-01-01T00:00:36", "Trip Duration": 795, "Start Station": "A",
                 "End Station": "B", "User Type": "Customer", "Gender": null, "Birth Year": 1975.0},
                {"Start Time": "2017-01-02 10:00:00", "Trip Duration": 60, "Start Station": "B",
                 "End Station": "A", "User Type": null, "Gender": "Female", "Birth Year": null}
            ]"#,
        )
        .unwrap();

        let store = load_city(City::NewYorkCity, dir.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.trips()[0].record.birth_year, Some(1975));
        assert_eq!(store.trips()[0].record.gender, None);
        assert_eq!(store.trips()[1].record.user_type, None);
        assert_eq!(store.trips()[1].calendar.hour, 10);
    }

    #[test]
    fn test_json_must_be_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chicago.json");
        std::fs::write(&path, r#"{"Start Time": "2017-01-01 00:00:00"}"#).unwrap();
        assert!(matches!(
            load_file(&path).unwrap_err(),
            DataLoadError::JsonLayout(_)
        ));
    }

    #[test]
    fn test_load_parquet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chicago.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("Start Time", DataType::Utf8, false),
            Field::new("Trip Duration", DataType::Float64, false),
            Field::new("Start Station", DataType::Utf8, false),
            Field::new("End Station", DataType::Utf8, false),
            Field::new("User Type", DataType::Utf8, true),
            Field::new("Birth Year", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![
                    "2017-02-01 07:00:00",
                    "2017-02-02 18:30:00",
                ])),
                Arc::new(Float64Array::from(vec![120.0, 240.0])),
                Arc::new(StringArray::from(vec!["A", "B"])),
                Arc::new(StringArray::from(vec!["B", "C"])),
                Arc::new(StringArray::from(vec![Some("Subscriber"), None])),
                Arc::new(Float64Array::from(vec![Some(1980.0), None])),
            ],
        )
        .unwrap();

        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let store = load_city(City::Chicago, dir.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.has_field(TripField::BirthYear));
        assert!(!store.has_field(TripField::Gender));
        assert_eq!(store.trips()[0].record.birth_year, Some(1980));
        assert_eq!(store.trips()[1].record.user_type, None);
        assert_eq!(store.trips()[1].record.duration_secs, 240.0);
    }

    #[test]
    fn test_csv_preferred_over_other_formats() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("washington.csv"), WASHINGTON_CSV).unwrap();
        std::fs::write(dir.path().join("washington.json"), "not json").unwrap();
        assert_eq!(load_city(City::Washington, dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("1992"), Some(1992));
        assert_eq!(parse_year("1992.0"), Some(1992));
        assert_eq!(parse_year("1992.5"), None);
        assert_eq!(parse_year("n/a"), None);
    }
}
