//! CSV bar loading.
//!
//! Files carry a header row followed by positional columns
//! `timestamp, open, high, low, close, volume`. Timestamps may be
//! `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`, RFC 3339, or unix epoch seconds or
//! milliseconds. Malformed rows are skipped with a warning unless
//! [`LoadOptions::strict`] is set. The loaded series must be strictly
//! ascending in time.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vwzlab_core::Bar;

/// Epoch values at or above this are read as milliseconds.
const EPOCH_MILLIS_FLOOR: i64 = 100_000_000_000;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("row {row}: timestamp {timestamp} does not follow {previous}")]
    NotAscending {
        row: usize,
        timestamp: NaiveDateTime,
        previous: NaiveDateTime,
    },

    #[error("no bars found")]
    Empty,
}

/// Options controlling how rows are read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Fail on the first malformed row instead of skipping it.
    pub strict: bool,
}

/// Parse a timestamp in any supported format.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    let epoch: i64 = raw.parse().ok()?;
    let utc = if epoch.abs() >= EPOCH_MILLIS_FLOOR {
        DateTime::from_timestamp_millis(epoch)
    } else {
        DateTime::from_timestamp(epoch, 0)
    };
    utc.map(|dt| dt.naive_utc())
}

/// Load bars from a CSV file.
pub fn load_bars_csv(path: &Path, opts: &LoadOptions) -> Result<Vec<Bar>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bars = read_bars(file, opts)?;
    tracing::info!(path = %path.display(), bars = bars.len(), "loaded bars");
    Ok(bars)
}

/// Read bars from any CSV source.
pub fn read_bars<R: Read>(reader: R, opts: &LoadOptions) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut bars: Vec<Bar> = Vec::new();
    let mut skipped = 0usize;

    for (i, record) in rdr.records().enumerate() {
        // header is row 1
        let row = i + 2;
        let record = record?;
        let bar = match parse_row(&record) {
            Ok(bar) => bar,
            Err(reason) if !opts.strict => {
                tracing::warn!(row, %reason, "skipping malformed row");
                skipped += 1;
                continue;
            }
            Err(reason) => return Err(LoadError::MalformedRow { row, reason }),
        };

        if let Some(previous) = bars.last().map(|b| b.timestamp) {
            if bar.timestamp <= previous {
                return Err(LoadError::NotAscending {
                    row,
                    timestamp: bar.timestamp,
                    previous,
                });
            }
        }
        if !bar.is_sane() {
            tracing::warn!(row, "bar fails OHLC sanity checks");
        }
        bars.push(bar);
    }

    if skipped > 0 {
        tracing::warn!(skipped, kept = bars.len(), "malformed rows skipped");
    }
    if bars.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(bars)
}

fn parse_row(record: &csv::StringRecord) -> Result<Bar, String> {
    if record.len() < 6 {
        return Err(format!("expected 6 columns, found {}", record.len()));
    }
    let timestamp = parse_timestamp(&record[0])
        .ok_or_else(|| format!("unrecognised timestamp '{}'", &record[0]))?;
    let field = |idx: usize, name: &str| -> Result<f64, String> {
        record[idx]
            .parse::<f64>()
            .map_err(|e| format!("invalid {name} '{}': {e}", &record[idx]))
    };
    Ok(Bar {
        timestamp,
        open: field(1, "open")?,
        high: field(2, "high")?,
        low: field(3, "low")?,
        close: field(4, "close")?,
        volume: field(5, "volume")?,
    })
}
