//! Result export: CSV trade ledger, JSONL snapshot stream, JSON report.
//!
//! Each artifact has a writer over any `io::Write` and a `save_*` wrapper
//! that creates parent directories.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use vwzlab_core::snapshot::IndicatorSnapshot;
use vwzlab_core::Trade;

use crate::runner::RunReport;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("write error: {0}")]
    Write(#[from] std::io::Error),
}

/// Ledger columns, in order.
pub const TRADE_COLUMNS: [&str; 13] = [
    "direction",
    "entry_index",
    "entry_time",
    "entry_price",
    "exit_index",
    "exit_time",
    "exit_price",
    "exit_reason",
    "size",
    "pnl",
    "pnl_percent",
    "bars_held",
    "entry_pattern",
];

// ─── CSV trade ledger ───────────────────────────────────────────────

pub fn write_trades_csv<W: Write>(trades: &[Trade], writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(TRADE_COLUMNS)?;

    for t in trades {
        let pattern = t
            .entry_snapshot
            .pattern
            .map(|p| format!("{p:?}"))
            .unwrap_or_default();
        let record: [&str; 13] = [
            t.direction.as_str(),
            &t.entry_index.to_string(),
            &t.entry_time.to_string(),
            &format!("{:.6}", t.entry_price),
            &t.exit_index.to_string(),
            &t.exit_time.to_string(),
            &format!("{:.6}", t.exit_price),
            t.exit_reason.as_str(),
            &format!("{:.6}", t.size),
            &format!("{:.6}", t.pnl),
            &format!("{:.4}", t.pnl_percent),
            &t.bars_held().to_string(),
            &pattern,
        ];
        wtr.write_record(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_trades_csv(trades: &[Trade], path: &Path) -> Result<(), ExportError> {
    write_trades_csv(trades, create(path)?)?;
    tracing::info!(path = %path.display(), trades = trades.len(), "wrote trade ledger");
    Ok(())
}

// ─── JSONL snapshot stream ──────────────────────────────────────────

/// One JSON object per line. Undefined indicator values serialize as `null`.
pub fn write_snapshots_jsonl<'a, W, I>(snapshots: I, mut writer: W) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a IndicatorSnapshot>,
{
    let mut count = 0;
    for snapshot in snapshots {
        serde_json::to_writer(&mut writer, snapshot)?;
        writer.write_all(b"\n")?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

pub fn save_snapshots_jsonl(snapshots: &[IndicatorSnapshot], path: &Path) -> Result<(), ExportError> {
    let count = write_snapshots_jsonl(snapshots, create(path)?)?;
    tracing::info!(path = %path.display(), snapshots = count, "wrote snapshot stream");
    Ok(())
}

// ─── JSON report ────────────────────────────────────────────────────

pub fn write_report_json<W: Write>(report: &RunReport, writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

pub fn save_report_json(report: &RunReport, path: &Path) -> Result<(), ExportError> {
    let mut writer = create(path)?;
    write_report_json(report, &mut writer)?;
    writer.flush()?;
    tracing::info!(path = %path.display(), run_id = %report.run_id, "wrote report");
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::tests::make_trade;

    #[test]
    fn csv_trades_all_columns() {
        let mut buf = Vec::new();
        write_trades_csv(&[make_trade(2.5)], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), TRADE_COLUMNS.join(","));
        let row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(row.len(), TRADE_COLUMNS.len());
        assert_eq!(row[0], "long");
        assert_eq!(row[7], "TakeProfit");
        assert_eq!(row[9], "2.500000");
        assert_eq!(row[11], "5");
        assert_eq!(row[12], "");
    }

    #[test]
    fn csv_empty_trades_is_header_only() {
        let mut buf = Vec::new();
        write_trades_csv(&[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }

    #[test]
    fn jsonl_one_line_per_snapshot() {
        let trades = [make_trade(1.0), make_trade(-1.0)];
        let snapshots: Vec<&IndicatorSnapshot> = trades.iter().map(|t| t.entry_snapshot.as_ref()).collect();
        let mut buf = Vec::new();
        let count = write_snapshots_jsonl(snapshots, &mut buf).unwrap();
        assert_eq!(count, 2);
        let text = String::from_utf8(buf).unwrap();
        for line in text.lines() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["index"], 0);
            assert!(value["zscore"].as_array().unwrap().is_empty());
        }
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("trades.csv");
        save_trades_csv(&[make_trade(1.0)], &path).unwrap();
        assert!(path.exists());
    }
}
