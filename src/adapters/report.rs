//! Rendering of run and benchmark outputs into files.

use crate::adapters::catalogue_csv::IngestionReport;
use crate::core::complexity::Classification;
use crate::core::search::SearchStatistics;
use crate::domain::model::{SelectionSummary, Strategy, TimingSample};
use crate::utils::error::{OptimizerError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const SELECTION_CSV: &str = "selection.csv";
pub const SUMMARY_JSON: &str = "summary.json";
pub const TIMINGS_CSV: &str = "timings.csv";
pub const COMPLEXITY_JSON: &str = "complexity.json";

/// A rendered output file, ready to hand to a `Storage`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportFile {
    pub name: String,
    pub contents: Vec<u8>,
}

impl ReportFile {
    pub fn new(name: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            contents,
        }
    }
}

#[derive(Debug, Serialize)]
struct SelectionRow<'a> {
    name: &'a str,
    price: Decimal,
    profit: Decimal,
    benefit: Decimal,
}

/// Machine-readable summary of one optimization run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub strategy: Strategy,
    pub budget: Decimal,
    pub selected: Vec<String>,
    pub count: usize,
    pub total_cost: Decimal,
    pub total_benefit: Decimal,
    pub final_balance: Decimal,
    pub catalogue_size: usize,
    /// Non-empty subsets of the catalogue, absent when too large to count.
    pub search_space: Option<String>,
    pub ingestion: IngestionReport,
    pub statistics: SearchStatistics,
    pub sort_duration_us: f64,
    pub search_duration_us: f64,
    pub generated_at: DateTime<Utc>,
}

/// Machine-readable result of one timing experiment.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub experiment: String,
    pub strategy: Strategy,
    pub budget: Decimal,
    pub stopped_early: bool,
    pub largest_size: usize,
    pub search_space: Option<String>,
    pub classification: Classification,
    pub generated_at: DateTime<Utc>,
}

pub fn selection_csv(summary: &SelectionSummary) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for item in &summary.items {
        writer.serialize(SelectionRow {
            name: item.id(),
            price: item.price(),
            profit: item.profit_rate(),
            benefit: item.benefit(),
        })?;
    }
    // 沒有資料列時 serialize 不會寫表頭
    if summary.items.is_empty() {
        writer.write_record(["name", "price", "profit", "benefit"])?;
    }
    into_bytes(writer)
}

pub fn timings_csv(samples: &[TimingSample]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["size", "duration_us"])?;
    for sample in samples {
        writer.write_record([sample.size.to_string(), format!("{:.3}", sample.duration_us())])?;
    }
    into_bytes(writer)
}

pub fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(value)?)
}

/// Packs every file into one ZIP archive.
pub fn bundle(files: &[ReportFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for file in files {
        zip.start_file::<_, ()>(file.name.as_str(), FileOptions::default())?;
        zip.write_all(&file.contents)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn into_bytes(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| OptimizerError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Item;
    use std::io::Read;
    use std::time::Duration;

    fn summary() -> SelectionSummary {
        let items = vec![
            Item::new("B", Decimal::from(200), Decimal::from(8)),
            Item::new("C", Decimal::from(50), Decimal::from(20)),
        ];
        SelectionSummary {
            count: items.len(),
            items,
            initial_budget: Decimal::from(300),
            final_balance: Decimal::from(50),
            total_cost: Decimal::from(250),
            total_benefit: Decimal::from(26),
        }
    }

    #[test]
    fn test_selection_csv_rows() {
        let csv = String::from_utf8(selection_csv(&summary()).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "name,price,profit,benefit");
        assert_eq!(lines[1], "B,200,8,16");
        assert_eq!(lines[2], "C,50,20,10");
    }

    #[test]
    fn test_empty_selection_still_has_header() {
        let empty = SelectionSummary {
            items: Vec::new(),
            initial_budget: Decimal::from(10),
            final_balance: Decimal::from(10),
            total_cost: Decimal::ZERO,
            total_benefit: Decimal::ZERO,
            count: 0,
        };
        let csv = String::from_utf8(selection_csv(&empty).unwrap()).unwrap();
        assert_eq!(csv.trim_end(), "name,price,profit,benefit");
    }

    #[test]
    fn test_timings_csv() {
        let samples = vec![
            TimingSample::new(2, Duration::from_micros(15)),
            TimingSample::new(3, Duration::from_nanos(40_500)),
        ];
        let csv = String::from_utf8(timings_csv(&samples).unwrap()).unwrap();
        assert_eq!(csv, "size,duration_us\n2,15.000\n3,40.500\n");
    }

    #[test]
    fn test_bundle_contains_every_file() {
        let files = vec![
            ReportFile::new(SELECTION_CSV, b"name\n".to_vec()),
            ReportFile::new(SUMMARY_JSON, b"{}".to_vec()),
        ];
        let data = bundle(&files).unwrap();

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut contents = String::new();
        archive
            .by_name(SUMMARY_JSON)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "{}");
    }
}
