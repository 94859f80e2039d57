//! CSV ingestion and cleaning of share catalogues.
//!
//! Expects a header row with at least `name`, `price` and `profit` columns;
//! other columns are ignored. Rows that cannot be parsed, rows with a
//! non-positive price or profit, and repeated names are dropped with a
//! warning so that the engine only ever sees a clean catalogue.

use crate::domain::model::{Catalogue, Item};
use crate::utils::error::{OptimizerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

const REQUIRED_COLUMNS: [&str; 3] = ["name", "price", "profit"];

#[derive(Debug, Deserialize)]
struct RawRow {
    name: String,
    price: String,
    profit: String,
}

/// What happened to the rows of one CSV file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub accepted: usize,
    pub rejected_non_positive: usize,
    pub rejected_malformed: usize,
    pub duplicates: usize,
}

impl IngestionReport {
    pub fn rejected(&self) -> usize {
        self.rejected_non_positive + self.rejected_malformed + self.duplicates
    }
}

/// Parses and cleans a catalogue from CSV bytes. Items keep file order.
pub fn parse_catalogue(data: &[u8]) -> Result<(Catalogue, IngestionReport)> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(OptimizerError::ProcessingError {
                message: format!("catalogue CSV has no '{}' column", column),
            });
        }
    }

    let mut report = IngestionReport::default();
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for (index, row) in reader.deserialize::<RawRow>().enumerate() {
        // 表頭佔第一行
        let line = index + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("Skipping malformed row at line {}: {}", line, e);
                report.rejected_malformed += 1;
                continue;
            }
        };

        let (price, profit) = match (Decimal::from_str(&row.price), Decimal::from_str(&row.profit)) {
            (Ok(price), Ok(profit)) => (price, profit),
            _ => {
                tracing::warn!(
                    "Skipping '{}' at line {}: price '{}' / profit '{}' is not a decimal",
                    row.name,
                    line,
                    row.price,
                    row.profit
                );
                report.rejected_malformed += 1;
                continue;
            }
        };

        if price <= Decimal::ZERO || profit <= Decimal::ZERO {
            tracing::debug!(
                "Dropping '{}': price {} / profit {} not positive",
                row.name,
                price,
                profit
            );
            report.rejected_non_positive += 1;
            continue;
        }

        if !seen.insert(row.name.clone()) {
            tracing::warn!("Dropping duplicate share '{}' at line {}", row.name, line);
            report.duplicates += 1;
            continue;
        }

        items.push(Item::new(row.name, price, profit));
    }

    report.accepted = items.len();
    if report.rejected() > 0 {
        tracing::info!(
            "🧹 Cleaned catalogue: {} accepted, {} non-positive, {} malformed, {} duplicates",
            report.accepted,
            report.rejected_non_positive,
            report.rejected_malformed,
            report.duplicates
        );
    }

    Ok((Catalogue::new(items), report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_clean_rows_in_file_order() {
        let csv = "name,price,profit\nShare-B,20.50,10\nShare-A,10,5.5\n";
        let (catalogue, report) = parse_catalogue(csv.as_bytes()).unwrap();

        let ids: Vec<&str> = catalogue.items().iter().map(Item::id).collect();
        assert_eq!(ids, vec!["Share-B", "Share-A"]);
        assert_eq!(catalogue.items()[0].price(), Decimal::new(2050, 2));
        assert_eq!(catalogue.items()[1].profit_rate(), Decimal::new(55, 1));
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected(), 0);
    }

    #[test]
    fn test_parse_drops_non_positive_and_malformed_rows() {
        let csv = "name,price,profit\n\
                   A,10,5\n\
                   B,0,5\n\
                   C,-3,5\n\
                   D,10,0\n\
                   E,abc,5\n\
                   F,12,7\n";
        let (catalogue, report) = parse_catalogue(csv.as_bytes()).unwrap();

        assert_eq!(catalogue.len(), 2);
        assert_eq!(report.rejected_non_positive, 3);
        assert_eq!(report.rejected_malformed, 1);
        assert!(catalogue.validate().is_ok());
    }

    #[test]
    fn test_parse_drops_duplicate_names() {
        let csv = "name,price,profit\nA,10,5\nA,20,8\n";
        let (catalogue, report) = parse_catalogue(csv.as_bytes()).unwrap();

        assert_eq!(catalogue.len(), 1);
        assert_eq!(catalogue.items()[0].price(), Decimal::from(10));
        assert_eq!(report.duplicates, 1);
    }

    #[test]
    fn test_parse_ignores_extra_columns_and_whitespace() {
        let csv = "name, price , profit,sector\n Share-X , 15.2 , 3 ,tech\n";
        let (catalogue, _) = parse_catalogue(csv.as_bytes()).unwrap();

        assert_eq!(catalogue.items()[0].id(), "Share-X");
        assert_eq!(catalogue.items()[0].price(), Decimal::new(152, 1));
    }

    #[test]
    fn test_parse_rejects_missing_columns() {
        let err = parse_catalogue(b"name,cost\nA,10\n").unwrap_err();
        assert!(matches!(err, OptimizerError::ProcessingError { .. }));
    }

    #[test]
    fn test_parse_empty_input() {
        let (catalogue, report) = parse_catalogue(b"name,price,profit\n").unwrap();
        assert!(catalogue.is_empty());
        assert_eq!(report, IngestionReport::default());
    }
}
