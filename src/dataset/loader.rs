//! Dataset ingest: read the price-monitoring CSV, resolve columns, parse
//! prices, drop outliers and build the immutable snapshot.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info};

use crate::config::UNKNOWN_CATEGORY;
use crate::dataset::price::parse_price;
use crate::dataset::stats::is_qualifying;
use crate::error::{AppError, Result};
use crate::state::PriceSnapshot;
use crate::types::Listing;

const NAME_COLUMNS: [&str; 2] = ["product_name", "title"];
const CATEGORY_COLUMNS: [&str; 2] = ["main_category", "category"];
const CURRENT_PRICE_COLUMN: &str = "current_price";
const ORIGINAL_PRICE_COLUMN: &str = "original_price";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub rows_qualifying: usize,
    pub rejected_malformed: usize,
    pub rejected_unparsed_price: usize,
    pub rejected_out_of_bounds: usize,
}

/// Resolved column positions for one dataset.
#[derive(Debug, Clone, Copy)]
struct Columns {
    name: usize,
    category: Option<usize>,
    current_price: usize,
    original_price: usize,
}

/// Load the dataset at `path` and build the snapshot.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<(PriceSnapshot, LoadStats)> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AppError::DatasetNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let (listings, stats) = read_listings(file)?;

    let snapshot = PriceSnapshot::from_listings(listings)
        .ok_or_else(|| AppError::EmptyDataset(path.to_path_buf()))?;

    info!(
        path = %path.display(),
        rows_read = stats.rows_read,
        rows_qualifying = stats.rows_qualifying,
        categories = snapshot.category_count(),
        global_median = snapshot.global_median(),
        "Dataset loaded: {}/{} qualifying rows across {} categories (global median markup {:.3})",
        stats.rows_qualifying,
        stats.rows_read,
        snapshot.category_count(),
        snapshot.global_median(),
    );
    info!(
        "[FILTER] rejected: malformed={} unparsed_price={} out_of_bounds={}",
        stats.rejected_malformed, stats.rejected_unparsed_price, stats.rejected_out_of_bounds,
    );

    Ok((snapshot, stats))
}

/// Read qualifying listings from any CSV source.
pub fn read_listings<R: Read>(source: R) -> Result<(Vec<Listing>, LoadStats)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let columns = resolve_columns(&headers)?;

    let mut listings = Vec::new();
    let mut stats = LoadStats::default();

    for (idx, result) in reader.records().enumerate() {
        stats.rows_read += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                // +2: header line plus 1-based numbering
                debug!(line = idx + 2, "Skipping malformed CSV record: {e}");
                stats.rejected_malformed += 1;
                continue;
            }
        };

        let cell = |i: usize| record.get(i).unwrap_or("");
        let (Some(current_price), Some(original_price)) = (
            parse_price(cell(columns.current_price)),
            parse_price(cell(columns.original_price)),
        ) else {
            stats.rejected_unparsed_price += 1;
            continue;
        };

        if !is_qualifying(current_price, original_price) {
            stats.rejected_out_of_bounds += 1;
            continue;
        }

        let main_category = match columns.category {
            Some(i) => cell(i).to_string(),
            None => UNKNOWN_CATEGORY.to_string(),
        };

        listings.push(Listing {
            name: cell(columns.name).to_string(),
            main_category,
            current_price,
            original_price,
        });
    }

    stats.rows_qualifying = listings.len();
    Ok((listings, stats))
}

fn resolve_columns(headers: &StringRecord) -> Result<Columns> {
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect();
    let first_of = |names: &[&str]| names.iter().find_map(|n| header_map.get(*n).copied());

    let name = first_of(&NAME_COLUMNS).ok_or_else(|| {
        AppError::Schema(format!(
            "missing product name column (expected one of: {})",
            NAME_COLUMNS.join(", ")
        ))
    })?;

    let missing: Vec<&str> = [CURRENT_PRICE_COLUMN, ORIGINAL_PRICE_COLUMN]
        .into_iter()
        .filter(|c| !header_map.contains_key(*c))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Schema(format!(
            "missing price column(s): {}",
            missing.join(", ")
        )));
    }

    Ok(Columns {
        name,
        category: first_of(&CATEGORY_COLUMNS),
        current_price: header_map[CURRENT_PRICE_COLUMN],
        original_price: header_map[ORIGINAL_PRICE_COLUMN],
    })
}

/// Lowercase, strip a UTF-8 BOM, and join words with underscores so
/// `"Current Price"` and `"current-price"` both become `current_price`.
fn normalize_header_name(name: &str) -> String {
    name.trim()
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::types::MarkupSource;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_is_dataset_not_found() {
        let err = load_snapshot("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, AppError::DatasetNotFound(_)), "got {err:?}");
    }

    #[test]
    fn missing_name_column_is_schema_error() {
        let file = write_csv("sku,current_price,original_price\n1,KSh 150,KSh 100\n");
        let err = load_snapshot(file.path()).unwrap_err();
        assert!(matches!(err, AppError::Schema(_)), "got {err:?}");
    }

    #[test]
    fn missing_price_column_is_schema_error() {
        let file = write_csv("title,current_price\nLamp,KSh 150\n");
        let err = load_snapshot(file.path()).unwrap_err();
        match err {
            AppError::Schema(msg) => assert!(msg.contains("original_price"), "msg={msg}"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn no_qualifying_rows_is_empty_dataset() {
        let file = write_csv("title,current_price,original_price\nLamp,KSh 900,KSh 100\n");
        let err = load_snapshot(file.path()).unwrap_err();
        assert!(matches!(err, AppError::EmptyDataset(_)), "got {err:?}");
    }

    #[test]
    fn headers_are_normalized() {
        let csv = "\u{feff}Product Name,Main Category,Current-Price,ORIGINAL PRICE\n\
                   Kettle,Home,\"KSh 1,500\",\"KSh 1,000\"\n";
        let (listings, stats) = read_listings(csv.as_bytes()).unwrap();
        assert_eq!(stats.rows_qualifying, 1);
        assert_eq!(
            listings[0],
            Listing {
                name: "Kettle".to_string(),
                main_category: "Home".to_string(),
                current_price: 1500.0,
                original_price: 1000.0,
            }
        );
    }

    #[test]
    fn category_falls_back_to_category_then_unknown() {
        let csv = "title,category,current_price,original_price\nKettle,Kitchen,150,100\n";
        let (listings, _) = read_listings(csv.as_bytes()).unwrap();
        assert_eq!(listings[0].main_category, "Kitchen");

        let csv = "title,current_price,original_price\nKettle,150,100\n";
        let (listings, _) = read_listings(csv.as_bytes()).unwrap();
        assert_eq!(listings[0].main_category, UNKNOWN_CATEGORY);
    }

    #[test]
    fn unparsed_and_outlier_rows_are_excluded() {
        let csv = "product_name,main_category,current_price,original_price\n\
                   Good,Home,KSh 150,KSh 100\n\
                   Blank,Home,,KSh 100\n\
                   Words,Home,call us,KSh 100\n\
                   Cheap,Home,KSh 10,KSh 100\n\
                   Pricey,Home,KSh 600,KSh 100\n\
                   Zero,Home,KSh 150,KSh 0\n\
                   Range,Home,KSh 499 - 699,KSh 400\n";
        let (listings, stats) = read_listings(csv.as_bytes()).unwrap();
        let names: Vec<&str> = listings.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Good", "Range"]);
        assert_eq!(stats.rows_read, 7);
        assert_eq!(stats.rejected_unparsed_price, 2);
        assert_eq!(stats.rejected_out_of_bounds, 3);
        assert!((listings[1].current_price - 599.0).abs() < 1e-9);

        for l in &listings {
            let ratio = l.markup_ratio();
            assert!(ratio > 0.2 && ratio < 5.0);
        }
    }

    #[test]
    fn ten_row_category_is_not_trusted() {
        let mut csv = String::from("title,main_category,current_price,original_price\n");
        for i in 0..20 {
            csv.push_str(&format!("Phone {i},Phones,KSh 150,KSh 100\n"));
        }
        for i in 0..10 {
            csv.push_str(&format!("Rake {i},Garden,KSh 400,KSh 100\n"));
        }
        let file = write_csv(&csv);
        let (snapshot, _) = load_snapshot(file.path()).unwrap();

        let (garden, _) = snapshot.category_stat("garden").unwrap();
        assert_eq!(garden, "Garden");
        let (markup, source) = snapshot.category_markup(Some("Garden"));
        assert_eq!(source, MarkupSource::Global);
        assert!((markup - 1.5).abs() < 1e-9);
    }
}
