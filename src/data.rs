//! Transaction loading from CSV files using Polars

use crate::transactions::TransactionSet;
use anyhow::Context;
use clap::ValueEnum;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

pub const DEFAULT_BASKET_COLUMN: &str = "InvoiceNumber";
pub const DEFAULT_ITEM_COLUMN: &str = "ProductName";

/// How baskets are laid out in the input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Layout {
    /// One basket per row, one item per non-empty cell
    #[default]
    Wide,
    /// One item per row, grouped into baskets by an id column
    Long,
}

/// Options for turning a CSV file into transactions
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    pub layout: Layout,
    /// Basket id column for the long layout
    pub basket_column: String,
    /// Item column for the long layout
    pub item_column: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            layout: Layout::Wide,
            basket_column: DEFAULT_BASKET_COLUMN.to_string(),
            item_column: DEFAULT_ITEM_COLUMN.to_string(),
        }
    }
}

/// Load a CSV file into a transaction set
///
/// # Arguments
/// * `file_path` - Path to the CSV file (with a header row)
/// * `options` - Layout and column selection
///
/// # Returns
/// * `TransactionSet` ready for mining
pub fn load_transactions(
    file_path: &Path,
    options: &LoadOptions,
) -> crate::Result<TransactionSet> {
    let df = read_csv(file_path)?;
    debug!(rows = df.height(), columns = df.width(), "CSV file read");

    let rows = match options.layout {
        Layout::Wide => wide_rows(&df)?,
        Layout::Long => long_rows(&df, &options.basket_column, &options.item_column)?,
    };

    let empty = rows.iter().filter(|row| row.is_empty()).count();
    if empty > 0 {
        warn!(empty, "Some baskets contain no items");
    }

    let transactions = TransactionSet::from_rows(rows);
    info!(
        transactions = transactions.len(),
        items = transactions.num_items(),
        "Transactions loaded from {}",
        file_path.display()
    );
    Ok(transactions)
}

/// Read every column as a string so item codes keep their original text
fn read_csv(file_path: &Path) -> crate::Result<DataFrame> {
    if !file_path.exists() {
        anyhow::bail!("Input file not found: {}", file_path.display());
    }

    check_row_widths(file_path)?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(file_path.to_path_buf()))?
        .finish()
        .with_context(|| format!("Failed to read CSV file: {}", file_path.display()))?;

    if df.height() == 0 {
        anyhow::bail!("No data rows found in {}", file_path.display());
    }
    Ok(df)
}

/// Fail on the first data row with more fields than the header, so no item
/// is silently dropped
fn check_row_widths(file_path: &Path) -> crate::Result<()> {
    let text = std::fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read CSV file: {}", file_path.display()))?;

    let mut records = record_widths(&text).into_iter();
    let Some((_, header_width)) = records.next() else {
        return Ok(());
    };
    for (line, fields) in records {
        if fields > header_width {
            anyhow::bail!(
                "Line {} of {} has {} fields but the header has {}",
                line,
                file_path.display(),
                fields,
                header_width
            );
        }
    }
    Ok(())
}

/// `(first line, field count)` of every non-blank record. Commas and line
/// breaks inside double quotes do not split fields.
fn record_widths(text: &str) -> Vec<(usize, usize)> {
    let mut records = Vec::new();
    let (mut line, mut start, mut fields) = (1, 1, 1);
    let mut in_quotes = false;
    let mut blank = true;

    for c in text.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                blank = false;
            }
            ',' if !in_quotes => {
                fields += 1;
                blank = false;
            }
            '\n' => {
                line += 1;
                if !in_quotes {
                    if !blank {
                        records.push((start, fields));
                    }
                    start = line;
                    fields = 1;
                    blank = true;
                }
            }
            '\r' => {}
            _ => blank = false,
        }
    }
    if !blank {
        records.push((start, fields));
    }
    records
}

/// Trimmed cell values; nulls and blank cells become `None`
fn string_cells(series: &Series) -> crate::Result<Vec<Option<String>>> {
    let series = series.cast(&DataType::String)?;
    let cells = series
        .str()?
        .into_iter()
        .map(|cell| {
            cell.map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        })
        .collect();
    Ok(cells)
}

/// Each row is a basket made of its non-empty cells, in column order
pub fn wide_rows(df: &DataFrame) -> crate::Result<Vec<Vec<String>>> {
    let mut rows = vec![Vec::new(); df.height()];
    for series in df.get_columns() {
        for (row, cell) in rows.iter_mut().zip(string_cells(series)?) {
            if let Some(item) = cell {
                row.push(item);
            }
        }
    }
    Ok(rows)
}

/// Group item rows into baskets by `basket_column`, in first-seen order
pub fn long_rows(
    df: &DataFrame,
    basket_column: &str,
    item_column: &str,
) -> crate::Result<Vec<Vec<String>>> {
    let baskets = df
        .column(basket_column)
        .with_context(|| format!("Basket column '{}' not found", basket_column))?;
    let items = df
        .column(item_column)
        .with_context(|| format!("Item column '{}' not found", item_column))?;

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut skipped = 0;

    for (basket, item) in string_cells(baskets)?.into_iter().zip(string_cells(items)?) {
        let (Some(basket), Some(item)) = (basket, item) else {
            skipped += 1;
            continue;
        };
        let slot = *index.entry(basket).or_insert_with(|| {
            rows.push(Vec::new());
            rows.len() - 1
        });
        rows[slot].push(item);
    }

    if skipped > 0 {
        warn!(skipped, "Skipped rows with a missing basket id or item");
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_wide_csv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Item1,Item2,Item3").unwrap();
        writeln!(file, "bread,milk,").unwrap();
        writeln!(file, "bread, butter ,milk").unwrap();
        writeln!(file, "milk,,").unwrap();
        writeln!(file, "0042,bread,bread").unwrap();
        file
    }

    fn create_long_csv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Date,InvoiceNumber,ProductID,ProductName,Quantity").unwrap();
        writeln!(file, "2024-01-02,INV-1,P1,Bread,1").unwrap();
        writeln!(file, "2024-01-02,INV-1,P2,Milk,2").unwrap();
        writeln!(file, "2024-01-02,INV-2,P2,Milk,1").unwrap();
        writeln!(file, "2024-01-03,INV-1,P3,Butter,1").unwrap();
        writeln!(file, "2024-01-03,,P3,Butter,1").unwrap();
        file
    }

    #[test]
    fn test_load_wide_layout() {
        let file = create_wide_csv();
        let transactions = load_transactions(file.path(), &LoadOptions::default()).unwrap();

        assert_eq!(transactions.len(), 4);
        let second: Vec<&str> = transactions
            .transaction(1)
            .unwrap()
            .map(|i| i.as_str())
            .collect();
        assert_eq!(second, vec!["bread", "butter", "milk"]);
        // Codes keep leading zeros and duplicates collapse
        let fourth: Vec<&str> = transactions
            .transaction(3)
            .unwrap()
            .map(|i| i.as_str())
            .collect();
        assert_eq!(fourth, vec!["0042", "bread"]);
    }

    #[test]
    fn test_load_long_layout() {
        let file = create_long_csv();
        let options = LoadOptions {
            layout: Layout::Long,
            ..LoadOptions::default()
        };
        let transactions = load_transactions(file.path(), &options).unwrap();

        assert_eq!(transactions.len(), 2);
        let first: Vec<&str> = transactions
            .transaction(0)
            .unwrap()
            .map(|i| i.as_str())
            .collect();
        assert_eq!(first, vec!["Bread", "Butter", "Milk"]);
        assert_eq!(transactions.transaction(1).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_column() {
        let file = create_long_csv();
        let options = LoadOptions {
            layout: Layout::Long,
            item_column: "Sku".to_string(),
            ..LoadOptions::default()
        };
        let err = load_transactions(file.path(), &options).unwrap_err();
        assert!(err.to_string().contains("Sku"));
    }

    #[test]
    fn test_missing_file() {
        let path = Path::new("/nonexistent/baskets.csv");
        let result = load_transactions(path, &LoadOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_row_wider_than_header_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Item1,Item2").unwrap();
        writeln!(file, "bread,milk").unwrap();
        writeln!(file, "bread,milk,jam,tea").unwrap();

        let err = load_transactions(file.path(), &LoadOptions::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Line 3"), "{}", message);
        assert!(message.contains("4 fields but the header has 2"), "{}", message);
    }

    #[test]
    fn test_quoted_commas_do_not_widen_rows() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Item1,Item2").unwrap();
        writeln!(file, "\"salt, sea\",bread").unwrap();
        writeln!(file, "milk,").unwrap();

        let transactions = load_transactions(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(transactions.len(), 2);
        assert!(transactions.id_of("salt, sea").is_some());
    }

    #[test]
    fn test_record_widths() {
        let text = "a,b\r\n\"x\ny\",z,w\n\n1\n";
        assert_eq!(record_widths(text), vec![(1, 2), (2, 3), (5, 1)]);
    }

    #[test]
    fn test_header_only_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Item1,Item2").unwrap();
        assert!(load_transactions(file.path(), &LoadOptions::default()).is_err());
    }
}
