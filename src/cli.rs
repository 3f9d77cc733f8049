//! Command-line interface definitions and argument parsing

use crate::config::AnalysisConfig;
use crate::data::{Layout, LoadOptions, DEFAULT_BASKET_COLUMN, DEFAULT_ITEM_COLUMN};
use crate::ranking::SortKey;
use clap::Parser;
use std::path::PathBuf;

/// Market basket analysis: frequent itemsets and association rules from a CSV file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "transactions.csv")]
    pub input: PathBuf,

    /// Basket layout of the input file
    #[arg(short, long, value_enum, default_value_t = Layout::Wide)]
    pub layout: Layout,

    /// Basket id column (long layout)
    #[arg(long, default_value = DEFAULT_BASKET_COLUMN)]
    pub basket_column: String,

    /// Item column (long layout)
    #[arg(long, default_value = DEFAULT_ITEM_COLUMN)]
    pub item_column: String,

    /// Optional TOML file with analysis settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum support, e.g. 0.02 for 2% of transactions
    #[arg(short = 's', long)]
    pub min_support: Option<f64>,

    /// Minimum rule confidence
    #[arg(short = 'c', long)]
    pub min_confidence: Option<f64>,

    /// Minimum rule lift
    #[arg(long)]
    pub min_lift: Option<f64>,

    /// Largest itemset size to search for
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Measure used to rank the displayed rules
    #[arg(long, value_enum)]
    pub sort_by: Option<SortKey>,

    /// Number of top rules to display (0 shows all)
    #[arg(short = 'n', long)]
    pub top: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            layout: self.layout,
            basket_column: self.basket_column.clone(),
            item_column: self.item_column.clone(),
        }
    }

    /// Apply explicitly passed flags on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut AnalysisConfig) {
        if let Some(min_support) = self.min_support {
            config.mining.min_support = min_support;
        }
        if let Some(min_confidence) = self.min_confidence {
            config.mining.min_confidence = min_confidence;
        }
        if let Some(min_lift) = self.min_lift {
            config.mining.min_lift = min_lift;
        }
        if let Some(max_length) = self.max_length {
            config.mining.max_length = Some(max_length);
        }
        if let Some(sort_by) = self.sort_by {
            config.sort_by = sort_by;
        }
        if let Some(top) = self.top {
            config.top = top;
        }
    }

    /// Layered configuration: defaults, config file, environment, then flags
    pub fn resolve_config(&self) -> crate::Result<AnalysisConfig> {
        let mut config = AnalysisConfig::load(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let args = Args::parse_from(["basketforge"]);
        assert_eq!(args.input, PathBuf::from("transactions.csv"));
        assert_eq!(args.layout, Layout::Wide);
        assert_eq!(args.basket_column, "InvoiceNumber");
        assert_eq!(args.item_column, "ProductName");
        assert_eq!(args.min_support, None);
        assert!(!args.verbose);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let args = Args::parse_from([
            "basketforge",
            "--input",
            "baskets.csv",
            "--layout",
            "long",
            "-s",
            "0.05",
            "--min-lift",
            "2",
            "--max-length",
            "3",
            "--sort-by",
            "support",
            "-n",
            "25",
        ]);

        let mut config = AnalysisConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(args.load_options().layout, Layout::Long);
        assert_eq!(config.mining.min_support, 0.05);
        assert_eq!(config.mining.min_confidence, 0.2);
        assert_eq!(config.mining.min_lift, 2.0);
        assert_eq!(config.mining.max_length, Some(3));
        assert_eq!(config.sort_by, SortKey::Support);
        assert_eq!(config.top, 25);
    }

    #[test]
    fn test_invalid_sort_key_rejected() {
        let result = Args::try_parse_from(["basketforge", "--sort-by", "price"]);
        assert!(result.is_err());
    }
}
