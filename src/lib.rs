//! BasketForge: market basket analysis over retail transactions
//!
//! This library mines frequent itemsets with a level-wise Apriori search and
//! derives association rules scored by support, confidence and lift.

pub mod analysis;
pub mod apriori;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod itemset;
pub mod ranking;
pub mod rules;
pub mod transactions;

// Re-export public items for easier access
pub use analysis::{analyze, analyze_with, Analysis};
pub use apriori::{mine, Apriori, ItemsetMiner, LevelProgress};
pub use cli::Args;
pub use config::{AnalysisConfig, MiningConfig};
pub use data::{load_transactions, Layout, LoadOptions};
pub use error::{MiningError, MiningResult};
pub use itemset::{FrequentItemset, FrequentItemsets, Item, Itemset};
pub use ranking::{sort_rules, top_rules, SortKey};
pub use rules::{filter_by_lift, generate_rules, rules_by_confidence, AssociationRule};
pub use transactions::TransactionSet;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
