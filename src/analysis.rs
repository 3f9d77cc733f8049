//! One-call market basket analysis: validate, mine, derive rules, filter by lift

use crate::apriori::{Apriori, ItemsetMiner};
use crate::config::MiningConfig;
use crate::error::MiningResult;
use crate::itemset::FrequentItemsets;
use crate::rules::{filter_by_lift, rules_by_confidence, AssociationRule};
use crate::transactions::TransactionSet;
use tracing::info;

/// Output of an analysis run
#[derive(Debug, Clone)]
pub struct Analysis {
    pub itemsets: FrequentItemsets,
    /// Rules meeting both the confidence and the lift threshold
    pub rules: Vec<AssociationRule>,
    /// Rules meeting the confidence threshold before lift filtering
    pub rules_before_lift: usize,
}

/// Run the full pipeline with the given thresholds.
///
/// All thresholds are validated before any mining starts.
pub fn analyze(transactions: &TransactionSet, config: &MiningConfig) -> MiningResult<Analysis> {
    analyze_with(&Apriori::from_config(config), transactions, config)
}

/// Same as [`analyze`] with a caller-supplied miner, e.g. one with a progress
/// callback attached.
pub fn analyze_with<M: ItemsetMiner>(
    miner: &M,
    transactions: &TransactionSet,
    config: &MiningConfig,
) -> MiningResult<Analysis> {
    config.validate()?;

    info!(
        transactions = transactions.len(),
        items = transactions.num_items(),
        min_support = config.min_support,
        min_confidence = config.min_confidence,
        min_lift = config.min_lift,
        "Starting analysis"
    );

    let itemsets = miner.mine(transactions)?;
    let rules = rules_by_confidence(&itemsets, config.min_confidence)?;
    let rules_before_lift = rules.len();
    let rules = filter_by_lift(rules, config.min_lift)?;

    info!(
        frequent_itemsets = itemsets.len(),
        rules_before_lift,
        rules = rules.len(),
        "Analysis complete"
    );

    Ok(Analysis {
        itemsets,
        rules,
        rules_before_lift,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MiningError;

    fn scenario() -> TransactionSet {
        TransactionSet::from_rows(vec![
            vec!["A", "B"],
            vec!["A", "B", "C"],
            vec!["A"],
            vec!["B", "C"],
        ])
    }

    #[test]
    fn test_analyze_scenario() {
        let config = MiningConfig::new(0.5, 0.5, 1.5);
        let analysis = analyze(&scenario(), &config).unwrap();

        assert_eq!(analysis.itemsets.len(), 5);
        // A->B, B->A, B->C, C->B pass confidence; none reaches lift 1.5
        assert_eq!(analysis.rules_before_lift, 4);
        assert!(analysis.rules.is_empty());
    }

    #[test]
    fn test_analyze_fails_fast_on_bad_confidence() {
        // An invalid confidence is reported even though mining would succeed
        let config = MiningConfig::new(0.5, 0.0, 1.5);
        assert!(matches!(
            analyze(&scenario(), &config),
            Err(MiningError::InvalidThreshold { name: "min_confidence", .. })
        ));
    }

    #[test]
    fn test_analyze_empty_input() {
        let analysis = analyze(&TransactionSet::default(), &MiningConfig::default()).unwrap();
        assert!(analysis.itemsets.is_empty());
        assert!(analysis.rules.is_empty());
        assert_eq!(analysis.rules_before_lift, 0);
    }
}
