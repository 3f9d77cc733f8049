//! Association rule generation from frequent itemsets
//!
//! Rules are derived without rescanning transactions: every antecedent and
//! consequent of a frequent itemset is itself frequent, so its support count
//! is already known.

use crate::apriori::subsets_known;
use crate::config::{validate_confidence, validate_lift};
use crate::error::MiningResult;
use crate::itemset::{meets_threshold, FrequentItemsets, Item, Itemset};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

/// A scored rule `antecedent -> consequent`
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationRule {
    pub antecedent: Itemset,
    pub consequent: Itemset,
    /// Support of antecedent ∪ consequent
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    /// Transactions containing antecedent ∪ consequent
    pub count_full: usize,
    pub count_antecedent: usize,
    pub count_consequent: usize,
    pub num_transactions: usize,
}

impl AssociationRule {
    fn from_counts(
        antecedent: Itemset,
        consequent: Itemset,
        count_full: usize,
        count_antecedent: usize,
        count_consequent: usize,
        num_transactions: usize,
    ) -> Self {
        let n = num_transactions as f64;
        let support = count_full as f64 / n;
        let confidence = count_full as f64 / count_antecedent as f64;
        let lift = confidence / (count_consequent as f64 / n);
        Self {
            antecedent,
            consequent,
            support,
            confidence,
            lift,
            count_full,
            count_antecedent,
            count_consequent,
            num_transactions,
        }
    }

    /// Support of the consequent on its own
    pub fn consequent_support(&self) -> f64 {
        self.count_consequent as f64 / self.num_transactions as f64
    }

    /// (1 - support(consequent)) / (1 - confidence); infinite for exact rules.
    pub fn conviction(&self) -> f64 {
        let miss = 1.0 - self.confidence;
        if miss <= 0.0 {
            f64::INFINITY
        } else {
            (1.0 - self.consequent_support()) / miss
        }
    }

    pub fn rule_power_factor(&self) -> f64 {
        self.support * self.confidence
    }

    /// The frequent itemset this rule was split from
    pub fn itemset(&self) -> Itemset {
        let mut items = self.antecedent.items().to_vec();
        items.extend_from_slice(self.consequent.items());
        items.sort();
        Itemset::from_sorted(items)
    }
}

impl fmt::Display for AssociationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} (conf: {:.3}, supp: {:.3}, lift: {:.3}, conv: {:.3})",
            self.antecedent,
            self.consequent,
            self.confidence,
            self.support,
            self.lift,
            self.conviction()
        )
    }
}

/// Derive every rule meeting `min_confidence`, then keep those meeting
/// `min_lift`.
pub fn generate_rules(
    itemsets: &FrequentItemsets,
    min_confidence: f64,
    min_lift: f64,
) -> MiningResult<Vec<AssociationRule>> {
    validate_confidence(min_confidence)?;
    validate_lift(min_lift)?;

    let rules = rules_by_confidence(itemsets, min_confidence)?;
    let rules = filter_by_lift(rules, min_lift)?;
    info!(rules = rules.len(), "Association rule generation complete");
    Ok(rules)
}

/// Every rule with confidence >= `min_confidence`, unfiltered by lift.
///
/// Consequents grow one item at a time. Confidence can only drop as the
/// consequent grows, so a failing consequent is never extended.
pub fn rules_by_confidence(
    itemsets: &FrequentItemsets,
    min_confidence: f64,
) -> MiningResult<Vec<AssociationRule>> {
    validate_confidence(min_confidence)?;

    let mut rules = Vec::new();
    for k in 2..=itemsets.max_size() {
        for (itemset, count) in itemsets.level(k) {
            rules_for_itemset(itemsets, itemset, count, min_confidence, &mut rules);
        }
    }
    debug!(
        rules = rules.len(),
        min_confidence, "Confidence filtering complete"
    );
    Ok(rules)
}

/// Keep only rules whose lift meets `min_lift`.
pub fn filter_by_lift(
    rules: Vec<AssociationRule>,
    min_lift: f64,
) -> MiningResult<Vec<AssociationRule>> {
    validate_lift(min_lift)?;

    let before = rules.len();
    let kept: Vec<AssociationRule> = rules
        .into_iter()
        .filter(|rule| meets_threshold(rule.lift, min_lift))
        .collect();
    debug!(before, after = kept.len(), min_lift, "Lift filtering complete");
    Ok(kept)
}

fn rules_for_itemset(
    itemsets: &FrequentItemsets,
    itemset: &Itemset,
    count_full: usize,
    min_confidence: f64,
    rules: &mut Vec<AssociationRule>,
) {
    let k = itemset.len();
    let total = itemsets.total_transactions();
    let mut consequents: Vec<Vec<Item>> = itemset.iter().map(|item| vec![item.clone()]).collect();

    while !consequents.is_empty() && consequents[0].len() < k {
        let mut passing = Vec::new();
        for consequent in consequents {
            let antecedent = Itemset::from_sorted(
                itemset
                    .iter()
                    .filter(|item| consequent.binary_search(*item).is_err())
                    .cloned()
                    .collect(),
            );
            let consequent_set = Itemset::from_sorted(consequent.clone());

            // Both sides are subsets of a frequent itemset, so both are present
            // whenever `itemsets` is downward closed.
            let (Some(count_antecedent), Some(count_consequent)) = (
                itemsets.support_count(&antecedent),
                itemsets.support_count(&consequent_set),
            ) else {
                continue;
            };

            let confidence = count_full as f64 / count_antecedent as f64;
            if meets_threshold(confidence, min_confidence) {
                rules.push(AssociationRule::from_counts(
                    antecedent,
                    consequent_set,
                    count_full,
                    count_antecedent,
                    count_consequent,
                    total,
                ));
                passing.push(consequent);
            }
        }
        consequents = grow_consequents(&passing);
    }
}

/// Join consequents sharing all but their last item, keeping only those
/// whose every sub-consequent passed.
fn grow_consequents(passing: &[Vec<Item>]) -> Vec<Vec<Item>> {
    let Some(first) = passing.first() else {
        return Vec::new();
    };
    let m = first.len();
    let known: HashSet<&[Item]> = passing.iter().map(Vec::as_slice).collect();

    let mut grown = Vec::new();
    let mut scratch = Vec::with_capacity(m);
    for (i, left) in passing.iter().enumerate() {
        for right in &passing[i + 1..] {
            if left[..m - 1] != right[..m - 1] {
                break;
            }
            let mut items = left.clone();
            items.push(right[m - 1].clone());
            if subsets_known(&items, &known, &mut scratch) {
                grown.push(items);
            }
        }
    }
    grown
}
