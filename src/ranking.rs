//! Ordering and truncation of rules for display

use crate::rules::AssociationRule;
use clap::ValueEnum;
use serde::Deserialize;
use std::cmp::Ordering;

/// Measure used to rank rules, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Confidence,
    Support,
    Lift,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Confidence => "confidence",
            SortKey::Support => "support",
            SortKey::Lift => "lift",
        }
    }

    fn value(&self, rule: &AssociationRule) -> f64 {
        match self {
            SortKey::Confidence => rule.confidence,
            SortKey::Support => rule.support,
            SortKey::Lift => rule.lift,
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort rules by `key` descending. Ties fall back to the antecedent, then the
/// consequent, so the order is the same on every run.
pub fn sort_rules(rules: &mut [AssociationRule], key: SortKey) {
    rules.sort_by(|a, b| compare(a, b, key));
}

/// The `top` best rules by `key`; `top == 0` keeps all of them.
pub fn top_rules(
    mut rules: Vec<AssociationRule>,
    key: SortKey,
    top: usize,
) -> Vec<AssociationRule> {
    sort_rules(&mut rules, key);
    if top > 0 {
        rules.truncate(top);
    }
    rules
}

fn compare(a: &AssociationRule, b: &AssociationRule, key: SortKey) -> Ordering {
    key.value(b)
        .total_cmp(&key.value(a))
        .then_with(|| a.antecedent.cmp(&b.antecedent))
        .then_with(|| a.consequent.cmp(&b.consequent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apriori::mine;
    use crate::rules::rules_by_confidence;

    fn sample_rules() -> Vec<AssociationRule> {
        let rows = vec![
            vec!["bread", "butter"],
            vec!["bread", "butter", "jam"],
            vec!["bread"],
            vec!["butter", "jam"],
            vec!["jam", "tea"],
        ];
        let itemsets = mine(&rows, 0.2).unwrap();
        rules_by_confidence(&itemsets, 0.1).unwrap()
    }

    #[test]
    fn test_sort_descending_by_each_key() {
        for key in [SortKey::Confidence, SortKey::Support, SortKey::Lift] {
            let mut rules = sample_rules();
            sort_rules(&mut rules, key);
            assert!(rules
                .windows(2)
                .all(|w| key.value(&w[0]) >= key.value(&w[1])));
        }
    }

    #[test]
    fn test_top_rules_truncates() {
        let all = sample_rules();
        assert!(all.len() > 3);

        let top = top_rules(all.clone(), SortKey::Lift, 3);
        assert_eq!(top.len(), 3);

        let everything = top_rules(all.clone(), SortKey::Lift, 0);
        assert_eq!(everything.len(), all.len());
        assert_eq!(&everything[..3], &top[..]);
    }

    #[test]
    fn test_ties_break_deterministically() {
        let mut first = sample_rules();
        let mut second = sample_rules();
        second.reverse();
        sort_rules(&mut first, SortKey::Support);
        sort_rules(&mut second, SortKey::Support);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sort_key_names() {
        assert_eq!(SortKey::default(), SortKey::Confidence);
        assert_eq!(SortKey::Lift.to_string(), "lift");
        assert_eq!(SortKey::Support.as_str(), "support");
    }
}
