//! Item, itemset and frequent-itemset value types

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Decimal places used when comparing ratios against thresholds
pub const THRESHOLD_PRECISION: i32 = 10;

/// Round a ratio to [`THRESHOLD_PRECISION`] decimal places.
pub fn round10(value: f64) -> f64 {
    let scale = 10f64.powi(THRESHOLD_PRECISION);
    (value * scale).round() / scale
}

/// Threshold test shared by support, confidence and lift filtering.
pub fn meets_threshold(value: f64, threshold: f64) -> bool {
    round10(value) >= round10(threshold)
}

/// An opaque item token. Cloning is a reference-count bump.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item(Arc<str>);

impl Item {
    pub fn new(name: &str) -> Self {
        Item(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Item {
    fn from(name: &str) -> Self {
        Item::new(name)
    }
}

impl From<String> for Item {
    fn from(name: String) -> Self {
        Item(Arc::from(name))
    }
}

impl Borrow<str> for Item {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A non-empty set of distinct items, stored sorted.
///
/// Ordering is lexicographic over the sorted items, which gives the
/// canonical representation used for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Itemset(Vec<Item>);

impl Itemset {
    /// Build an itemset from arbitrary items. Duplicates collapse; an empty
    /// input yields `None`.
    pub fn new<I, T>(items: I) -> Option<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Item>,
    {
        let mut items: Vec<Item> = items.into_iter().map(Into::into).collect();
        items.sort();
        items.dedup();
        if items.is_empty() {
            None
        } else {
            Some(Itemset(items))
        }
    }

    /// Caller guarantees `items` is sorted, deduplicated and non-empty.
    pub(crate) fn from_sorted(items: Vec<Item>) -> Self {
        debug_assert!(!items.is_empty());
        debug_assert!(items.windows(2).all(|w| w[0] < w[1]));
        Itemset(items)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for an itemset built through `new`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.0.iter()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.0.binary_search_by(|candidate| candidate.as_str().cmp(item)).is_ok()
    }

    pub fn is_subset(&self, other: &Itemset) -> bool {
        self.0.iter().all(|item| other.contains(item.as_str()))
    }

    pub fn is_disjoint(&self, other: &Itemset) -> bool {
        !self.0.iter().any(|item| other.contains(item.as_str()))
    }
}

impl fmt::Display for Itemset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", item)?;
        }
        f.write_str("}")
    }
}

impl<'a> IntoIterator for &'a Itemset {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A frequent itemset together with its exact support count
#[derive(Debug, Clone, PartialEq)]
pub struct FrequentItemset {
    pub itemset: Itemset,
    pub support_count: usize,
    pub support: f64,
}

/// Result of a mining run: every frequent itemset grouped by size.
///
/// Each level maps itemsets of one size to their support counts, so iteration
/// order is (size, lexicographic) and stable across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequentItemsets {
    total_transactions: usize,
    levels: Vec<BTreeMap<Itemset, usize>>,
}

impl FrequentItemsets {
    pub fn new(total_transactions: usize) -> Self {
        Self {
            total_transactions,
            levels: Vec::new(),
        }
    }

    /// Record a frequent itemset. Re-inserting the same set overwrites its count.
    pub fn insert(&mut self, itemset: Itemset, support_count: usize) {
        let k = itemset.len();
        while self.levels.len() < k {
            self.levels.push(BTreeMap::new());
        }
        self.levels[k - 1].insert(itemset, support_count);
    }

    pub fn total_transactions(&self) -> usize {
        self.total_transactions
    }

    /// Number of frequent itemsets across all sizes
    pub fn len(&self) -> usize {
        self.levels.iter().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the largest frequent itemset, 0 when there are none
    pub fn max_size(&self) -> usize {
        self.levels
            .iter()
            .rposition(|level| !level.is_empty())
            .map_or(0, |i| i + 1)
    }

    /// Frequent itemsets of exactly `k` items
    pub fn level(&self, k: usize) -> impl Iterator<Item = (&Itemset, usize)> + '_ {
        k.checked_sub(1)
            .and_then(|idx| self.levels.get(idx))
            .into_iter()
            .flat_map(|level| level.iter().map(|(itemset, &count)| (itemset, count)))
    }

    /// Count of frequent itemsets per size, starting at size 1
    pub fn level_sizes(&self) -> Vec<usize> {
        self.levels.iter().map(BTreeMap::len).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Itemset, usize)> + '_ {
        self.levels
            .iter()
            .flat_map(|level| level.iter().map(|(itemset, &count)| (itemset, count)))
    }

    pub fn support_count(&self, itemset: &Itemset) -> Option<usize> {
        self.levels
            .get(itemset.len().checked_sub(1)?)?
            .get(itemset)
            .copied()
    }

    pub fn support(&self, itemset: &Itemset) -> Option<f64> {
        self.support_count(itemset)
            .map(|count| self.ratio(count))
    }

    pub fn contains(&self, itemset: &Itemset) -> bool {
        self.support_count(itemset).is_some()
    }

    /// Owned view with supports attached
    pub fn to_vec(&self) -> Vec<FrequentItemset> {
        self.iter()
            .map(|(itemset, support_count)| FrequentItemset {
                itemset: itemset.clone(),
                support_count,
                support: self.ratio(support_count),
            })
            .collect()
    }

    pub(crate) fn ratio(&self, count: usize) -> f64 {
        if self.total_transactions == 0 {
            0.0
        } else {
            count as f64 / self.total_transactions as f64
        }
    }
}
