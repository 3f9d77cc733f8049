//! Interned transaction storage with an item -> transaction inverted index

use crate::itemset::{Item, Itemset};
use std::collections::{BTreeSet, HashMap};

/// Dense item identifier. Ids follow lexicographic item order, so a sorted
/// id vector is the canonical form of an itemset.
pub type ItemId = usize;

/// A read-only collection of transactions prepared for mining.
///
/// Duplicate items within one transaction are collapsed. Empty transactions
/// are kept: they count towards the total but contain no itemset.
#[derive(Debug, Clone, Default)]
pub struct TransactionSet {
    vocabulary: Vec<Item>,
    transactions: Vec<Vec<ItemId>>,
    /// For each item id, the sorted indices of transactions containing it
    tid_lists: Vec<Vec<usize>>,
}

impl TransactionSet {
    /// Build a transaction set from rows of item names.
    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(|s| s.as_ref().to_owned()).collect())
            .collect();

        let names: BTreeSet<&str> = raw.iter().flatten().map(String::as_str).collect();
        let ids: HashMap<&str, ItemId> = names
            .iter()
            .enumerate()
            .map(|(id, name)| (*name, id))
            .collect();
        let vocabulary: Vec<Item> = names.iter().map(|name| Item::new(name)).collect();

        let mut tid_lists = vec![Vec::new(); vocabulary.len()];
        let mut transactions = Vec::with_capacity(raw.len());
        for (tid, row) in raw.iter().enumerate() {
            let mut items: Vec<ItemId> = row.iter().map(|name| ids[name.as_str()]).collect();
            items.sort_unstable();
            items.dedup();
            for &id in &items {
                tid_lists[id].push(tid);
            }
            transactions.push(items);
        }

        Self {
            vocabulary,
            transactions,
            tid_lists,
        }
    }

    /// Number of transactions, including empty ones
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Number of distinct items
    pub fn num_items(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn empty_transactions(&self) -> usize {
        self.transactions.iter().filter(|t| t.is_empty()).count()
    }

    /// The item with the given id, `None` when the id is out of range
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.vocabulary.get(id)
    }

    pub fn items(&self) -> &[Item] {
        &self.vocabulary
    }

    pub fn id_of(&self, name: &str) -> Option<ItemId> {
        self.vocabulary
            .binary_search_by(|candidate| candidate.as_str().cmp(name))
            .ok()
    }

    /// Items of the transaction at `index`, in lexicographic order.
    /// Returns `None` when `index` is out of range.
    pub fn transaction(&self, index: usize) -> Option<impl Iterator<Item = &Item> + '_> {
        let ids = self.transactions.get(index)?;
        Some(ids.iter().map(|&id| &self.vocabulary[id]))
    }

    pub(crate) fn tid_list(&self, id: ItemId) -> &[usize] {
        &self.tid_lists[id]
    }

    /// Map a canonical id vector back to an itemset.
    pub(crate) fn to_itemset(&self, ids: &[ItemId]) -> Itemset {
        Itemset::from_sorted(ids.iter().map(|&id| self.vocabulary[id].clone()).collect())
    }

    /// Count transactions containing every item of `itemset` by a full scan.
    pub fn count_containing(&self, itemset: &Itemset) -> usize {
        let ids: Option<Vec<ItemId>> = itemset
            .iter()
            .map(|item| self.id_of(item.as_str()))
            .collect();
        let Some(ids) = ids else {
            return 0;
        };
        self.transactions
            .iter()
            .filter(|t| ids.iter().all(|id| t.binary_search(id).is_ok()))
            .count()
    }
}

/// Intersection of two sorted index lists.
pub(crate) fn intersect(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TransactionSet {
        TransactionSet::from_rows(vec![vec!["B", "A", "B"], vec![], vec!["C", "A"]])
    }

    #[test]
    fn test_from_rows_interns_and_dedups() {
        let set = sample();
        assert_eq!(set.len(), 3);
        assert_eq!(set.num_items(), 3);
        assert_eq!(set.empty_transactions(), 1);

        let first: Vec<&str> = set.transaction(0).unwrap().map(Item::as_str).collect();
        assert_eq!(first, vec!["A", "B"]);
        assert_eq!(set.transaction(1).unwrap().count(), 0);
    }

    #[test]
    fn test_ids_follow_lexicographic_order() {
        let set = sample();
        assert_eq!(set.id_of("A"), Some(0));
        assert_eq!(set.id_of("B"), Some(1));
        assert_eq!(set.id_of("C"), Some(2));
        assert_eq!(set.id_of("D"), None);
        assert_eq!(set.item(2).map(Item::as_str), Some("C"));
    }

    #[test]
    fn test_out_of_range_lookups_return_none() {
        let set = sample();
        assert!(set.item(3).is_none());
        assert!(set.transaction(3).is_none());
        assert!(TransactionSet::default().transaction(0).is_none());
    }

    #[test]
    fn test_tid_lists() {
        let set = sample();
        assert_eq!(set.tid_list(0), &[0, 2]);
        assert_eq!(set.tid_list(1), &[0]);
        assert_eq!(set.tid_list(2), &[2]);
    }

    #[test]
    fn test_count_containing() {
        let set = sample();
        let a = Itemset::new(["A"]).unwrap();
        let ac = Itemset::new(["A", "C"]).unwrap();
        let ad = Itemset::new(["A", "D"]).unwrap();
        assert_eq!(set.count_containing(&a), 2);
        assert_eq!(set.count_containing(&ac), 1);
        assert_eq!(set.count_containing(&ad), 0);
    }

    #[test]
    fn test_intersect() {
        assert_eq!(intersect(&[0, 2, 4, 6], &[1, 2, 3, 6]), vec![2, 6]);
        assert!(intersect(&[], &[1]).is_empty());
    }
}
