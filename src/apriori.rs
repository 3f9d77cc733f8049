//! Level-wise frequent itemset mining (Apriori)
//!
//! Level k+1 candidates are built by joining two frequent k-itemsets that
//! share their first k-1 items, then pruned if any k-subset is infrequent.
//! Support is counted by intersecting the transaction-id lists of the two
//! joined parents, so the transactions are scanned only once, up front.

use crate::config::{validate_max_length, validate_support, MiningConfig};
use crate::error::MiningResult;
use crate::itemset::{meets_threshold, FrequentItemsets};
use crate::transactions::{intersect, ItemId, TransactionSet};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use tracing::{debug, info, warn};

/// Anything that turns a transaction set into its frequent itemsets.
pub trait ItemsetMiner {
    fn mine(&self, transactions: &TransactionSet) -> MiningResult<FrequentItemsets>;
}

/// Reported once at the end of every mining level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    /// Itemset size searched at this level
    pub level: usize,
    /// Candidates whose support was counted
    pub candidates: usize,
    /// Candidates that met the support threshold
    pub frequent: usize,
}

type ProgressFn = Box<dyn Fn(&LevelProgress) + Send + Sync>;

/// Apriori miner with a fixed support threshold
pub struct Apriori {
    min_support: f64,
    max_length: Option<usize>,
    progress: Option<ProgressFn>,
}

impl fmt::Debug for Apriori {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Apriori")
            .field("min_support", &self.min_support)
            .field("max_length", &self.max_length)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Apriori {
    pub fn new(min_support: f64) -> Self {
        Self {
            min_support,
            max_length: None,
            progress: None,
        }
    }

    pub fn from_config(config: &MiningConfig) -> Self {
        Self {
            min_support: config.min_support,
            max_length: config.max_length,
            progress: None,
        }
    }

    /// Stop after itemsets of `max_length` items.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Register a callback invoked at the end of each level.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&LevelProgress) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn min_support(&self) -> f64 {
        self.min_support
    }

    fn report(&self, progress: LevelProgress) {
        debug!(
            level = progress.level,
            candidates = progress.candidates,
            frequent = progress.frequent,
            "Mining level complete"
        );
        if let Some(callback) = &self.progress {
            callback(&progress);
        }
    }

    fn reached_max_length(&self, k: usize) -> bool {
        self.max_length.is_some_and(|max| k >= max)
    }
}

impl ItemsetMiner for Apriori {
    fn mine(&self, transactions: &TransactionSet) -> MiningResult<FrequentItemsets> {
        validate_support(self.min_support)?;
        validate_max_length(self.max_length)?;

        let total = transactions.len();
        let mut result = FrequentItemsets::new(total);
        if total == 0 {
            warn!("No transactions supplied, nothing to mine");
            return Ok(result);
        }

        let is_frequent =
            |count: usize| meets_threshold(count as f64 / total as f64, self.min_support);

        let mut level: Vec<Candidate> = (0..transactions.num_items())
            .filter_map(|id| {
                let tids = transactions.tid_list(id);
                is_frequent(tids.len()).then(|| Candidate {
                    items: vec![id],
                    tids: tids.to_vec(),
                })
            })
            .collect();
        self.report(LevelProgress {
            level: 1,
            candidates: transactions.num_items(),
            frequent: level.len(),
        });

        let mut k = 1;
        loop {
            for candidate in &level {
                result.insert(
                    transactions.to_itemset(&candidate.items),
                    candidate.tids.len(),
                );
            }
            if level.is_empty() || self.reached_max_length(k) {
                break;
            }

            let (next, counted) = next_level(&level, &is_frequent);
            k += 1;
            self.report(LevelProgress {
                level: k,
                candidates: counted,
                frequent: next.len(),
            });
            level = next;
        }

        info!(
            transactions = total,
            frequent_itemsets = result.len(),
            max_size = result.max_size(),
            "Frequent itemset mining complete"
        );
        Ok(result)
    }
}

/// A frequent itemset under construction: canonical ids plus the
/// transactions that contain it.
#[derive(Debug)]
struct Candidate {
    items: Vec<ItemId>,
    tids: Vec<usize>,
}

/// Build level k+1 from the frequent k-itemsets in `level`, which must be in
/// lexicographic order. Returns the survivors and how many candidates were
/// counted after pruning.
fn next_level<F>(level: &[Candidate], is_frequent: &F) -> (Vec<Candidate>, usize)
where
    F: Fn(usize) -> bool,
{
    let Some(first) = level.first() else {
        return (Vec::new(), 0);
    };
    let k = first.items.len();
    let known: HashSet<&[ItemId]> = level.iter().map(|c| c.items.as_slice()).collect();

    let mut next = Vec::new();
    let mut counted = 0;
    let mut scratch = Vec::with_capacity(k);
    for (i, left) in level.iter().enumerate() {
        let prefix = &left.items[..k - 1];
        // Itemsets sharing a prefix are contiguous in lexicographic order
        for right in &level[i + 1..] {
            if &right.items[..k - 1] != prefix {
                break;
            }
            let mut items = Vec::with_capacity(k + 1);
            items.extend_from_slice(&left.items);
            items.push(right.items[k - 1]);

            if !subsets_known(&items, &known, &mut scratch) {
                continue;
            }
            counted += 1;

            let tids = intersect(&left.tids, &right.tids);
            if is_frequent(tids.len()) {
                next.push(Candidate { items, tids });
            }
        }
    }
    (next, counted)
}

/// Anti-monotone pruning: every k-subset of a (k+1)-candidate must be
/// known. The two subsets that drop one of the last two items are the joined
/// parents and are skipped.
pub(crate) fn subsets_known<T>(items: &[T], known: &HashSet<&[T]>, scratch: &mut Vec<T>) -> bool
where
    T: Clone + Eq + Hash,
{
    (0..items.len().saturating_sub(2)).all(|skip| {
        scratch.clear();
        scratch.extend(
            items
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != skip)
                .map(|(_, item)| item.clone()),
        );
        known.contains(scratch.as_slice())
    })
}

/// Mine frequent itemsets from raw rows of item names.
///
/// Duplicate items within a row are counted once. Fails if `min_support` is
/// outside (0, 1].
pub fn mine<R, S>(transactions: &[R], min_support: f64) -> MiningResult<FrequentItemsets>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    validate_support(min_support)?;
    let set = TransactionSet::from_rows(transactions.iter().map(|row| row.as_ref().iter()));
    Apriori::new(min_support).mine(&set)
}
