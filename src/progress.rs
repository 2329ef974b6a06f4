//! Checklist progress: which task items are done.
//!
//! Progress is a sparse set of completed item keys. Only completed items are
//! stored; unchecking an item removes its key, so the stored document grows
//! with finished work rather than with the size of the plan.
//!
//! On disk the set is a JSON object mapping each key to `true`:
//!
//! ```json
//! {"bio-1::0": true, "bio-1::2": true}
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dataset::{Subject, Task};
use crate::filter::{matches, FilterCriteria};

/// Separator between task id and item index in a progress key.
pub const KEY_SEPARATOR: &str = "::";

/// Progress key for one checklist item.
///
/// # Example
///
/// ```
/// use matura_plan::progress::item_key;
///
/// assert_eq!(item_key("chem-4", 2), "chem-4::2");
/// ```
#[must_use]
pub fn item_key(task_id: &str, index: usize) -> String {
    format!("{task_id}{KEY_SEPARATOR}{index}")
}

/// Rounded completion percentage, 0 when there is nothing to do.
///
/// # Example
///
/// ```
/// use matura_plan::progress::percent_complete;
///
/// assert_eq!(percent_complete(0, 0), 0);
/// assert_eq!(percent_complete(1, 3), 33);
/// assert_eq!(percent_complete(2, 3), 67);
/// ```
#[must_use]
pub fn percent_complete(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((done as f64 / total as f64) * 100.0).round() as u32
}

// ============================================================================
// Progress set
// ============================================================================

/// Set of completed item keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSet {
    done: BTreeSet<String>,
}

impl ProgressSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an item is done.
    #[must_use]
    pub fn is_done(&self, task_id: &str, index: usize) -> bool {
        self.done.contains(&item_key(task_id, index))
    }

    /// Check membership of a raw key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.done.contains(key)
    }

    /// Flip an item and return its new state.
    pub fn toggle(&mut self, task_id: &str, index: usize) -> bool {
        let key = item_key(task_id, index);
        if self.done.remove(&key) {
            false
        } else {
            self.done.insert(key);
            true
        }
    }

    /// Mark an item done or not done. Returns whether anything changed.
    pub fn set(&mut self, task_id: &str, index: usize, done: bool) -> bool {
        let key = item_key(task_id, index);
        if done {
            self.done.insert(key)
        } else {
            self.done.remove(&key)
        }
    }

    /// Number of a task's items that are done.
    #[must_use]
    pub fn done_count(&self, task: &Task) -> usize {
        (0..task.item_count())
            .filter(|&i| self.is_done(&task.id, i))
            .count()
    }

    /// Completion summary for a single task.
    #[must_use]
    pub fn task_summary(&self, task: &Task) -> CompletionStats {
        CompletionStats {
            done: self.done_count(task),
            total: task.item_count(),
        }
    }

    /// Completed keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.done.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.done.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }
}

impl FromIterator<String> for ProgressSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            done: iter.into_iter().collect(),
        }
    }
}

impl Serialize for ProgressSet {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let map: BTreeMap<&str, bool> = self.done.iter().map(|k| (k.as_str(), true)).collect();
        map.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProgressSet {
    /// Entries whose value is anything other than `true` are dropped.
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map: BTreeMap<String, serde_json::Value> = BTreeMap::deserialize(deserializer)?;
        Ok(map
            .into_iter()
            .filter(|(_, v)| matches!(v, serde_json::Value::Bool(true)))
            .map(|(k, _)| k)
            .collect())
    }
}

// ============================================================================
// Aggregates
// ============================================================================

/// Done and total item counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompletionStats {
    pub done: usize,
    pub total: usize,
}

impl CompletionStats {
    /// Rounded completion percentage.
    #[must_use]
    pub fn percent(&self) -> u32 {
        percent_complete(self.done, self.total)
    }

    fn add(&mut self, other: CompletionStats) {
        self.done += other.done;
        self.total += other.total;
    }
}

/// Per-subject item counts over the tasks passing `criteria`.
///
/// Recomputed from scratch on every call.
#[must_use]
pub fn compute_stats(
    tasks: &[Task],
    criteria: &FilterCriteria,
    progress: &ProgressSet,
) -> BTreeMap<Subject, CompletionStats> {
    let mut stats: BTreeMap<Subject, CompletionStats> = BTreeMap::new();
    for task in tasks.iter().filter(|t| matches(t, criteria)) {
        stats
            .entry(task.subject.clone())
            .or_default()
            .add(progress.task_summary(task));
    }
    stats
}
