//! Task-to-bucket assignments and board column construction.
//!
//! Every task sits in exactly one bucket: its explicit assignment, else its
//! dataset default, else [`UNASSIGNED`]. Assignments are seeded on first use
//! and afterwards change only when the user moves a task.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Task};
use crate::filter::{matches, FilterCriteria};

/// Key of the always-present first column.
pub const UNASSIGNED: &str = "unassigned";

/// Label shown for [`UNASSIGNED`] and keys ending in `:unassigned`.
pub const UNASSIGNED_LABEL: &str = "Nieprzypisane";

/// Mapping from task id to bucket key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketAssignment {
    map: BTreeMap<String, String>,
}

impl BucketAssignment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit assignment for a task, if any.
    #[must_use]
    pub fn get(&self, task_id: &str) -> Option<&str> {
        self.map
            .get(task_id)
            .map(String::as_str)
            .filter(|k| !k.is_empty())
    }

    /// Current bucket of a task.
    #[must_use]
    pub fn bucket_of<'a>(&'a self, task: &'a Task) -> &'a str {
        self.get(&task.id)
            .or_else(|| task.default_bucket.as_deref().filter(|k| !k.is_empty()))
            .unwrap_or(UNASSIGNED)
    }

    /// Seed an entry for every task that has none.
    ///
    /// Returns `true` if anything was inserted, so the caller can persist
    /// once for the whole batch.
    pub fn ensure_defaults(&mut self, tasks: &[Task]) -> bool {
        let mut changed = false;
        for task in tasks {
            if self.get(&task.id).is_none() {
                let bucket = task
                    .default_bucket
                    .as_deref()
                    .filter(|k| !k.is_empty())
                    .unwrap_or(UNASSIGNED);
                self.map.insert(task.id.clone(), bucket.to_string());
                changed = true;
            }
        }
        changed
    }

    /// Move a task to another bucket.
    pub fn reassign(&mut self, task_id: impl Into<String>, bucket: impl Into<String>) {
        self.map.insert(task_id.into(), bucket.into());
    }

    /// All entries sorted by task id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl FromIterator<(String, String)> for BucketAssignment {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Labels and columns
// ============================================================================

/// Display label for a bucket key.
///
/// Declared buckets use their dataset label (month buckets take precedence
/// over weeks on a key clash); unassigned keys get [`UNASSIGNED_LABEL`];
/// anything else shows its raw key.
#[must_use]
pub fn bucket_label<'a>(dataset: &'a Dataset, key: &'a str) -> &'a str {
    if let Some(def) = dataset.bucket_def(key) {
        return &def.label;
    }
    if key == UNASSIGNED || key.ends_with(":unassigned") {
        return UNASSIGNED_LABEL;
    }
    key
}

/// Predefined column keys: unassigned, month buckets, weeks. Duplicates
/// are listed once, at their first position.
#[must_use]
pub fn column_keys(dataset: &Dataset) -> Vec<&str> {
    let mut keys = vec![UNASSIGNED];
    for def in dataset.bucket_defs() {
        if !keys.contains(&def.key.as_str()) {
            keys.push(&def.key);
        }
    }
    keys
}

/// Check if a key names one of the predefined columns.
#[must_use]
pub fn is_known_bucket(dataset: &Dataset, key: &str) -> bool {
    key == UNASSIGNED || dataset.bucket_def(key).is_some()
}

/// One board column with the filtered tasks it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Column<'a> {
    pub key: &'a str,
    pub label: &'a str,
    pub tasks: Vec<&'a Task>,
    /// `false` for columns created for bucket keys the dataset does not declare.
    pub predefined: bool,
}

/// Group the tasks passing `criteria` into board columns.
///
/// Tasks assigned to an undeclared bucket get an extra column appended after
/// the predefined ones, in first-seen order, so no task is ever dropped.
#[must_use]
pub fn build_board<'a>(
    dataset: &'a Dataset,
    criteria: &FilterCriteria,
    assignment: &'a BucketAssignment,
) -> Vec<Column<'a>> {
    let mut columns: Vec<Column<'a>> = column_keys(dataset)
        .into_iter()
        .map(|key| Column {
            key,
            label: bucket_label(dataset, key),
            tasks: Vec::new(),
            predefined: true,
        })
        .collect();
    let mut index: HashMap<&str, usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| (c.key, i))
        .collect();

    for task in dataset.tasks.iter().filter(|t| matches(t, criteria)) {
        let key = assignment.bucket_of(task);
        let slot = *index.entry(key).or_insert_with(|| {
            columns.push(Column {
                key,
                label: bucket_label(dataset, key),
                tasks: Vec::new(),
                predefined: false,
            });
            columns.len() - 1
        });
        columns[slot].tasks.push(task);
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Subject;

    fn dataset() -> Dataset {
        Dataset::from_json_str(
            r#"{
            "tasks": [
                {"id": "a", "subject": "polski", "section": "A", "items": ["1"], "defaultBucket": "m10"},
                {"id": "b", "subject": "chemia", "section": "B", "items": ["1", "2"]},
                {"id": "c", "subject": "chemia", "section": "C", "defaultBucket": ""},
                {"id": "d", "subject": "biologia", "section": "D", "defaultBucket": "w2"}
            ],
            "monthBuckets": [{"key": "m10", "label": "Październik"}],
            "weeks": [{"key": "w1", "label": "Tydzień 1"}, {"key": "w2", "label": "Tydzień 2"}]
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ensure_defaults_seeds_once() {
        let data = dataset();
        let mut assignment = BucketAssignment::new();
        assert!(assignment.ensure_defaults(&data.tasks));
        assert_eq!(assignment.get("a"), Some("m10"));
        assert_eq!(assignment.get("b"), Some(UNASSIGNED));
        assert_eq!(assignment.get("c"), Some(UNASSIGNED));
        assert_eq!(assignment.len(), 4);

        assert!(!assignment.ensure_defaults(&data.tasks));
    }

    #[test]
    fn test_ensure_defaults_keeps_existing_entries() {
        let data = dataset();
        let mut assignment: BucketAssignment = [("a".to_string(), "w1".to_string())]
            .into_iter()
            .collect();
        assignment.ensure_defaults(&data.tasks);
        assert_eq!(assignment.get("a"), Some("w1"));
    }

    #[test]
    fn test_empty_entry_counts_as_missing() {
        let data = dataset();
        let mut assignment: BucketAssignment = [("a".to_string(), String::new())]
            .into_iter()
            .collect();
        assert_eq!(assignment.bucket_of(&data.tasks[0]), "m10");
        assert!(assignment.ensure_defaults(&data.tasks));
        assert_eq!(assignment.get("a"), Some("m10"));
    }

    #[test]
    fn test_bucket_labels() {
        let data = dataset();
        assert_eq!(bucket_label(&data, "m10"), "Październik");
        assert_eq!(bucket_label(&data, "w2"), "Tydzień 2");
        assert_eq!(bucket_label(&data, UNASSIGNED), UNASSIGNED_LABEL);
        assert_eq!(bucket_label(&data, "chemia:unassigned"), UNASSIGNED_LABEL);
        assert_eq!(bucket_label(&data, "mystery"), "mystery");
    }

    #[test]
    fn test_board_column_order_and_grouping() {
        let data = dataset();
        let mut assignment = BucketAssignment::new();
        assignment.ensure_defaults(&data.tasks);

        let board = build_board(&data, &FilterCriteria::all(), &assignment);
        let keys: Vec<_> = board.iter().map(|c| c.key).collect();
        assert_eq!(keys, vec![UNASSIGNED, "m10", "w1", "w2"]);

        let ids = |i: usize| board[i].tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids(0), vec!["b", "c"]);
        assert_eq!(ids(1), vec!["a"]);
        assert!(ids(2).is_empty());
        assert_eq!(ids(3), vec!["d"]);
    }

    #[test]
    fn test_reassign_moves_task_between_columns() {
        let data = dataset();
        let mut assignment = BucketAssignment::new();
        assignment.ensure_defaults(&data.tasks);
        assignment.reassign("b", "w1");

        let board = build_board(&data, &FilterCriteria::all(), &assignment);
        assert_eq!(board[0].tasks.len(), 1);
        assert_eq!(board[2].tasks.len(), 1);
        assert_eq!(board[2].tasks[0].id, "b");
    }

    #[test]
    fn test_unknown_bucket_gets_extra_column() {
        let data = dataset();
        let mut assignment = BucketAssignment::new();
        assignment.ensure_defaults(&data.tasks);
        assignment.reassign("a", "w99");

        let board = build_board(&data, &FilterCriteria::all(), &assignment);
        let extra = board.last().unwrap();
        assert_eq!(extra.key, "w99");
        assert_eq!(extra.label, "w99");
        assert!(!extra.predefined);
        assert_eq!(extra.tasks[0].id, "a");
        assert_eq!(board.iter().map(|c| c.tasks.len()).sum::<usize>(), 4);
    }

    #[test]
    fn test_board_respects_filter() {
        let data = dataset();
        let assignment = BucketAssignment::new();
        let board = build_board(
            &data,
            &FilterCriteria::all().with_subject(Subject::Chemia),
            &assignment,
        );
        assert_eq!(board.iter().map(|c| c.tasks.len()).sum::<usize>(), 2);
        assert_eq!(board.len(), 4);
    }

    #[test]
    fn test_duplicate_keys_listed_once() {
        let data = Dataset::from_json_str(
            r#"{"tasks": [], "monthBuckets": [{"key": "k", "label": "M"}], "weeks": [{"key": "k", "label": "W"}]}"#,
        )
        .unwrap();
        assert_eq!(column_keys(&data), vec![UNASSIGNED, "k"]);
        assert!(is_known_bucket(&data, "k"));
        assert!(!is_known_bucket(&data, "zz"));
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let assignment: BucketAssignment = [("t1".to_string(), "w1".to_string())]
            .into_iter()
            .collect();
        assert_eq!(serde_json::to_string(&assignment).unwrap(), r#"{"t1":"w1"}"#);
    }
}
