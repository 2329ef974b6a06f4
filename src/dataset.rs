//! Static study-plan dataset.
//!
//! The dataset is produced outside this crate (extracted from the exam
//! syllabus) and is read once at startup. Nothing here mutates it.
//!
//! # Example
//!
//! ```
//! use matura_plan::dataset::{Dataset, Subject};
//!
//! let data = Dataset::from_json_str(r#"{
//!     "tasks": [{"id": "t1", "subject": "biologia", "section": "Cell", "items": ["a", "b"]}],
//!     "monthBuckets": [],
//!     "weeks": []
//! }"#).unwrap();
//! assert_eq!(data.tasks[0].subject, Subject::Biologia);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::error::{PlanError, Result};

// ============================================================================
// Subject
// ============================================================================

/// Exam subject a task belongs to.
///
/// The four canonical subjects come first (and in dashboard order); anything
/// else the dataset names is kept verbatim in [`Subject::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Subject {
    Polski,
    Angielski,
    Biologia,
    Chemia,
    Other(String),
}

impl Subject {
    /// Subjects shown on the dashboard even when they have no tasks.
    pub const CANONICAL: [Subject; 4] = [
        Subject::Polski,
        Subject::Angielski,
        Subject::Biologia,
        Subject::Chemia,
    ];

    /// The key used in the dataset and in filters.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Polski => "polski",
            Self::Angielski => "angielski",
            Self::Biologia => "biologia",
            Self::Chemia => "chemia",
            Self::Other(key) => key,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Polski => "Polski",
            Self::Angielski => "Angielski",
            Self::Biologia => "Biologia",
            Self::Chemia => "Chemia",
            Self::Other(key) => key,
        }
    }
}

impl From<String> for Subject {
    fn from(key: String) -> Self {
        match key.as_str() {
            "polski" => Self::Polski,
            "angielski" => Self::Angielski,
            "biologia" => Self::Biologia,
            "chemia" => Self::Chemia,
            _ => Self::Other(key),
        }
    }
}

impl From<&str> for Subject {
    fn from(key: &str) -> Self {
        Self::from(key.to_string())
    }
}

impl From<Subject> for String {
    fn from(subject: Subject) -> Self {
        match subject {
            Subject::Other(key) => key,
            other => other.key().to_string(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ============================================================================
// Task
// ============================================================================

/// One block of study material with its checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique id. Never contains `::`.
    pub id: String,
    pub subject: Subject,
    /// Display title.
    pub section: String,
    /// Checklist sub-points, in order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<String>,
    /// Month of the school year (1-12) the block is planned for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    /// Bucket used until the user moves the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_bucket: Option<String>,
}

impl Task {
    /// Number of checklist items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Check if the task carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// `null` lists decode as empty.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// RFC 3339 first, then a naive ISO timestamp read as UTC. Anything else
/// (including non-string values) becomes `None`.
fn lenient_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::String(raw) => raw,
        other => {
            warn!("Ignoring non-string generatedAt: {}", other);
            return Ok(None);
        }
    };

    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(at.with_timezone(&Utc)));
    }
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Ok(Some(naive.and_utc()));
    }
    warn!("Ignoring unparseable generatedAt '{}'", raw);
    Ok(None)
}

// ============================================================================
// Buckets
// ============================================================================

/// A board column declared by the dataset (a month or a dated week).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketDef {
    pub key: String,
    pub label: String,
}

/// Chemistry extras shown on their own screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chemistry {
    #[serde(default)]
    pub turbo_topics: Vec<String>,
}

// ============================================================================
// Dataset
// ============================================================================

/// The whole read-only dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Display only. Unparseable values are dropped with a warning.
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub month_buckets: Vec<BucketDef>,
    #[serde(default)]
    pub weeks: Vec<BucketDef>,
    #[serde(default)]
    pub chemistry: Chemistry,
}

impl Dataset {
    /// Read and validate the dataset file.
    ///
    /// # Errors
    ///
    /// Any failure here is fatal: [`PlanError::MissingDataset`] when the file
    /// does not exist, [`PlanError::Dataset`] when it cannot be read or
    /// decoded, [`PlanError::DuplicateTask`] when two tasks share an id.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PlanError::MissingDataset {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(PlanError::dataset_with_path(
                    format!("failed to read {}: {e}", path.display()),
                    path.to_path_buf(),
                ));
            }
        };

        let dataset = Self::from_json_str(&content).map_err(|e| match e {
            PlanError::Dataset { message, .. } => {
                PlanError::dataset_with_path(message, path.to_path_buf())
            }
            other => other,
        })?;

        debug!(
            "Loaded dataset from {}: {} tasks, {} month buckets, {} weeks",
            path.display(),
            dataset.tasks.len(),
            dataset.month_buckets.len(),
            dataset.weeks.len()
        );
        Ok(dataset)
    }

    /// Decode and validate a dataset document.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Dataset`] for malformed JSON and
    /// [`PlanError::DuplicateTask`] for repeated task ids.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let dataset: Self = serde_json::from_str(content)
            .map_err(|e| PlanError::dataset(format!("invalid dataset JSON: {e}")))?;
        dataset.validate()?;
        Ok(dataset)
    }

    fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for task in &self.tasks {
            if !ids.insert(task.id.as_str()) {
                return Err(PlanError::DuplicateTask {
                    id: task.id.clone(),
                });
            }
        }

        let mut keys = HashSet::new();
        for def in self.bucket_defs() {
            if !keys.insert(def.key.as_str()) {
                warn!(
                    "Bucket key '{}' is defined more than once; keeping the first definition",
                    def.key
                );
            }
        }
        Ok(())
    }

    /// Look up a task by id.
    #[must_use]
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Declared buckets: month buckets first, then weeks.
    pub fn bucket_defs(&self) -> impl Iterator<Item = &BucketDef> {
        self.month_buckets.iter().chain(self.weeks.iter())
    }

    /// First declared definition for a bucket key.
    #[must_use]
    pub fn bucket_def(&self, key: &str) -> Option<&BucketDef> {
        self.bucket_defs().find(|d| d.key == key)
    }

    /// Every tag used by any task, sorted and deduplicated.
    #[must_use]
    pub fn all_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self
            .tasks
            .iter()
            .flat_map(|t| t.tags.iter().map(String::as_str))
            .collect();
        tags.sort_unstable();
        tags.dedup();
        tags
    }
}
