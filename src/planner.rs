//! Planner state and the action dispatcher.
//!
//! All user-facing changes go through [`Planner::dispatch`]. Each action
//! writes the affected slot before the new [`Snapshot`] is produced, so the
//! snapshot handed to the views always reflects committed state.
//!
//! # Example
//!
//! ```
//! use matura_plan::config::SlotNames;
//! use matura_plan::dataset::Dataset;
//! use matura_plan::planner::{Action, Planner};
//! use matura_plan::storage::{MemoryStore, Store};
//!
//! let data = Dataset::from_json_str(
//!     r#"{"tasks": [{"id": "t1", "subject": "biologia", "section": "S", "items": ["a", "b"]}]}"#,
//! ).unwrap();
//! let mut planner = Planner::open(data, Store::new(MemoryStore::new()), SlotNames::default()).unwrap();
//!
//! let snapshot = planner.dispatch(Action::toggle("t1", 0)).unwrap();
//! assert!(snapshot.progress.is_done("t1", 0));
//! ```

use tracing::{debug, info};

use crate::buckets::{is_known_bucket, BucketAssignment};
use crate::config::SlotNames;
use crate::dataset::{Dataset, Task};
use crate::error::{PlanError, Result};
use crate::filter::FilterCriteria;
use crate::progress::ProgressSet;
use crate::storage::{KeyValueStore, Store};
use crate::transfer::{export_payload, import_document, ExportPayload, ImportOutcome};

/// Immutable view of the planner state at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub filters: FilterCriteria,
    pub progress: ProgressSet,
    pub buckets: BucketAssignment,
}

/// A user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Flip one checklist item.
    ToggleItem { task_id: String, index: usize },
    /// Mark one checklist item done or not done.
    SetItem {
        task_id: String,
        index: usize,
        done: bool,
    },
    /// Move a task to another board column.
    Reassign { task_id: String, bucket: String },
    SetFilter(FilterCriteria),
    ClearFilters,
    /// Replace persisted state from an export document.
    Import(String),
    /// Delete all persisted state.
    Reset,
}

impl Action {
    pub fn toggle(task_id: impl Into<String>, index: usize) -> Self {
        Self::ToggleItem {
            task_id: task_id.into(),
            index,
        }
    }

    pub fn set_item(task_id: impl Into<String>, index: usize, done: bool) -> Self {
        Self::SetItem {
            task_id: task_id.into(),
            index,
            done,
        }
    }

    pub fn reassign(task_id: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self::Reassign {
            task_id: task_id.into(),
            bucket: bucket.into(),
        }
    }
}

/// Owns the dataset, the slot store, and the current snapshot.
#[derive(Debug)]
pub struct Planner<S> {
    dataset: Dataset,
    store: Store<S>,
    slots: SlotNames,
    snapshot: Snapshot,
    last_import: Option<ImportOutcome>,
}

impl<S: KeyValueStore> Planner<S> {
    /// Load persisted state and seed default bucket assignments.
    ///
    /// # Errors
    ///
    /// Returns an error only if seeding defaults fails to persist; unreadable
    /// slots fall back to empty state.
    pub fn open(dataset: Dataset, store: Store<S>, slots: SlotNames) -> Result<Self> {
        let mut planner = Self {
            dataset,
            store,
            slots,
            snapshot: Snapshot::default(),
            last_import: None,
        };
        planner.snapshot = planner.reload(FilterCriteria::all())?;
        Ok(planner)
    }

    /// Rebuild the snapshot from the store.
    fn reload(&mut self, filters: FilterCriteria) -> Result<Snapshot> {
        let progress = self.store.load(&self.slots.progress, ProgressSet::new());
        let mut buckets = self.store.load(&self.slots.buckets, BucketAssignment::new());
        if buckets.ensure_defaults(&self.dataset.tasks) {
            debug!("Seeded default buckets for {} tasks", buckets.len());
            self.store.save(&self.slots.buckets, &buckets)?;
        }
        Ok(Snapshot {
            filters,
            progress,
            buckets,
        })
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    #[must_use]
    pub fn slots(&self) -> &SlotNames {
        &self.slots
    }

    /// Outcome of the most recent successful import, if any.
    #[must_use]
    pub fn last_import(&self) -> Option<ImportOutcome> {
        self.last_import
    }

    /// Export what is currently persisted.
    #[must_use]
    pub fn export(&self) -> ExportPayload {
        export_payload(&self.store, &self.slots, chrono::Utc::now())
    }

    fn checked_item(&self, task_id: &str, index: usize) -> Result<&Task> {
        let task = self
            .dataset
            .task(task_id)
            .ok_or_else(|| PlanError::unknown_task(task_id))?;
        if index >= task.item_count() {
            return Err(PlanError::ItemOutOfRange {
                task: task_id.to_string(),
                index,
                len: task.item_count(),
            });
        }
        Ok(task)
    }

    /// Apply an action and return the resulting snapshot.
    ///
    /// On error the previous snapshot is kept.
    ///
    /// # Errors
    ///
    /// Returns input errors ([`PlanError::UnknownTask`],
    /// [`PlanError::ItemOutOfRange`], [`PlanError::UnknownBucket`]), import
    /// errors, or storage failures.
    pub fn dispatch(&mut self, action: Action) -> Result<&Snapshot> {
        let next = match action {
            Action::ToggleItem { task_id, index } => {
                self.checked_item(&task_id, index)?;
                let mut progress = self.snapshot.progress.clone();
                let done = progress.toggle(&task_id, index);
                self.store.save(&self.slots.progress, &progress)?;
                debug!("Toggled {}::{} -> {}", task_id, index, done);
                Snapshot {
                    progress,
                    ..self.snapshot.clone()
                }
            }

            Action::SetItem {
                task_id,
                index,
                done,
            } => {
                self.checked_item(&task_id, index)?;
                let mut progress = self.snapshot.progress.clone();
                if progress.set(&task_id, index, done) {
                    self.store.save(&self.slots.progress, &progress)?;
                }
                Snapshot {
                    progress,
                    ..self.snapshot.clone()
                }
            }

            Action::Reassign { task_id, bucket } => {
                if self.dataset.task(&task_id).is_none() {
                    return Err(PlanError::unknown_task(task_id));
                }
                if !is_known_bucket(&self.dataset, &bucket) {
                    return Err(PlanError::unknown_bucket(bucket));
                }
                let mut buckets = self.snapshot.buckets.clone();
                debug!("Moving {} to {}", task_id, bucket);
                buckets.reassign(task_id, bucket);
                self.store.save(&self.slots.buckets, &buckets)?;
                Snapshot {
                    buckets,
                    ..self.snapshot.clone()
                }
            }

            Action::SetFilter(filters) => Snapshot {
                filters,
                ..self.snapshot.clone()
            },

            Action::ClearFilters => Snapshot {
                filters: FilterCriteria::all(),
                ..self.snapshot.clone()
            },

            Action::Import(text) => {
                let outcome = import_document(&mut self.store, &self.slots, &text)?;
                self.last_import = Some(outcome);
                let filters = self.snapshot.filters.clone();
                self.reload(filters)?
            }

            Action::Reset => {
                self.store.clear(&self.slots.progress)?;
                self.store.clear(&self.slots.buckets)?;
                info!("Cleared progress and bucket assignments");
                let filters = self.snapshot.filters.clone();
                self.reload(filters)?
            }
        };

        self.snapshot = next;
        Ok(&self.snapshot)
    }
}
