//! matura-plan - study-planning checklist
//!
//! A static dataset of exam-preparation tasks is projected into a filterable
//! list, a board bucketed by month and week, and a per-subject progress
//! dashboard. Checked items and board assignments persist in local JSON
//! slots and can be exported and imported.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`dataset`] - Read-only tasks, subjects and bucket definitions
//! - [`storage`] - Key-value slots with default-on-error loading
//! - [`filter`] - Filter criteria and the task predicate
//! - [`buckets`] - Task-to-bucket assignment and board columns
//! - [`progress`] - Completed-item set and completion statistics
//! - [`transfer`] - Export and import documents
//! - [`planner`] - Snapshot state and the action dispatcher
//! - [`view`] - Pure list, board and dashboard projections
//! - [`render`] - Terminal rendering of the projections
//! - [`config`] - Settings loading and validation
//! - [`error`] - Custom error types and handling
//!
//! # Example
//!
//! ```rust,ignore
//! use matura_plan::{Action, Dataset, FileStore, Planner, PlanConfig, Store};
//!
//! let config = PlanConfig::load(project)?;
//! let dataset = Dataset::load(&config.dataset_path(project)).await?;
//! let store = Store::new(FileStore::new(config.state_dir_path(project)));
//! let mut planner = Planner::open(dataset, store, config.slots.clone())?;
//!
//! planner.dispatch(Action::toggle("bio-1", 0))?;
//! let cards = matura_plan::view::list_view(planner.dataset(), planner.snapshot());
//! ```

pub mod buckets;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod planner;
pub mod progress;
pub mod render;
pub mod storage;
pub mod transfer;
pub mod view;

// Re-export commonly used types
pub use error::{IntoPlanError, PlanError, Result};

pub use buckets::{BucketAssignment, UNASSIGNED};
pub use config::{PlanConfig, SlotNames, ViewOptions};
pub use dataset::{BucketDef, Dataset, Subject, Task};
pub use filter::{matches, FilterCriteria};
pub use planner::{Action, Planner, Snapshot};
pub use progress::{item_key, percent_complete, CompletionStats, ProgressSet};
pub use storage::{FileStore, KeyValueStore, MemoryStore, Store};
pub use transfer::{ExportPayload, ImportOutcome};
