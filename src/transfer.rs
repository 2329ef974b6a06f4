//! Export and import of the persisted planner state.
//!
//! An export is a versioned snapshot of both slots. Importing replaces each
//! slot the document carries and leaves the others alone; nothing is merged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::buckets::BucketAssignment;
use crate::config::SlotNames;
use crate::error::{PlanError, Result};
use crate::progress::ProgressSet;
use crate::storage::{KeyValueStore, Store};

/// Current export document version.
pub const EXPORT_VERSION: u32 = 1;

/// Transferable snapshot of the persisted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub progress: ProgressSet,
    pub buckets: BucketAssignment,
}

impl ExportPayload {
    /// Pretty-printed JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Build an export from what is currently stored (not from any cached state).
pub fn export_payload<S: KeyValueStore>(
    store: &Store<S>,
    slots: &SlotNames,
    now: DateTime<Utc>,
) -> ExportPayload {
    ExportPayload {
        version: EXPORT_VERSION,
        exported_at: now,
        progress: store.load(&slots.progress, ProgressSet::new()),
        buckets: store.load(&slots.buckets, BucketAssignment::new()),
    }
}

/// Which slots an import replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub progress_replaced: bool,
    pub buckets_replaced: bool,
}

impl ImportOutcome {
    /// Check if the import changed anything.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.progress_replaced || self.buckets_replaced
    }
}

/// Import document fields, each optional.
#[derive(Debug, Default)]
struct ImportDocument {
    progress: Option<ProgressSet>,
    buckets: Option<BucketAssignment>,
}

fn parse_document(text: &str) -> Result<ImportDocument> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| PlanError::ImportParse {
            message: e.to_string(),
        })?;

    let serde_json::Value::Object(mut fields) = value else {
        return Err(PlanError::import_payload("expected a JSON object"));
    };

    let progress = match fields.remove("progress") {
        None | Some(serde_json::Value::Null) => None,
        Some(raw) => Some(
            serde_json::from_value::<ProgressSet>(raw)
                .map_err(|e| PlanError::import_payload(format!("progress: {e}")))?,
        ),
    };

    let buckets = match fields.remove("buckets") {
        None | Some(serde_json::Value::Null) => None,
        Some(raw) => Some(
            serde_json::from_value::<BucketAssignment>(raw)
                .map_err(|e| PlanError::import_payload(format!("buckets: {e}")))?,
        ),
    };

    Ok(ImportDocument { progress, buckets })
}

/// Parse an import document and overwrite the slots it carries.
///
/// The whole document is validated before anything is written, so a failed
/// import leaves both slots untouched.
///
/// # Errors
///
/// Returns [`PlanError::ImportParse`] when `text` is not JSON and
/// [`PlanError::ImportPayload`] when it is not an object or a present field
/// has the wrong shape. Storage failures are propagated.
pub fn import_document<S: KeyValueStore>(
    store: &mut Store<S>,
    slots: &SlotNames,
    text: &str,
) -> Result<ImportOutcome> {
    let document = parse_document(text)?;
    let mut outcome = ImportOutcome::default();

    if let Some(progress) = &document.progress {
        store.save(&slots.progress, progress)?;
        outcome.progress_replaced = true;
    }
    if let Some(buckets) = &document.buckets {
        store.save(&slots.buckets, buckets)?;
        outcome.buckets_replaced = true;
    }

    info!(
        "Imported state (progress replaced: {}, buckets replaced: {})",
        outcome.progress_replaced, outcome.buckets_replaced
    );
    Ok(outcome)
}
