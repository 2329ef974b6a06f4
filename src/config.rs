//! Configuration management for matura-plan.
//!
//! Settings are read from JSON. The project-level file
//! (`<project>/.matura-plan/settings.json`) wins over the user-level file
//! (`{config_dir}/matura-plan/settings.json`); without either, defaults apply.
//!
//! # Example settings.json
//!
//! ```json
//! {
//!   "dataset": "plan/data.json",
//!   "slots": { "progress": "my-progress" },
//!   "view": { "boardPreviewItems": 3 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{PlanError, Result};

/// Directory (relative to the project) holding settings and state by default.
pub const STATE_DIR: &str = ".matura-plan";

/// Settings file name.
pub const SETTINGS_FILE: &str = "settings.json";

/// Names of the two persisted slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotNames {
    #[serde(default = "default_progress_slot")]
    pub progress: String,

    #[serde(default = "default_buckets_slot")]
    pub buckets: String,
}

fn default_progress_slot() -> String {
    "matura-plan-v2-progress".to_string()
}

fn default_buckets_slot() -> String {
    "matura-plan-v2-buckets".to_string()
}

impl Default for SlotNames {
    fn default() -> Self {
        Self {
            progress: default_progress_slot(),
            buckets: default_buckets_slot(),
        }
    }
}

/// Limits applied by the view projections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewOptions {
    /// Checklist items shown per task on the board (default: 5).
    #[serde(default = "default_board_preview_items")]
    pub board_preview_items: usize,

    /// Task cards listed under the dashboard (default: 20).
    #[serde(default = "default_dashboard_drilldown")]
    pub dashboard_drilldown: usize,

    /// Chemistry topics shown (default: 60).
    #[serde(default = "default_turbo_topics_limit")]
    pub turbo_topics_limit: usize,
}

fn default_board_preview_items() -> usize {
    5
}

fn default_dashboard_drilldown() -> usize {
    20
}

fn default_turbo_topics_limit() -> usize {
    60
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            board_preview_items: default_board_preview_items(),
            dashboard_drilldown: default_dashboard_drilldown(),
            turbo_topics_limit: default_turbo_topics_limit(),
        }
    }
}

/// Planner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanConfig {
    /// Dataset path, relative to the project directory.
    #[serde(default = "default_dataset")]
    pub dataset: PathBuf,

    /// Directory for slot files, relative to the project directory.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    #[serde(default)]
    pub slots: SlotNames,

    #[serde(default)]
    pub view: ViewOptions,

    /// Default file name for `export`.
    #[serde(default = "default_export_file")]
    pub export_file: PathBuf,
}

fn default_dataset() -> PathBuf {
    PathBuf::from("data.json")
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(STATE_DIR)
}

fn default_export_file() -> PathBuf {
    PathBuf::from("matura-plan-export.json")
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            state_dir: default_state_dir(),
            slots: SlotNames::default(),
            view: ViewOptions::default(),
            export_file: default_export_file(),
        }
    }
}

impl PlanConfig {
    /// Load configuration for a project directory.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Config`] if a settings file exists but cannot be
    /// read or parsed, or if the result fails validation.
    pub fn load(project_dir: &Path) -> Result<Self> {
        Self::load_from(
            &Self::settings_path(project_dir),
            Self::user_settings_path().as_deref(),
        )
    }

    /// Load from an explicit project file with an optional user-level fallback.
    ///
    /// # Errors
    ///
    /// Same as [`PlanConfig::load`].
    pub fn load_from(project_file: &Path, user_file: Option<&Path>) -> Result<Self> {
        let source = if project_file.exists() {
            Some(project_file)
        } else {
            user_file.filter(|p| p.exists())
        };

        let config = match source {
            Some(path) => {
                debug!("Loading settings from {}", path.display());
                let content = std::fs::read_to_string(path).map_err(|e| {
                    PlanError::config_with_path(format!("failed to read: {e}"), path.to_path_buf())
                })?;
                serde_json::from_str::<PlanConfig>(&content).map_err(|e| {
                    PlanError::config_with_path(format!("failed to parse: {e}"), path.to_path_buf())
                })?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check invariants the rest of the crate relies on.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.slots.progress.trim().is_empty() || self.slots.buckets.trim().is_empty() {
            return Err(PlanError::config("slot names must not be empty"));
        }
        if self.slots.progress == self.slots.buckets {
            return Err(PlanError::config(
                "progress and buckets slots must have different names",
            ));
        }
        if self.view.turbo_topics_limit == 0 {
            return Err(PlanError::config("view.turboTopicsLimit must be at least 1"));
        }
        Ok(())
    }

    /// Get the project-level settings path
    pub fn settings_path(project_dir: &Path) -> PathBuf {
        project_dir.join(STATE_DIR).join(SETTINGS_FILE)
    }

    /// Get the user-level settings path, if the platform has a config directory
    pub fn user_settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("matura-plan").join(SETTINGS_FILE))
    }

    /// Dataset path resolved against the project directory
    pub fn dataset_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.dataset)
    }

    /// State directory resolved against the project directory
    pub fn state_dir_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.state_dir)
    }
}
