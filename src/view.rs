//! View models projected from a dataset and a snapshot.
//!
//! Every function here is pure: same inputs, same output, no I/O. The
//! terminal renderer and `--json` output both consume these models.

use serde::Serialize;

use crate::buckets::build_board;
use crate::config::ViewOptions;
use crate::dataset::{Dataset, Subject, Task};
use crate::filter::filter_tasks;
use crate::planner::Snapshot;
use crate::progress::{compute_stats, CompletionStats, ProgressSet};

// ============================================================================
// List
// ============================================================================

/// One checklist line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    pub index: usize,
    pub text: String,
    pub done: bool,
}

/// A task with its full checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskCard {
    pub id: String,
    pub subject: String,
    /// `Subject · section`
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    pub tags: Vec<String>,
    pub items: Vec<ItemView>,
    pub done: usize,
    pub total: usize,
    pub percent: u32,
}

fn task_card(task: &Task, progress: &ProgressSet) -> TaskCard {
    let summary = progress.task_summary(task);
    TaskCard {
        id: task.id.clone(),
        subject: task.subject.key().to_string(),
        title: format!("{} · {}", task.subject.label(), task.section),
        month: task.month,
        tags: task.tags.clone(),
        items: task
            .items
            .iter()
            .enumerate()
            .map(|(index, text)| ItemView {
                index,
                text: text.clone(),
                done: progress.is_done(&task.id, index),
            })
            .collect(),
        done: summary.done,
        total: summary.total,
        percent: summary.percent(),
    }
}

/// Cards for every task passing the snapshot's filters.
#[must_use]
pub fn list_view(dataset: &Dataset, snapshot: &Snapshot) -> Vec<TaskCard> {
    filter_tasks(&dataset.tasks, &snapshot.filters)
        .map(|t| task_card(t, &snapshot.progress))
        .collect()
}

// ============================================================================
// Board
// ============================================================================

/// A task as shown inside a board column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardTask {
    pub id: String,
    pub section: String,
    pub subject: String,
    pub tags: Vec<String>,
    /// First items of the checklist.
    pub items: Vec<ItemView>,
    /// Items not shown in `items`.
    pub hidden_items: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardColumn {
    pub key: String,
    pub label: String,
    pub count: usize,
    pub predefined: bool,
    pub tasks: Vec<BoardTask>,
}

/// Board columns with the filtered tasks grouped by bucket.
#[must_use]
pub fn board_view(dataset: &Dataset, snapshot: &Snapshot, options: &ViewOptions) -> Vec<BoardColumn> {
    build_board(dataset, &snapshot.filters, &snapshot.buckets)
        .into_iter()
        .map(|column| BoardColumn {
            key: column.key.to_string(),
            label: column.label.to_string(),
            count: column.tasks.len(),
            predefined: column.predefined,
            tasks: column
                .tasks
                .iter()
                .map(|task| {
                    let shown = task.items.len().min(options.board_preview_items);
                    BoardTask {
                        id: task.id.clone(),
                        section: task.section.clone(),
                        subject: task.subject.label().to_string(),
                        tags: task.tags.clone(),
                        items: task.items[..shown]
                            .iter()
                            .enumerate()
                            .map(|(index, text)| ItemView {
                                index,
                                text: text.clone(),
                                done: snapshot.progress.is_done(&task.id, index),
                            })
                            .collect(),
                        hidden_items: task.items.len() - shown,
                    }
                })
                .collect(),
        })
        .collect()
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectSummary {
    pub subject: String,
    pub label: String,
    pub done: usize,
    pub total: usize,
    pub percent: u32,
}

impl SubjectSummary {
    fn new(subject: &Subject, stats: CompletionStats) -> Self {
        Self {
            subject: subject.key().to_string(),
            label: subject.label().to_string(),
            done: stats.done,
            total: stats.total,
            percent: stats.percent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// Canonical subjects first (always present), then any others found.
    pub subjects: Vec<SubjectSummary>,
    /// First filtered task cards for drilling down.
    pub tasks: Vec<TaskCard>,
}

/// Per-subject completion plus a short list of the filtered tasks.
#[must_use]
pub fn dashboard_view(dataset: &Dataset, snapshot: &Snapshot, options: &ViewOptions) -> Dashboard {
    let stats = compute_stats(&dataset.tasks, &snapshot.filters, &snapshot.progress);

    let mut subjects: Vec<SubjectSummary> = Subject::CANONICAL
        .iter()
        .map(|s| SubjectSummary::new(s, stats.get(s).copied().unwrap_or_default()))
        .collect();
    subjects.extend(
        stats
            .iter()
            .filter(|(s, _)| !Subject::CANONICAL.contains(*s))
            .map(|(s, v)| SubjectSummary::new(s, *v)),
    );

    let tasks = filter_tasks(&dataset.tasks, &snapshot.filters)
        .take(options.dashboard_drilldown)
        .map(|t| task_card(t, &snapshot.progress))
        .collect();

    Dashboard { subjects, tasks }
}

// ============================================================================
// Topics
// ============================================================================

/// Chemistry turbo topics, capped.
#[must_use]
pub fn topics_view<'a>(dataset: &'a Dataset, options: &ViewOptions) -> &'a [String] {
    let topics = &dataset.chemistry.turbo_topics;
    &topics[..topics.len().min(options.turbo_topics_limit)]
}
