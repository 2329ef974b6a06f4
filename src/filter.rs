//! Filter criteria and the task predicate.
//!
//! Criteria are transient: they come from command-line selectors on every
//! run and are never persisted.

use serde::Serialize;

use crate::dataset::{Subject, Task};
use crate::error::{PlanError, Result};

/// Selector value meaning "no restriction".
pub const ALL: &str = "all";

/// Active filter clauses. `None` (or an empty query) disables a clause.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub subject: Option<Subject>,
    pub month: Option<u8>,
    pub tag: Option<String>,
    pub query: String,
}

impl FilterCriteria {
    /// Criteria that match every task.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Build criteria from selector strings where `all` (or blank) means any.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidFilter`] if the month is not a number in
    /// 1-12.
    ///
    /// # Example
    ///
    /// ```
    /// use matura_plan::filter::FilterCriteria;
    ///
    /// let criteria = FilterCriteria::parse("chemia", "all", "all", "  mol ").unwrap();
    /// assert_eq!(criteria.query, "mol");
    /// assert!(criteria.month.is_none());
    /// ```
    pub fn parse(subject: &str, month: &str, tag: &str, query: &str) -> Result<Self> {
        let month = match selector(month) {
            None => None,
            Some(raw) => match raw.parse::<u8>() {
                Ok(m) if (1..=12).contains(&m) => Some(m),
                _ => return Err(PlanError::invalid_filter("month", raw)),
            },
        };

        Ok(Self {
            subject: selector(subject).map(Subject::from),
            month,
            tag: selector(tag).map(str::to_string),
            query: query.trim().to_string(),
        })
    }

    #[must_use]
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    #[must_use]
    pub fn with_month(mut self, month: u8) -> Self {
        self.month = Some(month);
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Check if any clause restricts the task set.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.subject.is_some()
            || self.month.is_some()
            || self.tag.is_some()
            || !self.query.trim().is_empty()
    }
}

fn selector(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case(ALL) {
        None
    } else {
        Some(raw)
    }
}

/// Check whether a task passes every active clause.
#[must_use]
pub fn matches(task: &Task, criteria: &FilterCriteria) -> bool {
    if let Some(subject) = &criteria.subject {
        if &task.subject != subject {
            return false;
        }
    }

    if let Some(month) = criteria.month {
        if task.month != Some(month) {
            return false;
        }
    }

    if let Some(tag) = &criteria.tag {
        if !task.has_tag(tag) {
            return false;
        }
    }

    let query = criteria.query.trim();
    if !query.is_empty() {
        let needle = query.to_lowercase();
        if !search_blob(task).contains(&needle) {
            return false;
        }
    }

    true
}

/// Section, items, subject key and tags joined by single spaces, lowercased.
fn search_blob(task: &Task) -> String {
    std::iter::once(task.section.as_str())
        .chain(task.items.iter().map(String::as_str))
        .chain(std::iter::once(task.subject.key()))
        .chain(task.tags.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Tasks passing the criteria, in dataset order.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    criteria: &'a FilterCriteria,
) -> impl Iterator<Item = &'a Task> + 'a {
    tasks.iter().filter(move |t| matches(t, criteria))
}
