//! Terminal rendering of the view models.

use std::fmt::Write;

use colored::Colorize;

use crate::view::{BoardColumn, Dashboard, ItemView, TaskCard};

const BAR_WIDTH: usize = 20;

/// `[#####.....]` style bar for a percentage.
fn progress_bar(percent: u32) -> String {
    let filled = (percent.min(100) as usize * BAR_WIDTH + 50) / 100;
    format!(
        "[{}{}]",
        "#".repeat(filled).green(),
        ".".repeat(BAR_WIDTH - filled).dimmed()
    )
}

fn checkbox(item: &ItemView) -> String {
    if item.done {
        format!("  [x] {:>2}. {}", item.index, item.text.dimmed())
    } else {
        format!("  [ ] {:>2}. {}", item.index, item.text)
    }
}

fn write_card(out: &mut String, card: &TaskCard) {
    let _ = writeln!(out, "{} {}", card.title.bold(), format!("({})", card.id).dimmed());

    let mut pills = Vec::new();
    if let Some(month) = card.month {
        pills.push(format!("month: {month}"));
    }
    pills.extend(card.tags.iter().cloned());
    if !pills.is_empty() {
        let _ = writeln!(out, "  {}", pills.join(" | ").cyan());
    }

    let _ = writeln!(
        out,
        "  {} {}% ({}/{})",
        progress_bar(card.percent),
        card.percent,
        card.done,
        card.total
    );
    for item in &card.items {
        let _ = writeln!(out, "{}", checkbox(item));
    }
}

/// Full checklist for each card.
#[must_use]
pub fn render_list(cards: &[TaskCard]) -> String {
    if cards.is_empty() {
        return format!("{} No tasks match the current filters\n", "Note:".yellow());
    }
    let mut out = String::new();
    for (i, c) in cards.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_card(&mut out, c);
    }
    out
}

/// Columns one after another with their task counts.
#[must_use]
pub fn render_board(columns: &[BoardColumn]) -> String {
    let mut out = String::new();
    for column in columns {
        let header = if column.predefined {
            column.label.bold()
        } else {
            column.label.bold().yellow()
        };
        let _ = writeln!(
            out,
            "{} {} {}",
            header,
            format!("[{}]", column.key).dimmed(),
            format!("{} bloków", column.count).dimmed()
        );

        for task in &column.tasks {
            let _ = writeln!(out, "  {} {}", task.section.bold(), format!("({})", task.subject).cyan());
            let _ = writeln!(out, "    {}", format!("id: {}", task.id).dimmed());
            if !task.tags.is_empty() {
                let _ = writeln!(out, "    {}", task.tags.join(", ").dimmed());
            }
            for item in &task.items {
                let _ = writeln!(out, "  {}", checkbox(item));
            }
            if task.hidden_items > 0 {
                let _ = writeln!(
                    out,
                    "    {}",
                    format!("+ {} kolejnych (pełna lista w `list`)", task.hidden_items).dimmed()
                );
            }
        }
        out.push('\n');
    }
    out
}

/// Subject percentages followed by the drill-down cards.
#[must_use]
pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    for s in &dashboard.subjects {
        let _ = writeln!(
            out,
            "{:<10} {} {:>3}%  {}",
            s.label.bold(),
            progress_bar(s.percent),
            s.percent,
            format!("{}/{} podpunktów", s.done, s.total).dimmed()
        );
    }
    if !dashboard.tasks.is_empty() {
        out.push('\n');
        out.push_str(&render_list(&dashboard.tasks));
    }
    out
}

/// Numbered topic list.
#[must_use]
pub fn render_topics(topics: &[String]) -> String {
    if topics.is_empty() {
        return format!("{} No turbo topics in the dataset\n", "Note:".yellow());
    }
    let mut out = String::new();
    for (i, topic) in topics.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", i + 1, topic);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{BoardTask, SubjectSummary};

    fn sample_card() -> TaskCard {
        TaskCard {
            id: "t1".into(),
            subject: "biologia".into(),
            title: "Biologia · Komórka".into(),
            month: Some(10),
            tags: vec!["powtórka".into()],
            items: vec![
                ItemView {
                    index: 0,
                    text: "Błony".into(),
                    done: true,
                },
                ItemView {
                    index: 1,
                    text: "Organella".into(),
                    done: false,
                },
            ],
            done: 1,
            total: 2,
            percent: 50,
        }
    }

    #[test]
    fn test_progress_bar_bounds() {
        colored::control::set_override(false);
        assert_eq!(progress_bar(0), format!("[{}]", ".".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(100), format!("[{}]", "#".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(250), format!("[{}]", "#".repeat(BAR_WIDTH)));
    }

    #[test]
    fn test_render_list() {
        let text = render_list(&[sample_card()]);
        assert!(text.contains("Biologia · Komórka"));
        assert!(text.contains("50% (1/2)"));
        assert!(text.contains("[x]"));
        assert!(text.contains("Organella"));
        assert!(text.contains("month: 10"));
    }

    #[test]
    fn test_render_list_empty() {
        assert!(render_list(&[]).contains("No tasks match"));
    }

    #[test]
    fn test_render_board_hidden_items() {
        let columns = vec![BoardColumn {
            key: "w1".into(),
            label: "Tydzień 1".into(),
            count: 1,
            predefined: true,
            tasks: vec![BoardTask {
                id: "t2".into(),
                section: "Mol".into(),
                subject: "Chemia".into(),
                tags: vec![],
                items: vec![],
                hidden_items: 3,
            }],
        }];
        let text = render_board(&columns);
        assert!(text.contains("Tydzień 1"));
        assert!(text.contains("1 bloków"));
        assert!(text.contains("+ 3 kolejnych"));
    }

    #[test]
    fn test_render_dashboard() {
        let dashboard = Dashboard {
            subjects: vec![SubjectSummary {
                subject: "chemia".into(),
                label: "Chemia".into(),
                done: 3,
                total: 4,
                percent: 75,
            }],
            tasks: vec![],
        };
        let text = render_dashboard(&dashboard);
        assert!(text.contains("Chemia"));
        assert!(text.contains(" 75%"));
        assert!(text.contains("3/4 podpunktów"));
    }

    #[test]
    fn test_render_topics() {
        let text = render_topics(&["mol".to_string(), "pH".to_string()]);
        assert!(text.contains("  1. mol"));
        assert!(text.contains("  2. pH"));
    }
}
