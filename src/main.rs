//! matura-plan - study-planning checklist in the terminal
//!
//! Lists, board and dashboard over a static exam-preparation dataset, with
//! progress and board assignments kept in local JSON slots.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use matura_plan::buckets::bucket_label;
use matura_plan::render::{render_board, render_dashboard, render_list, render_topics};
use matura_plan::view::{board_view, dashboard_view, list_view, topics_view};
use matura_plan::{
    item_key, Action, Dataset, FileStore, FilterCriteria, PlanConfig, PlanError, Planner, Snapshot,
    Store,
};
use tracing::warn;

#[derive(Parser)]
#[command(name = "matura-plan")]
#[command(version = "0.1.0")]
#[command(about = "Study-planning checklist: list, board and progress dashboard", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory holding the dataset and state (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    /// Dataset file (overrides settings)
    #[arg(long, global = true, env = "MATURA_PLAN_DATASET")]
    dataset: Option<PathBuf>,

    /// Directory for persisted state (overrides settings)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// Subject to show, or "all"
    #[arg(long, default_value = "all")]
    subject: String,

    /// Month (1-12) to show, or "all"
    #[arg(long, default_value = "all")]
    month: String,

    /// Tag to show, or "all"
    #[arg(long, default_value = "all")]
    tag: String,

    /// Case-insensitive text search over section, items, subject and tags
    #[arg(short, long, default_value = "")]
    query: String,
}

impl FilterArgs {
    fn criteria(&self) -> matura_plan::Result<FilterCriteria> {
        FilterCriteria::parse(&self.subject, &self.month, &self.tag, &self.query)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the filtered tasks with their full checklists
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the board: tasks grouped by month and week buckets
    Board {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show per-subject progress
    Stats {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Flip a checklist item between done and not done
    Toggle {
        /// Task ID
        task_id: String,

        /// Item index (starting at 0)
        index: usize,
    },

    /// Mark a checklist item as done
    Check {
        /// Task ID
        task_id: String,

        /// Item index (starting at 0)
        index: usize,
    },

    /// Mark a checklist item as not done
    Uncheck {
        /// Task ID
        task_id: String,

        /// Item index (starting at 0)
        index: usize,
    },

    /// Move a task to another board column
    Move {
        /// Task ID
        task_id: String,

        /// Bucket key (see `board`)
        bucket: String,
    },

    /// Export progress and board assignments as JSON
    Export {
        /// Output file path (defaults to the configured export file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only print the document, don't write a file
        #[arg(long)]
        no_file: bool,
    },

    /// Replace progress and/or board assignments from an export file
    Import {
        /// Export file to read
        file: PathBuf,
    },

    /// Delete all progress and board assignments
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show the chemistry turbo topics
    Topics {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show configuration and state file paths
    Paths,
}

/// Print an error and exit with its code.
fn exit_with(err: &PlanError) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), err);
    std::process::exit(err.exit_code());
}

fn print_generated(dataset: &Dataset) {
    if let Some(at) = dataset.generated_at {
        println!(
            "{}",
            format!("Dataset generated {}", at.format("%Y-%m-%d %H:%M UTC")).dimmed()
        );
    }
}

fn resolve(project: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        project.join(path)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "matura_plan=debug,info"
    } else {
        "matura_plan=info,warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Resolve project path
    let project_path = cli.project.canonicalize().unwrap_or(cli.project.clone());

    if !project_path.exists() {
        eprintln!(
            "{} Project directory does not exist: {}",
            "Error:".red().bold(),
            project_path.display()
        );
        std::process::exit(1);
    }

    let config = PlanConfig::load(&project_path).unwrap_or_else(|e| exit_with(&e));
    let dataset_path = cli
        .dataset
        .clone()
        .unwrap_or_else(|| config.dataset_path(&project_path));
    let state_dir = cli
        .state_dir
        .clone()
        .unwrap_or_else(|| config.state_dir_path(&project_path));

    if let Commands::Config { action } = &cli.command {
        match action {
            ConfigAction::Show { json } => {
                if *json {
                    println!("{}", serde_json::to_string_pretty(&config)?);
                } else {
                    println!("{}", "Configuration:".cyan().bold());
                    println!("   Dataset: {}", dataset_path.display());
                    println!("   State dir: {}", state_dir.display());
                    println!("   Progress slot: {}", config.slots.progress);
                    println!("   Buckets slot: {}", config.slots.buckets);
                    println!("   Board preview items: {}", config.view.board_preview_items);
                    println!("   Dashboard drill-down: {}", config.view.dashboard_drilldown);
                    println!("   Turbo topics limit: {}", config.view.turbo_topics_limit);
                    println!("   Export file: {}", config.export_file.display());
                }
            }
            ConfigAction::Paths => {
                let store = FileStore::new(&state_dir);
                println!(
                    "Project settings: {}",
                    PlanConfig::settings_path(&project_path).display()
                );
                match PlanConfig::user_settings_path() {
                    Some(path) => println!("User settings: {}", path.display()),
                    None => println!("User settings: (unavailable)"),
                }
                println!("Dataset: {}", dataset_path.display());
                println!(
                    "Progress: {}",
                    store.slot_path(&config.slots.progress).display()
                );
                println!(
                    "Buckets: {}",
                    store.slot_path(&config.slots.buckets).display()
                );
            }
        }
        return Ok(());
    }

    // Nothing can be shown without the dataset
    let dataset = Dataset::load(&dataset_path).await.unwrap_or_else(|e| {
        if !e.is_fatal() {
            exit_with(&e);
        }
        eprintln!(
            "{} Failed to load dataset: {}",
            "Error:".red().bold(),
            e
        );
        std::process::exit(e.exit_code());
    });

    let store = Store::new(FileStore::new(&state_dir));
    let mut planner = Planner::open(dataset, store, config.slots.clone())?;

    match cli.command {
        Commands::List { filters, json } => {
            let snapshot = apply_filters(&mut planner, &filters)?;
            let cards = list_view(planner.dataset(), &snapshot);

            if json {
                println!("{}", serde_json::to_string_pretty(&cards)?);
            } else {
                print_generated(planner.dataset());
                print!("{}", render_list(&cards));
            }
        }

        Commands::Board { filters, json } => {
            let snapshot = apply_filters(&mut planner, &filters)?;
            let columns = board_view(planner.dataset(), &snapshot, &config.view);

            if json {
                println!("{}", serde_json::to_string_pretty(&columns)?);
            } else {
                print_generated(planner.dataset());
                print!("{}", render_board(&columns));
            }
        }

        Commands::Stats { filters, json } => {
            let snapshot = apply_filters(&mut planner, &filters)?;
            let dashboard = dashboard_view(planner.dataset(), &snapshot, &config.view);

            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            } else {
                print_generated(planner.dataset());
                print!("{}", render_dashboard(&dashboard));
            }
        }

        Commands::Toggle { task_id, index } => {
            let done = match planner.dispatch(Action::toggle(task_id.clone(), index)) {
                Ok(snapshot) => snapshot.progress.is_done(&task_id, index),
                Err(e) => exit_with(&e),
            };
            print_item_state(&planner, &task_id, index, done);
        }

        Commands::Check { task_id, index } => {
            if let Err(e) = planner.dispatch(Action::set_item(task_id.clone(), index, true)) {
                exit_with(&e);
            }
            print_item_state(&planner, &task_id, index, true);
        }

        Commands::Uncheck { task_id, index } => {
            if let Err(e) = planner.dispatch(Action::set_item(task_id.clone(), index, false)) {
                exit_with(&e);
            }
            print_item_state(&planner, &task_id, index, false);
        }

        Commands::Move { task_id, bucket } => {
            if let Err(e) = planner.dispatch(Action::reassign(task_id.clone(), bucket.clone())) {
                exit_with(&e);
            }
            println!(
                "{} Moved {} to {}",
                "OK".green().bold(),
                task_id,
                bucket_label(planner.dataset(), &bucket).bold()
            );
        }

        Commands::Export { output, no_file } => {
            let payload = planner.export();
            let json = payload.to_json_pretty()?;
            println!("{}", json);

            if !no_file {
                let path =
                    output.unwrap_or_else(|| resolve(&project_path, config.export_file.clone()));
                tokio::fs::write(&path, &json).await?;
                eprintln!("{} Exported to {}", "OK".green().bold(), path.display());
            }
        }

        Commands::Import { file } => {
            let text = match tokio::fs::read_to_string(&file).await {
                Ok(text) => text,
                Err(e) => {
                    eprintln!(
                        "{} Cannot read {}: {}",
                        "Error:".red().bold(),
                        file.display(),
                        e
                    );
                    std::process::exit(1);
                }
            };

            if let Err(e) = planner.dispatch(Action::Import(text)) {
                exit_with(&e);
            }

            let outcome = planner.last_import().unwrap_or_default();
            let describe = |replaced: bool| if replaced { "replaced" } else { "unchanged" };
            println!("{} Imported", "OK".green().bold());
            println!("   Progress: {}", describe(outcome.progress_replaced));
            println!("   Buckets: {}", describe(outcome.buckets_replaced));
            println!(
                "   Completed items: {}",
                planner.snapshot().progress.len()
            );
        }

        Commands::Reset { force } => {
            if !force {
                eprintln!(
                    "{} This will delete all progress and board assignments. Use --force to confirm.",
                    "Warning:".yellow().bold()
                );
                std::process::exit(1);
            }

            planner.dispatch(Action::Reset)?;
            println!("{} Progress and board assignments cleared", "OK".green().bold());
        }

        Commands::Topics { json } => {
            let topics = topics_view(planner.dataset(), &config.view);
            if json {
                println!("{}", serde_json::to_string_pretty(topics)?);
            } else {
                print!("{}", render_topics(topics));
            }
        }

        Commands::Config { .. } => unreachable!("handled before the dataset is loaded"),
    }

    Ok(())
}

/// Parse the filter flags and make them the current filters.
fn apply_filters(
    planner: &mut Planner<FileStore>,
    filters: &FilterArgs,
) -> matura_plan::Result<Snapshot> {
    let criteria = filters.criteria().unwrap_or_else(|e| exit_with(&e));
    if let Some(tag) = &criteria.tag {
        if !planner.dataset().all_tags().contains(&tag.as_str()) {
            warn!("No task is tagged '{}'", tag);
        }
    }
    Ok(planner.dispatch(Action::SetFilter(criteria))?.clone())
}

fn print_item_state<S: matura_plan::KeyValueStore>(
    planner: &Planner<S>,
    task_id: &str,
    index: usize,
    done: bool,
) {
    let state = if done {
        "done".green()
    } else {
        "not done".yellow()
    };
    println!(
        "{} {} is {}",
        "OK".green().bold(),
        item_key(task_id, index),
        state
    );

    if let Some(task) = planner.dataset().task(task_id) {
        let summary = planner.snapshot().progress.task_summary(task);
        println!(
            "   {}: {}% ({}/{})",
            task.section,
            summary.percent(),
            summary.done,
            summary.total
        );
    }
}
