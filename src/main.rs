use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use tasklist::config::{BackendKind, Config, ConfigOverrides};
use tasklist::render;
use tasklist::{
    Backend, Outcome, Priority, PriorityFilter, StatusFilter, StoreError, Submitted, TaskDraft, TaskQuery, TaskStore,
};

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "tasklist - Ordered personal task list")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding the task data (default: platform data dir)
    #[arg(short, long, env = "TASKLIST_STORE_PATH")]
    store_path: Option<PathBuf>,

    /// Storage backend
    #[arg(short, long, value_enum, env = "TASKLIST_BACKEND")]
    backend: Option<BackendKind>,

    /// Key the task list is stored under (default: tasks)
    #[arg(short, long, env = "TASKLIST_KEY")]
    key: Option<String>,

    /// Path to config file (default: ~/.config/tasklist/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error)
    #[arg(long, env = "TASKLIST_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task at the top of the list
    Add(AddArgs),

    /// Edit an existing task; omitted fields keep their current value
    Edit(EditArgs),

    /// Toggle a task between pending and completed
    Done {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete a task
    Rm {
        /// Task id or unique id prefix
        id: String,
    },

    /// Move a task into another task's position
    Mv {
        /// Task to move
        dragged: String,
        /// Task whose position it takes
        target: String,
    },

    /// List tasks, optionally filtered
    List(ListArgs),

    /// Show task counts
    Stats,
}

#[derive(Args)]
struct AddArgs {
    /// Task title
    title: String,

    /// Longer description
    #[arg(short, long, default_value = "")]
    description: String,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    due: Option<NaiveDate>,

    /// Priority (default: medium)
    #[arg(short, long, value_enum)]
    priority: Option<Priority>,
}

#[derive(Args)]
struct EditArgs {
    /// Task id or unique id prefix
    id: String,

    /// New title
    title: Option<String>,

    /// New description
    #[arg(short, long)]
    description: Option<String>,

    /// New due date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "clear_due")]
    due: Option<NaiveDate>,

    /// Remove the due date
    #[arg(long)]
    clear_due: bool,

    /// New priority
    #[arg(short, long, value_enum)]
    priority: Option<Priority>,
}

#[derive(Args)]
struct ListArgs {
    /// Case-insensitive text to find in title or description
    #[arg(short, long, default_value = "")]
    search: String,

    /// Completion status
    #[arg(long, value_enum, default_value_t = StatusFilter::All)]
    status: StatusFilter,

    /// Priority
    #[arg(long, value_enum, default_value_t = PriorityFilter::All)]
    priority: PriorityFilter,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        backend: cli.backend,
        store_path: cli.store_path,
        key: cli.key,
        log_level: cli.log_level,
    };
    let config = Config::load(cli.config.as_deref(), &overrides)?;

    init_logging(&config.log_level);

    let backend = config.open_backend()?;
    let mut store = TaskStore::open_with_key(backend, &config.key)?;

    match run(&mut store, cli.command) {
        Ok(code) => Ok(code),
        Err(report) => match report.downcast::<StoreError>() {
            Ok(err) => rejected(err),
            Err(report) => Err(report),
        },
    }
}

fn init_logging(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run<B: Backend>(store: &mut TaskStore<B>, command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Add(args) => {
            let draft = TaskDraft {
                title: args.title,
                description: args.description,
                due_date: args.due,
                priority: args.priority,
            };
            let outcome = store.add(draft)?;
            Ok(report(outcome, |task| {
                format!("Task added: {} ({})", task.title, render::short_id(&task.id))
            }))
        }

        Commands::Edit(args) => {
            let Some(id) = resolve_id(store, &args.id)? else {
                return Ok(not_found(&args.id));
            };
            let Some(current) = store.begin_edit(&id) else {
                return Ok(not_found(&args.id));
            };

            // Start from the stored values, as an edit form would
            let mut draft = TaskDraft {
                title: current.title.clone(),
                description: current.description.clone(),
                due_date: current.due_date,
                priority: Some(current.priority),
            };
            if let Some(title) = args.title {
                draft.title = title;
            }
            if let Some(description) = args.description {
                draft.description = description;
            }
            if args.clear_due {
                draft.due_date = None;
            } else if args.due.is_some() {
                draft.due_date = args.due;
            }
            if args.priority.is_some() {
                draft.priority = args.priority;
            }

            let outcome = store.submit(draft).inspect_err(|_| store.cancel_edit())?;
            Ok(report(outcome, |submitted| match submitted {
                Submitted::Updated(task) => format!("Task updated: {}", task.title),
                Submitted::Added(task) => format!("Task added: {}", task.title),
            }))
        }

        Commands::Done { id } => {
            let Some(resolved) = resolve_id(store, &id)? else {
                return Ok(not_found(&id));
            };
            Ok(report(store.toggle_completion(&resolved), |task| {
                if task.completed {
                    format!("Task marked as completed: {}", task.title)
                } else {
                    format!("Task marked as pending: {}", task.title)
                }
            }))
        }

        Commands::Rm { id } => {
            let Some(resolved) = resolve_id(store, &id)? else {
                return Ok(not_found(&id));
            };
            Ok(report(store.delete(&resolved), |task| format!("Task deleted: {}", task.title)))
        }

        Commands::Mv { dragged, target } => {
            let (Some(from), Some(to)) = (resolve_id(store, &dragged)?, resolve_id(store, &target)?) else {
                return Ok(not_found(&format!("{} / {}", dragged, target)));
            };
            Ok(report(store.reorder(&from, &to), |index| format!("Tasks reordered (now #{})", index + 1)))
        }

        Commands::List(args) => {
            let query = TaskQuery::all()
                .search(args.search)
                .status(args.status)
                .priority(args.priority);
            println!("{}", render::render_list(&store.filter(&query)));
            println!();
            println!("{}", render::render_stats(&store.stats()).dimmed());
            Ok(ExitCode::SUCCESS)
        }

        Commands::Stats => {
            println!("{}", render::render_stats(&store.stats()));
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Full id for an exact id or unique prefix
fn resolve_id<B: Backend>(store: &TaskStore<B>, input: &str) -> Result<Option<String>, StoreError> {
    Ok(store.resolve_prefix(input)?.map(|task| task.id.clone()))
}

fn report<T>(outcome: Outcome<T>, describe: impl FnOnce(&T) -> String) -> ExitCode {
    match outcome {
        Outcome::Applied(value) => {
            println!("{}", describe(&value).green());
        }
        Outcome::Unsaved(value, err) => {
            println!("{}", describe(&value));
            eprintln!("{} {}", "warning: change was not saved:".yellow().bold(), err);
        }
        Outcome::NotFound => {
            eprintln!("{}", "No matching task; nothing changed.".dimmed());
        }
    }
    ExitCode::SUCCESS
}

fn not_found(id: &str) -> ExitCode {
    eprintln!("{}", format!("No task matches '{}'.", id).dimmed());
    ExitCode::SUCCESS
}

fn rejected(err: StoreError) -> Result<ExitCode> {
    if err.is_recoverable() {
        eprintln!("{} {}", "error:".red().bold(), err);
        return Ok(ExitCode::FAILURE);
    }
    Err(err.into())
}
