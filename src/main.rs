use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, eyre};
use std::path::PathBuf;
use taskboard::jsonl::{read_jsonl, write_jsonl};
use taskboard::task::format_date;
use taskboard::{Board, Config, NewTask, SqliteBackend, StatusFilter, Task, TaskBackend, TaskStats, TaskStatus, TaskUpdate};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Taskboard CLI - track tasks with status filters, search and completion stats")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding the task database (overrides the config file)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Path to config.yaml (default: <config dir>/taskboard/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a pending task
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Due date, YYYY-MM-DD or RFC 3339
        #[arg(long)]
        due: Option<String>,
    },

    /// Change title, description or due date of a task
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(long)]
        clear_due: bool,
    },

    /// Delete a task
    Rm { id: String },

    /// Mark a task completed
    Done { id: String },

    /// Mark a task pending again
    Reopen { id: String },

    /// Flip a task between pending and completed
    Toggle { id: String },

    /// Show tasks matching a status filter and search query
    List {
        /// all, pending or completed (default from config)
        #[arg(long)]
        status: Option<StatusFilter>,
        /// Case-insensitive match on title or description
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        json: bool,
    },

    /// Show task counts and completion rate
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Replace all tasks with the sample tasks
    Seed,

    /// Replace all tasks with the contents of a JSONL file
    Import { file: PathBuf },

    /// Write all tasks to a JSONL file
    Export { file: PathBuf },

    /// Check the database connection
    Health,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = cli.store_path {
        config.store_path = path;
    }

    let backend = SqliteBackend::open(&config.store_path)?;

    match cli.command {
        // Ping before loading tasks, so a damaged table still gets a report
        Commands::Health => health(&backend),
        command => {
            let mut board = Board::open(backend, config.seed_on_empty)?;
            run(&mut board, command, &config)
        }
    }
}

fn health<B: TaskBackend>(backend: &B) -> Result<()> {
    let report = backend.ping();
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.success {
        return Err(eyre!("Health check failed"));
    }
    Ok(())
}

fn run(board: &mut Board<SqliteBackend>, command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Add { title, description, due } => {
            let task = board.create(NewTask {
                title,
                description,
                due_date: due,
            })?;
            println!("{} {}", "Task created:".green(), task.id);
        }
        Commands::Edit {
            id,
            title,
            description,
            due,
            clear_description,
            clear_due,
        } => {
            let mut update = TaskUpdate {
                title,
                ..Default::default()
            };
            if clear_description {
                update.description = Some(None);
            } else if description.is_some() {
                update.description = Some(description);
            }
            if clear_due {
                update.due_date = Some(None);
            } else if due.is_some() {
                update.due_date = Some(due);
            }
            if update.is_empty() {
                return Err(eyre!("Nothing to change for task {}", id));
            }

            let task = board.update(&id, update)?;
            println!("{}", "Task updated:".green());
            print_task(&task);
        }
        Commands::Rm { id } => {
            let task = board.delete(&id)?;
            println!("{} {}", "Task deleted:".red(), task.title);
        }
        Commands::Done { id } => {
            board.set_status(&id, TaskStatus::Completed)?;
            println!("{}", "Great job! Task marked as completed.".green());
        }
        Commands::Reopen { id } => {
            board.set_status(&id, TaskStatus::Pending)?;
            println!("{}", "Task marked as pending.".yellow());
        }
        Commands::Toggle { id } => {
            let status = board.toggle(&id)?;
            println!("Task {} is now {}", id, status);
        }
        Commands::List { status, search, json } => {
            let filter = status.unwrap_or(config.default_filter);
            let tasks = board.view(filter, &search);
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                if search.is_empty() {
                    println!("No tasks found. Create one with `taskboard add <title>`.");
                } else {
                    println!("No tasks found. Try adjusting your search or filter.");
                }
            } else {
                for task in tasks {
                    print_task(task);
                }
            }
        }
        Commands::Stats { json } => {
            let stats = board.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats);
            }
        }
        Commands::Seed => {
            board.reseed()?;
            println!("Seeded {} sample tasks", board.store().len());
        }
        Commands::Import { file } => {
            let tasks = read_jsonl(&file)?;
            let count = tasks.len();
            board.replace_all(tasks)?;
            println!("Imported {} tasks from {}", count, file.display());
        }
        Commands::Export { file } => {
            write_jsonl(&file, board.store().tasks())?;
            println!("Exported {} tasks to {}", board.store().len(), file.display());
        }
        Commands::Health => health(board.backend())?,
    }

    Ok(())
}

fn print_task(task: &Task) {
    let marker = match task.status {
        TaskStatus::Completed => "[x]".green(),
        TaskStatus::Pending => "[ ]".yellow(),
    };
    let title = if task.is_completed() {
        task.title.strikethrough()
    } else {
        task.title.bold()
    };

    println!("{} {} {}", marker, title, task.id.dimmed());
    if let Some(description) = &task.description {
        println!("    {}", description);
    }

    let mut dates = format!("Created {}", format_date(task.created_at));
    if let Some(due) = task.due_date {
        dates.push_str(&format!("  Due {}", format_date(due)));
    }
    println!("    {}", dates.dimmed());
}

fn print_stats(stats: &TaskStats) {
    println!("{} {}", format!("{:<12}", "Total").bold(), stats.total);
    println!("{} {}", format!("{:<12}", "Pending").yellow(), stats.pending);
    println!("{} {}", format!("{:<12}", "Completed").green(), stats.completed);
    println!("{} {}%", format!("{:<12}", "Completion").blue(), stats.completion_rate);
}
