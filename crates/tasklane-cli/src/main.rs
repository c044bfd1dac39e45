use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tasklane_core::app::{Board, BoardBuilder, DropOutcome, DropTargetId, EditingContext, Point};
use tasklane_core::config::BoardConfig;
use tasklane_core::domain::{ColumnId, NewTask, Priority, TaskForm, TaskId};
use tasklane_core::impls::InMemoryTransport;
use tasklane_core::ports::{SystemClock, UlidGenerator};

/// Drive a demo kanban board from the command line.
#[derive(Debug, Parser)]
#[command(name = "tasklane", version)]
struct Cli {
    /// Board configuration (TOML). Defaults apply when the file is missing.
    #[arg(long, default_value = "tasklane.toml")]
    config: PathBuf,

    /// Search term applied to every column.
    #[arg(long)]
    search: Option<String>,

    /// Add a task before any moves: `<column>:<title>`.
    #[arg(long = "add", value_name = "COLUMN:TITLE")]
    adds: Vec<AddArg>,

    /// Drag a task: `<task>:<column>:<index>`. May be repeated.
    #[arg(long = "move", value_name = "TASK:COLUMN:INDEX")]
    moves: Vec<MoveArg>,

    /// Print the final board as JSON.
    #[arg(long)]
    json: bool,

    /// Debug logging for the engine.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone)]
struct MoveArg {
    task: TaskId,
    column: ColumnId,
    index: usize,
}

impl FromStr for MoveArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(task), Some(column), Some(index)) if !task.is_empty() && !column.is_empty() => {
                let index = index.parse().map_err(|e| format!("bad index {index:?}: {e}"))?;
                Ok(Self {
                    task: TaskId::new(task),
                    column: ColumnId::new(column),
                    index,
                })
            }
            _ => Err(format!("expected TASK:COLUMN:INDEX, got {s:?}")),
        }
    }
}

#[derive(Debug, Clone)]
struct AddArg {
    column: ColumnId,
    title: String,
}

impl FromStr for AddArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((column, title)) if !column.is_empty() => Ok(Self {
                column: ColumnId::new(column),
                title: title.to_string(),
            }),
            _ => Err(format!("expected COLUMN:TITLE, got {s:?}")),
        }
    }
}

fn seed_tasks() -> Vec<tasklane_core::domain::Task> {
    let seed = [
        ("t1", "todo", "Set up CI pipeline", Priority::High),
        ("t2", "todo", "Write onboarding docs", Priority::Low),
        ("t3", "todo", "Audit authentication flow", Priority::High),
        ("t4", "in progress", "File upload service", Priority::Medium),
        ("t5", "in progress", "Dark mode", Priority::Low),
        ("t6", "in review", "Search endpoint", Priority::Medium),
        ("t7", "done", "Project skeleton", Priority::Medium),
    ];
    seed.into_iter()
        .enumerate()
        .map(|(i, (id, column, title, priority))| {
            NewTask::new(title, column)
                .with_priority(priority)
                .with_order(((i % 3) as f64 + 1.0) * 1000.0)
                .into_task(TaskId::new(id))
        })
        .collect()
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tasklane_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tasklane_core=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_board(board: &Board) {
    for column in board.snapshot() {
        let status = board.status(column.id());
        let more = if status.has_more { " (more)" } else { "" };
        println!(
            "{} [{}] {} task(s){}",
            column.config.title,
            column.config.color,
            column.tasks.len(),
            more
        );
        for task in &column.tasks {
            let label = format!("{} {}", task.id, task.title);
            println!("  {label:<32} {:?} order={}", task.priority, task.sort_key());
        }
    }
}

/// Replay a drag gesture: press, travel past the threshold, hover, release.
async fn drag(board: &mut Board, mv: &MoveArg) -> anyhow::Result<DropOutcome> {
    board.pointer_down(mv.task.clone(), Point::default());
    if !board.pointer_move(Point::new(0.0, board.config().drag_activation_px + 1.0)) {
        bail!("drag of {} did not activate", mv.task);
    }

    let visible: Vec<TaskId> = board
        .column(&mv.column)
        .into_iter()
        .map(|t| t.id)
        .filter(|id| id != &mv.task)
        .collect();
    let target = match visible.get(mv.index) {
        Some(card) => DropTargetId::Task(card.clone()),
        None => DropTargetId::Column(mv.column.clone()),
    };

    board.drag_over(Some(&target));
    Ok(board.drop_on(Some(&target)).await?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = BoardConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let store = InMemoryTransport::with_id_generator(Arc::new(UlidGenerator::new(SystemClock)));
    for task in seed_tasks() {
        store.insert(task);
    }

    let mut board = BoardBuilder::new(store).config(config).build()?;
    if let Some(term) = &cli.search {
        board.type_search(term.as_str());
        board.submit_search();
    }
    board.refresh().await?;
    tracing::info!(search = %board.search_term(), adds = cli.adds.len(), moves = cli.moves.len(), "board loaded");

    for add in &cli.adds {
        let form = TaskForm::new(add.title.as_str());
        let editing = EditingContext::Creating {
            column: add.column.clone(),
        };
        let created = board.save_task(&form, &editing).await?;
        println!("added {} to {}", created.id, created.column);
    }

    for mv in &cli.moves {
        let outcome = drag(&mut board, mv).await?;
        println!("move {} -> {}:{}: {:?}", mv.task, mv.column, mv.index, outcome);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&board.snapshot())?);
    } else {
        print_board(&board);
        println!("total: {}", board.total_count().await);
    }
    Ok(())
}
