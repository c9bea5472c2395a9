//! Command-line host for the 1-3-5 planner.
//!
//! # Responsibility
//! - Open a planner database and run one user action or clock tick.
//! - Act as the notification and confirmation host for core.

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use onethreefive_core::db::open_db;
use onethreefive_core::{
    default_log_level, format_duration, init_logging, ChecklistItem, ChecklistItemId, ClockEffect,
    Notifier, PlannerService, ProjectId, SqliteStateRepository, StateRepository, TaskId, TaskSize,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about = "Plan today with the 1-3-5 rule", long_about = None)]
struct Cli {
    /// Planner database file
    #[arg(long, default_value = "onethreefive.db")]
    db: PathBuf,

    /// Absolute directory for rolling log files
    #[arg(long)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print today's slots and ranked projects
    Status,
    /// Run one clock tick now
    Tick,
    /// Tick repeatedly until interrupted
    Watch {
        #[arg(long, default_value_t = 60)]
        interval_secs: u64,
    },
    /// Create a project
    AddProject {
        name: String,
        /// Deadline as YYYY-MM-DD
        #[arg(long)]
        deadline: NaiveDate,
        #[arg(long, default_value = "")]
        goal: String,
    },
    /// Add a sized task to a project
    AddTask {
        project: ProjectId,
        title: String,
        #[arg(value_enum)]
        size: SizeArg,
    },
    /// Add a standalone quick task
    Quick { title: String },
    /// Toggle a task in or out of today
    Today { task: TaskId },
    /// Release a task's today slot
    Unmark { task: TaskId },
    /// Delete one task
    DeleteTask { task: TaskId },
    /// Put a project's tasks (or quick tasks, without --project) in order
    Reorder {
        #[arg(long)]
        project: Option<ProjectId>,
        /// Every task id of the scope, in the new order
        #[arg(required = true)]
        tasks: Vec<TaskId>,
    },
    /// Complete a task
    Done { task: TaskId },
    /// Archive a completed project
    Ack { project: ProjectId },
    /// Delete a project and all of its tasks
    DeleteProject {
        project: ProjectId,
        /// Confirm the cascading delete
        #[arg(long)]
        yes: bool,
    },
    /// Change the daily reset time (HH:MM)
    ResetAt { time: String },
    /// Turn reminders on or off
    Notify {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Print the export blob
    Export,
    /// Replace projects and tasks from an export file
    Import { file: PathBuf },
    /// Manage the checklist
    Checklist {
        #[command(subcommand)]
        action: ChecklistAction,
    },
}

#[derive(Subcommand)]
enum ChecklistAction {
    /// Print all items
    List,
    Add { text: String },
    /// Flip an item's done flag
    Toggle { item: ChecklistItemId },
    Remove { item: ChecklistItemId },
}

impl Command {
    fn label(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Tick => "tick",
            Self::Watch { .. } => "watch",
            Self::AddProject { .. } => "add_project",
            Self::AddTask { .. } => "add_task",
            Self::Quick { .. } => "quick",
            Self::Today { .. } => "today",
            Self::Unmark { .. } => "unmark",
            Self::DeleteTask { .. } => "delete_task",
            Self::Reorder { .. } => "reorder",
            Self::Done { .. } => "done",
            Self::Ack { .. } => "ack",
            Self::DeleteProject { .. } => "delete_project",
            Self::ResetAt { .. } => "reset_at",
            Self::Notify { .. } => "notify",
            Self::Export => "export",
            Self::Import { .. } => "import",
            Self::Checklist { .. } => "checklist",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SizeArg {
    Large,
    Medium,
    Small,
}

impl From<SizeArg> for TaskSize {
    fn from(value: SizeArg) -> Self {
        match value {
            SizeArg::Large => TaskSize::Large,
            SizeArg::Medium => TaskSize::Medium,
            SizeArg::Small => TaskSize::Small,
        }
    }
}

/// Terminal host: reminders go to stdout, permission is always held.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn permission_granted(&self) -> bool {
        true
    }

    fn show_reminder(&self, message: &str) {
        println!("reminder: {message}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(log_dir) = &cli.log_dir {
        init_logging(default_log_level(), log_dir).context("failed to start logging")?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open planner at {}", cli.db.display()))?;
    let repo = SqliteStateRepository::try_new(&conn)?;
    let mut planner = PlannerService::load(repo, TerminalNotifier)?;
    let now = Local::now().naive_local();
    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.label()
    );

    match cli.command {
        Command::Status => {
            planner.tick(now);
            print_status(&planner, now);
        }
        Command::Tick => print_tick(&planner.tick(now).effects),
        Command::Watch { interval_secs } => loop {
            print_tick(&planner.tick_now().effects);
            std::thread::sleep(Duration::from_secs(interval_secs.max(1)));
        },
        Command::AddProject {
            name,
            deadline,
            goal,
        } => {
            let project = planner.add_project(name, goal, deadline, now)?;
            println!("{}", project.id);
        }
        Command::AddTask {
            project,
            title,
            size,
        } => {
            let task = planner.add_task(project, title, size.into())?;
            println!("{}", task.id);
        }
        Command::Quick { title } => {
            let task = planner.add_quick_task(title)?;
            println!("{}", task.id);
        }
        Command::Today { task } => {
            let task = planner.toggle_today(task)?;
            println!("{} today={}", task.id, task.is_today);
        }
        Command::Unmark { task } => {
            let task = planner.unmark_today(task)?;
            println!("{} today={}", task.id, task.is_today);
        }
        Command::DeleteTask { task } => {
            planner.delete_task(task)?;
            println!("deleted task {task}");
        }
        Command::Reorder { project, tasks } => {
            planner.reorder_tasks(project, &tasks)?;
            println!("reordered {} task(s)", tasks.len());
        }
        Command::Done { task } => {
            if let Some(event) = planner.complete_task(task, now)? {
                println!(
                    "project complete: {} ({} planned). Run `ack {}` to archive it.",
                    event.name,
                    format_duration(event.planned_minutes),
                    event.project_id
                );
            }
        }
        Command::Ack { project } => {
            planner.acknowledge_completion(project)?;
        }
        Command::DeleteProject { project, yes } => {
            if !yes {
                bail!("deleting a project removes all of its tasks; pass --yes to confirm");
            }
            let removed = planner.delete_project(project)?;
            println!("deleted project and {removed} task(s)");
        }
        Command::ResetAt { time } => {
            let mut settings = planner.state().settings.clone();
            settings.reset_time = time;
            let stored = planner.update_settings(settings)?;
            println!("daily reset at {}", stored.reset_time);
        }
        Command::Notify { enabled } => {
            println!("reminders enabled={}", planner.set_notifications(enabled));
        }
        Command::Export => println!("{}", planner.export()?),
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let summary = planner.import(&text)?;
            println!(
                "imported {} project(s), {} task(s)",
                summary.projects, summary.tasks
            );
        }
        Command::Checklist { action } => match action {
            ChecklistAction::List => {
                for item in &planner.state().checklist {
                    print_checklist_item(item);
                }
            }
            ChecklistAction::Add { text } => {
                print_checklist_item(&planner.add_checklist_item(text)?);
            }
            ChecklistAction::Toggle { item } => {
                print_checklist_item(&planner.toggle_checklist_item(item)?);
            }
            ChecklistAction::Remove { item } => planner.remove_checklist_item(item)?,
        },
    }
    Ok(())
}

fn print_checklist_item(item: &ChecklistItem) {
    let mark = if item.done { "x" } else { " " };
    println!("[{mark}] {}  {}", item.id, item.text);
}

fn print_tick(effects: &[ClockEffect]) {
    for effect in effects {
        match effect {
            ClockEffect::DayRollover { transition } => println!("new day ({transition:?})"),
            ClockEffect::ResetToday { task_ids } => {
                println!("daily reset: released {} task(s)", task_ids.len())
            }
            ClockEffect::Remind { pending } => println!("{pending} task(s) still open today"),
        }
    }
}

fn print_status<R: StateRepository, N: Notifier>(
    planner: &PlannerService<R, N>,
    now: NaiveDateTime,
) {
    let state = planner.state();
    let board = planner.today_board();
    println!(
        "streak {}  energy {}% ({}/{})",
        state.streak, board.energy_percent, board.used, board.capacity
    );

    for row in &board.rows {
        println!("{} {}/{}", row.size.as_str(), row.used, row.capacity);
        for task in state.today_tasks().filter(|task| task.size == row.size) {
            println!(
                "  {}  {}  [{}]",
                task.id,
                task.title,
                task.project_label(&state.projects)
            );
        }
    }

    let quick = state
        .quick_tasks()
        .filter(|task| !task.completed)
        .collect::<Vec<_>>();
    if !quick.is_empty() {
        println!("quick");
        for task in quick {
            println!("  {}  {}", task.id, task.title);
        }
    }

    println!("projects");
    for ranked in planner.ranked_projects(now) {
        let Some(project) = state.project(ranked.project_id) else {
            continue;
        };
        println!(
            "  {}  {}  due {}  {:.2}h/day  {}  {} left",
            project.id,
            project.name,
            project.deadline,
            ranked.urgency,
            ranked.severity.as_str(),
            format_duration(ranked.load.remaining_minutes)
        );
    }
}
