mod ui;

use clap::{Arg, ArgMatches, Command};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::{self, OpenOptions},
    io,
    path::PathBuf,
    sync::Mutex,
};
use taskstate::{
    BoardStore, Config, FileStore, Task, TaskAction, TaskStatus, TodoAction, TodoItem, TodoStore,
};
use tracing::info;

fn cli() -> Command {
    Command::new("taskstate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("To-do list and task board with snapshot persistence")
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .help("Directory holding the snapshot files"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("trace, debug, info, warn or error"),
        )
        .subcommand(Command::new("ui").about("Open the interactive board (default)"))
        .subcommand(
            Command::new("todo")
                .about("Manage the to-do list")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add").about("Add a to-do").arg(
                        Arg::new("description")
                            .required(true)
                            .num_args(1..)
                            .help("To-do text"),
                    ),
                )
                .subcommand(Command::new("list").about("List to-dos"))
                .subcommand(
                    Command::new("remove")
                        .about("Remove a to-do")
                        .arg(id_arg()),
                )
                .subcommand(
                    Command::new("toggle")
                        .about("Flip a to-do between done and open")
                        .arg(id_arg()),
                ),
        )
        .subcommand(
            Command::new("task")
                .about("Manage the task board")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Add a task to a bucket")
                        .arg(status_arg("status"))
                        .arg(
                            Arg::new("title")
                                .required(true)
                                .num_args(1..)
                                .help("Task title"),
                        ),
                )
                .subcommand(Command::new("list").about("Show every bucket"))
                .subcommand(
                    Command::new("move")
                        .about("Move a task to another bucket")
                        .arg(id_arg())
                        .arg(status_arg("new_status")),
                ),
        )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(clap::value_parser!(i64))
        .help("Item id")
}

fn status_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .required(true)
        .value_parser(|s: &str| s.parse::<TaskStatus>())
        .help("pending, progress or unfinished")
}

fn init_logging(config: &Config) -> io::Result<()> {
    fs::create_dir_all(&config.data_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())?;
    // Logs go to a file; stderr belongs to the terminal UI.
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(config.log_level)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = cli().get_matches();
    let config = Config::resolve(
        matches.get_one::<String>("data-dir").map(PathBuf::from),
        matches.get_one::<String>("log-level").map(String::as_str),
    );
    init_logging(&config)?;
    info!(dir = %config.data_dir.display(), "starting");

    let slots = FileStore::new(&config.data_dir);
    match matches.subcommand() {
        Some(("todo", sub)) => run_todo(TodoStore::open(slots, &config.todo_key), sub),
        Some(("task", sub)) => run_task(BoardStore::open(slots, &config.tasks_key), sub),
        _ => run_ui(&config, slots),
    }
}

fn words(matches: &ArgMatches, name: &str) -> String {
    matches
        .get_many::<String>(name)
        .map(|vals| vals.map(String::as_str).collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn id(matches: &ArgMatches) -> i64 {
    matches.get_one::<i64>("id").copied().unwrap_or_default()
}

fn run_todo(
    mut store: TodoStore<FileStore>,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("add", sub)) => {
            let description = words(sub, "description");
            if description.is_empty() {
                return Err("description must not be empty".into());
            }
            let item = TodoItem::new(ui::next_id(), description);
            let (id, description) = (item.id, item.description.clone());
            store.try_dispatch(TodoAction::Add(item))?;
            println!("Added [#{}] {}", id, description);
        }
        Some(("remove", sub)) => {
            let id = id(sub);
            if !store.try_dispatch(TodoAction::Remove(id))? {
                println!("No to-do with id {}", id);
            }
        }
        Some(("toggle", sub)) => {
            let id = id(sub);
            if !store.try_dispatch(TodoAction::Toggle(id))? {
                println!("No to-do with id {}", id);
            }
        }
        _ => {
            for todo in store.todos().iter() {
                let mark = if todo.done { "x" } else { " " };
                println!("[{}] #{} {}", mark, todo.id, todo.description);
            }
        }
    }
    Ok(())
}

fn run_task(
    mut store: BoardStore<FileStore>,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("add", sub)) => {
            let title = words(sub, "title");
            if title.is_empty() {
                return Err("title must not be empty".into());
            }
            let status = sub
                .get_one::<TaskStatus>("status")
                .copied()
                .unwrap_or(TaskStatus::Pending);
            let task = Task::new(ui::next_id(), status).with_field("title", title);
            let id = task.id;
            store.try_dispatch(TaskAction::Add(task))?;
            println!("Added [#{}] to {}", id, status);
        }
        Some(("move", sub)) => {
            let id = id(sub);
            let status = sub
                .get_one::<TaskStatus>("new_status")
                .copied()
                .unwrap_or(TaskStatus::Pending);
            if !store.try_dispatch(TaskAction::UpdateStatus {
                id,
                new_status: status,
            })? {
                println!("No task with id {}", id);
            }
        }
        _ => {
            let buckets = store.buckets();
            for status in TaskStatus::ALL {
                println!("{}:", status.title());
                for task in buckets.bucket(status) {
                    println!("- [#{}] {}", task.id, task.title().unwrap_or("(untitled)"));
                }
            }
        }
    }
    Ok(())
}

fn run_ui(config: &Config, slots: FileStore) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = ui::App::new(
        TodoStore::open(slots.clone(), &config.todo_key),
        BoardStore::open(slots, &config.tasks_key),
    );

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("{:?}", err);
    }
    Ok(())
}
