use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io::{self, Write};
use taskstate::{BoardStore, SlotStore, Task, TaskStatus, TodoItem, TodoStore};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Todos,
    Board,
}

pub struct App<S: SlotStore> {
    todos: TodoStore<S>,
    board: BoardStore<S>,
    view: View,
    selected_todo: usize,
    selected_status: usize,
    selected_task: usize,
    notice: Option<&'static str>,
}

impl<S: SlotStore> App<S> {
    pub fn new(todos: TodoStore<S>, board: BoardStore<S>) -> Self {
        Self {
            todos,
            board,
            view: View::Todos,
            selected_todo: 0,
            selected_status: 0,
            selected_task: 0,
            notice: None,
        }
    }

    fn status(&self) -> TaskStatus {
        TaskStatus::ALL[self.selected_status]
    }

    fn column_len(&self) -> usize {
        self.board.buckets().bucket(self.status()).len()
    }

    fn clamp_selection(&mut self) {
        let todo_len = self.todos.todos().len();
        self.selected_todo = self.selected_todo.min(todo_len.saturating_sub(1));
        let column_len = self.column_len();
        self.selected_task = self.selected_task.min(column_len.saturating_sub(1));
    }

    fn add(&mut self, text: String) {
        let text = text.trim().to_string();
        if text.is_empty() {
            return;
        }
        let id = next_id();
        match self.view {
            View::Todos => {
                self.todos.add(TodoItem::new(id, text));
            }
            View::Board => {
                let status = self.status();
                self.board
                    .add(Task::new(id, status).with_field("title", text));
            }
        }
    }

    fn activate(&mut self) {
        match self.view {
            View::Todos => {
                if let Some(id) = self.todos.todos().get(self.selected_todo).map(|t| t.id) {
                    self.todos.toggle(id);
                }
            }
            View::Board => {
                let status = self.status();
                let target = self
                    .board
                    .buckets()
                    .bucket(status)
                    .get(self.selected_task)
                    .map(|t| t.id);
                if let Some(id) = target {
                    self.board.update_status(id, status.next());
                }
            }
        }
        self.clamp_selection();
    }

    fn delete(&mut self) {
        if self.view != View::Todos {
            self.notice = Some("tasks cannot be deleted; press enter to move them");
            return;
        }
        if let Some(id) = self.todos.todos().get(self.selected_todo).map(|t| t.id) {
            self.todos.remove(id);
        }
        self.clamp_selection();
    }

    fn up(&mut self) {
        match self.view {
            View::Todos => self.selected_todo = self.selected_todo.saturating_sub(1),
            View::Board => self.selected_task = self.selected_task.saturating_sub(1),
        }
    }

    fn down(&mut self) {
        match self.view {
            View::Todos => {
                if self.selected_todo + 1 < self.todos.todos().len() {
                    self.selected_todo += 1;
                }
            }
            View::Board => {
                if self.selected_task + 1 < self.column_len() {
                    self.selected_task += 1;
                }
            }
        }
    }

    fn left(&mut self) {
        if self.view == View::Board && self.selected_status > 0 {
            self.selected_status -= 1;
            self.clamp_selection();
        }
    }

    fn right(&mut self) {
        if self.view == View::Board && self.selected_status < TaskStatus::ALL.len() - 1 {
            self.selected_status += 1;
            self.clamp_selection();
        }
    }
}

/// Timestamp id in milliseconds, as assigned at submission time.
pub fn next_id() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn run_app<B: Backend, S: SlotStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            app.notice = None;
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Tab => {
                    app.view = match app.view {
                        View::Todos => View::Board,
                        View::Board => View::Todos,
                    };
                }
                KeyCode::Char('a') => {
                    let message = match app.view {
                        View::Todos => "Enter todo description".to_string(),
                        View::Board => format!("Enter task title ({})", app.status()),
                    };
                    if let Some(text) = prompt(&message)? {
                        app.add(text);
                    }
                    terminal.clear()?;
                }
                KeyCode::Char('d') | KeyCode::Delete => app.delete(),
                KeyCode::Char(' ') | KeyCode::Enter => app.activate(),
                KeyCode::Left => app.left(),
                KeyCode::Right => app.right(),
                KeyCode::Up => app.up(),
                KeyCode::Down => app.down(),
                _ => {}
            }
        }
    }
}

fn draw<S: SlotStore>(f: &mut Frame, app: &App<S>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    match app.view {
        View::Todos => draw_todos(f, app, rows[0]),
        View::Board => draw_board(f, app, rows[0]),
    }

    let footer = match (app.notice, app.view) {
        (Some(notice), _) => Paragraph::new(notice).style(Style::default().fg(Color::Yellow)),
        (None, View::Todos) => Paragraph::new("a add  space toggle  d delete  tab board  q quit")
            .style(Style::default().fg(Color::DarkGray)),
        (None, View::Board) => {
            Paragraph::new("a add  enter move to next status  ←/→ column  tab todos  q quit")
                .style(Style::default().fg(Color::DarkGray))
        }
    };
    f.render_widget(footer, rows[1]);
}

fn draw_todos<S: SlotStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let todos = app.todos.todos();
    let done = todos.iter().filter(|t| t.done).count();
    let items: Vec<ListItem> = todos
        .iter()
        .map(|t| {
            let mark = if t.done { "[x] " } else { "[ ] " };
            let style = if t.done {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                Span::raw(mark),
                Span::styled(t.description.clone(), style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("TODOS ({}/{} done)", done, todos.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

    let mut state = ListState::default();
    if !todos.is_empty() {
        state.select(Some(app.selected_todo));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_board<S: SlotStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    let buckets = app.board.buckets();
    for (i, status) in TaskStatus::ALL.iter().enumerate() {
        let tasks = buckets.bucket(*status);
        let items: Vec<ListItem> = tasks
            .iter()
            .map(|t| {
                ListItem::new(Line::from(vec![
                    Span::raw(format!("[#{}] ", t.id)),
                    Span::styled(
                        t.title().unwrap_or("(untitled)").to_string(),
                        Style::default().fg(Color::White),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!("{} ({})", status.title(), tasks.len()))
                    .borders(Borders::ALL)
                    .border_style(if app.selected_status == i {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

        let mut state = ListState::default();
        if app.selected_status == i && !tasks.is_empty() {
            state.select(Some(app.selected_task));
        }
        f.render_stateful_widget(list, chunks[i], &mut state);
    }
}

fn prompt(message: &str) -> io::Result<Option<String>> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;
    print!("{}: ", message);
    stdout.flush()?;
    let mut input = String::new();
    let read = io::stdin().read_line(&mut input);
    execute!(stdout, EnterAlternateScreen)?;
    enable_raw_mode()?;
    match read {
        Ok(0) => Ok(None),
        Ok(_) => {
            info!(len = input.trim().len(), "prompt answered");
            Ok(Some(input.trim().to_string()))
        }
        Err(err) => Err(err),
    }
}
