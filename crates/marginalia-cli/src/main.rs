use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use marginalia_config::Config;
use marginalia_engine::{
    DateFormat, Note, Post, PostStore, PositionTracker, TriggerMeasure, format_date,
    store::validate_posts_dir,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::{env, io::stdout, path::PathBuf, process};

struct App {
    posts: Vec<Post>,
    post_list_state: ListState,
}

impl App {
    fn new(posts_path: PathBuf) -> Result<Self> {
        let store = PostStore::open(posts_path)?;
        let posts = store.list_posts()?;

        let mut app = Self {
            posts,
            post_list_state: ListState::default(),
        };
        if !app.posts.is_empty() {
            app.post_list_state.select(Some(0));
        }
        Ok(app)
    }

    fn next_post(&mut self) {
        if self.posts.is_empty() {
            return;
        }
        let i = match self.post_list_state.selected() {
            Some(i) => (i + 1) % self.posts.len(),
            None => 0,
        };
        self.post_list_state.select(Some(i));
    }

    fn previous_post(&mut self) {
        if self.posts.is_empty() {
            return;
        }
        let i = match self.post_list_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.posts.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.post_list_state.select(Some(i));
    }

    fn selected_post(&self) -> Option<&Post> {
        self.post_list_state
            .selected()
            .and_then(|i| self.posts.get(i))
    }
}

/// Finds the row of each note's trigger phrase in the clean content.
///
/// The terminal is the layout host here: one content line is one row, so the
/// first line containing a note's context is its trigger's top edge. Notes
/// whose context appears nowhere get no entry, same as in the browser.
fn measure_note_rows(post: &Post) -> PositionTracker {
    let mut tracker = PositionTracker::new();
    let ticket = tracker.schedule();

    let lines: Vec<&str> = post.content.lines().collect();
    let triggers = post.anchorable_notes().filter_map(|note| {
        let anchor = note.anchor()?;
        let row = lines.iter().position(|line| line.contains(anchor))?;
        Some(TriggerMeasure {
            note: note.id,
            top: row as f64,
        })
    });
    tracker.complete(ticket, 0.0, triggers.collect::<Vec<_>>());
    tracker
}

/// Content lines with each note's first trigger phrase underlined.
fn content_lines<'a>(post: &'a Post) -> Vec<Line<'a>> {
    let mut pending: Vec<&str> = post.anchorable_notes().filter_map(Note::anchor).collect();

    post.content
        .lines()
        .map(|line| styled_line(line, &mut pending))
        .collect()
}

fn styled_line<'a>(line: &'a str, pending: &mut Vec<&str>) -> Line<'a> {
    let mut spans = Vec::new();
    let mut rest = line;

    loop {
        let next = pending
            .iter()
            .filter_map(|anchor| rest.find(anchor).map(|at| (at, *anchor)))
            .min_by_key(|&(at, anchor)| (at, std::cmp::Reverse(anchor.len())));
        let Some((at, anchor)) = next else {
            if !rest.is_empty() {
                spans.push(Span::raw(rest));
            }
            break;
        };

        if at > 0 {
            spans.push(Span::raw(&rest[..at]));
        }
        spans.push(Span::styled(
            &rest[at..at + anchor.len()],
            Style::default().add_modifier(Modifier::UNDERLINED),
        ));
        rest = &rest[at + anchor.len()..];
        pending.retain(|a| *a != anchor);
    }

    Line::from(spans)
}

/// Margin lines padded so each note starts at its trigger's row.
///
/// Notes are laid out in row order; a note whose row is already taken simply
/// flows to the next free line (no overlap avoidance beyond that).
fn margin_lines(post: &Post, tracker: &PositionTracker) -> Vec<Line<'static>> {
    let mut placed: Vec<(usize, &Note)> = post
        .notes
        .iter()
        .filter_map(|note| tracker.offset(note.id).map(|row| (row as usize, note)))
        .collect();
    placed.sort_by_key(|&(row, note)| (row, note.id));

    let mut lines: Vec<Line> = Vec::new();
    for (row, note) in placed {
        while lines.len() < row {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            format!("▸ {}", note.content),
            Style::default().fg(Color::Yellow),
        )));
    }
    lines
}

fn main() -> Result<()> {
    // Determine posts path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let posts_path;
    let from_config;

    if args.len() == 2 {
        posts_path = PathBuf::from(&args[1]);
        from_config = false;
    } else if args.len() == 1 {
        match Config::load() {
            Ok(Some(config)) => {
                posts_path = config.posts_path.clone();
                from_config = true;
                // Later reads (titles, footer) go through the global accessor.
                let _ = config.install();
            }
            Ok(None) => {
                eprintln!("Error: No posts path provided and no config file found");
                eprintln!("Usage: {} <posts-folder-path>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                eprintln!("Usage: {} <posts-folder-path>", args[0]);
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [posts-folder-path]", args[0]);
        process::exit(1);
    };

    if let Err(e) = validate_posts_dir(&posts_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Posts path '{}'{} is invalid: {e}",
            posts_path.display(),
            source
        );
        process::exit(1);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(posts_path)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_post(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_post(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints(
            [
                Constraint::Percentage(24),
                Constraint::Percentage(48),
                Constraint::Percentage(28),
            ]
            .as_ref(),
        )
        .split(f.area());

    // Post list panel
    let post_items: Vec<ListItem> = app
        .posts
        .iter()
        .map(|post| {
            let marker = if post.published { "  " } else { "✎ " };
            let date = format_date(post.created_at, DateFormat::Short);
            let display_text = format!("{}{}  ({})", marker, post.title, date);
            ListItem::new(vec![Line::from(vec![Span::raw(display_text)])])
        })
        .collect();

    let site_title = Config::global()
        .map(|config| config.site_title.as_str())
        .unwrap_or("Writings");
    let posts_list = List::new(post_items)
        .block(Block::default().borders(Borders::ALL).title(site_title))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(posts_list, chunks[0], &mut app.post_list_state);

    // Content and margin panels
    let (content, margin) = match app.selected_post() {
        Some(post) => {
            let tracker = measure_note_rows(post);
            (content_lines(post), margin_lines(post, &tracker))
        }
        None => (vec![Line::from("Select a post to preview it")], Vec::new()),
    };

    let content_panel = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title("Post"))
        .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(content_panel, chunks[1]);

    let margin_panel = Paragraph::new(margin)
        .block(Block::default().borders(Borders::ALL).title("Margin"));
    f.render_widget(margin_panel, chunks[2]);

    // Instructions
    let help_text = Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("↑/k: Previous | "),
        Span::raw("↓/j: Next"),
    ]);

    let help = Paragraph::new(vec![help_text]).block(Block::default());

    let bottom_chunk = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    f.render_widget(help, bottom_chunk[1]);
}
